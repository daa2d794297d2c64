use crate::{
    api,
    auth::{AuthConfig, AuthService},
    store::{MemoryUserStore, PgUserStore, UserStore},
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: Option<String>,
    pub jwt_secret: SecretString,
    pub jwt_issuer: Option<String>,
    pub jwt_audience: Option<String>,
    pub jwt_ttl_minutes: i64,
    pub bcrypt_cost: u32,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the store cannot be reached, the auth configuration is
/// invalid, or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);

    let store: Arc<dyn UserStore> = match &args.dsn {
        Some(dsn) => {
            let store = PgUserStore::connect(dsn).await?;
            store
                .ensure_schema()
                .await
                .context("Failed to apply database schema")?;
            Arc::new(store)
        }
        None => {
            warn!("No DSN configured, identities are kept in memory and lost on restart");
            Arc::new(MemoryUserStore::new())
        }
    };

    let config = auth_config(&args);
    let auth = AuthService::new(&config, store).context("Invalid auth configuration")?;

    info!(
        store = auth.store().kind(),
        ttl_minutes = config.token_ttl_minutes(),
        "Auth service ready"
    );

    api::new(args.port, Arc::new(auth)).await
}

fn auth_config(args: &Args) -> AuthConfig {
    AuthConfig::new(args.jwt_secret.clone())
        .with_issuer(args.jwt_issuer.clone())
        .with_audience(args.jwt_audience.clone())
        .with_token_ttl_minutes(args.jwt_ttl_minutes)
        .with_bcrypt_cost(args.bcrypt_cost)
}

fn log_startup_args(args: &Args) {
    debug!(
        port = args.port,
        dsn_configured = args.dsn.is_some(),
        jwt_issuer = ?args.jwt_issuer,
        jwt_audience = ?args.jwt_audience,
        jwt_ttl_minutes = args.jwt_ttl_minutes,
        bcrypt_cost = args.bcrypt_cost,
        "Startup configuration"
    );
}
