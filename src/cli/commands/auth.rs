//! Token signing and password hashing arguments.

use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

use crate::auth::config::{DEFAULT_BCRYPT_COST, DEFAULT_TOKEN_TTL_MINUTES};

pub const ARG_JWT_SECRET: &str = "jwt-secret";
pub const ARG_JWT_ISSUER: &str = "jwt-issuer";
pub const ARG_JWT_AUDIENCE: &str = "jwt-audience";
pub const ARG_JWT_TTL_MINUTES: &str = "jwt-ttl-minutes";
pub const ARG_BCRYPT_COST: &str = "bcrypt-cost";

#[must_use]
pub fn with_args(command: Command) -> Command {
    let command = with_token_args(command);
    with_password_args(command)
}

fn with_token_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_JWT_SECRET)
                .long(ARG_JWT_SECRET)
                .help("Symmetric key used to sign and verify tokens")
                .env("CODEMART_JWT_SECRET")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_JWT_ISSUER)
                .long(ARG_JWT_ISSUER)
                .help("Expected token issuer (iss); unset disables the check")
                .env("CODEMART_JWT_ISSUER"),
        )
        .arg(
            Arg::new(ARG_JWT_AUDIENCE)
                .long(ARG_JWT_AUDIENCE)
                .help("Expected token audience (aud); unset disables the check")
                .env("CODEMART_JWT_AUDIENCE"),
        )
        .arg(
            Arg::new(ARG_JWT_TTL_MINUTES)
                .long(ARG_JWT_TTL_MINUTES)
                .help("Token lifetime in minutes")
                .env("CODEMART_JWT_TTL_MINUTES")
                .default_value("60")
                .value_parser(clap::value_parser!(i64).range(1..)),
        )
}

fn with_password_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_BCRYPT_COST)
            .long(ARG_BCRYPT_COST)
            .help("bcrypt work factor (4-31)")
            .env("CODEMART_BCRYPT_COST")
            .default_value("12")
            .value_parser(clap::value_parser!(u32).range(4..=31)),
    )
}

#[derive(Debug)]
pub struct Options {
    pub jwt_secret: SecretString,
    pub jwt_issuer: Option<String>,
    pub jwt_audience: Option<String>,
    pub jwt_ttl_minutes: i64,
    pub bcrypt_cost: u32,
}

impl Options {
    /// # Errors
    /// Returns an error if the signing secret is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let jwt_secret = matches
            .get_one::<String>(ARG_JWT_SECRET)
            .cloned()
            .context("missing required argument: --jwt-secret")?;

        Ok(Self {
            jwt_secret: SecretString::from(jwt_secret),
            jwt_issuer: matches.get_one::<String>(ARG_JWT_ISSUER).cloned(),
            jwt_audience: matches.get_one::<String>(ARG_JWT_AUDIENCE).cloned(),
            jwt_ttl_minutes: matches
                .get_one::<i64>(ARG_JWT_TTL_MINUTES)
                .copied()
                .unwrap_or(DEFAULT_TOKEN_TTL_MINUTES),
            bcrypt_cost: matches
                .get_one::<u32>(ARG_BCRYPT_COST)
                .copied()
                .unwrap_or(DEFAULT_BCRYPT_COST),
        })
    }
}
