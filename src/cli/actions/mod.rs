//! Work the binary performs once arguments are validated.

pub mod server;

#[derive(Debug)]
pub enum Action {
    /// Serve the auth API until interrupted.
    Server(server::Args),
}

impl Action {
    /// # Errors
    /// Returns an error if the server fails to boot or stops abnormally.
    pub async fn execute(self) -> anyhow::Result<()> {
        match self {
            Self::Server(args) => server::execute(args).await,
        }
    }
}
