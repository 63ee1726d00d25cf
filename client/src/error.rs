use thiserror::Error;

/// Client-level error types
#[derive(Error, Debug)]
pub enum ClientError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation errors (bad pubkeys, out-of-range arguments)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Keypair loading or parsing errors
    #[error("Keypair error: {0}")]
    Keypair(String),

    /// JSON-RPC transport or transaction errors
    #[error("RPC error: {0}")]
    Rpc(#[from] Box<solana_client::client_error::ClientError>),

    /// Account does not exist on-chain
    #[error("Account not found: {0}")]
    NotFound(String),

    /// Account data or program-side errors decoded through Anchor
    #[error("Program error: {0}")]
    Program(#[from] anchor_lang::error::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for client errors
pub type ClientResult<T> = Result<T, ClientError>;

impl From<solana_client::client_error::ClientError> for ClientError {
    fn from(err: solana_client::client_error::ClientError) -> Self {
        ClientError::Rpc(Box::new(err))
    }
}

impl ClientError {
    /// Check if error is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound(_))
    }

    /// Check if error came from configuration or keypair setup
    pub fn is_setup_error(&self) -> bool {
        matches!(self, ClientError::Config(_) | ClientError::Keypair(_))
    }

    /// Process exit code for the CLI
    pub fn exit_code(&self) -> i32 {
        match self {
            ClientError::Config(_) | ClientError::Keypair(_) => 78,
            ClientError::Validation(_) => 64,
            ClientError::NotFound(_) => 66,
            ClientError::Rpc(_) => 69,
            ClientError::Program(_) | ClientError::Serialization(_) => 70,
        }
    }
}
