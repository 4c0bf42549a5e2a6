// src/error.rs
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeployError {
    // Startup errors
    #[error("Failed to read contract source: {0}")]
    SourceRead(String),

    #[error("Could not run the Solidity compiler: {0}")]
    CompilerUnavailable(String),

    #[error("Contract compilation failed:\n{0}")]
    CompileFailed(String),

    #[error("Contract `{0}` not found in compiler output")]
    ContractNotFound(String),

    #[error("Source defines multiple contracts ({0}); pick one with --contract")]
    AmbiguousContract(String),

    #[error("Key file error: {0}")]
    KeyFile(String),

    #[error("No private keys found")]
    NoSigners,

    #[error("Invalid private key ({0}): {1}")]
    InvalidKey(String, String),

    #[error("Invalid deploy count: {0}")]
    InvalidCount(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Result log error: {0}")]
    Sink(String),

    // Per-attempt errors
    #[error("Gas estimation failed: {0}")]
    GasEstimation(String),

    #[error("Transaction failed: {0}")]
    Transaction(String),

    #[error("Deployment not confirmed: {0}")]
    Confirmation(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    // System errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DeployError {
    /// Check if the error must abort the whole campaign. Anything that is not
    /// scoped to a single deployment attempt is fatal.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            DeployError::GasEstimation(_)
                | DeployError::Transaction(_)
                | DeployError::Confirmation(_)
                | DeployError::Rpc(_)
        )
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            DeployError::SourceRead(_)
            | DeployError::CompilerUnavailable(_)
            | DeployError::CompileFailed(_)
            | DeployError::ContractNotFound(_)
            | DeployError::AmbiguousContract(_) => "compile",

            DeployError::KeyFile(_)
            | DeployError::NoSigners
            | DeployError::InvalidKey(_, _) => "signers",

            DeployError::InvalidCount(_) | DeployError::InvalidConfiguration(_) => {
                "configuration"
            }

            DeployError::GasEstimation(_)
            | DeployError::Transaction(_)
            | DeployError::Confirmation(_)
            | DeployError::Rpc(_) => "chain",

            DeployError::Sink(_) => "sink",

            DeployError::Io(_) => "system",
        }
    }
}

// Result type alias for convenience
pub type DeployResult<T> = Result<T, DeployError>;
