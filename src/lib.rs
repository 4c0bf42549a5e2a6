// src/lib.rs
pub mod campaign;
pub mod chain;
pub mod compiler;
pub mod config;
pub mod error;
pub mod signers;
pub mod sink;
pub mod types;

pub use crate::campaign::Campaign;
pub use crate::chain::{ChainClient, RpcChain};
pub use crate::config::CampaignConfig;
pub use crate::error::{DeployError, DeployResult};
pub use crate::signers::SignerSet;
pub use crate::sink::DeploymentLog;
pub use crate::types::{AttemptOutcome, CampaignReport, CompiledContract};
