// src/signers.rs
use crate::error::{DeployError, DeployResult};
use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;
use zeroize::Zeroize;

/// Ordered set of deployment credentials, loaded once at startup and
/// immutable for the process lifetime.
#[derive(Debug, Clone)]
pub struct SignerSet {
    signers: Vec<PrivateKeySigner>,
}

impl SignerSet {
    /// Load signers from the key file, or fall back to the `PRIVATE_KEY`
    /// environment variable when the file does not exist.
    pub fn load(path: &Path) -> DeployResult<Self> {
        if path.exists() {
            return Self::from_key_file(path);
        }
        match std::env::var("PRIVATE_KEY") {
            Ok(key) => {
                debug!("key file missing, using PRIVATE_KEY from environment");
                Self::from_single_key(key, "PRIVATE_KEY")
            }
            Err(_) => Err(DeployError::KeyFile(format!(
                "{} not found and PRIVATE_KEY is not set",
                path.display()
            ))),
        }
    }

    /// Parse a newline-separated key file. Blank lines are skipped; an
    /// empty-after-filtering file is fatal.
    pub fn from_key_file(path: &Path) -> DeployResult<Self> {
        let mut raw = std::fs::read_to_string(path)
            .map_err(|e| DeployError::KeyFile(format!("{}: {e}", path.display())))?;

        let mut signers = Vec::new();
        let mut parse_error = None;
        for (idx, line) in raw.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match PrivateKeySigner::from_str(line) {
                Ok(signer) => signers.push(signer),
                Err(e) => {
                    parse_error =
                        Some(DeployError::InvalidKey(format!("line {}", idx + 1), e.to_string()));
                    break;
                }
            }
        }
        raw.zeroize();

        if let Some(err) = parse_error {
            return Err(err);
        }
        if signers.is_empty() {
            return Err(DeployError::NoSigners);
        }
        debug!(count = signers.len(), "signers parsed from key file");
        Ok(Self { signers })
    }

    /// Single-signer construction from one raw key string, which is wiped
    /// after parsing.
    pub fn from_single_key(mut key: String, label: &str) -> DeployResult<Self> {
        let parsed = PrivateKeySigner::from_str(key.trim())
            .map_err(|e| DeployError::InvalidKey(label.to_string(), e.to_string()));
        key.zeroize();
        Ok(Self {
            signers: vec![parsed?],
        })
    }

    pub fn signers(&self) -> &[PrivateKeySigner] {
        &self.signers
    }

    /// Signer addresses, in campaign order.
    pub fn addresses(&self) -> Vec<Address> {
        self.signers.iter().map(|s| s.address()).collect()
    }

    pub fn len(&self) -> usize {
        self.signers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signers.is_empty()
    }
}
