// src/config.rs
use crate::error::{DeployError, DeployResult};
use std::io::{self, BufRead, Write};
use std::time::Duration;
use url::Url;

/// How long to pause between deployments by default.
pub const DEFAULT_DELAY_MS: u64 = 5000;

/// Validated knobs for one campaign. Built once before the loop starts;
/// invalid input aborts before any deployment happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CampaignConfig {
    pub deploys_per_signer: u32,
    pub inter_attempt_delay: Duration,
}

impl CampaignConfig {
    pub fn new(deploys_per_signer: u32, inter_attempt_delay: Duration) -> DeployResult<Self> {
        if deploys_per_signer == 0 {
            return Err(DeployError::InvalidCount(
                "count must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            deploys_per_signer,
            inter_attempt_delay,
        })
    }
}

/// Where the deploy count comes from. The campaign loop never knows whether
/// the number was typed at a prompt or passed on the command line.
pub trait CountSource {
    fn deploy_count(&self) -> DeployResult<u32>;
}

/// Count fixed up front (the `--count` flag).
#[derive(Debug, Clone, Copy)]
pub struct FixedCount(pub u32);

impl CountSource for FixedCount {
    fn deploy_count(&self) -> DeployResult<u32> {
        Ok(self.0)
    }
}

/// Count read from an interactive stdin prompt. One shot, no retry on bad
/// input.
#[derive(Debug, Default)]
pub struct InteractiveCount;

impl CountSource for InteractiveCount {
    fn deploy_count(&self) -> DeployResult<u32> {
        print!("How many contracts per account? ");
        io::stdout().flush()?;
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        parse_count(line.trim())
    }
}

/// Parse a user-supplied deploy count. Non-numeric or non-positive input is
/// rejected outright.
pub fn parse_count(raw: &str) -> DeployResult<u32> {
    let value: i64 = raw
        .parse()
        .map_err(|_| DeployError::InvalidCount(format!("`{raw}` is not a number")))?;
    if value <= 0 {
        return Err(DeployError::InvalidCount(format!(
            "count must be greater than zero, got {value}"
        )));
    }
    u32::try_from(value)
        .map_err(|_| DeployError::InvalidCount(format!("count {value} is too large")))
}

/// Resolve the JSON-RPC endpoint: the `--rpc-url` flag wins, otherwise the
/// `RPC_URL` environment variable.
pub fn resolve_rpc_url(flag: Option<Url>) -> DeployResult<Url> {
    if let Some(url) = flag {
        return Ok(url);
    }
    match std::env::var("RPC_URL") {
        Ok(raw) => Url::parse(&raw).map_err(|e| {
            DeployError::InvalidConfiguration(format!("RPC_URL is not a valid URL: {e}"))
        }),
        Err(_) => Err(DeployError::InvalidConfiguration(
            "no RPC endpoint: pass --rpc-url or set RPC_URL".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_positive_count() {
        assert_eq!(parse_count("3").unwrap(), 3);
        assert_eq!(parse_count("1").unwrap(), 1);
    }

    #[test]
    fn rejects_non_numeric_count() {
        assert!(matches!(
            parse_count("lots"),
            Err(DeployError::InvalidCount(_))
        ));
        assert!(matches!(parse_count(""), Err(DeployError::InvalidCount(_))));
        assert!(matches!(
            parse_count("2.5"),
            Err(DeployError::InvalidCount(_))
        ));
    }

    #[test]
    fn rejects_non_positive_count() {
        assert!(matches!(parse_count("0"), Err(DeployError::InvalidCount(_))));
        assert!(matches!(
            parse_count("-4"),
            Err(DeployError::InvalidCount(_))
        ));
    }

    #[test]
    fn config_rejects_zero_count() {
        assert!(matches!(
            CampaignConfig::new(0, Duration::from_millis(10)),
            Err(DeployError::InvalidCount(_))
        ));
        let cfg = CampaignConfig::new(2, Duration::from_millis(10)).unwrap();
        assert_eq!(cfg.deploys_per_signer, 2);
    }

    #[test]
    fn fixed_count_source_passes_through() {
        assert_eq!(FixedCount(7).deploy_count().unwrap(), 7);
    }
}
