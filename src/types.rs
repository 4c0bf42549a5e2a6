// src/types.rs
use alloy::json_abi::JsonAbi;
use alloy::primitives::{
    Address, Bytes, U256,
    utils::{format_ether, format_units},
};

/// ABI and creation bytecode for one contract, produced once at startup and
/// shared read-only by every deployment attempt.
#[derive(Debug, Clone)]
pub struct CompiledContract {
    pub name: String,
    pub abi: JsonAbi,
    pub bytecode: Bytes,
}

/// Informational gas snapshot taken before a deployment. Never gates the
/// deployment itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasEstimate {
    pub gas: u64,
    /// Network gas price in wei.
    pub gas_price: u128,
}

impl GasEstimate {
    pub fn new(gas: u64, gas_price: u128) -> Self {
        Self { gas, gas_price }
    }

    /// Estimated total cost in wei.
    pub fn cost(&self) -> U256 {
        U256::from(self.gas) * U256::from(self.gas_price)
    }

    /// Gas price formatted in gwei for console output.
    pub fn price_gwei(&self) -> String {
        format_units(U256::from(self.gas_price), "gwei")
            .unwrap_or_else(|_| self.gas_price.to_string())
    }

    /// Total cost formatted in the chain's native unit.
    pub fn cost_native(&self) -> String {
        format_ether(self.cost())
    }
}

/// Terminal outcome of a single attempt. Failures carry the underlying
/// reason as text; nothing is retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Deployed(Address),
    Failed(String),
}

impl AttemptOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, AttemptOutcome::Deployed(_))
    }
}

/// Record of one deployment attempt, created per loop iteration.
#[derive(Debug, Clone)]
pub struct DeploymentAttempt {
    pub signer: Address,
    /// Position of the signer in the configured set, zero-based.
    pub signer_index: usize,
    /// Attempt index for this signer, zero-based.
    pub sequence_index: u32,
    pub estimate: Option<GasEstimate>,
    pub outcome: AttemptOutcome,
    pub finished_at: chrono::DateTime<chrono::Utc>,
}

/// Everything that happened during a campaign, in execution order.
#[derive(Debug, Clone, Default)]
pub struct CampaignReport {
    pub attempts: Vec<DeploymentAttempt>,
}

impl CampaignReport {
    pub fn new(attempts: Vec<DeploymentAttempt>) -> Self {
        Self { attempts }
    }

    pub fn successes(&self) -> usize {
        self.attempts.iter().filter(|a| a.outcome.is_success()).count()
    }

    pub fn failures(&self) -> usize {
        self.attempts.len() - self.successes()
    }

    pub fn total_attempts(&self) -> usize {
        self.attempts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gas_estimate_cost_is_price_times_gas() {
        let est = GasEstimate::new(21_000, 2_000_000_000);
        assert_eq!(est.cost(), U256::from(42_000_000_000_000u64));
    }

    #[test]
    fn gas_estimate_formats_units() {
        let est = GasEstimate::new(1_000_000, 1_500_000_000);
        assert_eq!(est.price_gwei(), "1.500000000");
        // 1e6 gas * 1.5 gwei = 0.0015 ether
        assert_eq!(est.cost_native(), "0.001500000000000000");
    }

    #[test]
    fn report_counts_outcomes() {
        let ok = DeploymentAttempt {
            signer: Address::repeat_byte(1),
            signer_index: 0,
            sequence_index: 0,
            estimate: None,
            outcome: AttemptOutcome::Deployed(Address::repeat_byte(2)),
            finished_at: chrono::Utc::now(),
        };
        let mut failed = ok.clone();
        failed.sequence_index = 1;
        failed.outcome = AttemptOutcome::Failed("boom".into());

        let report = CampaignReport::new(vec![ok, failed]);
        assert_eq!(report.total_attempts(), 2);
        assert_eq!(report.successes(), 1);
        assert_eq!(report.failures(), 1);
    }
}
