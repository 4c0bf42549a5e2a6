// src/campaign.rs
//
// The deployment campaign loop: a bounded, paced sequence of deployments
// across the signer set. One failure-isolation boundary per attempt;
// nothing here retries.
use crate::chain::ChainClient;
use crate::config::CampaignConfig;
use crate::error::{DeployError, DeployResult};
use crate::sink::DeploymentLog;
use crate::types::{
    AttemptOutcome, CampaignReport, CompiledContract, DeploymentAttempt, GasEstimate,
};
use alloy::primitives::Address;
use tokio::time::sleep;
use tracing::{debug, error, info};

pub struct Campaign<'a> {
    chain: &'a dyn ChainClient,
    contract: &'a CompiledContract,
    log: &'a DeploymentLog,
    config: CampaignConfig,
}

impl<'a> Campaign<'a> {
    pub fn new(
        chain: &'a dyn ChainClient,
        contract: &'a CompiledContract,
        log: &'a DeploymentLog,
        config: CampaignConfig,
    ) -> Self {
        Self {
            chain,
            contract,
            log,
            config,
        }
    }

    /// Run the whole campaign: every signer in order, `deploys_per_signer`
    /// attempts each, pacing between attempts. Per-attempt errors are
    /// recorded and never abort the run.
    pub async fn run(&self, signers: &[Address]) -> DeployResult<CampaignReport> {
        if signers.is_empty() {
            return Err(DeployError::NoSigners);
        }

        let total = signers.len() as u64 * u64::from(self.config.deploys_per_signer);
        info!(
            signers = signers.len(),
            per_signer = self.config.deploys_per_signer,
            total,
            contract = %self.contract.name,
            "starting deployment campaign"
        );

        let mut attempts = Vec::with_capacity(total as usize);
        let mut executed = 0u64;
        for (signer_index, &signer) in signers.iter().enumerate() {
            for sequence_index in 0..self.config.deploys_per_signer {
                executed += 1;
                info!(
                    account = signer_index + 1,
                    attempt = executed,
                    total,
                    %signer,
                    "deploying contract"
                );

                let attempt = self.run_attempt(signer, signer_index, sequence_index).await;
                match &attempt.outcome {
                    AttemptOutcome::Deployed(address) => {
                        info!(%address, attempt = executed, "contract deployed");
                    }
                    AttemptOutcome::Failed(reason) => {
                        error!(%signer, attempt = executed, %reason, "deployment failed");
                    }
                }
                attempts.push(attempt);

                // Pace every attempt except the last one overall.
                if executed < total {
                    debug!(
                        delay_ms = self.config.inter_attempt_delay.as_millis() as u64,
                        "waiting before next deployment"
                    );
                    sleep(self.config.inter_attempt_delay).await;
                }
            }
        }

        let report = CampaignReport::new(attempts);
        info!(
            deployed = report.successes(),
            failed = report.failures(),
            "campaign finished"
        );
        Ok(report)
    }

    async fn run_attempt(
        &self,
        signer: Address,
        signer_index: usize,
        sequence_index: u32,
    ) -> DeploymentAttempt {
        let mut estimate = None;
        let outcome = match self.attempt_inner(signer, &mut estimate).await {
            Ok(address) => AttemptOutcome::Deployed(address),
            Err(e) => AttemptOutcome::Failed(e.to_string()),
        };
        DeploymentAttempt {
            signer,
            signer_index,
            sequence_index,
            estimate,
            outcome,
            finished_at: chrono::Utc::now(),
        }
    }

    /// Everything that can fail inside one attempt. The caller converts the
    /// error into a recorded failure, so nothing unwinds past the attempt.
    async fn attempt_inner(
        &self,
        signer: Address,
        estimate_slot: &mut Option<GasEstimate>,
    ) -> DeployResult<Address> {
        let gas_price = self.chain.gas_price().await?;
        let gas = self
            .chain
            .estimate_deploy_gas(signer, &self.contract.bytecode)
            .await?;
        let estimate = GasEstimate::new(gas, gas_price);
        info!(
            gas,
            gas_price_gwei = %estimate.price_gwei(),
            cost = %estimate.cost_native(),
            "gas estimate"
        );
        *estimate_slot = Some(estimate);

        let address = self.chain.deploy(signer, &self.contract.bytecode).await?;
        self.log.append(signer, address)?;
        Ok(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::Bytes;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Deterministic stand-in for the RPC provider. Deploy call `i` yields
    /// address `repeat_byte(i + 1)`; selected calls can be scripted to fail.
    struct MockChain {
        deploys: Mutex<Vec<Address>>,
        fail_deploys: HashSet<usize>,
        fail_estimates: HashSet<usize>,
        estimates: Mutex<usize>,
    }

    impl MockChain {
        fn new() -> Self {
            Self {
                deploys: Mutex::new(Vec::new()),
                fail_deploys: HashSet::new(),
                fail_estimates: HashSet::new(),
                estimates: Mutex::new(0),
            }
        }

        fn failing_deploys(indices: &[usize]) -> Self {
            let mut chain = Self::new();
            chain.fail_deploys = indices.iter().copied().collect();
            chain
        }

        fn failing_estimates(indices: &[usize]) -> Self {
            let mut chain = Self::new();
            chain.fail_estimates = indices.iter().copied().collect();
            chain
        }

        fn deploy_order(&self) -> Vec<Address> {
            self.deploys.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChainClient for MockChain {
        async fn gas_price(&self) -> DeployResult<u128> {
            Ok(1_000_000_000)
        }

        async fn estimate_deploy_gas(
            &self,
            _from: Address,
            _bytecode: &Bytes,
        ) -> DeployResult<u64> {
            let mut count = self.estimates.lock().unwrap();
            let idx = *count;
            *count += 1;
            if self.fail_estimates.contains(&idx) {
                return Err(DeployError::GasEstimation("execution reverted".into()));
            }
            Ok(210_000)
        }

        async fn deploy(&self, from: Address, _bytecode: &Bytes) -> DeployResult<Address> {
            let mut deploys = self.deploys.lock().unwrap();
            let idx = deploys.len();
            deploys.push(from);
            if self.fail_deploys.contains(&idx) {
                return Err(DeployError::Transaction("insufficient funds".into()));
            }
            Ok(Address::repeat_byte(idx as u8 + 1))
        }
    }

    fn test_contract() -> CompiledContract {
        CompiledContract {
            name: "Gmonad".to_string(),
            abi: Default::default(),
            bytecode: Bytes::from(vec![0x60, 0x80]),
        }
    }

    fn fast_config(deploys_per_signer: u32) -> CampaignConfig {
        CampaignConfig::new(deploys_per_signer, Duration::ZERO).unwrap()
    }

    fn test_log() -> (tempfile::TempDir, DeploymentLog) {
        let dir = tempfile::tempdir().unwrap();
        let log = DeploymentLog::open(&dir.path().join("deployed.txt")).unwrap();
        (dir, log)
    }

    const SIGNER_A: Address = Address::repeat_byte(0xAA);
    const SIGNER_B: Address = Address::repeat_byte(0xBB);

    #[tokio::test]
    async fn two_signers_two_deploys_each() {
        let chain = MockChain::new();
        let contract = test_contract();
        let (_dir, log) = test_log();
        let campaign = Campaign::new(&chain, &contract, &log, fast_config(2));

        let report = campaign.run(&[SIGNER_A, SIGNER_B]).await.unwrap();

        assert_eq!(report.total_attempts(), 4);
        assert_eq!(report.successes(), 4);
        assert_eq!(report.failures(), 0);

        // Signer-major, attempt-minor order.
        assert_eq!(
            chain.deploy_order(),
            vec![SIGNER_A, SIGNER_A, SIGNER_B, SIGNER_B]
        );

        let recorded = log.read_back().unwrap();
        assert_eq!(recorded.len(), 4);
        assert_eq!(recorded[0], (SIGNER_A, Address::repeat_byte(1)));
        assert_eq!(recorded[1], (SIGNER_A, Address::repeat_byte(2)));
        assert_eq!(recorded[2], (SIGNER_B, Address::repeat_byte(3)));
        assert_eq!(recorded[3], (SIGNER_B, Address::repeat_byte(4)));
    }

    #[tokio::test]
    async fn failure_does_not_stop_the_campaign() {
        // Second deploy (signer A's second attempt) fails.
        let chain = MockChain::failing_deploys(&[1]);
        let contract = test_contract();
        let (_dir, log) = test_log();
        let campaign = Campaign::new(&chain, &contract, &log, fast_config(2));

        let report = campaign.run(&[SIGNER_A, SIGNER_B]).await.unwrap();

        assert_eq!(report.total_attempts(), 4);
        assert_eq!(report.successes(), 3);
        assert_eq!(report.failures(), 1);
        assert!(matches!(
            report.attempts[1].outcome,
            AttemptOutcome::Failed(_)
        ));

        // All four attempts still reached the chain, in order.
        assert_eq!(
            chain.deploy_order(),
            vec![SIGNER_A, SIGNER_A, SIGNER_B, SIGNER_B]
        );
        // Only successes land in the result log.
        assert_eq!(log.read_back().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn estimation_failure_fails_only_that_attempt() {
        let chain = MockChain::failing_estimates(&[0]);
        let contract = test_contract();
        let (_dir, log) = test_log();
        let campaign = Campaign::new(&chain, &contract, &log, fast_config(1));

        let report = campaign.run(&[SIGNER_A, SIGNER_B]).await.unwrap();

        assert_eq!(report.total_attempts(), 2);
        assert_eq!(report.successes(), 1);
        assert_eq!(report.failures(), 1);
        // The failed attempt never reached deploy, and carries no estimate.
        assert!(report.attempts[0].estimate.is_none());
        assert_eq!(chain.deploy_order(), vec![SIGNER_B]);
    }

    #[tokio::test]
    async fn successful_attempts_carry_estimates() {
        let chain = MockChain::new();
        let contract = test_contract();
        let (_dir, log) = test_log();
        let campaign = Campaign::new(&chain, &contract, &log, fast_config(1));

        let report = campaign.run(&[SIGNER_A]).await.unwrap();
        let estimate = report.attempts[0].estimate.unwrap();
        assert_eq!(estimate.gas, 210_000);
        assert_eq!(estimate.gas_price, 1_000_000_000);
    }

    #[tokio::test]
    async fn empty_signer_list_is_fatal() {
        let chain = MockChain::new();
        let contract = test_contract();
        let (_dir, log) = test_log();
        let campaign = Campaign::new(&chain, &contract, &log, fast_config(1));

        assert!(matches!(
            campaign.run(&[]).await,
            Err(DeployError::NoSigners)
        ));
        assert!(chain.deploy_order().is_empty());
    }

    #[tokio::test]
    async fn attempt_count_matches_signers_times_count() {
        let chain = MockChain::new();
        let contract = test_contract();
        let (_dir, log) = test_log();
        let campaign = Campaign::new(&chain, &contract, &log, fast_config(3));

        let signers = [SIGNER_A, SIGNER_B, Address::repeat_byte(0xCC)];
        let report = campaign.run(&signers).await.unwrap();
        assert_eq!(report.total_attempts(), 9);
        assert_eq!(report.successes() + report.failures(), 9);
    }
}
