// src/chain.rs
use crate::error::{DeployError, DeployResult};
use crate::signers::SignerSet;
use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;
use tracing::debug;
use url::Url;

/// The campaign loop's view of the network. One implementation talks
/// JSON-RPC; tests substitute a deterministic stub.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Current network gas price, in wei.
    async fn gas_price(&self) -> DeployResult<u128>;

    /// Gas required to deploy `bytecode` from `from`.
    async fn estimate_deploy_gas(&self, from: Address, bytecode: &Bytes) -> DeployResult<u64>;

    /// Submit a CREATE transaction signed by `from`, wait for the receipt,
    /// and return the deployed contract address.
    async fn deploy(&self, from: Address, bytecode: &Bytes) -> DeployResult<Address>;
}

/// JSON-RPC chain connection. A single HTTP provider carries every signer's
/// wallet, so the transaction's `from` field picks the credential.
#[derive(Debug, Clone)]
pub struct RpcChain {
    provider: DynProvider,
}

impl RpcChain {
    pub fn connect(url: Url, signers: &SignerSet) -> DeployResult<Self> {
        let mut iter = signers.signers().iter();
        let first = iter.next().ok_or(DeployError::NoSigners)?.clone();
        let mut wallet = EthereumWallet::new(first);
        for signer in iter {
            wallet.register_signer(signer.clone());
        }

        debug!(%url, signers = signers.len(), "connecting provider");
        let provider = ProviderBuilder::new()
            .wallet(wallet)
            .connect_http(url)
            .erased();
        Ok(Self { provider })
    }

    fn deploy_request(from: Address, bytecode: &Bytes) -> TransactionRequest {
        TransactionRequest::default()
            .with_from(from)
            .with_deploy_code(bytecode.clone())
    }
}

#[async_trait]
impl ChainClient for RpcChain {
    async fn gas_price(&self) -> DeployResult<u128> {
        self.provider
            .get_gas_price()
            .await
            .map_err(|e| DeployError::Rpc(e.to_string()))
    }

    async fn estimate_deploy_gas(&self, from: Address, bytecode: &Bytes) -> DeployResult<u64> {
        self.provider
            .estimate_gas(Self::deploy_request(from, bytecode))
            .await
            .map_err(|e| DeployError::GasEstimation(e.to_string()))
    }

    async fn deploy(&self, from: Address, bytecode: &Bytes) -> DeployResult<Address> {
        let pending = self
            .provider
            .send_transaction(Self::deploy_request(from, bytecode))
            .await
            .map_err(|e| DeployError::Transaction(e.to_string()))?;
        let tx_hash = *pending.tx_hash();
        debug!(%tx_hash, %from, "deployment transaction submitted");

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| DeployError::Confirmation(e.to_string()))?;
        receipt
            .contract_address
            .ok_or_else(|| DeployError::Confirmation("receipt has no contract address".to_string()))
    }
}
