// src/main.rs
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;
use url::Url;

use deploy_blitz::campaign::Campaign;
use deploy_blitz::chain::RpcChain;
use deploy_blitz::compiler::compile_source;
use deploy_blitz::config::{
    CampaignConfig, CountSource, DEFAULT_DELAY_MS, FixedCount, InteractiveCount, resolve_rpc_url,
};
use deploy_blitz::signers::SignerSet;
use deploy_blitz::sink::DeploymentLog;

#[derive(Debug, Parser)]
#[command(
    name = "deploy-blitz",
    about = "Compile a Solidity contract once and deploy it repeatedly across funded accounts"
)]
struct Cli {
    /// Path to the Solidity source file
    source: PathBuf,

    /// Contract name to deploy (inferred when the source defines exactly one)
    #[arg(long)]
    contract: Option<String>,

    /// File of newline-separated private keys (falls back to $PRIVATE_KEY)
    #[arg(long, default_value = "private_keys.txt")]
    keys_file: PathBuf,

    /// JSON-RPC endpoint (falls back to $RPC_URL)
    #[arg(long)]
    rpc_url: Option<Url>,

    /// Deployments per account (prompts interactively when omitted)
    #[arg(long)]
    count: Option<u32>,

    /// Pause between deployments, in milliseconds
    #[arg(long, default_value_t = DEFAULT_DELAY_MS)]
    delay_ms: u64,

    /// File that records successful deployments
    #[arg(long, default_value = "deployed_contracts.txt")]
    out_file: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let contract = compile_source(&cli.source, cli.contract.as_deref())
        .with_context(|| format!("compiling {}", cli.source.display()))?;
    info!(
        contract = %contract.name,
        bytecode_bytes = contract.bytecode.len(),
        "contract compiled"
    );

    let signers = SignerSet::load(&cli.keys_file).context("loading signers")?;
    info!(signers = signers.len(), "signer set loaded");

    let rpc_url = resolve_rpc_url(cli.rpc_url.clone())?;
    let chain = RpcChain::connect(rpc_url.clone(), &signers).context("connecting provider")?;

    let count_source: Box<dyn CountSource> = match cli.count {
        Some(count) => Box::new(FixedCount(count)),
        None => Box::new(InteractiveCount),
    };
    let config = CampaignConfig::new(
        count_source.deploy_count()?,
        Duration::from_millis(cli.delay_ms),
    )?;

    let log = DeploymentLog::open(&cli.out_file).context("opening result log")?;

    println!(
        "Deploying {} x{} from {} account(s) via {rpc_url}",
        contract.name,
        config.deploys_per_signer,
        signers.len()
    );

    let report = Campaign::new(&chain, &contract, &log, config)
        .run(&signers.addresses())
        .await?;

    println!(
        "Campaign finished: {} deployed, {} failed ({} attempts). Results in {}",
        report.successes(),
        report.failures(),
        report.total_attempts(),
        log.path().display()
    );
    Ok(())
}
