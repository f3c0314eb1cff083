use anyhow::Context;
use clap::Parser;
use deployment::{DeploymentModule, DeploymentParams, Network, NetworkConfig, MODULE_ID};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Prints the ordered deployment plan of the upgradeable TestERC20 token.
#[derive(Debug, Parser)]
#[command(name = "plan-deployment", version)]
struct Args {
    /// Target network; anything but `mainnet` deploys with development accounts.
    #[arg(long, default_value = "local")]
    network: String,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let network = Network::from_name(&args.network);

    let config = NetworkConfig::from_env(network).context("resolving network settings")?;
    let params = DeploymentParams::from_env(network).context("resolving role holders")?;
    info!(
        network = %args.network,
        endpoint = %config.endpoint,
        signer = config.signer().is_some(),
        "deployment target resolved"
    );

    let module = DeploymentModule::new(params);
    println!("{MODULE_ID} ({})", config.endpoint);
    for (index, step) in module.steps().iter().enumerate() {
        println!("{:>2}. {step}", index + 1);
    }
    Ok(())
}
