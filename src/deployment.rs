use async_trait::async_trait;
use ethers::types::TxHash;
use tracing::{info, warn};

use crate::artifacts::ArtifactStore;
use crate::cli::Args;
use crate::ethers_utils::EthersDeployer;
use crate::explorer::{Explorer, SEPOLIA_ETHERSCAN};
use crate::forge_utils::{ContractSpec, ForgeBuild};
use crate::report::{ContractDeployment, DeploymentReport};
use crate::types::SEPOLIA;

pub mod runner;

/// Submits contract creation transactions to a network
#[async_trait]
pub trait Deployer: Send + Sync {
    type Handle: DeploymentHandle;

    /// Resolves the contract and submits its deployment, without waiting for
    /// it to be mined
    async fn request_deployment(
        &self,
        contract: &ContractSpec,
    ) -> eyre::Result<Self::Handle>;
}

/// A submitted deployment
#[async_trait]
pub trait DeploymentHandle: Send {
    fn transaction_hash(&self) -> TxHash;

    async fn wait_for_deployment(self) -> eyre::Result<ContractDeployment>;
}

pub async fn run_deployment(args: Args) -> eyre::Result<()> {
    if args.should_build() {
        let mut forge_build = ForgeBuild::new().with_cwd(&args.project_root);

        if let Some(out_dir) = args.artifacts_dir.as_ref() {
            forge_build = forge_build.with_out_dir(out_dir);
        }

        forge_build.run().await?;
    } else {
        info!("Skipping compilation of {} artifacts", args.artifact_layout);
    }

    let artifacts =
        ArtifactStore::new(args.artifact_layout, args.artifacts_dir());

    let deployer =
        EthersDeployer::connect(&args.rpc_url, &args.private_key, artifacts)
            .await?
            .with_confirmations(args.confirmations);

    let default_explorer = args.explorer_url.as_str().trim_end_matches('/')
        == SEPOLIA_ETHERSCAN;
    if default_explorer && deployer.chain_id() != SEPOLIA {
        warn!(
            "Connected to chain {} but explorer links point at Sepolia",
            deployer.chain_id()
        );
    }

    let explorer = Explorer::new(args.explorer_url);

    let deployment = runner::run(
        &deployer,
        &args.contract,
        &explorer,
        &mut std::io::stdout(),
    )
    .await?;

    if let Some(report_path) = args.report.as_ref() {
        DeploymentReport::new(
            &args.contract,
            deployer.chain_id(),
            &deployment,
            &explorer,
        )
        .write(report_path)
        .await?;
    }

    Ok(())
}
