use std::path::PathBuf;

use clap::Parser;

pub mod private_key;

pub use private_key::PrivateKey;
use reqwest::Url;

use crate::artifacts::ArtifactLayout;
use crate::explorer::SEPOLIA_ETHERSCAN;
use crate::forge_utils::ContractSpec;

#[derive(Debug, Clone, Parser)]
#[clap(rename_all = "kebab-case")]
pub struct Args {
    /// Private key to deploy with
    #[clap(short, long, env)]
    pub private_key: PrivateKey,

    /// The RPC Url of the target network
    #[clap(short, long, env)]
    pub rpc_url: Url,

    /// Contract to deploy, either `Name` or `path/to/Source.sol:Name`
    #[clap(short, long, env, default_value = "CreditScore")]
    pub contract: ContractSpec,

    /// Which compiler toolchain produced the artifacts
    ///
    /// `foundry` runs `forge build` first. Hardhat projects have to be
    /// compiled with `npx hardhat compile` before deploying.
    #[clap(long, env, default_value = "foundry")]
    pub artifact_layout: ArtifactLayout,

    /// Artifacts directory, relative to the project root
    ///
    /// Defaults to `out` for foundry and `artifacts` for hardhat
    #[clap(long, env)]
    pub artifacts_dir: Option<PathBuf>,

    /// Root of the contracts project
    #[clap(long, env, default_value = ".")]
    pub project_root: PathBuf,

    /// Don't run `forge build` before deploying
    #[clap(long, env)]
    pub skip_build: bool,

    /// Number of confirmations to wait for
    #[clap(long, env, default_value_t = 1)]
    pub confirmations: usize,

    /// Block explorer used to print the deployed address
    #[clap(long, env, default_value = SEPOLIA_ETHERSCAN)]
    pub explorer_url: Url,

    /// Write a yaml report of the deployment to this path
    #[clap(long, env)]
    pub report: Option<PathBuf>,
}

impl Args {
    pub fn artifacts_dir(&self) -> PathBuf {
        let dir = self
            .artifacts_dir
            .clone()
            .unwrap_or_else(|| self.artifact_layout.default_dir().into());

        self.project_root.join(dir)
    }

    pub fn should_build(&self) -> bool {
        !self.skip_build && self.artifact_layout == ArtifactLayout::Foundry
    }
}
