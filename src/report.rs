use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::explorer::Explorer;
use crate::forge_utils::ContractSpec;
use crate::serde_utils;
use crate::types::ChainId;

pub mod contract_deployment;

pub use self::contract_deployment::ContractDeployment;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeploymentReport {
    pub contract: String,
    pub chain_id: ChainId,
    pub explorer_url: String,
    pub deployment: ContractDeployment,
}

impl DeploymentReport {
    pub fn new(
        contract: &ContractSpec,
        chain_id: ChainId,
        deployment: &ContractDeployment,
        explorer: &Explorer,
    ) -> Self {
        Self {
            contract: contract.to_string(),
            chain_id,
            explorer_url: explorer.address_url(deployment.address),
            deployment: deployment.clone(),
        }
    }

    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub async fn write(&self, path: impl AsRef<Path>) -> eyre::Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        serde_utils::write_serialize(path, self).await?;

        info!("Report written");

        Ok(())
    }
}
