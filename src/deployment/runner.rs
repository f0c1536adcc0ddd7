use std::io::Write;

use ethers::utils::to_checksum;
use eyre::WrapErr;
use tracing::{error, info, instrument};

use super::{Deployer, DeploymentHandle};
use crate::explorer::Explorer;
use crate::forge_utils::ContractSpec;
use crate::report::ContractDeployment;

/// Deploys `contract` once and prints where it landed.
///
/// Nothing is written to `out` unless the deployment is confirmed.
#[instrument(name = "deploy", skip_all, fields(contract = %contract))]
pub async fn run<D, W>(
    deployer: &D,
    contract: &ContractSpec,
    explorer: &Explorer,
    out: &mut W,
) -> eyre::Result<ContractDeployment>
where
    D: Deployer,
    W: Write,
{
    let handle = deployer
        .request_deployment(contract)
        .await
        .wrap_err_with(|| format!("Requesting deployment of {contract}"))?;

    let tx_hash = handle.transaction_hash();
    info!("Deployment submitted in {tx_hash:?}");

    let deployment = handle
        .wait_for_deployment()
        .await
        .wrap_err_with(|| format!("Awaiting confirmation of {tx_hash:?}"))?;

    writeln!(
        out,
        "{} contract deployed to {}",
        contract.name,
        explorer.address_url(deployment.address)
    )?;
    writeln!(
        out,
        "Contract address: {}",
        to_checksum(&deployment.address, None)
    )?;

    Ok(deployment)
}

/// Maps the outcome of a deployment to the process exit status, writing the
/// error report to `err_out` on failure
pub fn exit_status<T, W>(result: eyre::Result<T>, err_out: &mut W) -> i32
where
    W: Write,
{
    match result {
        Ok(_) => 0,
        Err(err) => {
            error!("Deployment failed: {err}");

            // The report must reach stderr even when logging is filtered out
            let _ = writeln!(err_out, "{err:?}");

            1
        }
    }
}
