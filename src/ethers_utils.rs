use std::sync::Arc;

use async_trait::async_trait;
use ethers::prelude::SignerMiddleware;
use ethers::providers::{Http, Middleware, PendingTransaction, Provider};
use ethers::signers::{LocalWallet, Signer, Wallet};
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, Eip1559TransactionRequest, TxHash};
use eyre::{bail, Context, ContextCompat};
use reqwest::Url;
use tracing::{info, instrument};

use crate::artifacts::ArtifactStore;
use crate::cli::PrivateKey;
use crate::deployment::{Deployer, DeploymentHandle};
use crate::forge_utils::ContractSpec;
use crate::report::ContractDeployment;
use crate::types::ChainId;

// TODO: Allow for different wallet kinds
pub type RpcSigner = SignerMiddleware<Provider<Http>, LocalWallet>;

/// Deploys compiled artifacts through a JSON-RPC endpoint, signing locally
#[derive(Debug)]
pub struct EthersDeployer {
    signer: Arc<RpcSigner>,
    artifacts: ArtifactStore,
    chain_id: ChainId,
    confirmations: usize,
}

impl EthersDeployer {
    #[instrument(name = "connect", skip_all, fields(rpc_url = %rpc_url))]
    pub async fn connect(
        rpc_url: &Url,
        private_key: &PrivateKey,
        artifacts: ArtifactStore,
    ) -> eyre::Result<Self> {
        let provider = Provider::try_from(rpc_url.as_str())?;
        let chain_id = provider
            .get_chainid()
            .await
            .context("Fetching chain id")?;

        let wallet = Wallet::from(private_key.key.clone())
            .with_chain_id(chain_id.as_u64());

        info!(
            "Deploying with key {private_key} from {:?} on chain {chain_id}",
            wallet.address()
        );

        let signer = SignerMiddleware::new(provider, wallet);

        Ok(Self {
            signer: Arc::new(signer),
            artifacts,
            chain_id: ChainId(chain_id.as_u64()),
            confirmations: 1,
        })
    }

    pub fn with_confirmations(mut self, confirmations: usize) -> Self {
        self.confirmations = confirmations;
        self
    }

    pub fn chain_id(&self) -> ChainId {
        self.chain_id
    }
}

#[async_trait]
impl Deployer for EthersDeployer {
    type Handle = PendingDeployment;

    async fn request_deployment(
        &self,
        contract: &ContractSpec,
    ) -> eyre::Result<PendingDeployment> {
        let artifact = self.artifacts.load(contract).await?;
        let creation_code = artifact.creation_code()?;

        // No recipient makes this a contract creation
        let tx = TypedTransaction::Eip1559(
            Eip1559TransactionRequest::new().data(creation_code),
        );

        let pending = self
            .signer
            .send_transaction(tx, None)
            .await
            .context("Send transaction")?;

        Ok(PendingDeployment {
            signer: self.signer.clone(),
            tx_hash: *pending,
            confirmations: self.confirmations,
        })
    }
}

#[derive(Debug)]
pub struct PendingDeployment {
    signer: Arc<RpcSigner>,
    tx_hash: TxHash,
    confirmations: usize,
}

#[async_trait]
impl DeploymentHandle for PendingDeployment {
    fn transaction_hash(&self) -> TxHash {
        self.tx_hash
    }

    async fn wait_for_deployment(self) -> eyre::Result<ContractDeployment> {
        let receipt =
            PendingTransaction::new(self.tx_hash, self.signer.provider())
                .confirmations(self.confirmations)
                .await
                .context("Awaiting receipt")?
                .context("Transaction dropped from the mempool")?;

        if receipt.status != Some(1.into()) {
            bail!("Deployment transaction {:?} reverted", self.tx_hash);
        }

        let address: Address = receipt
            .contract_address
            .context("Receipt carries no contract address")?;

        Ok(ContractDeployment {
            address,
            deployer: receipt.from,
            transaction_hash: self.tx_hash,
        })
    }
}
