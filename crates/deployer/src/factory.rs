//! Contract factories: the capability to create a new instance of a compiled
//! contract on chain.
//!
//! The traits are the boundary between the deployment runner and the network
//! so the runner can be exercised with mocks. [`Node`] is the implementation
//! backed by an Ethereum JSON-RPC node.

use {
    crate::artifact::Artifacts,
    alloy::{
        network::{EthereumWallet, ReceiptResponse, TransactionBuilder},
        primitives::{Address, Bytes, TxHash},
        providers::{DynProvider, PendingTransactionBuilder, Provider, ProviderBuilder},
        rpc::types::TransactionRequest,
        signers::local::PrivateKeySigner,
    },
    anyhow::{Context, Result},
    std::time::Duration,
    url::Url,
};

/// Hands out contract factories by contract name.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ContractFactories: Send + Sync {
    /// Returns the factory for a bare (`DEX`) or fully qualified
    /// (`contracts/DEX.sol:DEX`) contract name.
    async fn contract_factory(&self, name: &str) -> Result<Box<dyn ContractFactory>>;
}

/// Deploys new instances of one contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ContractFactory: Send + Sync {
    /// Submits the creation transaction and returns its hash.
    async fn deploy(&self) -> Result<TxHash>;

    /// Suspends until the creation transaction is confirmed.
    async fn wait_for_deployment(&self, tx: TxHash) -> Result<Confirmation>;
}

/// What the receipt of a confirmed creation transaction tells us.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Confirmation {
    pub transaction_hash: TxHash,
    pub block_number: Option<u64>,
    /// `false` if the creation reverted.
    pub success: bool,
    pub contract_address: Option<Address>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationPolicy {
    /// Number of blocks (including the one with the transaction) to wait for.
    pub confirmations: u64,
    /// `None` waits forever.
    pub timeout: Option<Duration>,
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        Self {
            confirmations: 1,
            timeout: None,
        }
    }
}

/// Contract factories backed by a JSON-RPC node and a directory of compiled
/// artifacts.
pub struct Node {
    provider: DynProvider,
    artifacts: Artifacts,
    /// Local signer, if one is configured. Otherwise the node's first unlocked
    /// account signs.
    signer: Option<Address>,
    policy: ConfirmationPolicy,
}

impl Node {
    /// Sets up the provider. No requests are sent until a factory is
    /// requested.
    pub fn new(
        url: Url,
        signer: Option<PrivateKeySigner>,
        artifacts: Artifacts,
        policy: ConfirmationPolicy,
    ) -> Self {
        let (provider, signer) = match signer {
            Some(signer) => {
                let address = signer.address();
                let provider = ProviderBuilder::new()
                    .wallet(EthereumWallet::from(signer))
                    .connect_http(url)
                    .erased();
                (provider, Some(address))
            }
            None => (ProviderBuilder::new().connect_http(url).erased(), None),
        };
        Self {
            provider,
            artifacts,
            signer,
            policy,
        }
    }

    async fn deployer_account(&self) -> Result<Address> {
        if let Some(address) = self.signer {
            return Ok(address);
        }
        let accounts = self
            .provider
            .get_accounts()
            .await
            .context("failed to fetch accounts of the node")?;
        accounts
            .first()
            .copied()
            .context("node has no unlocked accounts, configure a private key")
    }
}

#[async_trait::async_trait]
impl ContractFactories for Node {
    async fn contract_factory(&self, name: &str) -> Result<Box<dyn ContractFactory>> {
        let artifact = self.artifacts.find(name)?;
        artifact.ensure_deployable()?;
        tracing::debug!(
            contract = %artifact.fully_qualified_name(),
            path = %artifact.path.display(),
            "loaded artifact"
        );

        let chain_id = self
            .provider
            .get_chain_id()
            .await
            .context("failed to connect to the node")?;
        let from = self.deployer_account().await?;
        tracing::info!(chain_id, %from, "resolved deployer account");

        Ok(Box::new(NodeFactory {
            provider: self.provider.clone(),
            bytecode: artifact.bytecode,
            from,
            policy: self.policy,
        }))
    }
}

struct NodeFactory {
    provider: DynProvider,
    bytecode: Bytes,
    from: Address,
    policy: ConfirmationPolicy,
}

#[async_trait::async_trait]
impl ContractFactory for NodeFactory {
    async fn deploy(&self) -> Result<TxHash> {
        let tx = TransactionRequest::default()
            .with_from(self.from)
            .with_deploy_code(self.bytecode.clone());
        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .context("node rejected the creation transaction")?;
        Ok(*pending.tx_hash())
    }

    async fn wait_for_deployment(&self, tx: TxHash) -> Result<Confirmation> {
        let receipt = PendingTransactionBuilder::new(self.provider.root().clone(), tx)
            .with_required_confirmations(self.policy.confirmations)
            .with_timeout(self.policy.timeout)
            .get_receipt()
            .await
            .context("failed to get receipt of the creation transaction")?;
        Ok(Confirmation {
            transaction_hash: receipt.transaction_hash(),
            block_number: receipt.block_number(),
            success: receipt.status(),
            contract_address: receipt.contract_address(),
        })
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::artifact::{
            self,
            tests::{STOP_INIT_CODE, artifact_json, write_artifact},
        },
        alloy::primitives::address,
        tempfile::TempDir,
    };

    // Nothing listens on the discard port, so any request fails fast.
    const UNREACHABLE_NODE: &str = "http://127.0.0.1:9";

    fn node(artifacts: &std::path::Path) -> Node {
        Node::new(
            UNREACHABLE_NODE.parse().unwrap(),
            None,
            Artifacts::new(artifacts),
            ConfirmationPolicy::default(),
        )
    }

    #[tokio::test]
    async fn unknown_contract_fails_before_contacting_the_node() {
        let dir = TempDir::new().unwrap();

        let err = node(dir.path())
            .contract_factory("DEX")
            .await
            .err()
            .unwrap();

        assert!(matches!(
            err.downcast_ref::<artifact::Error>(),
            Some(artifact::Error::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn abstract_contract_has_no_factory() {
        let dir = TempDir::new().unwrap();
        write_artifact(
            dir.path(),
            "contracts/IDEX.sol",
            artifact_json("IDEX", "contracts/IDEX.sol", "0x"),
        );

        let err = node(dir.path())
            .contract_factory("IDEX")
            .await
            .err()
            .unwrap();

        assert!(matches!(
            err.downcast_ref::<artifact::Error>(),
            Some(artifact::Error::Abstract(_))
        ));
    }

    #[tokio::test]
    async fn unreachable_node_fails_factory_acquisition() {
        let dir = TempDir::new().unwrap();
        write_artifact(
            dir.path(),
            "contracts/DEX.sol",
            artifact_json("DEX", "contracts/DEX.sol", STOP_INIT_CODE),
        );

        let err = node(dir.path())
            .contract_factory("DEX")
            .await
            .err()
            .unwrap();

        assert!(format!("{err:?}").contains("failed to connect to the node"));
    }

    #[tokio::test]
    async fn configured_signer_is_the_deployer() {
        // First development account of anvil and hardhat.
        let signer: PrivateKeySigner =
            "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"
                .parse()
                .unwrap();

        let node = Node::new(
            UNREACHABLE_NODE.parse().unwrap(),
            Some(signer),
            Artifacts::new("artifacts"),
            ConfirmationPolicy::default(),
        );

        assert_eq!(
            node.signer,
            Some(address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"))
        );
        assert_eq!(node.deployer_account().await.unwrap(), node.signer.unwrap());
    }
}
