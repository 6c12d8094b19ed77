use {
    crate::factory::ContractFactories,
    alloy::primitives::{Address, TxHash},
    anyhow::{Context, Result, ensure},
    std::io::Write,
};

/// A contract instance whose creation has been confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    pub contract: String,
    pub address: Address,
    pub transaction_hash: TxHash,
    pub block_number: Option<u64>,
}

/// Deploys `name` and reports the outcome: progress and the deployed address
/// go to `stdout`, the full error chain to `stderr`.
///
/// The returned error has already been reported. Deployments are either fully
/// confirmed or treated as failed; nothing is retried or rolled back.
pub async fn run(
    factories: &dyn ContractFactories,
    name: &str,
    stdout: &mut dyn Write,
    stderr: &mut dyn Write,
) -> Result<Deployment> {
    let result = deploy(factories, name, stdout).await;
    match &result {
        Ok(deployment) => tracing::debug!(?deployment, "deployment finished"),
        Err(err) => {
            if let Err(write_err) = writeln!(stderr, "{err:?}") {
                tracing::error!(?err, ?write_err, "failed to report deployment failure");
            }
        }
    }
    result
}

async fn deploy(
    factories: &dyn ContractFactories,
    name: &str,
    stdout: &mut dyn Write,
) -> Result<Deployment> {
    let contract = display_name(name);
    writeln!(stdout, "Deploying {contract} contract...")?;

    let factory = factories
        .contract_factory(name)
        .await
        .with_context(|| format!("failed to get contract factory for {name}"))?;

    let tx = factory
        .deploy()
        .await
        .with_context(|| format!("failed to deploy {name}"))?;
    tracing::info!(%tx, "submitted creation transaction");

    let confirmation = factory
        .wait_for_deployment(tx)
        .await
        .with_context(|| format!("failed to confirm deployment of {name} in {tx}"))?;
    tracing::info!(
        block = ?confirmation.block_number,
        "creation transaction confirmed"
    );
    ensure!(confirmation.success, "creation transaction {tx} reverted");
    let address = confirmation
        .contract_address
        .with_context(|| format!("receipt of {tx} has no contract address"))?;

    writeln!(stdout, "{contract} deployed to: {address}")?;
    Ok(Deployment {
        contract: contract.to_owned(),
        address,
        transaction_hash: confirmation.transaction_hash,
        block_number: confirmation.block_number,
    })
}

/// `contracts/DEX.sol:DEX` is reported as `DEX`.
fn display_name(name: &str) -> &str {
    name.rsplit_once(':')
        .map(|(_, contract)| contract)
        .unwrap_or(name)
}
