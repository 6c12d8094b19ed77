//! Deployments against a development node (anvil or `hardhat node`) listening
//! on `localhost:8545` with unlocked accounts.

use {
    deployer::{
        artifact::Artifacts,
        factory::{ConfirmationPolicy, Node},
        runner,
    },
    serde_json::json,
    std::{fs, path::Path, time::Duration},
    tempfile::TempDir,
};

const NODE_URL: &str = "http://localhost:8545";

/// Init code of a contract whose runtime code is a single `STOP`.
const STOP_INIT_CODE: &str = "0x60016000f3";

fn write_dex_artifact(root: &Path) {
    let dir = root.join("contracts/DEX.sol");
    fs::create_dir_all(&dir).unwrap();
    let artifact = json!({
        "_format": "hh-sol-artifact-1",
        "contractName": "DEX",
        "sourceName": "contracts/DEX.sol",
        "abi": [],
        "bytecode": STOP_INIT_CODE,
        "deployedBytecode": "0x00",
        "linkReferences": {},
        "deployedLinkReferences": {}
    });
    fs::write(dir.join("DEX.json"), artifact.to_string()).unwrap();
}

fn node(artifacts: &Path) -> Node {
    Node::new(
        NODE_URL.parse().unwrap(),
        None,
        Artifacts::new(artifacts),
        ConfirmationPolicy {
            confirmations: 1,
            timeout: Some(Duration::from_secs(30)),
        },
    )
}

#[tokio::test]
#[ignore]
async fn local_node_deploys_contract() {
    let dir = TempDir::new().unwrap();
    write_dex_artifact(dir.path());
    let node = node(dir.path());

    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let first = runner::run(&node, "DEX", &mut stdout, &mut stderr)
        .await
        .unwrap();

    let stdout = String::from_utf8(stdout).unwrap();
    assert!(stdout.contains(&format!("DEX deployed to: {}", first.address)));
    assert!(stderr.is_empty());
    assert!(first.block_number.is_some());

    // Every run is an independent deployment.
    let second = runner::run(&node, "DEX", &mut Vec::new(), &mut Vec::new())
        .await
        .unwrap();
    assert_ne!(first.address, second.address);
}

#[tokio::test]
#[ignore]
async fn local_node_unknown_contract() {
    let dir = TempDir::new().unwrap();
    write_dex_artifact(dir.path());
    let node = node(dir.path());

    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let result = runner::run(&node, "Token", &mut stdout, &mut stderr).await;

    assert!(result.is_err());
    assert!(!String::from_utf8(stdout).unwrap().contains("deployed to"));
    assert!(String::from_utf8(stderr).unwrap().contains("not found"));
}
