//! Deployment payload and submission against a mock node.

mod common;

use alloy::primitives::{address, TxKind, U256};

use common::MockClient;
use scui::cli::commands::{prepare_deployment, send_deployment};
use scui::cli::GasSettings;
use scui::signer::SignerHandle;
use scui::InterfaceSchema;

const DEV_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

const OWNED_ABI: &str = r#"[
    {"type":"constructor","stateMutability":"payable","inputs":[
        {"name":"owner","type":"address"},
        {"name":"limits","type":"uint64[]"}]}
]"#;

#[tokio::test]
async fn test_deployment_uses_gas_settings_and_derives_address() {
    let schema = InterfaceSchema::from_json(OWNED_ABI).unwrap();
    let data = prepare_deployment(
        "0x6080604052",
        &schema,
        &[
            "0x70997970C51812dc3A010C7d01b50e0d17dc79C8".to_string(),
            "[1, \"0x10\"]".to_string(),
        ],
    )
    .unwrap();
    assert_eq!(&data[..5], &[0x60, 0x80, 0x60, 0x40, 0x52]);

    let client = MockClient::new();
    let signer = SignerHandle::Keyed(DEV_KEY.parse().unwrap());
    let gas = GasSettings {
        gas_price: Some(7),
        gas_limit: None,
        value: Some(U256::from(5u64)),
    };

    let (created, hash) = send_deployment(client.as_ref(), &signer, 31337, data.clone(), gas)
        .await
        .unwrap();

    assert_eq!(created, address!("5FbDB2315678afecb367f032d93F642f64180aa3"));
    assert!(!hash.is_zero());
    let sent = client.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, TxKind::Create);
    assert_eq!(sent[0].data, data);
    assert_eq!(sent[0].gas_price, Some(7));
    assert_eq!(sent[0].gas_limit, None);
    assert_eq!(sent[0].value, Some(U256::from(5u64)));
}

#[tokio::test]
async fn test_deployment_requires_signer() {
    let client = MockClient::new();
    let err = send_deployment(
        client.as_ref(),
        &SignerHandle::None,
        1,
        vec![0x60].into(),
        GasSettings::default(),
    )
    .await
    .unwrap_err();

    assert_eq!(err.exit_code(), -2);
    assert!(client.sent().is_empty());
}
