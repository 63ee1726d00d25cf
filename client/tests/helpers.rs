#![allow(dead_code)]

use prediction_market_client::{ClientConfig, ClientError, ClientResult, MarketClient};
use solana_private_prediction_market::errors::MarketError;
use solana_sdk::instruction::InstructionError;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signer};
use solana_sdk::transaction::TransactionError;

/// Client against the default localnet config, no signer
pub fn test_client() -> MarketClient {
    MarketClient::new(ClientConfig::default()).expect("default config is valid")
}

/// Client with a fresh, unfunded signer
pub fn test_client_with_signer() -> (MarketClient, Keypair) {
    let keypair = Keypair::new();
    let copy = Keypair::try_from(keypair.to_bytes().as_slice()).expect("valid keypair bytes");
    (test_client().with_keypair(copy), keypair)
}

/// Client for a running local validator, signing with the configured wallet
pub fn localnet_client() -> MarketClient {
    dotenv::dotenv().ok();
    let config = ClientConfig::from_env().expect("Failed to load client config");
    let keypair_path = config.keypair_path.clone();

    MarketClient::new(config)
        .expect("Failed to create client")
        .with_keypair_file(&keypair_path)
        .expect("Failed to load wallet keypair")
}

/// Question text no other test run has used
pub fn unique_question(tag: &str) -> String {
    format!("{} {}", tag, chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default())
}

/// Create a market closing `ends_in` seconds from now, signed by `client`
pub async fn create_test_market(client: &MarketClient, tag: &str, ends_in: i64) -> Pubkey {
    let end_time = chrono::Utc::now().timestamp() + ends_in;
    let (_, market) = client
        .create_market(&unique_question(tag), 1_000_000_000, end_time)
        .await
        .expect("create_market failed");
    market
}

/// Ensure the program config exists on the local validator
pub async fn ensure_initialized(client: &MarketClient) {
    if client.fetch_config().await.expect("Failed to read config").is_none() {
        client.initialize().await.expect("initialize failed");
    }
}

/// Second client with a fresh keypair funded from the faucet
pub async fn funded_stranger(client: &MarketClient) -> MarketClient {
    let keypair = Keypair::new();
    client
        .airdrop(&keypair.pubkey(), 2_000_000_000)
        .await
        .expect("airdrop failed");

    let config = ClientConfig::from_env().expect("Failed to load client config");
    MarketClient::new(config)
        .expect("Failed to create client")
        .with_keypair(keypair)
}

/// Custom error code carried by a failed transaction
pub fn custom_error_code(err: &ClientError) -> Option<u32> {
    match err {
        ClientError::Rpc(e) => match e.get_transaction_error() {
            Some(TransactionError::InstructionError(_, InstructionError::Custom(code))) => Some(code),
            _ => None,
        },
        _ => None,
    }
}

/// Assert the transaction failed with the given program error
pub fn assert_market_error<T>(result: ClientResult<T>, expected: MarketError) {
    match result {
        Ok(_) => panic!("expected {:?}, transaction succeeded", expected),
        Err(err) => assert_eq!(
            custom_error_code(&err),
            Some(u32::from(expected)),
            "expected {:?}, got {}",
            expected,
            err
        ),
    }
}
