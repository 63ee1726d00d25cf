//! Prediction market client
//!
//! Builds, signs and sends instructions for the `solana_private_prediction_market`
//! program and decodes its accounts for display.

pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod solana_client;

// Re-export commonly used types
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use self::solana_client::{BetQuote, MarketClient};
