//! RPC access to the prediction market program

mod market_client;

pub use market_client::{parse_keypair, BetQuote, MarketClient};
