//! Display models for on-chain accounts

use anchor_lang::prelude::Pubkey;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use solana_private_prediction_market::lmsr::PROBABILITY_SCALE;
use solana_private_prediction_market::state::{Market, ProgramConfig, UserPosition};

const LAMPORTS_DECIMALS: u32 = 9;

/// Convert lamports to SOL without floating point
pub fn lamports_to_sol(lamports: u64) -> Decimal {
    Decimal::from_i128_with_scale(lamports as i128, LAMPORTS_DECIMALS)
}

/// Convert a parts-per-million probability to a percentage
pub fn probability_percent(ppm: u64) -> Decimal {
    Decimal::from(ppm) * Decimal::from(100) / Decimal::from(PROBABILITY_SCALE)
}

fn timestamp_to_rfc3339(timestamp: i64) -> String {
    DateTime::<Utc>::from_timestamp(timestamp, 0)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| timestamp.to_string())
}

/// Market lifecycle as seen from a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketStatus {
    Open,
    AwaitingResolution,
    ResolvedYes,
    ResolvedNo,
}

impl MarketStatus {
    pub fn of(market: &Market, now: i64) -> Self {
        match (market.resolved, market.outcome) {
            (true, true) => Self::ResolvedYes,
            (true, false) => Self::ResolvedNo,
            _ if market.is_open(now) => Self::Open,
            _ => Self::AwaitingResolution,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::AwaitingResolution => "awaiting_resolution",
            Self::ResolvedYes => "resolved_yes",
            Self::ResolvedNo => "resolved_no",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfigSummary {
    pub address: String,
    pub admin: String,
    pub market_count: u64,
    pub created_at: String,
}

impl ConfigSummary {
    pub fn new(address: &Pubkey, config: &ProgramConfig) -> Self {
        Self {
            address: address.to_string(),
            admin: config.admin.to_string(),
            market_count: config.market_count,
            created_at: timestamp_to_rfc3339(config.created_at),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MarketSummary {
    pub address: String,
    pub question: String,
    pub creator: String,
    pub oracle_authority: String,
    pub status: MarketStatus,
    pub yes_probability_pct: Decimal,
    pub total_yes_shares: u64,
    pub total_no_shares: u64,
    pub liquidity_param_sol: Decimal,
    pub total_liquidity_sol: Decimal,
    pub end_time: String,
}

impl MarketSummary {
    pub fn new(address: &Pubkey, market: &Market, now: i64) -> Self {
        Self {
            address: address.to_string(),
            question: market.question.clone(),
            creator: market.creator.to_string(),
            oracle_authority: market.oracle_authority.to_string(),
            status: MarketStatus::of(market, now),
            yes_probability_pct: probability_percent(market.current_yes_probability),
            total_yes_shares: market.total_yes_shares,
            total_no_shares: market.total_no_shares,
            liquidity_param_sol: lamports_to_sol(market.liquidity_param),
            total_liquidity_sol: lamports_to_sol(market.total_liquidity),
            end_time: timestamp_to_rfc3339(market.end_time),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PositionSummary {
    pub address: String,
    pub user: String,
    pub yes_shares: u64,
    pub no_shares: u64,
    pub deposited_sol: Decimal,
    pub claimed: bool,
    /// Present once the market is resolved and the position holds winning shares
    pub claimable_sol: Option<Decimal>,
}

impl PositionSummary {
    pub fn new(address: &Pubkey, position: &UserPosition, market: &Market) -> Self {
        let claimable_sol = if market.resolved && !position.claimed {
            market.payout_for(position).ok().map(lamports_to_sol)
        } else {
            None
        };

        Self {
            address: address.to_string(),
            user: position.user.to_string(),
            yes_shares: position.yes_shares,
            no_shares: position.no_shares,
            deposited_sol: lamports_to_sol(position.total_deposited),
            claimed: position.claimed,
            claimable_sol,
        }
    }
}
