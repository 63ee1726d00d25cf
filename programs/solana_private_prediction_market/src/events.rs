use anchor_lang::prelude::*;

#[event]
pub struct ProgramInitialized {
    pub config: Pubkey,
    pub admin: Pubkey,
}

#[event]
pub struct MarketCreated {
    pub market: Pubkey,
    pub creator: Pubkey,
    pub question: String,
    pub liquidity_param: u64,
    pub end_time: i64,
}

#[event]
pub struct BetPlaced {
    pub market: Pubkey,
    pub user: Pubkey,
    pub amount: u64,
    pub shares: u64,
    pub is_yes: bool,
    pub yes_probability: u64,
}

#[event]
pub struct PriceUpdated {
    pub market: Pubkey,
    pub yes_probability: u64,
}

#[event]
pub struct MarketResolved {
    pub market: Pubkey,
    pub outcome: bool,
}

#[event]
pub struct WinningsClaimed {
    pub market: Pubkey,
    pub user: Pubkey,
    pub payout: u64,
}
