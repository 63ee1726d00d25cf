use anchor_lang::prelude::*;

pub mod errors;
pub mod events;
pub mod instructions;
pub mod lmsr;
pub mod state;

pub use instructions::*;

declare_id!("6Q1Tj3ef6vEYkRbNh96pkP6WL6ktqq2YNhBb1ntJLudg");

#[program]
pub mod solana_private_prediction_market {
    use super::*;

    pub fn initialize(ctx: Context<Initialize>) -> Result<()> {
        crate::instructions::initialize::handler(ctx)
    }

    pub fn create_market(
        ctx: Context<CreateMarket>,
        question: String,
        liquidity_param: u64,
        end_time: i64,
    ) -> Result<()> {
        crate::instructions::create_market::handler(ctx, question, liquidity_param, end_time)
    }

    pub fn place_bet(
        ctx: Context<PlaceBet>,
        amount: u64,
        is_yes: bool,
    ) -> Result<()> {
        crate::instructions::place_bet::handler(ctx, amount, is_yes)
    }

    pub fn update_price(
        ctx: Context<UpdatePrice>,
        new_probability: u64,
    ) -> Result<()> {
        crate::instructions::update_price::handler(ctx, new_probability)
    }

    pub fn resolve_market(
        ctx: Context<ResolveMarket>,
        outcome: bool,
    ) -> Result<()> {
        crate::instructions::resolve_market::handler(ctx, outcome)
    }

    pub fn claim_winnings(ctx: Context<ClaimWinnings>) -> Result<()> {
        crate::instructions::claim_winnings::handler(ctx)
    }
}
