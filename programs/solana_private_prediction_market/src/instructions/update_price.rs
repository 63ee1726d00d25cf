use anchor_lang::prelude::*;

use crate::errors::*;
use crate::events::PriceUpdated;
use crate::lmsr::PROBABILITY_SCALE;
use crate::state::*;

#[derive(Accounts)]
pub struct UpdatePrice<'info> {
    #[account(
        mut,
        has_one = oracle_authority @ MarketError::Unauthorized
    )]
    pub market: Account<'info, Market>,

    pub oracle_authority: Signer<'info>,
}

pub fn handler(ctx: Context<UpdatePrice>, new_probability: u64) -> Result<()> {
    let market = &mut ctx.accounts.market;

    require!(!market.resolved, MarketError::MarketResolved);
    require!(new_probability <= PROBABILITY_SCALE, MarketError::InvalidProbability);

    market.current_yes_probability = new_probability;

    msg!("Price updated to: {}%", new_probability / 10_000);

    emit!(PriceUpdated {
        market: market.key(),
        yes_probability: new_probability,
    });

    Ok(())
}
