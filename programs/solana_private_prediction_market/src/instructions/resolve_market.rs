use anchor_lang::prelude::*;

use crate::errors::*;
use crate::events::MarketResolved;
use crate::state::*;

#[derive(Accounts)]
pub struct ResolveMarket<'info> {
    #[account(
        mut,
        has_one = oracle_authority @ MarketError::Unauthorized
    )]
    pub market: Account<'info, Market>,

    pub oracle_authority: Signer<'info>,
}

pub fn handler(ctx: Context<ResolveMarket>, outcome: bool) -> Result<()> {
    let market = &mut ctx.accounts.market;
    let clock = Clock::get()?;

    require!(!market.resolved, MarketError::AlreadyResolved);
    require!(clock.unix_timestamp >= market.end_time, MarketError::MarketNotEnded);

    market.resolved = true;
    market.outcome = outcome;

    msg!("Market resolved: {}", if outcome { "YES" } else { "NO" });

    emit!(MarketResolved {
        market: market.key(),
        outcome,
    });

    Ok(())
}
