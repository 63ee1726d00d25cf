use anchor_lang::prelude::*;
use anchor_lang::system_program;

use crate::errors::*;
use crate::events::BetPlaced;
use crate::lmsr;
use crate::state::*;

#[derive(Accounts)]
pub struct PlaceBet<'info> {
    #[account(mut)]
    pub market: Account<'info, Market>,

    #[account(
        mut,
        seeds = [VAULT_SEED, market.key().as_ref()],
        bump = market.vault_bump
    )]
    pub market_vault: SystemAccount<'info>,

    #[account(
        init_if_needed,
        payer = user,
        space = UserPosition::MAX_SIZE,
        seeds = [
            POSITION_SEED,
            market.key().as_ref(),
            user.key().as_ref()
        ],
        bump
    )]
    pub user_position: Account<'info, UserPosition>,

    #[account(mut)]
    pub user: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<PlaceBet>, amount: u64, is_yes: bool) -> Result<()> {
    let clock = Clock::get()?;

    {
        let market = &ctx.accounts.market;
        require!(!market.resolved, MarketError::MarketResolved);
        require!(clock.unix_timestamp < market.end_time, MarketError::MarketEnded);
    }
    require!(amount > 0, MarketError::InvalidAmount);

    let shares = lmsr::shares_for_amount(
        amount,
        is_yes,
        ctx.accounts.market.total_yes_shares,
        ctx.accounts.market.total_no_shares,
        ctx.accounts.market.liquidity_param,
    )?;

    system_program::transfer(
        CpiContext::new(
            ctx.accounts.system_program.to_account_info(),
            system_program::Transfer {
                from: ctx.accounts.user.to_account_info(),
                to: ctx.accounts.market_vault.to_account_info(),
            },
        ),
        amount,
    )?;

    let market_key = ctx.accounts.market.key();
    let user_key = ctx.accounts.user.key();
    let market = &mut ctx.accounts.market;
    let user_position = &mut ctx.accounts.user_position;

    // Fresh position from init_if_needed
    if user_position.market == Pubkey::default() {
        user_position.market = market_key;
        user_position.user = user_key;
        user_position.claimed = false;
        user_position.bump = ctx.bumps.user_position;
    }

    if is_yes {
        market.total_yes_shares = market
            .total_yes_shares
            .checked_add(shares)
            .ok_or(MarketError::ArithmeticOverflow)?;

        user_position.yes_shares = user_position
            .yes_shares
            .checked_add(shares)
            .ok_or(MarketError::ArithmeticOverflow)?;
    } else {
        market.total_no_shares = market
            .total_no_shares
            .checked_add(shares)
            .ok_or(MarketError::ArithmeticOverflow)?;

        user_position.no_shares = user_position
            .no_shares
            .checked_add(shares)
            .ok_or(MarketError::ArithmeticOverflow)?;
    }

    market.total_liquidity = market
        .total_liquidity
        .checked_add(amount)
        .ok_or(MarketError::ArithmeticOverflow)?;

    user_position.total_deposited = user_position
        .total_deposited
        .checked_add(amount)
        .ok_or(MarketError::ArithmeticOverflow)?;

    market.current_yes_probability = lmsr::yes_probability_ppm(
        market.total_yes_shares,
        market.total_no_shares,
        market.liquidity_param,
    )?;

    msg!(
        "Bet placed: {} shares of {}",
        shares,
        if is_yes { "YES" } else { "NO" }
    );

    emit!(BetPlaced {
        market: market_key,
        user: user_key,
        amount,
        shares,
        is_yes,
        yes_probability: market.current_yes_probability,
    });

    Ok(())
}
