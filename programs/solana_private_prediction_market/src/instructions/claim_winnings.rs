use anchor_lang::prelude::*;
use anchor_lang::system_program;

use crate::errors::*;
use crate::events::WinningsClaimed;
use crate::state::*;

#[derive(Accounts)]
pub struct ClaimWinnings<'info> {
    pub market: Account<'info, Market>,

    #[account(
        mut,
        seeds = [VAULT_SEED, market.key().as_ref()],
        bump = market.vault_bump
    )]
    pub market_vault: SystemAccount<'info>,

    #[account(
        mut,
        seeds = [
            POSITION_SEED,
            market.key().as_ref(),
            user.key().as_ref()
        ],
        bump = user_position.bump,
        has_one = market,
        has_one = user
    )]
    pub user_position: Account<'info, UserPosition>,

    #[account(mut)]
    pub user: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<ClaimWinnings>) -> Result<()> {
    let market = &ctx.accounts.market;

    require!(market.resolved, MarketError::NotResolved);
    require!(!ctx.accounts.user_position.claimed, MarketError::AlreadyClaimed);

    let payout = market.payout_for(&ctx.accounts.user_position)?;

    let rent_reserve = Rent::get()?.minimum_balance(0);
    let available = ctx
        .accounts
        .market_vault
        .lamports()
        .saturating_sub(rent_reserve);
    require!(available >= payout, MarketError::InsufficientFunds);

    let market_key = market.key();
    let seeds = &[VAULT_SEED, market_key.as_ref(), &[market.vault_bump]];
    let signer_seeds = &[&seeds[..]];

    system_program::transfer(
        CpiContext::new_with_signer(
            ctx.accounts.system_program.to_account_info(),
            system_program::Transfer {
                from: ctx.accounts.market_vault.to_account_info(),
                to: ctx.accounts.user.to_account_info(),
            },
            signer_seeds,
        ),
        payout,
    )?;

    ctx.accounts.user_position.claimed = true;

    msg!("Winnings claimed: {} lamports", payout);

    emit!(WinningsClaimed {
        market: market_key,
        user: ctx.accounts.user.key(),
        payout,
    });

    Ok(())
}
