use anchor_lang::prelude::*;

use crate::events::ProgramInitialized;
use crate::state::*;

#[derive(Accounts)]
pub struct Initialize<'info> {
    #[account(
        init,
        payer = admin,
        space = ProgramConfig::MAX_SIZE,
        seeds = [CONFIG_SEED],
        bump
    )]
    pub config: Account<'info, ProgramConfig>,

    #[account(mut)]
    pub admin: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<Initialize>) -> Result<()> {
    let config = &mut ctx.accounts.config;
    let clock = Clock::get()?;

    config.admin = ctx.accounts.admin.key();
    config.market_count = 0;
    config.created_at = clock.unix_timestamp;
    config.bump = ctx.bumps.config;

    msg!("Program initialized, admin: {}", config.admin);

    emit!(ProgramInitialized {
        config: config.key(),
        admin: config.admin,
    });

    Ok(())
}
