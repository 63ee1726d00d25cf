use anchor_lang::prelude::*;
use anchor_lang::system_program;

use crate::errors::*;
use crate::events::MarketCreated;
use crate::lmsr::EVEN_PROBABILITY;
use crate::state::*;

#[derive(Accounts)]
#[instruction(question: String)]
pub struct CreateMarket<'info> {
    #[account(
        mut,
        seeds = [CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, ProgramConfig>,

    #[account(
        init,
        payer = creator,
        space = Market::MAX_SIZE,
        seeds = [
            MARKET_SEED,
            creator.key().as_ref(),
            question_hash(&question).as_ref()
        ],
        bump
    )]
    pub market: Account<'info, Market>,

    #[account(
        mut,
        seeds = [VAULT_SEED, market.key().as_ref()],
        bump
    )]
    pub market_vault: SystemAccount<'info>,

    #[account(mut)]
    pub creator: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn handler(
    ctx: Context<CreateMarket>,
    question: String,
    liquidity_param: u64,
    end_time: i64,
) -> Result<()> {
    require!(question.len() <= Market::MAX_QUESTION_LEN, MarketError::QuestionTooLong);
    require!(liquidity_param > 0, MarketError::InvalidLiquidity);

    let clock = Clock::get()?;
    require!(end_time > clock.unix_timestamp, MarketError::InvalidEndTime);

    // Vault also receives its own rent reserve so payouts never leave it rent-paying
    let rent_reserve = Rent::get()?.minimum_balance(0);
    let funding = liquidity_param
        .checked_add(rent_reserve)
        .ok_or(MarketError::ArithmeticOverflow)?;

    system_program::transfer(
        CpiContext::new(
            ctx.accounts.system_program.to_account_info(),
            system_program::Transfer {
                from: ctx.accounts.creator.to_account_info(),
                to: ctx.accounts.market_vault.to_account_info(),
            },
        ),
        funding,
    )?;

    let market = &mut ctx.accounts.market;
    market.creator = ctx.accounts.creator.key();
    market.question = question;
    market.liquidity_param = liquidity_param;
    market.end_time = end_time;
    market.resolved = false;
    market.outcome = false;
    market.total_yes_shares = 0;
    market.total_no_shares = 0;
    market.current_yes_probability = EVEN_PROBABILITY;
    market.total_liquidity = liquidity_param;
    market.oracle_authority = ctx.accounts.creator.key();
    market.created_at = clock.unix_timestamp;
    market.bump = ctx.bumps.market;
    market.vault_bump = ctx.bumps.market_vault;

    let config = &mut ctx.accounts.config;
    config.market_count = config
        .market_count
        .checked_add(1)
        .ok_or(MarketError::ArithmeticOverflow)?;

    msg!("Market created: {}", market.question);

    emit!(MarketCreated {
        market: market.key(),
        creator: market.creator,
        question: market.question.clone(),
        liquidity_param,
        end_time,
    });

    Ok(())
}
