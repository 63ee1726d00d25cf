use anchor_lang::prelude::*;

#[error_code]
pub enum MarketError {
    #[msg("Question exceeds 200 characters")]
    QuestionTooLong,

    #[msg("Market ID exceeds 50 characters")]
    IdTooLong,

    #[msg("Invalid liquidity parameter")]
    InvalidLiquidity,

    #[msg("Invalid end time")]
    InvalidEndTime,

    #[msg("Market already resolved")]
    MarketResolved,

    #[msg("Market has ended")]
    MarketEnded,

    #[msg("Invalid bet amount")]
    InvalidAmount,

    #[msg("Invalid probability value")]
    InvalidProbability,

    #[msg("Market already resolved")]
    AlreadyResolved,

    #[msg("Market not ended yet")]
    MarketNotEnded,

    #[msg("Market not resolved")]
    NotResolved,

    #[msg("Already claimed")]
    AlreadyClaimed,

    #[msg("No winnings to claim")]
    NoWinnings,

    #[msg("Arithmetic overflow or underflow")]
    ArithmeticOverflow,

    #[msg("Insufficient funds in vault")]
    InsufficientFunds,

    #[msg("Invalid market state")]
    InvalidMarketState,

    #[msg("Unauthorized: only the market oracle authority can perform this action")]
    Unauthorized,
}
