use anchor_lang::prelude::*;
use sha3::{Digest, Keccak256};

use crate::errors::MarketError;

// Account size constants for clarity
pub const DISCRIMINATOR_SIZE: usize = 8;
pub const PUBKEY_SIZE: usize = 32;
pub const U64_SIZE: usize = 8;
pub const I64_SIZE: usize = 8;
pub const U8_SIZE: usize = 1;
pub const BOOL_SIZE: usize = 1;
pub const STRING_PREFIX_SIZE: usize = 4;

pub const CONFIG_SEED: &[u8] = b"config";
pub const MARKET_SEED: &[u8] = b"market";
pub const VAULT_SEED: &[u8] = b"vault";
pub const POSITION_SEED: &[u8] = b"position";

/// Keccak-256 of the question text, used as the last market seed so one
/// creator can run several markets.
pub fn question_hash(question: &str) -> [u8; 32] {
    Keccak256::digest(question.as_bytes()).into()
}

/// Program-wide settings, created once by `initialize`
#[account]
pub struct ProgramConfig {
    pub admin: Pubkey,      // 32 bytes
    pub market_count: u64,  // 8 bytes
    pub created_at: i64,    // 8 bytes
    pub bump: u8,           // 1 byte
}

impl ProgramConfig {
    pub const MAX_SIZE: usize = DISCRIMINATOR_SIZE +
        PUBKEY_SIZE + // admin
        U64_SIZE + // market_count
        I64_SIZE + // created_at
        U8_SIZE; // bump
}

#[account]
pub struct Market {
    pub creator: Pubkey,                // 32 bytes
    pub question: String,               // 4 + len (max 200 chars)
    pub liquidity_param: u64,           // 8 bytes - LMSR `b`, in lamports
    pub end_time: i64,                  // 8 bytes
    pub resolved: bool,                 // 1 byte
    pub outcome: bool,                  // 1 byte - true = YES
    pub total_yes_shares: u64,          // 8 bytes
    pub total_no_shares: u64,           // 8 bytes
    pub current_yes_probability: u64,   // 8 bytes - parts per million
    pub total_liquidity: u64,           // 8 bytes - lamports owed to winners
    pub oracle_authority: Pubkey,       // 32 bytes
    pub created_at: i64,                // 8 bytes
    pub bump: u8,                       // 1 byte
    pub vault_bump: u8,                 // 1 byte
}

impl Market {
    pub const MAX_QUESTION_LEN: usize = 200;

    pub const MAX_SIZE: usize = DISCRIMINATOR_SIZE +
        PUBKEY_SIZE + // creator
        (STRING_PREFIX_SIZE + Self::MAX_QUESTION_LEN) + // question
        U64_SIZE + // liquidity_param
        I64_SIZE + // end_time
        BOOL_SIZE + // resolved
        BOOL_SIZE + // outcome
        U64_SIZE + // total_yes_shares
        U64_SIZE + // total_no_shares
        U64_SIZE + // current_yes_probability
        U64_SIZE + // total_liquidity
        PUBKEY_SIZE + // oracle_authority
        I64_SIZE + // created_at
        U8_SIZE + // bump
        U8_SIZE; // vault_bump

    pub fn is_open(&self, now: i64) -> bool {
        !self.resolved && now < self.end_time
    }

    pub fn total_winning_shares(&self) -> u64 {
        if self.outcome {
            self.total_yes_shares
        } else {
            self.total_no_shares
        }
    }

    /// Pro-rata share of `total_liquidity` owed to `position` on a resolved market.
    pub fn payout_for(&self, position: &UserPosition) -> Result<u64> {
        let winning_shares = position.winning_shares(self.outcome);
        let total_winning_shares = self.total_winning_shares();

        require!(winning_shares > 0, MarketError::NoWinnings);
        require!(total_winning_shares > 0, MarketError::InvalidMarketState);

        let payout = (winning_shares as u128)
            .checked_mul(self.total_liquidity as u128)
            .ok_or(MarketError::ArithmeticOverflow)?
            .checked_div(total_winning_shares as u128)
            .ok_or(MarketError::ArithmeticOverflow)?;

        Ok(u64::try_from(payout).map_err(|_| MarketError::ArithmeticOverflow)?)
    }
}

#[account]
pub struct UserPosition {
    pub market: Pubkey,          // 32 bytes
    pub user: Pubkey,            // 32 bytes
    pub yes_shares: u64,         // 8 bytes
    pub no_shares: u64,          // 8 bytes
    pub total_deposited: u64,    // 8 bytes
    pub claimed: bool,           // 1 byte
    pub bump: u8,                // 1 byte
}

impl UserPosition {
    pub const MAX_SIZE: usize = DISCRIMINATOR_SIZE +
        PUBKEY_SIZE + // market
        PUBKEY_SIZE + // user
        U64_SIZE + // yes_shares
        U64_SIZE + // no_shares
        U64_SIZE + // total_deposited
        BOOL_SIZE + // claimed
        U8_SIZE; // bump

    pub fn winning_shares(&self, outcome: bool) -> u64 {
        if outcome {
            self.yes_shares
        } else {
            self.no_shares
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn market(yes: u64, no: u64, liquidity: u64, outcome: bool) -> Market {
        Market {
            creator: Pubkey::new_unique(),
            question: "Will it rain tomorrow?".to_string(),
            liquidity_param: 1_000_000_000,
            end_time: 100,
            resolved: true,
            outcome,
            total_yes_shares: yes,
            total_no_shares: no,
            current_yes_probability: 500_000,
            total_liquidity: liquidity,
            oracle_authority: Pubkey::new_unique(),
            created_at: 0,
            bump: 255,
            vault_bump: 254,
        }
    }

    fn position(yes: u64, no: u64) -> UserPosition {
        UserPosition {
            market: Pubkey::new_unique(),
            user: Pubkey::new_unique(),
            yes_shares: yes,
            no_shares: no,
            total_deposited: yes + no,
            claimed: false,
            bump: 253,
        }
    }

    #[test]
    fn test_market_size_fits_longest_question() {
        let mut m = market(0, 0, 0, true);
        m.question = "q".repeat(Market::MAX_QUESTION_LEN);
        let serialized = m.try_to_vec().unwrap();
        assert_eq!(serialized.len() + DISCRIMINATOR_SIZE, Market::MAX_SIZE);
    }

    #[test]
    fn test_position_and_config_sizes() {
        let serialized = position(1, 2).try_to_vec().unwrap();
        assert_eq!(serialized.len() + DISCRIMINATOR_SIZE, UserPosition::MAX_SIZE);

        let config = ProgramConfig {
            admin: Pubkey::new_unique(),
            market_count: 7,
            created_at: 1,
            bump: 250,
        };
        let serialized = config.try_to_vec().unwrap();
        assert_eq!(serialized.len() + DISCRIMINATOR_SIZE, ProgramConfig::MAX_SIZE);
    }

    #[test]
    fn test_question_hash_is_deterministic() {
        assert_eq!(question_hash("a"), question_hash("a"));
        assert_ne!(question_hash("a"), question_hash("b"));
    }

    #[test]
    fn test_payout_is_pro_rata() {
        let m = market(3_000, 1_000, 9_000, true);
        assert_eq!(m.payout_for(&position(1_000, 0)).unwrap(), 3_000);
        assert_eq!(m.payout_for(&position(3_000, 500)).unwrap(), 9_000);
    }

    #[test]
    fn test_payout_rounds_down() {
        let m = market(3, 0, 10, true);
        assert_eq!(m.payout_for(&position(1, 0)).unwrap(), 3);
    }

    #[test]
    fn test_payout_requires_winning_shares() {
        let m = market(1_000, 1_000, 5_000, false);
        let err = m.payout_for(&position(1_000, 0)).unwrap_err();
        assert_eq!(err, MarketError::NoWinnings.into());
    }

    #[test]
    fn test_payout_handles_large_values() {
        let m = market(u64::MAX, 0, u64::MAX, true);
        assert_eq!(m.payout_for(&position(u64::MAX, 0)).unwrap(), u64::MAX);
    }

    #[test]
    fn test_market_open_window() {
        let mut m = market(0, 0, 0, false);
        m.resolved = false;
        assert!(m.is_open(99));
        assert!(!m.is_open(100));
        m.resolved = true;
        assert!(!m.is_open(0));
    }
}
