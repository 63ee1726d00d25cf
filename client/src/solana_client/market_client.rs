//! Client for the prediction market program
//!
//! Wraps the nonblocking RPC client and builds every program instruction from
//! the program crate's own account and instruction types, so the encoding
//! cannot drift from what the program expects.

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use ::solana_client::nonblocking::rpc_client::RpcClient;
use anchor_lang::{AccountDeserialize, InstructionData, ToAccountMetas};
use serde::Serialize;
use solana_private_prediction_market::{accounts, instruction, lmsr};
use solana_private_prediction_market::state::{
    question_hash, Market, ProgramConfig, UserPosition, CONFIG_SEED, MARKET_SEED, POSITION_SEED,
    VAULT_SEED,
};
use solana_sdk::{
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
    system_program,
    transaction::Transaction,
};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Parse a keypair given as a JSON byte array or a base58 string
pub fn parse_keypair(raw: &str) -> ClientResult<Keypair> {
    let raw = raw.trim();

    let keypair_bytes: Vec<u8> = if raw.starts_with('[') {
        serde_json::from_str(raw)
            .map_err(|e| ClientError::Keypair(format!("Failed to parse keypair JSON: {}", e)))?
    } else {
        bs58::decode(raw)
            .into_vec()
            .map_err(|e| ClientError::Keypair(format!("Failed to decode base58 keypair: {}", e)))?
    };

    Keypair::try_from(keypair_bytes.as_slice())
        .map_err(|e| ClientError::Keypair(format!("Invalid keypair bytes: {}", e)))
}

/// Expected outcome of a bet at the market's current state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BetQuote {
    pub amount: u64,
    pub is_yes: bool,
    pub shares: u64,
    pub yes_probability_before: u64,
    pub yes_probability_after: u64,
}

impl BetQuote {
    /// Quote a bet against an in-memory market
    pub fn for_market(market: &Market, amount: u64, is_yes: bool) -> ClientResult<Self> {
        let shares = lmsr::shares_for_amount(
            amount,
            is_yes,
            market.total_yes_shares,
            market.total_no_shares,
            market.liquidity_param,
        )?;

        let overflow = || {
            ClientError::Validation(format!(
                "Bet of {} lamports would overflow the market's share supply",
                amount
            ))
        };
        let (yes, no) = if is_yes {
            (
                market.total_yes_shares.checked_add(shares).ok_or_else(overflow)?,
                market.total_no_shares,
            )
        } else {
            (
                market.total_yes_shares,
                market.total_no_shares.checked_add(shares).ok_or_else(overflow)?,
            )
        };
        let yes_probability_after = lmsr::yes_probability_ppm(yes, no, market.liquidity_param)?;

        Ok(Self {
            amount,
            is_yes,
            shares,
            yes_probability_before: market.current_yes_probability,
            yes_probability_after,
        })
    }
}

/// Client for on-chain market interactions
pub struct MarketClient {
    config: ClientConfig,
    program_id: Pubkey,
    /// Signer and fee payer (loaded from file or env)
    keypair: Option<Arc<Keypair>>,
    rpc_client: RpcClient,
}

impl MarketClient {
    /// Create a client without a signer; read-only calls work immediately
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let program_id = config.program_id()?;
        let rpc_client = RpcClient::new_with_commitment(config.rpc_url.clone(), config.commitment);

        Ok(Self {
            config,
            program_id,
            keypair: None,
            rpc_client,
        })
    }

    /// Load the signing keypair from a Solana CLI style JSON file
    pub fn with_keypair_file(self, path: &Path) -> ClientResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ClientError::Keypair(format!("Failed to read keypair file {}: {}", path.display(), e))
        })?;

        let keypair = parse_keypair(&contents)?;
        info!("Loaded keypair {} from {}", keypair.pubkey(), path.display());

        Ok(self.with_keypair(keypair))
    }

    /// Load the signing keypair from an environment variable (base58 or JSON array)
    pub fn with_keypair_env(self, env_var: &str) -> ClientResult<Self> {
        let raw = std::env::var(env_var)
            .map_err(|_| ClientError::Keypair(format!("Keypair env var {} not set", env_var)))?;

        let keypair = parse_keypair(&raw)?;
        info!("Loaded keypair {} from env {}", keypair.pubkey(), env_var);

        Ok(self.with_keypair(keypair))
    }

    pub fn with_keypair(mut self, keypair: Keypair) -> Self {
        self.keypair = Some(Arc::new(keypair));
        self
    }

    /// Check if keypair is loaded
    pub fn has_keypair(&self) -> bool {
        self.keypair.is_some()
    }

    /// Public key of the loaded signer
    pub fn payer(&self) -> ClientResult<Pubkey> {
        Ok(self.signer()?.pubkey())
    }

    pub fn rpc_url(&self) -> &str {
        &self.config.rpc_url
    }

    pub fn program_id(&self) -> Pubkey {
        self.program_id
    }

    fn signer(&self) -> ClientResult<&Arc<Keypair>> {
        self.keypair
            .as_ref()
            .ok_or_else(|| ClientError::Keypair("No keypair configured".to_string()))
    }

    // ========================================================================
    // PDA Derivation
    // ========================================================================

    pub fn config_pda(&self) -> (Pubkey, u8) {
        Pubkey::find_program_address(&[CONFIG_SEED], &self.program_id)
    }

    /// Derive market PDA from creator and question text
    pub fn market_pda(&self, creator: &Pubkey, question: &str) -> (Pubkey, u8) {
        let hash = question_hash(question);
        Pubkey::find_program_address(&[MARKET_SEED, creator.as_ref(), &hash], &self.program_id)
    }

    pub fn vault_pda(&self, market: &Pubkey) -> (Pubkey, u8) {
        Pubkey::find_program_address(&[VAULT_SEED, market.as_ref()], &self.program_id)
    }

    pub fn position_pda(&self, market: &Pubkey, user: &Pubkey) -> (Pubkey, u8) {
        Pubkey::find_program_address(
            &[POSITION_SEED, market.as_ref(), user.as_ref()],
            &self.program_id,
        )
    }

    // ========================================================================
    // Instruction Builders
    // ========================================================================

    pub fn initialize_ix(&self, admin: &Pubkey) -> Instruction {
        let (config, _) = self.config_pda();

        Instruction {
            program_id: self.program_id,
            accounts: accounts::Initialize {
                config,
                admin: *admin,
                system_program: system_program::ID,
            }
            .to_account_metas(None),
            data: instruction::Initialize {}.data(),
        }
    }

    /// Build `create_market`; also returns the market address it will create
    pub fn create_market_ix(
        &self,
        creator: &Pubkey,
        question: &str,
        liquidity_param: u64,
        end_time: i64,
    ) -> ClientResult<(Instruction, Pubkey)> {
        if question.is_empty() || question.len() > Market::MAX_QUESTION_LEN {
            return Err(ClientError::Validation(format!(
                "Question must be 1-{} bytes, got {}",
                Market::MAX_QUESTION_LEN,
                question.len()
            )));
        }
        if liquidity_param == 0 {
            return Err(ClientError::Validation(
                "Liquidity must be greater than zero".to_string(),
            ));
        }

        let (config, _) = self.config_pda();
        let (market, _) = self.market_pda(creator, question);
        let (market_vault, _) = self.vault_pda(&market);

        let ix = Instruction {
            program_id: self.program_id,
            accounts: accounts::CreateMarket {
                config,
                market,
                market_vault,
                creator: *creator,
                system_program: system_program::ID,
            }
            .to_account_metas(None),
            data: instruction::CreateMarket {
                question: question.to_string(),
                liquidity_param,
                end_time,
            }
            .data(),
        };

        Ok((ix, market))
    }

    pub fn place_bet_ix(
        &self,
        user: &Pubkey,
        market: &Pubkey,
        amount: u64,
        is_yes: bool,
    ) -> ClientResult<Instruction> {
        if amount == 0 {
            return Err(ClientError::Validation(
                "Bet amount must be greater than zero".to_string(),
            ));
        }

        let (market_vault, _) = self.vault_pda(market);
        let (user_position, _) = self.position_pda(market, user);

        Ok(Instruction {
            program_id: self.program_id,
            accounts: accounts::PlaceBet {
                market: *market,
                market_vault,
                user_position,
                user: *user,
                system_program: system_program::ID,
            }
            .to_account_metas(None),
            data: instruction::PlaceBet { amount, is_yes }.data(),
        })
    }

    pub fn update_price_ix(
        &self,
        oracle_authority: &Pubkey,
        market: &Pubkey,
        new_probability: u64,
    ) -> ClientResult<Instruction> {
        if new_probability > lmsr::PROBABILITY_SCALE {
            return Err(ClientError::Validation(format!(
                "Probability must be at most {} ppm, got {}",
                lmsr::PROBABILITY_SCALE,
                new_probability
            )));
        }

        Ok(Instruction {
            program_id: self.program_id,
            accounts: accounts::UpdatePrice {
                market: *market,
                oracle_authority: *oracle_authority,
            }
            .to_account_metas(None),
            data: instruction::UpdatePrice { new_probability }.data(),
        })
    }

    pub fn resolve_market_ix(
        &self,
        oracle_authority: &Pubkey,
        market: &Pubkey,
        outcome: bool,
    ) -> Instruction {
        Instruction {
            program_id: self.program_id,
            accounts: accounts::ResolveMarket {
                market: *market,
                oracle_authority: *oracle_authority,
            }
            .to_account_metas(None),
            data: instruction::ResolveMarket { outcome }.data(),
        }
    }

    pub fn claim_winnings_ix(&self, user: &Pubkey, market: &Pubkey) -> Instruction {
        let (market_vault, _) = self.vault_pda(market);
        let (user_position, _) = self.position_pda(market, user);

        Instruction {
            program_id: self.program_id,
            accounts: accounts::ClaimWinnings {
                market: *market,
                market_vault,
                user_position,
                user: *user,
                system_program: system_program::ID,
            }
            .to_account_metas(None),
            data: instruction::ClaimWinnings {}.data(),
        }
    }

    // ========================================================================
    // Transactions
    // ========================================================================

    /// Sign with the loaded keypair, send and wait for confirmation
    pub async fn send_instruction(&self, instruction: Instruction) -> ClientResult<Signature> {
        let keypair = self.signer()?;

        let recent_blockhash = self.rpc_client.get_latest_blockhash().await?;

        let transaction = Transaction::new_signed_with_payer(
            &[instruction],
            Some(&keypair.pubkey()),
            &[keypair.as_ref()],
            recent_blockhash,
        );

        let signature = self
            .rpc_client
            .send_and_confirm_transaction(&transaction)
            .await?;

        debug!("Transaction confirmed: {}", signature);
        Ok(signature)
    }

    /// Create the program config account; the signer becomes admin
    pub async fn initialize(&self) -> ClientResult<Signature> {
        let admin = self.payer()?;
        let (config, _) = self.config_pda();

        info!("Initializing program config {} (admin {})", config, admin);

        let signature = self.send_instruction(self.initialize_ix(&admin)).await?;

        info!("Program initialized: {}", signature);
        Ok(signature)
    }

    pub async fn create_market(
        &self,
        question: &str,
        liquidity_param: u64,
        end_time: i64,
    ) -> ClientResult<(Signature, Pubkey)> {
        let creator = self.payer()?;
        let (ix, market) = self.create_market_ix(&creator, question, liquidity_param, end_time)?;

        info!(
            "Creating market {} with liquidity {} lamports, ending at {}",
            market, liquidity_param, end_time
        );

        let signature = self.send_instruction(ix).await?;

        info!("Market created: {} ({})", market, signature);
        Ok((signature, market))
    }

    pub async fn place_bet(&self, market: &Pubkey, amount: u64, is_yes: bool) -> ClientResult<Signature> {
        let user = self.payer()?;
        let ix = self.place_bet_ix(&user, market, amount, is_yes)?;

        info!(
            "Placing {} bet of {} lamports on market {}",
            if is_yes { "YES" } else { "NO" },
            amount,
            market
        );

        let signature = self.send_instruction(ix).await?;

        info!("Bet placed: {}", signature);
        Ok(signature)
    }

    pub async fn update_price(&self, market: &Pubkey, new_probability: u64) -> ClientResult<Signature> {
        let authority = self.payer()?;
        let ix = self.update_price_ix(&authority, market, new_probability)?;

        let signature = self.send_instruction(ix).await?;

        info!("Price of market {} set to {} ppm: {}", market, new_probability, signature);
        Ok(signature)
    }

    pub async fn resolve_market(&self, market: &Pubkey, outcome: bool) -> ClientResult<Signature> {
        let authority = self.payer()?;
        let ix = self.resolve_market_ix(&authority, market, outcome);

        let signature = self.send_instruction(ix).await?;

        info!(
            "Market {} resolved {}: {}",
            market,
            if outcome { "YES" } else { "NO" },
            signature
        );
        Ok(signature)
    }

    pub async fn claim_winnings(&self, market: &Pubkey) -> ClientResult<Signature> {
        let user = self.payer()?;
        let ix = self.claim_winnings_ix(&user, market);

        let signature = self.send_instruction(ix).await?;

        info!("Winnings claimed from market {}: {}", market, signature);
        Ok(signature)
    }

    // ========================================================================
    // Account Reads
    // ========================================================================

    /// Fetch and decode a program account; `None` if it does not exist
    async fn fetch_account<T: AccountDeserialize>(&self, address: &Pubkey) -> ClientResult<Option<T>> {
        let response = self
            .rpc_client
            .get_account_with_commitment(address, self.config.commitment)
            .await?;

        let Some(account) = response.value else {
            debug!("Account {} not found", address);
            return Ok(None);
        };

        if account.owner != self.program_id {
            return Err(ClientError::Validation(format!(
                "Account {} is owned by {}, not {}",
                address, account.owner, self.program_id
            )));
        }

        let decoded = T::try_deserialize(&mut account.data.as_slice())?;
        Ok(Some(decoded))
    }

    pub async fn fetch_config(&self) -> ClientResult<Option<ProgramConfig>> {
        let (config, _) = self.config_pda();
        self.fetch_account(&config).await
    }

    pub async fn fetch_market(&self, market: &Pubkey) -> ClientResult<Option<Market>> {
        self.fetch_account(market).await
    }

    pub async fn fetch_position(&self, market: &Pubkey, user: &Pubkey) -> ClientResult<Option<UserPosition>> {
        let (position, _) = self.position_pda(market, user);
        self.fetch_account(&position).await
    }

    /// Get account balance in lamports
    pub async fn balance(&self, pubkey: &Pubkey) -> ClientResult<u64> {
        Ok(self.rpc_client.get_balance(pubkey).await?)
    }

    /// Lamports a data-less account must hold to stay rent exempt
    pub async fn rent_exempt_minimum(&self) -> ClientResult<u64> {
        Ok(self
            .rpc_client
            .get_minimum_balance_for_rent_exemption(0)
            .await?)
    }

    /// Request lamports from the cluster faucet (localnet/devnet only)
    pub async fn airdrop(&self, pubkey: &Pubkey, lamports: u64) -> ClientResult<Signature> {
        let signature = self.rpc_client.request_airdrop(pubkey, lamports).await?;
        self.rpc_client
            .poll_for_signature_with_commitment(&signature, self.config.commitment)
            .await?;

        info!("Airdropped {} lamports to {}: {}", lamports, pubkey, signature);
        Ok(signature)
    }

    /// Price a bet against the market's current on-chain state
    pub async fn quote_bet(&self, market: &Pubkey, amount: u64, is_yes: bool) -> ClientResult<BetQuote> {
        let state = self
            .fetch_market(market)
            .await?
            .ok_or_else(|| ClientError::NotFound(format!("Market {}", market)))?;

        if !state.is_open(chrono::Utc::now().timestamp()) {
            return Err(ClientError::Validation(format!(
                "Market {} is no longer accepting bets",
                market
            )));
        }

        BetQuote::for_market(&state, amount, is_yes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_lang::Discriminator;

    fn client() -> MarketClient {
        MarketClient::new(ClientConfig::default()).unwrap()
    }

    #[test]
    fn test_market_client_creation() {
        let client = client();
        assert_eq!(client.rpc_url(), "http://127.0.0.1:8899");
        assert_eq!(client.program_id(), solana_private_prediction_market::ID);
        assert!(!client.has_keypair());
        assert!(client.payer().unwrap_err().is_setup_error());
    }

    #[test]
    fn test_market_pda_depends_on_question() {
        let client = client();
        let creator = Pubkey::new_unique();

        let (pda1, _) = client.market_pda(&creator, "Will it rain?");
        let (pda2, _) = client.market_pda(&creator, "Will it rain?");
        let (pda3, _) = client.market_pda(&creator, "Will it snow?");
        let (pda4, _) = client.market_pda(&Pubkey::new_unique(), "Will it rain?");

        assert_eq!(pda1, pda2);
        assert_ne!(pda1, pda3);
        assert_ne!(pda1, pda4);
    }

    #[test]
    fn test_instruction_data_carries_discriminator() {
        let client = client();
        let admin = Pubkey::new_unique();

        let ix = client.initialize_ix(&admin);
        assert_eq!(ix.data, instruction::Initialize::DISCRIMINATOR.to_vec());

        let market = Pubkey::new_unique();
        let ix = client.place_bet_ix(&admin, &market, 42, true).unwrap();
        assert!(ix.data.starts_with(instruction::PlaceBet::DISCRIMINATOR));
        // discriminator + u64 + bool
        assert_eq!(ix.data.len(), 8 + 8 + 1);
        assert_eq!(&ix.data[8..16], &42u64.to_le_bytes());
        assert_eq!(ix.data[16], 1);
    }

    #[test]
    fn test_builders_validate_arguments() {
        let client = client();
        let user = Pubkey::new_unique();
        let market = Pubkey::new_unique();

        let too_long = "x".repeat(Market::MAX_QUESTION_LEN + 1);
        assert!(client.create_market_ix(&user, &too_long, 1, 1).is_err());
        assert!(client.create_market_ix(&user, "ok?", 0, 1).is_err());
        assert!(client.place_bet_ix(&user, &market, 0, false).is_err());
        assert!(client.update_price_ix(&user, &market, 1_000_001).is_err());
        assert!(client.update_price_ix(&user, &market, 1_000_000).is_ok());
    }

    fn open_market() -> Market {
        Market {
            creator: Pubkey::new_unique(),
            question: "Will it rain?".to_string(),
            liquidity_param: 1_000_000_000,
            end_time: i64::MAX,
            resolved: false,
            outcome: false,
            total_yes_shares: 0,
            total_no_shares: 0,
            current_yes_probability: lmsr::EVEN_PROBABILITY,
            total_liquidity: 1_000_000_000,
            oracle_authority: Pubkey::new_unique(),
            created_at: 0,
            bump: 255,
            vault_bump: 255,
        }
    }

    #[test]
    fn test_quote_on_fresh_market() {
        let market = open_market();

        let quote = BetQuote::for_market(&market, 100_000_000, false).unwrap();
        assert!(quote.shares > quote.amount);
        assert_eq!(quote.yes_probability_before, lmsr::EVEN_PROBABILITY);
        assert!(quote.yes_probability_after < lmsr::EVEN_PROBABILITY);
    }

    #[test]
    fn test_quote_rejects_share_overflow() {
        let mut market = open_market();
        market.total_yes_shares = u64::MAX - 1;

        let err = BetQuote::for_market(&market, 1_000, true).unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)), "{err}");

        // The other side still has room
        assert!(BetQuote::for_market(&market, 1_000, false).is_ok());
    }
}
