use crate::error::{ClientError, ClientResult};
use anchor_lang::prelude::Pubkey;
use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::str::FromStr;

const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

#[derive(Parser, Debug)]
#[command(
    name = "ppm",
    version,
    about = "Create, trade and settle binary prediction markets on Solana"
)]
pub struct Cli {
    /// JSON-RPC endpoint, overrides SOLANA_RPC_URL
    #[arg(long, global = true)]
    pub rpc_url: Option<String>,

    /// Signer keypair file, overrides KEYPAIR_PATH
    #[arg(long, global = true)]
    pub keypair: Option<PathBuf>,

    /// Read the signer from this environment variable (JSON array or base58)
    #[arg(long, global = true, conflicts_with = "keypair")]
    pub keypair_env: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the program config account (once per deployment)
    Initialize,
    /// Open a new market seeded with liquidity from the signer
    CreateMarket(CreateMarketArgs),
    /// Buy YES or NO shares
    Bet(BetArgs),
    /// Override the displayed YES probability (oracle authority only)
    UpdatePrice(UpdatePriceArgs),
    /// Settle a market after its end time (oracle authority only)
    Resolve(ResolveArgs),
    /// Collect the payout of a winning position
    Claim(MarketArg),
    /// Show a market and optionally one user's position in it
    ShowMarket(ShowMarketArgs),
    /// Price a bet without sending it
    Quote(BetArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Side {
    Yes,
    No,
}

impl Side {
    pub fn is_yes(self) -> bool {
        self == Side::Yes
    }
}

#[derive(clap::Args, Debug, Clone)]
pub struct CreateMarketArgs {
    pub question: String,

    /// Seed liquidity in SOL, also the LMSR liquidity parameter
    #[arg(long)]
    pub liquidity: Decimal,

    /// Close time as RFC 3339, e.g. 2026-01-01T00:00:00Z
    #[arg(long, conflicts_with = "ends_in", required_unless_present = "ends_in")]
    pub end_time: Option<String>,

    /// Close time as seconds from now
    #[arg(long)]
    pub ends_in: Option<u64>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct BetArgs {
    pub market: String,

    /// Amount in SOL
    pub amount: Decimal,

    #[arg(value_enum)]
    pub side: Side,
}

#[derive(clap::Args, Debug, Clone)]
pub struct UpdatePriceArgs {
    pub market: String,

    /// YES probability in parts per million (0..=1000000)
    pub probability: u64,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ResolveArgs {
    pub market: String,

    #[arg(value_enum)]
    pub outcome: Side,
}

#[derive(clap::Args, Debug, Clone)]
pub struct MarketArg {
    pub market: String,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ShowMarketArgs {
    pub market: String,

    /// Also show this user's position
    #[arg(long)]
    pub user: Option<String>,
}

pub fn parse_pubkey(value: &str, what: &str) -> ClientResult<Pubkey> {
    Pubkey::from_str(value)
        .map_err(|e| ClientError::Validation(format!("Invalid {} pubkey {}: {}", what, value, e)))
}

/// Convert a SOL amount to lamports, rejecting sub-lamport precision
pub fn sol_to_lamports(sol: Decimal) -> ClientResult<u64> {
    if sol.is_sign_negative() {
        return Err(ClientError::Validation(format!("Amount must not be negative: {}", sol)));
    }

    let lamports = sol
        .checked_mul(Decimal::from(LAMPORTS_PER_SOL))
        .ok_or_else(|| ClientError::Validation(format!("Amount too large: {}", sol)))?;

    if !lamports.fract().is_zero() {
        return Err(ClientError::Validation(format!(
            "Amount {} has more than 9 decimal places",
            sol
        )));
    }

    lamports
        .to_u64()
        .ok_or_else(|| ClientError::Validation(format!("Amount too large: {}", sol)))
}

/// Work out the market close time from either an absolute or relative flag
pub fn resolve_end_time(end_time: Option<&str>, ends_in: Option<u64>, now: i64) -> ClientResult<i64> {
    let end_time = match (end_time, ends_in) {
        (Some(raw), _) => chrono::DateTime::parse_from_rfc3339(raw)
            .map_err(|e| ClientError::Validation(format!("Invalid end time {}: {}", raw, e)))?
            .timestamp(),
        (None, Some(seconds)) => {
            let seconds = i64::try_from(seconds)
                .map_err(|_| ClientError::Validation(format!("Duration too large: {}", seconds)))?;
            now.checked_add(seconds)
                .ok_or_else(|| ClientError::Validation(format!("Duration too large: {}", seconds)))?
        }
        (None, None) => {
            return Err(ClientError::Validation(
                "One of --end-time or --ends-in is required".to_string(),
            ))
        }
    };

    if end_time <= now {
        return Err(ClientError::Validation(format!(
            "End time {} is not in the future",
            end_time
        )));
    }

    Ok(end_time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_bet() {
        let cli = Cli::try_parse_from([
            "ppm",
            "--json",
            "bet",
            "11111111111111111111111111111111",
            "0.25",
            "no",
        ])
        .unwrap();

        assert!(cli.json);
        match cli.cmd {
            Command::Bet(args) => {
                assert_eq!(args.side, Side::No);
                assert_eq!(sol_to_lamports(args.amount).unwrap(), 250_000_000);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_create_market_needs_end_time() {
        assert!(Cli::try_parse_from(["ppm", "create-market", "Rain?", "--liquidity", "1"]).is_err());
        assert!(Cli::try_parse_from([
            "ppm",
            "create-market",
            "Rain?",
            "--liquidity",
            "1",
            "--ends-in",
            "60",
            "--end-time",
            "2030-01-01T00:00:00Z",
        ])
        .is_err());

        let cli = Cli::try_parse_from([
            "ppm",
            "create-market",
            "Rain?",
            "--liquidity",
            "1.5",
            "--ends-in",
            "3600",
        ])
        .unwrap();
        assert!(matches!(cli.cmd, Command::CreateMarket(ref a) if a.ends_in == Some(3600)));
    }

    #[test]
    fn test_sol_to_lamports() {
        assert_eq!(sol_to_lamports(Decimal::ONE).unwrap(), LAMPORTS_PER_SOL);
        assert_eq!(sol_to_lamports(Decimal::new(1, 9)).unwrap(), 1);
        assert!(sol_to_lamports(Decimal::new(1, 10)).is_err());
        assert!(sol_to_lamports(Decimal::new(-1, 0)).is_err());
        assert!(sol_to_lamports(Decimal::from(u64::MAX)).is_err());
    }

    #[test]
    fn test_resolve_end_time() {
        let now = 1_700_000_000;
        assert_eq!(resolve_end_time(None, Some(60), now).unwrap(), now + 60);
        assert_eq!(
            resolve_end_time(Some("2030-01-01T00:00:00Z"), None, now).unwrap(),
            1_893_456_000
        );
        assert!(resolve_end_time(Some("2020-01-01T00:00:00Z"), None, now).is_err());
        assert!(resolve_end_time(None, Some(0), now).is_err());
        assert!(resolve_end_time(Some("tomorrow"), None, now).is_err());
    }

    #[test]
    fn test_parse_pubkey() {
        assert!(parse_pubkey("11111111111111111111111111111111", "market").is_ok());
        let err = parse_pubkey("nope", "market").unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }
}
