//! `ppm` command line entry point

use anyhow::Context;
use clap::Parser;
use prediction_market_client::cli::{
    parse_pubkey, resolve_end_time, sol_to_lamports, BetArgs, Cli, Command,
};
use prediction_market_client::models::{
    lamports_to_sol, probability_percent, ConfigSummary, MarketSummary, PositionSummary,
};
use prediction_market_client::{ClientConfig, ClientError, ClientResult, MarketClient};
use serde::Serialize;
use serde_json::json;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables first
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let mut config = ClientConfig::from_env().context("Failed to load configuration")?;
    if let Some(rpc_url) = &cli.rpc_url {
        config = config
            .with_rpc_url(rpc_url)
            .context("Invalid --rpc-url")?;
    }
    if let Some(keypair) = &cli.keypair {
        config.keypair_path = keypair.clone();
    }

    // Logs go to stderr so stdout stays parseable with --json
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "prediction_market_client={level},ppm={level}",
                    level = config.log_level
                )
                .into()
            }),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("RPC endpoint: {}", config.rpc_url);
    info!("Program ID: {}", config.program_id);
    if !config.is_localnet() {
        warn!("Using non-local RPC endpoint {}, transactions spend real lamports", config.rpc_url);
    }

    if let Err(e) = run(cli, config).await {
        error!("{}", e);
        std::process::exit(e.exit_code());
    }

    Ok(())
}

async fn run(cli: Cli, config: ClientConfig) -> ClientResult<()> {
    let json = cli.json;
    let client = MarketClient::new(config.clone())?;

    match cli.cmd {
        Command::Initialize => {
            let client = load_signer(client, cli.keypair_env.as_deref(), &config)?;

            if let Some(existing) = client.fetch_config().await? {
                let (address, _) = client.config_pda();
                warn!("Program config {} already exists, skipping initialize", address);
                return print(json, &ConfigSummary::new(&address, &existing), |s| {
                    format!(
                        "Already initialized: config {} (admin {}, {} markets)",
                        s.address, s.admin, s.market_count
                    )
                });
            }

            let signature = client.initialize().await?;
            print_signature(json, &signature.to_string())
        }

        Command::CreateMarket(args) => {
            let client = load_signer(client, cli.keypair_env.as_deref(), &config)?;

            let liquidity = sol_to_lamports(args.liquidity)?;
            let end_time = resolve_end_time(
                args.end_time.as_deref(),
                args.ends_in,
                chrono::Utc::now().timestamp(),
            )?;

            let (signature, market) = client.create_market(&args.question, liquidity, end_time).await?;
            print(
                json,
                &json!({ "signature": signature.to_string(), "market": market.to_string() }),
                |_| format!("Market {}\nYour transaction signature {}", market, signature),
            )
        }

        Command::Bet(BetArgs { market, amount, side }) => {
            let client = load_signer(client, cli.keypair_env.as_deref(), &config)?;
            let market = parse_pubkey(&market, "market")?;
            let amount = sol_to_lamports(amount)?;

            let signature = client.place_bet(&market, amount, side.is_yes()).await?;
            print_signature(json, &signature.to_string())
        }

        Command::UpdatePrice(args) => {
            let client = load_signer(client, cli.keypair_env.as_deref(), &config)?;
            let market = parse_pubkey(&args.market, "market")?;

            let signature = client.update_price(&market, args.probability).await?;
            print_signature(json, &signature.to_string())
        }

        Command::Resolve(args) => {
            let client = load_signer(client, cli.keypair_env.as_deref(), &config)?;
            let market = parse_pubkey(&args.market, "market")?;

            let signature = client.resolve_market(&market, args.outcome.is_yes()).await?;
            print_signature(json, &signature.to_string())
        }

        Command::Claim(args) => {
            let client = load_signer(client, cli.keypair_env.as_deref(), &config)?;
            let market = parse_pubkey(&args.market, "market")?;

            let before = client.balance(&client.payer()?).await?;
            let signature = client.claim_winnings(&market).await?;
            let after = client.balance(&client.payer()?).await?;
            info!("Wallet balance {} -> {} lamports", before, after);

            print_signature(json, &signature.to_string())
        }

        Command::ShowMarket(args) => {
            let address = parse_pubkey(&args.market, "market")?;
            let market = client
                .fetch_market(&address)
                .await?
                .ok_or_else(|| ClientError::NotFound(format!("Market {}", address)))?;
            let now = chrono::Utc::now().timestamp();
            let summary = MarketSummary::new(&address, &market, now);

            let position = match args.user {
                Some(user) => {
                    let user = parse_pubkey(&user, "user")?;
                    let (position_address, _) = client.position_pda(&address, &user);
                    client
                        .fetch_position(&address, &user)
                        .await?
                        .map(|p| PositionSummary::new(&position_address, &p, &market))
                }
                None => None,
            };

            print(
                json,
                &json!({ "market": summary, "position": position }),
                |_| render_market(&summary, position.as_ref()),
            )
        }

        Command::Quote(BetArgs { market, amount, side }) => {
            let market = parse_pubkey(&market, "market")?;
            let amount = sol_to_lamports(amount)?;

            let quote = client.quote_bet(&market, amount, side.is_yes()).await?;
            print(json, &quote, |q| {
                format!(
                    "{} SOL buys {} {:?} shares; YES {}% -> {}%",
                    lamports_to_sol(q.amount),
                    q.shares,
                    side,
                    probability_percent(q.yes_probability_before),
                    probability_percent(q.yes_probability_after)
                )
            })
        }
    }
}

fn load_signer(
    client: MarketClient,
    keypair_env: Option<&str>,
    config: &ClientConfig,
) -> ClientResult<MarketClient> {
    match keypair_env {
        Some(var) => client.with_keypair_env(var),
        None => client.with_keypair_file(&config.keypair_path),
    }
}

fn print<T, F>(json: bool, value: &T, text: F) -> ClientResult<()>
where
    T: Serialize,
    F: FnOnce(&T) -> String,
{
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", text(value));
    }
    Ok(())
}

fn print_signature(json: bool, signature: &str) -> ClientResult<()> {
    print(json, &json!({ "signature": signature }), |_| {
        format!("Your transaction signature {}", signature)
    })
}

fn render_market(market: &MarketSummary, position: Option<&PositionSummary>) -> String {
    let mut out = format!(
        "Market      {}\n\
         Question    {}\n\
         Status      {}\n\
         YES         {}%\n\
         Shares      {} YES / {} NO\n\
         Pool        {} SOL (b = {} SOL)\n\
         Ends        {}\n\
         Oracle      {}",
        market.address,
        market.question,
        market.status.as_str(),
        market.yes_probability_pct,
        market.total_yes_shares,
        market.total_no_shares,
        market.total_liquidity_sol,
        market.liquidity_param_sol,
        market.end_time,
        market.oracle_authority,
    );

    if let Some(p) = position {
        out.push_str(&format!(
            "\n\nPosition    {}\n\
             Shares      {} YES / {} NO\n\
             Deposited   {} SOL\n\
             Claimed     {}",
            p.address, p.yes_shares, p.no_shares, p.deposited_sol, p.claimed
        ));
        if let Some(claimable) = p.claimable_sol {
            out.push_str(&format!("\nClaimable   {} SOL", claimable));
        }
    }

    out
}
