use allowance::AllowanceTracker;
use anyhow::{anyhow, Context};
use api_client::{ChainReader, JsonRpcClient, ZeroExClient};
use clap::{Parser, Subcommand};
use comfy_table::Table;
use configuration::{build_asset_registry, init_logging, load_config_from, ChainSettings, Config};
use core_types::{
    to_base_units, to_decimal_string, Address, ApprovalKey, AssetRegistry, ChainId, ResolverOutcome, TradeIntent,
    U256,
};
use events::{trade_info, TradeButtonState, TradeContext};
use executor::{Executor, TradeExecutor};
use indicatif::{ProgressBar, ProgressStyle};
use quote_sources::{create_quote_sources, SourceContext};
use resolver::{BestTradeResolver, IntentTracker};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// The main entry point for the QuickTrade resolver.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Secrets such as QUICKTRADE__ORACLE__API_KEY may live in a .env file.
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();
    let config = load_config_from(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    init_logging(&config.logging)?;

    // Execute the appropriate command
    match cli.command {
        Commands::Tokens { chain } => handle_tokens(&config, chain),
        Commands::Quote(args) => handle_quote(&config, args).await,
        Commands::Allowance(args) => handle_allowance(&config, args).await,
        Commands::Trade(args) => handle_trade(&config, args).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Finds the best way to buy or sell basket tokens across every quote source.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file.
    #[arg(long, global = true, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the tradable currency and basket tokens of a chain.
    Tokens {
        #[arg(long)]
        chain: u64,
    },
    /// Fetch quotes from every applicable source and show the best option.
    Quote(QuoteArgs),
    /// Refresh and print the approval state of one (owner, token, spender).
    Allowance(AllowanceArgs),
    /// Quote, approve if needed, and submit the best option through the node.
    Trade(TradeArgs),
}

#[derive(Parser)]
struct QuoteArgs {
    #[arg(long)]
    chain: u64,

    /// Symbol of the asset to pay with (e.g., "USDC").
    #[arg(long)]
    sell: String,

    /// Symbol of the asset to receive (e.g., "ETH2X").
    #[arg(long)]
    buy: String,

    /// Amount of the sell asset, as a decimal string (e.g., "1.25").
    #[arg(long)]
    amount: String,

    /// Sell a basket token instead of buying one.
    #[arg(long)]
    redeem: bool,
}

#[derive(Parser)]
struct AllowanceArgs {
    #[arg(long)]
    chain: u64,

    #[arg(long)]
    owner: Address,

    /// Symbol of the ERC-20 token.
    #[arg(long)]
    token: String,

    #[arg(long)]
    spender: Address,

    /// Amount the spender must be allowed to move. Defaults to unlimited.
    #[arg(long)]
    amount: Option<String>,
}

#[derive(Parser)]
struct TradeArgs {
    #[command(flatten)]
    quote: QuoteArgs,

    /// Account the node signs for.
    #[arg(long)]
    owner: Address,
}

// ==============================================================================
// Wiring
// ==============================================================================

fn chain_settings(config: &Config, chain: u64) -> anyhow::Result<&ChainSettings> {
    config
        .chain(chain)
        .ok_or_else(|| anyhow!("chain {chain} is not configured"))
}

fn rpc_client(config: &Config, chain: &ChainSettings) -> anyhow::Result<Arc<JsonRpcClient>> {
    let client = JsonRpcClient::new(
        chain.rpc_url.clone(),
        Duration::from_millis(config.execution.receipt_poll_interval_ms),
        Duration::from_millis(config.execution.receipt_timeout_ms),
    )?;
    Ok(Arc::new(client))
}

fn build_intent(registry: &AssetRegistry, args: &QuoteArgs) -> anyhow::Result<TradeIntent> {
    let chain_id = ChainId(args.chain);
    let sell = registry.find(chain_id, &args.sell)?.clone();
    let buy = registry.find(chain_id, &args.buy)?.clone();
    let intent = TradeIntent::new(sell, buy, args.amount.clone(), !args.redeem);
    if intent.basket_asset().is_none() {
        let side = if intent.is_issuance { "buy" } else { "sell" };
        return Err(anyhow!("the {side} asset must be a basket token (use --redeem to sell one)"));
    }
    Ok(intent)
}

fn build_tracker(config: &Config, chain: &ChainSettings, reader: Arc<dyn ChainReader>) -> anyhow::Result<IntentTracker> {
    let oracle = Arc::new(ZeroExClient::new(&config.oracle, &config.chains)?);
    let ctx = SourceContext {
        chain_id: ChainId(chain.id),
        oracle,
        reader,
        wrapped_native: chain.wrapped_native,
    };
    let sources = create_quote_sources(ctx, config, chain);
    let resolver = Arc::new(BestTradeResolver::new(ChainId(chain.id), sources, &config.resolver));
    Ok(IntentTracker::new(resolver, &config.resolver))
}

/// Resolves `intent` behind a spinner.
async fn fetch_with_spinner(tracker: &IntentTracker, intent: TradeIntent) -> anyhow::Result<ResolverOutcome> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.set_message(TradeButtonState::Fetching.label());
    spinner.enable_steady_tick(Duration::from_millis(100));

    let outcome = tracker.submit(intent).await;
    spinner.finish_and_clear();
    outcome.ok_or_else(|| anyhow!("intent was not resolved"))
}

fn print_outcome(outcome: &ResolverOutcome, native_symbol: &str) -> anyhow::Result<()> {
    if let Some(best) = outcome.best() {
        let mut table = Table::new();
        table.set_header(vec!["Best option", best.source.to_string().as_str()]);
        let sell = to_decimal_string(best.sell_amount, u32::from(best.sell_asset.decimals), 6)?;
        table.add_row(vec!["Sell".to_string(), format!("{sell} {}", best.sell_asset.symbol)]);
        for row in trade_info(best, native_symbol)? {
            table.add_row(vec![row.title, row.value]);
        }
        println!("{table}");
    }

    let failures = outcome.failures();
    if !failures.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Rejected source", "Reason"]);
        for failure in failures {
            table.add_row(vec![failure.source.to_string(), failure.reason.to_string()]);
        }
        println!("{table}");
    }

    if let ResolverOutcome::AllFailed(failures) = outcome {
        if failures.is_empty() {
            println!("No quote source can serve this trade.");
        }
        println!("{}", TradeButtonState::TryAgain.label());
    }
    Ok(())
}

// ==============================================================================
// Command Logic
// ==============================================================================

fn handle_tokens(config: &Config, chain: u64) -> anyhow::Result<()> {
    let settings = chain_settings(config, chain)?;
    let registry = build_asset_registry(config);
    let chain_id = ChainId(chain);

    let mut table = Table::new();
    table.set_header(vec!["Symbol", "Kind", "Decimals", "Address"]);
    let tokens = registry
        .currency_tokens(chain_id)
        .into_iter()
        .chain(registry.basket_tokens(chain_id));
    for asset in tokens {
        table.add_row(vec![
            asset.symbol.clone(),
            format!("{:?}", asset.kind),
            asset.decimals.to_string(),
            asset.address.to_string(),
        ]);
    }
    println!("Tokens on {} ({})", settings.name, chain_id);
    println!("{table}");
    Ok(())
}

async fn handle_quote(config: &Config, args: QuoteArgs) -> anyhow::Result<()> {
    let chain = chain_settings(config, args.chain)?;
    let registry = build_asset_registry(config);
    let intent = build_intent(&registry, &args)?;
    let tracker = build_tracker(config, chain, rpc_client(config, chain)?)?;

    let outcome = fetch_with_spinner(&tracker, intent).await?;
    print_outcome(&outcome, &chain.native_symbol)
}

async fn handle_allowance(config: &Config, args: AllowanceArgs) -> anyhow::Result<()> {
    let chain = chain_settings(config, args.chain)?;
    let registry = build_asset_registry(config);
    let token = registry.find(ChainId(args.chain), &args.token)?;
    let required = match &args.amount {
        Some(amount) => to_base_units(amount, u32::from(token.decimals))?,
        None => U256::MAX,
    };

    let client = rpc_client(config, chain)?;
    let tracker = AllowanceTracker::new(client.clone(), client);
    let key = ApprovalKey::new(args.owner, token.address, args.spender);
    let state = tracker.refresh(key, required).await?;
    println!("{key}: {state:?}");
    Ok(())
}

async fn handle_trade(config: &Config, args: TradeArgs) -> anyhow::Result<()> {
    let chain = chain_settings(config, args.quote.chain)?;
    let registry = build_asset_registry(config);
    let intent = build_intent(&registry, &args.quote)?;
    let client = rpc_client(config, chain)?;
    let tracker = build_tracker(config, chain, client.clone())?;

    let outcome = fetch_with_spinner(&tracker, intent.clone()).await?;
    print_outcome(&outcome, &chain.native_symbol)?;
    let Some(best) = outcome.best() else {
        return Ok(());
    };

    let allowances = Arc::new(AllowanceTracker::new(client.clone(), client.clone()));
    let approval = match best.plan.spender {
        Some(spender) => {
            let key = ApprovalKey::new(args.owner, best.sell_asset.address, spender);
            allowances.refresh(key, best.sell_amount).await?
        }
        None => Default::default(),
    };
    let balance = client.read_balance(args.owner, intent.sell_asset.address).await.ok();
    let executor = TradeExecutor::new(client.clone(), client, allowances, &config.execution);

    let quotes = tracker.resolver().snapshot();
    let execution = executor.snapshot();
    let button = TradeButtonState::derive(&TradeContext {
        wallet_connected: true,
        intent: &intent,
        sell_balance: balance,
        quotes: &quotes,
        approval: &approval,
        execution: &execution,
    });
    if !matches!(button, TradeButtonState::Trade | TradeButtonState::ApproveTokens) {
        println!("{}", button.label());
        return Ok(());
    }

    tracing::info!(source = %best.source, owner = %args.owner, "executing best option");
    println!("{}...", TradeButtonState::Trading.label());
    let handle = executor.execute(best, args.owner).await?;
    println!("{}", serde_json::to_string_pretty(&handle)?);
    Ok(())
}
