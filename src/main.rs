use anyhow::{ensure, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use wheel_backtest::models::{self, BacktestConfig, ProfitConvention};
use wheel_backtest::{loader, output, simulator, sweep};

#[derive(Parser)]
#[command(name = "wheel-backtest")]
#[command(about = "Backtest a wheel options-selling strategy and scan put strike offsets")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Flags shared by both subcommands
#[derive(Args)]
struct CommonArgs {
    /// Options chain CSV (Date, Expiration, Strike, Close)
    #[arg(long)]
    options_csv: PathBuf,

    /// Underlying price history CSV (Date, Close)
    #[arg(long)]
    prices_csv: PathBuf,

    /// Minimum days until contract expiration, from the quote date
    #[arg(short = 'e', long, default_value = "1")]
    expiration_days: i64,

    /// Dollars above the assignment price for the call strike target
    #[arg(long, default_value = "5.0")]
    call_offset: f64,

    /// How an assigned leg's profit is accounted
    #[arg(long, value_enum, default_value = "premium-excluded")]
    convention: ProfitConvention,

    /// Directory for CSV/JSON exports
    #[arg(short = 'o', long, default_value = "output")]
    output_dir: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Backtest a single fixed put strike offset
    Run {
        #[command(flatten)]
        common: CommonArgs,

        /// Dollars below spot for the put strike target
        #[arg(long, default_value = "5.0")]
        offset: f64,
    },

    /// Backtest a grid of offsets and rank them by total profit
    Sweep {
        #[command(flatten)]
        common: CommonArgs,

        /// First offset in the grid
        #[arg(long, default_value = "5.0")]
        offset_start: f64,

        /// Last offset in the grid (inclusive)
        #[arg(long, default_value = "20.0")]
        offset_end: f64,

        /// Grid step
        #[arg(long, default_value = "2.0")]
        offset_step: f64,

        /// Number of ranked rows to print
        #[arg(long, default_value = "10")]
        top: usize,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { common, offset } => run_fixed(common, offset),
        Commands::Sweep {
            common,
            offset_start,
            offset_end,
            offset_step,
            top,
        } => run_sweep(common, offset_start, offset_end, offset_step, top),
    }
}

fn run_fixed(common: CommonArgs, offset: f64) -> Result<()> {
    let (prices, chains) = load_inputs(&common)?;

    let config = BacktestConfig {
        offset,
        expiration_days: common.expiration_days,
        call_offset: common.call_offset,
        convention: common.convention,
    };

    info!(
        "Running backtest: offset ${:.2}, expiration {}d, {}",
        config.offset, config.expiration_days, config.convention
    );
    let result = simulator::run_backtest(&prices, &chains, &config);

    let report = output::generate_run_report(&result, &config, &prices);
    println!("\n{}", report);

    std::fs::create_dir_all(&common.output_dir)?;

    let trades_path = common.output_dir.join("trades.csv");
    output::export_trades_csv(&result, &trades_path)?;
    info!("Trades written to {}", trades_path.display());

    let chart_path = common.output_dir.join("cumulative_profit.csv");
    output::export_chart_series_csv(&result, &chart_path)?;
    info!("Chart series written to {}", chart_path.display());

    let json_path = common.output_dir.join("result.json");
    output::export_result_json(&result, &json_path)?;
    info!("Result written to {}", json_path.display());

    Ok(())
}

fn run_sweep(
    common: CommonArgs,
    offset_start: f64,
    offset_end: f64,
    offset_step: f64,
    top: usize,
) -> Result<()> {
    ensure!(offset_step > 0.0, "offset step must be positive");
    ensure!(
        offset_start <= offset_end,
        "offset start must not exceed offset end"
    );

    let (prices, chains) = load_inputs(&common)?;

    let offsets = sweep::build_offset_grid(offset_start, offset_end, offset_step);
    info!(
        "Sweeping {} offsets from ${:.2} to ${:.2}",
        offsets.len(),
        offset_start,
        offset_end
    );

    let entries = sweep::sweep_offsets(
        &prices,
        &chains,
        &offsets,
        common.expiration_days,
        common.call_offset,
        common.convention,
    );

    if entries.is_empty() {
        println!("\nNo offset in the grid produced any trades.");
        return Ok(());
    }

    output::print_sweep_table(&entries, top);

    if let Some(best) = entries.first() {
        println!(
            "Best offset: ${:.2} with ${:.2} total profit over {} trades",
            best.offset, best.total_profit, best.trades
        );
    }

    std::fs::create_dir_all(&common.output_dir)?;
    let sweep_path = common.output_dir.join("sweep.csv");
    output::export_sweep_csv(&entries, &sweep_path)?;
    info!("Sweep ranking written to {}", sweep_path.display());

    Ok(())
}

fn load_inputs(common: &CommonArgs) -> Result<(models::PriceSeries, models::OptionChainStore)> {
    let prices = loader::load_price_series(&common.prices_csv)?;
    let chains = loader::load_option_chains(&common.options_csv)?;
    Ok((prices, chains))
}
