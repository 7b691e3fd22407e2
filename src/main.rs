use anyhow::Context;
use bar_replay::audit::AuditLog;
use bar_replay::config::BacktestSettings;
use bar_replay::factory::{build_backtester, build_data_feed};
use bar_replay::report::{TradeSummary, write_trades_csv};
use clap::Parser;
use serde_json::json;
use tracing::{Level, error, info};
use tracing_subscriber::fmt;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// The log verbosity level
    #[clap(short, long, default_value = "info")]
    pub verbosity: Level,
    /// The path to the config file
    #[clap(short, long)]
    pub config: String,
}

fn main() -> anyhow::Result<()> {
    // Parse CLI args
    let args = Args::parse();

    // Setup logger
    let subscriber = fmt().with_max_level(args.verbosity).finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set subscriber")?;

    // Read config file
    let settings =
        BacktestSettings::deserialize_from_file(&args.config).context("Failed to read config")?;

    let mut audit = settings
        .output
        .audit_log
        .as_deref()
        .map(AuditLog::open)
        .transpose()
        .context("Failed to open audit log")?;

    let bars = build_data_feed(&settings.data)
        .context("Failed to load bars")?
        .into_bars();
    let mut backtester = build_backtester(&settings).context("Failed to build backtester")?;

    if let Some(audit) = audit.as_mut() {
        audit.log(
            "backtest_started",
            &json!({ "strategy": settings.strategy.name, "bars": bars.len() }),
        )?;
    }

    let outcome = backtester.run(&bars).map(|trades| trades.len());
    let trades = backtester.trades();
    let summary = TradeSummary::from_trades(trades);

    if let Some(audit) = audit.as_mut() {
        for trade in trades {
            audit.log("trade", trade)?;
        }
        for failure in backtester.failures() {
            audit.log(
                "step_failed",
                &json!({
                    "ts": failure.ts,
                    "stage": format!("{:?}", failure.stage),
                    "error": failure.message
                }),
            )?;
        }
        audit.log("backtest_finished", &summary)?;
        audit.flush()?;
    }

    if let Some(path) = &settings.output.trades_csv {
        write_trades_csv(path, trades)
            .with_context(|| format!("Failed to write trades to {path}"))?;
        info!("Wrote {} trades to {path}", trades.len());
    }

    info!(
        "{} trades ({} buys, {} sells), net qty {}, net cash flow {:.2}, {} skipped steps",
        summary.trades,
        summary.buys,
        summary.sells,
        summary.net_qty,
        summary.net_cash_flow,
        backtester.failures().len()
    );

    if let Err(err) = outcome {
        error!("Backtest aborted after {} trades: {err}", summary.trades);
        return Err(err.into());
    }
    Ok(())
}
