//! Financial Analysis Crew
//!
//! Serves the analysis form, or runs one analysis from the command line.
//!
//! # Usage
//!
//! ```bash
//! export OPENAI_API_KEY="sk-..."
//! export SERPER_API_KEY="..."
//!
//! # Web page on http://localhost:8501
//! cargo run --bin financial-crew
//!
//! # One-off analysis
//! cargo run --bin financial-crew -- analyze --symbol NVDA --risk Medium --strategy swing
//! ```

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use financial_crew::{
    AnalysisRequest, AppConfig, AppState, LlmCrewEngine, RiskTolerance, TradingStrategy,
    create_router, run,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

#[derive(Parser)]
#[command(name = "financial-crew")]
#[command(version, about = "Financial analysis crew", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the analysis form (default)
    Serve {
        /// Listen address, overrides BIND_ADDR
        #[arg(long)]
        addr: Option<String>,
    },

    /// Run a single analysis and print the result
    Analyze {
        /// Stock symbol
        #[arg(long, default_value = financial_crew::request::DEFAULT_STOCK)]
        symbol: String,

        /// Initial capital
        #[arg(long, default_value = financial_crew::request::DEFAULT_CAPITAL)]
        capital: String,

        /// Risk tolerance: Low, Medium or High
        #[arg(long, default_value = "Low")]
        risk: RiskTolerance,

        /// Trading strategy: day, swing or position
        #[arg(long, default_value = "Day Trading")]
        strategy: TradingStrategy,

        /// Do not consider news impact
        #[arg(long)]
        no_news: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    crew_utils::load_dotenv();
    crew_utils::init_tracing_with(financial_crew::DEFAULT_LOG_FILTER);

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;
    let engine = LlmCrewEngine::from_env(config.clone())?;

    match cli.command.unwrap_or(Commands::Serve { addr: None }) {
        Commands::Serve { addr } => {
            let addr = addr.unwrap_or_else(|| config.bind_addr.clone());
            let app = create_router(AppState::new(Arc::new(engine), config));

            let listener = TcpListener::bind(&addr)
                .await
                .with_context(|| format!("Failed to bind {addr}"))?;
            info!(addr = %addr, "Server listening");
            axum::serve(listener, app)
                .await
                .context("Server error")?;
        }
        Commands::Analyze {
            symbol,
            capital,
            risk,
            strategy,
            no_news,
        } => {
            let request = AnalysisRequest {
                stock_selection: symbol,
                initial_capital: capital,
                risk_tolerance: risk,
                trading_strategy_preference: strategy,
                news_impact_consideration: !no_news,
            };

            let result = run(&engine, &config, &request).await?;
            println!("{result}");
        }
    }

    Ok(())
}
