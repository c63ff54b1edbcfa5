use anyhow::{Context, Result};
use clap::Parser;
use road_to_billions::{
    cex::{self, BinanceClient, ExchangeInformation},
    cli::{Cli, Command, EarnMoneyArgs, EvaluateArgs, TestCommand},
    config::AppConfig,
    errors::{AppError, exit},
    evaluator::Evaluator,
    report, screener, utils,
};
use std::path::Path;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    utils::init_logging(cli.verbose);

    match utils::until_interrupted(run(cli), tokio::signal::ctrl_c()).await {
        Some(Ok(())) => ExitCode::from(exit::EX_OK),
        Some(Err(e)) => {
            tracing::error!("{e:#}");
            let code = e
                .downcast_ref::<AppError>()
                .map_or(exit::EX_SOFTWARE, AppError::exit_code);
            ExitCode::from(code)
        }
        None => {
            tracing::info!("Stopped by user.");
            ExitCode::from(exit::EX_OK)
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::load(cli.config.as_deref())?;
    tracing::debug!(
        api_url = %config.api_url,
        has_credentials = config.credentials().is_ok(),
        "[INIT] configuration loaded"
    );
    let client = BinanceClient::new(&config)?;

    match cli.command {
        Command::EarnMoney(args) => earn_money(&client, args).await,
        Command::DownloadCoinInfo { output_path } => {
            let raw = client.raw_coin_info().await?;
            write_file(&output_path, &raw)?;
            tracing::info!(path = %output_path.display(), "[CEX] coin information saved");
            Ok(())
        }
        Command::EvaluateSymbolsOffline(args) => evaluate_symbols(&client, args).await,
        Command::Test(TestCommand::SaveExchangeInfo { output_json }) => {
            let raw = client.raw_exchange_info().await?;
            let info = ExchangeInformation::from_json(&raw)
                .context("decoding exchange information from Binance")?;
            tracing::debug!(
                symbols = info.symbols.len(),
                "[CEX] exchange information decoded"
            );
            let value: serde_json::Value = serde_json::from_str(&raw).map_err(AppError::from)?;
            let pretty = serde_json::to_string_pretty(&value).map_err(AppError::from)?;
            write_file(&output_json, &pretty)?;
            tracing::info!(path = %output_json.display(), "[CEX] exchange information saved");
            Ok(())
        }
        Command::Test(TestCommand::LoadExchangeInfo { input_json }) => {
            let raw = std::fs::read_to_string(&input_json)
                .map_err(AppError::from)
                .with_context(|| format!("reading {}", input_json.display()))?;
            let info = ExchangeInformation::from_json(&raw)
                .with_context(|| format!("decoding {}", input_json.display()))?;
            println!("{info:#?}");
            Ok(())
        }
    }
}

async fn earn_money(client: &BinanceClient, args: EarnMoneyArgs) -> Result<()> {
    let evaluator = Evaluator::fetch(client, &args.symbol, args.capital, args.limit)
        .await
        .with_context(|| format!("fetching market data for {}", args.symbol))?;
    let outcome = evaluator.earn_money(args.signals.into())?;

    tracing::info!(
        symbol = %args.symbol,
        days = evaluator.duration_days(),
        profit = outcome.evaluation.profit(),
        "[EVAL] analysis complete"
    );

    if args.report {
        println!(
            "{}",
            report::render_report(evaluator.symbol(), evaluator.duration_days(), &outcome.results)
        );
    }
    if let Some(path) = args.curves {
        report::write_curves(&path, &outcome.signals, &outcome.results)
            .with_context(|| format!("writing curves to {}", path.display()))?;
        tracing::info!(path = %path.display(), "[EVAL] curves written");
    }
    Ok(())
}

async fn evaluate_symbols(client: &BinanceClient, args: EvaluateArgs) -> Result<()> {
    let coins = match args.input_path {
        Some(path) => cex::load_coin_info(&path)
            .with_context(|| format!("loading coin information from {}", path.display()))?,
        None => client.coin_info().await?,
    };

    let results = screener::evaluate_symbols(
        client,
        &coins,
        args.capital,
        args.limit,
        usize::from(args.jobs),
        args.signals.into(),
    )
    .await;
    let total = results.len();
    let best = screener::best(results, args.top);
    println!("{}", report::render_ranking(total, &best));
    Ok(())
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(AppError::from)?;
    }
    std::fs::write(path, contents)
        .map_err(AppError::from)
        .with_context(|| format!("writing {}", path.display()))
}
