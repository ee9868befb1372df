use clap::Parser;
use gpa_ledger::adapters::messaging::handle_configured_message;
use gpa_ledger::core::ConfigProvider;
use gpa_ledger::utils::logger::{self, LogOptions};
use gpa_ledger::utils::validation::Validate;
use gpa_ledger::{CliConfig, LedgerError, LocalStorage, ReportEngine, TomlConfig, TranscriptPipeline};
use std::path::Path;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut cli = CliConfig::parse();

    // --config 給定時以 TOML 取代其餘選項
    let toml = match cli.config.as_deref().map(TomlConfig::from_file).transpose() {
        Ok(toml) => toml,
        Err(e) => {
            eprintln!("❌ Failed to load config file: {}", e.user_friendly_message());
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    let verbose = cli.verbose || toml.as_ref().is_some_and(TomlConfig::verbose);
    let log_options = LogOptions {
        verbose,
        message_mode: cli.message.is_some(),
    };
    if cli.json_logs || toml.as_ref().is_some_and(TomlConfig::json_logs) {
        logger::init_json_logger(log_options);
    } else {
        logger::init_cli_logger(log_options);
    }

    tracing::info!("Starting gpa-ledger");
    if verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 訊息模式與報告使用同一份配置的 overlay 位置
    if let Some(raw) = cli.message.take() {
        let reply = match &toml {
            Some(config) => answer(&raw, config).await,
            None => answer(&raw, &cli).await,
        };
        println!("{}", reply);
        return Ok(());
    }

    let result = match toml {
        Some(mut config) => {
            tracing::info!("📁 Using configuration file: {}", cli.config.unwrap_or_default());
            exit_on_invalid(&config);
            config.source.input = absolute_input(&config.source.input)?;
            run(config).await
        }
        None => {
            exit_on_invalid(&cli);
            cli.input = absolute_input(&cli.input)?;
            run(cli).await
        }
    };

    match result {
        Ok(output_path) => {
            println!("✅ Grade report completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!("❌ Grade report failed: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(2);
        }
    }

    Ok(())
}

async fn run<C: ConfigProvider>(config: C) -> Result<String, LedgerError> {
    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = TranscriptPipeline::new(storage, config);
    ReportEngine::new(pipeline).run().await
}

async fn answer<C: ConfigProvider + Validate>(raw: &str, config: &C) -> String {
    exit_on_invalid(config);
    handle_configured_message(raw, config).await
}

fn exit_on_invalid(config: &impl Validate) {
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }
}

/// 輸入檔以工作目錄為準，不受輸出目錄影響
fn absolute_input(input: &str) -> anyhow::Result<String> {
    let path = Path::new(input);
    if path.is_absolute() {
        return Ok(input.to_string());
    }
    let absolute = std::env::current_dir()?.join(path);
    Ok(absolute.to_string_lossy().into_owned())
}
