use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 日誌一律寫到 stderr，stdout 留給報告訊息與 `--message` 的 JSON 回覆
#[derive(Debug, Clone, Copy, Default)]
pub struct LogOptions {
    pub verbose: bool,
    /// `--message` 模式：預設只輸出警告
    pub message_mode: bool,
}

impl LogOptions {
    fn default_directive(&self) -> &'static str {
        match (self.verbose, self.message_mode) {
            (true, _) => "gpa_ledger=debug,info",
            (false, true) => "gpa_ledger=warn,warn",
            (false, false) => "gpa_ledger=info",
        }
    }

    /// RUST_LOG 優先
    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.default_directive()))
    }
}

pub fn init_cli_logger(options: LogOptions) {
    tracing_subscriber::registry()
        .with(options.filter())
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

/// 機器可讀的 JSON 日誌（給擴充功能背景頁或管線收集用）
pub fn init_json_logger(options: LogOptions) {
    tracing_subscriber::registry()
        .with(options.filter())
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false).json())
        .init();
}
