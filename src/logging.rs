//! ログ出力の初期化

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// tracingのサブスクライバーを初期化
///
/// `RUST_LOG` が設定されていればそれを優先し、なければ `verbose` に応じて
/// `debug` / `info` を使用します。二重初期化はエラーとして返します。
pub fn init_logging(verbose: bool) -> anyhow::Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(verbose))
        .with(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {e}"))?;

    Ok(())
}
