use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// 診断ログを初期化する（stderr 出力）
///
/// `RUST_LOG` があればそれに従い、なければ `pharmacy_lookup=info`、
/// `--verbose` 指定時は debug まで出す。
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "pharmacy_lookup={0},pharmacy_lookup_common={0}",
            default_level
        ))
    });

    let console_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

    // テストや二重初期化では既存の subscriber を残す
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .try_init();
}
