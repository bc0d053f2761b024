use std::env;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, FmtSubscriber, Layer, Registry};

/// 日志写入线程的守卫，必须持有到进程结束，否则缓冲区内的日志会丢失
pub struct LogGuards {
    _guards: Vec<WorkerGuard>,
}

// 设置日志
pub fn setup_logging() -> anyhow::Result<LogGuards> {
    let app_env = env::var("APP_ENV").unwrap_or_else(|_| "LOCAL".to_string());

    if app_env.eq_ignore_ascii_case("LOCAL") {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_ansi(true)
            .with_target(false)
            .with_file(true)
            .with_line_number(true)
            .with_level(true)
            .with_writer(std::io::stdout)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
        return Ok(LogGuards { _guards: Vec::new() });
    }

    let info_file = RollingFileAppender::new(Rotation::DAILY, "log_files", "info.log");
    let error_file = RollingFileAppender::new(Rotation::DAILY, "log_files", "error.log");

    let (info_non_blocking, info_guard) = tracing_appender::non_blocking(info_file);
    let (error_non_blocking, error_guard) = tracing_appender::non_blocking(error_file);

    let info_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = Registry::default()
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_file(true)
                .with_line_number(true)
                .with_level(true)
                .with_writer(info_non_blocking)
                .with_filter(info_filter),
        )
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_file(true)
                .with_line_number(true)
                .with_level(true)
                .with_writer(error_non_blocking)
                .with_filter(EnvFilter::new("error")),
        );

    tracing::subscriber::set_global_default(subscriber)?;

    Ok(LogGuards {
        _guards: vec![info_guard, error_guard],
    })
}
