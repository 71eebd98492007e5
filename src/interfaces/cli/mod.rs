/// CLI Interface Module
///
/// This module provides the command-line entry point for the kitchen queue.
///
/// ## Responsibilities
/// - Parse command-line arguments
/// - Initialize logging
/// - Start the queue service and the selected front ends
/// - Handle graceful shutdown

use crate::application::service::QueueService;
use crate::infrastructure::{network, stdio, HttpServer};
use clap::{Parser, ValueEnum};
use std::net::{IpAddr, SocketAddr};
use tokio_util::sync::CancellationToken;

/// How the line protocol is served
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ServeMode {
    /// stdin/stdout, one session
    Stdio,
    /// TCP line server, many sessions sharing one queue
    Tcp,
}

/// 厨房队列命令行配置
#[derive(Parser, Debug, Clone)]
#[command(name = "kitchen-queue")]
#[command(version)]
#[command(about = "Tiered kitchen order queue with a line protocol", long_about = None)]
pub struct CliConfig {
    /// 协议服务方式
    #[arg(short, long, value_enum, default_value_t = ServeMode::Stdio)]
    pub mode: ServeMode,

    /// TCP监听地址
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    pub host: IpAddr,

    /// TCP监听端口
    #[arg(short, long, default_value_t = 7878)]
    pub port: u16,

    /// HTTP API端口（不设置则不启动）
    #[arg(long)]
    pub http_port: Option<u16>,

    /// 单行最大长度
    #[arg(long, default_value_t = 8192)]
    pub max_line_length: usize,

    /// 日志级别
    #[arg(short = 'l', long, default_value = "info", value_parser = ["trace", "debug", "info", "warn", "error"])]
    pub log_level: String,

    /// 仅显示配置不启动服务（用于调试）
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

impl CliConfig {
    pub fn line_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn http_addr(&self) -> Option<SocketAddr> {
        self.http_port.map(|port| SocketAddr::new(self.host, port))
    }
}

/// Runs the CLI application
pub async fn run() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = CliConfig::parse();
    init_logging(&config.log_level);

    tracing::info!("kitchen queue v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!("配置: {:?}", config);

    if config.dry_run {
        println!("mode:            {:?}", config.mode);
        println!("line address:    {}", config.line_addr());
        match config.http_addr() {
            Some(addr) => println!("http address:    {}", addr),
            None => println!("http address:    disabled"),
        }
        println!("max line length: {}", config.max_line_length);
        println!("log level:       {}", config.log_level);
        return Ok(());
    }

    let (service, handle) = QueueService::new();
    let service_task = tokio::spawn(service.run());

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("received Ctrl-C");
            }
            shutdown.cancel();
        }
    });

    let http_task = config.http_addr().map(|addr| {
        let server = HttpServer::new(addr, handle.clone());
        tokio::spawn(server.run(shutdown.clone().cancelled_owned()))
    });

    match config.mode {
        ServeMode::Stdio => {
            let session = stdio::run_session(
                tokio::io::stdin(),
                tokio::io::stdout(),
                handle,
                config.max_line_length,
            );
            tokio::select! {
                result = session => {
                    result?;
                }
                _ = shutdown.cancelled() => {}
            }
            shutdown.cancel();
        }
        ServeMode::Tcp => {
            let listener = tokio::net::TcpListener::bind(config.line_addr()).await?;
            network::run_server(
                listener,
                handle,
                config.max_line_length,
                shutdown.clone().cancelled_owned(),
            )
            .await?;
        }
    }

    if let Some(task) = http_task {
        task.await??;
    }
    service_task.await?;

    tracing::info!("kitchen queue stopped");
    Ok(())
}

/// 初始化日志系统，日志写到 stderr，stdout 只留给协议输出
fn init_logging(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_config_default() {
        let config = CliConfig::parse_from(["kitchen-queue"]);
        assert_eq!(config.mode, ServeMode::Stdio);
        assert_eq!(config.host.to_string(), "127.0.0.1");
        assert_eq!(config.port, 7878);
        assert_eq!(config.http_port, None);
        assert_eq!(config.max_line_length, 8192);
        assert_eq!(config.log_level, "info");
        assert!(!config.dry_run);
        assert!(config.http_addr().is_none());
    }

    #[test]
    fn test_cli_config_custom() {
        let config = CliConfig::parse_from([
            "kitchen-queue",
            "--mode", "tcp",
            "--host", "0.0.0.0",
            "--port", "9000",
            "--http-port", "3000",
            "--max-line-length", "256",
            "--log-level", "debug",
            "--dry-run",
        ]);

        assert_eq!(config.mode, ServeMode::Tcp);
        assert_eq!(config.line_addr().to_string(), "0.0.0.0:9000");
        assert_eq!(config.http_addr().unwrap().to_string(), "0.0.0.0:3000");
        assert_eq!(config.max_line_length, 256);
        assert_eq!(config.log_level, "debug");
        assert!(config.dry_run);
    }

    #[test]
    fn test_cli_config_short_flags() {
        let config = CliConfig::parse_from([
            "kitchen-queue",
            "-m", "tcp",
            "-H", "192.168.1.1",
            "-p", "7000",
            "-l", "warn",
        ]);

        assert_eq!(config.mode, ServeMode::Tcp);
        assert_eq!(config.host.to_string(), "192.168.1.1");
        assert_eq!(config.port, 7000);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_cli_rejects_unknown_log_level() {
        let result = CliConfig::try_parse_from(["kitchen-queue", "--log-level", "loud"]);
        assert!(result.is_err());
    }
}
