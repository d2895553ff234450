//! 歌词检索服务的进程入口。

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lyrics_resolver_rs::{
    LyricsResolver,
    cache::CacheGateway,
    config::ServerConfig,
    normalize::OpenCcNormalizer,
    providers::{ProviderContext, ProviderKind, build_providers, http::ReqwestTransport},
    server::{AppState, build_router},
};

/// 命令行参数，未给出的项沿用配置文件中的值。
#[derive(Parser, Debug)]
#[command(name = "lyrics-server")]
#[command(about = "并发检索多个音乐平台的歌词并缓存结果")]
#[command(version)]
struct Args {
    /// 配置文件路径
    #[arg(short, long, env = "LYRICS_CONFIG")]
    config: Option<PathBuf>,

    /// HTTP 监听地址
    #[arg(short, long, env = "LYRICS_LISTEN_ADDRESS")]
    listen: Option<String>,

    /// SQLite 缓存文件路径
    #[arg(long, env = "LYRICS_CACHE_FILE")]
    cache_file: Option<PathBuf>,

    /// 单个网络请求的超时时间（秒）
    #[arg(long, env = "LYRICS_REQUEST_TIMEOUT")]
    timeout_secs: Option<u64>,

    /// 启用的提供商，按逗号分隔，顺序即结果顺序
    #[arg(long, env = "LYRICS_PROVIDERS", value_delimiter = ',')]
    providers: Option<Vec<ProviderKind>>,

    /// 是否把酷狗的 KRC 歌词解密为明文（true/false）
    #[arg(long, env = "LYRICS_DECODE_KRC", value_name = "BOOL")]
    decode_krc: Option<bool>,
}

impl Args {
    fn apply(self, mut config: ServerConfig) -> ServerConfig {
        if let Some(listen) = self.listen {
            config.listen_address = listen;
        }
        if let Some(cache_file) = self.cache_file {
            config.cache_file_path = cache_file;
        }
        if let Some(timeout) = self.timeout_secs {
            config.request_timeout_secs = timeout;
        }
        if let Some(providers) = self.providers {
            config.providers = providers;
        }
        if let Some(decode_krc) = self.decode_krc {
            config.decode_krc = decode_krc;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lyrics_resolver_rs=info,lyrics_server=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut args = Args::parse();
    let config_path = args.config.take();
    let config = args.apply(
        ServerConfig::load(config_path.as_deref()).context("加载配置失败")?,
    );
    config.validate().context("配置无效")?;

    let transport = Arc::new(
        ReqwestTransport::new(config.request_timeout()).context("创建 HTTP 客户端失败")?,
    );
    let context = ProviderContext::new(transport, Arc::new(OpenCcNormalizer::default()));
    let providers = build_providers(&config.providers, &context, config.decode_krc);

    let cache = CacheGateway::open(&config.cache_file_path)
        .await
        .context("打开缓存失败")?;

    let resolver = LyricsResolver::new(providers, cache);
    info!("已启用的提供商: {:?}", resolver.provider_names());

    let app = build_router(AppState::new(resolver));

    let listener = tokio::net::TcpListener::bind(&config.listen_address)
        .await
        .with_context(|| format!("无法监听 {}", config.listen_address))?;
    info!("HTTP 服务已启动: {}", config.listen_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP 服务异常退出")?;

    info!("服务已关闭");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!("无法监听 Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("收到关闭信号");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decoding_enabled() -> ServerConfig {
        ServerConfig {
            decode_krc: true,
            ..ServerConfig::default()
        }
    }

    #[test]
    fn test_decode_krc_flag_can_disable_file_setting() {
        let args = Args::try_parse_from(["lyrics-server", "--decode-krc", "false"]).unwrap();
        assert!(!args.apply(decoding_enabled()).decode_krc);
    }

    #[test]
    fn test_decode_krc_flag_can_enable() {
        let args = Args::try_parse_from(["lyrics-server", "--decode-krc", "true"]).unwrap();
        assert!(args.apply(ServerConfig::default()).decode_krc);
    }

    #[test]
    fn test_absent_flags_keep_file_values() {
        let args = Args::try_parse_from(["lyrics-server"]).unwrap();
        let config = ServerConfig {
            request_timeout_secs: 42,
            ..decoding_enabled()
        };
        assert_eq!(args.apply(config.clone()), config);
    }
}
