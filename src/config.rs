//! 负责加载服务端配置。
//!
//! 配置文件是可选的 JSON 文件，缺失的字段使用默认值。命令行参数和环境变量
//! 的覆盖由二进制入口负责。

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    error::{LyricsResolverError, Result},
    providers::ProviderKind,
};

/// 应用在用户配置目录下使用的子目录名。
const CONFIG_DIR_NAME: &str = "lyrics-resolver";
/// 默认的配置文件名。
pub const CONFIG_FILE_NAME: &str = "server.json";

/// 服务端配置。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    /// HTTP 监听地址。
    pub listen_address: String,
    /// SQLite 缓存文件路径。
    pub cache_file_path: PathBuf,
    /// 单个网络请求的超时时间（秒）。
    pub request_timeout_secs: u64,
    /// 启用的提供商，顺序即结果的合并顺序。
    pub providers: Vec<ProviderKind>,
    /// 是否把酷狗的 KRC 歌词解密为明文。
    pub decode_krc: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: "0.0.0.0:8080".to_string(),
            cache_file_path: PathBuf::from("./lyrics.db"),
            request_timeout_secs: 10,
            providers: ProviderKind::DEFAULT_ORDER.to_vec(),
            decode_krc: false,
        }
    }
}

/// 获取应用配置目录下指定文件的完整路径。
///
/// # 参数
/// * `filename` - 目标配置文件的名称，例如 "server.json"。
pub fn get_config_file_path(filename: &str) -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(filename))
}

impl ServerConfig {
    /// 加载配置。
    ///
    /// 显式给出的路径必须存在；未给出时尝试用户配置目录下的
    /// `lyrics-resolver/server.json`，不存在则使用默认配置。
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        match explicit_path {
            Some(path) => Self::from_file(path),
            None => match get_config_file_path(CONFIG_FILE_NAME) {
                Some(path) if path.is_file() => Self::from_file(&path),
                _ => {
                    info!("未找到配置文件，使用默认配置。");
                    Ok(Self::default())
                }
            },
        }
    }

    /// 从 JSON 文件读取配置。
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            LyricsResolverError::Config(format!("无法读取配置文件 {}: {e}", path.display()))
        })?;
        let config: ServerConfig = serde_json::from_str(&content)?;
        info!("已从 {} 加载配置。", path.display());
        Ok(config)
    }

    /// 校验配置是否可用。
    pub fn validate(&self) -> Result<()> {
        if self.providers.is_empty() {
            return Err(LyricsResolverError::Config("至少需要启用一个提供商".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(LyricsResolverError::Config("请求超时必须大于 0 秒".into()));
        }
        Ok(())
    }

    /// 网络请求超时。
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
