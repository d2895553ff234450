//! 定义了整个 `lyrics-resolver` 库的错误类型 `LyricsResolverError`。

use std::{io, string::FromUtf8Error};
use thiserror::Error;

/// `lyrics-resolver` 库的通用错误枚举。
#[derive(Error, Debug)]
pub enum LyricsResolverError {
    /// 通用的 anyhow 错误
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),

    /// 网络请求失败 (源自 `reqwest::Error`)
    #[error("网络请求失败: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// 远端返回了非 2xx 的 HTTP 状态码
    #[error("请求 `{url}` 返回了 HTTP 状态码 {status}")]
    HttpStatus {
        /// 请求地址
        url: String,
        /// HTTP 状态码
        status: u16,
    },

    /// JSON 解析失败 (源自 `serde_json::Error`)
    #[error("JSON 解析失败: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// 缓存存储失败 (源自 `sqlx::Error`)
    #[error("缓存存储失败: {0}")]
    Store(#[from] sqlx::Error),

    /// Base64 解码失败 (源自 `base64::DecodeError`)
    #[error("Base64 解码失败: {0}")]
    Base64Decode(#[from] base64::DecodeError),

    /// UTF-8 转换失败 (源自 `string::FromUtf8Error`)
    #[error("UTF-8 转换失败: {0}")]
    FromUtf8(#[from] FromUtf8Error),

    /// I/O 错误 (源自 `io::Error`)
    #[error("I/O 错误: {0}")]
    Io(#[from] io::Error),

    /// 在数据源中找不到歌词内容
    #[error("在源中未找到歌词内容")]
    LyricNotFound,

    /// 缓存中找不到要修改的条目
    #[error("缓存中不存在条目 [{external_id}, {relation_id}]")]
    CacheEntryNotFound {
        /// 调用方提供的外部 ID
        external_id: String,
        /// 提供商侧的歌曲 ID
        relation_id: String,
    },

    /// 不支持的歌词源提供商
    #[error("不支持的提供商: '{0}'")]
    ProviderNotSupported(String),

    /// API 返回了业务层面的错误码
    #[error("API 为 `{0}` 返回了错误或空数据")]
    ApiError(String),

    /// 解密失败
    #[error("解密失败: {0}")]
    Decryption(String),

    /// 会话初始化失败（例如未能获取 Cookie）
    #[error("会话初始化失败: {0}")]
    Session(String),

    /// 请求体无效
    #[error("请求无效: {0}")]
    InvalidRequest(String),

    /// 配置无效
    #[error("配置无效: {0}")]
    Config(String),

    /// 内部错误
    #[error("内部错误: {0}")]
    Internal(String),
}

/// `LyricsResolverError` 的 `Result` 类型别名，方便在函数签名中使用。
pub type Result<T> = std::result::Result<T, LyricsResolverError>;
