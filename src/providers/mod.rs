//! 提供商模块
//!
//! 该模块定义了与各个音乐平台交互的核心抽象。

use std::{fmt, str::FromStr, sync::Arc};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    error::LyricsResolverError,
    model::{relation::MusicRelation, track::SearchRequest},
    normalize::TextNormalizer,
    providers::http::Transport,
};

pub mod http;
pub mod kugou;
pub mod netease;
pub mod qq;

/// 定义了所有音乐平台提供商需要实现的通用接口。
#[async_trait]
pub trait Provider: Send + Sync {
    ///
    /// 返回提供商的唯一名称。
    ///
    /// 一个全小写的静态字符串，例如 `"qq"`, `"netease"`。
    ///
    fn name(&self) -> &'static str;

    ///
    /// 根据检索请求搜索歌曲并获取每个候选项的歌词。
    ///
    /// 该方法从不返回错误：内部失败会被记录日志，并退化为空的或部分的结果。
    ///
    /// # 参数
    /// * `request` - 调用方提交的检索请求。
    ///
    /// # 返回
    /// 按候选项发现顺序排列的 `MusicRelation` 列表。
    ///
    async fn resolve(&self, request: &SearchRequest) -> Vec<MusicRelation>;
}

/// 构造提供商时所需的共享依赖。
///
/// 由进程入口创建一次，之后以只读方式传给每个提供商。
#[derive(Clone)]
pub struct ProviderContext {
    /// 网络传输。
    pub transport: Arc<dyn Transport>,
    /// 查询文本规范化器。
    pub normalizer: Arc<dyn TextNormalizer>,
}

impl ProviderContext {
    /// 创建一个新的上下文。
    pub fn new(transport: Arc<dyn Transport>, normalizer: Arc<dyn TextNormalizer>) -> Self {
        Self {
            transport,
            normalizer,
        }
    }
}

/// 内置的提供商种类，用于从配置中按顺序注册提供商。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// QQ 音乐
    Qq,
    /// 网易云音乐
    Netease,
    /// 酷狗音乐
    Kugou,
}

impl ProviderKind {
    /// 默认的注册顺序。
    pub const DEFAULT_ORDER: [ProviderKind; 3] =
        [ProviderKind::Qq, ProviderKind::Netease, ProviderKind::Kugou];

    /// 根据种类构造提供商实例。
    pub fn build(self, context: &ProviderContext, decode_krc: bool) -> Arc<dyn Provider> {
        match self {
            ProviderKind::Qq => Arc::new(qq::QQMusic::new(context.clone())),
            ProviderKind::Netease => Arc::new(netease::NeteaseMusic::new(context.clone())),
            ProviderKind::Kugou => {
                Arc::new(kugou::KugouMusic::new(context.clone()).with_krc_decoding(decode_krc))
            }
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProviderKind::Qq => "qq",
            ProviderKind::Netease => "netease",
            ProviderKind::Kugou => "kugou",
        };
        f.write_str(name)
    }
}

impl FromStr for ProviderKind {
    type Err = LyricsResolverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "qq" | "qqmusic" => Ok(ProviderKind::Qq),
            "netease" | "163" => Ok(ProviderKind::Netease),
            "kugou" => Ok(ProviderKind::Kugou),
            other => Err(LyricsResolverError::ProviderNotSupported(other.to_string())),
        }
    }
}

/// 按给定顺序构造提供商列表。
pub fn build_providers(
    kinds: &[ProviderKind],
    context: &ProviderContext,
    decode_krc: bool,
) -> Vec<Arc<dyn Provider>> {
    kinds
        .iter()
        .map(|kind| kind.build(context, decode_krc))
        .collect()
}
