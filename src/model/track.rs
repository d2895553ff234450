//! 定义了与歌曲检索相关的数据结构，包括调用方提交的检索请求和提供商内部的候选项。

use serde::{Deserialize, Serialize};

/// 代表调用方提交的一次歌词检索请求。
///
/// 构造后即不可变，在编排器与各个提供商之间以只读方式共享。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    /// 歌曲标题。
    #[serde(alias = "name")]
    pub title: String,
    /// 艺术家。
    #[serde(alias = "singer")]
    pub artist: String,
    /// 调用方提供的外部 ID（例如另一个系统中的曲目 ID），同时作为缓存主键。
    #[serde(alias = "id")]
    pub external_id: String,
    /// 是否跳过缓存读取，强制重新检索。
    #[serde(default, alias = "refresh")]
    pub force_refresh: bool,
}

impl SearchRequest {
    /// 创建一个不强制刷新的检索请求。
    pub fn new(
        title: impl Into<String>,
        artist: impl Into<String>,
        external_id: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            external_id: external_id.into(),
            force_refresh: false,
        }
    }

    /// 设置是否强制刷新。
    pub fn with_force_refresh(mut self, force_refresh: bool) -> Self {
        self.force_refresh = force_refresh;
        self
    }
}

/// 提供商搜索阶段得到的临时命中项，在获取歌词之前使用。
///
/// 仅在提供商内部流转，不会暴露给调用方。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidate {
    /// 提供商侧的歌曲 ID。
    pub provider_track_id: String,
    /// 歌曲标题。
    pub title: String,
    /// 艺术家。
    pub artist: String,
    /// 部分提供商在二次查询后才能拿到的访问令牌。
    pub access_token: Option<String>,
}
