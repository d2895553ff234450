//! 定义了检索结果 `MusicRelation` 及偏移修正请求。

use serde::{Deserialize, Serialize};

/// 一条歌词检索结果，把调用方的外部 ID 与某个提供商的歌曲关联起来。
///
/// 每个匹配到的候选项产生一条；每个 `external_id` 最多有一条会被持久化。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MusicRelation {
    /// 歌曲标题。
    #[serde(alias = "name")]
    pub title: String,
    /// 艺术家。
    #[serde(alias = "singer")]
    pub artist: String,
    /// 调用方提供的外部 ID。
    #[serde(alias = "sid")]
    pub external_id: String,
    /// 提供商侧的歌曲 ID。
    #[serde(alias = "lid")]
    pub provider_track_id: String,
    /// 歌词内容，编码方式由提供商决定（纯文本或 Base64）。
    #[serde(alias = "lyrics")]
    pub lyrics_body: String,
    /// 可选的翻译歌词。
    #[serde(default, alias = "trans", skip_serializing_if = "Option::is_none")]
    pub translated_lyrics_body: Option<String>,
    /// 产生该结果的提供商名称。
    #[serde(alias = "type")]
    pub source_name: String,
    /// 用户调整的同步偏移（毫秒）。
    #[serde(default, alias = "offset")]
    pub offset_millis: i64,
}

/// 对已缓存条目进行偏移修正的请求。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OffsetCorrection {
    /// 调用方提供的外部 ID。
    #[serde(alias = "sid")]
    pub external_id: String,
    /// 提供商侧的歌曲 ID。
    #[serde(alias = "lid")]
    pub relation_id: String,
    /// 新的偏移值（毫秒）。
    #[serde(alias = "offsetMillis")]
    pub offset: i64,
}
