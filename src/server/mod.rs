//! 最小化的 HTTP 接口。
//!
//! | 方法 | 路径 | 请求体 |
//! |---|---|---|
//! | POST | `/api/v1/lyrics` | [`SearchRequest`] |
//! | POST | `/api/v1/lyrics/confirm` | [`ConfirmRequest`] |
//! | POST | `/api/v1/lyrics/offset` | [`OffsetCorrection`] |

use axum::{Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{
    LyricsResolver,
    cache::OffsetWrite,
    model::{
        relation::{MusicRelation, OffsetCorrection},
        track::SearchRequest,
    },
};

pub mod response;

use response::{ApiFailure, ApiJson, ApiResponse};

/// 各个处理函数共享的状态。
#[derive(Clone)]
pub struct AppState {
    /// 歌词检索入口。
    pub resolver: LyricsResolver,
}

impl AppState {
    /// 创建共享状态。
    pub fn new(resolver: LyricsResolver) -> Self {
        Self { resolver }
    }
}

/// 构建路由。
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/lyrics", post(lookup_lyrics))
        .route("/api/v1/lyrics/confirm", post(confirm_lyrics))
        .route("/api/v1/lyrics/offset", post(adjust_offset))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// 确认接口的请求体。
///
/// 与 [`MusicRelation`] 字段相同，但偏移是可选的：
/// 携带偏移时覆盖缓存中的偏移，否则保留原值。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmRequest {
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
    /// 歌词内容。
    #[serde(alias = "lyrics")]
    pub lyrics_body: String,
    /// 可选的翻译歌词。
    #[serde(default, alias = "trans")]
    pub translated_lyrics_body: Option<String>,
    /// 来源名称。
    #[serde(alias = "type")]
    pub source_name: String,
    /// 可选的偏移（毫秒）。
    #[serde(default, alias = "offset")]
    pub offset_millis: Option<i64>,
}

impl ConfirmRequest {
    /// 拆分为要写入的结果和偏移写入方式。
    pub fn into_parts(self) -> (MusicRelation, OffsetWrite) {
        let offset_write = if self.offset_millis.is_some() {
            OffsetWrite::Replace
        } else {
            OffsetWrite::Preserve
        };
        let relation = MusicRelation {
            title: self.title,
            artist: self.artist,
            external_id: self.external_id,
            provider_track_id: self.provider_track_id,
            lyrics_body: self.lyrics_body,
            translated_lyrics_body: self.translated_lyrics_body,
            source_name: self.source_name,
            offset_millis: self.offset_millis.unwrap_or_default(),
        };
        (relation, offset_write)
    }
}

async fn lookup_lyrics(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SearchRequest>,
) -> ApiResponse<Vec<MusicRelation>> {
    info!(
        "检索歌词 [{} - {}], ID [{}], 强制刷新: {}",
        request.title, request.artist, request.external_id, request.force_refresh
    );
    ApiResponse::success(state.resolver.lookup_lyrics(&request).await)
}

async fn confirm_lyrics(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ConfirmRequest>,
) -> Result<ApiResponse<()>, ApiFailure> {
    let (relation, offset_write) = request.into_parts();
    state.resolver.confirm(&relation, offset_write).await?;
    Ok(ApiResponse::ok())
}

async fn adjust_offset(
    State(state): State<AppState>,
    ApiJson(correction): ApiJson<OffsetCorrection>,
) -> Result<ApiResponse<()>, ApiFailure> {
    state.resolver.adjust_offset(&correction).await?;
    Ok(ApiResponse::ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirm_without_offset_preserves() {
        let request: ConfirmRequest = serde_json::from_str(
            r#"{"name": "稻香", "singer": "周杰伦", "sid": "abc123", "lid": "mid",
                "lyrics": "bHlyaWNz", "type": "QQ Music"}"#,
        )
        .unwrap();
        let (relation, offset_write) = request.into_parts();

        assert_eq!(offset_write, OffsetWrite::Preserve);
        assert_eq!(relation.external_id, "abc123");
        assert_eq!(relation.offset_millis, 0);
    }

    #[test]
    fn test_confirm_with_offset_replaces() {
        let request: ConfirmRequest = serde_json::from_str(
            r#"{"title": "稻香", "artist": "周杰伦", "externalId": "abc123",
                "providerTrackId": "mid", "lyricsBody": "bHlyaWNz",
                "sourceName": "QQ Music", "offsetMillis": -400}"#,
        )
        .unwrap();
        let (relation, offset_write) = request.into_parts();

        assert_eq!(offset_write, OffsetWrite::Replace);
        assert_eq!(relation.offset_millis, -400);
    }
}
