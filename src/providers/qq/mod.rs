//! QQ音乐提供商模块。
//!
//! 使用 QQ 音乐的公开网页接口：先通过 smartbox 接口搜索歌曲 MID，
//! 再逐个 MID 获取歌词。

use async_trait::async_trait;
use tracing::{info, instrument, warn};

use crate::{
    error::{LyricsResolverError, Result},
    model::{
        relation::MusicRelation,
        track::{Candidate, SearchRequest},
    },
    providers::{Provider, ProviderContext, http},
    search::{self, RelaxationPolicy},
};

pub mod models;

/// 结果中使用的来源名称。
pub const SOURCE_NAME: &str = "QQ Music";

/// 组合“标题 + 艺术家”查询时使用的分隔符。
const QUERY_SEPARATOR: &str = "-";

const SEARCH_URL: &str = "https://c.y.qq.com/splcloud/fcgi-bin/smartbox_new.fcg";
const LYRIC_URL: &str = "https://c.y.qq.com/lyric/fcgi-bin/fcg_query_lyric_new.fcg";
const LYRIC_REFERER: &str = "https://y.qq.com/portal/player.html";

/// QQ 音乐的提供商实现。
pub struct QQMusic {
    context: ProviderContext,
    policy: RelaxationPolicy,
}

impl QQMusic {
    /// 创建一个新的 QQ 音乐提供商。
    pub fn new(context: ProviderContext) -> Self {
        Self {
            context,
            policy: RelaxationPolicy::FirstHit,
        }
    }

    /// 覆盖默认的放宽策略。
    pub fn with_relaxation_policy(mut self, policy: RelaxationPolicy) -> Self {
        self.policy = policy;
        self
    }

    async fn search(&self, query: String) -> Result<Vec<Candidate>> {
        let keyword = self.context.normalizer.normalize(&query);
        let url = format!("{SEARCH_URL}?key={}", urlencoding::encode(&keyword));

        let response: models::SmartboxResponse =
            http::get_json(self.context.transport.as_ref(), &url, &[]).await?;

        if response.code != 0 {
            return Err(LyricsResolverError::ApiError(format!(
                "QQ 音乐搜索 (code {}, subcode {})",
                response.code, response.subcode
            )));
        }

        Ok(response
            .into_songs()
            .into_iter()
            .map(|song| Candidate {
                provider_track_id: song.mid,
                title: song.name,
                artist: song.singer,
                access_token: None,
            })
            .collect())
    }

    async fn fetch_lyrics(&self, mid: &str) -> Result<models::LyricResponse> {
        let url = format!(
            "{LYRIC_URL}?songmid={}&g_tk=5381&format=json",
            urlencoding::encode(mid)
        );
        let response: models::LyricResponse = http::get_json(
            self.context.transport.as_ref(),
            &url,
            &[("Referer", LYRIC_REFERER)],
        )
        .await?;

        if response.code != 0 {
            return Err(LyricsResolverError::ApiError(format!(
                "QQ 音乐歌词 [{mid}] (code {})",
                response.code
            )));
        }
        Ok(response)
    }
}

#[async_trait]
impl Provider for QQMusic {
    fn name(&self) -> &'static str {
        "qq"
    }

    #[instrument(skip_all, fields(provider = "qq", external_id = %request.external_id))]
    async fn resolve(&self, request: &SearchRequest) -> Vec<MusicRelation> {
        let queries = search::candidates(&request.title, &request.artist, QUERY_SEPARATOR);
        let found =
            search::run_relaxed_search(self.name(), queries, self.policy, |q| self.search(q))
                .await;

        let mut relations = Vec::with_capacity(found.len());
        for candidate in found {
            info!(
                "获取歌曲 [{} - {}] 的歌词, MID [{}]",
                candidate.title, candidate.artist, candidate.provider_track_id
            );
            match self.fetch_lyrics(&candidate.provider_track_id).await {
                Ok(lyrics) => relations.push(MusicRelation {
                    title: candidate.title,
                    artist: candidate.artist,
                    external_id: request.external_id.clone(),
                    provider_track_id: candidate.provider_track_id,
                    lyrics_body: lyrics.lyric,
                    translated_lyrics_body: Some(lyrics.trans).filter(|t| !t.is_empty()),
                    source_name: SOURCE_NAME.to_string(),
                    offset_millis: 0,
                }),
                Err(e) => warn!(
                    "获取歌词失败，跳过候选项 [{}]: {}",
                    candidate.provider_track_id, e
                ),
            }
        }
        relations
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{normalize::IdentityNormalizer, providers::http::mock::MockTransport};

    const SEARCH_HIT: &str = r#"{
        "code": 0, "subcode": 0,
        "data": {"song": {"count": 2, "itemlist": [
            {"id": "97773", "mid": "003aAYrm3GE0Ac", "name": "稻香", "singer": "周杰伦"},
            {"id": "97774", "mid": "004Z8Ihr0JIu5s", "name": "稻香 (Live)", "singer": "周杰伦"}
        ]}}
    }"#;
    const SEARCH_MISS: &str = r#"{"code": 0, "subcode": 0, "data": {"song": {"count": 0, "itemlist": []}}}"#;

    fn provider(transport: Arc<MockTransport>) -> QQMusic {
        QQMusic::new(ProviderContext::new(transport, Arc::new(IdentityNormalizer)))
    }

    fn search_fragment(keyword: &str) -> String {
        format!("smartbox_new.fcg?key={}", urlencoding::encode(keyword))
    }

    #[test_log::test(tokio::test)]
    async fn test_relaxes_to_title_prefix() {
        let transport = Arc::new(
            MockTransport::new()
                .on(&search_fragment("稻香 (Live)-周杰伦"), SEARCH_MISS)
                .on(&search_fragment("稻香 (Live)"), SEARCH_MISS)
                .on(&search_fragment("稻香 "), SEARCH_HIT)
                .on("songmid=003aAYrm3GE0Ac", r#"{"code": 0, "lyric": "W3RpOueou+mmmV0=", "trans": ""}"#)
                .on("songmid=004Z8Ihr0JIu5s", r#"{"code": 0, "lyric": "W3RpOueou+mmmV0=", "trans": "dHJhbnM="}"#),
        );
        let qq = provider(transport.clone());
        let request = SearchRequest::new("稻香 (Live)", "周杰伦", "abc123");

        let relations = qq.resolve(&request).await;

        assert_eq!(relations.len(), 2);
        assert!(relations.iter().all(|r| r.external_id == "abc123"));
        assert_eq!(relations[0].provider_track_id, "003aAYrm3GE0Ac");
        assert_eq!(relations[0].translated_lyrics_body, None);
        assert_eq!(relations[1].translated_lyrics_body.as_deref(), Some("dHJhbnM="));
        assert_eq!(relations[0].source_name, SOURCE_NAME);
        // 3 次搜索 + 2 次歌词
        assert_eq!(transport.calls().len(), 5);
    }

    #[test_log::test(tokio::test)]
    async fn test_failed_lyric_fetch_drops_only_that_candidate() {
        let transport = Arc::new(
            MockTransport::new()
                .on(&search_fragment("稻香-周杰伦"), SEARCH_HIT)
                .on("songmid=003aAYrm3GE0Ac", r#"{"code": -1901}"#)
                .on("songmid=004Z8Ihr0JIu5s", r#"{"code": 0, "lyric": "bHlyaWM="}"#),
        );
        let qq = provider(transport);

        let relations = qq.resolve(&SearchRequest::new("稻香", "周杰伦", "id")).await;

        assert_eq!(relations.len(), 1);
        assert_eq!(relations[0].provider_track_id, "004Z8Ihr0JIu5s");
        assert_eq!(relations[0].lyrics_body, "bHlyaWM=");
    }

    #[test_log::test(tokio::test)]
    async fn test_lyric_transport_failure_drops_only_that_candidate() {
        let transport = Arc::new(
            MockTransport::new()
                .on(&search_fragment("稻香-周杰伦"), SEARCH_HIT)
                .fail("songmid=003aAYrm3GE0Ac")
                .on("songmid=004Z8Ihr0JIu5s", r#"{"code": 0, "lyric": "bHlyaWM="}"#),
        );
        let qq = provider(transport);

        let relations = qq.resolve(&SearchRequest::new("稻香", "周杰伦", "id")).await;

        assert_eq!(relations.len(), 1);
        assert_eq!(relations[0].provider_track_id, "004Z8Ihr0JIu5s");
    }

    #[test_log::test(tokio::test)]
    async fn test_accumulate_policy_collects_every_level() {
        let live_only = r#"{"code": 0, "data": {"song": {"count": 2, "itemlist": [
            {"mid": "004Z8Ihr0JIu5s", "name": "稻香 (Live)", "singer": "周杰伦"},
            {"mid": "000LiveOnly001", "name": "稻香 (Live)", "singer": "周杰伦"}
        ]}}}"#;
        let transport = Arc::new(
            MockTransport::new()
                .on(&search_fragment("稻香 (Live)-周杰伦"), live_only)
                .on(&search_fragment("稻香 (Live)"), SEARCH_MISS)
                .on(&search_fragment("稻香 "), SEARCH_HIT)
                .on("songmid=", r#"{"code": 0, "lyric": "bHlyaWM="}"#),
        );
        let qq = provider(transport.clone()).with_relaxation_policy(RelaxationPolicy::Accumulate);

        let relations = qq
            .resolve(&SearchRequest::new("稻香 (Live)", "周杰伦", "id"))
            .await;

        let ids: Vec<&str> = relations.iter().map(|r| r.provider_track_id.as_str()).collect();
        assert_eq!(ids, vec!["004Z8Ihr0JIu5s", "000LiveOnly001", "003aAYrm3GE0Ac"]);
        // 3 次搜索 + 3 次歌词（重复的 MID 只获取一次）
        assert_eq!(transport.calls().len(), 6);
    }

    #[test_log::test(tokio::test)]
    async fn test_application_error_yields_empty() {
        let transport = Arc::new(
            MockTransport::new().on(&search_fragment("稻香-周杰伦"), r#"{"code": 500001}"#),
        );
        let qq = provider(transport.clone());

        let relations = qq.resolve(&SearchRequest::new("稻香", "周杰伦", "id")).await;

        assert!(relations.is_empty());
        assert_eq!(transport.calls().len(), 1);
    }

    #[tokio::test]
    #[ignore]
    async fn test_resolve_live() {
        let transport = Arc::new(
            http::ReqwestTransport::new(std::time::Duration::from_secs(10)).unwrap(),
        );
        let qq = QQMusic::new(ProviderContext::new(
            transport,
            Arc::new(crate::normalize::OpenCcNormalizer::default()),
        ));
        let relations = qq.resolve(&SearchRequest::new("稻香", "周杰伦", "live")).await;
        assert!(!relations.is_empty(), "应能在 QQ 音乐找到《稻香》");
    }
}
