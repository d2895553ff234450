//! 此模块实现了与网易云音乐平台进行交互的 `Provider`。
//!
//! 网易云的搜索接口要求携带会话 Cookie，因此每次检索前会先请求一次首页，
//! 把返回的第一个 `Set-Cookie` 回放到后续的搜索请求中。

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use tracing::{debug, info, instrument, warn};

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
pub const SOURCE_NAME: &str = "NetEase Music";

const QUERY_SEPARATOR: &str = " ";

const BASE_URL_NETEASE: &str = "https://music.163.com/";
const SEARCH_URL: &str = "https://music.163.com/api/search/pc";
const LYRIC_URL: &str = "https://music.163.com/api/song/media";
const NETEASE_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/15.4 Safari/605.1.15";

/// 网易云音乐的提供商实现。
pub struct NeteaseMusic {
    context: ProviderContext,
    policy: RelaxationPolicy,
}

impl NeteaseMusic {
    /// 创建一个新的网易云音乐提供商。
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

    /// 请求首页以获取会话 Cookie。
    async fn session_cookie(&self) -> Result<String> {
        let response = self
            .context
            .transport
            .get(
                BASE_URL_NETEASE,
                &[("Referer", BASE_URL_NETEASE), ("User-Agent", NETEASE_USER_AGENT)],
            )
            .await?;

        if !response.is_success() {
            return Err(LyricsResolverError::HttpStatus {
                url: BASE_URL_NETEASE.to_string(),
                status: response.status,
            });
        }

        response
            .first_cookie_pair()
            .ok_or_else(|| LyricsResolverError::Session("网易云首页未返回 Set-Cookie".into()))
    }

    async fn search(&self, query: String, cookie: &str) -> Result<Vec<Candidate>> {
        let keyword = self.context.normalizer.normalize(&query);
        let url = format!(
            "{SEARCH_URL}?offset=0&limit=10&type=1&s={}",
            urlencoding::encode(&keyword)
        );
        let headers = [
            ("Referer", BASE_URL_NETEASE),
            ("User-Agent", NETEASE_USER_AGENT),
            ("Cookie", cookie),
        ];

        let response: models::SearchResponse =
            http::get_json(self.context.transport.as_ref(), &url, &headers).await?;

        if response.code != 200 {
            return Err(LyricsResolverError::ApiError(format!(
                "网易云搜索 '{keyword}' (code {})",
                response.code
            )));
        }

        Ok(response
            .into_songs()
            .into_iter()
            .map(|song| Candidate {
                artist: song.joined_artists(),
                provider_track_id: song.id.to_string(),
                title: song.name,
                access_token: None,
            })
            .collect())
    }

    async fn fetch_lyrics(&self, id: &str) -> Result<String> {
        let url = format!("{LYRIC_URL}?id={}", urlencoding::encode(id));
        let response: models::LyricResponse =
            http::get_json(self.context.transport.as_ref(), &url, &[]).await?;

        if response.code != 200 {
            return Err(LyricsResolverError::ApiError(format!(
                "网易云歌词 [{id}] (code {})",
                response.code
            )));
        }
        if response.lyric.is_empty() {
            return Err(LyricsResolverError::LyricNotFound);
        }
        Ok(response.lyric)
    }
}

#[async_trait]
impl Provider for NeteaseMusic {
    fn name(&self) -> &'static str {
        "netease"
    }

    #[instrument(skip_all, fields(provider = "netease", external_id = %request.external_id))]
    async fn resolve(&self, request: &SearchRequest) -> Vec<MusicRelation> {
        let cookie = match self.session_cookie().await {
            Ok(cookie) => cookie,
            Err(e) => {
                warn!("获取网易云 Cookie 失败，放弃本次检索: {}", e);
                return Vec::new();
            }
        };
        debug!("已获取网易云会话 Cookie");

        let queries = search::candidates(&request.title, &request.artist, QUERY_SEPARATOR);
        let found = search::run_relaxed_search(self.name(), queries, self.policy, |q| {
            self.search(q, &cookie)
        })
        .await;

        let mut relations = Vec::with_capacity(found.len());
        for candidate in found {
            info!(
                "获取歌曲 [{} - {}] 的歌词, ID [{}]",
                candidate.title, candidate.artist, candidate.provider_track_id
            );
            match self.fetch_lyrics(&candidate.provider_track_id).await {
                Ok(lyric) => relations.push(MusicRelation {
                    title: candidate.title,
                    artist: candidate.artist,
                    external_id: request.external_id.clone(),
                    provider_track_id: candidate.provider_track_id,
                    lyrics_body: STANDARD.encode(lyric.as_bytes()),
                    translated_lyrics_body: None,
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
