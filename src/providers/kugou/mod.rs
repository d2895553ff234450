//! 酷狗音乐提供商模块。
//!
//! 检索分三步：搜索歌曲得到文件哈希，按哈希查询歌词候选项，
//! 再用候选项的 ID 和访问密钥下载 KRC 歌词。

use async_trait::async_trait;
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

pub mod decrypter;
pub mod models;

/// 结果中使用的来源名称。
pub const SOURCE_NAME: &str = "KuGou Music";

const QUERY_SEPARATOR: &str = " ";

const SEARCH_URL: &str = "http://mobilecdn.kugou.com/api/v3/search/song";
const LYRIC_SEARCH_URL: &str = "http://krcs.kugou.com/search";
const LYRIC_DOWNLOAD_URL: &str = "http://lyrics.kugou.com/download";

/// 酷狗音乐的提供商实现。
pub struct KugouMusic {
    context: ProviderContext,
    policy: RelaxationPolicy,
    decode_krc: bool,
}

impl KugouMusic {
    /// 创建一个新的酷狗音乐提供商。默认不解密 KRC。
    pub fn new(context: ProviderContext) -> Self {
        Self {
            context,
            policy: RelaxationPolicy::FirstHit,
            decode_krc: false,
        }
    }

    /// 覆盖默认的放宽策略。
    pub fn with_relaxation_policy(mut self, policy: RelaxationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// 是否把下载到的 KRC 容器解密为明文。
    pub fn with_krc_decoding(mut self, enabled: bool) -> Self {
        self.decode_krc = enabled;
        self
    }

    async fn search(&self, query: String) -> Result<Vec<Candidate>> {
        let keyword = self.context.normalizer.normalize(&query);
        let url = format!(
            "{SEARCH_URL}?format=json&keyword={}&page=1&pagesize=10&showtype=1",
            urlencoding::encode(&keyword)
        );

        let response: models::SearchSongResponse =
            http::get_json(self.context.transport.as_ref(), &url, &[]).await?;

        if response.errcode != 0 {
            return Err(LyricsResolverError::ApiError(format!(
                "酷狗搜索 '{keyword}' (errcode {}, {})",
                response.errcode, response.error
            )));
        }

        Ok(response
            .into_songs()
            .into_iter()
            .map(|song| Candidate {
                provider_track_id: song.hash,
                title: song.songname,
                artist: song.singername,
                access_token: None,
            })
            .collect())
    }

    /// 按文件哈希查询歌词候选项。
    async fn lyric_candidates(&self, hash: &str) -> Result<Vec<Candidate>> {
        let url = format!(
            "{LYRIC_SEARCH_URL}?ver=1&man=yes&client=mobi&hash={}",
            urlencoding::encode(hash)
        );
        let response: models::LyricSearchResponse =
            http::get_json(self.context.transport.as_ref(), &url, &[]).await?;

        if response.status != 200 {
            return Err(LyricsResolverError::ApiError(format!(
                "酷狗歌词候选项 [{hash}] ({})",
                response.errmsg
            )));
        }

        Ok(response
            .candidates
            .into_iter()
            .map(|c| Candidate {
                provider_track_id: c.id,
                title: c.song,
                artist: c.singer,
                access_token: Some(c.accesskey),
            })
            .collect())
    }

    async fn download(&self, id: &str, accesskey: &str) -> Result<String> {
        let url = format!(
            "{LYRIC_DOWNLOAD_URL}?ver=1&client=pc&id={}&accesskey={}&fmt=krc&charset=utf8",
            urlencoding::encode(id),
            urlencoding::encode(accesskey)
        );
        let response: models::LyricDownloadResponse =
            http::get_json(self.context.transport.as_ref(), &url, &[]).await?;

        if response.status != 200 {
            return Err(LyricsResolverError::ApiError(format!(
                "酷狗歌词下载 [{id}] (status {})",
                response.status
            )));
        }
        debug!("酷狗歌词格式: {}", response.fmt);

        if self.decode_krc {
            decrypter::decrypt_krc(&response.content)
        } else {
            Ok(response.content)
        }
    }
}

#[async_trait]
impl Provider for KugouMusic {
    fn name(&self) -> &'static str {
        "kugou"
    }

    #[instrument(skip_all, fields(provider = "kugou", external_id = %request.external_id))]
    async fn resolve(&self, request: &SearchRequest) -> Vec<MusicRelation> {
        let queries = search::candidates(&request.title, &request.artist, QUERY_SEPARATOR);
        let found =
            search::run_relaxed_search(self.name(), queries, self.policy, |q| self.search(q))
                .await;

        let mut relations = Vec::new();
        for hit in found {
            info!(
                "获取歌曲 [{} - {}] 的歌词候选项, Hash [{}]",
                hit.title, hit.artist, hit.provider_track_id
            );
            let lyric_candidates = match self.lyric_candidates(&hit.provider_track_id).await {
                Ok(candidates) => candidates,
                Err(e) => {
                    warn!("查询歌词候选项失败 [{}]: {}", hit.provider_track_id, e);
                    continue;
                }
            };

            for candidate in lyric_candidates {
                let accesskey = candidate.access_token.unwrap_or_default();
                match self.download(&candidate.provider_track_id, &accesskey).await {
                    Ok(lyrics) => relations.push(MusicRelation {
                        provider_track_id: format!(
                            "{}-{}-{}",
                            hit.provider_track_id, candidate.provider_track_id, accesskey
                        ),
                        title: candidate.title,
                        artist: candidate.artist,
                        external_id: request.external_id.clone(),
                        lyrics_body: lyrics,
                        translated_lyrics_body: None,
                        source_name: SOURCE_NAME.to_string(),
                        offset_millis: 0,
                    }),
                    Err(e) => warn!(
                        "下载歌词失败，跳过候选项 [{}, {}]: {}",
                        candidate.provider_track_id, hit.provider_track_id, e
                    ),
                }
            }
        }
        relations
    }
}
