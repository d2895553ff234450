#![warn(missing_docs)]

//! # Lyrics Resolver RS
//!
//! 一个歌词检索服务：根据“标题 + 艺术家”并发地在多个在线音乐平台检索歌词，
//! 合并结果，并把选中的结果缓存在本地 SQLite 中。
//!
//! ## 主要功能
//!
//! - **歌词检索**: 从 QQ音乐、网易云音乐和酷狗音乐检索歌词，检索失败时逐步放宽查询。
//! - **缓存**: 以调用方的外部 ID 为键缓存一条结果，并支持用户修正同步偏移。
//! - **HTTP 接口**: 见 [`server`] 模块。
//!
//! ## 检索歌词
//!
//! ```rust,no_run
//! use std::{sync::Arc, time::Duration};
//!
//! use lyrics_resolver_rs::{
//!     LyricsResolver, SearchRequest,
//!     cache::CacheGateway,
//!     normalize::OpenCcNormalizer,
//!     providers::{ProviderContext, ProviderKind, build_providers, http::ReqwestTransport},
//! };
//!
//! async {
//!     let transport = Arc::new(ReqwestTransport::new(Duration::from_secs(10)).unwrap());
//!     let context = ProviderContext::new(transport, Arc::new(OpenCcNormalizer::default()));
//!     let providers = build_providers(&ProviderKind::DEFAULT_ORDER, &context, false);
//!     let cache = CacheGateway::open("./lyrics.db").await.unwrap();
//!
//!     let resolver = LyricsResolver::new(providers, cache);
//!     let relations = resolver
//!         .lookup_lyrics(&SearchRequest::new("稻香", "周杰伦", "abc123"))
//!         .await;
//!     println!("共找到 {} 条歌词。", relations.len());
//! };
//! ```
pub mod cache;
pub mod config;
pub mod error;
pub mod model;
pub mod normalize;
pub mod orchestrator;
pub mod providers;
pub mod search;
pub mod server;

use std::sync::Arc;

use tracing::{info, warn};

pub use crate::{
    error::{LyricsResolverError, Result},
    model::{
        relation::{MusicRelation, OffsetCorrection},
        track::SearchRequest,
    },
};

use crate::{
    cache::{CacheGateway, OffsetWrite},
    orchestrator::Orchestrator,
    providers::Provider,
};

// ==========================================================
//  顶层 API
// ==========================================================

/// 顶层歌词检索入口，实现“先读缓存、未命中再检索”的策略。
#[derive(Clone)]
pub struct LyricsResolver {
    orchestrator: Orchestrator,
    cache: CacheGateway,
}

impl LyricsResolver {
    /// 使用给定的提供商（按注册顺序）和缓存创建检索入口。
    pub fn new(providers: Vec<Arc<dyn Provider>>, cache: CacheGateway) -> Self {
        Self {
            orchestrator: Orchestrator::new(providers, cache.clone()),
            cache,
        }
    }

    /// 底层缓存。
    pub fn cache(&self) -> &CacheGateway {
        &self.cache
    }

    /// 已注册的提供商名称。
    pub fn provider_names(&self) -> Vec<&'static str> {
        self.orchestrator.provider_names()
    }

    /// 检索歌词。
    ///
    /// 未要求强制刷新时先查缓存，命中则直接返回；缓存读取失败视为未命中。
    pub async fn lookup_lyrics(&self, request: &SearchRequest) -> Vec<MusicRelation> {
        if !request.force_refresh {
            match self.cache.lookup(&request.external_id).await {
                Ok(cached) if !cached.is_empty() => {
                    info!("缓存命中 [{}]", request.external_id);
                    return cached;
                }
                Ok(_) => {}
                Err(e) => warn!("读取缓存失败，按未命中处理 [{}]: {}", request.external_id, e),
            }
        }

        self.orchestrator.resolve(request).await
    }

    /// 用户确认某条结果，将其写入缓存。
    pub async fn confirm(&self, relation: &MusicRelation, offset_write: OffsetWrite) -> Result<()> {
        self.cache.upsert(relation, offset_write).await
    }

    /// 修正某条缓存的同步偏移。
    pub async fn adjust_offset(&self, correction: &OffsetCorrection) -> Result<()> {
        self.cache
            .adjust_offset(
                &correction.external_id,
                &correction.relation_id,
                correction.offset,
            )
            .await
    }
}
