//! 并发调度所有提供商并合并结果。

use std::sync::Arc;

use futures::future::join_all;
use tracing::{error, info, instrument, warn};

use crate::{
    cache::{CacheGateway, OffsetWrite},
    model::{relation::MusicRelation, track::SearchRequest},
    providers::Provider,
};

/// 检索编排器。
///
/// 每个提供商在独立的 tokio 任务中运行，全部结束后按注册顺序拼接结果，
/// 并把第一条结果写回缓存。
#[derive(Clone)]
pub struct Orchestrator {
    providers: Vec<Arc<dyn Provider>>,
    cache: CacheGateway,
}

impl Orchestrator {
    /// 创建编排器，`providers` 的顺序即结果的合并顺序。
    pub fn new(providers: Vec<Arc<dyn Provider>>, cache: CacheGateway) -> Self {
        Self { providers, cache }
    }

    /// 已注册的提供商名称，按注册顺序排列。
    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// 向所有提供商发起检索。
    ///
    /// 单个提供商的失败（包括任务 panic）只会使其贡献为空，不会影响其他提供商。
    #[instrument(skip_all, fields(external_id = %request.external_id))]
    pub async fn resolve(&self, request: &SearchRequest) -> Vec<MusicRelation> {
        let shared = Arc::new(request.clone());

        let handles = self.providers.iter().map(|provider| {
            let provider = Arc::clone(provider);
            let request = Arc::clone(&shared);
            tokio::spawn(async move { provider.resolve(&request).await })
        });

        let outputs = join_all(handles).await;

        let mut merged = Vec::new();
        for (provider, output) in self.providers.iter().zip(outputs) {
            match output {
                Ok(relations) => {
                    info!("提供商 {} 返回 {} 条结果", provider.name(), relations.len());
                    merged.extend(relations);
                }
                Err(e) => error!("提供商 {} 的任务异常终止: {}", provider.name(), e),
            }
        }

        if let Some(first) = merged.first()
            && let Err(e) = self.cache.upsert(first, OffsetWrite::Preserve).await
        {
            warn!("写回缓存失败 [{}]: {}", first.external_id, e);
        }

        merged
    }
}
