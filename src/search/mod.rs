//! 搜索模块
//!
//! 提供逐级放宽的查询策略：精确查询没有结果时，依次去掉艺术家、去掉标题尾部的
//! 括号/副标题，以提高召回率。

use std::{collections::HashSet, future::Future};

use tracing::{debug, info, warn};

use crate::{error::Result, model::track::Candidate};

/// 截断标题时识别的分隔符，按优先级无关的固定顺序扫描，取最早出现的位置。
pub const TITLE_DELIMITERS: [&str; 4] = ["(", "（", "-", "《"];

/// 每个提供商内部使用的放宽策略。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RelaxationPolicy {
    /// 在第一个有结果的级别停止。
    #[default]
    FirstHit,
    /// 执行所有级别，累积并去重所有结果。
    Accumulate,
}

/// 逐级放宽的查询序列。
///
/// 序列是有限的（最多 3 项），并且可以通过 `clone` 重新开始。
#[derive(Debug, Clone)]
pub struct QueryRelaxation<'a> {
    title: &'a str,
    artist: &'a str,
    separator: &'a str,
    stage: u8,
}

impl Iterator for QueryRelaxation<'_> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        let query = match self.stage {
            0 => format!("{}{}{}", self.title, self.separator, self.artist),
            1 => self.title.to_string(),
            2 => title_prefix(self.title)?.to_string(),
            _ => return None,
        };
        self.stage += 1;
        Some(query)
    }
}

/// 根据标题和艺术家生成查询序列。
///
/// 1. `标题 + 分隔符 + 艺术家`
/// 2. `标题`
/// 3. 标题在最早出现的分隔符之前的部分（见 [`TITLE_DELIMITERS`]）
///
/// 如果标题中没有任何分隔符，或截断后为空，第 3 级会被跳过。
pub fn candidates<'a>(title: &'a str, artist: &'a str, separator: &'a str) -> QueryRelaxation<'a> {
    QueryRelaxation {
        title,
        artist,
        separator,
        stage: 0,
    }
}

/// 返回标题在最早出现的分隔符之前的前缀。
pub fn title_prefix(title: &str) -> Option<&str> {
    let cut = TITLE_DELIMITERS
        .iter()
        .filter_map(|delimiter| title.find(delimiter))
        .min()?;
    let prefix = &title[..cut];
    if prefix.is_empty() { None } else { Some(prefix) }
}

/// 用给定的搜索函数依次执行放宽后的查询。
///
/// 任何一次搜索调用失败都会结束放宽过程，已收集到的结果会被保留。
///
/// # 参数
/// * `provider_name` - 仅用于日志。
/// * `queries` - 查询序列，通常来自 [`candidates`]。
/// * `policy` - 放宽策略。
/// * `search` - 执行单次远程搜索的函数。
///
/// # 返回
/// 按发现顺序排列的候选项。
pub async fn run_relaxed_search<I, F, Fut>(
    provider_name: &str,
    queries: I,
    policy: RelaxationPolicy,
    mut search: F,
) -> Vec<Candidate>
where
    I: IntoIterator<Item = String>,
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<Vec<Candidate>>>,
{
    let mut all_candidates: Vec<Candidate> = Vec::new();
    let mut seen_ids = HashSet::new();

    for (level, query) in queries.into_iter().enumerate() {
        match search(query.clone()).await {
            Ok(found) => {
                if found.is_empty() {
                    debug!("[{}] 搜索级别 {} 未命中: '{}'", provider_name, level + 1, query);
                    continue;
                }
                info!(
                    "[{}] 搜索级别 {} 命中 {} 个结果: '{}'",
                    provider_name,
                    level + 1,
                    found.len(),
                    query
                );
                for candidate in found {
                    if seen_ids.insert(candidate.provider_track_id.clone()) {
                        all_candidates.push(candidate);
                    }
                }
                if policy == RelaxationPolicy::FirstHit {
                    break;
                }
            }
            Err(e) => {
                warn!(
                    "[{}] 搜索级别 {} 执行失败 (查询: '{}')，错误: {}。停止放宽。",
                    provider_name,
                    level + 1,
                    query,
                    e
                );
                break;
            }
        }
    }

    all_candidates
}
