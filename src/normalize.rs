//! 查询文本规范化（繁体转简体）。

use std::sync::{Arc, LazyLock};

use dashmap::DashMap;
use ferrous_opencc::{OpenCC, config::BuiltinConfig};
use tracing::error;

/// 使用 DashMap 来创建一个 OpenCC 实例缓存。
/// 键是配置文件名 (e.g., "t2s.json")，值是对应的 OpenCC 实例。
static CONVERTER_CACHE: LazyLock<DashMap<String, Arc<OpenCC>>> = LazyLock::new(DashMap::new);

/// 在发起搜索之前对查询文本进行规范化。
///
/// 实现不得失败：无法转换时应原样返回输入。
pub trait TextNormalizer: Send + Sync {
    /// 返回规范化后的文本。
    fn normalize(&self, text: &str) -> String;
}

/// 基于 OpenCC 的规范化器，默认执行繁体到简体的转换。
#[derive(Debug, Clone, Copy)]
pub struct OpenCcNormalizer {
    config: BuiltinConfig,
}

impl Default for OpenCcNormalizer {
    fn default() -> Self {
        Self {
            config: BuiltinConfig::T2s,
        }
    }
}

impl OpenCcNormalizer {
    /// 使用指定的 OpenCC 配置创建规范化器。
    pub fn new(config: BuiltinConfig) -> Self {
        Self { config }
    }
}

impl TextNormalizer for OpenCcNormalizer {
    fn normalize(&self, text: &str) -> String {
        convert(text, self.config)
    }
}

/// 不做任何转换的规范化器。
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityNormalizer;

impl TextNormalizer for IdentityNormalizer {
    fn normalize(&self, text: &str) -> String {
        text.to_string()
    }
}

/// 根据指定的 OpenCC 配置转换文本。
///
/// 如果指定的配置加载失败，将打印错误日志并返回原始文本。
pub fn convert(text: &str, config: BuiltinConfig) -> String {
    let cache_key = config.to_filename();

    if let Some(converter) = CONVERTER_CACHE.get(cache_key) {
        return converter.convert(text);
    }

    match CONVERTER_CACHE
        .entry(cache_key.to_string())
        .or_try_insert_with(|| {
            OpenCC::from_config(config).map(Arc::new).map_err(|e| {
                error!("使用配置 '{:?}' 初始化 Opencc 时失败: {}", config, e);
                e
            })
        }) {
        Ok(converter_ref) => converter_ref.value().convert(text),
        Err(_) => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_t2s_normalization() {
        let normalizer = OpenCcNormalizer::default();
        assert_eq!(normalizer.normalize("說好的幸福呢"), "说好的幸福呢");
    }

    #[test]
    fn test_simplified_text_is_unchanged() {
        let normalizer = OpenCcNormalizer::default();
        assert_eq!(normalizer.normalize("稻香 (Live)"), "稻香 (Live)");
    }

    #[test]
    fn test_identity_normalizer() {
        assert_eq!(IdentityNormalizer.normalize("說好的幸福呢"), "說好的幸福呢");
    }
}
