//! 提供商使用的网络传输层。
//!
//! 提供商只依赖 [`Transport`] 这一能力接口，便于在测试中替换为内存实现。

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    Client,
    header::{HeaderMap, HeaderName, HeaderValue, SET_COOKIE},
};
use serde::de::DeserializeOwned;
use tracing::trace;

use crate::error::{LyricsResolverError, Result};

/// 默认的浏览器 User-Agent。
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// 一次 HTTP 请求的原始响应。
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    /// HTTP 状态码。
    pub status: u16,
    /// 响应头。
    pub headers: HeaderMap,
    /// 响应体文本。
    pub body: String,
}

impl HttpResponse {
    /// 状态码是否为 2xx。
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 返回第一个 `Set-Cookie` 头中的 `name=value` 部分。
    pub fn first_cookie_pair(&self) -> Option<String> {
        let raw = self.headers.get(SET_COOKIE)?.to_str().ok()?;
        let pair = raw.split(';').next()?.trim();
        if pair.is_empty() {
            None
        } else {
            Some(pair.to_string())
        }
    }
}

/// 网络传输能力：`fetch(url, headers) -> 响应或错误`。
#[async_trait]
pub trait Transport: Send + Sync {
    /// 发送一个 GET 请求。
    ///
    /// 只有连接层面的失败才会返回错误，非 2xx 状态码由调用方判断。
    async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse>;
}

/// 基于 `reqwest` 的传输实现。
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http_client: Client,
}

impl ReqwestTransport {
    /// 创建一个带有请求超时的传输实例。
    pub fn new(timeout: Duration) -> Result<Self> {
        let http_client = Client::builder()
            .user_agent(DEFAULT_USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { http_client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse> {
        let mut header_map = HeaderMap::new();
        for (name, value) in headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| LyricsResolverError::Internal(format!("无效的请求头名称: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| LyricsResolverError::Internal(format!("无效的请求头值: {e}")))?;
            header_map.insert(name, value);
        }

        let response = self.http_client.get(url).headers(header_map).send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.text().await?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// 发送 GET 请求并把响应体解析为 JSON。
///
/// 非 2xx 的状态码返回 [`LyricsResolverError::HttpStatus`]，
/// 响应体不是预期结构时返回 [`LyricsResolverError::JsonParse`]。
pub async fn get_json<R: DeserializeOwned>(
    transport: &dyn Transport,
    url: &str,
    headers: &[(&str, &str)],
) -> Result<R> {
    let response = transport.get(url, headers).await?;
    if !response.is_success() {
        return Err(LyricsResolverError::HttpStatus {
            url: url.to_string(),
            status: response.status,
        });
    }

    trace!(url = url, response.body = %response.body, "原始 JSON 响应");

    Ok(serde_json::from_str(&response.body)?)
}
