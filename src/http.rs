//! 商店 HTTP 调用封装

use crate::error::{StoreError, StoreResult};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

const USER_AGENT: &str = concat!("linglong-store/", env!("CARGO_PKG_VERSION"));

/// 一次 HTTP 调用的结果
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 解析 JSON 响应体。
    ///
    /// 非 JSON 响应在非 2xx 状态下视为传输失败，否则为解析失败。
    pub fn json<T: DeserializeOwned>(&self) -> StoreResult<T> {
        serde_json::from_str(&self.body).map_err(|e| {
            if self.is_success() {
                StoreError::Decode(format!("{}: {}", e, preview(&self.body)))
            } else {
                StoreError::Transport(format!("HTTP {}: {}", self.status, preview(&self.body)))
            }
        })
    }
}

fn preview(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(200) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

/// 外部传输层，每次调用只发出一个请求
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn get(&self, url: &str) -> StoreResult<HttpResponse>;

    async fn post_json(
        &self,
        url: &str,
        body: String,
        timeout: Option<Duration>,
    ) -> StoreResult<HttpResponse>;
}

pub struct HttpTransport {
    client: Client,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransport {
    pub fn new() -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|e| {
                log::warn!("HTTP 客户端初始化失败, 使用默认配置: {}", e);
                Client::new()
            });
        Self { client }
    }

    /// 读取响应体，超时设置覆盖到读取结束
    async fn finish(
        response: reqwest::Response,
        timeout: Option<Duration>,
    ) -> StoreResult<HttpResponse> {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| request_error(e, timeout))?;
        Ok(HttpResponse { status, body })
    }
}

fn request_error(e: reqwest::Error, timeout: Option<Duration>) -> StoreError {
    match timeout {
        Some(limit) if e.is_timeout() => StoreError::RequestTimeout {
            secs: limit.as_secs(),
        },
        _ => StoreError::Transport(e.to_string()),
    }
}

impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> StoreResult<HttpResponse> {
        log::debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| request_error(e, None))?;
        Self::finish(response, None).await
    }

    async fn post_json(
        &self,
        url: &str,
        body: String,
        timeout: Option<Duration>,
    ) -> StoreResult<HttpResponse> {
        log::debug!("POST {} ({} 字节)", url, body.len());
        let mut request = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .body(body);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request
            .send()
            .await
            .map_err(|e| request_error(e, timeout))?;
        Self::finish(response, timeout).await
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// 按顺序返回预设响应，并记录收到的请求
    #[derive(Default)]
    pub struct CannedTransport {
        responses: Mutex<VecDeque<StoreResult<HttpResponse>>>,
        pub requests: Mutex<Vec<(String, Option<String>)>>,
    }

    impl CannedTransport {
        pub fn with(responses: Vec<StoreResult<HttpResponse>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn ok(body: &str) -> Self {
            Self::with(vec![Ok(HttpResponse::new(200, body))])
        }

        pub fn recorded(&self) -> Vec<(String, Option<String>)> {
            self.requests.lock().unwrap().clone()
        }

        fn next(&self, url: &str, body: Option<String>) -> StoreResult<HttpResponse> {
            self.requests.lock().unwrap().push((url.to_string(), body));
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(StoreError::Transport("no canned response".into())))
        }
    }

    impl Transport for CannedTransport {
        async fn get(&self, url: &str) -> StoreResult<HttpResponse> {
            self.next(url, None)
        }

        async fn post_json(
            &self,
            url: &str,
            body: String,
            _timeout: Option<Duration>,
        ) -> StoreResult<HttpResponse> {
            self.next(url, Some(body))
        }
    }
}
