use super::payload::{build_search_payload, SearchFilters, SearchPayload};
use super::types::{
    extract_app_items, format_app_list, AppDetail, AppSummary, Category, CategoryListResponse,
    RawApp,
};
use crate::config::Config;
use crate::error::{StoreError, StoreResult};
use crate::http::{HttpTransport, Transport};
use reqwest::Url;
use serde_json::Value;

/// 玲珑商店 API 客户端
///
/// 每个方法只发出一次请求，不重试也不缓存。
pub struct StoreClient<T: Transport = HttpTransport> {
    transport: T,
    base_url: String,
    arch: String,
    lang: String,
    repo_name: String,
}

impl StoreClient<HttpTransport> {
    pub fn new(config: &Config) -> Self {
        Self::with_transport(config, HttpTransport::new())
    }
}

impl<T: Transport> StoreClient<T> {
    pub fn with_transport(config: &Config, transport: T) -> Self {
        Self {
            transport,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            arch: config.arch.clone(),
            lang: config.lang.clone(),
            repo_name: config.repo_name.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn url_with_params(&self, path: &str, params: &[(&str, &str)]) -> StoreResult<String> {
        Url::parse_with_params(&self.url(path), params)
            .map(String::from)
            .map_err(|e| StoreError::Transport(format!("无效的地址 {}: {}", self.url(path), e)))
    }

    // ===== 分类 =====

    fn categories_url(&self, use_web: bool) -> StoreResult<String> {
        if use_web {
            self.url_with_params(
                "/web/categories",
                &[("lang", self.lang.as_str()), ("arch", self.arch.as_str())],
            )
        } else {
            Ok(self.url("/visit/getDisCategoryList"))
        }
    }

    /// 获取分类接口原始响应
    pub async fn get_categories_raw(&self, use_web: bool) -> StoreResult<Value> {
        let response = self.transport.get(&self.categories_url(use_web)?).await?;
        response.json()
    }

    /// 获取分类列表，`use_web` 选择 /web/categories 接口
    pub async fn get_categories(&self, use_web: bool) -> StoreResult<Vec<Category>> {
        let response = self.transport.get(&self.categories_url(use_web)?).await?;
        if !response.is_success() {
            log::warn!("分类接口返回状态码 {}, 按空列表处理", response.status);
            return Ok(Vec::new());
        }

        let parsed: CategoryListResponse = response.json()?;
        Ok(parsed
            .data
            .unwrap_or_default()
            .into_iter()
            .map(Category::from)
            .collect())
    }

    /// 解析分类 ID：显式 ID 优先，其次按名称（不区分大小写）查找
    pub async fn resolve_category_id(
        &self,
        category_id: Option<&str>,
        category_name: Option<&str>,
        use_web: bool,
    ) -> StoreResult<Option<String>> {
        if let Some(id) = category_id.filter(|s| !s.is_empty()) {
            return Ok(Some(id.to_string()));
        }
        let Some(name) = category_name.filter(|s| !s.is_empty()) else {
            return Ok(None);
        };
        let categories = self.get_categories(use_web).await?;
        select_category_id(&categories, name).map(Some)
    }

    fn category_count_url(&self, category_id: &str) -> StoreResult<String> {
        self.url_with_params("/web/getCategoryAppCount", &[("categoryId", category_id)])
    }

    /// 获取分类应用数量接口原始响应，纯文本响应体按字符串返回
    pub async fn get_category_app_count_raw(&self, category_id: &str) -> StoreResult<Value> {
        let response = self.transport.get(&self.category_count_url(category_id)?).await?;
        Ok(serde_json::from_str(&response.body).unwrap_or(Value::String(response.body)))
    }

    pub async fn get_category_app_count(&self, category_id: &str) -> StoreResult<u64> {
        let response = self.transport.get(&self.category_count_url(category_id)?).await?;
        match parse_category_count(&response.body) {
            Err(e) if !response.is_success() => {
                log::debug!("分类数量响应无法解析: {}", e);
                Err(StoreError::Transport(format!("HTTP {}", response.status)))
            }
            other => other,
        }
    }

    // ===== 搜索 =====

    pub fn build_search_payload(
        &self,
        page_no: u32,
        page_size: u32,
        filters: &SearchFilters,
    ) -> SearchPayload {
        build_search_payload(
            page_no,
            page_size,
            &self.arch,
            &self.lang,
            Some(self.repo_name.as_str()),
            filters,
        )
    }

    /// 调用搜索接口，返回原始响应
    pub async fn search_apps(&self, payload: &SearchPayload) -> StoreResult<Value> {
        let body = serde_json::to_string(payload).map_err(|e| StoreError::Decode(e.to_string()))?;
        let response = self
            .transport
            .post_json(&self.url("/visit/getSearchAppList"), body, None)
            .await?;
        response.json()
    }

    pub async fn search(&self, payload: &SearchPayload) -> StoreResult<Vec<AppSummary>> {
        let response = self.search_apps(payload).await?;
        let items = extract_app_items(&response);
        log::debug!("搜索返回 {} 条记录", items.len());
        Ok(format_app_list(&items))
    }

    // ===== 详情 =====

    /// 获取应用详情原始响应。
    ///
    /// 请求体不带 lang，带上后服务端会返回空的截图列表。
    pub async fn get_app_detail_raw(&self, app_id: &str) -> StoreResult<Value> {
        let payload = serde_json::json!([{ "appId": app_id, "arch": self.arch }]);
        let response = self
            .transport
            .post_json(&self.url("/app/getAppDetail"), payload.to_string(), None)
            .await?;
        response.json()
    }

    pub async fn get_app_detail(&self, app_id: &str) -> StoreResult<AppDetail> {
        let response = self.get_app_detail_raw(app_id).await?;
        detail_from_response(&response, app_id)
    }
}

/// 在分类列表中按名称（不区分大小写）精确匹配，多个匹配时报错而不是任选其一
pub fn select_category_id(categories: &[Category], name: &str) -> StoreResult<String> {
    let wanted = name.to_lowercase();
    let matches: Vec<&Category> = categories
        .iter()
        .filter(|c| c.name.to_lowercase() == wanted)
        .collect();
    match matches.as_slice() {
        [] => Err(StoreError::CategoryNotFound(name.to_string())),
        [only] => Ok(only.id.clone()),
        many => Err(StoreError::AmbiguousCategory(
            many.iter().map(|c| c.name.clone()).collect(),
        )),
    }
}

/// 分类应用数量：`{"data": n}` 或纯数字文本
pub fn parse_category_count(body: &str) -> StoreResult<u64> {
    let trimmed = body.trim();
    let count = match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Number(n)) => n.as_u64(),
        Ok(Value::Object(map)) => match map.get("data") {
            Some(Value::Number(n)) => n.as_u64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        },
        Ok(_) => None,
        Err(_) if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) => {
            trimmed.parse().ok()
        }
        Err(_) => None,
    };
    count.ok_or_else(|| StoreError::UnparsableCountResponse(trimmed.chars().take(100).collect()))
}

/// 从详情响应的 `data.<appId>` 中取第一条记录
pub fn detail_from_response(response: &Value, app_id: &str) -> StoreResult<AppDetail> {
    let entries = match response.get("data").and_then(|data| data.get(app_id)) {
        None | Some(Value::Null) => Vec::new(),
        Some(value) => serde_json::from_value::<Vec<RawApp>>(value.clone())
            .map_err(|e| StoreError::Decode(format!("应用详情格式错误: {}", e)))?,
    };
    entries
        .first()
        .map(RawApp::to_detail)
        .ok_or_else(|| StoreError::AppNotFound(app_id.to_string()))
}
