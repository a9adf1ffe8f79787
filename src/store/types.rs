//! 商店数据类型定义

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// 商店分类
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    #[serde(rename = "categoryId")]
    pub id: String,
    #[serde(rename = "categoryName")]
    pub name: String,
    pub count: u64,
}

/// 应用摘要（搜索 / 分类列表条目）
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSummary {
    pub app_id: Option<String>,
    pub name: Option<String>,
    pub version: Option<String>,
    pub arch: Option<String>,
    pub description: Option<String>,
    pub repo_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// 应用详情，包含截图列表
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AppDetail {
    #[serde(flatten)]
    pub summary: AppSummary,
    pub screenshots: Vec<String>,
    pub size: Option<String>,
    pub developer: Option<String>,
    pub category: Option<String>,
}

// ========== 接口原始结构 ==========

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawCategory {
    #[serde(deserialize_with = "lenient_string")]
    pub category_id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub category_name: Option<String>,
    #[serde(deserialize_with = "lenient_count")]
    pub category_count: Option<u64>,
    #[serde(deserialize_with = "lenient_count")]
    pub count: Option<u64>,
}

impl From<RawCategory> for Category {
    fn from(raw: RawCategory) -> Self {
        // categoryCount 为 0 时同样回退到 count
        let count = raw
            .category_count
            .filter(|c| *c != 0)
            .or(raw.count)
            .unwrap_or(0);
        Self {
            id: raw.category_id.unwrap_or_default(),
            name: raw.category_name.unwrap_or_default(),
            count,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CategoryListResponse {
    #[serde(default)]
    pub data: Option<Vec<RawCategory>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawScreenshot {
    #[serde(deserialize_with = "lenient_string")]
    pub screenshot_key: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawApp {
    #[serde(deserialize_with = "lenient_string")]
    pub app_id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub zh_name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub version: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub arch: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub repo_name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub icon: Option<String>,
    #[serde(deserialize_with = "lenient_screenshots")]
    pub app_screenshot_list: Option<Vec<RawScreenshot>>,
    #[serde(deserialize_with = "lenient_string")]
    pub size: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub dev_name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub category_name: Option<String>,
}

impl RawApp {
    /// 优先使用中文名称，为空时回退到 name
    pub fn preferred_name(&self) -> Option<String> {
        non_empty(&self.zh_name).or_else(|| self.name.clone())
    }

    pub fn to_summary(&self) -> AppSummary {
        AppSummary {
            app_id: self.app_id.clone(),
            name: self.preferred_name(),
            version: self.version.clone(),
            arch: self.arch.clone(),
            description: self.description.clone(),
            repo_name: self.repo_name.clone(),
            icon: self.icon.clone(),
        }
    }

    pub fn to_detail(&self) -> AppDetail {
        let screenshots = self
            .app_screenshot_list
            .iter()
            .flatten()
            .filter_map(|shot| non_empty(&shot.screenshot_key))
            .collect();
        AppDetail {
            summary: self.to_summary(),
            screenshots,
            size: self.size.clone(),
            developer: self.dev_name.clone(),
            category: self.category_name.clone(),
        }
    }
}

/// 搜索接口 data 字段的几种形态，按顺序尝试。
///
/// 这里只判断外层形态，条目逐个转换。
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AppListData {
    Paged { list: Vec<Value> },
    Records { records: Vec<Value> },
    Bare(Vec<Value>),
    Other(serde::de::IgnoredAny),
}

/// 从搜索响应中取出应用条目，无法识别的形态返回空列表
pub fn extract_app_items(response: &Value) -> Vec<RawApp> {
    let data = response.get("data").cloned().unwrap_or(Value::Null);
    let items = match serde_json::from_value::<AppListData>(data) {
        Ok(AppListData::Paged { list }) => list,
        Ok(AppListData::Records { records }) => records,
        Ok(AppListData::Bare(items)) => items,
        Ok(AppListData::Other(_)) | Err(_) => Vec::new(),
    };

    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<RawApp>(item) {
            Ok(app) => Some(app),
            Err(e) => {
                log::debug!("跳过无法解析的应用条目: {}", e);
                None
            }
        })
        .collect()
}

pub fn format_app_list(items: &[RawApp]) -> Vec<AppSummary> {
    items.iter().map(RawApp::to_summary).collect()
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_deref().filter(|s| !s.is_empty()).map(str::to_string)
}

/// 接受字符串、数字或布尔值，其它类型视为缺失
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// 截图列表中非对象的条目直接忽略，非数组视为缺失
fn lenient_screenshots<'de, D>(deserializer: D) -> Result<Option<Vec<RawScreenshot>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => Some(
            items
                .into_iter()
                .filter(Value::is_object)
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
        ),
        _ => None,
    })
}

fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}
