//! 搜索请求体构造
//!
//! 可选字段只在取值非空时写入请求体：服务端对"显式空字段"和"缺省字段"的处理不同。

use serde::Serialize;

/// 可选的搜索过滤条件
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilters {
    pub name: Option<String>,
    pub zh_name: Option<String>,
    pub category_id: Option<String>,
    pub module: Option<String>,
    pub version: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPayload {
    pub page_no: u32,
    pub page_size: u32,
    pub arch: String,
    pub lan: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zh_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
}

pub fn build_search_payload(
    page_no: u32,
    page_size: u32,
    arch: &str,
    lang: &str,
    repo_name: Option<&str>,
    filters: &SearchFilters,
) -> SearchPayload {
    SearchPayload {
        page_no,
        page_size,
        arch: arch.to_string(),
        lan: lang.to_string(),
        repo_name: repo_name.filter(|s| !s.is_empty()).map(str::to_string),
        name: present(&filters.name),
        zh_name: present(&filters.zh_name),
        category_id: present(&filters.category_id),
        module: present(&filters.module),
        version: present(&filters.version),
        sort: present(&filters.sort),
        order: present(&filters.order),
    }
}

fn present(value: &Option<String>) -> Option<String> {
    value.as_deref().filter(|s| !s.is_empty()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn keys(payload: &SearchPayload) -> Vec<String> {
        let value = serde_json::to_value(payload).unwrap();
        let mut keys: Vec<String> = value.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    #[test]
    fn required_fields_always_present() {
        let payload = build_search_payload(1, 20, "", "", None, &SearchFilters::default());
        assert_eq!(keys(&payload), vec!["arch", "lan", "pageNo", "pageSize"]);
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["arch"], Value::String(String::new()));
    }

    #[test]
    fn empty_optional_values_are_omitted() {
        let filters = SearchFilters {
            name: Some(String::new()),
            zh_name: None,
            category_id: Some(String::new()),
            module: Some("binary".into()),
            version: None,
            sort: Some(String::new()),
            order: Some("desc".into()),
        };
        let payload = build_search_payload(2, 10, "arm64", "en", Some(""), &filters);
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "pageNo": 2,
                "pageSize": 10,
                "arch": "arm64",
                "lan": "en",
                "module": "binary",
                "order": "desc"
            })
        );
    }

    #[test]
    fn all_optional_fields_serialize_with_api_names() {
        let filters = SearchFilters {
            name: Some("wps".into()),
            zh_name: Some("办公".into()),
            category_id: Some("12".into()),
            module: Some("binary".into()),
            version: Some("1.0".into()),
            sort: Some("installedCount".into()),
            order: Some("asc".into()),
        };
        let payload = build_search_payload(1, 20, "x86_64", "zh", Some("stable"), &filters);
        assert_eq!(
            keys(&payload),
            vec![
                "arch", "categoryId", "lan", "module", "name", "order", "pageNo", "pageSize",
                "repoName", "sort", "version", "zhName"
            ]
        );
    }
}
