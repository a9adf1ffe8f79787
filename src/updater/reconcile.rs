//! 已安装列表与更新检查结果对比

use super::parser::InstalledApp;
use crate::store::types::lenient_string;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 更新检查接口响应
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckResult {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
    #[serde(default)]
    pub data: Option<Vec<UpdateEntry>>,
}

impl CheckResult {
    pub fn is_ok(&self) -> bool {
        self.code == Some(200)
    }

    pub fn entries(&self) -> &[UpdateEntry] {
        self.data.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateEntry {
    /// 缺少 appId 的条目在对比时忽略
    #[serde(deserialize_with = "lenient_string")]
    pub app_id: Option<String>,
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub new_version: Option<String>,
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
}

impl UpdateEntry {
    /// 商店中的最新版本，newVersion 缺失时回退到 version
    pub fn latest_version(&self) -> &str {
        self.new_version
            .as_deref()
            .or(self.version.as_deref())
            .unwrap_or_default()
    }
}

/// 单个已安装应用的更新状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatus {
    pub app_id: String,
    pub current_version: String,
    pub new_version: String,
    pub is_runtime: bool,
    pub needs_update: bool,
    pub category: Option<String>,
}

/// 应用 ID 中包含 runtime（不区分大小写）即视为运行时环境
pub fn is_runtime(app_id: &str) -> bool {
    app_id.to_lowercase().contains("runtime")
}

/// 对比已安装应用与检查结果：需要更新的排在前面，组内按 appId 升序
pub fn reconcile(installed: &[InstalledApp], check: &CheckResult) -> Vec<UpdateStatus> {
    let latest: HashMap<&str, &UpdateEntry> = check
        .entries()
        .iter()
        .filter_map(|entry| {
            let app_id = entry.app_id.as_deref().filter(|id| !id.is_empty())?;
            Some((app_id, entry))
        })
        .collect();

    let mut statuses: Vec<UpdateStatus> = installed
        .iter()
        .map(|app| {
            let entry = latest.get(app.app_id.as_str());
            UpdateStatus {
                app_id: app.app_id.clone(),
                current_version: app.version.clone(),
                new_version: entry.map(|e| e.latest_version().to_string()).unwrap_or_default(),
                is_runtime: is_runtime(&app.app_id),
                needs_update: entry.is_some(),
                category: entry.and_then(|e| e.category_name.clone()),
            }
        })
        .collect();

    statuses.sort_by(|a, b| (!a.needs_update, &a.app_id).cmp(&(!b.needs_update, &b.app_id)));
    statuses
}
