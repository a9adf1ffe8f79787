//! 错误类型定义

use std::path::PathBuf;
use thiserror::Error;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("请求失败: {0}")]
    Transport(String),

    #[error("响应解析失败: {0}")]
    Decode(String),

    #[error("未找到分类: {0}")]
    CategoryNotFound(String),

    #[error("分类名称不唯一, 匹配项: {}", .0.join(", "))]
    AmbiguousCategory(Vec<String>),

    #[error("无法解析分类应用数量: {0}")]
    UnparsableCountResponse(String),

    #[error("未找到应用: {0}")]
    AppNotFound(String),

    #[error("未找到 {0} 命令")]
    ToolUnavailable(String),

    #[error("获取应用列表失败: {0}")]
    ListFailed(String),

    #[error("更新检查接口调用超时 ({secs} 秒)")]
    RequestTimeout { secs: u64 },

    #[error("更新检查失败, 状态码: {}", .0.map(|c| c.to_string()).unwrap_or_else(|| "无".to_string()))]
    CheckRejected(Option<i64>),

    #[error("未找到已安装的应用")]
    NoInstalledApps,

    #[error("文件读写失败 {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("配置文件错误: {0}")]
    Config(String),
}
