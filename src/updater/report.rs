use super::reconcile::UpdateStatus;
use crate::error::{StoreError, StoreResult};
use chrono::Local;
use serde::Serialize;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

const RULE_WIDTH: usize = 120;

/// 更新检查统计结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub runtime_count: usize,
    pub updateable_count: usize,
    pub updateable: Vec<UpdateStatus>,
    pub up_to_date: Vec<UpdateStatus>,
}

impl Summary {
    /// 统计并分组，保持 reconcile 给出的顺序
    pub fn from_statuses(statuses: Vec<UpdateStatus>) -> Self {
        let total = statuses.len();
        let runtime_count = statuses.iter().filter(|s| s.is_runtime).count();
        let (updateable, up_to_date): (Vec<_>, Vec<_>) =
            statuses.into_iter().partition(|s| s.needs_update);

        Self {
            total,
            runtime_count,
            updateable_count: updateable.len(),
            updateable,
            up_to_date,
        }
    }

    pub fn app_count(&self) -> usize {
        self.total - self.runtime_count
    }

    pub fn updateable_ids(&self) -> Vec<&str> {
        self.updateable.iter().map(|s| s.app_id.as_str()).collect()
    }

    /// 生成纯文本报告
    pub fn render(&self) -> String {
        let rule = "=".repeat(RULE_WIDTH);
        let mut out = String::new();

        let _ = writeln!(out, "\n{}", rule);
        let _ = writeln!(out, "玲珑应用安装与更新统计报告");
        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out, "\n已安装应用总数: {} 个", self.total);
        let _ = writeln!(out, "其中运行时环境: {} 个", self.runtime_count);
        let _ = writeln!(out, "应用软件: {} 个", self.app_count());
        let _ = writeln!(out, "需要更新: {} 个", self.updateable_count);

        let _ = writeln!(out, "\n{}", rule);
        let _ = writeln!(out, "【需要更新的应用】");
        let _ = writeln!(out, "{}", rule);
        for (i, app) in self.updateable.iter().enumerate() {
            let _ = writeln!(
                out,
                "{}. {} (当前版本: {} → 最新版本: {}) - 分类: {}",
                i + 1,
                app.app_id,
                app.current_version,
                app.new_version,
                app.category.as_deref().unwrap_or_default()
            );
        }

        let _ = writeln!(out, "\n{}", rule);
        let _ = writeln!(out, "【已是最新版本的应用】");
        let _ = writeln!(out, "{}", rule);
        for (i, app) in self.up_to_date.iter().enumerate() {
            let marker = if app.is_runtime { " [运行时]" } else { "" };
            let _ = writeln!(out, "{}. {} ({}){}", i + 1, app.app_id, app.current_version, marker);
        }

        let _ = writeln!(out, "\n{}", rule);
        let _ = writeln!(out, "更新建议:");
        let _ = writeln!(out, "{}", rule);
        if self.updateable_count > 0 {
            let _ = writeln!(out, "• 建议优先更新浏览器应用以获得更好的安全性和性能");
            let _ = writeln!(out, "• 大型应用更新包较大，可在网络空闲时更新");
            let _ = writeln!(out, "• 运行时环境更新会影响依赖它的应用，建议一并更新");
        } else {
            let _ = writeln!(out, "• 所有应用都是最新版本，无需更新");
        }
        let _ = write!(out, "{}", rule);

        out
    }
}

/// 将报告写入临时目录
pub struct ReportSaver {
    base_dir: PathBuf,
}

impl ReportSaver {
    pub const FILE_NAME: &'static str = "update_report.txt";

    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.base_dir.join(Self::FILE_NAME)
    }

    pub fn save(&self, content: &str) -> StoreResult<PathBuf> {
        fs::create_dir_all(&self.base_dir).map_err(|source| io_error(&self.base_dir, source))?;

        let now = Local::now();
        let mut full_content = format!(
            "玲珑应用更新报告\n生成时间: {}\n",
            now.format("%Y-%m-%d %H:%M:%S")
        );
        full_content.push_str(content);
        full_content.push('\n');

        let filepath = self.path();
        fs::write(&filepath, full_content).map_err(|source| io_error(&filepath, source))?;
        Ok(filepath)
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}
