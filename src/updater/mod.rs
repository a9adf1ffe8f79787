//! 玲珑应用更新检查 — 对 ll-cli list 输出与商店更新接口的封装

pub mod checker;
pub mod parser;
pub mod reconcile;
pub mod report;

pub use checker::UpdateChecker;
pub use parser::{extract_records, parse_installed_line, InstalledApp, LineVerdict, SkipReason};
pub use reconcile::{is_runtime, reconcile, CheckResult, UpdateEntry, UpdateStatus};
pub use report::{ReportSaver, Summary};
