//! 更新检查流程
//!
//! 获取列表 -> 提取记录 -> 提交检查 -> 对比 -> 报告，任一步失败即终止。
//! 步骤之间通过临时目录中的文件传递数据。

use super::parser::{extract_records, InstalledApp};
use super::reconcile::{reconcile, CheckResult, UpdateStatus};
use super::report::{ReportSaver, Summary};
use crate::config::Config;
use crate::error::{StoreError, StoreResult};
use crate::http::{HttpTransport, Transport};
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const LIST_FILE: &str = "ll_cli_list.txt";
pub const REQUEST_FILE: &str = "app_check_update.json";
pub const RESULT_FILE: &str = "update_check_result.json";

pub struct UpdateChecker<T: Transport = HttpTransport> {
    transport: T,
    temp_dir: PathBuf,
    ll_cli: String,
    arch: String,
    api_url: String,
    timeout: Duration,
    print_report: bool,
}

impl UpdateChecker<HttpTransport> {
    pub fn new(config: &Config) -> Self {
        Self::with_transport(config, HttpTransport::new())
    }
}

impl<T: Transport> UpdateChecker<T> {
    pub fn with_transport(config: &Config, transport: T) -> Self {
        Self {
            transport,
            temp_dir: config.temp_dir.clone(),
            ll_cli: config.ll_cli.clone(),
            arch: config.arch.clone(),
            api_url: format!("{}/app/appCheckUpdate", config.base_url.trim_end_matches('/')),
            timeout: Duration::from_secs(config.check_timeout_secs),
            print_report: true,
        }
    }

    /// 是否在 report 阶段把报告打印到标准输出
    pub fn print_report(mut self, enabled: bool) -> Self {
        self.print_report = enabled;
        self
    }

    pub fn list_file(&self) -> PathBuf {
        self.temp_dir.join(LIST_FILE)
    }

    pub fn request_file(&self) -> PathBuf {
        self.temp_dir.join(REQUEST_FILE)
    }

    pub fn result_file(&self) -> PathBuf {
        self.temp_dir.join(RESULT_FILE)
    }

    /// 执行 `ll-cli list` 并保存输出
    pub fn list_installed(&self) -> StoreResult<String> {
        log::info!("正在获取已安装应用列表...");
        let output = duct::cmd(self.ll_cli.as_str(), ["list"])
            .stdout_capture()
            .stderr_capture()
            .unchecked()
            .run()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => StoreError::ToolUnavailable(self.ll_cli.clone()),
                _ => StoreError::ListFailed(e.to_string()),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(StoreError::ListFailed(stderr));
        }

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        write_file(&self.list_file(), &stdout)?;
        log::info!("已保存应用列表到 {}", self.list_file().display());
        Ok(stdout)
    }

    /// 从保存的列表文件中提取已安装应用
    pub fn extract_installed_apps(&self) -> StoreResult<Vec<InstalledApp>> {
        let path = self.list_file();
        let bytes = fs::read(&path).map_err(|source| StoreError::Io { path, source })?;
        Ok(extract_records(&String::from_utf8_lossy(&bytes), &self.arch))
    }

    pub fn save_check_request(&self, apps: &[InstalledApp]) -> StoreResult<PathBuf> {
        let body =
            serde_json::to_string_pretty(apps).map_err(|e| StoreError::Decode(e.to_string()))?;
        let path = self.request_file();
        write_file(&path, &body)?;
        log::info!("已保存更新检查请求到 {}", path.display());
        Ok(path)
    }

    /// 提交更新检查请求，请求体取自保存的请求文件
    pub async fn submit_check_request(&self, apps: &[InstalledApp]) -> StoreResult<CheckResult> {
        let request_path = self.save_check_request(apps)?;
        let body = fs::read_to_string(&request_path).map_err(|source| StoreError::Io {
            path: request_path.clone(),
            source,
        })?;

        log::info!("正在检查更新...");
        let response = self
            .transport
            .post_json(&self.api_url, body, Some(self.timeout))
            .await?;
        let value: Value = response.json()?;

        let pretty =
            serde_json::to_string_pretty(&value).map_err(|e| StoreError::Decode(e.to_string()))?;
        write_file(&self.result_file(), &pretty)?;

        let result: CheckResult = serde_json::from_value(value)
            .map_err(|e| StoreError::Decode(format!("更新检查结果格式错误: {}", e)))?;
        log::info!("更新检查完成，状态码: {:?}", result.code);
        Ok(result)
    }

    /// 汇总并输出报告
    pub fn report(&self, statuses: Vec<UpdateStatus>) -> StoreResult<Summary> {
        let summary = Summary::from_statuses(statuses);
        let text = summary.render();
        if self.print_report {
            println!("{}", text);
        }
        let path = ReportSaver::new(&self.temp_dir).save(&text)?;
        log::info!("报告已保存到 {}", path.display());
        Ok(summary)
    }

    /// 获取并提取已安装应用列表
    pub fn installed_apps(&self) -> StoreResult<Vec<InstalledApp>> {
        fs::create_dir_all(&self.temp_dir).map_err(|source| StoreError::Io {
            path: self.temp_dir.clone(),
            source,
        })?;
        self.list_installed()?;
        self.extract_installed_apps()
    }

    pub async fn try_full_check(&self) -> StoreResult<Summary> {
        let apps = self.installed_apps()?;
        if apps.is_empty() {
            return Err(StoreError::NoInstalledApps);
        }
        log::info!("共提取 {} 个应用", apps.len());

        let result = self.submit_check_request(&apps).await?;
        if !result.is_ok() {
            return Err(StoreError::CheckRejected(result.code));
        }

        self.report(reconcile(&apps, &result))
    }

    /// 执行完整更新检查，失败时输出诊断并返回 None
    pub async fn run_full_check(&self) -> Option<Summary> {
        match self.try_full_check().await {
            Ok(summary) => Some(summary),
            Err(e) => {
                log::error!("更新检查失败: {}", e);
                eprintln!("更新检查失败: {}", e);
                None
            }
        }
    }
}

fn write_file(path: &Path, content: &str) -> StoreResult<()> {
    fs::write(path, content).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::CannedTransport;

    fn checker(dir: &Path, ll_cli: &str, transport: CannedTransport) -> UpdateChecker<CannedTransport> {
        let config = Config {
            base_url: "http://store.test".into(),
            temp_dir: dir.to_path_buf(),
            ll_cli: ll_cli.into(),
            ..Config::default()
        };
        UpdateChecker::with_transport(&config, transport).print_report(false)
    }

    fn apps() -> Vec<InstalledApp> {
        vec![
            InstalledApp { app_id: "a".into(), arch: "x86_64".into(), version: "1.0".into() },
            InstalledApp { app_id: "b".into(), arch: "x86_64".into(), version: "2.0".into() },
        ]
    }

    #[test]
    fn missing_tool_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let checker = checker(dir.path(), "/nonexistent/bin/ll-cli", CannedTransport::default());
        assert!(matches!(checker.list_installed(), Err(StoreError::ToolUnavailable(_))));
    }

    #[test]
    fn nonzero_exit_is_list_failure() {
        let dir = tempfile::tempdir().unwrap();
        let checker = checker(dir.path(), "false", CannedTransport::default());
        assert!(matches!(checker.list_installed(), Err(StoreError::ListFailed(_))));
        assert!(!checker.list_file().exists());
    }

    #[test]
    fn extraction_reads_the_saved_listing() {
        let dir = tempfile::tempdir().unwrap();
        let checker = checker(dir.path(), "ll-cli", CannedTransport::default());
        fs::write(checker.list_file(), "ID  名称  版本\norg.app  App  1.2.3\n").unwrap();
        let apps = checker.extract_installed_apps().unwrap();
        assert_eq!(apps.len(), 1);
        assert_eq!(apps[0].app_id, "org.app");
    }

    #[tokio::test]
    async fn submit_posts_request_file_and_saves_result() {
        let dir = tempfile::tempdir().unwrap();
        let transport = CannedTransport::ok(
            r#"{"code":200,"data":[{"appId":"a","newVersion":"1.1","categoryName":"工具"}]}"#,
        );
        let checker = checker(dir.path(), "ll-cli", transport);
        let result = checker.submit_check_request(&apps()).await.unwrap();
        assert!(result.is_ok());
        assert_eq!(result.entries().len(), 1);

        let (url, body) = checker.transport.recorded().remove(0);
        assert_eq!(url, "http://store.test/app/appCheckUpdate");
        let sent: Vec<InstalledApp> = serde_json::from_str(&body.unwrap()).unwrap();
        assert_eq!(sent, apps());
        assert!(checker.request_file().exists());
        let saved: Value =
            serde_json::from_str(&fs::read_to_string(checker.result_file()).unwrap()).unwrap();
        assert_eq!(saved["code"], 200);
    }

    #[tokio::test]
    async fn undecodable_result_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let checker = checker(dir.path(), "ll-cli", CannedTransport::ok("<html>"));
        assert!(matches!(
            checker.submit_check_request(&apps()).await,
            Err(StoreError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn timeout_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let transport =
            CannedTransport::with(vec![Err(StoreError::RequestTimeout { secs: 30 })]);
        let checker = checker(dir.path(), "ll-cli", transport);
        assert!(matches!(
            checker.submit_check_request(&apps()).await,
            Err(StoreError::RequestTimeout { secs: 30 })
        ));
    }

    #[tokio::test]
    async fn failed_listing_short_circuits() {
        let dir = tempfile::tempdir().unwrap();
        let checker = checker(dir.path(), "false", CannedTransport::default());
        assert!(checker.run_full_check().await.is_none());
        assert!(checker.transport.recorded().is_empty());
    }

    #[test]
    fn report_saves_rendered_text() {
        let dir = tempfile::tempdir().unwrap();
        let checker = checker(dir.path(), "ll-cli", CannedTransport::default());
        let result: CheckResult =
            serde_json::from_str(r#"{"code":200,"data":[{"appId":"b","newVersion":"2.1"}]}"#)
                .unwrap();
        let summary = checker.report(reconcile(&apps(), &result)).unwrap();
        assert_eq!(summary.updateable_ids(), vec!["b"]);
        let saved = fs::read_to_string(dir.path().join(ReportSaver::FILE_NAME)).unwrap();
        assert!(saved.contains("b (当前版本: 2.0 → 最新版本: 2.1)"));
    }
}
