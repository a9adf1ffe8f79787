use crate::error::{StoreError, StoreResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_BASE_URL: &str = "https://storeapi.linyaps.org.cn";
pub const DEFAULT_ARCH: &str = "x86_64";
pub const DEFAULT_LANG: &str = "zh";
pub const DEFAULT_REPO: &str = "stable";

/// 商店 API 地址的环境变量覆盖
pub const BASE_URL_ENV: &str = "LINGLONG_STORE_API";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub arch: String,
    pub lang: String,
    pub repo_name: String,
    /// 更新检查流程的临时文件目录
    pub temp_dir: PathBuf,
    /// ll-cli 可执行文件
    pub ll_cli: String,
    /// 更新检查接口超时（秒）
    pub check_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            arch: DEFAULT_ARCH.to_string(),
            lang: DEFAULT_LANG.to_string(),
            repo_name: DEFAULT_REPO.to_string(),
            temp_dir: PathBuf::from("/tmp"),
            ll_cli: "ll-cli".to_string(),
            check_timeout_secs: 30,
        }
    }
}

impl Config {
    pub fn default_path() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".config/linglong-store/config.toml")
    }

    /// 读取配置文件，不存在时使用默认值。
    ///
    /// 优先级：配置文件 > 环境变量 > 默认值
    pub fn load_or_default() -> StoreResult<Self> {
        let mut config = Self::load_from(&Self::default_path())?;
        if config.base_url == DEFAULT_BASE_URL {
            if let Ok(url) = std::env::var(BASE_URL_ENV) {
                if !url.trim().is_empty() {
                    config.base_url = url;
                }
            }
        }
        Ok(config.normalized())
    }

    pub fn load_from(path: &Path) -> StoreResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> StoreResult<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| StoreError::Config(e.to_string()))?;
        Ok(config.normalized())
    }

    fn normalized(mut self) -> Self {
        let trimmed = self.base_url.trim_end_matches('/').len();
        self.base_url.truncate(trimmed);
        self
    }

    /// 用命令行参数覆盖配置项
    pub fn with_overrides(
        mut self,
        arch: Option<String>,
        lang: Option<String>,
        repo_name: Option<String>,
    ) -> Self {
        if let Some(arch) = arch {
            self.arch = arch;
        }
        if let Some(lang) = lang {
            self.lang = lang;
        }
        if let Some(repo_name) = repo_name {
            self.repo_name = repo_name;
        }
        self
    }
}
