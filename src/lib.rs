//! 玲珑应用商店命令行工具：商店查询与已安装应用更新检查

pub mod config;
pub mod error;
pub mod http;
pub mod store;
pub mod updater;

pub use config::Config;
pub use error::{StoreError, StoreResult};
