// ==========================================
// 教材管理系统 - 配置层
// ==========================================
// 职责: reserve 缓冲量与输入辅助目录,支持数据库覆写
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod forecast_config;

// 重导出核心配置
pub use config_manager::{config_keys, ConfigManager};
pub use forecast_config::{ForecastConfig, DEFAULT_RESERVE_COPIES};
