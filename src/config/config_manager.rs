// ==========================================
// 教材管理系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value)
// 说明: 缺失或格式错误的配置项回退到默认值
// ==========================================

use crate::config::forecast_config::ForecastConfig;
use crate::db::open_sqlite_connection;
use rusqlite::{params, Connection};
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 写入配置值 (UPSERT)
    pub fn set_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        conn.execute(
            "INSERT INTO config_kv (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;

        tracing::info!(config_key = key, value = value, "配置已更新");
        Ok(())
    }

    // ===== 预测配置 =====

    /// 获取 reserve 缓冲量
    pub fn get_reserve_copies(&self) -> Result<u32, Box<dyn Error>> {
        let default = ForecastConfig::default().reserve_copies;
        let value = match self.get_config_value(config_keys::RESERVE_COPIES)? {
            Some(v) => v,
            None => return Ok(default),
        };

        Ok(value.trim().parse::<u32>().unwrap_or_else(|_| {
            tracing::warn!(
                config_key = config_keys::RESERVE_COPIES,
                raw_value = %value,
                "reserve 配置格式错误，使用默认值"
            );
            default
        }))
    }

    /// 读取 JSON 数组形式的目录配置
    fn get_catalog(&self, key: &str, default: Vec<String>) -> Result<Vec<String>, Box<dyn Error>> {
        let value = match self.get_config_value(key)? {
            Some(v) => v,
            None => return Ok(default),
        };

        match serde_json::from_str::<Vec<String>>(&value) {
            Ok(list) if !list.is_empty() => Ok(list),
            _ => {
                tracing::warn!(config_key = key, raw_value = %value, "目录配置格式错误，使用默认目录");
                Ok(default)
            }
        }
    }

    /// 加载完整预测配置 (缺失项取默认值)
    pub fn load_forecast_config(&self) -> Result<ForecastConfig, Box<dyn Error>> {
        let defaults = ForecastConfig::default();

        Ok(ForecastConfig {
            reserve_copies: self.get_reserve_copies()?,
            class_catalog: self.get_catalog(config_keys::CLASS_CATALOG, defaults.class_catalog)?,
            subject_catalog: self
                .get_catalog(config_keys::SUBJECT_CATALOG, defaults.subject_catalog)?,
        })
    }

    /// 保存完整预测配置
    pub fn save_forecast_config(&self, config: &ForecastConfig) -> Result<(), Box<dyn Error>> {
        self.set_config_value(
            config_keys::RESERVE_COPIES,
            &config.reserve_copies.to_string(),
        )?;
        self.set_config_value(
            config_keys::CLASS_CATALOG,
            &serde_json::to_string(&config.class_catalog)?,
        )?;
        self.set_config_value(
            config_keys::SUBJECT_CATALOG,
            &serde_json::to_string(&config.subject_catalog)?,
        )?;
        Ok(())
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    pub const RESERVE_COPIES: &str = "reserve_copies";
    pub const CLASS_CATALOG: &str = "class_catalog";
    pub const SUBJECT_CATALOG: &str = "subject_catalog";
}
