// ==========================================
// 教材管理系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 教材流通与下学年需求预测 (人工最终决定补订)
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "de");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{CirculationMode, StockStatus};

// 领域实体
pub use domain::{
    Circulation, CirculationTotals, EvaluatedTextbook, FlexAllocation, Forecast,
    TextbookDocument, TextbookDraft, TextbookRecord,
};

// 引擎
pub use engine::{ForecastEvaluator, InventoryReporter, TextbookValidator, ValidationError};

// 配置
pub use config::ForecastConfig;

// API
pub use api::{ApiError, ApiResult, TextbookApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "Schulbuchverwaltung";
