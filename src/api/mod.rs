// ==========================================
// 教材管理系统 - API 层
// ==========================================
// 职责: 提供业务工作流接口,供展示/导出协作方调用
// ==========================================

pub mod error;
pub mod textbook_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use textbook_api::{InventoryReport, TextbookApi, TextbookDetail};
