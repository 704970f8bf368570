// ==========================================
// 教材管理系统 - 引擎层
// ==========================================
// 职责: 流通计算、预测评估、校验、旧数据迁移、汇总
// 红线: Engine 不拼 SQL, 全部为内存中的确定性变换
// ==========================================
// 流程: 记录加载/构造 → 校验 → 模式计算 + 预测评估 → 汇总
// ==========================================

pub mod circulation;
pub mod forecast;
pub mod migration;
pub mod report;
pub mod validation;

// 重导出核心引擎
pub use circulation::{circulation_totals, double_totals, flexible_totals, single_totals};
pub use forecast::ForecastEvaluator;
pub use migration::{migrate_document, resolve_mode};
pub use report::{
    class_breakdown, ForecastRow, InventoryReporter, InventorySummary, TextbookFilter, STOCK_GROUP,
};
pub use validation::{TextbookValidator, ValidationError};
