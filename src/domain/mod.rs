// ==========================================
// 教材管理系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、派生视图
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod forecast;
pub mod textbook;
pub mod types;

// 重导出核心类型
pub use forecast::{CirculationTotals, EvaluatedTextbook, Forecast};
pub use textbook::{
    split_class_list, Circulation, ClassCounts, FlexAllocation, FlexClasses, TextbookDocument,
    TextbookDraft, TextbookRecord,
};
pub use types::{CirculationMode, StockStatus};
