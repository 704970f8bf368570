// ==========================================
// 教材管理系统 - 预测结果领域模型
// ==========================================
// 职责: 流通汇总 + 下学年可用量预测的值对象
// 红线: 纯派生视图,不作为权威数据持久化
// ==========================================

use crate::domain::textbook::TextbookRecord;
use crate::domain::types::StockStatus;
use serde::{Deserialize, Serialize};

// ==========================================
// CirculationTotals - 模式计算器输出
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CirculationTotals {
    pub circulating_total: u64, // 班级手中的册数
    pub returning_total: u64,   // 换学年时归还库存的册数
    pub retained_total: u64,    // 班级继续保留的册数 (只展示,不计入可用量)
    pub grand_total: u64,       // circulating_total + stock_on_hand
}

// ==========================================
// Forecast - 下学年展望
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Forecast {
    pub reserve_surplus: u64,    // max(stock_on_hand - reserve, 0)
    pub forecast_available: u64, // returning_total + reserve_surplus
    pub shortfall: i64,          // forecast_available - projected_need (有符号,不截断)
    pub alarm: bool,             // shortfall < 0
}

impl Forecast {
    /// 缺少的册数 (无缺口时为 0)
    pub fn missing_copies(&self) -> u64 {
        if self.shortfall < 0 {
            self.shortfall.unsigned_abs()
        } else {
            0
        }
    }
}

// ==========================================
// EvaluatedTextbook - 记录 + 派生字段
// ==========================================
// 交给展示/导出协作方时所有字段均已计算完毕
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluatedTextbook {
    pub record: TextbookRecord,
    pub totals: CirculationTotals,
    pub forecast: Forecast,
    pub status: StockStatus,
}

impl EvaluatedTextbook {
    pub fn isbn(&self) -> &str {
        &self.record.isbn
    }

    pub fn is_alarm(&self) -> bool {
        self.forecast.alarm
    }
}
