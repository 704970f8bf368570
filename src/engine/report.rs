// ==========================================
// 教材管理系统 - 汇总报表引擎
// ==========================================
// 职责: 把已评估记录折叠为集合视图
// - 扁平行 (表格展示/导出)
// - 告警子集 (缺书清单)
// - 按班级/学科分组求和
// - 过滤 + 汇总指标
// ==========================================
// 红线: 无状态,每次读取重新计算
// 红线: 班级归属取自班级分布,不取自由文本 class_label
// ==========================================

use crate::domain::forecast::EvaluatedTextbook;
use crate::domain::textbook::Circulation;
use crate::domain::types::{CirculationMode, StockStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 中心库存分组键 (库存不属于任何班级)
pub const STOCK_GROUP: &str = "stock";

// ==========================================
// ForecastRow - 扁平报表行
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastRow {
    pub isbn: String,
    pub title: String,
    pub subject: String,
    pub class_label: String,
    pub mode: CirculationMode,
    pub class_breakdown: String,
    pub circulating_total: u64,
    pub returning_total: u64,
    pub retained_total: u64,
    pub stock_on_hand: u32,
    pub grand_total: u64,
    pub projected_need: u32,
    pub forecast_available: u64,
    pub shortfall: i64,
    pub alarm: bool,
    pub status: StockStatus,
    pub acquisition_date: String,
    pub orderable: bool,
    pub notes: String,
}

// ==========================================
// TextbookFilter - 集合过滤条件
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextbookFilter {
    pub subject: Option<String>,
    pub class: Option<String>,
    pub alarm_only: bool,
    pub text: Option<String>,
}

impl TextbookFilter {
    pub fn matches(&self, book: &EvaluatedTextbook) -> bool {
        let record = &book.record;

        if let Some(subject) = non_blank(&self.subject) {
            if record.subject != subject {
                return false;
            }
        }

        if let Some(class) = non_blank(&self.class) {
            if !record.class_label.contains(class) && !record.circulation.has_class(class) {
                return false;
            }
        }

        if self.alarm_only && !book.forecast.alarm {
            return false;
        }

        if let Some(text) = non_blank(&self.text) {
            let needle = text.to_lowercase();
            if !record.title.to_lowercase().contains(&needle)
                && !record.isbn.to_lowercase().contains(&needle)
            {
                return false;
            }
        }

        true
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

// ==========================================
// InventorySummary - 汇总指标
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySummary {
    pub title_count: usize,
    pub total_copies: u64,
    pub alarm_count: usize,
    pub missing_copies: u64,
}

// ==========================================
// InventoryReporter - 汇总报表引擎
// ==========================================
pub struct InventoryReporter {
    // 无状态引擎
}

impl InventoryReporter {
    pub fn new() -> Self {
        Self {}
    }

    /// 扁平行 (投影,不是新的数据模型)
    pub fn rows(&self, books: &[EvaluatedTextbook]) -> Vec<ForecastRow> {
        books.iter().map(to_row).collect()
    }

    /// 告警子集
    pub fn alarm_subset<'a>(&self, books: &'a [EvaluatedTextbook]) -> Vec<&'a EvaluatedTextbook> {
        books.iter().filter(|b| b.forecast.alarm).collect()
    }

    /// 按班级分组的 grand_total
    ///
    /// 班级册数取自班级分布,中心库存计入 STOCK_GROUP,
    /// 因此各组之和等于全部 grand_total 之和。
    pub fn grand_total_by_class(&self, books: &[EvaluatedTextbook]) -> BTreeMap<String, u64> {
        let mut groups: BTreeMap<String, u64> = BTreeMap::new();
        for book in books {
            for (class, held) in book.record.circulation.held_by_class() {
                *groups.entry(class).or_insert(0) += u64::from(held);
            }
            if book.record.stock_on_hand > 0 {
                *groups.entry(STOCK_GROUP.to_string()).or_insert(0) +=
                    u64::from(book.record.stock_on_hand);
            }
        }
        groups
    }

    /// 按学科分组的 grand_total
    pub fn grand_total_by_subject(&self, books: &[EvaluatedTextbook]) -> BTreeMap<String, u64> {
        let mut groups: BTreeMap<String, u64> = BTreeMap::new();
        for book in books {
            *groups.entry(book.record.subject.clone()).or_insert(0) += book.totals.grand_total;
        }
        groups
    }

    /// 汇总指标
    pub fn summary(&self, books: &[EvaluatedTextbook]) -> InventorySummary {
        InventorySummary {
            title_count: books.len(),
            total_copies: books.iter().map(|b| b.totals.grand_total).sum(),
            alarm_count: books.iter().filter(|b| b.forecast.alarm).count(),
            missing_copies: books.iter().map(|b| b.forecast.missing_copies()).sum(),
        }
    }

    /// 过滤
    pub fn filter(
        &self,
        books: &[EvaluatedTextbook],
        filter: &TextbookFilter,
    ) -> Vec<EvaluatedTextbook> {
        books.iter().filter(|b| filter.matches(b)).cloned().collect()
    }
}

impl Default for InventoryReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// 班级分布文本,按班级排序
///
/// - Single:   "7a: 28, 7b: 27"
/// - Double:   "C1: 5a: 30 | C2: 6a: 25" (只有一届时不加前缀)
/// - Flexible: "5a: 8(3↩), 6b: 5(5↩)"
pub fn class_breakdown(circulation: &Circulation) -> String {
    fn join_counts<'a>(entries: impl Iterator<Item = (&'a String, &'a u32)>) -> String {
        entries
            .map(|(class, count)| format!("{}: {}", class, count))
            .collect::<Vec<_>>()
            .join(", ")
    }

    match circulation {
        Circulation::Single {
            circulation_classes,
        } => join_counts(circulation_classes.iter()),
        Circulation::Double {
            cohort1_classes,
            cohort2_classes,
        } => {
            let c1 = join_counts(cohort1_classes.iter());
            let c2 = join_counts(cohort2_classes.iter());
            match (c1.is_empty(), c2.is_empty()) {
                (false, false) => format!("C1: {} | C2: {}", c1, c2),
                (false, true) => c1,
                _ => c2,
            }
        }
        Circulation::Flexible { flex_classes } => flex_classes
            .iter()
            .map(|(class, alloc)| format!("{}: {}({}↩)", class, alloc.held, alloc.returning))
            .collect::<Vec<_>>()
            .join(", "),
    }
}

fn to_row(book: &EvaluatedTextbook) -> ForecastRow {
    let record = &book.record;
    ForecastRow {
        isbn: record.isbn.clone(),
        title: record.title.clone(),
        subject: record.subject.clone(),
        class_label: record.class_label.clone(),
        mode: record.mode(),
        class_breakdown: class_breakdown(&record.circulation),
        circulating_total: book.totals.circulating_total,
        returning_total: book.totals.returning_total,
        retained_total: book.totals.retained_total,
        stock_on_hand: record.stock_on_hand,
        grand_total: book.totals.grand_total,
        projected_need: record.projected_need,
        forecast_available: book.forecast.forecast_available,
        shortfall: book.forecast.shortfall,
        alarm: book.forecast.alarm,
        status: book.status,
        acquisition_date: record.acquisition_date.clone(),
        orderable: record.orderable,
        notes: record.notes.clone(),
    }
}
