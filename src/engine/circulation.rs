// ==========================================
// 教材管理系统 - 流通模式计算器
// ==========================================
// 职责: 按模式从班级分布计算 流通总数 / 归还总数 / 总册数
// 输入: 已校验的班级分布 + 中心库存
// 输出: CirculationTotals
// ==========================================
// 红线: 纯函数,无错误分支 (returning <= held 由校验层保证)
// ==========================================

use crate::domain::forecast::CirculationTotals;
use crate::domain::textbook::{Circulation, ClassCounts, FlexClasses, TextbookRecord};

fn sum_counts(classes: &ClassCounts) -> u64 {
    classes.values().map(|&v| u64::from(v)).sum()
}

/// Single 模式: 全部班级年底归还
pub fn single_totals(circulation_classes: &ClassCounts, stock_on_hand: u32) -> CirculationTotals {
    let circulating_total = sum_counts(circulation_classes);

    CirculationTotals {
        circulating_total,
        returning_total: circulating_total,
        retained_total: 0,
        grand_total: circulating_total + u64::from(stock_on_hand),
    }
}

/// Double 模式: 第1届保留,只有第2届归还
pub fn double_totals(
    cohort1_classes: &ClassCounts,
    cohort2_classes: &ClassCounts,
    stock_on_hand: u32,
) -> CirculationTotals {
    let cohort1_total = sum_counts(cohort1_classes);
    let cohort2_total = sum_counts(cohort2_classes);
    let circulating_total = cohort1_total + cohort2_total;

    CirculationTotals {
        circulating_total,
        returning_total: cohort2_total,
        retained_total: cohort1_total,
        grand_total: circulating_total + u64::from(stock_on_hand),
    }
}

/// Flexible 模式: 逐班累加 held / returning
pub fn flexible_totals(flex_classes: &FlexClasses, stock_on_hand: u32) -> CirculationTotals {
    let mut circulating_total = 0u64;
    let mut returning_total = 0u64;
    let mut retained_total = 0u64;

    for alloc in flex_classes.values() {
        circulating_total += u64::from(alloc.held);
        returning_total += u64::from(alloc.returning);
        retained_total += u64::from(alloc.retained());
    }

    CirculationTotals {
        circulating_total,
        returning_total,
        retained_total,
        grand_total: circulating_total + u64::from(stock_on_hand),
    }
}

/// 按记录的当前模式分派
pub fn circulation_totals(record: &TextbookRecord) -> CirculationTotals {
    match &record.circulation {
        Circulation::Single {
            circulation_classes,
        } => single_totals(circulation_classes, record.stock_on_hand),
        Circulation::Double {
            cohort1_classes,
            cohort2_classes,
        } => double_totals(cohort1_classes, cohort2_classes, record.stock_on_hand),
        Circulation::Flexible { flex_classes } => {
            flexible_totals(flex_classes, record.stock_on_hand)
        }
    }
}
