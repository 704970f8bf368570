// ==========================================
// 教材管理系统 - 预测评估引擎
// ==========================================
// 职责: 归还总数 + 库存 + reserve → 下学年可用量 / 缺口 / 告警
// 输入: TextbookRecord (已校验)
// 输出: EvaluatedTextbook
// ==========================================
// 红线: 派生字段每次重新计算,不读取任何缓存值
// ==========================================

use crate::config::ForecastConfig;
use crate::domain::forecast::{CirculationTotals, EvaluatedTextbook, Forecast};
use crate::domain::textbook::TextbookRecord;
use crate::domain::types::StockStatus;
use crate::engine::circulation::circulation_totals;
use tracing::debug;

// ==========================================
// ForecastEvaluator - 预测评估引擎
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct ForecastEvaluator {
    reserve_copies: u32,
}

impl ForecastEvaluator {
    pub fn new(config: &ForecastConfig) -> Self {
        Self {
            reserve_copies: config.reserve_copies,
        }
    }

    pub fn reserve_copies(&self) -> u32 {
        self.reserve_copies
    }

    /// 库存中超出 reserve 的部分
    pub fn reserve_surplus(&self, stock_on_hand: u32) -> u64 {
        u64::from(stock_on_hand.saturating_sub(self.reserve_copies))
    }

    /// 根据流通汇总计算下学年展望
    ///
    /// # 算法
    /// - reserve_surplus    = max(stock_on_hand - reserve, 0)
    /// - forecast_available = returning_total + reserve_surplus
    /// - shortfall          = forecast_available - projected_need
    /// - alarm              = shortfall < 0
    pub fn forecast(
        &self,
        totals: &CirculationTotals,
        stock_on_hand: u32,
        projected_need: u32,
    ) -> Forecast {
        let reserve_surplus = self.reserve_surplus(stock_on_hand);
        let forecast_available = totals.returning_total + reserve_surplus;
        let shortfall = to_signed(forecast_available) - i64::from(projected_need);

        Forecast {
            reserve_surplus,
            forecast_available,
            shortfall,
            alarm: shortfall < 0,
        }
    }

    /// 库存状态分级
    ///
    /// - Shortage: 有缺口
    /// - Tight: 余量 < reserve
    /// - Sufficient: 其余
    pub fn stock_status(&self, forecast: &Forecast) -> StockStatus {
        if forecast.alarm {
            StockStatus::Shortage
        } else if forecast.shortfall < i64::from(self.reserve_copies) {
            StockStatus::Tight
        } else {
            StockStatus::Sufficient
        }
    }

    /// 评估单条记录
    pub fn evaluate(&self, record: &TextbookRecord) -> EvaluatedTextbook {
        let totals = circulation_totals(record);
        let forecast = self.forecast(&totals, record.stock_on_hand, record.projected_need);
        let status = self.stock_status(&forecast);

        debug!(
            isbn = %record.isbn,
            mode = %record.mode(),
            returning_total = totals.returning_total,
            forecast_available = forecast.forecast_available,
            shortfall = forecast.shortfall,
            "教材预测已计算"
        );

        EvaluatedTextbook {
            record: record.clone(),
            totals,
            forecast,
            status,
        }
    }

    /// 批量评估 (记录之间无依赖)
    pub fn evaluate_all(&self, records: &[TextbookRecord]) -> Vec<EvaluatedTextbook> {
        records.iter().map(|r| self.evaluate(r)).collect()
    }
}

impl Default for ForecastEvaluator {
    fn default() -> Self {
        Self::new(&ForecastConfig::default())
    }
}

fn to_signed(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::textbook::{Circulation, ClassCounts, FlexAllocation, FlexClasses};

    fn record(circulation: Circulation, stock_on_hand: u32, projected_need: u32) -> TextbookRecord {
        TextbookRecord {
            isbn: "978-3-06-000000-0".to_string(),
            title: "Testbuch".to_string(),
            subject: "Deutsch".to_string(),
            class_label: "7".to_string(),
            circulation,
            stock_on_hand,
            projected_need,
            acquisition_date: "2024-08-15".to_string(),
            orderable: true,
            notes: String::new(),
        }
    }

    fn counts(entries: &[(&str, u32)]) -> ClassCounts {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_reserve_boundary() {
        let evaluator = ForecastEvaluator::default();
        assert_eq!(evaluator.reserve_surplus(0), 0);
        assert_eq!(evaluator.reserve_surplus(5), 0);
        assert_eq!(evaluator.reserve_surplus(6), 1);
    }

    #[test]
    fn test_scenario_single() {
        let evaluator = ForecastEvaluator::default();
        let book = record(
            Circulation::Single {
                circulation_classes: counts(&[("7a", 28), ("7b", 27)]),
            },
            10,
            60,
        );

        let evaluated = evaluator.evaluate(&book);
        assert_eq!(evaluated.totals.circulating_total, 55);
        assert_eq!(evaluated.forecast.reserve_surplus, 5);
        assert_eq!(evaluated.forecast.forecast_available, 60);
        assert_eq!(evaluated.forecast.shortfall, 0);
        assert!(!evaluated.forecast.alarm);
        assert_eq!(evaluated.status, StockStatus::Tight);
    }

    #[test]
    fn test_scenario_double() {
        let evaluator = ForecastEvaluator::default();
        let book = record(
            Circulation::Double {
                cohort1_classes: counts(&[("5a", 30)]),
                cohort2_classes: counts(&[("6a", 25)]),
            },
            3,
            40,
        );

        let evaluated = evaluator.evaluate(&book);
        assert_eq!(evaluated.forecast.forecast_available, 25);
        assert_eq!(evaluated.forecast.shortfall, -15);
        assert!(evaluated.forecast.alarm);
        assert_eq!(evaluated.forecast.missing_copies(), 15);
        assert_eq!(evaluated.status, StockStatus::Shortage);
    }

    #[test]
    fn test_double_ignores_cohort1() {
        let evaluator = ForecastEvaluator::default();
        let small = record(
            Circulation::Double {
                cohort1_classes: counts(&[("5a", 1)]),
                cohort2_classes: counts(&[("6a", 25)]),
            },
            12,
            20,
        );
        let mut large = small.clone();
        large.circulation = Circulation::Double {
            cohort1_classes: counts(&[("5a", 300), ("5b", 29)]),
            cohort2_classes: counts(&[("6a", 25)]),
        };

        assert_eq!(
            evaluator.evaluate(&small).forecast,
            evaluator.evaluate(&large).forecast
        );
    }

    #[test]
    fn test_scenario_flexible() {
        let evaluator = ForecastEvaluator::default();
        let flex: FlexClasses = [
            ("5a".to_string(), FlexAllocation::new(8, 3)),
            ("6b".to_string(), FlexAllocation::new(5, 5)),
        ]
        .into_iter()
        .collect();
        let book = record(Circulation::Flexible { flex_classes: flex }, 8, 6);

        let evaluated = evaluator.evaluate(&book);
        assert_eq!(evaluated.totals.returning_total, 8);
        assert_eq!(evaluated.totals.retained_total, 5);
        assert_eq!(evaluated.forecast.reserve_surplus, 3);
        assert_eq!(evaluated.forecast.forecast_available, 11);
        assert_eq!(evaluated.forecast.shortfall, 5);
        assert!(!evaluated.forecast.alarm);
        assert_eq!(evaluated.status, StockStatus::Sufficient);
    }

    #[test]
    fn test_zero_need_never_alarms() {
        let evaluator = ForecastEvaluator::default();
        let book = record(Circulation::empty(crate::domain::CirculationMode::Single), 0, 0);

        let evaluated = evaluator.evaluate(&book);
        assert_eq!(evaluated.forecast.shortfall, 0);
        assert!(!evaluated.forecast.alarm);
    }

    #[test]
    fn test_evaluate_is_idempotent() {
        let evaluator = ForecastEvaluator::default();
        let book = record(
            Circulation::Single {
                circulation_classes: counts(&[("8c", 17)]),
            },
            9,
            30,
        );

        assert_eq!(evaluator.evaluate(&book), evaluator.evaluate(&book));
    }

    #[test]
    fn test_custom_reserve() {
        let evaluator = ForecastEvaluator::new(&ForecastConfig::with_reserve(0));
        assert_eq!(evaluator.reserve_surplus(7), 7);

        let evaluator = ForecastEvaluator::new(&ForecastConfig::with_reserve(10));
        assert_eq!(evaluator.reserve_surplus(7), 0);
    }
}
