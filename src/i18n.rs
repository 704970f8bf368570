// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库
// 支持德文（默认）和英文
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// ==========================================

use crate::domain::forecast::EvaluatedTextbook;
use crate::domain::types::{CirculationMode, StockStatus};

/// 获取当前语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 设置语言
///
/// # 参数
/// - locale: 语言代码（"de" 或 "en"）
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(locale);
}

/// 翻译消息（无参数）
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译消息（带参数）
///
/// # 示例
/// ```no_run
/// use textbook_forecast::i18n::t_with_args;
/// let msg = t_with_args("stock_status.tight", &[("count", "3")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    let mut result = rust_i18n::t!(key).to_string();
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}

/// 模式显示名
pub fn mode_label(mode: CirculationMode) -> String {
    t(&format!("mode.{}", mode.as_str()))
}

/// 库存状态提示语
pub fn stock_status_message(book: &EvaluatedTextbook) -> String {
    let forecast = &book.forecast;
    match book.status {
        StockStatus::Shortage => {
            let count = forecast.missing_copies().to_string();
            let need = book.record.projected_need.to_string();
            let available = forecast.forecast_available.to_string();
            t_with_args(
                "stock_status.shortage",
                &[
                    ("count", count.as_str()),
                    ("need", need.as_str()),
                    ("available", available.as_str()),
                ],
            )
        }
        StockStatus::Tight if forecast.shortfall == 0 => t("stock_status.exact"),
        StockStatus::Tight => {
            let count = forecast.shortfall.to_string();
            t_with_args("stock_status.tight", &[("count", count.as_str())])
        }
        StockStatus::Sufficient => {
            let count = forecast.shortfall.to_string();
            t_with_args("stock_status.sufficient", &[("count", count.as_str())])
        }
    }
}

/// 可订购状态提示语
pub fn orderable_label(orderable: bool) -> String {
    if orderable {
        t("orderable.available")
    } else {
        t("orderable.unavailable")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::textbook::{Circulation, ClassCounts, TextbookRecord};
    use crate::engine::forecast::ForecastEvaluator;
    use std::sync::Mutex;

    // rust-i18n 的 locale 为全局状态，且 Rust 测试默认并行执行；
    // 为避免测试互相干扰，这里对 i18n 相关测试串行化。
    static LOCALE_TEST_LOCK: Mutex<()> = Mutex::new(());

    fn evaluated(stock_on_hand: u32, projected_need: u32) -> EvaluatedTextbook {
        let record = TextbookRecord {
            isbn: "978-3-14-100000-0".to_string(),
            title: "Diercke Weltatlas".to_string(),
            subject: "Geographie".to_string(),
            class_label: "5-10".to_string(),
            circulation: Circulation::Single {
                circulation_classes: ClassCounts::from([("7a".to_string(), 20)]),
            },
            stock_on_hand,
            projected_need,
            acquisition_date: String::new(),
            orderable: true,
            notes: String::new(),
        };
        ForecastEvaluator::default().evaluate(&record)
    }

    #[test]
    fn test_set_locale() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("en");
        assert_eq!(current_locale(), "en");

        set_locale("de");
        assert_eq!(current_locale(), "de");
    }

    #[test]
    fn test_mode_labels() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("de");
        assert_eq!(mode_label(CirculationMode::Double), "Doppeljahrgang");

        set_locale("en");
        assert_eq!(mode_label(CirculationMode::Flexible), "Flexible circulation");

        set_locale("de");
    }

    #[test]
    fn test_shortage_message() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("en");
        // 20 归还 + 0 余量 - 35 需求 = -15
        let msg = stock_status_message(&evaluated(5, 35));
        assert_eq!(
            msg,
            "15 copies short for next year (need: 35, available: 20)."
        );

        set_locale("de");
        let msg = stock_status_message(&evaluated(5, 35));
        assert!(msg.contains("Es fehlen 15 Exemplare"));
    }

    #[test]
    fn test_tight_and_sufficient_messages() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("en");
        assert!(stock_status_message(&evaluated(5, 18)).contains("only 2 copies"));
        assert!(stock_status_message(&evaluated(15, 10)).contains("Surplus: 20"));

        // 20 归还 + 0 余量 == 20 需求
        let exact = stock_status_message(&evaluated(5, 20));
        assert_eq!(exact, "Need exactly covered: no copies above need.");
        assert!(!exact.contains("only 0"));

        set_locale("de");
    }
}
