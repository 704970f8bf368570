// ==========================================
// 教材管理系统 - 旧数据迁移
// ==========================================
// 职责: 文档存储格式 → TextbookRecord
// 规则:
// - mode 可识别: 按 mode 取对应班级分布
// - 无 mode: 按旧版 double_cohort 标志映射到 Double / Single
//   (旧格式没有 Flexible,不猜测)
// - mode 无法识别: 回退 Single (保留 circulation_classes),记录告警
// - 缺失/为 null 的班级分布一律按空处理
// ==========================================

use crate::domain::textbook::{Circulation, TextbookDocument, TextbookRecord};
use crate::domain::types::CirculationMode;
use tracing::warn;

/// 判定文档的流通模式
pub fn resolve_mode(doc: &TextbookDocument) -> CirculationMode {
    match doc.mode.as_deref() {
        Some(tag) => CirculationMode::parse(tag).unwrap_or_else(|| {
            warn!(isbn = %doc.isbn, mode = %tag, "未知流通模式,按 single 处理");
            CirculationMode::Single
        }),
        None => {
            if doc.double_cohort.unwrap_or(false) {
                CirculationMode::Double
            } else {
                CirculationMode::Single
            }
        }
    }
}

/// 文档迁移为领域记录 (读取路径,不报错)
pub fn migrate_document(doc: TextbookDocument) -> TextbookRecord {
    let mode = resolve_mode(&doc);

    let circulation = match mode {
        CirculationMode::Single => Circulation::Single {
            circulation_classes: doc.circulation_classes.unwrap_or_default(),
        },
        CirculationMode::Double => Circulation::Double {
            cohort1_classes: doc.cohort1_classes.unwrap_or_default(),
            cohort2_classes: doc.cohort2_classes.unwrap_or_default(),
        },
        CirculationMode::Flexible => Circulation::Flexible {
            flex_classes: doc.flex_classes.unwrap_or_default(),
        },
    };

    TextbookRecord {
        isbn: doc.isbn,
        title: doc.title,
        subject: doc.subject,
        class_label: doc.class_label,
        circulation,
        stock_on_hand: doc.stock_on_hand,
        projected_need: doc.projected_need,
        acquisition_date: doc.acquisition_date,
        orderable: doc.orderable,
        notes: doc.notes,
    }
}
