// ==========================================
// 教材管理系统 - 教材流通记录领域模型
// ==========================================
// 依据: 数据模型 - Circulation Record
// ==========================================
// 红线: isbn 为唯一主键,保存即整体覆盖
// 红线: 每条记录只有当前模式的班级分布有效
// ==========================================

use crate::domain::types::CirculationMode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 班级 → 册数
pub type ClassCounts = BTreeMap<String, u32>;

/// 班级 → 持有/归还
pub type FlexClasses = BTreeMap<String, FlexAllocation>;

// ==========================================
// FlexAllocation - 灵活模式单班级分配
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlexAllocation {
    pub held: u32,      // 当前持有
    pub returning: u32, // 其中年底归还
}

impl FlexAllocation {
    pub fn new(held: u32, returning: u32) -> Self {
        Self { held, returning }
    }

    /// 保留册数 (持有 - 归还)
    ///
    /// 校验前的数据可能 returning > held，此时按 0 计。
    pub fn retained(&self) -> u32 {
        self.held.saturating_sub(self.returning)
    }
}

// ==========================================
// Circulation - 流通分布 (按模式的 tagged union)
// ==========================================
// 红线: 只携带当前模式的数据,切换模式即丢弃旧分布
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Circulation {
    Single {
        circulation_classes: ClassCounts,
    },
    Double {
        cohort1_classes: ClassCounts,
        cohort2_classes: ClassCounts,
    },
    Flexible {
        flex_classes: FlexClasses,
    },
}

impl Circulation {
    /// 指定模式的空分布
    pub fn empty(mode: CirculationMode) -> Self {
        match mode {
            CirculationMode::Single => Circulation::Single {
                circulation_classes: ClassCounts::new(),
            },
            CirculationMode::Double => Circulation::Double {
                cohort1_classes: ClassCounts::new(),
                cohort2_classes: ClassCounts::new(),
            },
            CirculationMode::Flexible => Circulation::Flexible {
                flex_classes: FlexClasses::new(),
            },
        }
    }

    pub fn mode(&self) -> CirculationMode {
        match self {
            Circulation::Single { .. } => CirculationMode::Single,
            Circulation::Double { .. } => CirculationMode::Double,
            Circulation::Flexible { .. } => CirculationMode::Flexible,
        }
    }

    /// 每个班级当前持有的册数 (Double 模式两届合并)
    pub fn held_by_class(&self) -> ClassCounts {
        match self {
            Circulation::Single {
                circulation_classes,
            } => circulation_classes.clone(),
            Circulation::Double {
                cohort1_classes,
                cohort2_classes,
            } => {
                let mut merged = cohort1_classes.clone();
                for (class, count) in cohort2_classes {
                    *merged.entry(class.clone()).or_insert(0) += count;
                }
                merged
            }
            Circulation::Flexible { flex_classes } => flex_classes
                .iter()
                .map(|(class, alloc)| (class.clone(), alloc.held))
                .collect(),
        }
    }

    /// 是否登记了某个班级
    pub fn has_class(&self, class: &str) -> bool {
        match self {
            Circulation::Single {
                circulation_classes,
            } => circulation_classes.contains_key(class),
            Circulation::Double {
                cohort1_classes,
                cohort2_classes,
            } => cohort1_classes.contains_key(class) || cohort2_classes.contains_key(class),
            Circulation::Flexible { flex_classes } => flex_classes.contains_key(class),
        }
    }
}

// ==========================================
// TextbookRecord - 教材流通记录 (已校验)
// ==========================================
// 派生字段 (总数/预测/缺口/告警) 不在此结构中,每次读取时重新计算
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextbookRecord {
    // ===== 主键 =====
    pub isbn: String,

    // ===== 描述信息 =====
    pub title: String,
    pub subject: String,
    pub class_label: String, // 自由文本,如 "5/6" 或 "5a,6b"

    // ===== 流通分布 =====
    pub circulation: Circulation,

    // ===== 库存与需求 =====
    pub stock_on_hand: u32,  // 中心库存 (未分配给班级)
    pub projected_need: u32, // 下学年新生首次需求

    // ===== 其他 =====
    pub acquisition_date: String,
    pub orderable: bool,
    pub notes: String,
}

impl TextbookRecord {
    pub fn mode(&self) -> CirculationMode {
        self.circulation.mode()
    }
}

// ==========================================
// TextbookDraft - 新建/编辑表单输入 (未校验)
// ==========================================
// 所有模式的班级分布都可能被填写,校验后只保留 mode 对应的一组
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextbookDraft {
    pub isbn: String,
    pub title: String,
    pub subject: String,
    pub class_label: String,
    pub mode: String,
    pub stock_on_hand: u32,
    pub projected_need: u32,
    pub acquisition_date: String,
    pub orderable: bool,
    pub notes: String,
    pub circulation_classes: ClassCounts,
    pub cohort1_classes: ClassCounts,
    pub cohort2_classes: ClassCounts,
    pub flex_classes: FlexClasses,
}

impl From<&TextbookRecord> for TextbookDraft {
    /// 编辑流程: 以现有记录预填表单
    fn from(record: &TextbookRecord) -> Self {
        let mut draft = TextbookDraft {
            isbn: record.isbn.clone(),
            title: record.title.clone(),
            subject: record.subject.clone(),
            class_label: record.class_label.clone(),
            mode: record.mode().as_str().to_string(),
            stock_on_hand: record.stock_on_hand,
            projected_need: record.projected_need,
            acquisition_date: record.acquisition_date.clone(),
            orderable: record.orderable,
            notes: record.notes.clone(),
            ..Default::default()
        };

        match &record.circulation {
            Circulation::Single {
                circulation_classes,
            } => draft.circulation_classes = circulation_classes.clone(),
            Circulation::Double {
                cohort1_classes,
                cohort2_classes,
            } => {
                draft.cohort1_classes = cohort1_classes.clone();
                draft.cohort2_classes = cohort2_classes.clone();
            }
            Circulation::Flexible { flex_classes } => draft.flex_classes = flex_classes.clone(),
        }

        draft
    }
}

// ==========================================
// TextbookDocument - 文档存储格式
// ==========================================
// 说明:
// - 四组班级分布全部写出,非当前模式的写为空 {}
// - double_cohort 为旧版布尔标志,写入时与 mode 保持一致
// - 读取时缺失/为 null 的字段按空值处理 (旧数据可能早于当前模式)
// - 册数与班级分布宽松读取: 无效条目丢弃并告警,格式错误的分组按空处理
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextbookDocument {
    pub isbn: String,
    pub title: String,
    pub subject: String,
    pub class_label: String,
    pub mode: Option<String>,
    pub double_cohort: Option<bool>,
    #[serde(deserialize_with = "lenient::copies")]
    pub stock_on_hand: u32,
    #[serde(deserialize_with = "lenient::copies")]
    pub projected_need: u32,
    pub acquisition_date: String,
    pub orderable: bool,
    pub notes: String,
    #[serde(deserialize_with = "lenient::class_counts")]
    pub circulation_classes: Option<ClassCounts>,
    #[serde(deserialize_with = "lenient::class_counts")]
    pub cohort1_classes: Option<ClassCounts>,
    #[serde(deserialize_with = "lenient::class_counts")]
    pub cohort2_classes: Option<ClassCounts>,
    #[serde(deserialize_with = "lenient::flex_classes")]
    pub flex_classes: Option<FlexClasses>,
}

impl From<&TextbookRecord> for TextbookDocument {
    fn from(record: &TextbookRecord) -> Self {
        let mode = record.mode();
        let mut doc = TextbookDocument {
            isbn: record.isbn.clone(),
            title: record.title.clone(),
            subject: record.subject.clone(),
            class_label: record.class_label.clone(),
            mode: Some(mode.as_str().to_string()),
            double_cohort: Some(mode == CirculationMode::Double),
            stock_on_hand: record.stock_on_hand,
            projected_need: record.projected_need,
            acquisition_date: record.acquisition_date.clone(),
            orderable: record.orderable,
            notes: record.notes.clone(),
            circulation_classes: Some(ClassCounts::new()),
            cohort1_classes: Some(ClassCounts::new()),
            cohort2_classes: Some(ClassCounts::new()),
            flex_classes: Some(FlexClasses::new()),
        };

        match &record.circulation {
            Circulation::Single {
                circulation_classes,
            } => doc.circulation_classes = Some(circulation_classes.clone()),
            Circulation::Double {
                cohort1_classes,
                cohort2_classes,
            } => {
                doc.cohort1_classes = Some(cohort1_classes.clone());
                doc.cohort2_classes = Some(cohort2_classes.clone());
            }
            Circulation::Flexible { flex_classes } => {
                doc.flex_classes = Some(flex_classes.clone())
            }
        }

        doc
    }
}

// ==========================================
// 文档字段宽松解析
// ==========================================
mod lenient {
    use super::{ClassCounts, FlexAllocation, FlexClasses};
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;
    use tracing::warn;

    /// 非负整数册数; 整数值的浮点数与数字字符串也接受
    pub(super) fn parse_copies(raw: &Value) -> Option<u32> {
        let wide = match raw {
            Value::Number(n) => n.as_u64().or_else(|| {
                n.as_f64()
                    .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f <= f64::from(u32::MAX))
                    .map(|f| f as u64)
            }),
            Value::String(s) => s.trim().parse::<u64>().ok(),
            _ => None,
        }?;
        u32::try_from(wide).ok()
    }

    pub(super) fn copies<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        if raw.is_null() {
            return Ok(0);
        }
        Ok(parse_copies(&raw).unwrap_or_else(|| {
            warn!(value = %raw, "册数无效,按 0 处理");
            0
        }))
    }

    pub(super) fn counts_from_value(raw: &Value) -> ClassCounts {
        let Value::Object(entries) = raw else {
            warn!(value = %raw, "班级分布格式错误,按空处理");
            return ClassCounts::new();
        };

        let mut counts = ClassCounts::new();
        for (class, value) in entries {
            match parse_copies(value) {
                Some(count) => {
                    counts.insert(class.clone(), count);
                }
                None => warn!(class = %class, value = %value, "班级册数无效,已忽略"),
            }
        }
        counts
    }

    pub(super) fn flex_from_value(raw: &Value) -> FlexClasses {
        let Value::Object(entries) = raw else {
            warn!(value = %raw, "灵活分布格式错误,按空处理");
            return FlexClasses::new();
        };

        let mut classes = FlexClasses::new();
        for (class, value) in entries {
            let alloc = match value {
                Value::Object(fields) => {
                    let field = |name: &str| fields.get(name).map_or(Some(0), parse_copies);
                    field("held")
                        .zip(field("returning"))
                        .map(|(held, returning)| FlexAllocation::new(held, returning))
                }
                _ => None,
            };
            match alloc {
                Some(alloc) => {
                    classes.insert(class.clone(), alloc);
                }
                None => warn!(class = %class, value = %value, "灵活分布条目无效,已忽略"),
            }
        }
        classes
    }

    pub(super) fn class_counts<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<ClassCounts>, D::Error> {
        Ok(Option::<Value>::deserialize(deserializer)?.map(|raw| counts_from_value(&raw)))
    }

    pub(super) fn flex_classes<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<FlexClasses>, D::Error> {
        Ok(Option::<Value>::deserialize(deserializer)?.map(|raw| flex_from_value(&raw)))
    }
}

/// 拆分自由文本班级列表
///
/// 支持逗号/分号分隔，去除空白与空项，保留输入顺序并去重。
///
/// # 示例
/// ```
/// use textbook_forecast::domain::textbook::split_class_list;
/// assert_eq!(split_class_list("5a, 6b;7c,,5a"), vec!["5a", "6b", "7c"]);
/// ```
pub fn split_class_list(input: &str) -> Vec<String> {
    let mut classes: Vec<String> = Vec::new();
    for part in input.split(|c| c == ',' || c == ';') {
        let class = part.trim();
        if class.is_empty() || classes.iter().any(|c| c == class) {
            continue;
        }
        classes.push(class.to_string());
    }
    classes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn double_record() -> TextbookRecord {
        TextbookRecord {
            isbn: "978-3-12-000001-1".to_string(),
            title: "Lambacher Schweizer 5/6".to_string(),
            subject: "Mathematik".to_string(),
            class_label: "5/6".to_string(),
            circulation: Circulation::Double {
                cohort1_classes: ClassCounts::from([("5a".to_string(), 30)]),
                cohort2_classes: ClassCounts::from([
                    ("5a".to_string(), 2),
                    ("6a".to_string(), 25),
                ]),
            },
            stock_on_hand: 3,
            projected_need: 40,
            acquisition_date: "2023-08-01".to_string(),
            orderable: true,
            notes: String::new(),
        }
    }

    #[test]
    fn test_held_by_class_merges_cohorts() {
        let held = double_record().circulation.held_by_class();
        assert_eq!(held.get("5a"), Some(&32));
        assert_eq!(held.get("6a"), Some(&25));
        assert_eq!(held.len(), 2);
    }

    #[test]
    fn test_document_clears_inactive_groups() {
        let doc = TextbookDocument::from(&double_record());
        assert_eq!(doc.mode.as_deref(), Some("double"));
        assert_eq!(doc.double_cohort, Some(true));
        assert_eq!(doc.circulation_classes, Some(ClassCounts::new()));
        assert_eq!(doc.flex_classes, Some(FlexClasses::new()));
        assert_eq!(doc.cohort2_classes.map(|c| c.len()), Some(2));
    }

    #[test]
    fn test_draft_prefill_only_active_group() {
        let draft = TextbookDraft::from(&double_record());
        assert_eq!(draft.mode, "double");
        assert!(draft.circulation_classes.is_empty());
        assert!(draft.flex_classes.is_empty());
        assert_eq!(draft.cohort1_classes.get("5a"), Some(&30));
    }

    #[test]
    fn test_flex_retained_saturates() {
        assert_eq!(FlexAllocation::new(8, 3).retained(), 5);
        assert_eq!(FlexAllocation::new(4, 6).retained(), 0);
    }

    #[test]
    fn test_document_drops_invalid_mapping_entries() {
        let doc: TextbookDocument = serde_json::from_str(
            r#"{"isbn":"X","stock_on_hand":"7","projected_need":-2,
                "circulation_classes":{"7a":-1,"7b":"4","7c":12,"7d":2.5},
                "cohort1_classes":[1,2],
                "flex_classes":{"5a":3,"6b":{"held":5,"returning":2},"6c":{"held":"x"}}}"#,
        )
        .unwrap();

        assert_eq!(doc.stock_on_hand, 7);
        assert_eq!(doc.projected_need, 0);
        assert_eq!(
            doc.circulation_classes,
            Some(ClassCounts::from([("7b".to_string(), 4), ("7c".to_string(), 12)]))
        );
        assert_eq!(doc.cohort1_classes, Some(ClassCounts::new()));
        assert_eq!(doc.cohort2_classes, None);
        assert_eq!(
            doc.flex_classes,
            Some(FlexClasses::from([("6b".to_string(), FlexAllocation::new(5, 2))]))
        );
    }

    #[test]
    fn test_document_round_trip_is_unchanged() {
        let doc = TextbookDocument::from(&double_record());
        let json = serde_json::to_string(&doc).unwrap();
        assert_eq!(serde_json::from_str::<TextbookDocument>(&json).unwrap(), doc);
    }

    #[test]
    fn test_split_class_list() {
        assert_eq!(split_class_list(" 5a ;6b, 7c "), vec!["5a", "6b", "7c"]);
        assert!(split_class_list(" , ; ").is_empty());
    }
}
