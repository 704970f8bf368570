// ==========================================
// 教材管理系统 - 记录校验规则
// ==========================================
// 职责: 写入前拦截违反数据模型不变量的表单输入
// 输入: TextbookDraft (未校验)
// 输出: TextbookRecord (已规范化,只含当前模式的班级分布)
// ==========================================
// 红线: 校验在任何写入之前完成,不存在部分提交
// 红线: 每条违规必须指明字段/班级与冲突数值
// ==========================================

use crate::config::ForecastConfig;
use crate::domain::textbook::{
    Circulation, ClassCounts, FlexClasses, TextbookDraft, TextbookRecord,
};
use crate::domain::types::CirculationMode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

// ==========================================
// ValidationError - 校验违规
// ==========================================
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationError {
    #[error("isbn must not be empty")]
    MissingKey,

    #[error("{field} must not be empty")]
    MissingRequiredField { field: String },

    #[error("unrecognized circulation mode '{value}' (expected single, double or flexible)")]
    InvalidMode { value: String },

    #[error("class {class}: cannot return {returning} when only {held} are held")]
    OverReturn {
        class: String,
        held: u32,
        returning: u32,
    },
}

impl ValidationError {
    /// 违规类型代码
    pub fn kind(&self) -> &'static str {
        match self {
            ValidationError::MissingKey => "MISSING_KEY",
            ValidationError::MissingRequiredField { .. } => "MISSING_REQUIRED_FIELD",
            ValidationError::InvalidMode { .. } => "INVALID_MODE",
            ValidationError::OverReturn { .. } => "OVER_RETURN",
        }
    }
}

// ==========================================
// TextbookValidator - 教材记录校验器
// ==========================================
pub struct TextbookValidator {
    config: ForecastConfig,
}

impl TextbookValidator {
    pub fn new(config: &ForecastConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// 收集全部违规
    ///
    /// # 返回
    /// 空列表表示校验通过
    pub fn violations(&self, draft: &TextbookDraft) -> Vec<ValidationError> {
        let mut violations = Vec::new();

        // 规则1: 主键
        if draft.isbn.trim().is_empty() {
            violations.push(ValidationError::MissingKey);
        }

        // 规则2: 必填字段
        if draft.title.trim().is_empty() {
            violations.push(ValidationError::MissingRequiredField {
                field: "title".to_string(),
            });
        }

        // 规则3: 模式必须为封闭枚举之一
        match CirculationMode::parse(&draft.mode) {
            None => violations.push(ValidationError::InvalidMode {
                value: draft.mode.clone(),
            }),
            // 规则4: Flexible 模式逐班检查 returning <= held
            Some(CirculationMode::Flexible) => {
                for (class, alloc) in &draft.flex_classes {
                    if alloc.returning > alloc.held {
                        violations.push(ValidationError::OverReturn {
                            class: class.trim().to_string(),
                            held: alloc.held,
                            returning: alloc.returning,
                        });
                    }
                }
            }
            Some(_) => {}
        }

        violations
    }

    /// 校验并规范化
    ///
    /// # 返回
    /// - Ok(TextbookRecord): 只含当前模式班级分布的记录 (其他分组被清空)
    /// - Err(ValidationError): 第一条违规
    pub fn validate(&self, draft: &TextbookDraft) -> Result<TextbookRecord, ValidationError> {
        if let Some(first) = self.violations(draft).into_iter().next() {
            return Err(first);
        }

        let mode = CirculationMode::parse(&draft.mode).ok_or_else(|| {
            ValidationError::InvalidMode {
                value: draft.mode.clone(),
            }
        })?;

        let circulation = match mode {
            CirculationMode::Single => Circulation::Single {
                circulation_classes: normalize_counts(&draft.circulation_classes),
            },
            CirculationMode::Double => Circulation::Double {
                cohort1_classes: normalize_counts(&draft.cohort1_classes),
                cohort2_classes: normalize_counts(&draft.cohort2_classes),
            },
            CirculationMode::Flexible => Circulation::Flexible {
                flex_classes: normalize_flex(&draft.flex_classes),
            },
        };

        let record = TextbookRecord {
            isbn: draft.isbn.trim().to_string(),
            title: draft.title.trim().to_string(),
            subject: draft.subject.trim().to_string(),
            class_label: draft.class_label.trim().to_string(),
            circulation,
            stock_on_hand: draft.stock_on_hand,
            projected_need: draft.projected_need,
            acquisition_date: draft.acquisition_date.trim().to_string(),
            orderable: draft.orderable,
            notes: draft.notes.trim().to_string(),
        };

        self.warn_unknown_catalog_entries(&record);

        Ok(record)
    }

    /// 目录外的班级/学科只告警,不拒绝 (目录仅用于输入辅助)
    fn warn_unknown_catalog_entries(&self, record: &TextbookRecord) {
        if !record.subject.is_empty() && !self.config.is_known_subject(&record.subject) {
            warn!(isbn = %record.isbn, subject = %record.subject, "学科不在目录中");
        }
        for class in record.circulation.held_by_class().keys() {
            if !self.config.is_known_class(class) {
                warn!(isbn = %record.isbn, class = %class, "班级不在目录中");
            }
        }
    }
}

/// 去除班级名空白,丢弃空班级名与 0 册条目,同名合并
fn normalize_counts(classes: &ClassCounts) -> ClassCounts {
    let mut normalized = ClassCounts::new();
    for (class, &count) in classes {
        let class = class.trim();
        if class.is_empty() || count == 0 {
            continue;
        }
        let entry = normalized.entry(class.to_string()).or_insert(0);
        *entry = entry.saturating_add(count);
    }
    normalized
}

/// 丢弃 held 为 0 的班级 (returning 已在校验中保证 <= held)
fn normalize_flex(classes: &FlexClasses) -> FlexClasses {
    let mut normalized = FlexClasses::new();
    for (class, alloc) in classes {
        let class = class.trim();
        if class.is_empty() || alloc.held == 0 {
            continue;
        }
        let entry = normalized.entry(class.to_string()).or_default();
        entry.held = entry.held.saturating_add(alloc.held);
        entry.returning = entry.returning.saturating_add(alloc.returning);
    }
    normalized
}
