// ==========================================
// 教材管理系统 - 预测配置
// ==========================================
// 职责: reserve 缓冲量 + 班级/学科输入辅助目录
// 说明: 显式传入引擎,不使用进程级全局状态
// ==========================================

use serde::{Deserialize, Serialize};

/// 默认 reserve: 库存中始终保留的最少册数
pub const DEFAULT_RESERVE_COPIES: u32 = 5;

/// 默认班级目录
pub const DEFAULT_CLASS_CATALOG: &[&str] = &[
    "5a", "5b", "5c", "6a", "6b", "6c", "7a", "7b", "7c", "8a", "8b", "8c", "9a", "9b", "9c",
    "10a", "10b", "10c", "10g1", "10g2", "11/1", "11/2", "12/1", "12/2",
];

/// 默认学科目录
pub const DEFAULT_SUBJECT_CATALOG: &[&str] = &[
    "Mathematik",
    "Deutsch",
    "Englisch",
    "Französisch",
    "Latein",
    "Spanisch",
    "Physik",
    "Chemie",
    "Biologie",
    "Mensch-Natur-Technik",
    "Geographie",
    "Geschichte",
    "Politik",
    "Ethik",
    "Religion",
    "Musik",
    "Kunst",
    "Sport",
    "Informatik",
    "Wirtschaft",
    "Sonstiges",
];

// ==========================================
// ForecastConfig - 预测配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastConfig {
    pub reserve_copies: u32,
    pub class_catalog: Vec<String>,
    pub subject_catalog: Vec<String>,
}

impl ForecastConfig {
    /// 仅覆写 reserve，其余取默认值 (测试常用)
    pub fn with_reserve(reserve_copies: u32) -> Self {
        Self {
            reserve_copies,
            ..Self::default()
        }
    }

    pub fn is_known_class(&self, class: &str) -> bool {
        self.class_catalog.iter().any(|c| c == class)
    }

    pub fn is_known_subject(&self, subject: &str) -> bool {
        self.subject_catalog.iter().any(|s| s == subject)
    }
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            reserve_copies: DEFAULT_RESERVE_COPIES,
            class_catalog: DEFAULT_CLASS_CATALOG.iter().map(|c| c.to_string()).collect(),
            subject_catalog: DEFAULT_SUBJECT_CATALOG
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ForecastConfig::default();
        assert_eq!(config.reserve_copies, 5);
        assert_eq!(config.class_catalog.len(), 24);
        assert!(config.is_known_class("10g2"));
        assert!(config.is_known_subject("Informatik"));
        assert!(!config.is_known_class("13a"));
    }

    #[test]
    fn test_with_reserve() {
        let config = ForecastConfig::with_reserve(0);
        assert_eq!(config.reserve_copies, 0);
        assert_eq!(config.subject_catalog, ForecastConfig::default().subject_catalog);
    }
}
