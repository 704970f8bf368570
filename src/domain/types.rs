// ==========================================
// 教材管理系统 - 领域类型定义
// ==========================================
// 依据: 数据模型 - 流通模式 (Single / Double / Flexible)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 流通模式 (Circulation Mode)
// ==========================================
// 红线: 封闭枚举,不是布尔标志
// 序列化格式: snake_case (与文档存储一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CirculationMode {
    Single,   // 单年级: 年底全部归还
    Double,   // 双年级: 第1届保留,第2届归还
    Flexible, // 灵活: 按班级登记持有与归还数量
}

impl CirculationMode {
    /// 全部模式 (供输入辅助使用)
    pub const ALL: [CirculationMode; 3] = [
        CirculationMode::Single,
        CirculationMode::Double,
        CirculationMode::Flexible,
    ];

    /// 存储标签
    pub fn as_str(&self) -> &'static str {
        match self {
            CirculationMode::Single => "single",
            CirculationMode::Double => "double",
            CirculationMode::Flexible => "flexible",
        }
    }

    /// 解析模式标签
    ///
    /// 忽略大小写与首尾空白。
    ///
    /// # 返回
    /// - Some(mode): 可识别的标签
    /// - None: 未知标签
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim().to_lowercase().as_str() {
            "single" => Some(CirculationMode::Single),
            "double" => Some(CirculationMode::Double),
            "flexible" => Some(CirculationMode::Flexible),
            _ => None,
        }
    }
}

impl fmt::Display for CirculationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CirculationMode::Single => write!(f, "Single"),
            CirculationMode::Double => write!(f, "Double"),
            CirculationMode::Flexible => write!(f, "Flexible"),
        }
    }
}

// ==========================================
// 库存状态 (Stock Status)
// ==========================================
// 由 shortfall 与 reserve 推导,仅用于展示分级
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockStatus {
    Shortage,   // 缺口 (alarm)
    Tight,      // 余量低于 reserve
    Sufficient, // 充足
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StockStatus::Shortage => write!(f, "SHORTAGE"),
            StockStatus::Tight => write!(f, "TIGHT"),
            StockStatus::Sufficient => write!(f, "SUFFICIENT"),
        }
    }
}
