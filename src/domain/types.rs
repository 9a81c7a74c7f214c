// ==========================================
// 配送线路看板 - 领域类型定义
// ==========================================
// 职责: 区域 / 汇总范围 / 绩效分档等枚举
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 区域 (Region)
// ==========================================
// 创建时由车辆编码子串判定,之后不再重算
// 序列化格式: "SP" / "RJ" / ""（与浏览器旧存档一致）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Region {
    Unassigned, // 未识别
    SP,         // São Paulo
    RJ,         // Rio de Janeiro
}

impl Region {
    /// 由车辆编码判定区域
    ///
    /// # 规则
    /// - 包含 "SP" → SP（优先）
    /// - 否则包含 "RJ" → RJ
    /// - 否则 → Unassigned
    ///
    /// 区分大小写
    pub fn from_vehicle_code(vehicle: &str) -> Self {
        if vehicle.contains("SP") {
            Region::SP
        } else if vehicle.contains("RJ") {
            Region::RJ
        } else {
            Region::Unassigned
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Unassigned => "",
            Region::SP => "SP",
            Region::RJ => "RJ",
        }
    }

    /// 是否参与区域汇总
    pub fn is_assigned(&self) -> bool {
        !matches!(self, Region::Unassigned)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<String> for Region {
    fn from(value: String) -> Self {
        match value.as_str() {
            "SP" => Region::SP,
            "RJ" => Region::RJ,
            _ => Region::Unassigned,
        }
    }
}

impl From<Region> for String {
    fn from(value: Region) -> Self {
        value.as_str().to_string()
    }
}

impl FromStr for Region {
    type Err = String;

    /// 严格解析（用于人工录入）,空串/未知值返回错误
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "SP" => Ok(Region::SP),
            "RJ" => Ok(Region::RJ),
            other => Err(format!("未知区域: {}", other)),
        }
    }
}

// ==========================================
// 汇总范围 (Summary Scope)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SummaryScope {
    SP,
    RJ,
    All,
}

impl SummaryScope {
    pub const ALL_SCOPES: [SummaryScope; 3] = [SummaryScope::SP, SummaryScope::RJ, SummaryScope::All];

    /// 卡片标题
    pub fn title(&self) -> &'static str {
        match self {
            SummaryScope::SP => "São Paulo",
            SummaryScope::RJ => "Rio de Janeiro",
            SummaryScope::All => "Todas as Regiões",
        }
    }

    /// 对应的单一区域（ALL 无对应）
    pub fn region(&self) -> Option<Region> {
        match self {
            SummaryScope::SP => Some(Region::SP),
            SummaryScope::RJ => Some(Region::RJ),
            SummaryScope::All => None,
        }
    }
}

impl fmt::Display for SummaryScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SummaryScope::SP => write!(f, "SP"),
            SummaryScope::RJ => write!(f, "RJ"),
            SummaryScope::All => write!(f, "ALL"),
        }
    }
}

impl FromStr for SummaryScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "SP" => Ok(SummaryScope::SP),
            "RJ" => Ok(SummaryScope::RJ),
            "ALL" => Ok(SummaryScope::All),
            other => Err(format!("未知汇总范围: {}", other)),
        }
    }
}

// ==========================================
// 绩效分档 (Performance Band)
// ==========================================
// 用于界面着色: 绿 / 黄 / 红
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PerformanceBand {
    Good,      // 达标
    Attention, // 关注
    Critical,  // 告警
}

impl fmt::Display for PerformanceBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PerformanceBand::Good => write!(f, "GOOD"),
            PerformanceBand::Attention => write!(f, "ATTENTION"),
            PerformanceBand::Critical => write!(f, "CRITICAL"),
        }
    }
}
