// ==========================================
// 配送线路看板 - 区域汇总领域模型
// ==========================================
// 三个实例: SP / RJ / ALL
// totalReceived 为人工录入值（ALL 为两区之和）,其余字段由记录汇总
// ==========================================

use crate::domain::types::SummaryScope;
use serde::{Deserialize, Serialize};

// ==========================================
// RegionSummary - 区域汇总
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionSummary {
    // ===== 人工录入 =====
    pub total_received: i64,

    // ===== 汇总字段 =====
    pub total_orders: i64,
    pub delivered: i64,
    pub failures: i64,

    // 分母为 total_received,不是 total_orders
    pub delivery_percent: f64,

    // ===== 编辑状态（非持久化）=====
    pub is_editing: bool,
}

// ==========================================
// RegionSummaries - 汇总集合
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionSummaries {
    pub sp: RegionSummary,
    pub rj: RegionSummary,
    pub all: RegionSummary,
}

impl RegionSummaries {
    pub fn get(&self, scope: SummaryScope) -> &RegionSummary {
        match scope {
            SummaryScope::SP => &self.sp,
            SummaryScope::RJ => &self.rj,
            SummaryScope::All => &self.all,
        }
    }

    pub fn get_mut(&mut self, scope: SummaryScope) -> &mut RegionSummary {
        match scope {
            SummaryScope::SP => &mut self.sp,
            SummaryScope::RJ => &mut self.rj,
            SummaryScope::All => &mut self.all,
        }
    }
}
