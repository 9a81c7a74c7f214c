// ==========================================
// 配送线路看板 - 配送记录领域模型
// ==========================================
// 职责: DeliveryRecord（持久化实体）+ 编辑快照（非持久化覆盖层）
// 红线: 派生字段（pending / 两个百分比）必须与计数保持一致
// ==========================================

use crate::domain::types::Region;
use crate::engine::metrics::DerivedMetrics;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// 记录 ID（UUID v4 字符串,创建后不可变,不复用）
pub type RecordId = String;

/// 失败数侧表: 记录 ID → 人工录入的失败数（缺省为 0）
pub type FailureCounts = HashMap<RecordId, i64>;

/// 无开始时间时的显示标签
pub const NOT_STARTED_LABEL: &str = "Not Started";

/// 新建记录的默认线路
pub const DEFAULT_ROUTE: &str = "1";

/// 计数上限（导入截断到此值,人工录入超出则拒绝）
pub const MAX_COUNT: i64 = 1_000_000_000;

// ==========================================
// DeliveryRecord - 配送记录
// ==========================================
// 每个 司机-线路-日期 一条
// alias: 兼容浏览器旧存档（无 schema_version 的 localStorage 导出）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryRecord {
    // ===== 标识 =====
    pub id: RecordId,

    // ===== 开始时间 =====
    #[serde(alias = "data")]
    pub start_label: String, // 显示用,缺失时为 "Not Started"
    #[serde(default, alias = "dataCompleta", skip_serializing_if = "Option::is_none")]
    pub start_timestamp: Option<String>,

    // ===== 基础信息 =====
    #[serde(alias = "motorista")]
    pub driver: String,
    #[serde(alias = "rotas")]
    pub route: String,
    #[serde(alias = "regiao")]
    pub region: Region,

    // ===== 计数 =====
    #[serde(alias = "totalPedido")]
    pub ordered_count: i64,
    #[serde(alias = "entregues")]
    pub delivered_count: i64,

    // ===== 派生字段 =====
    #[serde(alias = "pendente")]
    pub pending_count: i64, // 不做下限截断,可能为负
    #[serde(alias = "percentualEntregas")]
    pub delivery_percent: f64,
    #[serde(alias = "percentualRota")]
    pub route_percent: f64,
}

impl DeliveryRecord {
    /// 以计数创建记录并计算派生字段
    pub fn new(
        id: RecordId,
        start_label: String,
        start_timestamp: Option<String>,
        driver: String,
        region: Region,
        ordered_count: i64,
        delivered_count: i64,
    ) -> Self {
        let metrics = DerivedMetrics::compute(ordered_count, delivered_count);
        Self {
            id,
            start_label,
            start_timestamp,
            driver,
            route: DEFAULT_ROUTE.to_string(),
            region,
            ordered_count,
            delivered_count,
            pending_count: metrics.pending_count,
            delivery_percent: metrics.delivery_percent,
            route_percent: metrics.route_percent,
        }
    }

    /// 按当前计数重算全部派生字段
    ///
    /// pending / deliveryPercent / routePercent 必须一起重算
    pub fn recompute_metrics(&mut self) {
        let metrics = DerivedMetrics::compute(self.ordered_count, self.delivered_count);
        self.pending_count = metrics.pending_count;
        self.delivery_percent = metrics.delivery_percent;
        self.route_percent = metrics.route_percent;
    }
}

// ==========================================
// EditSnapshot - 编辑快照
// ==========================================
// 进入编辑模式时捕获,取消时还原,保存/取消后清除
// 不参与持久化
#[derive(Debug, Clone, PartialEq)]
pub struct EditSnapshot {
    pub route: String,
    pub ordered_count: i64,
    pub delivered_count: i64,
    pub failure_count: i64,
}

// ==========================================
// RecordField - 可编辑字段
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordField {
    Route,
    OrderedCount,
    DeliveredCount,
}

impl FromStr for RecordField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "route" => Ok(RecordField::Route),
            "ordered_count" => Ok(RecordField::OrderedCount),
            "delivered_count" => Ok(RecordField::DeliveredCount),
            other => Err(format!("不可编辑字段: {}", other)),
        }
    }
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordField::Route => write!(f, "route"),
            RecordField::OrderedCount => write!(f, "ordered_count"),
            RecordField::DeliveredCount => write!(f, "delivered_count"),
        }
    }
}

// ==========================================
// ManualRecord - 人工新增记录输入
// ==========================================
// 默认值（区域/时间）由 API 层补齐
#[derive(Debug, Clone)]
pub struct ManualRecord {
    pub driver: String,
    pub ordered_count: i64,
    pub region: Region,
    pub start_label: String,
    pub start_timestamp: String,
}

// ==========================================
// PersistedState - 持久化状态
// ==========================================
// 仅记录集 + 失败数侧表;区域汇总的 totalReceived 不落盘
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    pub records: Vec<DeliveryRecord>,
    pub failure_counts: FailureCounts,
}
