// ==========================================
// 配送线路看板 - 记录规范化器
// ==========================================
// 职责: 原始行 → DeliveryRecord（区域判定 + 派生指标）
// 排除规则:
// - 区域为空（车辆编码不含 "SP" / "RJ"）
// - 状态恰好等于 "Cancelada"（区分大小写,不 TRIM）
// ==========================================

use crate::domain::delivery::{DeliveryRecord, NOT_STARTED_LABEL};
use crate::domain::types::Region;
use crate::importer::data_cleaner::{coerce_count, normalize_empty};
use crate::importer::field_mapper::{ColumnMapping, ColumnRole};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 被取消的状态文本
pub const CANCELLED_STATUS: &str = "Cancelada";

// ==========================================
// RowOutcome - 单行处理结果
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Accepted(DeliveryRecord),
    Excluded(ExclusionReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExclusionReason {
    NoRegion,
    Cancelled,
}

// ==========================================
// RecordNormalizer - 记录规范化器
// ==========================================
#[derive(Debug, Default, Clone, Copy)]
pub struct RecordNormalizer;

impl RecordNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// 规范化单行
    ///
    /// 失败数不在记录上,导入后侧表中缺省为 0
    pub fn normalize(&self, row: &[String], mapping: &ColumnMapping) -> RowOutcome {
        let region = Region::from_vehicle_code(mapping.cell(row, ColumnRole::Vehicle));
        if !region.is_assigned() {
            return RowOutcome::Excluded(ExclusionReason::NoRegion);
        }

        if mapping.cell(row, ColumnRole::Status) == CANCELLED_STATUS {
            return RowOutcome::Excluded(ExclusionReason::Cancelled);
        }

        let start = mapping.cell(row, ColumnRole::StartTime);
        let start_label = if start.is_empty() {
            NOT_STARTED_LABEL.to_string()
        } else {
            start.to_string()
        };

        RowOutcome::Accepted(DeliveryRecord::new(
            Uuid::new_v4().to_string(),
            start_label,
            normalize_empty(start),
            mapping.cell(row, ColumnRole::Agent).to_string(),
            region,
            coerce_count(mapping.cell(row, ColumnRole::PlannedCount)),
            coerce_count(mapping.cell(row, ColumnRole::RealizedCount)),
        ))
    }
}
