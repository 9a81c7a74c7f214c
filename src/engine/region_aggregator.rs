// ==========================================
// 配送线路看板 - 区域汇总器
// ==========================================
// 职责: 由全量记录 + 失败数侧表重算 SP / RJ / ALL 汇总
// 红线: 全量重算,不做增量修补;totalReceived 为外部输入,跨重算保留
// ==========================================

use crate::domain::delivery::{DeliveryRecord, FailureCounts};
use crate::domain::summary::{RegionSummaries, RegionSummary};
use crate::domain::types::{Region, SummaryScope};
use tracing::instrument;

// ==========================================
// RegionAggregator - 区域汇总器
// ==========================================
#[derive(Debug, Default, Clone, Copy)]
pub struct RegionAggregator;

impl RegionAggregator {
    pub fn new() -> Self {
        Self
    }

    /// 全量重算区域汇总
    ///
    /// # 步骤
    /// 1. SP / RJ: 按区域累加 ordered / delivered / failures（未识别区域不计入）
    /// 2. ALL: 两区对应字段求和,totalReceived 同样求和
    /// 3. 所有范围: deliveryPercent = delivered / totalReceived * 100
    ///
    /// SP / RJ 的 totalReceived 与编辑标志取自 prior
    #[instrument(skip_all, fields(records = records.len()))]
    pub fn recompute(
        &self,
        records: &[DeliveryRecord],
        failure_counts: &FailureCounts,
        prior: &RegionSummaries,
    ) -> RegionSummaries {
        let mut sp = Self::carry_over(&prior.sp);
        let mut rj = Self::carry_over(&prior.rj);

        for record in records {
            let bucket = match record.region {
                Region::SP => &mut sp,
                Region::RJ => &mut rj,
                Region::Unassigned => continue,
            };
            let failures = failure_counts.get(&record.id).copied().unwrap_or(0);
            bucket.total_orders = bucket.total_orders.saturating_add(record.ordered_count);
            bucket.delivered = bucket.delivered.saturating_add(record.delivered_count);
            bucket.failures = bucket.failures.saturating_add(failures);
        }

        let all = RegionSummary {
            total_received: sp.total_received.saturating_add(rj.total_received),
            total_orders: sp.total_orders.saturating_add(rj.total_orders),
            delivered: sp.delivered.saturating_add(rj.delivered),
            failures: sp.failures.saturating_add(rj.failures),
            delivery_percent: 0.0,
            is_editing: false,
        };

        let mut summaries = RegionSummaries { sp, rj, all };
        Self::refresh_percentages(&mut summaries);
        summaries
    }

    /// 步骤 3: 重算全部范围的送达率（含 ALL.totalReceived 同步）
    pub fn refresh_percentages(summaries: &mut RegionSummaries) {
        summaries.all.total_received = summaries
            .sp
            .total_received
            .saturating_add(summaries.rj.total_received);

        for scope in SummaryScope::ALL_SCOPES {
            let summary = summaries.get_mut(scope);
            summary.delivery_percent = summary_percent(summary.delivered, summary.total_received);
        }
    }

    /// 保留人工录入部分,清零汇总部分
    fn carry_over(prior: &RegionSummary) -> RegionSummary {
        RegionSummary {
            total_received: prior.total_received,
            is_editing: prior.is_editing,
            ..RegionSummary::default()
        }
    }
}

/// 区域送达率 = delivered / totalReceived * 100（totalReceived <= 0 时为 0）
pub fn summary_percent(delivered: i64, total_received: i64) -> f64 {
    if total_received > 0 {
        delivered as f64 / total_received as f64 * 100.0
    } else {
        0.0
    }
}
