// ==========================================
// 配送线路看板 - 派生指标计算器
// ==========================================
// 职责: pending / deliveryPercent / routePercent 纯函数
// 红线: 三个字段必须一起重算,禁止只算其一
// ==========================================

use crate::domain::types::PerformanceBand;
use serde::{Deserialize, Serialize};

/// 待配送数 = 订单数 - 已送达数（不截断,可能为负;溢出时饱和）
pub fn pending(ordered: i64, delivered: i64) -> i64 {
    ordered.saturating_sub(delivered)
}

/// 送达率 = delivered / ordered * 100（ordered <= 0 时为 0）
pub fn delivery_percent(ordered: i64, delivered: i64) -> f64 {
    if ordered > 0 {
        delivered as f64 / ordered as f64 * 100.0
    } else {
        0.0
    }
}

/// 线路完成率 = (ordered - pending) / ordered * 100（ordered <= 0 时为 0）
pub fn route_percent(ordered: i64, pending: i64) -> f64 {
    if ordered > 0 {
        ordered.saturating_sub(pending) as f64 / ordered as f64 * 100.0
    } else {
        0.0
    }
}

// ==========================================
// DerivedMetrics - 派生指标组
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    pub pending_count: i64,
    pub delivery_percent: f64,
    pub route_percent: f64,
}

impl DerivedMetrics {
    /// 由订单数/送达数一次性计算全部派生字段
    pub fn compute(ordered: i64, delivered: i64) -> Self {
        let pending_count = pending(ordered, delivered);
        Self {
            pending_count,
            delivery_percent: delivery_percent(ordered, delivered),
            route_percent: route_percent(ordered, pending_count),
        }
    }
}

// ==========================================
// BandThresholds - 绩效分档阈值
// ==========================================
// 默认: 送达率 98 / 91,线路完成率 100 / 96
// 线路完成率仅在恰好等于目标值时为 Good（超出目标归入 Attention）
const BAND_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandThresholds {
    pub delivery_good_min: f64,
    pub delivery_attention_min: f64,
    pub route_good_target: f64,
    pub route_attention_min: f64,
}

impl Default for BandThresholds {
    fn default() -> Self {
        Self {
            delivery_good_min: 98.0,
            delivery_attention_min: 91.0,
            route_good_target: 100.0,
            route_attention_min: 96.0,
        }
    }
}

impl BandThresholds {
    /// 送达率分档
    pub fn classify_delivery(&self, percent: f64) -> PerformanceBand {
        Self::classify(percent, self.delivery_good_min, self.delivery_attention_min)
    }

    /// 线路完成率分档
    pub fn classify_route(&self, percent: f64) -> PerformanceBand {
        if (percent - self.route_good_target).abs() < BAND_EPSILON {
            PerformanceBand::Good
        } else if percent >= self.route_attention_min {
            PerformanceBand::Attention
        } else {
            PerformanceBand::Critical
        }
    }

    fn classify(percent: f64, good_min: f64, attention_min: f64) -> PerformanceBand {
        if percent >= good_min {
            PerformanceBand::Good
        } else if percent >= attention_min {
            PerformanceBand::Attention
        } else {
            PerformanceBand::Critical
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_compute_standard_case() {
        let m = DerivedMetrics::compute(100, 80);
        assert_eq!(m.pending_count, 20);
        assert!(approx(m.delivery_percent, 80.0));
        assert!(approx(m.route_percent, 80.0));
    }

    #[test]
    fn test_zero_ordered_gives_zero_percentages() {
        for delivered in [0, 5, 250] {
            let m = DerivedMetrics::compute(0, delivered);
            assert_eq!(m.pending_count, -delivered);
            assert_eq!(m.delivery_percent, 0.0);
            assert_eq!(m.route_percent, 0.0);
        }
    }

    #[test]
    fn test_pending_is_not_floored() {
        let m = DerivedMetrics::compute(50, 60);
        assert_eq!(m.pending_count, -10);
        assert!(approx(m.delivery_percent, 120.0));
        assert!(approx(m.route_percent, m.delivery_percent));
    }

    #[test]
    fn test_route_percent_matches_delivery_percent() {
        for (ordered, delivered) in [(7, 3), (13, 13), (1000, 1), (3, 0)] {
            let m = DerivedMetrics::compute(ordered, delivered);
            assert!(approx(m.route_percent, m.delivery_percent));
        }
    }

    #[test]
    fn test_band_classification() {
        let t = BandThresholds::default();
        assert_eq!(t.classify_delivery(98.0), PerformanceBand::Good);
        assert_eq!(t.classify_delivery(95.5), PerformanceBand::Attention);
        assert_eq!(t.classify_delivery(90.99), PerformanceBand::Critical);

        assert_eq!(t.classify_route(100.0), PerformanceBand::Good);
        assert_eq!(t.classify_route(99.9), PerformanceBand::Attention);
        assert_eq!(t.classify_route(50.0), PerformanceBand::Critical);
    }

    #[test]
    fn test_route_band_above_target_is_attention() {
        let t = BandThresholds::default();
        assert_eq!(t.classify_route(120.0), PerformanceBand::Attention);
        assert_eq!(t.classify_route(100.0 + 1e-12), PerformanceBand::Good);
        assert_eq!(t.classify_delivery(120.0), PerformanceBand::Good);

        let m = DerivedMetrics::compute(50, 60);
        assert_eq!(t.classify_route(m.route_percent), PerformanceBand::Attention);
    }

    #[test]
    fn test_extreme_counts_do_not_overflow() {
        let m = DerivedMetrics::compute(i64::MIN, i64::MAX);
        assert_eq!(m.pending_count, i64::MIN);
        assert_eq!(m.delivery_percent, 0.0);

        let m = DerivedMetrics::compute(i64::MAX, i64::MIN);
        assert_eq!(m.pending_count, i64::MAX);
        assert!(m.route_percent.is_finite());
    }
}
