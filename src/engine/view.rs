// ==========================================
// 配送线路看板 - 过滤/排序视图
// ==========================================
// 职责: 对记录集做只读投影（搜索、区域、司机过滤 + 单列排序）
// 红线: 视图不修改数据
// ==========================================

use crate::domain::delivery::DeliveryRecord;
use crate::domain::types::{Region, SummaryScope};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

// ==========================================
// RegionFilter - 区域过滤
// ==========================================
// "" → Unset（不显示汇总卡片）, "all" → All, "SP"/"RJ" → Only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegionFilter {
    #[default]
    Unset,
    All,
    Only(Region),
}

impl RegionFilter {
    pub fn matches(&self, region: Region) -> bool {
        match self {
            RegionFilter::Unset | RegionFilter::All => true,
            RegionFilter::Only(r) => *r == region,
        }
    }

    /// 汇总卡片可见性: 未选区域时全部隐藏,all 显示全部,指定区域仅显示该区域
    pub fn shows_summary(&self, scope: SummaryScope) -> bool {
        match self {
            RegionFilter::Unset => false,
            RegionFilter::All => true,
            RegionFilter::Only(r) => scope.region() == Some(*r),
        }
    }
}

impl FromStr for RegionFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" => Ok(RegionFilter::Unset),
            v if v.eq_ignore_ascii_case("all") => Ok(RegionFilter::All),
            v => v.parse::<Region>().map(RegionFilter::Only),
        }
    }
}

// ==========================================
// RecordFilter - 过滤谓词
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    /// 搜索词（司机名或区域,不区分大小写的包含匹配）
    pub search: String,
    pub region: RegionFilter,
    /// None 表示全部司机
    pub driver: Option<String>,
}

impl RecordFilter {
    pub fn matches(&self, record: &DeliveryRecord) -> bool {
        if !self.region.matches(record.region) {
            return false;
        }

        if let Some(driver) = &self.driver {
            if &record.driver != driver {
                return false;
            }
        }

        let needle = self.search.to_lowercase();
        record.driver.to_lowercase().contains(&needle)
            || record.region.as_str().to_lowercase().contains(&needle)
    }
}

// ==========================================
// 排序
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    StartLabel,
    Driver,
    Route,
    Region,
    OrderedCount,
    DeliveredCount,
    PendingCount,
    DeliveryPercent,
    RoutePercent,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "start_label" => Ok(SortKey::StartLabel),
            "driver" => Ok(SortKey::Driver),
            "route" => Ok(SortKey::Route),
            "region" => Ok(SortKey::Region),
            "ordered_count" => Ok(SortKey::OrderedCount),
            "delivered_count" => Ok(SortKey::DeliveredCount),
            "pending_count" => Ok(SortKey::PendingCount),
            "delivery_percent" => Ok(SortKey::DeliveryPercent),
            "route_percent" => Ok(SortKey::RoutePercent),
            other => Err(format!("未知排序列: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortState {
    /// 点击列头: 同列切换方向,不同列重置为升序
    pub fn toggle(current: Option<SortState>, key: SortKey) -> SortState {
        let direction = match current {
            Some(state) if state.key == key && state.direction == SortDirection::Asc => {
                SortDirection::Desc
            }
            _ => SortDirection::Asc,
        };
        SortState { key, direction }
    }

    fn compare(&self, a: &DeliveryRecord, b: &DeliveryRecord) -> Ordering {
        let ord = match self.key {
            SortKey::StartLabel => a.start_label.cmp(&b.start_label),
            SortKey::Driver => a.driver.cmp(&b.driver),
            SortKey::Route => a.route.cmp(&b.route),
            SortKey::Region => a.region.as_str().cmp(b.region.as_str()),
            SortKey::OrderedCount => a.ordered_count.cmp(&b.ordered_count),
            SortKey::DeliveredCount => a.delivered_count.cmp(&b.delivered_count),
            SortKey::PendingCount => a.pending_count.cmp(&b.pending_count),
            SortKey::DeliveryPercent => a
                .delivery_percent
                .partial_cmp(&b.delivery_percent)
                .unwrap_or(Ordering::Equal),
            SortKey::RoutePercent => a
                .route_percent
                .partial_cmp(&b.route_percent)
                .unwrap_or(Ordering::Equal),
        };

        match self.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    }
}

/// 过滤 + 排序（稳定排序,相等元素保持原相对顺序）
pub fn filter_and_sort<'a>(
    records: &'a [DeliveryRecord],
    filter: &RecordFilter,
    sort: Option<SortState>,
) -> Vec<&'a DeliveryRecord> {
    let mut rows: Vec<&DeliveryRecord> = records.iter().filter(|r| filter.matches(r)).collect();

    if let Some(sort) = sort {
        rows.sort_by(|a, b| sort.compare(a, b));
    }

    rows
}

/// 当前区域过滤下的去重司机列表（字典序）
pub fn unique_drivers(records: &[DeliveryRecord], region: RegionFilter) -> Vec<String> {
    let mut drivers: Vec<String> = records
        .iter()
        .filter(|r| region.matches(r.region))
        .map(|r| r.driver.clone())
        .collect();
    drivers.sort();
    drivers.dedup();
    drivers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, driver: &str, region: Region, ordered: i64) -> DeliveryRecord {
        DeliveryRecord::new(
            id.to_string(),
            "Not Started".to_string(),
            None,
            driver.to_string(),
            region,
            ordered,
            0,
        )
    }

    fn sample() -> Vec<DeliveryRecord> {
        vec![
            record("1", "Carlos", Region::SP, 30),
            record("2", "ana", Region::RJ, 10),
            record("3", "Bruno", Region::SP, 10),
            record("4", "Carlos", Region::Unassigned, 20),
        ]
    }

    #[test]
    fn test_filter_region_and_search() {
        let records = sample();

        let filter = RecordFilter {
            region: RegionFilter::Only(Region::SP),
            ..Default::default()
        };
        let ids: Vec<&str> = filter_and_sort(&records, &filter, None)
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(ids, vec!["1", "3"]);

        // 搜索同时匹配区域文本
        let filter = RecordFilter {
            search: "rj".to_string(),
            ..Default::default()
        };
        let ids: Vec<&str> = filter_and_sort(&records, &filter, None)
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(ids, vec!["2"]);

        // 司机名不区分大小写
        let filter = RecordFilter {
            search: "CAR".to_string(),
            ..Default::default()
        };
        assert_eq!(filter_and_sort(&records, &filter, None).len(), 2);
    }

    #[test]
    fn test_filter_driver_exact() {
        let records = sample();
        let filter = RecordFilter {
            driver: Some("Carlos".to_string()),
            region: RegionFilter::All,
            ..Default::default()
        };
        assert_eq!(filter_and_sort(&records, &filter, None).len(), 2);
    }

    #[test]
    fn test_sort_is_stable_and_toggles() {
        let records = sample();
        let asc = SortState::toggle(None, SortKey::OrderedCount);
        assert_eq!(asc.direction, SortDirection::Asc);

        let ids: Vec<&str> = filter_and_sort(&records, &RecordFilter::default(), Some(asc))
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        // 2 与 3 相等,保持原顺序
        assert_eq!(ids, vec!["2", "3", "4", "1"]);

        let desc = SortState::toggle(Some(asc), SortKey::OrderedCount);
        assert_eq!(desc.direction, SortDirection::Desc);
        let ids: Vec<&str> = filter_and_sort(&records, &RecordFilter::default(), Some(desc))
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(ids, vec!["1", "4", "2", "3"]);

        // 切换到其他列重置为升序
        let other = SortState::toggle(Some(desc), SortKey::Driver);
        assert_eq!(other.direction, SortDirection::Asc);
        let back = SortState::toggle(Some(desc), SortKey::OrderedCount);
        assert_eq!(back.direction, SortDirection::Asc);
    }

    #[test]
    fn test_unique_drivers_scoped_by_region() {
        let records = sample();
        assert_eq!(
            unique_drivers(&records, RegionFilter::Unset),
            vec!["Bruno", "Carlos", "ana"]
        );
        assert_eq!(
            unique_drivers(&records, RegionFilter::Only(Region::SP)),
            vec!["Bruno", "Carlos"]
        );
    }

    #[test]
    fn test_region_filter_parse_and_summary_visibility() {
        assert_eq!("".parse::<RegionFilter>(), Ok(RegionFilter::Unset));
        assert_eq!("all".parse::<RegionFilter>(), Ok(RegionFilter::All));
        assert_eq!("RJ".parse::<RegionFilter>(), Ok(RegionFilter::Only(Region::RJ)));

        assert!(!RegionFilter::Unset.shows_summary(SummaryScope::All));
        assert!(RegionFilter::All.shows_summary(SummaryScope::SP));
        assert!(RegionFilter::Only(Region::RJ).shows_summary(SummaryScope::RJ));
        assert!(!RegionFilter::Only(Region::RJ).shows_summary(SummaryScope::All));
    }

    #[test]
    fn test_sort_key_parse() {
        assert_eq!("route_percent".parse::<SortKey>(), Ok(SortKey::RoutePercent));
        assert!("insucessos".parse::<SortKey>().is_err());
    }
}
