// ==========================================
// 配送线路看板 - 引擎层
// ==========================================
// 职责: 派生指标、记录仓变更规则、区域汇总、过滤排序视图
// 红线: Engine 不拼 SQL,不做 I/O
// ==========================================

pub mod input;
pub mod metrics;
pub mod record_store;
pub mod region_aggregator;
pub mod view;

// 重导出核心引擎
pub use input::parse_count_input;
pub use metrics::{BandThresholds, DerivedMetrics};
pub use record_store::{RecordEdit, RecordStore};
pub use region_aggregator::RegionAggregator;
pub use view::{
    filter_and_sort, unique_drivers, RecordFilter, RegionFilter, SortDirection, SortKey,
    SortState,
};
