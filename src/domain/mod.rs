// ==========================================
// 配送线路看板 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod delivery;
pub mod summary;
pub mod types;

// 重导出核心类型
pub use delivery::{
    DeliveryRecord, EditSnapshot, FailureCounts, ManualRecord, PersistedState, RecordField,
    RecordId, DEFAULT_ROUTE, MAX_COUNT, NOT_STARTED_LABEL,
};
pub use summary::{RegionSummaries, RegionSummary};
pub use types::{PerformanceBand, Region, SummaryScope};
