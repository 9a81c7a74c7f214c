// ==========================================
// 配送线路看板 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供 Tauri 命令与命令行宿主调用
// ==========================================

pub mod dashboard_api;
pub mod error;

// 重导出核心类型
pub use dashboard_api::{
    DashboardApi, DeliveryRow, ManualRecordRequest, SummaryCard, ViewQuery, ALL_DRIVERS,
    MANUAL_LABEL_FORMAT,
};
pub use error::{ApiError, ApiResult};
