// ==========================================
// 配送线路看板 (Evolutivo de Rotas) - 核心库
// ==========================================
// 职责: 配送表格导入、派生指标、记录编辑、区域汇总、过滤排序视图
// 技术栈: Tauri + Rust + SQLite
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 持久化状态
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 导入层 - 外部表格
pub mod importer;

// 配置层 - 看板配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 宿主接口
pub mod api;

// 应用层 - 宿主集成
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    DeliveryRecord, PerformanceBand, Region, RegionSummaries, RegionSummary, SummaryScope,
};

// 引擎
pub use engine::{RecordStore, RegionAggregator};

// 导入
pub use importer::{DeliveryImporterImpl, ImportReport};

// API
pub use api::{ApiError, ApiResult, DashboardApi, ViewQuery};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "Evolutivo de Rotas";
