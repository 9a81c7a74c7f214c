// ==========================================
// 配送线路看板 - 配置层
// ==========================================
// 职责: 看板配置管理（分档阈值、人工新增默认值）
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod dashboard_config_trait;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
pub use dashboard_config_trait::{ConfigError, DashboardConfigReader};
