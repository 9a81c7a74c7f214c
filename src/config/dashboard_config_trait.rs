// ==========================================
// 配送线路看板 - 看板配置读取 Trait
// ==========================================
// 职责: 定义看板所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::domain::types::Region;
use crate::engine::metrics::BandThresholds;
use async_trait::async_trait;
use std::error::Error;

/// 配置读取错误
pub type ConfigError = Box<dyn Error + Send + Sync>;

// ==========================================
// DashboardConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait DashboardConfigReader: Send + Sync {
    // ===== 绩效分档 =====

    /// 获取送达率/线路完成率分档阈值
    ///
    /// # 默认值
    /// - 送达率: ≥98 良好, ≥91 关注
    /// - 线路完成率: ≥100 良好, ≥96 关注
    async fn get_band_thresholds(&self) -> Result<BandThresholds, ConfigError>;

    // ===== 人工新增 =====

    /// 获取人工新增记录的默认区域
    ///
    /// # 默认值
    /// - SP（非法或未分配的配置值回落到 SP）
    async fn get_default_region(&self) -> Result<Region, ConfigError>;
}
