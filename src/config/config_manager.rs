// ==========================================
// 配送线路看板 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope,当前仅使用 global)
// ==========================================

use crate::config::dashboard_config_trait::{ConfigError, DashboardConfigReader};
use crate::db::open_sqlite_connection;
use crate::domain::types::Region;
use crate::engine::metrics::BandThresholds;
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, ConfigError> {
        let conn = open_sqlite_connection(db_path)?;
        crate::db::init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, ConfigError> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, ConfigError> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入 global 配置（UPSERT）
    pub fn set_config_value(&self, key: &str, value: &str) -> Result<(), ConfigError> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at)
             VALUES ('global', ?1, ?2, datetime('now'))
             ON CONFLICT(scope_id, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at",
            params![key, value],
        )?;

        info!(config_key = %key, value = %value, "配置已更新");
        Ok(())
    }

    /// 获取所有 global 配置（含未覆写项的默认值）
    pub fn get_config_snapshot(&self) -> Result<HashMap<String, String>, ConfigError> {
        let mut config_map: HashMap<String, String> = config_keys::DEFAULTS
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }
        Ok(config_map)
    }

    /// 读取配置值,带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, ConfigError> {
        Ok(self
            .get_global_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// 读取数值配置,格式错误时回落默认值
    fn get_f64_or_default(&self, key: &str, default: f64) -> Result<f64, ConfigError> {
        let value = self.get_config_or_default(key, &default.to_string())?;
        Ok(value.trim().parse::<f64>().unwrap_or_else(|_| {
            warn!(config_key = key, raw_value = %value, "数值配置格式错误,使用默认值");
            default
        }))
    }

    // ===== 同步读取（供非异步调用方使用） =====

    /// 读取分档阈值
    pub fn band_thresholds(&self) -> Result<BandThresholds, ConfigError> {
        let defaults = BandThresholds::default();
        Ok(BandThresholds {
            delivery_good_min: self
                .get_f64_or_default(config_keys::DELIVERY_GOOD_MIN, defaults.delivery_good_min)?,
            delivery_attention_min: self.get_f64_or_default(
                config_keys::DELIVERY_ATTENTION_MIN,
                defaults.delivery_attention_min,
            )?,
            route_good_target: self
                .get_f64_or_default(config_keys::ROUTE_GOOD_TARGET, defaults.route_good_target)?,
            route_attention_min: self.get_f64_or_default(
                config_keys::ROUTE_ATTENTION_MIN,
                defaults.route_attention_min,
            )?,
        })
    }

    /// 读取人工新增默认区域
    pub fn default_region(&self) -> Result<Region, ConfigError> {
        let value = self.get_config_or_default(config_keys::MANUAL_DEFAULT_REGION, "SP")?;
        match value.parse::<Region>() {
            Ok(region) => Ok(region),
            Err(_) => {
                warn!(raw_value = %value, "默认区域配置无效,使用 SP");
                Ok(Region::SP)
            }
        }
    }
}

// ==========================================
// DashboardConfigReader Trait 实现
// ==========================================
#[async_trait]
impl DashboardConfigReader for ConfigManager {
    async fn get_band_thresholds(&self) -> Result<BandThresholds, ConfigError> {
        self.band_thresholds()
    }

    async fn get_default_region(&self) -> Result<Region, ConfigError> {
        self.default_region()
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 送达率分档
    pub const DELIVERY_GOOD_MIN: &str = "band.delivery_good_min";
    pub const DELIVERY_ATTENTION_MIN: &str = "band.delivery_attention_min";

    // 线路完成率分档
    pub const ROUTE_GOOD_TARGET: &str = "band.route_good_target";
    pub const ROUTE_ATTENTION_MIN: &str = "band.route_attention_min";

    // 人工新增
    pub const MANUAL_DEFAULT_REGION: &str = "manual.default_region";

    /// 默认值表
    pub const DEFAULTS: &[(&str, &str)] = &[
        (DELIVERY_GOOD_MIN, "98"),
        (DELIVERY_ATTENTION_MIN, "91"),
        (ROUTE_GOOD_TARGET, "100"),
        (ROUTE_ATTENTION_MIN, "96"),
        (MANUAL_DEFAULT_REGION, "SP"),
    ];
}
