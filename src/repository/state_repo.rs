// ==========================================
// 配送线路看板 - 持久化状态仓储
// ==========================================
// 职责: 记录集 + 失败数侧表的保存/加载（app_state 表,JSON 载荷）
// 红线: Repository 不含业务逻辑;由宿主在每次已提交的变更后调用 save
// ==========================================
// 载荷格式:
// - 当前: {"schema_version": 1, "data": ...}
// - 旧版: 裸 JSON（无版本标记）,读取时兼容
// ==========================================

use crate::db::CURRENT_SCHEMA_VERSION;
use crate::domain::delivery::{DeliveryRecord, FailureCounts, PersistedState};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// 记录集键
pub const RECORDS_KEY: &str = "delivery_records";

/// 失败数侧表键
pub const FAILURE_COUNTS_KEY: &str = "failure_counts";

// ==========================================
// 载荷信封
// ==========================================
#[derive(Debug, Serialize, Deserialize)]
struct Versioned<T> {
    schema_version: i64,
    data: T,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredPayload<T> {
    Versioned(Versioned<T>),
    Legacy(T),
}

impl<T> StoredPayload<T> {
    fn into_data(self) -> (Option<i64>, T) {
        match self {
            StoredPayload::Versioned(v) => (Some(v.schema_version), v.data),
            StoredPayload::Legacy(data) => (None, data),
        }
    }
}

// ==========================================
// StateRepository - 持久化状态仓储
// ==========================================
pub struct StateRepository {
    conn: Arc<Mutex<Connection>>,
}

impl StateRepository {
    /// 从已有连接创建仓储实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 加载持久化状态
    ///
    /// # 返回
    /// - Ok(None): 从未保存过
    /// - Ok(Some(state)): 已保存状态（失败数侧表缺失时为空表）
    /// - Err(CorruptState): 载荷无法解析,由调用方决定降级策略
    pub fn load(&self) -> RepositoryResult<Option<PersistedState>> {
        let conn = self.get_conn()?;

        let Some(records_raw) = Self::read_payload(&conn, RECORDS_KEY)? else {
            return Ok(None);
        };
        let records: Vec<DeliveryRecord> = Self::decode(RECORDS_KEY, &records_raw)?;

        let failure_counts: FailureCounts = match Self::read_payload(&conn, FAILURE_COUNTS_KEY)? {
            Some(raw) => Self::decode(FAILURE_COUNTS_KEY, &raw)?,
            None => FailureCounts::new(),
        };

        debug!(records = records.len(), failures = failure_counts.len(), "加载持久化状态");
        Ok(Some(PersistedState {
            records,
            failure_counts,
        }))
    }

    /// 保存持久化状态（单事务写入两个键）
    pub fn save(&self, state: &PersistedState) -> RepositoryResult<()> {
        let records_json = Self::encode(RECORDS_KEY, &state.records)?;
        let failures_json = Self::encode(FAILURE_COUNTS_KEY, &state.failure_counts)?;

        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        Self::write_payload(&tx, RECORDS_KEY, &records_json)?;
        Self::write_payload(&tx, FAILURE_COUNTS_KEY, &failures_json)?;
        tx.commit()?;

        debug!(records = state.records.len(), "保存持久化状态");
        Ok(())
    }

    /// 直接写入原始载荷（用于迁移旧版浏览器存档）
    pub fn save_raw(&self, key: &str, payload: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        Self::write_payload(&conn, key, payload)?;
        info!(key = %key, "写入原始载荷");
        Ok(())
    }

    /// 删除全部持久化状态
    pub fn clear(&self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "DELETE FROM app_state WHERE state_key IN (?1, ?2)",
            params![RECORDS_KEY, FAILURE_COUNTS_KEY],
        )?;
        Ok(())
    }

    // ==========================================
    // 内部
    // ==========================================

    fn read_payload(conn: &Connection, key: &str) -> RepositoryResult<Option<String>> {
        let payload = conn
            .query_row(
                "SELECT payload FROM app_state WHERE state_key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(payload)
    }

    fn write_payload(conn: &Connection, key: &str, payload: &str) -> RepositoryResult<()> {
        conn.execute(
            r#"
            INSERT INTO app_state (state_key, payload, updated_at)
            VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(state_key) DO UPDATE SET
                payload = excluded.payload,
                updated_at = excluded.updated_at
            "#,
            params![key, payload],
        )?;
        Ok(())
    }

    fn encode<T: Serialize>(key: &str, data: &T) -> RepositoryResult<String> {
        serde_json::to_string(&Versioned {
            schema_version: CURRENT_SCHEMA_VERSION,
            data,
        })
        .map_err(|e| RepositoryError::SerializationError {
            key: key.to_string(),
            message: e.to_string(),
        })
    }

    fn decode<T: DeserializeOwned>(key: &str, raw: &str) -> RepositoryResult<T> {
        let payload: StoredPayload<T> =
            serde_json::from_str(raw).map_err(|e| RepositoryError::CorruptState {
                key: key.to_string(),
                message: e.to_string(),
            })?;

        let (version, data) = payload.into_data();
        match version {
            Some(v) if v > CURRENT_SCHEMA_VERSION => {
                return Err(RepositoryError::CorruptState {
                    key: key.to_string(),
                    message: format!("不支持的 schema_version: {}", v),
                });
            }
            Some(_) => {}
            None => info!(key = %key, "读取到无版本标记的旧版载荷"),
        }
        Ok(data)
    }
}
