// ==========================================
// 配送线路看板 - 看板 API
// ==========================================
// 职责: 宿主侧门面,持有记录仓并在每次已提交的变更后落盘
// 并发: 记录仓由 std::sync::Mutex 保护,变更与汇总重算在同一次加锁内完成
//       文件字节在锁外异步读取,解析后同步写入
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::DashboardConfigReader;
use crate::domain::delivery::{DeliveryRecord, ManualRecord, RecordField, RecordId};
use crate::domain::summary::{RegionSummaries, RegionSummary};
use crate::domain::types::{PerformanceBand, Region, SummaryScope};
use crate::engine::metrics::BandThresholds;
use crate::engine::record_store::RecordStore;
use crate::engine::view::{filter_and_sort, unique_drivers, RecordFilter, RegionFilter, SortState};
use crate::engine::parse_count_input;
use crate::importer::{DeliveryImporter, DeliveryImporterImpl, ImportOutcome, ImportReport};
use crate::repository::{RepositoryError, StateRepository};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// 人工新增时间标签格式（dd/MM/yyyy HH:mm）
pub const MANUAL_LABEL_FORMAT: &str = "%d/%m/%Y %H:%M";

/// 表单 datetime-local 输入格式
const DATETIME_LOCAL_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// 司机过滤的"全部"取值
pub const ALL_DRIVERS: &str = "all";

// ==========================================
// 请求/响应 DTO
// ==========================================

/// 列表查询条件（与界面控件取值一致）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewQuery {
    /// 搜索词
    pub search: String,
    /// 区域过滤: "" / "all" / "SP" / "RJ"
    pub region: String,
    /// 司机过滤: "" 或 "all" 表示全部
    pub driver: String,
    pub sort: Option<SortState>,
}

impl ViewQuery {
    /// 转换为引擎过滤谓词
    pub fn to_filter(&self) -> ApiResult<RecordFilter> {
        Ok(RecordFilter {
            search: self.search.clone(),
            region: parse_region_filter(&self.region)?,
            driver: match self.driver.trim() {
                "" => None,
                v if v.eq_ignore_ascii_case(ALL_DRIVERS) => None,
                _ => Some(self.driver.clone()),
            },
        })
    }
}

/// 人工新增请求
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManualRecordRequest {
    pub driver: String,
    /// 计划数（缺省或非数字时为 0）
    pub ordered_count: Option<String>,
    /// "SP" / "RJ",缺省取配置默认区域
    pub region: Option<String>,
    /// RFC 3339 或 "YYYY-MM-DDTHH:MM"（本地时间）,缺省为当前时间
    pub timestamp: Option<String>,
}

/// 列表行: 记录 + 失败数 + 编辑标记 + 分档
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryRow {
    #[serde(flatten)]
    pub record: DeliveryRecord,
    pub failure_count: i64,
    pub is_editing: bool,
    pub delivery_band: PerformanceBand,
    pub route_band: PerformanceBand,
}

/// 汇总卡片
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryCard {
    pub scope: SummaryScope,
    pub title: String,
    #[serde(flatten)]
    pub summary: RegionSummary,
}

// ==========================================
// DashboardApi - 看板 API
// ==========================================
pub struct DashboardApi {
    store: Mutex<RecordStore>,
    state_repo: Arc<StateRepository>,
    config: Arc<dyn DashboardConfigReader>,
    importer: DeliveryImporterImpl,
}

impl DashboardApi {
    /// 创建 DashboardApi 并恢复持久化状态
    ///
    /// # 说明
    /// 持久化状态损坏时记录告警并以空记录集启动（下一次提交的变更会覆盖损坏载荷）
    pub fn new(
        state_repo: Arc<StateRepository>,
        config: Arc<dyn DashboardConfigReader>,
    ) -> ApiResult<Self> {
        let store = Self::restore_store(&state_repo)?;
        Ok(Self {
            store: Mutex::new(store),
            state_repo,
            config,
            importer: DeliveryImporterImpl::new(),
        })
    }

    fn restore_store(state_repo: &StateRepository) -> ApiResult<RecordStore> {
        match state_repo.load() {
            Ok(Some(state)) => {
                info!(
                    records = state.records.len(),
                    failures = state.failure_counts.len(),
                    "已恢复持久化状态"
                );
                Ok(RecordStore::from_persisted(state))
            }
            Ok(None) => Ok(RecordStore::new()),
            Err(RepositoryError::CorruptState { key, message }) => {
                warn!(key = %key, error = %message, "持久化状态损坏,以空记录集启动");
                Ok(RecordStore::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    // ==========================================
    // 导入
    // ==========================================

    /// 导入单个表格文件（追加,不去重）
    pub async fn import_file(&self, path: &Path) -> ApiResult<ImportReport> {
        let outcome = self.importer.import_file(path).await?;
        self.apply_import(outcome)
    }

    /// 批量导入（按文件顺序追加;单个文件失败不影响其他文件）
    pub async fn import_files(&self, paths: &[PathBuf]) -> Vec<ApiResult<ImportReport>> {
        let outcomes = self.importer.import_files(paths).await;
        outcomes
            .into_iter()
            .map(|outcome| outcome.map_err(ApiError::from).and_then(|o| self.apply_import(o)))
            .collect()
    }

    fn apply_import(&self, outcome: ImportOutcome) -> ApiResult<ImportReport> {
        let ImportOutcome { records, report } = outcome;
        let added = self.mutate("import", |store| {
            let added = store.add_imported(records);
            (added, added > 0)
        })?;
        info!(source = %report.source, added, "导入记录已写入记录仓");
        Ok(report)
    }

    // ==========================================
    // 人工新增
    // ==========================================

    /// 人工新增记录
    ///
    /// # 返回
    /// - Ok(Some(id)): 新记录 ID
    /// - Ok(None): 司机名为空,未创建
    pub async fn add_manual(&self, request: ManualRecordRequest) -> ApiResult<Option<RecordId>> {
        let region = match request.region.as_deref().map(str::trim) {
            None | Some("") => self.config.get_default_region().await?,
            Some(raw) => raw.parse::<Region>().map_err(ApiError::InvalidInput)?,
        };

        let timestamp = match request.timestamp.as_deref().map(str::trim) {
            None | Some("") => Local::now(),
            Some(raw) => parse_manual_timestamp(raw)?,
        };

        let ordered_count = request
            .ordered_count
            .as_deref()
            .and_then(parse_count_input)
            .unwrap_or(0);

        let input = ManualRecord {
            driver: request.driver,
            ordered_count,
            region,
            start_label: timestamp.format(MANUAL_LABEL_FORMAT).to_string(),
            start_timestamp: timestamp.to_rfc3339(),
        };

        self.mutate("add_manual", |store| {
            let id = store.add_manual(input);
            let changed = id.is_some();
            (id, changed)
        })
    }

    // ==========================================
    // 记录编辑
    // ==========================================

    /// 设置失败数（扣减送达数）
    pub fn set_failure_count(&self, id: &str, raw: &str) -> ApiResult<bool> {
        self.mutate("set_failure_count", |store| {
            let changed = store.set_failure_count(id, raw);
            (changed, changed)
        })
    }

    /// 编辑字段（线路 / 计划数 / 送达数）
    pub fn set_field(&self, id: &str, field: RecordField, raw: &str) -> ApiResult<bool> {
        self.mutate("set_field", |store| {
            let changed = store.set_field(id, field, raw);
            (changed, changed)
        })
    }

    /// 进入编辑模式（仅捕获快照,不落盘）
    pub fn begin_edit(&self, id: &str) -> ApiResult<bool> {
        self.with_store_mut(|store| store.begin_edit(id))
    }

    /// 保存编辑
    pub fn commit_edit(&self, id: &str) -> ApiResult<bool> {
        self.mutate("commit_edit", |store| {
            let changed = store.commit_edit(id);
            (changed, changed)
        })
    }

    /// 取消编辑（还原快照）
    pub fn cancel_edit(&self, id: &str) -> ApiResult<bool> {
        self.mutate("cancel_edit", |store| {
            let changed = store.cancel_edit(id);
            (changed, changed)
        })
    }

    /// 删除记录
    pub fn remove(&self, id: &str) -> ApiResult<bool> {
        self.mutate("remove", |store| {
            let changed = store.remove(id);
            (changed, changed)
        })
    }

    /// 对当前过滤结果批量设置线路
    pub fn apply_batch_route(&self, route: &str, query: &ViewQuery) -> ApiResult<usize> {
        let filter = query.to_filter()?;
        self.mutate("apply_batch_route", |store| {
            let changed = store.apply_batch_route(route, &filter);
            (changed, changed > 0)
        })
    }

    /// 清空全部记录与失败数
    pub fn clear_all(&self) -> ApiResult<()> {
        self.mutate("clear_all", |store| {
            store.clear_all();
            ((), true)
        })?;
        info!("记录集已清空");
        Ok(())
    }

    // ==========================================
    // 区域汇总编辑（totalReceived 不落盘）
    // ==========================================

    pub fn begin_region_edit(&self, scope: SummaryScope) -> ApiResult<bool> {
        self.with_store_mut(|store| store.begin_region_edit(scope))
    }

    pub fn set_total_received(&self, scope: SummaryScope, raw: &str) -> ApiResult<bool> {
        self.with_store_mut(|store| store.set_total_received(scope, raw))
    }

    pub fn commit_region_edit(&self, scope: SummaryScope) -> ApiResult<bool> {
        self.with_store_mut(|store| store.commit_region_edit(scope))
    }

    pub fn cancel_region_edit(&self, scope: SummaryScope) -> ApiResult<bool> {
        self.with_store_mut(|store| store.cancel_region_edit(scope))
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 过滤 + 排序后的列表行
    pub async fn list_records(&self, query: &ViewQuery) -> ApiResult<Vec<DeliveryRow>> {
        let filter = query.to_filter()?;
        let thresholds = self.config.get_band_thresholds().await?;

        let store = self.lock_store()?;
        let rows = filter_and_sort(store.records(), &filter, query.sort)
            .into_iter()
            .map(|record| build_row(&store, record, &thresholds))
            .collect();
        Ok(rows)
    }

    /// 单条记录
    pub fn get_record(&self, id: &str) -> ApiResult<DeliveryRecord> {
        let store = self.lock_store()?;
        store
            .get(id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("记录(id={})不存在", id)))
    }

    /// 记录总数
    pub fn record_count(&self) -> ApiResult<usize> {
        Ok(self.lock_store()?.len())
    }

    /// 三个区域汇总
    pub fn summaries(&self) -> ApiResult<RegionSummaries> {
        Ok(self.lock_store()?.summaries().clone())
    }

    /// 当前区域过滤下应显示的汇总卡片
    pub fn visible_summaries(&self, region: &str) -> ApiResult<Vec<SummaryCard>> {
        let region_filter = parse_region_filter(region)?;
        let store = self.lock_store()?;
        let summaries = store.summaries();

        Ok(SummaryScope::ALL_SCOPES
            .iter()
            .copied()
            .filter(|scope| region_filter.shows_summary(*scope))
            .map(|scope| SummaryCard {
                scope,
                title: scope.title().to_string(),
                summary: summaries.get(scope).clone(),
            })
            .collect())
    }

    /// 当前区域过滤下的司机列表
    pub fn drivers(&self, region: &str) -> ApiResult<Vec<String>> {
        let region_filter = parse_region_filter(region)?;
        let store = self.lock_store()?;
        Ok(unique_drivers(store.records(), region_filter))
    }

    // ==========================================
    // 内部
    // ==========================================

    fn lock_store(&self) -> ApiResult<MutexGuard<'_, RecordStore>> {
        self.store
            .lock()
            .map_err(|e| ApiError::InternalError(format!("记录仓锁获取失败: {}", e)))
    }

    /// 在锁内执行变更;返回值第二项为 true 时落盘
    ///
    /// 落盘失败时内存状态回滚到变更前,内存与数据库保持一致
    fn mutate<T>(
        &self,
        operation: &str,
        f: impl FnOnce(&mut RecordStore) -> (T, bool),
    ) -> ApiResult<T> {
        let mut store = self.lock_store()?;
        let before = store.clone();
        let (result, changed) = f(&mut store);
        if changed {
            if let Err(e) = self.state_repo.save(&store.to_persisted()) {
                *store = before;
                warn!(operation = %operation, error = %e, "落盘失败,已回滚内存变更");
                return Err(e.into());
            }
            debug!(operation = %operation, records = store.len(), "变更已落盘");
        } else {
            debug!(operation = %operation, "无状态变化");
        }
        Ok(result)
    }

    /// 在锁内执行仅影响覆盖层的变更（不落盘）
    fn with_store_mut<T>(&self, f: impl FnOnce(&mut RecordStore) -> T) -> ApiResult<T> {
        let mut store = self.lock_store()?;
        Ok(f(&mut store))
    }
}

// ==========================================
// 辅助函数
// ==========================================

fn parse_region_filter(raw: &str) -> ApiResult<RegionFilter> {
    raw.parse::<RegionFilter>().map_err(ApiError::InvalidInput)
}

fn parse_manual_timestamp(raw: &str) -> ApiResult<DateTime<Local>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Local));
    }

    let naive = NaiveDateTime::parse_from_str(raw, DATETIME_LOCAL_FORMAT)
        .map_err(|e| ApiError::InvalidInput(format!("时间格式错误 {}: {}", raw, e)))?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| ApiError::InvalidInput(format!("本地时间不存在: {}", raw)))
}

fn build_row(store: &RecordStore, record: &DeliveryRecord, thresholds: &BandThresholds) -> DeliveryRow {
    DeliveryRow {
        failure_count: store.failure_count(&record.id),
        is_editing: store.is_editing(&record.id),
        delivery_band: thresholds.classify_delivery(record.delivery_percent),
        route_band: thresholds.classify_route(record.route_percent),
        record: record.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigManager;
    use crate::db::init_schema;
    use rusqlite::Connection;

    fn api() -> DashboardApi {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        let conn = Arc::new(Mutex::new(conn));
        let state_repo = Arc::new(StateRepository::new(conn.clone()));
        let config = Arc::new(ConfigManager::from_connection(conn).unwrap());
        DashboardApi::new(state_repo, config).unwrap()
    }

    #[test]
    fn test_view_query_driver_all_means_unfiltered() {
        let query = ViewQuery {
            driver: "all".to_string(),
            region: "SP".to_string(),
            ..ViewQuery::default()
        };
        let filter = query.to_filter().unwrap();
        assert_eq!(filter.driver, None);
        assert_eq!(filter.region, RegionFilter::Only(Region::SP));

        let bad = ViewQuery {
            region: "MG".to_string(),
            ..ViewQuery::default()
        };
        assert!(matches!(bad.to_filter(), Err(ApiError::InvalidInput(_))));
    }

    #[test]
    fn test_parse_manual_timestamp() {
        let dt = parse_manual_timestamp("2024-03-05T14:30").unwrap();
        assert_eq!(dt.format(MANUAL_LABEL_FORMAT).to_string(), "05/03/2024 14:30");
        assert!(parse_manual_timestamp("2024-03-05T14:30:00+00:00").is_ok());
        assert!(parse_manual_timestamp("ontem").is_err());
    }

    #[tokio::test]
    async fn test_add_manual_uses_defaults() {
        let api = api();
        let id = api
            .add_manual(ManualRecordRequest {
                driver: "Ana".to_string(),
                ordered_count: Some("12".to_string()),
                timestamp: Some("2024-03-05T08:15".to_string()),
                ..ManualRecordRequest::default()
            })
            .await
            .unwrap()
            .unwrap();

        let record = api.get_record(&id).unwrap();
        assert_eq!(record.region, Region::SP);
        assert_eq!(record.start_label, "05/03/2024 08:15");
        assert_eq!(record.pending_count, 12);
        assert_eq!(record.delivered_count, 0);
        assert_eq!(record.route, "1");
    }

    #[tokio::test]
    async fn test_add_manual_empty_driver_is_ignored() {
        let api = api();
        let id = api
            .add_manual(ManualRecordRequest::default())
            .await
            .unwrap();
        assert_eq!(id, None);
        assert_eq!(api.record_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_rows_carry_bands_and_failures() {
        let api = api();
        let id = api
            .add_manual(ManualRecordRequest {
                driver: "Beto".to_string(),
                ordered_count: Some("100".to_string()),
                region: Some("RJ".to_string()),
                ..ManualRecordRequest::default()
            })
            .await
            .unwrap()
            .unwrap();

        assert!(api.set_field(&id, RecordField::DeliveredCount, "97").unwrap());
        assert!(api.set_failure_count(&id, "2").unwrap());

        let rows = api.list_records(&ViewQuery::default()).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].failure_count, 2);
        assert_eq!(rows[0].record.delivered_count, 95);
        assert_eq!(rows[0].delivery_band, PerformanceBand::Attention);
        assert_eq!(rows[0].route_band, PerformanceBand::Critical);
    }

    #[test]
    fn test_visible_summaries_follow_region_filter() {
        let api = api();
        assert!(api.visible_summaries("").unwrap().is_empty());
        assert_eq!(api.visible_summaries("all").unwrap().len(), 3);

        let cards = api.visible_summaries("RJ").unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].scope, SummaryScope::RJ);
        assert_eq!(cards[0].title, "Rio de Janeiro");
    }
}
