// ==========================================
// 配送线路看板 - 记录仓（Record Store）
// ==========================================
// 职责: 有序记录集 + 失败数侧表 + 区域汇总,所有变更的唯一入口
// 红线:
// - 每次变更后派生字段与区域汇总必须一致（同一 &mut self 调用内完成）
// - 非法输入静默忽略,不改变状态,不抛错
// - 编辑快照只存在于非持久化覆盖层
// ==========================================

use crate::domain::delivery::{
    DeliveryRecord, EditSnapshot, FailureCounts, ManualRecord, PersistedState, RecordField,
    RecordId,
};
use crate::domain::summary::RegionSummaries;
use crate::domain::types::SummaryScope;
use crate::engine::input::parse_count_input;
use crate::engine::region_aggregator::RegionAggregator;
use crate::engine::view::RecordFilter;
use std::collections::HashMap;
use tracing::{debug, warn};
use uuid::Uuid;

// ==========================================
// RecordEdit - 字段编辑操作
// ==========================================
// 按字段分派,各自校验
#[derive(Debug, Clone, PartialEq)]
pub enum RecordEdit {
    SetRoute(String),
    SetOrderedCount(i64),
    SetDeliveredCount(i64),
}

impl RecordEdit {
    /// 由字段 + 原始输入构造编辑操作
    ///
    /// # 返回
    /// - None: 输入非法（空线路 / 非数字）
    pub fn from_input(field: RecordField, raw: &str) -> Option<Self> {
        match field {
            RecordField::Route => {
                if raw.is_empty() {
                    None
                } else {
                    Some(RecordEdit::SetRoute(raw.to_string()))
                }
            }
            RecordField::OrderedCount => parse_count_input(raw).map(RecordEdit::SetOrderedCount),
            RecordField::DeliveredCount => {
                parse_count_input(raw).map(RecordEdit::SetDeliveredCount)
            }
        }
    }
}

// ==========================================
// RecordStore - 记录仓
// ==========================================
#[derive(Debug, Default, Clone)]
pub struct RecordStore {
    // ===== 持久化部分 =====
    records: Vec<DeliveryRecord>,
    failure_counts: FailureCounts,

    // ===== 派生部分 =====
    summaries: RegionSummaries,

    // ===== 非持久化覆盖层 =====
    record_edits: HashMap<RecordId, EditSnapshot>,
    region_edits: HashMap<SummaryScope, i64>,

    aggregator: RegionAggregator,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从持久化状态恢复（编辑状态不恢复）
    pub fn from_persisted(state: PersistedState) -> Self {
        let mut store = Self {
            records: state.records,
            failure_counts: state.failure_counts,
            ..Self::default()
        };
        store.reaggregate();
        store
    }

    /// 导出持久化状态
    pub fn to_persisted(&self) -> PersistedState {
        PersistedState {
            records: self.records.clone(),
            failure_counts: self.failure_counts.clone(),
        }
    }

    // ==========================================
    // 查询
    // ==========================================

    pub fn records(&self) -> &[DeliveryRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&DeliveryRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// 失败数（缺省为 0）
    pub fn failure_count(&self, id: &str) -> i64 {
        self.failure_counts.get(id).copied().unwrap_or(0)
    }

    pub fn failure_counts(&self) -> &FailureCounts {
        &self.failure_counts
    }

    pub fn is_editing(&self, id: &str) -> bool {
        self.record_edits.contains_key(id)
    }

    pub fn edit_snapshot(&self, id: &str) -> Option<&EditSnapshot> {
        self.record_edits.get(id)
    }

    pub fn summaries(&self) -> &RegionSummaries {
        &self.summaries
    }

    // ==========================================
    // 新增
    // ==========================================

    /// 追加导入记录（派生字段已由规范化器算好）
    ///
    /// 不去重,不替换
    pub fn add_imported(&mut self, records: Vec<DeliveryRecord>) -> usize {
        let count = records.len();
        if count == 0 {
            return 0;
        }
        self.records.extend(records);
        self.reaggregate();
        debug!(count, total = self.records.len(), "追加导入记录");
        count
    }

    /// 人工新增记录
    ///
    /// # 返回
    /// - Some(id): 新记录 ID
    /// - None: 司机名为空,不创建
    pub fn add_manual(&mut self, input: ManualRecord) -> Option<RecordId> {
        if input.driver.is_empty() {
            warn!("人工新增被忽略: 司机名为空");
            return None;
        }

        let id = Uuid::new_v4().to_string();
        let record = DeliveryRecord::new(
            id.clone(),
            input.start_label,
            Some(input.start_timestamp),
            input.driver,
            input.region,
            input.ordered_count,
            0,
        );
        self.records.push(record);
        self.reaggregate();
        debug!(record_id = %id, "人工新增记录");
        Some(id)
    }

    // ==========================================
    // 失败数
    // ==========================================

    /// 设置失败数并扣减送达数
    ///
    /// # 规则
    /// - 非数字输入 → 忽略
    /// - delivered = max(0, 当前 delivered - value)
    /// - 扣减基于当前值,重复调用会累积扣减（不保留原始送达基线）
    /// - 随后重算 pending 与两个百分比
    pub fn set_failure_count(&mut self, id: &str, raw: &str) -> bool {
        let Some(value) = parse_count_input(raw) else {
            warn!(record_id = %id, input = %raw, "失败数输入非法,已忽略");
            return false;
        };

        let Some(record) = self.records.iter_mut().find(|r| r.id == id) else {
            return false;
        };

        record.delivered_count = (record.delivered_count - value).max(0);
        record.recompute_metrics();
        self.failure_counts.insert(id.to_string(), value);
        self.reaggregate();
        debug!(record_id = %id, failures = value, "更新失败数");
        true
    }

    // ==========================================
    // 字段编辑
    // ==========================================

    /// 编辑 route / ordered_count / delivered_count
    pub fn set_field(&mut self, id: &str, field: RecordField, raw: &str) -> bool {
        match RecordEdit::from_input(field, raw) {
            Some(edit) => self.apply_edit(id, edit),
            None => {
                warn!(record_id = %id, field = %field, input = %raw, "字段输入非法,已忽略");
                false
            }
        }
    }

    /// 应用已校验的编辑操作
    pub fn apply_edit(&mut self, id: &str, edit: RecordEdit) -> bool {
        let Some(record) = self.records.iter_mut().find(|r| r.id == id) else {
            return false;
        };

        match edit {
            RecordEdit::SetRoute(route) => {
                if route.is_empty() {
                    return false;
                }
                record.route = route;
                // 线路不影响数值字段
                return true;
            }
            RecordEdit::SetOrderedCount(value) => {
                record.ordered_count = value;
                record.recompute_metrics();
            }
            RecordEdit::SetDeliveredCount(value) => {
                record.delivered_count = value;
                record.recompute_metrics();
            }
        }

        self.reaggregate();
        true
    }

    // ==========================================
    // 编辑生命周期
    // ==========================================

    /// 进入编辑模式并捕获快照
    ///
    /// 已在编辑中时保持原快照
    pub fn begin_edit(&mut self, id: &str) -> bool {
        if self.record_edits.contains_key(id) {
            return false;
        }
        let Some(record) = self.get(id) else {
            return false;
        };

        let snapshot = EditSnapshot {
            route: record.route.clone(),
            ordered_count: record.ordered_count,
            delivered_count: record.delivered_count,
            failure_count: self.failure_count(id),
        };
        self.record_edits.insert(id.to_string(), snapshot);
        true
    }

    /// 保存: 仅清除编辑标志与快照,数值不变
    pub fn commit_edit(&mut self, id: &str) -> bool {
        self.record_edits.remove(id).is_some()
    }

    /// 取消: 从快照还原计数与线路,重算派生字段,还原失败数
    pub fn cancel_edit(&mut self, id: &str) -> bool {
        let Some(snapshot) = self.record_edits.remove(id) else {
            return false;
        };
        let Some(record) = self.records.iter_mut().find(|r| r.id == id) else {
            return false;
        };

        record.route = snapshot.route;
        record.ordered_count = snapshot.ordered_count;
        record.delivered_count = snapshot.delivered_count;
        record.recompute_metrics();
        self.failure_counts
            .insert(id.to_string(), snapshot.failure_count);
        self.reaggregate();
        true
    }

    // ==========================================
    // 删除 / 批量
    // ==========================================

    /// 删除记录
    ///
    /// 失败数侧表中的条目保留（孤儿条目不参与汇总）
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        if self.records.len() == before {
            return false;
        }
        self.record_edits.remove(id);
        self.reaggregate();
        true
    }

    /// 对满足当前过滤条件的记录批量设置线路
    ///
    /// # 返回
    /// - 被修改的记录数（线路为空时为 0）
    pub fn apply_batch_route(&mut self, route: &str, filter: &RecordFilter) -> usize {
        if route.is_empty() {
            return 0;
        }

        let mut changed = 0;
        for record in self.records.iter_mut().filter(|r| filter.matches(r)) {
            record.route = route.to_string();
            changed += 1;
        }
        debug!(route = %route, changed, "批量设置线路");
        changed
    }

    /// 清空记录集与失败数侧表
    pub fn clear_all(&mut self) {
        self.records.clear();
        self.failure_counts.clear();
        self.record_edits.clear();
        self.reaggregate();
    }

    // ==========================================
    // 区域汇总编辑
    // ==========================================

    /// 进入区域 totalReceived 编辑（仅 SP / RJ）
    pub fn begin_region_edit(&mut self, scope: SummaryScope) -> bool {
        if scope == SummaryScope::All || self.region_edits.contains_key(&scope) {
            return false;
        }
        let summary = self.summaries.get_mut(scope);
        summary.is_editing = true;
        self.region_edits.insert(scope, summary.total_received);
        true
    }

    /// 设置区域 totalReceived（仅 SP / RJ,非数字输入忽略）
    pub fn set_total_received(&mut self, scope: SummaryScope, raw: &str) -> bool {
        if scope == SummaryScope::All {
            return false;
        }
        let Some(value) = parse_count_input(raw) else {
            warn!(scope = %scope, input = %raw, "totalReceived 输入非法,已忽略");
            return false;
        };

        self.summaries.get_mut(scope).total_received = value;
        RegionAggregator::refresh_percentages(&mut self.summaries);
        true
    }

    pub fn commit_region_edit(&mut self, scope: SummaryScope) -> bool {
        if self.region_edits.remove(&scope).is_none() {
            return false;
        }
        self.summaries.get_mut(scope).is_editing = false;
        true
    }

    /// 取消: 还原快照中的 totalReceived 并重算百分比
    pub fn cancel_region_edit(&mut self, scope: SummaryScope) -> bool {
        let Some(original) = self.region_edits.remove(&scope) else {
            return false;
        };
        let summary = self.summaries.get_mut(scope);
        summary.total_received = original;
        summary.is_editing = false;
        RegionAggregator::refresh_percentages(&mut self.summaries);
        true
    }

    // ==========================================
    // 内部
    // ==========================================

    /// 全量重算区域汇总（保留 totalReceived）
    fn reaggregate(&mut self) {
        self.summaries = self
            .aggregator
            .recompute(&self.records, &self.failure_counts, &self.summaries);
    }
}
