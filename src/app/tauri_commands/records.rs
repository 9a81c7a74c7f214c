use crate::api::{ManualRecordRequest, ViewQuery};
use crate::app::state::AppState;
use crate::domain::delivery::RecordField;

use super::common::{map_api_error, to_json};

// ==========================================
// 记录相关命令
// ==========================================

/// 查询列表（过滤 + 排序）
#[tauri::command(rename_all = "snake_case")]
pub async fn list_delivery_records(
    state: tauri::State<'_, AppState>,
    query: Option<ViewQuery>,
) -> Result<String, String> {
    let rows = state
        .dashboard_api
        .list_records(&query.unwrap_or_default())
        .await
        .map_err(map_api_error)?;

    to_json(&rows)
}

/// 当前区域下的司机列表
#[tauri::command(rename_all = "snake_case")]
pub async fn list_drivers(
    state: tauri::State<'_, AppState>,
    region: Option<String>,
) -> Result<String, String> {
    let drivers = state
        .dashboard_api
        .drivers(region.as_deref().unwrap_or(""))
        .map_err(map_api_error)?;

    to_json(&drivers)
}

/// 人工新增记录
#[tauri::command(rename_all = "snake_case")]
pub async fn add_manual_record(
    state: tauri::State<'_, AppState>,
    request: ManualRecordRequest,
) -> Result<String, String> {
    let id = state
        .dashboard_api
        .add_manual(request)
        .await
        .map_err(map_api_error)?;

    to_json(&id)
}

/// 设置失败数
#[tauri::command(rename_all = "snake_case")]
pub async fn set_failure_count(
    state: tauri::State<'_, AppState>,
    record_id: String,
    value: String,
) -> Result<bool, String> {
    state
        .dashboard_api
        .set_failure_count(&record_id, &value)
        .map_err(map_api_error)
}

/// 编辑字段（route / ordered_count / delivered_count）
#[tauri::command(rename_all = "snake_case")]
pub async fn set_record_field(
    state: tauri::State<'_, AppState>,
    record_id: String,
    field: String,
    value: String,
) -> Result<bool, String> {
    let field: RecordField = field.parse()?;
    state
        .dashboard_api
        .set_field(&record_id, field, &value)
        .map_err(map_api_error)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn begin_record_edit(
    state: tauri::State<'_, AppState>,
    record_id: String,
) -> Result<bool, String> {
    state
        .dashboard_api
        .begin_edit(&record_id)
        .map_err(map_api_error)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn commit_record_edit(
    state: tauri::State<'_, AppState>,
    record_id: String,
) -> Result<bool, String> {
    state
        .dashboard_api
        .commit_edit(&record_id)
        .map_err(map_api_error)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn cancel_record_edit(
    state: tauri::State<'_, AppState>,
    record_id: String,
) -> Result<bool, String> {
    state
        .dashboard_api
        .cancel_edit(&record_id)
        .map_err(map_api_error)
}

/// 删除记录
#[tauri::command(rename_all = "snake_case")]
pub async fn remove_record(
    state: tauri::State<'_, AppState>,
    record_id: String,
) -> Result<bool, String> {
    state
        .dashboard_api
        .remove(&record_id)
        .map_err(map_api_error)
}

/// 对当前过滤结果批量设置线路
#[tauri::command(rename_all = "snake_case")]
pub async fn apply_batch_route(
    state: tauri::State<'_, AppState>,
    route: String,
    query: Option<ViewQuery>,
) -> Result<usize, String> {
    state
        .dashboard_api
        .apply_batch_route(&route, &query.unwrap_or_default())
        .map_err(map_api_error)
}

/// 清空全部记录
#[tauri::command(rename_all = "snake_case")]
pub async fn clear_all_records(state: tauri::State<'_, AppState>) -> Result<(), String> {
    state.dashboard_api.clear_all().map_err(map_api_error)
}
