use crate::app::state::AppState;
use crate::domain::types::SummaryScope;

use super::common::{map_api_error, to_json};

// ==========================================
// 区域汇总相关命令
// ==========================================

/// 当前区域过滤下的汇总卡片
#[tauri::command(rename_all = "snake_case")]
pub async fn get_region_summaries(
    state: tauri::State<'_, AppState>,
    region: Option<String>,
) -> Result<String, String> {
    let cards = state
        .dashboard_api
        .visible_summaries(region.as_deref().unwrap_or(""))
        .map_err(map_api_error)?;

    to_json(&cards)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn begin_region_edit(
    state: tauri::State<'_, AppState>,
    scope: SummaryScope,
) -> Result<bool, String> {
    state
        .dashboard_api
        .begin_region_edit(scope)
        .map_err(map_api_error)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn set_total_received(
    state: tauri::State<'_, AppState>,
    scope: SummaryScope,
    value: String,
) -> Result<bool, String> {
    state
        .dashboard_api
        .set_total_received(scope, &value)
        .map_err(map_api_error)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn commit_region_edit(
    state: tauri::State<'_, AppState>,
    scope: SummaryScope,
) -> Result<bool, String> {
    state
        .dashboard_api
        .commit_region_edit(scope)
        .map_err(map_api_error)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn cancel_region_edit(
    state: tauri::State<'_, AppState>,
    scope: SummaryScope,
) -> Result<bool, String> {
    state
        .dashboard_api
        .cancel_region_edit(scope)
        .map_err(map_api_error)
}
