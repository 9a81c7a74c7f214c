use std::path::PathBuf;

use crate::app::state::AppState;

use super::common::{map_api_error, to_json};

// ==========================================
// 导入相关命令
// ==========================================

/// 导入单个表格文件（Excel / CSV）
#[tauri::command(rename_all = "snake_case")]
pub async fn import_delivery_file(
    state: tauri::State<'_, AppState>,
    file_path: String,
) -> Result<String, String> {
    let report = state
        .dashboard_api
        .import_file(&PathBuf::from(file_path))
        .await
        .map_err(map_api_error)?;

    to_json(&report)
}

/// 批量导入（每个文件独立成功/失败）
#[tauri::command(rename_all = "snake_case")]
pub async fn import_delivery_files(
    state: tauri::State<'_, AppState>,
    file_paths: Vec<String>,
) -> Result<String, String> {
    let paths: Vec<PathBuf> = file_paths.into_iter().map(PathBuf::from).collect();
    let results = state.dashboard_api.import_files(&paths).await;

    let payload: Vec<serde_json::Value> = results
        .into_iter()
        .map(|result| match result {
            Ok(report) => serde_json::json!({ "ok": true, "report": report }),
            Err(err) => serde_json::json!({ "ok": false, "error": map_api_error(err) }),
        })
        .collect();

    to_json(&payload)
}
