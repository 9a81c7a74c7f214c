use crate::app::state::AppState;

use super::common::to_json;

// ==========================================
// 配置管理相关命令
// ==========================================

/// 全部配置（含默认值）
#[tauri::command(rename_all = "snake_case")]
pub async fn list_configs(state: tauri::State<'_, AppState>) -> Result<String, String> {
    let snapshot = state
        .config_manager
        .get_config_snapshot()
        .map_err(|e| format!("配置读取失败: {}", e))?;

    to_json(&snapshot)
}

/// 更新配置
#[tauri::command(rename_all = "snake_case")]
pub async fn update_config(
    state: tauri::State<'_, AppState>,
    key: String,
    value: String,
) -> Result<(), String> {
    state
        .config_manager
        .set_config_value(&key, &value)
        .map_err(|e| format!("配置更新失败: {}", e))
}
