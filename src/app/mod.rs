// ==========================================
// 配送线路看板 - 应用层
// ==========================================
// 职责: 宿主集成（Tauri 命令 / 命令行共用的应用状态）
// ==========================================

pub mod cli;
pub mod state;
pub mod tauri_commands;

// 重导出
pub use state::{get_default_db_path, AppState, DB_PATH_ENV};

#[cfg(feature = "tauri-app")]
pub use tauri_commands::*;
