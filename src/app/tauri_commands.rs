// ==========================================
// 配送线路看板 - Tauri 命令（按域拆分）
// ==========================================
// 职责: Tauri 命令定义,连接前端与后端 API
// ==========================================

#![cfg(feature = "tauri-app")]

mod common;
mod config;
mod import;
mod records;
mod summary;

pub use config::*;
pub use import::*;
pub use records::*;
pub use summary::*;
