// ==========================================
// 配送线路看板 - 应用状态
// ==========================================
// 职责: 打开数据库、建表,组装仓储/配置/API 的共享实例
// ==========================================

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::api::DashboardApi;
use crate::config::ConfigManager;
use crate::db::{init_schema, open_sqlite_connection, read_schema_version};
use crate::repository::StateRepository;

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "ROUTE_EVOLUTION_DB_PATH";

/// 应用状态
///
/// 在 Tauri 应用中作为全局状态管理,命令行宿主同样复用
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 看板API
    pub dashboard_api: Arc<DashboardApi>,

    /// 配置管理器（分档阈值/默认区域的读写）
    pub config_manager: Arc<ConfigManager>,

    /// 持久化状态仓储
    pub state_repo: Arc<StateRepository>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 说明
    /// 1. 打开数据库并建表（幂等）
    /// 2. 三个组件共享同一连接
    /// 3. 恢复持久化记录集（损坏时以空记录集启动）
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState,数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        init_schema(&conn).map_err(|e| format!("数据库建表失败: {}", e))?;
        if let Ok(Some(version)) = read_schema_version(&conn) {
            tracing::debug!(schema_version = version, "数据库 schema 就绪");
        }
        let conn = Arc::new(Mutex::new(conn));

        let state_repo = Arc::new(StateRepository::new(conn.clone()));
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn).map_err(|e| format!("配置管理器初始化失败: {}", e))?,
        );
        let dashboard_api = Arc::new(
            DashboardApi::new(state_repo.clone(), config_manager.clone())
                .map_err(|e| format!("看板API初始化失败: {}", e))?,
        );

        tracing::info!("AppState初始化完成");
        Ok(Self {
            db_path,
            dashboard_api,
            config_manager,
            state_repo,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先级: ROUTE_EVOLUTION_DB_PATH 环境变量 > 用户数据目录 > 当前目录
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./route_evolution.db");

    if let Some(data_dir) = dirs::data_dir() {
        // 开发环境使用独立目录,避免污染正式数据
        #[cfg(debug_assertions)]
        {
            path = data_dir.join("route-evolution-dev");
        }

        #[cfg(not(debug_assertions))]
        {
            path = data_dir.join("route-evolution");
        }

        // best-effort: 目录创建失败时由 open 报错
        std::fs::create_dir_all(&path).ok();
        path = path.join("route_evolution.db");
    }

    path.to_string_lossy().to_string()
}
