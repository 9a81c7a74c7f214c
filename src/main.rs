// ==========================================
// 配送线路看板 - 主入口
// ==========================================
// tauri-app 特性: Tauri 桌面壳
// 默认: 命令行宿主（同一套 API）
// ==========================================

// 禁止控制台窗口 (Windows)
#![cfg_attr(
    all(not(debug_assertions), feature = "tauri-app"),
    windows_subsystem = "windows"
)]

use route_evolution::logging;

#[cfg(feature = "tauri-app")]
fn main() {
    use route_evolution::app::tauri_commands::*;
    use route_evolution::app::{get_default_db_path, AppState};

    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{} - 配送线路看板", route_evolution::APP_NAME);
    tracing::info!("系统版本: {}", route_evolution::VERSION);
    tracing::info!("==================================================");

    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);

    let app_state = match AppState::new(db_path) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("AppState初始化失败: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("启动Tauri应用...");

    let result = tauri::Builder::default()
        .manage(app_state)
        .invoke_handler(tauri::generate_handler![
            // ===== 导入 =====
            import_delivery_file,
            import_delivery_files,
            // ===== 记录 =====
            list_delivery_records,
            list_drivers,
            add_manual_record,
            set_failure_count,
            set_record_field,
            begin_record_edit,
            commit_record_edit,
            cancel_record_edit,
            remove_record,
            apply_batch_route,
            clear_all_records,
            // ===== 区域汇总 =====
            get_region_summaries,
            begin_region_edit,
            set_total_received,
            commit_region_edit,
            cancel_region_edit,
            // ===== 配置 =====
            list_configs,
            update_config,
        ])
        .run(tauri::generate_context!());

    if let Err(e) = result {
        tracing::error!("Tauri应用异常退出: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Tauri应用已退出");
}

#[cfg(not(feature = "tauri-app"))]
#[tokio::main]
async fn main() {
    use clap::Parser;
    use route_evolution::app::cli::{run, Cli};

    logging::init();

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        tracing::error!("命令执行失败: {:#}", err);
        eprintln!("错误: {:#}", err);
        std::process::exit(1);
    }
}
