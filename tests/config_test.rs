// ==========================================
// 配置集成测试
// ==========================================
// 测试目标: config_kv 覆写 → 分档阈值 / 人工新增默认区域
// ==========================================


use route_evolution::api::{ManualRecordRequest, ViewQuery};
use route_evolution::app::AppState;
use route_evolution::config::config_keys;
use route_evolution::domain::{PerformanceBand, Region};
use tempfile::tempdir;
use test_helpers::{create_test_app, create_test_db, write_csv};

#[tokio::test]
async fn test_band_thresholds_follow_config() {
    let dir = tempdir().unwrap();
    let path = write_csv(&dir, "dia.csv", &["Ana,SP-1,,100,80,"]);

    let (_db, state) = create_test_app();
    let api = &state.dashboard_api;
    api.import_file(&path).await.unwrap();

    let rows = api.list_records(&ViewQuery::default()).await.unwrap();
    assert_eq!(rows[0].delivery_band, PerformanceBand::Critical);
    assert_eq!(rows[0].route_band, PerformanceBand::Critical);

    state
        .config_manager
        .set_config_value(config_keys::DELIVERY_GOOD_MIN, "80")
        .unwrap();
    state
        .config_manager
        .set_config_value(config_keys::ROUTE_ATTENTION_MIN, "75")
        .unwrap();

    let rows = api.list_records(&ViewQuery::default()).await.unwrap();
    assert_eq!(rows[0].delivery_band, PerformanceBand::Good);
    assert_eq!(rows[0].route_band, PerformanceBand::Attention);
}

#[tokio::test]
async fn test_manual_default_region_from_config() {
    let (_db, state) = create_test_app();
    state
        .config_manager
        .set_config_value(config_keys::MANUAL_DEFAULT_REGION, "RJ")
        .unwrap();

    let id = state
        .dashboard_api
        .add_manual(ManualRecordRequest {
            driver: "Ana".to_string(),
            ..ManualRecordRequest::default()
        })
        .await
        .unwrap()
        .unwrap();

    let record = state.dashboard_api.get_record(&id).unwrap();
    assert_eq!(record.region, Region::RJ);
    assert_eq!(record.ordered_count, 0);
    assert!(record.start_timestamp.is_some());
}

#[test]
fn test_config_survives_reopen() {
    let (_db, db_path) = create_test_db().unwrap();

    {
        let state = AppState::new(db_path.clone()).unwrap();
        state
            .config_manager
            .set_config_value(config_keys::ROUTE_GOOD_TARGET, "97.5")
            .unwrap();
    }

    let reopened = AppState::new(db_path).unwrap();
    let thresholds = reopened.config_manager.band_thresholds().unwrap();
    assert_eq!(thresholds.route_good_target, 97.5);
    assert_eq!(thresholds.delivery_good_min, 98.0);

    let snapshot = reopened.config_manager.get_config_snapshot().unwrap();
    assert_eq!(snapshot[config_keys::ROUTE_GOOD_TARGET], "97.5");
}
