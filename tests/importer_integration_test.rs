// ==========================================
// 导入流程集成测试
// ==========================================
// 测试目标: CSV 文件 → 规范化 → 记录仓（经 DashboardApi）
// ==========================================


use route_evolution::api::{ApiError, ViewQuery};
use route_evolution::domain::{Region, NOT_STARTED_LABEL};
use route_evolution::importer::{ColumnRole, DeliveryImporter, DeliveryImporterImpl, ImportError};
use route_evolution::logging;
use std::path::Path;
use tempfile::tempdir;
use test_helpers::{approx_eq, create_test_app, write_csv, write_raw};

#[tokio::test]
async fn test_import_csv_accepts_and_excludes_rows() {
    logging::init_test();
    let dir = tempdir().unwrap();
    let path = write_csv(
        &dir,
        "rotas.csv",
        &[
            "Ana,SP-123,08:00,100,80,",
            "Bruno,RJ-77,,50,50,Em rota",
            "Caio,RJ-78,09:10,20,5,Cancelada",
            "Davi,MG-01,07:00,10,10,",
        ],
    );

    let (_db, state) = create_test_app();
    let report = state.dashboard_api.import_file(&path).await.unwrap();

    assert_eq!(report.source, "rotas.csv");
    assert_eq!(report.total_rows, 4);
    assert_eq!(report.imported, 2);
    assert_eq!(report.excluded_cancelled, 1);
    assert_eq!(report.excluded_no_region, 1);

    let rows = state
        .dashboard_api
        .list_records(&ViewQuery::default())
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);

    let ana = &rows[0].record;
    assert_eq!(ana.region, Region::SP);
    assert_eq!(ana.pending_count, 20);
    assert!(approx_eq(ana.delivery_percent, 80.0));
    assert!(approx_eq(ana.route_percent, 80.0));
    assert_eq!(ana.route, "1");
    assert_eq!(rows[0].failure_count, 0);

    let bruno = &rows[1].record;
    assert_eq!(bruno.start_label, NOT_STARTED_LABEL);
    assert_eq!(bruno.start_timestamp, None);
}

#[tokio::test]
async fn test_import_xlsx_fixture() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/rotas_dia.xlsx");

    let (_db, state) = create_test_app();
    let report = state.dashboard_api.import_file(&path).await.unwrap();

    assert_eq!(report.source, "rotas_dia.xlsx");
    assert_eq!(report.total_rows, 4);
    assert_eq!(report.imported, 2);
    assert_eq!(report.excluded_cancelled, 1);
    assert_eq!(report.excluded_no_region, 1);
    assert!(report.missing_columns.is_empty());

    let rows = state
        .dashboard_api
        .list_records(&ViewQuery::default())
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);

    let ana = &rows[0].record;
    assert_eq!(ana.driver, "Ana");
    assert_eq!(ana.region, Region::SP);
    assert_eq!(ana.start_label, "08:00");
    assert_eq!(ana.ordered_count, 100);
    assert_eq!(ana.delivered_count, 80);
    assert_eq!(ana.pending_count, 20);
    assert!(approx_eq(ana.delivery_percent, 80.0));
    assert!(approx_eq(ana.route_percent, 80.0));

    let beto = &rows[1].record;
    assert_eq!(beto.region, Region::RJ);
    assert_eq!(beto.start_label, NOT_STARTED_LABEL);

    // 第二个工作表的行不导入
    assert!(state.dashboard_api.drivers("").unwrap().iter().all(|d| d != "Zeca"));
}

#[tokio::test]
async fn test_cancelled_only_file_leaves_count_unchanged() {
    let dir = tempdir().unwrap();
    let first = write_csv(&dir, "a.csv", &["Ana,SP-1,,10,10,"]);
    let cancelled = write_csv(&dir, "b.csv", &["Beto,RJ-1,,10,10,Cancelada"]);

    let (_db, state) = create_test_app();
    state.dashboard_api.import_file(&first).await.unwrap();
    let report = state.dashboard_api.import_file(&cancelled).await.unwrap();

    assert_eq!(report.imported, 0);
    assert_eq!(state.dashboard_api.record_count().unwrap(), 1);
}

#[tokio::test]
async fn test_repeated_import_appends_without_dedup() {
    let dir = tempdir().unwrap();
    let path = write_csv(&dir, "dia.csv", &["Ana,SP-1,,10,8,", "Bia,RJ-2,,5,5,"]);

    let (_db, state) = create_test_app();
    state.dashboard_api.import_file(&path).await.unwrap();
    state.dashboard_api.import_file(&path).await.unwrap();

    assert_eq!(state.dashboard_api.record_count().unwrap(), 4);
    let summaries = state.dashboard_api.summaries().unwrap();
    assert_eq!(summaries.sp.total_orders, 20);
    assert_eq!(summaries.rj.delivered, 10);
    assert_eq!(summaries.all.total_orders, 30);
}

#[tokio::test]
async fn test_headers_matched_by_text_not_position() {
    let dir = tempdir().unwrap();
    let path = write_raw(
        dir.path(),
        "reordenado.csv",
        "  SITUAÇÃO ;Serviços - Realizado;Coluna Extra;veículo;AGENTE;Serviços - Previsto\n\
         ;30;x;RJ-9;Carla;40\n",
    );

    let outcome = DeliveryImporterImpl::new().import_file(&path).await.unwrap();

    assert_eq!(outcome.records.len(), 1);
    let r = &outcome.records[0];
    assert_eq!(r.driver, "Carla");
    assert_eq!(r.region, Region::RJ);
    assert_eq!(r.ordered_count, 40);
    assert_eq!(r.delivered_count, 30);
    assert_eq!(outcome.report.missing_columns, vec![ColumnRole::StartTime]);
}

#[tokio::test]
async fn test_missing_columns_read_as_empty() {
    let dir = tempdir().unwrap();
    let path = write_raw(dir.path(), "parcial.csv", "Agente,Veículo\nAna,SP-1\nBeto,XX-2\n");

    let outcome = DeliveryImporterImpl::new().import_file(&path).await.unwrap();

    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].ordered_count, 0);
    assert_eq!(outcome.records[0].delivery_percent, 0.0);
    assert_eq!(outcome.report.excluded_no_region, 1);
    assert_eq!(outcome.report.missing_columns.len(), 4);
}

#[tokio::test]
async fn test_import_files_isolates_failures() {
    let dir = tempdir().unwrap();
    let good = write_csv(&dir, "ok.csv", &["Ana,SP-1,,10,10,"]);
    let missing = dir.path().join("nao_existe.csv");
    let unsupported = write_raw(dir.path(), "notas.txt", "qualquer");

    let (_db, state) = create_test_app();
    let results = state
        .dashboard_api
        .import_files(&[good, missing, unsupported])
        .await;

    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok());
    assert!(matches!(results[1], Err(ApiError::NotFound(_))));
    assert!(matches!(results[2], Err(ApiError::InvalidInput(_))));
    assert_eq!(state.dashboard_api.record_count().unwrap(), 1);
}

#[tokio::test]
async fn test_garbage_workbook_is_reported() {
    let dir = tempdir().unwrap();
    let path = write_raw(dir.path(), "quebrado.xlsx", "not a zip archive");

    let result = DeliveryImporterImpl::new().import_file(&path).await;
    assert!(matches!(result, Err(ImportError::ExcelParseError(_))));
}
