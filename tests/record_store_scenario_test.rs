// ==========================================
// RecordStore 场景测试
// ==========================================
// 测试目标: 失败数扣减、编辑取消、区域汇总、批量线路
// ==========================================


use route_evolution::domain::{RecordField, Region, SummaryScope};
use route_evolution::engine::{RecordFilter, RecordStore, RegionFilter};
use route_evolution::logging;
use test_helpers::{approx_eq, record};

fn two_region_store() -> RecordStore {
    let mut store = RecordStore::new();
    store.add_imported(vec![
        record("sp-1", "Ana", Region::SP, 100, 80),
        record("rj-1", "Bruno", Region::RJ, 50, 50),
    ]);
    store
}

/// ALL = SP + RJ
fn assert_all_is_sum(store: &RecordStore) {
    let s = store.summaries();
    assert_eq!(s.all.total_orders, s.sp.total_orders + s.rj.total_orders);
    assert_eq!(s.all.delivered, s.sp.delivered + s.rj.delivered);
    assert_eq!(s.all.failures, s.sp.failures + s.rj.failures);
    assert_eq!(s.all.total_received, s.sp.total_received + s.rj.total_received);
}

#[test]
fn test_failure_count_reduces_delivered() {
    logging::init_test();
    let mut store = two_region_store();

    assert!(store.set_failure_count("sp-1", "5"));

    let r = store.get("sp-1").unwrap();
    assert_eq!(r.delivered_count, 75);
    assert_eq!(r.pending_count, 25);
    assert!(approx_eq(r.delivery_percent, 75.0));
    assert!(approx_eq(r.route_percent, 75.0));
    assert_eq!(store.summaries().sp.failures, 5);
    assert_eq!(store.summaries().sp.delivered, 75);
    assert_all_is_sum(&store);
}

#[test]
fn test_cancel_restores_pre_edit_values() {
    let mut store = two_region_store();
    let before = store.get("sp-1").unwrap().clone();

    assert!(store.begin_edit("sp-1"));
    assert!(store.set_field("sp-1", RecordField::OrderedCount, "50"));
    assert!(store.set_field("sp-1", RecordField::Route, "7"));
    assert!(store.set_failure_count("sp-1", "10"));
    assert_eq!(store.get("sp-1").unwrap().ordered_count, 50);

    assert!(store.cancel_edit("sp-1"));

    assert_eq!(store.get("sp-1").unwrap(), &before);
    assert_eq!(store.failure_count("sp-1"), 0);
    assert!(!store.is_editing("sp-1"));
    assert_eq!(store.summaries().sp.total_orders, 100);
    assert_eq!(store.summaries().sp.failures, 0);
    assert_all_is_sum(&store);
}

#[test]
fn test_commit_without_changes_is_idempotent() {
    let mut store = two_region_store();
    let before = store.get("rj-1").unwrap().clone();

    assert!(store.begin_edit("rj-1"));
    assert!(store.commit_edit("rj-1"));

    assert_eq!(store.get("rj-1").unwrap(), &before);
    assert!(store.edit_snapshot("rj-1").is_none());
}

#[test]
fn test_region_totals_use_total_received() {
    let mut store = two_region_store();

    assert!(store.begin_region_edit(SummaryScope::SP));
    assert!(store.set_total_received(SummaryScope::SP, "100"));
    assert!(store.commit_region_edit(SummaryScope::SP));
    assert!(store.set_total_received(SummaryScope::RJ, "50"));

    let s = store.summaries();
    assert_eq!(s.all.total_received, 150);
    assert!(approx_eq(s.sp.delivery_percent, 80.0));
    assert!(approx_eq(s.rj.delivery_percent, 100.0));
    assert!(approx_eq(s.all.delivery_percent, 130.0 / 150.0 * 100.0));

    // ALL 不可直接编辑
    assert!(!store.set_total_received(SummaryScope::All, "999"));
    assert_eq!(store.summaries().all.total_received, 150);
}

#[test]
fn test_total_received_survives_record_mutations() {
    let mut store = two_region_store();
    store.set_total_received(SummaryScope::SP, "200");

    store.set_field("sp-1", RecordField::DeliveredCount, "100");
    store.remove("rj-1");

    let s = store.summaries();
    assert_eq!(s.sp.total_received, 200);
    assert!(approx_eq(s.sp.delivery_percent, 50.0));
    assert_eq!(s.rj.total_orders, 0);
    assert_all_is_sum(&store);
}

#[test]
fn test_batch_route_leaves_unmatched_records_untouched() {
    let mut store = two_region_store();
    store.add_imported(vec![record("sp-2", "Carla", Region::SP, 10, 9)]);
    let untouched = store.get("rj-1").unwrap().clone();

    let filter = RecordFilter {
        search: String::new(),
        region: RegionFilter::Only(Region::SP),
        driver: None,
    };
    assert_eq!(store.apply_batch_route("42", &filter), 2);

    assert_eq!(store.get("sp-1").unwrap().route, "42");
    assert_eq!(store.get("sp-2").unwrap().route, "42");
    assert_eq!(store.get("rj-1").unwrap(), &untouched);
    assert_eq!(store.apply_batch_route("", &filter), 0);
}

#[test]
fn test_invalid_input_never_changes_state() {
    let mut store = two_region_store();
    let before = store.to_persisted();
    let summaries = store.summaries().clone();

    assert!(!store.set_failure_count("sp-1", "abc"));
    assert!(!store.set_field("sp-1", RecordField::OrderedCount, "1.5"));
    assert!(!store.set_field("sp-1", RecordField::DeliveredCount, "-3"));
    assert!(!store.set_field("sp-1", RecordField::Route, ""));
    assert!(!store.set_total_received(SummaryScope::RJ, "x"));
    assert!(!store.set_failure_count("missing", "1"));

    assert_eq!(store.to_persisted(), before);
    assert_eq!(store.summaries(), &summaries);
}

#[test]
fn test_derived_fields_consistent_after_mixed_sequence() {
    let mut store = two_region_store();
    store.set_field("sp-1", RecordField::OrderedCount, "0");
    store.set_failure_count("rj-1", "60");
    store.set_field("rj-1", RecordField::OrderedCount, "40");

    for r in store.records() {
        assert_eq!(r.pending_count, r.ordered_count - r.delivered_count);
        if r.ordered_count == 0 {
            assert_eq!(r.delivery_percent, 0.0);
            assert_eq!(r.route_percent, 0.0);
        } else {
            assert!(approx_eq(
                r.delivery_percent,
                r.delivered_count as f64 / r.ordered_count as f64 * 100.0
            ));
            assert!(approx_eq(r.route_percent, r.delivery_percent));
        }
    }

    let rj = store.get("rj-1").unwrap();
    assert_eq!(rj.delivered_count, 0);
    assert_eq!(rj.pending_count, 40);
    assert_all_is_sum(&store);
}
