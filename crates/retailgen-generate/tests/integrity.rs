mod common;

use std::collections::HashSet;
use std::fs;

use retailgen_core::{EntityKind, Sale, Store};
use retailgen_generate::GenerationEngine;
use retailgen_generate::engine::REPORT_FILE;
use retailgen_generate::model::{GenerationReport, OutputFormat};

use common::{entity_file, reference, settings};

fn read_lines<T: serde::de::DeserializeOwned>(path: &std::path::Path) -> Vec<T> {
    fs::read_to_string(path)
        .expect("read entity file")
        .lines()
        .map(|line| serde_json::from_str(line).expect("parse json line"))
        .collect()
}

#[test]
fn verified_run_writes_consistent_dataset_and_report() {
    let dir = tempfile::tempdir().expect("tempdir");
    let result = GenerationEngine::new(settings())
        .with_reference(reference())
        .run(dir.path())
        .expect("run generation");

    let report = &result.report;
    assert_eq!(report.integrity_issue_count, 0, "{:?}", report.integrity_issues);
    assert!(report.error.is_none());
    assert_eq!(report.entities.len(), 11);
    assert!(report.sales.visits > 0);
    assert!(report.sales.lines >= report.sales.visits);

    let sales_entry = report.entity(EntityKind::Sales).expect("sales entry");
    assert_eq!(sales_entry.rows, report.sales.lines + 1);

    let written: GenerationReport = serde_json::from_slice(
        &fs::read(dir.path().join(REPORT_FILE)).expect("read report"),
    )
    .expect("parse report");
    assert_eq!(written.run_id, report.run_id);
    assert_eq!(written.sales.lines, report.sales.lines);
}

#[test]
fn every_sale_points_at_a_store_of_its_franchise() {
    let dir = tempfile::tempdir().expect("tempdir");
    GenerationEngine::new(settings())
        .with_reference(reference())
        .run(dir.path())
        .expect("run generation");

    let stores: Vec<Store> = read_lines(&entity_file(dir.path(), "stores", OutputFormat::Json));
    let sales: Vec<Sale> = read_lines(&entity_file(dir.path(), "sales", OutputFormat::Json));
    assert_eq!(sales[0].id, -1);

    let pairs: HashSet<(i64, i64)> = stores
        .iter()
        .map(|store| (store.id, store.franchise_id))
        .collect();
    let mut receipts = HashSet::new();
    for sale in &sales[1..] {
        assert!(pairs.contains(&(sale.store_id, sale.franchise_id)));
        let quantity = sale.quantity.expect("quantity");
        let unit = sale.unit_price.expect("unit price");
        let total = sale.total_price.expect("total price");
        assert!(quantity >= 1);
        assert!((total - unit * quantity as f64).abs() < 0.005);
        assert!((8..20).contains(&(sale.time_id / 100)));
        receipts.insert(sale.receipt.clone().expect("receipt"));
    }
    assert!(!receipts.is_empty());
}

#[test]
fn csv_run_writes_headers_for_every_entity() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut csv = settings();
    csv.format = OutputFormat::Csv;
    csv.days = 1;
    GenerationEngine::new(csv)
        .with_reference(reference())
        .run(dir.path())
        .expect("run generation");

    let franchises = fs::read_to_string(entity_file(dir.path(), "franchises", OutputFormat::Csv))
        .expect("read franchises");
    let mut lines = franchises.lines();
    assert!(lines.next().expect("header").starts_with("id,"));
    assert!(lines.next().expect("sentinel").starts_with("-1,Unknown"));
    assert_eq!(lines.count(), 3);
}

#[test]
fn failed_run_still_writes_a_report() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut broken = reference();
    broken.first_names.clear();

    let err = GenerationEngine::new(settings())
        .with_reference(broken)
        .run(dir.path())
        .unwrap_err();

    let written: GenerationReport = serde_json::from_slice(
        &fs::read(dir.path().join(REPORT_FILE)).expect("read report"),
    )
    .expect("parse report");
    assert_eq!(written.error.as_deref(), Some(err.to_string().as_str()));
    assert!(written.entity(EntityKind::Employees).is_none());
    assert!(written.entity(EntityKind::Skus).is_some());
}
