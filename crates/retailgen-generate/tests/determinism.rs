mod common;

use std::fs;

use retailgen_core::ENTITY_ORDER;
use retailgen_generate::GenerationEngine;

use common::{entity_file, reference, settings};

#[test]
fn same_seed_gives_byte_identical_files() {
    let dir_a = tempfile::tempdir().expect("tempdir a");
    let dir_b = tempfile::tempdir().expect("tempdir b");

    let engine = GenerationEngine::new(settings()).with_reference(reference());
    let result_a = engine.run(dir_a.path()).expect("run generation A");
    let result_b = engine.run(dir_b.path()).expect("run generation B");

    assert_ne!(result_a.report.run_id, result_b.report.run_id);
    for kind in ENTITY_ORDER {
        let a = fs::read(entity_file(dir_a.path(), kind.name(), settings().format))
            .unwrap_or_else(|_| panic!("missing {kind} output A"));
        let b = fs::read(entity_file(dir_b.path(), kind.name(), settings().format))
            .unwrap_or_else(|_| panic!("missing {kind} output B"));
        assert_eq!(a, b, "{kind} output should be deterministic");
    }
}

#[test]
fn different_seed_changes_the_dataset() {
    let dir_a = tempfile::tempdir().expect("tempdir a");
    let dir_b = tempfile::tempdir().expect("tempdir b");

    let mut other = settings();
    other.seed += 1;
    GenerationEngine::new(settings())
        .with_reference(reference())
        .run(dir_a.path())
        .expect("run generation A");
    GenerationEngine::new(other)
        .with_reference(reference())
        .run(dir_b.path())
        .expect("run generation B");

    let brands_a = fs::read_to_string(entity_file(dir_a.path(), "brands", settings().format))
        .expect("read brands A");
    let brands_b = fs::read_to_string(entity_file(dir_b.path(), "brands", settings().format))
        .expect("read brands B");
    assert_ne!(brands_a, brands_b);

    // Reference-driven entities do not draw from their streams.
    let zips_a = fs::read_to_string(entity_file(dir_a.path(), "zipcodes", settings().format))
        .expect("read zipcodes A");
    let zips_b = fs::read_to_string(entity_file(dir_b.path(), "zipcodes", settings().format))
        .expect("read zipcodes B");
    assert_eq!(zips_a, zips_b);
}

#[test]
fn spilled_entities_are_reused_by_a_matching_run() {
    let work = tempfile::tempdir().expect("work dir");
    let dir_a = tempfile::tempdir().expect("tempdir a");
    let dir_b = tempfile::tempdir().expect("tempdir b");

    let mut kept = settings();
    kept.work_dir = Some(work.path().to_path_buf());
    kept.keep_intermediate = true;
    let engine = GenerationEngine::new(kept).with_reference(reference());

    let first = engine.run(dir_a.path()).expect("first run");
    assert_eq!(first.intermediate_dir.as_deref(), Some(work.path()));
    assert!(first.report.entities.iter().all(|entity| !entity.reused));
    assert!(work.path().join("sales.tmp").exists());

    let second = engine.run(dir_b.path()).expect("second run");
    assert!(second.report.entities.iter().all(|entity| entity.reused));

    for kind in ENTITY_ORDER {
        let a = fs::read(entity_file(dir_a.path(), kind.name(), settings().format)).expect("read A");
        let b = fs::read(entity_file(dir_b.path(), kind.name(), settings().format)).expect("read B");
        assert_eq!(a, b, "{kind} output should match the reused run");
    }
}

#[test]
fn changed_reference_data_invalidates_spilled_entities() {
    let work = tempfile::tempdir().expect("work dir");
    let dir_a = tempfile::tempdir().expect("tempdir a");
    let dir_b = tempfile::tempdir().expect("tempdir b");

    let mut kept = settings();
    kept.work_dir = Some(work.path().to_path_buf());
    kept.keep_intermediate = true;

    GenerationEngine::new(kept.clone())
        .with_reference(reference())
        .run(dir_a.path())
        .expect("first run");

    let mut renamed = reference();
    for template in &mut renamed.franchises {
        template.name = format!("Renamed {}", template.name);
    }
    let second = GenerationEngine::new(kept)
        .with_reference(renamed)
        .run(dir_b.path())
        .expect("second run");

    assert!(second.report.entities.iter().all(|entity| !entity.reused));
    let franchises = fs::read_to_string(entity_file(dir_b.path(), "franchises", settings().format))
        .expect("read franchises");
    assert!(franchises.contains("Renamed Harbor"));
    assert!(!franchises.contains("\"Name\":\"Harbor\""));
}

#[test]
fn temporary_spill_is_removed_after_the_run() {
    let dir = tempfile::tempdir().expect("tempdir");
    let result = GenerationEngine::new(settings())
        .with_reference(reference())
        .run(dir.path())
        .expect("run generation");
    assert!(result.intermediate_dir.is_none());
}
