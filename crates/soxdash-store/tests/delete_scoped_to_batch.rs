use pretty_assertions::assert_eq;
use soxdash_model::{Domain, Table};
use soxdash_store::Store;

fn effort_row(mics_id: &str, days: f64) -> Vec<soxdash_model::CellScalar> {
    vec![
        mics_id.into(),
        "SAP".into(),
        "Testing".into(),
        "A. Silva".into(),
        soxdash_model::CellScalar::Number(days),
        soxdash_model::CellScalar::Number(days),
        "2026-Q1".into(),
    ]
}

fn effort_table(rows: &[(&str, f64)]) -> Table {
    let mut table = Table::new(
        Domain::MicsEffort
            .columns()
            .iter()
            .map(|c| c.header.to_string())
            .collect(),
    );
    for (id, days) in rows {
        table.push_row(effort_row(id, *days)).expect("push row");
    }
    table
}

#[test]
fn delete_removes_exactly_one_batch() {
    let store = Store::open_in_memory(Domain::MicsEffort).expect("open store");

    let kept = store
        .save(&effort_table(&[("M-1", 2.0), ("M-2", 3.0)]), "jan.xlsx")
        .expect("save kept");
    let doomed = store
        .save(&effort_table(&[("M-3", 1.0)]), "feb.xlsx")
        .expect("save doomed");

    assert_eq!(store.delete_by_upload(doomed.upload_id).expect("delete"), 1);

    let remaining = store.load_all().expect("load all");
    assert_eq!(remaining.row_count(), 2);
    assert_eq!(
        store.load_by_upload(kept.upload_id).expect("load kept").row_count(),
        2
    );
    assert!(store
        .load_by_upload(doomed.upload_id)
        .expect("load doomed")
        .is_empty());
}

#[test]
fn deleting_an_unknown_id_is_a_no_op() {
    let store = Store::open_in_memory(Domain::MicsEffort).expect("open store");
    store
        .save(&effort_table(&[("M-1", 2.0)]), "jan.xlsx")
        .expect("save");

    let deleted = store
        .delete_by_upload(uuid::Uuid::new_v4())
        .expect("delete unknown id");
    assert_eq!(deleted, 0);
    assert_eq!(store.load_all().expect("load all").row_count(), 1);
}
