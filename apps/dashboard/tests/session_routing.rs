use std::io::Write;
use std::path::PathBuf;

use dashboard::{Session, Severity};
use pretty_assertions::assert_eq;
use soxdash_model::Domain;
use soxdash_store::StoreSet;
use tempfile::TempDir;

const TICKETS_CSV: &str = "\
Ticket ID,IT Solution,MICS ID,Priority,Status,Assignee,Opened,Closed
T-1,SAP,M-1,High,Open,A. Silva,2026-01-10,
T-2,SAP,M-1,Low,Open,A. Silva,2026-01-11,
T-3,SAP,M-2,Low,Closed,R. Costa,2026-01-12,2026-01-20
";

fn write_csv(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).expect("create csv");
    file.write_all(contents.as_bytes()).expect("write csv");
    path
}

fn session() -> Session {
    Session::new(StoreSet::open_in_memory().expect("open stores"), 1000)
}

#[test]
fn the_default_store_is_control_status() {
    let session = session();
    assert_eq!(session.active(), Domain::ControlStatus);
}

#[test]
fn upload_list_delete_lifecycle_through_the_session() {
    let dir = TempDir::new().expect("tempdir");
    let file = write_csv(&dir, "tickets.csv", TICKETS_CSV);

    let mut session = session();
    session.select(Domain::MicsTickets);

    let batch = session.upload(&file).expect("upload");
    assert_eq!(batch.row_count, 3);
    assert_eq!(batch.filename, "tickets.csv");

    let rows = session.list(Some(batch.upload_id), &[]).expect("list");
    assert_eq!(rows.row_count(), 3);

    // Switching stores must not surface the tickets anywhere else.
    session.select(Domain::ControlStatus);
    assert!(session.list(None, &[]).expect("list other store").is_empty());

    session.select(Domain::MicsTickets);
    assert_eq!(session.delete(batch.upload_id).expect("delete"), 3);
    assert!(session
        .list(Some(batch.upload_id), &[])
        .expect("list after delete")
        .is_empty());
}

#[test]
fn filters_narrow_listings_and_exports() {
    let dir = TempDir::new().expect("tempdir");
    let file = write_csv(&dir, "tickets.csv", TICKETS_CSV);

    let mut session = session();
    session.select(Domain::MicsTickets);
    session.upload(&file).expect("upload");

    let filters = vec![("Status".to_string(), "Open".to_string())];
    let open = session.list(None, &filters).expect("filtered list");
    assert_eq!(open.row_count(), 2);

    let csv = session.export_csv(None, &filters).expect("export");
    let text = String::from_utf8(csv).expect("utf8");
    assert_eq!(text.lines().count(), 3); // header + two open tickets
    assert!(text.lines().all(|l| !l.contains("T-3")));
}

#[test]
fn empty_uploads_are_warnings_and_persist_nothing() {
    let dir = TempDir::new().expect("tempdir");
    let file = write_csv(
        &dir,
        "empty.csv",
        "Ticket ID,IT Solution,MICS ID,Priority,Status,Assignee,Opened,Closed\n",
    );

    let mut session = session();
    session.select(Domain::MicsTickets);

    let err = session.upload(&file).expect_err("upload must fail");
    assert_eq!(err.severity(), Severity::Warning);
    assert!(err.user_message().contains("no data rows"));
    assert!(session.list(None, &[]).expect("list").is_empty());
}

#[test]
fn uploads_over_the_row_ceiling_are_warnings_and_persist_nothing() {
    let dir = TempDir::new().expect("tempdir");
    let file = write_csv(&dir, "tickets.csv", TICKETS_CSV);

    let mut session = Session::new(StoreSet::open_in_memory().expect("open stores"), 2);
    session.select(Domain::MicsTickets);

    let err = session.upload(&file).expect_err("upload must fail");
    assert_eq!(err.severity(), Severity::Warning);
    assert!(err.user_message().contains("limit is 2"));
    assert!(session.list(None, &[]).expect("list").is_empty());
}

#[test]
fn uploads_missing_required_columns_are_warnings() {
    let dir = TempDir::new().expect("tempdir");
    let file = write_csv(&dir, "partial.csv", "Ticket ID\nT-1\n");

    let mut session = session();
    session.select(Domain::MicsTickets);

    let err = session.upload(&file).expect_err("upload must fail");
    assert_eq!(err.severity(), Severity::Warning);
    assert!(err.user_message().contains("IT Solution"));
    assert!(session.summary().expect("summary").is_empty());
}
