//! Query-level tests for activation codes

#[path = "../common/mod.rs"]
mod common;

use common::*;

#[test]
fn test_create_record_normalizes_code() {
    let pool = setup_test_pool();
    let conn = pool.get().unwrap();

    let record = create_test_record(&conn, "ab-cd-12", days_from_now(10));

    assert_eq!(record.code, "ABCD12", "code should be stored normalized");
    assert!(record.is_active, "new codes start active");
    assert_eq!(record.device_id, None, "new codes start unbound");

    let fetched = queries::get_record_by_code(&conn, "ABCD12")
        .expect("Query failed")
        .expect("Record not found");
    assert_eq!(fetched, record);
}

#[test]
fn test_duplicate_code_is_rejected() {
    let pool = setup_test_pool();
    let conn = pool.get().unwrap();

    create_test_record(&conn, "ABCD12", days_from_now(10));
    let dup = queries::create_record(
        &conn,
        &CreateActivationRecord {
            code: "ab-cd12".into(),
            email: None,
            name: None,
            active_till: days_from_now(10),
        },
    );
    assert!(dup.is_err(), "normalized duplicate should violate the primary key");
}

#[test]
fn test_active_lookup_hides_inactive_codes() {
    let pool = setup_test_pool();
    let conn = pool.get().unwrap();
    create_test_record(&conn, "ABCD12", days_from_now(10));

    assert!(queries::get_active_record_by_code(&conn, "ABCD12").unwrap().is_some());

    assert_eq!(queries::mark_inactive(&conn, "ABCD12").unwrap(), 1);

    assert!(
        queries::get_active_record_by_code(&conn, "ABCD12").unwrap().is_none(),
        "inactive codes are invisible to activation"
    );
    let status = queries::get_status_by_code(&conn, "ABCD12")
        .unwrap()
        .expect("status lookup sees inactive codes");
    assert!(!status.is_active);
}

#[test]
fn test_bind_device_first_writer_wins() {
    let pool = setup_test_pool();
    let conn = pool.get().unwrap();
    create_test_record(&conn, "ABCD12", days_from_now(10));

    assert!(queries::bind_device(&conn, "ABCD12", "dev-1").unwrap());
    assert!(
        queries::bind_device(&conn, "ABCD12", "dev-1").unwrap(),
        "rebinding the same device is allowed"
    );
    assert!(
        !queries::bind_device(&conn, "ABCD12", "dev-2").unwrap(),
        "a second device must not take over"
    );

    let record = queries::get_record_by_code(&conn, "ABCD12").unwrap().unwrap();
    assert_eq!(record.device_id.as_deref(), Some("dev-1"));
}

#[test]
fn test_bind_device_refuses_inactive_code() {
    let pool = setup_test_pool();
    let conn = pool.get().unwrap();
    create_test_record(&conn, "ABCD12", days_from_now(10));
    queries::mark_inactive(&conn, "ABCD12").unwrap();

    assert!(!queries::bind_device(&conn, "ABCD12", "dev-1").unwrap());
}

#[test]
fn test_deactivate_clears_device() {
    let pool = setup_test_pool();
    let conn = pool.get().unwrap();
    create_bound_record(&conn, "ABCD12", days_from_now(10), "dev-1");

    assert_eq!(queries::deactivate_record(&conn, "ABCD12").unwrap(), 1);
    assert_eq!(queries::deactivate_record(&conn, "NOPE").unwrap(), 0);

    let record = queries::get_record_by_code(&conn, "ABCD12").unwrap().unwrap();
    assert!(!record.is_active);
    assert_eq!(record.device_id, None);
}

#[test]
fn test_update_active_till_keeps_flag() {
    let pool = setup_test_pool();
    let conn = pool.get().unwrap();
    create_test_record(&conn, "ABCD12", days_ago(2));
    queries::mark_inactive(&conn, "ABCD12").unwrap();

    let new_date = days_from_now(90);
    assert_eq!(queries::update_active_till(&conn, "ABCD12", new_date).unwrap(), 1);

    let record = queries::get_record_by_code(&conn, "ABCD12").unwrap().unwrap();
    assert_eq!(record.active_till, new_date);
    assert!(!record.is_active, "extending expiry never reactivates");
}

#[test]
fn test_count_records() {
    let pool = setup_test_pool();
    let conn = pool.get().unwrap();
    assert_eq!(queries::count_records(&conn).unwrap(), 0);

    create_test_record(&conn, "A1", days_from_now(1));
    create_test_record(&conn, "B2", days_from_now(1));
    assert_eq!(queries::count_records(&conn).unwrap(), 2);
}
