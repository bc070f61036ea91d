//! Concurrent activations of one code against a file-backed database

use std::sync::Arc;

#[path = "../common/mod.rs"]
mod common;

use common::*;

use activation_server::activation::ActivateOutcome;
use activation_server::db::create_pool;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_activations_bind_exactly_one_device() {
    let path = std::env::temp_dir().join(format!(
        "activation-race-{}-{}.db",
        std::process::id(),
        chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
    ));
    let path_str = path.to_str().unwrap().to_string();

    let pool = create_pool(&path_str).unwrap();
    {
        let conn = pool.get().unwrap();
        init_db(&conn).unwrap();
        create_test_record(&conn, "RACE01", days_from_now(30));
    }

    let service = ActivationService::new(Arc::new(SqliteStore::new(pool.clone())));

    let mut handles = Vec::new();
    for i in 0..8 {
        let service = service.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            service.activate("RACE01", &format!("dev-{}", i), chrono::Utc::now())
        }));
    }

    let mut winners = Vec::new();
    let mut errors = Vec::new();
    for handle in handles {
        match handle.await.unwrap() {
            Ok(ActivateOutcome::Activated(activation)) => winners.push(activation.device_id),
            Ok(ActivateOutcome::DeviceConflict) => {}
            // Busy database under contention surfaces as a store error
            Err(e) => errors.push(e.to_string()),
            Ok(other) => panic!("unexpected outcome: {:?}", other),
        }
    }

    assert_eq!(
        winners.len(),
        1,
        "exactly one device should win the binding ({} store errors: {:?})",
        errors.len(),
        errors
    );
    assert_eq!(
        stored_record(&pool, "RACE01").device_id,
        Some(winners[0].clone()),
        "the stored binding should be the winner's"
    );

    drop(pool);
    let _ = std::fs::remove_file(&path);
    let _ = std::fs::remove_file(format!("{}-wal", path_str));
    let _ = std::fs::remove_file(format!("{}-shm", path_str));
}
