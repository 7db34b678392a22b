//! Concurrent use of one service from many tasks

use identd::{ErrorKind, identity::IdentityService};

use crate::helpers::*;

/// Race `tasks` registrations of one username and check exactly one wins.
async fn assert_single_register_winner(service: &IdentityService, tasks: usize) {
    let handles: Vec<_> = (0..tasks)
        .map(|i| {
            let service = service.clone();
            tokio::spawn(async move { service.register("eric", &format!("password{i}")).await })
        })
        .collect();

    let mut winner = None;
    let mut losers = 0;
    for (i, handle) in handles.into_iter().enumerate() {
        match handle.await.unwrap() {
            Ok(user) => {
                assert!(winner.is_none(), "more than one registration succeeded");
                assert_eq!(user.username, "eric");
                winner = Some(i);
            }
            Err(err) => {
                assert_eq!(err.kind(), ErrorKind::AlreadyExists, "unexpected error: {err}");
                losers += 1;
            }
        }
    }

    let winner = winner.expect("one registration must succeed");
    assert_eq!(losers, tasks - 1);

    // The stored record belongs to the winning call
    login(service, "eric", &format!("password{winner}")).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_register_single_winner() {
    let service = setup_service().await;
    assert_single_register_winner(&service, 32).await;
}

/// A file database uses a multi-connection WAL pool, so the insert race is
/// decided by SQLite across connections rather than by a single connection.
#[cfg(feature = "sqlite")]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_register_single_winner_sqlite_file() {
    use std::sync::Arc;

    use identd::backend::database::Sqlite;

    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(Sqlite::open(dir.path().join("identd.db")).await.unwrap());
    let service = IdentityService::new(store.clone());

    assert_single_register_winner(&service, 32).await;
    store.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_logins() {
    let service = setup_service_with_user("eric", "Shhh").await;

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let service = service.clone();
            tokio::spawn(async move { service.login("eric", "Shhh").await })
        })
        .collect();

    let mut tokens = Vec::new();
    for handle in handles {
        tokens.push(handle.await.unwrap().unwrap().token);
    }
    tokens.sort();
    tokens.dedup();
    assert_eq!(tokens.len(), 16);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_distinct_registrations() {
    let service = setup_service().await;

    let handles: Vec<_> = (0..20)
        .map(|i| {
            let service = service.clone();
            tokio::spawn(async move { service.register(&format!("user{i}"), "pw").await })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }
    for i in 0..20 {
        service.lookup_user(&format!("user{i}")).await.unwrap();
    }
}
