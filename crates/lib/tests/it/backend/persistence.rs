//! Durability tests: acknowledged writes must survive reopening the store.

use std::sync::Arc;

use identd::{
    backend::{KvStore, database::InMemory},
    identity::{IdentityService, Session},
};

#[tokio::test]
async fn test_in_memory_open_writes_through() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("identd.json");

    let store = InMemory::open(&path).await.unwrap();
    assert_eq!(store.path(), Some(path.as_path()));
    store.put("users/eric", b"record".to_vec()).await.unwrap();
    assert!(store.put_if_absent("users/ann", b"a".to_vec()).await.unwrap());

    // No explicit save: the file must already hold both writes
    let reopened = InMemory::open(&path).await.unwrap();
    assert_eq!(reopened.get("users/eric").await.unwrap(), b"record");
    assert_eq!(reopened.get("users/ann").await.unwrap(), b"a");
}

#[tokio::test]
async fn test_in_memory_refused_insert_is_not_written() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("identd.json");

    let store = InMemory::open(&path).await.unwrap();
    store.put("k", b"first".to_vec()).await.unwrap();
    assert!(!store.put_if_absent("k", b"second".to_vec()).await.unwrap());

    let reopened = InMemory::open(&path).await.unwrap();
    assert_eq!(reopened.get("k").await.unwrap(), b"first");
}

#[tokio::test]
async fn test_identity_survives_restart_in_memory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("identd.json");

    let token = {
        let service = IdentityService::new(Arc::new(InMemory::open(&path).await.unwrap()));
        service.register("eric", "Shhh").await.unwrap();
        service.login("eric", "Shhh").await.unwrap().token
    };

    let service = IdentityService::new(Arc::new(InMemory::open(&path).await.unwrap()));
    let user = service
        .lookup_by_session(&Session::from_token(token))
        .await
        .unwrap();
    assert_eq!(user.username, "eric");
    assert!(service.login("eric", "Shhh").await.is_ok());
}

#[cfg(feature = "sqlite")]
#[tokio::test]
async fn test_identity_survives_restart_sqlite() {
    use identd::backend::database::Sqlite;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("identd.db");

    let token = {
        let store = Arc::new(Sqlite::open(&path).await.unwrap());
        let service = IdentityService::new(store.clone());
        service.register("eric", "Shhh").await.unwrap();
        let token = service.login("eric", "Shhh").await.unwrap().token;
        store.close().await;
        token
    };

    let service = IdentityService::new(Arc::new(Sqlite::open(&path).await.unwrap()));
    let user = service
        .lookup_by_session(&Session::from_token(token))
        .await
        .unwrap();
    assert_eq!(user.username, "eric");

    let err = service.register("eric", "other").await.unwrap_err();
    assert!(err.is_conflict());
}
