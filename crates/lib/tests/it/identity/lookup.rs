//! User and session lookups

use std::sync::Arc;

use identd::{
    ErrorKind,
    backend::database::InMemory,
    identity::{IdentityService, Session},
};

use crate::helpers::*;

#[tokio::test]
async fn test_lookup_user() {
    let service = setup_service_with_user("eric", "Shhh").await;
    let user = service.lookup_user("eric").await.unwrap();
    assert_eq!(user.username, "eric");
}

#[tokio::test]
async fn test_lookup_unknown_user() {
    let service = setup_service().await;
    let err = assert_kind(service.lookup_user("nobody").await, ErrorKind::NotFound);
    assert_eq!(err.to_string(), "nobody not found");
}

#[tokio::test]
async fn test_lookup_by_unknown_token() {
    let service = setup_service_with_user("eric", "Shhh").await;
    let err = assert_kind(
        service
            .lookup_by_session(&Session::from_token("never-issued"))
            .await,
        ErrorKind::PermissionDenied,
    );
    assert_eq!(err.to_string(), "invalid session token");

    assert_kind(
        service.lookup_by_session(&Session::from_token("")).await,
        ErrorKind::PermissionDenied,
    );
}

#[tokio::test]
async fn test_lookup_by_session_returns_login_user() {
    let service = setup_service().await;
    register(&service, "eric", "Shhh").await;
    register(&service, "ann", "pw").await;

    let eric = login(&service, "eric", "Shhh").await;
    let ann = login(&service, "ann", "pw").await;

    assert_eq!(
        service.lookup_by_session(&eric).await.unwrap().username,
        "eric"
    );
    assert_eq!(
        service.lookup_by_session(&ann).await.unwrap().username,
        "ann"
    );
}

#[tokio::test]
async fn test_forged_username_is_ignored() {
    let service = setup_service().await;
    register(&service, "eric", "Shhh").await;
    register(&service, "admin", "root").await;

    let session = login(&service, "eric", "Shhh").await;
    let forged = Session {
        token: session.token,
        username: "admin".to_string(),
    };
    assert_eq!(
        service.lookup_by_session(&forged).await.unwrap().username,
        "eric"
    );
}

#[tokio::test]
async fn test_lookups_are_idempotent_and_read_only() {
    let backend = Arc::new(InMemory::new());
    let service = IdentityService::new(backend.clone());
    register(&service, "eric", "Shhh").await;
    let session = login(&service, "eric", "Shhh").await;

    let mut keys_before = backend.all_keys().await;
    keys_before.sort();

    let first_user = service.lookup_user("eric").await.unwrap();
    let first_current = service.lookup_by_session(&session).await.unwrap();
    for _ in 0..5 {
        assert_eq!(service.lookup_user("eric").await.unwrap(), first_user);
        assert_eq!(
            service.lookup_by_session(&session).await.unwrap(),
            first_current
        );
    }

    let mut keys_after = backend.all_keys().await;
    keys_after.sort();
    assert_eq!(keys_before, keys_after);
}
