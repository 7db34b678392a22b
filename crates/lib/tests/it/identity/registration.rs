//! Registration: validation, uniqueness, and what gets persisted

use std::sync::Arc;

use identd::{
    ErrorKind,
    backend::{KvStore, database::InMemory},
    identity::{IdentityError, IdentityService},
};

use crate::helpers::*;

#[tokio::test]
async fn test_register_returns_public_user() {
    let service = setup_service().await;
    let user = register(&service, "eric", "Shhh").await;
    assert_eq!(user.username, "eric");
}

#[tokio::test]
async fn test_register_empty_username() {
    let backend = Arc::new(InMemory::new());
    let service = IdentityService::new(backend.clone());

    let err = assert_kind(service.register("", "Shhh").await, ErrorKind::InvalidArgument);
    assert_eq!(err.argument(), Some("username"));
    assert!(backend.is_empty().await, "nothing may be stored");
}

#[tokio::test]
async fn test_register_empty_password() {
    let backend = Arc::new(InMemory::new());
    let service = IdentityService::new(backend.clone());

    let err = assert_kind(service.register("eric", "").await, ErrorKind::InvalidArgument);
    assert_eq!(err.argument(), Some("password"));
    assert!(backend.is_empty().await, "nothing may be stored");
    assert!(!backend.exists("users/eric").await.unwrap());
}

#[tokio::test]
async fn test_register_duplicate_keeps_original() {
    let service = setup_service_with_user("eric", "Shhh").await;

    let err = assert_kind(
        service.register("eric", "other").await,
        ErrorKind::AlreadyExists,
    );
    assert!(matches!(
        err,
        identd::Error::Identity(IdentityError::UsernameAlreadyExists { ref username }) if username == "eric"
    ));

    // The original password still authenticates, the new one does not
    login(&service, "eric", "Shhh").await;
    assert_kind(service.login("eric", "other").await, ErrorKind::PermissionDenied);
}

#[tokio::test]
async fn test_register_stores_exactly_one_record() {
    let backend = Arc::new(InMemory::new());
    let service = IdentityService::new(backend.clone());

    register(&service, "eric", "Shhh").await;
    assert_eq!(backend.all_keys().await, vec!["users/eric".to_string()]);

    let _ = service.register("eric", "again").await;
    assert_eq!(backend.len().await, 1);
}

#[tokio::test]
async fn test_usernames_are_case_sensitive() {
    let service = setup_service_with_user("eric", "Shhh").await;
    let user = register(&service, "Eric", "Shhh").await;
    assert_eq!(user.username, "Eric");
}

#[tokio::test]
async fn test_unicode_and_long_credentials() {
    let service = setup_service().await;
    let password = "密码🔒パスワード".repeat(100);
    register(&service, "ユーザー", &password).await;

    let session = login(&service, "ユーザー", &password).await;
    assert_eq!(session.username, "ユーザー");
}
