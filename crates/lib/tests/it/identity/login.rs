//! Login: authentication failures and session issuance

use std::collections::HashSet;

use identd::{ErrorKind, identity::IdentityError};

use crate::helpers::*;

#[tokio::test]
async fn test_login_returns_session_for_user() {
    let service = setup_service_with_user("eric", "Shhh").await;
    let session = login(&service, "eric", "Shhh").await;

    assert_eq!(session.username, "eric");
    assert_eq!(session.token.len(), 32, "128-bit token, hex encoded");
}

#[tokio::test]
async fn test_login_wrong_password() {
    let service = setup_service_with_user("eric", "Shhh").await;
    let err = assert_kind(
        service.login("eric", "shhh").await,
        ErrorKind::PermissionDenied,
    );
    assert!(matches!(
        err,
        identd::Error::Identity(IdentityError::BadPassword)
    ));
    assert_eq!(err.to_string(), "bad password");
}

#[tokio::test]
async fn test_login_unknown_user_is_permission_denied() {
    let service = setup_service().await;
    let err = assert_kind(
        service.login("nobody", "Shhh").await,
        ErrorKind::PermissionDenied,
    );
    assert!(!err.is_not_found());
    assert_eq!(err.to_string(), "bad username");
}

#[tokio::test]
async fn test_login_empty_password_is_rejected() {
    let service = setup_service_with_user("eric", "Shhh").await;
    assert_kind(service.login("eric", "").await, ErrorKind::PermissionDenied);
}

#[tokio::test]
async fn test_each_login_issues_new_session() {
    let service = setup_service_with_user("eric", "Shhh").await;

    let tokens: HashSet<String> = {
        let mut tokens = HashSet::new();
        for _ in 0..10 {
            tokens.insert(login(&service, "eric", "Shhh").await.token);
        }
        tokens
    };
    assert_eq!(tokens.len(), 10);

    // Earlier sessions remain valid
    for token in tokens {
        let user = service
            .lookup_by_session(&identd::identity::Session::from_token(token))
            .await
            .unwrap();
        assert_eq!(user.username, "eric");
    }
}

#[tokio::test]
async fn test_failed_login_creates_no_session() {
    let backend = std::sync::Arc::new(identd::backend::database::InMemory::new());
    let service = identd::identity::IdentityService::new(backend.clone());
    register(&service, "eric", "Shhh").await;

    let _ = service.login("eric", "wrong").await;
    let _ = service.login("nobody", "Shhh").await;

    assert_eq!(backend.len().await, 1);
}
