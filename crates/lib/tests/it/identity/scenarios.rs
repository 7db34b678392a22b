//! End-to-end scenarios

use identd::{ErrorKind, identity::Session};

use crate::helpers::*;

#[tokio::test]
async fn test_register_login_lookup() {
    let service = setup_service().await;

    let registered = service.register("eric", "Shhh").await.unwrap();
    assert_eq!(registered.username, "eric");

    let session = service.login("eric", "Shhh").await.unwrap();
    assert_eq!(session.username, "eric");

    let user = service.lookup_user("eric").await.unwrap();
    assert_eq!(user.username, "eric");

    let current = service
        .lookup_by_session(&Session::from_token(session.token.clone()))
        .await
        .unwrap();
    assert_eq!(current.username, "eric");
}

#[tokio::test]
async fn test_duplicate_register_then_login() {
    let service = setup_service().await;

    service.register("eric", "Shhh").await.unwrap();
    assert_kind(
        service.register("eric", "other").await,
        ErrorKind::AlreadyExists,
    );

    let session = service.login("eric", "Shhh").await.unwrap();
    assert_eq!(session.username, "eric");
}

#[tokio::test]
async fn test_many_users_round_trip() {
    let service = setup_service().await;
    let users = [
        ("alice", "p@ssw0rd!#$%^&*()"),
        ("bob", "MyPassword"),
        ("carol", " leading and trailing "),
    ];

    for (username, password) in users {
        register(&service, username, password).await;
    }
    for (username, password) in users {
        let session = login(&service, username, password).await;
        let current = service.lookup_by_session(&session).await.unwrap();
        assert_eq!(current.username, username);
    }
}
