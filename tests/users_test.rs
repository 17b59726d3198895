//! Integration tests for user accounts on PostgreSQL

mod common;

use common::{marker, setup, setup_with, test_config};
use fithaus::prelude::*;
use std::sync::Arc;

struct PlainHasher;

impl PasswordHasher for PlainHasher {
    fn hash(&self, plain: &str) -> Result<String, CollaboratorError> {
        Ok(format!("plain${}", plain))
    }
}

struct NullStorage;

#[async_trait::async_trait]
impl ObjectStorage for NullStorage {
    async fn upload(&self, key: &str, _bytes: Vec<u8>) -> Result<String, CollaboratorError> {
        Ok(format!("memory://{}", key))
    }
}

fn register(token: &str) -> RegisterRequest {
    RegisterRequest {
        email: format!("{}@example.test", token),
        username: token.to_string(),
        password: "long enough secret".to_string(),
    }
}

#[tokio::test]
async fn test_soft_deleted_user_disappears_from_reads() {
    let Some(fithaus) = setup().await else { return };
    let users = fithaus.users(Arc::new(PlainHasher), Arc::new(NullStorage));
    let token = marker();

    let user = users.register(register(&token)).await.unwrap();
    let listed = users.list(&[("like_username", token.as_str())]).await.unwrap();
    assert_eq!(listed.total, 1);

    users.delete(&Requester::user(user.id), user.id).await.unwrap();

    let listed = users.list(&[("like_username", token.as_str())]).await.unwrap();
    assert_eq!(listed.total, 0);
    assert!(listed.items.is_empty());
    let err = users.get(user.id).await.unwrap_err();
    assert_eq!(err.status(), StatusClass::NotFound);
}

#[tokio::test]
async fn test_duplicate_email_is_conflict() {
    let Some(fithaus) = setup().await else { return };
    let users = fithaus.users(Arc::new(PlainHasher), Arc::new(NullStorage));
    let token = marker();

    users.register(register(&token)).await.unwrap();
    let err = users.register(register(&token)).await.unwrap_err();

    assert_eq!(err.status(), StatusClass::Conflict);
    assert_eq!(err.client_message(), "resource already exists");
}

#[tokio::test]
async fn test_password_change_is_hashed() {
    let Some(fithaus) = setup().await else { return };
    let users = fithaus.users(Arc::new(PlainHasher), Arc::new(NullStorage));
    let user = users.register(register(&marker())).await.unwrap();

    users
        .update(
            &Requester::user(user.id),
            user.id,
            UpdateUserRequest {
                password: Some("another long secret".to_string()),
                ..UpdateUserRequest::default()
            },
        )
        .await
        .unwrap();

    let stored: String = sqlx::query_scalar("SELECT password_hash FROM users WHERE id = $1")
        .bind(user.id)
        .fetch_one(fithaus.pool())
        .await
        .unwrap();
    assert_eq!(stored, "plain$another long secret");
}

#[tokio::test]
async fn test_password_hash_is_not_filterable() {
    let Some(fithaus) = setup().await else { return };
    let users = fithaus.users(Arc::new(PlainHasher), Arc::new(NullStorage));

    let err = users.list(&[("password_hash", "plain$x")]).await.unwrap_err();
    assert_eq!(err.status(), StatusClass::BadRequest);
}

#[tokio::test]
async fn test_update_of_deleted_user_writes_nothing() {
    let Some(fithaus) = setup().await else { return };
    let users = fithaus.users(Arc::new(PlainHasher), Arc::new(NullStorage));
    let token = marker();
    let user = users.register(register(&token)).await.unwrap();
    users.delete(&Requester::user(user.id), user.id).await.unwrap();

    let err = users
        .update(
            &Requester::admin(1),
            user.id,
            UpdateUserRequest {
                username: Some("ghost".to_string()),
                ..UpdateUserRequest::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusClass::NotFound);

    let stored: String = sqlx::query_scalar("SELECT username FROM users WHERE id = $1")
        .bind(user.id)
        .fetch_one(fithaus.pool())
        .await
        .unwrap();
    assert_eq!(stored, token);
}

#[tokio::test]
async fn test_pass_through_keys_reach_the_database_unchecked() {
    let mut config = test_config();
    config.query.unknown_keys = UnknownKeyPolicy::PassThrough;
    let Some(fithaus) = setup_with(config).await else { return };
    let users = fithaus.users(Arc::new(PlainHasher), Arc::new(NullStorage));
    let token = marker();
    let user = users.register(register(&token)).await.unwrap();

    // avatar is a text column outside the allow-list
    let listed = users
        .list(&[("username", token.as_str()), ("avatar", "")])
        .await
        .unwrap();
    assert_eq!(listed.total, 1);
    assert_eq!(listed.items[0].id, user.id);

    let err = users.list(&[("no_such_column", "1")]).await.unwrap_err();
    assert_eq!(err.status(), StatusClass::Internal);
    assert_eq!(err.client_message(), "internal server error");

    let err = users.list(&[("updated_at", "yesterday")]).await.unwrap_err();
    assert_eq!(err.status(), StatusClass::Internal);

    let err = users.list(&[("bad-key", "1")]).await.unwrap_err();
    assert_eq!(err.status(), StatusClass::BadRequest);
}
