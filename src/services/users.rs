use crate::collaborators::{ObjectStorage, PasswordHasher};
use crate::errors::ServiceError;
use crate::identity::Requester;
use crate::responses::{Page, RegisterRequest, UpdateUserRequest, UserResponse};
use crate::services::required_text;
use query_engine::FilterCompiler;
use std::sync::Arc;
use store_object::{NewUser, UserPatch, UserRepository};

const MIN_PASSWORD_LEN: usize = 8;

/// Accounts: registration, profile edits, avatars and soft deletion
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    storage: Arc<dyn ObjectStorage>,
    compiler: FilterCompiler,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        storage: Arc<dyn ObjectStorage>,
        compiler: FilterCompiler,
    ) -> Self {
        Self {
            users,
            hasher,
            storage,
            compiler,
        }
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<UserResponse, ServiceError> {
        let password_hash = self.hash_password(&request.password)?;
        let user = NewUser {
            email: required_text("email", &request.email)?,
            username: required_text("username", &request.username)?,
            password_hash,
        };

        let id = self.users.create(&user).await?;
        tracing::info!(user_id = id, "user registered");
        Ok(self.users.find_by_id(id).await?.into())
    }

    pub async fn list<K, V>(&self, query: &[(K, V)]) -> Result<Page<UserResponse>, ServiceError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let params = self
            .compiler
            .compile(query.iter().map(|(k, v)| (k, v)))?;
        let listing = self.users.list_filtered(&params).await?;

        Ok(Page {
            items: listing.rows.into_iter().map(UserResponse::from).collect(),
            total: listing.total,
            page: params.pagination.page,
            limit: params.pagination.limit,
        })
    }

    pub async fn get(&self, id: i64) -> Result<UserResponse, ServiceError> {
        Ok(self.users.find_by_id(id).await?.into())
    }

    /// Edit a profile. A new password is hashed before it is stored.
    pub async fn update(
        &self,
        requester: &Requester,
        id: i64,
        request: UpdateUserRequest,
    ) -> Result<UserResponse, ServiceError> {
        self.ensure_self_or_admin(requester, id)?;

        let password_hash = match request.password.as_deref() {
            Some(plain) => Some(self.hash_password(plain)?),
            None => None,
        };
        let patch = request.into_patch(password_hash);
        if let Some(email) = patch.email.as_option() {
            required_text("email", email)?;
        }

        self.users.update(id, &patch).await?;
        self.get(id).await
    }

    /// Soft delete; the row stays but disappears from every read
    pub async fn delete(&self, requester: &Requester, id: i64) -> Result<(), ServiceError> {
        self.ensure_self_or_admin(requester, id)?;
        self.users.soft_delete(id).await?;
        tracing::info!(user_id = id, requester = requester.id, "user deleted");
        Ok(())
    }

    /// Upload a new avatar and point the profile at it
    pub async fn change_avatar(
        &self,
        requester: &Requester,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<UserResponse, ServiceError> {
        if bytes.is_empty() {
            return Err(ServiceError::bad_request("avatar file is empty"));
        }
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_else(|| "bin".to_string());
        let key = format!("avatars/{}-{}.{}", requester.id, uuid::Uuid::new_v4(), extension);

        let url = self.storage.upload(&key, bytes).await?;
        let patch = UserPatch {
            avatar: Some(url).into(),
            ..UserPatch::default()
        };
        self.users.update(requester.id, &patch).await?;
        self.get(requester.id).await
    }

    fn hash_password(&self, plain: &str) -> Result<String, ServiceError> {
        if plain.chars().count() < MIN_PASSWORD_LEN {
            return Err(ServiceError::bad_request(format!(
                "password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        Ok(self.hasher.hash(plain)?)
    }

    fn ensure_self_or_admin(&self, requester: &Requester, id: i64) -> Result<(), ServiceError> {
        if requester.may_manage(id) {
            Ok(())
        } else {
            Err(ServiceError::forbidden("you may only change your own account"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::CollaboratorError;
    use crate::errors::StatusClass;
    use crate::test_support::{user, MemoryStore};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct ReverseHasher;

    impl PasswordHasher for ReverseHasher {
        fn hash(&self, plain: &str) -> Result<String, CollaboratorError> {
            Ok(format!("hashed:{}", plain.chars().rev().collect::<String>()))
        }
    }

    #[derive(Default)]
    struct RecordingStorage {
        keys: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ObjectStorage for RecordingStorage {
        async fn upload(&self, key: &str, _bytes: Vec<u8>) -> Result<String, CollaboratorError> {
            self.keys.lock().unwrap().push(key.to_string());
            Ok(format!("https://cdn.test/{}", key))
        }
    }

    fn service(store: &Arc<MemoryStore>, storage: Arc<RecordingStorage>) -> UserService {
        UserService::new(
            store.clone(),
            Arc::new(ReverseHasher),
            storage,
            FilterCompiler::default(),
        )
    }

    #[tokio::test]
    async fn test_register_hashes_password() {
        let store = MemoryStore::new();
        let created = service(&store, Arc::default())
            .register(RegisterRequest {
                email: "ann@example.com".to_string(),
                username: "ann".to_string(),
                password: "correct horse".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(store.user(created.id).password_hash, "hashed:esroh tcerroc");
    }

    #[tokio::test]
    async fn test_register_duplicate_email_conflicts() {
        let store = MemoryStore::new();
        store.insert_user(user(1));
        let err = service(&store, Arc::default())
            .register(RegisterRequest {
                email: "user1@example.com".to_string(),
                username: "again".to_string(),
                password: "long enough".to_string(),
            })
            .await
            .unwrap_err();

        assert_eq!(err.status(), StatusClass::Conflict);
    }

    #[tokio::test]
    async fn test_short_password_rejected() {
        let store = MemoryStore::new();
        store.insert_user(user(1));
        let err = service(&store, Arc::default())
            .update(
                &Requester::user(1),
                1,
                UpdateUserRequest {
                    password: Some("short".to_string()),
                    ..UpdateUserRequest::default()
                },
            )
            .await
            .unwrap_err();

        assert_eq!(err.status(), StatusClass::BadRequest);
        assert_eq!(store.user(1).password_hash, "hashed");
    }

    #[tokio::test]
    async fn test_update_other_user_forbidden_unless_admin() {
        let store = MemoryStore::new();
        store.insert_user(user(1));
        let svc = service(&store, Arc::default());
        let request = UpdateUserRequest {
            bio: Some("climber".to_string()),
            ..UpdateUserRequest::default()
        };

        let err = svc
            .update(&Requester::user(2), 1, request.clone())
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusClass::Forbidden);

        let updated = svc.update(&Requester::admin(9), 1, request).await.unwrap();
        assert_eq!(updated.bio, "climber");
    }

    #[tokio::test]
    async fn test_update_of_deleted_user_is_not_found() {
        let store = MemoryStore::new();
        store.insert_user(user(1));
        let before = store.user(1).username;
        let svc = service(&store, Arc::default());
        svc.delete(&Requester::user(1), 1).await.unwrap();

        let err = svc
            .update(
                &Requester::admin(9),
                1,
                UpdateUserRequest {
                    username: Some("ghost".to_string()),
                    ..UpdateUserRequest::default()
                },
            )
            .await
            .unwrap_err();

        assert_eq!(err.status(), StatusClass::NotFound);
        assert_eq!(store.user(1).username, before);
    }

    #[tokio::test]
    async fn test_deleted_user_disappears() {
        let store = MemoryStore::new();
        store.insert_user(user(1));
        store.insert_user(user(2));
        let svc = service(&store, Arc::default());

        svc.delete(&Requester::user(1), 1).await.unwrap();

        assert!(store.is_user_deleted(1));
        let err = svc.get(1).await.unwrap_err();
        assert_eq!(err.status(), StatusClass::NotFound);
        let page = svc.list(&[("limit", "10")]).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].id, 2);
    }

    #[tokio::test]
    async fn test_change_avatar_uploads_then_updates() {
        let store = MemoryStore::new();
        store.insert_user(user(5));
        let storage = Arc::new(RecordingStorage::default());

        let updated = service(&store, storage.clone())
            .change_avatar(&Requester::user(5), "me.PNG", vec![1, 2, 3])
            .await
            .unwrap();

        let keys = storage.keys.lock().unwrap().clone();
        assert_eq!(keys.len(), 1);
        assert!(keys[0].starts_with("avatars/5-"));
        assert!(keys[0].ends_with(".png"));
        assert_eq!(updated.avatar, format!("https://cdn.test/{}", keys[0]));
    }
}
