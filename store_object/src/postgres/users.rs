use super::{fetch_listing, StoreContext};
use crate::binding::bind_values;
use crate::deadline::with_deadline;
use crate::errors::StoreError;
use crate::patch::UserPatch;
use crate::records::{Listing, NewUser, UserRecord};
use crate::tables::USERS;
use crate::traits::UserRepository;
use async_trait::async_trait;
use query_engine::{ListOrder, ListQuery, QueryFilter, QueryParams, SelectField};

const USER_COLUMNS: [&str; 9] = [
    "users.id",
    "users.email",
    "users.username",
    "users.password_hash",
    "users.bio",
    "users.avatar",
    "users.card_pan",
    "users.created_at",
    "users.updated_at",
];

#[derive(Debug, Clone)]
pub struct PgUserStore {
    ctx: StoreContext,
}

impl PgUserStore {
    pub fn new(ctx: StoreContext) -> Self {
        Self { ctx }
    }

    fn active_users(&self) -> ListQuery<'static> {
        ListQuery::new(&USERS)
            .select(USER_COLUMNS.iter().map(|c| SelectField::field(*c)).collect())
            .require(QueryFilter::is_null("users.deleted_at"))
            .order(ListOrder::Identity)
            .unknown_keys(self.ctx.unknown_keys())
    }
}

#[async_trait]
impl UserRepository for PgUserStore {
    async fn list_filtered(&self, params: &QueryParams) -> Result<Listing<UserRecord>, StoreError> {
        let pair = self.active_users().build(params)?;
        with_deadline(
            self.ctx.deadline(),
            "users.list",
            fetch_listing(self.ctx.pool(), USERS.name, &pair),
        )
        .await
    }

    async fn find_by_id(&self, id: i64) -> Result<UserRecord, StoreError> {
        let sql = format!(
            "SELECT {} FROM users WHERE users.id = $1 AND users.deleted_at IS NULL",
            USER_COLUMNS.join(", ")
        );
        with_deadline(self.ctx.deadline(), "users.find_by_id", async {
            sqlx::query_as::<_, UserRecord>(&sql)
                .bind(id)
                .fetch_optional(self.ctx.pool())
                .await
                .map_err(|e| StoreError::database_operation(USERS.name, "find_by_id", e))?
                .ok_or(StoreError::not_found("user"))
        })
        .await
    }

    async fn create(&self, user: &NewUser) -> Result<i64, StoreError> {
        with_deadline(self.ctx.deadline(), "users.create", async {
            let id: i64 = sqlx::query_scalar(
                "INSERT INTO users (email, username, password_hash) VALUES ($1, $2, $3) RETURNING id",
            )
            .bind(&user.email)
            .bind(&user.username)
            .bind(&user.password_hash)
            .fetch_one(self.ctx.pool())
            .await
            .map_err(|e| StoreError::database_operation(USERS.name, "create", e))?;

            tracing::info!(user_id = id, "created user");
            Ok(id)
        })
        .await
    }

    async fn update(&self, id: i64, patch: &UserPatch) -> Result<(), StoreError> {
        let (sql, values) = patch
            .update_set()
            .only_where("deleted_at IS NULL")
            .to_sql(USERS.name, "id");
        with_deadline(self.ctx.deadline(), "users.update", async {
            let updated = bind_values(sqlx::query(&sql), &values)
                .bind(id)
                .execute(self.ctx.pool())
                .await
                .map_err(|e| StoreError::database_operation(USERS.name, "update", e))?
                .rows_affected();

            if updated == 0 {
                return Err(StoreError::not_found("user"));
            }
            Ok(())
        })
        .await
    }

    async fn soft_delete(&self, id: i64) -> Result<(), StoreError> {
        with_deadline(self.ctx.deadline(), "users.soft_delete", async {
            let deleted = sqlx::query(
                "UPDATE users SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
            )
            .bind(id)
            .execute(self.ctx.pool())
            .await
            .map_err(|e| StoreError::database_operation(USERS.name, "soft_delete", e))?
            .rows_affected();

            if deleted == 0 {
                return Err(StoreError::not_found("user"));
            }
            tracing::info!(user_id = id, "soft-deleted user");
            Ok(())
        })
        .await
    }
}
