use crate::collaborators::Authenticator;
use crate::errors::ServiceError;

const BEARER_PREFIX: &str = "Bearer ";

/// The authenticated caller of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requester {
    pub id: i64,
    pub is_admin: bool,
}

impl Requester {
    pub fn user(id: i64) -> Self {
        Self { id, is_admin: false }
    }

    pub fn admin(id: i64) -> Self {
        Self { id, is_admin: true }
    }

    pub fn owns(&self, owner_id: i64) -> bool {
        self.id == owner_id
    }

    /// Owner or administrator
    pub fn may_manage(&self, owner_id: i64) -> bool {
        self.is_admin || self.owns(owner_id)
    }
}

/// Resolve an `Authorization` header value to a requester
pub async fn authenticate(
    authenticator: &dyn Authenticator,
    authorization: Option<&str>,
) -> Result<Requester, ServiceError> {
    let credential = authorization
        .and_then(|header| header.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(ServiceError::Unauthenticated)?;

    Ok(authenticator.authenticate(credential).await?)
}
