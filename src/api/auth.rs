use serde::Serialize;

use super::ApiClient;
use crate::error::ClientResult;
use crate::models::{AuthResponse, LoginRequest, ProfilePatch, SignupRequest, User};

#[derive(Serialize)]
struct UserListQuery {
    limit: u32,
}

impl ApiClient {
    /// Create an account. On success the returned token starts the session.
    pub async fn signup(&self, request: &SignupRequest) -> ClientResult<User> {
        let auth: AuthResponse = self.post("/users/signup", request).await?;
        self.session.establish(auth.access_token, auth.user.clone())?;
        Ok(auth.user)
    }

    /// Sign in. On success the returned token starts the session.
    pub async fn login(&self, request: &LoginRequest) -> ClientResult<User> {
        let auth: AuthResponse = self.post("/users/login", request).await?;
        self.session.establish(auth.access_token, auth.user.clone())?;
        Ok(auth.user)
    }

    /// Local only: the API has no logout endpoint.
    pub fn logout(&self) -> ClientResult<()> {
        self.session.destroy()
    }

    pub async fn my_profile(&self) -> ClientResult<User> {
        self.get("/users/me").await
    }

    pub async fn update_my_profile(&self, patch: &ProfilePatch) -> ClientResult<User> {
        self.put("/users/me", patch).await
    }

    pub async fn list_users(&self, limit: u32) -> ClientResult<Vec<User>> {
        self.get_query("/users", &UserListQuery { limit }).await
    }
}
