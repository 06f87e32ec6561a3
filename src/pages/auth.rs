//! Login and signup forms.

use super::Route;
use crate::api::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::models::{LoginRequest, SignupRequest, User};

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub error: Option<String>,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            error: None,
        }
    }

    pub fn validate(&self) -> ClientResult<LoginRequest> {
        let email = self.email.trim();
        if email.is_empty() || self.password.is_empty() {
            return Err(ClientError::Validation(
                "Email and password are required.".into(),
            ));
        }
        Ok(LoginRequest {
            email: email.to_string(),
            password: self.password.clone(),
        })
    }

    /// Sign in. Returns the route to go to on success; on failure the message
    /// is kept in `error` and `None` comes back.
    pub async fn submit(&mut self, api: &ApiClient) -> Option<Route> {
        self.error = None;
        match self.try_submit(api).await {
            Ok(_) => Some(Route::home()),
            Err(e) => {
                self.error = Some(e.user_message("Login failed."));
                None
            }
        }
    }

    async fn try_submit(&self, api: &ApiClient) -> ClientResult<User> {
        let request = self.validate()?;
        api.login(&request).await
    }
}

#[derive(Debug, Clone, Default)]
pub struct SignupForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub display_name: String,
    pub bio: String,
    pub error: Option<String>,
}

impl SignupForm {
    pub fn validate(&self) -> ClientResult<SignupRequest> {
        let username = self.username.trim();
        let email = self.email.trim();
        let display_name = self.display_name.trim();
        let bio = self.bio.trim();

        let invalid = |msg: &str| Err(ClientError::Validation(msg.to_string()));
        if !(3..=20).contains(&username.chars().count()) {
            return invalid("Username must be 3 to 20 characters.");
        }
        if !email.contains('@') {
            return invalid("Enter a valid email address.");
        }
        if self.password.chars().count() < 6 {
            return invalid("Password must be at least 6 characters.");
        }
        if !(2..=30).contains(&display_name.chars().count()) {
            return invalid("Display name must be 2 to 30 characters.");
        }

        Ok(SignupRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: self.password.clone(),
            display_name: display_name.to_string(),
            bio: (!bio.is_empty()).then(|| bio.to_string()),
        })
    }

    pub async fn submit(&mut self, api: &ApiClient) -> Option<Route> {
        self.error = None;
        match self.try_submit(api).await {
            Ok(_) => Some(Route::home()),
            Err(e) => {
                self.error = Some(e.user_message("Signup failed."));
                None
            }
        }
    }

    async fn try_submit(&self, api: &ApiClient) -> ClientResult<User> {
        let request = self.validate()?;
        api.signup(&request).await
    }
}
