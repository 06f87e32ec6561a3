//! Page state for each screen of the board. A page owns its view state,
//! drives the API client, and reports navigation as a [`Route`].

pub mod all_posts;
pub mod auth;
pub mod home;
pub mod profile;

use std::fmt;

use crate::session::{Session, SessionContext};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Signup,
    Home { highlight_post: Option<String> },
    Profile { user_id: String },
    AllPosts,
}

impl Route {
    pub fn home() -> Self {
        Route::Home {
            highlight_post: None,
        }
    }

    pub fn requires_session(&self) -> bool {
        !matches!(self, Route::Login | Route::Signup)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Login => write!(f, "/login"),
            Route::Signup => write!(f, "/signup"),
            Route::Home {
                highlight_post: None,
            } => write!(f, "/"),
            Route::Home {
                highlight_post: Some(id),
            } => write!(f, "/#post-{}", id),
            Route::Profile { user_id } => write!(f, "/profile/{}", user_id),
            Route::AllPosts => write!(f, "/all-posts"),
        }
    }
}

/// Gate for protected pages: the current session, or the route to send the
/// visitor to instead. Checked before any request is made.
pub fn require_session(session: &SessionContext) -> Result<Session, Route> {
    session.current().ok_or_else(|| {
        tracing::debug!("No session, redirecting to login");
        Route::Login
    })
}
