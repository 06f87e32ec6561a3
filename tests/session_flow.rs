mod common;

use common::{FakeServer, PASSWORD, TOKEN};
use ggame::api::ApiClient;
use ggame::datefmt::DateFormatter;
use ggame::error::ClientError;
use ggame::feed::FeedPager;
use ggame::pages::all_posts::AllPostsPage;
use ggame::pages::auth::{LoginForm, SignupForm};
use ggame::pages::home::HomePage;
use ggame::pages::profile::ProfilePage;
use ggame::pages::Route;
use ggame::session::SessionContext;
use ggame::models::Category;
use tempfile::TempDir;

#[tokio::test]
async fn login_persists_session_and_logout_clears_it() {
    let server = FakeServer::start().await;
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("session.json");
    let session = SessionContext::open(&path).unwrap();
    let api = ApiClient::new(&server.base_url, session.clone()).unwrap();

    let mut form = LoginForm::new("kim@example.com", PASSWORD);
    assert_eq!(form.submit(&api).await, Some(Route::home()));
    assert!(form.error.is_none());
    assert_eq!(session.token().as_deref(), Some(TOKEN));
    assert!(path.exists());

    // A fresh process picks the session back up from disk
    let reopened = SessionContext::open(&path).unwrap();
    assert_eq!(reopened.user().unwrap().id, "u1");

    let mut home = HomePage::load(api.clone(), FeedPager::default(), DateFormatter::default(), None)
        .await
        .ok()
        .expect("home should load with a session");
    assert_eq!(home.logout(), Route::Login);
    assert!(session.token().is_none());
    assert!(session.user().is_none());
    assert!(!path.exists());

    // Protected pages now bounce straight to login without touching the API
    let calls_before = server.backend().calls.len();
    let again = HomePage::load(api, FeedPager::default(), DateFormatter::default(), None).await;
    assert_eq!(again.err(), Some(Route::Login));
    assert_eq!(server.backend().calls.len(), calls_before);
}

#[tokio::test]
async fn wrong_password_shows_server_message() {
    let server = FakeServer::start().await;
    let api = server.client();

    let mut form = LoginForm::new("kim@example.com", "nope");
    assert_eq!(form.submit(&api).await, None);
    assert_eq!(form.error.as_deref(), Some("Incorrect email or password"));
    assert!(!api.session().is_authenticated());
}

#[tokio::test]
async fn signup_starts_a_session() {
    let server = FakeServer::start().await;
    let api = server.client();

    let mut form = SignupForm {
        username: "newbie".into(),
        email: "newbie@example.com".into(),
        password: PASSWORD.into(),
        display_name: "Newbie".into(),
        ..Default::default()
    };
    assert_eq!(form.submit(&api).await, Some(Route::home()));
    assert_eq!(api.session().user().unwrap().username, "newbie");
}

#[tokio::test]
async fn duplicate_signup_keeps_form_usable() {
    let server = FakeServer::start().await;
    let api = server.client();

    let mut form = SignupForm {
        username: "lee".into(),
        email: "lee2@example.com".into(),
        password: PASSWORD.into(),
        display_name: "Lee".into(),
        ..Default::default()
    };
    assert_eq!(form.submit(&api).await, None);
    assert_eq!(form.error.as_deref(), Some("Username already registered"));
    assert!(!api.session().is_authenticated());
}

#[tokio::test]
async fn rejected_token_ends_the_session() {
    let server = FakeServer::start().await;
    let api = server.signed_in_client();
    server.backend().reject_tokens = true;

    let err = api.list_notifications().await.unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized(_)));
    assert!(err.is_auth());
    assert!(!api.session().is_authenticated());
}

#[tokio::test]
async fn home_load_failure_clears_session() {
    let server = FakeServer::start().await;
    let api = server.signed_in_client();
    server.backend().reject_tokens = true;

    let result = HomePage::load(api.clone(), FeedPager::default(), DateFormatter::default(), None).await;
    assert_eq!(result.err(), Some(Route::Login));
    assert!(!api.session().is_authenticated());
}

#[tokio::test]
async fn protected_pages_redirect_before_fetching() {
    let server = FakeServer::start().await;
    let api = server.client();

    let all = AllPostsPage::load(api.clone(), Category::All, 1).await;
    assert_eq!(all.err(), Some(Route::Login));
    let profile = ProfilePage::load(api.clone(), DateFormatter::default(), "u1").await;
    assert_eq!(profile.err(), Some(Route::Login));
    let home = HomePage::load(api, FeedPager::default(), DateFormatter::default(), None).await;
    assert_eq!(home.err(), Some(Route::Login));

    assert!(server.backend().calls.is_empty());
}
