//! REST client for the GGame API.
//!
//! Every request goes through [`ApiClient::execute`], which attaches the
//! bearer token from the injected [`SessionContext`] and turns non-2xx
//! responses into [`ClientError`]s. A 401 on a request that carried a token
//! ends the session. Nothing is retried.

pub mod auth;
pub mod comments;
pub mod notifications;
pub mod posts;
pub mod profiles;
pub mod uploads;

use reqwest::{header, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::error::{ClientError, ClientResult};
use crate::session::SessionContext;

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: String,
    session: SessionContext,
}

impl ApiClient {
    /// `base_url` includes the `/api` prefix, e.g. `http://127.0.0.1:8000/api`.
    pub fn new(base_url: &str, session: SessionContext) -> ClientResult<Self> {
        let parsed = Url::parse(base_url)?;
        Ok(Self {
            http: reqwest::Client::new(),
            base: parsed.as_str().trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    fn url(&self, path: &str) -> ClientResult<Url> {
        Ok(Url::parse(&format!(
            "{}/{}",
            self.base,
            path.trim_start_matches('/')
        ))?)
    }

    fn request(&self, method: Method, path: &str) -> ClientResult<RequestBuilder> {
        let url = self.url(path)?;
        tracing::debug!("{} {}", method, url);
        let mut builder = self.http.request(method, url);
        if let Some(token) = self.session.token() {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        Ok(builder)
    }

    async fn execute(&self, builder: RequestBuilder) -> ClientResult<Response> {
        let had_token = self.session.is_authenticated();
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.bytes().await.unwrap_or_default();
        let err = ClientError::from_response(status, &body);
        if matches!(err, ClientError::Unauthorized(_)) && had_token {
            tracing::warn!("Token rejected by server, ending session");
            if let Err(e) = self.session.destroy() {
                tracing::warn!("Failed to clear session: {}", e);
            }
        }
        Err(err)
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ClientResult<T> {
        let response = self.execute(builder).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn send_empty(&self, builder: RequestBuilder) -> ClientResult<()> {
        self.execute(builder).await?;
        Ok(())
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let builder = self.request(Method::GET, path)?;
        self.send_json(builder).await
    }

    pub(crate) async fn get_query<T, Q>(&self, path: &str, query: &Q) -> ClientResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let builder = self.request(Method::GET, path)?.query(query);
        self.send_json(builder).await
    }

    pub(crate) async fn post<T, B>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let builder = self.request(Method::POST, path)?.json(body);
        self.send_json(builder).await
    }

    pub(crate) async fn post_empty_body<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let builder = self.request(Method::POST, path)?;
        self.send_json(builder).await
    }

    pub(crate) async fn put<T, B>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let builder = self.request(Method::PUT, path)?.json(body);
        self.send_json(builder).await
    }

    pub(crate) async fn delete(&self, path: &str) -> ClientResult<()> {
        let builder = self.request(Method::DELETE, path)?;
        self.send_empty(builder).await
    }

    pub(crate) async fn delete_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let builder = self.request(Method::DELETE, path)?;
        self.send_json(builder).await
    }
}
