use std::{
    future::Future,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use chrono::Utc;
use reqwest::StatusCode;
use serde::Serialize;
use tokio::sync::{broadcast, Mutex};
use tracing::{info, warn};
use url::Url;

use crate::{
    response::{failed_status, IntoResponse, Response},
    session::{AuthChangeEvent, AuthEvent, Session},
    SessionStore, SupabaseError,
};

pub trait AuthService: Clone + Send + Sync + 'static {
    /// The current session, refreshed first when it is about to expire.
    fn get_session(
        &self,
    ) -> impl Future<Output = Response<Option<Session>>> + Send;

    fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Response<Session>> + Send;

    fn sign_out(&self) -> impl Future<Output = Response<()>> + Send;

    /// Every session change is broadcast; late subscribers only see
    /// events sent after they subscribed.
    fn on_auth_state_change(&self) -> broadcast::Receiver<AuthEvent>;
}

#[derive(Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RefreshGrant<'a> {
    refresh_token: &'a str,
}

#[derive(Clone, Debug)]
pub struct AuthClient {
    base_url: Url,
    http: reqwest::Client,
    session: SessionStore,
    events: broadcast::Sender<AuthEvent>,
    /// Held while a refresh is in flight so a refresh token is spent once.
    refreshing: Arc<Mutex<()>>,
    announced: Arc<AtomicBool>,
}

impl AuthClient {
    pub(crate) fn new(
        base_url: Url,
        http: reqwest::Client,
        session: SessionStore,
        events: broadcast::Sender<AuthEvent>,
    ) -> Self {
        Self {
            base_url,
            http,
            session,
            events,
            refreshing: Arc::default(),
            announced: Arc::default(),
        }
    }

    fn token_url(&self, grant_type: &str) -> Response<Url> {
        let mut url = self
            .base_url
            .join("auth/v1/token")
            .into_response("failed to build token url")?;
        url.query_pairs_mut().append_pair("grant_type", grant_type);
        Ok(url)
    }

    async fn request_token<T: Serialize>(
        &self,
        grant_type: &str,
        body: &T,
    ) -> Response<Session> {
        let response = self
            .http
            .post(self.token_url(grant_type)?)
            .json(body)
            .send()
            .await
            .into_response("failed to send")?;

        let status = response.status();
        let text = response.text().await.into_response("failed to get text")?;

        if !status.is_success() {
            return Err(failed_status(status, &text));
        }

        let session: Session = serde_json::from_str(&text)
            .into_response("failed to parse session")?;

        Ok(session.stamp(Utc::now()))
    }

    /// The stored session, refreshed first when it is about to expire.
    async fn current(&self) -> Response<Option<Session>> {
        let _refreshing = self.refreshing.lock().await;

        let current = self.session.read().await.clone();
        let Some(session) = current else {
            return Ok(None);
        };

        if !session.is_expiring(Utc::now()) {
            return Ok(Some(session));
        }

        let refresh = RefreshGrant {
            refresh_token: &session.refresh_token,
        };
        match self.request_token("refresh_token", &refresh).await {
            Ok(refreshed) => {
                self.publish(
                    AuthChangeEvent::TokenRefreshed,
                    Some(refreshed.clone()),
                )
                .await;
                Ok(Some(refreshed))
            }
            Err(e) if is_rejected(&e) => {
                warn!(task = "refresh session", err = e.to_string());
                self.publish(AuthChangeEvent::SignedOut, None).await;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// The bearer for table requests: the operator's access token,
    /// refreshed when it is about to expire, or `None` while signed out.
    pub async fn access_token(&self) -> Response<Option<String>> {
        Ok(self.current().await?.map(|session| session.access_token))
    }

    /// Replaces the stored session and tells every subscriber.
    async fn publish(&self, kind: AuthChangeEvent, session: Option<Session>) {
        *self.session.write().await = session.clone();
        info!(task = "auth state change", event = ?kind);

        // No subscribers is fine.
        let _ = self.events.send(AuthEvent::new(kind, session));
    }
}

/// Whether the server says the refresh token is no good anymore.
fn is_rejected(error: &SupabaseError) -> bool {
    matches!(
        error.status(),
        Some(StatusCode::BAD_REQUEST) | Some(StatusCode::UNAUTHORIZED)
    )
}

/// Whether the server already considers the session gone.
fn is_already_gone(error: &SupabaseError) -> bool {
    matches!(
        error.status(),
        Some(StatusCode::UNAUTHORIZED)
            | Some(StatusCode::FORBIDDEN)
            | Some(StatusCode::NOT_FOUND)
    )
}

impl AuthService for AuthClient {
    async fn get_session(&self) -> Response<Option<Session>> {
        let session = self.current().await?;

        if !self.announced.swap(true, Ordering::SeqCst) {
            let _ = self.events.send(AuthEvent::new(
                AuthChangeEvent::InitialSession,
                session.clone(),
            ));
        }

        Ok(session)
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Response<Session> {
        let grant = PasswordGrant { email, password };
        let session = self.request_token("password", &grant).await?;

        self.publish(AuthChangeEvent::SignedIn, Some(session.clone()))
            .await;

        Ok(session)
    }

    async fn sign_out(&self) -> Response<()> {
        let current = self.session.read().await.clone();

        if let Some(session) = current {
            let url = self
                .base_url
                .join("auth/v1/logout")
                .into_response("failed to build logout url")?;

            let response = self
                .http
                .post(url)
                .bearer_auth(&session.access_token)
                .send()
                .await
                .into_response("failed to send")?;

            let status = response.status();
            if !status.is_success() {
                let text = response
                    .text()
                    .await
                    .into_response("failed to get text")?;
                let error = failed_status(status, &text);
                if !is_already_gone(&error) {
                    return Err(error);
                }
            }
        }

        self.publish(AuthChangeEvent::SignedOut, None).await;

        Ok(())
    }

    fn on_auth_state_change(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}
