//! Who is signed in, kept in step with the auth service.

use std::sync::Arc;

use entity::identity::Identity;
use supabase::AuthService;
use tokio::{
    sync::{broadcast::error::RecvError, watch},
    task::JoinHandle,
};
use tracing::{error, info, warn};

const DEFAULT_LOGIN_ERROR: &str =
    "Login failed, please check your email and password";

#[derive(Debug, Default, Clone, PartialEq)]
pub enum SessionState {
    #[default]
    Loading,
    Authenticated(Identity),
    Anonymous,
}

impl SessionState {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            SessionState::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, SessionState::Loading)
    }

    fn from_identity(identity: Option<Identity>) -> Self {
        match identity {
            Some(identity) => SessionState::Authenticated(identity),
            None => SessionState::Anonymous,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct LoginError {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct LogoutError {
    pub message: String,
}

/// Listener registered by [`SessionGuard::subscribe`]. Dispose of it with
/// [`Subscription::unsubscribe`] on teardown; dropping it does the same.
#[derive(Debug)]
pub struct Subscription {
    handle: Option<JoinHandle<()>>,
}

impl Subscription {
    pub fn unsubscribe(mut self) {
        self.cancel();
    }

    pub fn is_active(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Gates the admin shell on the operator's session.
///
/// State only moves through auth events: `login` and `logout` ask the
/// service, and the listener task applies whatever the service then
/// announces.
#[derive(Debug, Clone)]
pub struct SessionGuard<A> {
    auth: A,
    state: Arc<watch::Sender<SessionState>>,
}

impl<A: AuthService> SessionGuard<A> {
    pub fn new(auth: A) -> Self {
        let (state, _) = watch::channel(SessionState::Loading);
        Self {
            auth,
            state: Arc::new(state),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Asks the auth service once and settles the initial state.
    pub async fn get_current_session(&self) -> Option<Identity> {
        let identity = match self.auth.get_session().await {
            Ok(session) => session.map(|session| session.identity()),
            Err(e) => {
                error!(task = "get current session", err = e.to_string());
                None
            }
        };

        self.state
            .send_replace(SessionState::from_identity(identity.clone()));
        identity
    }

    /// Applies every auth change event to the state until the returned
    /// subscription is disposed.
    pub fn subscribe(&self) -> Subscription {
        let mut events = self.auth.on_auth_state_change();
        let state = self.state.clone();

        let handle = tokio::spawn(async move {
            loop {
                let event = match events.recv().await {
                    Ok(event) => event,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(task = "auth state change", skipped);
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                };

                info!(task = "auth state change", event = ?event.kind);
                state.send_replace(SessionState::from_identity(
                    event.identity(),
                ));
            }
        });

        Subscription {
            handle: Some(handle),
        }
    }

    /// Subscribes first so no event between the two steps is lost.
    pub async fn start(&self) -> Subscription {
        let subscription = self.subscribe();
        self.get_current_session().await;
        subscription
    }

    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(), LoginError> {
        match self.auth.sign_in_with_password(email, password).await {
            Ok(_) => {
                info!(task = "login", email);
                Ok(())
            }
            Err(e) => {
                warn!(task = "login", email, err = e.to_string());
                let message = e.message();
                Err(LoginError {
                    message: if message.trim().is_empty() {
                        DEFAULT_LOGIN_ERROR.to_string()
                    } else {
                        message
                    },
                })
            }
        }
    }

    pub async fn logout(&self) -> Result<(), LogoutError> {
        self.auth.sign_out().await.map_err(|e| {
            error!(task = "logout", err = e.to_string());
            LogoutError {
                message: e.message(),
            }
        })
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use supabase::{memory::MemoryAuth, AuthChangeEvent};
    use tokio::time::timeout;

    use super::*;

    async fn settle(guard: &SessionGuard<MemoryAuth>, authenticated: bool) {
        let mut watch = guard.watch();
        timeout(
            Duration::from_secs(1),
            watch.wait_for(|state| state.is_authenticated() == authenticated),
        )
        .await
        .expect("session state did not settle")
        .unwrap();
    }

    #[tokio::test]
    async fn test_starts_loading_then_anonymous() {
        // Arrange
        let guard = SessionGuard::new(MemoryAuth::new());
        assert!(guard.state().is_loading());

        // Act
        let subscription = guard.start().await;

        // Assert
        assert_eq!(guard.state(), SessionState::Anonymous);
        assert!(subscription.is_active());
        subscription.unsubscribe();
    }

    #[tokio::test]
    async fn test_login_then_logout_through_events() {
        let auth = MemoryAuth::new().with_user("admin@example.com", "secret");
        let guard = SessionGuard::new(auth);
        let _subscription = guard.start().await;

        guard.login("admin@example.com", "secret").await.unwrap();
        settle(&guard, true).await;
        assert_eq!(
            guard.state().identity().map(|i| i.email.as_str()),
            Some("admin@example.com")
        );

        guard.logout().await.unwrap();
        settle(&guard, false).await;
        assert_eq!(guard.state(), SessionState::Anonymous);
    }

    #[tokio::test]
    async fn test_bad_credentials_keep_anonymous() {
        let auth = MemoryAuth::new().with_user("admin@example.com", "secret");
        let guard = SessionGuard::new(auth);
        let _subscription = guard.start().await;

        let error = guard.login("admin@example.com", "nope").await.unwrap_err();

        assert_eq!(error.message, "Invalid login credentials");
        assert_eq!(guard.state(), SessionState::Anonymous);

        // The form stays usable.
        assert!(guard.login("admin@example.com", "secret").await.is_ok());
    }

    #[tokio::test]
    async fn test_expiry_event_signs_out() {
        let auth = MemoryAuth::new().with_user("admin@example.com", "secret");
        let guard = SessionGuard::new(auth.clone());
        let _subscription = guard.start().await;
        guard.login("admin@example.com", "secret").await.unwrap();
        settle(&guard, true).await;

        auth.expire();

        settle(&guard, false).await;
    }

    #[tokio::test]
    async fn test_existing_session_is_picked_up() {
        let auth = MemoryAuth::new().with_user("admin@example.com", "secret");
        auth.sign_in_with_password("admin@example.com", "secret")
            .await
            .unwrap();
        let guard = SessionGuard::new(auth);

        let identity = guard.get_current_session().await;

        assert_eq!(identity.unwrap().email, "admin@example.com");
        assert!(guard.state().is_authenticated());
    }

    #[tokio::test]
    async fn test_unreachable_auth_is_anonymous() {
        let auth = MemoryAuth::new();
        auth.set_unavailable(true);
        let guard = SessionGuard::new(auth);

        assert!(guard.get_current_session().await.is_none());
        assert_eq!(guard.state(), SessionState::Anonymous);
    }

    #[tokio::test]
    async fn test_unsubscribed_guard_ignores_events() {
        let auth = MemoryAuth::new().with_user("admin@example.com", "secret");
        let guard = SessionGuard::new(auth.clone());
        let subscription = guard.start().await;

        subscription.unsubscribe();
        tokio::task::yield_now().await;
        auth.sign_in_with_password("admin@example.com", "secret")
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(guard.state(), SessionState::Anonymous);
    }

    #[tokio::test]
    async fn test_token_refresh_keeps_operator_signed_in() {
        // Arrange
        let auth = MemoryAuth::new().with_user("admin@example.com", "secret");
        let guard = SessionGuard::new(auth.clone());
        let _subscription = guard.start().await;
        guard.login("admin@example.com", "secret").await.unwrap();
        settle(&guard, true).await;
        let before = auth.get_session().await.unwrap().unwrap();
        let mut events = auth.on_auth_state_change();

        // Act
        auth.refresh();

        // Assert
        let event = events.recv().await.unwrap();
        assert_eq!(event.kind, AuthChangeEvent::TokenRefreshed);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(
            guard.state().identity().map(|i| i.email.as_str()),
            Some("admin@example.com")
        );
        let after = auth.get_session().await.unwrap().unwrap();
        assert_ne!(after.access_token, before.access_token);
    }
}
