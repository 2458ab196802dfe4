use std::time::Duration;

use admin::SessionGuard;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, Uri},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use supabase::{AuthService, TableStore};
use tokio::time::timeout;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{ApiError, ApiState};

/// How long a login or logout waits for the auth event to land before
/// redirecting anyway.
const SETTLE_TIMEOUT: Duration = Duration::from_secs(5);

pub(crate) const TICKET_COOKIE: &str = "vh_admin_ticket";

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

async fn settle<A: AuthService>(guard: &SessionGuard<A>, authenticated: bool) {
    let mut watch = guard.watch();
    let settled = timeout(
        SETTLE_TIMEOUT,
        watch.wait_for(|state| {
            !state.is_loading() && state.is_authenticated() == authenticated
        }),
    )
    .await;

    if !matches!(settled, Ok(Ok(_))) {
        warn!(task = "settle session", authenticated);
    }
}

fn ticket_cookie(ticket: String) -> Cookie<'static> {
    Cookie::build((TICKET_COOKIE, ticket))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .build()
}

/// Whether this browser carries the ticket handed out at the last
/// successful sign-in.
pub(crate) async fn holds_ticket<S, A>(
    state: &ApiState<S, A>,
    jar: &CookieJar,
) -> bool {
    let ticket = state.ticket.read().await;
    match (ticket.as_deref(), jar.get(TICKET_COOKIE)) {
        (Some(ticket), Some(cookie)) => cookie.value() == ticket,
        _ => false,
    }
}

pub(crate) async fn login<S: TableStore, A: AuthService>(
    State(state): State<ApiState<S, A>>,
    jar: CookieJar,
    Form(request): Form<LoginRequest>,
) -> (CookieJar, Redirect) {
    match state.guard.login(&request.email, &request.password).await {
        Ok(()) => {
            settle(&state.guard, true).await;
            state.shell.lock().await.set_login_error(None);

            // A new sign-in retires whichever browser held the old ticket.
            let ticket = Uuid::new_v4().to_string();
            *state.ticket.write().await = Some(ticket.clone());
            info!(task = "issue ticket");

            (jar.add(ticket_cookie(ticket)), Redirect::to("/"))
        }
        Err(e) => {
            state.shell.lock().await.set_login_error(Some(e.message));
            (jar, Redirect::to("/"))
        }
    }
}

pub(crate) async fn logout<S: TableStore, A: AuthService>(
    State(state): State<ApiState<S, A>>,
    jar: CookieJar,
) -> (CookieJar, Redirect) {
    if state.guard.logout().await.is_ok() {
        settle(&state.guard, false).await;
    }
    *state.ticket.write().await = None;

    (
        jar.remove(Cookie::build(TICKET_COOKIE).path("/")),
        Redirect::to("/"),
    )
}

/// Sends every dashboard action back to the login gate unless the
/// operator is signed in and this browser holds the ticket.
pub(crate) async fn require_session<S: TableStore, A: AuthService>(
    State(state): State<ApiState<S, A>>,
    jar: CookieJar,
    req: Request,
    next: Next,
) -> Response {
    if state.guard.state().is_authenticated()
        && holds_ticket(&state, &jar).await
    {
        return next.run(req).await;
    }

    warn!(task = "require session", path = req.uri().path());
    Redirect::to("/").into_response()
}

/// The host a browser says the request came from, when it says so.
fn origin_host(headers: &HeaderMap) -> Option<Option<String>> {
    let origin = headers.get(header::ORIGIN)?;
    Some(
        origin
            .to_str()
            .ok()
            .and_then(|origin| origin.parse::<Uri>().ok())
            .and_then(|uri| uri.authority().map(|a| a.as_str().to_string())),
    )
}

fn is_cross_site(headers: &HeaderMap) -> bool {
    if let Some(site) = headers.get("sec-fetch-site") {
        return !matches!(site.as_bytes(), b"same-origin" | b"none");
    }

    let host = headers
        .get(header::HOST)
        .and_then(|host| host.to_str().ok());
    match (origin_host(headers), host) {
        (None, _) => false,
        (Some(Some(origin)), Some(host)) => !origin.eq_ignore_ascii_case(host),
        (Some(_), _) => true,
    }
}

/// Refuses state-changing requests that another site's page sent.
pub(crate) async fn same_origin(
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !req.method().is_safe() && is_cross_site(req.headers()) {
        warn!(
            task = "refuse cross-site request",
            method = %req.method(),
            path = req.uri().path()
        );
        return Err(ApiError::AuthError(
            "Cross-site request refused".to_string(),
        ));
    }

    Ok(next.run(req).await)
}
