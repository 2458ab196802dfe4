use admin::{Panel, SessionState};
use axum::{extract::State, response::Html};
use axum_extra::extract::cookie::CookieJar;
use supabase::{AuthService, TableStore};

use crate::{auth, dashboard, page, posts, talking, ApiState};

/// Draws whatever the session and the shell currently hold. A browser
/// without the ticket only ever gets the login gate.
pub(crate) async fn get_index<S: TableStore, A: AuthService>(
    State(state): State<ApiState<S, A>>,
    jar: CookieJar,
) -> Html<String> {
    let session = state.guard.state();
    let holder = auth::holds_ticket(&state, &jar).await;
    let mut shell = state.shell.lock().await;

    match &session {
        SessionState::Loading => page::loading_page(),
        SessionState::Anonymous => {
            shell.sync_session(&session).await;
            page::login_page(shell.login_error())
        }
        SessionState::Authenticated(_) if !holder => {
            page::login_page(shell.login_error())
        }
        SessionState::Authenticated(identity) => {
            shell.sync_session(&session).await;
            let content = match shell.panel() {
                Panel::Dashboard(stats) => dashboard::render(identity, stats),
                Panel::Posts(manager) => posts::response::render(manager),
                Panel::Talking(manager) => talking::response::render(manager),
                Panel::Placeholder(tab) => page::placeholder(*tab),
            };
            page::shell_page(identity, shell.tab(), &content)
        }
    }
}
