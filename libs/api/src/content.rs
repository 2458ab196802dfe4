//! Handlers shared by the post and talking screens. Each one acts on the
//! manager of the open tab and redirects back to the page; an action for
//! a tab that is no longer open is ignored.

use admin::{ContentKind, ContentManager, Panel};
use axum::{
    extract::{Path, State},
    response::Redirect,
    Form,
};
use entity::{id::RecordId, tab::Tab};
use serde::de::DeserializeOwned;
use supabase::{AuthService, TableStore};

use crate::{response::settle, ApiState};

/// A content screen reachable from the sidebar.
pub(crate) trait Screen: ContentKind {
    /// The editor form as posted by the browser.
    type Request: DeserializeOwned + Send + 'static;

    const TAB: Tab;

    fn manager<S>(panel: &mut Panel<S>) -> Option<&mut ContentManager<S, Self>>;

    fn form(request: Self::Request) -> Self::Form;
}

pub(crate) async fn create_new<S, A, K>(
    State(state): State<ApiState<S, A>>,
) -> Redirect
where
    S: TableStore,
    A: AuthService,
    K: Screen,
{
    let mut shell = state.shell.lock().await;
    if let Some(manager) = K::manager(shell.panel_mut()) {
        settle("create new", manager.create_new());
    }
    Redirect::to("/")
}

pub(crate) async fn edit<S, A, K>(
    State(state): State<ApiState<S, A>>,
    Path(id): Path<String>,
) -> Redirect
where
    S: TableStore,
    A: AuthService,
    K: Screen,
{
    let mut shell = state.shell.lock().await;
    if let Some(manager) = K::manager(shell.panel_mut()) {
        settle("edit", manager.edit(&RecordId::from(id)));
    }
    Redirect::to("/")
}

pub(crate) async fn back<S, A, K>(
    State(state): State<ApiState<S, A>>,
) -> Redirect
where
    S: TableStore,
    A: AuthService,
    K: Screen,
{
    let mut shell = state.shell.lock().await;
    if let Some(manager) = K::manager(shell.panel_mut()) {
        settle("back to list", manager.back_to_list());
    }
    Redirect::to("/")
}

pub(crate) async fn preview<S, A, K>(
    State(state): State<ApiState<S, A>>,
    Form(request): Form<K::Request>,
) -> Redirect
where
    S: TableStore,
    A: AuthService,
    K: Screen,
{
    let mut shell = state.shell.lock().await;
    if let Some(manager) = K::manager(shell.panel_mut()) {
        settle("toggle preview", manager.toggle_preview(K::form(request)));
    }
    Redirect::to("/")
}

pub(crate) async fn save<S, A, K>(
    State(state): State<ApiState<S, A>>,
    Form(request): Form<K::Request>,
) -> Redirect
where
    S: TableStore,
    A: AuthService,
    K: Screen,
{
    let form = K::form(request);
    let mut shell = state.shell.lock().await;
    if let Some(manager) = K::manager(shell.panel_mut()) {
        settle("save", manager.save(form).await);
    }
    Redirect::to("/")
}

pub(crate) async fn cancel<S, A, K>(
    State(state): State<ApiState<S, A>>,
    Form(request): Form<K::Request>,
) -> Redirect
where
    S: TableStore,
    A: AuthService,
    K: Screen,
{
    let mut shell = state.shell.lock().await;
    if let Some(manager) = K::manager(shell.panel_mut()) {
        settle("cancel", manager.request_cancel(K::form(request)));
    }
    Redirect::to("/")
}

pub(crate) async fn delete<S, A, K>(
    State(state): State<ApiState<S, A>>,
    Path(id): Path<String>,
) -> Redirect
where
    S: TableStore,
    A: AuthService,
    K: Screen,
{
    let mut shell = state.shell.lock().await;
    if let Some(manager) = K::manager(shell.panel_mut()) {
        settle("delete", manager.request_delete(&RecordId::from(id)));
    }
    Redirect::to("/")
}

pub(crate) async fn retry<S, A, K>(
    State(state): State<ApiState<S, A>>,
) -> Redirect
where
    S: TableStore,
    A: AuthService,
    K: Screen,
{
    let mut shell = state.shell.lock().await;
    if let Some(manager) = K::manager(shell.panel_mut()) {
        manager.retry().await;
    }
    Redirect::to("/")
}
