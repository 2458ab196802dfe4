use admin::Panel;
use axum::{extract::State, response::Redirect};
use supabase::{AuthService, TableStore};

use crate::ApiState;

pub(crate) async fn confirm<S: TableStore, A: AuthService>(
    State(state): State<ApiState<S, A>>,
) -> Redirect {
    let mut shell = state.shell.lock().await;
    match shell.panel_mut() {
        Panel::Posts(manager) => manager.confirm().await,
        Panel::Talking(manager) => manager.confirm().await,
        Panel::Dashboard(_) | Panel::Placeholder(_) => {}
    }
    Redirect::to("/")
}

pub(crate) async fn decline<S: TableStore, A: AuthService>(
    State(state): State<ApiState<S, A>>,
) -> Redirect {
    let mut shell = state.shell.lock().await;
    match shell.panel_mut() {
        Panel::Posts(manager) => manager.decline(),
        Panel::Talking(manager) => manager.decline(),
        Panel::Dashboard(_) | Panel::Placeholder(_) => {}
    }
    Redirect::to("/")
}

pub(crate) async fn dismiss<S: TableStore, A: AuthService>(
    State(state): State<ApiState<S, A>>,
) -> Redirect {
    let mut shell = state.shell.lock().await;
    match shell.panel_mut() {
        Panel::Posts(manager) => manager.dismiss(),
        Panel::Talking(manager) => manager.dismiss(),
        Panel::Dashboard(_) | Panel::Placeholder(_) => {}
    }
    Redirect::to("/")
}
