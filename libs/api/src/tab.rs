use std::str::FromStr;

use axum::{
    extract::{Path, State},
    response::Redirect,
};
use entity::tab::Tab;
use supabase::{AuthService, TableStore};

use crate::{
    response::{ApiResponse, IntoApiResponse},
    ApiState,
};

pub(crate) async fn select_tab<S: TableStore, A: AuthService>(
    State(state): State<ApiState<S, A>>,
    Path(tab): Path<String>,
) -> ApiResponse<Redirect> {
    let tab = Tab::from_str(&tab).into_response("Unknown tab")?;
    state.shell.lock().await.select_tab(tab).await;

    Ok(Redirect::to("/"))
}
