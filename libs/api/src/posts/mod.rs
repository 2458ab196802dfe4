use admin::{Panel, PostForm, PostKind, PostsManager};
use axum::{
    extract::{Path, State},
    response::Redirect,
};
use entity::{id::RecordId, tab::Tab};
use supabase::{AuthService, TableStore};

pub(crate) mod request;
pub(crate) mod response;

use crate::{content::Screen, response::settle, ApiState};

use self::request::PostRequest;

impl Screen for PostKind {
    type Request = PostRequest;

    const TAB: Tab = Tab::Posts;

    fn manager<S>(panel: &mut Panel<S>) -> Option<&mut PostsManager<S>> {
        match panel {
            Panel::Posts(manager) => Some(manager),
            _ => None,
        }
    }

    fn form(request: PostRequest) -> PostForm {
        request.into()
    }
}

pub(crate) async fn view<S: TableStore, A: AuthService>(
    State(state): State<ApiState<S, A>>,
    Path(id): Path<String>,
) -> Redirect {
    let mut shell = state.shell.lock().await;
    if let Some(manager) = PostKind::manager(shell.panel_mut()) {
        settle("view post", manager.view_post(&RecordId::from(id)));
    }
    Redirect::to("/")
}

/// Jumps straight to a post: opens the posts tab when needed and fetches
/// the post by id.
pub(crate) async fn open<S: TableStore, A: AuthService>(
    State(state): State<ApiState<S, A>>,
    Path(id): Path<String>,
) -> Redirect {
    let mut shell = state.shell.lock().await;
    if shell.tab() != PostKind::TAB {
        shell.select_tab(PostKind::TAB).await;
    }
    if let Some(manager) = PostKind::manager(shell.panel_mut()) {
        settle("open post", manager.open(&RecordId::from(id)).await);
    }
    Redirect::to("/")
}
