use admin::{Panel, TalkingForm, TalkingKind, TalkingManager};
use axum::{extract::State, response::Redirect, Form};
use entity::tab::Tab;
use supabase::{AuthService, TableStore};

pub(crate) mod request;
pub(crate) mod response;

use crate::{content::Screen, response::settle, ApiState};

use self::request::TalkingRequest;

impl Screen for TalkingKind {
    type Request = TalkingRequest;

    const TAB: Tab = Tab::Talking;

    fn manager<S>(panel: &mut Panel<S>) -> Option<&mut TalkingManager<S>> {
        match panel {
            Panel::Talking(manager) => Some(manager),
            _ => None,
        }
    }

    fn form(request: TalkingRequest) -> TalkingForm {
        request.into()
    }
}

pub(crate) async fn insert_image<S: TableStore, A: AuthService>(
    State(state): State<ApiState<S, A>>,
    Form(request): Form<TalkingRequest>,
) -> Redirect {
    let url = request.image_url.clone();
    let mut form = TalkingKind::form(request);
    form.insert_image(&url);

    let mut shell = state.shell.lock().await;
    if let Some(manager) = TalkingKind::manager(shell.panel_mut()) {
        settle("insert image", manager.set_form(form));
    }
    Redirect::to("/")
}
