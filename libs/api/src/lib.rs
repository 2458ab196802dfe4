use std::sync::Arc;

use admin::{AdminShell, PostKind, SessionGuard, TalkingKind};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use repository::Repository;
use supabase::{AuthService, TableStore};
use tokio::sync::{Mutex, RwLock};
use tower_http::trace::TraceLayer;
use tracing::info;

mod auth;
mod content;
mod dashboard;
pub mod healthz;
mod index;
mod modal;
pub mod not_found;
mod page;
mod posts;
mod response;
mod tab;
mod talking;

pub enum ApiError {
    AuthError(String),
    ClientError(String),
    NotFound,
}

/// One operator, one shell: every request works on the same dashboard
/// state. Only the browser holding `ticket` may act on it.
pub struct ApiState<S, A> {
    shell: Arc<Mutex<AdminShell<S>>>,
    guard: SessionGuard<A>,
    ticket: Arc<RwLock<Option<String>>>,
}

impl<S, A: Clone> Clone for ApiState<S, A> {
    fn clone(&self) -> Self {
        Self {
            shell: self.shell.clone(),
            guard: self.guard.clone(),
            ticket: self.ticket.clone(),
        }
    }
}

impl<S: TableStore, A: AuthService> ApiState<S, A> {
    pub fn new(repository: Repository<S>, guard: SessionGuard<A>) -> Self {
        Self {
            shell: Arc::new(Mutex::new(AdminShell::new(repository))),
            guard,
            ticket: Arc::default(),
        }
    }
}

pub fn serve<S: TableStore, A: AuthService>(state: ApiState<S, A>) -> Router {
    info!(task = "start api serving");

    let signed_in = middleware::from_fn_with_state(
        state.clone(),
        auth::require_session::<S, A>,
    );

    // posts
    let posts_router = Router::new()
        .route("/new", post(content::create_new::<S, A, PostKind>))
        .route("/back", post(content::back::<S, A, PostKind>))
        .route("/save", post(content::save::<S, A, PostKind>))
        .route("/preview", post(content::preview::<S, A, PostKind>))
        .route("/cancel", post(content::cancel::<S, A, PostKind>))
        .route("/retry", post(content::retry::<S, A, PostKind>))
        .route("/:id/open", post(posts::open::<S, A>))
        .route("/:id/view", post(posts::view::<S, A>))
        .route("/:id/edit", post(content::edit::<S, A, PostKind>))
        .route("/:id/delete", post(content::delete::<S, A, PostKind>))
        .route_layer(signed_in.clone())
        .fallback(not_found::get_404);

    // talking
    let talking_router = Router::new()
        .route("/new", post(content::create_new::<S, A, TalkingKind>))
        .route("/back", post(content::back::<S, A, TalkingKind>))
        .route("/save", post(content::save::<S, A, TalkingKind>))
        .route("/preview", post(content::preview::<S, A, TalkingKind>))
        .route("/cancel", post(content::cancel::<S, A, TalkingKind>))
        .route("/insert-image", post(talking::insert_image::<S, A>))
        .route("/retry", post(content::retry::<S, A, TalkingKind>))
        .route("/:id/edit", post(content::edit::<S, A, TalkingKind>))
        .route("/:id/delete", post(content::delete::<S, A, TalkingKind>))
        .route_layer(signed_in.clone())
        .fallback(not_found::get_404);

    // dialogs of whichever manager is open
    let modal_router = Router::new()
        .route("/confirm", post(modal::confirm::<S, A>))
        .route("/decline", post(modal::decline::<S, A>))
        .route("/dismiss", post(modal::dismiss::<S, A>))
        .route_layer(signed_in.clone())
        .fallback(not_found::get_404);

    Router::new()
        .route("/", get(index::get_index::<S, A>))
        .route("/login", post(auth::login::<S, A>))
        .route(
            "/logout",
            post(auth::logout::<S, A>).route_layer(signed_in.clone()),
        )
        .route(
            "/tabs/:tab",
            post(tab::select_tab::<S, A>).route_layer(signed_in),
        )
        .route("/healthz", get(healthz::get_health))
        .nest("/posts", posts_router)
        .nest("/talking", talking_router)
        .nest("/modal", modal_router)
        .fallback(not_found::get_404)
        .layer(middleware::from_fn(auth::same_origin))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
