use entity::id::RecordId;
use friend::FriendRepository;
use post::PostRepository;
use supabase::{SupabaseError, TableStore};
use talking::TalkingRepository;

pub mod friend;
pub mod post;
pub mod table;
pub mod talking;

pub use table::{Record, Table};

/// Typed access to every collection the dashboard touches.
#[derive(Clone, Debug)]
pub struct Repository<S> {
    pub post: PostRepository<S>,
    pub talking: TalkingRepository<S>,
    pub friend: FriendRepository<S>,
}

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("in table store from unsuccessful {}: {}", message, source)]
    InStore {
        message: String,
        source: SupabaseError,
    },

    #[error("no row in {} with id {}", table, id)]
    NotFound { table: &'static str, id: RecordId },

    #[error("no row returned from {} after {}", table, message)]
    NoRowReturned {
        table: &'static str,
        message: String,
    },

    #[error("failed to encode {} row: {}", table, source)]
    Encode {
        table: &'static str,
        source: serde_json::Error,
    },

    #[error("failed to decode {} row: {}", table, source)]
    Decode {
        table: &'static str,
        source: serde_json::Error,
    },
}

impl BackendError {
    /// The text worth showing to the operator.
    pub fn message(&self) -> String {
        match self {
            BackendError::InStore { source, .. } => source.message(),
            other => other.to_string(),
        }
    }
}

pub type Response<T> = Result<T, BackendError>;

pub trait IntoResponse<T> {
    fn into_response(self, message: &str) -> Response<T>;
}

impl<T> IntoResponse<T> for Result<T, SupabaseError> {
    fn into_response(self, message: &str) -> Response<T> {
        self.map_err(|e| BackendError::InStore {
            message: message.to_string(),
            source: e,
        })
    }
}

pub fn init_repository<S: TableStore>(store: S) -> Repository<S> {
    Repository {
        post: Table::new(store.clone()),
        talking: Table::new(store.clone()),
        friend: Table::new(store),
    }
}
