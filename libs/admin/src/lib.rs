//! Dashboard state: the session gate, the content managers and the shell
//! that switches between them. Nothing here renders; the web layer reads
//! this state and draws it.

pub mod dashboard;
pub mod manager;
pub mod markdown;
pub mod posts;
pub mod session;
pub mod shell;
pub mod tags;
pub mod talking;

pub use manager::{ContentKind, ContentManager, Editor, LoadState, ManagerError, Modal, View};
pub use posts::{PostForm, PostKind, PostsManager};
pub use session::{LoginError, LogoutError, SessionGuard, SessionState, Subscription};
pub use shell::{AdminShell, Panel};
pub use talking::{TalkingForm, TalkingKind, TalkingManager};
