pub mod friend;
pub mod id;
pub mod identity;
pub mod post;
pub mod tab;
pub mod talking;
pub mod timestamp;

pub mod prelude {
    pub use crate::friend::{Friend as FriendEntity, FriendDraft};
    pub use crate::id::RecordId;
    pub use crate::identity::Identity;
    pub use crate::post::{Post as PostEntity, PostDraft};
    pub use crate::tab::Tab;
    pub use crate::talking::{Talking as TalkingEntity, TalkingDraft};
}
