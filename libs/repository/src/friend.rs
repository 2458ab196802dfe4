use entity::{id::RecordId, prelude::*};
use supabase::Order;

use crate::table::{Record, Table};

pub type FriendRepository<S> = Table<S, FriendEntity>;

impl Record for FriendEntity {
    type Draft = FriendDraft;

    const TABLE: &'static str = "friends";
    const ORDER: Order = Order::desc("date");

    fn id(&self) -> &RecordId {
        &self.id
    }
}
