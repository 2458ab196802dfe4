use entity::{id::RecordId, prelude::*};
use supabase::{Order, TableStore};

use crate::{
    table::{decode, Record, Table},
    BackendError, IntoResponse, Response,
};

pub type PostRepository<S> = Table<S, PostEntity>;

impl Record for PostEntity {
    type Draft = PostDraft;

    const TABLE: &'static str = "posts";
    const ORDER: Order = Order::desc("created_at");

    fn id(&self) -> &RecordId {
        &self.id
    }
}

impl<S: TableStore> Table<S, PostEntity> {
    pub async fn find_by_id(&self, id: &RecordId) -> Response<PostEntity> {
        let rows = self
            .store()
            .select_by_id(PostEntity::TABLE, id)
            .await
            .into_response("select by id")?;

        decode::<PostEntity>(rows)?.into_iter().next().ok_or_else(|| {
            BackendError::NotFound {
                table: PostEntity::TABLE,
                id: id.clone(),
            }
        })
    }
}
