use std::{fmt, marker::PhantomData};

use entity::id::RecordId;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use supabase::{Order, TableStore};
use tracing::debug;

use crate::{BackendError, IntoResponse, Response};

/// A record type stored in one table.
pub trait Record: DeserializeOwned + Clone + Send + Sync + 'static {
    /// The writable fields, sent on insert and update.
    type Draft: Serialize + Clone + Send + Sync;

    const TABLE: &'static str;
    const ORDER: Order;

    fn id(&self) -> &RecordId;
}

/// One collection of the gateway. Every call is a single round trip;
/// nothing is cached or validated locally.
pub struct Table<S, R> {
    store: S,
    _record: PhantomData<fn() -> R>,
}

impl<S: Clone, R> Clone for Table<S, R> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _record: PhantomData,
        }
    }
}

impl<S: fmt::Debug, R: Record> fmt::Debug for Table<S, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("table", &R::TABLE)
            .field("store", &self.store)
            .finish()
    }
}

pub(crate) fn decode<R: Record>(rows: Vec<Value>) -> Response<Vec<R>> {
    rows.into_iter()
        .map(|row| {
            serde_json::from_value(row).map_err(|e| BackendError::Decode {
                table: R::TABLE,
                source: e,
            })
        })
        .collect()
}

fn encode<R: Record>(draft: &R::Draft) -> Response<Value> {
    serde_json::to_value(draft).map_err(|e| BackendError::Encode {
        table: R::TABLE,
        source: e,
    })
}

impl<S: TableStore, R: Record> Table<S, R> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            _record: PhantomData,
        }
    }

    pub(crate) fn store(&self) -> &S {
        &self.store
    }

    pub async fn find_all(&self) -> Response<Vec<R>> {
        let rows = self
            .store
            .select(R::TABLE, Some(R::ORDER))
            .await
            .into_response("select")?;
        debug!(task = "find all", table = R::TABLE, rows = rows.len());

        decode(rows)
    }

    pub async fn create(&self, draft: &R::Draft) -> Response<R> {
        let rows = self
            .store
            .insert(R::TABLE, encode::<R>(draft)?)
            .await
            .into_response("insert")?;

        decode::<R>(rows)?.into_iter().next().ok_or_else(|| {
            BackendError::NoRowReturned {
                table: R::TABLE,
                message: "insert".to_string(),
            }
        })
    }

    pub async fn update(
        &self,
        id: &RecordId,
        draft: &R::Draft,
    ) -> Response<R> {
        let rows = self
            .store
            .update(R::TABLE, id, encode::<R>(draft)?)
            .await
            .into_response("update")?;

        decode::<R>(rows)?.into_iter().next().ok_or_else(|| {
            BackendError::NotFound {
                table: R::TABLE,
                id: id.clone(),
            }
        })
    }

    pub async fn delete(&self, id: &RecordId) -> Response<()> {
        self.store
            .delete(R::TABLE, id)
            .await
            .into_response("delete")
    }
}
