use std::future::Future;

use entity::id::RecordId;
use reqwest::{header::HeaderValue, RequestBuilder};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::{
    auth::AuthClient,
    response::{failed_status, IntoResponse, Response},
};

/// Sort applied to a `select`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
    pub column: &'static str,
    pub ascending: bool,
}

impl Order {
    pub const fn desc(column: &'static str) -> Self {
        Self {
            column,
            ascending: false,
        }
    }

    fn to_param(self) -> String {
        let direction = if self.ascending { "asc" } else { "desc" };
        format!("{}.{}", self.column, direction)
    }
}

/// Row-level access to the hosted tables. Rows travel as JSON; typing
/// them is the caller's job.
pub trait TableStore: Clone + Send + Sync + 'static {
    fn select(
        &self,
        table: &str,
        order: Option<Order>,
    ) -> impl Future<Output = Response<Vec<Value>>> + Send;

    fn select_by_id(
        &self,
        table: &str,
        id: &RecordId,
    ) -> impl Future<Output = Response<Vec<Value>>> + Send;

    /// Returns the inserted rows as stored, ids included.
    fn insert(
        &self,
        table: &str,
        row: Value,
    ) -> impl Future<Output = Response<Vec<Value>>> + Send;

    /// Returns the updated rows; empty when nothing matched `id`.
    fn update(
        &self,
        table: &str,
        id: &RecordId,
        patch: Value,
    ) -> impl Future<Output = Response<Vec<Value>>> + Send;

    fn delete(
        &self,
        table: &str,
        id: &RecordId,
    ) -> impl Future<Output = Response<()>> + Send;
}

#[derive(Clone, Debug)]
pub struct RestClient {
    base_url: Url,
    anon_key: String,
    http: reqwest::Client,
    auth: AuthClient,
}

impl RestClient {
    pub(crate) fn new(
        base_url: Url,
        anon_key: String,
        http: reqwest::Client,
        auth: AuthClient,
    ) -> Self {
        Self {
            base_url,
            anon_key,
            http,
            auth,
        }
    }

    fn table_url(&self, table: &str) -> Response<Url> {
        self.base_url
            .join(&format!("rest/v1/{}", table))
            .into_response("failed to build table url")
    }

    fn row_url(&self, table: &str, id: &RecordId) -> Response<Url> {
        let mut url = self.table_url(table)?;
        url.query_pairs_mut()
            .append_pair("id", &format!("eq.{}", id));
        Ok(url)
    }

    /// The operator's access token when signed in, the anon key otherwise.
    async fn bearer(&self) -> Response<String> {
        Ok(self
            .auth
            .access_token()
            .await?
            .unwrap_or_else(|| self.anon_key.clone()))
    }

    async fn send(&self, request: RequestBuilder) -> Response<String> {
        let response = request
            .bearer_auth(self.bearer().await?)
            .send()
            .await
            .into_response("failed to send")?;

        let status = response.status();
        let text = response.text().await.into_response("failed to get text")?;

        if !status.is_success() {
            return Err(failed_status(status, &text));
        }

        Ok(text)
    }

    fn parse_rows(text: &str) -> Response<Vec<Value>> {
        if text.trim().is_empty() {
            return Ok(vec![]);
        }
        serde_json::from_str(text).into_response("failed to parse rows")
    }
}

fn return_representation() -> HeaderValue {
    HeaderValue::from_static("return=representation")
}

impl TableStore for RestClient {
    async fn select(
        &self,
        table: &str,
        order: Option<Order>,
    ) -> Response<Vec<Value>> {
        let mut url = self.table_url(table)?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("select", "*");
            if let Some(order) = order {
                query.append_pair("order", &order.to_param());
            }
        }
        debug!(task = "select", table);

        let text = self.send(self.http.get(url)).await?;
        Self::parse_rows(&text)
    }

    async fn select_by_id(
        &self,
        table: &str,
        id: &RecordId,
    ) -> Response<Vec<Value>> {
        let mut url = self.row_url(table, id)?;
        url.query_pairs_mut().append_pair("select", "*");
        debug!(task = "select by id", table, id = %id);

        let text = self.send(self.http.get(url)).await?;
        Self::parse_rows(&text)
    }

    async fn insert(&self, table: &str, row: Value) -> Response<Vec<Value>> {
        let url = self.table_url(table)?;
        debug!(task = "insert", table);

        let request = self
            .http
            .post(url)
            .header("Prefer", return_representation())
            .json(&[row]);
        let text = self.send(request).await?;
        Self::parse_rows(&text)
    }

    async fn update(
        &self,
        table: &str,
        id: &RecordId,
        patch: Value,
    ) -> Response<Vec<Value>> {
        let url = self.row_url(table, id)?;
        debug!(task = "update", table, id = %id);

        let request = self
            .http
            .patch(url)
            .header("Prefer", return_representation())
            .json(&patch);
        let text = self.send(request).await?;
        Self::parse_rows(&text)
    }

    async fn delete(&self, table: &str, id: &RecordId) -> Response<()> {
        let url = self.row_url(table, id)?;
        debug!(task = "delete", table, id = %id);

        self.send(self.http.delete(url)).await?;
        Ok(())
    }
}
