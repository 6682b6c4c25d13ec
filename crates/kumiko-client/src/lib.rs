//! Notion HTTP API client.
//!
//! One [`NotionClient`] is built from the environment credential at startup
//! and reused for the whole process — it is passed into the MCP server as
//! an explicit dependency, never stashed in a global. Every method is a
//! thin wrapper over one REST endpoint: build the request, send it, map a
//! non-success response to [`ApiError`], decode the body. No retries, no
//! local validation of caller-supplied schema objects.

mod error;
mod store;

pub use error::ApiError;
pub use store::{CREATE_BATCH_LIMIT, CreatePageParams, PageStore};

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use kumiko_types::{
    Block, Comment, Database, NewBlock, Page, Paginated, RichTextRun, SearchResult, User,
};

/// REST endpoint root.
pub const NOTION_API_URL: &str = "https://api.notion.com/v1";
/// Pinned API revision sent with every request.
pub const NOTION_API_VERSION: &str = "2022-06-28";
/// Page size used when listing block children.
pub const CHILDREN_PAGE_SIZE: u32 = 100;

/// Workspace search parameters.
#[derive(Clone, Debug)]
pub struct SearchParams {
    pub query: Option<String>,
    /// Restrict to `"page"` or `"database"`.
    pub object_kind: Option<String>,
    /// `"ascending"` or `"descending"`, by last-edited time.
    pub sort_direction: String,
    pub start_cursor: Option<String>,
    pub page_size: u32,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            query: None,
            object_kind: None,
            sort_direction: "descending".to_string(),
            start_cursor: None,
            page_size: 20,
        }
    }
}

/// Database query parameters. `filter` and `sorts` are caller-supplied
/// schema objects, forwarded verbatim.
#[derive(Clone, Debug, Default)]
pub struct QueryDatabaseParams {
    pub filter: Option<Value>,
    pub sorts: Option<Value>,
    pub start_cursor: Option<String>,
    pub page_size: u32,
}

/// Page update parameters; only set fields are sent.
#[derive(Clone, Debug, Default, serde::Serialize)]
pub struct UpdatePageParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<Value>,
}

/// HTTP client for the Notion REST API.
#[derive(Debug, Clone)]
pub struct NotionClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl NotionClient {
    /// Build a client from the `NOTION_API_KEY` environment variable.
    pub fn from_env() -> Result<Self, ApiError> {
        let api_key = std::env::var("NOTION_API_KEY").map_err(|_| ApiError::MissingApiKey)?;
        Ok(Self::new(api_key))
    }

    /// Build a client with an explicit credential.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: NOTION_API_URL.to_string(),
        }
    }

    /// Override the endpoint root (proxies, test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Send a request and decode the response, mapping non-success
    /// statuses to the store's error triple.
    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(method = %method, %url, "Notion API request");

        let mut req = self
            .http
            .request(method, &url)
            .bearer_auth(&self.api_key)
            .header("Notion-Version", NOTION_API_VERSION);
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let err = ApiError::from_response(status.as_u16(), &body);
            tracing::debug!(status = status.as_u16(), %err, "Notion API error response");
            return Err(err);
        }
        Ok(resp.json::<T>().await?)
    }

    // ========================================================================
    // Pages
    // ========================================================================

    pub async fn get_page(&self, page_id: &str) -> Result<Page, ApiError> {
        self.send(Method::GET, &format!("/pages/{page_id}"), &[], None)
            .await
    }

    pub async fn create_page(&self, params: &CreatePageParams) -> Result<Page, ApiError> {
        let body = serde_json::to_value(params).map_err(|e| ApiError::Transport(e.to_string()))?;
        self.send(Method::POST, "/pages", &[], Some(&body)).await
    }

    pub async fn update_page(
        &self,
        page_id: &str,
        params: &UpdatePageParams,
    ) -> Result<Page, ApiError> {
        let body = serde_json::to_value(params).map_err(|e| ApiError::Transport(e.to_string()))?;
        self.send(Method::PATCH, &format!("/pages/{page_id}"), &[], Some(&body))
            .await
    }

    // ========================================================================
    // Databases
    // ========================================================================

    pub async fn get_database(&self, database_id: &str) -> Result<Database, ApiError> {
        self.send(Method::GET, &format!("/databases/{database_id}"), &[], None)
            .await
    }

    pub async fn create_database(
        &self,
        parent_page_id: &str,
        title: &str,
        properties: &Value,
    ) -> Result<Database, ApiError> {
        let body = json!({
            "parent": { "type": "page_id", "page_id": parent_page_id },
            "title": [RichTextRun::text(title)],
            "properties": properties,
        });
        self.send(Method::POST, "/databases", &[], Some(&body)).await
    }

    pub async fn update_database(
        &self,
        database_id: &str,
        title: Option<&str>,
        description: Option<&str>,
        properties: Option<&Value>,
    ) -> Result<Database, ApiError> {
        let mut body = json!({});
        if let Some(title) = title {
            body["title"] = json!([RichTextRun::text(title)]);
        }
        if let Some(description) = description {
            body["description"] = json!([RichTextRun::text(description)]);
        }
        if let Some(properties) = properties {
            body["properties"] = properties.clone();
        }
        self.send(
            Method::PATCH,
            &format!("/databases/{database_id}"),
            &[],
            Some(&body),
        )
        .await
    }

    pub async fn query_database(
        &self,
        database_id: &str,
        params: &QueryDatabaseParams,
    ) -> Result<Paginated<Page>, ApiError> {
        let mut body = json!({ "page_size": params.page_size });
        if let Some(filter) = &params.filter {
            body["filter"] = filter.clone();
        }
        if let Some(sorts) = &params.sorts {
            body["sorts"] = sorts.clone();
        }
        if let Some(cursor) = &params.start_cursor {
            body["start_cursor"] = json!(cursor);
        }
        self.send(
            Method::POST,
            &format!("/databases/{database_id}/query"),
            &[],
            Some(&body),
        )
        .await
    }

    // ========================================================================
    // Blocks
    // ========================================================================

    pub async fn list_children(
        &self,
        block_id: &str,
        cursor: Option<&str>,
    ) -> Result<Paginated<Block>, ApiError> {
        let mut query = vec![("page_size", CHILDREN_PAGE_SIZE.to_string())];
        if let Some(cursor) = cursor {
            query.push(("start_cursor", cursor.to_string()));
        }
        self.send(
            Method::GET,
            &format!("/blocks/{block_id}/children"),
            &query,
            None,
        )
        .await
    }

    pub async fn append_children(
        &self,
        block_id: &str,
        children: &[NewBlock],
    ) -> Result<(), ApiError> {
        let body = json!({ "children": children });
        // The response lists the created blocks; only the ack matters here.
        let _: Value = self
            .send(
                Method::PATCH,
                &format!("/blocks/{block_id}/children"),
                &[],
                Some(&body),
            )
            .await?;
        Ok(())
    }

    // ========================================================================
    // Search
    // ========================================================================

    pub async fn search(&self, params: &SearchParams) -> Result<Paginated<SearchResult>, ApiError> {
        let mut body = json!({
            "page_size": params.page_size,
            "sort": {
                "direction": params.sort_direction,
                "timestamp": "last_edited_time",
            },
        });
        if let Some(query) = &params.query {
            body["query"] = json!(query);
        }
        if let Some(kind) = &params.object_kind {
            body["filter"] = json!({ "value": kind, "property": "object" });
        }
        if let Some(cursor) = &params.start_cursor {
            body["start_cursor"] = json!(cursor);
        }
        self.send(Method::POST, "/search", &[], Some(&body)).await
    }

    // ========================================================================
    // Users
    // ========================================================================

    pub async fn list_users(
        &self,
        cursor: Option<&str>,
        page_size: u32,
    ) -> Result<Paginated<User>, ApiError> {
        let mut query = vec![("page_size", page_size.to_string())];
        if let Some(cursor) = cursor {
            query.push(("start_cursor", cursor.to_string()));
        }
        self.send(Method::GET, "/users", &query, None).await
    }

    pub async fn get_user(&self, user_id: &str) -> Result<User, ApiError> {
        self.send(Method::GET, &format!("/users/{user_id}"), &[], None)
            .await
    }

    // ========================================================================
    // Comments
    // ========================================================================

    pub async fn list_comments(
        &self,
        block_id: &str,
        cursor: Option<&str>,
        page_size: u32,
    ) -> Result<Paginated<Comment>, ApiError> {
        let mut query = vec![
            ("block_id", block_id.to_string()),
            ("page_size", page_size.to_string()),
        ];
        if let Some(cursor) = cursor {
            query.push(("start_cursor", cursor.to_string()));
        }
        self.send(Method::GET, "/comments", &query, None).await
    }

    /// Comment on a page, or reply into an existing discussion when
    /// `discussion_id` is given (the store requires exactly one of the two).
    pub async fn create_comment(
        &self,
        page_id: &str,
        text: &str,
        discussion_id: Option<&str>,
    ) -> Result<Comment, ApiError> {
        let rich_text = json!([RichTextRun::text(text)]);
        let body = match discussion_id {
            Some(discussion_id) => json!({
                "discussion_id": discussion_id,
                "rich_text": rich_text,
            }),
            None => json!({
                "parent": { "page_id": page_id },
                "rich_text": rich_text,
            }),
        };
        self.send(Method::POST, "/comments", &[], Some(&body)).await
    }
}

#[async_trait]
impl PageStore for NotionClient {
    async fn list_children(
        &self,
        block_id: &str,
        cursor: Option<&str>,
    ) -> Result<Paginated<Block>, ApiError> {
        NotionClient::list_children(self, block_id, cursor).await
    }

    async fn create_page(&self, params: &CreatePageParams) -> Result<Page, ApiError> {
        NotionClient::create_page(self, params).await
    }

    async fn append_children(&self, block_id: &str, children: &[NewBlock]) -> Result<(), ApiError> {
        NotionClient::append_children(self, block_id, children).await
    }
}
