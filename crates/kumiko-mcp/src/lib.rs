//! MCP server exposing a Notion workspace.
//!
//! Twelve tools over one shared [`NotionClient`]: search, page fetch /
//! create / update / duplicate, database create / update / query, comments,
//! users, and page moves. The interesting work — tree fetching, markdown
//! rendering, clone sanitisation, batched rebuilds — lives in
//! `kumiko-engine`; the tools here parse identifiers, call the store, and
//! shape the one text block each tool returns.
//!
//! ## Module Structure
//!
//! - `models`: request types for the MCP tools
//! - `helpers`: identifier normalisation and output limiting
//! - `format`: result-list and object formatting

mod format;
mod helpers;
mod models;

use std::sync::Arc;

use rmcp::{
    ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};
use serde_json::Value;

use kumiko_client::{
    ApiError, CREATE_BATCH_LIMIT, CreatePageParams, NotionClient, QueryDatabaseParams,
    SearchParams, UpdatePageParams,
};
use kumiko_engine::{
    DEFAULT_CLONE_DEPTH, fetch_block_tree, flatten_tree, render_blocks, render_property_bag,
    replicate_page,
};
use kumiko_types::{Database, NewBlock, Page, ParentKind, PropertyBag, plain_text};

pub use models::*;
use format::{format_comment, format_query_results, format_search_results, format_user};
use helpers::{MAX_RESPONSE_CHARS, parse_notion_id, truncate_if_needed};

/// MCP server over a Notion workspace.
#[derive(Clone)]
pub struct KumikoMcp {
    client: Arc<NotionClient>,
    tool_router: ToolRouter<Self>,
}

impl std::fmt::Debug for KumikoMcp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KumikoMcp")
            .field("tool_router", &self.tool_router)
            .finish()
    }
}

impl KumikoMcp {
    /// Create a server around an existing client (tests, custom setups).
    pub fn with_client(client: NotionClient) -> Self {
        Self {
            client: Arc::new(client),
            tool_router: Self::tool_router(),
        }
    }

    /// Create a server from the `NOTION_API_KEY` environment credential.
    pub fn from_env() -> Result<Self, ApiError> {
        Ok(Self::with_client(NotionClient::from_env()?))
    }

    fn store(&self) -> &NotionClient {
        &self.client
    }
}

#[tool_router]
impl KumikoMcp {
    // ========================================================================
    // Read Tools
    // ========================================================================

    #[tool(
        description = "Search pages and databases across the workspace. Returns titles, object types, and IDs, sorted by last-edited time."
    )]
    async fn search(&self, Parameters(req): Parameters<SearchRequest>) -> String {
        let params = SearchParams {
            query: req.query,
            object_kind: req.filter_object_type,
            sort_direction: req.sort_direction,
            start_cursor: req.start_cursor,
            page_size: req.page_size.clamp(1, 100),
        };
        match self.store().search(&params).await {
            Ok(response) => {
                truncate_if_needed(&format_search_results(&response), MAX_RESPONSE_CHARS)
            }
            Err(e) => format!("Error: {e}"),
        }
    }

    #[tool(
        description = "Fetch a page or database: metadata, properties, and (for pages) the content blocks rendered as markdown."
    )]
    async fn fetch_page(&self, Parameters(req): Parameters<FetchPageRequest>) -> String {
        let id = parse_notion_id(&req.page_id);
        let max_depth = req.max_depth.clamp(1, 3);

        match self.store().get_page(&id).await {
            Ok(page) => match self.render_page(&page, req.include_children, max_depth).await {
                Ok(text) => truncate_if_needed(&text, MAX_RESPONSE_CHARS),
                Err(e) => format!("Error: {e}"),
            },
            Err(e) if e.is_not_found() => match self.store().get_database(&id).await {
                Ok(db) => truncate_if_needed(&render_database(&db), MAX_RESPONSE_CHARS),
                Err(e) => format!("Error: {e}"),
            },
            Err(e) => format!("Error: {e}"),
        }
    }

    #[tool(
        description = "Query a database with filters, sorts, and pagination. Returns each row's title and non-empty properties."
    )]
    async fn query_database(&self, Parameters(req): Parameters<QueryDatabaseRequest>) -> String {
        let id = parse_notion_id(&req.database_id);
        let params = QueryDatabaseParams {
            filter: req.filter,
            sorts: req.sorts,
            start_cursor: req.start_cursor,
            page_size: req.page_size.clamp(1, 100),
        };
        match self.store().query_database(&id, &params).await {
            Ok(response) => {
                truncate_if_needed(&format_query_results(&response), MAX_RESPONSE_CHARS)
            }
            Err(e) => format!("Error: {e}"),
        }
    }

    // ========================================================================
    // Write Tools
    // ========================================================================

    #[tool(
        description = "Create a page: a database row (parent_type 'database_id') or a subpage (parent_type 'page_id')."
    )]
    async fn create_page(&self, Parameters(req): Parameters<CreatePageRequest>) -> String {
        let parent_kind = match ParentKind::from_str(&req.parent_type) {
            Some(k) => k,
            None => {
                return format!(
                    "Error: invalid parent type '{}'. Use: page_id or database_id",
                    req.parent_type
                );
            }
        };
        let parent_id = parse_notion_id(&req.parent_id);

        let properties: PropertyBag = match serde_json::from_value(req.properties) {
            Ok(p) => p,
            Err(e) => return format!("Error: properties must be an object: {e}"),
        };
        let children: Vec<NewBlock> = match req.children {
            Some(values) => match serde_json::from_value(Value::Array(values)) {
                Ok(c) => c,
                Err(e) => return format!("Error: invalid children: {e}"),
            },
            None => Vec::new(),
        };

        let params = CreatePageParams {
            parent: parent_kind.parent_ref(&parent_id),
            properties,
            children,
        };
        match self.store().create_page(&params).await {
            Ok(page) => {
                let mut lines = vec![
                    "## Page created".to_string(),
                    format!("- ID: {}", page.id),
                    format!("- URL: {}", page.url.as_deref().unwrap_or("")),
                    format!("- Created: {}", page.created_time.as_deref().unwrap_or("")),
                    String::new(),
                    "### Properties".to_string(),
                ];
                push_rendered_properties(&mut lines, &page.properties);
                lines.join("\n")
            }
            Err(e) => format!("Error: {e}"),
        }
    }

    #[tool(
        description = "Update a page's properties, archive or restore it, or set its icon and cover."
    )]
    async fn update_page(&self, Parameters(req): Parameters<UpdatePageRequest>) -> String {
        let id = parse_notion_id(&req.page_id);
        let params = UpdatePageParams {
            properties: req.properties,
            archived: req.archived,
            icon: req.icon,
            cover: req.cover,
            parent: None,
        };
        match self.store().update_page(&id, &params).await {
            Ok(page) => {
                let mut lines = vec![
                    "## Page updated".to_string(),
                    format!("- ID: {}", page.id),
                    format!("- URL: {}", page.url.as_deref().unwrap_or("")),
                    format!(
                        "- Last edited: {}",
                        page.last_edited_time.as_deref().unwrap_or("")
                    ),
                    format!(
                        "- Archive state: {}",
                        if page.archived { "archived" } else { "active" }
                    ),
                    String::new(),
                    "### Current properties".to_string(),
                ];
                push_rendered_properties(&mut lines, &page.properties);
                lines.join("\n")
            }
            Err(e) => format!("Error: {e}"),
        }
    }

    #[tool(description = "Create a database under a page, with a title and a property schema.")]
    async fn create_database(&self, Parameters(req): Parameters<CreateDatabaseRequest>) -> String {
        let parent_id = parse_notion_id(&req.parent_page_id);
        match self
            .store()
            .create_database(&parent_id, &req.title, &req.properties)
            .await
        {
            Ok(db) => {
                let mut lines = vec![
                    "## Database created".to_string(),
                    format!("- ID: {}", db.id),
                    format!("- Title: {}", req.title),
                ];
                if let Some(url) = db.url.as_deref().filter(|u| !u.is_empty()) {
                    lines.push(format!("- URL: {url}"));
                }
                lines.push(format!("- Properties: {}", db.properties.len()));
                lines.join("\n")
            }
            Err(e) => format!("Error: {e}"),
        }
    }

    #[tool(description = "Update a database's title, description, or property schema.")]
    async fn update_database(&self, Parameters(req): Parameters<UpdateDatabaseRequest>) -> String {
        let id = parse_notion_id(&req.database_id);
        match self
            .store()
            .update_database(
                &id,
                req.title.as_deref(),
                req.description.as_deref(),
                req.properties.as_ref(),
            )
            .await
        {
            Ok(db) => {
                let title = plain_text(&db.title);
                let description = plain_text(&db.description);
                let mut lines = vec![
                    "## Database updated".to_string(),
                    format!("- ID: {}", db.id),
                    format!(
                        "- Title: {}",
                        if title.is_empty() {
                            "Untitled"
                        } else {
                            title.as_str()
                        }
                    ),
                ];
                if !description.is_empty() {
                    lines.push(format!("- Description: {description}"));
                }
                lines.push(format!("- Properties: {}", db.properties.len()));
                if let Some(url) = db.url.as_deref().filter(|u| !u.is_empty()) {
                    lines.push(format!("- URL: {url}"));
                }

                let mut changed = Vec::new();
                if req.title.is_some() {
                    changed.push("title");
                }
                if req.description.is_some() {
                    changed.push("description");
                }
                if req.properties.is_some() {
                    changed.push("property schema");
                }
                if !changed.is_empty() {
                    lines.push(format!("- Changed: {}", changed.join(", ")));
                }
                lines.join("\n")
            }
            Err(e) => format!("Error: {e}"),
        }
    }

    // ========================================================================
    // Comment Tools
    // ========================================================================

    #[tool(
        description = "Add a comment to a page, or reply into an existing discussion thread."
    )]
    async fn create_comment(&self, Parameters(req): Parameters<CreateCommentRequest>) -> String {
        let page_id = parse_notion_id(&req.page_id);
        match self
            .store()
            .create_comment(&page_id, &req.text, req.discussion_id.as_deref())
            .await
        {
            Ok(comment) => {
                let mut lines = vec![
                    "## Comment added".to_string(),
                    format!("- Comment ID: {}", comment.id),
                    format!("- Page ID: {page_id}"),
                    format!("- Text: {}", req.text),
                    format!(
                        "- Created: {}",
                        comment.created_time.as_deref().unwrap_or("")
                    ),
                ];
                if let Some(discussion_id) = &req.discussion_id {
                    lines.push(format!("- Discussion ID: {discussion_id}"));
                }
                lines.join("\n")
            }
            Err(e) => format!("Error: {e}"),
        }
    }

    #[tool(description = "List comments on a page or block.")]
    async fn get_comments(&self, Parameters(req): Parameters<GetCommentsRequest>) -> String {
        let block_id = parse_notion_id(&req.block_id);
        match self
            .store()
            .list_comments(
                &block_id,
                req.start_cursor.as_deref(),
                req.page_size.clamp(1, 100),
            )
            .await
        {
            Ok(response) => {
                if response.results.is_empty() {
                    return "No comments found.".to_string();
                }
                let mut lines = vec![
                    format!("## Comments ({})", response.results.len()),
                    String::new(),
                ];
                for (i, comment) in response.results.iter().enumerate() {
                    lines.extend(format_comment(i, comment));
                    lines.push(String::new());
                }
                if response.has_more {
                    lines.push(format!(
                        "*More comments available. Next cursor: {}*",
                        response.next_cursor.as_deref().unwrap_or("")
                    ));
                }
                truncate_if_needed(lines.join("\n").trim(), MAX_RESPONSE_CHARS)
            }
            Err(e) => format!("Error: {e}"),
        }
    }

    // ========================================================================
    // User Tools
    // ========================================================================

    #[tool(description = "List workspace users, or look one up by ID.")]
    async fn get_users(&self, Parameters(req): Parameters<GetUsersRequest>) -> String {
        if let Some(user_id) = &req.user_id {
            let user_id = parse_notion_id(user_id);
            return match self.store().get_user(&user_id).await {
                Ok(user) => {
                    let mut lines = vec!["## User".to_string(), String::new()];
                    lines.extend(format_user(&user));
                    lines.join("\n")
                }
                Err(e) => format!("Error: {e}"),
            };
        }

        match self
            .store()
            .list_users(req.start_cursor.as_deref(), req.page_size.clamp(1, 100))
            .await
        {
            Ok(response) => {
                if response.results.is_empty() {
                    return "No users found.".to_string();
                }
                let mut lines = vec![
                    format!("## Users ({})", response.results.len()),
                    String::new(),
                ];
                for (i, user) in response.results.iter().enumerate() {
                    lines.push(format!(
                        "### {}. {}",
                        i + 1,
                        user.name.as_deref().unwrap_or("(unnamed)")
                    ));
                    lines.extend(format_user(user));
                    lines.push(String::new());
                }
                if response.has_more {
                    lines.push(format!(
                        "*More users available. Next cursor: {}*",
                        response.next_cursor.as_deref().unwrap_or("")
                    ));
                }
                truncate_if_needed(lines.join("\n").trim(), MAX_RESPONSE_CHARS)
            }
            Err(e) => format!("Error: {e}"),
        }
    }

    // ========================================================================
    // Structure Tools
    // ========================================================================

    #[tool(
        description = "Move pages under a new parent page or database. Each page is moved independently; failures don't stop the rest."
    )]
    async fn move_pages(&self, Parameters(req): Parameters<MovePagesRequest>) -> String {
        let parent_kind = match ParentKind::from_str(&req.parent_type) {
            Some(k) => k,
            None => {
                return format!(
                    "Error: invalid parent type '{}'. Use: page_id or database_id",
                    req.parent_type
                );
            }
        };
        if req.page_ids.is_empty() || req.page_ids.len() > 50 {
            return "Error: page_ids must contain between 1 and 50 entries".to_string();
        }
        let parent_id = parse_notion_id(&req.parent_id);
        let parent = parent_kind.parent_ref(&parent_id);

        let mut results: Vec<(String, Result<(), ApiError>)> = Vec::new();
        for raw_page_id in &req.page_ids {
            let page_id = parse_notion_id(raw_page_id);
            let params = UpdatePageParams {
                parent: Some(parent.clone()),
                ..Default::default()
            };
            let outcome = self.store().update_page(&page_id, &params).await.map(|_| ());
            results.push((page_id, outcome));
        }

        let moved = results.iter().filter(|(_, r)| r.is_ok()).count();
        let failed = results.len() - moved;

        let mut lines = vec![
            "## Move results".to_string(),
            format!("- Moved: {moved} / failed: {failed}"),
            format!("- Target parent: {} = {}", parent_kind, parent_id),
            String::new(),
        ];
        for (page_id, outcome) in &results {
            match outcome {
                Ok(()) => lines.push(format!("- [ok] {page_id}")),
                Err(e) => lines.push(format!("- [failed] {page_id}: {e}")),
            }
        }
        if failed > 0 {
            lines.push(String::new());
            lines.push(
                "Note: the API restricts re-parenting — moves across workspaces or into \
                 pages with different sharing are rejected."
                    .to_string(),
            );
        }
        lines.join("\n")
    }

    #[tool(
        description = "Duplicate a page: clones its writable properties and content blocks (two levels deep) as a sibling. Server-managed blocks (synced blocks, child pages/databases) are skipped and reported."
    )]
    async fn duplicate_page(&self, Parameters(req): Parameters<DuplicatePageRequest>) -> String {
        let id = parse_notion_id(&req.page_id);
        let source = match self.store().get_page(&id).await {
            Ok(page) => page,
            Err(e) => return format!("Error: {e}"),
        };

        match replicate_page(self.store(), &source, req.new_title, DEFAULT_CLONE_DEPTH).await {
            Ok(replication) => {
                let mut lines = vec![
                    "## Page duplicated".to_string(),
                    format!("- New page ID: {}", replication.page_id),
                    format!("- Title: {}", replication.title),
                ];
                if let Some(url) = replication.url.as_deref().filter(|u| !u.is_empty()) {
                    lines.push(format!("- URL: {url}"));
                }
                lines.push(format!("- Copied blocks: {}", replication.intended_children));

                let first_batch = replication.intended_children.min(CREATE_BATCH_LIMIT);
                let extra = replication.appended_children.saturating_sub(first_batch);
                if extra > 0 {
                    lines.push(format!("  (initial {first_batch} + {extra} appended)"));
                }
                if let Some(err) = &replication.append_error {
                    lines.push(format!(
                        "- Partial copy: {} of {} blocks landed before an append failed: {}",
                        replication.appended_children, replication.intended_children, err
                    ));
                }
                if !replication.skipped_kinds.is_empty() {
                    lines.push(format!(
                        "- Skipped block kinds (not supported by the API): {}",
                        replication.skipped_kinds.join(", ")
                    ));
                }
                lines.join("\n")
            }
            Err(e) => format!("Error: {e}"),
        }
    }
}

impl KumikoMcp {
    /// Render a page: title header, metadata, non-empty properties, and
    /// (when asked) the content tree as markdown.
    async fn render_page(
        &self,
        page: &Page,
        include_children: bool,
        max_depth: u32,
    ) -> Result<String, ApiError> {
        let title = kumiko_engine::extract_title(&page.properties);
        let title = if title.is_empty() {
            "Untitled"
        } else {
            title.as_str()
        };

        let mut lines: Vec<String> = Vec::new();
        lines.push(format!("# {title}"));
        lines.push(String::new());
        lines.push(format!("**ID:** {}", page.id));
        lines.push("**Type:** page".to_string());
        lines.push(format!("**URL:** {}", page.url.as_deref().unwrap_or("")));
        lines.push(format!(
            "**Created:** {}",
            page.created_time.as_deref().unwrap_or("")
        ));
        lines.push(format!(
            "**Last Edited:** {}",
            page.last_edited_time.as_deref().unwrap_or("")
        ));
        lines.push(String::new());

        if !page.properties.is_empty() {
            lines.push("## Properties".to_string());
            for (key, value) in render_property_bag(&page.properties) {
                if !value.is_empty() {
                    lines.push(format!("- **{key}:** {value}"));
                }
            }
            lines.push(String::new());
        }

        if include_children {
            let tree = fetch_block_tree(self.store(), &page.id, max_depth).await?;
            let flat = flatten_tree(&tree);
            if !flat.is_empty() {
                lines.push("## Content".to_string());
                lines.push(String::new());
                lines.push(render_blocks(flat));
            }
        }

        Ok(lines.join("\n"))
    }
}

/// Render a database: title header, metadata, and the property schema
/// (name → kind).
fn render_database(db: &Database) -> String {
    let title = plain_text(&db.title);
    let title = if title.is_empty() {
        "Untitled"
    } else {
        title.as_str()
    };

    let mut lines: Vec<String> = Vec::new();
    lines.push(format!("# {title}"));
    lines.push(String::new());
    lines.push(format!("**ID:** {}", db.id));
    lines.push("**Type:** database".to_string());
    lines.push(format!("**URL:** {}", db.url.as_deref().unwrap_or("")));
    lines.push(format!(
        "**Created:** {}",
        db.created_time.as_deref().unwrap_or("")
    ));
    lines.push(format!(
        "**Last Edited:** {}",
        db.last_edited_time.as_deref().unwrap_or("")
    ));

    let description = plain_text(&db.description);
    if !description.is_empty() {
        lines.push(String::new());
        lines.push(description);
    }

    if !db.properties.is_empty() {
        lines.push(String::new());
        lines.push("## Properties".to_string());
        for (name, schema) in &db.properties {
            let kind = schema
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("unknown");
            lines.push(format!("- **{name}:** {kind}"));
        }
    }

    lines.join("\n")
}

/// Append `- key: value` lines for the non-empty rendered properties.
fn push_rendered_properties(lines: &mut Vec<String>, properties: &PropertyBag) {
    for (key, value) in render_property_bag(properties) {
        if !value.is_empty() {
            lines.push(format!("- {key}: {value}"));
        }
    }
}

#[tool_handler]
impl ServerHandler for KumikoMcp {
    fn get_info(&self) -> ServerInfo {
        let mut info = ServerInfo::default();
        info.instructions = Some(
            "Notion workspace MCP server. Provides tools for searching, reading, \
             creating, updating, and duplicating pages and databases, plus comments \
             and user lookup."
                .into(),
        );
        info.capabilities = ServerCapabilities::builder().enable_tools().build();
        info
    }
}
