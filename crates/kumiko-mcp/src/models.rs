//! MCP request types.
//!
//! These types define the API of the Kumiko MCP server tools. Identifier
//! fields accept a raw ID or a full Notion URL; `filter`, `sorts`,
//! `properties`, and `children` are caller-supplied schema objects
//! forwarded to the store as-is (malformed ones come back as store
//! errors).

use rmcp::schemars;
use serde::Deserialize;
use serde_json::Value;

// ============================================================================
// Read Tools
// ============================================================================

/// Search pages and databases across the workspace.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchRequest {
    /// Search query (omit to list everything)
    #[schemars(description = "Search query (omit to list everything)")]
    pub query: Option<String>,
    /// Restrict results to one object type
    #[schemars(description = "Restrict results to 'page' or 'database'")]
    pub filter_object_type: Option<String>,
    /// Sort direction by last-edited time
    #[schemars(description = "Sort direction: 'ascending' or 'descending' (default: descending)")]
    #[serde(default = "default_sort_direction")]
    pub sort_direction: String,
    /// Pagination cursor from a previous call
    #[schemars(description = "Pagination cursor from a previous call")]
    pub start_cursor: Option<String>,
    /// Results per page
    #[schemars(description = "Results per page, 1-100 (default: 20)")]
    #[serde(default = "default_search_page_size")]
    pub page_size: u32,
}

fn default_sort_direction() -> String {
    "descending".to_string()
}

fn default_search_page_size() -> u32 {
    20
}

/// Fetch a page (or database) with properties and content.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct FetchPageRequest {
    /// Page or database ID / Notion URL
    #[schemars(description = "Page or database ID, or a Notion URL")]
    pub page_id: String,
    /// Include the page's content blocks
    #[schemars(description = "Include the page's content blocks (default: true)")]
    #[serde(default = "default_true")]
    pub include_children: bool,
    /// Block recursion depth
    #[schemars(description = "Block recursion depth, 1-3 (default: 2)")]
    #[serde(default = "default_fetch_depth")]
    pub max_depth: u32,
}

fn default_true() -> bool {
    true
}

fn default_fetch_depth() -> u32 {
    2
}

/// Query a database with filters, sorts, and pagination.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct QueryDatabaseRequest {
    /// Database ID / Notion URL
    #[schemars(description = "Database ID, or a Notion URL")]
    pub database_id: String,
    /// Filter object, e.g. {"property": "Status", "select": {"equals": "Done"}}
    #[schemars(
        description = "Notion filter object. Single: {\"property\": \"Status\", \"select\": {\"equals\": \"Done\"}}; compound: {\"and\": [...]}"
    )]
    pub filter: Option<Value>,
    /// Sort array, e.g. [{"property": "Name", "direction": "ascending"}]
    #[schemars(
        description = "Sort array, e.g. [{\"property\": \"Name\", \"direction\": \"ascending\"}] or [{\"timestamp\": \"created_time\", \"direction\": \"descending\"}]"
    )]
    pub sorts: Option<Value>,
    /// Pagination cursor from a previous call
    #[schemars(description = "Pagination cursor from a previous call")]
    pub start_cursor: Option<String>,
    /// Results per page
    #[schemars(description = "Results per page, 1-100 (default: 50)")]
    #[serde(default = "default_list_page_size")]
    pub page_size: u32,
}

fn default_list_page_size() -> u32 {
    50
}

// ============================================================================
// Write Tools
// ============================================================================

/// Create a page under a database or page parent.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreatePageRequest {
    /// Parent type: "database_id" (row) or "page_id" (subpage)
    #[schemars(description = "Parent type: 'database_id' (database row) or 'page_id' (subpage)")]
    pub parent_type: String,
    /// Parent database or page ID / Notion URL
    #[schemars(description = "Parent database or page ID, or a Notion URL")]
    pub parent_id: String,
    /// Property object for the new page
    #[schemars(
        description = "Page property object. Examples: title: {\"Name\": {\"title\": [{\"text\": {\"content\": \"Title\"}}]}}; select: {\"Status\": {\"select\": {\"name\": \"Done\"}}}; number: {\"Count\": {\"number\": 42}}; checkbox: {\"Done\": {\"checkbox\": true}}"
    )]
    pub properties: Value,
    /// Content blocks for the new page
    #[schemars(description = "Content block array for the new page (optional)")]
    pub children: Option<Vec<Value>>,
}

/// Update a page's properties, archive state, icon, or cover.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdatePageRequest {
    /// Page ID / Notion URL
    #[schemars(description = "Page ID, or a Notion URL")]
    pub page_id: String,
    /// Properties to change (only the listed ones)
    #[schemars(description = "Property object with only the entries to change")]
    pub properties: Option<Value>,
    /// true archives the page, false restores it
    #[schemars(description = "true: archive the page, false: restore it")]
    pub archived: Option<bool>,
    /// Icon object, e.g. {"type": "emoji", "emoji": "🎯"}
    #[schemars(description = "Icon object, e.g. {\"type\": \"emoji\", \"emoji\": \"🎯\"}")]
    pub icon: Option<Value>,
    /// Cover object, e.g. {"type": "external", "external": {"url": "https://..."}}
    #[schemars(
        description = "Cover object, e.g. {\"type\": \"external\", \"external\": {\"url\": \"https://...\"}}"
    )]
    pub cover: Option<Value>,
}

/// Create a database under a page.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateDatabaseRequest {
    /// Parent page ID / Notion URL
    #[schemars(description = "Parent page ID, or a Notion URL")]
    pub parent_page_id: String,
    /// Database title
    #[schemars(description = "Database title")]
    pub title: String,
    /// Property schema definition
    #[schemars(
        description = "Property schema, e.g. {\"Name\": {\"title\": {}}, \"Status\": {\"select\": {\"options\": [{\"name\": \"Todo\", \"color\": \"red\"}]}}}"
    )]
    pub properties: Value,
}

/// Update a database's title, description, or property schema.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateDatabaseRequest {
    /// Database ID / Notion URL
    #[schemars(description = "Database ID, or a Notion URL")]
    pub database_id: String,
    /// New title
    #[schemars(description = "New database title (optional)")]
    pub title: Option<String>,
    /// New description
    #[schemars(description = "New database description (optional)")]
    pub description: Option<String>,
    /// Schema changes: add/update {"Prop": {...}}, remove {"Prop": null}
    #[schemars(
        description = "Property schema changes (optional). Add/update: {\"NewProp\": {\"select\": {...}}}; remove: {\"OldProp\": null}"
    )]
    pub properties: Option<Value>,
}

// ============================================================================
// Comment Tools
// ============================================================================

/// Add a comment to a page, or reply into a discussion.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateCommentRequest {
    /// Page ID / Notion URL
    #[schemars(description = "Page ID, or a Notion URL")]
    pub page_id: String,
    /// Comment text (plain)
    #[schemars(description = "Comment text (plain)")]
    pub text: String,
    /// Discussion to reply into
    #[schemars(description = "Discussion ID to reply into (optional)")]
    pub discussion_id: Option<String>,
}

/// List comments on a page or block.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetCommentsRequest {
    /// Page or block ID / Notion URL
    #[schemars(description = "Page or block ID, or a Notion URL")]
    pub block_id: String,
    /// Pagination cursor from a previous call
    #[schemars(description = "Pagination cursor from a previous call")]
    pub start_cursor: Option<String>,
    /// Results per page
    #[schemars(description = "Results per page, 1-100 (default: 50)")]
    #[serde(default = "default_list_page_size")]
    pub page_size: u32,
}

// ============================================================================
// User Tools
// ============================================================================

/// List workspace users, or fetch one.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetUsersRequest {
    /// Specific user ID (omit for the full list)
    #[schemars(description = "Specific user ID (omit to list all users)")]
    pub user_id: Option<String>,
    /// Pagination cursor from a previous call
    #[schemars(description = "Pagination cursor from a previous call")]
    pub start_cursor: Option<String>,
    /// Results per page
    #[schemars(description = "Results per page, 1-100 (default: 50)")]
    #[serde(default = "default_list_page_size")]
    pub page_size: u32,
}

// ============================================================================
// Structure Tools
// ============================================================================

/// Move pages under a new parent.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct MovePagesRequest {
    /// Pages to move (1-50)
    #[schemars(description = "Page IDs or Notion URLs to move (1-50)")]
    pub page_ids: Vec<String>,
    /// New parent type: "page_id" or "database_id"
    #[schemars(description = "New parent type: 'page_id' or 'database_id'")]
    pub parent_type: String,
    /// New parent ID / Notion URL
    #[schemars(description = "New parent page or database ID, or a Notion URL")]
    pub parent_id: String,
}

/// Duplicate a page, cloning its properties and content.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DuplicatePageRequest {
    /// Page to duplicate (ID / Notion URL)
    #[schemars(description = "Page ID or Notion URL to duplicate")]
    pub page_id: String,
    /// Title for the copy
    #[schemars(description = "Title for the copy (default: \"<original title> (copy)\")")]
    pub new_title: Option<String>,
}
