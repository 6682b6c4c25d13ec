//! The store contract the engine replicates against.
//!
//! Three calls are all the tree engine needs: paginated child listing,
//! page creation, and child appends. Keeping them behind a trait lets the
//! engine's tests run against fake in-memory stores while the server runs
//! against [`NotionClient`](crate::NotionClient).

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use kumiko_types::{Block, NewBlock, Page, Paginated, PropertyBag};

use crate::error::ApiError;

/// Maximum number of child blocks the write API accepts in one create or
/// append call.
pub const CREATE_BATCH_LIMIT: usize = 100;

/// Body of a page-creation call.
#[derive(Clone, Debug, Serialize)]
pub struct CreatePageParams {
    /// Parent reference (`{"type": "page_id", ...}` or a parent object
    /// taken verbatim from a retrieved page).
    pub parent: Value,
    pub properties: PropertyBag,
    /// At most [`CREATE_BATCH_LIMIT`] children; omitted when empty.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NewBlock>,
}

/// Remote document store operations used by the replication engine.
///
/// Failures are the store's own error, propagated unmodified — no retries
/// at this layer.
#[async_trait]
pub trait PageStore: Send + Sync {
    /// List one page of a block's immediate children. `cursor` is the
    /// opaque token from the previous page, if any.
    async fn list_children(
        &self,
        block_id: &str,
        cursor: Option<&str>,
    ) -> Result<Paginated<Block>, ApiError>;

    /// Create a page with up to [`CREATE_BATCH_LIMIT`] initial children.
    async fn create_page(&self, params: &CreatePageParams) -> Result<Page, ApiError>;

    /// Append up to [`CREATE_BATCH_LIMIT`] children to an existing block.
    async fn append_children(&self, block_id: &str, children: &[NewBlock]) -> Result<(), ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_params_omit_empty_children() {
        let params = CreatePageParams {
            parent: json!({ "type": "page_id", "page_id": "p" }),
            properties: PropertyBag::new(),
            children: Vec::new(),
        };
        let v = serde_json::to_value(&params).unwrap();
        assert!(v.get("children").is_none());
        assert_eq!(v["parent"]["page_id"], "p");
    }
}
