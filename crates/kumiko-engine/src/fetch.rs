//! Depth-bounded, paginated retrieval of a block's descendant tree.
//!
//! Every level is fetched with cursor-driven pagination (follow
//! `next_cursor` while the store reports more), then children of flagged
//! blocks are fetched recursively while remaining depth allows. Calls are
//! strictly sequential: each cursor depends on the response before it.
//!
//! The fetched descendant list is not part of the stored block shape, so
//! it lives on a wrapper — [`FetchedBlock`] — rather than on
//! [`Block`](kumiko_types::Block) itself.

use futures::future::BoxFuture;

use kumiko_client::{ApiError, PageStore};
use kumiko_types::Block;

/// A block plus its fetched descendants (empty when none were fetched,
/// either because there are none or because the depth bound was reached).
#[derive(Clone, Debug)]
pub struct FetchedBlock {
    pub block: Block,
    pub children: Vec<FetchedBlock>,
}

/// Fetch the descendant tree of `block_id` down to `max_depth` levels.
///
/// At `max_depth == 1` only the immediate children are retrieved, even if
/// some are flagged as having descendants of their own. Retrieval errors
/// propagate unmodified; there is no retry here.
pub async fn fetch_block_tree<S: PageStore + ?Sized>(
    store: &S,
    block_id: &str,
    max_depth: u32,
) -> Result<Vec<FetchedBlock>, ApiError> {
    fetch_level(store, block_id.to_string(), max_depth).await
}

fn fetch_level<S: PageStore + ?Sized>(
    store: &S,
    block_id: String,
    depth: u32,
) -> BoxFuture<'_, Result<Vec<FetchedBlock>, ApiError>> {
    Box::pin(async move {
        if depth == 0 {
            return Ok(Vec::new());
        }

        // Drain every page of immediate children first.
        let mut blocks: Vec<Block> = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let page = store.list_children(&block_id, cursor.as_deref()).await?;
            blocks.extend(page.results);
            cursor = if page.has_more { page.next_cursor } else { None };
            if cursor.is_none() {
                break;
            }
        }

        tracing::trace!(block = %block_id, count = blocks.len(), depth, "fetched children");

        // Then descend into flagged blocks while depth remains.
        let mut out = Vec::with_capacity(blocks.len());
        for block in blocks {
            let children = if block.has_children && depth > 1 {
                fetch_level(store, block.id.clone(), depth - 1).await?
            } else {
                Vec::new()
            };
            out.push(FetchedBlock { block, children });
        }
        Ok(out)
    })
}

/// Pre-order flattening: each block, then its descendants recursively.
/// This is the sequence the block renderer consumes.
pub fn flatten_tree(tree: &[FetchedBlock]) -> Vec<&Block> {
    fn walk<'a>(nodes: &'a [FetchedBlock], out: &mut Vec<&'a Block>) {
        for node in nodes {
            out.push(&node.block);
            walk(&node.children, out);
        }
    }
    let mut out = Vec::new();
    walk(tree, &mut out);
    out
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use kumiko_client::CreatePageParams;
    use kumiko_types::{NewBlock, Page, Paginated};

    /// In-memory store serving canned children in pages of `page_size`,
    /// with cursors encoded as start offsets. Records every call.
    struct FakeStore {
        children: HashMap<String, Vec<Block>>,
        page_size: usize,
        calls: Mutex<Vec<String>>,
    }

    impl FakeStore {
        fn new(page_size: usize) -> Self {
            Self {
                children: HashMap::new(),
                page_size,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn insert(&mut self, parent: &str, blocks: Vec<Block>) {
            self.children.insert(parent.to_string(), blocks);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageStore for FakeStore {
        async fn list_children(
            &self,
            block_id: &str,
            cursor: Option<&str>,
        ) -> Result<Paginated<Block>, ApiError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("list {block_id} @{}", cursor.unwrap_or("start")));
            let all = self.children.get(block_id).cloned().unwrap_or_default();
            let start: usize = cursor.map(|c| c.parse().unwrap()).unwrap_or(0);
            let end = (start + self.page_size).min(all.len());
            let has_more = end < all.len();
            Ok(Paginated {
                results: all[start..end].to_vec(),
                has_more,
                next_cursor: has_more.then(|| end.to_string()),
            })
        }

        async fn create_page(&self, _params: &CreatePageParams) -> Result<Page, ApiError> {
            unreachable!("fetch tests never create pages")
        }

        async fn append_children(
            &self,
            _block_id: &str,
            _children: &[NewBlock],
        ) -> Result<(), ApiError> {
            unreachable!("fetch tests never append")
        }
    }

    fn para(id: &str, text: &str, has_children: bool) -> Block {
        serde_json::from_value(json!({
            "id": id,
            "has_children": has_children,
            "type": "paragraph",
            "paragraph": { "rich_text": [{ "plain_text": text }] }
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_single_page_fetch() {
        let mut store = FakeStore::new(10);
        store.insert("root", vec![para("a", "A", false), para("b", "B", false)]);

        let tree = fetch_block_tree(&store, "root", 2).await.unwrap();
        assert_eq!(tree.len(), 2);
        assert!(tree.iter().all(|n| n.children.is_empty()));
        assert_eq!(store.calls(), ["list root @start"]);
    }

    #[tokio::test]
    async fn test_pagination_follows_cursors_in_order() {
        let mut store = FakeStore::new(2);
        store.insert(
            "root",
            vec![
                para("a", "A", false),
                para("b", "B", false),
                para("c", "C", false),
                para("d", "D", false),
                para("e", "E", false),
            ],
        );

        let tree = fetch_block_tree(&store, "root", 1).await.unwrap();
        let ids: Vec<&str> = tree.iter().map(|n| n.block.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c", "d", "e"], "page order preserved");
        assert_eq!(
            store.calls(),
            ["list root @start", "list root @2", "list root @4"]
        );
    }

    #[tokio::test]
    async fn test_depth_one_never_descends() {
        let mut store = FakeStore::new(10);
        store.insert("root", vec![para("a", "A", true)]);
        store.insert("a", vec![para("a1", "A1", false)]);

        let tree = fetch_block_tree(&store, "root", 1).await.unwrap();
        assert!(tree[0].block.has_children);
        assert!(tree[0].children.is_empty(), "depth 1 must not descend");
        assert_eq!(store.calls(), ["list root @start"]);
    }

    #[tokio::test]
    async fn test_recursion_bounded_by_depth() {
        let mut store = FakeStore::new(10);
        store.insert("root", vec![para("a", "A", true)]);
        store.insert("a", vec![para("a1", "A1", true)]);
        store.insert("a1", vec![para("a2", "A2", false)]);

        let tree = fetch_block_tree(&store, "root", 2).await.unwrap();
        assert_eq!(tree[0].children.len(), 1);
        // a1 is flagged, but depth ran out before its children.
        assert!(tree[0].children[0].block.has_children);
        assert!(tree[0].children[0].children.is_empty());

        let deep = fetch_block_tree(&store, "root", 3).await.unwrap();
        assert_eq!(deep[0].children[0].children.len(), 1);
        assert_eq!(deep[0].children[0].children[0].block.id, "a2");
    }

    #[tokio::test]
    async fn test_unflagged_blocks_are_not_queried() {
        let mut store = FakeStore::new(10);
        store.insert("root", vec![para("a", "A", false)]);
        // Even though children exist in the store, has_children=false means
        // no call is made for them.
        store.insert("a", vec![para("ghost", "X", false)]);

        let tree = fetch_block_tree(&store, "root", 3).await.unwrap();
        assert!(tree[0].children.is_empty());
        assert_eq!(store.calls(), ["list root @start"]);
    }

    #[tokio::test]
    async fn test_flatten_is_pre_order() {
        let mut store = FakeStore::new(10);
        store.insert("root", vec![para("a", "A", true), para("b", "B", false)]);
        store.insert("a", vec![para("a1", "A1", false), para("a2", "A2", false)]);

        let tree = fetch_block_tree(&store, "root", 2).await.unwrap();
        let flat: Vec<&str> = flatten_tree(&tree).iter().map(|b| b.id.as_str()).collect();
        assert_eq!(flat, ["a", "a1", "a2", "b"]);
    }
}
