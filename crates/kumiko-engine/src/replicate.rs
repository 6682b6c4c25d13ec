//! Rebuild a sanitized tree at a destination, batched under the write
//! API's per-request ceiling.
//!
//! The destination page is created with the first chunk of children; every
//! remaining chunk is appended in order with one call each. Creation
//! failure aborts the whole replication. An append failure stops further
//! appends but keeps what already landed — the caller gets the
//! appended-vs-intended counts and the error, and must not assume a full
//! clone just because creation succeeded.

use serde_json::Value;

use kumiko_client::{ApiError, CREATE_BATCH_LIMIT, CreatePageParams, PageStore};
use kumiko_types::{NewBlock, Page, PropertyBag};

use crate::fetch::fetch_block_tree;
use crate::sanitize::{SanitizedTree, extract_title, override_title, sanitize_properties, sanitize_tree};

/// Descendant depth cloned by default.
pub const DEFAULT_CLONE_DEPTH: u32 = 2;

/// What the batch rebuilder produced.
#[derive(Debug)]
pub struct RebuildOutcome {
    /// The created destination page (possibly only partially populated).
    pub page: Page,
    /// How many children were supposed to land.
    pub intended: usize,
    /// How many children were actually submitted (creation batch plus
    /// successful appends).
    pub appended: usize,
    /// The error that stopped appending, if any chunk failed.
    pub append_error: Option<ApiError>,
}

/// Create `parent`'s new child page carrying `properties` and `children`,
/// splitting children across one create call plus as many append calls as
/// the batch ceiling requires.
///
/// For N children the store sees `1 + ceil(max(0, N − C) / C)` calls, in
/// order, one at a time.
pub async fn rebuild_page<S: PageStore + ?Sized>(
    store: &S,
    parent: Value,
    properties: PropertyBag,
    mut children: Vec<NewBlock>,
) -> Result<RebuildOutcome, ApiError> {
    let intended = children.len();
    let rest = if children.len() > CREATE_BATCH_LIMIT {
        children.split_off(CREATE_BATCH_LIMIT)
    } else {
        Vec::new()
    };

    let params = CreatePageParams {
        parent,
        properties,
        children,
    };
    // Nothing exists until this succeeds; its failure aborts everything.
    let page = store.create_page(&params).await?;
    let mut appended = params.children.len();

    let mut append_error = None;
    for chunk in rest.chunks(CREATE_BATCH_LIMIT) {
        match store.append_children(&page.id, chunk).await {
            Ok(()) => appended += chunk.len(),
            Err(e) => {
                tracing::warn!(
                    page = %page.id,
                    appended,
                    intended,
                    error = %e,
                    "append chunk failed, leaving partial clone"
                );
                append_error = Some(e);
                break;
            }
        }
    }

    Ok(RebuildOutcome {
        page,
        intended,
        appended,
        append_error,
    })
}

/// Summary of a page replication.
#[derive(Debug)]
pub struct Replication {
    pub page_id: String,
    pub url: Option<String>,
    /// The resolved destination title.
    pub title: String,
    /// Sanitized top-level child count (nested children travel inside
    /// their parents).
    pub intended_children: usize,
    /// Children actually submitted.
    pub appended_children: usize,
    /// Kinds dropped by the sanitizer, first-occurrence order.
    pub skipped_kinds: Vec<String>,
    /// Set when an append chunk failed and the clone is partial.
    pub append_error: Option<ApiError>,
}

/// Replicate `source` under its own parent: fetch its descendant tree,
/// sanitize it, and rebuild it as a new page.
///
/// The destination title is `new_title` when given, else
/// `"<source title> (copy)"` (`"Untitled (copy)"` for an empty source
/// title).
pub async fn replicate_page<S: PageStore + ?Sized>(
    store: &S,
    source: &Page,
    new_title: Option<String>,
    max_depth: u32,
) -> Result<Replication, ApiError> {
    let original_title = extract_title(&source.properties);
    let title = new_title.unwrap_or_else(|| {
        let base = if original_title.is_empty() {
            "Untitled"
        } else {
            original_title.as_str()
        };
        format!("{base} (copy)")
    });

    let mut properties = sanitize_properties(&source.properties);
    override_title(&mut properties, &title);

    let tree = fetch_block_tree(store, &source.id, max_depth).await?;
    let SanitizedTree {
        blocks,
        skipped_kinds,
    } = sanitize_tree(&tree);

    tracing::info!(
        source = %source.id,
        children = blocks.len(),
        skipped = skipped_kinds.len(),
        "replicating page"
    );

    let outcome = rebuild_page(store, source.parent.clone(), properties, blocks).await?;

    Ok(Replication {
        page_id: outcome.page.id.clone(),
        url: outcome.page.url.clone(),
        title,
        intended_children: outcome.intended,
        appended_children: outcome.appended,
        skipped_kinds,
        append_error: outcome.append_error,
    })
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

    use kumiko_types::{Block, Paginated};

    /// Fake store recording creates and appends, with switchable failures.
    struct FakeStore {
        children: HashMap<String, Vec<Block>>,
        fail_create: bool,
        /// Fail the Nth append call (0-based).
        fail_append_at: Option<usize>,
        created: Mutex<Vec<CreatePageParams>>,
        appends: Mutex<Vec<(String, usize)>>,
    }

    impl FakeStore {
        fn new() -> Self {
            Self {
                children: HashMap::new(),
                fail_create: false,
                fail_append_at: None,
                created: Mutex::new(Vec::new()),
                appends: Mutex::new(Vec::new()),
            }
        }

        fn store_error() -> ApiError {
            ApiError::Api {
                status: 400,
                code: "validation_error".into(),
                message: "rejected".into(),
            }
        }

        fn append_sizes(&self) -> Vec<usize> {
            self.appends.lock().unwrap().iter().map(|(_, n)| *n).collect()
        }
    }

    #[async_trait]
    impl PageStore for FakeStore {
        async fn list_children(
            &self,
            block_id: &str,
            _cursor: Option<&str>,
        ) -> Result<Paginated<Block>, ApiError> {
            Ok(Paginated {
                results: self.children.get(block_id).cloned().unwrap_or_default(),
                has_more: false,
                next_cursor: None,
            })
        }

        async fn create_page(&self, params: &CreatePageParams) -> Result<Page, ApiError> {
            if self.fail_create {
                return Err(Self::store_error());
            }
            self.created.lock().unwrap().push(params.clone());
            Ok(serde_json::from_value(json!({
                "id": "new-page",
                "url": "https://notion.so/new-page",
                "parent": params.parent,
            }))
            .unwrap())
        }

        async fn append_children(
            &self,
            block_id: &str,
            children: &[NewBlock],
        ) -> Result<(), ApiError> {
            let mut appends = self.appends.lock().unwrap();
            if self.fail_append_at == Some(appends.len()) {
                return Err(Self::store_error());
            }
            appends.push((block_id.to_string(), children.len()));
            Ok(())
        }
    }

    fn paragraphs(n: usize) -> Vec<NewBlock> {
        (0..n)
            .map(|i| {
                serde_json::from_value(json!({
                    "type": "paragraph",
                    "paragraph": { "rich_text": [{ "plain_text": format!("p{i}") }] }
                }))
                .unwrap()
            })
            .collect()
    }

    fn parent() -> Value {
        json!({ "type": "page_id", "page_id": "dest" })
    }

    // ── rebuild_page ────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_small_tree_is_one_create_call() {
        let store = FakeStore::new();
        let outcome = rebuild_page(&store, parent(), PropertyBag::new(), paragraphs(3))
            .await
            .unwrap();
        assert_eq!(outcome.intended, 3);
        assert_eq!(outcome.appended, 3);
        assert!(outcome.append_error.is_none());
        assert_eq!(store.created.lock().unwrap().len(), 1);
        assert!(store.append_sizes().is_empty());
    }

    #[tokio::test]
    async fn test_150_children_split_100_create_50_append() {
        let store = FakeStore::new();
        let outcome = rebuild_page(&store, parent(), PropertyBag::new(), paragraphs(150))
            .await
            .unwrap();
        assert_eq!(outcome.appended, 150);
        let created = store.created.lock().unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].children.len(), 100);
        assert_eq!(store.append_sizes(), [50]);
    }

    #[tokio::test]
    async fn test_call_count_formula() {
        // 1 + ceil(max(0, N − C) / C) calls, total submitted = N.
        for (n, appends) in [(0, 0), (100, 0), (101, 1), (250, 2), (300, 2)] {
            let store = FakeStore::new();
            let outcome = rebuild_page(&store, parent(), PropertyBag::new(), paragraphs(n))
                .await
                .unwrap();
            assert_eq!(store.created.lock().unwrap().len(), 1, "n={n}");
            assert_eq!(store.append_sizes().len(), appends, "n={n}");
            assert_eq!(outcome.appended, n, "n={n}");
        }
    }

    #[tokio::test]
    async fn test_append_order_preserved() {
        let store = FakeStore::new();
        rebuild_page(&store, parent(), PropertyBag::new(), paragraphs(250))
            .await
            .unwrap();
        let created = store.created.lock().unwrap();
        let first = serde_json::to_value(&created[0].children[0]).unwrap();
        assert_eq!(first["paragraph"]["rich_text"][0]["plain_text"], "p0");
        assert_eq!(store.append_sizes(), [100, 50]);
        // Appends target the page that was just created.
        assert!(store.appends.lock().unwrap().iter().all(|(id, _)| id == "new-page"));
    }

    #[tokio::test]
    async fn test_create_failure_aborts() {
        let store = FakeStore {
            fail_create: true,
            ..FakeStore::new()
        };
        let err = rebuild_page(&store, parent(), PropertyBag::new(), paragraphs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Api { .. }));
        assert!(store.append_sizes().is_empty());
    }

    #[tokio::test]
    async fn test_append_failure_keeps_partial_and_stops() {
        let store = FakeStore {
            fail_append_at: Some(1),
            ..FakeStore::new()
        };
        // 350 children: create 100, append 100 (ok), append 100 (fails),
        // final 50 never attempted.
        let outcome = rebuild_page(&store, parent(), PropertyBag::new(), paragraphs(350))
            .await
            .unwrap();
        assert_eq!(outcome.intended, 350);
        assert_eq!(outcome.appended, 200);
        assert!(outcome.append_error.is_some());
        assert_eq!(store.append_sizes(), [100], "later chunks never attempted");
    }

    // ── replicate_page ──────────────────────────────────────────────────

    fn source_page(store: &mut FakeStore) -> Page {
        store.children.insert(
            "src".to_string(),
            vec![
                serde_json::from_value(json!({
                    "id": "c1",
                    "type": "paragraph",
                    "paragraph": { "rich_text": [{ "plain_text": "body" }] }
                }))
                .unwrap(),
                serde_json::from_value(json!({
                    "id": "c2",
                    "type": "child_database",
                    "child_database": { "title": "Inner" }
                }))
                .unwrap(),
            ],
        );
        serde_json::from_value(json!({
            "id": "src",
            "url": "https://notion.so/src",
            "parent": { "type": "page_id", "page_id": "container" },
            "properties": {
                "Name": { "type": "title", "title": [{ "plain_text": "Roadmap" }] },
                "Rolled": { "type": "rollup", "rollup": { "type": "number", "number": 2 } }
            }
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_replicate_filters_and_reports_skips() {
        let mut store = FakeStore::new();
        let source = source_page(&mut store);

        let replication = replicate_page(&store, &source, None, DEFAULT_CLONE_DEPTH)
            .await
            .unwrap();

        assert_eq!(replication.page_id, "new-page");
        assert_eq!(replication.title, "Roadmap (copy)");
        assert_eq!(replication.intended_children, 1, "child_database dropped");
        assert_eq!(replication.appended_children, 1);
        assert_eq!(replication.skipped_kinds, ["child_database"]);

        // The create call carried the rewritten title, the sanitized
        // properties, and the source's own parent.
        let created = store.created.lock().unwrap();
        let props = serde_json::to_value(&created[0].properties).unwrap();
        assert_eq!(props["Name"]["title"][0]["text"]["content"], "Roadmap (copy)");
        assert!(props.get("Rolled").is_none(), "computed property dropped");
        assert_eq!(created[0].parent["page_id"], "container");
    }

    #[tokio::test]
    async fn test_replicate_explicit_title_wins() {
        let mut store = FakeStore::new();
        let source = source_page(&mut store);
        let replication =
            replicate_page(&store, &source, Some("Fork".to_string()), DEFAULT_CLONE_DEPTH)
                .await
                .unwrap();
        assert_eq!(replication.title, "Fork");
    }

    #[tokio::test]
    async fn test_replicate_untitled_source() {
        let mut store = FakeStore::new();
        let mut source = source_page(&mut store);
        source.properties = PropertyBag::new();
        let replication = replicate_page(&store, &source, None, DEFAULT_CLONE_DEPTH)
            .await
            .unwrap();
        assert_eq!(replication.title, "Untitled (copy)");
    }
}
