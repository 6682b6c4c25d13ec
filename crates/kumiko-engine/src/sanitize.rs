//! Classify, filter, and rewrite fetched content for re-creation.
//!
//! A pure transform — nothing here touches the remote store and nothing
//! here can fail. Structural anomalies (a node without a usable payload, a
//! bag without a title property) are handled by silent omission, not
//! errors: they are expected, not exceptional.

use indexmap::IndexSet;

use kumiko_types::{
    BlockPayload, NewBlock, Property, PropertyBag, PropertyValue, RichTextRun, plain_text,
};

use crate::fetch::FetchedBlock;

/// Result of sanitizing a fetched tree: the write-shaped blocks plus the
/// kinds that had to be dropped (deduplicated, first-occurrence order).
#[derive(Clone, Debug)]
pub struct SanitizedTree {
    pub blocks: Vec<NewBlock>,
    pub skipped_kinds: Vec<String>,
}

/// Filter a fetched tree down to what the write API accepts.
///
/// Server-managed kinds (synced blocks, child page/database references,
/// templates, link-to-page pointers) are dropped at every depth and
/// recorded in `skipped_kinds`. Blocks whose payload this build cannot
/// represent are dropped silently — there is nothing to clone. Retained
/// blocks keep only their kind tag and payload; the already-filtered
/// descendant list is re-attached as `children`.
pub fn sanitize_tree(tree: &[FetchedBlock]) -> SanitizedTree {
    let mut skipped = IndexSet::new();
    let blocks = sanitize_level(tree, &mut skipped);
    SanitizedTree {
        blocks,
        skipped_kinds: skipped.into_iter().collect(),
    }
}

fn sanitize_level(nodes: &[FetchedBlock], skipped: &mut IndexSet<String>) -> Vec<NewBlock> {
    let mut out = Vec::new();
    for node in nodes {
        match &node.block.payload {
            // No payload was captured: nothing to clone.
            BlockPayload::Other => continue,
            payload if !payload.is_clonable() => {
                skipped.insert(payload.kind_name().to_string());
                continue;
            }
            payload => out.push(NewBlock {
                payload: payload.clone(),
                children: sanitize_level(&node.children, skipped),
            }),
        }
    }
    out
}

/// Keep only properties the write API accepts on creation; computed and
/// unknown kinds are dropped, order is preserved.
pub fn sanitize_properties(properties: &PropertyBag) -> PropertyBag {
    properties
        .iter()
        .filter(|(_, p)| p.is_writable())
        .map(|(k, p)| (k.clone(), p.clone()))
        .collect()
}

/// Replace the value of the bag's title property (at most one exists) with
/// a single plain run. A bag without a title property is left unchanged —
/// no title is synthesized.
pub fn override_title(properties: &mut PropertyBag, new_title: &str) {
    for property in properties.values_mut() {
        if let Property::Typed(typed) = property {
            if let PropertyValue::Title { title } = &mut typed.value {
                *title = vec![RichTextRun::text(new_title)];
                break;
            }
        }
    }
}

/// Flattened text of the bag's title property, or empty when absent.
pub fn extract_title(properties: &PropertyBag) -> String {
    properties
        .values()
        .find_map(|p| match p.value() {
            Some(PropertyValue::Title { title }) => Some(plain_text(title)),
            _ => None,
        })
        .unwrap_or_default()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use kumiko_types::Block;
    use serde_json::json;

    fn fetched(v: serde_json::Value, children: Vec<FetchedBlock>) -> FetchedBlock {
        let block: Block = serde_json::from_value(v).unwrap();
        FetchedBlock { block, children }
    }

    fn para(id: &str) -> FetchedBlock {
        fetched(
            json!({
                "id": id,
                "type": "paragraph",
                "paragraph": { "rich_text": [{ "plain_text": id }] }
            }),
            Vec::new(),
        )
    }

    fn bag(v: serde_json::Value) -> PropertyBag {
        serde_json::from_value(v).unwrap()
    }

    // ── Tree filtering ──────────────────────────────────────────────────

    #[test]
    fn test_non_clonable_sibling_dropped_and_recorded_once() {
        let tree = vec![
            para("a"),
            fetched(
                json!({ "id": "db", "type": "child_database", "child_database": { "title": "T" } }),
                Vec::new(),
            ),
            para("b"),
            fetched(
                json!({ "id": "db2", "type": "child_database", "child_database": { "title": "U" } }),
                Vec::new(),
            ),
        ];
        let out = sanitize_tree(&tree);
        assert_eq!(out.blocks.len(), 2);
        assert_eq!(out.skipped_kinds, ["child_database"], "deduplicated");
    }

    #[test]
    fn test_nested_non_clonable_dropped() {
        let tree = vec![fetched(
            json!({
                "id": "t",
                "has_children": true,
                "type": "toggle",
                "toggle": { "rich_text": [{ "plain_text": "outer" }] }
            }),
            vec![
                para("inner"),
                fetched(
                    json!({ "id": "s", "type": "synced_block", "synced_block": {} }),
                    Vec::new(),
                ),
            ],
        )];
        let out = sanitize_tree(&tree);
        assert_eq!(out.blocks.len(), 1);
        assert_eq!(out.blocks[0].children.len(), 1, "synced block removed");
        assert_eq!(out.skipped_kinds, ["synced_block"]);
    }

    #[test]
    fn test_skip_order_is_first_occurrence() {
        let tree = vec![
            fetched(json!({ "id": "1", "type": "child_page", "child_page": {} }), vec![]),
            fetched(json!({ "id": "2", "type": "synced_block", "synced_block": {} }), vec![]),
            fetched(json!({ "id": "3", "type": "child_page", "child_page": {} }), vec![]),
        ];
        let out = sanitize_tree(&tree);
        assert_eq!(out.skipped_kinds, ["child_page", "synced_block"]);
    }

    #[test]
    fn test_unknown_kind_dropped_silently() {
        let tree = vec![
            para("a"),
            fetched(json!({ "id": "x", "type": "holo_deck", "holo_deck": {} }), vec![]),
        ];
        let out = sanitize_tree(&tree);
        assert_eq!(out.blocks.len(), 1);
        assert!(out.skipped_kinds.is_empty(), "no payload ⇒ silent omission");
    }

    #[test]
    fn test_retained_block_loses_store_metadata() {
        let tree = vec![fetched(
            json!({
                "id": "keep",
                "has_children": false,
                "created_time": "2024-01-01T00:00:00.000Z",
                "type": "quote",
                "quote": { "rich_text": [{ "plain_text": "q" }] }
            }),
            Vec::new(),
        )];
        let out = sanitize_tree(&tree);
        let v = serde_json::to_value(&out.blocks[0]).unwrap();
        assert_eq!(v["type"], "quote");
        assert!(v.get("id").is_none());
        assert!(v.get("created_time").is_none());
        assert!(v.get("has_children").is_none());
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let tree = vec![
            fetched(
                json!({
                    "id": "t",
                    "has_children": true,
                    "type": "toggle",
                    "toggle": { "rich_text": [{ "plain_text": "outer" }] }
                }),
                vec![
                    para("p1"),
                    fetched(json!({ "id": "cp", "type": "child_page", "child_page": {} }), vec![]),
                ],
            ),
            para("p2"),
        ];
        let first = sanitize_tree(&tree);

        // Re-wrap the sanitized output as a fetched tree and run again.
        fn rewrap(blocks: &[NewBlock]) -> Vec<FetchedBlock> {
            blocks
                .iter()
                .map(|nb| FetchedBlock {
                    block: Block {
                        id: String::new(),
                        has_children: !nb.children.is_empty(),
                        created_time: None,
                        last_edited_time: None,
                        payload: nb.payload.clone(),
                    },
                    children: rewrap(&nb.children),
                })
                .collect()
        }
        let second = sanitize_tree(&rewrap(&first.blocks));

        assert!(second.skipped_kinds.is_empty());
        assert_eq!(
            serde_json::to_value(&second.blocks).unwrap(),
            serde_json::to_value(&first.blocks).unwrap(),
        );
    }

    // ── Property filtering ──────────────────────────────────────────────

    #[test]
    fn test_property_whitelist() {
        let input = bag(json!({
            "Name": { "type": "title", "title": [{ "plain_text": "T" }] },
            "Done": { "type": "checkbox", "checkbox": true },
            "Score": { "type": "formula", "formula": { "type": "number", "number": 1 } },
            "Created": { "type": "created_time", "created_time": "2024-01-01T00:00:00.000Z" },
            "Key": { "type": "unique_id", "unique_id": { "number": 1 } },
            "Strange": { "type": "button", "button": {} }
        }));
        let out = sanitize_properties(&input);
        let keys: Vec<&str> = out.keys().map(String::as_str).collect();
        assert_eq!(keys, ["Name", "Done"]);
    }

    #[test]
    fn test_override_title_replaces_single_run() {
        let mut props = bag(json!({
            "Name": { "type": "title", "title": [
                { "plain_text": "Old " }, { "plain_text": "Title" }
            ]},
            "Done": { "type": "checkbox", "checkbox": false }
        }));
        override_title(&mut props, "New Title");
        assert_eq!(extract_title(&props), "New Title");
        match props["Name"].value() {
            Some(PropertyValue::Title { title }) => assert_eq!(title.len(), 1),
            other => panic!("wrong value: {other:?}"),
        }
    }

    #[test]
    fn test_override_without_title_is_noop() {
        let mut props = bag(json!({
            "Done": { "type": "checkbox", "checkbox": false }
        }));
        let before = serde_json::to_value(&props).unwrap();
        override_title(&mut props, "ignored");
        assert_eq!(serde_json::to_value(&props).unwrap(), before);
    }

    #[test]
    fn test_extract_title_absent_is_empty() {
        assert_eq!(extract_title(&PropertyBag::new()), "");
        let props = bag(json!({ "N": { "type": "number", "number": 1 } }));
        assert_eq!(extract_title(&props), "");
    }
}
