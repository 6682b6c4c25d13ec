//! Content tree replication and rendering engine.
//!
//! Everything with actual algorithmic structure lives here, behind the
//! [`PageStore`](kumiko_client::PageStore) seam:
//!
//! - `render`: flat block sequence → markdown-ish text (one dispatch arm
//!   per block kind, numbered-list counting, blank-line normalization)
//! - `props`: property value → display string (per-kind dispatch with
//!   recursion through formulas and rollups)
//! - `fetch`: paginated, depth-bounded retrieval of a block's descendant
//!   tree, plus pre-order flattening for the renderer
//! - `sanitize`: classify/filter fetched trees into the write API's input
//!   shape; property whitelisting and title rewriting
//! - `replicate`: rebuild a sanitized tree at a destination under the
//!   per-request batch ceiling, appending overflow in chunks
//!
//! Read path: `fetch` → `flatten` → `render` (+ `props`).
//! Clone path: `fetch` → `sanitize` → `replicate`.
//!
//! All remote work is strictly sequential — each pagination cursor and each
//! batch chunk depends on the call before it — and store errors propagate
//! unmodified; this layer never retries.

pub mod fetch;
pub mod props;
pub mod render;
pub mod replicate;
pub mod sanitize;

pub use fetch::{FetchedBlock, fetch_block_tree, flatten_tree};
pub use props::{render_property, render_property_bag};
pub use render::render_blocks;
pub use replicate::{
    DEFAULT_CLONE_DEPTH, RebuildOutcome, Replication, rebuild_page, replicate_page,
};
pub use sanitize::{
    SanitizedTree, extract_title, override_title, sanitize_properties, sanitize_tree,
};
