//! Rich text runs and the plain-text flattener.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// One styled text run.
///
/// The store precomputes `plain_text` for every run; styling, mentions, and
/// hrefs live in `extra` and are carried along verbatim so a run can be
/// resubmitted without losing its annotations.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RichTextRun {
    /// Plain-text projection of this run (empty if the store omitted it).
    #[serde(default)]
    pub plain_text: String,
    /// Everything else: `type`, `text`/`mention`/`equation`, `annotations`, `href`.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RichTextRun {
    /// Build a plain text run in the shape the write API accepts:
    /// `{ "type": "text", "text": { "content": ... } }`.
    pub fn text(content: impl Into<String>) -> Self {
        let content = content.into();
        let mut extra = Map::new();
        extra.insert("type".into(), json!("text"));
        extra.insert("text".into(), json!({ "content": content }));
        Self {
            plain_text: content,
            extra,
        }
    }
}

/// Concatenate the plain-text projections of a run sequence, in order.
///
/// An empty slice yields the empty string. Styling is ignored; every
/// renderer in the engine goes through this.
pub fn plain_text(runs: &[RichTextRun]) -> String {
    runs.iter().map(|r| r.plain_text.as_str()).collect()
}
