//! Page, database, user, and comment objects, plus the pagination envelope.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::str::FromStr;
use strum::EnumString;

use crate::property::{PropertyBag, UserRef};
use crate::rich_text::RichTextRun;

/// A page as retrieved from the store.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_edited_time: Option<String>,
    #[serde(default)]
    pub archived: bool,
    /// Parent reference, kept opaque: `{"type": "page_id", "page_id": ...}`
    /// and friends. Passed back verbatim when replicating.
    #[serde(default)]
    pub parent: Value,
    #[serde(default)]
    pub properties: PropertyBag,
}

/// A database as retrieved from the store. Its `properties` are a *schema*
/// (name → property definition), not values, so they stay raw.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Database {
    pub id: String,
    #[serde(default)]
    pub title: Vec<RichTextRun>,
    #[serde(default)]
    pub description: Vec<RichTextRun>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_edited_time: Option<String>,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

/// One entry from the workspace search endpoint. Pages carry `properties`,
/// databases carry a top-level `title`; both are optional here and the
/// formatter picks by `object`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub object: String,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_edited_time: Option<String>,
    #[serde(default)]
    pub properties: PropertyBag,
    #[serde(default)]
    pub title: Vec<RichTextRun>,
}

/// A workspace user (person or bot).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person: Option<Person>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot: Option<Bot>,
}

/// Person-specific user fields.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Person {
    #[serde(default)]
    pub email: Option<String>,
}

/// Bot-specific user fields.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Bot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<BotOwner>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Who owns a bot integration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BotOwner {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A comment on a page or block.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discussion_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<UserRef>,
    #[serde(default)]
    pub rich_text: Vec<RichTextRun>,
}

/// One page of a listing response. Cursor in ⇒ cursor out: when `has_more`
/// is set, `next_cursor` is what the caller passes to get the next page.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Paginated<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// Which kind of object a new page (or moved page) hangs under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(ascii_case_insensitive)]
pub enum ParentKind {
    #[strum(serialize = "page_id", serialize = "page")]
    PageId,
    #[strum(serialize = "database_id", serialize = "database")]
    DatabaseId,
}

impl ParentKind {
    /// Parse from string (case-insensitive; accepts "page"/"database" too).
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        <Self as FromStr>::from_str(s).ok()
    }

    /// Convert to the wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParentKind::PageId => "page_id",
            ParentKind::DatabaseId => "database_id",
        }
    }

    /// Build the parent reference object the write API expects.
    pub fn parent_ref(&self, id: &str) -> Value {
        json!({ "type": self.as_str(), self.as_str(): id })
    }
}

impl std::fmt::Display for ParentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_page_parse_minimal() {
        let page: Page = serde_json::from_value(json!({
            "object": "page",
            "id": "p1",
            "url": "https://notion.so/p1",
            "parent": { "type": "page_id", "page_id": "root" },
            "properties": {
                "Name": { "type": "title", "title": [{ "plain_text": "Doc" }] }
            }
        }))
        .unwrap();
        assert_eq!(page.id, "p1");
        assert!(!page.archived);
        assert_eq!(page.parent["page_id"], "root");
        assert_eq!(page.properties.len(), 1);
    }

    #[test]
    fn test_paginated_defaults() {
        let page: Paginated<Page> = serde_json::from_value(json!({ "results": [] })).unwrap();
        assert!(page.results.is_empty());
        assert!(!page.has_more);
        assert!(page.next_cursor.is_none());
    }

    #[test]
    fn test_parent_kind_parse_and_ref() {
        assert_eq!(ParentKind::from_str("page_id"), Some(ParentKind::PageId));
        assert_eq!(ParentKind::from_str("DATABASE_ID"), Some(ParentKind::DatabaseId));
        assert_eq!(ParentKind::from_str("page"), Some(ParentKind::PageId));
        assert_eq!(ParentKind::from_str("workspace"), None);

        let parent = ParentKind::DatabaseId.parent_ref("db1");
        assert_eq!(parent["type"], "database_id");
        assert_eq!(parent["database_id"], "db1");
    }

    #[test]
    fn test_user_person_and_bot() {
        let person: User = serde_json::from_value(json!({
            "id": "u1", "name": "Aki", "type": "person",
            "person": { "email": "aki@example.com" }
        }))
        .unwrap();
        assert_eq!(person.person.unwrap().email.as_deref(), Some("aki@example.com"));

        let bot: User = serde_json::from_value(json!({
            "id": "u2", "name": "Integration", "type": "bot",
            "bot": { "owner": { "type": "workspace" }, "workspace_name": "Acme" }
        }))
        .unwrap();
        let b = bot.bot.unwrap();
        assert_eq!(b.owner.unwrap().kind.as_deref(), Some("workspace"));
        assert_eq!(b.workspace_name.as_deref(), Some("Acme"));
    }
}
