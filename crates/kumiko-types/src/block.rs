//! Block types: the content node taxonomy.
//!
//! [`BlockPayload`] is the closed sum over block kinds, tagged by the wire
//! `type` field. [`Block`] is the read shape (payload + store metadata);
//! [`NewBlock`] is the write shape (payload + nested children, no metadata).
//!
//! Kinds the store may invent later land in [`BlockPayload::Other`]: they
//! render as unsupported and are never submitted for creation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::rich_text::RichTextRun;

// ============================================================================
// Payload structs
// ============================================================================

/// Payload of every plain rich-text block: paragraph, headings, list items,
/// quote, toggle, template.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TextPayload {
    #[serde(default)]
    pub rich_text: Vec<RichTextRun>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// To-do payload: rich text plus the checked flag.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TodoPayload {
    #[serde(default)]
    pub rich_text: Vec<RichTextRun>,
    #[serde(default)]
    pub checked: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Code payload: rich text plus a language tag (empty tag allowed).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CodePayload {
    #[serde(default)]
    pub rich_text: Vec<RichTextRun>,
    #[serde(default)]
    pub language: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Callout payload: rich text plus an optional icon.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CalloutPayload {
    #[serde(default)]
    pub rich_text: Vec<RichTextRun>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<Icon>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Block or page icon. Only emoji icons are rendered; file icons pass
/// through in `extra`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Icon {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A URL holder inside a file object.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UrlRef {
    #[serde(default)]
    pub url: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// File-backed payload (image, video, file, pdf blocks and `files`
/// property entries). The sub-kind is `external` (caller-hosted URL) or
/// `file` (store-hosted, expiring URL); exactly one side is populated.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FilePayload {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub caption: Vec<RichTextRun>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external: Option<UrlRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<UrlRef>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FilePayload {
    /// Resolve the URL from whichever sub-kind is present.
    pub fn url(&self) -> &str {
        self.external
            .as_ref()
            .or(self.file.as_ref())
            .map(|r| r.url.as_str())
            .unwrap_or("")
    }
}

/// Bookmark payload: a URL plus an optional caption.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BookmarkPayload {
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub caption: Vec<RichTextRun>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Embed / link-preview payload: just a URL.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EmbedPayload {
    #[serde(default)]
    pub url: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Table-row payload: one rich-text run list per cell, in column order.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TableRowPayload {
    #[serde(default)]
    pub cells: Vec<Vec<RichTextRun>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Child page / child database reference payload: an opaque pointer with a
/// display title. Never recursed into.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ChildRefPayload {
    #[serde(default)]
    pub title: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Equation payload: a raw expression string.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EquationPayload {
    #[serde(default)]
    pub expression: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ============================================================================
// BlockPayload
// ============================================================================

/// The block-kind sum type, tagged by the wire `type` field.
///
/// Kinds whose payload the engine never reads field-by-field (divider,
/// columns, synced blocks, …) keep their payload as a raw [`Value`] so
/// clonable ones still round-trip. [`BlockPayload::Other`] absorbs kinds
/// this build does not know about.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockPayload {
    Paragraph {
        paragraph: TextPayload,
    },
    #[serde(rename = "heading_1")]
    Heading1 {
        heading_1: TextPayload,
    },
    #[serde(rename = "heading_2")]
    Heading2 {
        heading_2: TextPayload,
    },
    #[serde(rename = "heading_3")]
    Heading3 {
        heading_3: TextPayload,
    },
    BulletedListItem {
        bulleted_list_item: TextPayload,
    },
    NumberedListItem {
        numbered_list_item: TextPayload,
    },
    ToDo {
        to_do: TodoPayload,
    },
    Toggle {
        toggle: TextPayload,
    },
    Code {
        code: CodePayload,
    },
    Quote {
        quote: TextPayload,
    },
    Callout {
        callout: CalloutPayload,
    },
    Divider {
        #[serde(default)]
        divider: Value,
    },
    Image {
        image: FilePayload,
    },
    Video {
        video: FilePayload,
    },
    File {
        file: FilePayload,
    },
    Pdf {
        pdf: FilePayload,
    },
    Bookmark {
        bookmark: BookmarkPayload,
    },
    Embed {
        embed: EmbedPayload,
    },
    LinkPreview {
        link_preview: EmbedPayload,
    },
    Table {
        table: Value,
    },
    TableRow {
        table_row: TableRowPayload,
    },
    ChildPage {
        child_page: ChildRefPayload,
    },
    ChildDatabase {
        child_database: ChildRefPayload,
    },
    SyncedBlock {
        synced_block: Value,
    },
    Column {
        #[serde(default)]
        column: Value,
    },
    ColumnList {
        #[serde(default)]
        column_list: Value,
    },
    Template {
        template: Value,
    },
    LinkToPage {
        link_to_page: Value,
    },
    Equation {
        equation: EquationPayload,
    },
    TableOfContents {
        #[serde(default)]
        table_of_contents: Value,
    },
    Breadcrumb {
        #[serde(default)]
        breadcrumb: Value,
    },
    Unsupported {
        #[serde(default)]
        unsupported: Value,
    },
    /// A kind this build does not know. No payload is captured, so it can
    /// never be resubmitted — the sanitizer drops it, the renderer shows
    /// the unsupported marker.
    #[serde(other)]
    Other,
}

impl BlockPayload {
    /// The wire name of this kind ("paragraph", "heading_1", …).
    pub fn kind_name(&self) -> &'static str {
        match self {
            BlockPayload::Paragraph { .. } => "paragraph",
            BlockPayload::Heading1 { .. } => "heading_1",
            BlockPayload::Heading2 { .. } => "heading_2",
            BlockPayload::Heading3 { .. } => "heading_3",
            BlockPayload::BulletedListItem { .. } => "bulleted_list_item",
            BlockPayload::NumberedListItem { .. } => "numbered_list_item",
            BlockPayload::ToDo { .. } => "to_do",
            BlockPayload::Toggle { .. } => "toggle",
            BlockPayload::Code { .. } => "code",
            BlockPayload::Quote { .. } => "quote",
            BlockPayload::Callout { .. } => "callout",
            BlockPayload::Divider { .. } => "divider",
            BlockPayload::Image { .. } => "image",
            BlockPayload::Video { .. } => "video",
            BlockPayload::File { .. } => "file",
            BlockPayload::Pdf { .. } => "pdf",
            BlockPayload::Bookmark { .. } => "bookmark",
            BlockPayload::Embed { .. } => "embed",
            BlockPayload::LinkPreview { .. } => "link_preview",
            BlockPayload::Table { .. } => "table",
            BlockPayload::TableRow { .. } => "table_row",
            BlockPayload::ChildPage { .. } => "child_page",
            BlockPayload::ChildDatabase { .. } => "child_database",
            BlockPayload::SyncedBlock { .. } => "synced_block",
            BlockPayload::Column { .. } => "column",
            BlockPayload::ColumnList { .. } => "column_list",
            BlockPayload::Template { .. } => "template",
            BlockPayload::LinkToPage { .. } => "link_to_page",
            BlockPayload::Equation { .. } => "equation",
            BlockPayload::TableOfContents { .. } => "table_of_contents",
            BlockPayload::Breadcrumb { .. } => "breadcrumb",
            BlockPayload::Unsupported { .. } => "unsupported",
            BlockPayload::Other => "unknown",
        }
    }

    /// Whether the write API accepts this kind as input.
    ///
    /// Synced blocks, child page/database references, templates, and
    /// link-to-page pointers are server-managed and rejected on create;
    /// `Other` has no payload to submit.
    pub fn is_clonable(&self) -> bool {
        !matches!(
            self,
            BlockPayload::SyncedBlock { .. }
                | BlockPayload::ChildPage { .. }
                | BlockPayload::ChildDatabase { .. }
                | BlockPayload::Template { .. }
                | BlockPayload::LinkToPage { .. }
                | BlockPayload::Other
        )
    }
}

// ============================================================================
// Block (read shape) and NewBlock (write shape)
// ============================================================================

/// A block as retrieved from the store: payload plus store-assigned
/// metadata. The descendant list is *not* part of this shape — the fetcher
/// attaches it as a side structure.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Block {
    /// Store-assigned identity.
    pub id: String,
    /// Whether descendants exist (they arrive via a separate children call).
    #[serde(default)]
    pub has_children: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_edited_time: Option<String>,
    #[serde(flatten)]
    pub payload: BlockPayload,
}

/// A block in the shape the write API accepts: the kind tag, the payload,
/// and (optionally) nested children. Store-assigned metadata fields do not
/// exist on this type, so a create request cannot carry them.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewBlock {
    #[serde(flatten)]
    pub payload: BlockPayload,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NewBlock>,
}

impl NewBlock {
    /// A childless new block from a payload.
    pub fn new(payload: BlockPayload) -> Self {
        Self {
            payload,
            children: Vec::new(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
