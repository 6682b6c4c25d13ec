//! Property values: the typed fields attached to pages (database rows).
//!
//! A [`PropertyBag`] maps display name → [`Property`] with insertion order
//! preserved (the store's display order). [`PropertyValue`] is the closed
//! sum over property kinds; [`Property`] wraps it with a raw-JSON fallback
//! so kinds this build does not know still render (as a structural dump)
//! and are never treated as writable.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::rich_text::RichTextRun;
use crate::block::FilePayload;

/// Ordered name → property mapping (insertion order is display order).
pub type PropertyBag = IndexMap<String, Property>;

/// A property value: either a kind we model, or raw JSON for anything else.
///
/// Untagged: the typed arm is tried first; property objects without a
/// recognised `type` tag (including write-shape inputs like
/// `{"title": [...]}` with no tag at all) fall through to `Other` and pass
/// through serialization verbatim.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Property {
    Typed(TypedProperty),
    Other(Value),
}

impl Property {
    /// The typed value, if this property parsed as a known kind.
    pub fn value(&self) -> Option<&PropertyValue> {
        match self {
            Property::Typed(t) => Some(&t.value),
            Property::Other(_) => None,
        }
    }

    /// Whether the write API accepts this property kind on page creation.
    /// Unknown kinds are never writable.
    pub fn is_writable(&self) -> bool {
        self.value().is_some_and(PropertyValue::is_writable)
    }
}

/// A known property: store-assigned property id plus the tagged value.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TypedProperty {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub value: PropertyValue,
}

/// The property-kind sum type, tagged by the wire `type` field.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropertyValue {
    Title {
        title: Vec<RichTextRun>,
    },
    RichText {
        rich_text: Vec<RichTextRun>,
    },
    Number {
        number: Option<f64>,
    },
    Select {
        select: Option<SelectOption>,
    },
    MultiSelect {
        multi_select: Vec<SelectOption>,
    },
    Date {
        date: Option<DateRange>,
    },
    People {
        people: Vec<UserRef>,
    },
    Files {
        files: Vec<FilePayload>,
    },
    Checkbox {
        checkbox: bool,
    },
    Url {
        url: Option<String>,
    },
    Email {
        email: Option<String>,
    },
    PhoneNumber {
        phone_number: Option<String>,
    },
    Formula {
        formula: FormulaValue,
    },
    Relation {
        relation: Vec<RelationRef>,
    },
    Rollup {
        rollup: RollupValue,
    },
    Status {
        status: Option<SelectOption>,
    },
    CreatedTime {
        created_time: String,
    },
    CreatedBy {
        created_by: UserRef,
    },
    LastEditedTime {
        last_edited_time: String,
    },
    LastEditedBy {
        last_edited_by: UserRef,
    },
    UniqueId {
        unique_id: UniqueId,
    },
}

impl PropertyValue {
    /// The wire name of this kind.
    pub fn kind_name(&self) -> &'static str {
        match self {
            PropertyValue::Title { .. } => "title",
            PropertyValue::RichText { .. } => "rich_text",
            PropertyValue::Number { .. } => "number",
            PropertyValue::Select { .. } => "select",
            PropertyValue::MultiSelect { .. } => "multi_select",
            PropertyValue::Date { .. } => "date",
            PropertyValue::People { .. } => "people",
            PropertyValue::Files { .. } => "files",
            PropertyValue::Checkbox { .. } => "checkbox",
            PropertyValue::Url { .. } => "url",
            PropertyValue::Email { .. } => "email",
            PropertyValue::PhoneNumber { .. } => "phone_number",
            PropertyValue::Formula { .. } => "formula",
            PropertyValue::Relation { .. } => "relation",
            PropertyValue::Rollup { .. } => "rollup",
            PropertyValue::Status { .. } => "status",
            PropertyValue::CreatedTime { .. } => "created_time",
            PropertyValue::CreatedBy { .. } => "created_by",
            PropertyValue::LastEditedTime { .. } => "last_edited_time",
            PropertyValue::LastEditedBy { .. } => "last_edited_by",
            PropertyValue::UniqueId { .. } => "unique_id",
        }
    }

    /// Whether the write API accepts this kind on page creation. Computed
    /// kinds (formula, rollup, timestamps, authorship, unique id) are
    /// read-only.
    pub fn is_writable(&self) -> bool {
        matches!(
            self,
            PropertyValue::Title { .. }
                | PropertyValue::RichText { .. }
                | PropertyValue::Number { .. }
                | PropertyValue::Select { .. }
                | PropertyValue::MultiSelect { .. }
                | PropertyValue::Date { .. }
                | PropertyValue::People { .. }
                | PropertyValue::Files { .. }
                | PropertyValue::Checkbox { .. }
                | PropertyValue::Url { .. }
                | PropertyValue::Email { .. }
                | PropertyValue::PhoneNumber { .. }
                | PropertyValue::Relation { .. }
                | PropertyValue::Status { .. }
        )
    }
}

// ============================================================================
// Nested unions and leaf structs
// ============================================================================

/// Computed formula result: one of four result kinds.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FormulaValue {
    String {
        #[serde(default)]
        string: Option<String>,
    },
    Number {
        #[serde(default)]
        number: Option<f64>,
    },
    Boolean {
        #[serde(default)]
        boolean: Option<bool>,
    },
    Date {
        #[serde(default)]
        date: Option<DateRange>,
    },
    #[serde(other)]
    Other,
}

/// Rollup aggregation result. The `array` kind nests full property values.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RollupValue {
    Number {
        #[serde(default)]
        number: Option<f64>,
    },
    Date {
        #[serde(default)]
        date: Option<DateRange>,
    },
    Array {
        #[serde(default)]
        array: Vec<Property>,
    },
    #[serde(other)]
    Other,
}

/// A select / multi-select / status option.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SelectOption {
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A date value: a start, and an end when it is a range.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A user reference inside a property (people, created_by, …). Either side
/// may be missing depending on integration capabilities.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UserRef {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A related-item reference.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RelationRef {
    #[serde(default)]
    pub id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A unique-id value: an optional prefix plus a number.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UniqueId {
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub number: Option<i64>,
}

// ============================================================================
// Tests
// ============================================================================
