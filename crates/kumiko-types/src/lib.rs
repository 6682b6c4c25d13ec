//! Shared wire types for Kumiko.
//!
//! This crate models the Notion API's JSON shapes: blocks, property values,
//! pages, databases, users, comments, and pagination envelopes. It has **no
//! internal kumiko dependencies** — a pure leaf crate that the client, the
//! engine, and the MCP server all build on.
//!
//! # Shape conventions
//!
//! The remote API keys every polymorphic object by a `type` field, with the
//! kind-specific payload under a key of the same name:
//!
//! ```text
//! { "type": "paragraph", "paragraph": { "rich_text": [...] }, ... }
//! { "type": "select",    "select":    { "name": "Done" },     ... }
//! ```
//!
//! Both [`BlockPayload`] and [`PropertyValue`] model this as internally
//! tagged enums, so dispatch is an exhaustive `match`. Payload structs carry
//! a flattened `extra` map: fields Kumiko does not read (annotations,
//! colors, …) survive a fetch → resubmit round trip untouched.
//!
//! # Read shape vs. write shape
//!
//! [`Block`] is what the store returns: payload plus store-assigned metadata
//! (id, timestamps, child flag). [`NewBlock`] is what the store accepts:
//! payload plus optional nested children, and *nothing else* — the metadata
//! fields do not exist on it, so they cannot leak into a create request.

pub mod block;
pub mod page;
pub mod property;
pub mod rich_text;

pub use block::{
    Block, BlockPayload, BookmarkPayload, CalloutPayload, ChildRefPayload, CodePayload,
    EmbedPayload, EquationPayload, FilePayload, Icon, NewBlock, TableRowPayload, TextPayload,
    TodoPayload, UrlRef,
};
pub use page::{Bot, BotOwner, Comment, Database, Page, Paginated, ParentKind, Person, SearchResult, User};
pub use property::{
    DateRange, FormulaValue, Property, PropertyBag, PropertyValue, RelationRef, RollupValue,
    SelectOption, TypedProperty, UniqueId, UserRef,
};
pub use rich_text::{RichTextRun, plain_text};
