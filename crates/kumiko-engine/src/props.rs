//! Property rendering: one display string per property value.
//!
//! Used standalone when listing or querying pages, and by the tools that
//! echo a page's properties back. Like the block renderer this never fails:
//! unknown kinds render as a structural JSON dump — a diagnostic, not a
//! round-trippable encoding.

use indexmap::IndexMap;

use kumiko_types::{
    DateRange, FormulaValue, Property, PropertyBag, PropertyValue, RollupValue, UserRef,
    plain_text,
};

/// Render every property of a bag, preserving key order. Consumers usually
/// skip keys whose rendered value is empty.
pub fn render_property_bag(bag: &PropertyBag) -> IndexMap<String, String> {
    bag.iter()
        .map(|(name, property)| (name.clone(), render_property(property)))
        .collect()
}

/// Render one property value to its display string.
pub fn render_property(property: &Property) -> String {
    match property {
        Property::Typed(typed) => render_value(&typed.value),
        Property::Other(raw) => serde_json::to_string(raw).unwrap_or_default(),
    }
}

fn render_value(value: &PropertyValue) -> String {
    match value {
        PropertyValue::Title { title } => plain_text(title),
        PropertyValue::RichText { rich_text } => plain_text(rich_text),
        PropertyValue::Number { number } => render_number(*number),
        PropertyValue::Select { select } => {
            select.as_ref().map(|o| o.name.clone()).unwrap_or_default()
        }
        PropertyValue::MultiSelect { multi_select } => multi_select
            .iter()
            .map(|o| o.name.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        PropertyValue::Date { date } => date.as_ref().map(render_date).unwrap_or_default(),
        PropertyValue::People { people } => people
            .iter()
            .filter_map(user_label)
            .collect::<Vec<_>>()
            .join(", "),
        PropertyValue::Files { files } => files
            .iter()
            .map(|f| f.url())
            .filter(|u| !u.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        PropertyValue::Checkbox { checkbox } => {
            if *checkbox { "Yes" } else { "No" }.to_string()
        }
        PropertyValue::Url { url } => url.clone().unwrap_or_default(),
        PropertyValue::Email { email } => email.clone().unwrap_or_default(),
        PropertyValue::PhoneNumber { phone_number } => phone_number.clone().unwrap_or_default(),
        PropertyValue::Formula { formula } => render_formula(formula),
        PropertyValue::Relation { relation } => relation
            .iter()
            .map(|r| r.id.as_str())
            .filter(|id| !id.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        PropertyValue::Rollup { rollup } => render_rollup(rollup),
        PropertyValue::Status { status } => {
            status.as_ref().map(|o| o.name.clone()).unwrap_or_default()
        }
        PropertyValue::CreatedTime { created_time } => created_time.clone(),
        PropertyValue::CreatedBy { created_by } => {
            user_label(created_by).unwrap_or_default()
        }
        PropertyValue::LastEditedTime { last_edited_time } => last_edited_time.clone(),
        PropertyValue::LastEditedBy { last_edited_by } => {
            user_label(last_edited_by).unwrap_or_default()
        }
        PropertyValue::UniqueId { unique_id } => {
            let number = unique_id.number.map(|n| n.to_string()).unwrap_or_default();
            match &unique_id.prefix {
                Some(prefix) => format!("{prefix}-{number}"),
                None => number,
            }
        }
    }
}

fn render_formula(formula: &FormulaValue) -> String {
    match formula {
        FormulaValue::String { string } => string.clone().unwrap_or_default(),
        FormulaValue::Number { number } => render_number(*number),
        FormulaValue::Boolean { boolean } => {
            if boolean.unwrap_or(false) { "true" } else { "false" }.to_string()
        }
        FormulaValue::Date { date } => date.as_ref().map(render_date).unwrap_or_default(),
        FormulaValue::Other => String::new(),
    }
}

fn render_rollup(rollup: &RollupValue) -> String {
    match rollup {
        RollupValue::Number { number } => render_number(*number),
        RollupValue::Date { date } => date.as_ref().map(render_date).unwrap_or_default(),
        RollupValue::Array { array } => array
            .iter()
            .map(render_property)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        RollupValue::Other => String::new(),
    }
}

fn render_number(n: Option<f64>) -> String {
    n.map(|n| n.to_string()).unwrap_or_default()
}

fn render_date(d: &DateRange) -> String {
    let start = d.start.clone().unwrap_or_default();
    match &d.end {
        Some(end) => format!("{start} ~ {end}"),
        None => start,
    }
}

/// Display name falling back to identity; `None` when the entry has neither.
fn user_label(user: &UserRef) -> Option<String> {
    user.name
        .clone()
        .or_else(|| user.id.clone())
        .filter(|s| !s.is_empty())
}

// ============================================================================
// Tests
// ============================================================================
