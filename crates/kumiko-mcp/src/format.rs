//! Result-list and object formatting for tool output.

use kumiko_engine::{extract_title, render_property_bag};
use kumiko_types::{Comment, Page, Paginated, PropertyBag, SearchResult, User, plain_text};

/// Title of a page bag: the title-kind property first, then a key literally
/// named "Name" or "Title".
fn page_title(properties: &PropertyBag) -> String {
    let title = extract_title(properties);
    if !title.is_empty() {
        return title;
    }
    let rendered = render_property_bag(properties);
    rendered
        .get("Name")
        .or_else(|| rendered.get("Title"))
        .cloned()
        .unwrap_or_default()
}

/// Format a database query result page.
pub fn format_query_results(response: &Paginated<Page>) -> String {
    let mut lines: Vec<String> = Vec::new();
    let showing = response.results.len();
    lines.push(format!(
        "## Query Results ({showing} total, showing 1-{showing})"
    ));
    lines.push(String::new());

    for (i, page) in response.results.iter().enumerate() {
        let title = page_title(&page.properties);
        let title = if title.is_empty() {
            "Untitled".to_string()
        } else {
            title
        };
        lines.push(format!("### {}. {}", i + 1, title));
        for (key, value) in render_property_bag(&page.properties) {
            if !value.is_empty() {
                lines.push(format!("- {key}: {value}"));
            }
        }
        lines.push(format!("  ID: {}", page.id));
        lines.push(String::new());
    }

    if response.has_more {
        lines.push(format!(
            "*More results available. Next cursor: {}*",
            response.next_cursor.as_deref().unwrap_or("")
        ));
    }

    lines.join("\n").trim().to_string()
}

/// Format a workspace search result page.
pub fn format_search_results(response: &Paginated<SearchResult>) -> String {
    let mut lines: Vec<String> = Vec::new();
    lines.push(format!(
        "## Search Results ({} found)",
        response.results.len()
    ));
    lines.push(String::new());

    for (i, item) in response.results.iter().enumerate() {
        let title = match item.object.as_str() {
            "page" => page_title(&item.properties),
            "database" => plain_text(&item.title),
            _ => String::new(),
        };
        let title = if title.is_empty() {
            "Untitled".to_string()
        } else {
            title
        };
        lines.push(format!("{}. **{}** ({})", i + 1, title, item.object));
        lines.push(format!(
            "   Last edited: {} | ID: {}",
            item.last_edited_time.as_deref().unwrap_or(""),
            item.id
        ));
        lines.push(String::new());
    }

    if response.has_more {
        lines.push(format!(
            "*More results available. Next cursor: {}*",
            response.next_cursor.as_deref().unwrap_or("")
        ));
    }

    lines.join("\n").trim().to_string()
}

/// Format one user as detail lines.
pub fn format_user(user: &User) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(format!(
        "- Name: {}",
        user.name.as_deref().unwrap_or("(unnamed)")
    ));
    lines.push(format!(
        "- Type: {}",
        user.kind.as_deref().unwrap_or("unknown")
    ));
    lines.push(format!("- ID: {}", user.id));

    if let Some(person) = &user.person {
        if let Some(email) = person.email.as_deref().filter(|e| !e.is_empty()) {
            lines.push(format!("- Email: {email}"));
        }
    }
    if let Some(bot) = &user.bot {
        if let Some(kind) = bot.owner.as_ref().and_then(|o| o.kind.as_deref()) {
            lines.push(format!("- Bot owner type: {kind}"));
        }
        if let Some(workspace) = bot.workspace_name.as_deref() {
            lines.push(format!("- Workspace: {workspace}"));
        }
    }
    if let Some(avatar) = user.avatar_url.as_deref().filter(|a| !a.is_empty()) {
        lines.push(format!("- Avatar: {avatar}"));
    }
    lines
}

/// Format one comment as detail lines under a numbered header.
pub fn format_comment(index: usize, comment: &Comment) -> Vec<String> {
    let author = comment
        .created_by
        .as_ref()
        .and_then(|u| u.name.clone().or_else(|| u.id.clone()))
        .unwrap_or_else(|| "(unknown)".to_string());

    let mut lines = Vec::new();
    lines.push(format!("### {}. {}", index + 1, author));
    lines.push(format!(
        "- Time: {}",
        comment.created_time.as_deref().unwrap_or("")
    ));
    lines.push(format!("- Text: {}", plain_text(&comment.rich_text)));
    lines.push(format!("- ID: {}", comment.id));
    if let Some(discussion_id) = &comment.discussion_id {
        lines.push(format!("- Discussion ID: {discussion_id}"));
    }
    lines
}
