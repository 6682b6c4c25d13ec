//! Block rendering: a flat, pre-order block sequence → one text document.
//!
//! The renderer never fails. Kinds it does not recognize degrade to an
//! `[unsupported block]` marker instead of erroring, and the output is
//! normalized so no run of blank lines survives and the document has no
//! leading or trailing blanks.

use kumiko_types::{Block, BlockPayload, plain_text};

/// Marker emitted for kinds the renderer cannot display.
const UNSUPPORTED_MARKER: &str = "[unsupported block]";

/// Render a flattened block sequence (each block followed by its
/// descendants, pre-order) into markdown-ish text.
///
/// Numbered list items carry a counter local to their contiguous run: any
/// block of another kind resets it, so two numbered runs separated by
/// anything else both restart at 1.
pub fn render_blocks<'a, I>(blocks: I) -> String
where
    I: IntoIterator<Item = &'a Block>,
{
    let mut lines: Vec<String> = Vec::new();
    let mut numbered_counter = 0u32;

    for block in blocks {
        if !matches!(block.payload, BlockPayload::NumberedListItem { .. }) {
            numbered_counter = 0;
        }

        match &block.payload {
            BlockPayload::Paragraph { paragraph } => {
                lines.push(plain_text(&paragraph.rich_text));
                lines.push(String::new());
            }
            BlockPayload::Heading1 { heading_1 } => {
                lines.push(format!("# {}", plain_text(&heading_1.rich_text)));
                lines.push(String::new());
            }
            BlockPayload::Heading2 { heading_2 } => {
                lines.push(format!("## {}", plain_text(&heading_2.rich_text)));
                lines.push(String::new());
            }
            BlockPayload::Heading3 { heading_3 } => {
                lines.push(format!("### {}", plain_text(&heading_3.rich_text)));
                lines.push(String::new());
            }
            BlockPayload::BulletedListItem { bulleted_list_item } => {
                lines.push(format!("- {}", plain_text(&bulleted_list_item.rich_text)));
            }
            BlockPayload::NumberedListItem { numbered_list_item } => {
                numbered_counter += 1;
                lines.push(format!(
                    "{}. {}",
                    numbered_counter,
                    plain_text(&numbered_list_item.rich_text)
                ));
            }
            BlockPayload::ToDo { to_do } => {
                let mark = if to_do.checked { 'x' } else { ' ' };
                lines.push(format!("- [{}] {}", mark, plain_text(&to_do.rich_text)));
            }
            BlockPayload::Toggle { toggle } => {
                lines.push(format!("> {}", plain_text(&toggle.rich_text)));
                if block.has_children {
                    lines.push("> *(has children)*".to_string());
                }
                lines.push(String::new());
            }
            BlockPayload::Code { code } => {
                lines.push(format!("```{}", code.language));
                lines.push(plain_text(&code.rich_text));
                lines.push("```".to_string());
                lines.push(String::new());
            }
            BlockPayload::Quote { quote } => {
                lines.push(format!("> {}", plain_text(&quote.rich_text)));
                lines.push(String::new());
            }
            BlockPayload::Callout { callout } => {
                let text = plain_text(&callout.rich_text);
                let emoji = callout
                    .icon
                    .as_ref()
                    .and_then(|i| i.emoji.as_deref())
                    .unwrap_or("");
                if emoji.is_empty() {
                    lines.push(format!("> {text}"));
                } else {
                    lines.push(format!("> {emoji} {text}"));
                }
                lines.push(String::new());
            }
            BlockPayload::Divider { .. } => {
                lines.push("---".to_string());
                lines.push(String::new());
            }
            BlockPayload::Image { image } => {
                let caption = plain_text(&image.caption);
                let alt = if caption.is_empty() {
                    "image"
                } else {
                    caption.as_str()
                };
                lines.push(format!("![{}]({})", alt, image.url()));
                lines.push(String::new());
            }
            BlockPayload::Video { video } => {
                lines.push(format!("[video]({})", video.url()));
                lines.push(String::new());
            }
            BlockPayload::File { file } => {
                lines.push(format!("[file]({})", file.url()));
                lines.push(String::new());
            }
            BlockPayload::Pdf { pdf } => {
                lines.push(format!("[pdf]({})", pdf.url()));
                lines.push(String::new());
            }
            BlockPayload::Bookmark { bookmark } => {
                let caption = plain_text(&bookmark.caption);
                let label = if caption.is_empty() {
                    "bookmark"
                } else {
                    caption.as_str()
                };
                lines.push(format!("[{}]({})", label, bookmark.url));
                lines.push(String::new());
            }
            BlockPayload::Embed { embed } => {
                lines.push(format!("[embed]({})", embed.url));
                lines.push(String::new());
            }
            BlockPayload::LinkPreview { link_preview } => {
                lines.push(format!("[link]({})", link_preview.url));
                lines.push(String::new());
            }
            BlockPayload::Table { .. } => {
                // Rows arrive as separate table_row blocks right after this.
                lines.push(String::new());
            }
            BlockPayload::TableRow { table_row } => {
                let cells: Vec<String> = table_row
                    .cells
                    .iter()
                    .map(|cell| plain_text(cell))
                    .collect();
                lines.push(format!("| {} |", cells.join(" | ")));
            }
            BlockPayload::ChildPage { child_page } => {
                let title = if child_page.title.is_empty() {
                    "Untitled"
                } else {
                    child_page.title.as_str()
                };
                lines.push(format!("📄 Page: {title}"));
                lines.push(String::new());
            }
            BlockPayload::ChildDatabase { child_database } => {
                let title = if child_database.title.is_empty() {
                    "Untitled"
                } else {
                    child_database.title.as_str()
                };
                lines.push(format!("📊 Database: {title}"));
                lines.push(String::new());
            }
            BlockPayload::SyncedBlock { .. } => {
                if block.has_children {
                    lines.push("*(synced block with children)*".to_string());
                }
            }
            BlockPayload::Column { .. } | BlockPayload::ColumnList { .. } => {
                if block.has_children {
                    lines.push(String::new());
                }
            }
            BlockPayload::Equation { equation } => {
                lines.push(format!("${}$", equation.expression));
                lines.push(String::new());
            }
            BlockPayload::TableOfContents { .. } => {
                lines.push("[TOC]".to_string());
                lines.push(String::new());
            }
            BlockPayload::Breadcrumb { .. } => {}
            BlockPayload::Unsupported { .. }
            | BlockPayload::Template { .. }
            | BlockPayload::LinkToPage { .. }
            | BlockPayload::Other => {
                lines.push(UNSUPPORTED_MARKER.to_string());
                lines.push(String::new());
            }
        }
    }

    normalize_blank_lines(&lines.join("\n"))
}

/// Collapse runs of blank lines to a single blank line and trim blank lines
/// from both ends of the document.
fn normalize_blank_lines(text: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    for line in text.split('\n') {
        if line.is_empty() && out.last().is_some_and(|l| l.is_empty()) {
            continue;
        }
        out.push(line);
    }
    while out.first().is_some_and(|l| l.is_empty()) {
        out.remove(0);
    }
    while out.last().is_some_and(|l| l.is_empty()) {
        out.pop();
    }
    out.join("\n")
}

// ============================================================================
// Tests
// ============================================================================
