//! Text formatting functions for `td`.
//!
//! Provides plain text (non-ANSI) formatting for terminal output:
//! - HTML descriptions rendered to plain text (`html2text`), or one line
//! - Width-aware truncation
//! - Task line formatting

use once_cell::sync::Lazy;
use regex::Regex;
use todolist_lib::Task;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Display columns given to the title in a task line.
pub const TITLE_WIDTH: usize = 40;
/// Display columns given to the description preview.
pub const PREVIEW_WIDTH: usize = 60;

const ELLIPSIS: char = '…';

/// Render width for one-line previews; wide enough that nothing wraps.
const PREVIEW_RENDER_WIDTH: usize = 1000;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Render a rich-text description as plain text wrapped at `width` columns.
///
/// Entities are decoded and `<style>`/`<script>` bodies dropped. If the
/// markup cannot be rendered the description is returned as stored.
#[must_use]
pub fn html_to_plain(html: &str, width: usize) -> String {
    match html2text::from_read(html.as_bytes(), width) {
        Ok(text) => text.trim_end().to_string(),
        Err(e) => {
            tracing::debug!(error = %e, "Could not render description markup");
            html.to_string()
        }
    }
}

/// Flatten a rich-text description to a single line of text.
#[must_use]
pub fn html_to_text(html: &str) -> String {
    let plain = html_to_plain(html, PREVIEW_RENDER_WIDTH);
    WHITESPACE.replace_all(plain.trim(), " ").into_owned()
}

/// Cut `text` to at most `width` display columns, marking the cut with `…`.
#[must_use]
pub fn truncate(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }

    let budget = width - 1;
    let mut used = 0;
    let mut out = String::new();
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(ch);
    }
    out.push(ELLIPSIS);
    out
}

/// Pad `text` with spaces to `width` display columns.
#[must_use]
pub fn pad(text: &str, width: usize) -> String {
    let w = text.width();
    if w >= width {
        return text.to_string();
    }
    format!("{text}{}", " ".repeat(width - w))
}

/// Format a single-line task summary.
///
/// Format: `#{id} {title}  {description preview}`
#[must_use]
pub fn format_task_line(task: &Task) -> String {
    let title = pad(&truncate(&task.title, TITLE_WIDTH), TITLE_WIDTH);
    let preview = task
        .description
        .as_deref()
        .map(html_to_text)
        .filter(|s| !s.is_empty())
        .map(|s| truncate(&s, PREVIEW_WIDTH))
        .unwrap_or_default();
    format!("#{:<5} {title}  {preview}", task.id.0)
        .trim_end()
        .to_string()
}
