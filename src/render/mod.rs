//! Server-side rendering of a view snapshot.
//!
//! Produces the whole page: search box, loading placeholder or table,
//! submission form, confirmation notice and the detail modal.

use std::fmt::Write;

use uuid::Uuid;

use crate::view::loader::ListSource;
use crate::view::state::{RowView, ViewSnapshot};

/// Escape text for use in HTML content and attribute values.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn render_tags(labels: &[String]) -> String {
    let mut out = String::new();
    for label in labels {
        let _ = write!(out, r#"<span class="tag">{}</span>"#, escape_html(label));
    }
    out
}

fn optional(value: Option<&str>) -> String {
    value.map(escape_html).unwrap_or_default()
}

fn render_row(row: &RowView) -> String {
    let entry = &row.entry;
    format!(
        r#"<tr class="entry" data-id="{id}"><td>{title}</td><td>{author}</td><td>{tags}</td><td>{contributor}</td></tr>"#,
        id = escape_html(&entry.id),
        title = escape_html(&entry.title),
        author = escape_html(&entry.author),
        tags = render_tags(&row.tag_labels),
        contributor = optional(entry.contributor.as_deref()),
    )
}

fn render_list(snapshot: &ViewSnapshot) -> String {
    if snapshot.loading {
        return r#"<p class="loading">Loading recommendations…</p>"#.to_string();
    }

    let mut out = String::new();
    if snapshot.source == ListSource::Sample {
        out.push_str(
            r#"<p class="sample-notice">Showing sample recommendations while the list is unavailable.</p>"#,
        );
    }
    out.push_str(
        "<table class=\"recommendations\"><thead><tr><th>Title</th><th>Author</th><th>Tags</th><th>Recommended by</th></tr></thead><tbody>",
    );
    if snapshot.rows.is_empty() {
        out.push_str(r#"<tr><td colspan="4" class="empty">No recommendations found.</td></tr>"#);
    }
    for row in &snapshot.rows {
        out.push_str(&render_row(row));
    }
    out.push_str("</tbody></table>");
    out
}

fn render_form(session_id: Uuid, snapshot: &ViewSnapshot) -> String {
    let form = &snapshot.form;
    let disabled = if snapshot.submitting { " disabled" } else { "" };
    let label = if snapshot.submitting {
        "Submitting…"
    } else {
        "Submit recommendation"
    };
    format!(
        r#"<form class="submit-form" method="post" action="/sessions/{session_id}/submit"><fieldset{disabled}>
<input name="title" placeholder="Title *" required value="{title}">
<input name="author" placeholder="Author *" required value="{author}">
<input name="tags" placeholder="Tags (comma separated)" value="{tags}">
<textarea name="notes" placeholder="Why do you recommend it?">{notes}</textarea>
<input name="contributor" placeholder="Your name" value="{contributor}">
<button type="submit">{label}</button>
</fieldset></form>"#,
        title = escape_html(&form.title),
        author = escape_html(&form.author),
        tags = escape_html(&form.tags),
        notes = escape_html(&form.notes),
        contributor = escape_html(&form.contributor),
    )
}

fn render_modal(row: &RowView) -> String {
    let entry = &row.entry;
    let mut body = format!(
        "<h2>{}</h2><p class=\"author\">by {}</p><div class=\"tags\">{}</div>",
        escape_html(&entry.title),
        escape_html(&entry.author),
        render_tags(&row.tag_labels),
    );
    if let Some(notes) = entry.notes.as_deref() {
        let _ = write!(body, r#"<p class="notes">{}</p>"#, escape_html(notes));
    }
    if let Some(contributor) = entry.contributor.as_deref() {
        let _ = write!(
            body,
            r#"<p class="contributor">Recommended by {}</p>"#,
            escape_html(contributor)
        );
    }
    format!(
        r#"<div class="modal-backdrop" data-click="outside"><div class="modal-content" data-click="inside">{body}</div></div>"#
    )
}

/// Render the full page for a session.
pub fn render_page(session_id: Uuid, snapshot: &ViewSnapshot) -> String {
    let alert = snapshot
        .alert
        .as_deref()
        .map(|msg| format!(r#"<div class="alert" role="alert">{}</div>"#, escape_html(msg)))
        .unwrap_or_default();
    let modal = snapshot
        .modal
        .as_ref()
        .map(render_modal)
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>Reading List</title></head>
<body data-session="{session_id}" style="padding-right: {padding}; overflow: {overflow};">
<h1>Reading List</h1>
<form class="search" method="get" action="/sessions/{session_id}"><input type="search" name="q" placeholder="Search by title, author, tags…" value="{search}"></form>
{list}
<h2>Recommend a book</h2>
{alert}{form}
<div class="notice {notice_class}">Thanks! Your recommendation will appear once approved.</div>
{modal}
</body>
</html>
"#,
        padding = escape_html(&snapshot.page.padding_right),
        overflow = snapshot.page.overflow.as_css(),
        search = escape_html(&snapshot.search),
        list = render_list(snapshot),
        form = render_form(session_id, snapshot),
        notice_class = snapshot.notice.class_name,
    )
}
