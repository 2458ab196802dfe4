//! Page frame shared by every screen: document head, login gate, sidebar
//! and dialogs.

use admin::{markdown::escape, Modal};
use axum::{http::StatusCode, response::Html};
use chrono::{DateTime, Utc};
use entity::{identity::Identity, tab::Tab};
use strum::IntoEnumIterator;

const STYLE: &str = r#"
body { margin: 0; font-family: system-ui, sans-serif; background: #f5f6fa; color: #333; }
.center { display: flex; min-height: 100vh; align-items: center; justify-content: center; }
.card { background: #fff; border-radius: 8px; padding: 24px; box-shadow: 0 1px 4px rgba(0,0,0,.08); }
.login { width: 320px; }
.login input { width: 100%; box-sizing: border-box; margin-bottom: 12px; padding: 8px; }
.error { color: #c0392b; }
.shell { display: flex; min-height: 100vh; }
.sidebar { width: 220px; background: #2c3e50; color: #fff; padding: 16px; }
.sidebar form.tab button { display: block; width: 100%; text-align: left; background: none; border: 0; color: #ecf0f1; padding: 8px 12px; border-radius: 4px; cursor: pointer; }
.sidebar form.tab button.active { background: #34495e; font-weight: bold; }
.content { flex: 1; padding: 24px; }
.stats { display: flex; gap: 16px; flex-wrap: wrap; }
.stat { flex: 1; min-width: 160px; text-align: center; }
.stat strong { display: block; font-size: 2em; }
.actions { display: flex; gap: 12px; flex-wrap: wrap; }
.action { color: #fff; padding: 12px 16px; border: 0; border-radius: 6px; cursor: pointer; }
table { width: 100%; border-collapse: collapse; background: #fff; }
th, td { text-align: left; padding: 8px; border-bottom: 1px solid #eee; vertical-align: top; }
form.inline { display: inline; }
.editor input, .editor textarea { width: 100%; box-sizing: border-box; margin-bottom: 12px; padding: 8px; }
.editor textarea { min-height: 320px; font-family: monospace; }
.tag { display: inline-block; background: #eef; border-radius: 4px; padding: 0 6px; margin-right: 4px; font-size: .85em; }
.cover img, .images img { max-width: 240px; max-height: 160px; margin: 4px; }
.overlay { position: fixed; inset: 0; background: rgba(0,0,0,.4); display: flex; align-items: center; justify-content: center; }
.dialog { max-width: 420px; }
"#;

fn frame(title: &str, head: &str, body: &str) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
{}
<title>{} · vh-admin</title>
<style>{}</style>
</head>
<body>
{}
</body>
</html>"#,
        head,
        escape(title),
        STYLE,
        body
    ))
}

pub(crate) fn document(title: &str, body: &str) -> Html<String> {
    frame(title, "", body)
}

pub(crate) fn error_page(status: StatusCode, message: &str) -> Html<String> {
    document(
        status.as_str(),
        &format!(
            r#"<div class="center"><div class="card"><h2>{}</h2><p>{}</p><a href="/">Back to the dashboard</a></div></div>"#,
            status,
            escape(message)
        ),
    )
}

/// Shown until the first session check settles.
pub(crate) fn loading_page() -> Html<String> {
    frame(
        "Loading",
        r#"<meta http-equiv="refresh" content="1">"#,
        r#"<div class="center"><p>Loading...</p></div>"#,
    )
}

pub(crate) fn login_page(error: Option<&str>) -> Html<String> {
    let error = error
        .map(|message| format!(r#"<p class="error">{}</p>"#, escape(message)))
        .unwrap_or_default();

    document(
        "Sign in",
        &format!(
            r#"<div class="center"><form class="card login" method="post" action="/login">
<h2>Admin sign in</h2>
{}
<label>Email<input type="email" name="email" required autofocus></label>
<label>Password<input type="password" name="password" required></label>
<button type="submit">Sign in</button>
</form></div>"#,
            error
        ),
    )
}

fn sidebar(identity: &Identity, active: Tab) -> String {
    let links: String = Tab::iter()
        .map(|tab| {
            format!(
                r#"<form class="tab" method="post" action="/tabs/{}"><button type="submit"{}>{} {}</button></form>"#,
                tab,
                if tab == active { r#" class="active""# } else { "" },
                tab.icon(),
                tab.label()
            )
        })
        .collect();

    format!(
        r#"<nav class="sidebar">
<h3>vh-admin</h3>
{}
<hr>
<p>{}</p>
<form method="post" action="/logout"><button type="submit">Sign out</button></form>
</nav>"#,
        links,
        escape(&identity.email)
    )
}

pub(crate) fn shell_page(
    identity: &Identity,
    active: Tab,
    content: &str,
) -> Html<String> {
    document(
        active.label(),
        &format!(
            r#"<div class="shell">{}<main class="content">{}</main></div>"#,
            sidebar(identity, active),
            content
        ),
    )
}

/// A confirmation offers confirm and decline; an alert only closes.
pub(crate) fn modal(noun: &str, modal: &Modal) -> String {
    let buttons = if modal.is_confirmation() {
        r#"<form class="inline" method="post" action="/modal/confirm"><button type="submit">Confirm</button></form>
<form class="inline" method="post" action="/modal/decline"><button type="submit">Cancel</button></form>"#
    } else {
        r#"<form class="inline" method="post" action="/modal/dismiss"><button type="submit">OK</button></form>"#
    };

    format!(
        r#"<div class="overlay"><div class="card dialog"><p>{}</p>{}</div></div>"#,
        escape(&modal.message(noun)),
        buttons
    )
}

pub(crate) fn placeholder(tab: Tab) -> String {
    format!(
        "<h2>{} {}</h2><p>This section is not available yet.</p>",
        tab.icon(),
        tab.label()
    )
}

pub(crate) fn load_failed(message: &str, retry_action: &str) -> String {
    format!(
        r#"<div class="card"><p class="error">{}</p><form method="post" action="{}"><button type="submit">Retry</button></form></div>"#,
        escape(message),
        retry_action
    )
}

pub(crate) fn tags(tags: &[String]) -> String {
    tags.iter()
        .map(|tag| format!(r#"<span class="tag">{}</span>"#, escape(tag)))
        .collect()
}

pub(crate) fn date(date: &DateTime<Utc>) -> String {
    date.format("%Y-%m-%d %H:%M").to_string()
}

/// A POST button that carries no fields.
pub(crate) fn button(action: &str, label: &str) -> String {
    format!(
        r#"<form class="inline" method="post" action="{}"><button type="submit">{}</button></form>"#,
        action, label
    )
}
