use admin::{
    markdown::escape, ContentKind, Editor, LoadState, TalkingForm, TalkingKind,
    TalkingManager, View,
};
use entity::prelude::*;
use supabase::TableStore;

use crate::page;

// Talking content is trusted HTML written by the operator and is drawn
// as is.
fn list(talkings: &[TalkingEntity]) -> String {
    if talkings.is_empty() {
        return "<p>Nothing said yet.</p>".to_string();
    }

    let rows: String = talkings
        .iter()
        .map(|talking| {
            let id = escape(talking.id.as_str());
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}{}</td></tr>",
                talking.content,
                page::tags(&talking.tags),
                page::date(&talking.date),
                page::button(&format!("/talking/{}/edit", id), "Edit"),
                page::button(&format!("/talking/{}/delete", id), "Delete"),
            )
        })
        .collect();

    format!(
        "<table><thead><tr><th>Content</th><th>Tags</th><th>Date</th><th></th></tr></thead><tbody>{}</tbody></table>",
        rows
    )
}

fn images(form: &TalkingForm) -> String {
    let images = form.images();
    if images.is_empty() {
        return String::new();
    }

    let strip: String = images
        .iter()
        .map(|src| format!(r#"<img src="{}" alt="">"#, src))
        .collect();
    format!(r#"<div class="images">{}</div>"#, strip)
}

fn editor(editor: &Editor<TalkingKind>) -> String {
    let TalkingForm { content, tags } = &editor.form;
    let heading = if editor.is_new() {
        "New talking"
    } else {
        "Edit talking"
    };

    let body = if editor.preview {
        format!(
            r#"<input type="hidden" name="tags" value="{}">
<textarea name="content" hidden>{}</textarea>
<div class="card">{}<p>{}</p></div>"#,
            escape(tags),
            escape(content),
            content,
            page::tags(&editor.form.tag_list()),
        )
    } else {
        format!(
            r#"<label>Content (HTML)<textarea name="content" required>{}</textarea></label>
<label>Tags (comma separated)<input name="tags" value="{}"></label>
<label>Image URL<input name="image_url" type="url"></label>
<button type="submit" formaction="/talking/insert-image" formnovalidate>Insert image</button>
{}"#,
            escape(content),
            escape(tags),
            images(&editor.form),
        )
    };

    format!(
        r#"<h2>{}</h2>
<form class="editor" method="post" action="/talking/save">
{}
<button type="submit">Save</button>
<button type="submit" formaction="/talking/preview" formnovalidate>{}</button>
<button type="submit" formaction="/talking/cancel" formnovalidate>Cancel</button>
</form>"#,
        heading,
        body,
        if editor.preview { "Edit" } else { "Preview" },
    )
}

pub(crate) fn render<S: TableStore>(manager: &TalkingManager<S>) -> String {
    let body = match (manager.view(), manager.load_state()) {
        (View::Edit(state), _) => editor(state),
        // Talkings have no viewer of their own.
        (View::Viewing(_), _) | (View::List, LoadState::Loaded) => format!(
            "<h2>Talking</h2>{}{}",
            page::button("/talking/new", "New talking"),
            list(manager.records())
        ),
        (View::List, LoadState::Loading) => "<p>Loading...</p>".to_string(),
        (View::List, LoadState::Failed(message)) => {
            page::load_failed(message, "/talking/retry")
        }
    };

    let modal = manager
        .modal()
        .map(|modal| page::modal(TalkingKind::NOUN, modal))
        .unwrap_or_default();

    format!("{}{}", body, modal)
}
