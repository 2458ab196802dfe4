use admin::{
    markdown::{escape, render_markdown},
    ContentKind, Editor, LoadState, PostForm, PostKind, PostsManager, View,
};
use entity::prelude::*;
use supabase::TableStore;

use crate::page;

fn list(posts: &[PostEntity]) -> String {
    if posts.is_empty() {
        return "<p>No posts yet.</p>".to_string();
    }

    let rows: String = posts
        .iter()
        .map(|post| {
            let id = escape(post.id.as_str());
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}{}{}</td></tr>",
                escape(&post.title),
                escape(&post.categories),
                page::tags(&post.tags),
                page::date(&post.date),
                page::button(&format!("/posts/{}/view", id), "View"),
                page::button(&format!("/posts/{}/edit", id), "Edit"),
                page::button(&format!("/posts/{}/delete", id), "Delete"),
            )
        })
        .collect();

    format!(
        "<table><thead><tr><th>Title</th><th>Categories</th><th>Tags</th><th>Date</th><th></th></tr></thead><tbody>{}</tbody></table>",
        rows
    )
}

fn cover(url: &str) -> String {
    format!(
        r#"<div class="cover"><img src="{}" alt="cover"></div>"#,
        escape(url)
    )
}

/// The form posts to the save, preview and cancel routes through its
/// buttons. In preview the fields ride along hidden so nothing is lost.
fn editor(editor: &Editor<PostKind>) -> String {
    let PostForm {
        title,
        content,
        categories,
        tags,
        cover: cover_url,
    } = &editor.form;
    let heading = if editor.is_new() { "New post" } else { "Edit post" };

    let body = if editor.preview {
        format!(
            r#"<input type="hidden" name="title" value="{}">
<input type="hidden" name="categories" value="{}">
<input type="hidden" name="tags" value="{}">
<input type="hidden" name="cover" value="{}">
<textarea name="content" hidden>{}</textarea>
<div class="card"><h1>{}</h1>{}<p>{}</p>{}</div>"#,
            escape(title),
            escape(categories),
            escape(tags),
            escape(cover_url),
            escape(content),
            escape(title),
            editor.form.cover_url().map(cover).unwrap_or_default(),
            page::tags(&editor.form.tag_list()),
            editor.form.preview_html(),
        )
    } else {
        format!(
            r#"<label>Title<input name="title" value="{}" required></label>
<label>Categories<input name="categories" value="{}"></label>
<label>Tags (comma separated)<input name="tags" value="{}"></label>
<label>Cover URL<input name="cover" value="{}"></label>
{}
<label>Content (Markdown)<textarea name="content" required>{}</textarea></label>"#,
            escape(title),
            escape(categories),
            escape(tags),
            escape(cover_url),
            editor.form.cover_url().map(cover).unwrap_or_default(),
            escape(content),
        )
    };

    format!(
        r#"<h2>{}</h2>
<form class="editor" method="post" action="/posts/save">
{}
<button type="submit">Save</button>
<button type="submit" formaction="/posts/preview" formnovalidate>{}</button>
<button type="submit" formaction="/posts/cancel" formnovalidate>Cancel</button>
</form>"#,
        heading,
        body,
        if editor.preview { "Edit" } else { "Preview" },
    )
}

fn viewer(post: &PostEntity) -> String {
    let id = escape(post.id.as_str());
    format!(
        r#"<div class="card">
<h1>{}</h1>
{}
<p>Categories: {} · Tags: {} · Published {}</p>
<article>{}</article>
</div>
{}{}{}"#,
        escape(&post.title),
        post.cover.as_deref().map(cover).unwrap_or_default(),
        escape(&post.categories),
        page::tags(&post.tags),
        page::date(&post.date),
        render_markdown(&post.content),
        page::button("/posts/back", "Back"),
        page::button(&format!("/posts/{}/edit", id), "Edit"),
        page::button(&format!("/posts/{}/delete", id), "Delete"),
    )
}

pub(crate) fn render<S: TableStore>(manager: &PostsManager<S>) -> String {
    let body = match (manager.view(), manager.load_state()) {
        (View::Edit(state), _) => editor(state),
        (View::Viewing(post), _) => viewer(post),
        (View::List, LoadState::Loading) => "<p>Loading...</p>".to_string(),
        (View::List, LoadState::Failed(message)) => {
            page::load_failed(message, "/posts/retry")
        }
        (View::List, LoadState::Loaded) => format!(
            "<h2>Posts</h2>{}{}",
            page::button("/posts/new", "New post"),
            list(manager.records())
        ),
    };

    let modal = manager
        .modal()
        .map(|modal| page::modal(PostKind::NOUN, modal))
        .unwrap_or_default();

    format!("{}{}", body, modal)
}

#[cfg(test)]
mod test {
    use repository::init_repository;
    use serde_json::json;
    use supabase::memory::MemoryStore;

    use super::*;

    async fn mounted(store: &MemoryStore) -> PostsManager<MemoryStore> {
        PostsManager::mount(init_repository(store.clone()).post).await
    }

    fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        store.seed(
            "posts",
            vec![json!({
                "id": 7,
                "title": "Hello <world>",
                "content": "**bold**",
                "categories": "notes",
                "tags": ["a", "b"],
                "cover": "https://img.example.com/c.jpg",
                "date": "2024-03-01T12:00:00Z"
            })],
        );
        store
    }

    #[tokio::test]
    async fn test_render_list() {
        // Arrange
        let manager = mounted(&seeded()).await;

        // Act
        let html = render(&manager);

        // Assert
        assert!(html.contains("Hello &lt;world&gt;"));
        assert!(html.contains(r#"action="/posts/7/edit""#));
        assert!(html.contains(r#"<span class="tag">b</span>"#));
        assert!(html.contains("2024-03-01 12:00"));
        assert!(!html.contains("overlay"));
    }

    #[tokio::test]
    async fn test_render_empty_list() {
        // Act
        let html = render(&mounted(&MemoryStore::new()).await);

        // Assert
        assert!(html.contains("No posts yet."));
        assert!(html.contains(r#"action="/posts/new""#));
    }

    #[tokio::test]
    async fn test_render_failed_list_offers_retry() {
        // Arrange
        let store = MemoryStore::new();
        store.fail_with("offline");

        // Act
        let html = render(&mounted(&store).await);

        // Assert
        assert!(html.contains("Failed to load posts"));
        assert!(html.contains(r#"action="/posts/retry""#));
    }

    #[tokio::test]
    async fn test_render_editor_and_preview() {
        // Arrange
        let mut manager = mounted(&seeded()).await;
        manager.edit(&RecordId::from(7)).unwrap();

        // Act
        let form = render(&manager);
        let form_state = match manager.view() {
            View::Edit(editor) => editor.form.clone(),
            view => panic!("expected editor, got {:?}", view),
        };
        manager.toggle_preview(form_state).unwrap();
        let preview = render(&manager);

        // Assert
        assert!(form.contains(r#"value="Hello &lt;world&gt;""#));
        assert!(form.contains(r#"src="https://img.example.com/c.jpg""#));
        assert!(!form.contains("<strong>"));
        assert!(preview.contains("<strong>bold</strong>"));
        assert!(preview.contains(r#"<input type="hidden" name="title""#));
    }

    #[tokio::test]
    async fn test_render_viewer_with_delete_dialog() {
        // Arrange
        let mut manager = mounted(&seeded()).await;
        let id = RecordId::from(7);
        manager.view_post(&id).unwrap();
        manager.request_delete(&id).unwrap();

        // Act
        let html = render(&manager);

        // Assert
        assert!(html.contains("<strong>bold</strong>"));
        assert!(html.contains("Published 2024-03-01 12:00"));
        assert!(html.contains("delete this post"));
        assert!(html.contains("/modal/confirm"));
    }
}
