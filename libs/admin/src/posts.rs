use chrono::{DateTime, Utc};
use entity::{id::RecordId, prelude::*};
use supabase::TableStore;
use tracing::error;

use crate::{
    manager::{ContentKind, ContentManager, ManagerError},
    markdown::render_markdown,
    tags::{join_tags, parse_tags},
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PostKind;

/// The post editor's fields as typed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostForm {
    pub title: String,
    pub content: String,
    pub categories: String,
    /// Comma separated.
    pub tags: String,
    pub cover: String,
}

impl PostForm {
    pub fn preview_html(&self) -> String {
        render_markdown(&self.content)
    }

    pub fn tag_list(&self) -> Vec<String> {
        parse_tags(&self.tags)
    }

    pub fn cover_url(&self) -> Option<&str> {
        Some(self.cover.trim()).filter(|cover| !cover.is_empty())
    }
}

impl ContentKind for PostKind {
    type Record = PostEntity;
    type Form = PostForm;

    const NOUN: &'static str = "post";
    const PLURAL: &'static str = "posts";

    fn form_for(record: Option<&PostEntity>) -> PostForm {
        let Some(post) = record else {
            return PostForm::default();
        };

        PostForm {
            title: post.title.clone(),
            content: post.content.clone(),
            categories: post.categories.clone(),
            tags: join_tags(&post.tags),
            cover: post.cover.clone().unwrap_or_default(),
        }
    }

    fn draft(
        form: &PostForm,
        original: Option<&PostEntity>,
        now: DateTime<Utc>,
    ) -> PostDraft {
        PostDraft {
            title: form.title.clone(),
            content: form.content.clone(),
            categories: form.categories.clone(),
            tags: form.tag_list(),
            cover: form.cover_url().map(str::to_string),
            date: original.map(|post| post.date).unwrap_or(now),
        }
    }
}

pub type PostsManager<S> = ContentManager<S, PostKind>;

impl<S: TableStore> ContentManager<S, PostKind> {
    /// Shows a post from the current list.
    pub fn view_post(&mut self, id: &RecordId) -> Result<(), ManagerError> {
        let post = self
            .records()
            .iter()
            .find(|post| &post.id == id)
            .cloned()
            .ok_or_else(|| ManagerError::UnknownRecord(id.clone()))?;
        self.show(post)
    }

    /// Fetches a single post and shows it, for links straight to a post.
    pub async fn open(&mut self, id: &RecordId) -> Result<(), ManagerError> {
        match self.table().find_by_id(id).await {
            Ok(post) => self.show(post),
            Err(e) => {
                error!(task = "open", id = %id, err = e.to_string());
                self.alert(format!("Failed to open the post: {}", e.message()));
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod test {
    use chrono::Duration;
    use repository::init_repository;
    use supabase::memory::{Call, MemoryStore};

    use super::*;
    use crate::manager::{LoadState, Modal, View};

    fn form(title: &str, content: &str, categories: &str, tags: &str) -> PostForm {
        PostForm {
            title: title.to_string(),
            content: content.to_string(),
            categories: categories.to_string(),
            tags: tags.to_string(),
            cover: String::new(),
        }
    }

    async fn mounted(store: &MemoryStore) -> PostsManager<MemoryStore> {
        PostsManager::mount(init_repository(store.clone()).post).await
    }

    fn titles(manager: &PostsManager<MemoryStore>) -> Vec<String> {
        manager.records().iter().map(|p| p.title.clone()).collect()
    }

    #[tokio::test]
    async fn test_create_hello_post() {
        // Arrange
        let store = MemoryStore::new();
        let mut manager = mounted(&store).await;
        manager.create_new().unwrap();
        manager
            .save(form("Older", "old", "misc", ""))
            .await
            .unwrap();
        store.clear_calls();
        let before = Utc::now();

        // Act
        manager.create_new().unwrap();
        manager
            .save(form("Hello", "# Hi", "news", "a, b"))
            .await
            .unwrap();

        // Assert
        assert_eq!(
            store.calls(),
            vec![
                Call::Insert("posts".to_string()),
                Call::Select("posts".to_string())
            ]
        );
        let stored = store
            .rows("posts")
            .into_iter()
            .find(|row| row["title"] == "Hello")
            .unwrap();
        assert_eq!(stored["content"], "# Hi");
        assert_eq!(stored["categories"], "news");
        assert_eq!(stored["tags"], serde_json::json!(["a", "b"]));
        let date = entity::timestamp::parse(stored["date"].as_str().unwrap())
            .unwrap();
        assert!(date >= before && date <= Utc::now());

        assert_eq!(manager.view(), &View::List);
        assert_eq!(manager.load_state(), &LoadState::Loaded);
        assert_eq!(titles(&manager), vec!["Hello", "Older"]);
    }

    #[tokio::test]
    async fn test_edit_preserves_id_and_date() {
        let store = MemoryStore::new();
        let mut manager = mounted(&store).await;
        manager.create_new().unwrap();
        manager.save(form("Draft", "text", "", "x")).await.unwrap();
        let created = manager.records()[0].clone();

        manager.edit(&created.id).unwrap();
        let View::Edit(editor) = manager.view() else {
            panic!("not editing");
        };
        assert_eq!(editor.form.tags, "x");
        let mut changed = editor.form.clone();
        changed.title = "Final".to_string();
        manager.save(changed).await.unwrap();

        let updated = &manager.records()[0];
        assert_eq!(manager.records().len(), 1);
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.title, "Final");
        assert_eq!(updated.date, created.date);
    }

    #[tokio::test]
    async fn test_failed_save_keeps_editor() {
        let store = MemoryStore::new();
        let mut manager = mounted(&store).await;
        manager.create_new().unwrap();
        store.fail_with("network down");
        let typed = form("Unsaved", "body", "c", "t1, t2");

        manager.save(typed.clone()).await.unwrap();

        let Some(Modal::Alert(message)) = manager.modal() else {
            panic!("expected an alert");
        };
        assert!(message.contains("network down"));
        let View::Edit(editor) = manager.view() else {
            panic!("left the editor");
        };
        assert_eq!(editor.form, typed);

        // Other actions wait for the alert.
        assert_eq!(manager.back_to_list(), Err(ManagerError::ModalOpen));
        manager.dismiss();
        store.recover();
        manager.save(typed).await.unwrap();
        assert_eq!(titles(&manager), vec!["Unsaved"]);
    }

    #[tokio::test]
    async fn test_declined_delete_issues_no_call() {
        let store = MemoryStore::new();
        let mut manager = mounted(&store).await;
        manager.create_new().unwrap();
        manager.save(form("Keep me", "", "", "")).await.unwrap();
        let id = manager.records()[0].id.clone();
        store.clear_calls();

        manager.request_delete(&id).unwrap();
        assert_eq!(manager.modal(), Some(&Modal::ConfirmDelete(id.clone())));
        manager.decline();

        assert!(store.calls().is_empty());
        assert_eq!(manager.modal(), None);
        assert_eq!(titles(&manager), vec!["Keep me"]);
    }

    #[tokio::test]
    async fn test_confirmed_delete_reloads() {
        let store = MemoryStore::new();
        let mut manager = mounted(&store).await;
        manager.create_new().unwrap();
        manager.save(form("Gone soon", "", "", "")).await.unwrap();
        let id = manager.records()[0].id.clone();

        manager.request_delete(&id).unwrap();
        manager.confirm().await;

        assert!(manager.records().is_empty());
        assert!(store.rows("posts").is_empty());
    }

    #[tokio::test]
    async fn test_failed_load_leaves_no_stale_list() {
        let store = MemoryStore::new();
        let mut manager = mounted(&store).await;
        manager.create_new().unwrap();
        manager.save(form("Visible", "", "", "")).await.unwrap();
        assert_eq!(manager.records().len(), 1);

        store.fail_with("timeout");
        let loaded = manager.retry().await;

        assert!(!loaded);
        assert!(matches!(manager.load_state(), LoadState::Failed(_)));
        assert!(manager.records().is_empty());

        store.recover();
        assert!(manager.retry().await);
        assert_eq!(manager.load_state(), &LoadState::Loaded);
        assert_eq!(titles(&manager), vec!["Visible"]);
    }

    #[tokio::test]
    async fn test_cancel_needs_confirmation() {
        let store = MemoryStore::new();
        let mut manager = mounted(&store).await;
        manager.create_new().unwrap();
        let typed = form("Half done", "", "", "");

        manager.request_cancel(typed.clone()).unwrap();
        manager.decline();
        let View::Edit(editor) = manager.view() else {
            panic!("editor closed on decline");
        };
        assert_eq!(editor.form, typed);

        manager.request_cancel(typed).unwrap();
        manager.confirm().await;
        assert_eq!(manager.view(), &View::List);
        assert!(store.rows("posts").is_empty());
    }

    #[tokio::test]
    async fn test_view_then_edit() {
        let store = MemoryStore::new();
        store.seed(
            "posts",
            vec![serde_json::json!({
                "title": "Seeded",
                "content": "**bold**",
                "date": (Utc::now() - Duration::days(2)).to_rfc3339(),
                "created_at": Utc::now().to_rfc3339(),
            })],
        );
        let mut manager = mounted(&store).await;
        let id = manager.records()[0].id.clone();

        manager.view_post(&id).unwrap();
        assert!(matches!(manager.view(), View::Viewing(post) if post.id == id));
        manager.edit(&id).unwrap();

        let View::Edit(editor) = manager.view() else {
            panic!("not editing");
        };
        assert!(!editor.is_new());
        assert!(editor.form.preview_html().contains("<strong>bold</strong>"));
    }

    #[tokio::test]
    async fn test_open_missing_post_alerts() {
        let store = MemoryStore::new();
        let mut manager = mounted(&store).await;

        manager.open(&RecordId::from(404)).await.unwrap();

        assert!(matches!(manager.modal(), Some(Modal::Alert(_))));
        assert_eq!(manager.view(), &View::List);
    }

    #[tokio::test]
    async fn test_toggle_preview_keeps_form() {
        let store = MemoryStore::new();
        let mut manager = mounted(&store).await;
        manager.create_new().unwrap();
        let typed = form("T", "**bold**", "", "");

        manager.toggle_preview(typed.clone()).unwrap();

        let View::Edit(editor) = manager.view() else {
            panic!("not editing");
        };
        assert!(editor.preview);
        assert_eq!(editor.form, typed);
        assert!(manager.toggle_preview(typed).is_ok());
    }

    #[test]
    fn test_draft_drops_blank_cover() {
        let mut typed = form("T", "", "", "");
        typed.cover = "   ".to_string();
        let now = Utc::now();

        let draft = PostKind::draft(&typed, None, now);

        assert_eq!(draft.cover, None);
        assert_eq!(draft.date, now);
    }
}
