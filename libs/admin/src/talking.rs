use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use entity::prelude::*;
use regex::Regex;

use crate::{
    manager::{ContentKind, ContentManager},
    markdown::escape,
    tags::{join_tags, parse_tags},
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TalkingKind;

/// The talking editor's fields. `content` is HTML and is stored as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TalkingForm {
    pub content: String,
    /// Comma separated.
    pub tags: String,
}

fn image_src() -> &'static Regex {
    static IMAGE_SRC: OnceLock<Regex> = OnceLock::new();
    IMAGE_SRC.get_or_init(|| {
        Regex::new(r#"<img[^>]*?src=["']([^"']*)["'][^>]*>"#)
            .expect("image pattern is valid")
    })
}

impl TalkingForm {
    /// Appends an image paragraph in the theme's gallery markup.
    pub fn insert_image(&mut self, url: &str) {
        let url = url.trim();
        if url.is_empty() {
            return;
        }
        self.content.push_str(&format!(
            r#"<p class="vh-img-flex"><img src="{}"></p>"#,
            escape(url)
        ));
    }

    /// Sources of every `<img>` in the content, in order.
    pub fn images(&self) -> Vec<String> {
        image_src()
            .captures_iter(&self.content)
            .map(|caps| caps[1].to_string())
            .collect()
    }

    pub fn tag_list(&self) -> Vec<String> {
        parse_tags(&self.tags)
    }
}

impl ContentKind for TalkingKind {
    type Record = TalkingEntity;
    type Form = TalkingForm;

    const NOUN: &'static str = "talking";
    const PLURAL: &'static str = "talkings";

    fn form_for(record: Option<&TalkingEntity>) -> TalkingForm {
        record
            .map(|talking| TalkingForm {
                content: talking.content.clone(),
                tags: join_tags(&talking.tags),
            })
            .unwrap_or_default()
    }

    fn draft(
        form: &TalkingForm,
        original: Option<&TalkingEntity>,
        now: DateTime<Utc>,
    ) -> TalkingDraft {
        TalkingDraft {
            content: form.content.clone(),
            tags: form.tag_list(),
            date: original.map(|talking| talking.date).unwrap_or(now),
        }
    }
}

pub type TalkingManager<S> = ContentManager<S, TalkingKind>;

#[cfg(test)]
mod test {
    use repository::init_repository;
    use supabase::memory::{Call, MemoryStore};

    use super::*;
    use crate::manager::{LoadState, ManagerError, Modal, View};

    async fn mounted(store: &MemoryStore) -> TalkingManager<MemoryStore> {
        TalkingManager::mount(init_repository(store.clone()).talking).await
    }

    #[test]
    fn test_insert_image_and_collect() {
        // Arrange
        let mut form = TalkingForm {
            content: "<p>Sunny day</p>".to_string(),
            tags: String::new(),
        };

        // Act
        form.insert_image("https://img.example.com/a.jpg");
        form.insert_image("  ");
        form.insert_image("https://img.example.com/b.png?w=1&h=2");

        // Assert
        assert!(form.content.ends_with(
            r#"<p class="vh-img-flex"><img src="https://img.example.com/b.png?w=1&amp;h=2"></p>"#
        ));
        assert_eq!(
            form.images(),
            vec![
                "https://img.example.com/a.jpg",
                "https://img.example.com/b.png?w=1&amp;h=2"
            ]
        );
    }

    #[test]
    fn test_images_accepts_single_quotes_and_attributes() {
        let form = TalkingForm {
            content: r#"<img alt="x" src='one.jpg' width="3"><img src="two.jpg"/>"#
                .to_string(),
            tags: String::new(),
        };

        assert_eq!(form.images(), vec!["one.jpg", "two.jpg"]);
    }

    #[tokio::test]
    async fn test_content_is_stored_as_raw_html() {
        let store = MemoryStore::new();
        let mut manager = mounted(&store).await;
        manager.create_new().unwrap();

        manager
            .save(TalkingForm {
                content: "<p>**not markdown**</p>".to_string(),
                tags: "life, ".to_string(),
            })
            .await
            .unwrap();

        let talking = &manager.records()[0];
        assert_eq!(talking.content, "<p>**not markdown**</p>");
        assert_eq!(talking.tags, vec!["life"]);
    }

    #[tokio::test]
    async fn test_edit_keeps_date() {
        let store = MemoryStore::new();
        let mut manager = mounted(&store).await;
        manager.create_new().unwrap();
        manager
            .save(TalkingForm {
                content: "<p>first</p>".to_string(),
                tags: String::new(),
            })
            .await
            .unwrap();
        let created = manager.records()[0].clone();

        manager.edit(&created.id).unwrap();
        manager
            .save(TalkingForm {
                content: "<p>second</p>".to_string(),
                tags: "x".to_string(),
            })
            .await
            .unwrap();

        let updated = &manager.records()[0];
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.date, created.date);
        assert_eq!(updated.content, "<p>second</p>");
    }

    #[tokio::test]
    async fn test_failed_delete_alerts_and_keeps_list() {
        let store = MemoryStore::new();
        let mut manager = mounted(&store).await;
        manager.create_new().unwrap();
        manager
            .save(TalkingForm {
                content: "<p>stay</p>".to_string(),
                tags: String::new(),
            })
            .await
            .unwrap();
        let id = manager.records()[0].id.clone();
        store.fail_with("permission denied");

        manager.request_delete(&id).unwrap();
        manager.confirm().await;

        assert!(matches!(manager.modal(), Some(Modal::Alert(m)) if m.contains("permission denied")));
        assert_eq!(manager.records().len(), 1);
        assert_eq!(manager.load_state(), &LoadState::Loaded);
        assert_eq!(manager.view(), &View::List);
        assert_eq!(
            store.calls().last(),
            Some(&Call::Delete("talking".to_string(), id))
        );
    }

    #[tokio::test]
    async fn test_unknown_record_is_rejected() {
        let store = MemoryStore::new();
        let mut manager = mounted(&store).await;

        let result = manager.edit(&"missing".into());

        assert!(result.is_err());
        assert_eq!(manager.view(), &View::List);
    }

    #[tokio::test]
    async fn test_set_form_only_while_editing() {
        let store = MemoryStore::new();
        let mut manager = mounted(&store).await;
        let mut form = TalkingForm::default();
        form.insert_image("a.jpg");

        assert_eq!(
            manager.set_form(form.clone()),
            Err(ManagerError::NotEditing)
        );

        manager.create_new().unwrap();
        manager.set_form(form.clone()).unwrap();

        match manager.view() {
            View::Edit(editor) => {
                assert_eq!(editor.form, form);
                assert!(!editor.preview);
            }
            view => panic!("expected editor, got {:?}", view),
        }
    }
}
