use entity::{id::RecordId, prelude::*};
use supabase::Order;

use crate::table::{Record, Table};

pub type TalkingRepository<S> = Table<S, TalkingEntity>;

impl Record for TalkingEntity {
    type Draft = TalkingDraft;

    const TABLE: &'static str = "talking";
    const ORDER: Order = Order::desc("date");

    fn id(&self) -> &RecordId {
        &self.id
    }
}

#[cfg(test)]
mod test {
    use chrono::{Duration, Utc};
    use supabase::memory::MemoryStore;

    use crate::init_repository;

    use super::*;

    fn draft(content: &str, days_ago: i64) -> TalkingDraft {
        TalkingDraft {
            content: content.to_string(),
            tags: vec![],
            date: Utc::now() - Duration::days(days_ago),
        }
    }

    #[tokio::test]
    async fn test_ordered_by_date_not_insertion() {
        // Arrange
        let repo = init_repository(MemoryStore::new());
        repo.talking.create(&draft("<p>new</p>", 0)).await.unwrap();
        repo.talking.create(&draft("<p>old</p>", 3)).await.unwrap();

        // Act
        let talkings = repo.talking.find_all().await.unwrap();

        // Assert
        assert_eq!(talkings[0].content, "<p>new</p>");
        assert_eq!(talkings[1].content, "<p>old</p>");
    }

    #[tokio::test]
    async fn test_delete_only_touches_its_collection() {
        let store = MemoryStore::new();
        let repo = init_repository(store.clone());
        let talking = repo.talking.create(&draft("<p>a</p>", 0)).await.unwrap();
        let friend = repo
            .friend
            .create(&FriendDraft {
                content: "b".to_string(),
                tags: vec![],
                date: Utc::now(),
            })
            .await
            .unwrap();
        // Both tables hand out their own ids; make them collide on purpose.
        store.seed(
            "friends",
            vec![serde_json::json!({
                "id": talking.id.as_str().parse::<i64>().unwrap(),
                "content": "same id",
                "date": Utc::now().to_rfc3339(),
            })],
        );

        repo.talking.delete(&talking.id).await.unwrap();

        assert!(repo.talking.find_all().await.unwrap().is_empty());
        let friends = repo.friend.find_all().await.unwrap();
        assert_eq!(friends.len(), 2);
        assert!(friends.iter().any(|f| f.id == friend.id));
    }
}
