use entity::tab::Tab;
use repository::{Repository, Response};
use supabase::TableStore;
use tracing::error;

/// Counts shown on the dashboard cards. `None` when the count could not
/// be fetched.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DashboardStats {
    pub posts: Option<usize>,
    pub talkings: Option<usize>,
    pub friends: Option<usize>,
    /// Nothing records page views yet.
    pub views: usize,
}

fn count<T>(collection: &str, result: Response<Vec<T>>) -> Option<usize> {
    match result {
        Ok(rows) => Some(rows.len()),
        Err(e) => {
            error!(task = "count", collection, err = e.to_string());
            None
        }
    }
}

impl DashboardStats {
    pub async fn collect<S: TableStore>(repo: &Repository<S>) -> Self {
        let (posts, talkings, friends) = tokio::join!(
            repo.post.find_all(),
            repo.talking.find_all(),
            repo.friend.find_all()
        );

        Self {
            posts: count("posts", posts),
            talkings: count("talking", talkings),
            friends: count("friends", friends),
            views: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuickAction {
    pub label: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
    pub tab: Tab,
}

pub const QUICK_ACTIONS: [QuickAction; 4] = [
    QuickAction {
        label: "Write a post",
        icon: "📝",
        color: "#4CAF50",
        tab: Tab::Posts,
    },
    QuickAction {
        label: "Post a talking",
        icon: "💬",
        color: "#2196F3",
        tab: Tab::Talking,
    },
    QuickAction {
        label: "Manage friends",
        icon: "👥",
        color: "#FF9800",
        tab: Tab::Friends,
    },
    QuickAction {
        label: "Site settings",
        icon: "⚙️",
        color: "#607D8B",
        tab: Tab::Settings,
    },
];
