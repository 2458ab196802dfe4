use entity::{identity::Identity, tab::Tab};
use repository::Repository;
use supabase::TableStore;
use tracing::info;

use crate::{
    dashboard::DashboardStats, posts::PostsManager, session::SessionState,
    talking::TalkingManager,
};

/// What the content area shows for the active tab. Switching tabs mounts
/// a fresh panel, so lists are re-fetched every time a tab is opened.
#[derive(Debug)]
pub enum Panel<S> {
    Dashboard(DashboardStats),
    Posts(PostsManager<S>),
    Talking(TalkingManager<S>),
    /// Tabs without a screen of their own yet.
    Placeholder(Tab),
}

/// The signed-in part of the dashboard: sidebar tab plus its panel.
#[derive(Debug)]
pub struct AdminShell<S> {
    repo: Repository<S>,
    identity: Option<Identity>,
    tab: Tab,
    panel: Panel<S>,
    login_error: Option<String>,
}

impl<S: TableStore> AdminShell<S> {
    pub fn new(repo: Repository<S>) -> Self {
        Self {
            repo,
            identity: None,
            tab: Tab::Dashboard,
            panel: Panel::Dashboard(DashboardStats::default()),
            login_error: None,
        }
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn panel(&self) -> &Panel<S> {
        &self.panel
    }

    pub fn panel_mut(&mut self) -> &mut Panel<S> {
        &mut self.panel
    }

    pub fn login_error(&self) -> Option<&str> {
        self.login_error.as_deref()
    }

    pub fn set_login_error(&mut self, message: Option<String>) {
        self.login_error = message;
    }

    pub async fn select_tab(&mut self, tab: Tab) {
        info!(task = "select tab", tab = %tab);
        self.tab = tab;
        self.panel = match tab {
            Tab::Dashboard => {
                Panel::Dashboard(DashboardStats::collect(&self.repo).await)
            }
            Tab::Posts => {
                Panel::Posts(PostsManager::mount(self.repo.post.clone()).await)
            }
            Tab::Talking => Panel::Talking(
                TalkingManager::mount(self.repo.talking.clone()).await,
            ),
            Tab::Friends | Tab::Settings => Panel::Placeholder(tab),
        };
    }

    /// Follows the session: a new sign-in lands on the dashboard, a
    /// sign-out drops everything fetched for the previous operator.
    pub async fn sync_session(&mut self, state: &SessionState) {
        let next = state.identity();
        if self.identity.as_ref().map(|i| &i.id) == next.map(|i| &i.id) {
            self.identity = next.cloned();
            return;
        }

        self.identity = next.cloned();
        match next {
            Some(_) => {
                self.login_error = None;
                self.select_tab(Tab::Dashboard).await;
            }
            None => {
                self.tab = Tab::Dashboard;
                self.panel = Panel::Dashboard(DashboardStats::default());
            }
        }
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use repository::init_repository;
    use serde_json::json;
    use supabase::memory::{MemoryAuth, MemoryStore};
    use tokio::time::timeout;

    use super::*;
    use crate::session::SessionGuard;

    #[tokio::test]
    async fn test_login_lands_on_dashboard() {
        // Arrange
        let store = MemoryStore::new();
        store.seed(
            "posts",
            vec![json!({ "title": "a", "date": chrono::Utc::now().to_rfc3339() })],
        );
        let auth = MemoryAuth::new().with_user("admin@example.com", "secret");
        let guard = SessionGuard::new(auth);
        let mut shell = AdminShell::new(init_repository(store));
        let _subscription = guard.start().await;
        assert_eq!(guard.state(), SessionState::Anonymous);

        // Act
        guard.login("admin@example.com", "secret").await.unwrap();
        let mut watch = guard.watch();
        let state = timeout(
            Duration::from_secs(1),
            watch.wait_for(SessionState::is_authenticated),
        )
        .await
        .unwrap()
        .unwrap()
        .clone();
        shell.sync_session(&state).await;

        // Assert
        assert_eq!(shell.tab(), Tab::Dashboard);
        assert_eq!(
            shell.identity().map(|i| i.email.as_str()),
            Some("admin@example.com")
        );
        let Panel::Dashboard(stats) = shell.panel() else {
            panic!("dashboard not shown");
        };
        assert_eq!(stats.posts, Some(1));
    }

    #[tokio::test]
    async fn test_sign_out_resets_shell() {
        let store = MemoryStore::new();
        let mut shell = AdminShell::new(init_repository(store));
        let identity = Identity {
            id: "user-1".to_string(),
            email: "admin@example.com".to_string(),
            last_sign_in_at: None,
        };
        shell
            .sync_session(&SessionState::Authenticated(identity))
            .await;
        shell.select_tab(Tab::Posts).await;
        assert!(matches!(shell.panel(), Panel::Posts(_)));

        shell.sync_session(&SessionState::Anonymous).await;

        assert_eq!(shell.tab(), Tab::Dashboard);
        assert!(shell.identity().is_none());
        assert!(matches!(shell.panel(), Panel::Dashboard(_)));
    }

    #[tokio::test]
    async fn test_placeholder_tabs() {
        let mut shell = AdminShell::new(init_repository(MemoryStore::new()));

        shell.select_tab(Tab::Friends).await;

        assert!(matches!(shell.panel(), Panel::Placeholder(Tab::Friends)));
    }
}
