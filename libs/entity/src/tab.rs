use serde::{Deserialize, Serialize};

/// Sections of the admin shell, in sidebar order.
#[derive(
    Debug,
    Default,
    PartialEq,
    Eq,
    Clone,
    Copy,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Tab {
    #[default]
    Dashboard,
    Posts,
    Talking,
    Friends,
    Settings,
}

impl Tab {
    pub fn label(&self) -> &'static str {
        match self {
            Tab::Dashboard => "Dashboard",
            Tab::Posts => "Posts",
            Tab::Talking => "Talking",
            Tab::Friends => "Friends",
            Tab::Settings => "Settings",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Tab::Dashboard => "📊",
            Tab::Posts => "📝",
            Tab::Talking => "💬",
            Tab::Friends => "👥",
            Tab::Settings => "⚙️",
        }
    }
}
