use admin::{
    dashboard::{DashboardStats, QUICK_ACTIONS},
    markdown::escape,
};
use entity::identity::Identity;

use crate::page;

fn stat(label: &str, count: Option<usize>) -> String {
    let count = count
        .map(|count| count.to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        r#"<div class="card stat"><strong>{}</strong>{}</div>"#,
        count, label
    )
}

pub(crate) fn render(identity: &Identity, stats: &DashboardStats) -> String {
    let last_sign_in = identity
        .last_sign_in_at
        .as_ref()
        .map(page::date)
        .unwrap_or_else(|| "never".to_string());

    let actions: String = QUICK_ACTIONS
        .iter()
        .map(|action| {
            format!(
                r#"<form class="inline" method="post" action="/tabs/{}"><button type="submit" class="action" style="background: {}">{} {}</button></form>"#,
                action.tab, action.color, action.icon, action.label
            )
        })
        .collect();

    format!(
        r#"<div class="card"><h2>Welcome back, {}</h2><p>Last sign-in: {}</p></div>
<h3>Overview</h3>
<div class="stats">{}{}{}{}</div>
<h3>Quick actions</h3>
<div class="actions">{}</div>"#,
        escape(&identity.email),
        last_sign_in,
        stat("Posts", stats.posts),
        stat("Talkings", stats.talkings),
        stat("Friends", stats.friends),
        stat("Views", Some(stats.views)),
        actions
    )
}
