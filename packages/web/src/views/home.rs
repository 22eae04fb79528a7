use api::UserInfo;
use store::Trail;

use super::{escape, layout};

fn trail_links() -> String {
    let items: String = Trail::ALL
        .iter()
        .map(|trail| format!("<li><a href=\"/{}\">{}</a></li>\n", trail.name(), trail.title()))
        .collect();
    format!("<ul>\n{items}</ul>")
}

/// Landing page. Shows login links to anonymous visitors.
pub fn home_page(user: Option<&UserInfo>) -> String {
    let account = match user {
        Some(user) => format!(
            "<p>Logged in as {} | <a href=\"/Main\">Trails</a> | <a href=\"/logout\">Log out</a></p>",
            escape(user.display_name())
        ),
        None => "<p><a href=\"/login\">Log in</a> | <a href=\"/register\">Register</a></p>".to_string(),
    };
    let body = format!("<h1>Hiking trails</h1>\n{account}\n{}", trail_links());
    layout("Hiking trails", &body)
}

/// Trail index for logged-in users.
pub fn main_page(user: &UserInfo) -> String {
    let body = format!(
        "<h1>Welcome, {}</h1>\n<p>Pick a trail to read and leave comments.</p>\n{}\n<p><a href=\"/logout\">Log out</a></p>",
        escape(user.display_name()),
        trail_links()
    );
    layout("Trails", &body)
}
