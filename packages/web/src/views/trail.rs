use api::UserInfo;
use store::{Comment, Trail};

use super::{escape, layout};

pub fn trail_page(trail: Trail, comments: &[Comment], user: Option<&UserInfo>) -> String {
    let list = if comments.is_empty() {
        "<p>No comments yet.</p>".to_string()
    } else {
        let items: String = comments
            .iter()
            .map(|c| {
                format!(
                    "<li><p>{}</p><small>{} &middot; {}</small></li>\n",
                    escape(&c.content),
                    escape(&c.author_email),
                    c.created_at.format("%Y-%m-%d %H:%M UTC")
                )
            })
            .collect();
        format!("<ul class=\"comments\">\n{items}</ul>")
    };

    let form = match user {
        Some(_) => format!(
            r#"<form method="post" action="/{}">
<textarea name="content" required></textarea>
<button type="submit">Post comment</button>
</form>"#,
            trail.name()
        ),
        None => "<p><a href=\"/login\">Log in</a> to leave a comment.</p>".to_string(),
    };

    let body = format!(
        "<h1>{}</h1>\n<h2>Comments</h2>\n{list}\n{form}\n<p><a href=\"/\">Home</a></p>",
        trail.title()
    );
    layout(trail.title(), &body)
}
