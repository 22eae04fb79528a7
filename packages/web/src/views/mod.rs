//! Minimal server-rendered pages. Every piece of user-supplied text goes through
//! [`escape`] before it reaches the markup.

mod auth_forms;
pub use auth_forms::{login_page, register_page};

mod home;
pub use home::{home_page, main_page};

mod trail;
pub use trail::trail_page;

mod message;
pub use message::message_page;

pub(crate) fn escape(text: &str) -> String {
    htmlescape::encode_minimal(text)
}

pub(crate) fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n<body>\n{body}\n</body>\n</html>\n",
        title = escape(title),
    )
}
