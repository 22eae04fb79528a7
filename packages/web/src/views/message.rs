use super::{escape, layout};

/// A page carrying a single message and a way back.
pub fn message_page(title: &str, message: &str, back: &str) -> String {
    let body = format!(
        "<h1>{}</h1>\n<p>{}</p>\n<p><a href=\"{}\">Back</a></p>",
        escape(title),
        escape(message),
        escape(back)
    );
    layout(title, &body)
}
