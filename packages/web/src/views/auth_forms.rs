//! Registration and login forms.

use super::layout;

fn credentials_form(action: &str, submit: &str) -> String {
    format!(
        r#"<form method="post" action="{action}">
<label>Email <input type="email" name="email" required></label>
<label>Password <input type="password" name="password" required></label>
<button type="submit">{submit}</button>
</form>"#
    )
}

pub fn register_page() -> String {
    let body = format!(
        "<h1>Register</h1>\n{}\n<p>Already registered? <a href=\"/login\">Log in</a></p>",
        credentials_form("/register", "Create account")
    );
    layout("Register", &body)
}

pub fn login_page() -> String {
    let body = format!(
        "<h1>Log in</h1>\n{}\n<p>No account yet? <a href=\"/register\">Register</a></p>",
        credentials_form("/login", "Log in")
    );
    layout("Log in", &body)
}
