//! Inline HTML templates for the CMS pages

/// Wrap a page body in the shared layout, showing the flash message if any.
pub fn layout(title: &str, flash: Option<&str>, body: &str) -> String {
    let flash = flash
        .map(|message| format!(r#"<p class="flash">{}</p>"#, html_escape(message)))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{} - CMS</title>
    <style>{}</style>
</head>
<body>
    <div class="container">
        {}
        {}
    </div>
</body>
</html>"#,
        html_escape(title),
        CSS_STYLES,
        flash,
        body
    )
}

/// Document index with per-document actions and the sign-in status line.
pub fn index_body(names: &[String], username: Option<&str>) -> String {
    let items: String = names
        .iter()
        .map(|name| {
            let href = document_href(name);
            let name = html_escape(name);
            format!(
                r#"
            <li>
                <a href="{href}">{name}</a>
                <a href="{href}/edit" class="action">edit</a>
                <form method="post" action="{href}/delete" class="inline">
                    <button type="submit" class="action">delete</button>
                </form>
            </li>"#
            )
        })
        .collect();

    let status = match username {
        Some(user) => format!(
            r#"<p class="status">Signed in as {}.</p>
        <form method="post" action="/users/signout">
            <button type="submit">Sign Out</button>
        </form>"#,
            html_escape(user)
        ),
        None => r#"<p class="status"><a href="/users/signin">Sign In</a> or <a href="/users/new">Create an Account</a></p>"#
            .to_string(),
    };

    format!(
        r#"<h1>Documents</h1>
        <ul class="documents">{}
        </ul>
        <p><a href="/new" class="button">New Document</a></p>
        {}"#,
        items, status
    )
}

/// Body of a rendered document view.
pub fn document_body(rendered: &str) -> String {
    format!(
        r#"<article class="document">
{}
        </article>
        <p><a href="/">Back to documents</a></p>"#,
        rendered
    )
}

pub fn new_document_body(new_name: &str) -> String {
    format!(
        r#"<h1>New Document</h1>
        <form method="post" action="/new">
            <div class="field">
                <label for="new_name">Add a new document:</label>
                <input type="text" id="new_name" name="new_name" value="{}">
            </div>
            <button type="submit">Create</button>
        </form>"#,
        html_escape(new_name)
    )
}

pub fn edit_body(name: &str, contents: &str) -> String {
    format!(
        r#"<h1>Edit {}</h1>
        <form method="post" action="{}">
            <div class="field">
                <textarea name="new_contents" rows="20">{}</textarea>
            </div>
            <button type="submit">Save Changes</button>
        </form>"#,
        html_escape(name),
        document_href(name),
        html_escape(contents)
    )
}

pub fn signin_body(username: &str) -> String {
    format!(
        r#"<h1>Sign In</h1>
        <form method="post" action="/users/signin">
            <div class="field">
                <label for="username">Username</label>
                <input type="text" id="username" name="username" value="{}">
            </div>
            <div class="field">
                <label for="password">Password</label>
                <input type="password" id="password" name="password">
            </div>
            <button type="submit">Sign In</button>
        </form>
        <p>No account? <a href="/users/new">Create one</a>.</p>"#,
        html_escape(username)
    )
}

pub fn create_account_body(username: &str) -> String {
    format!(
        r#"<h1>Create an Account</h1>
        <form method="post" action="/users/new">
            <div class="field">
                <label for="username">Username</label>
                <input type="text" id="username" name="username" value="{}">
            </div>
            <div class="field">
                <label for="password1">Password</label>
                <input type="password" id="password1" name="password1">
            </div>
            <div class="field">
                <label for="password2">Confirm Password</label>
                <input type="password" id="password2" name="password2">
            </div>
            <button type="submit">Create Account</button>
        </form>"#,
        html_escape(username)
    )
}

/// Link target for a document, percent-encoded as a single path segment.
pub fn document_href(name: &str) -> String {
    format!("/{}", urlencoding::encode(name))
}

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

const CSS_STYLES: &str = r#"
* {
    box-sizing: border-box;
}
body {
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
    background: #f5f5f5;
    margin: 0;
    padding: 20px;
}
.container {
    max-width: 760px;
    margin: 40px auto;
    background: white;
    padding: 32px;
    border-radius: 8px;
    box-shadow: 0 2px 10px rgba(0,0,0,0.1);
}
.flash {
    background: #fff3cd;
    border: 1px solid #ffe69c;
    padding: 12px;
    border-radius: 4px;
}
.field {
    margin-bottom: 16px;
}
label {
    display: block;
    margin-bottom: 6px;
    font-weight: 500;
}
input, textarea {
    width: 100%;
    padding: 10px;
    border: 1px solid #ddd;
    border-radius: 4px;
    font-size: 15px;
}
textarea {
    font-family: monospace;
}
button, .button {
    background: #7c3aed;
    color: white;
    border: none;
    padding: 10px 18px;
    border-radius: 4px;
    font-size: 15px;
    cursor: pointer;
    text-decoration: none;
    display: inline-block;
}
.documents li {
    margin-bottom: 8px;
}
.action {
    margin-left: 8px;
    font-size: 13px;
    padding: 2px 8px;
}
form.inline {
    display: inline;
}
pre {
    white-space: pre-wrap;
}
"#;
