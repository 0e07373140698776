//! Built-in page rendering.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use serde_json::{Value, json};

use crate::auth::SessionContext;
use crate::error::Error;
use crate::state::AppState;
use crate::traits::Renderer;

/// Render `view` for the current caller and commit the session.
///
/// Adds `flashes` (drained from the session) and `current_user` to `data`
/// before rendering. A renderer failure is logged and answered with 500.
pub(crate) fn render_page(
    state: &AppState,
    mut session: SessionContext,
    view: &str,
    mut data: Value,
) -> Response {
    let flashes = session.take_flashes();
    let current_user = session.identity().map(|identity| {
        json!({ "login": identity.login, "display_name": identity.display_name })
    });
    if let Value::Object(map) = &mut data {
        map.insert("flashes".into(), json!(flashes));
        map.insert("current_user".into(), json!(current_user));
    }

    let body = match state.renderer.render(view, &data) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!(view, error = %e, "Page rendering failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response()
        }
    };
    (session.commit(), body).into_response()
}

/// HTML renderer for every page of the site.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlRenderer;

impl Renderer for HtmlRenderer {
    fn render(&self, view: &str, data: &Value) -> Result<String, Error> {
        let body = match view {
            "index" => index(),
            "posts" => posts(data)?,
            "post" => post(data)?,
            "about" => about(),
            "url_params" => pair_table(data, "params", "Parameter", "Value")?,
            "headers" => pair_table(data, "headers", "Header", "Value")?,
            "cookies" => cookies(data)?,
            "form_params" => form_params(data)?,
            "phone_validation" => phone_validation(data)?,
            "login" => login(data)?,
            "counter" => counter(data)?,
            "secret" => secret(data)?,
            other => return Err(Error::Render(format!("unknown view `{other}`"))),
        };
        layout(data, &body)
    }
}

// ── Field access ───────────────────────────────────────────────────

fn field<'a>(data: &'a Value, key: &str) -> Result<&'a Value, Error> {
    data.get(key)
        .ok_or_else(|| Error::Render(format!("missing field `{key}`")))
}

fn text<'a>(data: &'a Value, key: &str) -> Result<&'a str, Error> {
    field(data, key)?
        .as_str()
        .ok_or_else(|| Error::Render(format!("field `{key}` is not a string")))
}

fn opt_text<'a>(data: &'a Value, key: &str) -> Option<&'a str> {
    data.get(key).and_then(Value::as_str)
}

fn array<'a>(data: &'a Value, key: &str) -> Result<&'a [Value], Error> {
    field(data, key)?
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| Error::Render(format!("field `{key}` is not an array")))
}

/// `[[name, value], ...]` as string pairs.
fn pairs<'a>(data: &'a Value, key: &str) -> Result<Vec<(&'a str, &'a str)>, Error> {
    array(data, key)?
        .iter()
        .map(|pair| match pair.as_array().map(Vec::as_slice) {
            Some([Value::String(name), Value::String(value)]) => Ok((name.as_str(), value.as_str())),
            _ => Err(Error::Render(format!("field `{key}` holds a malformed pair"))),
        })
        .collect()
}

/// Escape text for HTML element content and attribute values.
#[must_use]
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// ── Layout ─────────────────────────────────────────────────────────

const NAV: &[(&str, &str)] = &[
    ("/", "Home"),
    ("/posts", "Posts"),
    ("/about", "About"),
    ("/url-params", "URL params"),
    ("/headers", "Headers"),
    ("/cookies", "Cookies"),
    ("/form_params", "Form params"),
    ("/phone_validation", "Phone"),
    ("/counter", "Counter"),
    ("/secret", "Secret"),
];

fn layout(data: &Value, body: &str) -> Result<String, Error> {
    let title = text(data, "title")?;

    let mut nav = String::new();
    for (href, label) in NAV {
        nav.push_str(&format!(
            "<li class=\"nav-item\"><a class=\"nav-link\" href=\"{href}\">{label}</a></li>"
        ));
    }
    match data.get("current_user").filter(|u| !u.is_null()) {
        Some(user) => nav.push_str(&format!(
            "<li class=\"nav-item\"><span class=\"navbar-text\">{}</span></li>\
             <li class=\"nav-item\"><a class=\"nav-link\" href=\"/logout\">Log out</a></li>",
            escape(text(user, "display_name")?)
        )),
        None => nav.push_str(
            "<li class=\"nav-item\"><a class=\"nav-link\" href=\"/login\">Log in</a></li>",
        ),
    }

    let mut notices = String::new();
    if let Some(flashes) = data.get("flashes").and_then(Value::as_array) {
        for flash in flashes {
            notices.push_str(&format!(
                "<div class=\"alert alert-{}\" role=\"alert\">{}</div>",
                escape(&level_class(text(flash, "level")?)),
                escape(text(flash, "message")?)
            ));
        }
    }

    Ok(format!(
        "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n\
         <link rel=\"stylesheet\" href=\"https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/css/bootstrap.min.css\">\n\
         </head>\n<body>\n\
         <nav class=\"navbar navbar-expand bg-light\"><ul class=\"navbar-nav\">{nav}</ul></nav>\n\
         <main class=\"container my-4\">\n{notices}\n{body}\n</main>\n</body>\n</html>\n",
        title = escape(title),
    ))
}

/// Serialized flash level to Bootstrap alert suffix.
fn level_class(level: &str) -> String {
    match level {
        "error" => "danger".to_string(),
        other => other.to_string(),
    }
}

// ── Views ──────────────────────────────────────────────────────────

fn index() -> String {
    let mut links = String::new();
    for (href, label) in NAV.iter().skip(1) {
        links.push_str(&format!("<li><a href=\"{href}\">{label}</a></li>"));
    }
    format!(
        "<h1>Lab assignment</h1>\n\
         <p>A tour of web framework features: templates, generated content, \
         request inspection, cookies, forms, validation and login.</p>\n<ul>{links}</ul>"
    )
}

fn posts(data: &Value) -> Result<String, Error> {
    let mut cards = String::new();
    for (index, post) in array(data, "posts")?.iter().enumerate() {
        cards.push_str(&format!(
            "<div class=\"card mb-3\">\
             <img class=\"card-img-top\" src=\"/static/images/{image}\" alt=\"\">\
             <div class=\"card-body\"><h5 class=\"card-title\">{title}</h5>\
             <p class=\"card-text\">{author}, {date}</p>\
             <a href=\"/posts/{index}\">Read more</a></div></div>",
            image = escape(text(post, "image_id")?),
            title = escape(text(post, "title")?),
            author = escape(text(post, "author")?),
            date = escape(text(post, "date")?),
        ));
    }
    Ok(format!("<h1>Latest posts</h1>\n{cards}"))
}

fn post(data: &Value) -> Result<String, Error> {
    let post = field(data, "post")?;
    let mut comments = String::new();
    for comment in array(post, "comments")? {
        comments.push_str(&comment_html(comment)?);
    }
    Ok(format!(
        "<article>\n<h1>{title}</h1>\n\
         <p class=\"text-muted\">Author: {author} &middot; Date: {date}</p>\n\
         <img class=\"img-fluid\" src=\"/static/images/{image}\" alt=\"\">\n\
         <p>{body}</p>\n</article>\n\
         <section>\n<h2>Comments</h2>\n\
         <form class=\"mb-3\"><textarea class=\"form-control\" name=\"text\"></textarea>\
         <button class=\"btn btn-primary mt-2\" type=\"button\">Send</button></form>\n\
         {comments}</section>",
        title = escape(text(post, "title")?),
        author = escape(text(post, "author")?),
        date = escape(text(post, "date")?),
        image = escape(text(post, "image_id")?),
        body = escape(text(post, "text")?),
    ))
}

fn comment_html(comment: &Value) -> Result<String, Error> {
    let mut replies = String::new();
    if let Some(items) = comment.get("replies").and_then(Value::as_array) {
        for reply in items {
            replies.push_str(&comment_html(reply)?);
        }
    }
    Ok(format!(
        "<div class=\"d-flex mb-3\"><div class=\"ms-3\">\
         <strong>{author}</strong><p>{text}</p>{replies}</div></div>",
        author = escape(text(comment, "author")?),
        text = escape(text(comment, "text")?),
    ))
}

fn about() -> String {
    "<h1>About the author</h1>\n\
     <p>A learning project exploring how a web framework routes requests, \
     renders pages and keeps state between them.</p>"
        .to_string()
}

fn pair_table(data: &Value, key: &str, name_col: &str, value_col: &str) -> Result<String, Error> {
    let title = text(data, "title")?;
    let mut rows = String::new();
    for (name, value) in pairs(data, key)? {
        rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td></tr>",
            escape(name),
            escape(value)
        ));
    }
    Ok(format!(
        "<h1>{}</h1>\n<table class=\"table\"><thead><tr><th>{name_col}</th><th>{value_col}</th></tr></thead>\
         <tbody>{rows}</tbody></table>",
        escape(title)
    ))
}

fn cookies(data: &Value) -> Result<String, Error> {
    Ok(format!(
        "<h1>Cookie</h1>\n<p>{message}</p>\n\
         <form method=\"post\" action=\"/cookies\">\
         <button class=\"btn btn-primary\" name=\"action\" value=\"set\">Set cookie</button> \
         <button class=\"btn btn-danger\" name=\"action\" value=\"delete\">Delete cookie</button>\
         </form>",
        message = escape(text(data, "message")?),
    ))
}

fn form_params(data: &Value) -> Result<String, Error> {
    let mut rows = String::new();
    for (name, value) in pairs(data, "form_data")? {
        rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td></tr>",
            escape(name),
            escape(value)
        ));
    }
    let table = if rows.is_empty() {
        String::new()
    } else {
        format!(
            "<table class=\"table\"><thead><tr><th>Field</th><th>Value</th></tr></thead>\
             <tbody>{rows}</tbody></table>"
        )
    };
    Ok(format!(
        "<h1>{title}</h1>\n\
         <form method=\"post\" action=\"/form_params\">\
         <input class=\"form-control mb-2\" name=\"field1\" placeholder=\"field1\">\
         <input class=\"form-control mb-2\" name=\"field2\" placeholder=\"field2\">\
         <button class=\"btn btn-primary\" type=\"submit\">Submit</button></form>\n{table}",
        title = escape(text(data, "title")?),
    ))
}

fn phone_validation(data: &Value) -> Result<String, Error> {
    let phone = opt_text(data, "phone").unwrap_or_default();
    let (input_class, feedback) = match opt_text(data, "error") {
        Some(error) => (
            "form-control is-invalid",
            format!("<div class=\"invalid-feedback\">{}</div>", escape(error)),
        ),
        None => ("form-control", String::new()),
    };
    let result = opt_text(data, "formatted_phone")
        .map(|formatted| {
            format!(
                "<div class=\"alert alert-success\">Formatted number: {}</div>",
                escape(formatted)
            )
        })
        .unwrap_or_default();
    Ok(format!(
        "<h1>{title}</h1>\n\
         <form method=\"post\" action=\"/phone_validation\">\
         <input class=\"{input_class}\" name=\"phone\" value=\"{phone}\" placeholder=\"+7 (123) 456-75-90\">\
         {feedback}<button class=\"btn btn-primary mt-2\" type=\"submit\">Check</button></form>\n{result}",
        title = escape(text(data, "title")?),
        phone = escape(phone),
    ))
}

fn login(data: &Value) -> Result<String, Error> {
    let action = match opt_text(data, "next") {
        Some(next) => format!("/login?next={}", urlencoding::encode(next)),
        None => "/login".to_string(),
    };
    Ok(format!(
        "<h1>Log in</h1>\n\
         <form method=\"post\" action=\"{action}\">\
         <input class=\"form-control mb-2\" name=\"login\" value=\"{login}\" placeholder=\"Login\">\
         <input class=\"form-control mb-2\" type=\"password\" name=\"password\" placeholder=\"Password\">\
         <div class=\"form-check mb-2\"><input class=\"form-check-input\" type=\"checkbox\" \
         name=\"remember\" id=\"remember\"><label class=\"form-check-label\" for=\"remember\">Remember me</label></div>\
         <button class=\"btn btn-primary\" type=\"submit\">Log in</button></form>",
        action = escape(&action),
        login = escape(opt_text(data, "login").unwrap_or_default()),
    ))
}

fn counter(data: &Value) -> Result<String, Error> {
    let count = field(data, "count")?
        .as_u64()
        .ok_or_else(|| Error::Render("field `count` is not a number".into()))?;
    Ok(format!(
        "<h1>Visit counter</h1>\n<p>You have visited this page <span id=\"count\">{count}</span> time(s).</p>"
    ))
}

fn secret(data: &Value) -> Result<String, Error> {
    Ok(format!(
        "<h1>Secret page</h1>\n<p>Only logged-in users can see this. Welcome, {}.</p>",
        escape(text(data, "display_name")?)
    ))
}
