use axum::{debug_handler, http::{header, StatusCode}, response::{Html, IntoResponse, Redirect, Response}};
use pulldown_cmark::{CowStr, Event, Options, Parser, Tag};
use time::OffsetDateTime;

use crate::{db::User, AppResult};

#[macro_export]
macro_rules! include_res {
    (bytes, $p:expr) => {
        include_bytes!(concat!(env!("CARGO_MANIFEST_DIR"), "/res", $p))
    };
    (str, $p:expr) => {
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/res", $p))
    };
}

#[debug_handler]
pub async fn stylesheet() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css")], include_res!(str, "/style.css"))
}

/// Replaces each `{key}` in `template` with its value in one pass, so substituted
/// text is never scanned again. Unknown `{...}` sequences are kept as they are.
pub fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start + 1..];
        let value = tail
            .find('}')
            .and_then(|end| values.iter().find(|(key, _)| *key == &tail[..end]));
        match value {
            Some((key, value)) => {
                out.push_str(value);
                rest = &tail[key.len() + 1..];
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Markdown to HTML, with any raw HTML in the source shown as text and
/// link targets limited to web and mail schemes.
pub fn markdown(source: &str) -> String {
    let parser = Parser::new_ext(source, Options::ENABLE_STRIKETHROUGH)
        .map(|event| match event {
            Event::Html(html) | Event::InlineHtml(html) => Event::Text(html),
            Event::Start(Tag::Link { link_type, dest_url, title, id }) => {
                Event::Start(Tag::Link { link_type, dest_url: safe_link(dest_url), title, id })
            }
            Event::Start(Tag::Image { link_type, dest_url, title, id }) => {
                Event::Start(Tag::Image { link_type, dest_url: safe_link(dest_url), title, id })
            }
            _ => event,
        });

    let mut html_output = String::new();
    pulldown_cmark::html::push_html(&mut html_output, parser);
    html_output
}

const LINK_SCHEMES: [&str; 3] = ["http", "https", "mailto"];

/// Relative targets pass; a target with any other scheme becomes `#`.
/// Browsers drop whitespace and control characters inside a scheme, so they are ignored here too.
fn safe_link(dest: CowStr<'_>) -> CowStr<'_> {
    let Some(colon) = dest.find(':') else {
        return dest;
    };
    let candidate = &dest[..colon];
    if candidate.contains(['/', '?', '#']) {
        return dest;
    }

    let scheme: String = candidate
        .chars()
        .filter(|c| !c.is_ascii_control() && !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    if LINK_SCHEMES.contains(&scheme.as_str()) {
        dest
    } else {
        CowStr::Borrowed("#")
    }
}

pub fn timesince(then: i64) -> String {
    timesince_at(then, OffsetDateTime::now_utc().unix_timestamp())
}

fn timesince_at(then: i64, now: i64) -> String {
    let secs = (now - then).max(0);
    let (n, unit) = match secs {
        0..60 => return "just now".to_owned(),
        60..3_600 => (secs / 60, "minute"),
        3_600..86_400 => (secs / 3_600, "hour"),
        86_400..2_592_000 => (secs / 86_400, "day"),
        2_592_000..31_536_000 => (secs / 2_592_000, "month"),
        _ => (secs / 31_536_000, "year"),
    };
    format!("{n} {unit}{} ago", if n == 1 { "" } else { "s" })
}

pub fn error_list(errors: &[String]) -> String {
    errors
        .iter()
        .map(|e| format!("<li>{}</li>", escape(e)))
        .collect()
}

/// Wraps `content` in the site layout with the navigation bar and pending flash messages.
pub fn page(title: &str, user: Option<&User>, flashes: &[String], content: &str) -> Html<String> {
    let nav = match user {
        Some(user) => fill(include_res!(str, "/pages/nav_user.html"), &[
            ("user_id", &escape(&user.id)),
            ("username", &escape(&user.username)),
        ]),
        None => include_res!(str, "/pages/nav_anon.html").to_owned(),
    };

    let flashes = if flashes.is_empty() {
        String::new()
    } else {
        format!(r#"<ul class="flashes">{}</ul>"#, error_list(flashes))
    };

    Html(fill(include_res!(str, "/pages/layout.html"), &[
        ("title", &escape(title)),
        ("nav", &nav),
        ("flashes", &flashes),
        ("content", content),
    ]))
}

pub fn sorry(what: &str) -> AppResult<Response> {
    Ok((
        StatusCode::NOT_FOUND,
        Html(fill(include_res!(str, "/pages/sorry.html"), &[("what", &escape(what))])),
    ).into_response())
}

pub fn denied() -> AppResult<Response> {
    Ok((StatusCode::FORBIDDEN, "You can't perform the operation").into_response())
}

pub fn login_redirect(return_url: &str) -> AppResult<Response> {
    let query = urlencoding::encode(return_url);
    Ok(Redirect::to(&format!("/login?return_url={query}")).into_response())
}

/// Only local absolute paths are followed after login. Browsers strip control
/// characters and whitespace from `Location`, so any of them rejects the url.
pub fn safe_return_url(return_url: Option<&str>) -> &str {
    match return_url {
        Some(url)
            if url.starts_with('/')
                && !url.starts_with("//")
                && !url.contains('\\')
                && !url.chars().any(|c| c.is_ascii_control() || c.is_whitespace()) =>
        {
            url
        }
        _ => "/",
    }
}
