//! HTTP response building module
//!
//! Plain-text errors and redirects, the non-JSON counterparts of the
//! helpers in [`super::json`].

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{CONTENT_TYPE, LOCATION, X_CONTENT_TYPE_OPTIONS};
use hyper::{Method, Response, StatusCode};

use crate::handler::HttpResponse;

pub const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";
const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Build a plain-text error response; the body is `message` plus a newline
pub fn text_error(message: &str, status: StatusCode) -> HttpResponse {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, TEXT_CONTENT_TYPE)
        .header(X_CONTENT_TYPE_OPTIONS, "nosniff")
        .body(Full::new(Bytes::from(format!("{message}\n"))))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build a redirect to `location`.
///
/// GET and HEAD requests get a short HTML note pointing at the target
/// (HEAD keeps the headers but drops the body); other methods get no body.
pub fn build_redirect_response(location: &str, status: StatusCode, method: &Method) -> HttpResponse {
    let mut builder = Response::builder().status(status).header(LOCATION, location);

    let body = if *method == Method::GET || *method == Method::HEAD {
        builder = builder.header(CONTENT_TYPE, HTML_CONTENT_TYPE);
        if *method == Method::GET {
            Bytes::from(format!(
                "<a href=\"{}\">{}</a>.\n",
                html_escape(location),
                status.canonical_reason().unwrap_or("Redirect")
            ))
        } else {
            Bytes::new()
        }
    } else {
        Bytes::new()
    };

    builder.body(Full::new(body)).unwrap_or_else(|e| {
        log_build_error(status.as_str(), &e);
        text_error("invalid redirect location", StatusCode::BAD_REQUEST)
    })
}

fn html_escape(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&#34;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Log response build error
pub(crate) fn log_build_error(kind: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {kind} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_bytes(resp: HttpResponse) -> Bytes {
        resp.into_body().collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn test_text_error() {
        let resp = text_error("boom", StatusCode::BAD_REQUEST);
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(resp.headers()[CONTENT_TYPE], TEXT_CONTENT_TYPE);
        assert_eq!(resp.headers()[X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert_eq!(&body_bytes(resp).await[..], b"boom\n");
    }

    #[tokio::test]
    async fn test_redirect_get_has_html_body() {
        let resp = build_redirect_response(
            "https://example.com/a?b=1&c=2",
            StatusCode::MOVED_PERMANENTLY,
            &Method::GET,
        );
        assert_eq!(resp.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(resp.headers()[LOCATION], "https://example.com/a?b=1&c=2");
        assert_eq!(resp.headers()[CONTENT_TYPE], HTML_CONTENT_TYPE);
        assert_eq!(
            &body_bytes(resp).await[..],
            b"<a href=\"https://example.com/a?b=1&amp;c=2\">Moved Permanently</a>.\n"
        );
    }

    #[tokio::test]
    async fn test_redirect_head_has_no_body() {
        let resp =
            build_redirect_response("https://example.com/", StatusCode::FOUND, &Method::HEAD);
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(resp.headers()[CONTENT_TYPE], HTML_CONTENT_TYPE);
        assert!(body_bytes(resp).await.is_empty());
    }

    #[tokio::test]
    async fn test_redirect_post_has_no_content_type() {
        let resp = build_redirect_response(
            "https://example.com/",
            StatusCode::MOVED_PERMANENTLY,
            &Method::POST,
        );
        assert!(resp.headers().get(CONTENT_TYPE).is_none());
        assert!(body_bytes(resp).await.is_empty());
    }

    #[test]
    fn test_redirect_invalid_location() {
        let resp = build_redirect_response("bad\nlocation", StatusCode::FOUND, &Method::GET);
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&#34;x&#34;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
    }
}
