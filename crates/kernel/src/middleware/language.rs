//! Locale routing middleware.
//!
//! Resolves the active language for each request using a chain of
//! negotiators and issues the redirects/rewrites that keep public pages on
//! language-prefixed paths:
//!
//! - `/en/notre-maison` is rewritten to `/notre-maison` with language "en",
//!   so routes see the clean path.
//! - `/fr/...` (the default language) answers 308 to the unprefixed path —
//!   one canonical URL per page.
//! - An unprefixed path whose negotiated language is not the default
//!   answers 307 to the prefixed path.
//!
//! Resolution order: URL prefix → preference cookie → Accept-Language →
//! default.

use std::collections::HashSet;

use axum::{
    body::Body,
    http::{Request, StatusCode, Uri},
    response::{IntoResponse, Response},
};

use crate::state::AppState;

/// Cookie carrying the visitor's language preference.
pub const LANGUAGE_COOKIE: &str = "preferred_language";

/// The resolved language for the current request.
///
/// Stored in request extensions for per-request access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLanguage(pub String);

/// Trait for language negotiation strategies.
///
/// Implementations inspect the request and return a language code if they
/// can determine the desired language. The chain is sorted by priority
/// (highest first) and the first match wins.
pub trait LanguageNegotiator: Send + Sync {
    /// Attempt to negotiate a language from the request.
    fn negotiate(&self, request: &Request<Body>) -> Option<String>;

    /// Priority of this negotiator (higher = checked first).
    fn priority(&self) -> i32;
}

/// Negotiates language from the visitor's preference cookie.
pub struct CookieNegotiator {
    known_languages: HashSet<String>,
}

impl CookieNegotiator {
    pub fn new(known_languages: Vec<String>) -> Self {
        Self {
            known_languages: known_languages.into_iter().collect(),
        }
    }
}

impl LanguageNegotiator for CookieNegotiator {
    fn negotiate(&self, request: &Request<Body>) -> Option<String> {
        let lang = crate::middleware::cookie_value(request.headers(), LANGUAGE_COOKIE)?;
        self.known_languages.get(&lang).cloned()
    }

    fn priority(&self) -> i32 {
        75
    }
}

/// Negotiates language from the Accept-Language HTTP header.
///
/// Parses quality values and returns the highest-quality language that
/// matches a known language.
pub struct AcceptLanguageNegotiator {
    known_languages: HashSet<String>,
}

impl AcceptLanguageNegotiator {
    pub fn new(known_languages: Vec<String>) -> Self {
        Self {
            known_languages: known_languages.into_iter().collect(),
        }
    }

    /// Parse an Accept-Language header value into (language, quality) pairs,
    /// sorted by quality descending (stable sort preserves original order
    /// for ties).
    fn parse_accept_language(header: &str) -> Vec<(String, f32)> {
        let mut langs: Vec<(String, f32)> = header
            .split(',')
            .filter_map(|part| {
                let part = part.trim();
                if part.is_empty() {
                    return None;
                }

                let mut segments = part.split(';');
                let lang = segments.next()?.trim().to_lowercase();

                let quality = segments
                    .find_map(|s| {
                        let s = s.trim();
                        s.strip_prefix("q=")
                            .and_then(|q| q.trim().parse::<f32>().ok())
                    })
                    .unwrap_or(1.0)
                    .clamp(0.0, 1.0); // RFC 7231 §5.3.1: quality values are 0.000–1.000

                Some((lang, quality))
            })
            .collect();

        langs.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        langs
    }
}

impl LanguageNegotiator for AcceptLanguageNegotiator {
    fn negotiate(&self, request: &Request<Body>) -> Option<String> {
        let header = request.headers().get("accept-language")?.to_str().ok()?;

        for (lang, _quality) in Self::parse_accept_language(header) {
            if self.known_languages.contains(&lang) {
                return Some(lang);
            }
            // Primary subtag fallback (e.g., "en-US" → "en")
            if let Some(primary) = lang.split('-').next()
                && self.known_languages.contains(primary)
            {
                return Some(primary.to_string());
            }
        }

        None
    }

    fn priority(&self) -> i32 {
        50
    }
}

/// Extract a known language prefix from a URL path.
///
/// Returns `Some((language, remaining_path))` when the first path segment is
/// a known language code. The prefix must be followed by `/` or be the
/// entire path, preventing false matches like `/enfleurage`.
pub fn extract_prefix<'a>(path: &'a str, known_languages: &'a [String]) -> Option<(&'a str, &'a str)> {
    let trimmed = path.strip_prefix('/')?;

    let (candidate, rest) = match trimmed.find('/') {
        Some(pos) => (&trimmed[..pos], &trimmed[pos..]),
        None => (trimmed, ""),
    };

    let lang = known_languages
        .iter()
        .find(|l| l.as_str() == candidate)?
        .as_str();

    if rest.is_empty() {
        // Bare prefix like "/en" → language "en", path "/"
        Some((lang, "/"))
    } else {
        Some((lang, rest))
    }
}

/// Outcome of locale routing for one request.
pub enum RouteAction {
    /// Locale routing produced its own response (a redirect).
    Redirect(Response),
    /// Forward the (possibly rewritten) request to the routes.
    Forward(Request<Body>),
}

/// Apply locale routing to a request.
///
/// System paths (`/api`, `/health`, `/static`) bypass negotiation and run
/// with the default language.
pub fn route(state: &AppState, mut request: Request<Body>) -> RouteAction {
    let path = request.uri().path().to_string();
    let default_language = state.default_language();

    if path.starts_with("/api") || path == "/health" || path.starts_with("/static") {
        request
            .extensions_mut()
            .insert(ResolvedLanguage(default_language.to_string()));
        return RouteAction::Forward(request);
    }

    let query = request.uri().query().map(str::to_string);

    if let Some((lang, rest)) = extract_prefix(&path, state.known_languages()) {
        if lang == default_language {
            // Default-language prefix is redirected to the bare path: /fr/x
            // and /x must not both serve the same page.
            return RouteAction::Redirect(redirect_response(
                StatusCode::PERMANENT_REDIRECT,
                &with_query(rest, query.as_deref()),
            ));
        }

        // Strip the prefix so routes see the clean path.
        let lang = lang.to_string();
        let rewritten = with_query(rest, query.as_deref());
        match rewrite_uri(&rewritten) {
            Ok(new_uri) => {
                tracing::debug!(
                    original = %request.uri(),
                    new_uri = %new_uri,
                    language = %lang,
                    "stripped language prefix from URI"
                );
                *request.uri_mut() = new_uri;
            }
            Err(e) => {
                tracing::warn!(error = %e, path = %path, "failed to rewrite URI, keeping original");
            }
        }
        request.extensions_mut().insert(ResolvedLanguage(lang));
        return RouteAction::Forward(request);
    }

    // Unprefixed path: negotiate from cookie / Accept-Language.
    let language = select_language(
        state.language_negotiators(),
        &request,
        default_language,
    );

    if language != default_language {
        let target = format!("/{language}{path}");
        return RouteAction::Redirect(redirect_response(
            StatusCode::TEMPORARY_REDIRECT,
            &with_query(&target, query.as_deref()),
        ));
    }

    request
        .extensions_mut()
        .insert(ResolvedLanguage(language));
    RouteAction::Forward(request)
}

/// Select the active language from the negotiator chain, falling back to
/// the default (sync, testable).
fn select_language(
    negotiators: &[std::sync::Arc<dyn LanguageNegotiator>],
    request: &Request<Body>,
    default_language: &str,
) -> String {
    for negotiator in negotiators {
        if let Some(lang) = negotiator.negotiate(request) {
            return lang;
        }
    }
    default_language.to_string()
}

/// Append a query string to a path when present.
fn with_query(path: &str, query: Option<&str>) -> String {
    match query {
        Some(q) => format!("{path}?{q}"),
        None => path.to_string(),
    }
}

/// Parse a rewritten path (plus optional query) into a URI.
fn rewrite_uri(path_and_query: &str) -> Result<Uri, axum::http::uri::InvalidUri> {
    path_and_query.parse()
}

/// Build a redirect response.
///
/// The location is sanitized against CRLF injection: HTTP header values
/// must not contain `\r` or `\n`.
fn redirect_response(status: StatusCode, location: &str) -> Response {
    let safe_location: String = location
        .chars()
        .filter(|c| *c != '\r' && *c != '\n')
        .collect();

    (status, [("location", safe_location)]).into_response()
}
