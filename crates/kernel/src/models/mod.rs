//! Database models.
//!
//! Each entity is an explicit schema validated at the boundary; handlers
//! never operate on unchecked rows. Bilingual text lives in paired
//! `*_fr` / `*_en` columns; [`localized`] picks the projection for a
//! request language, falling back to French when the English text is
//! missing.

use std::sync::LazyLock;

use regex::Regex;

pub mod article;
pub mod contact;
pub mod product;
pub mod profile;
pub mod sample_request;
pub mod team_member;

pub use article::{Article, CreateArticle, UpdateArticle};
pub use contact::{ContactSubmission, CreateContactSubmission};
pub use product::{CreateProduct, Product, UpdateProduct};
pub use profile::Profile;
pub use sample_request::{CreateSampleRequest, SampleRequest};
pub use team_member::{CreateTeamMember, TeamMember, UpdateTeamMember};

#[allow(clippy::expect_used)]
static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex literal"));

#[allow(clippy::expect_used)]
static SLUG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("valid regex literal"));

/// Check that a string looks like an email address.
pub fn is_valid_email(value: &str) -> bool {
    EMAIL.is_match(value)
}

/// Check that a string is a URL-safe slug (lowercase, digits, hyphens).
pub fn is_valid_slug(value: &str) -> bool {
    value.len() <= 128 && SLUG.is_match(value)
}

/// Pick the localized projection of a bilingual field.
///
/// English is served only when present and non-empty; everything else falls
/// back to the French base text.
pub fn localized<'a>(fr: &'a str, en: Option<&'a str>, language: &str) -> &'a str {
    if language == "en"
        && let Some(en) = en
        && !en.is_empty()
    {
        en
    } else {
        fr
    }
}
