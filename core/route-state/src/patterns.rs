//! Compiled regex patterns for route names.
//!
//! Compiled once on first use. A route name is one or more identifier
//! segments joined by dots (`posts`, `posts.post`, `admin.user-settings`).

use once_cell::sync::Lazy;
use regex::Regex;

pub static RE_ROUTE_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_-]*(\.[A-Za-z_][A-Za-z0-9_-]*)*$").unwrap()
});

pub static RE_SEGMENT_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());
