//! Route flattening.
//!
//! Walks a nested [`UrlPattern`] tree depth-first and produces one [`RouteEntry`] per
//! documented endpoint. Include prefixes are concatenated with the local regex before the
//! combined regex is simplified into a Swagger path template, so `api/` mounted above
//! `^foo/(?P<id>\d+)/$` becomes `/api/foo/{id}/`.
//!
//! Entries are dropped when their view has no API capability, when they are the router's
//! API root index, when they are a `.{format}` twin, when an earlier entry already claimed
//! the same path, or when they do not contain the configured path filter.

use crate::handler::{ApiHandler, HandlerRef};
use crate::routes::{RoutePattern, UrlPattern};
use indexmap::IndexSet;
use log::debug;

/// Marker left in a path by a router format-suffix twin
const FORMAT_MARKER: &str = ".{format}";

/// Options controlling which routes are documented.
#[derive(Debug, Clone, Default)]
pub struct FlattenOptions {
    /// Include namespaces pruned without descending
    pub exclude_namespaces: IndexSet<String>,
    /// Keep only paths containing this substring
    pub filter_path: Option<String>,
}

/// A fully resolved, documentable endpoint.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    /// Absolute path template, e.g. `/api/cigars/{pk}/`
    pub path: String,
    pub pattern: RoutePattern,
    pub callback: HandlerRef,
}

/// Flattens a route tree into [`RouteEntry`] values.
pub struct UrlFlattener {
    options: FlattenOptions,
}

impl UrlFlattener {
    pub fn new(options: FlattenOptions) -> Self {
        Self { options }
    }

    /// Flatten `patterns` into the ordered list of documented endpoints.
    pub fn flatten(&self, patterns: &[UrlPattern]) -> Vec<RouteEntry> {
        let mut collected = Vec::new();
        self.walk(patterns, "", &mut collected);

        let mut seen = IndexSet::new();
        let entries: Vec<RouteEntry> = collected
            .into_iter()
            .filter(|entry| {
                if entry.path.contains(FORMAT_MARKER) {
                    debug!("Skipping format suffix route {}", entry.path);
                    return false;
                }
                if entry.callback.is_api_root() {
                    debug!("Skipping router API root {}", entry.path);
                    return false;
                }
                true
            })
            .filter(|entry| {
                if seen.insert(entry.path.clone()) {
                    true
                } else {
                    debug!("Skipping duplicate path {}", entry.path);
                    false
                }
            })
            .filter(|entry| match &self.options.filter_path {
                Some(filter) => entry.path.contains(filter.as_str()),
                None => true,
            })
            .collect();

        debug!("Flattened route tree into {} endpoints", entries.len());
        entries
    }

    fn walk(&self, patterns: &[UrlPattern], prefix: &str, out: &mut Vec<RouteEntry>) {
        for pattern in patterns {
            match pattern {
                UrlPattern::Route(route) => {
                    let regex = format!("{}{}", prefix, route.regex);
                    let Some(handler) = route.view.resolve() else {
                        debug!("Skipping non-API view {} at {}", route.view.name(), regex);
                        continue;
                    };
                    out.push(RouteEntry {
                        path: simplify_regex(&regex),
                        pattern: route.clone(),
                        callback: handler.clone(),
                    });
                }
                UrlPattern::Include(include) => {
                    if let Some(namespace) = &include.namespace {
                        if self.options.exclude_namespaces.contains(namespace) {
                            debug!("Excluding namespace {}", namespace);
                            continue;
                        }
                    }
                    let nested = format!("{}{}", prefix, include.regex);
                    self.walk(&include.patterns, &nested, out);
                }
            }
        }
    }
}

/// Convert a route regex into a Swagger path template.
///
/// Named groups become `{name}`, other capturing groups `{var}`. Anchors, optional
/// markers and repetition operators are removed and escapes are dropped. The result
/// always starts with `/` and never contains `//`.
pub fn simplify_regex(regex: &str) -> String {
    let simplified = simplify_fragment(regex);
    let mut path = if simplified.starts_with('/') {
        simplified
    } else {
        format!("/{}", simplified)
    };
    while path.contains("//") {
        path = path.replace("//", "/");
    }
    path
}

fn simplify_fragment(regex: &str) -> String {
    let chars: Vec<char> = regex.chars().collect();
    let mut out = String::with_capacity(regex.len());
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '\\' => {
                // shorthand classes such as \d or \w match no literal text
                if let Some(next) = chars.get(i + 1).filter(|c| !c.is_ascii_alphanumeric()) {
                    out.push(*next);
                }
                i += 2;
            }
            '[' => i = closing_bracket(&chars, i).map_or(chars.len(), |close| close + 1),
            '{' => match quantifier_end(&chars, i) {
                Some(close) => i = close + 1,
                None => {
                    out.push('{');
                    i += 1;
                }
            },
            '(' => {
                let close = closing_paren(&chars, i).unwrap_or(chars.len());
                let inner: String = chars[i + 1..close.min(chars.len())].iter().collect();
                out.push_str(&replace_group(&inner));
                i = close + 1;
            }
            '^' | '$' | '?' | '+' | '*' => i += 1,
            c => {
                out.push(c);
                i += 1;
            }
        }
    }

    out
}

fn replace_group(inner: &str) -> String {
    let named = inner
        .strip_prefix("?P<")
        .or_else(|| inner.strip_prefix("?<").filter(|rest| !rest.starts_with(['=', '!'])));
    if let Some(rest) = named {
        let name: String = rest.chars().take_while(|c| *c != '>').collect();
        return format!("{{{}}}", name);
    }
    if let Some(rest) = inner.strip_prefix("?:") {
        return simplify_fragment(rest);
    }
    if inner.starts_with('?') {
        // lookaround or inline flags
        return String::new();
    }
    "{var}".to_string()
}

/// Index of the paren closing the group opened at `open`.
fn closing_paren(chars: &[char], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_class = false;
    let mut i = open;

    while i < chars.len() {
        match chars[i] {
            '\\' => i += 1,
            '[' if !in_class => in_class = true,
            ']' if in_class => in_class = false,
            '(' if !in_class => depth += 1,
            ')' if !in_class => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Index of the `]` closing the character class opened at `open`.
fn closing_bracket(chars: &[char], open: usize) -> Option<usize> {
    let mut i = open + 1;
    if chars.get(i) == Some(&'^') {
        i += 1;
    }
    // a leading `]` is a literal member
    if chars.get(i) == Some(&']') {
        i += 1;
    }
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 1,
            ']' => return Some(i),
            _ => {}
        }
        i += 1;
    }
    None
}

/// Index of the `}` ending a `{m}`, `{m,}` or `{m,n}` quantifier opened at `open`.
fn quantifier_end(chars: &[char], open: usize) -> Option<usize> {
    let close = open + chars[open..].iter().position(|c| *c == '}')?;
    let body = &chars[open + 1..close];
    let valid = body.first().is_some_and(char::is_ascii_digit)
        && body.iter().all(|c| c.is_ascii_digit() || *c == ',')
        && body.iter().filter(|c| **c == ',').count() <= 1;
    valid.then_some(close)
}

/// Longest common leading-segment prefix of slash-stripped paths.
///
/// A path's final segment is never consumed, so `["api/a", "api/b"]` yields `"api/"`
/// and root-level paths yield `""`.
pub fn base_path<S: AsRef<str>>(paths: &[S]) -> String {
    let split: Vec<Vec<&str>> = paths
        .iter()
        .map(|p| p.as_ref().trim_matches('/').split('/').collect())
        .collect();

    let Some(first) = split.first() else {
        return String::new();
    };

    let limit = split.iter().map(|segments| segments.len() - 1).min().unwrap_or(0);
    let shared = (0..limit)
        .take_while(|&idx| split.iter().all(|segments| segments[idx] == first[idx]))
        .count();

    if shared == 0 {
        String::new()
    } else {
        format!("{}/", first[..shared].join("/"))
    }
}

/// The first path segment after `base`, used as the operation tag.
pub fn top_level_tag(path: &str, base: &str) -> Option<String> {
    let stripped = path.trim_matches('/');
    let rest = stripped.strip_prefix(base).unwrap_or(stripped);
    rest.split('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}
