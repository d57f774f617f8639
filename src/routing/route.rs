//! Route pattern compilation and path matching.
//!
//! # Responsibilities
//! - Compile a path pattern into an anchored regular expression
//! - Extract named path variables from a concrete request path
//!
//! # Pattern Syntax
//! - `{name}` captures one or more non-`/` characters
//! - `{name:regex}` captures whatever `regex` matches
//! - `:name` as a whole segment is the legacy spelling of `{name}`
//! - Everything else is literal text
//!
//! # Design Decisions
//! - Full-string match only; `/people/{name}` never matches `/people/jeff/extra`
//! - A trailing `/` on the request path is always accepted
//! - Literal text is escaped, so `.`, `+` or `(` in a pattern mean themselves

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use regex::Regex;

use crate::routing::RouteError;

/// Default expression for a variable without an explicit regex.
const DEFAULT_VARIABLE_REGEX: &str = "[^/]+";

/// A compiled path pattern.
///
/// Routes compare, order, and hash by their pattern string only; two routes
/// built from the same pattern are the same route.
#[derive(Clone)]
pub struct Route {
    pattern: String,
    regex: Regex,
    variables: Vec<String>,
}

impl Route {
    /// Compile a path pattern.
    pub fn build(pattern: &str) -> Result<Self, RouteError> {
        if pattern.is_empty() {
            return Err(RouteError::EmptyPattern);
        }

        let mut variables = Vec::new();
        let mut expr = String::with_capacity(pattern.len() * 2);
        expr.push('^');

        let mut rest = pattern;
        while !rest.is_empty() {
            if let Some(after_brace) = rest.strip_prefix('{') {
                let end = find_closing_brace(after_brace).ok_or_else(|| {
                    RouteError::InvalidPattern {
                        pattern: pattern.to_string(),
                        reason: "unterminated `{`".to_string(),
                    }
                })?;
                let body = &after_brace[..end];
                let (name, variable_regex) = match body.split_once(':') {
                    Some((name, re)) => (name, re),
                    None => (body, DEFAULT_VARIABLE_REGEX),
                };
                push_capture(&mut expr, &mut variables, pattern, name, variable_regex)?;
                rest = &after_brace[end + 1..];
            } else if let Some(name) = legacy_variable(pattern, rest) {
                push_capture(&mut expr, &mut variables, pattern, name, DEFAULT_VARIABLE_REGEX)?;
                rest = &rest[1 + name.len()..];
            } else {
                let literal_end = rest
                    .char_indices()
                    .skip(1)
                    .find(|&(_, c)| c == '{' || c == ':')
                    .map(|(i, _)| i)
                    .unwrap_or(rest.len());
                expr.push_str(&regex::escape(&rest[..literal_end]));
                rest = &rest[literal_end..];
            }
        }

        if !pattern.ends_with('/') {
            expr.push_str("/?");
        }
        expr.push('$');

        let regex = Regex::new(&expr).map_err(|e| RouteError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            pattern: pattern.to_string(),
            regex,
            variables,
        })
    }

    /// The pattern this route was built from.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Variable names in the order they appear in the pattern.
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Returns true if this route matches the whole of `path`.
    pub fn matches(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Returns the variables captured from `path`, or `None` if the route doesn't match.
    pub fn groups(&self, path: &str) -> Option<HashMap<String, String>> {
        let captures = self.regex.captures(path)?;
        let groups = self
            .variables
            .iter()
            .filter_map(|name| {
                captures
                    .name(name)
                    .map(|m| (name.clone(), m.as_str().to_string()))
            })
            .collect();
        Some(groups)
    }
}

/// Find the `}` closing a variable, allowing balanced braces inside a custom regex.
fn find_closing_brace(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '{' => depth += 1,
            '}' if depth == 0 => return Some(i),
            '}' => depth -= 1,
            _ => {}
        }
    }
    None
}

/// `:name` is only a variable when it starts a segment.
fn legacy_variable<'a>(pattern: &str, rest: &'a str) -> Option<&'a str> {
    let name = rest.strip_prefix(':')?;
    let offset = pattern.len() - rest.len();
    if offset == 0 || !pattern[..offset].ends_with('/') {
        return None;
    }
    let end = name.find('/').unwrap_or(name.len());
    let name = &name[..end];
    (!name.is_empty()).then_some(name)
}

fn push_capture(
    expr: &mut String,
    variables: &mut Vec<String>,
    pattern: &str,
    name: &str,
    variable_regex: &str,
) -> Result<(), RouteError> {
    let valid_name = !name.is_empty()
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.starts_with(|c: char| c.is_ascii_digit());
    if !valid_name {
        return Err(RouteError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: format!("`{}` is not a valid variable name", name),
        });
    }
    if variables.iter().any(|v| v == name) {
        return Err(RouteError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: format!("variable `{}` appears twice", name),
        });
    }

    expr.push_str("(?P<");
    expr.push_str(name);
    expr.push('>');
    expr.push_str(variable_regex);
    expr.push(')');
    variables.push(name.to_string());
    Ok(())
}

impl PartialEq for Route {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
    }
}

impl Eq for Route {}

impl PartialOrd for Route {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Route {
    fn cmp(&self, other: &Self) -> Ordering {
        self.pattern.cmp(&other.pattern)
    }
}

impl std::hash::Hash for Route {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.pattern.hash(state);
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("pattern", &self.pattern)
            .field("variables", &self.variables)
            .finish()
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}
