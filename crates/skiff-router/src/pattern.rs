//! Route template compilation and parameter extraction.
//!
//! A template is a `/`-separated sequence of segments. A segment beginning
//! with `:` is a named parameter and matches one path segment drawn from
//! [`PARAM_SEGMENT_CLASS`]; any other segment matches itself literally.
//! Templates are programmer-supplied, so compilation failures are
//! registration-time bugs rather than runtime conditions.

use std::collections::{HashMap, HashSet};

use regex::Regex;

/// Character class a parameter segment matches, as a regex fragment.
///
/// `:name` in `/auth/:name` matches one run of these characters. Note the
/// `*`: an empty segment satisfies a parameter.
pub const PARAM_SEGMENT_CLASS: &str = "[a-zA-Z0-9_-]*";

/// Error raised when a route template cannot be compiled.
#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    /// A `:` segment with no name following it, e.g. `/auth/:`.
    #[error("parameter segment in `{template}` has an empty name")]
    EmptyParamName {
        /// The offending template.
        template: String,
    },
    /// The same parameter name appears twice in one template.
    #[error("duplicate parameter `:{name}` in `{template}`")]
    DuplicateParam {
        /// The repeated name, without the leading `:`.
        name: String,
        /// The offending template.
        template: String,
    },
    /// The derived expression was rejected by the regex engine.
    #[error(transparent)]
    Regex(#[from] regex::Error),
}

/// The matchable form of a route template.
///
/// Built once by [`compile`] when a route is registered and reused for
/// every request; the dispatch path never recompiles.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    regex: Regex,
}

impl CompiledPattern {
    /// Full-string match of a concrete request path.
    ///
    /// The underlying expression is anchored at both ends, so there is no
    /// partial or prefix matching.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// The anchored regex source, mainly for diagnostics.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

/// Compiles a route template into an anchored pattern.
///
/// A template with no parameters compiles to an exact match of the literal
/// path. Parameter segments become [`PARAM_SEGMENT_CLASS`]; literal
/// segments are regex-escaped.
///
/// # Example
///
/// ```
/// use skiff_router::compile;
///
/// let pattern = compile("/auth/:name").unwrap();
/// assert!(pattern.matches("/auth/madhuri"));
/// assert!(!pattern.matches("/auth/madhuri/32"));
///
/// let literal = compile("/auth/login").unwrap();
/// assert!(literal.matches("/auth/login"));
/// assert!(!literal.matches("/auth/login2"));
/// ```
pub fn compile(template: &str) -> Result<CompiledPattern, PatternError> {
    validate_params(template)?;

    let source = if template.contains(':') {
        let mut out = String::new();
        for segment in template.split('/').filter(|s| !s.is_empty()) {
            out.push('/');
            if segment.starts_with(':') {
                out.push_str(PARAM_SEGMENT_CLASS);
            } else {
                out.push_str(&regex::escape(segment));
            }
        }
        format!("^{out}$")
    } else {
        format!("^{}$", regex::escape(template))
    };

    Ok(CompiledPattern {
        regex: Regex::new(&source)?,
    })
}

fn validate_params(template: &str) -> Result<(), PatternError> {
    let mut seen = HashSet::new();
    for segment in template.split('/') {
        if let Some(name) = segment.strip_prefix(':') {
            if name.is_empty() {
                return Err(PatternError::EmptyParamName {
                    template: template.to_string(),
                });
            }
            if !seen.insert(name) {
                return Err(PatternError::DuplicateParam {
                    name: name.to_string(),
                    template: template.to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Extracts one named parameter by aligning `path` against `template`.
///
/// Returns `None` when the segment counts differ or the template has no
/// `:name` segment. The value is borrowed from `path`.
#[must_use]
pub fn try_extract_param<'p>(template: &str, path: &'p str, name: &str) -> Option<&'p str> {
    let template_segments: Vec<&str> = template.split('/').collect();
    let path_segments: Vec<&str> = path.split('/').collect();
    if template_segments.len() != path_segments.len() {
        return None;
    }
    template_segments
        .iter()
        .zip(&path_segments)
        .find(|(segment, _)| segment.strip_prefix(':') == Some(name))
        .map(|(_, value)| *value)
}

/// Extracts one named parameter, returning `""` when it cannot be found.
///
/// The empty-string return on a segment-count mismatch (or an unknown
/// name) is deliberate and long-standing: callers cannot distinguish
/// "parameter absent" from "parameter empty" through this accessor. Use
/// [`try_extract_param`] when that distinction matters.
///
/// # Example
///
/// ```
/// use skiff_router::extract_param;
///
/// assert_eq!(extract_param("/auth/:name", "/auth/madhuri", "name"), "madhuri");
/// assert_eq!(extract_param("/auth/:name", "/auth/madhuri/32", "name"), "");
/// ```
#[must_use]
pub fn extract_param<'p>(template: &str, path: &'p str, name: &str) -> &'p str {
    try_extract_param(template, path, name).unwrap_or("")
}

/// Collects every named parameter in `template` from `path`.
///
/// The same alignment walk as [`extract_param`]; a segment-count mismatch
/// yields an empty map. Keys are unique by construction ([`compile`]
/// rejects duplicate names), so no ordering is defined on the result.
///
/// # Example
///
/// ```
/// use skiff_router::extract_all_params;
///
/// let params = extract_all_params("/auth/:name/:age", "/auth/madhuri/32");
/// assert_eq!(params["name"], "madhuri");
/// assert_eq!(params["age"], "32");
/// ```
#[must_use]
pub fn extract_all_params(template: &str, path: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    let template_segments: Vec<&str> = template.split('/').collect();
    let path_segments: Vec<&str> = path.split('/').collect();
    if template_segments.len() != path_segments.len() {
        return params;
    }
    for (segment, value) in template_segments.iter().zip(&path_segments) {
        if let Some(name) = segment.strip_prefix(':') {
            params.insert(name.to_string(), (*value).to_string());
        }
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_template_matches_identical_path_only() {
        let pattern = compile("/auth/login").unwrap();
        assert!(pattern.matches("/auth/login"));
        assert!(!pattern.matches("/auth/login/"));
        assert!(!pattern.matches("/auth/logi"));
        assert!(!pattern.matches("/auth/login2"));
        assert!(!pattern.matches("/prefix/auth/login"));
    }

    #[test]
    fn literal_segments_are_escaped() {
        // `.` must not behave as a regex wildcard.
        let pattern = compile("/files/app.js").unwrap();
        assert!(pattern.matches("/files/app.js"));
        assert!(!pattern.matches("/files/appxjs"));
    }

    #[test]
    fn root_template_matches_root() {
        let pattern = compile("/").unwrap();
        assert!(pattern.matches("/"));
        assert!(!pattern.matches("/index"));
    }

    #[test]
    fn param_segment_matches_configured_class() {
        let pattern = compile("/auth/:name").unwrap();
        assert!(pattern.matches("/auth/madhuri"));
        assert!(pattern.matches("/auth/user_42-x"));
        // Empty runs satisfy the `*` class.
        assert!(pattern.matches("/auth/"));
        // `.` is outside the class.
        assert!(!pattern.matches("/auth/mad.huri"));
        assert!(!pattern.matches("/auth/madhuri/32"));
    }

    #[test]
    fn multi_param_template_matches_segmentwise() {
        let pattern = compile("/auth/:name/:age").unwrap();
        assert!(pattern.matches("/auth/madhuri/32"));
        assert!(!pattern.matches("/auth/madhuri"));
    }

    #[test]
    fn compile_rejects_empty_param_name() {
        assert!(matches!(
            compile("/auth/:"),
            Err(PatternError::EmptyParamName { .. })
        ));
    }

    #[test]
    fn compile_rejects_duplicate_param_names() {
        let err = compile("/pair/:x/:x").unwrap_err();
        assert!(matches!(err, PatternError::DuplicateParam { ref name, .. } if name == "x"));
    }

    #[test]
    fn extract_param_returns_aligned_segment() {
        assert_eq!(extract_param("/auth/:name", "/auth/madhuri", "name"), "madhuri");
        assert_eq!(extract_param("/auth/:name/:age", "/auth/madhuri/32", "age"), "32");
    }

    #[test]
    fn extract_param_is_empty_on_segment_count_mismatch() {
        assert_eq!(extract_param("/auth/:name", "/auth/madhuri/32", "name"), "");
        assert_eq!(extract_param("/auth/:name/:age", "/auth/madhuri", "age"), "");
    }

    #[test]
    fn extract_param_is_empty_for_unknown_name() {
        assert_eq!(extract_param("/auth/:name", "/auth/madhuri", "age"), "");
    }

    #[test]
    fn try_extract_param_distinguishes_absent_from_empty() {
        assert_eq!(try_extract_param("/auth/:name", "/auth/", "name"), Some(""));
        assert_eq!(try_extract_param("/auth/:name", "/auth/a/b", "name"), None);
    }

    #[test]
    fn extract_all_params_collects_every_name() {
        let params = extract_all_params("/auth/:name/:age", "/auth/madhuri/32");
        assert_eq!(params.len(), 2);
        assert_eq!(params["name"], "madhuri");
        assert_eq!(params["age"], "32");
    }

    #[test]
    fn extract_all_params_is_empty_on_mismatch() {
        assert!(extract_all_params("/auth/:name", "/auth/a/b").is_empty());
    }

    #[test]
    fn extract_all_params_without_params_is_empty() {
        assert!(extract_all_params("/auth/login", "/auth/login").is_empty());
    }
}
