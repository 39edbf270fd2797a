//! Route templates such as `/users/{userId}/tasks/{taskId}` and the named-parameter
//! matching used to find the owner of a requested resource.

use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// A parsed route template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTemplate {
    segments: Vec<Segment>,
}

impl RouteTemplate {
    /// Parses a template where `{name}` segments are parameters and everything else
    /// matches literally.
    pub fn parse(template: &str) -> Self {
        let segments = split_path(template)
            .map(|segment| {
                match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                    Some(name) => Segment::Param(name.to_string()),
                    None => Segment::Literal(segment.to_string()),
                }
            })
            .collect();
        Self { segments }
    }

    /// Matches `path` against the whole template, returning the captured parameters.
    ///
    /// The segment count must match exactly and parameters never capture an empty
    /// segment.
    pub fn captures<'p>(&self, path: &'p str) -> Option<HashMap<&str, &'p str>> {
        let parts: Vec<&str> = split_path(path).collect();
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = HashMap::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(literal) if literal == part => {}
                Segment::Literal(_) => return None,
                Segment::Param(_) if part.is_empty() => return None,
                Segment::Param(name) => {
                    params.insert(name.as_str(), part);
                }
            }
        }
        Some(params)
    }

    /// Convenience for pulling a single named parameter out of `path`.
    pub fn param<'p>(&self, path: &'p str, name: &str) -> Option<&'p str> {
        self.captures(path)?.get(name).copied()
    }
}

/// Splits on `/`, ignoring exactly one leading and one trailing slash so that
/// `/users/a/tasks` and `/users/a/tasks/` match the same template while `//` inside a
/// path still produces an empty segment.
fn split_path(path: &str) -> impl Iterator<Item = &str> {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
    trimmed.split('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_captures_named_parameters() {
        let template = RouteTemplate::parse("/users/{userId}/tasks/{taskId}");
        let params = template.captures("/users/alice/tasks/42").unwrap();
        assert_eq!(params.get("userId"), Some(&"alice"));
        assert_eq!(params.get("taskId"), Some(&"42"));
    }

    #[test]
    fn test_literal_mismatch() {
        let template = RouteTemplate::parse("/users/{userId}/tasks");
        assert!(template.captures("/users/alice/notes").is_none());
        assert!(template.captures("/accounts/alice/tasks").is_none());
    }

    #[test]
    fn test_segment_count_must_match() {
        let template = RouteTemplate::parse("/users/{userId}/tasks");
        assert!(template.captures("/users/alice").is_none());
        assert!(template.captures("/users/alice/tasks/1").is_none());
        assert!(template.captures("").is_none());
    }

    #[test]
    fn test_trailing_slash_and_empty_params() {
        let template = RouteTemplate::parse("/users/{userId}/tasks");
        assert_eq!(template.param("/users/alice/tasks/", "userId"), Some("alice"));
        assert!(template.captures("/users//tasks").is_none());
    }

    #[test]
    fn test_param_lookup_by_name() {
        let template = RouteTemplate::parse("/users/{userId}/tasks");
        assert_eq!(template.param("/users/bob/tasks", "userId"), Some("bob"));
        assert_eq!(template.param("/users/bob/tasks", "taskId"), None);
    }
}
