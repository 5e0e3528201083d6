//! Match-pattern normalization for index queries

/// Normalized site pattern sent to the index service.
///
/// Never carries a scheme prefix. A pattern typed without any wildcard gets
/// a trailing `*` so the whole site history matches; patterns that already
/// contain a `*` anywhere pass through as typed. Created once at startup,
/// immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexPattern(String);

impl IndexPattern {
    pub fn normalize(input: &str) -> Self {
        let trimmed = input.trim();
        let stripped = trimmed
            .strip_prefix("http://")
            .or_else(|| trimmed.strip_prefix("https://"))
            .unwrap_or(trimmed);
        let mut pattern = stripped.to_string();
        if !pattern.contains('*') {
            pattern.push('*');
        }
        Self(pattern)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for IndexPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_domain_gets_wildcard_suffix() {
        assert_eq!(IndexPattern::normalize("example.com").as_str(), "example.com*");
    }

    #[test]
    fn scheme_is_stripped() {
        assert_eq!(
            IndexPattern::normalize("https://example.com/app").as_str(),
            "example.com/app*"
        );
        assert_eq!(
            IndexPattern::normalize("http://example.com").as_str(),
            "example.com*"
        );
    }

    #[test]
    fn existing_wildcard_passes_through() {
        assert_eq!(
            IndexPattern::normalize("*.example.com").as_str(),
            "*.example.com"
        );
        assert_eq!(
            IndexPattern::normalize("example.com/api/*").as_str(),
            "example.com/api/*"
        );
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        assert_eq!(
            IndexPattern::normalize("  http://foo.dev  ").as_str(),
            "foo.dev*"
        );
    }
}
