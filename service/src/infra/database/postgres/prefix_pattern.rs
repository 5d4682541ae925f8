//! [`PrefixPattern`] definition.

use derive_more::Display;
use postgres_types::{FromSql, ToSql};

/// SQL `LIKE` pattern matching strings starting with the provided input.
#[derive(Clone, Debug, Display, Eq, FromSql, PartialEq, ToSql)]
#[postgres(transparent)]
pub struct PrefixPattern(String);

impl PrefixPattern {
    /// Creates a new [`PrefixPattern`] out of the given `input`, matching it
    /// literally.
    #[must_use]
    pub fn new(input: &str) -> Self {
        let mut pattern = String::with_capacity(input.len() + 1);
        for c in input.chars() {
            if matches!(c, '\\' | '%' | '_') {
                pattern.push('\\');
            }
            pattern.push(c);
        }
        pattern.push('%');
        Self(pattern)
    }
}

#[cfg(test)]
mod spec {
    use super::PrefixPattern;

    #[test]
    fn escapes_wildcards() {
        assert_eq!(PrefixPattern::new("Toy").to_string(), "Toy%");
        assert_eq!(PrefixPattern::new("").to_string(), "%");
        assert_eq!(PrefixPattern::new("50%_off").to_string(), r"50\%\_off%");
        assert_eq!(PrefixPattern::new(r"a\b").to_string(), r"a\\b%");
    }
}
