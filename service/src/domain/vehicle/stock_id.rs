//! [`StockId`] definitions.

use std::{str::FromStr, sync::LazyLock};

use derive_more::{AsRef, Display};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;

#[cfg(doc)]
use super::Vehicle;
use super::Brand;

/// Human-readable identifier of a [`Vehicle`] in the inventory.
///
/// Consists of a [`Prefix`] followed by a sequence number of at least two
/// digits: `T01`, `T12`, `T100`.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(str)]
pub struct StockId(String);

impl StockId {
    /// Creates a new [`StockId`] if the given `id` is valid.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        Self::check(&id).then_some(Self(id))
    }

    /// Checks whether the given `id` is a valid [`StockId`].
    fn check(id: impl AsRef<str>) -> bool {
        /// Regular expression checking [`StockId`] format:
        /// - Must start with an uppercase ASCII letter;
        /// - Must continue with 2 to 9 digits.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[A-Z][0-9]{2,9}$").expect("valid regex")
        });

        REGEX.is_match(id.as_ref())
    }

    /// Allocates the [`StockId`] following the provided `last` one allocated
    /// for the same [`Prefix`].
    ///
    /// Starts from `1` if there is no `last` [`StockId`].
    ///
    /// [`None`] is returned if the sequence of the [`Prefix`] is exhausted.
    #[must_use]
    pub fn next(prefix: Prefix, last: Option<&Self>) -> Option<Self> {
        let num = last.map_or(Some(1), |id| id.number().checked_add(1))?;
        Self::new(format!("{prefix}{num:02}"))
    }

    /// Returns the [`Prefix`] of this [`StockId`].
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    #[must_use]
    pub fn prefix(&self) -> Prefix {
        Prefix(self.0.chars().next().expect("checked on creation"))
    }

    /// Returns the sequence number of this [`StockId`].
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    #[must_use]
    pub fn number(&self) -> u32 {
        self.0[1..].parse().expect("checked on creation")
    }
}

impl FromStr for StockId {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `StockId`")
    }
}

/// Prefix of a [`StockId`], shared by all [`Vehicle`]s of the same [`Brand`]
/// initial.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Prefix(char);

impl Prefix {
    /// Derives the [`Prefix`] from the provided [`Brand`].
    ///
    /// [`None`] is returned if the [`Brand`] doesn't start with an ASCII
    /// letter.
    #[must_use]
    pub fn of(brand: &Brand) -> Option<Self> {
        brand
            .as_ref()
            .chars()
            .next()
            .filter(char::is_ascii_alphabetic)
            .map(|c| Self(c.to_ascii_uppercase()))
    }

    /// Returns the [`char`] of this [`Prefix`].
    #[must_use]
    pub const fn char(self) -> char {
        self.0
    }
}

#[cfg(test)]
mod spec {
    use super::{Brand, Prefix, StockId};

    fn prefix(brand: &str) -> Prefix {
        Prefix::of(&Brand::new(brand).unwrap()).unwrap()
    }

    fn id(s: &str) -> StockId {
        s.parse().unwrap()
    }

    #[test]
    fn validates_format() {
        for valid in ["T01", "A99", "T100", "Z123456789"] {
            assert!(StockId::new(valid).is_some(), "{valid}");
        }
        for invalid in ["", "T", "T1", "t01", "TT01", "T0A", "01", "T01 "] {
            assert!(StockId::new(invalid).is_none(), "{invalid}");
        }
    }

    #[test]
    fn derives_prefix_from_brand() {
        assert_eq!(prefix("Toyota").char(), 'T');
        assert_eq!(prefix("audi").char(), 'A');
        assert!(Prefix::of(&Brand::new("4Runner").unwrap()).is_none());
        assert!(Prefix::of(&Brand::new("Škoda").unwrap()).is_none());
    }

    #[test]
    fn exposes_prefix_and_number() {
        let wide = id("T100");

        assert_eq!(wide.prefix().char(), 'T');
        assert_eq!(wide.number(), 100);
        assert_eq!(id("A07").prefix(), prefix("Audi"));
    }

    #[test]
    fn allocates_sequentially() {
        let first = StockId::next(prefix("Toyota"), None).unwrap();
        assert_eq!(first, id("T01"));

        let second = StockId::next(prefix("Toyota"), Some(&first)).unwrap();
        assert_eq!(second, id("T02"));

        assert_eq!(
            StockId::next(prefix("Toyota"), Some(&id("T09"))),
            Some(id("T10")),
        );
    }

    #[test]
    fn widens_past_99() {
        assert_eq!(
            StockId::next(prefix("Toyota"), Some(&id("T99"))),
            Some(id("T100")),
        );
        assert_eq!(
            StockId::next(prefix("Toyota"), Some(&id("T100"))),
            Some(id("T101")),
        );
        assert_eq!(
            StockId::next(prefix("Toyota"), Some(&id("T999999999"))),
            None,
        );
    }

    #[test]
    fn exposes_parts() {
        assert_eq!(id("T07").prefix().char(), 'T');
        assert_eq!(id("T07").number(), 7);
        assert_eq!(id("B120").number(), 120);
    }
}
