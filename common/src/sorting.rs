//! Sorting abstractions.

/// Order of sorting.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Order {
    /// Ascending order.
    #[default]
    Ascending,

    /// Descending order.
    Descending,
}

impl Order {
    #[cfg(feature = "postgres")]
    /// Returns SQL keyword representing this [`Order`].
    #[must_use]
    pub const fn sql(&self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }

    /// Applies this [`Order`] to the provided ascending [`Ordering`].
    ///
    /// [`Ordering`]: std::cmp::Ordering
    #[must_use]
    pub fn apply(self, ordering: std::cmp::Ordering) -> std::cmp::Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }
}

/// Sorting of items by a `F`ield.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Sorting<F> {
    /// Field to sort by.
    pub field: F,

    /// [`Order`] of sorting.
    pub order: Order,
}

impl<F> Sorting<F> {
    /// Creates a new ascending [`Sorting`] by the provided `field`.
    #[must_use]
    pub fn asc(field: F) -> Self {
        Self {
            field,
            order: Order::Ascending,
        }
    }

    /// Creates a new descending [`Sorting`] by the provided `field`.
    #[must_use]
    pub fn desc(field: F) -> Self {
        Self {
            field,
            order: Order::Descending,
        }
    }
}

#[cfg(test)]
mod spec {
    use std::cmp::Ordering;

    use super::Order;

    #[test]
    fn applies_order() {
        assert_eq!(Order::Ascending.apply(Ordering::Less), Ordering::Less);
        assert_eq!(Order::Descending.apply(Ordering::Less), Ordering::Greater);
        assert_eq!(Order::Descending.apply(Ordering::Equal), Ordering::Equal);
    }
}
