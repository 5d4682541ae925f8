//! [`Vehicle`]-related read definitions.

use derive_more::Deref;

#[cfg(doc)]
use crate::domain::Vehicle;

/// Indicator whether a [`Vehicle`] was inserted, or its
/// [`StockId`] is occupied already.
///
/// [`StockId`]: crate::domain::vehicle::StockId
#[derive(Clone, Copy, Debug, Deref, Eq, Hash, PartialEq)]
pub struct IsInserted(pub bool);

/// Indicator whether a [`Vehicle`] was updated, or it was modified
/// concurrently (or deleted) since it was read.
#[derive(Clone, Copy, Debug, Deref, Eq, Hash, PartialEq)]
pub struct IsUpdated(pub bool);

/// Indicator whether a [`Vehicle`] was deleted, or it didn't exist.
#[derive(Clone, Copy, Debug, Deref, Eq, Hash, PartialEq)]
pub struct IsDeleted(pub bool);

pub mod list {
    //! [`Vehicle`] list definitions.

    use std::cmp::Ordering;

    use common::{sorting::Sorting, Money};

    use crate::domain::{
        vehicle::{Mileage, Year},
        Vehicle,
    };

    /// Selector of a [`Vehicle`] list.
    #[derive(Clone, Debug, Default)]
    pub struct Selector {
        /// [`Filter`] of the list.
        pub filter: Filter,

        /// [`Sorting`] of the list.
        ///
        /// If [`None`], the [`Vehicle`]s are listed in their creation order.
        pub sorting: Option<Sorting<Field>>,
    }

    impl Selector {
        /// Sorts the provided [`Vehicle`]s according to this [`Selector`].
        pub fn sort(&self, vehicles: &mut [Vehicle]) {
            vehicles.sort_by(|a, b| {
                self.sorting
                    .map_or(Ordering::Equal, |s| {
                        s.order.apply(s.field.cmp(a, b))
                    })
                    .then_with(|| a.created_at.cmp(&b.created_at))
                    .then_with(|| a.stock_id.cmp(&b.stock_id))
            });
        }
    }

    /// Filter for [`Selector`].
    #[derive(Clone, Debug, Default)]
    pub struct Filter {
        /// Case-insensitive prefix of a [`Vehicle`] brand.
        pub brand: Option<String>,

        /// Case-insensitive prefix of a [`Vehicle`] model.
        pub model: Option<String>,

        /// Case-insensitive prefix of a [`Vehicle`] fuel type.
        pub fuel_type: Option<String>,

        /// Exact [`Year`] of a [`Vehicle`].
        pub year: Option<Year>,

        /// [`Range`] of a [`Vehicle`] [`Mileage`].
        pub mileage: Option<Range<Mileage>>,

        /// [`Range`] of a [`Vehicle`] current price.
        pub price: Option<Range<Money>>,

        /// Indicator whether only featured [`Vehicle`]s should be listed.
        pub featured_only: bool,

        /// Indicator whether only discounted [`Vehicle`]s should be listed.
        pub discounted_only: bool,
    }

    impl Filter {
        /// Checks whether the provided [`Vehicle`] passes this [`Filter`].
        #[must_use]
        pub fn matches(&self, vehicle: &Vehicle) -> bool {
            let Self {
                brand,
                model,
                fuel_type,
                year,
                mileage,
                price,
                featured_only,
                discounted_only,
            } = self;

            has_prefix(vehicle.brand.as_ref(), brand.as_deref())
                && has_prefix(vehicle.model.as_ref(), model.as_deref())
                && has_prefix(vehicle.fuel_type.as_ref(), fuel_type.as_deref())
                && year.map_or(true, |y| vehicle.year == y)
                && mileage.map_or(true, |r| r.contains(vehicle.mileage))
                && price.map_or(true, |r| r.contains(vehicle.price))
                && (!featured_only || vehicle.featured)
                && (!discounted_only || vehicle.is_discounted())
        }
    }

    /// Checks whether the `value` starts with the `prefix`, ignoring case.
    fn has_prefix(value: &str, prefix: Option<&str>) -> bool {
        prefix.map_or(true, |p| {
            value.to_lowercase().starts_with(&p.to_lowercase())
        })
    }

    /// Range of values to filter by.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub enum Range<T> {
        /// Exactly the provided value.
        Exact(T),

        /// Values between the provided bounds, inclusive.
        Within {
            /// Lower bound, if any.
            min: Option<T>,

            /// Upper bound, if any.
            max: Option<T>,
        },
    }

    impl<T: Copy + PartialOrd> Range<T> {
        /// Checks whether the provided `value` is within this [`Range`].
        #[must_use]
        pub fn contains(self, value: T) -> bool {
            match self {
                Self::Exact(v) => value == v,
                Self::Within { min, max } => {
                    min.map_or(true, |min| value >= min)
                        && max.map_or(true, |max| value <= max)
                }
            }
        }

        /// Returns the inclusive lower and upper bounds of this [`Range`].
        #[must_use]
        pub fn bounds(self) -> (Option<T>, Option<T>) {
            match self {
                Self::Exact(v) => (Some(v), Some(v)),
                Self::Within { min, max } => (min, max),
            }
        }
    }

    /// Field to sort a [`Vehicle`] list by.
    #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
    pub enum Field {
        /// Current price.
        Price,

        /// Creation date and time.
        CreatedAt,

        /// Mileage.
        Mileage,
    }

    impl Field {
        /// Compares the provided [`Vehicle`]s by this [`Field`] ascending.
        #[must_use]
        pub fn cmp(self, a: &Vehicle, b: &Vehicle) -> Ordering {
            match self {
                Self::Price => a.price.cmp(&b.price),
                Self::CreatedAt => a.created_at.cmp(&b.created_at),
                Self::Mileage => a.mileage.cmp(&b.mileage),
            }
        }
    }

}
