//! [`Vehicle`] definitions.

pub mod discount;
pub mod status;
pub mod stock_id;
pub mod validation;

use std::{collections::BTreeMap, str::FromStr};

use common::{unit, DateTime, DateTimeOf, Money};
use derive_more::{AsRef, Display, From, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};

use crate::domain::Reservation;

pub use self::{
    status::Status,
    stock_id::StockId,
    validation::{Draft, Listing, Violation},
};

/// Vehicle listed in the inventory.
#[derive(Clone, Debug)]
pub struct Vehicle {
    /// [`StockId`] of this [`Vehicle`].
    pub stock_id: StockId,

    /// [`Brand`] of this [`Vehicle`].
    pub brand: Brand,

    /// [`Model`] of this [`Vehicle`].
    pub model: Model,

    /// [`Version`] (trim) of this [`Vehicle`].
    pub version: Version,

    /// [`SaleType`] of this [`Vehicle`].
    pub sale_type: SaleType,

    /// [`FuelType`] of this [`Vehicle`].
    pub fuel_type: FuelType,

    /// [`Year`] this [`Vehicle`] was manufactured.
    pub year: Year,

    /// [`Mileage`] of this [`Vehicle`].
    pub mileage: Mileage,

    /// Current price of this [`Vehicle`] with the [`discount`] subtracted.
    ///
    /// [`discount`]: Vehicle::discount
    pub price: Money,

    /// Currently active discount of this [`Vehicle`].
    ///
    /// Zero means no discount is active.
    pub discount: Money,

    /// [`Currency`] of the [`price`] and the [`discount`].
    ///
    /// [`discount`]: Vehicle::discount
    /// [`price`]: Vehicle::price
    pub currency: Currency,

    /// [`City`] this [`Vehicle`] is located.
    pub city: City,

    /// [`Branch`] this [`Vehicle`] is offered by.
    pub branch: Branch,

    /// [`Transmission`] of this [`Vehicle`].
    pub transmission: Transmission,

    /// [`Drivetrain`] of this [`Vehicle`].
    pub drivetrain: Drivetrain,

    /// [`Warranty`] of this [`Vehicle`].
    pub warranty: Warranty,

    /// URLs of images of this [`Vehicle`].
    pub images: Vec<String>,

    /// URL of the cover image of this [`Vehicle`], if any.
    pub cover_image: Option<String>,

    /// URLs of images showing imperfections of this [`Vehicle`].
    pub imperfection_images: Vec<String>,

    /// [`Equipment`] highlighted for this [`Vehicle`].
    pub equipment: Equipment,

    /// [`Features`] of this [`Vehicle`].
    pub features: Features,

    /// Indicator whether this [`Vehicle`] is promoted in listings.
    pub featured: bool,

    /// [`Status`] of this [`Vehicle`].
    pub status: Status,

    /// [`Reservation`]s of this [`Vehicle`] in their creation order.
    pub reservations: Vec<Reservation>,

    /// [`Revision`] of this [`Vehicle`].
    pub revision: Revision,

    /// [`DateTime`] when this [`Vehicle`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Vehicle`] was modified the last time.
    pub updated_at: ModificationDateTime,
}

impl Vehicle {
    /// Creates a new [`Vehicle`] out of the validated [`Listing`].
    #[must_use]
    pub fn new(stock_id: StockId, listing: Listing) -> Self {
        let now = DateTime::now();
        let Listing {
            brand,
            model,
            version,
            sale_type,
            fuel_type,
            year,
            mileage,
            price,
            discount,
            currency,
            city,
            branch,
            transmission,
            drivetrain,
            warranty,
            images,
            cover_image,
            imperfection_images,
            equipment,
            features,
            featured,
            status,
        } = listing;

        Self {
            stock_id,
            brand,
            model,
            version,
            sale_type,
            fuel_type,
            year,
            mileage,
            price,
            discount,
            currency,
            city,
            branch,
            transmission,
            drivetrain,
            warranty,
            images,
            cover_image,
            imperfection_images,
            equipment,
            features,
            featured,
            status,
            reservations: Vec::new(),
            revision: Revision::INITIAL,
            created_at: now.coerce(),
            updated_at: now.coerce(),
        }
    }

    /// Replaces all the listed properties of this [`Vehicle`] with the
    /// provided [`Listing`].
    ///
    /// [`StockId`], [`Reservation`]s and the creation [`DateTime`] are kept.
    pub fn relist(&mut self, listing: Listing) {
        let stock_id = self.stock_id.clone();
        let created_at = self.created_at;
        let revision = self.revision;
        let reservations = std::mem::take(&mut self.reservations);

        *self = Self {
            reservations,
            revision,
            created_at,
            ..Self::new(stock_id, listing)
        };
    }

    /// Toggles the [`featured`] flag of this [`Vehicle`], returning its new
    /// value.
    ///
    /// [`featured`]: Vehicle::featured
    pub fn toggle_featured(&mut self) -> bool {
        self.featured = !self.featured;
        self.featured
    }

    /// Marks this [`Vehicle`] as modified right now, advancing its
    /// [`Revision`].
    pub fn touch(&mut self) {
        self.updated_at = DateTime::now().coerce();
        self.revision = self.revision.next();
    }
}

/// Defines a non-blank textual property of a [`Vehicle`].
macro_rules! define_text {
    ($( #[doc = $doc:literal] $name:ident ),* $(,)?) => {$(
        #[doc = $doc]
        #[derive(
            AsRef,
            Clone,
            Debug,
            Display,
            Eq,
            Hash,
            Ord,
            PartialEq,
            PartialOrd,
        )]
        #[cfg_attr(
            feature = "postgres",
            derive(FromSql, ToSql),
            postgres(transparent),
        )]
        #[as_ref(str)]
        pub struct $name(String);

        impl $name {
            /// Creates a new value out of the given `text`, if it's not blank.
            ///
            /// Surrounding whitespaces are trimmed.
            #[must_use]
            pub fn new(text: impl AsRef<str>) -> Option<Self> {
                let text = text.as_ref().trim();
                (!text.is_empty() && text.len() <= MAX_TEXT_LEN)
                    .then(|| Self(text.to_owned()))
            }
        }

        impl FromStr for $name {
            type Err = &'static str;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s).ok_or(concat!("invalid `", stringify!($name), "`"))
            }
        }
    )*};
}

/// Maximum length of a textual [`Vehicle`] property.
const MAX_TEXT_LEN: usize = 512;

define_text! {
    #[doc = "Brand of a [`Vehicle`]."]
    Brand,
    #[doc = "Model of a [`Vehicle`]."]
    Model,
    #[doc = "Version (trim level) of a [`Vehicle`]."]
    Version,
    #[doc = "Sale type of a [`Vehicle`] (new, used, consignment, etc)."]
    SaleType,
    #[doc = "Fuel type of a [`Vehicle`]."]
    FuelType,
    #[doc = "Currency a [`Vehicle`] is priced in."]
    Currency,
    #[doc = "City a [`Vehicle`] is located in."]
    City,
    #[doc = "Branch a [`Vehicle`] is offered by."]
    Branch,
    #[doc = "Transmission of a [`Vehicle`]."]
    Transmission,
    #[doc = "Drivetrain of a [`Vehicle`]."]
    Drivetrain,
    #[doc = "Warranty of a [`Vehicle`]."]
    Warranty,
}

/// Year a [`Vehicle`] was manufactured.
#[derive(
    Clone, Copy, Debug, Display, Eq, Hash, Into, Ord, PartialEq, PartialOrd,
)]
pub struct Year(u16);

impl Year {
    /// Creates a new [`Year`] if the provided `year` is positive.
    #[must_use]
    pub fn new(year: i64) -> Option<Self> {
        u16::try_from(year).ok().filter(|y| *y > 0).map(Self)
    }
}

/// Odometer reading of a [`Vehicle`], in kilometers.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Display,
    Eq,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
)]
pub struct Mileage(u32);

impl Mileage {
    /// Creates a new [`Mileage`] if the provided `km` are not negative.
    #[must_use]
    pub fn new(km: i64) -> Option<Self> {
        u32::try_from(km).ok().map(Self)
    }
}

/// Equipment highlighted for a [`Vehicle`].
///
/// Always contains at least one item.
#[derive(AsRef, Clone, Debug, Eq, Into, PartialEq)]
#[as_ref([String])]
pub struct Equipment(Vec<String>);

impl Equipment {
    /// Creates a new [`Equipment`] if the provided `items` are not empty.
    #[must_use]
    pub fn new(items: Vec<String>) -> Option<Self> {
        (!items.is_empty()).then_some(Self(items))
    }
}

/// Named attributes of a [`Vehicle`] grouped by category.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct Features {
    /// General attributes.
    pub general: Attributes,

    /// Exterior attributes.
    pub exterior: Attributes,

    /// Safety attributes.
    pub safety: Attributes,

    /// Comfort attributes.
    pub comfort: Attributes,

    /// Interior attributes.
    pub interior: Attributes,

    /// Entertainment attributes.
    pub entertainment: Attributes,
}

/// Named attributes of a single [`Features`] category.
pub type Attributes = BTreeMap<String, String>;

/// Revision of a [`Vehicle`], advanced by each its modification.
#[derive(
    Clone,
    Copy,
    Debug,
    Display,
    Eq,
    From,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Revision(i64);

impl Revision {
    /// [`Revision`] of a newly created [`Vehicle`].
    pub const INITIAL: Self = Self(1);

    /// Returns the [`Revision`] following this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// [`DateTime`] when a [`Vehicle`] was created.
pub type CreationDateTime = DateTimeOf<(Vehicle, unit::Creation)>;

/// [`DateTime`] when a [`Vehicle`] was modified the last time.
pub type ModificationDateTime = DateTimeOf<(Vehicle, unit::Modification)>;

#[cfg(test)]
pub(crate) mod fixture {
    //! [`Vehicle`] fixtures for tests.

    use rust_decimal::Decimal;

    use super::{Draft, Vehicle};

    /// Returns a valid [`Draft`] of the provided `brand` priced at `price`.
    pub(crate) fn draft(brand: &str, price: i64) -> Draft {
        Draft {
            brand: brand.to_owned(),
            model: "Corolla".to_owned(),
            version: "XEI 2.0".to_owned(),
            sale_type: "usado".to_owned(),
            fuel_type: "nafta".to_owned(),
            year: 2020,
            mileage: 35_000,
            price: Decimal::from(price),
            discount: Decimal::ZERO,
            currency: "USD".to_owned(),
            city: "Córdoba".to_owned(),
            branch: "Centro".to_owned(),
            transmission: "automática".to_owned(),
            drivetrain: "4x2".to_owned(),
            warranty: "12 meses".to_owned(),
            equipment: vec!["Climatizador".to_owned()],
            ..Draft::default()
        }
    }

    /// Returns a valid [`Vehicle`] of the provided `brand` with the given
    /// `stock_id`.
    pub(crate) fn vehicle(stock_id: &str, brand: &str, price: i64) -> Vehicle {
        Vehicle::new(
            stock_id.parse().unwrap(),
            draft(brand, price).validate().unwrap(),
        )
    }
}

#[cfg(test)]
mod spec {
    use super::{fixture, Brand, Mileage, Revision, Year};

    #[test]
    fn trims_text() {
        assert_eq!(Brand::new("  Toyota ").unwrap().as_ref(), "Toyota");
        assert!(Brand::new("   ").is_none());
        assert!(Brand::new("").is_none());
    }

    #[test]
    fn checks_numbers() {
        assert!(Year::new(0).is_none());
        assert!(Year::new(-2020).is_none());
        assert_eq!(u16::from(Year::new(2020).unwrap()), 2020);

        assert!(Mileage::new(-1).is_none());
        assert_eq!(u32::from(Mileage::new(0).unwrap()), 0);
    }

    #[test]
    fn relist_keeps_identity() {
        let mut vehicle = fixture::vehicle("T01", "Toyota", 20_000);
        let created_at = vehicle.created_at;

        vehicle.relist(fixture::draft("Toyota", 25_000).validate().unwrap());

        assert_eq!(vehicle.stock_id.as_ref(), "T01");
        assert_eq!(vehicle.created_at, created_at);
        assert_eq!(vehicle.price.to_string(), "25000");
        assert_eq!(vehicle.revision, Revision::INITIAL);
    }

    #[test]
    fn touch_advances_revision() {
        let mut vehicle = fixture::vehicle("T01", "Toyota", 20_000);

        vehicle.touch();

        assert_eq!(vehicle.revision, Revision::INITIAL.next());
        assert!(vehicle.updated_at >= vehicle.created_at.coerce());
    }

    #[test]
    fn toggles_featured() {
        let mut vehicle = fixture::vehicle("T01", "Toyota", 20_000);

        assert!(vehicle.toggle_featured());
        assert!(!vehicle.toggle_featured());
    }
}
