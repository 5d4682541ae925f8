//! [`Vehicle`] validation.

use std::fmt;

use common::Money;
use derive_more::Error;
use rust_decimal::Decimal;
use strum::Display;

#[cfg(doc)]
use super::{Status, Vehicle};
use super::{
    status, Brand, Branch, City, Currency, Drivetrain, Equipment, Features,
    FuelType, Mileage, Model, SaleType, Transmission, Version, Warranty, Year,
};

/// Unvalidated properties of a [`Vehicle`], as submitted by a client.
#[derive(Clone, Debug, Default)]
pub struct Draft {
    /// Brand of the [`Vehicle`].
    pub brand: String,

    /// Model of the [`Vehicle`].
    pub model: String,

    /// Version of the [`Vehicle`].
    pub version: String,

    /// Sale type of the [`Vehicle`].
    pub sale_type: String,

    /// Fuel type of the [`Vehicle`].
    pub fuel_type: String,

    /// Year the [`Vehicle`] was manufactured.
    pub year: i64,

    /// Mileage of the [`Vehicle`].
    pub mileage: i64,

    /// Price of the [`Vehicle`] before any discount.
    pub price: Decimal,

    /// Discount of the [`Vehicle`].
    pub discount: Decimal,

    /// Currency of the [`Vehicle`] price.
    pub currency: String,

    /// City the [`Vehicle`] is located in.
    pub city: String,

    /// Branch the [`Vehicle`] is offered by.
    pub branch: String,

    /// Transmission of the [`Vehicle`].
    pub transmission: String,

    /// Drivetrain of the [`Vehicle`].
    pub drivetrain: String,

    /// Warranty of the [`Vehicle`].
    pub warranty: String,

    /// Image URLs of the [`Vehicle`].
    pub images: Vec<String>,

    /// Cover image URL of the [`Vehicle`].
    pub cover_image: Option<String>,

    /// Imperfection image URLs of the [`Vehicle`].
    pub imperfection_images: Vec<String>,

    /// Highlighted equipment of the [`Vehicle`].
    pub equipment: Vec<String>,

    /// [`Features`] of the [`Vehicle`].
    pub features: Features,

    /// Indicator whether the [`Vehicle`] is featured.
    pub featured: bool,

    /// Name of the [`status::Kind`] of the [`Vehicle`].
    ///
    /// Blank means [`status::Kind::Available`].
    pub status: String,

    /// Payloads of the [`Status`] of the [`Vehicle`].
    pub payloads: status::Payloads,
}

/// Validated properties of a [`Vehicle`] that can be listed in the inventory.
#[derive(Clone, Debug)]
pub struct Listing {
    /// [`Brand`] of the [`Vehicle`].
    pub brand: Brand,

    /// [`Model`] of the [`Vehicle`].
    pub model: Model,

    /// [`Version`] of the [`Vehicle`].
    pub version: Version,

    /// [`SaleType`] of the [`Vehicle`].
    pub sale_type: SaleType,

    /// [`FuelType`] of the [`Vehicle`].
    pub fuel_type: FuelType,

    /// [`Year`] of the [`Vehicle`].
    pub year: Year,

    /// [`Mileage`] of the [`Vehicle`].
    pub mileage: Mileage,

    /// Price of the [`Vehicle`] with the `discount` subtracted.
    pub price: Money,

    /// Discount of the [`Vehicle`].
    pub discount: Money,

    /// [`Currency`] of the [`Vehicle`] price.
    pub currency: Currency,

    /// [`City`] of the [`Vehicle`].
    pub city: City,

    /// [`Branch`] of the [`Vehicle`].
    pub branch: Branch,

    /// [`Transmission`] of the [`Vehicle`].
    pub transmission: Transmission,

    /// [`Drivetrain`] of the [`Vehicle`].
    pub drivetrain: Drivetrain,

    /// [`Warranty`] of the [`Vehicle`].
    pub warranty: Warranty,

    /// Image URLs of the [`Vehicle`].
    pub images: Vec<String>,

    /// Cover image URL of the [`Vehicle`].
    pub cover_image: Option<String>,

    /// Imperfection image URLs of the [`Vehicle`].
    pub imperfection_images: Vec<String>,

    /// [`Equipment`] of the [`Vehicle`].
    pub equipment: Equipment,

    /// [`Features`] of the [`Vehicle`].
    pub features: Features,

    /// Indicator whether the [`Vehicle`] is featured.
    pub featured: bool,

    /// [`Status`] of the [`Vehicle`].
    pub status: status::Status,
}

impl Draft {
    /// Validates this [`Draft`], collecting all its [`Violation`]s at once.
    ///
    /// The provided price is treated as the one before the discount, so the
    /// resulting [`Listing`] has the discount already subtracted.
    ///
    /// # Errors
    ///
    /// [`Rejection`] with every [`Violation`] found, in a stable order.
    pub fn validate(self) -> Result<Listing, Rejection> {
        use Violation as V;

        let Self {
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
            payloads,
        } = self;

        let mut violations = Vec::new();
        let mut require = |valid: bool, violation| {
            if !valid {
                violations.push(violation);
            }
        };

        let brand = Brand::new(brand);
        require(brand.is_some(), V::Brand);
        let model = Model::new(model);
        require(model.is_some(), V::Model);
        let sale_type = SaleType::new(sale_type);
        require(sale_type.is_some(), V::SaleType);
        let fuel_type = FuelType::new(fuel_type);
        require(fuel_type.is_some(), V::FuelType);
        let currency = Currency::new(currency);
        require(currency.is_some(), V::Currency);
        let year = Year::new(year);
        require(year.is_some(), V::Year);
        let mileage = Mileage::new(mileage);
        require(mileage.is_some(), V::Mileage);
        require(price > Decimal::ZERO, V::Price);
        let city = City::new(city);
        require(city.is_some(), V::City);
        let transmission = Transmission::new(transmission);
        require(transmission.is_some(), V::Transmission);
        let drivetrain = Drivetrain::new(drivetrain);
        require(drivetrain.is_some(), V::Drivetrain);
        let branch = Branch::new(branch);
        require(branch.is_some(), V::Branch);
        let version = Version::new(version);
        require(version.is_some(), V::Version);
        let warranty = Warranty::new(warranty);
        require(warranty.is_some(), V::Warranty);

        let kind = if status.trim().is_empty() {
            Some(status::Kind::Available)
        } else {
            status.trim().parse::<status::Kind>().ok()
        };
        require(kind.is_some(), V::Status);

        require(discount >= Decimal::ZERO, V::NegativeDiscount);
        require(discount <= price, V::DiscountExceedsPrice);
        let discounted = price
            .checked_sub(discount)
            .filter(|p| *p > Decimal::ZERO);
        require(discounted.is_some(), V::NonPositivePrice);

        let equipment = Equipment::new(equipment);
        require(equipment.is_some(), V::Equipment);

        let discounted = discounted.and_then(Money::new);
        let discount = Money::new(discount);

        let (
            Some(brand),
            Some(model),
            Some(version),
            Some(sale_type),
            Some(fuel_type),
            Some(year),
            Some(mileage),
            Some(price),
            Some(discount),
            Some(currency),
            Some(city),
            Some(branch),
            Some(transmission),
            Some(drivetrain),
            Some(warranty),
            Some(equipment),
            Some(kind),
        ) = (
            brand,
            model,
            version,
            sale_type,
            fuel_type,
            year,
            mileage,
            discounted,
            discount,
            currency,
            city,
            branch,
            transmission,
            drivetrain,
            warranty,
            equipment,
            kind,
        )
        else {
            return Err(Rejection(violations));
        };
        if !violations.is_empty() {
            return Err(Rejection(violations));
        }

        Ok(Listing {
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
            cover_image: cover_image.filter(|url| !url.trim().is_empty()),
            imperfection_images,
            equipment,
            features,
            featured,
            status: status::Status::new(kind, payloads),
        })
    }
}

/// Violation of a [`Vehicle`] invariant.
///
/// Displayed as a stable tag reported to clients.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum Violation {
    /// [`Brand`] is missing.
    #[strum(to_string = "marca")]
    Brand,

    /// [`Model`] is missing.
    #[strum(to_string = "modelo")]
    Model,

    /// [`SaleType`] is missing.
    #[strum(to_string = "tipo_venta")]
    SaleType,

    /// [`FuelType`] is missing.
    #[strum(to_string = "tipo_combustible")]
    FuelType,

    /// [`Currency`] is missing.
    #[strum(to_string = "moneda")]
    Currency,

    /// [`Year`] is missing or zero.
    #[strum(to_string = "año")]
    Year,

    /// [`Mileage`] is negative.
    #[strum(to_string = "kilometraje")]
    Mileage,

    /// Price is not positive.
    #[strum(to_string = "precio")]
    Price,

    /// [`City`] is missing.
    #[strum(to_string = "ciudad")]
    City,

    /// [`Transmission`] is missing.
    #[strum(to_string = "transmision")]
    Transmission,

    /// [`Drivetrain`] is missing.
    #[strum(to_string = "traccion")]
    Drivetrain,

    /// [`Branch`] is missing.
    #[strum(to_string = "sucursal")]
    Branch,

    /// [`Version`] is missing.
    #[strum(to_string = "version")]
    Version,

    /// [`Warranty`] is missing.
    #[strum(to_string = "garantia")]
    Warranty,

    /// [`status::Kind`] is not recognized.
    #[strum(to_string = "estado inválido")]
    Status,

    /// Discount is negative.
    #[strum(to_string = "descuento no puede ser negativo")]
    NegativeDiscount,

    /// Discount is greater than the price.
    #[strum(to_string = "descuento no puede ser mayor al precio original")]
    DiscountExceedsPrice,

    /// Discount reduces the price to zero or below.
    #[strum(
        to_string = "descuento no puede reducir el precio a cero o negativo"
    )]
    NonPositivePrice,

    /// [`Equipment`] is empty.
    #[strum(to_string = "equipamiento_destacado")]
    Equipment,
}

/// Rejection of a [`Draft`] listing the [`Violation`]s found.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub struct Rejection(#[error(not(source))] pub Vec<Violation>);

impl Rejection {
    /// Returns the [`Violation`]s of this [`Rejection`].
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        &self.0
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "missing or invalid fields:")?;
        for (n, v) in self.0.iter().enumerate() {
            let sep = if n == 0 { " " } else { ", " };
            write!(f, "{sep}{v}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod spec {
    use rust_decimal::Decimal;

    use super::{Draft, Rejection, Violation as V};
    use crate::domain::vehicle::{fixture, status, Status};

    fn violations(draft: Draft) -> Vec<V> {
        draft.validate().unwrap_err().0
    }

    #[test]
    fn accepts_valid_draft() {
        let listing = fixture::draft("Toyota", 20_000).validate().unwrap();

        assert_eq!(listing.brand.as_ref(), "Toyota");
        assert_eq!(listing.price.to_string(), "20000");
        assert!(listing.discount.is_zero());
        assert_eq!(listing.status, Status::Available);
    }

    #[test]
    fn collects_every_violation() {
        let tags = violations(Draft::default())
            .into_iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>();

        assert_eq!(
            tags,
            [
                "marca",
                "modelo",
                "tipo_venta",
                "tipo_combustible",
                "moneda",
                "año",
                "precio",
                "ciudad",
                "transmision",
                "traccion",
                "sucursal",
                "version",
                "garantia",
                "descuento no puede reducir el precio a cero o negativo",
                "equipamiento_destacado",
            ],
        );
    }

    #[test]
    fn checks_numbers() {
        let draft = Draft {
            year: 0,
            mileage: -1,
            ..fixture::draft("Toyota", 20_000)
        };

        assert_eq!(violations(draft), [V::Year, V::Mileage]);
    }

    #[test]
    fn checks_discount() {
        let negative = Draft {
            discount: Decimal::from(-5),
            ..fixture::draft("Toyota", 20_000)
        };
        assert_eq!(violations(negative), [V::NegativeDiscount]);

        let exceeding = Draft {
            discount: Decimal::from(25_000),
            ..fixture::draft("Toyota", 20_000)
        };
        assert_eq!(
            violations(exceeding),
            [V::DiscountExceedsPrice, V::NonPositivePrice],
        );

        let whole = Draft {
            discount: Decimal::from(20_000),
            ..fixture::draft("Toyota", 20_000)
        };
        assert_eq!(violations(whole), [V::NonPositivePrice]);
    }

    #[test]
    fn reports_overflowing_discount() {
        let overflowing = Draft {
            price: Decimal::MAX,
            discount: -Decimal::MAX,
            ..fixture::draft("Toyota", 20_000)
        };
        assert_eq!(
            violations(overflowing),
            [V::NegativeDiscount, V::NonPositivePrice],
        );

        let underflowing = Draft {
            price: -Decimal::MAX,
            discount: Decimal::MAX,
            ..fixture::draft("Toyota", 20_000)
        };
        assert_eq!(
            violations(underflowing),
            [V::Price, V::DiscountExceedsPrice, V::NonPositivePrice],
        );
    }

    #[test]
    fn subtracts_discount_from_price() {
        let listing = Draft {
            discount: Decimal::from(5000),
            ..fixture::draft("Toyota", 20_000)
        }
        .validate()
        .unwrap();

        assert_eq!(listing.price.to_string(), "15000");
        assert_eq!(listing.discount.to_string(), "5000");
    }

    #[test]
    fn normalizes_status() {
        let blank = Draft {
            status: "  ".to_owned(),
            ..fixture::draft("Toyota", 20_000)
        };
        assert_eq!(blank.validate().unwrap().status, Status::Available);

        let reserved = Draft {
            status: "reservado".to_owned(),
            payloads: status::Payloads {
                reserved: Some(status::Contact::default()),
                ..status::Payloads::default()
            },
            ..fixture::draft("Toyota", 20_000)
        };
        assert_eq!(
            reserved.validate().unwrap().status,
            Status::Reserved(Some(status::Contact::default())),
        );

        let unknown = Draft {
            status: "perdido".to_owned(),
            ..fixture::draft("Toyota", 20_000)
        };
        assert_eq!(violations(unknown), [V::Status]);
    }

    #[test]
    fn requires_equipment() {
        let draft = Draft {
            equipment: vec![],
            ..fixture::draft("Toyota", 20_000)
        };

        assert_eq!(violations(draft), [V::Equipment]);
    }

    #[test]
    fn displays_rejection() {
        let rejection = Rejection(vec![V::Brand, V::Year]);

        assert_eq!(
            rejection.to_string(),
            "missing or invalid fields: marca, año",
        );
    }
}
