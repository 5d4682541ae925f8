//! [`Vehicle`]-related definitions.

use std::{fmt, str::FromStr};

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query,
    },
    http::StatusCode,
    Extension, Json,
};
use common::{datetime, sorting::Sorting, Money};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain::{
        self,
        vehicle::{status, Attributes, Features, Mileage, Year},
    },
    query,
    read::vehicle::list::{Field, Filter, Range, Selector},
    Query as _,
};
use tracing as log;

use crate::{
    api::{
        self,
        reservation::Reservation,
        status::{Contact, Workshop},
    },
    define_error, AsError, Error, Service,
};

/// [`domain::Vehicle`] as represented in the HTTP API.
#[derive(Clone, Debug, Serialize)]
pub struct Vehicle {
    /// Stock identifier.
    pub stock_id: String,

    /// Brand.
    #[serde(rename = "marca")]
    pub brand: String,

    /// Model.
    #[serde(rename = "modelo")]
    pub model: String,

    /// Version (trim level).
    pub version: String,

    /// Sale type.
    #[serde(rename = "tipo_venta")]
    pub sale_type: String,

    /// Fuel type.
    #[serde(rename = "tipo_combustible")]
    pub fuel_type: String,

    /// Manufacturing year.
    #[serde(rename = "año")]
    pub year: u16,

    /// Odometer reading, in kilometers.
    #[serde(rename = "kilometraje")]
    pub mileage: u32,

    /// Current price, with the discount subtracted.
    #[serde(rename = "precio")]
    pub price: Money,

    /// Active discount, zero if none.
    #[serde(rename = "descuento")]
    pub discount: Money,

    /// Currency of the prices.
    #[serde(rename = "moneda")]
    pub currency: String,

    /// City.
    #[serde(rename = "ciudad")]
    pub city: String,

    /// Branch.
    #[serde(rename = "sucursal")]
    pub branch: String,

    /// Transmission.
    #[serde(rename = "transmision")]
    pub transmission: String,

    /// Drivetrain.
    #[serde(rename = "traccion")]
    pub drivetrain: String,

    /// Warranty.
    #[serde(rename = "garantia")]
    pub warranty: String,

    /// Image URLs.
    #[serde(rename = "imagenes")]
    pub images: Vec<String>,

    /// Cover image URL.
    #[serde(rename = "imagen_portada")]
    pub cover_image: Option<String>,

    /// Image URLs of the imperfections.
    #[serde(rename = "imagenes_imperfecciones")]
    pub imperfection_images: Vec<String>,

    /// Highlighted equipment.
    #[serde(rename = "equipamiento_destacado")]
    pub equipment: Vec<String>,

    /// General attributes.
    #[serde(rename = "caracteristicas_general")]
    pub general: Attributes,

    /// Exterior attributes.
    #[serde(rename = "caracteristicas_exterior")]
    pub exterior: Attributes,

    /// Safety attributes.
    #[serde(rename = "caracteristicas_seguridad")]
    pub safety: Attributes,

    /// Comfort attributes.
    #[serde(rename = "caracteristicas_confort")]
    pub comfort: Attributes,

    /// Interior attributes.
    #[serde(rename = "caracteristicas_interior")]
    pub interior: Attributes,

    /// Entertainment attributes.
    #[serde(rename = "caracteristicas_entretenimiento")]
    pub entertainment: Attributes,

    /// Indicator whether the vehicle is featured.
    pub featured: bool,

    /// Commercial status.
    #[serde(rename = "estado")]
    pub status: status::Kind,

    /// Customer the vehicle is reserved by.
    #[serde(rename = "reservado_por")]
    pub reserved_by: Option<Contact>,

    /// Customer the vehicle is sold to.
    #[serde(rename = "vendido_por")]
    pub sold_to: Option<Contact>,

    /// Customer the vehicle is negotiated with.
    #[serde(rename = "en_negociacion")]
    pub negotiated_with: Option<Contact>,

    /// Workshop the vehicle is serviced in.
    #[serde(rename = "en_mantenimiento")]
    pub serviced_in: Option<Workshop>,

    /// Reservations, in their creation order.
    #[serde(rename = "reservas")]
    pub reservations: Vec<Reservation>,

    /// Creation date and time.
    #[serde(with = "datetime::serde::rfc3339")]
    pub created_at: domain::vehicle::CreationDateTime,

    /// Last modification date and time.
    #[serde(with = "datetime::serde::rfc3339")]
    pub updated_at: domain::vehicle::ModificationDateTime,
}

impl From<domain::Vehicle> for Vehicle {
    fn from(vehicle: domain::Vehicle) -> Self {
        use status::Status as S;

        let domain::Vehicle {
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
            features:
                Features {
                    general,
                    exterior,
                    safety,
                    comfort,
                    interior,
                    entertainment,
                },
            featured,
            status,
            reservations,
            revision: _,
            created_at,
            updated_at,
        } = vehicle;

        let kind = status.kind();
        let (mut reserved_by, mut sold_to, mut negotiated_with) =
            (None, None, None);
        let mut serviced_in = None;
        match status {
            S::Available => {}
            S::Reserved(c) => reserved_by = c.map(Into::into),
            S::Sold(c) => sold_to = c.map(Into::into),
            S::InNegotiation(c) => negotiated_with = c.map(Into::into),
            S::InMaintenance(w) => serviced_in = w.map(Into::into),
        }

        Self {
            stock_id: stock_id.to_string(),
            brand: brand.to_string(),
            model: model.to_string(),
            version: version.to_string(),
            sale_type: sale_type.to_string(),
            fuel_type: fuel_type.to_string(),
            year: year.into(),
            mileage: mileage.into(),
            price,
            discount,
            currency: currency.to_string(),
            city: city.to_string(),
            branch: branch.to_string(),
            transmission: transmission.to_string(),
            drivetrain: drivetrain.to_string(),
            warranty: warranty.to_string(),
            images,
            cover_image,
            imperfection_images,
            equipment: equipment.into(),
            general,
            exterior,
            safety,
            comfort,
            interior,
            entertainment,
            featured,
            status: kind,
            reserved_by,
            sold_to,
            negotiated_with,
            serviced_in,
            reservations: reservations.into_iter().map(Into::into).collect(),
            created_at,
            updated_at,
        }
    }
}

/// Unvalidated [`Vehicle`] properties, as submitted by a client.
///
/// Missing properties are defaulted, so that validation reports all of them
/// at once.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Draft {
    /// Brand.
    #[serde(rename = "marca")]
    pub brand: String,

    /// Model.
    #[serde(rename = "modelo")]
    pub model: String,

    /// Version (trim level).
    pub version: String,

    /// Sale type.
    #[serde(rename = "tipo_venta")]
    pub sale_type: String,

    /// Fuel type.
    #[serde(rename = "tipo_combustible")]
    pub fuel_type: String,

    /// Manufacturing year.
    #[serde(rename = "año")]
    pub year: i64,

    /// Odometer reading, in kilometers.
    #[serde(rename = "kilometraje")]
    pub mileage: i64,

    /// Price before the discount.
    #[serde(rename = "precio", with = "rust_decimal::serde::float")]
    pub price: Decimal,

    /// Discount to subtract from the price.
    #[serde(rename = "descuento", with = "rust_decimal::serde::float")]
    pub discount: Decimal,

    /// Currency of the prices.
    #[serde(rename = "moneda")]
    pub currency: String,

    /// City.
    #[serde(rename = "ciudad")]
    pub city: String,

    /// Branch.
    #[serde(rename = "sucursal")]
    pub branch: String,

    /// Transmission.
    #[serde(rename = "transmision")]
    pub transmission: String,

    /// Drivetrain.
    #[serde(rename = "traccion")]
    pub drivetrain: String,

    /// Warranty.
    #[serde(rename = "garantia")]
    pub warranty: String,

    /// Image URLs.
    #[serde(rename = "imagenes")]
    pub images: Vec<String>,

    /// Cover image URL.
    #[serde(rename = "imagen_portada")]
    pub cover_image: Option<String>,

    /// Image URLs of the imperfections.
    #[serde(rename = "imagenes_imperfecciones")]
    pub imperfection_images: Vec<String>,

    /// Highlighted equipment.
    #[serde(rename = "equipamiento_destacado")]
    pub equipment: Vec<String>,

    /// General attributes.
    #[serde(rename = "caracteristicas_general")]
    pub general: Attributes,

    /// Exterior attributes.
    #[serde(rename = "caracteristicas_exterior")]
    pub exterior: Attributes,

    /// Safety attributes.
    #[serde(rename = "caracteristicas_seguridad")]
    pub safety: Attributes,

    /// Comfort attributes.
    #[serde(rename = "caracteristicas_confort")]
    pub comfort: Attributes,

    /// Interior attributes.
    #[serde(rename = "caracteristicas_interior")]
    pub interior: Attributes,

    /// Entertainment attributes.
    #[serde(rename = "caracteristicas_entretenimiento")]
    pub entertainment: Attributes,

    /// Indicator whether the vehicle is featured.
    pub featured: bool,

    /// Commercial status, `disponible` if empty.
    #[serde(rename = "estado")]
    pub status: String,

    /// Payloads of the commercial status.
    #[serde(flatten)]
    pub payloads: api::status::Payloads,
}

impl From<Draft> for domain::vehicle::Draft {
    fn from(draft: Draft) -> Self {
        let Draft {
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
            general,
            exterior,
            safety,
            comfort,
            interior,
            entertainment,
            featured,
            status,
            payloads,
        } = draft;

        Self {
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
            features: Features {
                general,
                exterior,
                safety,
                comfort,
                interior,
                entertainment,
            },
            featured,
            status,
            payloads: payloads.into(),
        }
    }
}

/// Query parameters of a [`Vehicle`] list.
///
/// Kept as raw strings, so an unparsable value is ignored rather than
/// failing the whole request.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListParams {
    /// Case-insensitive prefix of the brand.
    #[serde(rename = "marca")]
    pub brand: Option<String>,

    /// Case-insensitive prefix of the model.
    #[serde(rename = "modelo")]
    pub model: Option<String>,

    /// Case-insensitive prefix of the fuel type.
    #[serde(rename = "combustible")]
    pub fuel_type: Option<String>,

    /// Exact manufacturing year.
    #[serde(rename = "año")]
    pub year: Option<String>,

    /// Exact mileage.
    #[serde(rename = "kilometraje")]
    pub mileage: Option<String>,

    /// Minimal mileage.
    pub km_min: Option<String>,

    /// Maximal mileage.
    pub km_max: Option<String>,

    /// Exact price.
    #[serde(rename = "precio")]
    pub price: Option<String>,

    /// Minimal price.
    #[serde(rename = "precio_min")]
    pub price_min: Option<String>,

    /// Maximal price.
    #[serde(rename = "precio_max")]
    pub price_max: Option<String>,

    /// `true` to list featured vehicles only.
    #[serde(rename = "destacado")]
    pub featured: Option<String>,

    /// `true` to list discounted vehicles only.
    #[serde(rename = "descuento")]
    pub discounted: Option<String>,

    /// Price order: `asc` or `desc`.
    pub sort_precio: Option<String>,

    /// Creation order: `nuevo` (newest first) or `viejo`.
    pub sort_fecha: Option<String>,

    /// Mileage order: `mayor` (highest first) or `menor`.
    pub sort_km: Option<String>,
}

impl From<ListParams> for Selector {
    fn from(params: ListParams) -> Self {
        let ListParams {
            brand,
            model,
            fuel_type,
            year,
            mileage,
            km_min,
            km_max,
            price,
            price_min,
            price_max,
            featured,
            discounted,
            sort_precio,
            sort_fecha,
            sort_km,
        } = params;

        let year = parse::<i64>("año", year).and_then(|y| {
            Year::new(y).or_else(|| ignore("año", &y))
        });
        let km = |name, value| {
            parse::<i64>(name, value)
                .and_then(|v| Mileage::new(v).or_else(|| ignore(name, &v)))
        };
        let mileage = range(
            km("kilometraje", mileage),
            km("km_min", km_min),
            km("km_max", km_max),
        );
        let price = range(
            parse::<Money>("precio", price),
            parse::<Money>("precio_min", price_min),
            parse::<Money>("precio_max", price_max),
        );

        let mut sorting = None;
        for (name, value) in [
            ("sort_precio", sort_precio),
            ("sort_fecha", sort_fecha),
            ("sort_km", sort_km),
        ] {
            let Some(value) = value else {
                continue;
            };
            let parsed = match (name, value.trim()) {
                ("sort_precio", "asc") => Some(Sorting::asc(Field::Price)),
                ("sort_precio", "desc") => Some(Sorting::desc(Field::Price)),
                ("sort_fecha", "nuevo") => {
                    Some(Sorting::desc(Field::CreatedAt))
                }
                ("sort_fecha", "viejo") => Some(Sorting::asc(Field::CreatedAt)),
                ("sort_km", "mayor") => Some(Sorting::desc(Field::Mileage)),
                ("sort_km", "menor") => Some(Sorting::asc(Field::Mileage)),
                _ => ignore(name, &value),
            };
            if parsed.is_some() {
                sorting = parsed;
            }
        }

        Self {
            filter: Filter {
                brand: text(brand),
                model: text(model),
                fuel_type: text(fuel_type),
                year,
                mileage,
                price,
                featured_only: flag(featured.as_deref()),
                discounted_only: flag(discounted.as_deref()),
            },
            sorting,
        }
    }
}

/// Parses the provided raw query parameter `value`.
///
/// [`None`] is returned if the `value` is absent, blank or unparsable.
fn parse<T: FromStr>(name: &str, value: Option<String>) -> Option<T> {
    let value = value?;
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    value.parse().ok().or_else(|| ignore(name, &value))
}

/// Logs the ignored query parameter `value`.
fn ignore<T>(name: &str, value: &dyn fmt::Display) -> Option<T> {
    log::warn!("ignoring invalid `{name}` query parameter: `{value}`");
    None
}

/// Builds a [`Range`] out of the provided parsed bounds.
///
/// Any of `min` or `max` takes precedence over the `exact` value.
fn range<T>(
    exact: Option<T>,
    min: Option<T>,
    max: Option<T>,
) -> Option<Range<T>> {
    if min.is_some() || max.is_some() {
        Some(Range::Within { min, max })
    } else {
        exact.map(Range::Exact)
    }
}

/// Normalizes the provided raw text query parameter.
fn text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Checks whether the provided raw flag query parameter is set.
fn flag(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}

define_error! {
    enum ListError {
        #[code = "NOT_FOUND"]
        #[status = NOT_FOUND]
        #[message = "No se encontraron autos con los filtros especificados"]
        NothingFound,

        #[code = "NOT_FOUND"]
        #[status = NOT_FOUND]
        #[message = "No hay autos destacados disponibles"]
        NoFeatured,
    }
}

/// Lists [`Vehicle`]s passing the provided [`ListParams`].
///
/// # Errors
///
/// `NOT_FOUND` if no [`Vehicle`] passes the [`ListParams`].
#[tracing::instrument(skip_all, fields(params = ?params))]
pub async fn list(
    Extension(service): Extension<Service>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<Vehicle>>, Error> {
    let Query(params) = params.map_err(AsError::into_error)?;

    let vehicles = service
        .execute(query::vehicles::List::by(params.into()))
        .await
        .map_err(AsError::into_error)?;
    if vehicles.is_empty() {
        return Err(ListError::NothingFound.into());
    }

    Ok(Json(vehicles.into_iter().map(Into::into).collect()))
}

/// Lists featured [`Vehicle`]s in their creation order.
///
/// # Errors
///
/// `NOT_FOUND` if there are no featured [`Vehicle`]s.
#[tracing::instrument(skip_all)]
pub async fn featured(
    Extension(service): Extension<Service>,
) -> Result<Json<Vec<Vehicle>>, Error> {
    let vehicles = service
        .execute(query::vehicles::List::by(Selector {
            filter: Filter {
                featured_only: true,
                ..Filter::default()
            },
            sorting: None,
        }))
        .await
        .map_err(AsError::into_error)?;
    if vehicles.is_empty() {
        return Err(ListError::NoFeatured.into());
    }

    Ok(Json(vehicles.into_iter().map(Into::into).collect()))
}

/// Response of a [`Vehicle`] creation or update.
#[derive(Clone, Debug, Serialize)]
pub struct Saved {
    /// Human-readable outcome.
    #[serde(rename = "mensaje")]
    pub message: &'static str,

    /// Saved [`Vehicle`].
    #[serde(rename = "auto")]
    pub vehicle: Vehicle,
}

/// Creates a new [`Vehicle`] out of the provided [`Draft`].
///
/// # Errors
///
/// - `VALIDATION_ERROR` if the [`Draft`] is invalid;
/// - `CONFLICT` if no stock identifier could be allocated.
#[tracing::instrument(skip_all)]
pub async fn create(
    Extension(service): Extension<Service>,
    draft: Result<Json<Draft>, JsonRejection>,
) -> Result<(StatusCode, Json<Saved>), Error> {
    let Json(draft) = draft.map_err(AsError::into_error)?;

    let vehicle = service
        .execute(command::CreateVehicle {
            draft: draft.into(),
        })
        .await
        .map_err(AsError::into_error)?;
    log::info!("created `Vehicle(stock_id: {})`", vehicle.stock_id);

    Ok((
        StatusCode::CREATED,
        Json(Saved {
            message: "Auto creado exitosamente",
            vehicle: vehicle.into(),
        }),
    ))
}

/// Replaces the properties of an existing [`Vehicle`] with the provided
/// [`Draft`].
///
/// # Errors
///
/// - `VALIDATION_ERROR` if the stock identifier or the [`Draft`] is invalid;
/// - `NOT_FOUND` if the [`Vehicle`] doesn't exist;
/// - `CONFLICT` if the [`Vehicle`] was modified concurrently.
#[tracing::instrument(skip_all, fields(stock_id = %stock_id))]
pub async fn update(
    Extension(service): Extension<Service>,
    Path(stock_id): Path<String>,
    draft: Result<Json<Draft>, JsonRejection>,
) -> Result<Json<Saved>, Error> {
    let stock_id = api::stock_id(&stock_id)?;
    let Json(draft) = draft.map_err(AsError::into_error)?;

    let vehicle = service
        .execute(command::UpdateVehicle {
            stock_id,
            draft: draft.into(),
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(Saved {
        message: "Auto actualizado exitosamente",
        vehicle: vehicle.into(),
    }))
}

/// Deletes an existing [`Vehicle`].
///
/// # Errors
///
/// - `VALIDATION_ERROR` if the stock identifier is invalid;
/// - `NOT_FOUND` if the [`Vehicle`] doesn't exist.
#[tracing::instrument(skip_all, fields(stock_id = %stock_id))]
pub async fn delete(
    Extension(service): Extension<Service>,
    Path(stock_id): Path<String>,
) -> Result<Json<api::Message>, Error> {
    let stock_id = api::stock_id(&stock_id)?;

    service
        .execute(command::DeleteVehicle { stock_id })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(api::Message {
        message: "Auto eliminado exitosamente",
    }))
}

/// Response of a [`Vehicle`] featured flag toggle.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Toggled {
    /// Human-readable outcome.
    #[serde(rename = "mensaje")]
    pub message: &'static str,

    /// New value of the flag.
    pub featured: bool,
}

/// Flips the featured flag of an existing [`Vehicle`].
///
/// # Errors
///
/// - `VALIDATION_ERROR` if the stock identifier is invalid;
/// - `NOT_FOUND` if the [`Vehicle`] doesn't exist;
/// - `CONFLICT` if the [`Vehicle`] was modified concurrently.
#[tracing::instrument(skip_all, fields(stock_id = %stock_id))]
pub async fn toggle_featured(
    Extension(service): Extension<Service>,
    Path(stock_id): Path<String>,
) -> Result<Json<Toggled>, Error> {
    let stock_id = api::stock_id(&stock_id)?;

    let featured = service
        .execute(command::ToggleVehicleFeatured { stock_id })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(Toggled {
        message: "Estado destacado actualizado exitosamente",
        featured,
    }))
}

/// Message of a [`Rejection`] error.
///
/// [`Rejection`]: domain::vehicle::validation::Rejection
const INVALID_MESSAGE: &str = "Campos requeridos faltantes o inválidos";

impl AsError for command::create_vehicle::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "CONFLICT"]
                #[status = CONFLICT]
                #[message = "No quedan stock_id disponibles para la marca"]
                StockIdsExhausted,

                #[code = "CONFLICT"]
                #[status = CONFLICT]
                #[message = "El stock_id generado ya está ocupado, reintente"]
                StockIdOccupied,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Invalid(r) => Some(crate::Error::validation(
                &INVALID_MESSAGE,
                r.violations(),
            )),
            Self::StockIdsExhausted(_) => Some(Error::StockIdsExhausted.into()),
            Self::StockIdOccupied(_) => Some(Error::StockIdOccupied.into()),
        }
    }
}

impl AsError for command::update_vehicle::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Invalid(r) => {
                Some(Error::validation(&INVALID_MESSAGE, r.violations()))
            }
            Self::VehicleNotExists(_) => {
                Some(api::VehicleError::NotExists.into())
            }
            Self::ConcurrentModification(_) => {
                Some(api::VehicleError::ConcurrentModification.into())
            }
        }
    }
}

impl AsError for command::delete_vehicle::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::VehicleNotExists(_) => {
                Some(api::VehicleError::NotExists.into())
            }
        }
    }
}

impl AsError for command::toggle_vehicle_featured::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::VehicleNotExists(_) => {
                Some(api::VehicleError::NotExists.into())
            }
            Self::ConcurrentModification(_) => {
                Some(api::VehicleError::ConcurrentModification.into())
            }
        }
    }
}

#[cfg(test)]
mod spec {
    use axum::extract::Query;
    use common::sorting::{Order, Sorting};
    use service::read::vehicle::list::{Field, Range, Selector};

    use super::{Draft, ListParams};

    fn selector(query: &str) -> Selector {
        let uri: http::Uri = format!("/api/autos?{query}").parse().unwrap();
        let Query(params) = Query::<ListParams>::try_from_uri(&uri).unwrap();
        params.into()
    }

    #[test]
    fn parses_filters() {
        let s = selector(
            "marca=toy&combustible=%20&a%C3%B1o=2020&destacado=true\
             &descuento=no",
        );

        assert_eq!(s.filter.brand.as_deref(), Some("toy"));
        assert_eq!(s.filter.fuel_type, None);
        assert_eq!(s.filter.year.map(u16::from), Some(2020));
        assert!(s.filter.featured_only);
        assert!(!s.filter.discounted_only);
        assert!(s.sorting.is_none());
    }

    #[test]
    fn ranges_override_exact_values() {
        let s = selector("kilometraje=100&km_max=5000&precio=15000");

        assert_eq!(
            s.filter.mileage.map(|r| r.bounds()).map(|(min, max)| (
                min.map(u32::from),
                max.map(u32::from)
            )),
            Some((None, Some(5000))),
        );
        assert!(matches!(
            s.filter.price,
            Some(Range::Exact(p)) if p.to_string() == "15000",
        ));
    }

    #[test]
    fn ignores_unparsable_numbers() {
        let s = selector("a%C3%B1o=abc&kilometraje=-5&precio_min=barato");

        assert!(s.filter.year.is_none());
        assert!(s.filter.mileage.is_none());
        assert!(s.filter.price.is_none());
    }

    #[test]
    fn last_sorting_wins() {
        let s = selector("sort_precio=asc");
        assert_eq!(s.sorting, Some(Sorting::asc(Field::Price)));

        let s = selector("sort_km=mayor&sort_precio=asc&sort_fecha=nuevo");
        assert_eq!(
            s.sorting,
            Some(Sorting {
                field: Field::Mileage,
                order: Order::Descending,
            }),
        );

        let s = selector("sort_precio=desc&sort_km=sideways");
        assert_eq!(s.sorting, Some(Sorting::desc(Field::Price)));
    }

    #[test]
    fn deserializes_draft_leniently() {
        let draft: Draft = serde_json::from_value(serde_json::json!({
            "marca": "Toyota",
            "año": 2020,
            "precio": 20000,
            "descuento": 1500.5,
            "estado": "reservado",
            "reservado_por": {"nombre": "Ana", "celular": "351"},
            "stock_id": "T01",
        }))
        .unwrap();

        assert_eq!(draft.brand, "Toyota");
        assert_eq!(draft.year, 2020);
        assert_eq!(draft.price.to_string(), "20000");
        assert_eq!(draft.discount.to_string(), "1500.5");
        assert!(draft.model.is_empty());
        assert!(draft.equipment.is_empty());

        let draft = service::domain::vehicle::Draft::from(draft);
        let contact = draft.payloads.reserved.unwrap();
        assert_eq!(contact.name, "Ana");
        assert_eq!(contact.phone, "351");
    }
}
