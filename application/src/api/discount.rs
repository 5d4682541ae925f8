//! Discount-related definitions.

use axum::{
    extract::{rejection::JsonRejection, Path},
    Extension, Json,
};
use common::Money;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain::vehicle::discount,
};

use crate::{api, define_error, AsError, Error, Service};

/// Request applying a discount.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct Apply {
    /// Amount to subtract from the price.
    #[serde(rename = "descuento", with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

/// Response of an applied discount.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Applied {
    /// Human-readable outcome.
    #[serde(rename = "mensaje")]
    pub message: &'static str,

    /// Applied discount.
    #[serde(rename = "descuento")]
    pub discount: Money,

    /// Price before the discount.
    #[serde(rename = "precio_original")]
    pub original_price: Money,

    /// Price after the discount.
    #[serde(rename = "precio_con_descuento")]
    pub discounted_price: Money,
}

/// Response of a removed discount.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Removed {
    /// Human-readable outcome.
    #[serde(rename = "mensaje")]
    pub message: &'static str,

    /// Restored price.
    #[serde(rename = "precio_original")]
    pub original_price: Money,

    /// Discount left, always zero.
    #[serde(rename = "descuento")]
    pub discount: Money,
}

/// Applies a discount to an existing vehicle.
///
/// # Errors
///
/// - `VALIDATION_ERROR` if the stock identifier or the amount is invalid;
/// - `NOT_FOUND` if the vehicle doesn't exist;
/// - `CONFLICT` if a discount is applied already.
#[tracing::instrument(skip_all, fields(stock_id = %stock_id))]
pub async fn apply(
    Extension(service): Extension<Service>,
    Path(stock_id): Path<String>,
    req: Result<Json<Apply>, JsonRejection>,
) -> Result<Json<Applied>, Error> {
    let stock_id = api::stock_id(&stock_id)?;
    let Json(Apply { amount }) = req.map_err(AsError::into_error)?;

    let discount::Applied {
        discount,
        original_price,
        discounted_price,
    } = service
        .execute(command::ApplyVehicleDiscount { stock_id, amount })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(Applied {
        message: "Descuento aplicado exitosamente",
        discount,
        original_price,
        discounted_price,
    }))
}

/// Removes the active discount of an existing vehicle.
///
/// # Errors
///
/// - `VALIDATION_ERROR` if the stock identifier is invalid;
/// - `NOT_FOUND` if the vehicle doesn't exist;
/// - `CONFLICT` if no discount is applied.
#[tracing::instrument(skip_all, fields(stock_id = %stock_id))]
pub async fn remove(
    Extension(service): Extension<Service>,
    Path(stock_id): Path<String>,
) -> Result<Json<Removed>, Error> {
    let stock_id = api::stock_id(&stock_id)?;

    let original_price = service
        .execute(command::RemoveVehicleDiscount { stock_id })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(Removed {
        message: "Descuento eliminado exitosamente",
        original_price,
        discount: Money::ZERO,
    }))
}

define_error! {
    enum DiscountError {
        #[code = "VALIDATION_ERROR"]
        #[status = BAD_REQUEST]
        #[message = "Descuento no puede ser negativo"]
        Negative,

        #[code = "CONFLICT"]
        #[status = CONFLICT]
        #[message = "Ya existe un descuento para este auto. Elimínelo primero \
                     para agregar uno nuevo"]
        AlreadyActive,

        #[code = "VALIDATION_ERROR"]
        #[status = BAD_REQUEST]
        #[message = "El descuento no puede ser mayor al precio original"]
        ExceedsPrice,

        #[code = "VALIDATION_ERROR"]
        #[status = BAD_REQUEST]
        #[message = "El descuento no puede reducir el precio a cero o negativo"]
        NonPositivePrice,

        #[code = "CONFLICT"]
        #[status = CONFLICT]
        #[message = "No hay descuento aplicado para este auto"]
        NotActive,
    }
}

impl AsError for discount::Error {
    fn try_as_error(&self) -> Option<Error> {
        let mut err = Error::from(match self {
            Self::Negative => DiscountError::Negative,
            Self::AlreadyActive => DiscountError::AlreadyActive,
            Self::ExceedsPrice => DiscountError::ExceedsPrice,
            Self::NonPositivePrice => DiscountError::NonPositivePrice,
            Self::NotActive => DiscountError::NotActive,
        });
        if err.code == Error::VALIDATION {
            err.fields.push("descuento".to_owned());
        }
        Some(err)
    }
}

impl AsError for command::apply_vehicle_discount::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Discount(e) => e.try_as_error(),
            Self::VehicleNotExists(_) => {
                Some(api::VehicleError::NotExists.into())
            }
            Self::ConcurrentModification(_) => {
                Some(api::VehicleError::ConcurrentModification.into())
            }
        }
    }
}

impl AsError for command::remove_vehicle_discount::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Discount(e) => e.try_as_error(),
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
    use service::domain::vehicle::discount;

    use crate::AsError as _;

    #[test]
    fn maps_discount_errors() {
        let err = discount::Error::AlreadyActive.try_as_error().unwrap();
        assert_eq!(err.status_code, http::StatusCode::CONFLICT);
        assert!(err.fields.is_empty());

        let err = discount::Error::ExceedsPrice.try_as_error().unwrap();
        assert_eq!(err.status_code, http::StatusCode::BAD_REQUEST);
        assert_eq!(err.fields, ["descuento"]);
    }
}
