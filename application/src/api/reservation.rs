//! [`Reservation`]-related definitions.

use axum::{
    extract::{rejection::JsonRejection, Path},
    http::StatusCode,
    Extension, Json,
};
use common::{datetime, DateTime};
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain::{self, reservation},
    query, Query as _,
};
use tracing as log;

use crate::{api, define_error, AsError, Error, Service};

/// [`domain::Reservation`] as represented in the HTTP API.
#[derive(Clone, Debug, Serialize)]
pub struct Reservation {
    /// Identifier, unique within its vehicle.
    pub id: String,

    /// First name of the customer.
    #[serde(rename = "nombre")]
    pub name: String,

    /// Last name of the customer.
    #[serde(rename = "apellido")]
    pub surname: String,

    /// Phone number of the customer.
    #[serde(rename = "telefono")]
    pub phone: String,

    /// Free-form comment.
    #[serde(rename = "comentario")]
    pub comment: String,

    /// Date and time of the appointment.
    #[serde(rename = "fecha_hora", with = "datetime::serde::rfc3339")]
    pub scheduled_at: reservation::ScheduledDateTime,
}

impl From<domain::Reservation> for Reservation {
    fn from(reservation: domain::Reservation) -> Self {
        let domain::Reservation {
            id,
            name,
            surname,
            phone,
            comment,
            scheduled_at,
        } = reservation;
        Self {
            id: id.into(),
            name,
            surname,
            phone,
            comment,
            scheduled_at,
        }
    }
}

/// Unvalidated [`Reservation`] fields, as submitted by a client.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Fields {
    /// First name of the customer.
    #[serde(rename = "nombre")]
    pub name: String,

    /// Last name of the customer.
    #[serde(rename = "apellido")]
    pub surname: String,

    /// Phone number of the customer.
    #[serde(rename = "telefono")]
    pub phone: String,

    /// Free-form comment.
    #[serde(rename = "comentario")]
    pub comment: String,

    /// [RFC 3339] date and time of the appointment.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    #[serde(rename = "fecha_hora")]
    pub scheduled_at: Option<String>,
}

impl From<Fields> for reservation::Fields {
    fn from(fields: Fields) -> Self {
        let Fields {
            name,
            surname,
            phone,
            comment,
            scheduled_at,
        } = fields;

        let scheduled_at = scheduled_at.and_then(|raw| {
            DateTime::from_rfc3339(raw.trim())
                .inspect_err(|e| {
                    log::debug!("unparsable `fecha_hora` `{raw}`: {e}");
                })
                .ok()
        });

        Self {
            name,
            surname,
            phone,
            comment,
            scheduled_at: scheduled_at.map(DateTime::coerce),
        }
    }
}

/// Response listing [`Reservation`]s of a vehicle.
#[derive(Clone, Debug, Serialize)]
pub struct Listed {
    /// Human-readable outcome.
    #[serde(rename = "mensaje")]
    pub message: &'static str,

    /// Stock identifier of the vehicle.
    pub stock_id: String,

    /// [`Reservation`]s in their creation order.
    #[serde(rename = "reservas")]
    pub reservations: Vec<Reservation>,

    /// Number of the [`Reservation`]s.
    pub total: usize,
}

/// Response of a saved [`Reservation`].
#[derive(Clone, Debug, Serialize)]
pub struct Saved {
    /// Human-readable outcome.
    #[serde(rename = "mensaje")]
    pub message: &'static str,

    /// Saved [`Reservation`].
    #[serde(rename = "reserva")]
    pub reservation: Reservation,
}

define_error! {
    enum ReservationError {
        #[code = "VALIDATION_ERROR"]
        #[status = BAD_REQUEST]
        #[message = "reserva_id inválido"]
        InvalidId,

        #[code = "VALIDATION_ERROR"]
        #[status = BAD_REQUEST]
        #[message = "Nombre, apellido y fecha y hora de reserva son \
                     requeridos"]
        Invalid,

        #[code = "CONFLICT"]
        #[status = CONFLICT]
        #[message = "Ya existe una reserva activa para este cliente y \
                     vehículo"]
        Duplicate,

        #[code = "NOT_FOUND"]
        #[status = NOT_FOUND]
        #[message = "Reserva no encontrada"]
        NotFound,

        #[code = "CONFLICT"]
        #[status = CONFLICT]
        #[message = "No quedan identificadores de reserva disponibles"]
        IdsExhausted,
    }
}

/// Parses the provided raw path segment as a [`reservation::Id`].
fn reservation_id(raw: &str) -> Result<reservation::Id, Error> {
    reservation::Id::new(raw).ok_or_else(|| {
        let mut err = Error::from(ReservationError::InvalidId);
        err.fields.push("reserva_id".to_owned());
        err
    })
}

/// Lists [`Reservation`]s of an existing vehicle.
///
/// # Errors
///
/// - `VALIDATION_ERROR` if the stock identifier is invalid;
/// - `NOT_FOUND` if the vehicle doesn't exist.
#[tracing::instrument(skip_all, fields(stock_id = %stock_id))]
pub async fn list(
    Extension(service): Extension<Service>,
    Path(stock_id): Path<String>,
) -> Result<Json<Listed>, Error> {
    let stock_id = api::stock_id(&stock_id)?;

    let vehicle = service
        .execute(query::vehicle::ByStockId::by(stock_id))
        .await
        .map_err(AsError::into_error)?
        .ok_or_else(|| Error::from(api::VehicleError::NotExists))?;

    let reservations = vehicle
        .reservations()
        .iter()
        .cloned()
        .map(Reservation::from)
        .collect::<Vec<_>>();
    Ok(Json(Listed {
        message: if reservations.is_empty() {
            "No hay reservas para este auto"
        } else {
            "Reservas obtenidas exitosamente"
        },
        stock_id: vehicle.stock_id.to_string(),
        total: reservations.len(),
        reservations,
    }))
}

/// Reserves an existing vehicle for a customer.
///
/// # Errors
///
/// - `VALIDATION_ERROR` if the stock identifier or the [`Fields`] are
///   invalid;
/// - `NOT_FOUND` if the vehicle doesn't exist;
/// - `CONFLICT` if the customer has reserved the vehicle already.
#[tracing::instrument(skip_all, fields(stock_id = %stock_id))]
pub async fn create(
    Extension(service): Extension<Service>,
    Path(stock_id): Path<String>,
    fields: Result<Json<Fields>, JsonRejection>,
) -> Result<(StatusCode, Json<Saved>), Error> {
    let stock_id = api::stock_id(&stock_id)?;
    let Json(fields) = fields.map_err(AsError::into_error)?;

    let reservation = service
        .execute(command::CreateReservation {
            stock_id,
            fields: fields.into(),
        })
        .await
        .map_err(AsError::into_error)?;
    log::info!("created `Reservation(id: {})`", reservation.id);

    Ok((
        StatusCode::CREATED,
        Json(Saved {
            message: "Reserva creada exitosamente",
            reservation: reservation.into(),
        }),
    ))
}

/// Replaces the [`Fields`] of an existing [`Reservation`].
///
/// # Errors
///
/// - `VALIDATION_ERROR` if any identifier or the [`Fields`] are invalid;
/// - `NOT_FOUND` if the vehicle or the [`Reservation`] doesn't exist;
/// - `CONFLICT` if another [`Reservation`] belongs to the same customer.
#[tracing::instrument(
    skip_all,
    fields(stock_id = %ids.0, reservation_id = %ids.1),
)]
pub async fn edit(
    Extension(service): Extension<Service>,
    Path(ids): Path<(String, String)>,
    fields: Result<Json<Fields>, JsonRejection>,
) -> Result<Json<Saved>, Error> {
    let stock_id = api::stock_id(&ids.0)?;
    let reservation_id = reservation_id(&ids.1)?;
    let Json(fields) = fields.map_err(AsError::into_error)?;

    let reservation = service
        .execute(command::EditReservation {
            stock_id,
            reservation_id,
            fields: fields.into(),
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(Saved {
        message: "Reserva actualizada exitosamente",
        reservation: reservation.into(),
    }))
}

/// Deletes an existing [`Reservation`].
///
/// # Errors
///
/// - `VALIDATION_ERROR` if any identifier is invalid;
/// - `NOT_FOUND` if the vehicle or the [`Reservation`] doesn't exist.
#[tracing::instrument(
    skip_all,
    fields(stock_id = %ids.0, reservation_id = %ids.1),
)]
pub async fn delete(
    Extension(service): Extension<Service>,
    Path(ids): Path<(String, String)>,
) -> Result<Json<api::Message>, Error> {
    let stock_id = api::stock_id(&ids.0)?;
    let reservation_id = reservation_id(&ids.1)?;

    _ = service
        .execute(command::DeleteReservation {
            stock_id,
            reservation_id,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(api::Message {
        message: "Reserva eliminada exitosamente",
    }))
}

impl AsError for reservation::Error {
    fn try_as_error(&self) -> Option<Error> {
        use ReservationError as E;

        Some(match self {
            Self::Invalid(violations) => {
                let mut err = Error::from(E::Invalid);
                err.fields = violations.iter().map(ToString::to_string).collect();
                err
            }
            Self::Duplicate => E::Duplicate.into(),
            Self::NotFound => E::NotFound.into(),
            Self::IdsExhausted => E::IdsExhausted.into(),
        })
    }
}

impl AsError for command::create_reservation::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Reservation(e) => e.try_as_error(),
            Self::VehicleNotExists(_) => {
                Some(api::VehicleError::NotExists.into())
            }
            Self::ConcurrentModification(_) => {
                Some(api::VehicleError::ConcurrentModification.into())
            }
        }
    }
}

impl AsError for command::edit_reservation::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Reservation(e) => e.try_as_error(),
            Self::VehicleNotExists(_) => {
                Some(api::VehicleError::NotExists.into())
            }
            Self::ConcurrentModification(_) => {
                Some(api::VehicleError::ConcurrentModification.into())
            }
        }
    }
}

impl AsError for command::delete_reservation::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Reservation(e) => e.try_as_error(),
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
    use service::domain::reservation;

    use super::Fields;
    use crate::AsError as _;

    #[test]
    fn drops_unparsable_date() {
        let fields = |raw: &str| {
            reservation::Fields::from(Fields {
                name: "Ana".into(),
                scheduled_at: Some(raw.into()),
                ..Fields::default()
            })
        };

        assert!(fields("2024-05-01T10:30:00Z").scheduled_at.is_some());
        assert!(fields("mañana").scheduled_at.is_none());
    }

    #[test]
    fn reports_invalid_fields() {
        let err = reservation::Error::Invalid(vec![
            reservation::Violation::Surname,
            reservation::Violation::ScheduledAt,
        ])
        .try_as_error()
        .unwrap();

        assert_eq!(err.status_code, http::StatusCode::BAD_REQUEST);
        assert_eq!(err.fields, ["apellido", "fecha_hora"]);
    }

    #[test]
    fn maps_missing_reservation() {
        let err = reservation::Error::NotFound.try_as_error().unwrap();

        assert_eq!(err.status_code, http::StatusCode::NOT_FOUND);
        assert_eq!(err.code, "NOT_FOUND");
    }
}
