//! Commercial [`status`]-related definitions.

use axum::{
    extract::{rejection::JsonRejection, Path},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain::vehicle::status,
};

use crate::{api, define_error, AsError, Error, Service};

/// Customer details attached to a [`status::Status`].
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Contact {
    /// First name.
    #[serde(rename = "nombre")]
    pub name: String,

    /// Last name.
    #[serde(rename = "apellido")]
    pub surname: String,

    /// Mobile phone number.
    #[serde(rename = "celular")]
    pub phone: String,

    /// Free-form comment.
    #[serde(rename = "comentario")]
    pub comment: String,
}

impl From<status::Contact> for Contact {
    fn from(contact: status::Contact) -> Self {
        let status::Contact {
            name,
            surname,
            phone,
            comment,
        } = contact;
        Self {
            name,
            surname,
            phone,
            comment,
        }
    }
}

impl From<Contact> for status::Contact {
    fn from(contact: Contact) -> Self {
        let Contact {
            name,
            surname,
            phone,
            comment,
        } = contact;
        Self {
            name,
            surname,
            phone,
            comment,
        }
    }
}

/// Workshop details attached to a [`status::Status`].
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Workshop {
    /// Workshop name.
    #[serde(rename = "taller")]
    pub workshop: String,

    /// Mechanic in charge.
    #[serde(rename = "mecanico")]
    pub mechanic: String,

    /// Mobile phone number.
    #[serde(rename = "celular")]
    pub phone: String,

    /// Free-form comment.
    #[serde(rename = "comentario")]
    pub comment: String,
}

impl From<status::Workshop> for Workshop {
    fn from(workshop: status::Workshop) -> Self {
        let status::Workshop {
            workshop,
            mechanic,
            phone,
            comment,
        } = workshop;
        Self {
            workshop,
            mechanic,
            phone,
            comment,
        }
    }
}

impl From<Workshop> for status::Workshop {
    fn from(workshop: Workshop) -> Self {
        let Workshop {
            workshop,
            mechanic,
            phone,
            comment,
        } = workshop;
        Self {
            workshop,
            mechanic,
            phone,
            comment,
        }
    }
}

/// Payloads submitted along with a [`status::Kind`].
///
/// Only the one matching the [`status::Kind`] is kept.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Payloads {
    /// Payload of `reservado`.
    #[serde(rename = "reservado_por")]
    pub reserved: Option<Contact>,

    /// Payload of `vendido`.
    #[serde(rename = "vendido_por")]
    pub sold: Option<Contact>,

    /// Payload of `en negociación`.
    #[serde(rename = "en_negociacion")]
    pub in_negotiation: Option<Contact>,

    /// Payload of `en mantenimiento`.
    #[serde(rename = "en_mantenimiento")]
    pub in_maintenance: Option<Workshop>,
}

impl From<Payloads> for status::Payloads {
    fn from(payloads: Payloads) -> Self {
        let Payloads {
            reserved,
            sold,
            in_negotiation,
            in_maintenance,
        } = payloads;
        Self {
            reserved: reserved.map(Into::into),
            sold: sold.map(Into::into),
            in_negotiation: in_negotiation.map(Into::into),
            in_maintenance: in_maintenance.map(Into::into),
        }
    }
}

/// Request changing a [`status::Status`].
#[derive(Clone, Debug, Deserialize)]
pub struct Change {
    /// Name of the new [`status::Kind`].
    #[serde(rename = "estado", default)]
    pub kind: String,

    /// Payloads of the new [`status::Kind`].
    #[serde(flatten)]
    pub payloads: Payloads,
}

/// Response of a [`status::Status`] change.
#[derive(Clone, Debug, Serialize)]
pub struct Changed {
    /// Human-readable outcome.
    #[serde(rename = "mensaje")]
    pub message: &'static str,

    /// New [`status::Kind`].
    #[serde(rename = "estado")]
    pub kind: status::Kind,

    /// Updated vehicle.
    #[serde(rename = "auto")]
    pub vehicle: api::vehicle::Vehicle,
}

define_error! {
    enum StatusError {
        #[code = "VALIDATION_ERROR"]
        #[status = BAD_REQUEST]
        #[message = "Estado inválido"]
        Invalid,
    }
}

/// Changes the commercial [`status::Status`] of an existing vehicle.
///
/// # Errors
///
/// - `VALIDATION_ERROR` if the stock identifier or the [`status::Kind`] is
///   invalid;
/// - `NOT_FOUND` if the vehicle doesn't exist;
/// - `CONFLICT` if the vehicle was modified concurrently.
#[tracing::instrument(skip_all, fields(stock_id = %stock_id))]
pub async fn change(
    Extension(service): Extension<Service>,
    Path(stock_id): Path<String>,
    req: Result<Json<Change>, JsonRejection>,
) -> Result<Json<Changed>, Error> {
    let stock_id = api::stock_id(&stock_id)?;
    let Json(Change { kind, payloads }) = req.map_err(AsError::into_error)?;
    let kind = kind.trim().parse::<status::Kind>().map_err(|_| {
        let mut err = Error::from(StatusError::Invalid);
        err.fields.push("estado inválido".to_owned());
        err
    })?;

    let vehicle = service
        .execute(command::ChangeVehicleStatus {
            stock_id,
            kind,
            payloads: payloads.into(),
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(Changed {
        message: "Estado del auto actualizado exitosamente",
        kind,
        vehicle: vehicle.into(),
    }))
}

impl AsError for command::change_vehicle_status::ExecutionError {
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
    use service::domain::vehicle::status;

    use super::Change;

    #[test]
    fn deserializes_change_with_payload() {
        let req: Change = serde_json::from_value(serde_json::json!({
            "estado": "en mantenimiento",
            "en_mantenimiento": {
                "taller": "Norte",
                "mecanico": "Raúl",
            },
        }))
        .unwrap();

        assert_eq!(
            req.kind.parse::<status::Kind>().unwrap(),
            status::Kind::InMaintenance,
        );
        let payloads = status::Payloads::from(req.payloads);
        let workshop = payloads.in_maintenance.unwrap();
        assert_eq!(workshop.workshop, "Norte");
        assert_eq!(workshop.mechanic, "Raúl");
        assert!(workshop.phone.is_empty());
        assert!(payloads.reserved.is_none());
    }

    #[test]
    fn accepts_english_aliases() {
        for (name, kind) in [
            ("available", status::Kind::Available),
            ("in-negotiation", status::Kind::InNegotiation),
            ("vendido", status::Kind::Sold),
        ] {
            assert_eq!(name.parse::<status::Kind>().unwrap(), kind);
        }
        assert!("perdido".parse::<status::Kind>().is_err());
    }
}
