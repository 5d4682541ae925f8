//! [`Reservation`] definitions.

use std::{str::FromStr, sync::LazyLock};

use common::{datetime, unit, DateTimeOf};
#[cfg(doc)]
use common::DateTime;
use derive_more::{AsRef, Display, Error as StdError};
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::Vehicle;

/// Appointment of a customer to see a [`Vehicle`].
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Reservation {
    /// ID of this [`Reservation`], unique within its [`Vehicle`].
    pub id: Id,

    /// First name of the customer.
    pub name: String,

    /// Last name of the customer.
    pub surname: String,

    /// Phone number of the customer.
    pub phone: String,

    /// Free-form comment.
    pub comment: String,

    /// [`DateTime`] of the appointment.
    #[serde(with = "datetime::serde::rfc3339")]
    pub scheduled_at: ScheduledDateTime,
}

/// ID of a [`Reservation`].
///
/// Consists of an uppercase ASCII letter followed by three digits: `K042`.
#[derive(
    AsRef,
    Clone,
    Debug,
    Deserialize,
    Display,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[as_ref(str)]
#[serde(try_from = "String", into = "String")]
pub struct Id(String);

impl Id {
    /// Creates a new [`Id`] if the given `id` is valid.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        Self::check(&id).then_some(Self(id))
    }

    /// Generates a new random [`Id`].
    #[must_use]
    pub fn random(rng: &mut impl Rng) -> Self {
        let letter = char::from(rng.gen_range(b'A'..=b'Z'));
        let num = rng.gen_range(0..1000);
        Self(format!("{letter}{num:03}"))
    }

    /// Checks whether the given `id` is a valid [`Id`].
    fn check(id: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Id`] format.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[A-Z][0-9]{3}$").expect("valid regex")
        });

        REGEX.is_match(id.as_ref())
    }
}

impl FromStr for Id {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `reservation::Id`")
    }
}

impl TryFrom<String> for Id {
    type Error = &'static str;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s).ok_or("invalid `reservation::Id`")
    }
}

impl From<Id> for String {
    fn from(id: Id) -> Self {
        id.0
    }
}

/// [`DateTime`] of a [`Reservation`] appointment.
pub type ScheduledDateTime = DateTimeOf<(Reservation, unit::Appointment)>;

/// Unvalidated properties of a [`Reservation`], as submitted by a client.
#[derive(Clone, Debug, Default)]
pub struct Fields {
    /// First name of the customer.
    pub name: String,

    /// Last name of the customer.
    pub surname: String,

    /// Phone number of the customer.
    pub phone: String,

    /// Free-form comment.
    pub comment: String,

    /// [`DateTime`] of the appointment, if provided.
    pub scheduled_at: Option<ScheduledDateTime>,
}

impl Fields {
    /// Validates these [`Fields`], collecting all the [`Violation`]s at once.
    fn validate(self) -> Result<Validated, Error> {
        use Violation as V;

        let Self {
            name,
            surname,
            phone,
            comment,
            scheduled_at,
        } = self;
        let name = name.trim().to_owned();
        let surname = surname.trim().to_owned();

        let mut violations = Vec::new();
        if name.is_empty() {
            violations.push(V::Name);
        }
        if surname.is_empty() {
            violations.push(V::Surname);
        }
        let Some(scheduled_at) = scheduled_at else {
            violations.push(V::ScheduledAt);
            return Err(Error::Invalid(violations));
        };
        if !violations.is_empty() {
            return Err(Error::Invalid(violations));
        }

        Ok(Validated {
            name,
            surname,
            phone,
            comment,
            scheduled_at,
        })
    }
}

/// Validated [`Fields`].
struct Validated {
    name: String,
    surname: String,
    phone: String,
    comment: String,
    scheduled_at: ScheduledDateTime,
}

impl Validated {
    /// Checks whether these [`Validated`] fields belong to the same customer as
    /// the provided [`Reservation`].
    fn is_same_customer(&self, other: &Reservation) -> bool {
        self.name == other.name && self.surname == other.surname
    }
}

/// Violation of a [`Reservation`] invariant.
///
/// Displayed as a stable tag reported to clients.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, strum::Display)]
pub enum Violation {
    /// First name is missing.
    #[strum(to_string = "nombre")]
    Name,

    /// Last name is missing.
    #[strum(to_string = "apellido")]
    Surname,

    /// Appointment [`DateTime`] is missing.
    #[strum(to_string = "fecha_hora")]
    ScheduledAt,
}

/// Maximum attempts of generating a unique [`Id`] within a [`Vehicle`].
const MAX_ID_ATTEMPTS: usize = 100;

impl Vehicle {
    /// Returns [`Reservation`]s of this [`Vehicle`] in their creation order.
    #[must_use]
    pub fn reservations(&self) -> &[Reservation] {
        &self.reservations
    }

    /// Reserves this [`Vehicle`] for a customer with the provided [`Fields`].
    ///
    /// A new [`Reservation`] is appended to the existing ones.
    ///
    /// # Errors
    ///
    /// - [`Error::Invalid`] if the [`Fields`] are invalid;
    /// - [`Error::Duplicate`] if the customer has already reserved this
    ///   [`Vehicle`];
    /// - [`Error::IdsExhausted`] if no unique [`Id`] could be generated.
    pub fn reserve(
        &mut self,
        fields: Fields,
        rng: &mut impl Rng,
    ) -> Result<&Reservation, Error> {
        let fields = fields.validate()?;
        if self.reservations.iter().any(|r| fields.is_same_customer(r)) {
            return Err(Error::Duplicate);
        }

        let id = (0..MAX_ID_ATTEMPTS)
            .map(|_| Id::random(rng))
            .find(|id| self.reservations.iter().all(|r| r.id != *id))
            .ok_or(Error::IdsExhausted)?;

        let Validated {
            name,
            surname,
            phone,
            comment,
            scheduled_at,
        } = fields;
        let pos = self.reservations.len();
        self.reservations.push(Reservation {
            id,
            name,
            surname,
            phone,
            comment,
            scheduled_at,
        });

        Ok(&self.reservations[pos])
    }

    /// Replaces the [`Fields`] of the [`Reservation`] with the provided [`Id`].
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if there is no such [`Reservation`];
    /// - [`Error::Invalid`] if the [`Fields`] are invalid;
    /// - [`Error::Duplicate`] if another [`Reservation`] of this [`Vehicle`]
    ///   belongs to the same customer.
    pub fn edit_reservation(
        &mut self,
        id: &Id,
        fields: Fields,
    ) -> Result<&Reservation, Error> {
        let pos = self
            .reservations
            .iter()
            .position(|r| r.id == *id)
            .ok_or(Error::NotFound)?;
        let fields = fields.validate()?;
        if self
            .reservations
            .iter()
            .any(|r| r.id != *id && fields.is_same_customer(r))
        {
            return Err(Error::Duplicate);
        }

        let reservation = &mut self.reservations[pos];
        let Validated {
            name,
            surname,
            phone,
            comment,
            scheduled_at,
        } = fields;
        reservation.name = name;
        reservation.surname = surname;
        reservation.phone = phone;
        reservation.comment = comment;
        reservation.scheduled_at = scheduled_at;

        Ok(reservation)
    }

    /// Cancels the [`Reservation`] with the provided [`Id`], keeping the order
    /// of the others.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if there is no such [`Reservation`].
    pub fn cancel_reservation(&mut self, id: &Id) -> Result<Reservation, Error> {
        let pos = self
            .reservations
            .iter()
            .position(|r| r.id == *id)
            .ok_or(Error::NotFound)?;
        Ok(self.reservations.remove(pos))
    }
}

/// Error of managing [`Reservation`]s of a [`Vehicle`].
#[derive(Clone, Debug, Display, Eq, PartialEq, StdError)]
pub enum Error {
    /// [`Fields`] are invalid.
    #[display("Invalid `Reservation` fields: {_0:?}")]
    Invalid(#[error(not(source))] Vec<Violation>),

    /// Customer has already reserved the [`Vehicle`].
    #[display("Customer already has an active `Reservation` of the `Vehicle`")]
    Duplicate,

    /// [`Reservation`] doesn't exist.
    #[display("`Reservation` does not exist")]
    NotFound,

    /// No unique [`Id`] could be generated.
    #[display("Failed to generate a unique `reservation::Id`")]
    IdsExhausted,
}

#[cfg(test)]
mod spec {
    use common::DateTime;
    use rand::{rngs::StdRng, SeedableRng as _};

    use super::{Error, Fields, Id, Violation as V};
    use crate::domain::vehicle::fixture;

    fn fields(name: &str, surname: &str) -> Fields {
        Fields {
            name: name.to_owned(),
            surname: surname.to_owned(),
            phone: "351-555-0101".to_owned(),
            comment: "Por la tarde".to_owned(),
            scheduled_at: Some(
                DateTime::from_rfc3339("2024-06-01T15:00:00Z")
                    .unwrap()
                    .coerce(),
            ),
        }
    }

    #[test]
    fn generates_valid_ids() {
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..1000 {
            let id = Id::random(&mut rng);
            assert!(Id::new(id.as_ref()).is_some(), "{id}");
        }
        assert!(Id::new("A12").is_none());
        assert!(Id::new("a123").is_none());
    }

    #[test]
    fn reserves_in_order() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut vehicle = fixture::vehicle("T01", "Toyota", 20_000);
        assert!(vehicle.reservations().is_empty());

        let first = vehicle
            .reserve(fields("Ana", "Pérez"), &mut rng)
            .unwrap()
            .id
            .clone();
        let second = vehicle
            .reserve(fields("Juan", "Gómez"), &mut rng)
            .unwrap()
            .id
            .clone();

        assert_ne!(first, second);
        let ids = vehicle
            .reservations()
            .iter()
            .map(|r| r.id.clone())
            .collect::<Vec<_>>();
        assert_eq!(ids, [first, second]);
    }

    #[test]
    fn rejects_invalid_fields() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut vehicle = fixture::vehicle("T01", "Toyota", 20_000);

        let err = vehicle
            .reserve(
                Fields {
                    scheduled_at: None,
                    ..fields(" ", "")
                },
                &mut rng,
            )
            .unwrap_err();

        assert_eq!(
            err,
            Error::Invalid(vec![V::Name, V::Surname, V::ScheduledAt]),
        );
        assert!(vehicle.reservations().is_empty());
    }

    #[test]
    fn rejects_duplicate_customer() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut vehicle = fixture::vehicle("T01", "Toyota", 20_000);
        _ = vehicle.reserve(fields("Ana", "Pérez"), &mut rng).unwrap();

        assert_eq!(
            vehicle.reserve(fields("Ana", "Pérez"), &mut rng).unwrap_err(),
            Error::Duplicate,
        );
        assert_eq!(vehicle.reservations().len(), 1);
    }

    #[test]
    fn edits_in_place() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut vehicle = fixture::vehicle("T01", "Toyota", 20_000);
        let ana = vehicle
            .reserve(fields("Ana", "Pérez"), &mut rng)
            .unwrap()
            .id
            .clone();
        let juan = vehicle
            .reserve(fields("Juan", "Gómez"), &mut rng)
            .unwrap()
            .id
            .clone();

        let edited = vehicle
            .edit_reservation(&ana, fields("Ana María", "Pérez"))
            .unwrap();
        assert_eq!(edited.id, ana);
        assert_eq!(edited.name, "Ana María");

        assert_eq!(
            vehicle
                .edit_reservation(&ana, fields("Juan", "Gómez"))
                .unwrap_err(),
            Error::Duplicate,
        );
        assert_eq!(
            vehicle
                .edit_reservation(&juan, fields("Juan", "Gómez"))
                .unwrap()
                .id,
            juan,
        );
        assert_eq!(vehicle.reservations()[0].id, ana);
    }

    #[test]
    fn editing_unknown_fails() {
        let mut vehicle = fixture::vehicle("T01", "Toyota", 20_000);

        assert_eq!(
            vehicle
                .edit_reservation(
                    &"Z999".parse().unwrap(),
                    fields("Ana", "Pérez"),
                )
                .unwrap_err(),
            Error::NotFound,
        );
    }

    #[test]
    fn cancels_exactly_one() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut vehicle = fixture::vehicle("T01", "Toyota", 20_000);
        let ids = ["Ana", "Juan", "Luis"]
            .into_iter()
            .map(|name| {
                vehicle
                    .reserve(fields(name, "Pérez"), &mut rng)
                    .unwrap()
                    .id
                    .clone()
            })
            .collect::<Vec<_>>();

        let cancelled = vehicle.cancel_reservation(&ids[1]).unwrap();

        assert_eq!(cancelled.name, "Juan");
        let left = vehicle
            .reservations()
            .iter()
            .map(|r| r.id.clone())
            .collect::<Vec<_>>();
        assert_eq!(left, [ids[0].clone(), ids[2].clone()]);
        assert_eq!(
            vehicle.cancel_reservation(&ids[1]).unwrap_err(),
            Error::NotFound,
        );
    }
}
