//! [`Status`] definitions.

use common::define_kind;
use serde::{Deserialize, Serialize};

use super::Vehicle;

/// Commercial status of a [`Vehicle`] along with its payload.
///
/// Being a single variant, only the payload of the current status is ever
/// kept, so changing the status discards the payload of the previous one.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "kind", content = "info", rename_all = "snake_case")]
pub enum Status {
    /// [`Vehicle`] is available for sale.
    #[default]
    Available,

    /// [`Vehicle`] is reserved by a customer.
    Reserved(Option<Contact>),

    /// [`Vehicle`] is sold to a customer.
    Sold(Option<Contact>),

    /// [`Vehicle`] is being negotiated with a customer.
    InNegotiation(Option<Contact>),

    /// [`Vehicle`] is being serviced in a workshop.
    InMaintenance(Option<Workshop>),
}

impl Status {
    /// Creates a new [`Status`] of the provided [`Kind`], taking the matching
    /// payload out of the provided [`Payloads`].
    ///
    /// Payloads not matching the [`Kind`] are ignored.
    #[must_use]
    pub fn new(kind: Kind, payloads: Payloads) -> Self {
        let Payloads {
            reserved,
            sold,
            in_negotiation,
            in_maintenance,
        } = payloads;

        match kind {
            Kind::Available => Self::Available,
            Kind::Reserved => Self::Reserved(reserved),
            Kind::Sold => Self::Sold(sold),
            Kind::InNegotiation => Self::InNegotiation(in_negotiation),
            Kind::InMaintenance => Self::InMaintenance(in_maintenance),
        }
    }

    /// Returns the [`Kind`] of this [`Status`].
    #[must_use]
    pub const fn kind(&self) -> Kind {
        match self {
            Self::Available => Kind::Available,
            Self::Reserved(_) => Kind::Reserved,
            Self::Sold(_) => Kind::Sold,
            Self::InNegotiation(_) => Kind::InNegotiation,
            Self::InMaintenance(_) => Kind::InMaintenance,
        }
    }

    /// Returns the [`Contact`] of the customer this [`Status`] is about, if
    /// any.
    #[must_use]
    pub const fn contact(&self) -> Option<&Contact> {
        match self {
            Self::Reserved(c) | Self::Sold(c) | Self::InNegotiation(c) => {
                c.as_ref()
            }
            Self::Available | Self::InMaintenance(_) => None,
        }
    }

    /// Returns the [`Workshop`] servicing the [`Vehicle`], if any.
    #[must_use]
    pub const fn workshop(&self) -> Option<&Workshop> {
        if let Self::InMaintenance(w) = self {
            w.as_ref()
        } else {
            None
        }
    }
}

define_kind! {
    #[doc = "Kind of a [`Status`]."]
    enum Kind {
        #[doc = "[`Vehicle`] is available for sale."]
        #[name = "disponible"]
        #[alias = "available"]
        Available = 1,

        #[doc = "[`Vehicle`] is reserved by a customer."]
        #[name = "reservado"]
        #[alias = "reserved"]
        Reserved = 2,

        #[doc = "[`Vehicle`] is sold to a customer."]
        #[name = "vendido"]
        #[alias = "sold"]
        Sold = 3,

        #[doc = "[`Vehicle`] is being negotiated with a customer."]
        #[name = "en negociación"]
        #[alias = "in-negotiation"]
        InNegotiation = 4,

        #[doc = "[`Vehicle`] is being serviced in a workshop."]
        #[name = "en mantenimiento"]
        #[alias = "in-maintenance"]
        InMaintenance = 5,
    }
}

/// Contact of a customer a [`Vehicle`] is reserved by, sold or negotiated to.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct Contact {
    /// First name of the customer.
    pub name: String,

    /// Last name of the customer.
    pub surname: String,

    /// Phone number of the customer.
    pub phone: String,

    /// Free-form comment.
    pub comment: String,
}

/// Workshop a [`Vehicle`] is serviced in.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct Workshop {
    /// Name of the workshop.
    pub workshop: String,

    /// Name of the mechanic in charge.
    pub mechanic: String,

    /// Phone number of the workshop.
    pub phone: String,

    /// Free-form comment.
    pub comment: String,
}

/// Payloads submitted alongside a [`Kind`] for building a [`Status`].
#[derive(Clone, Debug, Default)]
pub struct Payloads {
    /// Payload of a [`Kind::Reserved`] [`Status`].
    pub reserved: Option<Contact>,

    /// Payload of a [`Kind::Sold`] [`Status`].
    pub sold: Option<Contact>,

    /// Payload of a [`Kind::InNegotiation`] [`Status`].
    pub in_negotiation: Option<Contact>,

    /// Payload of a [`Kind::InMaintenance`] [`Status`].
    pub in_maintenance: Option<Workshop>,
}

impl Vehicle {
    /// Changes the [`Status`] of this [`Vehicle`] to the one of the provided
    /// [`Kind`] with the matching payload.
    pub fn change_status(&mut self, kind: Kind, payloads: Payloads) {
        self.status = Status::new(kind, payloads);
    }
}

#[cfg(test)]
mod spec {
    use super::{Contact, Kind, Payloads, Status, Workshop};
    use crate::domain::vehicle::fixture;

    fn contact(name: &str) -> Contact {
        Contact {
            name: name.to_owned(),
            surname: "Pérez".to_owned(),
            phone: "351-555-0101".to_owned(),
            comment: String::new(),
        }
    }

    #[test]
    fn parses_kind() {
        assert_eq!("disponible".parse::<Kind>().unwrap(), Kind::Available);
        assert_eq!("available".parse::<Kind>().unwrap(), Kind::Available);
        assert_eq!(
            "en negociación".parse::<Kind>().unwrap(),
            Kind::InNegotiation,
        );
        assert_eq!(
            "in-maintenance".parse::<Kind>().unwrap(),
            Kind::InMaintenance,
        );
        assert!("perdido".parse::<Kind>().is_err());
        assert!("".parse::<Kind>().is_err());
    }

    #[test]
    fn displays_kind_by_name() {
        assert_eq!(Kind::Reserved.to_string(), "reservado");
        assert_eq!(Kind::InNegotiation.name(), "en negociación");
        assert_eq!(
            serde_json::to_string(&Kind::InMaintenance).unwrap(),
            r#""en mantenimiento""#,
        );
        assert_eq!(
            serde_json::from_str::<Kind>(r#""sold""#).unwrap(),
            Kind::Sold,
        );
    }

    #[test]
    fn takes_only_matching_payload() {
        let payloads = Payloads {
            reserved: Some(contact("Ana")),
            sold: Some(contact("Juan")),
            in_negotiation: None,
            in_maintenance: Some(Workshop::default()),
        };

        let status = Status::new(Kind::Sold, payloads);

        assert_eq!(status, Status::Sold(Some(contact("Juan"))));
        assert_eq!(status.kind(), Kind::Sold);
        assert!(status.workshop().is_none());
    }

    #[test]
    fn accepts_missing_payload() {
        let status = Status::new(Kind::InMaintenance, Payloads::default());

        assert_eq!(status, Status::InMaintenance(None));
        assert!(status.workshop().is_none());
        assert!(status.contact().is_none());
    }

    #[test]
    fn discards_stale_payload() {
        let mut vehicle = fixture::vehicle("T01", "Toyota", 20_000);
        assert_eq!(vehicle.status, Status::Available);

        vehicle.change_status(
            Kind::Reserved,
            Payloads {
                reserved: Some(contact("Ana")),
                ..Payloads::default()
            },
        );
        assert_eq!(vehicle.status.contact(), Some(&contact("Ana")));

        vehicle.change_status(
            Kind::Sold,
            Payloads {
                sold: Some(contact("Juan")),
                ..Payloads::default()
            },
        );
        assert_eq!(vehicle.status, Status::Sold(Some(contact("Juan"))));
    }

    #[test]
    fn round_trips_through_json() {
        let status = Status::InNegotiation(Some(contact("Ana")));

        let json = serde_json::to_value(&status).unwrap();

        assert_eq!(json["kind"], "in_negotiation");
        assert_eq!(json["info"]["name"], "Ana");
        assert_eq!(serde_json::from_value::<Status>(json).unwrap(), status);
    }
}
