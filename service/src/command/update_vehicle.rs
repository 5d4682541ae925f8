//! [`Command`] for updating an existing [`Vehicle`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        vehicle::{validation::Rejection, Draft, StockId},
        Vehicle,
    },
    infra::{database, Database},
    read, Service,
};

use super::Command;

/// [`Command`] for replacing all the listed properties of an existing
/// [`Vehicle`].
///
/// [`StockId`], reservations and the creation date of the [`Vehicle`] are
/// kept as is.
#[derive(Clone, Debug)]
pub struct UpdateVehicle {
    /// [`StockId`] of the [`Vehicle`] to update.
    pub stock_id: StockId,

    /// [`Draft`] with new properties of the [`Vehicle`].
    pub draft: Draft,
}

impl<Db> Command<UpdateVehicle> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Vehicle, StockId>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Vehicle>, StockId>>,
            Ok = Option<Vehicle>,
            Err = Traced<database::Error>,
        > + Database<
            Update<Vehicle>,
            Ok = read::vehicle::IsUpdated,
            Err = Traced<database::Error>,
        > + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Vehicle;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: UpdateVehicle) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateVehicle { stock_id, draft } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `Vehicle`.
        tx.execute(Lock(By::<Vehicle, _>::new(stock_id.clone())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut vehicle = tx
            .execute(Select(By::<Option<Vehicle>, _>::new(stock_id.clone())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::VehicleNotExists(stock_id))
            .map_err(tracerr::wrap!())?;

        let listing = draft.validate().map_err(tracerr::from_and_wrap!(=> E))?;
        vehicle.relist(listing);
        vehicle.touch();

        let updated = tx
            .execute(Update(vehicle.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if !*updated {
            return Err(tracerr::new!(E::ConcurrentModification(
                vehicle.stock_id
            )));
        }

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(vehicle)
    }
}

/// Error of [`UpdateVehicle`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Draft`] is invalid.
    #[display("Invalid `Vehicle`: {_0}")]
    Invalid(Rejection),

    /// [`Vehicle`] doesn't exist.
    #[display("`Vehicle(stock_id: {_0})` does not exist")]
    #[from(ignore)]
    VehicleNotExists(#[error(not(source))] StockId),

    /// [`Vehicle`] was modified concurrently.
    #[display("`Vehicle(stock_id: {_0})` was modified concurrently")]
    #[from(ignore)]
    ConcurrentModification(#[error(not(source))] StockId),
}

#[cfg(test)]
mod spec {
    use rust_decimal::Decimal;

    use crate::{
        command::fixture,
        domain::vehicle::{fixture::draft, Draft, Violation},
        query, Query as _,
    };

    use super::{Command as _, ExecutionError as E, UpdateVehicle};

    #[tokio::test]
    async fn replaces_listing_keeping_identity() {
        let svc = fixture::service();
        let created = fixture::create(&svc, "Toyota", 20_000).await;

        let updated = svc
            .execute(UpdateVehicle {
                stock_id: created.stock_id.clone(),
                draft: Draft {
                    model: "Hilux".into(),
                    featured: true,
                    ..draft("Toyota", 35_000)
                },
            })
            .await
            .unwrap();

        assert_eq!(updated.stock_id, created.stock_id);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.model.as_ref(), "Hilux");
        assert_eq!(updated.price.to_string(), "35000");
        assert!(updated.featured);
        assert_eq!(updated.revision, created.revision.next());

        let stored = svc
            .execute(query::vehicle::ByStockId::by(created.stock_id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.model.as_ref(), "Hilux");
    }

    #[tokio::test]
    async fn fails_on_unknown_vehicle() {
        let svc = fixture::service();

        let err = svc
            .execute(UpdateVehicle {
                stock_id: "T01".parse().unwrap(),
                draft: draft("Toyota", 20_000),
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), E::VehicleNotExists(_)), "{err}");
    }

    #[tokio::test]
    async fn rejects_invalid_draft() {
        let svc = fixture::service();
        let created = fixture::create(&svc, "Toyota", 20_000).await;

        let err = svc
            .execute(UpdateVehicle {
                stock_id: created.stock_id,
                draft: Draft {
                    discount: Decimal::from(-5),
                    ..draft("Toyota", 20_000)
                },
            })
            .await
            .unwrap_err();

        let E::Invalid(rejection) = err.as_ref() else {
            panic!("unexpected error: {err}");
        };
        assert_eq!(rejection.violations(), [Violation::NegativeDiscount]);
    }
}
