//! [`Command`] for creating a new [`Reservation`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{reservation, vehicle::StockId, Reservation, Vehicle},
    infra::{database, Database},
    read, Service,
};

use super::Command;

/// [`Command`] for reserving a [`Vehicle`] by a customer.
#[derive(Clone, Debug)]
pub struct CreateReservation {
    /// [`StockId`] of the [`Vehicle`] to reserve.
    pub stock_id: StockId,

    /// [`reservation::Fields`] of a new [`Reservation`].
    pub fields: reservation::Fields,
}

impl<Db> Command<CreateReservation> for Service<Db>
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
    type Ok = Reservation;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateReservation,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateReservation { stock_id, fields } = cmd;

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

        let reservation = vehicle
            .reserve(fields, &mut rand::thread_rng())
            .cloned()
            .map_err(tracerr::from_and_wrap!(=> E))?;
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

        Ok(reservation)
    }
}

/// Error of [`CreateReservation`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Reservation`] cannot be created.
    #[display("Cannot create `Reservation`: {_0}")]
    Reservation(reservation::Error),

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
    use crate::{
        command::fixture::{self, fields},
        domain::reservation::{self, Fields, Violation},
        query, Query as _,
    };

    use super::{Command as _, CreateReservation, ExecutionError as E};

    #[tokio::test]
    async fn appends_reservations() {
        let svc = fixture::service();
        let vehicle = fixture::create(&svc, "Toyota", 20_000).await;

        let first = svc
            .execute(CreateReservation {
                stock_id: vehicle.stock_id.clone(),
                fields: fields("Ana"),
            })
            .await
            .unwrap();
        let second = svc
            .execute(CreateReservation {
                stock_id: vehicle.stock_id.clone(),
                fields: fields("Luis"),
            })
            .await
            .unwrap();
        assert!(reservation::Id::new(first.id.to_string()).is_some());
        assert_ne!(first.id, second.id);

        let stored = svc
            .execute(query::vehicle::ByStockId::by(vehicle.stock_id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.reservations(), [first, second]);
    }

    #[tokio::test]
    async fn rejects_duplicate_customer() {
        let svc = fixture::service();
        let vehicle = fixture::create(&svc, "Toyota", 20_000).await;
        let reserve = || CreateReservation {
            stock_id: vehicle.stock_id.clone(),
            fields: fields("Ana"),
        };

        _ = svc.execute(reserve()).await.unwrap();
        let err = svc.execute(reserve()).await.unwrap_err();

        assert!(
            matches!(
                err.as_ref(),
                E::Reservation(reservation::Error::Duplicate),
            ),
            "{err}",
        );
    }

    #[tokio::test]
    async fn rejects_incomplete_fields() {
        let svc = fixture::service();
        let vehicle = fixture::create(&svc, "Toyota", 20_000).await;

        let err = svc
            .execute(CreateReservation {
                stock_id: vehicle.stock_id,
                fields: Fields {
                    scheduled_at: None,
                    ..fields(" ")
                },
            })
            .await
            .unwrap_err();

        let E::Reservation(reservation::Error::Invalid(violations)) =
            err.as_ref()
        else {
            panic!("unexpected error: {err}");
        };
        assert_eq!(violations, &[Violation::Name, Violation::ScheduledAt]);
    }
}
