//! [`Command`] for deleting a [`Reservation`].

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

/// [`Command`] for deleting a [`Reservation`] of a [`Vehicle`].
///
/// Returns the deleted [`Reservation`].
#[derive(Clone, Debug)]
pub struct DeleteReservation {
    /// [`StockId`] of the reserved [`Vehicle`].
    pub stock_id: StockId,

    /// ID of the [`Reservation`] to delete.
    pub reservation_id: reservation::Id,
}

impl<Db> Command<DeleteReservation> for Service<Db>
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
        cmd: DeleteReservation,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteReservation {
            stock_id,
            reservation_id,
        } = cmd;

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
            .cancel_reservation(&reservation_id)
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

/// Error of [`DeleteReservation`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Reservation`] cannot be deleted.
    #[display("Cannot delete `Reservation`: {_0}")]
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
        command::{
            fixture::{self, fields},
            CreateReservation,
        },
        domain::reservation,
        query, Query as _,
    };

    use super::{Command as _, DeleteReservation, ExecutionError as E};

    #[tokio::test]
    async fn removes_exactly_one_keeping_order() {
        let svc = fixture::service();
        let vehicle = fixture::create(&svc, "Toyota", 20_000).await;
        let mut ids = vec![];
        for name in ["Ana", "Luis", "Eva"] {
            ids.push(
                svc.execute(CreateReservation {
                    stock_id: vehicle.stock_id.clone(),
                    fields: fields(name),
                })
                .await
                .unwrap()
                .id,
            );
        }

        let deleted = svc
            .execute(DeleteReservation {
                stock_id: vehicle.stock_id.clone(),
                reservation_id: ids[1].clone(),
            })
            .await
            .unwrap();
        assert_eq!(deleted.id, ids[1]);
        assert_eq!(deleted.name, "Luis");

        let stored = svc
            .execute(query::vehicle::ByStockId::by(vehicle.stock_id.clone()))
            .await
            .unwrap()
            .unwrap();
        let left = stored
            .reservations()
            .iter()
            .map(|r| r.id.clone())
            .collect::<Vec<_>>();
        assert_eq!(left, [ids[0].clone(), ids[2].clone()]);

        let err = svc
            .execute(DeleteReservation {
                stock_id: vehicle.stock_id,
                reservation_id: ids[1].clone(),
            })
            .await
            .unwrap_err();
        assert!(
            matches!(
                err.as_ref(),
                E::Reservation(reservation::Error::NotFound),
            ),
            "{err}",
        );
    }
}
