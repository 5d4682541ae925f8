//! [`Command`] for editing an existing [`Reservation`].

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

/// [`Command`] for replacing [`reservation::Fields`] of an existing
/// [`Reservation`] in place.
#[derive(Clone, Debug)]
pub struct EditReservation {
    /// [`StockId`] of the reserved [`Vehicle`].
    pub stock_id: StockId,

    /// ID of the [`Reservation`] to edit.
    pub reservation_id: reservation::Id,

    /// New [`reservation::Fields`] of the [`Reservation`].
    pub fields: reservation::Fields,
}

impl<Db> Command<EditReservation> for Service<Db>
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
        cmd: EditReservation,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let EditReservation {
            stock_id,
            reservation_id,
            fields,
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
            .edit_reservation(&reservation_id, fields)
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

/// Error of [`EditReservation`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Reservation`] cannot be edited.
    #[display("Cannot edit `Reservation`: {_0}")]
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
