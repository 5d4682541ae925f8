//! [`Command`] for deleting a [`Vehicle`].

use common::operations::{By, Delete};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{vehicle::StockId, Vehicle},
    infra::{database, Database},
    read, Service,
};

use super::Command;

/// [`Command`] for deleting a [`Vehicle`] along with its reservations.
#[derive(Clone, Debug, From)]
pub struct DeleteVehicle {
    /// [`StockId`] of the [`Vehicle`] to delete.
    pub stock_id: StockId,
}

impl<Db> Command<DeleteVehicle> for Service<Db>
where
    Db: Database<
        Delete<By<Vehicle, StockId>>,
        Ok = read::vehicle::IsDeleted,
        Err = Traced<database::Error>,
    >,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: DeleteVehicle) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteVehicle { stock_id } = cmd;

        let deleted = self
            .database()
            .execute(Delete(By::new(stock_id.clone())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if !*deleted {
            return Err(tracerr::new!(E::VehicleNotExists(stock_id)));
        }

        Ok(())
    }
}

/// Error of [`DeleteVehicle`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Vehicle`] doesn't exist.
    #[display("`Vehicle(stock_id: {_0})` does not exist")]
    #[from(ignore)]
    VehicleNotExists(#[error(not(source))] StockId),
}

#[cfg(test)]
mod spec {
    use crate::{command::fixture, query, Query as _};

    use super::{Command as _, DeleteVehicle, ExecutionError as E};

    #[tokio::test]
    async fn deletes_once() {
        let svc = fixture::service();
        let vehicle = fixture::create(&svc, "Toyota", 20_000).await;

        svc.execute(DeleteVehicle::from(vehicle.stock_id.clone()))
            .await
            .unwrap();

        let stored = svc
            .execute(query::vehicle::ByStockId::by(vehicle.stock_id.clone()))
            .await
            .unwrap();
        assert!(stored.is_none());

        let err = svc
            .execute(DeleteVehicle::from(vehicle.stock_id))
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), E::VehicleNotExists(_)), "{err}");
    }
}
