//! [`Command`] for toggling whether a [`Vehicle`] is featured.

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{vehicle::StockId, Vehicle},
    infra::{database, Database},
    read, Service,
};

use super::Command;

/// [`Command`] for toggling whether a [`Vehicle`] is featured.
///
/// Returns the new value of the flag.
#[derive(Clone, Debug, From)]
pub struct ToggleVehicleFeatured {
    /// [`StockId`] of the [`Vehicle`] to toggle.
    pub stock_id: StockId,
}

impl<Db> Command<ToggleVehicleFeatured> for Service<Db>
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
    type Ok = bool;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: ToggleVehicleFeatured,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ToggleVehicleFeatured { stock_id } = cmd;

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

        let featured = vehicle.toggle_featured();
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

        Ok(featured)
    }
}

/// Error of [`ToggleVehicleFeatured`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

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
        command::fixture,
        domain::vehicle::StockId,
        query,
        read::vehicle::list::{Filter, Selector},
        Query as _,
    };

    use super::{Command as _, ExecutionError as E, ToggleVehicleFeatured};

    #[tokio::test]
    async fn toggles_back_and_forth() {
        let svc = fixture::service();
        let vehicle = fixture::create(&svc, "Toyota", 20_000).await;
        _ = fixture::create(&svc, "Audi", 20_000).await;

        let featured = svc
            .execute(ToggleVehicleFeatured::from(vehicle.stock_id.clone()))
            .await
            .unwrap();
        assert!(featured);

        let listed = svc
            .execute(query::vehicles::List::by(Selector {
                filter: Filter {
                    featured_only: true,
                    ..Filter::default()
                },
                sorting: None,
            }))
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].stock_id, vehicle.stock_id);

        let featured = svc
            .execute(ToggleVehicleFeatured::from(vehicle.stock_id))
            .await
            .unwrap();
        assert!(!featured);
    }

    #[tokio::test]
    async fn fails_on_unknown_vehicle() {
        let svc = fixture::service();

        let err = svc
            .execute(ToggleVehicleFeatured::from(
                "A01".parse::<StockId>().unwrap(),
            ))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), E::VehicleNotExists(_)), "{err}");
    }
}
