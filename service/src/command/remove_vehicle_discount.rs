//! [`Command`] for removing a discount of a [`Vehicle`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        vehicle::{discount, StockId},
        Vehicle,
    },
    infra::{database, Database},
    read, Service,
};

use super::Command;

/// [`Command`] for removing the active discount of a [`Vehicle`].
///
/// Returns the restored price of the [`Vehicle`].
#[derive(Clone, Debug, From)]
pub struct RemoveVehicleDiscount {
    /// [`StockId`] of the [`Vehicle`] to remove the discount of.
    pub stock_id: StockId,
}

impl<Db> Command<RemoveVehicleDiscount> for Service<Db>
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
    type Ok = Money;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: RemoveVehicleDiscount,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RemoveVehicleDiscount { stock_id } = cmd;

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

        let price = vehicle
            .remove_discount()
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

        Ok(price)
    }
}

/// Error of [`RemoveVehicleDiscount`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Discount cannot be removed.
    #[display("Cannot remove discount: {_0}")]
    Discount(discount::Error),

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
        command::{fixture, ApplyVehicleDiscount},
        domain::vehicle::discount,
        query, Query as _,
    };

    use super::{Command as _, ExecutionError as E, RemoveVehicleDiscount};

    #[tokio::test]
    async fn restores_exact_price() {
        let svc = fixture::service();
        let vehicle = fixture::create(&svc, "Toyota", 20_000).await;

        _ = svc
            .execute(ApplyVehicleDiscount {
                stock_id: vehicle.stock_id.clone(),
                amount: Decimal::from(1000),
            })
            .await
            .unwrap();
        let price = svc
            .execute(RemoveVehicleDiscount::from(vehicle.stock_id.clone()))
            .await
            .unwrap();
        assert_eq!(price, vehicle.price);

        let stored = svc
            .execute(query::vehicle::ByStockId::by(vehicle.stock_id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.price, vehicle.price);
        assert!(!stored.is_discounted());
    }

    #[tokio::test]
    async fn fails_without_discount() {
        let svc = fixture::service();
        let vehicle = fixture::create(&svc, "Toyota", 20_000).await;

        let err = svc
            .execute(RemoveVehicleDiscount::from(vehicle.stock_id))
            .await
            .unwrap_err();
        assert!(
            matches!(err.as_ref(), E::Discount(discount::Error::NotActive)),
            "{err}",
        );
    }
}
