//! [`Command`] for applying a discount to a [`Vehicle`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use rust_decimal::Decimal;
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

/// [`Command`] for applying a discount to a [`Vehicle`] price.
///
/// A [`Vehicle`] can have a single discount only, so the active one must be
/// removed first.
#[derive(Clone, Debug)]
pub struct ApplyVehicleDiscount {
    /// [`StockId`] of the [`Vehicle`] to discount.
    pub stock_id: StockId,

    /// Amount to subtract from the [`Vehicle`] price.
    pub amount: Decimal,
}

impl<Db> Command<ApplyVehicleDiscount> for Service<Db>
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
    type Ok = discount::Applied;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: ApplyVehicleDiscount,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ApplyVehicleDiscount { stock_id, amount } = cmd;

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

        let applied = vehicle
            .apply_discount(amount)
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

        Ok(applied)
    }
}

/// Error of [`ApplyVehicleDiscount`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Discount cannot be applied.
    #[display("Cannot apply discount: {_0}")]
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
        command::{fixture, RemoveVehicleDiscount},
        domain::vehicle::discount,
    };

    use super::{ApplyVehicleDiscount, Command as _, ExecutionError as E};

    #[tokio::test]
    async fn applies_single_discount() {
        let svc = fixture::service();
        let vehicle = fixture::create(&svc, "Toyota", 20_000).await;
        let apply = |amount: i64| ApplyVehicleDiscount {
            stock_id: vehicle.stock_id.clone(),
            amount: Decimal::from(amount),
        };

        let applied = svc.execute(apply(5000)).await.unwrap();
        assert_eq!(applied.original_price.to_string(), "20000");
        assert_eq!(applied.discounted_price.to_string(), "15000");
        assert_eq!(applied.discount.to_string(), "5000");

        let err = svc.execute(apply(1000)).await.unwrap_err();
        assert!(
            matches!(
                err.as_ref(),
                E::Discount(discount::Error::AlreadyActive),
            ),
            "{err}",
        );

        let restored = svc
            .execute(RemoveVehicleDiscount::from(vehicle.stock_id.clone()))
            .await
            .unwrap();
        assert_eq!(restored.to_string(), "20000");

        let applied = svc.execute(apply(1000)).await.unwrap();
        assert_eq!(applied.discounted_price.to_string(), "19000");
    }

    #[tokio::test]
    async fn rejects_excessive_discount() {
        let svc = fixture::service();
        let vehicle = fixture::create(&svc, "Toyota", 20_000).await;

        let err = svc
            .execute(ApplyVehicleDiscount {
                stock_id: vehicle.stock_id,
                amount: Decimal::from(20_000),
            })
            .await
            .unwrap_err();
        assert!(
            matches!(
                err.as_ref(),
                E::Discount(discount::Error::NonPositivePrice),
            ),
            "{err}",
        );
    }
}
