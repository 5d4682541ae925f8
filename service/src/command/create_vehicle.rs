//! [`Command`] for creating a new [`Vehicle`].

use common::operations::{
    By, Commit, Insert, Lock, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        vehicle::{
            stock_id::Prefix, validation::Rejection, Draft, StockId, Violation,
        },
        Vehicle,
    },
    infra::{database, Database},
    read, Service,
};

use super::Command;

/// [`Command`] for creating a new [`Vehicle`].
#[derive(Clone, Debug, From)]
pub struct CreateVehicle {
    /// [`Draft`] of a new [`Vehicle`].
    pub draft: Draft,
}

impl<Db> Command<CreateVehicle> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Vehicle, Prefix>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<StockId>, Prefix>>,
            Ok = Option<StockId>,
            Err = Traced<database::Error>,
        > + Database<
            Insert<Vehicle>,
            Ok = read::vehicle::IsInserted,
            Err = Traced<database::Error>,
        > + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Vehicle;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateVehicle) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let listing = cmd
            .draft
            .validate()
            .map_err(tracerr::from_and_wrap!(=> E))?;
        let prefix = Prefix::of(&listing.brand)
            .ok_or_else(|| E::Invalid(Rejection(vec![Violation::Brand])))
            .map_err(tracerr::wrap!())?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent allocation of the same `StockId`.
        tx.execute(Lock(By::<Vehicle, _>::new(prefix)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let last = tx
            .execute(Select(By::<Option<StockId>, _>::new(prefix)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let stock_id = StockId::next(prefix, last.as_ref())
            .ok_or(E::StockIdsExhausted(prefix))
            .map_err(tracerr::wrap!())?;
        log::debug!("allocated `StockId({stock_id})` for a new `Vehicle`");

        let vehicle = Vehicle::new(stock_id, listing);
        let inserted = tx
            .execute(Insert(vehicle.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if !*inserted {
            return Err(tracerr::new!(E::StockIdOccupied(vehicle.stock_id)));
        }

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(vehicle)
    }
}

/// Error of [`CreateVehicle`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Draft`] is invalid.
    #[display("Invalid `Vehicle`: {_0}")]
    Invalid(Rejection),

    /// Sequence of the [`StockId`]s with the [`Prefix`] is exhausted.
    #[display("No more `StockId`s with `{_0}` prefix")]
    #[from(ignore)]
    StockIdsExhausted(#[error(not(source))] Prefix),

    /// [`StockId`] is occupied by another [`Vehicle`] already.
    #[display("`StockId({_0})` is occupied already")]
    #[from(ignore)]
    StockIdOccupied(#[error(not(source))] StockId),
}

#[cfg(test)]
mod spec {
    use rust_decimal::Decimal;

    use crate::{
        command::fixture,
        domain::vehicle::{fixture::draft, Draft, Violation},
    };

    use super::{Command as _, CreateVehicle, ExecutionError as E};

    #[tokio::test]
    async fn allocates_stock_ids_per_brand() {
        let svc = fixture::service();

        let toyota = fixture::create(&svc, "Toyota", 20_000).await;
        let audi = fixture::create(&svc, "audi", 30_000).await;
        let toyota2 = fixture::create(&svc, "toyota", 25_000).await;

        assert_eq!(toyota.stock_id.as_ref(), "T01");
        assert_eq!(audi.stock_id.as_ref(), "A01");
        assert_eq!(toyota2.stock_id.as_ref(), "T02");
    }

    #[tokio::test]
    async fn stores_discounted_price() {
        let svc = fixture::service();

        let vehicle = svc
            .execute(CreateVehicle {
                draft: Draft {
                    discount: Decimal::from(1000),
                    ..draft("Ford", 20_000)
                },
            })
            .await
            .unwrap();

        assert_eq!(vehicle.price.to_string(), "19000");
        assert_eq!(vehicle.discount.to_string(), "1000");
        assert_eq!(vehicle.original_price().to_string(), "20000");
        assert!(vehicle.reservations().is_empty());
        assert_eq!(vehicle.updated_at, vehicle.created_at.coerce());
    }

    #[tokio::test]
    async fn rejects_invalid_draft() {
        let svc = fixture::service();

        let err = svc
            .execute(CreateVehicle {
                draft: Draft {
                    model: " ".into(),
                    price: Decimal::ZERO,
                    ..draft("Toyota", 0)
                },
            })
            .await
            .unwrap_err();

        let E::Invalid(rejection) = err.as_ref() else {
            panic!("unexpected error: {err}");
        };
        assert_eq!(
            rejection.violations(),
            [Violation::Model, Violation::Price, Violation::NonPositivePrice],
        );
    }

    #[tokio::test]
    async fn rejects_brand_without_letter_initial() {
        let svc = fixture::service();

        let err = svc
            .execute(CreateVehicle {
                draft: draft("4Runner", 20_000),
            })
            .await
            .unwrap_err();

        let E::Invalid(rejection) = err.as_ref() else {
            panic!("unexpected error: {err}");
        };
        assert_eq!(rejection.violations(), [Violation::Brand]);
    }
}
