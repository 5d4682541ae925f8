//! [`Command`] for changing a [`Status`] of a [`Vehicle`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::vehicle::Status;
use crate::{
    domain::{
        vehicle::{status, StockId},
        Vehicle,
    },
    infra::{database, Database},
    read, Service,
};

use super::Command;

/// [`Command`] for changing a [`Status`] of a [`Vehicle`].
///
/// Only the payload matching the new [`status::Kind`] is kept, the previous
/// one is dropped.
#[derive(Clone, Debug)]
pub struct ChangeVehicleStatus {
    /// [`StockId`] of the [`Vehicle`] to change the [`Status`] of.
    pub stock_id: StockId,

    /// [`status::Kind`] of the new [`Status`].
    pub kind: status::Kind,

    /// Payloads to take the one of the new [`Status`] from.
    pub payloads: status::Payloads,
}

impl<Db> Command<ChangeVehicleStatus> for Service<Db>
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

    async fn execute(
        &self,
        cmd: ChangeVehicleStatus,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ChangeVehicleStatus {
            stock_id,
            kind,
            payloads,
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

        vehicle.change_status(kind, payloads);
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

/// Error of [`ChangeVehicleStatus`] [`Command`] execution.
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
        domain::vehicle::status::{Contact, Kind, Payloads, Status},
    };

    use super::{ChangeVehicleStatus, Command as _};

    fn contact(name: &str) -> Contact {
        Contact {
            name: name.to_owned(),
            surname: "Gómez".to_owned(),
            phone: "351-555-0199".to_owned(),
            comment: String::new(),
        }
    }

    #[tokio::test]
    async fn drops_stale_payload() {
        let svc = fixture::service();
        let vehicle = fixture::create(&svc, "Toyota", 20_000).await;
        assert_eq!(vehicle.status, Status::Available);

        let reserved = svc
            .execute(ChangeVehicleStatus {
                stock_id: vehicle.stock_id.clone(),
                kind: Kind::Reserved,
                payloads: Payloads {
                    reserved: Some(contact("Ana")),
                    ..Payloads::default()
                },
            })
            .await
            .unwrap();
        assert_eq!(reserved.status, Status::Reserved(Some(contact("Ana"))));

        let sold = svc
            .execute(ChangeVehicleStatus {
                stock_id: vehicle.stock_id,
                kind: Kind::Sold,
                payloads: Payloads::default(),
            })
            .await
            .unwrap();
        assert_eq!(sold.status, Status::Sold(None));
        assert!(sold.status.contact().is_none());
        assert!(sold.updated_at >= reserved.updated_at);
    }
}
