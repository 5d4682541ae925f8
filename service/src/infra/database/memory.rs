//! In-memory [`Database`] implementation.

use std::{
    collections::BTreeMap,
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use common::operations::{
    By, Commit, Delete, Insert, Lock, Select, Transact, Update,
};
use derive_more::{Display, Error as StdError};
use tracerr::Traced;

use crate::{
    domain::{
        vehicle::{stock_id::Prefix, StockId},
        Vehicle,
    },
    infra::{database, Database},
    read,
};

/// In-memory [`Database`] keeping [`Vehicle`]s by their [`StockId`].
///
/// Every operation is applied immediately, so [`Transact`], [`Lock`] and
/// [`Commit`] do nothing.
#[derive(Clone, Debug, Default)]
pub struct Memory {
    /// Stored [`Vehicle`]s.
    vehicles: Arc<RwLock<Vehicles>>,
}

/// [`Vehicle`]s stored in a [`Memory`] database.
type Vehicles = BTreeMap<StockId, Vehicle>;

impl Memory {
    /// Creates a new empty [`Memory`] database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the stored [`Vehicle`]s for reading.
    fn read(
        &self,
    ) -> Result<RwLockReadGuard<'_, Vehicles>, Traced<database::Error>> {
        self.vehicles
            .read()
            .map_err(|_| tracerr::new!(database::Error::from(Error::Poisoned)))
    }

    /// Acquires the stored [`Vehicle`]s for writing.
    fn write(
        &self,
    ) -> Result<RwLockWriteGuard<'_, Vehicles>, Traced<database::Error>> {
        self.vehicles
            .write()
            .map_err(|_| tracerr::new!(database::Error::from(Error::Poisoned)))
    }
}

/// [`Memory`] database error.
#[derive(Clone, Copy, Debug, Display, StdError)]
pub enum Error {
    /// Storage lock was poisoned by a panicked writer.
    #[display("`Memory` storage lock is poisoned")]
    Poisoned,
}

impl Database<Transact> for Memory {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(self.clone())
    }
}

impl Database<Commit> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl<B> Database<Lock<By<Vehicle, B>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Vehicle, B>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl Database<Select<By<Option<Vehicle>, StockId>>> for Memory {
    type Ok = Option<Vehicle>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Vehicle>, StockId>>,
    ) -> Result<Self::Ok, Self::Err> {
        let stock_id = by.into_inner();
        Ok(self.read()?.get(&stock_id).cloned())
    }
}

impl Database<Select<By<Option<StockId>, Prefix>>> for Memory {
    type Ok = Option<StockId>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<StockId>, Prefix>>,
    ) -> Result<Self::Ok, Self::Err> {
        let prefix = by.into_inner();
        Ok(self
            .read()?
            .keys()
            .filter(|id| id.prefix() == prefix)
            .max_by_key(|id| id.number())
            .cloned())
    }
}

impl Database<Select<By<Vec<Vehicle>, read::vehicle::list::Selector>>>
    for Memory
{
    type Ok = Vec<Vehicle>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<Vec<Vehicle>, read::vehicle::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let selector = by.into_inner();
        let mut vehicles = self
            .read()?
            .values()
            .filter(|v| selector.filter.matches(v))
            .cloned()
            .collect::<Vec<_>>();
        selector.sort(&mut vehicles);
        Ok(vehicles)
    }
}

impl Database<Insert<Vehicle>> for Memory {
    type Ok = read::vehicle::IsInserted;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(vehicle): Insert<Vehicle>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut vehicles = self.write()?;
        if vehicles.contains_key(&vehicle.stock_id) {
            return Ok(read::vehicle::IsInserted(false));
        }
        drop(vehicles.insert(vehicle.stock_id.clone(), vehicle));
        Ok(read::vehicle::IsInserted(true))
    }
}

impl Database<Update<Vehicle>> for Memory {
    type Ok = read::vehicle::IsUpdated;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(vehicle): Update<Vehicle>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut vehicles = self.write()?;
        let Some(stored) = vehicles.get_mut(&vehicle.stock_id) else {
            return Ok(read::vehicle::IsUpdated(false));
        };
        if stored.revision.next() != vehicle.revision {
            return Ok(read::vehicle::IsUpdated(false));
        }
        *stored = vehicle;
        Ok(read::vehicle::IsUpdated(true))
    }
}

impl Database<Delete<By<Vehicle, StockId>>> for Memory {
    type Ok = read::vehicle::IsDeleted;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Vehicle, StockId>>,
    ) -> Result<Self::Ok, Self::Err> {
        let stock_id = by.into_inner();
        Ok(read::vehicle::IsDeleted(
            self.write()?.remove(&stock_id).is_some(),
        ))
    }
}
