//! [`Query`] collection related to a single [`Vehicle`].

use common::operations::By;

use crate::domain::{vehicle::StockId, Vehicle};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a [`Vehicle`] by its [`StockId`].
pub type ByStockId = DatabaseQuery<By<Option<Vehicle>, StockId>>;
