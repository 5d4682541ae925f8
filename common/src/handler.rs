//! [`Handler`] abstractions.

use std::future::Future;

/// Executable handler of commands, queries and database operations.
///
/// A single type implements [`Handler`] once per kind of `Args` it accepts,
/// so the set of supported operations is expressed in trait bounds.
pub trait Handler<Args = ()> {
    /// Type of successful [`Handler`] result.
    type Ok;

    /// Type of this [`Handler`] error.
    type Err;

    /// Executes this [`Handler`] with the provided arguments.
    fn execute(
        &self,
        args: Args,
    ) -> impl Future<Output = Result<Self::Ok, Self::Err>>;
}
