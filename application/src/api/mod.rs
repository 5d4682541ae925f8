//! HTTP API definitions.

pub mod discount;
pub mod reservation;
pub mod status;
pub mod vehicle;

use axum::{
    middleware,
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde::Serialize;
use service::domain::vehicle::StockId;

use crate::{auth, define_error, Error, Service};

/// Builds the [`Router`] of the whole HTTP API.
///
/// Every `/api/admin` route requires the provided [`auth::Key`].
pub fn router(service: Service, key: auth::Key) -> Router {
    let admin = Router::new()
        .route("/autos", post(vehicle::create))
        .route(
            "/autos/:stock_id",
            put(vehicle::update).delete(vehicle::delete),
        )
        .route("/autos/:stock_id/featured", post(vehicle::toggle_featured))
        .route("/autos/:stock_id/status", post(status::change))
        .route(
            "/autos/:stock_id/discount",
            post(discount::apply).delete(discount::remove),
        )
        .route(
            "/autos/:stock_id/reservations",
            get(reservation::list).post(reservation::create),
        )
        .route(
            "/autos/:stock_id/reservations/:reserva_id",
            put(reservation::edit).delete(reservation::delete),
        )
        .route_layer(middleware::from_fn_with_state(key, auth::authorize));

    Router::new()
        .route("/", get(welcome))
        .route("/api/autos", get(vehicle::list))
        .route("/api/autos/destacados", get(vehicle::featured))
        .route(
            "/api/autos/:stock_id/reservations",
            post(reservation::create),
        )
        .nest("/api/admin", admin)
        .layer(Extension(service))
}

/// Response carrying a human-readable message only.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Message {
    /// Message text.
    #[serde(rename = "mensaje")]
    pub message: &'static str,
}

/// Response of the root route.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Welcome {
    /// Greeting text.
    #[serde(rename = "mensaje")]
    pub message: &'static str,

    /// Hint where to go next.
    pub info: &'static str,
}

/// Greets the client.
#[expect(clippy::unused_async, reason = "`async` is required by `axum`")]
pub async fn welcome() -> Json<Welcome> {
    Json(Welcome {
        message: "Bienvenido a la Agencia de Autos",
        info: "Para acceder al panel de administración",
    })
}

define_error! {
    enum VehicleError {
        #[code = "VALIDATION_ERROR"]
        #[status = BAD_REQUEST]
        #[message = "stock_id inválido"]
        InvalidStockId,

        #[code = "NOT_FOUND"]
        #[status = NOT_FOUND]
        #[message = "Auto no encontrado"]
        NotExists,

        #[code = "CONFLICT"]
        #[status = CONFLICT]
        #[message = "El auto fue modificado concurrentemente, reintente"]
        ConcurrentModification,
    }
}

/// Parses the provided raw path segment as a [`StockId`].
///
/// # Errors
///
/// [`VehicleError::InvalidStockId`] if the segment is not a valid
/// [`StockId`].
pub fn stock_id(raw: &str) -> Result<StockId, Error> {
    StockId::new(raw).ok_or_else(|| {
        let mut err = Error::from(VehicleError::InvalidStockId);
        err.fields.push("stock_id".to_owned());
        err
    })
}
