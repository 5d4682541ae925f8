//! [`Command`] definition.

pub mod apply_vehicle_discount;
pub mod change_vehicle_status;
pub mod create_reservation;
pub mod create_vehicle;
pub mod delete_reservation;
pub mod delete_vehicle;
pub mod edit_reservation;
pub mod remove_vehicle_discount;
pub mod toggle_vehicle_featured;
pub mod update_vehicle;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    apply_vehicle_discount::ApplyVehicleDiscount,
    change_vehicle_status::ChangeVehicleStatus,
    create_reservation::CreateReservation, create_vehicle::CreateVehicle,
    delete_reservation::DeleteReservation, delete_vehicle::DeleteVehicle,
    edit_reservation::EditReservation,
    remove_vehicle_discount::RemoveVehicleDiscount,
    toggle_vehicle_featured::ToggleVehicleFeatured,
    update_vehicle::UpdateVehicle,
};

#[cfg(test)]
pub(crate) mod fixture {
    //! [`Service`] fixtures for [`Command`] tests.

    use common::DateTime;

    use crate::{
        domain::{reservation::Fields, vehicle::fixture, Vehicle},
        infra::Memory,
        Service,
    };

    use super::{Command as _, CreateVehicle};

    /// Creates a new [`Service`] on top of an empty [`Memory`] database.
    pub(crate) fn service() -> Service<Memory> {
        Service::new(Memory::new())
    }

    /// Creates a new [`Vehicle`] of the provided `brand` priced at `price` in
    /// the provided [`Service`].
    pub(crate) async fn create(
        svc: &Service<Memory>,
        brand: &str,
        price: i64,
    ) -> Vehicle {
        svc.execute(CreateVehicle {
            draft: fixture::draft(brand, price),
        })
        .await
        .unwrap()
    }

    /// Returns valid reservation [`Fields`] of a customer with the provided
    /// `name`.
    pub(crate) fn fields(name: &str) -> Fields {
        Fields {
            name: name.to_owned(),
            surname: "Pérez".to_owned(),
            phone: "351-555-0101".to_owned(),
            comment: "Por la tarde".to_owned(),
            scheduled_at: Some(DateTime::now().coerce()),
        }
    }
}
