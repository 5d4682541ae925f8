//! [`Query`] collection related to multiple [`Vehicle`]s.

use common::operations::By;

use crate::{domain::Vehicle, read::vehicle::list::Selector};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries all the [`Vehicle`]s passing the provided [`Selector`], in its
/// order.
pub type List = DatabaseQuery<By<Vec<Vehicle>, Selector>>;

#[cfg(test)]
mod spec {
    use common::{sorting::Sorting, Handler as _, Money};
    use rust_decimal::Decimal;

    use crate::{
        domain::vehicle::fixture,
        infra::Memory,
        read::vehicle::list::{Field, Filter, Range, Selector},
        Service,
    };

    use super::List;

    async fn service() -> Service<Memory> {
        use common::operations::Insert;

        let db = Memory::new();
        for (id, brand, price) in [
            ("T01", "Toyota", 30_000),
            ("F01", "Ford", 10_000),
            ("T02", "Toyota", 20_000),
        ] {
            _ = db
                .execute(Insert(fixture::vehicle(id, brand, price)))
                .await
                .unwrap();
        }
        Service::new(db)
    }

    fn ids(vehicles: &[crate::domain::Vehicle]) -> Vec<&str> {
        vehicles.iter().map(|v| v.stock_id.as_ref()).collect()
    }

    #[tokio::test]
    async fn filters_and_sorts() {
        let svc = service().await;

        let toyotas = svc
            .execute(List::by(Selector {
                filter: Filter {
                    brand: Some("toy".into()),
                    ..Filter::default()
                },
                sorting: Some(Sorting::asc(Field::Price)),
            }))
            .await
            .unwrap();
        assert_eq!(ids(&toyotas), ["T02", "T01"]);

        let cheap = svc
            .execute(List::by(Selector {
                filter: Filter {
                    price: Some(Range::Within {
                        min: None,
                        max: Money::new(Decimal::from(20_000)),
                    }),
                    ..Filter::default()
                },
                sorting: Some(Sorting::desc(Field::Price)),
            }))
            .await
            .unwrap();
        assert_eq!(ids(&cheap), ["T02", "F01"]);
    }

    #[tokio::test]
    async fn lists_nothing_on_mismatch() {
        let svc = service().await;

        let none = svc
            .execute(List::by(Selector {
                filter: Filter {
                    brand: Some("Audi".into()),
                    ..Filter::default()
                },
                sorting: None,
            }))
            .await
            .unwrap();
        assert!(none.is_empty());
    }
}
