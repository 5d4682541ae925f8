//! [`Vehicle`] discount management.

use common::Money;
use derive_more::{Display, Error as StdError};
use rust_decimal::Decimal;

use super::Vehicle;

impl Vehicle {
    /// Returns the price of this [`Vehicle`] before its discount.
    #[must_use]
    pub fn original_price(&self) -> Money {
        self.price
            .checked_add(self.discount)
            .unwrap_or(self.price)
    }

    /// Indicates whether this [`Vehicle`] has an active discount.
    #[must_use]
    pub fn is_discounted(&self) -> bool {
        !self.discount.is_zero()
    }

    /// Applies the provided discount `amount` to this [`Vehicle`].
    ///
    /// # Errors
    ///
    /// - [`Error::Negative`] if the `amount` is negative;
    /// - [`Error::AlreadyActive`] if a discount is already applied;
    /// - [`Error::ExceedsPrice`] if the `amount` is greater than the price;
    /// - [`Error::NonPositivePrice`] if the discounted price is not positive.
    pub fn apply_discount(&mut self, amount: Decimal) -> Result<Applied, Error> {
        let discount = Money::new(amount).ok_or(Error::Negative)?;
        if self.is_discounted() {
            return Err(Error::AlreadyActive);
        }

        let original_price = self.price;
        let discounted_price = original_price
            .checked_sub(discount)
            .ok_or(Error::ExceedsPrice)?;
        if discounted_price.is_zero() {
            return Err(Error::NonPositivePrice);
        }

        self.price = discounted_price;
        self.discount = discount;

        Ok(Applied {
            discount,
            original_price,
            discounted_price,
        })
    }

    /// Removes the active discount of this [`Vehicle`], returning its restored
    /// price.
    ///
    /// # Errors
    ///
    /// [`Error::NotActive`] if no discount is applied.
    pub fn remove_discount(&mut self) -> Result<Money, Error> {
        if !self.is_discounted() {
            return Err(Error::NotActive);
        }

        self.price = self.original_price();
        self.discount = Money::ZERO;

        Ok(self.price)
    }
}

/// Outcome of applying a discount to a [`Vehicle`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Applied {
    /// Applied discount.
    pub discount: Money,

    /// Price before the discount.
    pub original_price: Money,

    /// Price after the discount.
    pub discounted_price: Money,
}

/// Error of managing a [`Vehicle`] discount.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, StdError)]
pub enum Error {
    /// Discount amount is negative.
    #[display("Discount cannot be negative")]
    Negative,

    /// Another discount is already applied.
    #[display("Discount is already applied, remove it first")]
    AlreadyActive,

    /// Discount amount is greater than the price.
    #[display("Discount cannot be greater than the original price")]
    ExceedsPrice,

    /// Discount reduces the price to zero.
    #[display("Discount cannot reduce the price to zero or below")]
    NonPositivePrice,

    /// No discount is applied.
    #[display("No discount is applied")]
    NotActive,
}

#[cfg(test)]
mod spec {
    use common::Money;
    use rust_decimal::Decimal;

    use super::Error;
    use crate::domain::vehicle::fixture;

    fn money(amount: i64) -> Money {
        Money::new(Decimal::from(amount)).unwrap()
    }

    #[test]
    fn applies_and_removes() {
        let mut vehicle = fixture::vehicle("T01", "Toyota", 20_000);

        let applied = vehicle.apply_discount(Decimal::from(1000)).unwrap();
        assert_eq!(applied.discount, money(1000));
        assert_eq!(applied.original_price, money(20_000));
        assert_eq!(applied.discounted_price, money(19_000));
        assert_eq!(vehicle.price, money(19_000));
        assert_eq!(vehicle.original_price(), money(20_000));
        assert!(vehicle.is_discounted());

        assert_eq!(vehicle.remove_discount(), Ok(money(20_000)));
        assert_eq!(vehicle.price, money(20_000));
        assert_eq!(vehicle.discount, Money::ZERO);
    }

    #[test]
    fn keeps_single_discount() {
        let mut vehicle = fixture::vehicle("T01", "Toyota", 20_000);

        _ = vehicle.apply_discount(Decimal::from(5000)).unwrap();
        assert_eq!(vehicle.price, money(15_000));

        assert_eq!(
            vehicle.apply_discount(Decimal::from(1000)),
            Err(Error::AlreadyActive),
        );
        assert_eq!(vehicle.price, money(15_000));

        assert_eq!(vehicle.remove_discount(), Ok(money(20_000)));
        assert_eq!(vehicle.discount, Money::ZERO);
    }

    #[test]
    fn rejects_invalid_amounts() {
        let mut vehicle = fixture::vehicle("T01", "Toyota", 20_000);

        assert_eq!(
            vehicle.apply_discount(Decimal::from(-1)),
            Err(Error::Negative),
        );
        assert_eq!(
            vehicle.apply_discount(Decimal::from(20_001)),
            Err(Error::ExceedsPrice),
        );
        assert_eq!(
            vehicle.apply_discount(Decimal::from(20_000)),
            Err(Error::NonPositivePrice),
        );
        assert_eq!(vehicle.price, money(20_000));
        assert!(!vehicle.is_discounted());
    }

    #[test]
    fn keeps_exact_cents() {
        let mut vehicle = fixture::vehicle("T01", "Toyota", 20_000);

        _ = vehicle.apply_discount("0.10".parse().unwrap()).unwrap();
        assert_eq!(vehicle.price.to_string(), "19999.9");

        assert_eq!(vehicle.remove_discount(), Ok(money(20_000)));
    }

    #[test]
    fn removing_without_discount_fails() {
        let mut vehicle = fixture::vehicle("T01", "Toyota", 20_000);

        assert_eq!(vehicle.remove_discount(), Err(Error::NotActive));
    }
}
