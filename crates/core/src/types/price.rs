//! List prices using decimal arithmetic.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A list price: a regular amount with an optional sale amount.
///
/// Amounts are in the currency's standard unit (e.g., dollars, not cents).
/// The effective amount a buyer pays is the sale price when one is set and
/// non-zero, otherwise the regular price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListPrice {
    /// Regular (undiscounted) amount.
    pub regular: Decimal,
    /// Discounted amount, if the item is on sale.
    pub sale: Option<Decimal>,
    /// ISO 4217 currency code.
    pub currency: CurrencyCode,
}

impl ListPrice {
    /// Create a price with no sale amount.
    #[must_use]
    pub const fn regular(amount: Decimal, currency: CurrencyCode) -> Self {
        Self {
            regular: amount,
            sale: None,
            currency,
        }
    }

    /// Create a price with a sale amount.
    #[must_use]
    pub const fn on_sale(regular: Decimal, sale: Decimal, currency: CurrencyCode) -> Self {
        Self {
            regular,
            sale: Some(sale),
            currency,
        }
    }

    /// The amount a buyer pays: sale if present and non-zero, else regular.
    #[must_use]
    pub fn effective(&self) -> Decimal {
        match self.sale {
            Some(sale) if !sale.is_zero() => sale,
            _ => self.regular,
        }
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
}

impl CurrencyCode {
    /// The display symbol for this currency.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::USD | Self::CAD | Self::AUD => "$",
            Self::EUR => "\u{20ac}",
            Self::GBP => "\u{a3}",
        }
    }

    /// The ISO 4217 code as a string.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::CAD => "CAD",
            Self::AUD => "AUD",
        }
    }
}

impl std::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_prefers_sale() {
        let price = ListPrice::on_sale(Decimal::from(10), Decimal::from(8), CurrencyCode::USD);
        assert_eq!(price.effective(), Decimal::from(8));
    }

    #[test]
    fn test_effective_falls_back_to_regular() {
        let price = ListPrice::regular(Decimal::from(10), CurrencyCode::USD);
        assert_eq!(price.effective(), Decimal::from(10));
    }

    #[test]
    fn test_effective_ignores_zero_sale() {
        let price = ListPrice::on_sale(Decimal::from(10), Decimal::ZERO, CurrencyCode::USD);
        assert_eq!(price.effective(), Decimal::from(10));
    }

    #[test]
    fn test_currency_symbols() {
        assert_eq!(CurrencyCode::USD.symbol(), "$");
        assert_eq!(CurrencyCode::GBP.code(), "GBP");
        assert_eq!(CurrencyCode::EUR.to_string(), "EUR");
    }
}
