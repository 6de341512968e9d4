use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::coefficient::{
    AutomationLevel, Coefficient, Complexity, DetailLevel, ObjectType, Stage, Urgency,
};
use crate::pricing::catalog::Catalog;
use crate::pricing::constraints::MAX_AREA;

/// Company-wide money constants, fixed for the lifetime of the process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialConstants {
    /// Net hourly wage of a design engineer, rubles.
    pub hourly_wage_net: Decimal,
    /// Payroll taxes and contributions.
    pub tax_multiplier: Decimal,
    pub overhead_multiplier: Decimal,
    /// Profit share added on top of internal cost (0.30 = 30%).
    pub margin: Decimal,
    /// Floor for the final client total of a whole quote.
    pub minimum_price: Decimal,
}

impl Default for FinancialConstants {
    fn default() -> Self {
        Self {
            hourly_wage_net: Decimal::new(800, 0),
            tax_multiplier: Decimal::new(133, 2),
            overhead_multiplier: Decimal::new(130, 2),
            margin: Decimal::new(30, 2),
            minimum_price: Decimal::new(35_000, 0),
        }
    }
}

impl FinancialConstants {
    /// Hourly cost of an engineer to the company.
    pub fn full_hourly_rate(&self) -> Decimal {
        self.hourly_wage_net * self.tax_multiplier * self.overhead_multiplier
    }

    pub fn client_factor(&self) -> Decimal {
        Decimal::ONE + self.margin
    }

    pub fn validate(&self) -> Result<(), String> {
        let positive = [
            ("pricing.hourly_wage_net", self.hourly_wage_net),
            ("pricing.tax_multiplier", self.tax_multiplier),
            ("pricing.overhead_multiplier", self.overhead_multiplier),
            ("pricing.minimum_price", self.minimum_price),
        ];
        for (name, value) in positive {
            if value <= Decimal::ZERO {
                return Err(format!("{name} must be greater than zero"));
            }
        }

        if self.margin < Decimal::ZERO {
            return Err("pricing.margin must not be negative".to_string());
        }

        if self.worst_case_total(&Catalog::default()).is_none() {
            return Err(
                "pricing constants overflow decimal arithmetic for the largest accepted quote"
                    .to_string(),
            );
        }

        Ok(())
    }

    /// Client total for every catalog section at the largest accepted area
    /// with the largest multiplier on every axis. `None` when any step
    /// overflows `Decimal`.
    fn worst_case_total(&self, catalog: &Catalog) -> Option<Decimal> {
        let rate = self
            .hourly_wage_net
            .checked_mul(self.tax_multiplier)?
            .checked_mul(self.overhead_multiplier)?;
        let client_factor = Decimal::ONE.checked_add(self.margin)?;
        // Shown on the calculator page as a percentage.
        self.margin.checked_mul(Decimal::ONE_HUNDRED)?;

        let base_rate = catalog
            .sections()
            .iter()
            .map(|section| section.base_hours_per_area())
            .max()
            .unwrap_or(Decimal::ZERO);

        let raw_hours = Decimal::from(MAX_AREA)
            .checked_mul(base_rate)?
            .checked_mul(largest_multiplier::<ObjectType>())?;
        let combined = largest_multiplier::<Complexity>()
            .checked_mul(largest_multiplier::<DetailLevel>())?
            .checked_mul(largest_multiplier::<AutomationLevel>())?
            .checked_mul(largest_multiplier::<Stage>())?
            .checked_mul(largest_multiplier::<Urgency>())?;
        let hours = raw_hours.checked_mul(combined)?.ceil();

        let client_cost = hours.checked_mul(rate)?.checked_mul(client_factor)?;
        let total = client_cost.checked_mul(Decimal::from(catalog.len()))?;
        total.checked_add(self.minimum_price)
    }
}

/// Never below one: axes a section does not use contribute a multiplier of one.
fn largest_multiplier<C: Coefficient>() -> Decimal {
    C::ALL.iter().map(|value| value.multiplier()).fold(Decimal::ONE, Decimal::max)
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::FinancialConstants;

    #[test]
    fn reference_full_rate() {
        let constants = FinancialConstants::default();
        assert_eq!(constants.full_hourly_rate(), Decimal::new(13_832, 1));
        assert_eq!(constants.client_factor(), Decimal::new(130, 2));
        assert!(constants.validate().is_ok());
    }

    #[test]
    fn rejects_non_positive_values() {
        let constants =
            FinancialConstants { minimum_price: Decimal::ZERO, ..FinancialConstants::default() };
        assert_eq!(
            constants.validate(),
            Err("pricing.minimum_price must be greater than zero".to_string())
        );

        let constants =
            FinancialConstants { margin: Decimal::new(-1, 2), ..FinancialConstants::default() };
        assert!(constants.validate().is_err());
    }

    #[test]
    fn rejects_constants_that_overflow_the_largest_quote() {
        let constants =
            FinancialConstants { hourly_wage_net: Decimal::MAX, ..FinancialConstants::default() };
        assert_eq!(
            constants.validate(),
            Err("pricing constants overflow decimal arithmetic for the largest accepted quote"
                .to_string())
        );

        // Fits as a rate on its own, but not once multiplied by a huge area.
        let constants = FinancialConstants {
            hourly_wage_net: Decimal::from_i128_with_scale(10_i128.pow(21), 0),
            ..FinancialConstants::default()
        };
        assert!(constants.full_hourly_rate() > Decimal::ZERO);
        assert!(constants.validate().is_err());

        let constants =
            FinancialConstants { margin: Decimal::MAX, ..FinancialConstants::default() };
        assert!(constants.validate().is_err());
    }

    #[test]
    fn generous_but_realistic_constants_still_validate() {
        let constants = FinancialConstants {
            hourly_wage_net: Decimal::new(1_000_000, 0),
            tax_multiplier: Decimal::new(2, 0),
            overhead_multiplier: Decimal::new(3, 0),
            margin: Decimal::new(5, 0),
            minimum_price: Decimal::new(1_000_000_000, 0),
        };
        assert!(constants.validate().is_ok());
    }
}
