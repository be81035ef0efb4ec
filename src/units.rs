//! This module defines the unit types used in calculations and the rules for combining them.
//!
//! Quantities are plain `f64` newtypes. Only the multiplications and divisions which make
//! physical sense are implemented, so that e.g. adding a tariff to a tank volume is a type error.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Round a value to two decimal places, with ties going to the even digit.
///
/// Non-finite values (e.g. an unbounded payback period) are returned unchanged.
pub fn round_2dp(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }

    (value * 100.0).round_ties_even() / 100.0
}

macro_rules! base_unit_struct {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            PartialOrd,
            Default,
            Serialize,
            Deserialize,
            derive_more::Add,
            derive_more::Sub,
            derive_more::AddAssign,
            derive_more::SubAssign,
        )]
        #[serde(transparent)]
        pub struct $name(pub f64);

        impl $name {
            /// Create a new instance of the unit type from an `f64` value.
            pub fn new(value: f64) -> Self {
                Self(value)
            }

            /// Returns the value of the unit type as an `f64`.
            pub fn value(self) -> f64 {
                self.0
            }

            /// Whether the underlying value is finite
            pub fn is_finite(self) -> bool {
                self.0.is_finite()
            }

            /// The value rounded to two decimal places
            pub fn rounded(self) -> Self {
                Self(round_2dp(self.0))
            }
        }

        impl std::ops::Neg for $name {
            type Output = $name;
            fn neg(self) -> $name {
                $name(-self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl float_cmp::ApproxEq for $name {
            type Margin = float_cmp::F64Margin;

            fn approx_eq<M: Into<Self::Margin>>(self, other: Self, margin: M) -> bool {
                self.0.approx_eq(other.0, margin)
            }
        }
    };
}

macro_rules! unit_struct {
    ($name:ident, $doc:literal) => {
        base_unit_struct!($name, $doc);

        impl std::ops::Mul<Dimensionless> for $name {
            type Output = $name;
            fn mul(self, rhs: Dimensionless) -> $name {
                $name(self.0 * rhs.0)
            }
        }

        impl std::ops::Mul<$name> for Dimensionless {
            type Output = $name;
            fn mul(self, rhs: $name) -> $name {
                $name(self.0 * rhs.0)
            }
        }

        impl std::ops::Div<Dimensionless> for $name {
            type Output = $name;
            fn div(self, rhs: Dimensionless) -> $name {
                $name(self.0 / rhs.0)
            }
        }

        impl std::ops::Div<$name> for $name {
            type Output = Dimensionless;
            fn div(self, rhs: $name) -> Dimensionless {
                Dimensionless(self.0 / rhs.0)
            }
        }
    };
}

macro_rules! impl_mul {
    ($Lhs:ty, $Rhs:ty, $Out:ty) => {
        impl std::ops::Mul<$Rhs> for $Lhs {
            type Output = $Out;
            fn mul(self, rhs: $Rhs) -> $Out {
                <$Out>::new(self.0 * rhs.0)
            }
        }
        impl std::ops::Mul<$Lhs> for $Rhs {
            type Output = $Out;
            fn mul(self, lhs: $Lhs) -> $Out {
                <$Out>::new(self.0 * lhs.0)
            }
        }
    };
}

macro_rules! impl_div {
    ($Lhs:ty, $Rhs:ty, $Out:ty) => {
        impl std::ops::Div<$Rhs> for $Lhs {
            type Output = $Out;
            fn div(self, rhs: $Rhs) -> $Out {
                <$Out>::new(self.0 / rhs.0)
            }
        }
    };
}

base_unit_struct!(Dimensionless, "A dimensionless quantity (fraction, ratio or percentage).");

impl std::ops::Mul for Dimensionless {
    type Output = Dimensionless;

    fn mul(self, rhs: Dimensionless) -> Self::Output {
        Dimensionless(self.0 * rhs.0)
    }
}

impl std::ops::Div for Dimensionless {
    type Output = Dimensionless;

    fn div(self, rhs: Dimensionless) -> Self::Output {
        Dimensionless(self.0 / rhs.0)
    }
}

impl From<f64> for Dimensionless {
    fn from(val: f64) -> Self {
        Self(val)
    }
}

impl From<Dimensionless> for f64 {
    fn from(val: Dimensionless) -> Self {
        val.0
    }
}

// Base quantities
unit_struct!(Money, "An amount of money (KSh).");
unit_struct!(Year, "A duration in years.");
unit_struct!(Liters, "A volume of water (L).");
unit_struct!(Area, "An area (m²).");

// Derived quantities
unit_struct!(MoneyPerYear, "A recurring annual cash flow (KSh/year).");
unit_struct!(MoneyPerEnergy, "An energy tariff (KSh/kWh).");
unit_struct!(MoneyPerLiter, "A price per liter of storage (KSh/L).");
unit_struct!(EnergyPerDay, "A daily thermal energy requirement (kWh/day).");
unit_struct!(EnergyPerYear, "An annual energy quantity (kWh/year).");
unit_struct!(LitersPerDay, "A daily hot water volume (L/day).");
unit_struct!(Irradiance, "Daily solar irradiation on a surface (kWh/m²/day).");
unit_struct!(MassPerYear, "An annual mass (kg/year), e.g. LPG burned or CO₂ emitted.");
unit_struct!(MassPerEnergy, "An emission factor per unit energy (kg/kWh, equal to t/MWh).");

// Division rules
impl_div!(EnergyPerDay, Irradiance, Area);
impl_div!(Money, MoneyPerYear, Year);

// Multiplication rules
impl_mul!(Liters, MoneyPerLiter, Money);
impl_mul!(EnergyPerYear, MoneyPerEnergy, MoneyPerYear);
impl_mul!(MoneyPerYear, Year, Money);
impl_mul!(EnergyPerYear, MassPerEnergy, MassPerYear);

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    #[rstest]
    #[case(1.234, 1.23)]
    #[case(1.235_000_1, 1.24)]
    #[case(-7.456, -7.46)]
    #[case(120.0, 120.0)]
    #[case(13.125, 13.12)] // Exact tie: round to even
    #[case(13.375, 13.38)]
    #[case(0.125, 0.12)]
    #[case(-2.625, -2.62)]
    fn test_round_2dp(#[case] value: f64, #[case] expected: f64) {
        assert_approx_eq!(f64, round_2dp(value), expected);
    }

    #[test]
    fn test_round_2dp_non_finite() {
        assert_eq!(round_2dp(f64::INFINITY), f64::INFINITY);
        assert!(round_2dp(f64::NAN).is_nan());
    }

    #[test]
    fn test_unit_arithmetic() {
        let cost = Liters(144.0) * MoneyPerLiter(565.0);
        assert_eq!(cost, Money(81_360.0));

        let savings = EnergyPerYear(800.0) * MoneyPerEnergy(28.69);
        assert_approx_eq!(MoneyPerYear, savings, MoneyPerYear(22_952.0));

        let area = EnergyPerDay(10.0) / Irradiance(5.0);
        assert_eq!(area, Area(2.0));

        let payback = Money(1000.0) / MoneyPerYear(250.0);
        assert_eq!(payback, Year(4.0));

        assert_eq!(Money(10.0) / Money(4.0), Dimensionless(2.5));
        assert_eq!(Money(10.0) * Dimensionless(0.2), Money(2.0));
    }

    #[test]
    fn test_deserialise_transparent() {
        #[derive(Deserialize)]
        struct Wrapper {
            tariff: MoneyPerEnergy,
        }

        let wrapper: Wrapper = toml::from_str("tariff = 28.69").unwrap();
        assert_eq!(wrapper.tariff, MoneyPerEnergy(28.69));
    }
}
