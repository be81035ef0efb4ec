//! General functions related to finance.
use crate::units::{Dimensionless, Money, MoneyPerYear, Year};

/// Calculates the present value of one unit of money received each year for `period` years.
///
/// Cash flows arrive at the end of each year and are discounted at `discount_rate`. The result is
/// the sum of the discount factors `1 / (1 + r)^t` for `t = 1..=period`, which has units of years.
pub fn annuity_factor(period: u32, discount_rate: Dimensionless) -> Year {
    let growth = Dimensionless(1.0) + discount_rate;
    let mut compounding = Dimensionless(1.0);
    let mut factor = Year(0.0);
    for _ in 1..=period {
        compounding = compounding * growth;
        factor += Year(1.0) / compounding;
    }

    factor
}

/// Calculates the net present value of an upfront cost followed by a flat annual cash flow.
///
/// There is no escalation of the cash flow and no terminal value.
///
/// # Arguments
///
/// * `capex` - Upfront capital cost, incurred at year zero
/// * `annual_cash_flow` - Net cash flow received at the end of each year
/// * `period` - Number of years over which cash flows are received
/// * `discount_rate` - Annual discount rate
pub fn net_present_value(
    capex: Money,
    annual_cash_flow: MoneyPerYear,
    period: u32,
    discount_rate: Dimensionless,
) -> Money {
    -capex + annual_cash_flow * annuity_factor(period, discount_rate)
}

/// Calculates the annual return on investment as a percentage of capital cost.
///
/// Returns zero if `capex` is zero.
pub fn return_on_investment(annual_cash_flow: MoneyPerYear, capex: Money) -> Dimensionless {
    if capex == Money(0.0) {
        return Dimensionless(0.0);
    }

    Dimensionless(annual_cash_flow.value() / capex.value() * 100.0)
}

/// Calculates the simple (undiscounted) payback period.
///
/// If the annual cash flow is zero, the result is `Year(f64::INFINITY)`. A negative cash flow
/// gives a negative payback period.
pub fn payback_period(capex: Money, annual_cash_flow: MoneyPerYear) -> Year {
    if annual_cash_flow == MoneyPerYear(0.0) {
        return Year(f64::INFINITY);
    }

    capex / annual_cash_flow
}
