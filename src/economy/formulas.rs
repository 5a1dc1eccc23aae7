//! Pure progression formulas: costs, production, prestige, display.

use crate::numeric::NumericValue;

/// Upper bound on the incremental search in [`max_affordable`].
pub const MAX_AFFORDABLE_ITERATIONS: u64 = 1000;

/// Lifetime primary-resource earnings below this yield no prestige currency.
const PRESTIGE_FLOOR: u64 = 1_000_000_000;

/// Price of the next unit: `base * growth^owned`.
pub fn cost(base: NumericValue, growth: NumericValue, owned: u64) -> NumericValue {
    base * growth.powi(owned)
}

/// Price of `n` units bought together, as a geometric series.
///
/// `n == 1` is exactly [`cost`]; `n == 0` costs nothing.
pub fn bulk_cost(base: NumericValue, growth: NumericValue, owned: u64, n: u64) -> NumericValue {
    match n {
        0 => NumericValue::ZERO,
        1 => cost(base, growth, owned),
        _ => {
            let current = cost(base, growth, owned);
            let numerator = growth.powi(n) - NumericValue::ONE;
            let denominator = growth - NumericValue::ONE;
            current * (numerator / denominator)
        }
    }
}

/// Largest `n` such that `bulk_cost(owned, n) <= available`.
///
/// The search stops at [`MAX_AFFORDABLE_ITERATIONS`], so a player rich enough
/// for more units still gets at most that many per call.
pub fn max_affordable(
    base: NumericValue,
    growth: NumericValue,
    owned: u64,
    available: NumericValue,
) -> u64 {
    if available < cost(base, growth, owned) {
        return 0;
    }
    let mut count = 0;
    while count < MAX_AFFORDABLE_ITERATIONS {
        if bulk_cost(base, growth, owned, count + 1) > available {
            break;
        }
        count += 1;
    }
    count
}

/// Output per second of one producer line.
pub fn production(base: NumericValue, owned: u64, multiplier: NumericValue) -> NumericValue {
    base * NumericValue::from(owned) * multiplier
}

/// Resources earned while away, with the elapsed time capped.
pub fn offline_progress(rate: NumericValue, elapsed_ms: u64, cap_ms: u64) -> NumericValue {
    let capped = elapsed_ms.min(cap_ms);
    rate * NumericValue::from(capped) / NumericValue::from(1000u64)
}

/// Prestige currency earned by resetting: `floor(sqrt(total / 1e9))`.
pub fn prestige_gain(total_earned: NumericValue) -> NumericValue {
    let floor = NumericValue::from(PRESTIGE_FLOOR);
    if total_earned < floor {
        return NumericValue::ZERO;
    }
    let ratio = total_earned / floor;
    let root = ratio.sqrt().floor();
    // The decimal root can land just under an exact integer.
    let next = root + NumericValue::ONE;
    if next * next <= ratio {
        next
    } else {
        root
    }
}

/// Production bonus from held prestige currency: +10% per unit.
pub fn prestige_multiplier(prestige_currency: NumericValue) -> NumericValue {
    NumericValue::ONE + prestige_currency * NumericValue::from_scaled(1, 1)
}

const SUFFIXES: [(u64, &str); 4] = [
    (1_000, "K"),
    (1_000_000, "M"),
    (1_000_000_000, "B"),
    (1_000_000_000_000, "T"),
];

/// Human-readable number: two decimals, K/M/B/T suffixes below `1e15`,
/// scientific notation above.
pub fn format(value: NumericValue) -> String {
    if value.is_negative() {
        return format!("-{}", format(-value));
    }
    if value < NumericValue::from(1_000u64) {
        return format!("{:.2}", value.to_f64());
    }
    let scientific_floor = NumericValue::from(1_000_000_000_000_000u64);
    if value < scientific_floor {
        // Largest suffix whose divisor does not exceed the value.
        let (divisor, suffix) = SUFFIXES
            .iter()
            .rev()
            .find(|(d, _)| value >= NumericValue::from(*d))
            .copied()
            .unwrap_or(SUFFIXES[0]);
        let scaled = value / NumericValue::from(divisor);
        return format!("{:.2}{suffix}", scaled.to_f64());
    }

    let mut mantissa = value.mantissa().round_dp(2);
    let mut exponent = value.exponent();
    if mantissa >= rust_decimal::Decimal::TEN {
        mantissa /= rust_decimal::Decimal::TEN;
        exponent += 1;
    }
    format!("{mantissa:.2}e+{exponent}")
}

/// [`format`] with a per-second suffix.
pub fn format_rate(value: NumericValue) -> String {
    format!("{}/s", format(value))
}

/// Coarse duration: the two largest units, e.g. `2h 5m`.
pub fn format_duration(ms: u64) -> String {
    let seconds = ms / 1000;
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;

    if days > 0 {
        format!("{days}d {}h", hours % 24)
    } else if hours > 0 {
        format!("{hours}h {}m", minutes % 60)
    } else if minutes > 0 {
        format!("{minutes}m {}s", seconds % 60)
    } else {
        format!("{seconds}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(s: &str) -> NumericValue {
        s.parse().unwrap()
    }

    #[test]
    fn cost_grows_geometrically() {
        let base = n("10");
        let growth = n("1.15");
        assert_eq!(cost(base, growth, 0), base);
        assert!(cost(base, growth, 1).approx_eq(n("11.5"), 1e-20));
        assert!(cost(base, growth, 2).approx_eq(n("13.225"), 1e-20));
    }

    #[test]
    fn bulk_cost_of_five_chickens() {
        let total = bulk_cost(n("10"), n("1.15"), 0, 5);
        assert_eq!(format!("{:.2}", total.to_f64()), "67.42");
    }

    #[test]
    fn bulk_cost_edges() {
        let base = n("50");
        let growth = n("1.15");
        assert_eq!(bulk_cost(base, growth, 3, 0), NumericValue::ZERO);
        assert_eq!(bulk_cost(base, growth, 3, 1), cost(base, growth, 3));
    }

    #[test]
    fn max_affordable_zero_when_first_unit_too_expensive() {
        assert_eq!(max_affordable(n("10"), n("1.15"), 0, n("9.99")), 0);
    }

    #[test]
    fn max_affordable_exact_budget() {
        let budget = bulk_cost(n("10"), n("1.15"), 0, 5);
        assert_eq!(max_affordable(n("10"), n("1.15"), 0, budget), 5);
    }

    #[test]
    fn max_affordable_is_capped() {
        assert_eq!(
            max_affordable(n("1"), n("1.0001"), 0, n("1e30")),
            MAX_AFFORDABLE_ITERATIONS
        );
    }

    #[test]
    fn production_scales_linearly() {
        assert_eq!(production(n("0.1"), 10, n("2")), n("2"));
        assert_eq!(production(n("8"), 0, n("5")), NumericValue::ZERO);
    }

    #[test]
    fn offline_progress_caps_elapsed() {
        assert_eq!(offline_progress(n("10"), 5_000, 86_400_000), n("50"));
        assert_eq!(offline_progress(n("1"), 100_000_000, 86_400_000), n("86400"));
    }

    #[test]
    fn prestige_gain_thresholds() {
        assert_eq!(prestige_gain(n("999999999")), NumericValue::ZERO);
        assert_eq!(prestige_gain(n("1e9")), NumericValue::ONE);
        assert_eq!(prestige_gain(n("3.9e9")), NumericValue::ONE);
        assert_eq!(prestige_gain(n("4e9")), n("2"));
        assert_eq!(prestige_gain(n("1e13")), n("100"));
    }

    #[test]
    fn prestige_multiplier_ten_percent_each() {
        assert_eq!(prestige_multiplier(NumericValue::ZERO), NumericValue::ONE);
        assert_eq!(prestige_multiplier(n("5")), n("1.5"));
    }

    #[test]
    fn format_small_and_suffixed() {
        assert_eq!(format(n("999")), "999.00");
        assert_eq!(format(n("0.5")), "0.50");
        assert_eq!(format(n("1500")), "1.50K");
        assert_eq!(format(n("2500000")), "2.50M");
        assert_eq!(format(n("7.25e9")), "7.25B");
        assert_eq!(format(n("1.2e12")), "1.20T");
    }

    #[test]
    fn format_scientific() {
        assert_eq!(format(n("1.5e15")), "1.50e+15");
        assert_eq!(format(n("9.999e20")), "1.00e+21");
        assert_eq!(format(n("3e400")), "3.00e+400");
    }

    #[test]
    fn format_negative() {
        assert_eq!(format(n("-1500")), "-1.50K");
        assert_eq!(format(n("-5")), "-5.00");
    }

    #[test]
    fn format_rate_appends_suffix() {
        assert_eq!(format_rate(n("12")), "12.00/s");
    }

    #[test]
    fn format_duration_units() {
        assert_eq!(format_duration(59_999), "59s");
        assert_eq!(format_duration(125_000), "2m 5s");
        assert_eq!(format_duration(7_500_000), "2h 5m");
        assert_eq!(format_duration(90_000_000), "1d 1h");
    }
}
