//! Availability-driven pricing.
//!
//! Pure functions only. The aggregate recomputes the current price through
//! [`price`] after every event that changes base price, strategy, or the
//! unit pool; the price is never set directly by a command.

use super::state::PricingStrategy;

/// Rounds to 2 decimal places, half away from zero on the value scaled
/// by 100.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Computes the current price from the base price and unit availability.
///
/// With `total_quantity == 0` the base price is returned unchanged. The
/// availability ratio drives a demand multiplier: scarcer items cost more,
/// up to 2x (Linear, Tiered) or ~2.718x (Exponential) at zero availability.
pub fn price(
    base_price: f64,
    total_quantity: u32,
    available_quantity: u32,
    strategy: PricingStrategy,
) -> f64 {
    if total_quantity == 0 {
        return base_price;
    }
    let ratio = f64::from(available_quantity) / f64::from(total_quantity);

    match strategy {
        PricingStrategy::Linear => round2(base_price * (2.0 - ratio)),
        PricingStrategy::Exponential => round2(base_price * (1.0 - ratio).exp()),
        PricingStrategy::Tiered => {
            let multiplier = if ratio > 0.75 {
                1.0
            } else if ratio > 0.5 {
                1.25
            } else if ratio > 0.25 {
                1.5
            } else {
                2.0
            };
            round2(base_price * multiplier)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_availability_is_base_price_for_all_strategies() {
        for strategy in [
            PricingStrategy::Linear,
            PricingStrategy::Exponential,
            PricingStrategy::Tiered,
        ] {
            assert_eq!(price(50.0, 10, 10, strategy), 50.0, "{strategy}");
        }
    }

    #[test]
    fn linear_doubles_at_zero_availability() {
        assert_eq!(price(50.0, 10, 0, PricingStrategy::Linear), 100.0);
        assert_eq!(price(19.99, 4, 0, PricingStrategy::Linear), 39.98);
    }

    #[test]
    fn linear_scales_with_ratio() {
        assert_eq!(price(100.0, 10, 5, PricingStrategy::Linear), 150.0);
        assert_eq!(price(100.0, 3, 1, PricingStrategy::Linear), 166.67);
    }

    #[test]
    fn exponential_at_zero_availability_is_e_times_base() {
        assert_eq!(price(100.0, 10, 0, PricingStrategy::Exponential), 271.83);
    }

    #[test]
    fn tiered_thresholds_are_strict() {
        assert_eq!(price(100.0, 10, 8, PricingStrategy::Tiered), 100.0);
        assert_eq!(price(100.0, 10, 6, PricingStrategy::Tiered), 125.0);
        assert_eq!(price(100.0, 10, 3, PricingStrategy::Tiered), 150.0);
        assert_eq!(price(100.0, 10, 2, PricingStrategy::Tiered), 200.0);
        // exactly at a boundary falls to the lower tier
        assert_eq!(price(100.0, 4, 3, PricingStrategy::Tiered), 125.0);
        assert_eq!(price(100.0, 4, 2, PricingStrategy::Tiered), 150.0);
        assert_eq!(price(100.0, 4, 1, PricingStrategy::Tiered), 200.0);
    }

    #[test]
    fn zero_total_returns_base_unchanged() {
        for strategy in [
            PricingStrategy::Linear,
            PricingStrategy::Exponential,
            PricingStrategy::Tiered,
        ] {
            assert_eq!(price(42.5, 0, 0, strategy), 42.5);
        }
    }

    #[test]
    fn round2_truncates_to_cents() {
        assert_eq!(round2(1.234), 1.23);
        assert_eq!(round2(1.236), 1.24);
        assert_eq!(round2(166.66666666666669), 166.67);
    }
}
