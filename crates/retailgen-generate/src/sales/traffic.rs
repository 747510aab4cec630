//! Hourly customer traffic per store.

use rand::Rng;

pub const HOURS_PER_DAY: usize = 24;

/// Relative busyness per hour, in eighths of the baseline. The store is
/// closed before 8:00 and from 20:00.
pub const HOURLY_WEIGHTS: [i64; HOURS_PER_DAY] = [
    0, 0, 0, 0, 0, 0, 0, 0, // night
    1, 2, 2, // opening
    8, 16, 16, // late morning and lunch
    4, 4, 4, // afternoon lull
    12, 12, 12, // evening
    0, 0, 0, 0, // closed
];

/// Floor of the per-hour baseline.
const MIN_BASELINE: i64 = 24;
/// Floor of the daily customer target.
pub const MIN_DAILY_TARGET: i64 = 24 * 12;

/// Customers per hour of the day.
pub type HourlyTraffic = [i64; HOURS_PER_DAY];

/// Daily customer target for a store selling `product_count` products.
pub fn daily_target(product_count: usize) -> i64 {
    (product_count as i64 / 32).max(MIN_DAILY_TARGET)
}

/// Draw the hourly curve for a store and rebalance it to its daily target.
pub fn hourly_traffic(product_count: usize, rng: &mut impl Rng) -> HourlyTraffic {
    let baseline = (product_count as i64 / 12).max(MIN_BASELINE);
    let mut traffic = [0; HOURS_PER_DAY];

    for (hour, weight) in HOURLY_WEIGHTS.iter().enumerate() {
        if *weight == 0 {
            continue;
        }
        let ceiling = (baseline * weight / 8).max(1);
        traffic[hour] = rng.random_range(0..ceiling);
    }

    rebalance(&mut traffic, daily_target(product_count));
    traffic
}

/// Shave every open hour by a twelfth of the total until the day fits
/// `target`. Hours never go below zero.
pub fn rebalance(traffic: &mut HourlyTraffic, target: i64) {
    loop {
        let total: i64 = traffic.iter().sum();
        if total <= target {
            return;
        }
        let reduce = (total / 12).max(1);
        for count in traffic.iter_mut().filter(|count| **count > 0) {
            *count = count.saturating_sub(reduce).max(0);
        }
    }
}

/// Customers arriving in each minute of `hour`; remainders are dropped.
pub fn arrivals_per_minute(traffic: &HourlyTraffic, hour: usize) -> i64 {
    traffic.get(hour).copied().unwrap_or(0) / 60
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::stream;

    #[test]
    fn closed_hours_have_no_traffic() {
        let mut rng = stream(4);
        for products in [0, 500, 40_000, 400_000] {
            let traffic = hourly_traffic(products, &mut rng);
            for hour in (0..8).chain(20..24) {
                assert_eq!(traffic[hour], 0, "hour {hour}");
            }
            assert!(traffic.iter().all(|count| *count >= 0));
            assert!(traffic.iter().sum::<i64>() <= daily_target(products));
        }
    }

    #[test]
    fn rebalance_shrinks_to_target() {
        let mut traffic = [0; HOURS_PER_DAY];
        traffic[12] = 1_000;
        traffic[18] = 600;
        rebalance(&mut traffic, 288);

        let total: i64 = traffic.iter().sum();
        assert!(total <= 288, "total {total}");
        assert!(traffic[12] >= traffic[18]);
    }

    #[test]
    fn rebalance_keeps_totals_under_target() {
        let mut traffic = [5; HOURS_PER_DAY];
        rebalance(&mut traffic, 500);
        assert_eq!(traffic, [5; HOURS_PER_DAY]);
    }

    #[test]
    fn arrivals_floor_per_minute() {
        let mut traffic = [0; HOURS_PER_DAY];
        traffic[9] = 59;
        traffic[12] = 125;
        assert_eq!(arrivals_per_minute(&traffic, 9), 0);
        assert_eq!(arrivals_per_minute(&traffic, 12), 2);
        assert_eq!(arrivals_per_minute(&traffic, 40), 0);
    }
}
