use itertools::Itertools;

use crate::series::Series;

/// Headroom added above the tallest point when no bound is configured
pub const AUTO_BOUND_HEADROOM: f64 = 1.1;

/// Distinct thread counts across all series, ascending
pub fn distinct_thread_counts(series: &[Series]) -> Vec<u32> {
    series
        .iter()
        .flat_map(|s| s.points.iter().map(|p| p.x))
        .sorted_unstable()
        .dedup()
        .collect()
}

pub fn max_thread_count(series: &[Series]) -> Option<u32> {
    series.iter().flat_map(|s| s.points.iter().map(|p| p.x)).max()
}

/// Upper Y bound covering every finite value, 1.0 when there is nothing to cover
pub fn auto_upper_bound(series: &[Series]) -> f64 {
    let values = series
        .iter()
        .flat_map(|s| s.points.iter().map(|p| p.y))
        .filter(|y| y.is_finite());
    match values.max_by(f64::total_cmp) {
        Some(max) if max > 0.0 => max * AUTO_BOUND_HEADROOM,
        _ => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::{Marker, Point};

    fn series(points: &[(u32, f64)]) -> Series {
        Series {
            label: "s".to_owned(),
            legend: "s".to_owned(),
            marker: Marker::Circle,
            points: points.iter().map(|&(x, y)| Point { x, y }).collect(),
        }
    }

    #[test]
    fn thread_counts_are_sorted_and_unique() {
        let data = [series(&[(8, 1.0), (1, 2.0)]), series(&[(4, 1.0), (8, 3.0)])];
        assert_eq!(distinct_thread_counts(&data), vec![1, 4, 8]);
        assert_eq!(max_thread_count(&data), Some(8));
    }

    #[test]
    fn upper_bound_adds_headroom() {
        let data = [series(&[(1, 10.0), (2, 5.0)])];
        assert!((auto_upper_bound(&data) - 11.0).abs() < 1e-9);
    }

    #[test]
    fn upper_bound_falls_back_without_data() {
        assert_eq!(auto_upper_bound(&[]), 1.0);
        assert_eq!(auto_upper_bound(&[series(&[(1, 0.0)])]), 1.0);
        assert_eq!(auto_upper_bound(&[series(&[(1, f64::INFINITY)])]), 1.0);
    }
}
