use rayon::prelude::*;

use crate::worker::WorkerResult;

/// Statistics over every query of a run. Times are in seconds.
#[derive(Clone, Debug, PartialEq)]
pub struct GlobalStats {
    pub total_queries: usize,
    pub total_time: f64,
    pub min_time: f64,
    pub max_time: f64,
    pub average_time: f64,
    pub median_time: f64,
}

/// Combines the per-worker results. Returns `None` when no query was run.
pub fn aggregate(results: &[WorkerResult]) -> Option<GlobalStats> {
    let measured = || results.iter().filter(|result| result.query_count > 0);

    let total_queries: usize = measured().map(|result| result.query_count).sum();
    if total_queries == 0 {
        return None;
    }
    let total_time: f64 = measured().map(|result| result.total_time).sum();
    let min_time = measured().map(|result| result.min_time).fold(f64::INFINITY, f64::min);
    let max_time = measured().map(|result| result.max_time).fold(f64::NEG_INFINITY, f64::max);

    let mut timings: Vec<f64> =
        measured().flat_map(|result| result.timings.iter().copied()).collect();

    Some(GlobalStats {
        total_queries,
        total_time,
        min_time,
        max_time,
        average_time: total_time / total_queries as f64,
        median_time: median(&mut timings)?,
    })
}

/// Sorts `timings` and returns its median; the mean of the two middle
/// elements when the length is even.
pub fn median(timings: &mut [f64]) -> Option<f64> {
    timings.par_sort_unstable_by(f64::total_cmp);
    let n = timings.len();
    match n {
        0 => None,
        _ if n % 2 == 1 => Some(timings[n / 2]),
        _ => Some((timings[n / 2 - 1] + timings[n / 2]) / 2.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn worker(timings: &[f64]) -> WorkerResult {
        let mut result = WorkerResult::default();
        for &elapsed in timings {
            result.record(elapsed);
        }
        result
    }

    #[test]
    fn it_takes_the_middle_element_of_an_odd_count() {
        assert_eq!(median(&mut [3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&mut [7.5]), Some(7.5));
    }

    #[test]
    fn it_averages_the_two_middle_elements_of_an_even_count() {
        assert_eq!(median(&mut [4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&mut [1.0, 9.0]), Some(5.0));
    }

    #[test]
    fn it_has_no_median_for_no_timings() {
        assert_eq!(median(&mut []), None);
    }

    #[test]
    fn it_combines_workers() {
        let results = [worker(&[0.4, 0.2]), worker(&[0.1]), worker(&[0.3, 0.5, 0.6])];
        let stats = aggregate(&results).unwrap();

        assert_eq!(stats.total_queries, 6);
        assert!((stats.total_time - 2.1).abs() < 1e-9);
        assert_eq!(stats.min_time, 0.1);
        assert_eq!(stats.max_time, 0.6);
        assert!((stats.average_time - 0.35).abs() < 1e-9);
        assert!((stats.median_time - 0.35).abs() < 1e-9);
    }

    #[test]
    fn it_ignores_workers_without_queries() {
        let stats = aggregate(&[WorkerResult::default(), worker(&[0.2, 0.3])]).unwrap();
        assert_eq!(stats.total_queries, 2);
        assert_eq!(stats.min_time, 0.2);
        assert_eq!(stats.max_time, 0.3);
    }

    #[test]
    fn it_returns_nothing_without_queries() {
        assert_eq!(aggregate(&[]), None);
        assert_eq!(aggregate(&[WorkerResult::default()]), None);
    }

    #[test]
    fn it_keeps_median_and_average_within_bounds() {
        let stats = aggregate(&[worker(&[0.9, 0.001, 0.05]), worker(&[0.2, 0.0002])]).unwrap();
        assert!(stats.min_time <= stats.median_time && stats.median_time <= stats.max_time);
        assert!(stats.min_time <= stats.average_time && stats.average_time <= stats.max_time);
    }
}
