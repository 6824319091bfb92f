//! Closed-form M/M/N results used for the boundary states and the queue tail.
//!
//! With unit service rate the offered load equals the total arrival rate `a`.
//! The aggregate number of busy units follows the birth-death chain of an
//! M/M/N/N (zero capacity) or M/M/N (infinite capacity) queue, whatever the
//! dispatch policy.

use crate::params::Capacity;

/// `a^b / b!` for `b = 0..=n`, built incrementally.
pub fn load_terms(offered_load: f64, n: usize) -> Vec<f64> {
    let mut terms = Vec::with_capacity(n + 1);
    let mut term = 1.0;
    terms.push(term);
    for b in 1..=n {
        term *= offered_load / b as f64;
        terms.push(term);
    }
    terms
}

/// Normalising constant of the busy-count distribution.
///
/// For infinite capacity this adds the geometric tail
/// `(a^N / N!) * rho / (1 - rho)` with `rho = a / N`; callers must ensure
/// `rho < 1`.
pub fn normalizer(offered_load: f64, n: usize, capacity: Capacity) -> f64 {
    let terms = load_terms(offered_load, n);
    let finite: f64 = terms.iter().sum();
    match capacity {
        Capacity::Zero => finite,
        Capacity::Infinite => {
            let rho = offered_load / n as f64;
            finite + terms[n] * rho / (1.0 - rho)
        }
    }
}

/// Probability of exactly `b` busy units, for `b = 0..=n`.
pub fn busy_count_distribution(offered_load: f64, n: usize, capacity: Capacity) -> Vec<f64> {
    let denominator = normalizer(offered_load, n, capacity);
    load_terms(offered_load, n)
        .into_iter()
        .map(|term| term / denominator)
        .collect()
}

/// Whether an infinite-capacity queue with `n` units is stable under `offered_load`.
pub fn is_stable(offered_load: f64, n: usize) -> bool {
    n > 0 && offered_load < n as f64
}

/// Probability of exactly `waiting` calls in queue (infinite capacity only).
///
/// Requires `n >= 1` and `offered_load < n`; returns NaN otherwise.
pub fn queue_length_probability(offered_load: f64, n: usize, waiting: usize) -> f64 {
    if !is_stable(offered_load, n) {
        return f64::NAN;
    }
    let rho = offered_load / n as f64;
    let top = load_terms(offered_load, n)[n];
    top * rho.powi(waiting as i32) / normalizer(offered_load, n, Capacity::Infinite)
}

/// Erlang-B blocking probability of an M/M/N/N system.
pub fn erlang_b(n: usize, offered_load: f64) -> f64 {
    busy_count_distribution(offered_load, n, Capacity::Zero)[n]
}

/// Erlang-C probability that an arrival waits in an M/M/N system.
///
/// Requires `n >= 1` and `offered_load < n`; returns NaN otherwise.
pub fn erlang_c(n: usize, offered_load: f64) -> f64 {
    if !is_stable(offered_load, n) {
        return f64::NAN;
    }
    let rho = offered_load / n as f64;
    let top = load_terms(offered_load, n)[n];
    top / (1.0 - rho) / normalizer(offered_load, n, Capacity::Infinite)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn load_terms_are_powers_over_factorials() {
        let terms = load_terms(2.0, 4);
        let expected = [1.0, 2.0, 2.0, 4.0 / 3.0, 2.0 / 3.0];
        for (got, want) in terms.iter().zip(expected) {
            assert!((got - want).abs() < EPS);
        }
    }

    #[test]
    fn erlang_b_two_servers() {
        // 2^2/2 / (1 + 2 + 2)
        assert!((erlang_b(2, 2.0) - 0.4).abs() < EPS);
    }

    #[test]
    fn erlang_b_single_server() {
        assert!((erlang_b(1, 0.5) - 0.5 / 1.5).abs() < EPS);
    }

    #[test]
    fn single_server_infinite_is_geometric() {
        let rho = 0.6;
        let dist = busy_count_distribution(rho, 1, Capacity::Infinite);
        assert!((dist[0] - (1.0 - rho)).abs() < EPS);
        assert!((dist[1] - rho * (1.0 - rho)).abs() < EPS);
        for waiting in 1..5 {
            let expected = (1.0 - rho) * rho.powi(waiting as i32 + 1);
            assert!((queue_length_probability(rho, 1, waiting) - expected).abs() < EPS);
        }
    }

    #[test]
    fn erlang_c_single_server_equals_utilisation() {
        assert!((erlang_c(1, 0.7) - 0.7).abs() < EPS);
    }

    #[test]
    fn queue_results_are_nan_without_stable_load() {
        assert!(erlang_c(2, 2.0).is_nan());
        assert!(erlang_c(0, 0.5).is_nan());
        assert!(queue_length_probability(3.0, 2, 1).is_nan());
        assert!(queue_length_probability(0.5, 0, 1).is_nan());
        assert!(is_stable(1.999, 2));
    }

    #[test]
    fn busy_distribution_sums_to_one_for_zero_capacity() {
        let dist = busy_count_distribution(3.5, 6, Capacity::Zero);
        assert!((dist.iter().sum::<f64>() - 1.0).abs() < EPS);
    }

    #[test]
    fn infinite_distribution_plus_tail_sums_to_one() {
        let (load, n) = (2.5, 4);
        let dist = busy_count_distribution(load, n, Capacity::Infinite);
        let tail: f64 = (1..2000)
            .map(|q| queue_length_probability(load, n, q))
            .sum();
        assert!((dist.iter().sum::<f64>() + tail - 1.0).abs() < 1e-9);
    }
}
