//! Doubly-constrained gravity assignment of daily trips.
//!
//! # Model
//!
//! Given per-node daily totals and the ideal travel-time matrix, produce an
//! `N × N` origin-destination matrix whose row sums match the per-node totals
//! as trip origins and whose column sums match them as trip destinations.
//!
//! 1. Transform costs: `D'[i,j] = (D[i,j] + flat_distance) ^ distance_exponent`.
//! 2. Use the symmetric round-trip cost `C[i,j] = D'[i,j] + D'[j,i]`, since
//!    most passengers intend to return to their origin. Diagonal is excluded
//!    (no self-trips).
//! 3. Seed row `i` by distributing `starts[i]` across `j != i` in proportion
//!    to `stops[j] / C[i,j]`.
//! 4. Furness balancing: alternately rescale columns to match `stops` and
//!    rows to match `starts` until both marginal errors drop below the
//!    tolerance, or the iteration cap is reached.
//!
//! Non-convergence is a warning, not an error: the best matrix so far is
//! returned together with a [`Convergence`] report, and the run proceeds.

use log::{debug, warn};

use pt_core::NodeId;

use crate::allpairs::IdealTimes;

// ── Parameters ────────────────────────────────────────────────────────────────

/// Tuning knobs for [`gravity_assignment`].
#[derive(Copy, Clone, Debug)]
pub struct GravityParams {
    /// How strongly cost suppresses demand. 1.0 = inverse-linear.
    pub distance_exponent: f64,
    /// Flat minutes added to every trip before the exponent, so that very
    /// short trips do not dominate.
    pub flat_distance: f64,
    /// Relative marginal-error tolerance for convergence.
    pub tolerance: f64,
    /// Furness iteration cap.
    pub max_iterations: u32,
}

impl Default for GravityParams {
    /// The reference run's fudge factors: inverse-linear decay with a five
    /// minute floor, 1e-3 tolerance, 100 iterations.
    fn default() -> Self {
        Self {
            distance_exponent: 1.0,
            flat_distance: 5.0,
            tolerance: 1e-3,
            max_iterations: 100,
        }
    }
}

// ── OdMatrix ──────────────────────────────────────────────────────────────────

/// Origin-destination trips per day. Row = origin, column = destination,
/// diagonal = 0, all entries non-negative.
#[derive(Clone, Debug)]
pub struct OdMatrix {
    n: usize,
    trips: Vec<f64>,
}

impl OdMatrix {
    /// Build a matrix directly from row-major daily trips. Synthetic demand
    /// for tests and hand-written scenarios; the gravity model is the usual
    /// source.
    ///
    /// # Panics
    /// Panics if `trips.len() != n * n`.
    pub fn from_trips(n: usize, trips: Vec<f64>) -> Self {
        assert_eq!(trips.len(), n * n, "OD matrix must be n*n");
        Self { n, trips }
    }

    pub fn node_count(&self) -> usize {
        self.n
    }

    /// Expected daily trips from `from` to `to`.
    #[inline]
    pub fn trips(&self, from: NodeId, to: NodeId) -> f64 {
        self.trips[from.index() * self.n + to.index()]
    }

    /// One origin's full destination row.
    #[inline]
    pub fn row(&self, from: NodeId) -> &[f64] {
        let start = from.index() * self.n;
        &self.trips[start..start + self.n]
    }

    pub fn row_sum(&self, from: NodeId) -> f64 {
        self.row(from).iter().sum()
    }

    pub fn col_sum(&self, to: NodeId) -> f64 {
        (0..self.n)
            .map(|i| self.trips[i * self.n + to.index()])
            .sum()
    }
}

// ── Convergence report ────────────────────────────────────────────────────────

/// Outcome of the Furness balancing loop.
#[derive(Copy, Clone, Debug)]
pub struct Convergence {
    pub converged: bool,
    pub iterations: u32,
    /// Largest relative row-sum error at termination.
    pub max_row_error: f64,
    /// Largest relative column-sum error at termination.
    pub max_col_error: f64,
}

// ── Assignment ────────────────────────────────────────────────────────────────

/// Assign daily trips between all ordered node pairs.
///
/// `starts[i]` and `stops[j]` are the daily totals originating and
/// terminating at each node (equal in practice). Lengths must equal the
/// matrix dimension of `ideal`.
pub fn gravity_assignment(
    starts: &[f64],
    stops: &[f64],
    ideal: &IdealTimes,
    params: GravityParams,
) -> (OdMatrix, Convergence) {
    let n = ideal.node_count();
    assert_eq!(starts.len(), n, "starts length must match node count");
    assert_eq!(stops.len(), n, "stops length must match node count");

    // Transformed round-trip costs; infinity where either direction is
    // unreachable, which zeroes the pair's seed weight below.
    let transformed = |i: usize, j: usize| {
        (ideal.cost(NodeId(i as u32), NodeId(j as u32)) + params.flat_distance)
            .powf(params.distance_exponent)
    };

    // ── Seed ──────────────────────────────────────────────────────────────
    let mut trips = vec![0.0; n * n];
    for i in 0..n {
        let mut weight = vec![0.0; n];
        let mut total = 0.0;
        for j in 0..n {
            if j == i {
                continue;
            }
            let round_trip = transformed(i, j) + transformed(j, i);
            if round_trip.is_finite() {
                weight[j] = stops[j] / round_trip;
                total += weight[j];
            }
        }
        if total > 0.0 {
            for j in 0..n {
                trips[i * n + j] = weight[j] / total * starts[i];
            }
        }
    }

    // ── Furness balancing ─────────────────────────────────────────────────
    let mut iterations = 0;
    let report = loop {
        let (col_factor, max_col_error) = marginal_factors_cols(&trips, stops, n);
        let (_, max_row_error) = marginal_factors_rows(&trips, starts, n);

        if max_col_error < params.tolerance && max_row_error < params.tolerance {
            debug!("gravity model converged after {iterations} iterations");
            break Convergence {
                converged: true,
                iterations,
                max_row_error,
                max_col_error,
            };
        }
        if iterations >= params.max_iterations {
            warn!(
                "gravity model failed to converge after {} iterations \
                 (row error {max_row_error:.2e}, column error {max_col_error:.2e})",
                params.max_iterations
            );
            break Convergence {
                converged: false,
                iterations,
                max_row_error,
                max_col_error,
            };
        }
        iterations += 1;

        // Column sweep: pull every destination's total towards `stops`.
        for i in 0..n {
            for j in 0..n {
                trips[i * n + j] *= col_factor[j];
            }
        }
        // Row sweep with factors recomputed after the column sweep.
        let (row_factor, _) = marginal_factors_rows(&trips, starts, n);
        for i in 0..n {
            for j in 0..n {
                trips[i * n + j] *= row_factor[i];
            }
        }
    };

    (OdMatrix { n, trips }, report)
}

/// Per-column correction factors `stops[j] / colsum[j]` and the largest
/// relative error `|factor - 1|`.
///
/// A zero column sum with a zero target is already balanced (factor 1, no
/// error); a zero column sum with a positive target can never balance, which
/// surfaces as an infinite error and a non-convergent report.
fn marginal_factors_cols(trips: &[f64], stops: &[f64], n: usize) -> (Vec<f64>, f64) {
    let mut factors = vec![1.0; n];
    let mut max_error: f64 = 0.0;
    for j in 0..n {
        let sum: f64 = (0..n).map(|i| trips[i * n + j]).sum();
        if sum > 0.0 {
            factors[j] = stops[j] / sum;
            max_error = max_error.max((factors[j] - 1.0).abs());
        } else if stops[j] > 0.0 {
            max_error = f64::INFINITY;
        }
    }
    (factors, max_error)
}

/// Row-wise counterpart of [`marginal_factors_cols`].
fn marginal_factors_rows(trips: &[f64], starts: &[f64], n: usize) -> (Vec<f64>, f64) {
    let mut factors = vec![1.0; n];
    let mut max_error: f64 = 0.0;
    for i in 0..n {
        let sum: f64 = trips[i * n..(i + 1) * n].iter().sum();
        if sum > 0.0 {
            factors[i] = starts[i] / sum;
            max_error = max_error.max((factors[i] - 1.0).abs());
        } else if starts[i] > 0.0 {
            max_error = f64::INFINITY;
        }
    }
    (factors, max_error)
}
