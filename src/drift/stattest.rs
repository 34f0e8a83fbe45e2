//! Two-sample statistical tests

use crate::error::{Result, TripwatchError};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

/// Outcome of a single two-sample test
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatTestResult {
    /// Test identifier ("ks" or "chi_square")
    pub method: String,
    /// Test statistic
    pub statistic: f64,
    /// Critical value the statistic was compared against
    pub threshold: f64,
    /// Whether the statistic exceeded the critical value
    pub drifted: bool,
}

impl StatTestResult {
    fn new(method: &str, statistic: f64, threshold: f64) -> Self {
        Self {
            method: method.to_string(),
            statistic,
            threshold,
            drifted: statistic > threshold,
        }
    }
}

/// Two-sample Kolmogorov-Smirnov test for numeric distributions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KolmogorovSmirnovTest {
    alpha: f64,
}

impl KolmogorovSmirnovTest {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha: alpha.clamp(0.001, 0.5),
        }
    }

    pub fn run(&self, reference: &Array1<f64>, current: &Array1<f64>) -> Result<StatTestResult> {
        if reference.is_empty() || current.is_empty() {
            return Err(TripwatchError::ValidationError(
                "KS test requires non-empty samples".to_string(),
            ));
        }

        let statistic = Self::statistic(reference, current);
        let threshold = self.critical_value(reference.len(), current.len());
        Ok(StatTestResult::new("ks", statistic, threshold))
    }

    /// Maximum absolute distance between the two empirical CDFs,
    /// computed by walking both sorted samples once
    fn statistic(reference: &Array1<f64>, current: &Array1<f64>) -> f64 {
        let mut a: Vec<f64> = reference.iter().copied().filter(|v| v.is_finite()).collect();
        let mut b: Vec<f64> = current.iter().copied().filter(|v| v.is_finite()).collect();
        a.sort_by(|x, y| x.partial_cmp(y).unwrap_or(Ordering::Equal));
        b.sort_by(|x, y| x.partial_cmp(y).unwrap_or(Ordering::Equal));

        if a.is_empty() || b.is_empty() {
            return 0.0;
        }

        let n1 = a.len() as f64;
        let n2 = b.len() as f64;
        let (mut i, mut j) = (0usize, 0usize);
        let mut distance = 0.0f64;

        while i < a.len() && j < b.len() {
            let x = a[i].min(b[j]);
            while i < a.len() && a[i] <= x {
                i += 1;
            }
            while j < b.len() && b[j] <= x {
                j += 1;
            }
            distance = distance.max((i as f64 / n1 - j as f64 / n2).abs());
        }

        distance
    }

    /// Approximate critical value for the two-sample test
    fn critical_value(&self, n1: usize, n2: usize) -> f64 {
        let c_alpha = match self.alpha {
            a if a <= 0.01 => 1.63,
            a if a <= 0.05 => 1.36,
            a if a <= 0.10 => 1.22,
            _ => 1.07,
        };
        c_alpha * ((n1 + n2) as f64 / (n1 * n2) as f64).sqrt()
    }
}

impl Default for KolmogorovSmirnovTest {
    fn default() -> Self {
        Self::new(0.05)
    }
}

/// Pearson chi-square test over category frequency tables.
///
/// Expected current counts come from Laplace-smoothed reference
/// proportions so categories absent from the reference stay finite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChiSquareTest {
    alpha: f64,
}

impl ChiSquareTest {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha: alpha.clamp(0.001, 0.5),
        }
    }

    pub fn run(&self, reference: &[i64], current: &[i64]) -> Result<StatTestResult> {
        if reference.is_empty() || current.is_empty() {
            return Err(TripwatchError::ValidationError(
                "chi-square test requires non-empty samples".to_string(),
            ));
        }

        let ref_counts = Self::counts(reference);
        let cur_counts = Self::counts(current);

        let categories: BTreeSet<i64> = ref_counts
            .keys()
            .chain(cur_counts.keys())
            .copied()
            .collect();
        let k = categories.len();
        if k <= 1 {
            // Single shared category: the distributions are identical
            return Ok(StatTestResult::new("chi_square", 0.0, f64::INFINITY));
        }

        let n_ref = reference.len() as f64;
        let n_cur = current.len() as f64;
        let mut statistic = 0.0;
        for category in &categories {
            let ref_count = ref_counts.get(category).copied().unwrap_or(0) as f64;
            let cur_count = cur_counts.get(category).copied().unwrap_or(0) as f64;
            let p_ref = (ref_count + 0.5) / (n_ref + 0.5 * k as f64);
            let expected = p_ref * n_cur;
            statistic += (cur_count - expected).powi(2) / expected;
        }

        let threshold = Self::critical_value(k - 1, self.alpha);
        Ok(StatTestResult::new("chi_square", statistic, threshold))
    }

    fn counts(values: &[i64]) -> HashMap<i64, usize> {
        let mut counts = HashMap::new();
        for &v in values {
            *counts.entry(v).or_insert(0) += 1;
        }
        counts
    }

    /// Wilson-Hilferty approximation of the chi-square critical value
    fn critical_value(degrees: usize, alpha: f64) -> f64 {
        let z = match alpha {
            a if a <= 0.01 => 2.326,
            a if a <= 0.05 => 1.645,
            a if a <= 0.10 => 1.282,
            _ => 1.036,
        };
        let d = degrees as f64;
        let t = 1.0 - 2.0 / (9.0 * d) + z * (2.0 / (9.0 * d)).sqrt();
        d * t.powi(3)
    }
}

impl Default for ChiSquareTest {
    fn default() -> Self {
        Self::new(0.05)
    }
}
