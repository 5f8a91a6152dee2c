//! Statistical helpers for analytics

use crate::error::{AppError, Result};

/// Statistical percentiles
#[derive(Debug, Clone, serde::Serialize)]
pub struct Percentiles {
    pub p50: f64,
    pub p90: f64,
    pub p95: f64,
    pub p99: f64,
}

impl Percentiles {
    /// Calculate percentiles from a dataset
    pub fn from_data(mut data: Vec<f64>) -> Self {
        if data.is_empty() {
            return Self {
                p50: 0.0,
                p90: 0.0,
                p95: 0.0,
                p99: 0.0,
            };
        }

        data.sort_by(|a, b| a.partial_cmp(b).unwrap());

        Self {
            p50: percentile(&data, 50.0),
            p90: percentile(&data, 90.0),
            p95: percentile(&data, 95.0),
            p99: percentile(&data, 99.0),
        }
    }
}

/// Distribution statistics
#[derive(Debug, Clone, serde::Serialize)]
pub struct Distribution {
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

impl Distribution {
    /// Calculate distribution from a dataset
    pub fn from_data(data: &[f64]) -> Result<Self> {
        if data.is_empty() {
            return Err(AppError::Processing(
                "Cannot calculate distribution from empty dataset".to_string(),
            ));
        }

        let count = data.len();
        let mean = data.iter().sum::<f64>() / count as f64;

        let mut sorted = data.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());

        let median = if count % 2 == 0 {
            (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
        } else {
            sorted[count / 2]
        };

        let variance = data.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / count as f64;

        Ok(Self {
            mean,
            median,
            std_dev: variance.sqrt(),
            min: sorted[0],
            max: sorted[count - 1],
            count,
        })
    }
}

/// Calculate a percentile from sorted data (linear interpolation)
fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    if sorted.len() == 1 {
        return sorted[0];
    }

    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;

    if lower == upper {
        sorted[lower]
    } else {
        let weight = rank - lower as f64;
        sorted[lower] * (1.0 - weight) + sorted[upper] * weight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distribution() {
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let dist = Distribution::from_data(&data).unwrap();

        assert_eq!(dist.mean, 3.0);
        assert_eq!(dist.median, 3.0);
        assert_eq!(dist.min, 1.0);
        assert_eq!(dist.max, 5.0);
        assert_eq!(dist.count, 5);
    }

    #[test]
    fn test_distribution_empty_fails() {
        assert!(Distribution::from_data(&[]).is_err());
    }

    #[test]
    fn test_percentiles() {
        let data: Vec<f64> = (1..=100).map(|i| i as f64).collect();
        let p = Percentiles::from_data(data);

        assert!((p.p50 - 50.5).abs() < 1e-9);
        assert!(p.p90 > p.p50);
        assert!(p.p99 > p.p95);
    }

    #[test]
    fn test_percentiles_empty() {
        let p = Percentiles::from_data(vec![]);
        assert_eq!(p.p50, 0.0);
    }
}
