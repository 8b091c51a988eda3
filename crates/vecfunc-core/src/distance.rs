//! Distance algorithms shared by the list functions and the aggregates
//!
//! Every algorithm is computed from the same running sums, kept in
//! [`DistanceState`]:
//! - L2 norm of a single vector
//! - L2 (Euclidean) distance
//! - Dot product
//! - Cosine distance / cosine similarity
//!
//! States can be merged, so the aggregates can combine partial results
//! coming from different partitions.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;

use crate::{Error, Result};

/// A named distance computation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DistanceAlgorithm {
    /// Euclidean norm of one vector (unary)
    L2Norm,
    /// Euclidean distance between two vectors
    L2Distance,
    /// Sum of element-wise products
    DotProduct,
    /// `1 - cosine_similarity`
    CosineDistance,
    /// Cosine of the angle between two vectors
    CosineSimilarity,
}

static ALGORITHMS: Lazy<HashMap<&'static str, DistanceAlgorithm>> = Lazy::new(|| {
    HashMap::from([
        ("l2norm", DistanceAlgorithm::L2Norm),
        ("l2distance", DistanceAlgorithm::L2Distance),
        ("euclidean_distance", DistanceAlgorithm::L2Distance),
        ("dot_product", DistanceAlgorithm::DotProduct),
        ("cosine_distance", DistanceAlgorithm::CosineDistance),
        ("cosine_similarity", DistanceAlgorithm::CosineSimilarity),
    ])
});

impl DistanceAlgorithm {
    /// All algorithms, in registration order
    pub const ALL: [DistanceAlgorithm; 5] = [
        DistanceAlgorithm::L2Norm,
        DistanceAlgorithm::L2Distance,
        DistanceAlgorithm::DotProduct,
        DistanceAlgorithm::CosineDistance,
        DistanceAlgorithm::CosineSimilarity,
    ];

    /// Look up an algorithm by name (case-insensitive, aliases included)
    pub fn from_name(name: &str) -> Result<Self> {
        ALGORITHMS
            .get(name.trim().to_ascii_lowercase().as_str())
            .copied()
            .ok_or_else(|| Error::UnknownAlgorithm(name.to_string()))
    }

    /// Canonical SQL name
    pub fn name(&self) -> &'static str {
        match self {
            DistanceAlgorithm::L2Norm => "l2norm",
            DistanceAlgorithm::L2Distance => "l2distance",
            DistanceAlgorithm::DotProduct => "dot_product",
            DistanceAlgorithm::CosineDistance => "cosine_distance",
            DistanceAlgorithm::CosineSimilarity => "cosine_similarity",
        }
    }

    /// Alternative SQL names
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            DistanceAlgorithm::L2Distance => &["euclidean_distance"],
            _ => &[],
        }
    }

    /// Whether the algorithm consumes a single vector
    pub fn is_unary(&self) -> bool {
        matches!(self, DistanceAlgorithm::L2Norm)
    }
}

impl fmt::Display for DistanceAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Running sums over element pairs
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DistanceState {
    /// Σ x·y
    pub dot: f64,
    /// Σ x²
    pub a_magnitude: f64,
    /// Σ y²
    pub b_magnitude: f64,
    /// Σ (x - y)²
    pub squared_diff: f64,
    /// Number of values folded in
    pub count: u64,
}

impl DistanceState {
    /// Fold in one element pair
    #[inline]
    pub fn update(&mut self, x: f64, y: f64) {
        self.dot += x * y;
        self.a_magnitude += x * x;
        self.b_magnitude += y * y;
        self.squared_diff += (x - y) * (x - y);
        self.count += 1;
    }

    /// Fold in one element of a single vector
    #[inline]
    pub fn update_unary(&mut self, x: f64) {
        self.a_magnitude += x * x;
        self.count += 1;
    }

    /// Combine a partial state into this one
    pub fn merge(&mut self, other: &DistanceState) {
        self.dot += other.dot;
        self.a_magnitude += other.a_magnitude;
        self.b_magnitude += other.b_magnitude;
        self.squared_diff += other.squared_diff;
        self.count += other.count;
    }

    /// Final value for `algorithm`; `None` when the cosine of a zero vector is asked for
    pub fn finish(&self, algorithm: DistanceAlgorithm) -> Option<f64> {
        match algorithm {
            DistanceAlgorithm::L2Norm => Some(self.a_magnitude.sqrt()),
            DistanceAlgorithm::L2Distance => Some(self.squared_diff.sqrt()),
            DistanceAlgorithm::DotProduct => Some(self.dot),
            DistanceAlgorithm::CosineSimilarity => self.cosine(),
            DistanceAlgorithm::CosineDistance => self.cosine().map(|sim| 1.0 - sim),
        }
    }

    fn cosine(&self) -> Option<f64> {
        if self.a_magnitude == 0.0 || self.b_magnitude == 0.0 {
            return None;
        }
        Some(self.dot / (self.a_magnitude * self.b_magnitude).sqrt())
    }
}

/// Compute a binary algorithm over two equally sized vectors
pub fn distance(algorithm: DistanceAlgorithm, a: &[f64], b: &[f64]) -> Result<Option<f64>> {
    if algorithm.is_unary() {
        return Err(Error::argument(
            algorithm.name(),
            "takes a single vector, use list_l2norm",
        ));
    }
    if a.len() != b.len() {
        return Err(Error::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    let mut state = DistanceState::default();
    for (x, y) in a.iter().zip(b.iter()) {
        state.update(*x, *y);
    }
    Ok(state.finish(algorithm))
}

/// L2 (Euclidean) distance between two vectors
pub fn l2_distance(a: &[f64], b: &[f64]) -> Result<f64> {
    Ok(distance(DistanceAlgorithm::L2Distance, a, b)?.unwrap_or_default())
}

/// Dot product between two vectors
pub fn dot_product(a: &[f64], b: &[f64]) -> Result<f64> {
    Ok(distance(DistanceAlgorithm::DotProduct, a, b)?.unwrap_or_default())
}

/// Cosine similarity in [-1, 1]; `None` if either vector is all zeros
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> Result<Option<f64>> {
    distance(DistanceAlgorithm::CosineSimilarity, a, b)
}

/// Euclidean norm of a vector
pub fn l2_norm(v: &[f64]) -> f64 {
    let mut state = DistanceState::default();
    for x in v {
        state.update_unary(*x);
    }
    state.a_magnitude.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity_identical() {
        let sim = cosine_similarity(&[1.0, 0.0, 0.0], &[1.0, 0.0, 0.0])
            .unwrap()
            .unwrap();
        assert!((sim - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_cosine_similarity_orthogonal() {
        let sim = cosine_similarity(&[1.0, 0.0, 0.0], &[0.0, 1.0, 0.0])
            .unwrap()
            .unwrap();
        assert!(sim.abs() < 1e-12);
    }

    #[test]
    fn test_cosine_distance_opposite() {
        let dist = distance(
            DistanceAlgorithm::CosineDistance,
            &[1.0, 0.0, 0.0],
            &[-1.0, 0.0, 0.0],
        )
        .unwrap()
        .unwrap();
        assert!((dist - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_cosine_zero_vector_is_none() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]).unwrap(), None);
        assert_eq!(
            distance(DistanceAlgorithm::CosineDistance, &[], &[]).unwrap(),
            None
        );
    }

    #[test]
    fn test_l2_distance() {
        let dist = l2_distance(&[0.0, 0.0, 0.0], &[3.0, 4.0, 0.0]).unwrap();
        assert!((dist - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_dot_product() {
        let dot = dot_product(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]).unwrap();
        assert!((dot - 32.0).abs() < 1e-12); // 1*4 + 2*5 + 3*6 = 32
    }

    #[test]
    fn test_l2_norm() {
        assert!((l2_norm(&[3.0, 4.0]) - 5.0).abs() < 1e-12);
        assert_eq!(l2_norm(&[]), 0.0);
    }

    #[test]
    fn test_empty_vectors() {
        assert_eq!(l2_distance(&[], &[]).unwrap(), 0.0);
        assert_eq!(dot_product(&[], &[]).unwrap(), 0.0);
    }

    #[test]
    fn test_dimension_mismatch() {
        let err = l2_distance(&[1.0, 2.0], &[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(
            err,
            Error::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        ));
    }

    #[test]
    fn test_unary_algorithm_rejected_for_pairs() {
        let err = distance(DistanceAlgorithm::L2Norm, &[1.0], &[1.0]).unwrap_err();
        assert!(matches!(err, Error::Argument { .. }));
    }

    #[test]
    fn test_lookup_by_name() {
        assert_eq!(
            DistanceAlgorithm::from_name("L2Distance").unwrap(),
            DistanceAlgorithm::L2Distance
        );
        assert_eq!(
            DistanceAlgorithm::from_name("euclidean_distance").unwrap(),
            DistanceAlgorithm::L2Distance
        );
        assert!(matches!(
            DistanceAlgorithm::from_name("manhattan"),
            Err(Error::UnknownAlgorithm(_))
        ));
        for algorithm in DistanceAlgorithm::ALL {
            assert_eq!(DistanceAlgorithm::from_name(algorithm.name()).unwrap(), algorithm);
        }
    }

    #[test]
    fn test_merge_matches_single_pass() {
        let a = [1.0, -2.0, 3.5, 0.25];
        let b = [0.5, 4.0, -1.0, 2.0];

        let mut whole = DistanceState::default();
        for (x, y) in a.iter().zip(b.iter()) {
            whole.update(*x, *y);
        }

        let mut left = DistanceState::default();
        let mut right = DistanceState::default();
        left.update(a[0], b[0]);
        left.update(a[1], b[1]);
        right.update(a[2], b[2]);
        right.update(a[3], b[3]);
        left.merge(&right);

        assert_eq!(left, whole);
    }
}
