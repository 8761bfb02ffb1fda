//! Point cloud with optional normals and feature descriptors.

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A 33-dimensional Fast Point Feature Histogram descriptor.
///
/// Three 11-bin angle histograms concatenated, normalised so the bins of
/// each point sum to 1 (or all zero for isolated points).
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FpfhFeature {
    /// Histogram bins.
    #[cfg_attr(feature = "serde", serde(with = "serde_big_array::BigArray"))]
    pub histogram: [f64; 33],
}

impl FpfhFeature {
    /// A zeroed descriptor.
    #[inline]
    #[must_use]
    pub const fn zeros() -> Self {
        Self {
            histogram: [0.0; 33],
        }
    }

    /// Euclidean distance between two descriptors.
    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        self.histogram
            .iter()
            .zip(other.histogram.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>()
            .sqrt()
    }
}

impl Default for FpfhFeature {
    fn default() -> Self {
        Self::zeros()
    }
}

/// A point cloud with optional per-point normals and FPFH descriptors.
///
/// Normals and features, when present, are parallel to `points` (one entry
/// per point). They are filled in by the estimation passes in `fit-cloud`.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PointCloud {
    /// Point positions.
    pub points: Vec<Point3<f64>>,

    /// Optional unit normals, one per point.
    pub normals: Option<Vec<Vector3<f64>>>,

    /// Optional FPFH descriptors, one per point.
    pub features: Option<Vec<FpfhFeature>>,
}

impl PointCloud {
    /// Create an empty cloud.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            points: Vec::new(),
            normals: None,
            features: None,
        }
    }

    /// Create a cloud from bare points.
    #[inline]
    #[must_use]
    pub const fn from_points(points: Vec<Point3<f64>>) -> Self {
        Self {
            points,
            normals: None,
            features: None,
        }
    }

    /// Number of points.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the cloud has no points.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
