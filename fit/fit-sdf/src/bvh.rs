//! Bounding volume hierarchy for closest-point queries.

use fit_types::{Aabb, Triangle};
use nalgebra::Point3;

use crate::query::closest_point_on_triangle;

/// Median-split BVH node over triangle indices.
#[derive(Debug)]
pub(crate) enum BvhNode {
    Leaf {
        aabb: Aabb,
        face: usize,
    },
    Internal {
        aabb: Aabb,
        left: Box<BvhNode>,
        right: Box<BvhNode>,
    },
}

impl BvhNode {
    /// Build a BVH over the given triangle indices.
    ///
    /// Splits at the median along the longest extent of the combined
    /// bounding box.
    pub(crate) fn build(triangles: &[Triangle], indices: &mut [usize]) -> Option<Self> {
        match indices {
            [] => None,
            [face] => Some(Self::Leaf {
                aabb: triangles[*face].aabb(),
                face: *face,
            }),
            _ => {
                let mut aabb = Aabb::empty();
                for &i in indices.iter() {
                    let t = triangles[i].aabb();
                    aabb.expand_to_include(&t.min);
                    aabb.expand_to_include(&t.max);
                }

                let extent = aabb.size();
                let axis = if extent.x >= extent.y && extent.x >= extent.z {
                    0
                } else {
                    usize::from(extent.y < extent.z) + 1
                };

                indices.sort_unstable_by(|&a, &b| {
                    let ca = triangles[a].centroid()[axis];
                    let cb = triangles[b].centroid()[axis];
                    ca.partial_cmp(&cb).unwrap_or(std::cmp::Ordering::Equal)
                });

                let mid = indices.len() / 2;
                let (left, right) = indices.split_at_mut(mid);
                match (
                    Self::build(triangles, left),
                    Self::build(triangles, right),
                ) {
                    (Some(l), Some(r)) => Some(Self::Internal {
                        aabb,
                        left: Box::new(l),
                        right: Box::new(r),
                    }),
                    (Some(one), None) | (None, Some(one)) => Some(one),
                    (None, None) => None,
                }
            }
        }
    }

    const fn aabb(&self) -> &Aabb {
        match self {
            Self::Leaf { aabb, .. } | Self::Internal { aabb, .. } => aabb,
        }
    }

    /// Branch-and-bound descent to the closest surface point.
    ///
    /// `best` carries `(distance², point, face)` and is tightened as leaves
    /// are visited; subtrees farther than the current best are pruned.
    pub(crate) fn closest(
        &self,
        query: &Point3<f64>,
        triangles: &[Triangle],
        best: &mut (f64, Point3<f64>, usize),
    ) {
        if self.aabb().distance_squared(query) >= best.0 {
            return;
        }

        match self {
            Self::Leaf { face, .. } => {
                let tri = &triangles[*face];
                let candidate =
                    closest_point_on_triangle(query, &tri.v0, &tri.v1, &tri.v2);
                let dist_sq = (candidate - query).norm_squared();
                if dist_sq < best.0 {
                    *best = (dist_sq, candidate, *face);
                }
            }
            Self::Internal { left, right, .. } => {
                // Visit the nearer child first for tighter pruning.
                let dl = left.aabb().distance_squared(query);
                let dr = right.aabb().distance_squared(query);
                if dl <= dr {
                    left.closest(query, triangles, best);
                    right.closest(query, triangles, best);
                } else {
                    right.closest(query, triangles, best);
                    left.closest(query, triangles, best);
                }
            }
        }
    }
}
