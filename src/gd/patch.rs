//! Breadth-first collection of neighbor patches over element adjacency.

use fixedbitset as fb;

use crate::error::{GdError, Result};
use crate::mesh::ElementAdjacency;

/// Minimum number of elements in a patch
/// for a polynomial fit of the given degree.
///
/// Odd degrees take one more element than the number of coefficients
/// so that the patch can be symmetric around the seed in 1D.
///
/// ```
/// # use gdspace::gd::patch::required_patch_size;
/// assert_eq!(required_patch_size(0), 1);
/// assert_eq!(required_patch_size(1), 3);
/// assert_eq!(required_patch_size(2), 3);
/// assert_eq!(required_patch_size(3), 5);
/// ```
#[inline]
pub fn required_patch_size(degree: usize) -> usize {
    if degree % 2 == 1 {
        degree + 2
    } else {
        degree + 1
    }
}

/// Collect a patch of at least `required` elements around `seed`.
///
/// The seed is always the first entry.
/// Each round appends every not-yet-collected neighbor of the previous round's
/// elements, in the order they are discovered,
/// so the result can be larger than `required`.
pub fn build_patch(
    adjacency: &impl ElementAdjacency,
    seed: usize,
    required: usize,
) -> Result<Vec<usize>> {
    let element_count = adjacency.element_count();
    if seed >= element_count {
        return Err(GdError::DimensionMismatch {
            what: "patch seed element",
            expected: element_count,
            actual: seed,
        });
    }

    let mut visited = fb::FixedBitSet::with_capacity(element_count);
    visited.insert(seed);
    let mut patch = vec![seed];
    let mut frontier = vec![seed];

    while patch.len() < required {
        let mut next_frontier = Vec::new();
        for &elem in &frontier {
            for &neighbor in adjacency.adjacent_elements(elem) {
                if !visited.put(neighbor) {
                    next_frontier.push(neighbor);
                }
            }
        }
        if next_frontier.is_empty() {
            // the component containing the seed is exhausted
            return Err(GdError::PatchUnsatisfiable {
                seed,
                required,
                reached: patch.len(),
            });
        }
        patch.extend_from_slice(&next_frontier);
        frontier = next_frontier;
    }

    Ok(patch)
}

//
// tests
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SegmentMesh;
    use itertools::Itertools;

    #[test]
    fn patches_satisfy_size_and_uniqueness() {
        let mesh = SegmentMesh::uniform(12, 1.0).unwrap();
        for degree in 0..=5 {
            let required = required_patch_size(degree);
            for seed in 0..mesh.element_count() {
                let patch = build_patch(&mesh, seed, required).unwrap();
                assert!(patch.len() >= required, "degree {degree}, seed {seed}");
                assert_eq!(patch[0], seed);
                assert!(patch.iter().all_unique());
            }
        }
    }

    #[test]
    fn patch_order_follows_bfs_layers() {
        let mesh = SegmentMesh::uniform(6, 1.0).unwrap();
        // interior seed: one layer on each side
        assert_eq!(build_patch(&mesh, 3, 3).unwrap(), vec![3, 2, 4]);
        // boundary seed grows to one side only
        assert_eq!(build_patch(&mesh, 0, 3).unwrap(), vec![0, 1, 2]);
        // a whole layer is appended even if it overshoots
        assert_eq!(build_patch(&mesh, 3, 2).unwrap(), vec![3, 2, 4]);
        assert_eq!(build_patch(&mesh, 5, 1).unwrap(), vec![5]);
    }

    #[test]
    fn repeated_builds_are_identical() {
        let mesh = SegmentMesh::uniform(9, 2.0).unwrap();
        for seed in 0..9 {
            assert_eq!(
                build_patch(&mesh, seed, 5).unwrap(),
                build_patch(&mesh, seed, 5).unwrap()
            );
        }
    }

    #[test]
    fn small_components_are_unsatisfiable() {
        // two disconnected chains of 2 and 1 elements
        let mesh =
            SegmentMesh::new(vec![0.0, 1.0, 2.0, 5.0, 6.0], vec![0, 1, 1, 2, 3, 4]).unwrap();
        assert!(matches!(
            build_patch(&mesh, 0, 3),
            Err(GdError::PatchUnsatisfiable {
                seed: 0,
                required: 3,
                reached: 2
            })
        ));
        assert!(matches!(
            build_patch(&mesh, 2, 2),
            Err(GdError::PatchUnsatisfiable { reached: 1, .. })
        ));
        assert!(matches!(
            build_patch(&mesh, 3, 1),
            Err(GdError::DimensionMismatch { .. })
        ));
    }
}
