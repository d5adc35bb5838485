//! Triangle mesh geometry
//!
//! A `MeshGeometry` is pure geometry: a vertex position buffer plus an
//! optional index buffer. There is no colour, UV or material data here; the
//! collision code only ever needs positions.

use crate::{Triangle, Vec3};

/// Position-only triangle mesh
///
/// When `indices` is `None` the positions are read three at a time as a
/// triangle soup.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshGeometry {
    positions: Vec<Vec3>,
    indices: Option<Vec<[u32; 3]>>,
}

impl MeshGeometry {
    /// Create an indexed mesh
    pub fn new(positions: Vec<Vec3>, indices: Vec<[u32; 3]>) -> Self {
        Self {
            positions,
            indices: Some(indices),
        }
    }

    /// Create a non-indexed triangle soup (trailing vertices that do not
    /// complete a triangle are ignored)
    pub fn from_soup(positions: Vec<Vec3>) -> Self {
        Self {
            positions,
            indices: None,
        }
    }

    /// Vertex positions
    #[inline]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Number of triangles
    pub fn triangle_count(&self) -> usize {
        match &self.indices {
            Some(indices) => indices.len(),
            None => self.positions.len() / 3,
        }
    }

    /// Whether the mesh has no triangles
    pub fn is_empty(&self) -> bool {
        self.triangle_count() == 0
    }

    /// Iterate over triangles in local space
    ///
    /// Triangles that reference an out-of-range vertex are skipped.
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        let indexed = self.indices.iter().flatten().filter_map(move |[a, b, c]| {
            let p = &self.positions;
            Some(Triangle::new(
                *p.get(*a as usize)?,
                *p.get(*b as usize)?,
                *p.get(*c as usize)?,
            ))
        });
        let soup = self
            .indices
            .is_none()
            .then(|| {
                self.positions
                    .chunks_exact(3)
                    .map(|t| Triangle::new(t[0], t[1], t[2]))
            })
            .into_iter()
            .flatten();
        indexed.chain(soup)
    }

    /// Axis-aligned cuboid centred at the origin with the given full size
    ///
    /// Faces wind counter-clockwise when seen from outside.
    pub fn cuboid(size: Vec3) -> Self {
        let h = size * 0.5;
        let positions = vec![
            Vec3::new(-h.x, -h.y, -h.z), // 0
            Vec3::new(h.x, -h.y, -h.z),  // 1
            Vec3::new(h.x, h.y, -h.z),   // 2
            Vec3::new(-h.x, h.y, -h.z),  // 3
            Vec3::new(-h.x, -h.y, h.z),  // 4
            Vec3::new(h.x, -h.y, h.z),   // 5
            Vec3::new(h.x, h.y, h.z),    // 6
            Vec3::new(-h.x, h.y, h.z),   // 7
        ];
        let indices = vec![
            // -Z
            [0, 2, 1],
            [0, 3, 2],
            // +Z
            [4, 5, 6],
            [4, 6, 7],
            // -X
            [0, 4, 7],
            [0, 7, 3],
            // +X
            [1, 2, 6],
            [1, 6, 5],
            // -Y
            [0, 1, 5],
            [0, 5, 4],
            // +Y
            [3, 7, 6],
            [3, 6, 2],
        ];
        Self::new(positions, indices)
    }

    /// Flat square in the XZ plane at y = 0, facing +Y
    pub fn plane(size: f32) -> Self {
        let h = size * 0.5;
        let positions = vec![
            Vec3::new(-h, 0.0, -h),
            Vec3::new(h, 0.0, -h),
            Vec3::new(h, 0.0, h),
            Vec3::new(-h, 0.0, h),
        ];
        Self::new(positions, vec![[0, 2, 1], [0, 3, 2]])
    }

    /// Local-space bounds as `(min, max)`, or `None` for an empty mesh
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut iter = self.positions.iter();
        let first = *iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), p| {
            (lo.min_components(*p), hi.max_components(*p))
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_cuboid_counts() {
        let mesh = MeshGeometry::cuboid(Vec3::ONE);
        assert_eq!(mesh.positions().len(), 8);
        assert_eq!(mesh.triangle_count(), 12);
        assert_eq!(mesh.triangles().count(), 12);
    }

    #[test]
    fn test_cuboid_normals_point_outward() {
        let mesh = MeshGeometry::cuboid(Vec3::new(2.0, 4.0, 6.0));
        for tri in mesh.triangles() {
            let outward = tri.centroid().normalized();
            assert!(tri.normal().dot(outward) > 0.0, "inward face: {:?}", tri);
        }
    }

    #[test]
    fn test_plane_faces_up() {
        let mesh = MeshGeometry::plane(10.0);
        for tri in mesh.triangles() {
            assert!((tri.normal().y - 1.0).abs() < EPSILON);
        }
    }

    #[test]
    fn test_soup_ignores_trailing_vertices() {
        let mesh = MeshGeometry::from_soup(vec![
            Vec3::ZERO,
            Vec3::X,
            Vec3::Z,
            Vec3::Y,
        ]);
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.triangles().count(), 1);
    }

    #[test]
    fn test_out_of_range_index_is_skipped() {
        let mesh = MeshGeometry::new(vec![Vec3::ZERO, Vec3::X, Vec3::Z], vec![[0, 1, 2], [0, 1, 9]]);
        assert_eq!(mesh.triangles().count(), 1);
    }

    #[test]
    fn test_bounds() {
        let mesh = MeshGeometry::cuboid(Vec3::new(2.0, 4.0, 6.0));
        let (lo, hi) = mesh.bounds().expect("non-empty");
        assert_eq!(lo, Vec3::new(-1.0, -2.0, -3.0));
        assert_eq!(hi, Vec3::new(1.0, 2.0, 3.0));
        assert!(MeshGeometry::default().bounds().is_none());
        assert!(MeshGeometry::default().is_empty());
    }
}
