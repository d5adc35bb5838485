//! Bounding volume hierarchy over a triangle soup
//!
//! The tree is built by recursive median split along the axis with the widest
//! spread of triangle centroids. Leaves hold at most [`MAX_LEAF_TRIANGLES`]
//! triangles. Triangles are reordered at build time so every leaf owns a
//! contiguous range of [`Bvh::triangles`].

use ninja_math::{Ray, RayHit, Triangle, Vec3};

use crate::shapes::Aabb;

/// Maximum number of triangles stored in a leaf
pub const MAX_LEAF_TRIANGLES: usize = 4;

/// A node of the hierarchy
#[derive(Clone, Debug)]
pub enum BvhNode {
    Leaf {
        bounds: Aabb,
        start: usize,
        count: usize,
    },
    Internal {
        bounds: Aabb,
        left: Box<BvhNode>,
        right: Box<BvhNode>,
    },
}

impl BvhNode {
    /// Bounds enclosing everything below this node
    pub fn bounds(&self) -> &Aabb {
        match self {
            BvhNode::Leaf { bounds, .. } => bounds,
            BvhNode::Internal { bounds, .. } => bounds,
        }
    }
}

/// Bounding volume hierarchy over triangles
#[derive(Clone, Debug, Default)]
pub struct Bvh {
    triangles: Vec<Triangle>,
    root: Option<BvhNode>,
}

impl Bvh {
    /// Build a hierarchy; an empty input yields an empty tree
    pub fn build(triangles: Vec<Triangle>) -> Self {
        let mut items: Vec<(Triangle, Vec3)> = triangles
            .into_iter()
            .map(|t| (t, t.centroid()))
            .collect();
        let root = (!items.is_empty()).then(|| Self::build_recursive(&mut items, 0));
        Self {
            triangles: items.into_iter().map(|(t, _)| t).collect(),
            root,
        }
    }

    fn build_recursive(items: &mut [(Triangle, Vec3)], start: usize) -> BvhNode {
        let bounds = items
            .iter()
            .fold(Aabb::EMPTY, |b, (t, _)| b.grown(t.min()).grown(t.max()));

        if items.len() <= MAX_LEAF_TRIANGLES {
            return BvhNode::Leaf {
                bounds,
                start,
                count: items.len(),
            };
        }

        let centroids = Aabb::from_points(items.iter().map(|(_, c)| *c));
        let spread = centroids.size();
        let axis = if spread.x >= spread.y && spread.x >= spread.z {
            0
        } else if spread.y >= spread.z {
            1
        } else {
            2
        };

        let mid = items.len() / 2;
        items.select_nth_unstable_by(mid, |(_, a), (_, b)| a.axis(axis).total_cmp(&b.axis(axis)));
        let (left_items, right_items) = items.split_at_mut(mid);

        let left = Self::build_recursive(left_items, start);
        let right = Self::build_recursive(right_items, start + mid);

        BvhNode::Internal {
            bounds,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Whether the tree has no triangles
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Number of triangles in the tree
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Triangles in leaf order
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Root node, if any
    pub fn root(&self) -> Option<&BvhNode> {
        self.root.as_ref()
    }

    /// Bounds of the whole tree
    pub fn bounds(&self) -> Option<Aabb> {
        self.root.as_ref().map(|r| *r.bounds())
    }

    /// Depth-first shape query
    ///
    /// Descends only into nodes whose bounds pass `intersects_bounds` and
    /// hands each triangle of a reached leaf to `intersects_triangle`. When
    /// that callback returns `true` the traversal stops early. Returns whether
    /// it stopped early.
    pub fn shapecast<B, T>(&self, mut intersects_bounds: B, mut intersects_triangle: T) -> bool
    where
        B: FnMut(&Aabb) -> bool,
        T: FnMut(&Triangle) -> bool,
    {
        let Some(root) = &self.root else {
            return false;
        };

        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if !intersects_bounds(node.bounds()) {
                continue;
            }
            match node {
                BvhNode::Leaf { start, count, .. } => {
                    for tri in &self.triangles[*start..*start + *count] {
                        if intersects_triangle(tri) {
                            return true;
                        }
                    }
                }
                BvhNode::Internal { left, right, .. } => {
                    // Right first so the left subtree is visited first
                    stack.push(right);
                    stack.push(left);
                }
            }
        }
        false
    }

    /// Closest triangle hit along `ray` within `[near, far]`
    ///
    /// Triangles are treated as double-sided.
    pub fn raycast(&self, ray: &Ray, near: f32, far: f32) -> Option<RayHit> {
        let root = self.root.as_ref()?;
        if near > far {
            return None;
        }

        let mut best: Option<RayHit> = None;
        let mut limit = far;
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if !ray_hits_box(ray, node.bounds(), near, limit) {
                continue;
            }
            match node {
                BvhNode::Leaf { start, count, .. } => {
                    for tri in &self.triangles[*start..*start + *count] {
                        if let Some(hit) = tri.raycast(ray, near, limit) {
                            limit = hit.distance;
                            best = Some(hit);
                        }
                    }
                }
                BvhNode::Internal { left, right, .. } => {
                    stack.push(right);
                    stack.push(left);
                }
            }
        }
        best
    }
}

/// Slab test: does the ray enter the box somewhere in `[near, far]`
fn ray_hits_box(ray: &Ray, bounds: &Aabb, near: f32, far: f32) -> bool {
    let mut t_min = near;
    let mut t_max = far;
    for axis in 0..3 {
        let origin = ray.origin.axis(axis);
        let dir = ray.direction.axis(axis);
        let lo = bounds.min.axis(axis);
        let hi = bounds.max.axis(axis);
        if dir.abs() < 1e-12 {
            if origin < lo || origin > hi {
                return false;
            }
            continue;
        }
        let inv = 1.0 / dir;
        let (t0, t1) = {
            let a = (lo - origin) * inv;
            let b = (hi - origin) * inv;
            if a <= b { (a, b) } else { (b, a) }
        };
        t_min = t_min.max(t0);
        t_max = t_max.min(t1);
        if t_min > t_max {
            return false;
        }
    }
    true
}
