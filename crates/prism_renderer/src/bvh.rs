//! Bounding Volume Hierarchy over the scene's triangles.
//!
//! Nodes live in a flat arena. A branch's children are always stored next
//! to each other, so only the left index is kept and the right child is
//! `left + 1`. Leaves reference a contiguous range of a triangle-index
//! permutation owned by the BVH; the scene's triangle list is never
//! reordered.

use prism_core::Triangle;
use prism_math::{ray_triangle, Aabb, Interval, Ray, TriangleHit, Vec3};

/// Nodes with this many triangles or fewer are never split.
const MAX_LEAF_SIZE: usize = 2;

/// One node of the flat BVH arena.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BvhNode {
    pub bounds: Aabb,
    /// Index of the left child; the right child is `left + 1`
    pub left: usize,
    /// First entry of this node's range in the triangle-index array
    pub first: usize,
    /// Number of triangles in the range; zero for branches
    pub count: usize,
}

impl BvhNode {
    fn new(first: usize, count: usize) -> Self {
        Self {
            bounds: Aabb::EMPTY,
            left: 0,
            first,
            count,
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.count > 0
    }
}

/// Triangle BVH built by midpoint splits on the longest axis.
#[derive(Debug, Clone)]
pub struct Bvh {
    nodes: Vec<BvhNode>,
    indices: Vec<usize>,
}

impl Bvh {
    /// Build a BVH over `triangles`. Returns `None` for an empty list.
    pub fn build(triangles: &[Triangle]) -> Option<Self> {
        if triangles.is_empty() {
            return None;
        }

        let n = triangles.len();
        let centroids: Vec<Vec3> = triangles.iter().map(Triangle::centroid).collect();

        let mut bvh = Self {
            nodes: Vec::with_capacity(2 * n),
            indices: (0..n).collect(),
        };
        bvh.nodes.push(BvhNode::new(0, n));
        bvh.update_bounds(0, triangles);
        bvh.subdivide(0, triangles, &centroids);

        log::debug!("BVH built: {} nodes for {} triangles", bvh.nodes.len(), n);
        Some(bvh)
    }

    pub fn nodes(&self) -> &[BvhNode] {
        &self.nodes
    }

    /// Triangle-index permutation the leaves point into.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Recompute a node's box from the vertices of its triangles.
    fn update_bounds(&mut self, node_idx: usize, triangles: &[Triangle]) {
        let node = self.nodes[node_idx];
        let mut bounds = Aabb::EMPTY;
        for &tri in &self.indices[node.first..node.first + node.count] {
            for v in triangles[tri].vertices {
                bounds.add_point(v);
            }
        }
        self.nodes[node_idx].bounds = bounds.padded();
    }

    fn subdivide(&mut self, node_idx: usize, triangles: &[Triangle], centroids: &[Vec3]) {
        let node = self.nodes[node_idx];
        if node.count <= MAX_LEAF_SIZE {
            return;
        }

        let axis = node.bounds.longest_axis();
        let split = node.bounds.axis_interval(axis).center();

        // Two-pointer partition: [first, i) goes left, [i, end) goes right
        let mut i = node.first;
        let mut end = node.first + node.count;
        while i < end {
            if centroids[self.indices[i]][axis] < split {
                i += 1;
            } else {
                end -= 1;
                self.indices.swap(i, end);
            }
        }

        let left_count = i - node.first;
        if left_count == 0 || left_count == node.count {
            return;
        }

        let left = self.nodes.len();
        self.nodes.push(BvhNode::new(node.first, left_count));
        self.nodes.push(BvhNode::new(i, node.count - left_count));
        self.nodes[node_idx].left = left;
        self.nodes[node_idx].count = 0;

        self.update_bounds(left, triangles);
        self.update_bounds(left + 1, triangles);
        self.subdivide(left, triangles, centroids);
        self.subdivide(left + 1, triangles, centroids);
    }

    /// Closest triangle hit within `ray_t`, as (triangle index, hit).
    pub fn hit(&self, triangles: &[Triangle], ray: &Ray, ray_t: Interval) -> Option<(usize, TriangleHit)> {
        let mut range = ray_t;
        let mut closest = None;
        self.hit_node(0, triangles, ray, &mut range, &mut closest);
        closest
    }

    fn hit_node(
        &self,
        node_idx: usize,
        triangles: &[Triangle],
        ray: &Ray,
        range: &mut Interval,
        closest: &mut Option<(usize, TriangleHit)>,
    ) {
        let node = &self.nodes[node_idx];
        if !node.bounds.hit(ray, *range) {
            return;
        }

        if node.is_leaf() {
            for &tri in &self.indices[node.first..node.first + node.count] {
                let [v1, v2, v3] = triangles[tri].vertices;
                if let Some(hit) = ray_triangle(ray, *range, v1, v2, v3) {
                    range.max = hit.t;
                    *closest = Some((tri, hit));
                }
            }
            return;
        }

        // Both children are visited; the shrinking range prunes the second
        self.hit_node(node.left, triangles, ray, range, closest);
        self.hit_node(node.left + 1, triangles, ray, range, closest);
    }

    /// True if any triangle is hit within `ray_t`.
    pub fn occluded(&self, triangles: &[Triangle], ray: &Ray, ray_t: Interval) -> bool {
        self.occluded_node(0, triangles, ray, ray_t)
    }

    fn occluded_node(&self, node_idx: usize, triangles: &[Triangle], ray: &Ray, ray_t: Interval) -> bool {
        let node = &self.nodes[node_idx];
        if !node.bounds.hit(ray, ray_t) {
            return false;
        }

        if node.is_leaf() {
            return self.indices[node.first..node.first + node.count]
                .iter()
                .any(|&tri| {
                    let [v1, v2, v3] = triangles[tri].vertices;
                    ray_triangle(ray, ray_t, v1, v2, v3).is_some()
                });
        }

        self.occluded_node(node.left, triangles, ray, ray_t)
            || self.occluded_node(node.left + 1, triangles, ray, ray_t)
    }
}
