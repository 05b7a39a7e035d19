//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! A binary tree of bounding boxes over a flat primitive slice. The tree
//! stores only indices into that slice, so the same BVH type serves scene
//! actors and bare shapes. Build is recursive; both queries walk the tree
//! with an explicit stack.

use lumo_core::{Actor, Shape};
use lumo_math::{Bounds3, Interval, Ray, Vec3};
use thiserror::Error;

/// Number of centroid buckets evaluated by the SAH split.
const SAH_BUCKETS: usize = 12;

/// Initial traversal stack capacity; grows if the tree is deeper.
const STACK_CAPACITY: usize = 64;

/// Anything the BVH can be built over.
pub trait Primitive {
    /// World-space bounding box.
    fn bounds(&self) -> Bounds3;

    /// Distance along `ray` to the closest hit inside the ray's range.
    fn intersect(&self, ray: &Ray) -> Option<f32>;
}

impl Primitive for Actor {
    fn bounds(&self) -> Bounds3 {
        Actor::bounds(self)
    }

    fn intersect(&self, ray: &Ray) -> Option<f32> {
        self.shape().intersect(ray)
    }
}

impl Primitive for Box<dyn Shape> {
    fn bounds(&self) -> Bounds3 {
        self.as_ref().bounds()
    }

    fn intersect(&self, ray: &Ray) -> Option<f32> {
        self.as_ref().intersect(ray)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BvhError {
    #[error("Cannot build a BVH over zero primitives")]
    NoPrimitives,
}

pub type BvhResult<T> = Result<T, BvhError>;

/// How a node's primitives are divided between its two children.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SplitMethod {
    /// Halve the range at the median centroid.
    Median,
    /// Bucketed surface area heuristic.
    #[default]
    Sah,
}

/// BVH build settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BvhConfig {
    /// Ranges at or below this size become leaves
    pub max_leaf_size: usize,
    /// Partitioning strategy for interior nodes
    pub split_method: SplitMethod,
}

impl Default for BvhConfig {
    fn default() -> Self {
        Self {
            max_leaf_size: 8,
            split_method: SplitMethod::Sah,
        }
    }
}

impl BvhConfig {
    pub fn with_max_leaf_size(mut self, max_leaf_size: usize) -> Self {
        self.max_leaf_size = max_leaf_size.max(1);
        self
    }

    pub fn with_split_method(mut self, split_method: SplitMethod) -> Self {
        self.split_method = split_method;
        self
    }
}

/// A ray/primitive hit reported by a BVH query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Index into the primitive slice
    pub primitive: usize,
    /// Distance along the ray
    pub distance: f32,
}

/// BVH node - either an interior node with two children or a leaf
/// covering a contiguous run of the index array.
#[derive(Debug)]
enum BvhNode {
    Interior {
        bounds: Bounds3,
        children: [Box<BvhNode>; 2],
    },
    Leaf {
        bounds: Bounds3,
        first: usize,
        count: usize,
    },
}

impl BvhNode {
    fn bounds(&self) -> &Bounds3 {
        match self {
            BvhNode::Interior { bounds, .. } | BvhNode::Leaf { bounds, .. } => bounds,
        }
    }
}

/// Read-only handle on a BVH node, for debug drawing and inspection.
#[derive(Debug, Clone, Copy)]
pub struct NodeView<'a> {
    node: &'a BvhNode,
}

impl<'a> NodeView<'a> {
    pub fn bounds(&self) -> Bounds3 {
        *self.node.bounds()
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.node, BvhNode::Leaf { .. })
    }

    /// Child 0 or 1 of an interior node.
    pub fn child(&self, i: usize) -> Option<NodeView<'a>> {
        match self.node {
            BvhNode::Interior { children, .. } => {
                children.get(i).map(|c| NodeView { node: c.as_ref() })
            }
            BvhNode::Leaf { .. } => None,
        }
    }

    /// Offset of a leaf's first entry in the index array; 0 for interior nodes.
    pub fn first(&self) -> usize {
        match self.node {
            BvhNode::Leaf { first, .. } => *first,
            BvhNode::Interior { .. } => 0,
        }
    }

    /// Number of primitives in a leaf; 0 for interior nodes.
    pub fn count(&self) -> usize {
        match self.node {
            BvhNode::Leaf { count, .. } => *count,
            BvhNode::Interior { .. } => 0,
        }
    }
}

/// Per-primitive data used only during the build.
#[derive(Clone, Copy)]
struct BuildEntry {
    index: usize,
    bounds: Bounds3,
    centroid: Vec3,
}

#[derive(Clone, Copy)]
struct SahBucket {
    count: usize,
    bounds: Bounds3,
}

/// Immutable BVH over a primitive slice.
///
/// Queries take the same slice the tree was built from; the tree itself
/// never owns primitives. Any change to the primitives means a full rebuild.
#[derive(Debug)]
pub struct Bvh {
    root: BvhNode,
    indices: Vec<usize>,
    node_count: usize,
}

impl Bvh {
    /// Build a BVH over `primitives`.
    pub fn build<P: Primitive>(primitives: &[P], config: &BvhConfig) -> BvhResult<Self> {
        if primitives.is_empty() {
            return Err(BvhError::NoPrimitives);
        }

        let mut entries: Vec<BuildEntry> = primitives
            .iter()
            .enumerate()
            .map(|(index, p)| {
                let bounds = p.bounds();
                BuildEntry {
                    index,
                    bounds,
                    centroid: bounds.center(),
                }
            })
            .collect();

        let mut node_count = 0;
        let root = build_range(&mut entries, 0, config, &mut node_count);
        let indices = entries.iter().map(|e| e.index).collect();

        log::info!(
            "Built {:?} BVH: {} primitives, {} nodes",
            config.split_method,
            primitives.len(),
            node_count
        );

        Ok(Self {
            root,
            indices,
            node_count,
        })
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Bounds of the whole tree.
    pub fn bounds(&self) -> Bounds3 {
        *self.root.bounds()
    }

    pub fn root(&self) -> NodeView<'_> {
        NodeView { node: &self.root }
    }

    /// Primitive index stored at slot `i` of the leaf index array.
    pub fn primitive_id(&self, i: usize) -> Option<usize> {
        self.indices.get(i).copied()
    }

    /// Depth-first pre-order walk over every node, with its depth.
    pub fn visit<'a>(&'a self, mut f: impl FnMut(NodeView<'a>, usize)) {
        let mut stack = vec![(&self.root, 0usize)];
        while let Some((node, depth)) = stack.pop() {
            f(NodeView { node }, depth);
            if let BvhNode::Interior { children, .. } = node {
                stack.push((children[1].as_ref(), depth + 1));
                stack.push((children[0].as_ref(), depth + 1));
            }
        }
    }

    /// Closest hit along `ray`, closer than `ray.t_max`.
    pub fn intersect<P: Primitive>(&self, primitives: &[P], ray: &Ray) -> Option<Hit> {
        let node_ray = NodeRay::new(ray);
        let mut closest = ray.t_max;
        let mut best = None;

        let mut stack: Vec<&BvhNode> = Vec::with_capacity(STACK_CAPACITY);
        stack.push(&self.root);

        while let Some(node) = stack.pop() {
            if !node_ray.hits(node.bounds(), Interval::new(ray.t_min, closest)) {
                continue;
            }

            match node {
                BvhNode::Interior { children, .. } => {
                    stack.push(children[1].as_ref());
                    stack.push(children[0].as_ref());
                }
                BvhNode::Leaf { first, count, .. } => {
                    for &id in &self.indices[*first..*first + *count] {
                        if let Some(t) = primitives[id].intersect(ray) {
                            // Equal distances go to the lowest index, as in the linear scan
                            let wins = t < closest
                                || (t == closest && best.map_or(true, |b: Hit| id < b.primitive));
                            if wins {
                                closest = t;
                                best = Some(Hit {
                                    primitive: id,
                                    distance: t,
                                });
                            }
                        }
                    }
                }
            }
        }

        best
    }

    /// True if anything blocks `ray` before `ray.t_max`.
    pub fn occluded<P: Primitive>(&self, primitives: &[P], ray: &Ray) -> bool {
        let node_ray = NodeRay::new(ray);

        let mut stack: Vec<&BvhNode> = Vec::with_capacity(STACK_CAPACITY);
        stack.push(&self.root);

        while let Some(node) = stack.pop() {
            if !node_ray.hits(node.bounds(), ray.range()) {
                continue;
            }

            match node {
                BvhNode::Interior { children, .. } => {
                    stack.push(children[1].as_ref());
                    stack.push(children[0].as_ref());
                }
                BvhNode::Leaf { first, count, .. } => {
                    let blocked = self.indices[*first..*first + *count]
                        .iter()
                        .any(|&id| primitives[id].intersect(ray).is_some());
                    if blocked {
                        return true;
                    }
                }
            }
        }

        false
    }
}

/// Closest hit by testing every primitive in order; the first of equal
/// distances wins.
pub fn intersect_linear<P: Primitive>(primitives: &[P], ray: &Ray) -> Option<Hit> {
    let mut closest = ray.t_max;
    let mut best = None;
    for (id, p) in primitives.iter().enumerate() {
        if let Some(t) = p.intersect(ray) {
            if t < closest {
                closest = t;
                best = Some(Hit {
                    primitive: id,
                    distance: t,
                });
            }
        }
    }
    best
}

/// Any-hit test by scanning every primitive.
pub fn occluded_linear<P: Primitive>(primitives: &[P], ray: &Ray) -> bool {
    primitives.iter().any(|p| p.intersect(ray).is_some())
}

fn build_range(
    entries: &mut [BuildEntry],
    first: usize,
    config: &BvhConfig,
    node_count: &mut usize,
) -> BvhNode {
    *node_count += 1;

    let bounds = entries
        .iter()
        .fold(Bounds3::EMPTY, |acc, e| acc.union(&e.bounds));
    let count = entries.len();
    let leaf = BvhNode::Leaf {
        bounds,
        first,
        count,
    };

    if count <= config.max_leaf_size {
        return leaf;
    }

    let mut centroid_bounds = Bounds3::EMPTY;
    for e in entries.iter() {
        centroid_bounds.inflate(e.centroid);
    }
    let axis = centroid_bounds.max_dim();

    // All centroids coincide: no split can separate them
    if centroid_bounds.max[axis] == centroid_bounds.min[axis] {
        return leaf;
    }

    let mid = match config.split_method {
        SplitMethod::Median => split_median(entries, axis),
        SplitMethod::Sah => match split_sah(entries, &bounds, &centroid_bounds, axis) {
            Some(mid) => mid,
            None => return leaf,
        },
    };

    let (left, right) = entries.split_at_mut(mid);
    let left = build_range(left, first, config, node_count);
    let right = build_range(right, first + mid, config, node_count);

    BvhNode::Interior {
        bounds: left.bounds().union(right.bounds()),
        children: [Box::new(left), Box::new(right)],
    }
}

fn split_median(entries: &mut [BuildEntry], axis: usize) -> usize {
    let mid = entries.len() / 2;
    entries.select_nth_unstable_by(mid, |a, b| a.centroid[axis].total_cmp(&b.centroid[axis]));
    mid
}

/// Partition by the cheapest of the bucket boundaries, or `None` if a leaf
/// costs no more than the best split.
fn split_sah(
    entries: &mut [BuildEntry],
    bounds: &Bounds3,
    centroid_bounds: &Bounds3,
    axis: usize,
) -> Option<usize> {
    let lo = centroid_bounds.min[axis];
    let extent = centroid_bounds.max[axis] - lo;
    let bucket_of = |c: Vec3| -> usize {
        let b = ((c[axis] - lo) / extent * SAH_BUCKETS as f32) as usize;
        b.min(SAH_BUCKETS - 1)
    };

    let mut buckets = [SahBucket {
        count: 0,
        bounds: Bounds3::EMPTY,
    }; SAH_BUCKETS];
    for e in entries.iter() {
        let b = &mut buckets[bucket_of(e.centroid)];
        b.count += 1;
        b.bounds = b.bounds.union(&e.bounds);
    }

    let mut best_split = 0;
    let mut min_cost = f32::INFINITY;
    for split in 0..SAH_BUCKETS - 1 {
        let (left, right) = buckets.split_at(split + 1);
        let cost = side_cost(left) + side_cost(right);
        if cost < min_cost {
            min_cost = cost;
            best_split = split;
        }
    }

    let leaf_cost = entries.len() as f32;
    let split_cost = 0.5 + min_cost / bounds.area();
    if leaf_cost <= split_cost {
        return None;
    }

    // In-place partition: entries in buckets <= best_split go first
    let mut mid = 0;
    for i in 0..entries.len() {
        if bucket_of(entries[i].centroid) <= best_split {
            entries.swap(i, mid);
            mid += 1;
        }
    }

    if mid == 0 || mid == entries.len() {
        Some(split_median(entries, axis))
    } else {
        Some(mid)
    }
}

fn side_cost(buckets: &[SahBucket]) -> f32 {
    let (count, bounds) = buckets
        .iter()
        .fold((0usize, Bounds3::EMPTY), |(n, b), bucket| {
            (n + bucket.count, b.union(&bucket.bounds))
        });
    bounds.area() * count as f32
}

/// Ray data precomputed once per traversal for slab tests.
struct NodeRay {
    origin: Vec3,
    inv_dir: Vec3,
    /// 1 where the direction is negative: index of the near slab plane
    neg: [usize; 3],
}

impl NodeRay {
    fn new(ray: &Ray) -> Self {
        let inv_dir = ray.direction.recip();
        Self {
            origin: ray.origin,
            inv_dir,
            neg: [
                (inv_dir.x < 0.0) as usize,
                (inv_dir.y < 0.0) as usize,
                (inv_dir.z < 0.0) as usize,
            ],
        }
    }

    #[inline]
    fn hits(&self, bounds: &Bounds3, range: Interval) -> bool {
        let mut t_near = f32::NEG_INFINITY;
        let mut t_far = f32::INFINITY;
        for axis in 0..3 {
            let near = (bounds[self.neg[axis]][axis] - self.origin[axis]) * self.inv_dir[axis];
            let far = (bounds[1 - self.neg[axis]][axis] - self.origin[axis]) * self.inv_dir[axis];
            // NaN (origin on a slab plane of a zero direction) is ignored by max/min
            t_near = t_near.max(near);
            t_far = t_far.min(far);
        }
        t_near <= t_far && t_near <= range.max && t_far > range.min
    }
}
