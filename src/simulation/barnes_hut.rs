//! # Barnes–Hut Quadtree (2D)
//!
//! Approximates gravitational acceleration in an `N`-body system, replacing
//! the `O(N²)` all-pairs sum with an `O(N log N)` traversal while keeping the
//! same input (bodies) and output (one acceleration per body).
//!
//! ## Core Concepts
//!
//! A group of distant bodies is treated as one pseudo-body at their centre of
//! mass. For sufficiently far clusters, one interaction replaces many.
//!
//! - Space is recursively subdivided into 4 quadrants.
//! - Each quadrant becomes a node of the quadtree.
//! - Leaves hold their bodies directly; a leaf holds more than one body only
//!   once `MAX_DEPTH` is reached (coincident or nearly coincident bodies).
//! - Each node stores total mass, centre of mass and its bounding square.

use crate::simulation::states::{Body, NVec2};

/// Subdivision stops here; deeper bodies share a leaf bucket
const MAX_DEPTH: usize = 32;

/// A single quadtree node.
///
/// A node covers a square region of space and is either
/// - a leaf holding zero or more bodies in `bodies`, or
/// - an internal node whose bodies live in its `children`.
pub struct QuadNode {
    pub mass: f64,
    pub com: NVec2,
    pub bbox_min: NVec2,
    pub bbox_max: NVec2,
    pub children: [Option<usize>; 4], // indices into BarnesHutTree::nodes
    pub bodies: Vec<usize>, // body indices held by a leaf
}

impl QuadNode {
    fn empty(bbox_min: NVec2, bbox_max: NVec2) -> Self {
        Self {
            mass: 0.0,
            com: NVec2::zeros(),
            bbox_min,
            bbox_max,
            children: [None; 4],
            bodies: Vec::new(),
        }
    }

    fn is_leaf(&self) -> bool {
        self.children.iter().all(|c| c.is_none())
    }

    /// Point inside the node's square, edges included
    fn contains(&self, p: &NVec2) -> bool {
        p.x >= self.bbox_min.x && p.x <= self.bbox_max.x && p.y >= self.bbox_min.y && p.y <= self.bbox_max.y
    }
}

/// A Barnes–Hut quadtree built over one body slice.
///
/// Body indices stored in the tree refer to the slice passed to
/// [`BarnesHutTree::build`]; the same slice must be handed to
/// [`BarnesHutTree::force_on_body`].
pub struct BarnesHutTree {
    pub nodes: Vec<QuadNode>,
    pub root: usize,
}

impl BarnesHutTree {
    /// Build a quadtree from the current body positions.
    ///
    /// 1. Compute a bounding square enclosing all bodies.
    /// 2. Insert each body, subdividing leaves as needed.
    /// 3. Compute total mass and centre of mass bottom-up.
    pub fn build(bodies: &[Body]) -> Self {
        let (bbox_min, bbox_max) = compute_global_bbox(bodies);
        let root = 0;
        let mut tree = BarnesHutTree {
            nodes: vec![QuadNode::empty(bbox_min, bbox_max)],
            root,
        };

        for i in 0..bodies.len() {
            tree.insert_body(root, i, bodies, 0);
        }
        tree.compute_mass_and_com(bodies, root);
        tree
    }

    /// Net acceleration on body `i`.
    ///
    /// Nodes whose size-to-distance ratio is below `theta` are used as a
    /// single mass at their centre of mass; closer nodes are opened. `eps2` is
    /// the squared softening length.
    pub fn force_on_body(&self, i: usize, bodies: &[Body], g: f64, eps2: f64, theta: f64) -> NVec2 {
        let pos_i = bodies[i].x;
        let mut acc = NVec2::zeros();
        self.traverse_node(self.root, i, pos_i, bodies, g, eps2, theta, &mut acc);
        acc
    }

    // helpers ==============================================================================

    fn insert_body(&mut self, node_idx: usize, body_idx: usize, bodies: &[Body], depth: usize) {
        if self.nodes[node_idx].is_leaf() {
            // empty leaf, or too deep to split further: keep the body here
            if self.nodes[node_idx].bodies.is_empty() || depth >= MAX_DEPTH {
                self.nodes[node_idx].bodies.push(body_idx);
                return;
            }

            // occupied leaf: push the resident body one level down
            let resident = std::mem::take(&mut self.nodes[node_idx].bodies);
            for r in resident {
                self.descend(node_idx, r, bodies, depth);
            }
        }

        self.descend(node_idx, body_idx, bodies, depth);
    }

    /// Route a body into the matching child of an internal node, creating the
    /// child on first use.
    fn descend(&mut self, node_idx: usize, body_idx: usize, bodies: &[Body], depth: usize) {
        let bbox_min = self.nodes[node_idx].bbox_min;
        let bbox_max = self.nodes[node_idx].bbox_max;
        let quadrant = child_index_for_point(&bodies[body_idx].x, &bbox_min, &bbox_max);

        let child_idx = match self.nodes[node_idx].children[quadrant] {
            Some(idx) => idx,
            None => {
                let (cmin, cmax) = child_bbox(&bbox_min, &bbox_max, quadrant);
                let new_idx = self.nodes.len();
                self.nodes.push(QuadNode::empty(cmin, cmax));
                self.nodes[node_idx].children[quadrant] = Some(new_idx);
                new_idx
            }
        };

        self.insert_body(child_idx, body_idx, bodies, depth + 1);
    }

    /// Bottom-up pass filling every node's `mass` and `com`
    fn compute_mass_and_com(&mut self, bodies: &[Body], node_idx: usize) {
        let mut mass = 0.0;
        let mut weighted = NVec2::zeros();

        for &b in &self.nodes[node_idx].bodies {
            mass += bodies[b].m;
            weighted += bodies[b].x * bodies[b].m;
        }

        let children = self.nodes[node_idx].children;
        for child_idx in children.iter().flatten().copied() {
            self.compute_mass_and_com(bodies, child_idx);
            let cn = &self.nodes[child_idx];
            if cn.mass > 0.0 {
                mass += cn.mass;
                weighted += cn.com * cn.mass;
            }
        }

        let node = &mut self.nodes[node_idx];
        node.mass = mass;
        node.com = if mass > 0.0 { weighted / mass } else { NVec2::zeros() };
    }

    #[allow(clippy::too_many_arguments)]
    fn traverse_node(&self, node_idx: usize, body_idx: usize, pos_i: NVec2, bodies: &[Body], g: f64, eps2: f64, theta: f64, acc: &mut NVec2) {
        let node = &self.nodes[node_idx];

        if node.mass == 0.0 {
            return;
        }

        if node.is_leaf() {
            for &b in &node.bodies {
                if b == body_idx {
                    continue; // no self-interaction
                }
                *acc += softened_pull(bodies[b].x - pos_i, bodies[b].m, g, eps2);
            }
            return;
        }

        let size = node.bbox_max.x - node.bbox_min.x;
        let r = node.com - pos_i;
        let dist = r.norm();

        // a node holding the body itself is always opened, whatever theta
        if dist > 0.0 && size / dist < theta && !node.contains(&pos_i) {
            // far enough away: the whole node acts as one mass at its COM
            *acc += softened_pull(r, node.mass, g, eps2);
        } else {
            for child_idx in node.children.iter().flatten().copied() {
                self.traverse_node(child_idx, body_idx, pos_i, bodies, g, eps2, theta, acc);
            }
        }
    }
}

// helpers ===========================================================================

fn softened_pull(r: NVec2, m: f64, g: f64, eps2: f64) -> NVec2 {
    let inv_r = (r.norm_squared() + eps2).sqrt().recip();
    (g * m * inv_r * inv_r * inv_r) * r
}

/// Bounding square enclosing all bodies.
///
/// The axis-aligned box is widened to a square around its centre so every
/// node has one well-defined size for the opening criterion.
fn compute_global_bbox(bodies: &[Body]) -> (NVec2, NVec2) {
    if bodies.is_empty() {
        return (NVec2::zeros(), NVec2::zeros());
    }

    let mut min = NVec2::new(f64::INFINITY, f64::INFINITY);
    let mut max = NVec2::new(f64::NEG_INFINITY, f64::NEG_INFINITY);

    for b in bodies {
        min.x = min.x.min(b.x.x);
        min.y = min.y.min(b.x.y);
        max.x = max.x.max(b.x.x);
        max.y = max.y.max(b.x.y);
    }

    let center = (min + max) * 0.5;
    let half_extent = ((max - min) * 0.5).max();
    let half = NVec2::new(half_extent, half_extent);
    (center - half, center + half)
}

/// Quadrant of `p` inside a node's box.
///
/// - Bit 0 (value 1): x >= centre.x
/// - Bit 1 (value 2): y >= centre.y
fn child_index_for_point(p: &NVec2, bbox_min: &NVec2, bbox_max: &NVec2) -> usize {
    let center = (bbox_min + bbox_max) * 0.5;
    let mut idx = 0;

    if p.x >= center.x { idx |= 1; }
    if p.y >= center.y { idx |= 2; }

    idx
}

/// Box of quadrant `child_idx`, same bit layout as `child_index_for_point`
fn child_bbox(parent_min: &NVec2, parent_max: &NVec2, child_idx: usize) -> (NVec2, NVec2) {
    let center = (parent_min + parent_max) * 0.5;

    let mut min = *parent_min;
    let mut max = *parent_max;

    if (child_idx & 1) == 0 {
        max.x = center.x;
    } else {
        min.x = center.x;
    }

    if (child_idx & 2) == 0 {
        max.y = center.y;
    } else {
        min.y = center.y;
    }

    (min, max)
}
