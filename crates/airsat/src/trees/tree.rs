//! Single decision tree as structure-of-arrays.

use super::{NodeId, SampleRow};

// =============================================================================
// TreeValidationError
// =============================================================================

/// Structural validation errors for [`Tree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeValidationError {
    /// Tree has no nodes.
    EmptyTree,
    /// A child pointer references an out-of-bounds node.
    ChildOutOfBounds {
        node: NodeId,
        side: &'static str,
        child: NodeId,
        n_nodes: usize,
    },
    /// A node references itself as a child.
    SelfLoop { node: NodeId },
    /// A node was reached by more than one path.
    DuplicateVisit { node: NodeId },
    /// A cycle was detected during traversal.
    CycleDetected { node: NodeId },
    /// A node exists in storage but is unreachable from the root.
    UnreachableNode { node: NodeId },
}

// =============================================================================
// Tree
// =============================================================================

/// Immutable binary decision tree stored as flat parallel arrays.
///
/// Child indices are local to this tree (0 = root). Split nodes compare
/// `sample[split_index] < threshold`; `NaN` follows the node's default
/// direction. Leaf nodes carry a scalar margin contribution.
///
/// `covers` (the number of training samples that reached each node) is
/// optional and only required for attribution; prediction ignores it.
#[derive(Debug, Clone)]
pub struct Tree {
    split_indices: Box<[u32]>,
    split_thresholds: Box<[f32]>,
    left_children: Box<[u32]>,
    right_children: Box<[u32]>,
    default_left: Box<[bool]>,
    is_leaf: Box<[bool]>,
    leaf_values: Box<[f32]>,
    covers: Option<Box<[f32]>>,
}

impl Tree {
    /// Creates a tree from parallel arrays.
    ///
    /// All arrays must have the same length (number of nodes). Split fields
    /// of leaf nodes and leaf values of split nodes are ignored.
    pub fn new(
        split_indices: Vec<u32>,
        split_thresholds: Vec<f32>,
        left_children: Vec<u32>,
        right_children: Vec<u32>,
        default_left: Vec<bool>,
        is_leaf: Vec<bool>,
        leaf_values: Vec<f32>,
    ) -> Self {
        let n_nodes = split_indices.len();
        debug_assert_eq!(n_nodes, split_thresholds.len());
        debug_assert_eq!(n_nodes, left_children.len());
        debug_assert_eq!(n_nodes, right_children.len());
        debug_assert_eq!(n_nodes, default_left.len());
        debug_assert_eq!(n_nodes, is_leaf.len());
        debug_assert_eq!(n_nodes, leaf_values.len());

        Self {
            split_indices: split_indices.into_boxed_slice(),
            split_thresholds: split_thresholds.into_boxed_slice(),
            left_children: left_children.into_boxed_slice(),
            right_children: right_children.into_boxed_slice(),
            default_left: default_left.into_boxed_slice(),
            is_leaf: is_leaf.into_boxed_slice(),
            leaf_values: leaf_values.into_boxed_slice(),
            covers: None,
        }
    }

    /// Sets per-node covers (builder pattern).
    pub fn with_covers(mut self, covers: Vec<f32>) -> Self {
        debug_assert_eq!(covers.len(), self.n_nodes());
        self.covers = Some(covers.into_boxed_slice());
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Number of nodes in the tree.
    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.is_leaf.len()
    }

    /// Whether `node` is a leaf.
    #[inline]
    pub fn is_leaf(&self, node: NodeId) -> bool {
        self.is_leaf[node as usize]
    }

    /// Feature index tested at a split node.
    #[inline]
    pub fn split_index(&self, node: NodeId) -> u32 {
        self.split_indices[node as usize]
    }

    /// Threshold tested at a split node.
    #[inline]
    pub fn split_threshold(&self, node: NodeId) -> f32 {
        self.split_thresholds[node as usize]
    }

    /// Left child of a split node.
    #[inline]
    pub fn left_child(&self, node: NodeId) -> NodeId {
        self.left_children[node as usize]
    }

    /// Right child of a split node.
    #[inline]
    pub fn right_child(&self, node: NodeId) -> NodeId {
        self.right_children[node as usize]
    }

    /// Default direction for missing values at a split node.
    #[inline]
    pub fn default_left(&self, node: NodeId) -> bool {
        self.default_left[node as usize]
    }

    /// Margin contribution at a leaf node.
    #[inline]
    pub fn leaf_value(&self, node: NodeId) -> f32 {
        self.leaf_values[node as usize]
    }

    /// Per-node covers, if attached.
    #[inline]
    pub fn covers(&self) -> Option<&[f32]> {
        self.covers.as_deref()
    }

    // =========================================================================
    // Traversal
    // =========================================================================

    /// Walks from the root to the leaf this sample falls into.
    #[inline]
    pub fn traverse_to_leaf<S: SampleRow>(&self, sample: &S) -> NodeId {
        let mut node: NodeId = 0;
        while !self.is_leaf(node) {
            let value = sample.feature(self.split_index(node) as usize);
            node = if value.is_nan() {
                if self.default_left(node) {
                    self.left_child(node)
                } else {
                    self.right_child(node)
                }
            } else if value < self.split_threshold(node) {
                self.left_child(node)
            } else {
                self.right_child(node)
            };
        }
        node
    }

    /// Leaf value for a single sample.
    pub fn predict_row<S: SampleRow>(&self, sample: &S) -> f32 {
        self.leaf_value(self.traverse_to_leaf(sample))
    }

    /// Maximum number of edges on any root-to-leaf path.
    pub fn max_depth(&self) -> usize {
        let mut max = 0;
        let mut stack: Vec<(NodeId, usize)> = vec![(0, 0)];
        while let Some((node, depth)) = stack.pop() {
            if self.is_leaf(node) {
                max = max.max(depth);
            } else {
                stack.push((self.left_child(node), depth + 1));
                stack.push((self.right_child(node), depth + 1));
            }
        }
        max
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Validates basic structural invariants.
    ///
    /// Every node must be reachable from the root exactly once, and child
    /// pointers must stay in bounds. Run on untrusted input such as model
    /// files before the tree is traversed.
    pub fn validate(&self) -> Result<(), TreeValidationError> {
        let n_nodes = self.n_nodes();
        if n_nodes == 0 {
            return Err(TreeValidationError::EmptyTree);
        }

        // Iterative DFS with color marking.
        // 0 = unvisited, 1 = visiting, 2 = done
        let mut color = vec![0u8; n_nodes];
        let mut stack: Vec<(NodeId, u8)> = vec![(0, 0)];

        while let Some((node, phase)) = stack.pop() {
            let node_usize = node as usize;

            match phase {
                0 => {
                    match color[node_usize] {
                        0 => {}
                        1 => return Err(TreeValidationError::CycleDetected { node }),
                        2 => return Err(TreeValidationError::DuplicateVisit { node }),
                        _ => unreachable!(),
                    }

                    color[node_usize] = 1;
                    stack.push((node, 1));

                    if !self.is_leaf(node) {
                        let left = self.left_child(node);
                        let right = self.right_child(node);

                        if left == node || right == node {
                            return Err(TreeValidationError::SelfLoop { node });
                        }

                        if left as usize >= n_nodes {
                            return Err(TreeValidationError::ChildOutOfBounds {
                                node,
                                side: "left",
                                child: left,
                                n_nodes,
                            });
                        }
                        if right as usize >= n_nodes {
                            return Err(TreeValidationError::ChildOutOfBounds {
                                node,
                                side: "right",
                                child: right,
                                n_nodes,
                            });
                        }

                        stack.push((right, 0));
                        stack.push((left, 0));
                    }
                }
                1 => {
                    color[node_usize] = 2;
                }
                _ => unreachable!(),
            }
        }

        for (i, &c) in color.iter().enumerate() {
            if c == 0 {
                return Err(TreeValidationError::UnreachableNode { node: i as u32 });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// root: feat0 < 0.5 ? leaf(1.0) : leaf(2.0), missing goes left.
    fn stump() -> Tree {
        Tree::new(
            vec![0, 0, 0],
            vec![0.5, 0.0, 0.0],
            vec![1, 0, 0],
            vec![2, 0, 0],
            vec![true, true, true],
            vec![false, true, true],
            vec![0.0, 1.0, 2.0],
        )
    }

    #[test]
    fn predict_simple_tree() {
        let tree = stump();
        assert_eq!(tree.predict_row(&[0.3]), 1.0);
        assert_eq!(tree.predict_row(&[0.7]), 2.0);
        assert_eq!(tree.predict_row(&[0.5]), 2.0);
    }

    #[test]
    fn missing_follows_default_direction() {
        let tree = stump();
        assert_eq!(tree.predict_row(&[f32::NAN]), 1.0);

        let right_default = Tree::new(
            vec![0, 0, 0],
            vec![0.5, 0.0, 0.0],
            vec![1, 0, 0],
            vec![2, 0, 0],
            vec![false, true, true],
            vec![false, true, true],
            vec![0.0, 1.0, 2.0],
        );
        assert_eq!(right_default.predict_row(&[f32::NAN]), 2.0);
    }

    #[test]
    fn traversal_works_on_array_views() {
        use ndarray::array;

        let tree = stump();
        let features = array![[0.3f32, 0.7]];
        assert_eq!(tree.predict_row(&features.column(0)), 1.0);
        assert_eq!(tree.predict_row(&features.column(1)), 2.0);
    }

    #[test]
    fn max_depth_counts_edges() {
        assert_eq!(stump().max_depth(), 1);

        let single_leaf = Tree::new(
            vec![0],
            vec![0.0],
            vec![0],
            vec![0],
            vec![true],
            vec![true],
            vec![0.5],
        );
        assert_eq!(single_leaf.max_depth(), 0);
    }

    #[test]
    fn validate_accepts_well_formed_tree() {
        assert_eq!(stump().validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_empty_tree() {
        let tree = Tree::new(
            vec![],
            vec![],
            vec![],
            vec![],
            vec![],
            vec![],
            vec![],
        );
        assert_eq!(tree.validate(), Err(TreeValidationError::EmptyTree));
    }

    #[test]
    fn validate_rejects_out_of_bounds_child() {
        let tree = Tree::new(
            vec![0, 0],
            vec![0.5, 0.0],
            vec![1, 0],
            vec![9, 0],
            vec![true, true],
            vec![false, true],
            vec![0.0, 1.0],
        );
        assert!(matches!(
            tree.validate(),
            Err(TreeValidationError::ChildOutOfBounds { side: "right", child: 9, .. })
        ));
    }

    #[test]
    fn validate_rejects_self_loop() {
        let tree = Tree::new(
            vec![0, 0],
            vec![0.5, 0.0],
            vec![0, 0],
            vec![1, 0],
            vec![true, true],
            vec![false, true],
            vec![0.0, 1.0],
        );
        assert!(matches!(
            tree.validate(),
            Err(TreeValidationError::SelfLoop { node: 0 })
        ));
    }

    #[test]
    fn validate_rejects_shared_child() {
        // Both children of the root point at node 1.
        let tree = Tree::new(
            vec![0, 0],
            vec![0.5, 0.0],
            vec![1, 0],
            vec![1, 0],
            vec![true, true],
            vec![false, true],
            vec![0.0, 1.0],
        );
        assert!(matches!(
            tree.validate(),
            Err(TreeValidationError::DuplicateVisit { node: 1 })
        ));
    }

    #[test]
    fn validate_rejects_unreachable_node() {
        // Node 3 exists but no edge reaches it.
        let tree = Tree::new(
            vec![0, 0, 0, 0],
            vec![0.5, 0.0, 0.0, 0.0],
            vec![1, 0, 0, 0],
            vec![2, 0, 0, 0],
            vec![true; 4],
            vec![false, true, true, true],
            vec![0.0, 1.0, 2.0, 3.0],
        );
        assert_eq!(
            tree.validate(),
            Err(TreeValidationError::UnreachableNode { node: 3 })
        );
    }
}
