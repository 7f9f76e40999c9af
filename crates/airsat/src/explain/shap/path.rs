//! Subset-path bookkeeping for the tree attribution recursion.
//!
//! A [`PathState`] tracks the features split on between the root and the
//! current node, together with the proportion of subsets of each size that
//! flow down (`pweight`). `extend` grows the path by one feature; `unwind`
//! removes one, restoring the weights to the state before that feature was
//! added; `unwound_sum` computes the same removal without mutating, which is
//! what the leaf contribution needs.

/// One feature on the current root-to-node path.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PathElement {
    /// Feature index, or -1 for the sentinel pushed at the root.
    pub feature: i32,
    /// Fraction of subsets excluding the feature that reach this branch.
    pub zero_fraction: f64,
    /// 1.0 if the sample follows this branch when the feature is included,
    /// 0.0 otherwise.
    pub one_fraction: f64,
    /// Permutation weight for subsets of size equal to this element's index.
    pub pweight: f64,
}

/// The path of unique features from the root to the current node.
#[derive(Debug, Clone)]
pub(crate) struct PathState {
    elems: Vec<PathElement>,
}

impl PathState {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            elems: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.elems.len()
    }

    #[inline]
    pub fn element(&self, i: usize) -> &PathElement {
        &self.elems[i]
    }

    /// Index of `feature` on the path, if it was split on before.
    pub fn find_feature(&self, feature: i32) -> Option<usize> {
        self.elems.iter().position(|e| e.feature == feature)
    }

    /// Appends a feature and redistributes subset weights.
    pub fn extend(&mut self, feature: i32, zero_fraction: f64, one_fraction: f64) {
        let d = self.elems.len();
        self.elems.push(PathElement {
            feature,
            zero_fraction,
            one_fraction,
            pweight: if d == 0 { 1.0 } else { 0.0 },
        });
        for i in (0..d).rev() {
            self.elems[i + 1].pweight +=
                one_fraction * self.elems[i].pweight * (i + 1) as f64 / (d + 1) as f64;
            self.elems[i].pweight =
                zero_fraction * self.elems[i].pweight * (d - i) as f64 / (d + 1) as f64;
        }
    }

    /// Removes the element at `path_index`, exactly inverting the `extend`
    /// that added it.
    pub fn unwind(&mut self, path_index: usize) {
        let u = self.elems.len() - 1;
        let one_fraction = self.elems[path_index].one_fraction;
        let zero_fraction = self.elems[path_index].zero_fraction;
        let mut next = self.elems[u].pweight;

        if one_fraction != 0.0 {
            for i in (0..u).rev() {
                let tmp = next * (u + 1) as f64 / ((i + 1) as f64 * one_fraction);
                next = self.elems[i].pweight
                    - tmp * zero_fraction * (u - i) as f64 / (u + 1) as f64;
                self.elems[i].pweight = tmp;
            }
        } else {
            for i in (0..u).rev() {
                self.elems[i].pweight *= (u + 1) as f64 / (zero_fraction * (u - i) as f64);
            }
        }

        for i in path_index..u {
            self.elems[i].feature = self.elems[i + 1].feature;
            self.elems[i].zero_fraction = self.elems[i + 1].zero_fraction;
            self.elems[i].one_fraction = self.elems[i + 1].one_fraction;
            // pweight is already the unwound weight at position i.
        }
        self.elems.pop();
    }

    /// Sum of permutation weights with the element at `path_index` removed,
    /// without mutating the path.
    pub fn unwound_sum(&self, path_index: usize) -> f64 {
        let u = self.elems.len() - 1;
        let one_fraction = self.elems[path_index].one_fraction;
        let zero_fraction = self.elems[path_index].zero_fraction;
        let mut next = self.elems[u].pweight;
        let mut total = 0.0;

        if one_fraction != 0.0 {
            for i in (0..u).rev() {
                let tmp = next * (u + 1) as f64 / ((i + 1) as f64 * one_fraction);
                total += tmp;
                next = self.elems[i].pweight
                    - tmp * zero_fraction * (u - i) as f64 / (u + 1) as f64;
            }
        } else {
            for i in (0..u).rev() {
                total += self.elems[i].pweight * (u + 1) as f64 / (zero_fraction * (u - i) as f64);
            }
        }
        total
    }
}
