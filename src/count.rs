use std::collections::HashMap;

use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::bdd::Bdd;
use crate::reference::Ref;

/// Satisfying-path counts, split by complement parity.
///
/// For every handle reachable from a root, `(odd, even)` buckets the paths
/// from that handle down to function value 1 by the parity of complemented
/// handles stood on along the way: a handle's own tag swaps the buckets of
/// everything below it. The two buckets together are the number of
/// satisfying paths, which is the branch weight the sampler needs; the
/// split additionally pins the handedness of input literals, where the
/// positive literal counts `(0, 1)` and the negative one `(1, 0)`.
///
/// Counts are exact big integers; the sampler only ever uses ratios, but
/// exactness makes a draw on a satisfiable function infallible.
pub struct PathCounts {
    counts: HashMap<Ref, (BigUint, BigUint)>,
}

impl PathCounts {
    /// Run the DP over everything reachable from `root`.
    ///
    /// The memo is keyed by polarity-resolved handles: a node reached
    /// through a complement edge is a different key than the same node
    /// reached plainly, mirroring how the complement tag changes the
    /// function the handle denotes. The traversal carries its own work
    /// stack, so very deep diagrams do not touch the call stack.
    pub fn compute(bdd: &Bdd, root: Ref) -> Self {
        let mut counts = HashMap::new();
        Self::visit(bdd, root, &mut counts);
        Self { counts }
    }

    fn visit(bdd: &Bdd, root: Ref, counts: &mut HashMap<Ref, (BigUint, BigUint)>) {
        // Post-order over polarity-resolved handles: a frame is revisited
        // with `children_done` once both resolved children are counted.
        let mut stack = vec![(root, false)];

        while let Some((node, children_done)) = stack.pop() {
            if counts.contains_key(&node) {
                continue;
            }

            if node == bdd.one {
                counts.insert(node, (BigUint::ZERO, BigUint::one()));
                continue;
            }
            if node == bdd.zero {
                counts.insert(node, (BigUint::ZERO, BigUint::ZERO));
                continue;
            }

            let complemented = node.is_complemented();
            let mut t = bdd.high(node.index());
            let mut e = bdd.low(node.index());
            if complemented {
                // Push the complement down so both children are counted
                // with the polarity this handle actually denotes
                t = -t;
                e = -e;
            }

            if !children_done {
                stack.push((node, true));
                stack.push((t, false));
                stack.push((e, false));
                continue;
            }

            let mut result = {
                let (t_odd, t_even) = &counts[&t];
                let (e_odd, e_even) = &counts[&e];
                (t_odd + e_odd, t_even + e_even)
            };
            if complemented {
                std::mem::swap(&mut result.0, &mut result.1);
            }
            counts.insert(node, result);
        }
    }

    /// Total satisfying paths below a polarity-resolved handle.
    ///
    /// Panics if `node` was never visited by the DP; the sampler resolves
    /// polarities exactly the way [`PathCounts::compute`] does, so every
    /// handle it asks about is present.
    pub fn total(&self, node: Ref) -> BigUint {
        let (odd, even) = &self.counts[&node];
        odd + even
    }

    /// The count of the requested parity for a polarity-resolved handle.
    pub fn count(&self, node: Ref, odd: bool) -> &BigUint {
        let entry = &self.counts[&node];
        if odd {
            &entry.0
        } else {
            &entry.1
        }
    }

    /// Whether any satisfying path leaves `root` at all.
    pub fn is_satisfiable(&self, root: Ref) -> bool {
        !self.total(root).is_zero()
    }
}
