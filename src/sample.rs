use log::warn;
use num_bigint::RandBigInt;
use num_traits::Zero;
use rand::Rng;

use crate::bdd::Bdd;
use crate::count::PathCounts;
use crate::reference::Ref;

/// Attempts per assignment before giving up and emitting the all-false
/// default. With exact path counts a draw on a satisfiable function cannot
/// fail, so the budget only matters for unsatisfiable roots.
pub const MAX_ATTEMPTS: usize = 10;

/// Draws uniform random satisfying assignments from a BDD root.
///
/// Each draw walks the diagram top-down with the complement tag of every
/// handle pushed into its children, choosing the then- or else-branch with
/// probability proportional to the number of satisfying paths below it, as
/// recorded in [`PathCounts`]. The walk lands on the constant-one terminal
/// exactly when the assignment it wrote satisfies the function, so the
/// draw is uniform over satisfying paths. Variables the walk never reaches
/// keep their default `false`; they are don't-cares of the chosen path.
pub struct Sampler<'a, R> {
    bdd: &'a Bdd,
    counts: &'a PathCounts,
    rng: R,
}

impl<'a, R: Rng> Sampler<'a, R> {
    pub fn new(bdd: &'a Bdd, counts: &'a PathCounts, rng: R) -> Self {
        Self { bdd, counts, rng }
    }

    /// Draw `n` assignments over `num_inputs` literals from `root`.
    ///
    /// A draw that exhausts its retry budget leaves the all-false default
    /// at that index; it never aborts the batch.
    pub fn draw_many(&mut self, root: Ref, num_inputs: usize, n: usize) -> Vec<Vec<bool>> {
        (0..n)
            .map(|i| {
                let mut assignment = vec![false; num_inputs];
                let mut success = false;
                for _ in 0..MAX_ATTEMPTS {
                    if self.draw(root, &mut assignment) {
                        success = true;
                        break;
                    }
                }
                if !success {
                    warn!("draw {} exhausted its retry budget, keeping the all-false default", i);
                    assignment.fill(false);
                }
                assignment
            })
            .collect()
    }

    fn draw(&mut self, root: Ref, assignment: &mut [bool]) -> bool {
        let mut node = root;
        loop {
            if node == self.bdd.one {
                return true;
            }
            if node == self.bdd.zero {
                return false;
            }

            let v = self.bdd.variable(node.index());
            let mut t = self.bdd.high(node.index());
            let mut e = self.bdd.low(node.index());
            if node.is_complemented() {
                t = -t;
                e = -e;
            }

            let w_then = self.counts.total(t);
            let w_else = self.counts.total(e);
            let total = &w_then + &w_else;

            let take_then = if total.is_zero() {
                // No satisfying path below; fair coin, the walk ends on zero
                self.rng.gen()
            } else {
                self.rng.gen_biguint_below(&total) < w_then
            };

            node = if take_then {
                assignment[(v - 1) as usize] = true;
                t
            } else {
                assignment[(v - 1) as usize] = false;
                e
            };
        }
    }
}
