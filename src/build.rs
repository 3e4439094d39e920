use std::cmp::Reverse;

use log::{debug, info};
use thiserror::Error;

use crate::aig::{Aag, Literal};
use crate::bdd::Bdd;
use crate::reference::Ref;

/// Above this many inputs, the manager is created with a structural
/// variable order instead of the input order.
pub const REORDER_THRESHOLD: usize = 100;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("AND gate {gate}: operand {literal} references node {index} before it is defined")]
    UndefinedOperand { gate: usize, literal: u32, index: u32 },
    #[error("output literal {literal} references undefined node {index}")]
    UndefinedOutput { literal: u32, index: u32 },
}

/// A constraint circuit translated into one BDD root.
pub struct Circuit {
    pub bdd: Bdd,
    pub root: Ref,
    pub num_inputs: usize,
    /// Set when the graph had no AND gates; the root is constant one and
    /// every assignment is a solution.
    pub no_constraint: bool,
}

/// Translate an AAG into a BDD.
///
/// Input `k` becomes BDD variable `k + 1`, bound at AAG node index
/// `literal / 2`. AND operands resolve through the node table, with the
/// polarity bit turning into a complement edge; an operand with node index
/// 0 is the constant-one terminal, complemented when the literal is odd.
/// The output literal's polarity complements the root the same way.
pub fn build(aag: &Aag) -> Result<Circuit, BuildError> {
    let mut bdd = if aag.header.i > REORDER_THRESHOLD {
        let order = structural_order(aag);
        debug!("using a structural variable order for {} inputs", aag.header.i);
        Bdd::with_order(20, &order)
    } else {
        Bdd::default()
    };

    let mut nodes: Vec<Option<Ref>> = vec![None; aag.header.m];

    for (k, literal) in aag.inputs.iter().enumerate() {
        let var = bdd.mk_var(k as u32 + 1);
        nodes[(literal.variable() - 1) as usize] = Some(var);
    }

    for (gate, and) in aag.ands.iter().enumerate() {
        let left = resolve(&bdd, &nodes, and.inputs[0], gate)?;
        let right = resolve(&bdd, &nodes, and.inputs[1], gate)?;
        let out = bdd.apply_and(left, right);
        nodes[(and.output.variable() - 1) as usize] = Some(out);
    }

    let root = if aag.is_trivially_true() {
        bdd.one
    } else {
        let output = aag.output;
        let base = if output.variable() == 0 {
            bdd.one
        } else {
            nodes[(output.variable() - 1) as usize].ok_or(BuildError::UndefinedOutput {
                literal: output.get(),
                index: output.variable(),
            })?
        };
        if output.is_negated() {
            -base
        } else {
            base
        }
    };

    info!(
        "built a BDD of {} nodes from {} inputs and {} gates",
        bdd.size(root),
        aag.header.i,
        aag.header.a
    );

    Ok(Circuit {
        bdd,
        root,
        num_inputs: aag.header.i,
        no_constraint: aag.is_trivially_true(),
    })
}

fn resolve(bdd: &Bdd, nodes: &[Option<Ref>], literal: Literal, gate: usize) -> Result<Ref, BuildError> {
    if literal.variable() == 0 {
        // Constant operand: node index 0 is the one terminal
        return Ok(if literal.is_negated() { bdd.zero } else { bdd.one });
    }
    let node = nodes[(literal.variable() - 1) as usize].ok_or(BuildError::UndefinedOperand {
        gate,
        literal: literal.get(),
        index: literal.variable(),
    })?;
    Ok(if literal.is_negated() { -node } else { node })
}

/// Variable order for large instances: wider variables first, high bits
/// first, ties by input position. This is the effective key of the
/// upstream depth-first AAG ordering, which groups the bits of one
/// multi-bit variable together near the top of the diagram.
fn structural_order(aag: &Aag) -> Vec<u32> {
    let (_, widths) = aag.input_shape();
    let mut positions: Vec<usize> = (0..aag.header.i).collect();
    positions.sort_by_key(|&k| {
        let (x, y) = aag.symbols[k];
        (Reverse(widths[x]), Reverse(y), k)
    });
    positions.into_iter().map(|k| k as u32 + 1).collect()
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_build_and_gate() {
        // f = var_0[0] & var_0[1]
        let text = "aag 3 2 0 1 1\n2\n4\n6\n6 2 4\ni0 var_0[0]\ni1 var_0[1]\n";
        let aag = Aag::parse(text, "t").unwrap();
        let circuit = build(&aag).unwrap();

        assert!(!circuit.no_constraint);
        assert_eq!(circuit.num_inputs, 2);
        assert!(circuit.bdd.evaluate(circuit.root, &[true, true]));
        assert!(!circuit.bdd.evaluate(circuit.root, &[true, false]));
        assert!(!circuit.bdd.evaluate(circuit.root, &[false, true]));
    }

    #[test]
    fn test_build_negated_operand_and_output() {
        // Output literal 7 complements gate 6 = 2 & 5, so f = !(a & !b)
        let text = "aag 3 2 0 1 1\n2\n4\n7\n6 2 5\n";
        let aag = Aag::parse(text, "t").unwrap();
        let circuit = build(&aag).unwrap();

        assert!(!circuit.bdd.evaluate(circuit.root, &[true, false]));
        assert!(circuit.bdd.evaluate(circuit.root, &[true, true]));
        assert!(circuit.bdd.evaluate(circuit.root, &[false, false]));
    }

    #[test]
    fn test_no_gates_is_trivially_true() {
        // The output literal is ignored when there are no gates
        let text = "aag 2 2 0 1 0\n2\n4\n5\n";
        let aag = Aag::parse(text, "t").unwrap();
        let circuit = build(&aag).unwrap();

        assert!(circuit.no_constraint);
        assert!(circuit.bdd.is_one(circuit.root));
    }

    #[test]
    fn test_constant_operand() {
        // 6 = 2 & 1: literal 1 is the complemented constant, so f = a & 0
        let text = "aag 3 2 0 1 1\n2\n4\n6\n6 2 1\n";
        let aag = Aag::parse(text, "t").unwrap();
        let circuit = build(&aag).unwrap();
        assert!(circuit.bdd.is_zero(circuit.root));
    }

    #[test]
    fn test_undefined_operand_is_an_error() {
        let text = "aag 4 2 0 1 1\n2\n4\n6\n6 2 8\n";
        let aag = Aag::parse(text, "t").unwrap();
        assert!(matches!(build(&aag), Err(BuildError::UndefinedOperand { .. })));
    }

    #[test]
    fn test_structural_order_groups_wide_variables_first() {
        // var_1 is 3 bits wide, var_0 is 1 bit
        let text = "aag 4 4 0 1 0\n2\n4\n6\n8\n2\ni0 var_0[0]\ni1 var_1[0]\ni2 var_1[1]\ni3 var_1[2]\n";
        let aag = Aag::parse(text, "t").unwrap();
        let order = structural_order(&aag);
        // High bits of the wide variable first, the narrow variable last
        assert_eq!(order, vec![4, 3, 2, 1]);
    }
}
