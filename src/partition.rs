use std::collections::HashMap;

use log::debug;

use crate::verilog::ConstraintModule;

/// Disjoint-set forest with path compression and union by rank.
pub struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<usize>,
}

impl UnionFind {
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    pub fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            self.parent[x] = self.find(self.parent[x]);
        }
        self.parent[x]
    }

    pub fn unite(&mut self, x: usize, y: usize) {
        let root_x = self.find(x);
        let root_y = self.find(y);
        if root_x == root_y {
            return;
        }
        if self.rank[root_x] < self.rank[root_y] {
            self.parent[root_x] = root_y;
        } else if self.rank[root_x] > self.rank[root_y] {
            self.parent[root_y] = root_x;
        } else {
            self.parent[root_y] = root_x;
            self.rank[root_x] += 1;
        }
    }
}

/// Connected components of the variable-sharing graph.
///
/// Two variables are in the same component when some constraint mentions
/// both. A constraint belongs to the component of its variables; a
/// constraint mentioning no variable at all goes to component 0, where it
/// is trivially satisfied alongside whatever else lives there.
/// Components are numbered densely, by first appearance over ascending
/// variable ordinals.
#[derive(Debug)]
pub struct Partition {
    pub variable_to_set: Vec<usize>,
    pub constraint_to_set: Vec<usize>,
    pub set_count: usize,
}

impl Partition {
    pub fn build(module: &ConstraintModule) -> Self {
        let mut uf = UnionFind::new(module.num_variables);
        let mut constraint_to_variable = vec![None; module.num_constraints];

        for c in 0..module.num_constraints {
            let variables = module.constraint_variables(c);
            if let Some((&first, rest)) = variables.split_first() {
                for &other in rest {
                    uf.unite(first, other);
                }
                constraint_to_variable[c] = Some(first);
            }
        }

        let mut variable_to_set = vec![0; module.num_variables];
        let mut set_ids: HashMap<usize, usize> = HashMap::new();
        for x in 0..module.num_variables {
            let root = uf.find(x);
            let next_id = set_ids.len();
            let id = *set_ids.entry(root).or_insert(next_id);
            variable_to_set[x] = id;
        }

        let constraint_to_set = constraint_to_variable
            .iter()
            .map(|v| match v {
                Some(x) => variable_to_set[*x],
                None => 0,
            })
            .collect();

        let set_count = set_ids.len();
        debug!(
            "{} variables and {} constraints fall into {} components",
            module.num_variables, module.num_constraints, set_count
        );

        Partition {
            variable_to_set,
            constraint_to_set,
            set_count,
        }
    }

    fn set_variables(&self, s: usize) -> impl Iterator<Item = usize> + '_ {
        (0..self.variable_to_set.len()).filter(move |&x| self.variable_to_set[x] == s)
    }

    fn set_constraints(&self, s: usize) -> impl Iterator<Item = usize> + '_ {
        (0..self.constraint_to_set.len()).filter(move |&c| self.constraint_to_set[c] == s)
    }

    /// Render component `s` as a standalone module.
    ///
    /// The sub-module keeps the declaration and assign lines verbatim and
    /// arranges its final conjunction in the order induced by the parent
    /// module's. A component with no constraints gets
    /// `assign x = 1 || var_a || …;` instead, which keeps its variables
    /// alive as inputs of the downstream AAG without constraining them.
    pub fn render_split(&self, module: &ConstraintModule, s: usize) -> String {
        let mut out = String::new();

        let variables: Vec<usize> = self.set_variables(s).collect();
        let constraints: Vec<usize> = self.set_constraints(s).collect();

        out.push_str(&format!("module split_{}(", s));
        for &x in &variables {
            out.push_str(&format!("var_{}, ", x));
        }
        out.push_str("x);\n");

        for &x in &variables {
            out.push_str(module.variable_decl(x));
            out.push('\n');
        }

        out.push_str("    output wire x;\n\n");

        if !constraints.is_empty() {
            let names: Vec<String> = constraints.iter().map(|c| format!("constraint_{}", c)).collect();
            out.push_str(&format!("    wire {};\n\n", names.join(", ")));

            for &c in &constraints {
                out.push_str(module.constraint_decl(c));
                out.push('\n');
            }

            let conjuncts: Vec<String> = module
                .order
                .iter()
                .filter(|c| self.constraint_to_set[**c] == s)
                .map(|c| format!("constraint_{}", c))
                .collect();
            out.push_str(&format!("    assign x = {};\n", conjuncts.join(" & ")));
        } else {
            let mut terms = vec!["1".to_string()];
            terms.extend(variables.iter().map(|x| format!("var_{}", x)));
            out.push_str(&format!("    assign x = {};\n", terms.join(" || ")));
        }

        out.push_str("endmodule\n");
        out
    }
}
