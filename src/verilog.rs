use std::fs;
use std::path::Path;

use regex::Regex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModuleError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("line {line}: {message}: {text:?}")]
    Format {
        line: usize,
        message: String,
        text: String,
    },
    #[error("{0}")]
    Incomplete(String),
}

/// A parsed constraint module.
///
/// The module is a fixed textual shape: a header naming every `var_<K>`
/// and the single output `x`, one `input [W-1:0] var_<K>;` per variable,
/// `output wire x;`, one `wire constraint_0, …;` declaration, one
/// `assign constraint_<c> = …;` per constraint, and a final
/// `assign x = constraint_… & …;` giving the conjunction order.
///
/// Declaration and assign lines are kept verbatim; the constraint
/// expressions stay opaque and are only scanned for `var_<K>` tokens.
#[derive(Debug)]
pub struct ConstraintModule {
    pub num_variables: usize,
    pub num_constraints: usize,
    /// Verbatim `input` declaration per variable ordinal.
    variable_decls: Vec<String>,
    /// Bit width per variable ordinal, from its `[W-1:0]` range.
    pub widths: Vec<usize>,
    /// Verbatim `assign constraint_<c> = …;` line per constraint ordinal.
    constraint_decls: Vec<String>,
    /// Constraint ordinals in the conjunction order of the final assign.
    pub order: Vec<usize>,
}

impl ConstraintModule {
    pub fn from_path(path: &Path) -> Result<Self, ModuleError> {
        let text = fs::read_to_string(path).map_err(|source| ModuleError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, ModuleError> {
        let var_re = Regex::new(r"var_(\d+)").expect("valid regex");
        let constraint_re = Regex::new(r"constraint_(\d+)").expect("valid regex");
        let width_re = Regex::new(r"\[(\d+):0\]").expect("valid regex");

        let max_ordinal = |re: &Regex, line: &str| re.captures_iter(line).filter_map(|c| c[1].parse::<usize>().ok()).max();

        let fail = |line: usize, message: &str, text: &str| ModuleError::Format {
            line,
            message: message.to_string(),
            text: text.to_string(),
        };

        let mut num_variables = None;
        let mut num_constraints = 0;
        let mut variable_decls: Vec<Option<String>> = Vec::new();
        let mut widths: Vec<usize> = Vec::new();
        let mut constraint_decls: Vec<Option<String>> = Vec::new();
        let mut order = Vec::new();

        for (line_no, line) in text.lines().enumerate() {
            let line_no = line_no + 1;
            let trimmed = line.trim_start();

            if trimmed.starts_with("module") {
                let count = max_ordinal(&var_re, line)
                    .map(|k| k + 1)
                    .ok_or_else(|| fail(line_no, "module header names no variables", line))?;
                num_variables = Some(count);
                variable_decls = vec![None; count];
                widths = vec![0; count];
            } else if trimmed.starts_with("input") {
                let x = max_ordinal(&var_re, line)
                    .ok_or_else(|| fail(line_no, "input declaration names no variable", line))?;
                let width = max_ordinal(&width_re, line)
                    .map(|w| w + 1)
                    .ok_or_else(|| fail(line_no, "input declaration has no [W-1:0] range", line))?;
                if x >= variable_decls.len() {
                    return Err(fail(line_no, "input declaration for a variable missing from the header", line));
                }
                variable_decls[x] = Some(line.to_string());
                widths[x] = width;
            } else if trimmed.starts_with("wire constraint_") {
                let count = max_ordinal(&constraint_re, line)
                    .map(|c| c + 1)
                    .ok_or_else(|| fail(line_no, "wire declaration names no constraints", line))?;
                num_constraints = count;
                constraint_decls = vec![None; count];
            } else if trimmed.starts_with("assign constraint_") {
                let c = constraint_re
                    .captures(trimmed)
                    .and_then(|captures| captures[1].parse::<usize>().ok())
                    .ok_or_else(|| fail(line_no, "assign names no constraint", line))?;
                if c >= constraint_decls.len() {
                    return Err(fail(line_no, "assign for a constraint missing from the wire declaration", line));
                }
                constraint_decls[c] = Some(line.to_string());
            } else if trimmed.starts_with("assign x") {
                order = constraint_re
                    .captures_iter(trimmed)
                    .filter_map(|captures| captures[1].parse::<usize>().ok())
                    .collect();
            }
        }

        let num_variables =
            num_variables.ok_or_else(|| ModuleError::Incomplete("no module header found".to_string()))?;

        let variable_decls = variable_decls
            .into_iter()
            .enumerate()
            .map(|(x, decl)| decl.ok_or_else(|| ModuleError::Incomplete(format!("missing declaration for var_{}", x))))
            .collect::<Result<Vec<_>, _>>()?;

        let constraint_decls = constraint_decls
            .into_iter()
            .enumerate()
            .map(|(c, decl)| decl.ok_or_else(|| ModuleError::Incomplete(format!("missing assign for constraint_{}", c))))
            .collect::<Result<Vec<_>, _>>()?;

        // The final conjunction mentions every constraint exactly once
        let mut seen = vec![false; num_constraints];
        for &c in &order {
            if c >= num_constraints || seen[c] {
                return Err(ModuleError::Incomplete(format!(
                    "constraint_{} is repeated or out of range in the final assign",
                    c
                )));
            }
            seen[c] = true;
        }
        if order.len() != num_constraints {
            return Err(ModuleError::Incomplete(format!(
                "the final assign lists {} constraints, expected {}",
                order.len(),
                num_constraints
            )));
        }

        Ok(Self {
            num_variables,
            num_constraints,
            variable_decls,
            widths,
            constraint_decls,
            order,
        })
    }

    pub fn variable_decl(&self, x: usize) -> &str {
        &self.variable_decls[x]
    }

    pub fn constraint_decl(&self, c: usize) -> &str {
        &self.constraint_decls[c]
    }

    /// Ordinals of the variables appearing textually in constraint `c`.
    pub fn constraint_variables(&self, c: usize) -> Vec<usize> {
        let var_re = Regex::new(r"var_(\d+)").expect("valid regex");
        var_re
            .captures_iter(&self.constraint_decls[c])
            .filter_map(|captures| captures[1].parse::<usize>().ok())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) const EXAMPLE: &str = "\
module generated_module(var_0, var_1, var_2, x);
    input [12:0] var_0;
    input [7:0] var_1;
    input [3:0] var_2;
    output wire x;

    wire constraint_0, constraint_1, constraint_2;

    assign constraint_0 = |((~((var_1 << 14'h9))));
    assign constraint_1 = |(((var_2 - 16'h39dd) + var_0));
    assign constraint_2 = |(8'h3);

    assign x = constraint_2 & constraint_0 & constraint_1;
endmodule
";

    #[test]
    fn test_parse_example() {
        let module = ConstraintModule::parse(EXAMPLE).unwrap();
        assert_eq!(module.num_variables, 3);
        assert_eq!(module.num_constraints, 3);
        assert_eq!(module.widths, vec![13, 8, 4]);
        assert_eq!(module.order, vec![2, 0, 1]);
        assert_eq!(module.variable_decl(1), "    input [7:0] var_1;");
        assert!(module.constraint_decl(0).contains("constraint_0"));
    }

    #[test]
    fn test_constraint_variables() {
        let module = ConstraintModule::parse(EXAMPLE).unwrap();
        assert_eq!(module.constraint_variables(0), vec![1]);
        assert_eq!(module.constraint_variables(1), vec![2, 0]);
        assert_eq!(module.constraint_variables(2), Vec::<usize>::new());
    }

    #[test]
    fn test_missing_header_is_an_error() {
        assert!(matches!(
            ConstraintModule::parse("input [3:0] var_0;\n"),
            Err(ModuleError::Format { .. })
        ));
    }

    #[test]
    fn test_missing_constraint_assign_is_an_error() {
        let text = "\
module m(var_0, x);
    input [3:0] var_0;
    output wire x;
    wire constraint_0, constraint_1;
    assign constraint_0 = |(var_0);
    assign x = constraint_0 & constraint_1;
endmodule
";
        assert!(matches!(ConstraintModule::parse(text), Err(ModuleError::Incomplete(_))));
    }

    #[test]
    fn test_order_must_mention_every_constraint_once() {
        let text = "\
module m(var_0, x);
    input [3:0] var_0;
    output wire x;
    wire constraint_0, constraint_1;
    assign constraint_0 = |(var_0);
    assign constraint_1 = |(var_0);
    assign x = constraint_0 & constraint_0;
endmodule
";
        assert!(matches!(ConstraintModule::parse(text), Err(ModuleError::Incomplete(_))));
    }
}
