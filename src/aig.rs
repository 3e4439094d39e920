use std::fs;
use std::path::Path;

use regex::Regex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AagError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}:{line}: {message}")]
    Format {
        path: String,
        line: usize,
        message: String,
    },
}

/// An AIGER literal: node index in the high bits, polarity in the low bit.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Literal(u32);

impl Literal {
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }
    pub fn get(self) -> u32 {
        self.0
    }
    pub fn variable(self) -> u32 {
        self.0 >> 1
    }
    pub fn is_negated(self) -> bool {
        (self.0 & 1) != 0
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Header {
    /// Maximum node index.
    pub m: usize,
    /// Number of inputs.
    pub i: usize,
    /// Number of latches; only 0 is accepted.
    pub l: usize,
    /// Number of outputs; only 1 is accepted.
    pub o: usize,
    /// Number of AND gates.
    pub a: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct AndGate {
    pub output: Literal,
    pub inputs: [Literal; 2],
}

/// A combinational single-output And-Inverter Graph in ASCII AIGER form.
#[derive(Debug)]
pub struct Aag {
    pub header: Header,
    pub inputs: Vec<Literal>,
    pub output: Literal,
    pub ands: Vec<AndGate>,
    /// Per input position: the `(x, y)` of its `var_<x>[<y>]` symbol.
    /// Inputs without a symbol line keep the default `(0, 0)`.
    pub symbols: Vec<(usize, usize)>,
}

impl Aag {
    pub fn from_path(path: &Path) -> Result<Self, AagError> {
        let text = fs::read_to_string(path).map_err(|source| AagError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text, &path.display().to_string())
    }

    /// Parse the ASCII AIGER 1.0 grammar: header, `I` input literals, one
    /// output literal, `A` AND lines, then an optional symbol table.
    pub fn parse(text: &str, path: &str) -> Result<Self, AagError> {
        let fail = |line: usize, message: String| AagError::Format {
            path: path.to_string(),
            line,
            message,
        };

        let mut lines = text.lines().enumerate();

        let (line_no, header_line) = lines
            .next()
            .ok_or_else(|| fail(1, "empty file".to_string()))?;
        let mut tokens = header_line.split_whitespace();
        if tokens.next() != Some("aag") {
            return Err(fail(line_no + 1, format!("expected an 'aag' header, got {:?}", header_line)));
        }
        let mut field = |name: &str| -> Result<usize, AagError> {
            tokens
                .next()
                .and_then(|t| t.parse().ok())
                .ok_or_else(|| fail(line_no + 1, format!("missing or invalid header field {}", name)))
        };
        let header = Header {
            m: field("M")?,
            i: field("I")?,
            l: field("L")?,
            o: field("O")?,
            a: field("A")?,
        };
        if header.l != 0 {
            return Err(fail(line_no + 1, format!("expected a combinational graph, got {} latches", header.l)));
        }
        if header.o != 1 {
            return Err(fail(line_no + 1, format!("expected exactly one output, got {}", header.o)));
        }

        let mut literal_line = |what: &str| -> Result<(usize, Literal), AagError> {
            let (line_no, line) = lines
                .next()
                .ok_or_else(|| fail(0, format!("unexpected end of file, missing {}", what)))?;
            let raw: u32 = line
                .trim()
                .parse()
                .map_err(|_| fail(line_no + 1, format!("invalid {} literal {:?}", what, line)))?;
            if raw as usize > 2 * header.m + 1 {
                return Err(fail(line_no + 1, format!("{} literal {} exceeds the declared maximum index", what, raw)));
            }
            Ok((line_no, Literal::new(raw)))
        };

        let mut inputs = Vec::with_capacity(header.i);
        for _ in 0..header.i {
            let (line_no, literal) = literal_line("input")?;
            if literal.variable() == 0 || literal.is_negated() {
                return Err(fail(line_no + 1, format!("input literal {} is not a positive node", literal.get())));
            }
            inputs.push(literal);
        }

        let (_, output) = literal_line("output")?;

        let mut ands = Vec::with_capacity(header.a);
        for _ in 0..header.a {
            let (line_no, line) = lines
                .next()
                .ok_or_else(|| fail(0, "unexpected end of file, missing an AND line".to_string()))?;
            let fields: Vec<u32> = line.split_whitespace().map(|t| t.parse().ok()).collect::<Option<_>>().ok_or_else(
                || fail(line_no + 1, format!("invalid AND line {:?}", line)),
            )?;
            if fields.len() != 3 {
                return Err(fail(line_no + 1, format!("expected 3 literals on an AND line, got {}", fields.len())));
            }
            if fields.iter().any(|&raw| raw as usize > 2 * header.m + 1) {
                return Err(fail(line_no + 1, format!("AND line {:?} exceeds the declared maximum index", line)));
            }
            let output = Literal::new(fields[0]);
            if output.variable() == 0 || output.is_negated() {
                return Err(fail(line_no + 1, format!("AND output literal {} is not a positive node", output.get())));
            }
            ands.push(AndGate {
                output,
                inputs: [Literal::new(fields[1]), Literal::new(fields[2])],
            });
        }

        // Symbol table: `i<k> var_<x>[<y>]` lines, until a comment section
        // or the end of the file. Anything else is tolerated and skipped.
        let symbol_re = Regex::new(r"^i(\d+)\s+var_(\d+)\[(\d+)\]$").expect("valid regex");
        let mut symbols = vec![(0usize, 0usize); header.i];
        for (_, line) in lines {
            if line.starts_with('c') {
                break;
            }
            if let Some(captures) = symbol_re.captures(line.trim()) {
                let parsed = (
                    captures[1].parse::<usize>(),
                    captures[2].parse::<usize>(),
                    captures[3].parse::<usize>(),
                );
                if let (Ok(k), Ok(x), Ok(y)) = parsed {
                    if k < symbols.len() {
                        symbols[k] = (x, y);
                    }
                }
            }
        }

        Ok(Self {
            header,
            inputs,
            output,
            ands,
            symbols,
        })
    }

    /// `(ori_input_num, widths)` of the original multi-bit variables, as
    /// recovered from the symbol table: one variable per distinct `x`,
    /// with width `max(y) + 1`.
    pub fn input_shape(&self) -> (usize, Vec<usize>) {
        let num_variables = self.symbols.iter().map(|&(x, _)| x + 1).max().unwrap_or(0).max(1);
        let mut widths = vec![0usize; num_variables];
        for &(x, y) in &self.symbols {
            widths[x] = widths[x].max(y + 1);
        }
        (num_variables, widths)
    }

    /// A graph with no AND gates constrains nothing; the whole input space
    /// is a solution.
    pub fn is_trivially_true(&self) -> bool {
        self.header.a == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_gate_graph() {
        let text = "aag 3 2 0 1 1\n2\n4\n6\n6 2 4\ni0 var_0[0]\ni1 var_0[1]\n";
        let aag = Aag::parse(text, "test.aag").unwrap();
        assert_eq!(aag.header.m, 3);
        assert_eq!(aag.header.i, 2);
        assert_eq!(aag.inputs, vec![Literal::new(2), Literal::new(4)]);
        assert_eq!(aag.output, Literal::new(6));
        assert_eq!(aag.ands.len(), 1);
        assert_eq!(aag.ands[0].output.variable(), 3);
        assert_eq!(aag.symbols, vec![(0, 0), (0, 1)]);
        assert!(!aag.is_trivially_true());
    }

    #[test]
    fn test_parse_negated_output() {
        let text = "aag 2 2 0 1 0\n2\n4\n5\n";
        let aag = Aag::parse(text, "test.aag").unwrap();
        assert_eq!(aag.output.variable(), 2);
        assert!(aag.output.is_negated());
        assert!(aag.is_trivially_true());
    }

    #[test]
    fn test_missing_symbols_default_to_zero() {
        let text = "aag 2 2 0 1 0\n2\n4\n2\ni1 var_3[2]\n";
        let aag = Aag::parse(text, "test.aag").unwrap();
        assert_eq!(aag.symbols, vec![(0, 0), (3, 2)]);

        let (num_variables, widths) = aag.input_shape();
        assert_eq!(num_variables, 4);
        assert_eq!(widths, vec![1, 0, 0, 3]);
    }

    #[test]
    fn test_rejects_latches_and_multiple_outputs() {
        assert!(matches!(
            Aag::parse("aag 1 0 1 1 0\n0 0\n1\n", "t"),
            Err(AagError::Format { .. })
        ));
        assert!(matches!(
            Aag::parse("aag 1 1 0 2 0\n2\n2\n3\n", "t"),
            Err(AagError::Format { .. })
        ));
    }

    #[test]
    fn test_rejects_bad_header() {
        assert!(matches!(Aag::parse("agg 1 1 0 1 0\n", "t"), Err(AagError::Format { .. })));
        assert!(matches!(Aag::parse("aag 1 1 0 1\n", "t"), Err(AagError::Format { .. })));
    }

    #[test]
    fn test_input_shape_without_symbols() {
        let text = "aag 1 1 0 1 0\n2\n2\n";
        let aag = Aag::parse(text, "t").unwrap();
        let (num_variables, widths) = aag.input_shape();
        assert_eq!(num_variables, 1);
        assert_eq!(widths, vec![1]);
    }
}
