use std::io;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

/// Encode an MSB-first bit vector as lowercase hex without leading zeros.
///
/// The vector is left-padded with zero bits to a multiple of four; an
/// all-zero or empty vector encodes as `"0"`.
pub fn binary_to_hex(bits: &[bool]) -> String {
    const DIGITS: &[u8; 16] = b"0123456789abcdef";

    if bits.is_empty() {
        return "0".to_string();
    }

    let fill = (4 - bits.len() % 4) % 4;
    let mut padded = vec![false; fill];
    padded.extend_from_slice(bits);

    let mut hex = String::with_capacity(padded.len() / 4);
    for nibble in padded.chunks(4) {
        let mut value = 0usize;
        for &bit in nibble {
            value = (value << 1) | bit as usize;
        }
        hex.push(DIGITS[value] as char);
    }

    let trimmed = hex.trim_start_matches('0');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Fold flat per-literal samples back into per-variable bit vectors.
///
/// Literal `k` carries symbol `(x, y)`; its value lands at MSB-first
/// position `widths[x] - 1 - y` of variable `x`.
pub fn reshape(samples: &[Vec<bool>], symbols: &[(usize, usize)], widths: &[usize]) -> Vec<Vec<Vec<bool>>> {
    samples
        .iter()
        .map(|sample| {
            let mut variables: Vec<Vec<bool>> = widths.iter().map(|&w| vec![false; w]).collect();
            for (k, &(x, y)) in symbols.iter().enumerate() {
                variables[x][widths[x] - 1 - y] = sample[k];
            }
            variables
        })
        .collect()
}

/// Accumulates reshaped assignments across splits.
///
/// Every split leaves foreign variables at `false`, so OR-merging keeps
/// each owning split's choice and never flips a bit back.
pub struct Aggregate {
    assignments: Vec<Vec<Vec<bool>>>,
}

impl Aggregate {
    /// All-false accumulator for `num_solutions` assignments over
    /// variables of the given widths.
    pub fn new(num_solutions: usize, widths: &[usize]) -> Self {
        let blank: Vec<Vec<bool>> = widths.iter().map(|&w| vec![false; w]).collect();
        Self {
            assignments: vec![blank; num_solutions],
        }
    }

    /// OR one split's reshaped assignments into the accumulator.
    ///
    /// A split whose symbol table covers fewer variables, or narrower
    /// widths, than the aggregate simply contributes nothing to the
    /// missing positions.
    pub fn merge(&mut self, split: &[Vec<Vec<bool>>]) {
        for (accumulated, contributed) in self.assignments.iter_mut().zip(split) {
            for (variable, bits) in accumulated.iter_mut().zip(contributed) {
                for (accumulated_bit, &bit) in variable.iter_mut().zip(bits) {
                    *accumulated_bit = *accumulated_bit || bit;
                }
            }
        }
    }

    pub fn to_document(&self) -> Document {
        Document {
            assignment_list: self
                .assignments
                .iter()
                .map(|assignment| {
                    assignment
                        .iter()
                        .map(|bits| HexValue {
                            value: binary_to_hex(bits),
                        })
                        .collect()
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Document {
    pub assignment_list: Vec<Vec<HexValue>>,
}

#[derive(Debug, Serialize)]
pub struct HexValue {
    pub value: String,
}

impl Document {
    /// Write the document as JSON with 4-space indentation.
    pub fn write(&self, writer: impl io::Write) -> serde_json::Result<()> {
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(writer, formatter);
        self.serialize(&mut serializer)
    }
}

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn bits_of(value: u64, width: usize) -> Vec<bool> {
        (0..width).rev().map(|i| value >> i & 1 == 1).collect()
    }

    #[test]
    fn test_binary_to_hex_basics() {
        assert_eq!(binary_to_hex(&[]), "0");
        assert_eq!(binary_to_hex(&[false; 7]), "0");
        assert_eq!(binary_to_hex(&[true]), "1");
        assert_eq!(binary_to_hex(&bits_of(0x2fd3d29, 26)), "2fd3d29");
        assert_eq!(binary_to_hex(&bits_of(0xa0a1, 16)), "a0a1");
        // Leading zero digits are stripped
        assert_eq!(binary_to_hex(&bits_of(0x00ff, 16)), "ff");
    }

    #[test]
    fn test_binary_to_hex_roundtrip() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..200 {
            let width = rng.gen_range(1..=64);
            let value: u64 = rng.gen::<u64>() >> (64 - width);
            let hex = binary_to_hex(&bits_of(value, width));
            assert_eq!(u64::from_str_radix(&hex, 16), Ok(value));
        }
    }

    #[test]
    fn test_reshape_places_bits_msb_first() {
        // Two literals of a 4-bit variable: bit 0 and bit 2
        let symbols = vec![(0, 0), (0, 2)];
        let widths = vec![4];
        let reshaped = reshape(&[vec![true, true]], &symbols, &widths);
        assert_eq!(reshaped, vec![vec![vec![false, true, false, true]]]);
    }

    #[test]
    fn test_merge_keeps_the_owning_splits_choice() {
        let widths = vec![2, 2];
        let mut aggregate = Aggregate::new(1, &widths);

        // Split 0 owns var_0, split 1 owns var_1
        aggregate.merge(&[vec![vec![true, false], vec![false, false]]]);
        aggregate.merge(&[vec![vec![false, false], vec![false, true]]]);

        let document = aggregate.to_document();
        assert_eq!(document.assignment_list[0][0].value, "2");
        assert_eq!(document.assignment_list[0][1].value, "1");
    }

    #[test]
    fn test_merge_tolerates_narrow_splits() {
        let mut aggregate = Aggregate::new(1, &[4, 4]);
        // The split only knows a 2-bit var_0 and no var_1 at all
        aggregate.merge(&[vec![vec![true, true]]]);

        let document = aggregate.to_document();
        assert_eq!(document.assignment_list[0][0].value, "c");
        assert_eq!(document.assignment_list[0][1].value, "0");
    }

    #[test]
    fn test_document_shape_and_indentation() {
        let mut aggregate = Aggregate::new(2, &[3]);
        aggregate.merge(&[vec![vec![true, false, true]], vec![vec![false, false, false]]]);

        let mut buffer = Vec::new();
        aggregate.to_document().write(&mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert!(text.starts_with("{\n    \"assignment_list\": ["));
        assert!(text.contains("\"value\": \"5\""));
        let document: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(document["assignment_list"].as_array().unwrap().len(), 2);
    }
}
