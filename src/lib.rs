//! # stimgen: constrained-random stimulus generation
//!
//! **`stimgen`** draws uniformly-random satisfying assignments for hardware
//! constraint circuits and renders them as per-variable hex values.
//!
//! ## Pipeline
//!
//! The problem arrives as a constraint module: a conjunction of single-bit
//! constraint expressions over multi-bit input variables. Two stages, each
//! its own executable, turn it into random stimuli:
//!
//! 1. **Splitting** ([`verilog`], [`partition`]): constraints that share no
//!    variables are independent, so the module is partitioned into one
//!    sub-module per connected component of the variable-sharing graph.
//!    Each sub-module is compiled to an And-Inverter Graph by an external
//!    flow.
//! 2. **Sampling** ([`aig`], [`build`], [`count`], [`sample`],
//!    [`solution`]): each AAG becomes a ROBDD with complement edges; an
//!    exact dynamic program counts satisfying paths by complement parity;
//!    a top-down weighted walk then draws assignments uniformly at random,
//!    which are reshaped into the original multi-bit variables and merged
//!    across splits into one JSON document.
//!
//! ## The engine
//!
//! The [`bdd`] module is a manager-centric ROBDD implementation: all
//! operations go through [`Bdd`][crate::bdd::Bdd], which hash-conses nodes
//! so that equal functions share one handle. Negation is a complement tag
//! on the handle ([`Ref`][crate::reference::Ref]) and costs nothing; the
//! path-counting DP and the sampler agree on how that tag propagates
//! through the diagram.
//!
//! ## Basic usage
//!
//! ```rust
//! use rand::SeedableRng;
//! use stimgen::aig::Aag;
//! use stimgen::build::build;
//! use stimgen::count::PathCounts;
//! use stimgen::sample::Sampler;
//!
//! // var_0[0] & var_0[1], as a two-input AAG
//! let aag = Aag::parse("aag 3 2 0 1 1\n2\n4\n6\n6 2 4\ni0 var_0[0]\ni1 var_0[1]\n", "demo.aag").unwrap();
//! let circuit = build(&aag).unwrap();
//!
//! let counts = PathCounts::compute(&circuit.bdd, circuit.root);
//! let rng = rand_chacha::ChaCha8Rng::seed_from_u64(42);
//! let mut sampler = Sampler::new(&circuit.bdd, &counts, rng);
//!
//! for assignment in sampler.draw_many(circuit.root, circuit.num_inputs, 5) {
//!     assert!(circuit.bdd.evaluate(circuit.root, &assignment));
//! }
//! ```

pub mod aig;
pub mod bdd;
pub mod build;
pub mod cache;
pub mod count;
pub mod node;
pub mod partition;
pub mod reference;
pub mod sample;
pub mod solution;
pub mod utils;
pub mod verilog;
