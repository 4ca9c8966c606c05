//! A stack-based proof checker for a matching-logic proof calculus.
//!
//! The crate is a small trust kernel: given a Γ stream of assumptions, a
//! claim stream naming the theorems that must be proved, and a proof stream
//! of instructions, [`verify`] replays the proof against a shared stack and
//! memory table and reports whether every claim was discharged. Every fatal
//! condition — a malformed instruction, an ill-formed pattern, a broken
//! side-condition, a rule applied to the wrong shape of premise — comes back
//! as a typed [`error::VerifierError`], never a panic.
//!
//! # Modules
//!
//! - [`pattern`]: the pattern AST and its freshness/polarity/well-formedness
//!   predicates.
//! - [`subst`]: capture-avoiding substitution and simultaneous metavariable
//!   instantiation.
//! - [`term`]: the syntactic-vs-proved wrapper held on the stack and in
//!   memory.
//! - [`decoder`]: the opcode table and instruction-word cursor.
//! - [`interpreter`]: the three-phase stepper that actually executes a
//!   stream against the stack, memory, and claim queue.
//! - [`verifier`]: the top-level [`verify`] entry point.
//! - [`error`]: the typed error hierarchy.

#![forbid(unsafe_code)]

pub mod decoder;
pub mod error;
pub mod interpreter;
pub mod pattern;
pub mod subst;
pub mod term;
pub mod verifier;

pub use decoder::{Opcode, Word};
pub use error::VerifierError;
pub use pattern::{Id, Pattern};
pub use verifier::{verify, verify_with_config, VerifierConfig, VerifyOutcome, DEFAULT_MAX_WORDS};
