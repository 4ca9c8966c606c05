//! Typed error hierarchy for the proof checker.
//!
//! Every fatal condition named in the calculus (decode, stack, well-formedness,
//! side-condition, rule-mismatch, claim-mismatch) maps to exactly one
//! [`VerifierError`] variant. The checker never panics on attacker-controlled
//! input: a malformed stream or an unsound proof step always comes back as
//! `Err`, never a `panic!` or a swallowed exception.

use crate::decoder::Opcode;
use crate::pattern::Id;

/// Everything that can make the checker reject a stream or a proof step.
#[derive(Debug, thiserror::Error)]
pub enum VerifierError {
    /// An opcode value did not match any entry in the instruction table.
    #[error("unknown opcode {0}")]
    UnknownOpcode(i64),

    /// The stream ended while an instruction still expected operand words.
    #[error("truncated operand for {op:?}: expected {expected} more word(s)")]
    TruncatedOperand {
        /// The instruction being decoded when the stream ran out.
        op: Opcode,
        /// How many more words were needed.
        expected: usize,
    },

    /// A `Load` index pointed past the end of memory.
    #[error("load index {index} out of range (memory has {len} entries)")]
    MemoryOutOfRange {
        /// The requested index.
        index: usize,
        /// The number of entries actually in memory.
        len: usize,
    },

    /// A pop was attempted on an empty stack.
    #[error("pop on empty stack")]
    EmptyStack,

    /// The term on top of the stack had the wrong variant for the instruction.
    #[error("expected a {expected} term on the stack")]
    WrongTermVariant {
        /// `"syntactic pattern"` or `"proved"`, whichever was required.
        expected: &'static str,
    },

    /// A `MetaVar`, `Mu`, `ESubst`, or `SSubst` construction violated its
    /// structural invariant (§3).
    #[error("ill-formed {kind} construction for id {id}")]
    IllFormed {
        /// Which pattern kind failed its well-formedness check.
        kind: &'static str,
        /// The id involved in the failed construction.
        id: Id,
    },

    /// An `Instantiate` plug violated a freshness or polarity side-condition
    /// carried by the metavariable being replaced.
    #[error("instantiation of metavar {metavar} breaks a {condition} constraint on id {id}")]
    SideCondition {
        /// The metavariable id being instantiated.
        metavar: Id,
        /// Which of e-fresh/s-fresh/positive/negative failed.
        condition: &'static str,
        /// The id the constraint was about.
        id: Id,
    },

    /// `ModusPonens` was fired on a non-implication or mismatched antecedent.
    #[error("modus ponens: {0}")]
    ModusPonensMismatch(&'static str),

    /// `Generalization` was fired on a non-implication premise, or the
    /// binder occurs free in the conclusion.
    #[error("generalization: {0}")]
    GeneralizationMismatch(&'static str),

    /// `Substitution`/`ESubst`/`SSubst` was applied to a pattern whose head
    /// is not `MetaVar`, `ESubst`, or `SSubst`.
    #[error("cannot apply substitution to a concrete pattern head")]
    NotASubstitutableHead,

    /// A published theorem did not structurally match the front of the claim
    /// queue.
    #[error("published theorem does not match the pending claim")]
    ClaimMismatch,

    /// `Publish` was executed in the Proof phase with no claims left to
    /// discharge.
    #[error("no claims remain to discharge")]
    NoClaimsRemaining,

    /// A reserved opcode (`PropagationOr`, `PropagationExists`, `PreFixpoint`,
    /// `Singleton`, `Frame`, `KnasterTarski`) was executed. These are decoded
    /// without corrupting the cursor but are not implemented; see DESIGN.md.
    #[error("opcode {0:?} is reserved and not implemented by this checker")]
    ReservedOpcode(Opcode),

    /// An id value in the stream did not fit the non-negative `Id` domain.
    #[error("id value {0} is out of range")]
    InvalidId(i64),

    /// The configured maximum word count for a stream was exceeded.
    #[error("stream exceeds the configured maximum of {max} words")]
    StreamTooLong {
        /// The configured ceiling.
        max: usize,
    },
}

/// Errors from parsing the debug text stream format used by the CLI driver.
///
/// These are not calculus errors — the real byte-stream producer is out of
/// scope per the specification — but the driver still has to report a
/// malformed input file without panicking.
#[derive(Debug, thiserror::Error)]
pub enum StreamParseError {
    /// A token could not be parsed as a signed integer.
    #[error("token {token:?} on line {line} is not a valid integer")]
    NotAnInteger {
        /// The offending token.
        token: String,
        /// 1-based line number.
        line: usize,
    },

    /// The file could not be read.
    #[error("failed to read stream file: {0}")]
    Io(#[from] std::io::Error),
}
