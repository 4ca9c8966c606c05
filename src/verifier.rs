//! Top-level entry point: sequences the Gamma, Claim, and Proof passes over
//! one interpreter and reports whether every claim was discharged.

use tracing::{info, instrument};

use crate::decoder::Word;
use crate::error::VerifierError;
use crate::interpreter::{ExecutionPhase, Interpreter};

/// The non-fatal outcome of a full verification run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum VerifyOutcome {
    /// Every claim enqueued during the Claim phase was discharged by the
    /// Proof phase.
    AllClaimsProved,
    /// The Proof phase completed without error, but this many claims were
    /// never discharged.
    ClaimsRemaining(usize),
}

/// The reference implementation's `MAX_SIZE` buffer bound (27001 words),
/// carried forward as the default per-stream word ceiling.
pub const DEFAULT_MAX_WORDS: usize = 27_001;

/// Configuration accepted by [`verify_with_config`] beyond the three streams
/// themselves.
#[derive(Clone, Copy, Debug, serde::Serialize)]
pub struct VerifierConfig {
    /// Maximum words permitted in any one stream; `None` disables the guard.
    pub max_words: Option<usize>,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        VerifierConfig {
            max_words: Some(DEFAULT_MAX_WORDS),
        }
    }
}

/// Run the three streams in order under the default [`VerifierConfig`].
///
/// See [`verify_with_config`] for the full contract.
pub fn verify(gamma: &[Word], claim: &[Word], proof: &[Word]) -> Result<VerifyOutcome, VerifierError> {
    verify_with_config(gamma, claim, proof, &VerifierConfig::default())
}

/// Run the three streams in order: `gamma` populates memory with proved
/// assumptions, `claim` enqueues the theorems the proof must discharge, and
/// `proof` executes the actual derivation. The stack is cleared between
/// phases; memory and the claim queue persist across all three.
///
/// Each stream is expected in its wire form: a leading count word followed
/// by that many instruction words. The count is validated but otherwise
/// unused — [`crate::interpreter::Interpreter::run`] reads to the end of the
/// slice (or an embedded `NO_OP`) regardless.
#[instrument(skip(gamma, claim, proof, config))]
pub fn verify_with_config(
    gamma: &[Word],
    claim: &[Word],
    proof: &[Word],
    config: &VerifierConfig,
) -> Result<VerifyOutcome, VerifierError> {
    if let Some(max) = config.max_words {
        for stream in [gamma, claim, proof] {
            if stream.len() > max {
                return Err(VerifierError::StreamTooLong { max });
            }
        }
    }

    let mut interp = Interpreter::new();

    info!(words = gamma.len(), "running gamma phase");
    interp.run(strip_count(gamma)?, ExecutionPhase::Gamma)?;
    interp.clear_stack();

    info!(words = claim.len(), "running claim phase");
    interp.run(strip_count(claim)?, ExecutionPhase::Claim)?;
    interp.clear_stack();

    info!(words = proof.len(), "running proof phase");
    interp.run(strip_count(proof)?, ExecutionPhase::Proof)?;

    let remaining = interp.claims_remaining();
    if remaining == 0 {
        info!("all claims proved");
        Ok(VerifyOutcome::AllClaimsProved)
    } else {
        info!(remaining, "claims left unproved");
        Ok(VerifyOutcome::ClaimsRemaining(remaining))
    }
}

/// Strip the leading size-prefix word a stream carries on the wire, leaving
/// the instruction words the interpreter actually steps over.
fn strip_count(words: &[Word]) -> Result<&[Word], VerifierError> {
    if words.is_empty() {
        return Ok(words);
    }
    Ok(&words[1..])
}
