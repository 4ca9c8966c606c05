//! The three-phase interpreter: one stepper function, parameterized by
//! [`ExecutionPhase`], shared across the Gamma/Claim/Proof passes so opcode
//! semantics stay identical except where `Publish` branches on the phase.

use std::collections::VecDeque;
use std::rc::Rc;

use tracing::{debug, error, trace};

use crate::decoder::{Cursor, Opcode, Word};
use crate::error::VerifierError;
use crate::pattern::Pattern;
use crate::subst::instantiate;
use crate::term::Term;

/// Which of the three passes the interpreter is currently running.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionPhase {
    /// Executes the assumption stream; `Publish` injects assumptions as
    /// proved facts into memory.
    Gamma,
    /// Executes the claim stream; `Publish` enqueues a required claim.
    Claim,
    /// Executes the proof stream; `Publish` discharges a claim.
    Proof,
}

/// Memory persists across phases; the stack is per-phase; the claim queue
/// is populated in Claim and drained in Proof.
pub struct Interpreter {
    stack: Vec<Term>,
    memory: Vec<Term>,
    claims: VecDeque<Rc<Pattern>>,
    /// Cached axiom schemas, built once and cloned (`Rc` bump) on each push.
    axioms: Axioms,
}

struct Axioms {
    prop1: Rc<Pattern>,
    prop2: Rc<Pattern>,
    prop3: Rc<Pattern>,
    quantifier: Rc<Pattern>,
    existence: Rc<Pattern>,
}

impl Axioms {
    fn build() -> Axioms {
        let phi0 = Pattern::metavar_unconstrained(0);
        let phi1 = Pattern::metavar_unconstrained(1);
        let phi2 = Pattern::metavar_unconstrained(2);

        let prop1 = Pattern::implies(phi0.clone(), Pattern::implies(phi1.clone(), phi0.clone()));
        let prop2 = Pattern::implies(
            Pattern::implies(phi0.clone(), Pattern::implies(phi1.clone(), phi2.clone())),
            Pattern::implies(
                Pattern::implies(phi0.clone(), phi1.clone()),
                Pattern::implies(phi0.clone(), phi2.clone()),
            ),
        );
        let prop3 = Pattern::implies(Pattern::negate(Pattern::negate(phi0.clone())), phi0.clone());
        let quantifier = Pattern::implies(
            Pattern::esubst(phi0.clone(), 0, Pattern::evar(1)),
            Pattern::exists(0, phi0.clone()),
        );
        let existence = Pattern::exists(0, phi0);

        Axioms {
            prop1,
            prop2,
            prop3,
            quantifier,
            existence,
        }
    }
}

impl Interpreter {
    /// A fresh interpreter with empty stack, memory, and claim queue.
    pub fn new() -> Interpreter {
        Interpreter {
            stack: Vec::new(),
            memory: Vec::new(),
            claims: VecDeque::new(),
            axioms: Axioms::build(),
        }
    }

    /// Discard the per-phase stack between phases; memory and claims carry
    /// over untouched.
    pub fn clear_stack(&mut self) {
        self.stack.clear();
    }

    /// Whether the claim queue is empty (the top-level verifier's success
    /// condition after the Proof phase).
    pub fn claims_remaining(&self) -> usize {
        self.claims.len()
    }

    fn pop(&mut self) -> Result<Term, VerifierError> {
        self.stack.pop().ok_or(VerifierError::EmptyStack)
    }

    fn pop_pattern(&mut self) -> Result<Rc<Pattern>, VerifierError> {
        self.pop()?.into_pattern()
    }

    fn pop_proved(&mut self) -> Result<Rc<Pattern>, VerifierError> {
        self.pop()?.into_proved()
    }

    fn push(&mut self, term: Term) {
        self.stack.push(term);
    }

    /// Run one instruction stream to completion (`NO_OP` or end-of-buffer).
    ///
    /// `words` must already have its leading size-prefix word stripped by
    /// the caller ([`crate::verifier::verify`] does this once per stream).
    pub fn run(&mut self, words: &[Word], phase: ExecutionPhase) -> Result<(), VerifierError> {
        let mut cursor = Cursor::new(words);
        while !cursor.at_end() {
            let op = cursor.next_opcode()?;
            debug!(?op, ?phase, "executing instruction");
            if op == Opcode::NoOp {
                break;
            }
            if let Err(e) = self.step(op, &mut cursor, phase) {
                error!(?op, ?phase, error = %e, "fatal error");
                return Err(e);
            }
            trace!(stack_depth = self.stack.len(), "after instruction");
        }
        Ok(())
    }

    fn step(
        &mut self,
        op: Opcode,
        cursor: &mut Cursor<'_>,
        phase: ExecutionPhase,
    ) -> Result<(), VerifierError> {
        match op {
            Opcode::EVar => {
                let id = cursor.next_id(op)?;
                self.push(Term::Syntactic(Pattern::evar(id)));
            }
            Opcode::SVar => {
                let id = cursor.next_id(op)?;
                self.push(Term::Syntactic(Pattern::svar(id)));
            }
            Opcode::Symbol => {
                let id = cursor.next_id(op)?;
                self.push(Term::Syntactic(Pattern::symbol(id)));
            }
            Opcode::CleanMetaVar => {
                let id = cursor.next_id(op)?;
                self.push(Term::Syntactic(Pattern::metavar_unconstrained(id)));
            }
            Opcode::MetaVar => {
                let id = cursor.next_id(op)?;
                let e_fresh = cursor.next_id_list(op)?.into_iter().collect();
                let s_fresh = cursor.next_id_list(op)?.into_iter().collect();
                let positive = cursor.next_id_list(op)?.into_iter().collect();
                let negative = cursor.next_id_list(op)?.into_iter().collect();
                let app_ctx_holes = cursor.next_id_list(op)?.into_iter().collect();
                let pattern = Pattern::metavar(id, e_fresh, s_fresh, positive, negative, app_ctx_holes);
                if !pattern.well_formed() {
                    return Err(VerifierError::IllFormed { kind: "MetaVar", id });
                }
                self.push(Term::Syntactic(pattern));
            }
            Opcode::Implication => {
                let right = self.pop_pattern()?;
                let left = self.pop_pattern()?;
                self.push(Term::Syntactic(Pattern::implies(left, right)));
            }
            Opcode::Application => {
                let right = self.pop_pattern()?;
                let left = self.pop_pattern()?;
                self.push(Term::Syntactic(Pattern::app(left, right)));
            }
            Opcode::Exists => {
                let id = cursor.next_id(op)?;
                let body = self.pop_pattern()?;
                self.push(Term::Syntactic(Pattern::exists(id, body)));
            }
            Opcode::Mu => {
                let id = cursor.next_id(op)?;
                let body = self.pop_pattern()?;
                let pattern = Pattern::mu(id, body);
                if !pattern.well_formed() {
                    return Err(VerifierError::IllFormed { kind: "Mu", id });
                }
                self.push(Term::Syntactic(pattern));
            }
            Opcode::ESubst => {
                let evar_id = cursor.next_id(op)?;
                let body = self.pop_pattern()?;
                let plug = self.pop_pattern()?;
                if !body.is_substitutable_head() {
                    return Err(VerifierError::NotASubstitutableHead);
                }
                let candidate = Pattern::esubst(body.clone(), evar_id, plug);
                if candidate.well_formed() {
                    self.push(Term::Syntactic(candidate));
                } else {
                    // Already fresh in evar_id: the substitution is a no-op.
                    self.push(Term::Syntactic(body));
                }
            }
            Opcode::SSubst => {
                let svar_id = cursor.next_id(op)?;
                let body = self.pop_pattern()?;
                let plug = self.pop_pattern()?;
                if !body.is_substitutable_head() {
                    return Err(VerifierError::NotASubstitutableHead);
                }
                let candidate = Pattern::ssubst(body.clone(), svar_id, plug);
                if candidate.well_formed() {
                    self.push(Term::Syntactic(candidate));
                } else {
                    self.push(Term::Syntactic(body));
                }
            }
            Opcode::Prop1 => self.push(Term::Proved(self.axioms.prop1.clone())),
            Opcode::Prop2 => self.push(Term::Proved(self.axioms.prop2.clone())),
            Opcode::Prop3 => self.push(Term::Proved(self.axioms.prop3.clone())),
            Opcode::Quantifier => self.push(Term::Proved(self.axioms.quantifier.clone())),
            Opcode::Existence => self.push(Term::Proved(self.axioms.existence.clone())),
            Opcode::ModusPonens => {
                let minor = self.pop_proved()?;
                let major = self.pop_proved()?;
                let Pattern::Implication(antecedent, consequent) = major.as_ref() else {
                    return Err(VerifierError::ModusPonensMismatch(
                        "expected an implication as the first premise",
                    ));
                };
                if **antecedent != *minor {
                    return Err(VerifierError::ModusPonensMismatch(
                        "antecedent does not match the second premise",
                    ));
                }
                self.push(Term::Proved(consequent.clone()));
            }
            Opcode::Generalization => {
                let proved = self.pop_proved()?;
                let id = cursor.next_id(op)?;
                let Pattern::Implication(antecedent, consequent) = proved.as_ref() else {
                    return Err(VerifierError::GeneralizationMismatch(
                        "expected an implication premise",
                    ));
                };
                if !consequent.e_fresh(id) {
                    return Err(VerifierError::GeneralizationMismatch(
                        "binding variable must be fresh in the conclusion",
                    ));
                }
                self.push(Term::Proved(Pattern::implies(
                    Pattern::exists(id, antecedent.clone()),
                    consequent.clone(),
                )));
            }
            Opcode::Substitution => {
                let svar_id = cursor.next_id(op)?;
                let plug = self.pop_pattern()?;
                let proved = self.pop_proved()?;
                if !proved.is_substitutable_head() {
                    return Err(VerifierError::NotASubstitutableHead);
                }
                let candidate = Pattern::ssubst(proved.clone(), svar_id, plug);
                if candidate.well_formed() {
                    self.push(Term::Proved(candidate));
                } else {
                    // Redundant: the theorem is already s_fresh in svar_id.
                    self.push(Term::Proved(proved));
                }
            }
            Opcode::Instantiate => {
                let n = cursor.next_count(op)?;
                let metaterm = self.pop()?;
                let mut ids = Vec::with_capacity(n);
                let mut plugs = Vec::with_capacity(n);
                for _ in 0..n {
                    ids.push(cursor.next_id(op)?);
                    plugs.push(self.pop_pattern()?);
                }
                let (pattern, rewrap): (Rc<Pattern>, fn(Rc<Pattern>) -> Term) = match metaterm {
                    Term::Syntactic(p) => (p, Term::Syntactic),
                    Term::Proved(p) => (p, Term::Proved),
                };
                let result = instantiate(&pattern, &ids, &plugs)?;
                self.push(rewrap(result.unwrap_or(pattern)));
            }
            Opcode::Pop => {
                self.pop()?;
            }
            Opcode::Save => {
                let top = self.stack.last().ok_or(VerifierError::EmptyStack)?.clone();
                self.memory.push(top);
            }
            Opcode::Load => {
                let raw_index = cursor.next_count(op)?;
                let term = self
                    .memory
                    .get(raw_index)
                    .ok_or(VerifierError::MemoryOutOfRange {
                        index: raw_index,
                        len: self.memory.len(),
                    })?
                    .clone();
                self.push(term);
            }
            Opcode::Publish => match phase {
                ExecutionPhase::Gamma => {
                    let p = self.pop_pattern()?;
                    self.memory.push(Term::Proved(p));
                }
                ExecutionPhase::Claim => {
                    let p = self.pop_pattern()?;
                    self.claims.push_back(p);
                }
                ExecutionPhase::Proof => {
                    let claim = self
                        .claims
                        .pop_front()
                        .ok_or(VerifierError::NoClaimsRemaining)?;
                    let theorem = self.pop_proved()?;
                    if claim != theorem {
                        return Err(VerifierError::ClaimMismatch);
                    }
                }
            },
            Opcode::NoOp => unreachable!("NO_OP is handled by the caller before step() is invoked"),
            reserved => {
                debug_assert!(reserved.is_reserved());
                return Err(VerifierError::ReservedOpcode(reserved));
            }
        }
        Ok(())
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Interpreter::new()
    }
}

/// Read-only access for tests and the CLI driver that want to inspect final
/// state without exposing interior mutability.
impl Interpreter {
    #[cfg(test)]
    pub(crate) fn stack(&self) -> &[Term] {
        &self.stack
    }

    #[cfg(test)]
    pub(crate) fn memory(&self) -> &[Term] {
        &self.memory
    }
}
