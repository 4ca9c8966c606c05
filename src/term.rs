//! The two-variant wrapper the interpreter stack and memory hold: a bare
//! syntactic pattern under construction, or a pattern the interpreter has
//! certified as derivable ("proved").

use std::rc::Rc;

use crate::error::VerifierError;
use crate::pattern::Pattern;

/// A value on the interpreter's stack or in its memory table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Term {
    /// A pattern under construction, not yet known to be derivable.
    Syntactic(Rc<Pattern>),
    /// A pattern the interpreter has certified as derivable from Γ and the
    /// axiom schemas.
    Proved(Rc<Pattern>),
}

impl Term {
    /// The pattern this term wraps, regardless of variant.
    pub fn pattern(&self) -> &Rc<Pattern> {
        match self {
            Term::Syntactic(p) | Term::Proved(p) => p,
        }
    }

    /// Unwrap a [`Term::Syntactic`], or fail with [`VerifierError::WrongTermVariant`].
    pub fn into_pattern(self) -> Result<Rc<Pattern>, VerifierError> {
        match self {
            Term::Syntactic(p) => Ok(p),
            Term::Proved(_) => Err(VerifierError::WrongTermVariant {
                expected: "syntactic pattern",
            }),
        }
    }

    /// Unwrap a [`Term::Proved`], or fail with [`VerifierError::WrongTermVariant`].
    pub fn into_proved(self) -> Result<Rc<Pattern>, VerifierError> {
        match self {
            Term::Proved(p) => Ok(p),
            Term::Syntactic(_) => Err(VerifierError::WrongTermVariant { expected: "proved" }),
        }
    }
}
