//! The matching-logic pattern AST, its structural equality, and the
//! freshness / polarity / well-formedness predicates that gate every
//! construction and rule in the interpreter.
//!
//! Patterns form a DAG via `Rc` sharing — the grammar is strictly inductive
//! (every constructor takes already-built children), so no cycle is ever
//! representable and plain reference counting is enough; there is no need
//! for an arena or a `Weak` anywhere in this module.

use std::collections::BTreeSet;
use std::rc::Rc;

/// A non-negative integer naming an element variable, set variable, symbol,
/// or metavariable. Ids are namespace-distinguished by the pattern kind that
/// holds them, not by the `Id` type itself.
pub type Id = u32;

/// An id set, e.g. a metavariable's e-fresh or app-ctx-hole set. Ordered so
/// that two patterns built from differently-ordered but equal sets compare
/// structurally equal, matching the reference checker's set semantics.
pub type IdSet = BTreeSet<Id>;

/// A matching-logic pattern.
///
/// Structural equality (`PartialEq`) is deep and total: two `Pattern`s are
/// equal iff their tags and all substructure match, recursively through any
/// shared `Rc` children. This is exactly the equality the interpreter uses
/// to compare `ModusPonens` antecedents and `Publish` claims against
/// theorems.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub enum Pattern {
    /// An element variable.
    EVar(Id),
    /// A set variable.
    SVar(Id),
    /// A constant symbol.
    Symbol(Id),
    /// `left -> right`.
    Implication(Rc<Pattern>, Rc<Pattern>),
    /// `left right` (application).
    Application(Rc<Pattern>, Rc<Pattern>),
    /// `exists id. body`.
    Exists { id: Id, body: Rc<Pattern> },
    /// `mu id. body`, well-formed only if `body` is positive in `id`.
    Mu { id: Id, body: Rc<Pattern> },
    /// A placeholder for a whole pattern, constrained by freshness and
    /// polarity side-conditions its eventual instantiation must satisfy.
    MetaVar {
        id: Id,
        e_fresh: IdSet,
        s_fresh: IdSet,
        positive: IdSet,
        negative: IdSet,
        app_ctx_holes: IdSet,
    },
    /// A deferred element-variable substitution `body[plug / evar_id]`.
    ESubst {
        body: Rc<Pattern>,
        evar_id: Id,
        plug: Rc<Pattern>,
    },
    /// A deferred set-variable substitution `body[plug / svar_id]`.
    SSubst {
        body: Rc<Pattern>,
        svar_id: Id,
        plug: Rc<Pattern>,
    },
}

impl Pattern {
    /// `EVar(id)`.
    pub fn evar(id: Id) -> Rc<Pattern> {
        Rc::new(Pattern::EVar(id))
    }

    /// `SVar(id)`.
    pub fn svar(id: Id) -> Rc<Pattern> {
        Rc::new(Pattern::SVar(id))
    }

    /// `Symbol(id)`.
    pub fn symbol(id: Id) -> Rc<Pattern> {
        Rc::new(Pattern::Symbol(id))
    }

    /// A metavariable with no freshness, polarity, or hole constraints.
    pub fn metavar_unconstrained(id: Id) -> Rc<Pattern> {
        Rc::new(Pattern::MetaVar {
            id,
            e_fresh: IdSet::new(),
            s_fresh: IdSet::new(),
            positive: IdSet::new(),
            negative: IdSet::new(),
            app_ctx_holes: IdSet::new(),
        })
    }

    /// A metavariable constrained by all five id-sets.
    pub fn metavar(
        id: Id,
        e_fresh: IdSet,
        s_fresh: IdSet,
        positive: IdSet,
        negative: IdSet,
        app_ctx_holes: IdSet,
    ) -> Rc<Pattern> {
        Rc::new(Pattern::MetaVar {
            id,
            e_fresh,
            s_fresh,
            positive,
            negative,
            app_ctx_holes,
        })
    }

    /// `left -> right`.
    pub fn implies(left: Rc<Pattern>, right: Rc<Pattern>) -> Rc<Pattern> {
        Rc::new(Pattern::Implication(left, right))
    }

    /// `left right`.
    pub fn app(left: Rc<Pattern>, right: Rc<Pattern>) -> Rc<Pattern> {
        Rc::new(Pattern::Application(left, right))
    }

    /// `exists id. body`.
    pub fn exists(id: Id, body: Rc<Pattern>) -> Rc<Pattern> {
        Rc::new(Pattern::Exists { id, body })
    }

    /// `mu id. body`.
    pub fn mu(id: Id, body: Rc<Pattern>) -> Rc<Pattern> {
        Rc::new(Pattern::Mu { id, body })
    }

    /// `body[plug / evar_id]`, deferred.
    pub fn esubst(body: Rc<Pattern>, evar_id: Id, plug: Rc<Pattern>) -> Rc<Pattern> {
        Rc::new(Pattern::ESubst {
            body,
            evar_id,
            plug,
        })
    }

    /// `body[plug / svar_id]`, deferred.
    pub fn ssubst(body: Rc<Pattern>, svar_id: Id, plug: Rc<Pattern>) -> Rc<Pattern> {
        Rc::new(Pattern::SSubst {
            body,
            svar_id,
            plug,
        })
    }

    /// `bot := mu X0. X0`.
    pub fn bot() -> Rc<Pattern> {
        Pattern::mu(0, Pattern::svar(0))
    }

    /// `not p := p -> bot`.
    pub fn negate(p: Rc<Pattern>) -> Rc<Pattern> {
        Pattern::implies(p, Pattern::bot())
    }

    /// `forall evar. p := not (exists evar. not p)`.
    pub fn forall(evar: Id, p: Rc<Pattern>) -> Rc<Pattern> {
        Pattern::negate(Pattern::exists(evar, Pattern::negate(p)))
    }

    /// Whether `x` does not occur free as an element variable in `self`.
    pub fn e_fresh(&self, x: Id) -> bool {
        match self {
            Pattern::EVar(y) => *y != x,
            Pattern::SVar(_) | Pattern::Symbol(_) => true,
            Pattern::MetaVar { e_fresh, .. } => e_fresh.contains(&x),
            Pattern::Implication(l, r) | Pattern::Application(l, r) => {
                l.e_fresh(x) && r.e_fresh(x)
            }
            Pattern::Exists { id, body } => *id == x || body.e_fresh(x),
            Pattern::Mu { body, .. } => body.e_fresh(x),
            Pattern::ESubst {
                body, evar_id, plug, ..
            } => {
                if x == *evar_id {
                    // Every free occurrence of evar_id is being substituted.
                    plug.e_fresh(x)
                } else {
                    body.e_fresh(x) && plug.e_fresh(x)
                }
            }
            Pattern::SSubst { body, plug, .. } => body.e_fresh(x) && plug.e_fresh(x),
        }
    }

    /// Whether `x` does not occur free as a set variable in `self`.
    pub fn s_fresh(&self, x: Id) -> bool {
        match self {
            Pattern::EVar(_) | Pattern::Symbol(_) => true,
            Pattern::SVar(y) => *y != x,
            Pattern::MetaVar { s_fresh, .. } => s_fresh.contains(&x),
            Pattern::Implication(l, r) | Pattern::Application(l, r) => {
                l.s_fresh(x) && r.s_fresh(x)
            }
            Pattern::Exists { body, .. } => body.s_fresh(x),
            Pattern::Mu { id, body } => *id == x || body.s_fresh(x),
            Pattern::ESubst { body, plug, .. } => body.s_fresh(x) && plug.s_fresh(x),
            Pattern::SSubst {
                body, svar_id, plug, ..
            } => {
                if x == *svar_id {
                    plug.s_fresh(x)
                } else {
                    body.s_fresh(x) && plug.s_fresh(x)
                }
            }
        }
    }

    /// Monotone occurrence of set variable `x` in `self`.
    pub fn positive(&self, x: Id) -> bool {
        match self {
            Pattern::EVar(_) | Pattern::Symbol(_) => true,
            Pattern::SVar(_) => true,
            Pattern::MetaVar { positive, .. } => positive.contains(&x),
            Pattern::Implication(l, r) => l.negative(x) && r.positive(x),
            Pattern::Application(l, r) => l.positive(x) && r.positive(x),
            Pattern::Exists { body, .. } => body.positive(x),
            Pattern::Mu { id, body } => *id == x || body.positive(x),
            Pattern::ESubst { body, plug, .. } => body.positive(x) && plug.s_fresh(x),
            Pattern::SSubst {
                body, svar_id, plug, ..
            } => {
                let plug_pos = plug.s_fresh(x)
                    || (body.positive(*svar_id) && plug.positive(x))
                    || (body.negative(*svar_id) && plug.negative(x));
                if x == *svar_id {
                    plug_pos
                } else {
                    body.positive(x) && plug_pos
                }
            }
        }
    }

    /// Antitone occurrence of set variable `x` in `self`.
    pub fn negative(&self, x: Id) -> bool {
        match self {
            Pattern::EVar(_) | Pattern::Symbol(_) => true,
            Pattern::SVar(y) => *y != x,
            Pattern::MetaVar { negative, .. } => negative.contains(&x),
            Pattern::Implication(l, r) => l.positive(x) && r.negative(x),
            Pattern::Application(l, r) => l.negative(x) && r.negative(x),
            // Conservative approximation carried over from the reference
            // checker: freshness under the binder, not true negativity.
            Pattern::Exists { body, .. } => body.s_fresh(x),
            Pattern::Mu { id, body } => *id == x || body.negative(x),
            Pattern::ESubst { body, plug, .. } => body.negative(x) && plug.s_fresh(x),
            Pattern::SSubst {
                body, svar_id, plug, ..
            } => {
                let plug_neg = plug.s_fresh(x)
                    || (body.positive(*svar_id) && plug.negative(x))
                    || (body.negative(*svar_id) && plug.positive(x));
                if x == *svar_id {
                    plug_neg
                } else {
                    body.negative(x) && plug_neg
                }
            }
        }
    }

    /// Whether `self` is well-formed, assuming all subpatterns already are.
    ///
    /// Only `MetaVar`, `Mu`, `ESubst`, and `SSubst` carry an invariant beyond
    /// "well-formed by construction"; every other kind returns `false` here,
    /// matching the reference checker (the interpreter only ever asks this
    /// question about those four kinds).
    pub fn well_formed(&self) -> bool {
        match self {
            Pattern::MetaVar {
                e_fresh,
                app_ctx_holes,
                ..
            } => app_ctx_holes.is_disjoint(e_fresh),
            Pattern::Mu { id, body } => body.positive(*id),
            Pattern::ESubst { body, evar_id, .. } => !body.e_fresh(*evar_id),
            Pattern::SSubst { body, svar_id, .. } => !body.s_fresh(*svar_id),
            _ => false,
        }
    }

    /// Whether `self` is an application-context hole for element variable
    /// `x`: `EVar(x)` itself, a `MetaVar` whose hole-set contains `x`, or an
    /// `Application` where exactly one side is a hole for `x` and the other
    /// is e-fresh in `x`.
    pub fn app_ctx_hole(&self, x: Id) -> bool {
        match self {
            Pattern::EVar(y) => *y == x,
            Pattern::MetaVar { app_ctx_holes, .. } => app_ctx_holes.contains(&x),
            Pattern::Application(l, r) => {
                (l.app_ctx_hole(x) && r.e_fresh(x)) || (r.app_ctx_hole(x) && l.e_fresh(x))
            }
            _ => false,
        }
    }

    /// The constructor tag as a `MetaVar`/`ESubst`/`SSubst` head, used by the
    /// interpreter to gate `Substitution`/`ESubst`/`SSubst` and the
    /// recursive case of `instantiate`.
    pub fn is_substitutable_head(&self) -> bool {
        matches!(
            self,
            Pattern::MetaVar { .. } | Pattern::ESubst { .. } | Pattern::SSubst { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exists_is_e_fresh_in_its_own_binder() {
        let p = Pattern::exists(0, Pattern::evar(0));
        assert!(p.e_fresh(0));
    }

    #[test]
    fn mu_is_s_fresh_in_its_own_binder() {
        let p = Pattern::mu(0, Pattern::svar(0));
        assert!(p.s_fresh(0));
    }

    #[test]
    fn e_fresh_atoms() {
        assert!(Pattern::evar(1).e_fresh(0));
        assert!(!Pattern::evar(0).e_fresh(0));
        assert!(Pattern::svar(0).e_fresh(0));
        assert!(Pattern::symbol(0).e_fresh(0));
    }

    #[test]
    fn e_fresh_metavar_reads_its_set() {
        let mv = Pattern::metavar(
            0,
            IdSet::from([1]),
            IdSet::new(),
            IdSet::new(),
            IdSet::new(),
            IdSet::new(),
        );
        assert!(mv.e_fresh(1));
        assert!(!mv.e_fresh(2));
    }

    #[test]
    fn positivity_requires_explicit_membership() {
        // A metavar fresh in a set variable is not automatically positive in
        // it unless the id is explicitly in the positive set: this is the
        // "later/richer" variant called for in the spec when reference
        // copies disagree.
        let mv = Pattern::metavar(
            1,
            IdSet::new(),
            IdSet::from([1]),
            IdSet::new(),
            IdSet::new(),
            IdSet::new(),
        );
        assert!(!mv.positive(1));
    }

    #[test]
    fn app_ctx_hole_atoms() {
        assert!(!Pattern::metavar_unconstrained(0).app_ctx_hole(0));
        assert!(Pattern::evar(0).app_ctx_hole(0));
        assert!(!Pattern::evar(1).app_ctx_hole(0));
        assert!(!Pattern::svar(0).app_ctx_hole(0));
        assert!(!Pattern::symbol(0).app_ctx_hole(0));
    }

    #[test]
    fn app_ctx_hole_distributes_over_application() {
        let hole = Pattern::evar(0);
        let fresh = Pattern::evar(1);
        assert!(Pattern::app(hole.clone(), fresh.clone()).app_ctx_hole(0));
        assert!(Pattern::app(fresh, hole).app_ctx_hole(0));
        assert!(!Pattern::exists(0, Pattern::evar(0)).app_ctx_hole(0));
    }

    #[test]
    fn well_formed_metavar_rejects_hole_in_fresh_set() {
        let bad = Pattern::metavar(
            0,
            IdSet::from([1]),
            IdSet::new(),
            IdSet::new(),
            IdSet::new(),
            IdSet::from([1]),
        );
        assert!(!bad.well_formed());

        let ok = Pattern::metavar(
            0,
            IdSet::from([1]),
            IdSet::new(),
            IdSet::new(),
            IdSet::new(),
            IdSet::from([2]),
        );
        assert!(ok.well_formed());
    }

    #[test]
    fn well_formed_mu_requires_positivity() {
        let phi = Pattern::metavar(
            0,
            IdSet::new(),
            IdSet::new(),
            IdSet::from([0]),
            IdSet::new(),
            IdSet::new(),
        );
        assert!(Pattern::mu(0, phi).well_formed());

        let not_positive = Pattern::metavar_unconstrained(0);
        assert!(!Pattern::mu(0, not_positive).well_formed());
    }

    #[test]
    fn structural_equality_is_deep_and_does_not_canonicalize() {
        let a = Pattern::symbol(0);
        let b = Pattern::symbol(1);
        let implication = Pattern::implies(a.clone(), b.clone());
        match implication.as_ref() {
            Pattern::Implication(left, right) => {
                assert_eq!(left, &a);
                assert_eq!(right, &b);
            }
            _ => panic!("expected Implication"),
        }
        assert_eq!(Pattern::implies(a.clone(), b.clone()), implication);
        assert_ne!(Pattern::implies(b, a), implication);
    }
}
