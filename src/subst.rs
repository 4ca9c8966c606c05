//! Simultaneous metavariable instantiation, and the single-variable element/
//! set substitution constructors used to build the `Quantifier` axiom and to
//! implement the `ESubst`/`SSubst`/`Substitution` instructions.

use std::rc::Rc;

use crate::error::VerifierError;
use crate::pattern::{Id, Pattern};

/// Simultaneously instantiate every `MetaVar(vars[k], ...)` occurring in `p`
/// with `plugs[k]`, checking every metavariable's freshness/polarity
/// side-conditions against its plug before substituting.
///
/// Returns `Ok(None)` when no metavariable in `vars` occurs anywhere in `p`
/// (the caller keeps the original `p` unchanged). `vars` and `plugs` are
/// parallel: when `vars` repeats an id, the first match wins.
pub fn instantiate(
    p: &Rc<Pattern>,
    vars: &[Id],
    plugs: &[Rc<Pattern>],
) -> Result<Option<Rc<Pattern>>, VerifierError> {
    match p.as_ref() {
        Pattern::EVar(_) | Pattern::SVar(_) | Pattern::Symbol(_) => Ok(None),
        Pattern::MetaVar {
            id,
            e_fresh,
            s_fresh,
            positive,
            negative,
            ..
        } => {
            let Some(pos) = vars.iter().position(|v| v == id) else {
                return Ok(None);
            };
            let plug = &plugs[pos];
            for e in e_fresh {
                if !plug.e_fresh(*e) {
                    return Err(VerifierError::SideCondition {
                        metavar: *id,
                        condition: "e-fresh",
                        id: *e,
                    });
                }
            }
            for s in s_fresh {
                if !plug.s_fresh(*s) {
                    return Err(VerifierError::SideCondition {
                        metavar: *id,
                        condition: "s-fresh",
                        id: *s,
                    });
                }
            }
            for s in positive {
                if !plug.positive(*s) {
                    return Err(VerifierError::SideCondition {
                        metavar: *id,
                        condition: "positive",
                        id: *s,
                    });
                }
            }
            for s in negative {
                if !plug.negative(*s) {
                    return Err(VerifierError::SideCondition {
                        metavar: *id,
                        condition: "negative",
                        id: *s,
                    });
                }
            }
            Ok(Some(plug.clone()))
        }
        Pattern::Implication(l, r) => instantiate_binary(l, r, vars, plugs, Pattern::implies),
        Pattern::Application(l, r) => instantiate_binary(l, r, vars, plugs, Pattern::app),
        Pattern::Exists { id, body } => {
            let inst_body = instantiate(body, vars, plugs)?;
            Ok(inst_body.map(|b| Pattern::exists(*id, b)))
        }
        Pattern::Mu { id, body } => {
            let inst_body = instantiate(body, vars, plugs)?;
            Ok(inst_body.map(|b| Pattern::mu(*id, b)))
        }
        Pattern::ESubst {
            body, evar_id, plug, ..
        } => {
            let inst_body = instantiate(body, vars, plugs)?;
            let inst_plug = instantiate(plug, vars, plugs)?;
            if inst_body.is_none() && inst_plug.is_none() {
                return Ok(None);
            }
            let new_body = inst_body.unwrap_or_else(|| body.clone());
            let new_plug = inst_plug.unwrap_or_else(|| plug.clone());
            // The pending substitution reduces as soon as the body is no
            // longer headed by a metavariable.
            if new_body.is_substitutable_head() {
                Ok(Some(Pattern::esubst(new_body, *evar_id, new_plug)))
            } else {
                Ok(Some(apply_esubst(&new_body, *evar_id, &new_plug)))
            }
        }
        Pattern::SSubst {
            body, svar_id, plug, ..
        } => {
            let inst_body = instantiate(body, vars, plugs)?;
            let inst_plug = instantiate(plug, vars, plugs)?;
            if inst_body.is_none() && inst_plug.is_none() {
                return Ok(None);
            }
            let new_body = inst_body.unwrap_or_else(|| body.clone());
            let new_plug = inst_plug.unwrap_or_else(|| plug.clone());
            if new_body.is_substitutable_head() {
                Ok(Some(Pattern::ssubst(new_body, *svar_id, new_plug)))
            } else {
                Ok(Some(apply_ssubst(&new_body, *svar_id, &new_plug)))
            }
        }
    }
}

fn instantiate_binary(
    l: &Rc<Pattern>,
    r: &Rc<Pattern>,
    vars: &[Id],
    plugs: &[Rc<Pattern>],
    rebuild: fn(Rc<Pattern>, Rc<Pattern>) -> Rc<Pattern>,
) -> Result<Option<Rc<Pattern>>, VerifierError> {
    let inst_l = instantiate(l, vars, plugs)?;
    let inst_r = instantiate(r, vars, plugs)?;
    if inst_l.is_none() && inst_r.is_none() {
        return Ok(None);
    }
    let new_l = inst_l.unwrap_or_else(|| l.clone());
    let new_r = inst_r.unwrap_or_else(|| r.clone());
    Ok(Some(rebuild(new_l, new_r)))
}

/// Substitute `ψ` for every free occurrence of element variable `x` in `φ`.
///
/// Concrete connectives distribute the substitution into their children;
/// `Exists(x, _)` blocks (the binder shadows `x`); a `MetaVar`, `ESubst`, or
/// `SSubst` head cannot reduce further and is wrapped in a deferred
/// `ESubst` node instead.
pub fn apply_esubst(phi: &Rc<Pattern>, x: Id, psi: &Rc<Pattern>) -> Rc<Pattern> {
    match phi.as_ref() {
        Pattern::EVar(y) => {
            if *y == x {
                psi.clone()
            } else {
                phi.clone()
            }
        }
        Pattern::SVar(_) | Pattern::Symbol(_) => phi.clone(),
        Pattern::Implication(l, r) => {
            Pattern::implies(apply_esubst(l, x, psi), apply_esubst(r, x, psi))
        }
        Pattern::Application(l, r) => Pattern::app(apply_esubst(l, x, psi), apply_esubst(r, x, psi)),
        Pattern::Exists { id, body } => {
            if *id == x {
                phi.clone()
            } else {
                Pattern::exists(*id, apply_esubst(body, x, psi))
            }
        }
        Pattern::Mu { id, body } => Pattern::mu(*id, apply_esubst(body, x, psi)),
        Pattern::MetaVar { .. } | Pattern::ESubst { .. } | Pattern::SSubst { .. } => {
            Pattern::esubst(phi.clone(), x, psi.clone())
        }
    }
}

/// Substitute `ψ` for every free occurrence of set variable `X` in `φ`.
/// Symmetric to [`apply_esubst`]; `Mu(X, _)` blocks instead of `Exists`.
pub fn apply_ssubst(phi: &Rc<Pattern>, x: Id, psi: &Rc<Pattern>) -> Rc<Pattern> {
    match phi.as_ref() {
        Pattern::SVar(y) => {
            if *y == x {
                psi.clone()
            } else {
                phi.clone()
            }
        }
        Pattern::EVar(_) | Pattern::Symbol(_) => phi.clone(),
        Pattern::Implication(l, r) => {
            Pattern::implies(apply_ssubst(l, x, psi), apply_ssubst(r, x, psi))
        }
        Pattern::Application(l, r) => Pattern::app(apply_ssubst(l, x, psi), apply_ssubst(r, x, psi)),
        Pattern::Exists { id, body } => Pattern::exists(*id, apply_ssubst(body, x, psi)),
        Pattern::Mu { id, body } => {
            if *id == x {
                phi.clone()
            } else {
                Pattern::mu(*id, apply_ssubst(body, x, psi))
            }
        }
        Pattern::MetaVar { .. } | Pattern::ESubst { .. } | Pattern::SSubst { .. } => {
            Pattern::ssubst(phi.clone(), x, psi.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::IdSet;

    #[test]
    fn apply_esubst_atomic_cases() {
        assert_eq!(
            apply_esubst(&Pattern::evar(0), 0, &Pattern::symbol(1)),
            Pattern::symbol(1)
        );
        assert_eq!(
            apply_esubst(&Pattern::evar(0), 0, &Pattern::evar(2)),
            Pattern::evar(2)
        );
        assert_eq!(
            apply_esubst(&Pattern::evar(0), 1, &Pattern::evar(2)),
            Pattern::evar(0)
        );
        assert_eq!(
            apply_esubst(&Pattern::svar(0), 0, &Pattern::symbol(0)),
            Pattern::svar(0)
        );
        assert_eq!(
            apply_esubst(&Pattern::symbol(0), 0, &Pattern::symbol(1)),
            Pattern::symbol(0)
        );
    }

    #[test]
    fn apply_esubst_distributes() {
        let pattern = Pattern::implies(Pattern::evar(7), Pattern::symbol(1));
        let plug = Pattern::symbol(0);
        assert_eq!(
            apply_esubst(&pattern, 7, &plug),
            Pattern::implies(Pattern::symbol(0), Pattern::symbol(1))
        );
        assert_eq!(apply_esubst(&pattern, 6, &plug), pattern);
    }

    #[test]
    fn apply_esubst_binder_blocks() {
        let pattern = Pattern::exists(1, Pattern::evar(1));
        let plug = Pattern::symbol(2);
        assert_eq!(apply_esubst(&pattern, 0, &plug), pattern);

        let pattern = Pattern::exists(0, Pattern::evar(1));
        assert_eq!(
            apply_esubst(&pattern, 1, &plug),
            Pattern::exists(0, Pattern::symbol(2))
        );
    }

    #[test]
    fn apply_esubst_mu_does_not_block() {
        let pattern = Pattern::mu(1, Pattern::evar(1));
        let plug = Pattern::symbol(2);
        assert_eq!(apply_esubst(&pattern, 0, &plug), pattern);
        assert_eq!(
            apply_esubst(&pattern, 1, &plug),
            Pattern::mu(1, Pattern::symbol(2))
        );
    }

    #[test]
    fn apply_esubst_wraps_metavar_and_stacks_on_subst_heads() {
        let mv = Pattern::metavar_unconstrained(0);
        let plug = Pattern::symbol(1);
        assert_eq!(
            apply_esubst(&mv, 0, &plug),
            Pattern::esubst(mv.clone(), 0, plug.clone())
        );

        let esubst = Pattern::esubst(mv.clone(), 0, plug.clone());
        assert_eq!(
            apply_esubst(&esubst, 0, &plug),
            Pattern::esubst(esubst.clone(), 0, plug.clone())
        );

        let ssubst = Pattern::ssubst(mv, 0, plug.clone());
        assert_eq!(
            apply_esubst(&ssubst, 0, &plug),
            Pattern::esubst(ssubst, 0, plug)
        );
    }

    #[test]
    fn apply_ssubst_atomic_cases() {
        assert_eq!(
            apply_ssubst(&Pattern::evar(0), 0, &Pattern::symbol(1)),
            Pattern::evar(0)
        );
        assert_eq!(
            apply_ssubst(&Pattern::evar(0), 1, &Pattern::evar(2)),
            Pattern::evar(0)
        );
        assert_eq!(
            apply_ssubst(&Pattern::svar(0), 0, &Pattern::symbol(0)),
            Pattern::symbol(0)
        );
        assert_eq!(
            apply_ssubst(&Pattern::svar(1), 0, &Pattern::evar(0)),
            Pattern::svar(1)
        );
        assert_eq!(
            apply_ssubst(&Pattern::symbol(0), 0, &Pattern::symbol(1)),
            Pattern::symbol(0)
        );
    }

    #[test]
    fn apply_ssubst_mu_blocks() {
        let pattern = Pattern::mu(0, Pattern::svar(0));
        let plug = Pattern::symbol(1);
        assert_eq!(apply_ssubst(&pattern, 0, &plug), pattern);
    }

    #[test]
    fn instantiate_returns_none_when_no_metavar_matches() {
        let phi = Pattern::implies(Pattern::evar(0), Pattern::symbol(1));
        let result = instantiate(&phi, &[0], &[Pattern::symbol(7)]).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn instantiate_first_match_wins_on_repeated_vars() {
        let mv = Pattern::metavar_unconstrained(0);
        let result = instantiate(&mv, &[0, 0], &[Pattern::symbol(1), Pattern::symbol(2)])
            .unwrap()
            .unwrap();
        assert_eq!(result, Pattern::symbol(1));
    }

    #[test]
    fn instantiate_rejects_plug_violating_e_fresh() {
        let mv = Pattern::metavar(
            0,
            IdSet::from([1]),
            IdSet::new(),
            IdSet::new(),
            IdSet::new(),
            IdSet::new(),
        );
        let err = instantiate(&mv, &[0], &[Pattern::evar(1)]).unwrap_err();
        assert!(matches!(err, VerifierError::SideCondition { .. }));
    }

    #[test]
    fn instantiate_reduces_deferred_esubst_once_body_is_concrete() {
        // Quantifier-shaped: ESubst(phi0, 0, evar(1))[phi0 := symbol(9)]
        let phi0 = Pattern::metavar_unconstrained(0);
        let esubst = Pattern::esubst(phi0, 0, Pattern::evar(1));
        let result = instantiate(&esubst, &[0], &[Pattern::symbol(9)])
            .unwrap()
            .unwrap();
        // Body becomes Symbol(9), which is e-fresh in 0, so ESubst reduces to
        // applying apply_esubst(symbol(9), 0, evar(1)) = symbol(9).
        assert_eq!(result, Pattern::symbol(9));
    }
}
