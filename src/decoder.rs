//! Maps the fixed integer opcode table to [`Opcode`] values and reads
//! length-prefixed id-list operands out of a word cursor.
//!
//! Opcode numbering is fixed by the wire format (§4.3/§6 byte-exactness) and
//! must not be renumbered even where the values look gappy (12–14 for the
//! three `Prop` axioms, 137/138 for the two out-of-band instructions).

use crate::error::VerifierError;
use crate::pattern::Id;

/// A machine word as it appears in a stream: an opcode, an id, a count, or
/// part of a length-prefixed id list, depending on position.
pub type Word = i64;

/// One verifier instruction, decoded from its integer opcode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub enum Opcode {
    EVar = 2,
    SVar = 3,
    Symbol = 4,
    Implication = 5,
    Application = 6,
    Mu = 7,
    Exists = 8,
    MetaVar = 9,
    ESubst = 10,
    SSubst = 11,
    Prop1 = 12,
    Prop2 = 13,
    Prop3 = 14,
    Quantifier = 15,
    PropagationOr = 16,
    PropagationExists = 17,
    PreFixpoint = 18,
    Existence = 19,
    Singleton = 20,
    ModusPonens = 21,
    Generalization = 22,
    Frame = 23,
    Substitution = 24,
    KnasterTarski = 25,
    Instantiate = 26,
    Pop = 27,
    Save = 28,
    Load = 29,
    Publish = 30,
    CleanMetaVar = 137,
    NoOp = 138,
}

impl Opcode {
    /// Decode a raw word into an [`Opcode`], failing on any value outside
    /// the fixed table.
    pub fn decode(value: Word) -> Result<Opcode, VerifierError> {
        Ok(match value {
            2 => Opcode::EVar,
            3 => Opcode::SVar,
            4 => Opcode::Symbol,
            5 => Opcode::Implication,
            6 => Opcode::Application,
            7 => Opcode::Mu,
            8 => Opcode::Exists,
            9 => Opcode::MetaVar,
            10 => Opcode::ESubst,
            11 => Opcode::SSubst,
            12 => Opcode::Prop1,
            13 => Opcode::Prop2,
            14 => Opcode::Prop3,
            15 => Opcode::Quantifier,
            16 => Opcode::PropagationOr,
            17 => Opcode::PropagationExists,
            18 => Opcode::PreFixpoint,
            19 => Opcode::Existence,
            20 => Opcode::Singleton,
            21 => Opcode::ModusPonens,
            22 => Opcode::Generalization,
            23 => Opcode::Frame,
            24 => Opcode::Substitution,
            25 => Opcode::KnasterTarski,
            26 => Opcode::Instantiate,
            27 => Opcode::Pop,
            28 => Opcode::Save,
            29 => Opcode::Load,
            30 => Opcode::Publish,
            137 => Opcode::CleanMetaVar,
            138 => Opcode::NoOp,
            other => return Err(VerifierError::UnknownOpcode(other)),
        })
    }

    /// Whether this opcode's rule is reserved (decoded for cursor safety,
    /// but fatal to execute; see §4.3 and DESIGN.md).
    pub fn is_reserved(self) -> bool {
        matches!(
            self,
            Opcode::PropagationOr
                | Opcode::PropagationExists
                | Opcode::PreFixpoint
                | Opcode::Singleton
                | Opcode::Frame
                | Opcode::KnasterTarski
        )
    }
}

/// A forward-only cursor over one instruction stream, providing the small
/// set of primitive reads every instruction's operand decoding is built
/// from.
pub struct Cursor<'a> {
    words: &'a [Word],
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Wrap `words`, assuming the caller has already skipped the leading
    /// size-prefix word (the top-level verifier does this once per stream).
    pub fn new(words: &'a [Word]) -> Self {
        Cursor { words, pos: 0 }
    }

    /// Whether the cursor has consumed the whole stream.
    pub fn at_end(&self) -> bool {
        self.pos >= self.words.len()
    }

    /// Read the next raw word, without interpreting it.
    fn next_word(&mut self, op: Opcode) -> Result<Word, VerifierError> {
        let word = self
            .words
            .get(self.pos)
            .copied()
            .ok_or(VerifierError::TruncatedOperand { op, expected: 1 })?;
        self.pos += 1;
        Ok(word)
    }

    /// Read the next opcode.
    pub fn next_opcode(&mut self) -> Result<Opcode, VerifierError> {
        let raw = self
            .words
            .get(self.pos)
            .copied()
            .ok_or(VerifierError::UnknownOpcode(Word::MIN))?;
        self.pos += 1;
        Opcode::decode(raw)
    }

    /// Read one non-negative id operand.
    pub fn next_id(&mut self, op: Opcode) -> Result<Id, VerifierError> {
        let raw = self.next_word(op)?;
        Id::try_from(raw).map_err(|_| VerifierError::InvalidId(raw))
    }

    /// Read one non-negative count operand (used by `Instantiate`'s `n`).
    pub fn next_count(&mut self, op: Opcode) -> Result<usize, VerifierError> {
        let raw = self.next_word(op)?;
        usize::try_from(raw).map_err(|_| VerifierError::InvalidId(raw))
    }

    /// Read a length-prefixed id list: one count word, then that many ids.
    pub fn next_id_list(&mut self, op: Opcode) -> Result<Vec<Id>, VerifierError> {
        let len = self.next_count(op)?;
        let mut ids = Vec::with_capacity(len);
        for _ in 0..len {
            ids.push(self.next_id(op)?);
        }
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_every_table_entry() {
        let table: &[(Word, Opcode)] = &[
            (2, Opcode::EVar),
            (9, Opcode::MetaVar),
            (26, Opcode::Instantiate),
            (137, Opcode::CleanMetaVar),
            (138, Opcode::NoOp),
        ];
        for (raw, expected) in table {
            assert_eq!(Opcode::decode(*raw).unwrap(), *expected);
        }
    }

    #[test]
    fn rejects_unknown_opcode() {
        assert!(matches!(
            Opcode::decode(1),
            Err(VerifierError::UnknownOpcode(1))
        ));
        assert!(matches!(
            Opcode::decode(999),
            Err(VerifierError::UnknownOpcode(999))
        ));
    }

    #[test]
    fn reserved_opcodes_are_flagged() {
        assert!(Opcode::Frame.is_reserved());
        assert!(Opcode::KnasterTarski.is_reserved());
        assert!(!Opcode::ModusPonens.is_reserved());
    }

    #[test]
    fn id_list_round_trips() {
        let words = [3, 10, 20, 30];
        let mut cursor = Cursor::new(&words);
        let ids = cursor.next_id_list(Opcode::MetaVar).unwrap();
        assert_eq!(ids, vec![10, 20, 30]);
        assert!(cursor.at_end());
    }

    #[test]
    fn truncated_operand_is_an_error() {
        let words = [2i64];
        let mut cursor = Cursor::new(&words);
        assert!(matches!(cursor.next_opcode().unwrap(), Opcode::EVar));
        assert!(matches!(
            cursor.next_id(Opcode::EVar),
            Err(VerifierError::TruncatedOperand { .. })
        ));
    }
}
