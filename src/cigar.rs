//! Edit scripts.
//!
//! A [`Cigar`] lists, in order, the operations that turn the pattern into
//! the text: `M` consumes one character of each (equal), `X` one of each
//! (different), `I` one text character, `D` one pattern character.

use std::fmt;

use crate::penalties::Penalties;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CigarOp {
    Match,
    Mismatch,
    Insertion,
    Deletion,
}

impl CigarOp {
    pub fn symbol(self) -> char {
        match self {
            CigarOp::Match => 'M',
            CigarOp::Mismatch => 'X',
            CigarOp::Insertion => 'I',
            CigarOp::Deletion => 'D',
        }
    }

    /// Pattern and text characters consumed.
    pub fn consumes(self) -> (usize, usize) {
        match self {
            CigarOp::Match | CigarOp::Mismatch => (1, 1),
            CigarOp::Insertion => (0, 1),
            CigarOp::Deletion => (1, 0),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Cigar {
    ops: Vec<CigarOp>,
}

impl Cigar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ops(ops: Vec<CigarOp>) -> Self {
        Cigar { ops }
    }

    /// Build from `(op, count)` runs; zero-length runs are skipped.
    pub fn from_runs(runs: &[(CigarOp, usize)]) -> Self {
        let mut ops = Vec::with_capacity(runs.iter().map(|r| r.1).sum());
        for &(op, n) in runs {
            ops.extend(std::iter::repeat(op).take(n));
        }
        Cigar { ops }
    }

    pub(crate) fn push(&mut self, op: CigarOp) {
        self.ops.push(op);
    }

    pub(crate) fn push_n(&mut self, op: CigarOp, n: usize) {
        self.ops.extend(std::iter::repeat(op).take(n));
    }

    pub(crate) fn reverse(&mut self) {
        self.ops.reverse();
    }

    pub fn ops(&self) -> &[CigarOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Maximal runs of identical operations.
    pub fn runs(&self) -> Vec<(CigarOp, usize)> {
        let mut runs: Vec<(CigarOp, usize)> = Vec::new();
        for &op in &self.ops {
            match runs.last_mut() {
                Some((last, n)) if *last == op => *n += 1,
                _ => runs.push((op, 1)),
            }
        }
        runs
    }

    /// Pattern characters consumed.
    pub fn pattern_len(&self) -> usize {
        self.ops.iter().map(|op| op.consumes().0).sum()
    }

    /// Text characters consumed.
    pub fn text_len(&self) -> usize {
        self.ops.iter().map(|op| op.consumes().1).sum()
    }

    /// Whether the script turns `pattern` into `text` exactly: it consumes
    /// both in full and every `M`/`X` agrees with the characters it covers.
    pub fn is_valid_for(&self, pattern: &[u8], text: &[u8]) -> bool {
        let (mut v, mut h) = (0usize, 0usize);
        for &op in &self.ops {
            match op {
                CigarOp::Match | CigarOp::Mismatch => {
                    let (Some(a), Some(b)) = (pattern.get(v), text.get(h)) else {
                        return false;
                    };
                    if (a == b) != (op == CigarOp::Match) {
                        return false;
                    }
                    v += 1;
                    h += 1;
                }
                CigarOp::Insertion => {
                    if h >= text.len() {
                        return false;
                    }
                    h += 1;
                }
                CigarOp::Deletion => {
                    if v >= pattern.len() {
                        return false;
                    }
                    v += 1;
                }
            }
        }
        v == pattern.len() && h == text.len()
    }

    /// Cost of the script under `penalties`; each maximal gap run is
    /// charged as one gap.
    pub fn score(&self, penalties: &Penalties) -> i32 {
        self.runs()
            .into_iter()
            .map(|(op, n)| match op {
                CigarOp::Match => 0,
                CigarOp::Mismatch => penalties.mismatch() * n as i32,
                CigarOp::Insertion | CigarOp::Deletion => penalties.gap_cost(n),
            })
            .sum()
    }
}

impl fmt::Display for Cigar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (op, n) in self.runs() {
            write!(f, "{}{}", n, op.symbol())?;
        }
        Ok(())
    }
}

impl FromIterator<CigarOp> for Cigar {
    fn from_iter<T: IntoIterator<Item = CigarOp>>(iter: T) -> Self {
        Cigar {
            ops: iter.into_iter().collect(),
        }
    }
}
