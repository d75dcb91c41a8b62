//! Pattern match compilation.
//!
//! A `Match` is compiled into a chain of test blocks, one per branch, in
//! branch order. Each test either binds its sub-values and branches to the
//! branch's destination, or falls through to the next test. The last test
//! falls through to the caller's `fallthrough` block; when there is none the
//! caller asserts the match is exhaustive and the final failure edge ends in
//! `Unreachable`.
//!
//! Destination blocks receive the values a pattern binds first, followed by
//! the branch's own `dest_args`:
//!
//! | pattern          | bound values          |
//! |------------------|-----------------------|
//! | `Any`            | none                  |
//! | `Cons`           | head, tail            |
//! | `Tuple(n)`       | elements `0..n`       |
//! | `MapItem(key)`   | the value under `key` |
//! | `IsType(t)`      | none                  |
//! | `Value(v)`       | none                  |
//! | `Binary { .. }`  | segment value, rest   |

use tracing::{debug, instrument};

use crate::error::LowerError;
use crate::ir::binary::BinarySpecifier;
use crate::ir::block::BlockId;
use crate::ir::instr::IrInstr;
use crate::ir::loc::LocId;
use crate::ir::types::{IrType, TermType};
use crate::ir::value::ValueId;
use crate::lower::Lowerer;

/// The shape a branch tests its selector against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchPattern {
    Any,
    /// A non-empty list.
    Cons,
    /// A tuple of exactly this many elements.
    Tuple(u32),
    /// A map containing the key.
    MapItem(ValueId),
    IsType(TermType),
    /// A term exactly equal to the value.
    Value(ValueId),
    /// A bitstring with at least one more segment of this shape.
    Binary {
        spec: BinarySpecifier,
        size: Option<ValueId>,
    },
}

impl MatchPattern {
    /// Number of values this pattern passes to its destination ahead of the
    /// branch arguments.
    pub fn bindings(&self) -> usize {
        match self {
            MatchPattern::Any | MatchPattern::IsType(_) | MatchPattern::Value(_) => 0,
            MatchPattern::Cons | MatchPattern::Binary { .. } => 2,
            MatchPattern::Tuple(arity) => *arity as usize,
            MatchPattern::MapItem(_) => 1,
        }
    }

    /// Whether the pattern matches every term.
    pub fn is_irrefutable(&self) -> bool {
        matches!(
            self,
            MatchPattern::Any | MatchPattern::IsType(TermType::Any)
        )
    }
}

/// One arm of a match.
#[derive(Debug, Clone)]
pub struct MatchBranch {
    pub loc: Option<LocId>,
    pub dest: BlockId,
    pub dest_args: Vec<ValueId>,
    pub pattern: MatchPattern,
}

/// An ordered match over one selector. The first matching branch wins.
#[derive(Debug, Clone)]
pub struct Match {
    pub loc: Option<LocId>,
    pub selector: ValueId,
    pub branches: Vec<MatchBranch>,
    pub fallthrough: Option<BlockId>,
}

impl Lowerer<'_> {
    /// Compiles `m` at the cursor. Seals the current block and every block
    /// the compilation creates.
    #[instrument(skip_all, fields(selector = %m.selector, branches = m.branches.len()))]
    pub fn lower_match(&mut self, m: &Match) -> Result<(), LowerError> {
        if m.branches.is_empty() {
            return Err(LowerError::EmptyMatch);
        }
        // Nothing is emitted for a malformed match.
        for branch in &m.branches {
            if let MatchPattern::Tuple(arity) = branch.pattern {
                TermType::tuple(arity)?;
            }
            self.check_arity(
                branch.dest,
                branch.pattern.bindings() + branch.dest_args.len(),
            )?;
        }
        if let Some(fallthrough) = m.fallthrough {
            self.check_arity(fallthrough, 0)?;
        }

        let saved = self.builder.set_location(m.loc);
        let last = m.branches.len() - 1;
        for (i, branch) in m.branches.iter().enumerate() {
            self.builder.set_location(branch.loc.or(m.loc));

            if self.always_matches(m.selector, &branch.pattern) {
                self.br(branch.dest, branch.dest_args.clone());
                if i < last {
                    debug!(
                        skipped = last - i,
                        "branches after an irrefutable pattern are unreachable"
                    );
                }
                self.builder.set_location(saved);
                return Ok(());
            }

            let fail = match (i == last, m.fallthrough) {
                (true, Some(fallthrough)) => fallthrough,
                (true, None) => self.builder.create_block(Some("match.fail")),
                (false, _) => self.builder.create_block(Some("match.next")),
            };
            self.lower_branch(m.selector, branch, fail)?;

            if i == last && m.fallthrough.is_none() {
                self.builder.set_current_block(fail);
                self.builder.terminate(IrInstr::Unreachable);
            } else if i < last {
                self.builder.set_current_block(fail);
            }
        }

        self.builder.set_location(saved);
        Ok(())
    }

    /// Emits the test for one branch. On success control reaches
    /// `branch.dest`; otherwise it reaches `fail`.
    fn lower_branch(
        &mut self,
        selector: ValueId,
        branch: &MatchBranch,
        fail: BlockId,
    ) -> Result<(), LowerError> {
        let mut args = match &branch.pattern {
            MatchPattern::Any => Vec::new(),

            MatchPattern::Cons => {
                if !self.guard_type(selector, TermType::Cons, fail) {
                    return Ok(());
                }
                let (head, tail) = self.split_cons(selector);
                vec![head, tail]
            }

            MatchPattern::Tuple(arity) => {
                if !self.guard_type(selector, TermType::tuple(*arity)?, fail) {
                    return Ok(());
                }
                self.tuple_elements(selector, *arity)
            }

            MatchPattern::MapItem(key) => {
                if !self.guard_type(selector, TermType::Map, fail) {
                    return Ok(());
                }
                if !self.map_has_key(selector, *key) {
                    let present = self.builder.emit(IrType::I1, |result| IrInstr::MapIsKey {
                        result,
                        map: selector,
                        key: *key,
                    });
                    self.branch_or_fail(present, "match.map_item", fail);
                }
                let value = self.builder.emit(IrType::ANY, |result| IrInstr::MapGet {
                    result,
                    map: selector,
                    key: *key,
                });
                vec![value]
            }

            MatchPattern::IsType(ty) => {
                if !self.guard_type(selector, *ty, fail) {
                    return Ok(());
                }
                Vec::new()
            }

            MatchPattern::Value(expected) => {
                match self.decide_eq(selector, *expected) {
                    Some(true) => {}
                    Some(false) => {
                        self.br(fail, vec![]);
                        return Ok(());
                    }
                    None => {
                        let eq = self.builder.emit(IrType::I1, |result| IrInstr::Eq {
                            result,
                            lhs: selector,
                            rhs: *expected,
                        });
                        self.branch_or_fail(eq, "match.value", fail);
                    }
                }
                Vec::new()
            }

            MatchPattern::Binary { spec, size } => {
                if !self.guard_type(selector, TermType::Binary, fail) {
                    return Ok(());
                }
                let (value, rest) = self.match_segment(selector, *spec, *size, fail)?;
                vec![value, rest]
            }
        };

        args.extend_from_slice(&branch.dest_args);
        self.br(branch.dest, args);
        Ok(())
    }

    /// Whether `pattern` is known to accept `selector` without any test.
    fn always_matches(&self, selector: ValueId, pattern: &MatchPattern) -> bool {
        if pattern.is_irrefutable() {
            return true;
        }
        match pattern {
            MatchPattern::IsType(ty) if self.config.fold_constants => {
                self.known_type(selector).is_subtype_of(ty)
            }
            _ => false,
        }
    }

    /// Head and tail of a list known to be a cons cell.
    fn split_cons(&mut self, list: ValueId) -> (ValueId, ValueId) {
        let literal = match self.definition(list).map(|d| d.op) {
            Some(IrInstr::MakeCons { head, tail, .. }) => Some((*head, *tail)),
            _ => None,
        };
        if let Some(parts) = literal {
            return parts;
        }
        let head = self
            .builder
            .emit(IrType::ANY, |result| IrInstr::GetHead { result, list });
        let tail = self
            .builder
            .emit(IrType::ANY, |result| IrInstr::GetTail { result, list });
        (head, tail)
    }

    /// Elements of a tuple known to have exactly `arity` elements.
    fn tuple_elements(&mut self, tuple: ValueId, arity: u32) -> Vec<ValueId> {
        let literal = match self.definition(tuple).map(|d| d.op) {
            Some(IrInstr::MakeTuple { elements, .. }) if elements.len() == arity as usize => {
                Some(elements.clone())
            }
            _ => None,
        };
        if let Some(elements) = literal {
            return elements;
        }
        (0..arity)
            .map(|index| {
                self.builder.emit(IrType::ANY, |result| IrInstr::GetElement {
                    result,
                    tuple,
                    index,
                })
            })
            .collect()
    }

    /// Decides `lhs =:= rhs` at compile time when both sides are literals.
    fn decide_eq(&self, lhs: ValueId, rhs: ValueId) -> Option<bool> {
        if self.same_term(lhs, rhs) {
            return Some(true);
        }
        match (self.constant(lhs), self.constant(rhs)) {
            (Some(a), Some(b)) => Some(a.exact_eq(b)),
            _ => None,
        }
    }
}
