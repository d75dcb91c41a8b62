//! Map construction and all-or-nothing map updates.
//!
//! A `MapUpdate` applies its actions to one evolving map value. `Insert`
//! always succeeds. `Update` first checks that its key is present; the
//! check branches to the failure destination with no arguments, so no
//! intermediate map ever escapes a failed sequence. The base map is an
//! immutable value and is unchanged on either path.

use std::collections::HashSet;

use tracing::{instrument, trace};

use crate::error::LowerError;
use crate::ir::block::BlockId;
use crate::ir::constant::Constant;
use crate::ir::instr::{InstrId, IrInstr};
use crate::ir::loc::LocId;
use crate::ir::types::{IrType, TermType};
use crate::ir::value::ValueId;
use crate::lower::Lowerer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapAction {
    /// Creates `key` or overwrites its value.
    Insert { key: ValueId, value: ValueId },
    /// Overwrites the value of a `key` that must already be present.
    Update { key: ValueId, value: ValueId },
}

impl MapAction {
    pub fn key(&self) -> ValueId {
        match self {
            MapAction::Insert { key, .. } | MapAction::Update { key, .. } => *key,
        }
    }
}

/// An ordered list of actions applied to `map`.
///
/// `ok` must take exactly one parameter (the final map) and `err` none.
#[derive(Debug, Clone)]
pub struct MapUpdate {
    pub loc: Option<LocId>,
    pub map: ValueId,
    pub actions: Vec<MapAction>,
    pub ok: BlockId,
    pub err: BlockId,
}

/// A dynamic key/value pair of a map under construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapEntry {
    pub key: ValueId,
    pub value: ValueId,
}

/// A literal key/value pair of a constant map.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyValuePair {
    pub key: Constant,
    pub value: Constant,
}

impl Lowerer<'_> {
    /// Compiles `update` at the cursor. Seals the current block.
    #[instrument(skip_all, fields(map = %update.map, actions = update.actions.len()))]
    pub fn lower_map_update(&mut self, update: &MapUpdate) -> Result<(), LowerError> {
        self.check_arity(update.ok, 1)?;
        self.check_arity(update.err, 0)?;

        let saved = self.builder.set_location(update.loc);
        let map_ty = IrType::Term(TermType::Map);
        let mut map = update.map;
        for action in &update.actions {
            map = match *action {
                MapAction::Insert { key, value } => self.builder.emit(map_ty, |result| {
                    IrInstr::MapPut {
                        result,
                        map,
                        key,
                        value,
                    }
                }),
                MapAction::Update { key, value } => {
                    if self.map_has_key(map, key) {
                        trace!(%key, "key known present, presence test elided");
                    } else {
                        let present = self.builder.emit(IrType::I1, |result| IrInstr::MapIsKey {
                            result,
                            map,
                            key,
                        });
                        self.branch_or_fail(present, "map.update", update.err);
                    }
                    self.builder.emit(map_ty, |result| IrInstr::MapReplace {
                        result,
                        map,
                        key,
                        value,
                    })
                }
            };
        }
        self.br(update.ok, vec![map]);

        self.builder.set_location(saved);
        Ok(())
    }

    /// Emits a map holding `entries`. Later duplicate keys win.
    pub fn construct_map(&mut self, entries: &[MapEntry]) -> ValueId {
        let entries = entries.iter().map(|e| (e.key, e.value)).collect();
        self.builder
            .emit(IrType::Term(TermType::Map), |result| IrInstr::MakeMap {
                result,
                entries,
            })
    }

    /// Emits a literal map. Later duplicate keys win but keep the position
    /// of their first occurrence.
    pub fn const_map(&mut self, pairs: &[KeyValuePair]) -> ValueId {
        let mut map: Vec<(Constant, Constant)> = Vec::with_capacity(pairs.len());
        for pair in pairs {
            match map.iter_mut().find(|(k, _)| k.exact_eq(&pair.key)) {
                Some(slot) => slot.1 = pair.value.clone(),
                None => map.push((pair.key.clone(), pair.value.clone())),
            }
        }
        self.builder
            .emit(IrType::Term(TermType::Map), |result| IrInstr::Const {
                result,
                value: Constant::Map(map),
            })
    }

    /// Whether `map` statically contains `key`, judged from the chain of
    /// instructions that built it.
    pub(crate) fn map_has_key(&self, map: ValueId, key: ValueId) -> bool {
        let mut seen: HashSet<(BlockId, InstrId)> = HashSet::new();
        let mut current = map;
        loop {
            let Some(d) = self.definition(current) else {
                return false;
            };
            if !seen.insert((d.block, d.instr)) {
                return false;
            }
            match d.op {
                IrInstr::MapPut { map, key: k, .. } | IrInstr::MapReplace { map, key: k, .. } => {
                    if self.same_term(*k, key) {
                        return true;
                    }
                    current = *map;
                }
                IrInstr::MakeMap { entries, .. } => {
                    return entries.iter().any(|(k, _)| self.same_term(*k, key));
                }
                IrInstr::Const { value, .. } => {
                    return self
                        .constant(key)
                        .map_or(false, |k| value.map_get(k).is_some());
                }
                _ => return false,
            }
        }
    }
}
