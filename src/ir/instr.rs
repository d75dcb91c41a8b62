use crate::ir::binary::Segment;
use crate::ir::block::BlockId;
use crate::ir::constant::Constant;
use crate::ir::function::{ClosureVersion, FunctionSymbol};
use crate::ir::types::TermType;
use crate::ir::value::ValueId;

/// Index of an instruction within a block's instruction list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstrId(pub u32);

/// A single instruction of the lowered term dialect.
///
/// Invariants:
/// - Every non-terminator produces at most one result `ValueId`.
/// - Terminators are the last instruction in a block.
/// - The `ok` edge of `BinaryMatch` binds `(value, rest)` and the `ok` edge
///   of `BinaryPush` binds the grown builder; all `err` edges bind nothing.
#[derive(Debug, Clone)]
pub enum IrInstr {
    // ---- Constants ----
    Const {
        result: ValueId,
        value: Constant,
    },

    // ---- Tests (yield i1) ----
    /// Runtime type test. `Tuple(n)` only accepts tuples of exactly `n`
    /// elements.
    IsType {
        result: ValueId,
        value: ValueId,
        ty: TermType,
    },
    /// Exact term equality.
    Eq {
        result: ValueId,
        lhs: ValueId,
        rhs: ValueId,
    },

    // ---- Lists ----
    MakeCons {
        result: ValueId,
        head: ValueId,
        tail: ValueId,
    },
    GetHead {
        result: ValueId,
        list: ValueId,
    },
    GetTail {
        result: ValueId,
        list: ValueId,
    },

    // ---- Tuples ----
    MakeTuple {
        result: ValueId,
        elements: Vec<ValueId>,
    },
    GetElement {
        result: ValueId,
        tuple: ValueId,
        index: u32,
    },

    // ---- Maps ----
    /// Builds a map from key/value pairs; later duplicate keys win.
    MakeMap {
        result: ValueId,
        entries: Vec<(ValueId, ValueId)>,
    },
    MapIsKey {
        result: ValueId,
        map: ValueId,
        key: ValueId,
    },
    /// Reads the value under a key known to be present.
    MapGet {
        result: ValueId,
        map: ValueId,
        key: ValueId,
    },
    /// Inserts or overwrites `key`, yielding a new map.
    MapPut {
        result: ValueId,
        map: ValueId,
        key: ValueId,
        value: ValueId,
    },
    /// Replaces the value of a key known to be present, yielding a new map.
    MapReplace {
        result: ValueId,
        map: ValueId,
        key: ValueId,
        value: ValueId,
    },

    // ---- Closures ----
    /// A bare function reference; needs no environment storage. The
    /// version still travels with it for hot upgrade.
    FunctionRef {
        result: ValueId,
        callee: FunctionSymbol,
        version: ClosureVersion,
    },
    /// Allocates a closure whose environment holds `env` in order.
    MakeClosure {
        result: ValueId,
        callee: FunctionSymbol,
        version: ClosureVersion,
        env: Vec<ValueId>,
    },

    // ---- Binaries ----
    BinaryStart {
        result: ValueId,
    },
    BinaryFinish {
        result: ValueId,
        builder: ValueId,
    },
    /// Appends `value` encoded per `segment` (terminator).
    BinaryPush {
        builder: ValueId,
        value: ValueId,
        segment: Segment,
        ok: BlockId,
        err: BlockId,
    },
    /// Consumes one segment from the front of `bin` (terminator).
    BinaryMatch {
        bin: ValueId,
        segment: Segment,
        ok: BlockId,
        err: BlockId,
    },

    // ---- Control flow (terminators) ----
    /// Unconditional branch with block arguments (SSA block params).
    Br {
        target: BlockId,
        args: Vec<ValueId>,
    },
    CondBr {
        cond: ValueId,
        then_block: BlockId,
        then_args: Vec<ValueId>,
        else_block: BlockId,
        else_args: Vec<ValueId>,
    },
    Return {
        values: Vec<ValueId>,
    },
    Unreachable,
}

/// One control-flow edge out of a terminator.
#[derive(Debug, Clone, Copy)]
pub struct Edge<'a> {
    pub target: BlockId,
    /// Operands forwarded to the target's parameters, or `None` when the
    /// terminator itself produces the bound values.
    pub args: Option<&'a [ValueId]>,
}

impl IrInstr {
    /// Returns the `ValueId` produced by this instruction, if any.
    pub fn result(&self) -> Option<ValueId> {
        match self {
            IrInstr::Const { result, .. }
            | IrInstr::IsType { result, .. }
            | IrInstr::Eq { result, .. }
            | IrInstr::MakeCons { result, .. }
            | IrInstr::GetHead { result, .. }
            | IrInstr::GetTail { result, .. }
            | IrInstr::MakeTuple { result, .. }
            | IrInstr::GetElement { result, .. }
            | IrInstr::MakeMap { result, .. }
            | IrInstr::MapIsKey { result, .. }
            | IrInstr::MapGet { result, .. }
            | IrInstr::MapPut { result, .. }
            | IrInstr::MapReplace { result, .. }
            | IrInstr::FunctionRef { result, .. }
            | IrInstr::MakeClosure { result, .. }
            | IrInstr::BinaryStart { result }
            | IrInstr::BinaryFinish { result, .. } => Some(*result),
            IrInstr::BinaryPush { .. }
            | IrInstr::BinaryMatch { .. }
            | IrInstr::Br { .. }
            | IrInstr::CondBr { .. }
            | IrInstr::Return { .. }
            | IrInstr::Unreachable => None,
        }
    }

    /// Returns `true` if this instruction is a block terminator.
    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            IrInstr::Br { .. }
                | IrInstr::CondBr { .. }
                | IrInstr::Return { .. }
                | IrInstr::Unreachable
                | IrInstr::BinaryPush { .. }
                | IrInstr::BinaryMatch { .. }
        )
    }

    /// Outgoing edges in operand order. A `CondBr` whose arms target the
    /// same block yields two edges.
    pub fn edges(&self) -> Vec<Edge<'_>> {
        match self {
            IrInstr::Br { target, args } => vec![Edge {
                target: *target,
                args: Some(args),
            }],
            IrInstr::CondBr {
                then_block,
                then_args,
                else_block,
                else_args,
                ..
            } => vec![
                Edge {
                    target: *then_block,
                    args: Some(then_args),
                },
                Edge {
                    target: *else_block,
                    args: Some(else_args),
                },
            ],
            IrInstr::BinaryPush { ok, err, .. } | IrInstr::BinaryMatch { ok, err, .. } => vec![
                Edge {
                    target: *ok,
                    args: None,
                },
                Edge {
                    target: *err,
                    args: Some(&[]),
                },
            ],
            _ => Vec::new(),
        }
    }

    pub fn successors(&self) -> Vec<BlockId> {
        self.edges().into_iter().map(|e| e.target).collect()
    }

    /// Returns all `ValueId`s consumed by this instruction (operands).
    pub fn operands(&self) -> Vec<ValueId> {
        match self {
            IrInstr::Const { .. } | IrInstr::BinaryStart { .. } | IrInstr::FunctionRef { .. } => {
                vec![]
            }
            IrInstr::IsType { value, .. } => vec![*value],
            IrInstr::Eq { lhs, rhs, .. } => vec![*lhs, *rhs],
            IrInstr::MakeCons { head, tail, .. } => vec![*head, *tail],
            IrInstr::GetHead { list, .. } | IrInstr::GetTail { list, .. } => vec![*list],
            IrInstr::MakeTuple { elements, .. } => elements.clone(),
            IrInstr::GetElement { tuple, .. } => vec![*tuple],
            IrInstr::MakeMap { entries, .. } => {
                entries.iter().flat_map(|(k, v)| [*k, *v]).collect()
            }
            IrInstr::MapIsKey { map, key, .. } | IrInstr::MapGet { map, key, .. } => {
                vec![*map, *key]
            }
            IrInstr::MapPut {
                map, key, value, ..
            }
            | IrInstr::MapReplace {
                map, key, value, ..
            } => vec![*map, *key, *value],
            IrInstr::MakeClosure { env, .. } => env.clone(),
            IrInstr::BinaryFinish { builder, .. } => vec![*builder],
            IrInstr::BinaryPush {
                builder,
                value,
                segment,
                ..
            } => {
                let mut ops = vec![*builder, *value];
                ops.extend(segment.width.size_operand());
                ops
            }
            IrInstr::BinaryMatch { bin, segment, .. } => {
                let mut ops = vec![*bin];
                ops.extend(segment.width.size_operand());
                ops
            }
            IrInstr::Br { args, .. } => args.clone(),
            IrInstr::CondBr {
                cond,
                then_args,
                else_args,
                ..
            } => {
                let mut ops = vec![*cond];
                ops.extend_from_slice(then_args);
                ops.extend_from_slice(else_args);
                ops
            }
            IrInstr::Return { values } => values.clone(),
            IrInstr::Unreachable => vec![],
        }
    }
}
