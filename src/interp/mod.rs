//! Reference evaluator for the lowered dialect.
//!
//! Executes an `IrFunction` by walking its blocks and threading values
//! through block parameters at branches. It exists to check the runtime
//! behaviour of lowered control flow; it makes no attempt to be fast.

pub mod bits;
pub mod term;

pub use bits::Bitstring;
pub use term::Term;

use std::collections::HashMap;
use std::fmt;

use tracing::trace;

use crate::error::InterpError;
use crate::interp::bits::{Decoded, Encodable};
use crate::ir::binary::{Segment, SegmentWidth};
use crate::ir::block::BlockId;
use crate::ir::function::IrFunction;
use crate::ir::instr::IrInstr;
use crate::ir::types::TermType;
use crate::ir::value::ValueId;

/// Blocks entered before evaluation gives up.
pub const MAX_STEPS: usize = 100_000;

/// A runtime value held by an SSA slot.
#[derive(Debug, Clone, PartialEq)]
pub enum IrValue {
    Term(Term),
    Bool(bool),
    /// A binary under construction.
    Builder(Bitstring),
}

impl fmt::Display for IrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrValue::Term(t) => write!(f, "{}", t),
            IrValue::Bool(b) => write!(f, "{}", b),
            IrValue::Builder(bits) => write!(f, "builder{}", bits),
        }
    }
}

/// Evaluates `func` with `args` bound to its entry parameters and returns
/// the values of the `Return` it reaches.
pub fn eval_function(func: &IrFunction, args: &[Term]) -> Result<Vec<Term>, InterpError> {
    Interpreter::new(func).run(args)
}

fn type_error(detail: impl Into<String>) -> InterpError {
    InterpError::TypeError {
        detail: detail.into(),
    }
}

// ---------------------------------------------------------------------------
// Interpreter state
// ---------------------------------------------------------------------------

struct Interpreter<'f> {
    func: &'f IrFunction,
    values: HashMap<ValueId, IrValue>,
}

/// Where control goes after a block's terminator.
enum Flow {
    Jump(BlockId, Vec<IrValue>),
    Return(Vec<Term>),
}

impl<'f> Interpreter<'f> {
    fn new(func: &'f IrFunction) -> Self {
        Self {
            func,
            values: HashMap::new(),
        }
    }

    fn run(&mut self, args: &[Term]) -> Result<Vec<Term>, InterpError> {
        let entry_args = args.iter().cloned().map(IrValue::Term).collect();
        let mut current = IrFunction::ENTRY;
        let mut incoming: Vec<IrValue> = entry_args;
        let func = self.func;

        for _ in 0..MAX_STEPS {
            let block = func
                .block(current)
                .ok_or(InterpError::UndefinedBlock { id: current.0 })?;

            if block.params.len() != incoming.len() {
                return Err(type_error(format!(
                    "{} takes {} arguments, got {}",
                    current,
                    block.params.len(),
                    incoming.len()
                )));
            }
            for (param, value) in block.params.iter().zip(incoming) {
                self.values.insert(param.id, value);
            }

            let mut flow = None;
            for instr in &block.instrs {
                if instr.is_terminator() {
                    flow = Some(self.terminate(current, instr)?);
                    break;
                }
                self.step(instr)?;
            }
            match flow {
                Some(Flow::Jump(target, args)) => {
                    trace!(from = %current, to = %target, "branch");
                    current = target;
                    incoming = args;
                }
                Some(Flow::Return(values)) => return Ok(values),
                None => {
                    return Err(type_error(format!("{} has no terminator", current)));
                }
            }
        }
        Err(InterpError::StepLimit { limit: MAX_STEPS })
    }

    fn get(&self, id: ValueId) -> Result<&IrValue, InterpError> {
        self.values
            .get(&id)
            .ok_or(InterpError::UndefinedValue { id: id.0 })
    }

    fn term(&self, id: ValueId) -> Result<&Term, InterpError> {
        match self.get(id)? {
            IrValue::Term(t) => Ok(t),
            other => Err(type_error(format!("{} is {}, expected a term", id, other))),
        }
    }

    fn args(&self, ids: &[ValueId]) -> Result<Vec<IrValue>, InterpError> {
        ids.iter().map(|id| self.get(*id).cloned()).collect()
    }

    fn set(&mut self, id: ValueId, value: IrValue) {
        self.values.insert(id, value);
    }

    fn set_term(&mut self, id: ValueId, term: Term) {
        self.values.insert(id, IrValue::Term(term));
    }

    // -----------------------------------------------------------------------
    // Straight-line instructions
    // -----------------------------------------------------------------------

    fn step(&mut self, instr: &IrInstr) -> Result<(), InterpError> {
        match instr {
            IrInstr::Const { result, value } => {
                self.set_term(*result, Term::from_constant(value));
            }

            IrInstr::IsType { result, value, ty } => {
                let b = self.term(*value)?.has_type(*ty);
                self.set(*result, IrValue::Bool(b));
            }

            IrInstr::Eq { result, lhs, rhs } => {
                let b = self.term(*lhs)?.exact_eq(self.term(*rhs)?);
                self.set(*result, IrValue::Bool(b));
            }

            IrInstr::MakeCons { result, head, tail } => {
                let cons = Term::Cons(
                    Box::new(self.term(*head)?.clone()),
                    Box::new(self.term(*tail)?.clone()),
                );
                self.set_term(*result, cons);
            }

            IrInstr::GetHead { result, list } | IrInstr::GetTail { result, list } => {
                let Term::Cons(head, tail) = self.term(*list)? else {
                    return Err(type_error(format!("{} is not a cons cell", list)));
                };
                let part = match instr {
                    IrInstr::GetHead { .. } => head.as_ref().clone(),
                    _ => tail.as_ref().clone(),
                };
                self.set_term(*result, part);
            }

            IrInstr::MakeTuple { result, elements } => {
                let elems = elements
                    .iter()
                    .map(|e| self.term(*e).cloned())
                    .collect::<Result<Vec<_>, _>>()?;
                self.set_term(*result, Term::Tuple(elems));
            }

            IrInstr::GetElement {
                result,
                tuple,
                index,
            } => {
                let elem = match self.term(*tuple)? {
                    Term::Tuple(elems) => elems.get(*index as usize).cloned(),
                    _ => None,
                };
                let elem = elem.ok_or_else(|| {
                    type_error(format!("{} has no element {}", tuple, index))
                })?;
                self.set_term(*result, elem);
            }

            IrInstr::MakeMap { result, entries } => {
                let pairs = entries
                    .iter()
                    .map(|(k, v)| Ok((self.term(*k)?.clone(), self.term(*v)?.clone())))
                    .collect::<Result<Vec<_>, InterpError>>()?;
                self.set_term(*result, Term::map(pairs));
            }

            IrInstr::MapIsKey { result, map, key } => {
                let map_term = self.term(*map)?;
                if !map_term.has_type(TermType::Map) {
                    return Err(type_error(format!("{} is not a map", map)));
                }
                let b = map_term.map_get(self.term(*key)?).is_some();
                self.set(*result, IrValue::Bool(b));
            }

            IrInstr::MapGet { result, map, key } => {
                let value = self
                    .term(*map)?
                    .map_get(self.term(*key)?)
                    .cloned()
                    .ok_or_else(|| type_error(format!("key {} not in map {}", key, map)))?;
                self.set_term(*result, value);
            }

            IrInstr::MapPut {
                result,
                map,
                key,
                value,
            }
            | IrInstr::MapReplace {
                result,
                map,
                key,
                value,
            } => {
                let mut m = self.term(*map)?.clone();
                if !matches!(m, Term::Map(_)) {
                    return Err(type_error(format!("{} is not a map", map)));
                }
                let k = self.term(*key)?.clone();
                if matches!(instr, IrInstr::MapReplace { .. }) && m.map_get(&k).is_none() {
                    return Err(type_error(format!("replace of absent key {}", k)));
                }
                m.map_put(k, self.term(*value)?.clone());
                self.set_term(*result, m);
            }

            IrInstr::FunctionRef { result, callee, .. } => {
                self.set_term(
                    *result,
                    Term::Closure {
                        callee: callee.clone(),
                        env: Vec::new(),
                    },
                );
            }

            IrInstr::MakeClosure {
                result,
                callee,
                env,
                ..
            } => {
                let env = env
                    .iter()
                    .map(|v| self.term(*v).cloned())
                    .collect::<Result<Vec<_>, _>>()?;
                self.set_term(
                    *result,
                    Term::Closure {
                        callee: callee.clone(),
                        env,
                    },
                );
            }

            IrInstr::BinaryStart { result } => {
                self.set(*result, IrValue::Builder(Bitstring::new()));
            }

            IrInstr::BinaryFinish { result, builder } => {
                let IrValue::Builder(acc) = self.get(*builder)? else {
                    return Err(type_error(format!("{} is not a binary builder", builder)));
                };
                let finished = Term::Bits(acc.clone());
                self.set_term(*result, finished);
            }

            other => {
                return Err(InterpError::Unsupported {
                    detail: format!("{:?} is not a straight-line instruction", other),
                })
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Terminators
    // -----------------------------------------------------------------------

    fn terminate(&mut self, block: BlockId, instr: &IrInstr) -> Result<Flow, InterpError> {
        let flow = match instr {
            IrInstr::Br { target, args } => Flow::Jump(*target, self.args(args)?),

            IrInstr::CondBr {
                cond,
                then_block,
                then_args,
                else_block,
                else_args,
            } => match self.get(*cond)? {
                IrValue::Bool(true) => Flow::Jump(*then_block, self.args(then_args)?),
                IrValue::Bool(false) => Flow::Jump(*else_block, self.args(else_args)?),
                other => return Err(type_error(format!("branch on non-boolean {}", other))),
            },

            IrInstr::Return { values } => Flow::Return(
                values
                    .iter()
                    .map(|v| match self.get(*v)? {
                        IrValue::Term(t) => Ok(t.clone()),
                        IrValue::Bool(b) => Ok(Term::boolean(*b)),
                        other => Err(type_error(format!("cannot return {}", other))),
                    })
                    .collect::<Result<Vec<_>, _>>()?,
            ),

            IrInstr::Unreachable => return Err(InterpError::Unreachable { block: block.0 }),

            IrInstr::BinaryMatch {
                bin,
                segment,
                ok,
                err,
            } => match self.match_segment(*bin, segment)? {
                Some((value, rest)) => Flow::Jump(
                    *ok,
                    vec![IrValue::Term(value), IrValue::Term(Term::Bits(rest))],
                ),
                None => Flow::Jump(*err, vec![]),
            },

            IrInstr::BinaryPush {
                builder,
                value,
                segment,
                ok,
                err,
            } => match self.push_segment(*builder, *value, segment)? {
                Some(grown) => Flow::Jump(*ok, vec![IrValue::Builder(grown)]),
                None => Flow::Jump(*err, vec![]),
            },

            other => {
                return Err(InterpError::Unsupported {
                    detail: format!("{:?} is not a terminator", other),
                })
            }
        };
        Ok(flow)
    }

    /// Evaluates a segment's width in bits. `None` when a dynamic size is
    /// not a non-negative integer or overflows.
    fn width_bits(&self, width: &SegmentWidth) -> Result<Option<u64>, InterpError> {
        match *width {
            SegmentWidth::Fixed(bits) => Ok(Some(bits)),
            SegmentWidth::Dynamic { size, unit } => match self.term(size)? {
                Term::Int(n) if *n >= 0 => Ok((*n as u64).checked_mul(unit as u64)),
                _ => Ok(None),
            },
            SegmentWidth::Rest { .. } | SegmentWidth::CodePoint => Err(InterpError::Unsupported {
                detail: format!("width {} has no fixed bit count", width),
            }),
        }
    }

    fn match_segment(
        &self,
        bin: ValueId,
        segment: &Segment,
    ) -> Result<Option<(Term, Bitstring)>, InterpError> {
        let Term::Bits(src) = self.term(bin)? else {
            return Ok(None);
        };
        let spec = &segment.spec;

        let (value, used) = match segment.width {
            SegmentWidth::CodePoint => match bits::decode_code_point(spec, src, 0)? {
                Some((cp, used)) => (Term::Int(cp), used),
                None => return Ok(None),
            },
            width => {
                let len = match width {
                    SegmentWidth::Rest { unit } => {
                        if src.len() % unit as u64 != 0 {
                            return Ok(None);
                        }
                        src.len()
                    }
                    _ => match self.width_bits(&width)? {
                        Some(len) => len,
                        None => return Ok(None),
                    },
                };
                if len > src.len() {
                    return Ok(None);
                }
                let value = match bits::decode(spec, src, 0, len)? {
                    Some(Decoded::Int(n)) => Term::Int(n),
                    Some(Decoded::Float(x)) => Term::Float(x),
                    Some(Decoded::Bits(b)) => Term::Bits(b),
                    None => return Ok(None),
                };
                (value, len)
            }
        };
        let rest = src.slice(used, src.len() - used);
        Ok(Some((value, rest)))
    }

    fn push_segment(
        &self,
        builder: ValueId,
        value: ValueId,
        segment: &Segment,
    ) -> Result<Option<Bitstring>, InterpError> {
        let IrValue::Builder(acc) = self.get(builder)? else {
            return Err(type_error(format!("{} is not a binary builder", builder)));
        };
        let mut grown = acc.clone();
        let term = self.term(value)?;
        let spec = &segment.spec;

        let encodable = match term {
            Term::Int(n) => Encodable::Int(*n),
            Term::Float(x) => Encodable::Float(*x),
            Term::Bits(b) => Encodable::Bits(b),
            _ => return Ok(None),
        };

        let pushed = match segment.width {
            SegmentWidth::CodePoint => match encodable {
                Encodable::Int(cp) => bits::encode_code_point(spec, cp, &mut grown)?,
                _ => false,
            },
            SegmentWidth::Rest { unit } => match encodable {
                Encodable::Bits(b) if b.len() % unit as u64 == 0 => {
                    bits::encode(spec, encodable, b.len(), &mut grown)?
                }
                _ => false,
            },
            width => match self.width_bits(&width)? {
                Some(len) => bits::encode(spec, encodable, len, &mut grown)?,
                None => false,
            },
        };
        Ok(pushed.then_some(grown))
    }
}
