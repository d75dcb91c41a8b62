use std::fmt;

use crate::error::LowerError;

/// Largest tuple arity the runtime can represent.
pub const MAX_TUPLE_ARITY: u32 = (1 << 24) - 1;

/// Term kind encoding shared with the front-end.
///
/// The discriminants are part of the boundary ABI: the front-end writes these
/// integers into flat type descriptors. Never renumber an existing kind.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TermKind {
    Any = 0,
    List = 1,
    Number = 2,
    Integer = 3,
    Float = 4,
    Atom = 5,
    Boolean = 6,
    Nil = 7,
    Cons = 8,
    Tuple = 9,
    Map = 10,
    Closure = 11,
    Binary = 12,
    Pid = 13,
    Reference = 14,
}

impl TermKind {
    /// Decodes a raw kind number. Returns `None` for numbers outside the table.
    pub fn from_raw(raw: u32) -> Option<Self> {
        let kind = match raw {
            0 => TermKind::Any,
            1 => TermKind::List,
            2 => TermKind::Number,
            3 => TermKind::Integer,
            4 => TermKind::Float,
            5 => TermKind::Atom,
            6 => TermKind::Boolean,
            7 => TermKind::Nil,
            8 => TermKind::Cons,
            9 => TermKind::Tuple,
            10 => TermKind::Map,
            11 => TermKind::Closure,
            12 => TermKind::Binary,
            13 => TermKind::Pid,
            14 => TermKind::Reference,
            _ => return None,
        };
        Some(kind)
    }
}

/// The static category of a dynamically-typed term.
///
/// Only `Tuple` carries a payload; every other kind is fully described by
/// its tag. There is no way to read an arity off a non-tuple type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TermType {
    Any,
    List,
    Number,
    Integer,
    Float,
    Atom,
    Boolean,
    Nil,
    Cons,
    Tuple(u32),
    Map,
    Closure,
    Binary,
    Pid,
    Reference,
}

impl TermType {
    /// Builds a type from its encoded kind, validating the tuple arity.
    pub fn from_kind(kind: TermKind, arity: Option<u32>) -> Result<Self, LowerError> {
        let ty = match kind {
            TermKind::Any => TermType::Any,
            TermKind::List => TermType::List,
            TermKind::Number => TermType::Number,
            TermKind::Integer => TermType::Integer,
            TermKind::Float => TermType::Float,
            TermKind::Atom => TermType::Atom,
            TermKind::Boolean => TermType::Boolean,
            TermKind::Nil => TermType::Nil,
            TermKind::Cons => TermType::Cons,
            TermKind::Tuple => {
                let arity = arity.ok_or(LowerError::MissingPayload { what: "tuple arity" })?;
                TermType::tuple(arity)?
            }
            TermKind::Map => TermType::Map,
            TermKind::Closure => TermType::Closure,
            TermKind::Binary => TermType::Binary,
            TermKind::Pid => TermType::Pid,
            TermKind::Reference => TermType::Reference,
        };
        Ok(ty)
    }

    /// A tuple type of exactly `arity` elements.
    pub fn tuple(arity: u32) -> Result<Self, LowerError> {
        if arity > MAX_TUPLE_ARITY {
            return Err(LowerError::ArityOutOfRange {
                what: "tuple",
                arity: arity as u64,
                max: MAX_TUPLE_ARITY as u64,
            });
        }
        Ok(TermType::Tuple(arity))
    }

    pub fn kind(&self) -> TermKind {
        match self {
            TermType::Any => TermKind::Any,
            TermType::List => TermKind::List,
            TermType::Number => TermKind::Number,
            TermType::Integer => TermKind::Integer,
            TermType::Float => TermKind::Float,
            TermType::Atom => TermKind::Atom,
            TermType::Boolean => TermKind::Boolean,
            TermType::Nil => TermKind::Nil,
            TermType::Cons => TermKind::Cons,
            TermType::Tuple(_) => TermKind::Tuple,
            TermType::Map => TermKind::Map,
            TermType::Closure => TermKind::Closure,
            TermType::Binary => TermKind::Binary,
            TermType::Pid => TermKind::Pid,
            TermType::Reference => TermKind::Reference,
        }
    }

    /// The immediate supertype in the kind lattice, `None` for `Any`.
    fn parent(&self) -> Option<TermType> {
        match self {
            TermType::Any => None,
            TermType::Integer | TermType::Float => Some(TermType::Number),
            TermType::Boolean => Some(TermType::Atom),
            TermType::Nil | TermType::Cons => Some(TermType::List),
            _ => Some(TermType::Any),
        }
    }

    /// Returns `true` if every term of type `self` is also of type `other`.
    pub fn is_subtype_of(&self, other: &TermType) -> bool {
        let mut cur = Some(*self);
        while let Some(ty) = cur {
            if ty == *other {
                return true;
            }
            cur = ty.parent();
        }
        false
    }

    /// Returns `true` if some term could be of both types.
    ///
    /// The lattice is a tree, so two types overlap exactly when one contains
    /// the other.
    pub fn overlaps(&self, other: &TermType) -> bool {
        self.is_subtype_of(other) || other.is_subtype_of(self)
    }
}

impl fmt::Display for TermType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TermType::Any => f.write_str("term"),
            TermType::List => f.write_str("list"),
            TermType::Number => f.write_str("number"),
            TermType::Integer => f.write_str("integer"),
            TermType::Float => f.write_str("float"),
            TermType::Atom => f.write_str("atom"),
            TermType::Boolean => f.write_str("boolean"),
            TermType::Nil => f.write_str("nil"),
            TermType::Cons => f.write_str("cons"),
            TermType::Tuple(n) => write!(f, "tuple<{}>", n),
            TermType::Map => f.write_str("map"),
            TermType::Closure => f.write_str("closure"),
            TermType::Binary => f.write_str("binary"),
            TermType::Pid => f.write_str("pid"),
            TermType::Reference => f.write_str("reference"),
        }
    }
}

/// The type of an SSA value in the lowered dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IrType {
    /// A boxed or immediate term of the source language.
    Term(TermType),
    /// A one-bit condition produced by tests and consumed by `CondBr`.
    I1,
    /// An in-progress binary under construction.
    Builder,
}

impl IrType {
    pub const ANY: IrType = IrType::Term(TermType::Any);

    /// Returns the term type, if this is a term value.
    pub fn term(&self) -> Option<TermType> {
        match self {
            IrType::Term(t) => Some(*t),
            _ => None,
        }
    }
}

impl fmt::Display for IrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrType::Term(t) => write!(f, "{}", t),
            IrType::I1 => f.write_str("i1"),
            IrType::Builder => f.write_str("binary.builder"),
        }
    }
}
