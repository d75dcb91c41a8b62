//! Flat front-end boundary.
//!
//! The front-end hands descriptors over as C-layout structures: tagged
//! unions for types, specifiers and patterns, pointer/length pairs for
//! lists, and 32-bit handles for values, blocks, locations and attributes.
//! Everything here is `#[repr(C)]` and must stay byte-compatible with the
//! front-end's declarations. The tag numbers are the ones in
//! `TermKind`, `SpecifierTag`, `Endianness`, `MAP_ACTION_*` and
//! `PATTERN_*`.
//!
//! The `decode_*` functions turn the flat form into the lowering's own sum
//! types. A union payload is read only after its tag has been checked, and
//! every handle is resolved through a `HandleScope` before use.

use std::ffi::{c_char, CStr};

use crate::error::LowerError;
use crate::ir::binary::{BinarySpecifier, Endianness, SpecifierTag, MAX_UNIT};
use crate::ir::block::BlockId;
use crate::ir::constant::Constant;
use crate::ir::function::{ClosureVersion, FunctionSymbol, IrFunction, Uniq};
use crate::ir::loc::{Arg, LocId, Span};
use crate::ir::module::{AttrId, IrModule};
use crate::ir::types::{TermKind, TermType};
use crate::ir::value::ValueId;
use crate::lower::{
    Closure, KeyValuePair, Match, MatchBranch, MatchPattern, MapAction, MapEntry, MapUpdate,
};

// =============================================================================
// Handles
// =============================================================================

macro_rules! handle {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[repr(transparent)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(pub u32);

        impl $name {
            /// The absent handle.
            pub const NONE: Self = $name(u32::MAX);

            pub fn is_none(self) -> bool {
                self == Self::NONE
            }
        }
    };
}

handle!(
    /// An SSA value of the function being lowered.
    ValueRef
);
handle!(
    /// A block of the function being lowered.
    BlockRef
);
handle!(
    /// An entry of the module's location table.
    LocRef
);
handle!(
    /// An entry of the module's constant attribute table.
    AttrRef
);

impl From<ValueId> for ValueRef {
    fn from(v: ValueId) -> Self {
        ValueRef(v.0)
    }
}

impl From<BlockId> for BlockRef {
    fn from(b: BlockId) -> Self {
        BlockRef(b.0)
    }
}

impl From<LocId> for LocRef {
    fn from(l: LocId) -> Self {
        LocRef(l.0)
    }
}

impl From<AttrId> for AttrRef {
    fn from(a: AttrId) -> Self {
        AttrRef(a.0)
    }
}

/// Resolves handles against the module and the function under
/// construction.
pub struct HandleScope<'a> {
    pub module: &'a IrModule,
    pub func: &'a IrFunction,
}

impl<'a> HandleScope<'a> {
    pub fn new(module: &'a IrModule, func: &'a IrFunction) -> Self {
        Self { module, func }
    }

    pub fn value(&self, r: ValueRef) -> Result<ValueId, LowerError> {
        let id = ValueId(r.0);
        match self.func.value_def(id) {
            Some(_) => Ok(id),
            None => Err(LowerError::UnknownHandle {
                what: "value",
                handle: r.0,
            }),
        }
    }

    pub fn optional_value(&self, r: ValueRef) -> Result<Option<ValueId>, LowerError> {
        if r.is_none() {
            return Ok(None);
        }
        self.value(r).map(Some)
    }

    pub fn block(&self, r: BlockRef) -> Result<BlockId, LowerError> {
        let id = BlockId(r.0);
        match self.func.block(id) {
            Some(_) => Ok(id),
            None => Err(LowerError::UnknownHandle {
                what: "block",
                handle: r.0,
            }),
        }
    }

    pub fn loc(&self, r: LocRef) -> Result<Option<LocId>, LowerError> {
        if r.is_none() {
            return Ok(None);
        }
        let id = LocId(r.0);
        match self.module.location(id) {
            Some(_) => Ok(Some(id)),
            None => Err(LowerError::UnknownHandle {
                what: "location",
                handle: r.0,
            }),
        }
    }

    pub fn attribute(&self, r: AttrRef) -> Result<&'a Constant, LowerError> {
        self.module
            .attribute(AttrId(r.0))
            .ok_or(LowerError::UnknownHandle {
                what: "attribute",
                handle: r.0,
            })
    }

    fn values(&self, refs: &[ValueRef]) -> Result<Vec<ValueId>, LowerError> {
        refs.iter().map(|r| self.value(*r)).collect()
    }
}

/// Views a front-end list as a slice.
///
/// # Safety
/// When `len` is non-zero, `ptr` must be null or point to `len` initialized
/// elements that stay valid for `'a`.
unsafe fn raw_slice<'a, T>(
    ptr: *const T,
    len: usize,
    what: &'static str,
) -> Result<&'a [T], LowerError> {
    if len == 0 {
        return Ok(&[]);
    }
    if ptr.is_null() {
        return Err(LowerError::NullList { what, len });
    }
    Ok(std::slice::from_raw_parts(ptr, len))
}

// =============================================================================
// Types and arguments
// =============================================================================

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RawTypeAny {
    pub tag: u32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RawTypeTuple {
    pub tag: u32,
    pub arity: u32,
}

/// A term type. Both variants start with the kind tag.
#[repr(C)]
#[derive(Clone, Copy)]
pub union RawType {
    pub any: RawTypeAny,
    pub tuple: RawTypeTuple,
}

impl RawType {
    /// A payload-free type. The arity slot is zeroed so the whole union
    /// is initialized.
    pub fn of_kind(kind: TermKind) -> Self {
        RawType {
            tuple: RawTypeTuple {
                tag: kind as u32,
                arity: 0,
            },
        }
    }

    pub fn tuple(arity: u32) -> Self {
        RawType {
            tuple: RawTypeTuple {
                tag: TermKind::Tuple as u32,
                arity,
            },
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct RawSpan {
    pub start: u32,
    pub end: u32,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct RawArg {
    pub ty: RawType,
    pub span: RawSpan,
    pub implicit: bool,
}

/// # Safety
/// `raw` must have been initialized through the variant its tag names.
pub unsafe fn decode_type(raw: &RawType) -> Result<TermType, LowerError> {
    let tag = raw.any.tag;
    let kind = TermKind::from_raw(tag).ok_or(LowerError::UnknownTag { what: "type", tag })?;
    let arity = match kind {
        TermKind::Tuple => Some(raw.tuple.arity),
        _ => None,
    };
    TermType::from_kind(kind, arity)
}

/// # Safety
/// `args` must satisfy the contract of a front-end list of `len` `RawArg`s.
pub unsafe fn decode_args(args: *const RawArg, len: usize) -> Result<Vec<Arg>, LowerError> {
    raw_slice(args, len, "argument")?
        .iter()
        .map(|a| {
            Ok(Arg {
                ty: decode_type(&a.ty)?,
                span: Span::new(a.span.start, a.span.end),
                implicit: a.implicit,
            })
        })
        .collect()
}

// =============================================================================
// Maps
// =============================================================================

pub const MAP_ACTION_UNKNOWN: u32 = 0;
pub const MAP_ACTION_INSERT: u32 = 1;
pub const MAP_ACTION_UPDATE: u32 = 2;

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RawMapAction {
    pub action: u32,
    pub key: ValueRef,
    pub value: ValueRef,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RawMapUpdate {
    pub loc: LocRef,
    pub map: ValueRef,
    pub ok: BlockRef,
    pub err: BlockRef,
    pub actions: *const RawMapAction,
    pub actions_len: usize,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RawMapEntry {
    pub key: ValueRef,
    pub value: ValueRef,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RawKeyValuePair {
    pub key: AttrRef,
    pub value: AttrRef,
}

/// # Safety
/// `raw.actions` must satisfy the contract of a front-end list.
pub unsafe fn decode_map_update(
    raw: &RawMapUpdate,
    scope: &HandleScope<'_>,
) -> Result<MapUpdate, LowerError> {
    let actions = raw_slice(raw.actions, raw.actions_len, "map action")?
        .iter()
        .map(|a| {
            let key = scope.value(a.key)?;
            let value = scope.value(a.value)?;
            match a.action {
                MAP_ACTION_INSERT => Ok(MapAction::Insert { key, value }),
                MAP_ACTION_UPDATE => Ok(MapAction::Update { key, value }),
                tag => Err(LowerError::UnknownTag {
                    what: "map action",
                    tag,
                }),
            }
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(MapUpdate {
        loc: scope.loc(raw.loc)?,
        map: scope.value(raw.map)?,
        actions,
        ok: scope.block(raw.ok)?,
        err: scope.block(raw.err)?,
    })
}

/// # Safety
/// `entries` must satisfy the contract of a front-end list.
pub unsafe fn decode_map_entries(
    entries: *const RawMapEntry,
    len: usize,
    scope: &HandleScope<'_>,
) -> Result<Vec<MapEntry>, LowerError> {
    raw_slice(entries, len, "map entry")?
        .iter()
        .map(|e| {
            Ok(MapEntry {
                key: scope.value(e.key)?,
                value: scope.value(e.value)?,
            })
        })
        .collect()
}

/// # Safety
/// `pairs` must satisfy the contract of a front-end list.
pub unsafe fn decode_key_value_pairs(
    pairs: *const RawKeyValuePair,
    len: usize,
    scope: &HandleScope<'_>,
) -> Result<Vec<KeyValuePair>, LowerError> {
    raw_slice(pairs, len, "key/value pair")?
        .iter()
        .map(|p| {
            Ok(KeyValuePair {
                key: scope.attribute(p.key)?.clone(),
                value: scope.attribute(p.value)?.clone(),
            })
        })
        .collect()
}

// =============================================================================
// Closures
// =============================================================================

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RawClosure {
    pub loc: LocRef,
    /// Atom attribute naming the defining module.
    pub module: AttrRef,
    /// NUL-terminated UTF-8 function name.
    pub name: *const c_char,
    pub arity: u8,
    pub index: u32,
    pub old_unique: u32,
    pub unique: [u8; 16],
    pub env: *const ValueRef,
    pub env_len: u32,
}

/// # Safety
/// `raw.name` must be null or a NUL-terminated string, and `raw.env` must
/// satisfy the contract of a front-end list.
pub unsafe fn decode_closure(
    raw: &RawClosure,
    scope: &HandleScope<'_>,
) -> Result<Closure, LowerError> {
    let module = match scope.attribute(raw.module)? {
        Constant::Atom(name) => name.clone(),
        _ => {
            return Err(LowerError::AttributeKind {
                handle: raw.module.0,
                expected: "an atom",
            })
        }
    };
    if raw.name.is_null() {
        return Err(LowerError::MissingPayload {
            what: "closure name",
        });
    }
    let name = CStr::from_ptr(raw.name)
        .to_str()
        .map_err(|_| LowerError::InvalidName)?;
    let env = raw_slice(raw.env, raw.env_len as usize, "environment")?;
    Ok(Closure {
        loc: scope.loc(raw.loc)?,
        symbol: FunctionSymbol::new(module, name, raw.arity as u32)?,
        version: ClosureVersion {
            index: raw.index,
            old_unique: raw.old_unique,
            unique: Uniq(raw.unique),
        },
        env: scope.values(env)?,
    })
}

// =============================================================================
// Binary specifiers
// =============================================================================

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RawIntegerSpecifier {
    pub signed: bool,
    pub endianness: u32,
    pub unit: i64,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RawFloatSpecifier {
    pub endianness: u32,
    pub unit: i64,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RawUnitSpecifier {
    pub unit: i64,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RawEndiannessSpecifier {
    pub endianness: u32,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub union RawSpecifierPayload {
    pub i: RawIntegerSpecifier,
    pub f: RawFloatSpecifier,
    pub us: RawUnitSpecifier,
    pub es: RawEndiannessSpecifier,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct RawBinarySpecifier {
    pub tag: u32,
    pub payload: RawSpecifierPayload,
}

fn decode_endianness(raw: u32) -> Result<Endianness, LowerError> {
    Endianness::from_raw(raw).ok_or(LowerError::UnknownTag {
        what: "endianness",
        tag: raw,
    })
}

fn decode_unit(raw: i64) -> Result<u32, LowerError> {
    if !(1..=MAX_UNIT as i64).contains(&raw) {
        return Err(LowerError::InvalidUnit { unit: raw });
    }
    Ok(raw as u32)
}

/// # Safety
/// `raw.payload` must have been initialized through the variant `raw.tag`
/// names.
pub unsafe fn decode_specifier(raw: &RawBinarySpecifier) -> Result<BinarySpecifier, LowerError> {
    let tag = SpecifierTag::from_raw(raw.tag).ok_or(LowerError::UnknownTag {
        what: "binary specifier",
        tag: raw.tag,
    })?;
    let p = &raw.payload;
    match tag {
        SpecifierTag::Integer => BinarySpecifier::integer(
            p.i.signed,
            decode_endianness(p.i.endianness)?,
            decode_unit(p.i.unit)?,
        ),
        SpecifierTag::Float => {
            BinarySpecifier::float(decode_endianness(p.f.endianness)?, decode_unit(p.f.unit)?)
        }
        SpecifierTag::Bytes => BinarySpecifier::bytes(decode_unit(p.us.unit)?),
        SpecifierTag::Bits => BinarySpecifier::bits(decode_unit(p.us.unit)?),
        SpecifierTag::Utf8 => Ok(BinarySpecifier::Utf8),
        SpecifierTag::Utf16 => Ok(BinarySpecifier::Utf16 {
            endianness: decode_endianness(p.es.endianness)?,
        }),
        SpecifierTag::Utf32 => Ok(BinarySpecifier::Utf32 {
            endianness: decode_endianness(p.es.endianness)?,
        }),
    }
}

// =============================================================================
// Matches
// =============================================================================

pub const PATTERN_ANY: u32 = 0;
pub const PATTERN_CONS: u32 = 1;
pub const PATTERN_TUPLE: u32 = 2;
pub const PATTERN_MAP_ITEM: u32 = 3;
pub const PATTERN_IS_TYPE: u32 = 4;
pub const PATTERN_VALUE: u32 = 5;
pub const PATTERN_BINARY: u32 = 6;

#[repr(C)]
#[derive(Clone, Copy)]
pub struct RawBinaryPayload {
    /// `ValueRef::NONE` when the segment has no explicit size.
    pub size: ValueRef,
    pub spec: RawBinarySpecifier,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub union RawPatternPayload {
    pub i: u32,
    pub v: ValueRef,
    pub t: RawType,
    pub b: RawBinaryPayload,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct RawMatchPattern {
    pub tag: u32,
    pub payload: RawPatternPayload,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct RawMatchBranch {
    pub loc: LocRef,
    pub dest: BlockRef,
    pub dest_args: *const ValueRef,
    pub dest_args_len: u32,
    pub pattern: RawMatchPattern,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct RawMatch {
    pub loc: LocRef,
    pub selector: ValueRef,
    pub branches: *const RawMatchBranch,
    pub branches_len: u32,
}

/// # Safety
/// `raw.payload` must have been initialized through the variant `raw.tag`
/// names.
pub unsafe fn decode_pattern(
    raw: &RawMatchPattern,
    scope: &HandleScope<'_>,
) -> Result<MatchPattern, LowerError> {
    let p = &raw.payload;
    let pattern = match raw.tag {
        PATTERN_ANY => MatchPattern::Any,
        PATTERN_CONS => MatchPattern::Cons,
        PATTERN_TUPLE => {
            TermType::tuple(p.i)?;
            MatchPattern::Tuple(p.i)
        }
        PATTERN_MAP_ITEM => MatchPattern::MapItem(scope.value(p.v)?),
        PATTERN_IS_TYPE => MatchPattern::IsType(decode_type(&p.t)?),
        PATTERN_VALUE => MatchPattern::Value(scope.value(p.v)?),
        PATTERN_BINARY => MatchPattern::Binary {
            spec: decode_specifier(&p.b.spec)?,
            size: scope.optional_value(p.b.size)?,
        },
        tag => {
            return Err(LowerError::UnknownTag {
                what: "match pattern",
                tag,
            })
        }
    };
    Ok(pattern)
}

/// Decodes a match. The flat form has no fallthrough block: the front-end
/// ends every match with an irrefutable branch, so the decoded match has
/// none either.
///
/// # Safety
/// Every list reachable from `raw` must satisfy the contract of a
/// front-end list, and every pattern payload must match its tag.
pub unsafe fn decode_match(raw: &RawMatch, scope: &HandleScope<'_>) -> Result<Match, LowerError> {
    let branches = raw_slice(raw.branches, raw.branches_len as usize, "match branch")?
        .iter()
        .map(|b| {
            let args = raw_slice(b.dest_args, b.dest_args_len as usize, "destination argument")?;
            Ok(MatchBranch {
                loc: scope.loc(b.loc)?,
                dest: scope.block(b.dest)?,
                dest_args: scope.values(args)?,
                pattern: decode_pattern(&b.pattern, scope)?,
            })
        })
        .collect::<Result<Vec<_>, LowerError>>()?;
    Ok(Match {
        loc: scope.loc(raw.loc)?,
        selector: scope.value(raw.selector)?,
        branches,
        fallthrough: None,
    })
}
