use thiserror::Error;

use crate::ir::binary::SpecifierTag;

/// Any failure surfaced by the crate, tagged with the stage it came from.
#[derive(Debug, Error)]
pub enum Error {
    #[error("[lowering error] {0}")]
    Lower(#[from] LowerError),

    #[error("[verification error] {0}")]
    Pass(#[from] PassError),

    #[error("[printer error] {0}")]
    Codegen(#[from] CodegenError),

    #[error("[evaluation error] {0}")]
    Interp(#[from] InterpError),

    #[error("[configuration error] {0}")]
    Config(#[from] ConfigError),
}

/// A contract violation by the front-end. Lowering stops at the first one;
/// there is no recovery.
#[derive(Debug, Error)]
pub enum LowerError {
    #[error("unknown {what} tag {tag}")]
    UnknownTag { what: &'static str, tag: u32 },

    #[error("missing {what} payload")]
    MissingPayload { what: &'static str },

    #[error("{what} arity {arity} is out of range (max {max})")]
    ArityOutOfRange {
        what: &'static str,
        arity: u64,
        max: u64,
    },

    #[error("invalid segment unit {unit} (expected 1..=256)")]
    InvalidUnit { unit: i64 },

    #[error("segment size {size} with unit {unit} does not fit in 64 bits")]
    SegmentTooLarge { size: u64, unit: u32 },

    #[error("{tag:?} segments take no size")]
    SizeOnUtf { tag: SpecifierTag },

    #[error("unknown {what} handle {handle}")]
    UnknownHandle { what: &'static str, handle: u32 },

    #[error("attribute {handle} is not {expected}")]
    AttributeKind {
        handle: u32,
        expected: &'static str,
    },

    #[error("null {what} list with {len} elements")]
    NullList { what: &'static str, len: usize },

    #[error("function name is not valid UTF-8")]
    InvalidName,

    #[error("function '{name}' is already defined")]
    DuplicateFunction { name: String },

    #[error("match has no branches")]
    EmptyMatch,

    #[error("block {block} takes {expected} parameters but {found} would be passed")]
    DestinationArity {
        block: String,
        expected: usize,
        found: usize,
    },
}

/// Structural faults found by the validator.
#[derive(Debug, Error)]
pub enum PassError {
    #[error("in function '{func}': value '{value}' is used before it is defined")]
    UseBeforeDef { func: String, value: String },

    #[error("in function '{func}': value '{value}' is defined more than once")]
    MultipleDefinition { func: String, value: String },

    #[error("in function '{func}': block '{block}' does not end with exactly one terminator")]
    MissingTerminator { func: String, block: String },

    #[error("in function '{func}': block '{block}' branches to unknown block '{target}'")]
    UnknownBlock {
        func: String,
        block: String,
        target: String,
    },

    #[error("in function '{func}': edge {from} -> {to} passes {found} arguments but the target takes {expected}")]
    EdgeArity {
        func: String,
        from: String,
        to: String,
        expected: usize,
        found: usize,
    },
}

#[derive(Debug, Error)]
pub enum CodegenError {
    #[error("failed to format IR text")]
    Fmt(#[from] std::fmt::Error),
}

/// Runtime faults of the reference evaluator.
#[derive(Debug, Error)]
pub enum InterpError {
    #[error("internal error: undefined value %{id}")]
    UndefinedValue { id: u32 },

    #[error("internal error: undefined block bb{id}")]
    UndefinedBlock { id: u32 },

    #[error("type error: {detail}")]
    TypeError { detail: String },

    #[error("not yet supported: {detail}")]
    Unsupported { detail: String },

    #[error("reached unreachable code in block bb{block}")]
    Unreachable { block: u32 },

    #[error("exceeded step limit of {limit}")]
    StepLimit { limit: usize },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid lowering configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("target endianness must be big or little, not native")]
    NativeTarget,
}
