pub mod binary;
pub mod block;
pub mod constant;
pub mod def;
pub mod function;
pub mod instr;
pub mod loc;
pub mod module;
pub mod types;
pub mod value;

pub use binary::{BinarySpecifier, Endianness, Segment, SegmentSize, SegmentWidth, SpecifierTag};
pub use block::{BlockId, IrBlock};
pub use constant::Constant;
pub use def::{constant, definition, definition_in, definition_where, Definition};
pub use function::{ClosureVersion, FunctionId, FunctionSymbol, IrFunction, Uniq};
pub use instr::{Edge, InstrId, IrInstr};
pub use loc::{Arg, LocId, Location, Span};
pub use module::{AttrId, IrFunctionBuilder, IrModule};
pub use types::{IrType, TermKind, TermType};
pub use value::{BlockParam, ValueDef, ValueId};
