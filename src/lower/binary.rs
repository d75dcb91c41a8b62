//! Binary segment matching and construction.
//!
//! Both directions operate on one segment at a time through a terminator
//! with an `ok` and an `err` edge. Matching threads a cursor: the `ok` edge
//! of `BinaryMatch` binds the decoded value and the remaining bits, and the
//! next segment is matched against that remainder. Construction threads a
//! builder the same way through `BinaryPush`.

use tracing::{instrument, trace};

use crate::error::LowerError;
use crate::ir::binary::{BinarySpecifier, Segment, SegmentSize};
use crate::ir::block::BlockId;
use crate::ir::constant::Constant;
use crate::ir::instr::IrInstr;
use crate::ir::types::{IrType, TermType};
use crate::ir::value::ValueId;
use crate::lower::Lowerer;

/// One segment of a binary under construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinarySegment {
    pub value: ValueId,
    pub spec: BinarySpecifier,
    pub size: Option<ValueId>,
}

/// The term type a segment decodes to.
fn decoded_type(spec: &BinarySpecifier) -> TermType {
    match spec {
        BinarySpecifier::Float { .. } => TermType::Float,
        BinarySpecifier::Bytes { .. } | BinarySpecifier::Bits { .. } => TermType::Binary,
        BinarySpecifier::Integer { .. }
        | BinarySpecifier::Utf8
        | BinarySpecifier::Utf16 { .. }
        | BinarySpecifier::Utf32 { .. } => TermType::Integer,
    }
}

impl Lowerer<'_> {
    /// Resolves native byte order and folds an integer-literal size into a
    /// fixed width.
    pub fn segment(
        &self,
        spec: BinarySpecifier,
        size: Option<ValueId>,
    ) -> Result<Segment, LowerError> {
        let spec = spec.resolve_native(self.config.target_endianness);
        let size = size.map(|v| match self.constant(v) {
            Some(Constant::Int(n)) if *n >= 0 => {
                trace!(size = %v, units = *n, "segment size folded");
                SegmentSize::Const(*n as u64)
            }
            _ => SegmentSize::Value(v),
        });
        spec.segment(size)
    }

    /// Consumes one segment from the front of `bin`.
    ///
    /// Seals the current block with `BinaryMatch`; on underflow or a bad
    /// size control reaches `err`. Leaves the cursor on the success block
    /// and returns the decoded value and the remaining bits.
    pub fn match_segment(
        &mut self,
        bin: ValueId,
        spec: BinarySpecifier,
        size: Option<ValueId>,
        err: BlockId,
    ) -> Result<(ValueId, ValueId), LowerError> {
        self.check_arity(err, 0)?;
        let segment = self.segment(spec, size)?;
        let ok = self.builder.create_block(Some("binary.matched"));
        let value = self
            .builder
            .add_block_param(ok, Some("value"), IrType::Term(decoded_type(&spec)));
        let rest = self
            .builder
            .add_block_param(ok, Some("rest"), IrType::Term(TermType::Binary));
        self.builder.terminate(IrInstr::BinaryMatch {
            bin,
            segment,
            ok,
            err,
        });
        self.builder.set_current_block(ok);
        Ok((value, rest))
    }

    /// Builds a binary from `segments` in order.
    ///
    /// Each push that cannot encode its value (wrong type, out of range
    /// size, bad code point) branches to `err`, which must take no
    /// parameters. Leaves the cursor after the finished binary and returns it.
    #[instrument(skip_all, fields(segments = segments.len()))]
    pub fn build_binary(
        &mut self,
        segments: &[BinarySegment],
        err: BlockId,
    ) -> Result<ValueId, LowerError> {
        self.check_arity(err, 0)?;
        let resolved = segments
            .iter()
            .map(|s| Ok((s.value, self.segment(s.spec, s.size)?)))
            .collect::<Result<Vec<_>, LowerError>>()?;

        let mut builder = self
            .builder
            .emit(IrType::Builder, |result| IrInstr::BinaryStart { result });
        for (value, segment) in resolved {
            let ok = self.builder.create_block(Some("binary.pushed"));
            let next = self
                .builder
                .add_block_param(ok, Some("builder"), IrType::Builder);
            self.builder.terminate(IrInstr::BinaryPush {
                builder,
                value,
                segment,
                ok,
                err,
            });
            self.builder.set_current_block(ok);
            builder = next;
        }
        Ok(self
            .builder
            .emit(IrType::Term(TermType::Binary), |result| {
                IrInstr::BinaryFinish { result, builder }
            }))
    }
}
