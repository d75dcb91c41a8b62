use std::fmt;

use crate::ir::types::TermType;

/// A byte range in a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }
}

/// A source location attached to matches, branches and map updates.
///
/// Created by the front-end and never modified here.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    pub span: Span,
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Index of a `Location` in the owning module's location table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LocId(pub u32);

impl fmt::Display for LocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "loc{}", self.0)
    }
}

/// Describes one function or block parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arg {
    pub ty: TermType,
    pub span: Span,
    /// Implicit parameters are introduced by the compiler (e.g. a closure
    /// environment) rather than written in source.
    pub implicit: bool,
}

impl Arg {
    pub fn new(ty: TermType) -> Self {
        Self {
            ty,
            span: Span::default(),
            implicit: false,
        }
    }
}
