//! Graft IR core.
//!
//! An arena-based IR kernel: a structurally verified attribute/type model, a
//! composable constraint engine, and a backtracking parser for the generic
//! textual operation format that keeps the full history of failed parse
//! attempts for diagnostics.

// === Attribute model & constraints ===
pub mod attrs;
pub mod constraints;

// === IR storage ===
pub mod context;
pub mod registry;

// === Parsing ===
pub mod error;
pub mod history;
pub mod lexer;
pub mod location;
pub mod parser;

// === Infrastructure ===
pub mod symbol;

pub use attrs::{
    ArrayAttr, Attribute, ComplexType, DenseArrayBase, DenseElement, DenseIntOrFPElementsAttr,
    ElementType, FloatAttr, FloatData, FloatType, IntAttr, IntegerType, MemRefType, Signedness,
    StrideArg, StridedLayoutAttr, SymbolRefAttr, VectorType,
};
pub use constraints::{
    AllOfConstraint, AnyAttr, AttrConstraint, EqAttrConstraint, VectorBaseTypeAndRankConstraint,
    VectorBaseTypeConstraint, VectorRankConstraint,
};
pub use context::{
    Attrs, IrContext, OpRef, OperationData, RegionData, RegionRef, ValueData, ValueDef, ValueRef,
};
pub use error::{ParseError, ParseFailure, VerifyError};
pub use history::{History, HistoryId, HistoryNode};
pub use location::{SourceText, Span};
pub use parser::parse_operation;
pub use registry::{OpDef, OpRegistry, ParseContext, SlotCount, SlotSpec};
pub use symbol::Symbol;
