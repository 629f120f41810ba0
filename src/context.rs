//! Arena-based mutable IR storage.
//!
//! All IR entities (operations, values, regions) are stored in `PrimaryMap`s
//! owned by `IrContext` and addressed by thin `u32` refs, so the structure has
//! no ownership cycles and no lifetime parameters.

use std::collections::BTreeMap;

use cranelift_entity::{PrimaryMap, entity_impl};
use smallvec::SmallVec;

use crate::attrs::Attribute;
use crate::location::Span;
use crate::symbol::Symbol;

// ============================================================================
// Entity refs
// ============================================================================

/// Reference to an operation in the arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OpRef(u32);
entity_impl!(OpRef, "op");

/// Reference to an SSA value in the arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValueRef(u32);
entity_impl!(ValueRef, "v");

/// Reference to a region in the arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionRef(u32);
entity_impl!(RegionRef, "region");

/// Where a value is defined: an operation result at the given index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ValueDef {
    pub op: OpRef,
    pub index: u32,
}

// ============================================================================
// Entity data types
// ============================================================================

/// Attribute dictionary of an operation.
pub type Attrs = BTreeMap<Symbol, Attribute>;

/// Data for a single operation in the arena.
pub struct OperationData {
    pub span: Span,
    pub name: Symbol,
    pub operands: SmallVec<[ValueRef; 2]>,
    pub result_types: SmallVec<[Attribute; 1]>,
    /// Result values, allocated by `create_op`. Parallel to `result_types`.
    pub results: SmallVec<[ValueRef; 1]>,
    pub attributes: Attrs,
    pub regions: SmallVec<[RegionRef; 1]>,
}

/// Data for a single SSA value.
pub struct ValueData {
    pub ty: Attribute,
    pub def: ValueDef,
}

/// Data for a region: an ordered list of operations.
pub struct RegionData {
    pub span: Span,
    pub ops: SmallVec<[OpRef; 4]>,
    pub parent_op: Option<OpRef>,
}

// ============================================================================
// IrContext
// ============================================================================

/// Arena-based mutable IR context.
///
/// Owns all IR entities and provides methods for creating and querying them.
#[derive(Default)]
pub struct IrContext {
    ops: PrimaryMap<OpRef, OperationData>,
    values: PrimaryMap<ValueRef, ValueData>,
    regions: PrimaryMap<RegionRef, RegionData>,
}

impl IrContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new operation, allocate its result values, and back-link its
    /// owned regions.
    ///
    /// `data.results` must be empty on entry; `create_op` fills it.
    pub fn create_op(&mut self, data: OperationData) -> OpRef {
        debug_assert!(data.results.is_empty(), "create_op allocates result values");

        let result_types = data.result_types.clone();
        let regions = data.regions.clone();
        let op = self.ops.push(data);

        for &r in &regions {
            debug_assert!(self.regions[r].parent_op.is_none());
            self.regions[r].parent_op = Some(op);
        }

        let mut results = SmallVec::new();
        for (index, ty) in result_types.into_iter().enumerate() {
            results.push(self.values.push(ValueData {
                ty,
                def: ValueDef {
                    op,
                    index: index as u32,
                },
            }));
        }
        self.ops[op].results = results;
        op
    }

    /// Create an empty region. Operations are appended by the caller.
    pub fn create_region(&mut self, span: Span) -> RegionRef {
        self.regions.push(RegionData {
            span,
            ops: SmallVec::new(),
            parent_op: None,
        })
    }

    /// Append an operation to a region's body.
    pub fn push_op(&mut self, region: RegionRef, op: OpRef) {
        self.regions[region].ops.push(op);
    }

    pub fn op(&self, op: OpRef) -> &OperationData {
        &self.ops[op]
    }

    pub fn value(&self, value: ValueRef) -> &ValueData {
        &self.values[value]
    }

    pub fn region(&self, region: RegionRef) -> &RegionData {
        &self.regions[region]
    }

    /// The value produced by an operation's result slot.
    pub fn op_result(&self, op: OpRef, index: usize) -> ValueRef {
        self.ops[op].results[index]
    }
}
