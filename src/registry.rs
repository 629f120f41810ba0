//! Operation definitions and the registry handed to the parser.
//!
//! A registry maps mnemonics to `OpDef`s. It travels inside a `ParseContext`
//! rather than living in a global, so independent parses with different
//! registries never interfere.

use std::collections::HashMap;
use std::sync::Arc;

use crate::attrs::Attribute;
use crate::constraints::{AnyAttr, AttrConstraint};
use crate::context::{IrContext, OpRef};
use crate::error::VerifyError;
use crate::symbol::Symbol;

/// How many values a slot accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotCount {
    Exact(usize),
    Variadic,
}

/// A constrained operand or result slot.
#[derive(Clone)]
pub struct SlotSpec {
    pub count: SlotCount,
    pub constraint: Arc<dyn AttrConstraint>,
}

impl SlotSpec {
    fn any(count: SlotCount) -> Self {
        Self {
            count,
            constraint: Arc::new(AnyAttr),
        }
    }
}

/// Definition of a registered operation: slot arities, per-slot type
/// constraints, and required attributes.
#[derive(Clone)]
pub struct OpDef {
    pub name: Symbol,
    pub operands: SlotSpec,
    pub results: SlotSpec,
    pub attributes: Vec<(Symbol, Arc<dyn AttrConstraint>)>,
}

impl OpDef {
    pub fn new(name: impl Into<Symbol>) -> Self {
        Self {
            name: name.into(),
            operands: SlotSpec::any(SlotCount::Exact(0)),
            results: SlotSpec::any(SlotCount::Exact(0)),
            attributes: Vec::new(),
        }
    }

    pub fn operands(mut self, count: usize, constraint: Arc<dyn AttrConstraint>) -> Self {
        self.operands = SlotSpec {
            count: SlotCount::Exact(count),
            constraint,
        };
        self
    }

    pub fn variadic_operands(mut self, constraint: Arc<dyn AttrConstraint>) -> Self {
        self.operands = SlotSpec {
            count: SlotCount::Variadic,
            constraint,
        };
        self
    }

    pub fn results(mut self, count: usize, constraint: Arc<dyn AttrConstraint>) -> Self {
        self.results = SlotSpec {
            count: SlotCount::Exact(count),
            constraint,
        };
        self
    }

    pub fn variadic_results(mut self, constraint: Arc<dyn AttrConstraint>) -> Self {
        self.results = SlotSpec {
            count: SlotCount::Variadic,
            constraint,
        };
        self
    }

    pub fn attr(mut self, key: impl Into<Symbol>, constraint: Arc<dyn AttrConstraint>) -> Self {
        self.attributes.push((key.into(), constraint));
        self
    }

    /// Verify a created operation against this definition.
    pub fn verify(&self, ir: &IrContext, op: OpRef) -> Result<(), VerifyError> {
        let data = ir.op(op);

        if let SlotCount::Exact(expected) = self.operands.count {
            if data.operands.len() != expected {
                return Err(VerifyError::new(format!(
                    "operation '{}' expects {} operands, got {}",
                    self.name,
                    expected,
                    data.operands.len()
                )));
            }
        }
        for (i, &operand) in data.operands.iter().enumerate() {
            let ty = &ir.value(operand).ty;
            if let Err(err) = self.operands.constraint.verify(ty) {
                return Err(VerifyError::new(format!(
                    "operand #{} of '{}': {}",
                    i, self.name, err.message
                )));
            }
        }

        if let SlotCount::Exact(expected) = self.results.count {
            if data.result_types.len() != expected {
                return Err(VerifyError::new(format!(
                    "operation '{}' expects {} results, got {}",
                    self.name,
                    expected,
                    data.result_types.len()
                )));
            }
        }
        for (i, ty) in data.result_types.iter().enumerate() {
            if let Err(err) = self.results.constraint.verify(ty) {
                return Err(VerifyError::new(format!(
                    "result #{} of '{}': {}",
                    i, self.name, err.message
                )));
            }
        }

        for (key, constraint) in &self.attributes {
            let Some(value) = data.attributes.get(key) else {
                return Err(VerifyError::new(format!(
                    "operation '{}' requires attribute '{}'",
                    self.name, key
                )));
            };
            if let Err(err) = constraint.verify(value) {
                return Err(VerifyError::new(format!(
                    "attribute '{}' of '{}': {}",
                    key, self.name, err.message
                )));
            }
        }

        Ok(())
    }
}

/// Mnemonic-to-definition map.
#[derive(Clone, Default)]
pub struct OpRegistry {
    defs: HashMap<Symbol, OpDef>,
}

impl OpRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, def: OpDef) {
        self.defs.insert(def.name, def);
    }

    pub fn get(&self, name: Symbol) -> Option<&OpDef> {
        self.defs.get(&name)
    }
}

/// Everything the parser needs besides the source text.
#[derive(Clone, Default)]
pub struct ParseContext {
    pub registry: OpRegistry,
    /// Accept mnemonics absent from the registry, skipping verification.
    pub allow_unregistered: bool,
}

impl ParseContext {
    pub fn new(registry: OpRegistry) -> Self {
        Self {
            registry,
            allow_unregistered: false,
        }
    }

    /// A context that accepts any mnemonic without verification.
    pub fn permissive() -> Self {
        Self {
            registry: OpRegistry::new(),
            allow_unregistered: true,
        }
    }

    pub fn register_op(&mut self, def: OpDef) {
        self.registry.register(def);
    }

    pub fn get_op(&self, name: Symbol) -> Option<&OpDef> {
        self.registry.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attrs::IntegerType;
    use crate::constraints::EqAttrConstraint;
    use crate::context::{Attrs, OperationData};
    use crate::location::Span;
    use smallvec::SmallVec;

    fn make_op(ir: &mut IrContext, name: &'static str, result_types: Vec<Attribute>) -> OpRef {
        ir.create_op(OperationData {
            span: Span::new(0, 0),
            name: Symbol::new(name),
            operands: SmallVec::new(),
            result_types: result_types.into_iter().collect(),
            results: SmallVec::new(),
            attributes: Attrs::new(),
            regions: SmallVec::new(),
        })
    }

    #[test]
    fn result_arity_checked() {
        let def = OpDef::new("test.one").results(1, Arc::new(AnyAttr));
        let mut ir = IrContext::new();
        let op = make_op(&mut ir, "test.one", vec![]);
        let err = def.verify(&ir, op).unwrap_err();
        assert_eq!(
            err.to_string(),
            "operation 'test.one' expects 1 results, got 0"
        );
    }

    #[test]
    fn result_constraint_checked() {
        let def = OpDef::new("test.i32").variadic_results(Arc::new(EqAttrConstraint::new(
            IntegerType::I32,
        )));
        let mut ir = IrContext::new();
        let op = make_op(
            &mut ir,
            "test.i32",
            vec![Attribute::IntegerType(IntegerType::I64)],
        );
        let err = def.verify(&ir, op).unwrap_err();
        assert_eq!(
            err.to_string(),
            "result #0 of 'test.i32': Expected attribute i32, got i64."
        );
    }

    #[test]
    fn required_attribute_checked() {
        let def = OpDef::new("test.attr").attr("value", Arc::new(AnyAttr));
        let mut ir = IrContext::new();
        let op = make_op(&mut ir, "test.attr", vec![]);
        let err = def.verify(&ir, op).unwrap_err();
        assert_eq!(
            err.to_string(),
            "operation 'test.attr' requires attribute 'value'"
        );
    }

    #[test]
    fn registry_lookup() {
        let mut ctx = ParseContext::default();
        ctx.register_op(OpDef::new("test.op"));
        assert!(ctx.get_op(Symbol::new("test.op")).is_some());
        assert!(ctx.get_op(Symbol::new("test.missing")).is_none());
    }
}
