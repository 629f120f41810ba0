//! Composable attribute constraints.
//!
//! Constraints are trait objects shared through `Arc`, so a registry can hand
//! the same constraint to many operation definitions. Failure messages are
//! part of the crate's contract; tests assert on the literal text.

use std::fmt::Write as _;
use std::sync::Arc;

use crate::attrs::Attribute;
use crate::error::VerifyError;

/// A predicate over attributes.
pub trait AttrConstraint: Send + Sync {
    fn verify(&self, attr: &Attribute) -> Result<(), VerifyError>;
}

/// Accepts every attribute.
#[derive(Clone, Copy, Debug, Default)]
pub struct AnyAttr;

impl AttrConstraint for AnyAttr {
    fn verify(&self, _attr: &Attribute) -> Result<(), VerifyError> {
        Ok(())
    }
}

/// Requires exact structural equality with a fixed attribute.
#[derive(Clone, Debug)]
pub struct EqAttrConstraint {
    pub expected: Attribute,
}

impl EqAttrConstraint {
    pub fn new(expected: impl Into<Attribute>) -> Self {
        Self {
            expected: expected.into(),
        }
    }
}

impl AttrConstraint for EqAttrConstraint {
    fn verify(&self, attr: &Attribute) -> Result<(), VerifyError> {
        if *attr == self.expected {
            Ok(())
        } else {
            Err(VerifyError::new(format!(
                "Expected attribute {}, got {}.",
                self.expected, attr
            )))
        }
    }
}

/// Requires a vector type of a fixed rank.
#[derive(Clone, Copy, Debug)]
pub struct VectorRankConstraint {
    pub expected_rank: usize,
}

impl VectorRankConstraint {
    pub fn new(expected_rank: usize) -> Self {
        Self { expected_rank }
    }
}

impl AttrConstraint for VectorRankConstraint {
    fn verify(&self, attr: &Attribute) -> Result<(), VerifyError> {
        let Attribute::Vector(vector) = attr else {
            return Err(VerifyError::new(format!(
                "{attr} should be of type VectorType."
            )));
        };
        if vector.get_num_dims() != self.expected_rank {
            return Err(VerifyError::new(format!(
                "Expected vector rank to be {}, got {}.",
                self.expected_rank,
                vector.get_num_dims()
            )));
        }
        Ok(())
    }
}

/// Requires a vector type over a fixed element type.
#[derive(Clone, Debug)]
pub struct VectorBaseTypeConstraint {
    pub expected_type: Attribute,
}

impl VectorBaseTypeConstraint {
    pub fn new(expected_type: impl Into<Attribute>) -> Self {
        Self {
            expected_type: expected_type.into(),
        }
    }
}

impl AttrConstraint for VectorBaseTypeConstraint {
    fn verify(&self, attr: &Attribute) -> Result<(), VerifyError> {
        let Attribute::Vector(vector) = attr else {
            return Err(VerifyError::new(format!(
                "{attr} should be of type VectorType."
            )));
        };
        if *vector.element_type != self.expected_type {
            return Err(VerifyError::new(format!(
                "Expected vector type to be {}, got {}.",
                self.expected_type, vector.element_type
            )));
        }
        Ok(())
    }
}

/// Runs every member constraint and aggregates the failures.
///
/// Zero failures pass; a single failure propagates unwrapped; two or more are
/// joined under one header, duplicates preserved.
#[derive(Clone)]
pub struct AllOfConstraint {
    pub constraints: Vec<Arc<dyn AttrConstraint>>,
}

impl AllOfConstraint {
    pub fn new(constraints: Vec<Arc<dyn AttrConstraint>>) -> Self {
        Self { constraints }
    }
}

impl AttrConstraint for AllOfConstraint {
    fn verify(&self, attr: &Attribute) -> Result<(), VerifyError> {
        let mut failures: Vec<VerifyError> = Vec::new();
        for constraint in &self.constraints {
            if let Err(err) = constraint.verify(attr) {
                failures.push(err);
            }
        }
        match failures.len() {
            0 => Ok(()),
            1 => Err(failures.remove(0)),
            _ => {
                let mut message = String::from("The following constraints were not satisfied:");
                for failure in &failures {
                    let _ = write!(message, "\n{}", failure.message);
                }
                Err(VerifyError::new(message))
            }
        }
    }
}

/// Vector base type and rank, checked together.
#[derive(Clone)]
pub struct VectorBaseTypeAndRankConstraint {
    inner: AllOfConstraint,
}

impl VectorBaseTypeAndRankConstraint {
    pub fn new(expected_type: impl Into<Attribute>, expected_rank: usize) -> Self {
        Self {
            inner: AllOfConstraint::new(vec![
                Arc::new(VectorBaseTypeConstraint::new(expected_type)),
                Arc::new(VectorRankConstraint::new(expected_rank)),
            ]),
        }
    }
}

impl AttrConstraint for VectorBaseTypeAndRankConstraint {
    fn verify(&self, attr: &Attribute) -> Result<(), VerifyError> {
        self.inner.verify(attr)
    }
}
