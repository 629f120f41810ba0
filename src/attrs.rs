//! The builtin attribute and type model.
//!
//! Attributes are a closed sum type with structural equality and a canonical
//! textual rendering. Composite attributes verify their invariants at
//! construction time, so a held `Attribute` is always well-formed.

use std::fmt;

use smallvec::SmallVec;

use crate::error::VerifyError;
use crate::symbol::Symbol;

// ============================================================================
// Integer and float types
// ============================================================================

/// Signedness semantics of an integer type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Signedness {
    Signless,
    Signed,
    Unsigned,
}

/// An integer type of arbitrary bit width.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IntegerType {
    pub width: u32,
    pub signedness: Signedness,
}

impl IntegerType {
    pub const I1: IntegerType = IntegerType::new(1);
    pub const I32: IntegerType = IntegerType::new(32);
    pub const I64: IntegerType = IntegerType::new(64);

    /// A signless integer type of the given width.
    pub const fn new(width: u32) -> Self {
        Self {
            width,
            signedness: Signedness::Signless,
        }
    }

    pub const fn signed(width: u32) -> Self {
        Self {
            width,
            signedness: Signedness::Signed,
        }
    }

    pub const fn unsigned(width: u32) -> Self {
        Self {
            width,
            signedness: Signedness::Unsigned,
        }
    }
}

impl fmt::Display for IntegerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.signedness {
            Signedness::Signless => "i",
            Signedness::Signed => "si",
            Signedness::Unsigned => "ui",
        };
        write!(f, "{}{}", prefix, self.width)
    }
}

/// A builtin floating-point type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FloatType {
    BF16,
    F16,
    F32,
    F64,
}

impl fmt::Display for FloatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FloatType::BF16 => "bf16",
            FloatType::F16 => "f16",
            FloatType::F32 => "f32",
            FloatType::F64 => "f64",
        })
    }
}

// ============================================================================
// Scalar attributes
// ============================================================================

/// An integer constant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IntAttr {
    pub value: i64,
}

impl IntAttr {
    pub const fn new(value: i64) -> Self {
        Self { value }
    }
}

impl From<i64> for IntAttr {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for IntAttr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Float payload stored as raw bits so the attribute enum stays `Eq + Hash`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FloatData {
    bits: u64,
}

impl FloatData {
    pub fn new(value: f64) -> Self {
        Self {
            bits: value.to_bits(),
        }
    }

    pub fn value(&self) -> f64 {
        f64::from_bits(self.bits)
    }
}

impl From<f64> for FloatData {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for FloatData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = format!("{}", self.value());
        // Keep a decimal point so the text re-lexes as a float literal.
        if rendered.contains(['.', 'e', 'f', 'N']) {
            f.write_str(&rendered)
        } else {
            write!(f, "{rendered}.0")
        }
    }
}

/// A typed floating-point constant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FloatAttr {
    pub value: FloatData,
    pub ty: FloatType,
}

impl FloatAttr {
    pub fn new(value: f64, ty: FloatType) -> Self {
        Self {
            value: FloatData::new(value),
            ty,
        }
    }
}

impl fmt::Display for FloatAttr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}", self.value, self.ty)
    }
}

// ============================================================================
// Array attributes
// ============================================================================

/// An ordered list of attributes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ArrayAttr {
    data: Vec<Attribute>,
}

impl ArrayAttr {
    pub fn new(data: Vec<Attribute>) -> Self {
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Attribute> {
        self.data.iter()
    }
}

impl From<Vec<Attribute>> for ArrayAttr {
    fn from(data: Vec<Attribute>) -> Self {
        Self::new(data)
    }
}

impl std::ops::Index<usize> for ArrayAttr {
    type Output = Attribute;

    fn index(&self, index: usize) -> &Attribute {
        &self.data[index]
    }
}

impl<'a> IntoIterator for &'a ArrayAttr {
    type Item = &'a Attribute;
    type IntoIter = std::slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

impl IntoIterator for ArrayAttr {
    type Item = Attribute;
    type IntoIter = std::vec::IntoIter<Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.into_iter()
    }
}

impl fmt::Display for ArrayAttr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, attr) in self.data.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{attr}")?;
        }
        f.write_str("]")
    }
}

/// The element type of a dense buffer: an integer or float type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementType {
    Int(IntegerType),
    Float(FloatType),
}

impl From<IntegerType> for ElementType {
    fn from(ty: IntegerType) -> Self {
        ElementType::Int(ty)
    }
}

impl From<FloatType> for ElementType {
    fn from(ty: FloatType) -> Self {
        ElementType::Float(ty)
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementType::Int(ty) => write!(f, "{ty}"),
            ElementType::Float(ty) => write!(f, "{ty}"),
        }
    }
}

/// A flat dense array of homogeneous scalar elements.
///
/// Element kind is checked at construction: a float-typed array may only hold
/// [`FloatData`] members, an integer-typed array only [`IntAttr`] members.
/// The fields stay private so no value can exist in a violating state.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DenseArrayBase {
    elem_type: ElementType,
    data: ArrayAttr,
}

impl DenseArrayBase {
    pub fn new(elem_type: impl Into<ElementType>, data: ArrayAttr) -> Result<Self, VerifyError> {
        let attr = Self {
            elem_type: elem_type.into(),
            data,
        };
        attr.verify()?;
        Ok(attr)
    }

    pub fn elem_type(&self) -> ElementType {
        self.elem_type
    }

    pub fn data(&self) -> &ArrayAttr {
        &self.data
    }

    pub fn verify(&self) -> Result<(), VerifyError> {
        match self.elem_type {
            ElementType::Float(_) => {
                if self.data.iter().any(|a| !matches!(a, Attribute::FloatData(_))) {
                    return Err(VerifyError::new(
                        "dense array of float element type should only contain floats",
                    ));
                }
            }
            ElementType::Int(_) => {
                if self.data.iter().any(|a| !matches!(a, Attribute::Int(_))) {
                    return Err(VerifyError::new(
                        "dense array of integer element type should only contain integers",
                    ));
                }
            }
        }
        Ok(())
    }

    /// Build an integer-typed dense array from raw values. Infallible.
    pub fn from_ints(elem_type: IntegerType, values: &[i64]) -> Self {
        Self {
            elem_type: ElementType::Int(elem_type),
            data: ArrayAttr::new(
                values
                    .iter()
                    .map(|&v| Attribute::Int(IntAttr::new(v)))
                    .collect(),
            ),
        }
    }

    /// Build a float-typed dense array from raw values. Infallible.
    pub fn from_floats(elem_type: FloatType, values: &[f64]) -> Self {
        Self {
            elem_type: ElementType::Float(elem_type),
            data: ArrayAttr::new(
                values
                    .iter()
                    .map(|&v| Attribute::FloatData(FloatData::new(v)))
                    .collect(),
            ),
        }
    }

    /// The elements as raw integers, or `None` for a float-typed array.
    pub fn as_ints(&self) -> Option<Vec<i64>> {
        if !matches!(self.elem_type, ElementType::Int(_)) {
            return None;
        }
        self.data
            .iter()
            .map(|a| match a {
                Attribute::Int(i) => Some(i.value),
                _ => None,
            })
            .collect()
    }

    /// The elements as raw floats, or `None` for an integer-typed array.
    pub fn as_floats(&self) -> Option<Vec<f64>> {
        if !matches!(self.elem_type, ElementType::Float(_)) {
            return None;
        }
        self.data
            .iter()
            .map(|a| match a {
                Attribute::FloatData(d) => Some(d.value()),
                _ => None,
            })
            .collect()
    }
}

impl fmt::Display for DenseArrayBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "array<{}:", self.elem_type)?;
        for (i, attr) in self.data.iter().enumerate() {
            f.write_str(if i > 0 { ", " } else { " " })?;
            write!(f, "{attr}")?;
        }
        f.write_str(">")
    }
}

/// A raw element value accepted by [`DenseIntOrFPElementsAttr::tensor_from_list`].
#[derive(Clone, Copy, Debug)]
pub enum DenseElement {
    Int(i64),
    Float(f64),
}

impl From<i64> for DenseElement {
    fn from(value: i64) -> Self {
        DenseElement::Int(value)
    }
}

impl From<f64> for DenseElement {
    fn from(value: f64) -> Self {
        DenseElement::Float(value)
    }
}

impl From<IntAttr> for DenseElement {
    fn from(attr: IntAttr) -> Self {
        DenseElement::Int(attr.value)
    }
}

impl From<FloatAttr> for DenseElement {
    fn from(attr: FloatAttr) -> Self {
        DenseElement::Float(attr.value.value())
    }
}

/// A shaped dense buffer of integer or float elements.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DenseIntOrFPElementsAttr {
    pub elem_type: ElementType,
    pub shape: Vec<i64>,
    pub data: ArrayAttr,
}

impl DenseIntOrFPElementsAttr {
    /// Build a rank-1 tensor, normalizing every input to the kind of the
    /// declared element type.
    pub fn tensor_from_list<T: Into<DenseElement>>(
        values: impl IntoIterator<Item = T>,
        elem_type: impl Into<ElementType>,
    ) -> Self {
        let elem_type = elem_type.into();
        let data: Vec<Attribute> = values
            .into_iter()
            .map(|v| match (v.into(), elem_type) {
                (DenseElement::Int(i), ElementType::Int(_)) => Attribute::Int(IntAttr::new(i)),
                (DenseElement::Float(x), ElementType::Int(_)) => {
                    Attribute::Int(IntAttr::new(x as i64))
                }
                (DenseElement::Int(i), ElementType::Float(ty)) => {
                    Attribute::Float(FloatAttr::new(i as f64, ty))
                }
                (DenseElement::Float(x), ElementType::Float(ty)) => {
                    Attribute::Float(FloatAttr::new(x, ty))
                }
            })
            .collect();
        Self {
            elem_type,
            shape: vec![data.len() as i64],
            data: ArrayAttr::new(data),
        }
    }
}

impl fmt::Display for DenseIntOrFPElementsAttr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("dense<[")?;
        for (i, attr) in self.data.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match attr {
                Attribute::Float(fa) => write!(f, "{}", fa.value)?,
                other => write!(f, "{other}")?,
            }
        }
        f.write_str("]> : tensor<")?;
        for dim in &self.shape {
            write!(f, "{dim}x")?;
        }
        write!(f, "{}>", self.elem_type)
    }
}

// ============================================================================
// Shaped types
// ============================================================================

fn fmt_shape(f: &mut fmt::Formatter<'_>, shape: &[i64], scalable: usize) -> fmt::Result {
    for (i, dim) in shape.iter().enumerate() {
        if i < scalable {
            write!(f, "[{dim}]x")?;
        } else {
            write!(f, "{dim}x")?;
        }
    }
    Ok(())
}

/// A multi-dimensional vector type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct VectorType {
    pub element_type: Box<Attribute>,
    pub shape: Vec<i64>,
    pub num_scalable_dims: usize,
}

impl VectorType {
    pub fn new(element_type: Attribute, shape: Vec<i64>) -> Self {
        Self {
            element_type: Box::new(element_type),
            shape,
            num_scalable_dims: 0,
        }
    }

    /// Build a vector type, validating the scalable-dimension count against
    /// the rank.
    pub fn from_element_type_and_shape(
        element_type: Attribute,
        shape: Vec<i64>,
        num_scalable_dims: i64,
    ) -> Result<Self, VerifyError> {
        if num_scalable_dims < 0 {
            return Err(VerifyError::new(
                "Number of scalable dimensions cannot be negative.",
            ));
        }
        let rank = shape.len();
        if num_scalable_dims as usize > rank {
            return Err(VerifyError::new(format!(
                "Number of scalable dimensions {num_scalable_dims} cannot exceed the vector rank {rank}.",
            )));
        }
        Ok(Self {
            element_type: Box::new(element_type),
            shape,
            num_scalable_dims: num_scalable_dims as usize,
        })
    }

    pub fn get_num_dims(&self) -> usize {
        self.shape.len()
    }

    pub fn get_num_scalable_dims(&self) -> usize {
        self.num_scalable_dims
    }

    pub fn get_shape(&self) -> &[i64] {
        &self.shape
    }
}

impl fmt::Display for VectorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("vector<")?;
        fmt_shape(f, &self.shape, self.num_scalable_dims)?;
        write!(f, "{}>", self.element_type)
    }
}

/// A shaped memory buffer type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MemRefType {
    pub element_type: Box<Attribute>,
    pub shape: Vec<i64>,
}

impl MemRefType {
    pub fn from_element_type_and_shape(element_type: Attribute, shape: Vec<i64>) -> Self {
        Self {
            element_type: Box::new(element_type),
            shape,
        }
    }

    pub fn get_shape(&self) -> &[i64] {
        &self.shape
    }
}

impl fmt::Display for MemRefType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("memref<")?;
        fmt_shape(f, &self.shape, 0)?;
        write!(f, "{}>", self.element_type)
    }
}

/// A stride slot accepted by [`StridedLayoutAttr::new`]: a known stride or an
/// unknown (`None`) one.
#[derive(Clone, Copy, Debug)]
pub enum StrideArg {
    Int(i64),
    None,
}

impl From<i64> for StrideArg {
    fn from(value: i64) -> Self {
        StrideArg::Int(value)
    }
}

impl From<Option<i64>> for StrideArg {
    fn from(value: Option<i64>) -> Self {
        match value {
            Some(v) => StrideArg::Int(v),
            None => StrideArg::None,
        }
    }
}

impl From<IntAttr> for StrideArg {
    fn from(attr: IntAttr) -> Self {
        StrideArg::Int(attr.value)
    }
}

impl StrideArg {
    fn into_attr(self) -> Attribute {
        match self {
            StrideArg::Int(v) => Attribute::Int(IntAttr::new(v)),
            StrideArg::None => Attribute::None,
        }
    }
}

/// A strided memref layout: per-dimension strides plus an offset, any of which
/// may be unknown.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StridedLayoutAttr {
    pub strides: ArrayAttr,
    pub offset: Box<Attribute>,
}

impl StridedLayoutAttr {
    pub fn new<S, O>(strides: impl IntoIterator<Item = S>, offset: O) -> Self
    where
        S: Into<StrideArg>,
        O: Into<StrideArg>,
    {
        Self {
            strides: ArrayAttr::new(
                strides
                    .into_iter()
                    .map(|s| s.into().into_attr())
                    .collect(),
            ),
            offset: Box::new(offset.into().into_attr()),
        }
    }
}

impl fmt::Display for StridedLayoutAttr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("strided<[")?;
        for (i, stride) in self.strides.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match stride {
                Attribute::None => f.write_str("?")?,
                other => write!(f, "{other}")?,
            }
        }
        f.write_str("]")?;
        match self.offset.as_ref() {
            Attribute::None => {}
            offset => write!(f, ", offset: {offset}")?,
        }
        f.write_str(">")
    }
}

/// A complex number type over a scalar element type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ComplexType {
    pub element_type: Box<Attribute>,
}

impl ComplexType {
    pub fn new(element_type: Attribute) -> Self {
        Self {
            element_type: Box::new(element_type),
        }
    }

    /// Build from a generic parameter list; exactly one element type.
    pub fn from_params(params: Vec<Attribute>) -> Result<Self, VerifyError> {
        let mut params = params;
        if params.len() != 1 {
            return Err(VerifyError::new(format!(
                "complex type expects a single type parameter, got {}",
                params.len()
            )));
        }
        Ok(Self::new(params.remove(0)))
    }
}

impl fmt::Display for ComplexType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "complex<{}>", self.element_type)
    }
}

// ============================================================================
// Symbol references
// ============================================================================

/// A reference to a symbol, optionally nested (`@outer::@inner` semantics,
/// dot-joined in `string_value`).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SymbolRefAttr {
    pub root: Symbol,
    pub nested: SmallVec<[Symbol; 4]>,
}

impl SymbolRefAttr {
    pub fn new(root: impl Into<Symbol>) -> Self {
        Self {
            root: root.into(),
            nested: SmallVec::new(),
        }
    }

    pub fn with_nested(
        root: impl Into<Symbol>,
        nested: impl IntoIterator<Item = Symbol>,
    ) -> Self {
        Self {
            root: root.into(),
            nested: nested.into_iter().collect(),
        }
    }

    /// The full reference as a dot-joined string.
    pub fn string_value(&self) -> String {
        let mut out = self.root.to_string();
        for seg in &self.nested {
            out.push('.');
            seg.with_str(|s| out.push_str(s));
        }
        out
    }
}

impl fmt::Display for SymbolRefAttr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.string_value())
    }
}

// ============================================================================
// Attribute
// ============================================================================

/// The closed attribute sum type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Attribute {
    IntegerType(IntegerType),
    FloatType(FloatType),
    Int(IntAttr),
    FloatData(FloatData),
    Float(FloatAttr),
    None,
    String(String),
    Array(ArrayAttr),
    DenseArray(DenseArrayBase),
    DenseElements(DenseIntOrFPElementsAttr),
    Vector(VectorType),
    MemRef(MemRefType),
    StridedLayout(StridedLayoutAttr),
    Complex(ComplexType),
    SymbolRef(SymbolRefAttr),
}

impl Attribute {
    /// Re-check the invariants of composite variants. Constructors already
    /// enforce these, so this only fails on hand-assembled values.
    pub fn verify(&self) -> Result<(), VerifyError> {
        match self {
            Attribute::DenseArray(attr) => attr.verify(),
            Attribute::Array(attrs) => attrs.iter().try_for_each(Attribute::verify),
            Attribute::Vector(v) => v.element_type.verify(),
            Attribute::MemRef(m) => m.element_type.verify(),
            Attribute::Complex(c) => c.element_type.verify(),
            _ => Ok(()),
        }
    }
}

impl From<IntegerType> for Attribute {
    fn from(ty: IntegerType) -> Self {
        Attribute::IntegerType(ty)
    }
}

impl From<FloatType> for Attribute {
    fn from(ty: FloatType) -> Self {
        Attribute::FloatType(ty)
    }
}

impl From<IntAttr> for Attribute {
    fn from(attr: IntAttr) -> Self {
        Attribute::Int(attr)
    }
}

impl From<FloatData> for Attribute {
    fn from(data: FloatData) -> Self {
        Attribute::FloatData(data)
    }
}

impl From<FloatAttr> for Attribute {
    fn from(attr: FloatAttr) -> Self {
        Attribute::Float(attr)
    }
}

impl From<ArrayAttr> for Attribute {
    fn from(attr: ArrayAttr) -> Self {
        Attribute::Array(attr)
    }
}

impl From<Vec<Attribute>> for Attribute {
    fn from(data: Vec<Attribute>) -> Self {
        Attribute::Array(ArrayAttr::new(data))
    }
}

impl From<DenseArrayBase> for Attribute {
    fn from(attr: DenseArrayBase) -> Self {
        Attribute::DenseArray(attr)
    }
}

impl From<DenseIntOrFPElementsAttr> for Attribute {
    fn from(attr: DenseIntOrFPElementsAttr) -> Self {
        Attribute::DenseElements(attr)
    }
}

impl From<VectorType> for Attribute {
    fn from(ty: VectorType) -> Self {
        Attribute::Vector(ty)
    }
}

impl From<MemRefType> for Attribute {
    fn from(ty: MemRefType) -> Self {
        Attribute::MemRef(ty)
    }
}

impl From<StridedLayoutAttr> for Attribute {
    fn from(attr: StridedLayoutAttr) -> Self {
        Attribute::StridedLayout(attr)
    }
}

impl From<ComplexType> for Attribute {
    fn from(ty: ComplexType) -> Self {
        Attribute::Complex(ty)
    }
}

impl From<SymbolRefAttr> for Attribute {
    fn from(attr: SymbolRefAttr) -> Self {
        Attribute::SymbolRef(attr)
    }
}

impl From<&str> for Attribute {
    fn from(value: &str) -> Self {
        Attribute::String(value.to_string())
    }
}

impl From<String> for Attribute {
    fn from(value: String) -> Self {
        Attribute::String(value)
    }
}

fn fmt_escaped_string(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in s.chars() {
        match c {
            '\\' => f.write_str("\\\\")?,
            '"' => f.write_str("\\\"")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            '\r' => f.write_str("\\r")?,
            '\0' => f.write_str("\\0")?,
            c => write!(f, "{c}")?,
        }
    }
    f.write_str("\"")
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attribute::IntegerType(ty) => write!(f, "{ty}"),
            Attribute::FloatType(ty) => write!(f, "{ty}"),
            Attribute::Int(attr) => write!(f, "{attr}"),
            Attribute::FloatData(data) => write!(f, "{data}"),
            Attribute::Float(attr) => write!(f, "{attr}"),
            Attribute::None => f.write_str("none"),
            Attribute::String(s) => fmt_escaped_string(f, s),
            Attribute::Array(attr) => write!(f, "{attr}"),
            Attribute::DenseArray(attr) => write!(f, "{attr}"),
            Attribute::DenseElements(attr) => write!(f, "{attr}"),
            Attribute::Vector(ty) => write!(f, "{ty}"),
            Attribute::MemRef(ty) => write!(f, "{ty}"),
            Attribute::StridedLayout(attr) => write!(f, "{attr}"),
            Attribute::Complex(ty) => write!(f, "{ty}"),
            Attribute::SymbolRef(attr) => write!(f, "{attr}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_type_rendering() {
        assert_eq!(IntegerType::I32.to_string(), "i32");
        assert_eq!(IntegerType::signed(32).to_string(), "si32");
        assert_eq!(IntegerType::unsigned(32).to_string(), "ui32");
        assert_eq!(IntegerType::I1.to_string(), "i1");
    }

    #[test]
    fn float_data_keeps_decimal_point() {
        assert_eq!(FloatData::new(42.0).to_string(), "42.0");
        assert_eq!(FloatData::new(1.5).to_string(), "1.5");
        assert_eq!(FloatData::new(-3.0).to_string(), "-3.0");
    }

    #[test]
    fn array_attr_len_iter_and_equality() {
        let payload: Vec<Attribute> = (0..10).map(|i| Attribute::Int(IntAttr::new(i))).collect();
        let attr = ArrayAttr::new(payload.clone());
        assert_eq!(attr.len(), 10);

        let collected: Vec<Attribute> = attr.iter().cloned().collect();
        assert_eq!(collected, payload);

        assert_eq!(attr, ArrayAttr::new(payload));
    }

    #[test]
    fn dense_array_float_rejects_ints() {
        let data = ArrayAttr::new(vec![
            Attribute::FloatData(FloatData::new(5.5)),
            Attribute::Int(IntAttr::new(2)),
        ]);
        let err = DenseArrayBase::new(FloatType::F32, data).unwrap_err();
        assert_eq!(
            err.to_string(),
            "dense array of float element type should only contain floats"
        );
    }

    #[test]
    fn dense_array_int_rejects_floats() {
        let data = ArrayAttr::new(vec![
            Attribute::Int(IntAttr::new(1)),
            Attribute::FloatData(FloatData::new(2.0)),
        ]);
        let err = DenseArrayBase::new(IntegerType::I32, data).unwrap_err();
        assert_eq!(
            err.to_string(),
            "dense array of integer element type should only contain integers"
        );
    }

    #[test]
    fn dense_array_round_trips() {
        let ints = DenseArrayBase::from_ints(IntegerType::I32, &[1, 2, 3]);
        assert_eq!(ints.as_ints(), Some(vec![1, 2, 3]));
        assert_eq!(ints.as_floats(), None);
        assert_eq!(ints.data().len(), 3);
        assert!(matches!(ints.elem_type(), ElementType::Int(_)));

        let floats = DenseArrayBase::from_floats(FloatType::F32, &[4.0, 5.5]);
        assert_eq!(floats.as_floats(), Some(vec![4.0, 5.5]));
        assert_eq!(floats.as_ints(), None);
    }

    #[test]
    fn tensor_from_list_normalizes_elements() {
        let t = DenseIntOrFPElementsAttr::tensor_from_list([5.5f64, 5.6], FloatType::F32);
        assert_eq!(t.shape, vec![2]);
        assert!(matches!(t.data[0], Attribute::Float(_)));

        let t = DenseIntOrFPElementsAttr::tensor_from_list([5i64, 6], IntegerType::I32);
        assert!(matches!(t.data[0], Attribute::Int(_)));

        let t = DenseIntOrFPElementsAttr::tensor_from_list(
            [IntAttr::new(5), IntAttr::new(6)],
            IntegerType::I32,
        );
        assert_eq!(t.data.len(), 2);
        assert!(matches!(t.data[1], Attribute::Int(IntAttr { value: 6 })));
    }

    #[test]
    fn vector_type_scalable_dims_validation() {
        let err = VectorType::from_element_type_and_shape(
            Attribute::IntegerType(IntegerType::I32),
            vec![1, 2],
            -1,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Number of scalable dimensions cannot be negative."
        );

        let err = VectorType::from_element_type_and_shape(
            Attribute::IntegerType(IntegerType::I32),
            vec![1, 2],
            3,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Number of scalable dimensions 3 cannot exceed the vector rank 2."
        );

        let v = VectorType::from_element_type_and_shape(
            Attribute::IntegerType(IntegerType::I32),
            vec![1, 2],
            1,
        )
        .unwrap();
        assert_eq!(v.get_num_dims(), 2);
        assert_eq!(v.get_num_scalable_dims(), 1);
        assert_eq!(v.get_shape(), &[1, 2]);
    }

    #[test]
    fn shaped_type_rendering() {
        let v = VectorType::new(Attribute::IntegerType(IntegerType::I32), vec![1, 2]);
        assert_eq!(v.to_string(), "vector<1x2xi32>");

        let v = VectorType::from_element_type_and_shape(
            Attribute::FloatType(FloatType::F32),
            vec![4, 4],
            1,
        )
        .unwrap();
        assert_eq!(v.to_string(), "vector<[4]x4xf32>");

        let m = MemRefType::from_element_type_and_shape(
            Attribute::IntegerType(IntegerType::I32),
            vec![1, 2],
        );
        assert_eq!(m.to_string(), "memref<1x2xi32>");
    }

    #[test]
    fn strided_layout_rendering() {
        let attr = StridedLayoutAttr::new([2i64], 2i64);
        assert_eq!(attr.to_string(), "strided<[2], offset: 2>");

        let attr = StridedLayoutAttr::new([Some(2i64), None], None);
        assert_eq!(attr.to_string(), "strided<[2, ?]>");
    }

    #[test]
    fn strided_layout_normalizes_slots() {
        let attr = StridedLayoutAttr::new([2i64], None);
        assert_eq!(attr.strides[0], Attribute::Int(IntAttr::new(2)));
        assert_eq!(*attr.offset, Attribute::None);

        let attr = StridedLayoutAttr::new([None], 2i64);
        assert_eq!(attr.strides[0], Attribute::None);
        assert_eq!(*attr.offset, Attribute::Int(IntAttr::new(2)));

        // Pre-wrapped slots are equivalent to raw ones.
        assert_eq!(
            StridedLayoutAttr::new([IntAttr::new(2)], StrideArg::None),
            StridedLayoutAttr::new([2i64], None)
        );
    }

    #[test]
    fn complex_from_params() {
        let c = ComplexType::from_params(vec![Attribute::FloatType(FloatType::F32)]).unwrap();
        assert_eq!(c.to_string(), "complex<f32>");

        assert!(ComplexType::from_params(vec![]).is_err());
    }

    #[test]
    fn symbol_ref_string_value() {
        let attr = SymbolRefAttr::new("root");
        assert_eq!(attr.string_value(), "root");
        assert_eq!(attr.to_string(), "@root");

        let attr =
            SymbolRefAttr::with_nested("root", [Symbol::new("a"), Symbol::new("b")]);
        assert_eq!(attr.string_value(), "root.a.b");
    }

    #[test]
    fn string_attr_escapes() {
        let attr = Attribute::from("a\"b\nc");
        assert_eq!(attr.to_string(), "\"a\\\"b\\nc\"");
    }

    #[test]
    fn structural_equality() {
        let a = Attribute::Vector(VectorType::new(
            Attribute::IntegerType(IntegerType::I32),
            vec![2],
        ));
        let b = Attribute::Vector(VectorType::new(
            Attribute::IntegerType(IntegerType::I32),
            vec![2],
        ));
        let c = Attribute::MemRef(MemRefType::from_element_type_and_shape(
            Attribute::IntegerType(IntegerType::I32),
            vec![2],
        ));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
