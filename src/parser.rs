//! Backtracking parser for the generic textual operation format.
//!
//! ```text
//! operation  := (result-list '=')? string-lit '(' operand-list? ')'
//!               region-list? attr-dict? ':' function-type
//! region-list := '(' region (',' region)* ')'
//! region     := '{' operation* '}'
//! attr-dict  := '{' (ident '=' attr-value),* '}'
//! ```
//!
//! Every alternative is tried under a checkpoint: on failure the token
//! position is restored and the failure is recorded into the [`History`]
//! arena, with nested causes re-parented under the enclosing failed attempt.
//! The failure finally reported is the deepest one, which in practice is the
//! most specific.

use std::collections::HashMap;

use smallvec::SmallVec;

use crate::attrs::{
    Attribute, ComplexType, FloatData, FloatType, IntAttr, IntegerType, MemRefType, SymbolRefAttr,
    VectorType,
};
use crate::context::{Attrs, IrContext, OpRef, OperationData, RegionRef, ValueRef};
use crate::error::{ParseError, ParseFailure};
use crate::history::{History, HistoryId};
use crate::lexer::{Token, TokenKind, decode_string_literal, tokenize};
use crate::location::{SourceText, Span};
use crate::registry::ParseContext;
use crate::symbol::Symbol;

/// Parse a single top-level operation. Trailing input is an error.
///
/// On failure, the returned [`ParseFailure`] carries the selected diagnostic
/// plus the complete failure history.
pub fn parse_operation(
    ctx: &ParseContext,
    ir: &mut IrContext,
    source: &SourceText,
) -> Result<OpRef, ParseFailure> {
    let mut history = History::new();
    let tokens = match tokenize(source) {
        Ok(tokens) => tokens,
        Err(error) => {
            history.record(error.clone(), "tokenize");
            return Err(ParseFailure { error, history });
        }
    };

    let mut parser = Parser {
        ctx,
        ir,
        source,
        tokens,
        pos: 0,
        history,
        pending: Vec::new(),
        values: HashMap::new(),
    };

    let result = parser
        .backtracking("operation", Parser::parse_operation_inner)
        .and_then(|op| {
            if parser.cur().kind == TokenKind::Eof {
                Ok(op)
            } else {
                let error = parser.err_here("trailing input after top-level operation");
                parser.history.record(error.clone(), "toplevel");
                Err(error)
            }
        });

    match result {
        Ok(op) => Ok(op),
        Err(error) => {
            // Report the deepest failure; all attempts stay in the history.
            let selected = parser
                .history
                .deepest()
                .map(|node| node.error.clone())
                .unwrap_or(error);
            Err(ParseFailure {
                error: selected,
                history: parser.history,
            })
        }
    }
}

struct Parser<'a> {
    ctx: &'a ParseContext,
    ir: &'a mut IrContext,
    source: &'a SourceText,
    tokens: Vec<Token>,
    pos: usize,
    history: History,
    /// Failures recorded since the enclosing checkpoint, awaiting a parent.
    pending: Vec<HistoryId>,
    /// Visible SSA definitions. Saved and restored around regions.
    values: HashMap<String, ValueRef>,
}

impl<'a> Parser<'a> {
    // ========================================================================
    // Token plumbing
    // ========================================================================

    fn cur(&self) -> Token {
        self.tokens[self.pos]
    }

    fn bump(&mut self) -> Token {
        let token = self.tokens[self.pos];
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.cur().kind == kind
    }

    fn text(&self, token: Token) -> &'a str {
        token.text(self.source)
    }

    fn err_at(&self, span: Span, message: impl Into<String>) -> ParseError {
        ParseError::new(span, message)
    }

    fn err_here(&self, message: impl Into<String>) -> ParseError {
        self.err_at(self.cur().span, message)
    }

    fn expect(&mut self, kind: TokenKind, message: &str) -> Result<Token, ParseError> {
        if self.at(kind) {
            Ok(self.bump())
        } else {
            Err(self.err_here(message))
        }
    }

    // ========================================================================
    // Checkpoints
    // ========================================================================

    /// Run a production under a checkpoint. On failure the token position is
    /// restored, the failure is recorded, and failures recorded inside the
    /// attempt become its children.
    fn backtracking<T>(
        &mut self,
        production: &'static str,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        let saved_pos = self.pos;
        let pending_start = self.pending.len();
        match f(self) {
            Ok(value) => Ok(value),
            Err(error) => {
                let children: SmallVec<[HistoryId; 4]> =
                    self.pending.drain(pending_start..).collect();
                let id = self.history.record(error.clone(), production);
                for child in children {
                    self.history.set_parent(child, id);
                }
                self.pending.push(id);
                self.pos = saved_pos;
                Err(error)
            }
        }
    }

    // ========================================================================
    // Operations
    // ========================================================================

    fn parse_operation_inner(&mut self) -> Result<OpRef, ParseError> {
        let start = self.cur().span;

        let results = if self.at(TokenKind::Percent) {
            self.parse_value_id_list()?
        } else {
            Vec::new()
        };
        if !results.is_empty() {
            if !self.at(TokenKind::Equal) {
                return Err(
                    self.err_here("Operation definitions expect an `=` after op-result-list!")
                );
            }
            self.bump();
        }

        if !self.at(TokenKind::Str) {
            return Err(self.err_here("Expected an operation name here"));
        }
        let name_token = self.bump();
        let name = decode_string_literal(self.text(name_token));

        self.expect(TokenKind::LParen, "expected `(` before the operand list")?;
        let mut operands: SmallVec<[ValueRef; 2]> = SmallVec::new();
        if self.at(TokenKind::Percent) {
            for (operand_name, span) in self.parse_value_id_list()? {
                let Some(&value) = self.values.get(&operand_name) else {
                    return Err(
                        self.err_at(span, format!("SSA value %{operand_name} is not defined"))
                    );
                };
                operands.push(value);
            }
        }
        self.expect(TokenKind::RParen, "expected `)` after the operand list")?;

        let mut regions: SmallVec<[RegionRef; 1]> = SmallVec::new();
        if self.at(TokenKind::LParen) {
            if let Ok(parsed) = self.backtracking("region-list", Self::parse_region_list) {
                regions = parsed;
            }
        }

        let attributes = if self.at(TokenKind::LBrace) {
            self.parse_attr_dict()?
        } else {
            Attrs::new()
        };

        self.expect(TokenKind::Colon, "expected `:` before the operation's type")?;
        let (input_types, result_types) = self.parse_function_type()?;

        let end = self.tokens[self.pos.saturating_sub(1)].span.end;
        let span = Span::new(start.start, end);

        if operands.len() != input_types.len() {
            return Err(self.err_at(
                span,
                format!(
                    "operation has {} operands but its type lists {} inputs",
                    operands.len(),
                    input_types.len()
                ),
            ));
        }
        for (i, (&operand, expected)) in operands.iter().zip(&input_types).enumerate() {
            let actual = &self.ir.value(operand).ty;
            if actual != expected {
                return Err(self.err_at(
                    span,
                    format!("operand #{i} has type {actual}, but the signature expects {expected}"),
                ));
            }
        }
        if !results.is_empty() && results.len() != result_types.len() {
            return Err(self.err_at(
                span,
                format!(
                    "operation defines {} results but its type lists {} result types",
                    results.len(),
                    result_types.len()
                ),
            ));
        }

        let mnemonic = Symbol::from_dynamic(&name);
        let def = self.ctx.get_op(mnemonic);
        if def.is_none() && !self.ctx.allow_unregistered {
            return Err(self.err_at(
                name_token.span,
                format!("unregistered operation '{name}'"),
            ));
        }
        let def = def.cloned();

        let op = self.ir.create_op(OperationData {
            span,
            name: mnemonic,
            operands,
            result_types: result_types.into_iter().collect(),
            results: SmallVec::new(),
            attributes,
            regions,
        });

        if let Some(def) = def {
            def.verify(self.ir, op)
                .map_err(|err| self.err_at(span, err.message))?;
        }

        for (i, (result_name, result_span)) in results.into_iter().enumerate() {
            if self.values.contains_key(&result_name) {
                return Err(self.err_at(
                    result_span,
                    format!("SSA value %{result_name} is already defined"),
                ));
            }
            self.values.insert(result_name, self.ir.op_result(op, i));
        }

        Ok(op)
    }

    /// `%name (',' %name)*`, returning each name with the span of its `%`.
    fn parse_value_id_list(&mut self) -> Result<Vec<(String, Span)>, ParseError> {
        let mut ids = Vec::new();
        loop {
            ids.push(self.parse_value_id()?);
            if self.at(TokenKind::Comma) && self.tokens[self.pos + 1].kind == TokenKind::Percent {
                self.bump();
            } else {
                break;
            }
        }
        Ok(ids)
    }

    fn parse_value_id(&mut self) -> Result<(String, Span), ParseError> {
        let percent = self.expect(TokenKind::Percent, "expected `%` before a value name")?;
        let name = self.cur();
        let adjacent = name.span.start == percent.span.end;
        if !adjacent || !matches!(name.kind, TokenKind::Ident | TokenKind::Integer) {
            return Err(self.err_at(percent.span, "expected a value name after `%`"));
        }
        self.bump();
        Ok((self.text(name).to_owned(), percent.span))
    }

    // ========================================================================
    // Regions
    // ========================================================================

    fn parse_region_list(&mut self) -> Result<SmallVec<[RegionRef; 1]>, ParseError> {
        self.expect(TokenKind::LParen, "expected `(` before the region list")?;
        let mut regions = SmallVec::new();
        regions.push(self.parse_region()?);
        while self.at(TokenKind::Comma) {
            self.bump();
            regions.push(self.parse_region()?);
        }
        self.expect(TokenKind::RParen, "expected `)` after the region list")?;
        Ok(regions)
    }

    fn parse_region(&mut self) -> Result<RegionRef, ParseError> {
        // Definitions inside a region go out of scope at its `}`.
        let saved = self.values.clone();
        let result = self.parse_region_body();
        self.values = saved;
        result
    }

    fn parse_region_body(&mut self) -> Result<RegionRef, ParseError> {
        let open = self.expect(TokenKind::LBrace, "expected `{` to start a region")?;
        let mut ops: SmallVec<[OpRef; 4]> = SmallVec::new();
        while !self.at(TokenKind::RBrace) && !self.at(TokenKind::Eof) {
            match self.backtracking("operation", Self::parse_operation_inner) {
                Ok(op) => ops.push(op),
                Err(_) => break,
            }
        }
        let close = self.expect(TokenKind::RBrace, "expected `}` to end the region")?;

        let region = self
            .ir
            .create_region(Span::new(open.span.start, close.span.end));
        for op in ops {
            self.ir.push_op(region, op);
        }
        Ok(region)
    }

    // ========================================================================
    // Attribute dictionaries and values
    // ========================================================================

    fn parse_attr_dict(&mut self) -> Result<Attrs, ParseError> {
        self.expect(TokenKind::LBrace, "expected `{` to start an attribute dictionary")?;
        let mut attrs = Attrs::new();
        if !self.at(TokenKind::RBrace) {
            loop {
                let key = self.expect(TokenKind::Ident, "expected an attribute name")?;
                self.expect(TokenKind::Equal, "expected `=` after the attribute name")?;
                let value = self.parse_attr_value()?;
                attrs.insert(Symbol::from_dynamic(self.text(key)), value);
                if self.at(TokenKind::Comma) {
                    self.bump();
                } else {
                    break;
                }
            }
        }
        self.expect(TokenKind::RBrace, "expected `}` to end the attribute dictionary")?;
        Ok(attrs)
    }

    fn parse_attr_value(&mut self) -> Result<Attribute, ParseError> {
        match self.cur().kind {
            TokenKind::Str => {
                let token = self.bump();
                Ok(Attribute::String(decode_string_literal(self.text(token))))
            }
            TokenKind::Float => {
                let token = self.bump();
                let value: f64 = self
                    .text(token)
                    .parse()
                    .map_err(|_| self.err_at(token.span, "invalid float literal"))?;
                Ok(Attribute::FloatData(FloatData::new(value)))
            }
            TokenKind::Integer => {
                let token = self.bump();
                Ok(Attribute::Int(IntAttr::new(self.int_value(token)?)))
            }
            TokenKind::LBracket => {
                self.bump();
                let mut items = Vec::new();
                if !self.at(TokenKind::RBracket) {
                    loop {
                        items.push(self.parse_attr_value()?);
                        if self.at(TokenKind::Comma) {
                            self.bump();
                        } else {
                            break;
                        }
                    }
                }
                self.expect(TokenKind::RBracket, "expected `]` to end an array attribute")?;
                Ok(Attribute::from(items))
            }
            TokenKind::At => {
                self.bump();
                let root = self.expect(TokenKind::Ident, "expected a symbol name after `@`")?;
                let mut attr = SymbolRefAttr::new(Symbol::from_dynamic(self.text(root)));
                while self.at(TokenKind::Colon)
                    && self.tokens[self.pos + 1].kind == TokenKind::Colon
                {
                    self.bump();
                    self.bump();
                    let seg = self.expect(TokenKind::Ident, "expected a nested symbol name")?;
                    attr.nested.push(Symbol::from_dynamic(self.text(seg)));
                }
                Ok(Attribute::SymbolRef(attr))
            }
            TokenKind::Ident | TokenKind::Bang => {
                // Type attributes are the fallback alternative.
                self.backtracking("type-attr", Self::parse_type)
            }
            _ => Err(self.err_here("expected an attribute value")),
        }
    }

    // ========================================================================
    // Types
    // ========================================================================

    /// `'!'? builtin-type`
    fn parse_type(&mut self) -> Result<Attribute, ParseError> {
        if self.at(TokenKind::Bang) {
            self.bump();
        }
        let token = self.expect(TokenKind::Ident, "expected a type")?;
        let text = self.text(token);
        match text {
            "vector" => {
                self.expect(TokenKind::Less, "expected `<` after `vector`")?;
                let (shape, scalable, elem) = self.parse_shape_and_elem()?;
                self.expect(TokenKind::Greater, "expected `>` to close the vector type")?;
                let vector = VectorType::from_element_type_and_shape(elem, shape, scalable)
                    .map_err(|err| self.err_at(token.span, err.message))?;
                Ok(Attribute::Vector(vector))
            }
            "memref" => {
                self.expect(TokenKind::Less, "expected `<` after `memref`")?;
                let (shape, scalable, elem) = self.parse_shape_and_elem()?;
                if scalable != 0 {
                    return Err(self.err_at(token.span, "memref shapes cannot be scalable"));
                }
                self.expect(TokenKind::Greater, "expected `>` to close the memref type")?;
                Ok(Attribute::MemRef(MemRefType::from_element_type_and_shape(
                    elem, shape,
                )))
            }
            "complex" => {
                self.expect(TokenKind::Less, "expected `<` after `complex`")?;
                let elem = self.parse_type()?;
                self.expect(TokenKind::Greater, "expected `>` to close the complex type")?;
                Ok(Attribute::Complex(ComplexType::new(elem)))
            }
            "none" => Ok(Attribute::None),
            _ => scalar_type_from_name(text, token.span),
        }
    }

    /// The body of a shaped type: dimensions joined by `x`, then the element
    /// type. Leading dimensions may be bracketed (scalable).
    ///
    /// `x` is not a token separator, so `1x2xi32` lexes as an integer followed
    /// by the identifier `x2xi32`, which is split here.
    fn parse_shape_and_elem(&mut self) -> Result<(Vec<i64>, i64, Attribute), ParseError> {
        let mut shape = Vec::new();
        let mut scalable: i64 = 0;
        // After a dimension, only an `x` separator may follow; the element
        // type is reachable once `x`-joined (or at the very start).
        let mut joined = true;
        loop {
            match self.cur().kind {
                TokenKind::LBracket => {
                    if !joined {
                        return Err(self.err_here("expected `x` between dimensions"));
                    }
                    self.bump();
                    let dim = self.expect(TokenKind::Integer, "expected a vector dimension")?;
                    shape.push(self.int_value(dim)?);
                    scalable += 1;
                    self.expect(TokenKind::RBracket, "expected `]` after a scalable dimension")?;
                    joined = false;
                }
                TokenKind::Integer => {
                    let dim = self.bump();
                    shape.push(self.int_value(dim)?);
                    joined = false;
                }
                TokenKind::Ident => {
                    let token = self.cur();
                    let text = self.text(token);
                    if !joined && text.starts_with('x') {
                        self.bump();
                        if let Some(elem_name) =
                            split_shape_suffix(text, token.span, &mut shape)?
                        {
                            let elem = scalar_type_from_name(elem_name, token.span)?;
                            return Ok((shape, scalable, elem));
                        }
                        // Suffix ended on `x`; the shape continues.
                        joined = true;
                    } else if joined {
                        let elem = self.parse_type()?;
                        return Ok((shape, scalable, elem));
                    } else {
                        return Err(self.err_here("expected `x` between dimensions"));
                    }
                }
                TokenKind::Bang => {
                    if !joined {
                        return Err(self.err_here("expected `x` between dimensions"));
                    }
                    let elem = self.parse_type()?;
                    return Ok((shape, scalable, elem));
                }
                _ => return Err(self.err_here("expected a shaped type body")),
            }
        }
    }

    // ========================================================================
    // Function types
    // ========================================================================

    /// `'(' type-list? ')' '->' (type | '(' type-list? ')')`
    fn parse_function_type(&mut self) -> Result<(Vec<Attribute>, Vec<Attribute>), ParseError> {
        self.expect(TokenKind::LParen, "expected `(` to start the input types")?;
        let inputs = self.parse_type_list()?;
        self.expect(TokenKind::RParen, "expected `)` after the input types")?;
        self.expect(TokenKind::Arrow, "expected `->` in the function type")?;

        let results = if self.at(TokenKind::LParen) {
            self.bump();
            let results = self.parse_type_list()?;
            self.expect(TokenKind::RParen, "expected `)` after the result types")?;
            results
        } else {
            vec![self.parse_type()?]
        };
        Ok((inputs, results))
    }

    fn parse_type_list(&mut self) -> Result<Vec<Attribute>, ParseError> {
        let mut types = Vec::new();
        if self.at(TokenKind::RParen) {
            return Ok(types);
        }
        loop {
            types.push(self.parse_type()?);
            if self.at(TokenKind::Comma) {
                self.bump();
            } else {
                break;
            }
        }
        Ok(types)
    }

    fn int_value(&self, token: Token) -> Result<i64, ParseError> {
        self.text(token)
            .parse()
            .map_err(|_| self.err_at(token.span, "integer literal out of range"))
    }
}

/// Split the tail of an `x`-joined shape (`"x2xi32"` after the dimension `1`
/// of `1x2xi32`). Dimensions are appended to `shape`; the return value is the
/// trailing element-type name, or `None` when the suffix ends on `x` and the
/// shape continues in the next token.
fn split_shape_suffix<'t>(
    mut text: &'t str,
    span: Span,
    shape: &mut Vec<i64>,
) -> Result<Option<&'t str>, ParseError> {
    loop {
        let Some(rest) = text.strip_prefix('x') else {
            return Err(ParseError::new(span, "expected `x` between dimensions"));
        };
        if rest.is_empty() {
            return Ok(None);
        }
        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            return Ok(Some(rest));
        }
        let (dim, tail) = rest.split_at(digits);
        let dim: i64 = dim
            .parse()
            .map_err(|_| ParseError::new(span, "dimension out of range"))?;
        shape.push(dim);
        if tail.is_empty() {
            return Ok(None);
        }
        text = tail;
    }
}

fn scalar_type_from_name(name: &str, span: Span) -> Result<Attribute, ParseError> {
    let int_type = |prefix: &str, make: fn(u32) -> IntegerType| {
        name.strip_prefix(prefix)
            .filter(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|rest| rest.parse().ok())
            .map(make)
    };

    match name {
        "f16" => return Ok(Attribute::FloatType(FloatType::F16)),
        "bf16" => return Ok(Attribute::FloatType(FloatType::BF16)),
        "f32" => return Ok(Attribute::FloatType(FloatType::F32)),
        "f64" => return Ok(Attribute::FloatType(FloatType::F64)),
        "none" => return Ok(Attribute::None),
        _ => {}
    }
    if let Some(ty) = int_type("si", IntegerType::signed) {
        return Ok(Attribute::IntegerType(ty));
    }
    if let Some(ty) = int_type("ui", IntegerType::unsigned) {
        return Ok(Attribute::IntegerType(ty));
    }
    if let Some(ty) = int_type("i", IntegerType::new) {
        return Ok(Attribute::IntegerType(ty));
    }
    Err(ParseError::new(span, format!("unknown type `{name}`")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::AnyAttr;
    use crate::registry::OpDef;
    use std::sync::Arc;

    fn unknown_op_context() -> ParseContext {
        let mut ctx = ParseContext::default();
        ctx.register_op(
            OpDef::new("unknown")
                .variadic_operands(Arc::new(AnyAttr))
                .variadic_results(Arc::new(AnyAttr)),
        );
        ctx
    }

    fn check_error(prog: &str, line: u32, column: u32, message: &str) {
        let ctx = unknown_op_context();
        let mut ir = IrContext::new();
        let source = SourceText::new(prog);
        let failure = parse_operation(&ctx, &mut ir, &source).unwrap_err();

        let node = failure
            .history
            .iterate()
            .find(|node| node.error.message.contains(message))
            .unwrap_or_else(|| panic!("'{message}' not found in any recorded failure"));
        assert_eq!(source.line_col(node.error.span.start), (line, column));
    }

    #[test]
    fn missing_equal_after_result_list() {
        let prog = "\n\"unknown\"() ({\n  %0 \"unknown\"() : () -> !i32\n}) : () -> ()\n";
        check_error(
            prog,
            3,
            5,
            "Operation definitions expect an `=` after op-result-list!",
        );
    }

    #[test]
    fn redefined_value() {
        let prog = "\n\"unknown\"() ({\n  %val = \"unknown\"() : () -> i32\n  %val = \"unknown\"() : () -> i32\n}) : () -> ()\n";
        check_error(prog, 4, 2, "SSA value %val is already defined");
    }

    #[test]
    fn missing_operation_name() {
        let prog = "\n\"unknown\"() ({\n  %val =\n}) : () -> ()\n";
        check_error(prog, 4, 0, "Expected an operation name here");
    }

    #[test]
    fn selected_diagnostic_is_deepest() {
        let prog = "\n\"unknown\"() ({\n  %0 \"unknown\"() : () -> !i32\n}) : () -> ()\n";
        let ctx = unknown_op_context();
        let mut ir = IrContext::new();
        let source = SourceText::new(prog);
        let failure = parse_operation(&ctx, &mut ir, &source).unwrap_err();

        assert_eq!(
            failure.error.message,
            "Operation definitions expect an `=` after op-result-list!"
        );
        let deepest = failure.history.deepest().unwrap();
        assert_eq!(deepest.error, failure.error);
    }

    #[test]
    fn parses_nested_operations() {
        let prog = "\"unknown\"() ({\n  %0 = \"unknown\"() : () -> i32\n  %1 = \"unknown\"(%0) : (i32) -> i64\n}) : () -> ()";
        let ctx = unknown_op_context();
        let mut ir = IrContext::new();
        let source = SourceText::new(prog);
        let op = parse_operation(&ctx, &mut ir, &source).unwrap();

        let data = ir.op(op);
        assert_eq!(data.name, "unknown");
        assert_eq!(data.regions.len(), 1);
        let region = ir.region(data.regions[0]);
        assert_eq!(region.ops.len(), 2);
        assert_eq!(region.parent_op, Some(op));

        let second = ir.op(region.ops[1]);
        assert_eq!(second.operands.len(), 1);
        assert_eq!(
            ir.value(second.operands[0]).ty,
            Attribute::IntegerType(IntegerType::I32)
        );
    }

    #[test]
    fn sibling_regions_may_reuse_names() {
        let prog = "\"unknown\"() ({\n  %0 = \"unknown\"() : () -> i32\n}, {\n  %0 = \"unknown\"() : () -> i32\n}) : () -> ()";
        let ctx = unknown_op_context();
        let mut ir = IrContext::new();
        let source = SourceText::new(prog);
        let op = parse_operation(&ctx, &mut ir, &source).unwrap();
        assert_eq!(ir.op(op).regions.len(), 2);
    }

    #[test]
    fn undefined_operand_rejected() {
        let prog = "\"unknown\"(%missing) : (i32) -> ()";
        let ctx = unknown_op_context();
        let mut ir = IrContext::new();
        let source = SourceText::new(prog);
        let failure = parse_operation(&ctx, &mut ir, &source).unwrap_err();
        assert!(
            failure
                .history
                .iterate()
                .any(|n| n.error.message == "SSA value %missing is not defined")
        );
    }

    #[test]
    fn unregistered_operation_rejected() {
        let prog = "\"nope\"() : () -> ()";
        let ctx = unknown_op_context();
        let mut ir = IrContext::new();
        let source = SourceText::new(prog);
        let failure = parse_operation(&ctx, &mut ir, &source).unwrap_err();
        assert_eq!(failure.error.message, "unregistered operation 'nope'");

        let mut ir = IrContext::new();
        assert!(parse_operation(&ParseContext::permissive(), &mut ir, &source).is_ok());
    }

    #[test]
    fn constraint_violation_becomes_parse_error() {
        use crate::constraints::EqAttrConstraint;
        let mut ctx = ParseContext::default();
        ctx.register_op(OpDef::new("only.i32").variadic_results(Arc::new(
            EqAttrConstraint::new(IntegerType::I32),
        )));

        let prog = "%0 = \"only.i32\"() : () -> i64";
        let mut ir = IrContext::new();
        let source = SourceText::new(prog);
        let failure = parse_operation(&ctx, &mut ir, &source).unwrap_err();
        assert_eq!(
            failure.error.message,
            "result #0 of 'only.i32': Expected attribute i32, got i64."
        );
    }

    #[test]
    fn attr_dict_and_shaped_types() {
        let prog = "\"unknown\"() {value = 42, name = \"x\", ty = vector<1x2xi32>, items = [1, 2.5]} : () -> memref<4xf32>";
        let ctx = unknown_op_context();
        let mut ir = IrContext::new();
        let source = SourceText::new(prog);
        let op = parse_operation(&ctx, &mut ir, &source).unwrap();

        let data = ir.op(op);
        assert_eq!(
            data.attributes.get(&Symbol::new("value")),
            Some(&Attribute::Int(IntAttr::new(42)))
        );
        assert_eq!(
            data.attributes.get(&Symbol::new("ty")).map(|a| a.to_string()),
            Some("vector<1x2xi32>".to_owned())
        );
        assert_eq!(data.result_types[0].to_string(), "memref<4xf32>");
    }

    #[test]
    fn trailing_input_rejected() {
        let prog = "\"unknown\"() : () -> () extra";
        let ctx = unknown_op_context();
        let mut ir = IrContext::new();
        let source = SourceText::new(prog);
        let failure = parse_operation(&ctx, &mut ir, &source).unwrap_err();
        assert!(
            failure
                .history
                .iterate()
                .any(|n| n.error.message == "trailing input after top-level operation")
        );
    }

    #[test]
    fn operand_type_mismatch_rejected() {
        let prog = "\"unknown\"() ({\n  %0 = \"unknown\"() : () -> i32\n  \"unknown\"(%0) : (i64) -> ()\n}) : () -> ()";
        let ctx = unknown_op_context();
        let mut ir = IrContext::new();
        let source = SourceText::new(prog);
        let failure = parse_operation(&ctx, &mut ir, &source).unwrap_err();
        assert!(failure.history.iterate().any(|n| {
            n.error.message == "operand #0 has type i32, but the signature expects i64"
        }));
    }

    #[test]
    fn shape_dimensions_must_be_x_joined() {
        let prog = "\"unknown\"() : () -> vector<2 i32>";
        let ctx = unknown_op_context();
        let mut ir = IrContext::new();
        let source = SourceText::new(prog);
        let failure = parse_operation(&ctx, &mut ir, &source).unwrap_err();
        assert!(
            failure
                .history
                .iterate()
                .any(|n| n.error.message == "expected `x` between dimensions")
        );
    }

    #[test]
    fn scalable_vector_type_parses() {
        let prog = "\"unknown\"() : () -> vector<[4]x4xf32>";
        let ctx = unknown_op_context();
        let mut ir = IrContext::new();
        let source = SourceText::new(prog);
        let op = parse_operation(&ctx, &mut ir, &source).unwrap();
        assert_eq!(ir.op(op).result_types[0].to_string(), "vector<[4]x4xf32>");
    }

    mod proptest_fuzz {
        use super::*;
        use proptest::prelude::*;

        /// Valid texts used as the seed corpus for mutation.
        fn seed_corpus() -> Vec<&'static str> {
            vec![
                "\"unknown\"() : () -> ()",
                concat!(
                    "\"unknown\"() ({\n",
                    "  %0 = \"unknown\"() : () -> i32\n",
                    "  %1 = \"unknown\"(%0) : (i32) -> i64\n",
                    "}) : () -> ()",
                ),
                "\"unknown\"() {a = 1, b = \"s\", c = vector<2xf32>} : () -> memref<1x2xi32>",
                "%a, %b = \"unknown\"() : () -> (i32, complex<f64>)",
            ]
        }

        fn mutated_input() -> impl Strategy<Value = String> {
            let seeds = seed_corpus();
            let n = seeds.len();
            (0..n, 0..1000usize, 0..5u8, proptest::num::u8::ANY).prop_map(
                move |(seed_idx, pos_raw, mutation_kind, random_byte)| {
                    let mut bytes = seeds[seed_idx].as_bytes().to_vec();
                    if bytes.is_empty() {
                        return String::new();
                    }
                    let pos = pos_raw % bytes.len();
                    match mutation_kind {
                        0 => bytes[pos] = random_byte,
                        1 => {
                            bytes.remove(pos);
                        }
                        2 => bytes.insert(pos, random_byte),
                        3 => {
                            let end = (pos + 8).min(bytes.len());
                            bytes.drain(pos..end);
                        }
                        _ => {
                            let end = (pos + 8).min(bytes.len());
                            let chunk: Vec<u8> = bytes[pos..end].to_vec();
                            bytes.splice(pos..pos, chunk);
                        }
                    }
                    String::from_utf8(bytes).unwrap_or_default()
                },
            )
        }

        fn try_parse(input: &str) {
            let ctx = unknown_op_context();
            let mut ir = IrContext::new();
            let source = SourceText::new(input);
            let _ = parse_operation(&ctx, &mut ir, &source);
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(2000))]

            /// Parser must never panic on arbitrary mutated input.
            #[test]
            fn parser_never_panics(input in mutated_input()) {
                try_parse(&input);
            }
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(500))]

            /// Completely random strings must not panic the parser.
            #[test]
            fn parser_handles_random_strings(input in "\\PC{0,200}") {
                try_parse(&input);
            }
        }
    }
}
