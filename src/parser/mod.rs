//! Pratt top-down operator-precedence parser, extended with
//! indentation-sensitive FLASH blocks (spec §4.2).

pub mod error;
pub mod precedence;

pub use error::{ParseError, ParseResult};

use crate::ast::{
    BinaryOperator, ExpressionNode, FlashBlock, FlashRule, Lambda, Transform, UnaryOperator,
};
use crate::diagnostics::{Diagnostic, ErrorCode, Position};
use crate::lexer::{Lexer, Token, TokenKind};
use precedence::{infix_binding_power, prefix_binding_power};

/// Parses `source` into an AST. Returns the root node plus any errors
/// collected when `recover` is true (always empty when `recover` is
/// false, since the first error short-circuits with `Err`).
pub fn parse(source: &str, recover: bool) -> ParseResult<(ExpressionNode, Vec<Diagnostic>)> {
    let mut parser = Parser::new(source, recover);
    let root = parser.parse_top_level()?;
    Ok((root, parser.errors))
}

struct Parser<'a> {
    lexer: Lexer<'a>,
    recover: bool,
    errors: Vec<Diagnostic>,
    /// Stack of indent levels for nested flash-rule subrule blocks.
    indent_stack: Vec<u32>,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str, recover: bool) -> Self {
        Self { lexer: Lexer::new(source), recover, errors: Vec::new(), indent_stack: Vec::new() }
    }

    fn peek(&mut self) -> ParseResult<Token> {
        self.lexer.peek().cloned().map_err(ParseError::from_lex)
    }

    fn bump(&mut self) -> ParseResult<Token> {
        self.lexer.next().map_err(ParseError::from_lex)
    }

    fn expect_operator(&mut self, op: &'static str) -> ParseResult<Token> {
        let tok = self.bump()?;
        match &tok.kind {
            TokenKind::Operator(o) if *o == op => Ok(tok),
            _ => Err(ParseError::new(
                ErrorCode::S0207,
                tok.position,
                &[("token", tok.kind.describe())],
            )),
        }
    }

    fn at_operator(&mut self, op: &str) -> bool {
        matches!(self.peek(), Ok(Token { kind: TokenKind::Operator(o), .. }) if o == op)
    }

    fn at_eof(&mut self) -> bool {
        matches!(self.peek(), Ok(Token { kind: TokenKind::Eof, .. }))
    }

    /// Record or propagate an error, depending on `recover`.
    fn fail_or_collect(&mut self, err: ParseError) -> ParseResult<ExpressionNode> {
        if self.recover {
            let position = err.0.position;
            let code = err.0.code.clone();
            self.errors.push(err.0);
            Ok(ExpressionNode::AstError { code, remaining: Vec::new(), position })
        } else {
            Err(err)
        }
    }

    fn parse_top_level(&mut self) -> ParseResult<ExpressionNode> {
        let expr = self.parse_expression(0)?;
        if !self.at_eof() {
            let tok = self.peek()?;
            let err = ParseError::new(ErrorCode::S0211, tok.position, &[("token", tok.kind.describe())]);
            return self.fail_or_collect(err);
        }
        Ok(expr)
    }

    /// Core Pratt loop: parse a prefix term, then repeatedly fold in
    /// infix/postfix operators whose left binding power exceeds `min_bp`.
    fn parse_expression(&mut self, min_bp: u8) -> ParseResult<ExpressionNode> {
        let mut lhs = self.parse_prefix()?;

        loop {
            if self.in_indent_aware_mode() && self.at_flash_terminator() {
                break;
            }
            let tok = self.peek()?;
            let op = match &tok.kind {
                TokenKind::Operator(o) => *o,
                _ => break,
            };
            let Some((lbp, rbp)) = infix_binding_power(op) else { break };
            if lbp < min_bp {
                break;
            }
            self.bump()?;
            lhs = self.parse_infix(lhs, op, tok.position, rbp)?;
        }

        Ok(lhs)
    }

    fn in_indent_aware_mode(&self) -> bool {
        self.lexer.flash_mode
    }

    fn at_flash_terminator(&mut self) -> bool {
        matches!(
            self.peek(),
            Ok(Token {
                kind: TokenKind::Indent | TokenKind::Eof | TokenKind::InstanceOf | TokenKind::BlockIndent,
                ..
            })
        )
    }

    fn parse_prefix(&mut self) -> ParseResult<ExpressionNode> {
        let tok = self.bump()?;
        match tok.kind {
            TokenKind::Number(n) => Ok(ExpressionNode::Literal {
                value: serde_json::json!(n),
                position: tok.position,
            }),
            TokenKind::String(s) => {
                Ok(ExpressionNode::Literal { value: serde_json::json!(s), position: tok.position })
            }
            TokenKind::Value(v) => Ok(ExpressionNode::Literal { value: v, position: tok.position }),
            TokenKind::Variable(name) => {
                Ok(ExpressionNode::Variable { value: name, position: tok.position })
            }
            TokenKind::Name(name) if name == "function" || name == "\u{3bb}" => {
                self.parse_lambda(tok.position)
            }
            TokenKind::Name(name) => Ok(ExpressionNode::Name { value: name, position: tok.position }),
            TokenKind::Url(u) => {
                Ok(ExpressionNode::Literal { value: serde_json::json!(u), position: tok.position })
            }
            TokenKind::Operator("-") => {
                let bp = prefix_binding_power("-").unwrap();
                let expr = self.parse_expression(bp)?;
                Ok(ExpressionNode::Unary {
                    op: UnaryOperator::Negate,
                    expr: Box::new(expr),
                    position: tok.position,
                })
            }
            TokenKind::Operator("*") if self.in_indent_aware_mode() => {
                self.parse_flash_rule(tok.position)
            }
            TokenKind::Operator("*") => Ok(ExpressionNode::Wildcard { position: tok.position }),
            TokenKind::Operator("**") => Ok(ExpressionNode::Descendant { position: tok.position }),
            TokenKind::Operator("%") => Ok(ExpressionNode::Parent { slot: None, position: tok.position }),
            TokenKind::Operator("[") => self.parse_array_constructor(tok.position),
            TokenKind::Operator("{") => self.parse_object_constructor(tok.position),
            TokenKind::Operator("(") => self.parse_block(tok.position),
            TokenKind::Operator("|") => self.parse_transform(tok.position),
            TokenKind::Operator("/") => self.parse_regex(tok.position),
            TokenKind::Operator("?") => {
                Ok(ExpressionNode::PartialArgPlaceholder { position: tok.position })
            }
            TokenKind::BlockIndent => self.parse_flash_block(tok.position, tok.indent.unwrap_or(0)),
            TokenKind::Indent => self.parse_prefix(),
            other => Err(ParseError::new(
                ErrorCode::S0211,
                tok.position,
                &[("token", other.describe())],
            )),
        }
    }

    fn parse_infix(
        &mut self,
        lhs: ExpressionNode,
        op: &str,
        position: Position,
        rbp: u8,
    ) -> ParseResult<ExpressionNode> {
        match op {
            "." => {
                let rhs = self.parse_expression(rbp)?;
                Ok(fold_path(lhs, rhs, position))
            }
            "[" => {
                let index = self.parse_expression(0)?;
                self.expect_operator("]")?;
                Ok(ExpressionNode::Binary {
                    op: BinaryOperator::Filter,
                    lhs: Box::new(lhs),
                    rhs: Box::new(index),
                    position,
                })
            }
            "(" => self.parse_call(lhs, position),
            "^" => {
                self.expect_operator("(")?;
                let mut terms = vec![self.parse_expression(0)?];
                while self.at_operator(",") {
                    self.bump()?;
                    terms.push(self.parse_expression(0)?);
                }
                self.expect_operator(")")?;
                Ok(ExpressionNode::Binary {
                    op: BinaryOperator::Sort,
                    lhs: Box::new(lhs),
                    rhs: Box::new(ExpressionNode::ArrayConstructor { items: terms, position }),
                    position,
                })
            }
            "{" => {
                let group = self.parse_object_constructor(position)?;
                Ok(ExpressionNode::Binary {
                    op: BinaryOperator::Group,
                    lhs: Box::new(lhs),
                    rhs: Box::new(group),
                    position,
                })
            }
            ":=" => {
                let rhs = self.parse_expression(rbp)?;
                Ok(ExpressionNode::Binary {
                    op: BinaryOperator::Bind,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                    position,
                })
            }
            "@" => {
                let rhs = self.parse_expression(rbp)?;
                Ok(ExpressionNode::Binary {
                    op: BinaryOperator::Focus,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                    position,
                })
            }
            "#" => {
                let rhs = self.parse_expression(rbp)?;
                Ok(ExpressionNode::Binary {
                    op: BinaryOperator::Index,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                    position,
                })
            }
            "?" => {
                let then_expr = self.parse_expression(0)?;
                let else_expr = if self.at_operator(":") {
                    self.bump()?;
                    Some(Box::new(self.parse_expression(0)?))
                } else {
                    None
                };
                Ok(ExpressionNode::Condition {
                    condition: Box::new(lhs),
                    then_expr: Box::new(then_expr),
                    else_expr,
                    position,
                })
            }
            "??" => {
                let rhs = self.parse_expression(rbp)?;
                Ok(ExpressionNode::Coalesce { lhs: Box::new(lhs), rhs: Box::new(rhs), position })
            }
            "?:" => {
                let rhs = self.parse_expression(rbp)?;
                Ok(ExpressionNode::Elvis { lhs: Box::new(lhs), rhs: Box::new(rhs), position })
            }
            ".." => {
                let rhs = self.parse_expression(rbp)?;
                Ok(ExpressionNode::Binary {
                    op: BinaryOperator::Range,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                    position,
                })
            }
            "~>" => {
                let rhs = self.parse_expression(rbp)?;
                Ok(ExpressionNode::Binary {
                    op: BinaryOperator::Apply,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                    position,
                })
            }
            "and" | "or" | "in" | "+" | "-" | "*" | "/" | "%" | "&" | "=" | "!=" | "<" | "<="
            | ">" | ">=" => {
                let bop = binary_op_for(op);
                let rhs = self.parse_expression(rbp)?;
                Ok(ExpressionNode::Binary { op: bop, lhs: Box::new(lhs), rhs: Box::new(rhs), position })
            }
            _ => Err(ParseError::new(ErrorCode::S0207, position, &[("token", op.to_string())])),
        }
    }

    fn parse_array_constructor(&mut self, position: Position) -> ParseResult<ExpressionNode> {
        let mut items = Vec::new();
        if !self.at_operator("]") {
            items.push(self.parse_expression(0)?);
            while self.at_operator(",") {
                self.bump()?;
                items.push(self.parse_expression(0)?);
            }
        }
        self.expect_operator("]")?;
        Ok(ExpressionNode::ArrayConstructor { items, position })
    }

    fn parse_object_constructor(&mut self, position: Position) -> ParseResult<ExpressionNode> {
        let mut pairs = Vec::new();
        if !self.at_operator("}") {
            loop {
                let key = self.parse_expression(0)?;
                self.expect_operator(":")?;
                let value = self.parse_expression(0)?;
                pairs.push((key, value));
                if self.at_operator(",") {
                    self.bump()?;
                    continue;
                }
                break;
            }
        }
        self.expect_operator("}")?;
        Ok(ExpressionNode::ObjectConstructor { pairs, position })
    }

    fn parse_block(&mut self, position: Position) -> ParseResult<ExpressionNode> {
        let mut expressions = Vec::new();
        if !self.at_operator(")") {
            expressions.push(self.parse_expression(0)?);
            while self.at_operator(";") {
                self.bump()?;
                expressions.push(self.parse_expression(0)?);
            }
        }
        self.expect_operator(")")?;
        if expressions.len() == 1 {
            return Ok(expressions.into_iter().next().unwrap());
        }
        Ok(ExpressionNode::Block { expressions, position })
    }

    fn parse_call(&mut self, callee: ExpressionNode, position: Position) -> ParseResult<ExpressionNode> {
        let mut args = Vec::new();
        let mut partial = false;
        if !self.at_operator(")") {
            loop {
                if self.at_operator("?") {
                    self.bump()?;
                    partial = true;
                    args.push(ExpressionNode::PartialArgPlaceholder { position });
                } else {
                    args.push(self.parse_expression(0)?);
                }
                if self.at_operator(",") {
                    self.bump()?;
                    continue;
                }
                break;
            }
        }
        self.expect_operator(")")?;
        Ok(ExpressionNode::FunctionCall { callee: Box::new(callee), args, partial, position })
    }

    fn parse_lambda(&mut self, position: Position) -> ParseResult<ExpressionNode> {
        let mut signature = None;
        if self.at_operator("<") {
            signature = Some(self.scan_signature_literal()?);
        }
        self.expect_operator("(")?;
        let mut params = Vec::new();
        if !self.at_operator(")") {
            loop {
                let tok = self.bump()?;
                match tok.kind {
                    TokenKind::Variable(name) => params.push(name),
                    other => {
                        return Err(ParseError::new(
                            ErrorCode::S0207,
                            tok.position,
                            &[("token", other.describe())],
                        ));
                    }
                }
                if self.at_operator(",") {
                    self.bump()?;
                    continue;
                }
                break;
            }
        }
        self.expect_operator(")")?;
        self.expect_operator("{")?;
        let body = self.parse_block_statements()?;
        self.expect_operator("}")?;
        Ok(ExpressionNode::Lambda(Lambda {
            params,
            signature,
            body: Box::new(body),
            position,
            thunk: false,
        }))
    }

    fn parse_block_statements(&mut self) -> ParseResult<ExpressionNode> {
        let position = self.peek()?.position;
        let mut expressions = vec![self.parse_expression(0)?];
        while self.at_operator(";") {
            self.bump()?;
            if self.at_operator("}") {
                break;
            }
            expressions.push(self.parse_expression(0)?);
        }
        if expressions.len() == 1 {
            return Ok(expressions.into_iter().next().unwrap());
        }
        Ok(ExpressionNode::Block { expressions, position })
    }

    /// Lambda signatures (`<s-n?s?:s>`) use a distinct character set from
    /// the rest of the grammar; scan raw text between `<` and the
    /// matching `>` rather than tokenizing it as operators.
    fn scan_signature_literal(&mut self) -> ParseResult<String> {
        self.expect_operator("<")?;
        let mut depth = 1;
        let mut out = String::new();
        loop {
            let tok = self.bump()?;
            match &tok.kind {
                TokenKind::Operator("<") => {
                    depth += 1;
                    out.push('<');
                }
                TokenKind::Operator(">") => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                    out.push('>');
                }
                TokenKind::Eof => {
                    return Err(ParseError::new(ErrorCode::S0207, tok.position, &[]));
                }
                other => out.push_str(&other.describe()),
            }
        }
        Ok(out)
    }

    fn parse_transform(&mut self, position: Position) -> ParseResult<ExpressionNode> {
        let pattern = self.parse_expression(0)?;
        self.expect_operator("|")?;
        let update = self.parse_expression(0)?;
        let delete = if self.at_operator("|") {
            self.bump()?;
            Some(Box::new(self.parse_expression(0)?))
        } else {
            None
        };
        self.expect_operator("|")?;
        Ok(ExpressionNode::Transform(Transform {
            pattern: Box::new(pattern),
            update: Box::new(update),
            delete,
            position,
        }))
    }

    fn parse_regex(&mut self, position: Position) -> ParseResult<ExpressionNode> {
        // The opening `/` was already consumed by `bump`; rewind the
        // lexer's notion of "current position" by re-scanning from the
        // recorded start offset is unnecessary here because `scan_regex`
        // expects the `/` still unconsumed, so back up one byte.
        self.lexer.unscan_slash();
        let tok = self.lexer.scan_regex().map_err(ParseError::from_lex)?;
        match tok.kind {
            TokenKind::Regex { pattern, flags } => {
                Ok(ExpressionNode::Regex { pattern, flags, position })
            }
            _ => unreachable!("scan_regex always returns a Regex token"),
        }
    }

    // --- FLASH ---------------------------------------------------------

    fn parse_flash_block(
        &mut self,
        position: Position,
        indent: u32,
    ) -> ParseResult<ExpressionNode> {
        self.lexer.flash_mode = true;
        let next = self.bump()?;
        let (instance_expr, instance_of_tok) = match next.kind {
            TokenKind::Name(ref n) if n == "Instance" => {
                self.expect_operator(":")?;
                let expr = self.parse_expression(0)?;
                let blk = self.peek()?;
                if !matches!(blk.kind, TokenKind::BlockIndent) || blk.indent != Some(indent) {
                    return Err(ParseError::new(ErrorCode::F1108, blk.position, &[]));
                }
                self.bump()?;
                let of = self.bump()?;
                if !matches!(of.kind, TokenKind::InstanceOf) {
                    return Err(ParseError::new(ErrorCode::F1108, of.position, &[]));
                }
                (Some(Box::new(expr)), self.bump()?)
            }
            TokenKind::InstanceOf => (None, self.bump()?),
            _ => {
                return Err(ParseError::new(
                    ErrorCode::S0207,
                    next.position,
                    &[("token", next.kind.describe())],
                ));
            }
        };
        let instance_of = match instance_of_tok.kind {
            TokenKind::Name(n) => n,
            TokenKind::Url(u) => u,
            other => other.describe(),
        };

        self.indent_stack.push(indent);
        let rules = self.parse_flash_rule_list(indent + 2)?;
        self.indent_stack.pop();

        Ok(ExpressionNode::FlashBlock(FlashBlock {
            instance_expr,
            instance_of,
            rules,
            position,
            ref_key: None,
        }))
    }

    fn parse_flash_rule_list(&mut self, expected_indent: u32) -> ParseResult<Vec<ExpressionNode>> {
        let mut rules = Vec::new();
        loop {
            let tok = self.peek()?;
            match tok.kind {
                TokenKind::Indent => {
                    let level = tok.indent.unwrap_or(0);
                    if level < expected_indent {
                        break;
                    }
                    if level > expected_indent {
                        return Err(ParseError::new(
                            ErrorCode::F1017,
                            tok.position,
                            &[("expected", expected_indent.to_string()), ("actual", level.to_string())],
                        ));
                    }
                    if level % 2 != 0 {
                        return Err(ParseError::new(ErrorCode::F1021, tok.position, &[]));
                    }
                    self.bump()?;
                    rules.push(self.parse_expression(0)?);
                }
                TokenKind::Eof | TokenKind::BlockIndent | TokenKind::InstanceOf => break,
                _ => break,
            }
        }
        Ok(rules)
    }

    fn parse_flash_rule(&mut self, position: Position) -> ParseResult<ExpressionNode> {
        let context = if self.at_operator("(") {
            self.bump()?;
            let ctx = self.parse_expression(0)?;
            self.expect_operator(")")?;
            self.expect_operator(".")?;
            Some(Box::new(ctx))
        } else {
            None
        };

        let start_line = self.peek()?.position.line;
        let mut name = None;
        let mut slices = Vec::new();
        let mut full_path_parts = Vec::new();
        loop {
            let tok = self.bump()?;
            let seg_name = match tok.kind {
                TokenKind::Name(n) => n,
                other => {
                    return Err(ParseError::new(
                        ErrorCode::F1104,
                        tok.position,
                        &[("token", other.describe())],
                    ));
                }
            };
            if seg_name.starts_with('$') {
                return Err(ParseError::new(ErrorCode::F1106, tok.position, &[]));
            }
            let mut seg_slices = Vec::new();
            while self.at_operator("[") {
                self.bump()?;
                seg_slices.push(self.parse_slice_selector()?);
                self.expect_operator("]")?;
            }
            if tok.position.line != start_line {
                return Err(ParseError::new(ErrorCode::F1105, tok.position, &[]));
            }
            full_path_parts.push(format_path_segment(&seg_name, &seg_slices));
            if name.is_none() {
                name = Some(seg_name);
                slices = seg_slices;
            }
            if self.at_operator(".") {
                self.bump()?;
                continue;
            }
            break;
        }

        let inline_expression = if self.at_operator("=") {
            self.bump()?;
            Some(Box::new(self.parse_expression(0)?))
        } else {
            None
        };

        let indent = *self.indent_stack.last().unwrap_or(&0);
        let subrules = if matches!(self.peek()?.kind, TokenKind::Indent)
            && self.peek()?.indent == Some(indent + 2)
        {
            self.indent_stack.push(indent + 2);
            let subs = self.parse_flash_rule_list(indent + 2)?;
            self.indent_stack.pop();
            subs
        } else {
            Vec::new()
        };

        Ok(ExpressionNode::FlashRule(FlashRule {
            name: name.unwrap_or_default(),
            slices,
            full_path: full_path_parts.join("."),
            context,
            inline_expression,
            subrules,
            position,
            ref_key: None,
        }))
    }

    fn parse_slice_selector(&mut self) -> ParseResult<String> {
        let tok = self.bump()?;
        match tok.kind {
            TokenKind::Name(n) => Ok(n),
            TokenKind::Number(n) => Ok(n.to_string()),
            TokenKind::Operator("-") => {
                let next = self.bump()?;
                match next.kind {
                    TokenKind::Name(n) => Ok(format!("-{n}")),
                    TokenKind::Number(n) => Ok(format!("-{n}")),
                    other => Err(ParseError::new(
                        ErrorCode::F1109,
                        next.position,
                        &[("token", other.describe())],
                    )),
                }
            }
            other => Err(ParseError::new(ErrorCode::F1109, tok.position, &[("token", other.describe())])),
        }
    }
}

fn format_path_segment(name: &str, slices: &[String]) -> String {
    if slices.is_empty() {
        name.to_string()
    } else {
        format!("{name}[{}]", slices.join("-"))
    }
}

fn fold_path(lhs: ExpressionNode, rhs: ExpressionNode, position: Position) -> ExpressionNode {
    match lhs {
        ExpressionNode::Path { mut steps, keep_singleton_array, .. } => {
            steps.push(rhs);
            ExpressionNode::Path { steps, keep_singleton_array, position }
        }
        other => ExpressionNode::Path { steps: vec![other, rhs], keep_singleton_array: false, position },
    }
}

fn binary_op_for(op: &str) -> BinaryOperator {
    match op {
        "+" => BinaryOperator::Add,
        "-" => BinaryOperator::Subtract,
        "*" => BinaryOperator::Multiply,
        "/" => BinaryOperator::Divide,
        "%" => BinaryOperator::Modulo,
        "&" => BinaryOperator::Concat,
        "=" => BinaryOperator::Equal,
        "!=" => BinaryOperator::NotEqual,
        "<" => BinaryOperator::LessThan,
        "<=" => BinaryOperator::LessThanOrEqual,
        ">" => BinaryOperator::GreaterThan,
        ">=" => BinaryOperator::GreaterThanOrEqual,
        "in" => BinaryOperator::In,
        "and" => BinaryOperator::And,
        "or" => BinaryOperator::Or,
        _ => unreachable!("binary_op_for called with non-binary operator {op}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_arithmetic_precedence() {
        let (ast, errs) = parse("1 + 2 * 3", false).unwrap();
        assert!(errs.is_empty());
        match ast {
            ExpressionNode::Binary { op: BinaryOperator::Add, rhs, .. } => {
                assert!(matches!(*rhs, ExpressionNode::Binary { op: BinaryOperator::Multiply, .. }));
            }
            other => panic!("unexpected ast: {other:?}"),
        }
    }

    #[test]
    fn parses_path_expression() {
        let (ast, _) = parse("name.given", false).unwrap();
        match ast {
            ExpressionNode::Path { steps, .. } => assert_eq!(steps.len(), 2),
            other => panic!("expected path, got {other:?}"),
        }
    }

    #[test]
    fn parses_filter_predicate() {
        let (ast, _) = parse("items[p > 10]", false).unwrap();
        assert!(matches!(ast, ExpressionNode::Binary { op: BinaryOperator::Filter, .. }));
    }

    #[test]
    fn parses_coalesce_and_elvis() {
        let (ast, _) = parse("$.a ?? \"fallback\"", false).unwrap();
        assert!(matches!(ast, ExpressionNode::Coalesce { .. }));
        let (ast2, _) = parse("$.a ?: \"fallback\"", false).unwrap();
        assert!(matches!(ast2, ExpressionNode::Elvis { .. }));
    }

    #[test]
    fn parse_recovery_collects_error_node() {
        let (ast, errs) = parse("Account.", true).unwrap();
        assert!(!errs.is_empty());
        assert!(matches!(ast, ExpressionNode::Path { .. } | ExpressionNode::AstError { .. }));
    }
}
