//! The tagged-variant AST node type (spec §3).

use super::operator::{BinaryOperator, UnaryOperator};
use crate::diagnostics::Position;
use serde::{Deserialize, Serialize};

/// A signature literal attached to a lambda (`<...>`), kept unparsed here;
/// the grammar is validated by [`crate::value::signature`].
pub type SignatureLiteral = String;

/// A labeled ancestor slot assigned during rewriting (spec §4.3, "ancestor
/// resolution"). `label` is a stable synthetic name; `index` identifies
/// which earlier path step owns the binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub label: String,
    pub index: usize,
}

/// A single step of a FLASH flash-path (spec §4.2's "flash path grammar").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlashPathStep {
    pub name: String,
    /// Slice selectors: bare names, numeric indices (as strings), or
    /// `name-name-...` ranges — kept as raw text, interpreted downstream.
    pub slices: Vec<String>,
    pub position: Position,
}

/// `Instance:`/`InstanceOf:` block, post-unchain (spec §4.3 pre-flash
/// rewrite runs before this node is built from the parser's raw form).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlashBlock {
    /// Instance-id expression, absent for a bare `InstanceOf:` block.
    pub instance_expr: Option<Box<ExpressionNode>>,
    /// The profile/type identifier following `InstanceOf:`.
    pub instance_of: String,
    pub rules: Vec<ExpressionNode>,
    pub position: Position,
    /// Filled in by `process_ast`: `instanceof` used as the resolver key.
    pub ref_key: Option<String>,
}

/// A single-step flash rule, after unchaining (spec §4.3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlashRule {
    pub name: String,
    pub slices: Vec<String>,
    /// Full dotted path accumulated from the block root to this rule,
    /// used to build `ref_key`.
    pub full_path: String,
    /// Optional `(expr).` context prefix.
    pub context: Option<Box<ExpressionNode>>,
    /// Optional `= expr` inline value.
    pub inline_expression: Option<Box<ExpressionNode>>,
    pub subrules: Vec<ExpressionNode>,
    pub position: Position,
    /// Filled in by `process_ast`.
    pub ref_key: Option<String>,
}

/// The transform operator `|pattern|update|delete|`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub pattern: Box<ExpressionNode>,
    pub update: Box<ExpressionNode>,
    pub delete: Option<Box<ExpressionNode>>,
    pub position: Position,
}

/// A lambda (`function(...){...}` / `λ(...){...}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lambda {
    pub params: Vec<String>,
    pub signature: Option<SignatureLiteral>,
    pub body: Box<ExpressionNode>,
    pub position: Position,
    /// Set by the tail-call rewrite pass: an empty-param thunk whose body
    /// is the original tail call, unwound by the evaluator's trampoline.
    pub thunk: bool,
}

/// The tagged AST node enum. Every variant carries a [`Position`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ExpressionNode {
    Literal { value: serde_json::Value, position: Position },
    /// A path segment name, e.g. `given` in `name.given`.
    Name { value: String, position: Position },
    /// `$name`, or bare `$` when `value` is empty (current focus).
    Variable { value: String, position: Position },
    Wildcard { position: Position },
    /// `**` descendant wildcard.
    Descendant { position: Position },
    /// `%` parent reference, resolved to a slot by ancestor resolution.
    Parent { slot: Option<Slot>, position: Position },
    Regex { pattern: String, flags: String, position: Position },
    Unary { op: UnaryOperator, expr: Box<ExpressionNode>, position: Position },
    ArrayConstructor { items: Vec<ExpressionNode>, position: Position },
    ObjectConstructor { pairs: Vec<(ExpressionNode, ExpressionNode)>, position: Position },
    Binary {
        op: BinaryOperator,
        lhs: Box<ExpressionNode>,
        rhs: Box<ExpressionNode>,
        position: Position,
    },
    Condition {
        condition: Box<ExpressionNode>,
        then_expr: Box<ExpressionNode>,
        else_expr: Option<Box<ExpressionNode>>,
        position: Position,
    },
    /// `??` — first defined of lhs/rhs.
    Coalesce { lhs: Box<ExpressionNode>, rhs: Box<ExpressionNode>, position: Position },
    /// `?:` — lhs if truthy, else rhs.
    Elvis { lhs: Box<ExpressionNode>, rhs: Box<ExpressionNode>, position: Position },
    Block { expressions: Vec<ExpressionNode>, position: Position },
    Path {
        steps: Vec<ExpressionNode>,
        keep_singleton_array: bool,
        position: Position,
    },
    Lambda(Lambda),
    FunctionCall {
        callee: Box<ExpressionNode>,
        args: Vec<ExpressionNode>,
        partial: bool,
        position: Position,
    },
    /// A bare `?` used as a partial-application placeholder argument.
    PartialArgPlaceholder { position: Position },
    Transform(Transform),
    FlashBlock(FlashBlock),
    FlashRule(FlashRule),
    /// Error-recovery node (spec §4.2 "error recovery").
    AstError { code: String, remaining: Vec<String>, position: Position },
}

impl ExpressionNode {
    /// The node's source position.
    pub fn position(&self) -> Position {
        match self {
            ExpressionNode::Literal { position, .. }
            | ExpressionNode::Name { position, .. }
            | ExpressionNode::Variable { position, .. }
            | ExpressionNode::Wildcard { position }
            | ExpressionNode::Descendant { position }
            | ExpressionNode::Parent { position, .. }
            | ExpressionNode::Regex { position, .. }
            | ExpressionNode::Unary { position, .. }
            | ExpressionNode::ArrayConstructor { position, .. }
            | ExpressionNode::ObjectConstructor { position, .. }
            | ExpressionNode::Binary { position, .. }
            | ExpressionNode::Condition { position, .. }
            | ExpressionNode::Coalesce { position, .. }
            | ExpressionNode::Elvis { position, .. }
            | ExpressionNode::Block { position, .. }
            | ExpressionNode::Path { position, .. }
            | ExpressionNode::FunctionCall { position, .. }
            | ExpressionNode::PartialArgPlaceholder { position }
            | ExpressionNode::AstError { position, .. } => *position,
            ExpressionNode::Lambda(l) => l.position,
            ExpressionNode::Transform(t) => t.position,
            ExpressionNode::FlashBlock(b) => b.position,
            ExpressionNode::FlashRule(r) => r.position,
        }
    }

    /// True if this subtree (shallow check only — callers run this over a
    /// post-order walk) is a FLASH construct.
    pub fn is_flash(&self) -> bool {
        matches!(self, ExpressionNode::FlashBlock(_) | ExpressionNode::FlashRule(_))
    }
}
