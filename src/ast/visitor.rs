// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Visitor pattern for AST traversal, used by the rewriter and resolver
//! passes to walk a compiled expression's tree without duplicating the
//! match-on-every-variant boilerplate at each call site.

use super::node::ExpressionNode;

/// A read-only visitor over [`ExpressionNode`] subtrees. Default method
/// bodies recurse via [`walk_expression`]; override only the variants a
/// given pass cares about.
pub trait Visitor: Sized {
    /// Visit a single node, recursing into children by default.
    fn visit(&mut self, node: &ExpressionNode) {
        walk_expression(self, node);
    }
}

/// Recurse into `node`'s children, calling `visitor.visit` on each.
pub fn walk_expression<V: Visitor>(visitor: &mut V, node: &ExpressionNode) {
    match node {
        ExpressionNode::Unary { expr, .. } => visitor.visit(expr),
        ExpressionNode::ArrayConstructor { items, .. } => {
            for item in items {
                visitor.visit(item);
            }
        }
        ExpressionNode::ObjectConstructor { pairs, .. } => {
            for (k, v) in pairs {
                visitor.visit(k);
                visitor.visit(v);
            }
        }
        ExpressionNode::Binary { lhs, rhs, .. } => {
            visitor.visit(lhs);
            visitor.visit(rhs);
        }
        ExpressionNode::Condition { condition, then_expr, else_expr, .. } => {
            visitor.visit(condition);
            visitor.visit(then_expr);
            if let Some(e) = else_expr {
                visitor.visit(e);
            }
        }
        ExpressionNode::Coalesce { lhs, rhs, .. } | ExpressionNode::Elvis { lhs, rhs, .. } => {
            visitor.visit(lhs);
            visitor.visit(rhs);
        }
        ExpressionNode::Block { expressions, .. } => {
            for e in expressions {
                visitor.visit(e);
            }
        }
        ExpressionNode::Path { steps, .. } => {
            for s in steps {
                visitor.visit(s);
            }
        }
        ExpressionNode::Lambda(l) => visitor.visit(&l.body),
        ExpressionNode::FunctionCall { callee, args, .. } => {
            visitor.visit(callee);
            for a in args {
                visitor.visit(a);
            }
        }
        ExpressionNode::Transform(t) => {
            visitor.visit(&t.pattern);
            visitor.visit(&t.update);
            if let Some(d) = &t.delete {
                visitor.visit(d);
            }
        }
        ExpressionNode::FlashBlock(b) => {
            if let Some(e) = &b.instance_expr {
                visitor.visit(e);
            }
            for r in &b.rules {
                visitor.visit(r);
            }
        }
        ExpressionNode::FlashRule(r) => {
            if let Some(c) = &r.context {
                visitor.visit(c);
            }
            if let Some(e) = &r.inline_expression {
                visitor.visit(e);
            }
            for s in &r.subrules {
                visitor.visit(s);
            }
        }
        ExpressionNode::Literal { .. }
        | ExpressionNode::Name { .. }
        | ExpressionNode::Variable { .. }
        | ExpressionNode::Wildcard { .. }
        | ExpressionNode::Descendant { .. }
        | ExpressionNode::Parent { .. }
        | ExpressionNode::Regex { .. }
        | ExpressionNode::PartialArgPlaceholder { .. }
        | ExpressionNode::AstError { .. } => {}
    }
}

/// A mutable visitor, used by rewriting passes that replace nodes in
/// place (e.g. the tail-call and flash-unchain rewrites).
pub trait VisitorMut: Sized {
    /// Visit and possibly mutate a node, recursing by default.
    fn visit_mut(&mut self, node: &mut ExpressionNode) {
        walk_expression_mut(self, node);
    }
}

/// Recurse into `node`'s children, calling `visitor.visit_mut` on each.
pub fn walk_expression_mut<V: VisitorMut>(visitor: &mut V, node: &mut ExpressionNode) {
    match node {
        ExpressionNode::Unary { expr, .. } => visitor.visit_mut(expr),
        ExpressionNode::ArrayConstructor { items, .. } => {
            for item in items {
                visitor.visit_mut(item);
            }
        }
        ExpressionNode::ObjectConstructor { pairs, .. } => {
            for (k, v) in pairs {
                visitor.visit_mut(k);
                visitor.visit_mut(v);
            }
        }
        ExpressionNode::Binary { lhs, rhs, .. } => {
            visitor.visit_mut(lhs);
            visitor.visit_mut(rhs);
        }
        ExpressionNode::Condition { condition, then_expr, else_expr, .. } => {
            visitor.visit_mut(condition);
            visitor.visit_mut(then_expr);
            if let Some(e) = else_expr {
                visitor.visit_mut(e);
            }
        }
        ExpressionNode::Coalesce { lhs, rhs, .. } | ExpressionNode::Elvis { lhs, rhs, .. } => {
            visitor.visit_mut(lhs);
            visitor.visit_mut(rhs);
        }
        ExpressionNode::Block { expressions, .. } => {
            for e in expressions {
                visitor.visit_mut(e);
            }
        }
        ExpressionNode::Path { steps, .. } => {
            for s in steps {
                visitor.visit_mut(s);
            }
        }
        ExpressionNode::Lambda(l) => visitor.visit_mut(&mut l.body),
        ExpressionNode::FunctionCall { callee, args, .. } => {
            visitor.visit_mut(callee);
            for a in args {
                visitor.visit_mut(a);
            }
        }
        ExpressionNode::Transform(t) => {
            visitor.visit_mut(&mut t.pattern);
            visitor.visit_mut(&mut t.update);
            if let Some(d) = &mut t.delete {
                visitor.visit_mut(d);
            }
        }
        ExpressionNode::FlashBlock(b) => {
            if let Some(e) = &mut b.instance_expr {
                visitor.visit_mut(e);
            }
            for r in &mut b.rules {
                visitor.visit_mut(r);
            }
        }
        ExpressionNode::FlashRule(r) => {
            if let Some(c) = &mut r.context {
                visitor.visit_mut(c);
            }
            if let Some(e) = &mut r.inline_expression {
                visitor.visit_mut(e);
            }
            for s in &mut r.subrules {
                visitor.visit_mut(s);
            }
        }
        ExpressionNode::Literal { .. }
        | ExpressionNode::Name { .. }
        | ExpressionNode::Variable { .. }
        | ExpressionNode::Wildcard { .. }
        | ExpressionNode::Descendant { .. }
        | ExpressionNode::Parent { .. }
        | ExpressionNode::Regex { .. }
        | ExpressionNode::PartialArgPlaceholder { .. }
        | ExpressionNode::AstError { .. } => {}
    }
}
