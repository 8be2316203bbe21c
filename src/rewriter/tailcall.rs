//! Tail-call rewrite (spec §4.3): a function call in tail position
//! becomes a thunked lambda so the evaluator's trampoline can unwind
//! recursion iteratively instead of growing the host stack.

use crate::ast::{ExpressionNode, Lambda};

/// Rewrite tail-position function calls reachable from `node` into thunks.
pub fn rewrite_tail_calls(node: ExpressionNode) -> ExpressionNode {
    mark_tail(node, true)
}

fn mark_tail(node: ExpressionNode, in_tail_position: bool) -> ExpressionNode {
    match node {
        ExpressionNode::FunctionCall { callee, args, partial, position } if in_tail_position && !partial => {
            let call = ExpressionNode::FunctionCall {
                callee: Box::new(mark_tail(*callee, false)),
                args: args.into_iter().map(|a| mark_tail(a, false)).collect(),
                partial,
                position,
            };
            ExpressionNode::Lambda(Lambda {
                params: Vec::new(),
                signature: None,
                body: Box::new(call),
                position,
                thunk: true,
            })
        }
        ExpressionNode::Condition { condition, then_expr, else_expr, position } => ExpressionNode::Condition {
            condition: Box::new(mark_tail(*condition, false)),
            then_expr: Box::new(mark_tail(*then_expr, in_tail_position)),
            else_expr: else_expr.map(|e| Box::new(mark_tail(*e, in_tail_position))),
            position,
        },
        ExpressionNode::Block { expressions, position } => {
            let len = expressions.len();
            let expressions = expressions
                .into_iter()
                .enumerate()
                .map(|(i, e)| mark_tail(e, in_tail_position && i + 1 == len))
                .collect();
            ExpressionNode::Block { expressions, position }
        }
        ExpressionNode::Path { steps, keep_singleton_array, position } => {
            let len = steps.len();
            let steps = steps
                .into_iter()
                .enumerate()
                .map(|(i, s)| mark_tail(s, in_tail_position && i + 1 == len))
                .collect();
            ExpressionNode::Path { steps, keep_singleton_array, position }
        }
        ExpressionNode::Lambda(mut l) => {
            l.body = Box::new(mark_tail(*l.body, true));
            ExpressionNode::Lambda(l)
        }
        ExpressionNode::Unary { op, expr, position } => {
            ExpressionNode::Unary { op, expr: Box::new(mark_tail(*expr, false)), position }
        }
        ExpressionNode::Binary { op, lhs, rhs, position } => ExpressionNode::Binary {
            op,
            lhs: Box::new(mark_tail(*lhs, false)),
            rhs: Box::new(mark_tail(*rhs, false)),
            position,
        },
        ExpressionNode::ArrayConstructor { items, position } => ExpressionNode::ArrayConstructor {
            items: items.into_iter().map(|i| mark_tail(i, false)).collect(),
            position,
        },
        ExpressionNode::ObjectConstructor { pairs, position } => ExpressionNode::ObjectConstructor {
            pairs: pairs
                .into_iter()
                .map(|(k, v)| (mark_tail(k, false), mark_tail(v, false)))
                .collect(),
            position,
        },
        ExpressionNode::Coalesce { lhs, rhs, position } => ExpressionNode::Coalesce {
            lhs: Box::new(mark_tail(*lhs, false)),
            rhs: Box::new(mark_tail(*rhs, false)),
            position,
        },
        ExpressionNode::Elvis { lhs, rhs, position } => ExpressionNode::Elvis {
            lhs: Box::new(mark_tail(*lhs, false)),
            rhs: Box::new(mark_tail(*rhs, false)),
            position,
        },
        ExpressionNode::FunctionCall { callee, args, partial, position } => ExpressionNode::FunctionCall {
            callee: Box::new(mark_tail(*callee, false)),
            args: args.into_iter().map(|a| mark_tail(a, false)).collect(),
            partial,
            position,
        },
        ExpressionNode::FlashBlock(mut b) => {
            b.rules = b.rules.into_iter().map(|r| mark_tail(r, false)).collect();
            ExpressionNode::FlashBlock(b)
        }
        ExpressionNode::FlashRule(mut r) => {
            r.inline_expression = r.inline_expression.map(|e| Box::new(mark_tail(*e, false)));
            r.subrules = r.subrules.into_iter().map(|s| mark_tail(s, false)).collect();
            ExpressionNode::FlashRule(r)
        }
        other => other,
    }
}
