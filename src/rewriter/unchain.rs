//! Pre-flash unchain rewrite (spec §4.3).
//!
//! Splits a multi-step flash-rule path into a nested hierarchy of
//! single-step flash-rule nodes: the first step stays at the outer
//! level, deeper steps become successive children of `rules[0]`. The
//! deepest rule receives the original inline expression and indented
//! subrules.

use crate::ast::{ExpressionNode, FlashRule};

/// Unchain every flash rule reachable from `node`, recursively.
pub fn unchain(node: ExpressionNode) -> ExpressionNode {
    match node {
        ExpressionNode::FlashBlock(mut block) => {
            block.rules = block.rules.into_iter().map(unchain).collect();
            ExpressionNode::FlashBlock(block)
        }
        ExpressionNode::FlashRule(rule) => unchain_rule(rule),
        ExpressionNode::Binary { op, lhs, rhs, position }
            if matches!(op, crate::ast::BinaryOperator::Dot) && rhs_is_flash(&rhs) =>
        {
            // Context-wrapped rule: only the RHS is rewritten.
            ExpressionNode::Binary { op, lhs, rhs: Box::new(unchain(*rhs)), position }
        }
        other => other,
    }
}

fn rhs_is_flash(node: &ExpressionNode) -> bool {
    matches!(node, ExpressionNode::FlashRule(_))
}

fn unchain_rule(mut rule: FlashRule) -> ExpressionNode {
    let mut path_steps = vec![(rule.name.clone(), rule.slices.clone())];
    for seg in rule.full_path.split('.').skip(1) {
        let (name, slices) = split_segment(seg);
        path_steps.push((name, slices));
    }

    rule.subrules = rule.subrules.into_iter().map(unchain).collect();

    if path_steps.len() <= 1 {
        return ExpressionNode::FlashRule(rule);
    }

    let position = rule.position;
    let deepest_name = path_steps.pop().unwrap();
    let mut innermost = FlashRule {
        name: deepest_name.0,
        slices: deepest_name.1,
        full_path: rule.full_path.clone(),
        context: None,
        inline_expression: rule.inline_expression,
        subrules: rule.subrules,
        position,
        ref_key: None,
    };

    while path_steps.len() > 1 {
        let (name, slices) = path_steps.pop().unwrap();
        innermost = FlashRule {
            name,
            slices,
            full_path: rule.full_path.clone(),
            context: None,
            inline_expression: None,
            subrules: vec![ExpressionNode::FlashRule(innermost)],
            position,
            ref_key: None,
        };
    }

    let (outer_name, outer_slices) = path_steps.pop().unwrap_or((rule.name.clone(), rule.slices.clone()));
    ExpressionNode::FlashRule(FlashRule {
        name: outer_name,
        slices: outer_slices,
        full_path: rule.full_path,
        context: rule.context,
        inline_expression: None,
        subrules: vec![ExpressionNode::FlashRule(innermost)],
        position,
        ref_key: None,
    })
}

fn split_segment(seg: &str) -> (String, Vec<String>) {
    if let Some(open) = seg.find('[') {
        let name = seg[..open].to_string();
        let inner = seg[open + 1..seg.len() - 1].to_string();
        let slices = inner.split('-').map(|s| s.to_string()).collect();
        (name, slices)
    } else {
        (seg.to_string(), Vec::new())
    }
}
