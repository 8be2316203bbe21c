//! Post-parse `processAST` pass (spec §4.3): ref-key construction and
//! reference collection.

use super::refs::CollectedRefs;
use crate::ast::{ExpressionNode, FlashBlock, FlashRule};

/// Walk `node`, assigning `ref_key` to every flash block/rule and
/// collecting the definition references the resolver will need.
pub fn process(node: ExpressionNode) -> (ExpressionNode, CollectedRefs) {
    let mut refs = CollectedRefs::default();
    let node = process_node(node, "", &mut refs);
    (node, refs)
}

fn process_node(node: ExpressionNode, ancestor_path: &str, refs: &mut CollectedRefs) -> ExpressionNode {
    match node {
        ExpressionNode::FlashBlock(mut block) => {
            refs.contains_flash = true;
            block.ref_key = Some(block.instance_of.clone());
            refs.structure_definition_refs.push((block.instance_of.clone(), block.position));
            block.instance_expr = block.instance_expr.map(|e| Box::new(process_node(*e, ancestor_path, refs)));
            let base = block.instance_of.clone();
            block.rules =
                block.rules.into_iter().map(|r| process_node(r, &base, refs)).collect();
            ExpressionNode::FlashBlock(block)
        }
        ExpressionNode::FlashRule(mut rule) => {
            refs.contains_flash = true;
            let segment = format_segment(&rule.name, &rule.slices);
            let ref_key = if ancestor_path.is_empty() {
                segment.clone()
            } else {
                format!("{ancestor_path}::{segment}")
            };
            rule.ref_key = Some(ref_key.clone());
            refs.element_definition_refs.push((ref_key.clone(), rule.position));
            rule.context = rule.context.map(|c| Box::new(process_node(*c, ancestor_path, refs)));
            rule.inline_expression =
                rule.inline_expression.map(|e| Box::new(process_node(*e, &ref_key, refs)));
            rule.subrules =
                rule.subrules.into_iter().map(|r| process_node(r, &ref_key, refs)).collect();
            ExpressionNode::FlashRule(rule)
        }
        ExpressionNode::Unary { op, expr, position } => ExpressionNode::Unary {
            op,
            expr: Box::new(process_node(*expr, ancestor_path, refs)),
            position,
        },
        ExpressionNode::ArrayConstructor { items, position } => ExpressionNode::ArrayConstructor {
            items: items.into_iter().map(|i| process_node(i, ancestor_path, refs)).collect(),
            position,
        },
        ExpressionNode::ObjectConstructor { pairs, position } => ExpressionNode::ObjectConstructor {
            pairs: pairs
                .into_iter()
                .map(|(k, v)| (process_node(k, ancestor_path, refs), process_node(v, ancestor_path, refs)))
                .collect(),
            position,
        },
        ExpressionNode::Binary { op, lhs, rhs, position } => ExpressionNode::Binary {
            op,
            lhs: Box::new(process_node(*lhs, ancestor_path, refs)),
            rhs: Box::new(process_node(*rhs, ancestor_path, refs)),
            position,
        },
        ExpressionNode::Condition { condition, then_expr, else_expr, position } => ExpressionNode::Condition {
            condition: Box::new(process_node(*condition, ancestor_path, refs)),
            then_expr: Box::new(process_node(*then_expr, ancestor_path, refs)),
            else_expr: else_expr.map(|e| Box::new(process_node(*e, ancestor_path, refs))),
            position,
        },
        ExpressionNode::Coalesce { lhs, rhs, position } => ExpressionNode::Coalesce {
            lhs: Box::new(process_node(*lhs, ancestor_path, refs)),
            rhs: Box::new(process_node(*rhs, ancestor_path, refs)),
            position,
        },
        ExpressionNode::Elvis { lhs, rhs, position } => ExpressionNode::Elvis {
            lhs: Box::new(process_node(*lhs, ancestor_path, refs)),
            rhs: Box::new(process_node(*rhs, ancestor_path, refs)),
            position,
        },
        ExpressionNode::Block { expressions, position } => ExpressionNode::Block {
            expressions: expressions.into_iter().map(|e| process_node(e, ancestor_path, refs)).collect(),
            position,
        },
        ExpressionNode::Path { steps, keep_singleton_array, position } => ExpressionNode::Path {
            steps: steps.into_iter().map(|s| process_node(s, ancestor_path, refs)).collect(),
            keep_singleton_array,
            position,
        },
        ExpressionNode::Lambda(mut l) => {
            l.body = Box::new(process_node(*l.body, ancestor_path, refs));
            ExpressionNode::Lambda(l)
        }
        ExpressionNode::FunctionCall { callee, args, partial, position } => ExpressionNode::FunctionCall {
            callee: Box::new(process_node(*callee, ancestor_path, refs)),
            args: args.into_iter().map(|a| process_node(a, ancestor_path, refs)).collect(),
            partial,
            position,
        },
        ExpressionNode::Transform(mut t) => {
            t.pattern = Box::new(process_node(*t.pattern, ancestor_path, refs));
            t.update = Box::new(process_node(*t.update, ancestor_path, refs));
            t.delete = t.delete.map(|d| Box::new(process_node(*d, ancestor_path, refs)));
            ExpressionNode::Transform(t)
        }
        other => other,
    }
}

fn format_segment(name: &str, slices: &[String]) -> String {
    if slices.is_empty() {
        name.to_string()
    } else {
        format!("{name}[{}]", slices.join("-"))
    }
}

/// Helper retained for callers that need the pre-rewrite ref-key shape
/// without running the full pass (e.g. the FLASH evaluator computing a
/// virtual rule's key for a missing mandatory slice).
pub fn build_ref_key(parent: &str, rule: &FlashRule) -> String {
    let segment = format_segment(&rule.name, &rule.slices);
    if parent.is_empty() {
        segment
    } else {
        format!("{parent}::{segment}")
    }
}

/// Ditto for a block's own key.
pub fn build_block_ref_key(block: &FlashBlock) -> String {
    block.instance_of.clone()
}
