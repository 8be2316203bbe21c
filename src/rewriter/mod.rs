//! AST rewriter: pre-flash unchaining and post-parse processing
//! (spec §4.3).

mod ancestor;
mod process;
mod tailcall;
mod unchain;

pub mod refs;

pub use process::{build_block_ref_key, build_ref_key};
pub use refs::CollectedRefs;

use crate::ast::ExpressionNode;

/// Run the full rewrite pipeline: unchain flash-rule paths, assign
/// ref-keys and collect resolver references, resolve ancestor slots, and
/// rewrite tail calls for trampolining.
pub fn rewrite(ast: ExpressionNode) -> (ExpressionNode, CollectedRefs) {
    let ast = unchain::unchain(ast);
    let ast = ancestor::resolve_ancestors(ast);
    let ast = tailcall::rewrite_tail_calls(ast);
    process::process(ast)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn flash_rule_gets_a_ref_key() {
        let (ast, _errs) = parse(
            "InstanceOf: Patient\n* id = 'x'\n",
            false,
        )
        .unwrap();
        let (ast, refs) = rewrite(ast);
        assert!(refs.contains_flash);
        match ast {
            ExpressionNode::FlashBlock(b) => {
                assert_eq!(b.ref_key.as_deref(), Some("Patient"));
                assert_eq!(b.rules.len(), 1);
            }
            other => panic!("expected flash block, got {other:?}"),
        }
    }

    #[test]
    fn multi_step_path_unchains_into_nested_rules() {
        let (ast, _) = parse("InstanceOf: Patient\n* name.given = \"A\"\n", false).unwrap();
        let (ast, _) = rewrite(ast);
        match ast {
            ExpressionNode::FlashBlock(b) => match &b.rules[0] {
                ExpressionNode::FlashRule(outer) => {
                    assert_eq!(outer.name, "name");
                    assert_eq!(outer.subrules.len(), 1);
                }
                other => panic!("expected flash rule, got {other:?}"),
            },
            other => panic!("expected flash block, got {other:?}"),
        }
    }
}
