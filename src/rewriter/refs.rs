//! Collected FLASH references gathered by `process_ast`, consumed by the
//! definition resolver (spec §4.3/§4.4).

use crate::diagnostics::Position;

/// `instanceof` → position, one entry per distinct flash block.
#[derive(Debug, Clone, Default)]
pub struct CollectedRefs {
    pub structure_definition_refs: Vec<(String, Position)>,
    pub element_definition_refs: Vec<(String, Position)>,
    pub contains_flash: bool,
}
