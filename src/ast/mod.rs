//! Abstract syntax tree definitions for FLASH expressions.
//!
//! This module provides the core AST types used to represent parsed FLASH
//! expressions, designed to round-trip losslessly through JSON (spec §6
//! `ast()`/persistence contract).

#![warn(missing_docs)]

mod node;
mod operator;
mod visitor;

pub use node::*;
pub use operator::*;
pub use visitor::*;
