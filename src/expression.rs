//! The symbolic expression boundary: substitution and numeric evaluation.

pub mod ast;
