//! Semantic analysis and code generation for a small C-like teaching
//! language, targeting an abstract stack-frame machine ("TM").
//!
//! This crate picks up where an upstream scanner+parser leaves off: it takes
//! an [`AstNode`] tree, resolves and type-checks every scope and identifier
//! in it (`semantic_analyser`), and lowers the result into TM instructions
//! (`backend`). The lexer, grammar parser, instruction pretty-printer, CLI
//! entry point, and listing sinks are all external collaborators this crate
//! does not own.

// Internal modules
mod compiler;

pub use compiler::{
    compile, ArithOp, AstNode, BaseType, CompileResult, Diagnostics, Operator, RelOp, ScopeId,
    SemanticError, Symbol, SymbolKind, SymbolTable, TraceFlags, TypeInfo,
};

pub use cminus_common::{ProgramCode, Register, RmOp, RoOp, TmInstruction};
