pub mod ast_node;
pub mod datatype;
pub mod symbol_table;

pub use ast_node::{ArithOp, AstNode, Operator, RelOp};
pub use datatype::{BaseType, TypeInfo};
pub use symbol_table::{ScopeId, Symbol, SymbolKind, SymbolTable};
