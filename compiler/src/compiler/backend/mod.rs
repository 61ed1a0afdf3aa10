//! Code generation back end: the instruction emitter (C5), the function
//! address map (C6), and the AST-directed generator itself (C7).

mod codegen;
mod emitter;
mod function_address_map;

pub use codegen::generate;
pub use emitter::Emitter;
pub use function_address_map::{FunctionAddressMap, MISSING_FUNCTION};
