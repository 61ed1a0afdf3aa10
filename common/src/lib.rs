pub mod instructions;
pub mod program_code;

pub use instructions::{Register, RmOp, RoOp, TmInstruction};
pub use program_code::{ProgramCode, ProgramCodeDecorations};
