use std::fmt;
use strum_macros::{Display as StrumDisplay, EnumString};

/// Registers of the target stack machine.
///
/// Offsets are fixed by convention rather than chosen at runtime: `Fp` and `Gp`
/// anchor local and global addressing respectively, `Pc` is read and written
/// directly by jump instructions, and `Mp` holds the top of usable memory
/// loaded once by the prelude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register {
    Ac,
    Ac1,
    Fp,
    R3,
    R4,
    Gp,
    Mp,
    Pc,
}

impl Register {
    pub fn index(self) -> i64 {
        match self {
            Register::Ac => 0,
            Register::Ac1 => 1,
            Register::Fp => 2,
            Register::R3 => 3,
            Register::R4 => 4,
            Register::Gp => 5,
            Register::Mp => 6,
            Register::Pc => 7,
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// Register-only (triadic `r, s, t`) opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, StrumDisplay, EnumString)]
#[strum(serialize_all = "UPPERCASE")]
pub enum RoOp {
    Halt,
    In,
    Out,
    Add,
    Sub,
    Mul,
    Div,
}

/// Register-memory (`r, d(s)`) opcodes, including the conditional/absolute
/// jump family which is encoded as a register-memory instruction with `Pc`
/// as the base register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, StrumDisplay, EnumString)]
#[strum(serialize_all = "UPPERCASE")]
pub enum RmOp {
    Ld,
    Lda,
    Ldc,
    St,
    Jlt,
    Jle,
    Jgt,
    Jge,
    Jeq,
    Jne,
}

/// A single instruction of the target stack machine.
///
/// `Ro` carries three register operands; `Rm` carries a destination register,
/// a signed displacement, and a base register. Both shapes mirror the two
/// instruction formats of the machine's ISA directly, rather than collapsing
/// them into one operand-count-agnostic struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TmInstruction {
    Ro { op: RoOp, r: Register, s: Register, t: Register },
    Rm { op: RmOp, r: Register, d: i64, s: Register },
}

impl TmInstruction {
    pub fn ro(op: RoOp, r: Register, s: Register, t: Register) -> Self {
        TmInstruction::Ro { op, r, s, t }
    }

    pub fn rm(op: RmOp, r: Register, d: i64, s: Register) -> Self {
        TmInstruction::Rm { op, r, d, s }
    }
}

impl fmt::Display for TmInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TmInstruction::Ro { op, r, s, t } => write!(f, "{} {},{},{}", op, r, s, t),
            TmInstruction::Rm { op, r, d, s } => write!(f, "{} {},{}({})", op, r, d, s),
        }
    }
}
