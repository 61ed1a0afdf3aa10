use thiserror::Error;

/// One variant per error kind named in §7 of the specification this crate
/// implements. Every message renders as `"Semantic error at line N: ..."` or
/// `"Type error at line N: ..."`, matching the original's textual contract,
/// except the one program-level error which has no line to attach to.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SemanticError {
    #[error("Semantic error at line {line}: Function already declared in this scope")]
    DuplicateFunction { line: u32 },

    #[error("Semantic error at line {line}: variable '{name}' already declared in this scope")]
    DuplicateVariable { line: u32, name: String },

    #[error("Semantic error at line {line}: '{name}' already declared as a function in this scope")]
    VariableRedeclaresFunction { line: u32, name: String },

    #[error("Semantic error at line {line}: variable '{name}' may not be declared void")]
    VoidVariable { line: u32, name: String },

    #[error("Semantic error at line {line}: parameter declared outside of a function")]
    ParamOutsideFunction { line: u32 },

    #[error("Semantic error at line {line}: '{name}' was not declared in this scope")]
    Undeclared { line: u32, name: String },

    #[error("Type error at line {line}: operand of arithmetic operator must be of type int")]
    ArithOperandNotInt { line: u32 },

    #[error("Type error at line {line}: operand of relational operator must be of type int")]
    RelOperandNotInt { line: u32 },

    #[error("Type error at line {line}: condition must be a boolean expression")]
    ConditionNotBoolean { line: u32 },

    #[error("Type error at line {line}: assignment to a constant")]
    AssignToConstant { line: u32 },

    #[error("Type error at line {line}: invalid left-hand side in assignment")]
    InvalidAssignmentLhs { line: u32 },

    #[error("Type error at line {line}: incompatible types in assignment")]
    IncompatibleAssignment { line: u32 },

    #[error("Type error at line {line}: invalid use of void expression")]
    VoidExpression { line: u32 },

    #[error("Type error at line {line}: missing return value")]
    MissingReturnValue { line: u32 },

    #[error("Type error at line {line}: return statement with return value in void function")]
    ReturnValueInVoidFunction { line: u32 },

    #[error("undefined reference to 'main'")]
    UndefinedMain,
}

/// The original's global `Error` flag, realised as a non-unwinding sink
/// rather than a process-wide boolean (§4.8). Reporting into it never
/// aborts the traversal in progress; the caller decides, per §7's policy,
/// whether to keep recursing into the current subtree.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    errors: Vec<SemanticError>,
    has_error: bool,
}

impl Diagnostics {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn report(&mut self, error: SemanticError) {
        self.has_error = true;
        self.errors.push(error);
    }

    pub fn has_error(&self) -> bool {
        self.has_error
    }

    pub fn errors(&self) -> &[SemanticError] {
        &self.errors
    }
}

impl std::fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for error in &self.errors {
            writeln!(f, "{}", error)?;
        }
        Ok(())
    }
}
