use crate::instructions::TmInstruction;
use std::collections::HashMap;
use std::fmt;

/// Program code decorations hold all non-functional data related to a
/// compiled program: presently just line comments attached to instruction
/// addresses.
#[derive(Debug, Default, Clone)]
pub struct ProgramCodeDecorations {
    line_comments: HashMap<usize, Vec<String>>,
}

impl ProgramCodeDecorations {
    fn new() -> Self {
        Default::default()
    }

    /// Add a comment to program code at an instruction address. Multiple
    /// comments can be attached to the same address.
    fn add_comment(&mut self, address: usize, comment: String) {
        self.line_comments.entry(address).or_default().push(comment);
    }

    fn get_comments(&self, address: usize) -> Option<&Vec<String>> {
        self.line_comments.get(&address)
    }
}

/// ProgramCode is the final output of compilation: an address-indexed list of
/// machine instructions plus the comments attached during emission.
///
/// Unlike a machine with separate VALUE/OP streams, a single instruction here
/// already carries its own operands (`TmInstruction`), so there is no parallel
/// array to keep aligned.
#[derive(Debug, Clone)]
pub struct ProgramCode {
    instructions: Vec<TmInstruction>,
    render_decorations: bool,
    decorations: ProgramCodeDecorations,
}

impl ProgramCode {
    /// Generates an empty program, ready to be grown address by address.
    pub fn new() -> Self {
        ProgramCode {
            instructions: Vec::new(),
            render_decorations: false,
            decorations: ProgramCodeDecorations::new(),
        }
    }

    pub fn decorated(mut self) -> Self {
        self.render_decorations = true;
        self
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn instructions(&self) -> &[TmInstruction] {
        &self.instructions
    }

    /// Appends an instruction, returning the address it was written to.
    pub fn push(&mut self, instruction: TmInstruction) -> usize {
        let address = self.instructions.len();
        self.instructions.push(instruction);
        address
    }

    /// Reserves `count` addresses filled with a placeholder, returning the
    /// first reserved address. Used by the emitter's back-patching primitive
    /// before the real instruction at that address is known.
    pub fn reserve(&mut self, count: usize, placeholder: TmInstruction) -> usize {
        let first = self.instructions.len();
        for _ in 0..count {
            self.instructions.push(placeholder);
        }
        first
    }

    /// Overwrites the instruction at a previously reserved address.
    pub fn set(&mut self, address: usize, instruction: TmInstruction) {
        self.instructions[address] = instruction;
    }

    pub fn push_comment(&mut self, comment: String) {
        self.decorations.add_comment(self.instructions.len(), comment);
    }

    pub fn add_comment_at(&mut self, address: usize, comment: String) {
        self.decorations.add_comment(address, comment);
    }
}

impl Default for ProgramCode {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for ProgramCode {
    fn eq(&self, other: &Self) -> bool {
        self.instructions == other.instructions
    }
}
impl Eq for ProgramCode {}

impl fmt::Display for ProgramCode {
    /// Each line represents one instruction, addressed from zero. Lines
    /// beginning with `*` are comments and are only emitted when the program
    /// has been `decorated()`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (address, instruction) in self.instructions.iter().enumerate() {
            if self.render_decorations {
                if let Some(comments) = self.decorations.get_comments(address) {
                    for comment in comments {
                        writeln!(f, "* {}", comment)?;
                    }
                }
            }
            writeln!(f, "{}: {}", address, instruction)?;
        }
        Ok(())
    }
}
