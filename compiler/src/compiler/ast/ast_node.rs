use super::datatype::TypeInfo;
use super::symbol_table::ScopeId;

/// Arithmetic operators, all requiring `INT` operands and producing `INT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// Relational operators, all requiring `INT` operands and producing the
/// intermediate `BOOLEAN` type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelOp {
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Arith(ArithOp),
    Rel(RelOp),
}

/// The abstract syntax tree node.
///
/// Each kind is its own enum variant carrying its own named fields, rather
/// than a single struct with three generic, positionally-interpreted child
/// slots — Rust's tagged unions make the original's `createNode`/`addChild`
/// generic-tree shape unnecessary: a `FUNCTION` node simply owns a `body`
/// field of type `Box<AstNode>`, a `CALL` node owns an `arguments: Vec<AstNode>`
/// field, and so on.
///
/// A handful of fields are populated only after semantic analysis has run
/// (`scope`, `resolved_type`, `result_type`); they start as `None` when the
/// tree is constructed and are filled in by [`crate::compiler::semantic_analyser`].
#[derive(Debug, Clone)]
pub enum AstNode {
    /// The root of a compilation unit: an ordered list of global `Variable`
    /// and `Function` declarations.
    Program { declarations: Vec<AstNode> },

    Function {
        name: String,
        params: Vec<AstNode>,
        return_type: TypeInfo,
        body: Box<AstNode>,
        line: u32,
        /// The scope created for this function's parameters and top-level
        /// locals, recorded directly on the node by pass 1 rather than
        /// re-derived later by comparing names.
        scope: Option<ScopeId>,
    },

    /// A scalar or array variable declaration. `array_size.is_some()` marks
    /// an array declaration, matching it to the grammar's `[ NUM ]` suffix.
    Variable {
        name: String,
        element_type: super::datatype::BaseType,
        array_size: Option<usize>,
        line: u32,
    },

    Param {
        name: String,
        type_info: TypeInfo,
        line: u32,
    },

    Block {
        statements: Vec<AstNode>,
        line: u32,
        /// Either the enclosing function's own scope (reused, when this
        /// block is a function body) or a freshly created nested scope.
        scope: Option<ScopeId>,
    },

    If {
        condition: Box<AstNode>,
        then_branch: Box<AstNode>,
        else_branch: Option<Box<AstNode>>,
        line: u32,
    },

    While {
        condition: Box<AstNode>,
        body: Box<AstNode>,
        line: u32,
    },

    Return {
        expression: Option<Box<AstNode>>,
        line: u32,
    },

    /// `lhs` is expected to be an `Identifier`, optionally indexed; any other
    /// kind is a semantic error reported by pass 2 (§7), not a parse-time
    /// invariant enforced by this type.
    Assign {
        lhs: Box<AstNode>,
        rhs: Box<AstNode>,
        line: u32,
    },

    Call {
        name: String,
        arguments: Vec<AstNode>,
        line: u32,
        /// The callee's full function type, resolved by pass 1.
        resolved_type: Option<TypeInfo>,
    },

    Operator {
        op: Operator,
        lhs: Box<AstNode>,
        rhs: Box<AstNode>,
        line: u32,
        result_type: Option<TypeInfo>,
    },

    Constant { value: i64, line: u32 },

    /// A reference to a declared variable or parameter, optionally indexed
    /// (`index.is_some()`) into an array.
    Identifier {
        name: String,
        index: Option<Box<AstNode>>,
        line: u32,
        resolved_type: Option<TypeInfo>,
    },
}

impl AstNode {
    /// The source line this node was built from, for diagnostics.
    pub fn line(&self) -> u32 {
        match self {
            AstNode::Program { .. } => 0,
            AstNode::Function { line, .. }
            | AstNode::Variable { line, .. }
            | AstNode::Param { line, .. }
            | AstNode::Block { line, .. }
            | AstNode::If { line, .. }
            | AstNode::While { line, .. }
            | AstNode::Return { line, .. }
            | AstNode::Assign { line, .. }
            | AstNode::Call { line, .. }
            | AstNode::Operator { line, .. }
            | AstNode::Constant { line, .. }
            | AstNode::Identifier { line, .. } => *line,
        }
    }

    /// The node's positional/sequence children, in canonical order, for
    /// kinds that carry no scope/symbol semantics of their own. Generic
    /// recursion in the analyser and code generator falls back to this
    /// instead of special-casing every structural node kind.
    pub fn children_mut(&mut self) -> Vec<&mut AstNode> {
        match self {
            AstNode::Program { declarations } => declarations.iter_mut().collect(),
            AstNode::Function { params, body, .. } => {
                let mut kids: Vec<&mut AstNode> = params.iter_mut().collect();
                kids.push(body.as_mut());
                kids
            }
            AstNode::Variable { .. } | AstNode::Param { .. } | AstNode::Constant { .. } => vec![],
            AstNode::Block { statements, .. } => statements.iter_mut().collect(),
            AstNode::If { condition, then_branch, else_branch, .. } => {
                let mut kids = vec![condition.as_mut(), then_branch.as_mut()];
                if let Some(else_branch) = else_branch {
                    kids.push(else_branch.as_mut());
                }
                kids
            }
            AstNode::While { condition, body, .. } => vec![condition.as_mut(), body.as_mut()],
            AstNode::Return { expression, .. } => {
                expression.as_mut().map(|e| vec![e.as_mut()]).unwrap_or_default()
            }
            AstNode::Assign { lhs, rhs, .. } => vec![lhs.as_mut(), rhs.as_mut()],
            AstNode::Call { arguments, .. } => arguments.iter_mut().collect(),
            AstNode::Operator { lhs, rhs, .. } => vec![lhs.as_mut(), rhs.as_mut()],
            AstNode::Identifier { index, .. } => {
                index.as_mut().map(|i| vec![i.as_mut()]).unwrap_or_default()
            }
        }
    }
}
