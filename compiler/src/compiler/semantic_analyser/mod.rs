//! Two-pass semantic analysis (C4): scope/symbol construction (pass 1) then
//! type-checking (pass 2), driven by explicit context values rather than the
//! process-wide cursors of the source this crate is modelled on (§9).

use super::ast::{ArithOp, AstNode, BaseType, Operator, RelOp, ScopeId, Symbol, SymbolKind, SymbolTable, TypeInfo};
use super::diagnostics::{Diagnostics, SemanticError};
use super::trace::TraceFlags;

struct Pass1Ctx {
    current_scope: ScopeId,
    /// Sticky flag set by a FUNCTION node, cleared by the next BLOCK it
    /// encounters, so that a function's body block reuses its scope rather
    /// than nesting a fresh one (§4.4).
    function_declared: bool,
    trace_analyze: bool,
}

fn seed_builtins(table: &mut SymbolTable) {
    let global = table.global_scope();
    let input_type = TypeInfo::function(TypeInfo::new(BaseType::Int));
    table.add_symbol(global, Symbol::new("input", SymbolKind::Function, input_type, 0));

    let output_type = TypeInfo::function(TypeInfo::new(BaseType::Void))
        .add_parameter(TypeInfo::new(BaseType::Int));
    table.add_symbol(global, Symbol::new("output", SymbolKind::Function, output_type, 0));
}

/// Runs both passes over `ast`, returning the populated symbol table and
/// whatever diagnostics either pass accumulated.
pub fn analyse(ast: &mut AstNode, trace: &TraceFlags) -> (SymbolTable, Diagnostics) {
    let mut table = SymbolTable::new();
    let mut diagnostics = Diagnostics::new();
    seed_builtins(&mut table);

    {
        let _span = trace
            .trace_analyze
            .then(|| tracing::debug_span!("semantic_analysis_pass1").entered());
        let mut ctx = Pass1Ctx {
            current_scope: table.global_scope(),
            function_declared: false,
            trace_analyze: trace.trace_analyze,
        };
        visit_pass1(ast, &mut table, &mut diagnostics, &mut ctx);
    }

    if !table.main_declared() {
        diagnostics.report(SemanticError::UndefinedMain);
    }

    {
        let _span = trace
            .trace_analyze
            .then(|| tracing::debug_span!("semantic_analysis_pass2").entered());
        let mut current_function_type: Option<TypeInfo> = None;
        visit_pass2(ast, &table, &mut diagnostics, &mut current_function_type);
    }

    (table, diagnostics)
}

fn visit_pass1(node: &mut AstNode, table: &mut SymbolTable, diagnostics: &mut Diagnostics, ctx: &mut Pass1Ctx) {
    match node {
        AstNode::Program { declarations } => {
            for decl in declarations.iter_mut() {
                visit_pass1(decl, table, diagnostics, ctx);
            }
        }

        AstNode::Function { name, params, return_type, body, line, scope } => {
            if table.find_symbol_in_scope(ctx.current_scope, name).is_some() {
                diagnostics.report(SemanticError::DuplicateFunction { line: *line });
                return;
            }

            let mut function_type = TypeInfo::function(return_type.clone());
            for param in params.iter() {
                if let AstNode::Param { type_info, .. } = param {
                    function_type = function_type.add_parameter(type_info.clone());
                }
            }

            table.add_symbol(
                ctx.current_scope,
                Symbol::new(name.clone(), SymbolKind::Function, function_type, *line),
            );
            table.add_reference(ctx.current_scope, name, *line);

            if name == "main" {
                table.set_main_declared();
            }

            if ctx.trace_analyze {
                tracing::debug!(function = %name, line = *line, "entering function scope");
            }

            let function_scope = table.create_child_scope(ctx.current_scope, name.clone());
            *scope = Some(function_scope);

            let saved_scope = ctx.current_scope;
            ctx.current_scope = function_scope;
            ctx.function_declared = true;

            for param in params.iter_mut() {
                visit_pass1(param, table, diagnostics, ctx);
            }
            visit_pass1(body, table, diagnostics, ctx);

            ctx.current_scope = saved_scope;
            if ctx.trace_analyze {
                tracing::debug!(function = %name, "leaving function scope");
            }
        }

        AstNode::Block { statements, line: _, scope } => {
            let created_scope;
            if ctx.function_declared {
                ctx.function_declared = false;
                *scope = Some(ctx.current_scope);
                created_scope = false;
            } else {
                let name = table.scope_name(ctx.current_scope).to_string();
                let new_scope = table.create_child_scope(ctx.current_scope, name);
                *scope = Some(new_scope);
                ctx.current_scope = new_scope;
                created_scope = true;
            }

            for statement in statements.iter_mut() {
                visit_pass1(statement, table, diagnostics, ctx);
            }

            if created_scope {
                ctx.current_scope = table.parent_of(ctx.current_scope).expect("block scope always has a parent");
            }
        }

        AstNode::Variable { name, element_type, array_size, line } => {
            if *element_type == BaseType::Void {
                diagnostics.report(SemanticError::VoidVariable { line: *line, name: name.clone() });
                return;
            }

            if let Some(existing) = table.find_symbol_in_scope(ctx.current_scope, name) {
                if existing.kind() != SymbolKind::Function {
                    diagnostics.report(SemanticError::DuplicateVariable { line: *line, name: name.clone() });
                    return;
                }
            }
            if let Some(existing) = table.find_symbol_in_scope(table.global_scope(), name) {
                if existing.kind() == SymbolKind::Function {
                    diagnostics.report(SemanticError::VariableRedeclaresFunction { line: *line, name: name.clone() });
                    return;
                }
            }

            let (kind, type_info) = match array_size {
                Some(size) => (SymbolKind::Array, TypeInfo::array_of(*element_type, *size)),
                None => (SymbolKind::Variable, TypeInfo::new(*element_type)),
            };
            table.add_symbol(ctx.current_scope, Symbol::new(name.clone(), kind, type_info, *line));
        }

        AstNode::Param { name, type_info, line } => {
            if table.is_global(ctx.current_scope) {
                diagnostics.report(SemanticError::ParamOutsideFunction { line: *line });
                return;
            }
            table.add_symbol(
                ctx.current_scope,
                Symbol::new(name.clone(), SymbolKind::Parameter, type_info.clone(), *line),
            );
        }

        AstNode::Identifier { name, index, line, resolved_type } => {
            match table.find_symbol(ctx.current_scope, name) {
                Some(symbol) => {
                    *resolved_type = Some(symbol.type_info().clone());
                    table.add_reference(ctx.current_scope, name, *line);
                }
                None => {
                    diagnostics.report(SemanticError::Undeclared { line: *line, name: name.clone() });
                }
            }
            if let Some(index) = index {
                visit_pass1(index, table, diagnostics, ctx);
            }
        }

        AstNode::Call { name, arguments, line, resolved_type } => {
            match table.find_symbol(ctx.current_scope, name) {
                Some(symbol) => {
                    *resolved_type = Some(symbol.type_info().clone());
                    table.add_reference(ctx.current_scope, name, *line);
                }
                None => {
                    diagnostics.report(SemanticError::Undeclared { line: *line, name: name.clone() });
                }
            }
            for argument in arguments.iter_mut() {
                visit_pass1(argument, table, diagnostics, ctx);
            }
        }

        AstNode::If { condition, then_branch, else_branch, .. } => {
            visit_pass1(condition, table, diagnostics, ctx);
            visit_pass1(then_branch, table, diagnostics, ctx);
            if let Some(else_branch) = else_branch {
                visit_pass1(else_branch, table, diagnostics, ctx);
            }
        }

        AstNode::While { condition, body, .. } => {
            visit_pass1(condition, table, diagnostics, ctx);
            visit_pass1(body, table, diagnostics, ctx);
        }

        AstNode::Return { expression, .. } => {
            if let Some(expression) = expression {
                visit_pass1(expression, table, diagnostics, ctx);
            }
        }

        AstNode::Assign { lhs, rhs, .. } => {
            visit_pass1(lhs, table, diagnostics, ctx);
            visit_pass1(rhs, table, diagnostics, ctx);
        }

        AstNode::Operator { lhs, rhs, .. } => {
            visit_pass1(lhs, table, diagnostics, ctx);
            visit_pass1(rhs, table, diagnostics, ctx);
        }

        AstNode::Constant { .. } => {}
    }
}

/// An `IDENTIFIER` node's attached `resolved_type` is always the *symbol's*
/// type — for an indexed reference (`a[0]`) that's the whole array type,
/// even though the value the reference actually denotes is one element of
/// it (§3: "an IDENTIFIER of the same name references it, and MAY carry a
/// child[0] index expression"). Every caller that wants the type of the
/// value an identifier node evaluates to, rather than the type of the
/// symbol it names, goes through this rather than reading `resolved_type`
/// directly.
fn identifier_value_type(index: &Option<Box<AstNode>>, resolved_type: &Option<TypeInfo>) -> Option<TypeInfo> {
    let resolved_type = resolved_type.as_ref()?;
    if index.is_some() {
        resolved_type.element_type().cloned()
    } else {
        Some(resolved_type.clone())
    }
}

/// `None` marks an operand kind that pass 2's binary-operand rule does not
/// accept at all (§4.4: "any other operand kind is an error"), in addition
/// to the case where the operand's attached type is simply not `INT`.
fn operand_base_type(node: &AstNode) -> Option<BaseType> {
    match node {
        AstNode::Identifier { index, resolved_type, .. } => {
            identifier_value_type(index, resolved_type).map(|t| t.base_type())
        }
        AstNode::Constant { .. } => Some(BaseType::Int),
        AstNode::Operator { result_type, .. } => result_type.as_ref().map(|t| t.base_type()),
        _ => None,
    }
}

fn visit_pass2(
    node: &mut AstNode,
    table: &SymbolTable,
    diagnostics: &mut Diagnostics,
    current_function_type: &mut Option<TypeInfo>,
) {
    match node {
        AstNode::Program { declarations } => {
            for decl in declarations.iter_mut() {
                visit_pass2(decl, table, diagnostics, current_function_type);
            }
        }

        AstNode::Function { return_type, body, .. } => {
            let saved = current_function_type.take();
            *current_function_type = Some(return_type.clone());
            visit_pass2(body, table, diagnostics, current_function_type);
            *current_function_type = saved;
        }

        AstNode::Block { statements, .. } => {
            for statement in statements.iter_mut() {
                visit_pass2(statement, table, diagnostics, current_function_type);
            }
        }

        AstNode::If { condition, then_branch, else_branch, line } => {
            visit_pass2(condition, table, diagnostics, current_function_type);
            if condition_base_type(condition) != Some(BaseType::Boolean) {
                diagnostics.report(SemanticError::ConditionNotBoolean { line: *line });
            }
            visit_pass2(then_branch, table, diagnostics, current_function_type);
            if let Some(else_branch) = else_branch {
                visit_pass2(else_branch, table, diagnostics, current_function_type);
            }
        }

        AstNode::While { condition, body, line } => {
            visit_pass2(condition, table, diagnostics, current_function_type);
            if condition_base_type(condition) != Some(BaseType::Boolean) {
                diagnostics.report(SemanticError::ConditionNotBoolean { line: *line });
            }
            visit_pass2(body, table, diagnostics, current_function_type);
        }

        AstNode::Return { expression, line } => {
            if let Some(expression) = expression {
                visit_pass2(expression, table, diagnostics, current_function_type);
            }
            let return_base = current_function_type.as_ref().map(|t| t.base_type());
            match (return_base, expression.is_some()) {
                (Some(base), false) if base != BaseType::Void => {
                    diagnostics.report(SemanticError::MissingReturnValue { line: *line });
                }
                (Some(BaseType::Void), true) => {
                    diagnostics.report(SemanticError::ReturnValueInVoidFunction { line: *line });
                }
                _ => {}
            }
        }

        AstNode::Assign { lhs, rhs, line } => {
            visit_pass2(lhs, table, diagnostics, current_function_type);
            visit_pass2(rhs, table, diagnostics, current_function_type);

            let lhs_type = match lhs.as_ref() {
                AstNode::Constant { .. } => {
                    diagnostics.report(SemanticError::AssignToConstant { line: *line });
                    return;
                }
                AstNode::Identifier { index, resolved_type, .. } => identifier_value_type(index, resolved_type),
                AstNode::Variable { element_type, array_size, .. } => Some(match array_size {
                    Some(size) => TypeInfo::array_of(*element_type, *size),
                    None => TypeInfo::new(*element_type),
                }),
                _ => {
                    diagnostics.report(SemanticError::InvalidAssignmentLhs { line: *line });
                    return;
                }
            };

            let rhs_type = match rhs.as_ref() {
                AstNode::Constant { .. } => Some(TypeInfo::new(BaseType::Int)),
                AstNode::Identifier { index, resolved_type, .. } => identifier_value_type(index, resolved_type),
                AstNode::Operator { result_type, .. } => result_type.clone(),
                AstNode::Call { resolved_type, .. } => {
                    let return_type = resolved_type.as_ref().and_then(|t| t.return_type()).cloned();
                    if let Some(return_type) = &return_type {
                        if return_type.base_type() == BaseType::Void {
                            diagnostics.report(SemanticError::VoidExpression { line: *line });
                            return;
                        }
                    }
                    return_type
                }
                _ => None,
            };

            if let (Some(lhs_type), Some(rhs_type)) = (lhs_type, rhs_type) {
                if lhs_type.base_type() != rhs_type.base_type() {
                    diagnostics.report(SemanticError::IncompatibleAssignment { line: *line });
                }
            }
        }

        AstNode::Operator { op, lhs, rhs, line, result_type } => {
            visit_pass2(lhs, table, diagnostics, current_function_type);
            visit_pass2(rhs, table, diagnostics, current_function_type);

            let lhs_type = operand_base_type(lhs);
            let rhs_type = operand_base_type(rhs);
            let operands_ok = lhs_type == Some(BaseType::Int) && rhs_type == Some(BaseType::Int);

            match op {
                Operator::Arith(ArithOp::Add | ArithOp::Sub | ArithOp::Mul | ArithOp::Div) => {
                    if !operands_ok {
                        diagnostics.report(SemanticError::ArithOperandNotInt { line: *line });
                    }
                    *result_type = Some(TypeInfo::new(BaseType::Int));
                }
                Operator::Rel(RelOp::Lt | RelOp::Gt | RelOp::Le | RelOp::Ge | RelOp::Eq | RelOp::Ne) => {
                    if !operands_ok {
                        diagnostics.report(SemanticError::RelOperandNotInt { line: *line });
                    }
                    *result_type = Some(TypeInfo::new(BaseType::Boolean));
                }
            }
        }

        AstNode::Call { arguments, .. } => {
            for argument in arguments.iter_mut() {
                visit_pass2(argument, table, diagnostics, current_function_type);
            }
        }

        AstNode::Identifier { index, .. } => {
            if let Some(index) = index {
                visit_pass2(index, table, diagnostics, current_function_type);
            }
        }

        AstNode::Variable { .. } | AstNode::Param { .. } | AstNode::Constant { .. } => {}
    }
}

/// A condition's boolean-ness is read off whichever node kind it is —
/// almost always an `Operator` relational expression post pass 2, but the
/// grammar does not forbid any expression kind from sitting in a condition
/// slot, so this mirrors `operand_base_type`'s resolution rather than
/// assuming `Operator`.
fn condition_base_type(node: &AstNode) -> Option<BaseType> {
    match node {
        AstNode::Operator { result_type, .. } => result_type.as_ref().map(|t| t.base_type()),
        AstNode::Identifier { index, resolved_type, .. } => {
            identifier_value_type(index, resolved_type).map(|t| t.base_type())
        }
        AstNode::Constant { .. } => Some(BaseType::Int),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::ast::{ArithOp, Operator, RelOp};

    fn ident(name: &str, line: u32) -> AstNode {
        AstNode::Identifier { name: name.into(), index: None, line, resolved_type: None }
    }

    fn simple_main(body: Vec<AstNode>) -> AstNode {
        AstNode::Program {
            declarations: vec![AstNode::Function {
                name: "main".into(),
                params: vec![],
                return_type: TypeInfo::new(BaseType::Void),
                body: Box::new(AstNode::Block { statements: body, line: 1, scope: None }),
                line: 1,
                scope: None,
            }],
        }
    }

    #[test]
    fn undeclared_identifier_is_reported() {
        let mut ast = simple_main(vec![AstNode::Assign {
            lhs: Box::new(AstNode::Identifier { name: "x".into(), index: None, line: 2, resolved_type: None }),
            rhs: Box::new(ident("y", 2)),
            line: 2,
        }]);
        let (_table, diagnostics) = analyse(&mut ast, &TraceFlags::none());
        assert!(diagnostics.has_error());
        assert!(diagnostics
            .errors()
            .iter()
            .any(|e| matches!(e, SemanticError::Undeclared { name, .. } if name == "y")));
    }

    #[test]
    fn missing_main_is_reported() {
        let mut ast = AstNode::Program { declarations: vec![] };
        let (_table, diagnostics) = analyse(&mut ast, &TraceFlags::none());
        assert!(diagnostics.errors().iter().any(|e| matches!(e, SemanticError::UndefinedMain)));
    }

    #[test]
    fn well_typed_program_has_no_errors() {
        let mut ast = simple_main(vec![
            AstNode::Variable { name: "x".into(), element_type: BaseType::Int, array_size: None, line: 2 },
            AstNode::Assign {
                lhs: Box::new(AstNode::Identifier { name: "x".into(), index: None, line: 3, resolved_type: None }),
                rhs: Box::new(AstNode::Operator {
                    op: Operator::Arith(ArithOp::Add),
                    lhs: Box::new(AstNode::Constant { value: 3, line: 3 }),
                    rhs: Box::new(AstNode::Constant { value: 4, line: 3 }),
                    line: 3,
                    result_type: None,
                }),
                line: 3,
            },
        ]);
        let (_table, diagnostics) = analyse(&mut ast, &TraceFlags::none());
        assert!(!diagnostics.has_error());
    }

    #[test]
    fn array_element_access_is_typed_as_int_not_array() {
        // void main(void) { int a[3]; a[0] = 1; a[2] = a[0] + 4; output(a[2]); }
        fn indexed(name: &str, index: i64, line: u32) -> AstNode {
            AstNode::Identifier {
                name: name.into(),
                index: Some(Box::new(AstNode::Constant { value: index, line })),
                line,
                resolved_type: None,
            }
        }

        let mut ast = simple_main(vec![
            AstNode::Variable { name: "a".into(), element_type: BaseType::Int, array_size: Some(3), line: 2 },
            AstNode::Assign {
                lhs: Box::new(indexed("a", 0, 3)),
                rhs: Box::new(AstNode::Constant { value: 1, line: 3 }),
                line: 3,
            },
            AstNode::Assign {
                lhs: Box::new(indexed("a", 2, 4)),
                rhs: Box::new(AstNode::Operator {
                    op: Operator::Arith(ArithOp::Add),
                    lhs: Box::new(indexed("a", 0, 4)),
                    rhs: Box::new(AstNode::Constant { value: 4, line: 4 }),
                    line: 4,
                    result_type: None,
                }),
                line: 4,
            },
            AstNode::Call {
                name: "output".into(),
                arguments: vec![indexed("a", 2, 5)],
                line: 5,
                resolved_type: None,
            },
        ]);
        let (_table, diagnostics) = analyse(&mut ast, &TraceFlags::none());
        assert!(!diagnostics.has_error(), "unexpected errors: {:?}", diagnostics.errors());
    }

    #[test]
    fn non_boolean_condition_is_reported() {
        let mut ast = simple_main(vec![AstNode::If {
            condition: Box::new(AstNode::Operator {
                op: Operator::Arith(ArithOp::Add),
                lhs: Box::new(AstNode::Constant { value: 1, line: 2 }),
                rhs: Box::new(AstNode::Constant { value: 2, line: 2 }),
                line: 2,
                result_type: None,
            }),
            then_branch: Box::new(AstNode::Block { statements: vec![], line: 2, scope: None }),
            else_branch: None,
            line: 2,
        }]);
        let (_table, diagnostics) = analyse(&mut ast, &TraceFlags::none());
        assert!(diagnostics.errors().iter().any(|e| matches!(e, SemanticError::ConditionNotBoolean { .. })));
    }

    #[test]
    fn void_call_on_rhs_is_rejected() {
        let mut ast = AstNode::Program {
            declarations: vec![
                AstNode::Function {
                    name: "f".into(),
                    params: vec![],
                    return_type: TypeInfo::new(BaseType::Void),
                    body: Box::new(AstNode::Block { statements: vec![], line: 1, scope: None }),
                    line: 1,
                    scope: None,
                },
                AstNode::Function {
                    name: "main".into(),
                    params: vec![],
                    return_type: TypeInfo::new(BaseType::Void),
                    body: Box::new(AstNode::Block {
                        statements: vec![
                            AstNode::Variable { name: "x".into(), element_type: BaseType::Int, array_size: None, line: 2 },
                            AstNode::Assign {
                                lhs: Box::new(AstNode::Identifier { name: "x".into(), index: None, line: 3, resolved_type: None }),
                                rhs: Box::new(AstNode::Call { name: "f".into(), arguments: vec![], line: 3, resolved_type: None }),
                                line: 3,
                            },
                        ],
                        line: 2,
                        scope: None,
                    }),
                    line: 2,
                    scope: None,
                },
            ],
        };
        let (_table, diagnostics) = analyse(&mut ast, &TraceFlags::none());
        assert!(diagnostics.errors().iter().any(|e| matches!(e, SemanticError::VoidExpression { .. })));
    }
}
