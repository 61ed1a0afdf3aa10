//! Single-pass code generator (C7): walks the analysed AST once and emits TM
//! instructions through the [`Emitter`], consulting the [`SymbolTable`] left
//! behind by [`crate::compiler::semantic_analyser`] and writing frame offsets
//! back into it as declarations are visited (§3, §4.7).

use cminus_common::{ProgramCode, Register, RmOp, RoOp};

use super::emitter::Emitter;
use super::function_address_map::FunctionAddressMap;
use crate::compiler::ast::{ArithOp, AstNode, BaseType, Operator, RelOp, ScopeId, SymbolTable, TypeInfo};
use crate::compiler::trace::TraceFlags;

/// Bias applied to an FP-relative frame offset so it decodes to an absolute
/// memory address; globals addressed through GP need no such bias (§4.7).
const MAX_MEMORY: i64 = 1023;

/// Start of a function's own temporaries/locals, growing downward. Mirrors
/// the original's `initFO`.
const INIT_FO: i64 = -2;

/// Offset of the saved caller FP within a callee's frame.
const OFP_FO: i64 = 0;

/// Offset of the return address within a callee's frame.
const RET_FO: i64 = -1;

struct CodegenContext {
    current_scope: ScopeId,
    /// Shared across global declarations and every function body in turn,
    /// reset to `INIT_FO` at the start of each function — mirroring the
    /// original's single static `tmpOffset` (§4.7).
    tmp_offset: i64,
    trace_code: bool,
    functions: FunctionAddressMap,
}

/// Generates TM code for the whole program, returning the finished
/// instruction stream. Runs unconditionally regardless of any diagnostics
/// accumulated during analysis (§4.10): a caller that wants to gate code
/// generation on a clean analysis checks `Diagnostics::has_error` itself.
pub fn generate(ast: &AstNode, table: &mut SymbolTable, trace: &TraceFlags) -> ProgramCode {
    let _span = trace.trace_code.then(|| tracing::debug_span!("code_generation").entered());

    let mut emitter = Emitter::new();
    let mut ctx = CodegenContext {
        current_scope: table.global_scope(),
        tmp_offset: INIT_FO,
        trace_code: trace.trace_code,
        functions: FunctionAddressMap::new(),
    };

    emitter.emit_comment("Standard prelude:");
    emitter.emit_rm(RmOp::Ld, Register::Mp, 0, Register::Ac, "load maxaddress from location 0");
    emitter.emit_rm(RmOp::Ld, Register::Fp, 0, Register::Ac, "load maxaddress from location 0");
    emitter.emit_rm(RmOp::St, Register::Ac, 0, Register::Ac, "clear location 0");
    emitter.emit_comment("End of standard prelude.");

    let main_jump_slot = emitter.emit_skip(1);

    let declarations = match ast {
        AstNode::Program { declarations } => declarations,
        _ => return emitter.into_program(),
    };

    for decl in declarations {
        match decl {
            AstNode::Variable { .. } => gen_variable(decl, table, &mut emitter, &mut ctx),
            AstNode::Function { name, params, return_type, body, scope, .. } => {
                gen_function(name, params, return_type, body, *scope, main_jump_slot, table, &mut emitter, &mut ctx)
            }
            _ => {}
        }
    }

    emitter.emit_comment("End of execution.");
    emitter.emit_ro(RoOp::Halt, Register::Ac, Register::Ac, Register::Ac, "");
    emitter.into_program()
}

fn gen_function(
    name: &str,
    params: &[AstNode],
    return_type: &TypeInfo,
    body: &AstNode,
    scope: Option<ScopeId>,
    main_jump_slot: usize,
    table: &mut SymbolTable,
    emitter: &mut Emitter,
    ctx: &mut CodegenContext,
) {
    let function_scope = scope.expect("scope recorded by semantic analysis");
    let saved_scope = ctx.current_scope;
    ctx.current_scope = function_scope;
    ctx.tmp_offset = INIT_FO;

    let entry = emitter.current_address();
    ctx.functions.insert(name, entry);

    if ctx.trace_code {
        tracing::debug!(function = %name, entry, "entering function body");
    }

    if name == "main" {
        emitter.patch(main_jump_slot, |e| {
            e.emit_rm_abs(RmOp::Lda, Register::Pc, entry, "jump to main");
        });
        for param in params {
            gen_param(param, table, ctx);
        }
        gen_block_body(body, table, emitter, ctx);
    } else {
        emitter.emit_rm(RmOp::St, Register::Ac, RET_FO, Register::Fp, "store return address");
        for param in params {
            gen_param(param, table, ctx);
        }
        gen_block_body(body, table, emitter, ctx);
        if return_type.base_type() == BaseType::Void {
            emit_epilogue(emitter);
        }
    }

    if ctx.trace_code {
        tracing::debug!(function = %name, "leaving function body");
    }
    ctx.current_scope = saved_scope;
}

/// Generates a function body's block without entering a fresh scope — the
/// scope was already created and recorded by pass 1 (§4.4), and is entered
/// by `gen_function` itself.
fn gen_block_body(body: &AstNode, table: &mut SymbolTable, emitter: &mut Emitter, ctx: &mut CodegenContext) {
    match body {
        AstNode::Block { statements, .. } => {
            for statement in statements {
                gen_node(statement, table, emitter, ctx);
            }
        }
        other => gen_node(other, table, emitter, ctx),
    }
}

fn emit_epilogue(emitter: &mut Emitter) {
    emitter.emit_rm(RmOp::Lda, Register::Ac1, OFP_FO, Register::Fp, "save current FP into AC1");
    emitter.emit_rm(RmOp::Ld, Register::Fp, OFP_FO, Register::Fp, "restore old FP");
    emitter.emit_rm(RmOp::Ld, Register::Pc, RET_FO, Register::Ac1, "return to caller");
}

fn gen_variable(node: &AstNode, table: &mut SymbolTable, emitter: &mut Emitter, ctx: &mut CodegenContext) {
    let AstNode::Variable { name, array_size, .. } = node else { return };
    let is_global = table.is_global(ctx.current_scope);

    let offset = match array_size {
        Some(size) => {
            let base = ctx.tmp_offset;
            if is_global {
                emitter.emit_rm(RmOp::Ldc, Register::Gp, 0, Register::Ac, "load GP");
                emitter.emit_rm(RmOp::Lda, Register::Ac, base, Register::Gp, "load global vector");
                emitter.emit_rm(RmOp::St, Register::Ac, base, Register::Gp, "store global vector");
            } else {
                emitter.emit_rm(RmOp::Lda, Register::Ac, base, Register::Fp, "load local vector");
                emitter.emit_rm(RmOp::St, Register::Ac, base, Register::Fp, "store local vector");
            }
            ctx.tmp_offset -= *size as i64 + 1;
            base
        }
        None => {
            ctx.tmp_offset -= 1;
            ctx.tmp_offset
        }
    };

    if let Some(symbol) = table.find_symbol_in_scope_mut(ctx.current_scope, name) {
        symbol.set_offset(offset);
    }
}

fn gen_param(node: &AstNode, table: &mut SymbolTable, ctx: &mut CodegenContext) {
    let AstNode::Param { name, .. } = node else { return };
    ctx.tmp_offset -= 1;
    let offset = ctx.tmp_offset;
    if let Some(symbol) = table.find_symbol_in_scope_mut(ctx.current_scope, name) {
        symbol.set_offset(offset);
    }
}

fn symbol_offset(table: &SymbolTable, scope: ScopeId, name: &str) -> i64 {
    table.find_symbol(scope, name).and_then(|s| s.offset()).unwrap_or(0)
}

/// Whether `name`, referenced from `scope`, was declared at global scope.
///
/// This is a property of where the symbol was *declared*, not of the scope
/// the reference happens to sit in: a global referenced from deep inside a
/// function body must still be addressed through GP, matching the GP-based
/// addressing `gen_variable` emitted for it at declaration time (§4.7, §6).
fn is_global_symbol(table: &SymbolTable, scope: ScopeId, name: &str) -> bool {
    table.scope_owning(scope, name).map(|owner| table.is_global(owner)).unwrap_or(false)
}

/// Loads a declared scalar's stored value, or (for an array) its stored base
/// address, into `target`. Globals reload `GP` to the constant zero first
/// (§4.7: "the original literally reloads GP to the constant zero before
/// every global access").
fn load_symbol_value(offset: i64, is_global: bool, target: Register, emitter: &mut Emitter, comment: &str) {
    if is_global {
        emitter.emit_rm(RmOp::Ldc, Register::Gp, 0, Register::Ac, "load GP");
        emitter.emit_rm(RmOp::Ld, target, offset, Register::Gp, comment);
    } else {
        emitter.emit_rm(RmOp::Ld, target, offset - MAX_MEMORY, Register::Fp, comment);
    }
}

/// Generates an array index into `target`, restricted to the two operand
/// kinds the original's own index handling accepts: a literal constant
/// (folded inline) or a plain scalar identifier (loaded from its own slot).
fn gen_index_into(index: &AstNode, target: Register, table: &SymbolTable, ctx: &CodegenContext, emitter: &mut Emitter) {
    match index {
        AstNode::Constant { value, .. } => {
            emitter.emit_rm(RmOp::Ldc, target, *value, Register::Ac, "load constant index");
        }
        AstNode::Identifier { name, .. } => {
            let is_global = is_global_symbol(table, ctx.current_scope, name);
            let offset = symbol_offset(table, ctx.current_scope, name);
            load_symbol_value(offset, is_global, target, emitter, "load index");
        }
        _ => emitter.emit_comment("unsupported index expression"),
    }
}

/// Loads an identifier's value (scalar) or its element's value (indexed
/// array) into `AC`.
fn gen_identifier(name: &str, index: &Option<Box<AstNode>>, table: &SymbolTable, ctx: &CodegenContext, emitter: &mut Emitter) {
    let is_global = is_global_symbol(table, ctx.current_scope, name);
    let offset = symbol_offset(table, ctx.current_scope, name);

    match index {
        Some(index) => {
            load_symbol_value(offset, is_global, Register::Ac, emitter, "get vector's address");
            gen_index_into(index, Register::Ac1, table, ctx, emitter);
            emitter.emit_rm(RmOp::Ldc, Register::R3, 1, Register::Ac, "load constant 1");
            emitter.emit_ro(RoOp::Add, Register::Ac1, Register::Ac1, Register::R3, "adjust array index");
            emitter.emit_ro(RoOp::Sub, Register::Ac, Register::Ac, Register::Ac1, "compute address of array element");
            emitter.emit_rm(RmOp::Ld, Register::Ac, 0, Register::Ac, "load value from array element");
        }
        None => load_symbol_value(offset, is_global, Register::Ac, emitter, "get variable's value"),
    }
}

/// Evaluates a binary operator's single operand, restricted to the kinds
/// pass 2 allows there (§4.4): a nested operator recurses fully, a constant
/// or identifier loads directly.
fn gen_operand(node: &AstNode, table: &mut SymbolTable, emitter: &mut Emitter, ctx: &mut CodegenContext) {
    match node {
        AstNode::Operator { .. } => gen_node(node, table, emitter, ctx),
        AstNode::Constant { value, .. } => {
            emitter.emit_rm(RmOp::Ldc, Register::Ac, *value, Register::Ac, "load const");
        }
        AstNode::Identifier { name, index, .. } => gen_identifier(name, index, table, ctx, emitter),
        _ => emitter.emit_comment("unsupported operand"),
    }
}

fn rel_jump_op(op: RelOp) -> RmOp {
    match op {
        RelOp::Lt => RmOp::Jlt,
        RelOp::Gt => RmOp::Jgt,
        RelOp::Le => RmOp::Jle,
        RelOp::Ge => RmOp::Jge,
        RelOp::Eq => RmOp::Jeq,
        RelOp::Ne => RmOp::Jne,
    }
}

fn gen_node(node: &AstNode, table: &mut SymbolTable, emitter: &mut Emitter, ctx: &mut CodegenContext) {
    match node {
        AstNode::Program { .. } | AstNode::Function { .. } => {
            // Only reached for a malformed tree; top-level declarations are
            // dispatched by `generate` itself.
        }

        AstNode::Variable { .. } => gen_variable(node, table, emitter, ctx),
        AstNode::Param { .. } => gen_param(node, table, ctx),

        AstNode::Block { statements, scope, .. } => {
            let saved = ctx.current_scope;
            if let Some(scope) = scope {
                ctx.current_scope = *scope;
            }
            for statement in statements {
                gen_node(statement, table, emitter, ctx);
            }
            ctx.current_scope = saved;
        }

        AstNode::Identifier { name, index, .. } => gen_identifier(name, index, table, ctx, emitter),

        AstNode::Constant { value, .. } => {
            emitter.emit_rm(RmOp::Ldc, Register::Ac, *value, Register::Ac, "load const");
        }

        AstNode::Call { name, arguments, .. } => gen_call(name, arguments, table, emitter, ctx),

        AstNode::Assign { lhs, rhs, .. } => gen_assign(lhs, rhs, table, emitter, ctx),

        AstNode::If { condition, then_branch, else_branch, .. } => {
            gen_node(condition, table, emitter, ctx);
            let false_slot = emitter.emit_skip(1);
            gen_node(then_branch, table, emitter, ctx);
            let end_slot = emitter.emit_skip(1);

            emitter.patch(false_slot, |e| {
                e.emit_rm_abs(RmOp::Jeq, Register::Ac, end_slot + 1, "if: jmp to else");
            });
            if let Some(else_branch) = else_branch {
                gen_node(else_branch, table, emitter, ctx);
            }
            let after = emitter.current_address();
            emitter.patch(end_slot, |e| {
                e.emit_rm_abs(RmOp::Lda, Register::Pc, after, "jmp to end");
            });
        }

        AstNode::While { condition, body, .. } => {
            let start = emitter.current_address();
            gen_node(condition, table, emitter, ctx);
            let exit_slot = emitter.emit_skip(1);
            gen_node(body, table, emitter, ctx);
            emitter.emit_rm_abs(RmOp::Lda, Register::Pc, start, "while: jmp back to start of body");
            let after = emitter.current_address();
            emitter.patch(exit_slot, |e| {
                e.emit_rm_abs(RmOp::Jeq, Register::Ac, after, "while: jmp to end");
            });
        }

        AstNode::Return { expression, .. } => {
            if let Some(expression) = expression {
                gen_node(expression, table, emitter, ctx);
            }
            emit_epilogue(emitter);
        }

        AstNode::Operator { op, lhs, rhs, .. } => {
            gen_operand(lhs, table, emitter, ctx);
            emitter.emit_rm(RmOp::St, Register::Ac, ctx.tmp_offset, Register::Fp, "op: push left");
            ctx.tmp_offset -= 1;

            gen_operand(rhs, table, emitter, ctx);
            ctx.tmp_offset += 1;
            emitter.emit_rm(RmOp::Ld, Register::Ac1, ctx.tmp_offset, Register::Fp, "op: load left");

            match op {
                Operator::Arith(arith) => {
                    let op = match arith {
                        ArithOp::Add => RoOp::Add,
                        ArithOp::Sub => RoOp::Sub,
                        ArithOp::Mul => RoOp::Mul,
                        ArithOp::Div => RoOp::Div,
                    };
                    emitter.emit_ro(op, Register::Ac, Register::Ac1, Register::Ac, "op");
                }
                Operator::Rel(rel) => {
                    emitter.emit_ro(RoOp::Sub, Register::Ac, Register::Ac1, Register::Ac, "op");
                    emitter.emit_rm(rel_jump_op(*rel), Register::Ac, 2, Register::Pc, "br if true");
                    emitter.emit_rm(RmOp::Ldc, Register::Ac, 0, Register::Ac, "false case");
                    emitter.emit_rm(RmOp::Lda, Register::Pc, 1, Register::Pc, "unconditional jmp");
                    emitter.emit_rm(RmOp::Ldc, Register::Ac, 1, Register::Ac, "true case");
                }
            }
        }
    }
}

fn gen_call(name: &str, arguments: &[AstNode], table: &mut SymbolTable, emitter: &mut Emitter, ctx: &mut CodegenContext) {
    if name == "output" {
        if let Some(argument) = arguments.first() {
            gen_node(argument, table, emitter, ctx);
        }
        emitter.emit_ro(RoOp::Out, Register::Ac, Register::Ac, Register::Ac, "print value");
        return;
    }
    if name == "input" {
        emitter.emit_ro(RoOp::In, Register::Ac, Register::Ac, Register::Ac, "read value");
        return;
    }

    let saved_tmp = ctx.tmp_offset;
    emitter.emit_rm(RmOp::St, Register::Fp, saved_tmp, Register::Fp, "store FP");
    ctx.tmp_offset -= 2;

    for argument in arguments {
        gen_node(argument, table, emitter, ctx);
        emitter.emit_rm(RmOp::St, Register::Ac, ctx.tmp_offset, Register::Fp, "store parameter");
        ctx.tmp_offset -= 1;
    }
    ctx.tmp_offset = saved_tmp;

    emitter.emit_rm(RmOp::Lda, Register::Fp, ctx.tmp_offset, Register::Fp, "load FP with parameters");
    let saved_loc = emitter.current_address();
    emitter.emit_rm(RmOp::Ldc, Register::Ac, saved_loc as i64 + 2, Register::Ac, "load AC with return address");
    let target = ctx.functions.lookup(name);
    emitter.emit_rm_abs(RmOp::Lda, Register::Pc, target, "jump to function");
}

fn gen_assign(lhs: &AstNode, rhs: &AstNode, table: &mut SymbolTable, emitter: &mut Emitter, ctx: &mut CodegenContext) {
    let AstNode::Identifier { name, index, .. } = lhs else {
        // Pass 2 already reported `InvalidAssignmentLhs`/`AssignToConstant`
        // for this shape; code generation still runs (§4.10) but has nothing
        // sound to address, so it evaluates the RHS for its side effects and
        // emits no store rather than panicking on an unexpected LHS kind.
        gen_node(rhs, table, emitter, ctx);
        return;
    };

    let is_global = is_global_symbol(table, ctx.current_scope, name);
    let offset = symbol_offset(table, ctx.current_scope, name);

    match index {
        Some(index) => {
            gen_node(rhs, table, emitter, ctx);
            load_symbol_value(offset, is_global, Register::Ac1, emitter, "assign: get vector base address");
            gen_index_into(index, Register::R3, table, ctx, emitter);
            emitter.emit_rm(RmOp::Ldc, Register::R4, 1, Register::Ac, "assign: load constant 1");
            emitter.emit_ro(RoOp::Add, Register::R3, Register::R3, Register::R4, "assign: adjust array index");
            emitter.emit_ro(RoOp::Sub, Register::Ac1, Register::Ac1, Register::R3, "assign: compute address of array element");
            emitter.emit_rm(RmOp::St, Register::Ac, 0, Register::Ac1, "assign: store value in array element");
        }
        None => {
            gen_node(rhs, table, emitter, ctx);
            if is_global {
                emitter.emit_rm(RmOp::Ldc, Register::Gp, 0, Register::Ac, "load GP");
                emitter.emit_rm(RmOp::St, Register::Ac, offset, Register::Gp, "assign: store value");
            } else {
                emitter.emit_rm(RmOp::St, Register::Ac, offset - MAX_MEMORY, Register::Fp, "assign: store value");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::ast::{BaseType, Symbol, SymbolKind};
    use crate::compiler::semantic_analyser::analyse;

    fn compile(mut ast: AstNode) -> (ProgramCode, SymbolTable) {
        let (mut table, _diagnostics) = analyse(&mut ast, &TraceFlags::none());
        let program = generate(&ast, &mut table, &TraceFlags::none());
        (program, table)
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
    fn prelude_and_halt_sandwich_the_program() {
        let (program, _) = compile(simple_main(vec![]));
        let instructions = program.instructions();
        assert_eq!(instructions[0], cminus_common::TmInstruction::rm(RmOp::Ld, Register::Mp, 0, Register::Ac));
        assert_eq!(instructions[1], cminus_common::TmInstruction::rm(RmOp::Ld, Register::Fp, 0, Register::Ac));
        assert_eq!(instructions[2], cminus_common::TmInstruction::rm(RmOp::St, Register::Ac, 0, Register::Ac));
        assert_eq!(
            *instructions.last().unwrap(),
            cminus_common::TmInstruction::ro(RoOp::Halt, Register::Ac, Register::Ac, Register::Ac)
        );
    }

    #[test]
    fn main_jump_slot_targets_mains_real_entry() {
        let (program, _) = compile(simple_main(vec![]));
        // slot 3 is reserved right after the 3-instruction prelude.
        match program.instructions()[3] {
            cminus_common::TmInstruction::Rm { op: RmOp::Lda, r: Register::Pc, d, s: Register::Pc } => {
                assert_eq!(3 + d as usize, 4);
            }
            other => panic!("expected a jump to main's entry, got {:?}", other),
        }
    }

    #[test]
    fn local_scalar_variable_is_declared_without_panicking() {
        let (_program, table) = compile(simple_main(vec![AstNode::Variable {
            name: "x".into(),
            element_type: BaseType::Int,
            array_size: None,
            line: 2,
        }]));
        let rendered = format!("{}", table);
        assert!(rendered.contains('x'));
    }

    #[test]
    fn output_call_lowers_to_out_instruction() {
        let (program, _) = compile(simple_main(vec![AstNode::Call {
            name: "output".into(),
            arguments: vec![AstNode::Constant { value: 7, line: 2 }],
            line: 2,
            resolved_type: None,
        }]));
        assert!(program
            .instructions()
            .iter()
            .any(|i| matches!(i, cminus_common::TmInstruction::Ro { op: RoOp::Out, .. })));
    }

    #[test]
    fn global_scalar_referenced_inside_a_function_is_addressed_through_gp() {
        // int g; void main(void) { g = 5; output(g); }
        let mut ast = AstNode::Program {
            declarations: vec![
                AstNode::Variable { name: "g".into(), element_type: BaseType::Int, array_size: None, line: 1 },
                AstNode::Function {
                    name: "main".into(),
                    params: vec![],
                    return_type: TypeInfo::new(BaseType::Void),
                    body: Box::new(AstNode::Block {
                        statements: vec![
                            AstNode::Assign {
                                lhs: Box::new(AstNode::Identifier {
                                    name: "g".into(),
                                    index: None,
                                    line: 2,
                                    resolved_type: None,
                                }),
                                rhs: Box::new(AstNode::Constant { value: 5, line: 2 }),
                                line: 2,
                            },
                            AstNode::Call {
                                name: "output".into(),
                                arguments: vec![AstNode::Identifier {
                                    name: "g".into(),
                                    index: None,
                                    line: 3,
                                    resolved_type: None,
                                }],
                                line: 3,
                                resolved_type: None,
                            },
                        ],
                        line: 1,
                        scope: None,
                    }),
                    line: 1,
                    scope: None,
                },
            ],
        };

        let (mut table, diagnostics) = analyse(&mut ast, &TraceFlags::none());
        assert!(!diagnostics.has_error());
        let program = generate(&ast, &mut table, &TraceFlags::none());
        let offset = table.find_symbol(table.global_scope(), "g").unwrap().offset().unwrap();

        let stored_through_gp = program.instructions().iter().any(|instr| {
            matches!(instr, cminus_common::TmInstruction::Rm { op: RmOp::St, d, s: Register::Gp, .. } if *d == offset)
        });
        let loaded_through_gp = program.instructions().iter().any(|instr| {
            matches!(instr, cminus_common::TmInstruction::Rm { op: RmOp::Ld, d, s: Register::Gp, .. } if *d == offset)
        });
        assert!(stored_through_gp, "expected the global's store inside main to address it through GP");
        assert!(loaded_through_gp, "expected the global's load inside main to address it through GP");
    }

    #[test]
    fn array_element_read_and_write_compiles_without_type_errors() {
        // void main(void) { int a[3]; a[0] = 1; a[2] = a[0] + 4; output(a[2]); }
        fn indexed(index: i64, line: u32) -> AstNode {
            AstNode::Identifier {
                name: "a".into(),
                index: Some(Box::new(AstNode::Constant { value: index, line })),
                line,
                resolved_type: None,
            }
        }

        let mut ast = simple_main(vec![
            AstNode::Variable { name: "a".into(), element_type: BaseType::Int, array_size: Some(3), line: 2 },
            AstNode::Assign { lhs: Box::new(indexed(0, 3)), rhs: Box::new(AstNode::Constant { value: 1, line: 3 }), line: 3 },
            AstNode::Assign {
                lhs: Box::new(indexed(2, 4)),
                rhs: Box::new(AstNode::Operator {
                    op: Operator::Arith(ArithOp::Add),
                    lhs: Box::new(indexed(0, 4)),
                    rhs: Box::new(AstNode::Constant { value: 4, line: 4 }),
                    line: 4,
                    result_type: None,
                }),
                line: 4,
            },
            AstNode::Call { name: "output".into(), arguments: vec![indexed(2, 5)], line: 5, resolved_type: None },
        ]);

        let (mut table, diagnostics) = analyse(&mut ast, &TraceFlags::none());
        assert!(!diagnostics.has_error(), "unexpected errors: {:?}", diagnostics.errors());
        let program = generate(&ast, &mut table, &TraceFlags::none());
        assert!(program
            .instructions()
            .iter()
            .any(|i| matches!(i, cminus_common::TmInstruction::Ro { op: RoOp::Out, .. })));
    }

    #[test]
    fn undeclared_symbol_does_not_panic_codegen() {
        let mut table = SymbolTable::new();
        table.add_symbol(
            table.global_scope(),
            Symbol::new("f", SymbolKind::Function, TypeInfo::function(TypeInfo::new(BaseType::Void)), 1),
        );
        assert_eq!(symbol_offset(&table, table.global_scope(), "missing"), 0);
    }
}
