use std::collections::HashMap;
use std::fmt;

use super::datatype::TypeInfo;

/// A symbol's declaration kind, mirroring the source language's own
/// declaration forms rather than Rust's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Function,
    Parameter,
    Array,
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SymbolKind::Variable => "Variable",
            SymbolKind::Function => "Function",
            SymbolKind::Parameter => "Parameter",
            SymbolKind::Array => "Array",
        };
        write!(f, "{}", name)
    }
}

/// One declared name: its type, where it was declared, and every line it was
/// subsequently referenced from.
///
/// `offset` starts unset and is filled in by the code generator during frame
/// layout (§4.7) — it has no meaning to the analyser itself.
#[derive(Debug, Clone)]
pub struct Symbol {
    name: String,
    kind: SymbolKind,
    type_info: TypeInfo,
    defined_at: u32,
    references: Vec<u32>,
    offset: Option<i64>,
}

impl Symbol {
    pub fn new(name: impl Into<String>, kind: SymbolKind, type_info: TypeInfo, defined_at: u32) -> Self {
        Symbol {
            name: name.into(),
            kind,
            type_info,
            defined_at,
            references: Vec::new(),
            offset: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> SymbolKind {
        self.kind
    }

    pub fn type_info(&self) -> &TypeInfo {
        &self.type_info
    }

    pub fn defined_at(&self) -> u32 {
        self.defined_at
    }

    pub fn references(&self) -> &[u32] {
        &self.references
    }

    /// Idempotent per line: a symbol referenced twice from the same line
    /// (e.g. appearing twice in one expression) records that line once.
    pub fn add_reference(&mut self, line: u32) {
        if !self.references.contains(&line) {
            self.references.push(line);
        }
    }

    pub fn offset(&self) -> Option<i64> {
        self.offset
    }

    pub fn set_offset(&mut self, offset: i64) {
        self.offset = Some(offset);
    }
}

/// Opaque handle to a scope, recorded directly on the FUNCTION/BLOCK AST node
/// that owns it (§3, §9 Open Question (b)) rather than re-derived by name
/// comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(usize);

struct Scope {
    name: String,
    parent: Option<ScopeId>,
    level: usize,
    symbols: HashMap<String, Symbol>,
    insertion_order: Vec<String>,
}

/// The full scope tree plus every symbol it owns.
///
/// The root scope is named `"global"` and has no parent (§3). Scopes persist
/// from the end of Pass 1 through code generation; symbols are owned by the
/// scope that inserted them and outlive code generation (consumers read
/// `offset` back out after C7 has run).
pub struct SymbolTable {
    scopes: Vec<Scope>,
    main_declared: bool,
}

pub const GLOBAL_SCOPE: ScopeId = ScopeId(0);

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable {
            scopes: vec![Scope {
                name: "global".to_string(),
                parent: None,
                level: 0,
                symbols: HashMap::new(),
                insertion_order: Vec::new(),
            }],
            main_declared: false,
        }
    }

    pub fn global_scope(&self) -> ScopeId {
        GLOBAL_SCOPE
    }

    /// Creates a new child scope of `parent` named `name`, returning its id.
    pub fn create_child_scope(&mut self, parent: ScopeId, name: impl Into<String>) -> ScopeId {
        let level = self.scopes[parent.0].level + 1;
        let id = ScopeId(self.scopes.len());
        self.scopes.push(Scope {
            name: name.into(),
            parent: Some(parent),
            level,
            symbols: HashMap::new(),
            insertion_order: Vec::new(),
        });
        id
    }

    pub fn parent_of(&self, scope: ScopeId) -> Option<ScopeId> {
        self.scopes[scope.0].parent
    }

    pub fn is_global(&self, scope: ScopeId) -> bool {
        self.scopes[scope.0].parent.is_none()
    }

    /// Inserts `symbol` into `scope`. Returns `false` (no insertion
    /// performed) if a symbol of this name already exists in this scope —
    /// the analyser is expected to check first via `find_symbol_in_scope`
    /// and report its own, more specific error; this call never reports one
    /// itself (§4.3).
    pub fn add_symbol(&mut self, scope: ScopeId, symbol: Symbol) -> bool {
        let scope = &mut self.scopes[scope.0];
        if scope.symbols.contains_key(&symbol.name) {
            return false;
        }
        scope.insertion_order.push(symbol.name.clone());
        scope.symbols.insert(symbol.name.clone(), symbol);
        true
    }

    pub fn find_symbol_in_scope(&self, scope: ScopeId, name: &str) -> Option<&Symbol> {
        self.scopes[scope.0].symbols.get(name)
    }

    pub fn find_symbol_in_scope_mut(&mut self, scope: ScopeId, name: &str) -> Option<&mut Symbol> {
        self.scopes[scope.0].symbols.get_mut(name)
    }

    /// Walks `scope` and each parent in turn, returning the first match.
    pub fn find_symbol(&self, scope: ScopeId, name: &str) -> Option<&Symbol> {
        let mut current = Some(scope);
        while let Some(id) = current {
            if let Some(symbol) = self.scopes[id.0].symbols.get(name) {
                return Some(symbol);
            }
            current = self.scopes[id.0].parent;
        }
        None
    }

    /// Walks `scope` and each parent in turn (mirroring `find_symbol`),
    /// returning the id of the scope that actually declares `name` rather
    /// than the scope the lookup started from. A use site nested several
    /// scopes below a global declaration must address that declaration
    /// through GP, not through whatever scope happens to be current at the
    /// reference (§4.7) — callers that need global-vs-local addressing
    /// should resolve this, not `scope`, before calling `is_global`.
    pub fn scope_owning(&self, scope: ScopeId, name: &str) -> Option<ScopeId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            if self.scopes[id.0].symbols.contains_key(name) {
                return Some(id);
            }
            current = self.scopes[id.0].parent;
        }
        None
    }

    /// Walks `scope` and each parent in turn (mirroring `find_symbol`) and
    /// records `line` on the first match found.
    pub fn add_reference(&mut self, scope: ScopeId, name: &str, line: u32) {
        let mut current = Some(scope);
        while let Some(id) = current {
            if let Some(symbol) = self.scopes[id.0].symbols.get_mut(name) {
                symbol.add_reference(line);
                return;
            }
            current = self.scopes[id.0].parent;
        }
    }

    pub fn set_main_declared(&mut self) {
        self.main_declared = true;
    }

    pub fn main_declared(&self) -> bool {
        self.main_declared
    }

    pub fn scope_name(&self, scope: ScopeId) -> &str {
        &self.scopes[scope.0].name
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for SymbolTable {
    fn clone(&self) -> Self {
        SymbolTable {
            scopes: self
                .scopes
                .iter()
                .map(|s| Scope {
                    name: s.name.clone(),
                    parent: s.parent,
                    level: s.level,
                    symbols: s.symbols.clone(),
                    insertion_order: s.insertion_order.clone(),
                })
                .collect(),
            main_declared: self.main_declared,
        }
    }
}

impl fmt::Display for SymbolTable {
    /// Fixed column layout: `Variable Name | Scope | ID Type | Data Type |
    /// Line Numbers`. Functions are only printed at the global level to
    /// avoid duplicating them when walking nested scopes (§4.3); the global
    /// scope's own name column is left blank. Bucket-walk order in the
    /// original is replaced here by each scope's recorded insertion order,
    /// which is the one deterministic ordering this rendition's `HashMap`
    /// storage can offer (§8).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<15} {:<15} {:<12} {:<20} {}",
            "Variable Name", "Scope", "ID Type", "Data Type", "Line Numbers"
        )?;
        for (idx, scope) in self.scopes.iter().enumerate() {
            let scope_label = if scope.parent.is_none() { "" } else { scope.name.as_str() };
            for name in &scope.insertion_order {
                let symbol = &scope.symbols[name];
                if symbol.kind == SymbolKind::Function && idx != GLOBAL_SCOPE.0 {
                    continue;
                }
                let lines = symbol
                    .references
                    .iter()
                    .map(|l| l.to_string())
                    .collect::<Vec<_>>()
                    .join(" ");
                writeln!(
                    f,
                    "{:<15} {:<15} {:<12} {:<20} {}",
                    symbol.name,
                    scope_label,
                    symbol.kind.to_string(),
                    symbol.type_info.to_string(),
                    lines
                )?;
            }
        }
        if !self.main_declared {
            writeln!(f, "undefined reference to 'main'")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::ast::datatype::BaseType;

    #[test]
    fn duplicate_insertion_in_same_scope_is_rejected() {
        let mut table = SymbolTable::new();
        let global = table.global_scope();
        let a = Symbol::new("x", SymbolKind::Variable, TypeInfo::new(BaseType::Int), 1);
        let b = Symbol::new("x", SymbolKind::Variable, TypeInfo::new(BaseType::Int), 2);
        assert!(table.add_symbol(global, a));
        assert!(!table.add_symbol(global, b));
    }

    #[test]
    fn find_symbol_walks_parent_chain() {
        let mut table = SymbolTable::new();
        let global = table.global_scope();
        table.add_symbol(
            global,
            Symbol::new("g", SymbolKind::Variable, TypeInfo::new(BaseType::Int), 1),
        );
        let func_scope = table.create_child_scope(global, "f");
        table.add_symbol(
            func_scope,
            Symbol::new("a", SymbolKind::Parameter, TypeInfo::new(BaseType::Int), 2),
        );

        assert!(table.find_symbol(func_scope, "g").is_some());
        assert!(table.find_symbol(func_scope, "a").is_some());
        assert!(table.find_symbol(global, "a").is_none());
    }

    #[test]
    fn scope_owning_resolves_the_declaring_scope_not_the_use_site() {
        let mut table = SymbolTable::new();
        let global = table.global_scope();
        table.add_symbol(
            global,
            Symbol::new("g", SymbolKind::Variable, TypeInfo::new(BaseType::Int), 1),
        );
        let func_scope = table.create_child_scope(global, "f");
        table.add_symbol(
            func_scope,
            Symbol::new("a", SymbolKind::Parameter, TypeInfo::new(BaseType::Int), 2),
        );

        assert_eq!(table.scope_owning(func_scope, "g"), Some(global));
        assert_eq!(table.scope_owning(func_scope, "a"), Some(func_scope));
        assert_eq!(table.scope_owning(global, "a"), None);
    }

    #[test]
    fn add_reference_is_idempotent_per_line() {
        let mut table = SymbolTable::new();
        let global = table.global_scope();
        table.add_symbol(
            global,
            Symbol::new("x", SymbolKind::Variable, TypeInfo::new(BaseType::Int), 1),
        );
        table.add_reference(global, "x", 5);
        table.add_reference(global, "x", 5);
        table.add_reference(global, "x", 6);
        assert_eq!(table.find_symbol(global, "x").unwrap().references(), &[5, 6]);
    }

    #[test]
    fn undeclared_main_is_reported_by_display() {
        let table = SymbolTable::new();
        let rendered = format!("{}", table);
        assert!(rendered.contains("undefined reference to 'main'"));
    }
}
