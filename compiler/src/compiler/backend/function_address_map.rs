use std::collections::HashMap;

/// Sentinel returned for a miss, matching the original's literal. A
/// well-analysed program never observes this at a call site — semantic
/// analysis has already rejected calls to undeclared names (§4.4) — so this
/// only guards against a malformed AST reaching the generator directly.
pub const MISSING_FUNCTION: usize = 1024;

/// Name-to-entry-address table (C6), resolved once per function definition
/// and consulted at every call site.
#[derive(Debug, Default)]
pub struct FunctionAddressMap {
    addresses: HashMap<String, usize>,
}

impl FunctionAddressMap {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, address: usize) {
        self.addresses.insert(name.into(), address);
    }

    pub fn lookup(&self, name: &str) -> usize {
        self.addresses.get(name).copied().unwrap_or(MISSING_FUNCTION)
    }
}
