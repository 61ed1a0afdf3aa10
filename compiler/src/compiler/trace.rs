/// Runtime trace flags (§6), mirroring the original's `EchoSource,
/// TraceScan, TraceParse, TraceAnalyze, TraceCode` booleans.
///
/// Only `trace_analyze` and `trace_code` are consulted by this crate's own
/// phases; the other three exist purely as a passthrough so a caller wiring
/// the whole pipeline (lexer, parser, this crate, listing sink) has a single
/// configuration surface to thread through all of it.
#[derive(Debug, Clone, Copy, Default)]
pub struct TraceFlags {
    pub echo_source: bool,
    pub trace_scan: bool,
    pub trace_parse: bool,
    pub trace_analyze: bool,
    pub trace_code: bool,
}

impl TraceFlags {
    pub fn none() -> Self {
        Default::default()
    }

    pub fn all() -> Self {
        TraceFlags {
            echo_source: true,
            trace_scan: true,
            trace_parse: true,
            trace_analyze: true,
            trace_code: true,
        }
    }
}
