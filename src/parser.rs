//! Streaming callgrind/cachegrind line parser
//!
//! Lines are consumed strictly in order. Each line either updates the parse
//! cursor (`fl=`, `fn=`, `cfl=`, `cfn=`), declares the event order
//! (`events:`), carries header metadata, or is a cost line whose values go
//! into the vector the cursor currently has open. Everything else is
//! ignored, and content anomalies never abort a parse.
//!
//! # Example
//!
//! ```
//! use grindgraph::{parse_lines, ParserConfig};
//!
//! let dump = [
//!     "events: Time Memory",
//!     "fl=(1) /var/www/html/index.php",
//!     "fn=(1) fun1",
//!     "4 20 32",
//!     "fl=(1)",
//!     "fn=(2) {main}",
//!     "1 10 0",
//!     "cfl=(1)",
//!     "cfn=(1)",
//!     "calls=1 0 0",
//!     "3 120 32",
//! ];
//!
//! let graph = parse_lines(dump, &ParserConfig::default());
//! let main = graph.main_function().unwrap();
//! assert_eq!(main.measurement("Time").unwrap(), 130);
//! assert_eq!(main.calls().next().unwrap().function().unwrap().name(), "fun1");
//! ```

use crate::config::ParserConfig;
use crate::context::{CostTarget, ParseContext};
use crate::cost::{decode_totals, is_cost_line, CostLine, CostVector};
use crate::error::{GraphError, Result};
use crate::events::EventRegistry;
use crate::graph::{CallGraph, CallRecord, FunctionId, GraphHeader};
use crate::registry::{Declaration, FileTable, FunctionKey, FunctionRegistry};
use fnv::FnvHashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info, warn};

/// Header fields kept as graph metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderField {
    Version,
    Creator,
    Cmd,
    Totals,
}

/// Shape of one input line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    Events(&'a str),
    File(&'a str),
    Function(&'a str),
    CalledFile(&'a str),
    CalledFunction(&'a str),
    Header(HeaderField, &'a str),
    Cost,
    Ignored,
}

impl<'a> LineKind<'a> {
    /// Classify a line by its prefix, or as a cost line by its shape
    pub fn classify(line: &'a str) -> Self {
        if let Some(rest) = line.strip_prefix("events:") {
            LineKind::Events(rest)
        } else if let Some(rest) = line.strip_prefix("fl=") {
            LineKind::File(rest)
        } else if let Some(rest) = line.strip_prefix("fn=") {
            LineKind::Function(rest)
        } else if let Some(rest) = line
            .strip_prefix("cfl=")
            .or_else(|| line.strip_prefix("cfi="))
        {
            LineKind::CalledFile(rest)
        } else if let Some(rest) = line.strip_prefix("cfn=") {
            LineKind::CalledFunction(rest)
        } else if let Some((field, rest)) = Self::header(line) {
            LineKind::Header(field, rest)
        } else if is_cost_line(line) {
            LineKind::Cost
        } else {
            LineKind::Ignored
        }
    }

    fn header(line: &'a str) -> Option<(HeaderField, &'a str)> {
        const HEADERS: [(&str, HeaderField); 5] = [
            ("version:", HeaderField::Version),
            ("creator:", HeaderField::Creator),
            ("cmd:", HeaderField::Cmd),
            ("summary:", HeaderField::Totals),
            ("totals:", HeaderField::Totals),
        ];

        HEADERS
            .iter()
            .find_map(|(prefix, field)| line.strip_prefix(prefix).map(|rest| (*field, rest)))
    }
}

/// One parse session
///
/// Owns its event registry, so independent sessions never share state.
#[derive(Debug)]
pub struct Parser {
    config: ParserConfig,
    events: EventRegistry,
    files: FileTable,
    functions: FunctionRegistry,
    context: ParseContext,
    header: GraphHeader,
    totals: CostVector,
    main: Option<FunctionId>,
    /// Calls whose `cfn=` did not resolve, keyed by (caller, call index)
    unresolved: FnvHashMap<(FunctionId, usize), FunctionKey>,
    lines: usize,
}

impl Parser {
    pub fn new(config: ParserConfig) -> Self {
        Self {
            config,
            events: EventRegistry::new(),
            files: FileTable::new(),
            functions: FunctionRegistry::new(),
            context: ParseContext::new(),
            header: GraphHeader::default(),
            totals: CostVector::new(),
            main: None,
            unresolved: FnvHashMap::default(),
            lines: 0,
        }
    }

    /// Process one input line
    pub fn feed_line(&mut self, raw: &str) {
        self.lines += 1;
        let line = raw.strip_suffix('\r').unwrap_or(raw);

        match LineKind::classify(line) {
            LineKind::Events(payload) => self.events.declare(payload),
            LineKind::File(payload) => self.on_file(payload),
            LineKind::Function(payload) => self.on_function(payload),
            LineKind::CalledFile(payload) => self.on_called_file(payload),
            LineKind::CalledFunction(payload) => self.on_called_function(payload),
            LineKind::Header(field, value) => self.on_header(field, value),
            LineKind::Cost => self.on_cost(line),
            LineKind::Ignored => {}
        }
    }

    /// Freeze the session into a graph
    pub fn finish(mut self) -> CallGraph {
        if self.config.resolve_forward_calls {
            self.resolve_forward_calls();
        }

        info!(
            lines = self.lines,
            functions = self.functions.len(),
            events = self.events.len(),
            unresolved_calls = self.unresolved.len(),
            has_main = self.main.is_some(),
            "profile parsed"
        );

        CallGraph {
            events: self.events,
            functions: self.functions.into_functions(),
            main: self.main,
            header: self.header,
            summary: self.totals,
        }
    }

    fn on_file(&mut self, payload: &str) {
        let file = self.files.declare(payload);
        self.context.enter_file(file);
    }

    fn on_function(&mut self, payload: &str) {
        let decl = Declaration::split(payload);
        let token = self.functions.intern_name(decl.token);

        if let Some(name) = decl.inline {
            for resolved in self.functions.bind_name(token, name) {
                self.mark_if_main(resolved);
            }
        }

        let key = FunctionKey {
            file: self.context.current_file,
            name: token,
        };
        let path = self.files.path(self.context.current_file).to_string();
        let declared = self.functions.declare(key, &path);
        if declared.created {
            self.mark_if_main(declared.id);
        }

        self.context.enter_function(declared.id);
    }

    fn on_called_file(&mut self, payload: &str) {
        let file = self.files.declare(payload);
        let Some(caller) = self.context.current_function else {
            debug!(payload, "cfl= outside of any function, ignored");
            self.context.called_file = Some(file);
            return;
        };

        self.functions
            .get_mut(caller)
            .calls
            .push(CallRecord::default());
        self.context.open_call(file);
    }

    fn on_called_function(&mut self, payload: &str) {
        let decl = Declaration::split(payload);
        let token = self.functions.intern_name(decl.token);
        if let Some(name) = decl.inline {
            for resolved in self.functions.bind_name(token, name) {
                self.mark_if_main(resolved);
            }
        }

        let Some(caller) = self.context.current_function else {
            debug!(payload, "cfn= outside of any function, ignored");
            return;
        };

        // valgrind omits cfl= when the callee shares the caller's file; once a
        // block has used cfl=, a bare cfn= retargets the last call instead
        if !self.context.call_awaiting_callee && !self.context.explicit_calls {
            self.functions
                .get_mut(caller)
                .calls
                .push(CallRecord::default());
            self.context.open_implicit_call();
        }

        let key = FunctionKey {
            file: self.context.callee_file(),
            name: token,
        };
        let target = self.functions.lookup(key);
        let node = self.functions.get_mut(caller);
        let Some(index) = node.calls.len().checked_sub(1) else {
            return;
        };
        node.calls[index].target = target;
        self.context.bind_callee();

        if target.is_some() {
            self.unresolved.remove(&(caller, index));
        } else {
            debug!(payload, "callee not declared yet, call left unresolved");
            self.unresolved.insert((caller, index), key);
        }
    }

    fn on_header(&mut self, field: HeaderField, value: &str) {
        let value = value.trim();
        match field {
            HeaderField::Version => self.header.version = Some(value.to_string()),
            HeaderField::Creator => self.header.creator = Some(value.to_string()),
            HeaderField::Cmd => self.header.cmd = Some(value.to_string()),
            HeaderField::Totals => {
                self.totals = CostVector::from(decode_totals(value, self.events.len()));
            }
        }
    }

    fn on_cost(&mut self, line: &str) {
        let cost = CostLine::decode(line, self.events.len());

        if cost.malformed > 0 {
            debug!(line, malformed = cost.malformed, "non-numeric cost tokens read as 0");
        }
        if cost.surplus > 0 || self.events.is_empty() {
            if self.config.strict_events {
                warn!(
                    line,
                    events = self.events.len(),
                    "cost line does not match declared events"
                );
            } else {
                debug!(
                    line,
                    events = self.events.len(),
                    "cost line does not match declared events"
                );
            }
        }

        let Some(function) = self.context.current_function else {
            debug!(line, "cost line before any fn=, ignored");
            return;
        };

        let node = self.functions.get_mut(function);
        match (self.context.target, node.calls.last_mut()) {
            (CostTarget::CallCost, Some(call)) => {
                call.cost.accumulate(&cost.values);
                call.line = cost.line;
            }
            _ => node.own.accumulate(&cost.values),
        }
    }

    fn mark_if_main(&mut self, id: FunctionId) {
        let name = &self.functions.get(id).name;
        if !self.config.is_main(name) {
            return;
        }
        if let Some(previous) = self.main.filter(|&previous| previous != id) {
            warn!(
                previous = %self.functions.get(previous).name,
                current = %name,
                "more than one entry point in profile, keeping the later one"
            );
        }
        self.main = Some(id);
    }

    fn resolve_forward_calls(&mut self) {
        let pending = std::mem::take(&mut self.unresolved);
        for ((caller, index), key) in pending {
            match self.functions.lookup(key) {
                Some(target) => self.functions.get_mut(caller).calls[index].target = Some(target),
                None => {
                    self.unresolved.insert((caller, index), key);
                }
            }
        }
    }
}

/// Parse an in-memory line sequence; running out of lines ends the input
pub fn parse_lines<I, S>(lines: I, config: &ParserConfig) -> CallGraph
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut parser = Parser::new(config.clone());
    for line in lines {
        parser.feed_line(line.as_ref());
    }
    parser.finish()
}

/// Parse a buffered byte source
///
/// Invalid UTF-8 inside a line is replaced rather than rejected. A read
/// error aborts the parse; no partial graph is returned.
pub fn parse_reader<R: BufRead>(mut reader: R, config: &ParserConfig) -> Result<CallGraph> {
    let mut parser = Parser::new(config.clone());
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
        }
        parser.feed_line(&String::from_utf8_lossy(&buf));
    }

    Ok(parser.finish())
}

/// Open and parse a profile dump from disk
pub fn parse_file<P: AsRef<Path>>(path: P, config: &ParserConfig) -> Result<CallGraph> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| GraphError::SourceUnavailable {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "parsing profile");
    parse_reader(BufReader::new(file), config)
}
