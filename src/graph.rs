//! Frozen call graph and its query API
//!
//! Function nodes are owned by the graph in insertion order; call records
//! refer to their callee by [`FunctionId`] and never own it. Once the parser
//! hands out a [`CallGraph`] nothing mutates it, so a graph can be shared
//! freely between reader threads.
//!
//! Aggregation is shallow: a function's measurement is its own
//! cost plus the stored cost of each *direct* call. The producer already
//! folded everything below a call site into that call's cost.

use crate::cost::CostVector;
use crate::error::Result;
use crate::events::EventRegistry;
use serde::Serialize;
use std::fmt;

/// Index of a function node inside its graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct FunctionId(pub(crate) usize);

impl FunctionId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// One source-level function
#[derive(Debug, Clone)]
pub struct FunctionNode {
    pub(crate) name: String,
    pub(crate) file: String,
    pub(crate) own: CostVector,
    pub(crate) calls: Vec<CallRecord>,
}

impl FunctionNode {
    pub(crate) fn new(name: String, file: String) -> Self {
        Self {
            name,
            file,
            own: CostVector::new(),
            calls: Vec::new(),
        }
    }
}

/// One call site inside a function
#[derive(Debug, Clone, Default)]
pub struct CallRecord {
    pub(crate) target: Option<FunctionId>,
    pub(crate) line: u32,
    pub(crate) cost: CostVector,
}

/// Metadata captured from the dump header
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphHeader {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmd: Option<String>,
}

/// Call graph built from one profile dump
#[derive(Debug, Clone)]
pub struct CallGraph {
    pub(crate) events: EventRegistry,
    pub(crate) functions: Vec<FunctionNode>,
    pub(crate) main: Option<FunctionId>,
    pub(crate) header: GraphHeader,
    pub(crate) summary: CostVector,
}

impl CallGraph {
    /// The function marked as the program entry point, if any
    pub fn main_function(&self) -> Option<FunctionRef<'_>> {
        self.main.and_then(|id| self.function(id))
    }

    pub fn function(&self, id: FunctionId) -> Option<FunctionRef<'_>> {
        self.functions
            .get(id.0)
            .map(|node| FunctionRef { graph: self, id, node })
    }

    /// All functions in order of first declaration
    pub fn functions(&self) -> impl ExactSizeIterator<Item = FunctionRef<'_>> + '_ {
        self.functions
            .iter()
            .enumerate()
            .map(move |(i, node)| FunctionRef {
                graph: self,
                id: FunctionId(i),
                node,
            })
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    /// First function declared with exactly `name`
    pub fn find_function(&self, name: &str) -> Option<FunctionRef<'_>> {
        self.functions().find(|f| f.name() == name)
    }

    pub fn events(&self) -> &EventRegistry {
        &self.events
    }

    pub fn header(&self) -> &GraphHeader {
        &self.header
    }

    /// Value of the `summary:`/`totals:` header for `event` (0 if absent)
    pub fn summary(&self, event: &str) -> Result<i64> {
        let index = self.events.require(event)?;
        Ok(self.summary.get(index))
    }
}

/// Borrowed view of a function node
#[derive(Clone, Copy)]
pub struct FunctionRef<'g> {
    graph: &'g CallGraph,
    id: FunctionId,
    node: &'g FunctionNode,
}

impl<'g> FunctionRef<'g> {
    pub fn id(&self) -> FunctionId {
        self.id
    }

    pub fn name(&self) -> &'g str {
        &self.node.name
    }

    /// Path of the declaring file; empty if the dump never bound one
    pub fn file(&self) -> &'g str {
        &self.node.file
    }

    /// Direct call sites, in input order
    pub fn calls(&self) -> impl ExactSizeIterator<Item = CallRef<'g>> + 'g {
        let graph = self.graph;
        self.node
            .calls
            .iter()
            .map(move |record| CallRef { graph, record })
    }

    pub fn call_count(&self) -> usize {
        self.node.calls.len()
    }

    pub fn own_cost(&self) -> &'g CostVector {
        &self.node.own
    }

    /// Self cost for `event`, excluding every call
    pub fn own_measurement(&self, event: &str) -> Result<i64> {
        let index = self.graph.events.require(event)?;
        Ok(self.node.own.get(index))
    }

    /// Self cost plus the stored cost of every direct call
    pub fn measurement(&self, event: &str) -> Result<i64> {
        let index = self.graph.events.require(event)?;
        Ok(self.inclusive_at(index))
    }

    pub(crate) fn inclusive_at(&self, index: usize) -> i64 {
        self.node
            .calls
            .iter()
            .fold(self.node.own.get(index), |total, call| {
                total.saturating_add(call.cost.get(index))
            })
    }
}

impl fmt::Debug for FunctionRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRef")
            .field("id", &self.id)
            .field("name", &self.node.name)
            .field("file", &self.node.file)
            .finish()
    }
}

impl PartialEq for FunctionRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.graph, other.graph) && self.id == other.id
    }
}

impl Eq for FunctionRef<'_> {}

/// Borrowed view of a call record
#[derive(Clone, Copy)]
pub struct CallRef<'g> {
    graph: &'g CallGraph,
    record: &'g CallRecord,
}

impl fmt::Debug for CallRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallRef")
            .field("target", &self.record.target)
            .field("line", &self.record.line)
            .field("cost", &self.record.cost)
            .finish()
    }
}

impl<'g> CallRef<'g> {
    /// Callee, or `None` when the `cfn=` identity never resolved
    pub fn function(&self) -> Option<FunctionRef<'g>> {
        self.record.target.and_then(|id| self.graph.function(id))
    }

    pub fn line(&self) -> u32 {
        self.record.line
    }

    pub fn cost(&self) -> &'g CostVector {
        &self.record.cost
    }

    /// Inclusive cost of this call occurrence for `event`
    pub fn measurement(&self, event: &str) -> Result<i64> {
        let index = self.graph.events.require(event)?;
        Ok(self.record.cost.get(index))
    }
}
