//! JSON output format for parsed call graphs
//!
//! `--format json` implementation

use crate::graph::{CallGraph, GraphHeader};
use serde::{Deserialize, Serialize};

/// One call site of a function
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonCall {
    /// Source line of the call
    pub line: u32,
    /// Index of the callee in `functions` (absent when unresolved)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<usize>,
    /// Callee name (absent when unresolved)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_name: Option<String>,
    /// Inclusive cost of this call, one value per event
    pub cost: Vec<i64>,
}

/// One function node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonFunction {
    pub id: usize,
    pub name: String,
    pub file: String,
    /// Self cost, one value per event
    pub own: Vec<i64>,
    /// Self cost plus direct call costs, one value per event
    pub inclusive: Vec<i64>,
    pub calls: Vec<JsonCall>,
}

/// Header metadata carried over from the dump
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JsonHeader {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmd: Option<String>,
}

impl From<&GraphHeader> for JsonHeader {
    fn from(header: &GraphHeader) -> Self {
        Self {
            version: header.version.clone(),
            creator: header.creator.clone(),
            cmd: header.cmd.clone(),
        }
    }
}

/// Root JSON output structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonOutput {
    /// Format version identifier
    pub version: String,
    /// Format name
    pub format: String,
    pub header: JsonHeader,
    /// Declared events, in cost-vector order
    pub events: Vec<String>,
    /// Index of the entry point in `functions`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main: Option<usize>,
    pub functions: Vec<JsonFunction>,
}

impl JsonOutput {
    /// Snapshot a graph into its JSON representation
    pub fn from_graph(graph: &CallGraph) -> Self {
        let event_count = graph.events().len();
        let dense =
            |values: &dyn Fn(usize) -> i64| (0..event_count).map(values).collect::<Vec<_>>();

        let functions = graph
            .functions()
            .map(|function| JsonFunction {
                id: function.id().index(),
                name: function.name().to_string(),
                file: function.file().to_string(),
                own: dense(&|i| function.own_cost().get(i)),
                inclusive: dense(&|i| function.inclusive_at(i)),
                calls: function
                    .calls()
                    .map(|call| JsonCall {
                        line: call.line(),
                        target: call.function().map(|f| f.id().index()),
                        target_name: call.function().map(|f| f.name().to_string()),
                        cost: dense(&|i| call.cost().get(i)),
                    })
                    .collect(),
            })
            .collect();

        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            format: "grindgraph-json-v1".to_string(),
            header: JsonHeader::from(graph.header()),
            events: graph.events().names().to_vec(),
            main: graph.main_function().map(|f| f.id().index()),
            functions,
        }
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserConfig;
    use crate::parser::parse_lines;

    const DUMP: &str = "creator: xdebug 2.7.2
events: Time Memory
fl=(1) /srv/app.php
fn=(1) helper
4 7
fl=(1)
fn=(2) {main}
1 10 0
cfl=(1)
cfn=(1)
3 100 32
cfl=(1)
cfn=(99)
5 1 0";

    #[test]
    fn test_json_output_structure() {
        let graph = parse_lines(DUMP.lines(), &ParserConfig::default());
        let output = JsonOutput::from_graph(&graph);

        assert_eq!(output.format, "grindgraph-json-v1");
        assert_eq!(output.events, vec!["Time", "Memory"]);
        assert_eq!(output.main, Some(1));
        assert_eq!(output.header.creator.as_deref(), Some("xdebug 2.7.2"));

        let helper = &output.functions[0];
        assert_eq!(helper.own, vec![7, 0]);

        let main = &output.functions[1];
        assert_eq!(main.inclusive, vec![111, 32]);
        assert_eq!(main.calls.len(), 2);
        assert_eq!(main.calls[0].target, Some(0));
        assert_eq!(main.calls[1].target, None);
    }

    #[test]
    fn test_json_serialization_skips_unresolved_target() {
        let graph = parse_lines(DUMP.lines(), &ParserConfig::default());
        let json = JsonOutput::from_graph(&graph).to_json().unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let calls = &value["functions"][1]["calls"];
        assert_eq!(calls[0]["target_name"], "helper");
        assert!(calls[1].get("target").is_none());
        assert_eq!(value["main"], 1);
    }

    #[test]
    fn test_json_roundtrip_preserves_costs() {
        let graph = parse_lines(DUMP.lines(), &ParserConfig::default());
        let json = JsonOutput::from_graph(&graph).to_json().unwrap();
        let parsed: JsonOutput = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.functions[1].calls[0].cost, vec![100, 32]);
        assert_eq!(parsed.functions[1].calls[0].line, 3);
    }
}
