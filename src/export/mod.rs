//! Graph export
//!
//! Renders the interchange form as pretty JSON or as a Mermaid `graph TD`
//! diagram. Hierarchical links are drawn solid, similarity links dotted and
//! annotated with their weight.

use crate::graph::{EdgeKind, Interchange};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Write;

/// Separator between wrapped label lines
pub const LINE_BREAK: &str = "<br/>";

/// Diagram rendering options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagramOptions {
    /// Maximum characters per label line
    pub wrap_width: usize,
    /// Weight shown for similarity links stored without one
    pub default_weight: f64,
}

impl Default for DiagramOptions {
    fn default() -> Self {
        Self {
            wrap_width: 20,
            default_weight: 0.85,
        }
    }
}

/// Greedy word wrap joined with `<br/>`.
///
/// Never produces an empty line; a word longer than `width` gets a line of
/// its own.
pub fn wrap_label(label: &str, width: usize) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in label.split_whitespace() {
        let word_len = word.chars().count();
        if current_len > 0 && current_len + 1 + word_len > width {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines.join(LINE_BREAK)
}

/// Escape characters Mermaid cannot take inside a quoted label
pub fn escape_label(label: &str) -> String {
    label.replace('"', "#quot;")
}

/// Serializes graphs for clients and files
#[derive(Debug, Clone, Default)]
pub struct GraphExporter {
    options: DiagramOptions,
}

impl GraphExporter {
    pub fn new(options: DiagramOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &DiagramOptions {
        &self.options
    }

    /// Pretty-printed interchange JSON
    pub fn to_json_pretty(&self, graph: &Interchange) -> serde_json::Result<String> {
        serde_json::to_string_pretty(graph)
    }

    /// Mermaid flowchart with one line per link.
    ///
    /// Diagram node ids are positional (`n0`, `n1`, ...) since composite
    /// keys may contain spaces and punctuation.
    pub fn render_mermaid(&self, graph: &Interchange) -> String {
        let labels = graph.labels();
        let mut ids: HashMap<&str, String> = graph
            .nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (node.id.as_str(), format!("n{}", i)))
            .collect();

        let mut out = String::from("graph TD");
        for link in &graph.links {
            let src = self.node_ref(&mut ids, &labels, &link.source);
            let tgt = self.node_ref(&mut ids, &labels, &link.target);
            match link.kind {
                EdgeKind::Hierarchical => {
                    let _ = write!(out, "\n    {} --> {}", src, tgt);
                }
                _ => {
                    let weight = link.weight.unwrap_or(self.options.default_weight);
                    let _ = write!(out, "\n    {} -. \"Sim: {:.2}\" .-> {}", src, weight, tgt);
                }
            }
        }
        out
    }

    fn node_ref<'a>(
        &self,
        ids: &mut HashMap<&'a str, String>,
        labels: &HashMap<&str, &str>,
        id: &'a str,
    ) -> String {
        let next = ids.len();
        let diagram_id = ids.entry(id).or_insert_with(|| format!("n{}", next)).clone();
        let label = labels.get(id).copied().unwrap_or(id);
        format!(
            "{}[\"{}\"]",
            diagram_id,
            escape_label(&wrap_label(label, self.options.wrap_width))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_label() {
        assert_eq!(
            wrap_label("Multi-Head Self Attention Mechanism", 20),
            "Multi-Head Self<br/>Attention Mechanism"
        );
        assert_eq!(wrap_label("Short", 20), "Short");
        assert_eq!(wrap_label("", 20), "");
    }

    #[test]
    fn test_wrap_long_word_no_empty_line() {
        let wrapped = wrap_label("Supercalifragilisticexpialidocious word", 10);
        assert_eq!(wrapped, "Supercalifragilisticexpialidocious<br/>word");
        assert!(!wrapped.starts_with(LINE_BREAK));
        assert!(!wrapped.contains("<br/><br/>"));
    }

    #[test]
    fn test_escape_label() {
        assert_eq!(escape_label("the \"best\" model"), "the #quot;best#quot; model");
    }

    #[test]
    fn test_empty_graph_diagram() {
        let exporter = GraphExporter::default();
        assert_eq!(exporter.render_mermaid(&Interchange::empty()), "graph TD");
    }
}
