mod common;

use common::{bert_tree, knowledge_graph, paper_embedder, transformer_tree, LabelEmbedder};
use scholargraph::export::{wrap_label, DiagramOptions, GraphExporter, LINE_BREAK};
use scholargraph::graph::{Interchange, InterchangeLink, InterchangeNode, PropertyMap};
use scholargraph::{ConceptNode, EdgeKind};

fn node(id: &str, label: &str) -> InterchangeNode {
    let mut attributes = PropertyMap::new();
    attributes.insert("label".to_string(), label.into());
    InterchangeNode {
        id: id.to_string(),
        attributes,
    }
}

#[tokio::test]
async fn test_empty_graph_export() {
    let kg = knowledge_graph(0.85, LabelEmbedder::new());
    let exported = kg.export();
    assert_eq!(exported.nodes.len(), 0);
    assert_eq!(exported.links.len(), 0);

    let json: serde_json::Value =
        serde_json::from_str(&kg.exporter().to_json_pretty(&exported).unwrap()).unwrap();
    assert_eq!(json["directed"], false);
    assert_eq!(json["multigraph"], false);
    assert_eq!(json["nodes"].as_array().unwrap().len(), 0);
    assert_eq!(json["links"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_interchange_json_shape() {
    let mut kg = knowledge_graph(0.85, paper_embedder());
    kg.process("transformer", transformer_tree()).await.unwrap();
    kg.process("bert", bert_tree()).await.unwrap();

    let json = serde_json::to_value(kg.export()).unwrap();
    let first = &json["nodes"][0];
    assert_eq!(first["id"], "transformer_root");
    assert_eq!(first["label"], "Transformer");
    assert_eq!(first["summary"], "Attention-only sequence model");
    assert_eq!(first["type"], "concept");
    assert_eq!(first["paper"], "transformer");

    let links = json["links"].as_array().unwrap();
    let hierarchical = &links[0];
    assert_eq!(hierarchical["source"], "transformer_root");
    assert_eq!(hierarchical["target"], "transformer_attn");
    assert_eq!(hierarchical["type"], "hierarchical");
    assert!(hierarchical.get("weight").is_none());

    let cross: Vec<_> = links.iter().filter(|l| l["type"] == "cross-paper").collect();
    assert_eq!(cross.len(), 1);
    assert!(cross[0]["weight"].as_f64().unwrap() > 0.85);

    // A saved graph reads back into the same interchange form
    let text = kg.exporter().to_json_pretty(&kg.export()).unwrap();
    let restored: Interchange = serde_json::from_str(&text).unwrap();
    let original = kg.export();
    assert_eq!(restored.nodes, original.nodes);
    assert_eq!(restored.links.len(), original.links.len());
    for (a, b) in restored.links.iter().zip(&original.links) {
        assert_eq!((&a.source, &a.target, a.kind), (&b.source, &b.target, b.kind));
        assert_eq!(a.weight.is_some(), b.weight.is_some());
    }
}

#[tokio::test]
async fn test_diagram_wraps_and_escapes_labels() {
    let embedder = LabelEmbedder::new()
        .with("Scaled Dot-Product Attention Mechanism", vec![1.0, 0.0])
        .with("The \"Query\" Projection", vec![0.0, 1.0]);
    let mut kg = knowledge_graph(0.85, embedder);
    let root = ConceptNode::new("root", "Scaled Dot-Product Attention Mechanism", "")
        .with_child(ConceptNode::new("q", "The \"Query\" Projection", ""));
    kg.process("P", root).await.unwrap();

    let diagram = kg.export_diagram();
    let lines: Vec<&str> = diagram.lines().collect();
    assert_eq!(lines[0], "graph TD");
    assert_eq!(
        lines[1],
        "    n0[\"Scaled Dot-Product<br/>Attention Mechanism\"] --> n1[\"The #quot;Query#quot;<br/>Projection\"]"
    );
    assert!(!diagram.contains("\"Query\""));
}

#[tokio::test]
async fn test_diagram_similarity_links() {
    let mut kg = knowledge_graph(0.85, paper_embedder());
    kg.process("transformer", transformer_tree()).await.unwrap();
    kg.process("bert", bert_tree()).await.unwrap();

    let diagram = kg.export_diagram();
    let dotted: Vec<&str> = diagram.lines().filter(|l| l.contains(" -. ")).collect();
    assert_eq!(dotted.len(), 1);
    assert!(dotted[0].contains("[\"Transformer Encoder\"] -. \"Sim: 1.00\" .->"));
    assert!(dotted[0].ends_with("[\"Self-Attention\"]"));
    assert_eq!(diagram.lines().filter(|l| l.contains(" --> ")).count(), 6);
}

#[test]
fn test_missing_weight_and_unknown_endpoint() {
    let graph = Interchange {
        directed: false,
        multigraph: false,
        nodes: vec![node("a_1", "Alpha")],
        links: vec![InterchangeLink {
            source: "a_1".to_string(),
            target: "b_9".to_string(),
            kind: EdgeKind::SemanticRelated,
            weight: None,
        }],
    };

    let diagram = GraphExporter::default().render_mermaid(&graph);
    assert_eq!(diagram, "graph TD\n    n0[\"Alpha\"] -. \"Sim: 0.85\" .-> n1[\"b_9\"]");
}

#[test]
fn test_custom_wrap_width() {
    let graph = Interchange {
        directed: false,
        multigraph: false,
        nodes: vec![node("a", "one two three"), node("b", "four")],
        links: vec![InterchangeLink {
            source: "a".to_string(),
            target: "b".to_string(),
            kind: EdgeKind::Hierarchical,
            weight: None,
        }],
    };
    let exporter = GraphExporter::new(DiagramOptions {
        wrap_width: 3,
        ..DiagramOptions::default()
    });
    assert_eq!(
        exporter.render_mermaid(&graph),
        "graph TD\n    n0[\"one<br/>two<br/>three\"] --> n1[\"four\"]"
    );
}

#[test]
fn test_wrap_never_emits_empty_lines() {
    for label in ["", "   ", "a", "Extraordinarily-long-hyphenated-term here", "x  y   z"] {
        let wrapped = wrap_label(label, 5);
        assert!(wrapped.split(LINE_BREAK).all(|line| !line.is_empty() || wrapped.is_empty()));
    }
}
