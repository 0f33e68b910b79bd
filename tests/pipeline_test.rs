mod common;

use common::{bert_tree, knowledge_graph, paper_embedder, transformer_tree, StemExtractor, TableGenerator};
use scholargraph::extract::PdfTextExtractor;
use scholargraph::{collect_pdfs, ExtractionConfig, Pipeline, ProcessError};
use std::sync::Arc;

fn pipeline() -> Pipeline {
    let generator = TableGenerator::default()
        .with("transformer", transformer_tree())
        .with("bert", bert_tree());
    Pipeline::new(Arc::new(StemExtractor), Arc::new(generator), &ExtractionConfig::default())
}

#[tokio::test]
async fn test_batch_continues_after_failures() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["transformer.pdf", "unreadable.pdf", "bert.pdf", "survey.pdf", "readme.md"] {
        std::fs::write(dir.path().join(name), b"%PDF-1.4").unwrap();
    }

    let pdfs = collect_pdfs(dir.path()).unwrap();
    assert_eq!(pdfs.len(), 4);

    let mut kg = knowledge_graph(0.85, paper_embedder());
    let summary = pipeline().process_batch(&mut kg, &pdfs).await;

    assert_eq!(summary.total, 4);
    assert_eq!(summary.succeeded(), 2);
    assert_eq!(summary.failures.len(), 2);

    // Sorted order: bert, survey, transformer, unreadable
    assert_eq!(summary.reports[0].paper_title, "bert");
    assert_eq!(summary.reports[1].paper_title, "transformer");
    assert_eq!(summary.reports[1].cross_paper_links().count(), 1);

    let failures: Vec<String> = summary.failures.iter().map(|f| f.to_string()).collect();
    assert_eq!(failures[0], "survey.pdf: Invalid concept tree: model returned prose");
    assert!(failures[1].starts_with("unreadable.pdf: No text content found in"));
    assert!(matches!(summary.failures[0].error, ProcessError::TreeGeneration(_)));
    assert!(matches!(summary.failures[1].error, ProcessError::Extraction(_)));

    let status = kg.status();
    assert_eq!(status.papers, 2);
    assert_eq!(status.nodes, 8);
}

#[tokio::test]
async fn test_process_single_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("transformer.pdf");
    std::fs::write(&path, b"%PDF-1.4").unwrap();

    let mut kg = knowledge_graph(0.85, paper_embedder());
    let report = pipeline().process_pdf(&mut kg, &path).await.unwrap();

    assert_eq!(report.paper_title, "transformer");
    assert_eq!(report.nodes_registered, 5);
    assert_eq!(report.hierarchical_edges, 4);
    assert_eq!(kg.papers().next().unwrap().depth, 3);
}

#[tokio::test]
async fn test_invalid_pdf_is_an_extraction_failure() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.pdf");
    std::fs::write(&path, b"this is not a pdf").unwrap();

    let generator = TableGenerator::default().with("broken", transformer_tree());
    let pipeline = Pipeline::new(
        Arc::new(PdfTextExtractor::new(10_000).unwrap()),
        Arc::new(generator),
        &ExtractionConfig::default(),
    );

    let mut kg = knowledge_graph(0.85, paper_embedder());
    let summary = pipeline.process_batch(&mut kg, &[path]).await;

    assert_eq!(summary.succeeded(), 0);
    assert_eq!(summary.failures.len(), 1);
    assert!(summary.failures[0].to_string().starts_with("broken.pdf: Failed to load PDF"));
    assert!(kg.graph().is_empty());
}
