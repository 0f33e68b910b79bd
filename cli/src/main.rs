//! ScholarGraph CLI: turn a folder of PDFs into a knowledge-graph JSON file,
//! and inspect or render saved graphs.

use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use scholargraph::{
    collect_pdfs, AppConfig, DiagramOptions, EmbeddingClient, GraphExporter, Interchange,
    InterchangeLink, KnowledgeGraph, Pipeline,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "scholargraph", version, about = "ScholarGraph: research PDFs to a knowledge graph")]
struct Cli {
    /// Log progress at debug level
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Output format for link listings
    #[arg(long, default_value = "table", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Process PDFs and save the resulting graph
    Build {
        /// A PDF file or a directory containing PDFs
        #[arg(long, short)]
        input: PathBuf,

        /// Where to write the graph JSON
        #[arg(long, short, default_value = "graph_output.json")]
        output: PathBuf,

        /// Similarity threshold for cross-paper links (0.0 to 1.0)
        #[arg(long, short)]
        threshold: Option<f64>,

        /// YAML configuration file
        #[arg(long, short, env = "SCHOLARGRAPH_CONFIG")]
        config: Option<PathBuf>,
    },
    /// List the inter-paper links of a saved graph
    Inspect {
        /// Graph JSON written by `build`
        graph: PathBuf,
    },
    /// Print a saved graph as a Mermaid diagram
    Diagram {
        /// Graph JSON written by `build`
        graph: PathBuf,

        /// Characters per label line
        #[arg(long, default_value_t = 20)]
        wrap_width: usize,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let result = match cli.command {
        Commands::Build { input, output, threshold, config } => {
            run_build(&input, &output, threshold, config.as_deref(), &cli.format).await
        }
        Commands::Inspect { graph } => run_inspect(&graph, &cli.format),
        Commands::Diagram { graph, wrap_width } => run_diagram(&graph, wrap_width),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run_build(
    input: &Path,
    output: &Path,
    threshold: Option<f64>,
    config_path: Option<&Path>,
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load(config_path)?;
    if let Some(threshold) = threshold {
        config.linking.similarity_threshold = threshold;
        config.validate()?;
    }

    if !input.exists() {
        return Err(format!("Input path '{}' does not exist", input.display()).into());
    }
    if input.is_file() && !is_pdf(input) {
        return Err(format!("'{}' is not a PDF file", input.display()).into());
    }
    let pdfs = collect_pdfs(input)?;
    if pdfs.is_empty() {
        return Err(format!("No PDF files found in directory '{}'", input.display()).into());
    }
    println!("Found {} PDF(s) to process.", pdfs.len());

    let embedder = EmbeddingClient::new(&config.embedding)?;
    let mut kg = KnowledgeGraph::new(config.linking.clone(), Arc::new(embedder), config.diagram.clone())?;
    let pipeline = Pipeline::from_config(&config)?;

    let summary = pipeline.process_batch(&mut kg, &pdfs).await;
    for failure in &summary.failures {
        eprintln!("Failed: {}", failure);
    }

    let graph = kg.export();
    println!("Saving graph to {}...", output.display());
    std::fs::write(output, kg.exporter().to_json_pretty(&graph)?)?;

    println!("Processed {}/{} papers.", summary.succeeded(), summary.total);
    println!(
        "Knowledge graph has {} nodes and {} edges.",
        graph.nodes.len(),
        graph.links.len()
    );

    let cross: Vec<&InterchangeLink> = graph.cross_paper_links().collect();
    if cross.is_empty() {
        println!("No inter-paper relationships found at threshold {}.", config.linking.similarity_threshold);
    } else {
        println!("Found {} inter-paper relationships:", cross.len());
        print_links(&graph, &cross, format)?;
    }
    Ok(())
}

fn run_inspect(path: &Path, format: &OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let graph = load_graph(path)?;
    println!("Total nodes: {}", graph.nodes.len());
    println!("Total links: {}", graph.links.len());

    let links = graph.inter_paper_links();
    println!("Inter-paper links found: {}", links.len());
    if !links.is_empty() {
        print_links(&graph, &links, format)?;
    }
    Ok(())
}

fn run_diagram(path: &Path, wrap_width: usize) -> Result<(), Box<dyn std::error::Error>> {
    if wrap_width == 0 {
        return Err("--wrap-width must be at least 1".into());
    }
    let graph = load_graph(path)?;
    let exporter = GraphExporter::new(DiagramOptions {
        wrap_width,
        ..DiagramOptions::default()
    });
    println!("{}", exporter.render_mermaid(&graph));
    Ok(())
}

fn load_graph(path: &Path) -> Result<Interchange, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

fn format_weight(weight: Option<f64>) -> String {
    weight.map(|w| format!("{:.2}", w)).unwrap_or_else(|| "N/A".to_string())
}

fn print_links(
    graph: &Interchange,
    links: &[&InterchangeLink],
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => {
            let rows: Vec<serde_json::Value> = links
                .iter()
                .map(|l| {
                    serde_json::json!({
                        "source": l.source,
                        "source_label": graph.label_or_id(&l.source),
                        "target": l.target,
                        "target_label": graph.label_or_id(&l.target),
                        "type": l.kind,
                        "weight": l.weight,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec!["Source", "Target", "Type", "Similarity"]);
            for link in links {
                table.add_row(vec![
                    graph.label_or_id(&link.source).to_string(),
                    graph.label_or_id(&link.target).to_string(),
                    link.kind.to_string(),
                    format_weight(link.weight),
                ]);
            }
            println!("{}", table);
        }
    }
    Ok(())
}
