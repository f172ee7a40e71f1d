use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use mm_core::{LintSeverity, OutlineNode, infer_outline, lint_diagram, parse_document_json};
use mm_editor::{EditorConfig, Session};

#[derive(Parser)]
#[command(
    name = "mindmap",
    about = "Turn document text into mind maps and inspect mind map files"
)]
struct Cli {
    /// Editor configuration (JSON; missing keys keep their defaults)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the outline inferred from extracted document text
    Outline {
        file: PathBuf,
        /// Emit the outline as JSON instead of an indented tree
        #[arg(long)]
        json: bool,
    },
    /// Convert extracted document text into a mind map document
    Convert {
        file: PathBuf,
        /// Document name (defaults to the inferred title)
        #[arg(long)]
        name: Option<String>,
        /// Output file (stdout if not provided)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
    /// Validate a mind map document and report lint findings
    Check { file: PathBuf },
    /// Arrange every node of a document on a circle
    Layout {
        file: PathBuf,
        /// Circle radius (defaults to the configured layout radius)
        #[arg(long)]
        radius: Option<f64>,
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{}: {source}", path.display())]
    Config {
        path: PathBuf,
        source: mm_core::Error,
    },
    #[error(transparent)]
    Core(#[from] mm_core::Error),
    #[error("{0} problem(s) found")]
    Lint(usize),
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("ERROR: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = match &cli.config {
        Some(path) => EditorConfig::from_json(&read(path)?).map_err(|source| CliError::Config {
            path: path.clone(),
            source,
        })?,
        None => EditorConfig::default(),
    };
    // One-shot conversions never touch persistent storage.
    config.autosave = false;

    match cli.command {
        Command::Outline { file, json } => {
            let outline = infer_outline(&read(&file)?, &file_name(&file));
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&outline).map_err(mm_core::Error::from)?
                );
            } else {
                print!("{}", render_outline(&outline));
            }
        }
        Command::Convert { file, name, output } => {
            let mut session = Session::new(config);
            session.convert_document(&read(&file)?, &file_name(&file))?;
            if let Some(name) = name {
                session.set_name(&name);
            }
            write_output(output.as_deref(), &session.export_json()?)?;
        }
        Command::Check { file } => {
            let diagram = parse_document_json(&read(&file)?)?;
            let diagnostics = lint_diagram(&diagram);
            for diag in &diagnostics {
                let level = match diag.severity {
                    LintSeverity::Warning => "warning",
                    LintSeverity::Info => "info",
                };
                match diag.node_id {
                    Some(id) => println!("{level}[{}] {id}: {}", diag.rule, diag.message),
                    None => println!("{level}[{}] {}", diag.rule, diag.message),
                }
            }
            let warnings = diagnostics
                .iter()
                .filter(|d| d.severity == LintSeverity::Warning)
                .count();
            println!(
                "\"{}\": {} nodes, {} edges",
                diagram.name,
                diagram.nodes.len(),
                diagram.edges.len()
            );
            if warnings > 0 {
                return Err(CliError::Lint(warnings));
            }
        }
        Command::Layout {
            file,
            radius,
            output,
        } => {
            if let Some(radius) = radius {
                config.layout_radius = radius;
            }
            let mut session = Session::new(config);
            session.import_json(&read(&file)?)?;
            session.auto_layout()?;
            write_output(output.as_deref(), &session.export_json()?)?;
        }
    }
    Ok(())
}

fn read(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn write_output(output: Option<&Path>, text: &str) -> Result<(), CliError> {
    match output {
        Some(path) => {
            std::fs::write(path, text).map_err(|source| CliError::Write {
                path: path.to_path_buf(),
                source,
            })?;
            log::info!("wrote {}", path.display());
            Ok(())
        }
        None => {
            println!("{text}");
            Ok(())
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Indented tree, two spaces per level.
fn render_outline(outline: &OutlineNode) -> String {
    let mut out = String::new();
    let mut pending = vec![(outline, 0)];
    while let Some((node, depth)) = pending.pop() {
        let _ = writeln!(out, "{}{}", "  ".repeat(depth), node.title);
        pending.extend(node.children.iter().rev().map(|child| (child, depth + 1)));
    }
    out
}
