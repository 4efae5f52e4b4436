use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use tracing::debug;

use schematic_editor::config::EditorSettings;
use schematic_editor::export::{OutlineSymbols, SvgOptions, export_svg, write_svg};
use schematic_editor::project::{ProjectRecord, export_json};
use schematic_editor::resolve::resolve_wire;

#[derive(Parser, Debug)]
#[command(author, version, about = "Render and inspect saved schematic projects", long_about = None)]
struct Cli {
    /// Editor settings JSON file
    #[arg(long, value_name = "FILE", global = true)]
    settings: Option<Utf8PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a project record to SVG
    Svg {
        /// Project record JSON file
        #[arg(value_name = "PROJECT")]
        project: Utf8PathBuf,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<Utf8PathBuf>,
        /// Draw terminal and junction markers
        #[arg(long)]
        nodes: bool,
    },
    /// Re-export a project record with an export timestamp
    Json {
        #[arg(value_name = "PROJECT")]
        project: Utf8PathBuf,
        #[arg(short, long)]
        output: Option<Utf8PathBuf>,
    },
    /// Print every wire with its resolved points
    Inspect {
        #[arg(value_name = "PROJECT")]
        project: Utf8PathBuf,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn read_record(path: &Utf8PathBuf) -> Result<ProjectRecord> {
    let text = std::fs::read_to_string(path).with_context(|| format!("Open {}", path))?;
    ProjectRecord::from_json(&text).with_context(|| format!("Failed to parse {}", path))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // without a settings file the export stays gridless
    let base_options = match &cli.settings {
        Some(path) => {
            let settings =
                EditorSettings::load(path).with_context(|| format!("Failed to load settings {}", path))?;
            debug!(?settings, "settings");
            SvgOptions::from_settings(&settings)
        }
        None => SvgOptions::default(),
    };

    match cli.command {
        Command::Svg { project, output, nodes } => {
            let doc = read_record(&project)?.to_document();
            let options = SvgOptions {
                show_nodes: nodes,
                ..base_options
            };
            match output {
                Some(path) => {
                    write_svg(&doc, &OutlineSymbols, &options, &path)
                        .with_context(|| format!("Failed to write {}", path))?;
                }
                None => print!("{}", export_svg(&doc, &OutlineSymbols, &options)?),
            }
        }
        Command::Json { project, output } => {
            let json = export_json(&read_record(&project)?)?;
            match output {
                Some(path) => std::fs::write(&path, json).with_context(|| format!("Failed to write {}", path))?,
                None => println!("{}", json),
            }
        }
        Command::Inspect { project } => {
            let record = read_record(&project)?;
            let doc = record.to_document();
            println!(
                "{} ({}): {} components, {} wires, {} nodes, {} texts",
                record.name,
                record.id,
                doc.components.len(),
                doc.wires.len(),
                doc.nodes.len(),
                doc.texts.len()
            );
            for wire in doc.wires.values() {
                let points: Vec<String> = resolve_wire(wire, &doc)
                    .iter()
                    .map(|p| format!("({}, {})", p.x, p.y))
                    .collect();
                println!("  {}: {}", wire.id, points.join(" -> "));
            }
        }
    }
    Ok(())
}
