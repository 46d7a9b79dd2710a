//! rawmodel CLI
//!
//! Command-line interface for exporting scene documents to rawmodel files
//! and inspecting existing exports.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};

use rawmodel_core::logging::{self, TracingConfig};
use rawmodel_export::{ExportOptions, ExportReport, NormalTransform, RawModel, RawModelExporter};
use rawmodel_scene::Scene;

/// rawmodel - flatten scenes into a single vertex/index buffer
#[derive(Parser)]
#[command(name = "rawmodel")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Export a scene document to a manifest and raw buffer
    Export(ExportArgs),

    /// Show the contents of an exported manifest
    Inspect(InspectArgs),
}

#[derive(Args)]
struct ExportArgs {
    /// Scene document (YAML or JSON)
    #[arg(short, long)]
    scene: PathBuf,

    /// Manifest path; the raw buffer is written next to it
    #[arg(short, long)]
    output: PathBuf,

    /// Root objects to export by name or path (can be repeated, default: all roots)
    #[arg(short, long)]
    root: Vec<String>,

    /// Copy referenced textures next to the manifest
    #[arg(long)]
    copy_textures: bool,

    /// Directory texture paths are relative to
    #[arg(long)]
    texture_root: Option<PathBuf>,

    /// Normal transform: forward, inverse-transpose
    #[arg(long)]
    normal_transform: Option<NormalTransform>,

    /// Write the manifest without indentation
    #[arg(long)]
    compact: bool,

    /// Export options file (YAML or JSON)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args)]
struct InspectArgs {
    /// Path to the manifest
    manifest: PathBuf,

    /// Output format: text, json
    #[arg(long, default_value = "text")]
    format: OutputFormat,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_with_config(TracingConfig::from_verbosity(cli.verbose));

    match cli.command {
        Commands::Export(args) => cmd_export(args),
        Commands::Inspect(args) => cmd_inspect(args),
    }
}

fn export_options(args: &ExportArgs) -> Result<ExportOptions> {
    let mut options = match &args.config {
        Some(path) => ExportOptions::from_path(path)
            .with_context(|| format!("Failed to load export options from {:?}", path))?,
        None => ExportOptions::default(),
    };

    // flags override the file
    if args.copy_textures {
        options.copy_textures = true;
    }
    if let Some(root) = &args.texture_root {
        options.texture_root = Some(root.clone());
    }
    if let Some(mode) = args.normal_transform {
        options.normal_transform = mode;
    }
    if args.compact {
        options.pretty_json = false;
    }

    Ok(options)
}

fn cmd_export(args: ExportArgs) -> Result<()> {
    let options = export_options(&args)?;

    info!("Loading scene: {:?}", args.scene);
    let scene = Scene::load(&args.scene).context("Failed to load scene")?;
    let selection = scene.select(&args.root).context("Failed to select root objects")?;

    let report = RawModelExporter::new(options)
        .export(&selection, scene.name(), &args.output)
        .context("Export failed")?;

    print_report(&report);
    Ok(())
}

fn print_report(report: &ExportReport) {
    println!("Exported {:?}", report.manifest_path);
    println!("  Raw buffer:  {:?}", report.blob_path);
    println!("  Objects:     {}", report.objects_visited);
    println!("  Vertices:    {}", report.vertex_count);
    println!("  Triangles:   {}", report.triangle_count);
    println!("  Meshes:      {}", report.mesh_count);
    println!("  Textures:    {}", report.textures.len());

    if !report.diagnostics.is_empty() {
        println!("\n{} submeshes skipped:", report.diagnostics.len());
        for diagnostic in &report.diagnostics {
            println!("  {}", diagnostic);
        }
    }

    if let Some(copy) = &report.texture_copy {
        println!(
            "\nTextures copied: {}, already in place: {}, failed: {}",
            copy.copied.len(),
            copy.skipped.len(),
            copy.failed.len()
        );
        for (path, reason) in &copy.failed {
            warn!("Texture {:?} not copied: {}", path, reason);
        }
    }
}

fn cmd_inspect(args: InspectArgs) -> Result<()> {
    let model = RawModel::load(&args.manifest).context("Failed to load raw model")?;
    let problems = model.problems();
    let header = &model.manifest.header;

    match args.format {
        OutputFormat::Json => {
            let summary = serde_json::json!({
                "manifest": model.manifest_path,
                "header": header,
                "boundingBox": model.manifest.bounding_box,
                "meshes": model.manifest.meshes,
                "problems": problems,
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        OutputFormat::Text => {
            println!("Manifest:   {:?}", model.manifest_path);
            println!("Version:    {}", header.version);
            println!("Source:     {}", header.original_filename);
            println!("Raw buffer: {}", header.rawbuffer_filename);
            println!("Vertices:   {}", header.num_vertices);
            println!("Triangles:  {}", header.num_triangles);

            let bbox = &model.manifest.bounding_box;
            if bbox.is_valid() {
                println!(
                    "Bounds:     [{}, {}, {}] - [{}, {}, {}]",
                    bbox.min.x, bbox.min.y, bbox.min.z, bbox.max.x, bbox.max.y, bbox.max.z
                );
            } else {
                println!("Bounds:     empty");
            }

            println!("\n{:<8} {:<10} {:<10} {:<6} {}", "Mesh", "Start", "Indices", "Alpha", "Diffuse");
            println!("{:-<8} {:-<10} {:-<10} {:-<6} {:-<40}", "", "", "", "", "");
            for (i, mesh) in model.manifest.meshes.iter().enumerate() {
                let diffuse = serde_json::to_string(&mesh.material.diffuse_origin)?;
                println!(
                    "{:<8} {:<10} {:<10} {:<6} {}",
                    i, mesh.range.start_index, mesh.range.num_indices, mesh.material.alpha_testing, diffuse
                );
            }
            println!("\nTotal: {} meshes", model.manifest.meshes.len());

            for problem in &problems {
                println!("Problem: {}", problem);
            }
        }
    }

    if !problems.is_empty() {
        bail!("{} problems found in {:?}", problems.len(), args.manifest);
    }
    Ok(())
}
