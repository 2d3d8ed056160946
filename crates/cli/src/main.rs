//! Protoc Invoker CLI
//!
//! Command-line interface for compiling a tree of `.proto` files into a
//! FileDescriptorSet.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use prost::Message;
use protoc_invoker::{scan_proto_files, DescriptorSummary, ProtocInvoker};
use protoc_invoker_common::ProtoConfiguration;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "protoc-invoker")]
#[command(version, about = "Run protoc over a .proto tree and inspect the descriptors", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List the .proto files that would be passed to protoc
    #[command(after_help = "EXAMPLES:\n  \
        protoc-invoker scan --root ./proto")]
    Scan {
        /// Root of the .proto tree
        #[arg(short, long)]
        root: PathBuf,
    },

    /// Compile every .proto file under the root and summarize the result
    #[command(after_help = "EXAMPLES:\n  \
        # Compile with an extra include directory\n  \
        protoc-invoker compile --root ./proto -I ./third_party\n\n  \
        # Use a config file and save the descriptor set\n  \
        protoc-invoker compile --config protos.yaml --output descriptors.pb\n\n  \
        # Machine-readable summary\n  \
        protoc-invoker compile --root ./proto --json")]
    Compile {
        /// Root of the .proto tree (overrides the config file)
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// Additional include directory (repeatable)
        #[arg(short = 'I', long = "include")]
        includes: Vec<PathBuf>,

        /// YAML or JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// protoc binary to run (defaults to $PROTOC, then protoc on PATH)
        #[arg(long)]
        protoc: Option<String>,

        /// Write the encoded FileDescriptorSet to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,

        /// Delete the temporary descriptor file after the run
        #[arg(long)]
        no_keep_temp: bool,
    },
}

/// Compile options gathered from the command line
#[derive(Debug, Default)]
struct CompileArgs {
    root: Option<PathBuf>,
    includes: Vec<PathBuf>,
    config: Option<PathBuf>,
    protoc: Option<String>,
    no_keep_temp: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if cli.verbose {
        println!("{} Verbose mode enabled", "→".cyan());
    }

    match cli.command {
        Commands::Scan { root } => scan_command(&root)?,
        Commands::Compile {
            root,
            includes,
            config,
            protoc,
            output,
            json,
            no_keep_temp,
        } => {
            let args = CompileArgs {
                root,
                includes,
                config,
                protoc,
                no_keep_temp,
            };
            compile_command(&args, output.as_deref(), json, cli.verbose)?;
        }
    }

    Ok(())
}

fn scan_command(root: &Path) -> Result<()> {
    println!("{} Scanning for proto files: {}", "→".cyan(), root.display());

    let files = scan_proto_files(root).context("Failed to scan proto tree")?;
    for file in &files {
        println!("  {}", file);
    }

    println!("{} Discovered {} proto files", "✓".green(), files.len());
    Ok(())
}

fn compile_command(
    args: &CompileArgs,
    output: Option<&Path>,
    json: bool,
    verbose: bool,
) -> Result<()> {
    let config = build_configuration(args)?;

    if verbose {
        println!("  Root: {}", config.root_directory);
        for include in &config.include_paths {
            println!("  Include: {}", include);
        }
        if let Some(protoc) = &config.protoc_path {
            println!("  Protoc: {}", protoc);
        }
    }

    let invoker =
        ProtocInvoker::for_config(&config).context("Invalid proto configuration")?;

    if !json {
        println!(
            "{} Compiling protos under {} with {}",
            "→".cyan(),
            invoker.proto_root().display(),
            invoker.runner().binary().display().to_string().yellow()
        );
    }

    let descriptor_set = invoker
        .invoke_root()
        .context("Failed to compile proto files")?;
    let summary = DescriptorSummary::from_set(&descriptor_set);

    if let Some(path) = output {
        std::fs::write(path, descriptor_set.encode_to_vec())
            .with_context(|| format!("Failed to write descriptor set to {}", path.display()))?;
        if !json {
            println!(
                "{} Wrote descriptor set to {}",
                "✓".green(),
                path.display()
            );
        }
    }

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("Failed to render summary")?
        );
        return Ok(());
    }

    print_summary(&summary, verbose);
    Ok(())
}

/// Merge the config file (if any) with command-line overrides
///
/// Flags win over file values; `-I` directories are appended after the ones
/// listed in the file.
fn build_configuration(args: &CompileArgs) -> Result<ProtoConfiguration> {
    let mut config = match &args.config {
        Some(path) => ProtoConfiguration::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => {
            let root = args
                .root
                .as_ref()
                .context("Either --root or --config must be provided")?;
            ProtoConfiguration::new(root.display().to_string())
        }
    };

    if let Some(root) = &args.root {
        config.root_directory = root.display().to_string();
    }
    config
        .include_paths
        .extend(args.includes.iter().map(|p| p.display().to_string()));
    if let Some(protoc) = &args.protoc {
        config.protoc_path = Some(protoc.clone());
    }
    if args.no_keep_temp {
        config.keep_descriptor_file = false;
    }

    Ok(config)
}

fn print_summary(summary: &DescriptorSummary, verbose: bool) {
    println!("\n{}", "✓ Compilation successful!".green().bold());
    println!("\n{}", "Descriptor Set:".bold());
    println!("  Files: {}", summary.files.len());
    println!("  Messages: {}", summary.message_count());
    println!("  Services: {}", summary.service_count());

    println!("\n{}", "Files:".bold());
    for file in &summary.files {
        match &file.package {
            Some(package) => println!("  • {} ({})", file.name.cyan(), package),
            None => println!("  • {}", file.name.cyan()),
        }
        if !verbose {
            continue;
        }
        for message in &file.messages {
            println!("    message {}", message);
        }
        for enum_name in &file.enums {
            println!("    enum {}", enum_name);
        }
        for service in &file.services {
            println!("    service {} ({} methods)", service.name, service.methods.len());
        }
    }
}
