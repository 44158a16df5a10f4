use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context as AnyhowContext, Result};
use clap::{ArgAction, Parser, Subcommand};
use helix_format::{EncodeOptions, Format, ResourceCodec, ResourceRegistry};
use helix_models::navigation::{children, descendants, equal, equivalent, Node};
use helix_models::schema::{lookup, TypeInfo};
use helix_models::{PrimitiveNode, Resource, ResourceType};

mod config;
mod logging;

use crate::config::CliConfig;

#[derive(Parser)]
#[command(
    name = "helix",
    about = "Decode, convert and compare FHIR resources",
    version,
    arg_required_else_help = true
)]
struct Cli {
    /// Configuration file (defaults to ./helix.toml when present).
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Resource types to accept (repeatable). Defaults to every known type.
    #[arg(long = "only", global = true, value_name = "TYPE")]
    only: Vec<ResourceTypeArg>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a resource and summarize it.
    Inspect {
        /// Path to a resource file (or "-" for stdin).
        input: PathBuf,
        /// Input format: json or xml. Guessed from the file name or content if omitted.
        #[arg(short, long)]
        format: Option<Format>,
    },

    /// Convert a resource between JSON and XML.
    Convert {
        /// Path to a resource file (or "-" for stdin).
        input: PathBuf,
        /// Input format. Guessed from the file name or content if omitted.
        #[arg(long)]
        from: Option<Format>,
        /// Output format. Defaults to the other format, or to the output file's extension.
        #[arg(long)]
        to: Option<Format>,
        /// Output file path (stdout if omitted).
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Write without indentation.
        #[arg(long, action = ArgAction::SetTrue)]
        compact: bool,
    },

    /// List the children of a resource, optionally filtered by name.
    Children {
        /// Path to a resource file (or "-" for stdin).
        input: PathBuf,
        /// Only children with this name (repeatable).
        #[arg(short, long = "name", value_name = "NAME")]
        names: Vec<String>,
        /// Walk all descendants instead of direct children.
        #[arg(short, long, action = ArgAction::SetTrue)]
        recursive: bool,
        #[arg(short, long)]
        format: Option<Format>,
    },

    /// Compare two resources. Exits with status 1 when they differ.
    Compare {
        left: PathBuf,
        right: PathBuf,
        /// Ignore element and resource ids.
        #[arg(long, action = ArgAction::SetTrue)]
        equivalent: bool,
    },

    /// List known resource types, or describe one type's fields.
    Types {
        /// Type name (e.g. Patient, HumanName, Bundle.entry).
        name: Option<String>,
    },

    /// Print CLI version.
    Version,
}

/// `--only` value, parsed through the resource type table.
#[derive(Clone, Copy)]
struct ResourceTypeArg(ResourceType);

impl std::str::FromStr for ResourceTypeArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.parse().map(Self).map_err(|e: helix_models::Error| e.to_string())
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = CliConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))?;
    logging::init_logging(&config.logging).context("Failed to initialize logging")?;

    let registry = if cli.only.is_empty() {
        ResourceRegistry::default()
    } else {
        ResourceRegistry::with_types(cli.only.iter().map(|arg| arg.0))
    };
    tracing::debug!(types = registry.len(), "Registry ready");

    match cli.command {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Inspect { input, format } => {
            let codec = ResourceCodec::new(&registry);
            let resource = read_resource(&codec, &input, format)?;
            print_summary(&resource);
        }
        Commands::Convert {
            input,
            from,
            to,
            output,
            compact,
        } => {
            let options = if compact {
                EncodeOptions::compact()
            } else {
                config.output.clone()
            };
            let codec = ResourceCodec::new(&registry).with_options(options);
            let (resource, from) = read_resource_with_format(&codec, &input, from)?;
            let to = to
                .or_else(|| output.as_deref().and_then(Format::from_path))
                .unwrap_or(match from {
                    Format::Json => Format::Xml,
                    Format::Xml => Format::Json,
                });
            tracing::info!(%from, %to, resource_type = %resource.resource_type(), "Converting");

            let mut bytes = codec
                .encode_any(&resource, to)
                .with_context(|| format!("Failed to encode as {to}"))?;
            bytes.push(b'\n');
            write_output(output.as_deref(), &bytes)?;
        }
        Commands::Children {
            input,
            names,
            recursive,
            format,
        } => {
            let codec = ResourceCodec::new(&registry);
            let resource = read_resource(&codec, &input, format)?;
            let root = Node::from(&resource);
            let found = if recursive {
                let mut all = descendants(root);
                if !names.is_empty() {
                    all.retain(|child| names.iter().any(|n| n == child.name));
                }
                all
            } else if names.is_empty() {
                children(root, None)
            } else {
                let names: Vec<&str> = names.iter().map(String::as_str).collect();
                children(root, Some(names.as_slice()))
            };
            for child in found {
                println!("{}", describe_child(child.name, child.node));
            }
        }
        Commands::Compare {
            left,
            right,
            equivalent: ignore_ids,
        } => {
            let codec = ResourceCodec::new(&registry);
            let a = read_resource(&codec, &left, None)?;
            let b = read_resource(&codec, &right, None)?;
            let same = if ignore_ids {
                equivalent(Node::from(&a), Node::from(&b))
            } else {
                equal(Node::from(&a), Node::from(&b))
            };
            let relation = if ignore_ids { "equivalent" } else { "equal" };
            if same {
                println!("{relation}");
            } else {
                println!("not {relation}");
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Types { name } => match name {
            None => {
                for name in registry.names() {
                    println!("{name}");
                }
            }
            Some(name) => {
                let Some(info) = lookup(&name) else {
                    bail!("Unknown type: {name}");
                };
                print_type_info(info);
            }
        },
    }

    Ok(ExitCode::SUCCESS)
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    if path == Path::new("-") {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .context("Failed to read stdin")?;
        Ok(buf)
    } else {
        fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
    }
}

/// Explicit format, then file extension, then content sniffing.
fn resolve_format(path: &Path, explicit: Option<Format>, input: &[u8]) -> Result<Format> {
    explicit
        .or_else(|| Format::from_path(path))
        .or_else(|| Format::sniff(input))
        .with_context(|| format!("Cannot tell the format of {}; use --format", path.display()))
}

fn read_resource_with_format(
    codec: &ResourceCodec<'_>,
    path: &Path,
    format: Option<Format>,
) -> Result<(Resource, Format)> {
    let input = read_input(path)?;
    let format = resolve_format(path, format, &input)?;
    let resource = codec
        .decode_any(&input, format)
        .with_context(|| format!("Failed to decode {} as {format}", path.display()))?;
    Ok((resource, format))
}

fn read_resource(
    codec: &ResourceCodec<'_>,
    path: &Path,
    format: Option<Format>,
) -> Result<Resource> {
    read_resource_with_format(codec, path, format).map(|(resource, _)| resource)
}

fn write_output(path: Option<&Path>, bytes: &[u8]) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(bytes)?;
            stdout.flush()?;
            Ok(())
        }
    }
}

fn print_summary(resource: &Resource) {
    let root = Node::from(resource);
    println!("resourceType: {}", resource.resource_type());
    println!("id: {}", resource.id().unwrap_or("-"));
    if let Some(updated) = resource
        .meta()
        .and_then(|meta| meta.last_updated.value())
    {
        println!("lastUpdated: {updated}");
    }

    if let Resource::Bundle(bundle) = resource {
        if let Some(bundle_type) = bundle.bundle_type() {
            println!("bundle type: {}", bundle_type.as_code());
        }
        for (index, entry) in bundle.resources().enumerate() {
            println!(
                "entry[{index}]: {}/{}",
                entry.resource_type(),
                entry.id().unwrap_or("-")
            );
        }
    }

    let all = descendants(root);
    let embedded = all
        .iter()
        .filter(|child| child.node.type_info().is_some_and(TypeInfo::is_resource))
        .count();
    let extensions = all.iter().filter(|child| child.name == "extension").count();
    println!("nodes: {}", all.len());
    println!("embedded resources: {embedded}");
    println!("extensions: {extensions}");

    println!("fields:");
    for child in children(root, None) {
        println!("  {}", describe_child(child.name, child.node));
    }
}

fn describe_child(name: &str, node: Node<'_>) -> String {
    match node {
        Node::Primitive(p) => describe_primitive(name, p),
        Node::Element(_) => format!("{name}: {}", node.type_name()),
    }
}

fn describe_primitive(name: &str, p: &dyn PrimitiveNode) -> String {
    let value = p
        .scalar()
        .map(|s| s.to_lexical())
        .unwrap_or_else(|| "(no value)".to_string());
    let mut line = format!("{name}: {} = {value}", p.type_name());
    if let Some(id) = p.id() {
        line.push_str(&format!(" [id={id}]"));
    }
    if !p.extensions().is_empty() {
        line.push_str(&format!(" [{} extension(s)]", p.extensions().len()));
    }
    line
}

fn print_type_info(info: &TypeInfo) {
    println!("{} ({:?}, base {})", info.name, info.kind, info.base.unwrap_or("-"));
    for field in info.fields {
        let choices = if field.is_choice() {
            format!(" [{}]", field.choices.join("|"))
        } else {
            String::new()
        };
        println!(
            "  {:<24} {:<16} {:?} {}{choices}",
            field.name,
            field.type_name,
            field.kind,
            field.cardinality()
        );
    }
}
