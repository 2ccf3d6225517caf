//! `cybox-props`: Normalizes and inspects typed cyber-observable properties.
//!
//! Reads a map-form JSON document (a bare value, a list, or an object with
//! `value` and metadata fields), coerces it through the requested datatype and
//! reports on the result.
//!
//! **Usage:**
//! ```
//! cybox-props normalize --type <datatype> [--input <path>]
//! cybox-props inspect --type <datatype> [--input <path>]
//! ```
//!
//! `--type` takes a datatype tag (`unsignedLong`, `dateTime`, ...) or a
//! binding type name (`UnsignedLongObjectPropertyType`, ...). Log verbosity is
//! controlled through `RUST_LOG` (default `warn`).

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use cybox_properties::{ObjectPropertyNode, PropertyType, TypedProperty};
use serde_json::Value;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Normalize and inspect typed cyber-observable properties.
#[derive(Parser)]
#[command(name = "cybox-props", about = "Normalize and inspect typed cyber-observable properties")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the canonical map-form JSON of a property.
    Normalize(Input),
    /// Print datatype, binding and the tree-form attributes of a property.
    Inspect(Input),
}

/// Where the property comes from and how to type it.
#[derive(Args)]
struct Input {
    /// Datatype tag or binding type name.
    #[arg(long = "type", value_name = "DATATYPE")]
    kind: PropertyType,

    /// Map-form JSON file; stdin when omitted.
    #[arg(long)]
    input: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Normalize(input) => {
            let property = load(&input)?;
            let rendered = property.as_ref().map_or(Value::Null, TypedProperty::to_dict);
            let text = serde_json::to_string_pretty(&rendered)
                .context("Failed to render map-form JSON")?;
            println!("{text}");
        }
        Command::Inspect(input) => match load(&input)? {
            Some(property) => inspect(&property),
            None => println!("(empty {} property)", input.kind.tag()),
        },
    }
    Ok(())
}

fn load(input: &Input) -> Result<Option<TypedProperty>> {
    let raw = read_source(input.input.as_deref())?;
    let document: Value = serde_json::from_str(&raw).context("Input is not valid JSON")?;
    debug!(datatype = input.kind.tag(), "parsing map-form input");
    TypedProperty::from_dict(input.kind, &document)
        .with_context(|| format!("Failed to read a {} property", input.kind.tag()))
}

fn read_source(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn inspect(property: &TypedProperty) {
    let kind = property.kind();
    println!("datatype:    {}", kind.tag());
    println!("binding:     {}", kind.binding_type());
    println!("plain:       {}", property.is_plain());
    println!("has content: {}", property.has_content());

    let element = property.to_obj();
    match element.value_of() {
        Some(text) => println!("text:        {text}"),
        None => println!("text:        (none)"),
    }
    let attributes = element.attributes();
    if attributes.is_empty() {
        println!("attributes:  (none)");
    } else {
        println!("attributes:");
        for (name, value) in attributes {
            println!("  {name} = {value}");
        }
    }
}
