//! # Slot Demo
//!
//! Loads persisted `TypedSlot<dyn Shape>` records from a TOML file, applies
//! the configured field edits, materializes each shape and prints the
//! record that would be written back.
//!
//! ```text
//! slot_demo --file demos/slots.toml --format ron --verbose
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use type_picker::{Format, TypeRegistry, TypedSlot};
use type_picker_demos::{Shape, SlotConfig, edit_value, load_config, register_shapes};

/// Output format for re-persisted records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Json,
    Ron,
}

impl From<OutputFormat> for Format {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => Format::Json,
            OutputFormat::Ron => Format::Ron,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "slot_demo",
    about = "Materialize persisted typed slots from a TOML file",
    version
)]
struct Args {
    /// TOML file with `[[slot]]` tables.
    #[arg(long, default_value = "demos/slots.toml")]
    file: PathBuf,

    /// Format used to print the re-persisted records.
    #[arg(long, default_value = "json", value_enum)]
    format: OutputFormat,

    /// Log registry and codec activity.
    #[arg(long, short)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new().filter_level(level).init();

    let mut registry = TypeRegistry::new();
    if let Err(e) = register_shapes(&mut registry) {
        log::error!("Failed to register shapes: {e}");
        return ExitCode::FAILURE;
    }

    let config = match load_config(&args.file) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    log::info!("Loaded {} slots from {}", config.slots.len(), args.file.display());

    println!(
        "Candidates: {}",
        TypedSlot::<dyn Shape>::options(&registry).join(", ")
    );

    for slot_config in config.slots {
        run_slot(&registry, slot_config, args.format.into());
    }
    ExitCode::SUCCESS
}

fn run_slot(registry: &TypeRegistry, config: SlotConfig, format: Format) {
    let mut slot = TypedSlot::<dyn Shape>::after_load(registry, config.record);
    let chosen = slot.current_identity().unwrap_or(type_picker::NULL_TYPE).to_owned();
    println!("\n[{}] {chosen} ({} fields)", config.name, slot.field_count(registry));

    for (field, value) in &config.edit {
        let result = edit_value(registry, &slot, field, value)
            .and_then(|value| slot.edit_field(registry, field, value).map_err(|e| e.to_string()));
        match result {
            Ok(_) => log::debug!("{}: set '{field}'", config.name),
            Err(e) => println!("  edit '{field}' skipped: {e}"),
        }
    }

    match slot.decode(registry) {
        Ok(decoded) => {
            for diagnostic in &decoded.diagnostics {
                println!("  warning: {diagnostic}");
            }
        }
        Err(e) => println!("  decode failed: {e}"),
    }

    match slot.instance(registry) {
        Ok(Some(shape)) => println!("  {} (area {:.3})", shape.describe(), shape.area()),
        Ok(None) => println!("  no shape selected"),
        Err(e) => println!("  cannot materialize: {e}"),
    }

    match type_picker::encode(&slot.before_persist(registry), format) {
        Ok(bytes) => println!("  record: {}", String::from_utf8_lossy(&bytes)),
        Err(e) => log::error!("{}: failed to encode record: {e}", config.name),
    }
}
