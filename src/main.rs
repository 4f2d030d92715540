//! slotdb - create and inspect heap files of fixed-size slotted pages

use anyhow::{bail, Context, Result};
use clap::{Args as ClapArgs, Parser as ClapParser, Subcommand};
use log::info;
use slotdb::access::{FieldType, Schema, Tuple, Value};
use slotdb::catalog::TableId;
use slotdb::config::{StorageConfig, TableMeta, DEFAULT_PAGE_SIZE};
use slotdb::storage::HeapFile;
use slotdb::transaction::TransactionId;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// slotdb - fixed-width heap page storage
#[derive(ClapParser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(ClapArgs, Debug)]
struct TableArgs {
    /// Heap file path
    path: PathBuf,

    /// Comma separated column types (int, string). Read from the table's
    /// .meta file when omitted.
    #[arg(short, long, value_delimiter = ',')]
    schema: Vec<String>,

    /// Page size in bytes
    #[arg(short, long, default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: usize,

    /// Table id stamped into page ids
    #[arg(short, long, default_value = "0")]
    table_id: u32,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a heap file from comma separated rows, one per line
    Load {
        #[command(flatten)]
        table: TableArgs,

        /// Input file of rows
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Print slot occupancy of every page in a heap file
    Inspect {
        #[command(flatten)]
        table: TableArgs,

        /// Also print every row
        #[arg(short, long)]
        rows: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    match args.command {
        Command::Load { table, input } => load(&table, &input),
        Command::Inspect { table, rows } => inspect(&table, rows),
    }
}

fn parse_schema(table: &TableArgs) -> Result<Schema> {
    let types = table
        .schema
        .iter()
        .map(|name| FieldType::parse(name).with_context(|| format!("Unknown type: {}", name)))
        .collect::<Result<Vec<_>>>()?;
    Ok(Schema::from_types(&types)?)
}

/// Table settings from the command line, or from the `.meta` file written by
/// `load` when no schema is given.
fn table_meta(table: &TableArgs) -> Result<TableMeta> {
    if table.schema.is_empty() {
        let path = TableMeta::path_for(&table.path);
        return TableMeta::load(&path)
            .with_context(|| format!("No --schema given and cannot read {}", path.display()));
    }
    Ok(TableMeta::new(
        TableId(table.table_id),
        &parse_schema(table)?,
        StorageConfig::new(table.page_size)?,
    ))
}

fn parse_row(schema: &Arc<Schema>, line: &str) -> Result<Tuple> {
    let parts: Vec<&str> = line.split(',').map(str::trim).collect();
    if parts.len() != schema.field_count() {
        bail!(
            "Expected {} columns, got {}: {:?}",
            schema.field_count(),
            parts.len(),
            line
        );
    }

    let values = schema
        .iter()
        .zip(parts)
        .map(|(field, part)| match field.field_type {
            FieldType::Int => part
                .parse::<i32>()
                .map(Value::Int)
                .with_context(|| format!("Invalid integer: {}", part)),
            FieldType::String => Ok(Value::String(part.to_string())),
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Tuple::new(schema.clone(), values)?)
}

fn load(table: &TableArgs, input: &Path) -> Result<()> {
    if table.schema.is_empty() {
        bail!("--schema is required when loading");
    }
    let meta = table_meta(table)?;
    let schema = Arc::new(meta.schema()?);
    let text = fs::read_to_string(input)
        .with_context(|| format!("Failed to read input: {}", input.display()))?;

    let file = HeapFile::create(&table.path, meta.table_id, schema.clone(), meta.storage)
        .with_context(|| format!("Failed to create heap file: {}", table.path.display()))?;
    meta.save(&TableMeta::path_for(&table.path))?;

    let txn = TransactionId::new(1);
    let mut count = 0;
    for (line_no, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let mut tuple =
            parse_row(&schema, line).with_context(|| format!("Line {}", line_no + 1))?;
        file.insert_tuple(txn, &mut tuple)?;
        count += 1;
    }

    info!(
        "Loaded {} rows into {} ({} pages)",
        count,
        table.path.display(),
        file.num_pages()?
    );
    Ok(())
}

fn inspect(table: &TableArgs, show_rows: bool) -> Result<()> {
    let meta = table_meta(table)?;
    let schema = Arc::new(meta.schema()?);
    let file = HeapFile::open(&table.path, meta.table_id, schema.clone(), meta.storage)
        .with_context(|| format!("Failed to open heap file: {}", table.path.display()))?;

    println!("schema: {}", schema);
    println!("row width: {} bytes", schema.byte_width());

    for page_no in 0..file.num_pages()? {
        let page = file
            .read_page(page_no)
            .with_context(|| format!("Failed to decode page {}", page_no))?;
        let empty = page.num_empty_slots();
        println!(
            "page {}: capacity {}, header {} bytes, {} used, {} empty",
            page_no,
            page.capacity(),
            page.header_size(),
            page.capacity() - empty,
            empty
        );
        if show_rows {
            for tuple in page.iter() {
                let slot = tuple.tuple_id().map(|id| id.slot_id).unwrap_or_default();
                println!("  [{}] {}", slot, tuple);
            }
        }
    }
    Ok(())
}
