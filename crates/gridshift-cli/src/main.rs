//! Gridshift CLI - formula reference rewriting tool

use anyhow::{bail, Context, Result};
use clap::{ArgGroup, Parser, Subcommand};
use gridshift::{offset_formula, references, shift_formula, GridAddress, ShiftOperation};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "gridshift")]
#[command(
    author,
    version,
    about = "Rewrite cell references in spreadsheet formulas"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite a formula for inserted or deleted rows/columns
    #[command(group(
        ArgGroup::new("edit")
            .required(true)
            .args(["insert_rows", "delete_rows", "insert_columns", "delete_columns"])
    ))]
    Shift {
        /// Formula text, e.g. "=SUM(A1:A10)"
        formula: String,

        /// Sheet the rows/columns are inserted into or deleted from
        #[arg(short, long, default_value = "Sheet1")]
        sheet: String,

        /// Sheet holding the formula (default: the edited sheet)
        #[arg(long)]
        current_sheet: Option<String>,

        /// Insert rows before this row
        #[arg(long, value_name = "AT")]
        insert_rows: Option<u32>,

        /// Delete rows starting at this row
        #[arg(long, value_name = "AT")]
        delete_rows: Option<u32>,

        /// Insert columns before this column (number or letters)
        #[arg(long, value_name = "AT", value_parser = parse_column)]
        insert_columns: Option<u32>,

        /// Delete columns starting at this column (number or letters)
        #[arg(long, value_name = "AT", value_parser = parse_column)]
        delete_columns: Option<u32>,

        /// Number of rows/columns
        #[arg(short, long, default_value = "1")]
        count: u32,
    },

    /// Offset relative references as if the formula were copied
    Offset {
        /// Formula text
        formula: String,

        /// Rows to move (negative moves up)
        #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
        rows: i64,

        /// Columns to move (negative moves left)
        #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
        columns: i64,
    },

    /// List the references in a formula
    Refs {
        /// Formula text
        formula: String,

        /// Print JSON instead of one reference per line
        #[arg(long)]
        json: bool,
    },

    /// Convert between A1 addresses and row,column pairs
    Addr {
        /// "B12" or "12,2"
        text: String,
    },
}

/// One reference as printed by `refs --json`
#[derive(Serialize)]
struct ReferenceRow {
    text: String,
    sheet: Option<String>,
    range: bool,
    start_row: u32,
    start_column: u32,
    end_row: u32,
    end_column: u32,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Shift {
            formula,
            sheet,
            current_sheet,
            insert_rows,
            delete_rows,
            insert_columns,
            delete_columns,
            count,
        } => {
            let op = match (insert_rows, delete_rows, insert_columns, delete_columns) {
                (Some(at), ..) => ShiftOperation::insert_rows(at, count),
                (_, Some(at), ..) => ShiftOperation::delete_rows(at, count),
                (_, _, Some(at), _) => ShiftOperation::insert_columns(at, count),
                (_, _, _, Some(at)) => ShiftOperation::delete_columns(at, count),
                _ => bail!("No edit given"),
            };
            shift(&formula, &sheet, current_sheet.as_deref(), &op)
        }
        Commands::Offset {
            formula,
            rows,
            columns,
        } => {
            println!("{}", offset_formula(&formula, rows, columns).text);
            Ok(())
        }
        Commands::Refs { formula, json } => list_references(&formula, json),
        Commands::Addr { text } => convert_address(&text),
    }
}

fn parse_column(text: &str) -> std::result::Result<u32, String> {
    match text.parse::<u32>() {
        Ok(n) => Ok(n),
        Err(_) => GridAddress::column_letters_to_index(text).map_err(|e| e.to_string()),
    }
}

fn shift(formula: &str, sheet: &str, current: Option<&str>, op: &ShiftOperation) -> Result<()> {
    let current = current.unwrap_or(sheet);
    let out = shift_formula(formula, current, sheet, op);

    println!("{}", out.text);
    if out.invalidated > 0 {
        eprintln!(
            "{} reference(s) adjusted, {} invalidated",
            out.adjusted, out.invalidated
        );
    }
    Ok(())
}

fn list_references(formula: &str, json: bool) -> Result<()> {
    let rows: Vec<ReferenceRow> = references(formula)
        .into_iter()
        .map(|token| {
            let extent = token.extent();
            ReferenceRow {
                text: token.to_string(),
                sheet: token.sheet.as_ref().map(|q| q.name.clone()),
                range: token.is_range(),
                start_row: extent.start.row,
                start_column: extent.start.column,
                end_row: extent.end.row,
                end_column: extent.end.column,
            }
        })
        .collect();

    if json {
        let text = serde_json::to_string_pretty(&rows).context("Failed to encode references")?;
        println!("{}", text);
    } else {
        for row in &rows {
            println!("{}", row.text);
        }
    }
    Ok(())
}

fn convert_address(text: &str) -> Result<()> {
    let text = text.trim();

    if let Some((row, column)) = text.split_once(',') {
        let row: u32 = row
            .trim()
            .parse()
            .with_context(|| format!("Invalid row '{}'", row.trim()))?;
        let column: u32 = column
            .trim()
            .parse()
            .with_context(|| format!("Invalid column '{}'", column.trim()))?;
        let addr = GridAddress::try_new(row, column)
            .with_context(|| format!("{},{} is outside the grid", row, column))?;
        println!("{}", addr);
    } else {
        let (addr, _, _) = GridAddress::parse_marked(text)
            .with_context(|| format!("Invalid address '{}'", text))?;
        println!("row {}, column {}", addr.row, addr.column);
    }
    Ok(())
}
