use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use csv::WriterBuilder;
use serde::Serialize;

use crate::error::ExtractError;
use crate::model::{MatrixRow, TableMatrix};
use crate::options::{ExtractOptions, OutputFormat};

#[derive(Debug, Serialize)]
struct JsonDocument<'a> {
    row_count: usize,
    column_count: usize,
    rows: &'a [MatrixRow],
}

pub(crate) fn header_row(width: usize, include_page: bool) -> Vec<String> {
    let mut headers = Vec::with_capacity(width + 1);
    if include_page {
        headers.push("page".to_string());
    }
    headers.extend((1..=width).map(|index| format!("col_{index}")));
    headers
}

fn delimited_record(row: &MatrixRow, width: usize, options: &ExtractOptions) -> Vec<String> {
    let mut record = Vec::with_capacity(width + 1);
    if options.include_page {
        record.push(row.page.to_string());
    }
    record.extend(row.cells.iter().cloned());
    if options.pad_rows {
        let target = width + usize::from(options.include_page);
        record.resize(target, String::new());
    }
    record
}

fn write_delimited<W: Write>(
    target: W,
    matrix: &TableMatrix,
    options: &ExtractOptions,
) -> Result<W, ExtractError> {
    let delimiter = match options.format {
        OutputFormat::Tsv => b'\t',
        OutputFormat::Csv | OutputFormat::Json => options.delimiter,
    };
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .flexible(!options.pad_rows)
        .from_writer(target);

    let width = matrix.column_count();
    if options.header {
        writer.write_record(header_row(width, options.include_page))?;
    }
    for row in &matrix.rows {
        writer.write_record(delimited_record(row, width, options))?;
    }
    writer.flush()?;

    writer
        .into_inner()
        .map_err(|error| ExtractError::Io(error.into_error()))
}

fn write_json<W: Write>(mut target: W, matrix: &TableMatrix) -> Result<W, ExtractError> {
    let document = JsonDocument {
        row_count: matrix.row_count(),
        column_count: matrix.column_count(),
        rows: &matrix.rows,
    };
    serde_json::to_writer_pretty(&mut target, &document)?;
    target.write_all(b"\n")?;
    Ok(target)
}

fn write_matrix<W: Write>(
    target: W,
    matrix: &TableMatrix,
    options: &ExtractOptions,
) -> Result<W, ExtractError> {
    match options.format {
        OutputFormat::Csv | OutputFormat::Tsv => write_delimited(target, matrix, options),
        OutputFormat::Json => write_json(target, matrix),
    }
}

pub(crate) fn write_to_path(
    path: &Path,
    matrix: &TableMatrix,
    options: &ExtractOptions,
) -> Result<(), ExtractError> {
    let file = BufWriter::new(File::create(path)?);
    let mut file = write_matrix(file, matrix, options)?;
    file.flush()?;
    Ok(())
}

pub(crate) fn write_to_string(
    matrix: &TableMatrix,
    options: &ExtractOptions,
) -> Result<String, ExtractError> {
    let bytes = write_matrix(Vec::<u8>::new(), matrix, options)?;
    String::from_utf8(bytes)
        .map_err(|error| ExtractError::InvalidOption(format!("invalid utf-8 output: {error}")))
}
