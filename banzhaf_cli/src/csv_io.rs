use std::io::{Read, Write};

use anyhow::{anyhow, bail, Context, Result};
use banzhaf_core::{DemographicTable, PowerIndex};
use serde::Serialize;

/// Reads a wide share table: one row per member, one column per category.
///
/// Blank cells are left out of the table so the core reports them as missing
/// categories for the members that need them.
pub fn read_demographics<R: Read>(reader: R, member_column: &str) -> Result<DemographicTable> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let headers = csv_reader
        .headers()
        .context("demographic table has no header row")?
        .clone();
    let member_idx = headers
        .iter()
        .position(|header| header.trim() == member_column)
        .ok_or_else(|| anyhow!("demographic table has no {member_column:?} column"))?;

    let mut table = DemographicTable::new();
    for (row, record) in csv_reader.records().enumerate() {
        let record = record.with_context(|| format!("malformed demographic row {}", row + 1))?;
        let member = record
            .get(member_idx)
            .map(str::trim)
            .filter(|member| !member.is_empty())
            .ok_or_else(|| anyhow!("demographic row {} has no member id", row + 1))?;

        for (column, cell) in record.iter().enumerate() {
            let cell = cell.trim();
            if column == member_idx || cell.is_empty() {
                continue;
            }
            let category = headers.get(column).unwrap_or_default().trim();
            let share: f64 = cell.parse().with_context(|| {
                format!("share {cell:?} for {member} / {category:?} is not a number")
            })?;
            table.insert(member, category, share);
        }
    }

    if table.is_empty() {
        bail!("demographic table has no rows");
    }
    Ok(table)
}

#[derive(Serialize)]
struct IndexRow<'a> {
    unit: String,
    member: &'a str,
    block: String,
    weight: f64,
}

#[derive(Serialize)]
struct IndexRowPerPerson<'a> {
    unit: String,
    member: &'a str,
    block: String,
    weight: f64,
    per_person: Option<f64>,
}

/// Writes the index as CSV, with a `per_person` column when one is supplied.
pub fn write_index<W: Write>(
    writer: W,
    index: &PowerIndex,
    per_person: Option<&[Option<f64>]>,
) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for (position, (unit, weight)) in index.iter().enumerate() {
        let block = unit
            .block
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default();
        match per_person {
            Some(values) => csv_writer.serialize(IndexRowPerPerson {
                unit: unit.to_string(),
                member: &unit.member,
                block,
                weight,
                per_person: values.get(position).copied().flatten(),
            }),
            None => csv_writer.serialize(IndexRow {
                unit: unit.to_string(),
                member: &unit.member,
                block,
                weight,
            }),
        }
        .context("failed to write index row")?;
    }
    csv_writer.flush().context("failed to flush index output")?;
    Ok(())
}
