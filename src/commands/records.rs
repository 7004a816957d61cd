//! Read-only record commands: list, show, ip-search.

use std::io::{self, Write};

use anyhow::{Result, bail};
use catalog_core::record::query::{by_id, project_fields, search_summary};
use catalog_core::{Field, ProjectRecord, Settings};
use tracing::info;

use super::load_active_records;

pub fn run_list_command(settings: &Settings, fields: Option<&str>) -> Result<()> {
    let fields = match fields {
        Some(raw) => Field::parse_list(raw)?,
        None => Field::ALL.to_vec(),
    };
    let records = load_active_records(settings)?;

    let mut out = io::stdout().lock();
    for row in project_fields(&records, &fields) {
        writeln!(out, "{}", row.join("\t"))?;
    }
    Ok(())
}

pub fn run_show_command(settings: &Settings, id: Option<&str>) -> Result<()> {
    let records = load_active_records(settings)?;
    let shown: Vec<&ProjectRecord> = match id {
        Some(id) => {
            let matched = by_id(&records, id);
            if matched.is_empty() {
                bail!("No project with id {id}");
            }
            matched
        }
        None => records.iter().collect(),
    };

    let mut out = io::stdout().lock();
    write_records(&mut out, &shown)?;
    Ok(())
}

pub fn run_ip_search_command(settings: &Settings, term: &str) -> Result<()> {
    let records = load_active_records(settings)?;
    let matches = search_summary(&records, term);
    info!(term, matches = matches.len(), "summary search");

    let mut out = io::stdout().lock();
    for row in project_fields(matches, &[Field::Id, Field::Owner, Field::Summary]) {
        writeln!(out, "{}", row.join("\t"))?;
    }
    Ok(())
}

fn write_records(out: &mut impl Write, records: &[&ProjectRecord]) -> io::Result<()> {
    let width = Field::ALL
        .iter()
        .map(|field| field.as_str().len())
        .max()
        .unwrap_or_default();
    for (index, record) in records.iter().enumerate() {
        if index > 0 {
            writeln!(out)?;
        }
        for field in Field::ALL {
            writeln!(out, "{:<width$}  {}", field.as_str(), record.get(field))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_records_aligns_fields_and_separates_records() {
        let first = ProjectRecord::new("1");
        let mut second = ProjectRecord::new("2");
        second.owner = "alice".to_string();

        let mut out = Vec::new();
        write_records(&mut out, &[&first, &second]).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("id        1\n"));
        assert!(text.contains("\n\nid        2\n"));
        assert!(text.contains("owner     alice\n"));
    }
}
