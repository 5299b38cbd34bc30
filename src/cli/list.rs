use clap::Parser;
use feedstock::{domain::date, AnimalRecord, Preferences, Session};
use serde_json::json;
use tracing::instrument;

use super::terminal::{self, Colorize};

#[derive(Debug, Parser)]
#[command(about = "Print the animal records")]
pub struct List {
    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl List {
    #[instrument(level = "debug", skip_all)]
    pub fn run<P: Preferences>(self, session: &Session<P>) -> anyhow::Result<()> {
        let records = session.store().records();
        match self.format {
            OutputFormat::Table => {
                println!("{}", session.title().info());
                print_table(records);
            }
            OutputFormat::Json => {
                let rows: Vec<_> = records.iter().map(json_row).collect();
                serde_json::to_writer_pretty(std::io::stdout(), &rows)?;
                println!();
            }
        }
        Ok(())
    }
}

fn json_row(record: &AnimalRecord) -> serde_json::Value {
    json!({
        "species": record.species,
        "feedType": record.feed_type,
        "currentStock": record.current_stock,
        "unit": record.unit,
        "reorderNeeded": record.reorder_needed,
        "reorderDate": record.reorder_date.map(|d| d.to_string()),
    })
}

/// Prints the records as a table, one numbered row per record.
///
/// Narrow terminals only get the species and feed type columns.
pub fn print_table(records: &[AnimalRecord]) {
    if records.is_empty() {
        println!("{}", "No animals recorded.".dim());
        return;
    }

    let narrow = terminal::is_narrow();
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|record| {
            let mut row = vec![record.species.clone(), record.feed_type.clone()];
            if !narrow {
                row.extend([
                    format!("{} {}", record.current_stock, record.unit),
                    record.reorder_needed.clone(),
                    date::format_display(record.reorder_date),
                ]);
            }
            row
        })
        .collect();

    let headers = ["Species", "Feed type", "Stock", "Reorder", "Reorder date"];
    let headers = &headers[..rows.first().map_or(0, Vec::len)];
    let widths = column_widths(headers, &rows);

    let header_line = format_row(headers.iter().map(|h| (*h).to_string()), &widths);
    println!("{}", format!("  #  {header_line}").dim());

    for (index, (row, record)) in rows.into_iter().zip(records).enumerate() {
        let line = format!("{index:>3}  {}", format_row(row, &widths));
        if record.needs_reorder() {
            println!("{}", line.warning());
        } else {
            println!("{line}");
        }
    }
}

fn column_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            rows.iter()
                .filter_map(|row| row.get(i))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect()
}

fn format_row(cells: impl IntoIterator<Item = String>, widths: &[usize]) -> String {
    cells
        .into_iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widths_fit_longest_cell() {
        let rows = vec![
            vec!["Schwein".to_string(), "Grünfutter".to_string()],
            vec!["Huhn".to_string(), "Körner".to_string()],
        ];

        assert_eq!(column_widths(&["Species", "Feed"], &rows), [7, 10]);
    }

    #[test]
    fn rows_are_padded() {
        let line = format_row(["Huhn".to_string(), "Körner".to_string()], &[7, 10]);

        assert_eq!(line, "Huhn     Körner");
    }

    #[test]
    fn json_row_uses_iso_dates() {
        let row = json_row(&AnimalRecord::sample("Rind", "Mais"));

        assert_eq!(row["species"], "Rind");
        assert_eq!(row["currentStock"], 50.5);
        assert_eq!(row["reorderDate"], "1999-02-21");
    }
}
