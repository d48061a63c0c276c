use crate::{compute::Summary, data::Entry};
use comfy_table::{Cell, CellAlignment, Table};

const LOG_HEADER: [&str; 4] = ["date", "driver", "amount", "year-month"];

/// CSV exporter for the raw entry log. The header is always written, so an empty
/// log still produces a well-formed file.
pub(crate) fn write_entries<W: std::io::Write>(
    writer: W,
    entries: &[Entry],
) -> Result<(), anyhow::Error> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(LOG_HEADER)?;
    for entry in entries {
        wtr.serialize(entry)?;
    }
    wtr.flush()?;
    Ok(())
}

/// CSV exporter for the monthly pivot.
pub(crate) fn write_summary_csv<W: std::io::Write>(
    writer: W,
    summary: &Summary,
) -> Result<(), anyhow::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(
        std::iter::once("year-month").chain(summary.drivers.iter().map(String::as_str)),
    )?;
    for row in &summary.rows {
        wtr.write_record(
            std::iter::once(row.month.to_string())
                .chain(row.amounts.iter().map(|amount| amount.to_string())),
        )?;
    }
    wtr.flush()?;
    Ok(())
}

/// Terminal rendering of the monthly pivot.
pub(crate) fn render_summary(summary: &Summary) -> String {
    let mut table = Table::new();
    table.set_header(
        std::iter::once(Cell::new("year-month"))
            .chain(summary.drivers.iter().map(Cell::new)),
    );
    for row in &summary.rows {
        table.add_row(
            std::iter::once(Cell::new(row.month)).chain(
                row.amounts
                    .iter()
                    .map(|amount| Cell::new(amount).set_alignment(CellAlignment::Right)),
            ),
        );
    }
    table.to_string()
}

#[cfg(test)]
mod tests {
    use crate::{
        compute::{MonthRow, Summary},
        data::{Entry, YearMonth},
        write::{render_summary, write_entries, write_summary_csv},
    };

    fn summary() -> Summary {
        Summary {
            drivers: vec!["平野".into(), "萩原".into()],
            rows: vec![
                MonthRow {
                    month: YearMonth {
                        year: 2024,
                        month: 1,
                    },
                    amounts: vec![400, 0],
                },
                MonthRow {
                    month: YearMonth {
                        year: 2024,
                        month: 2,
                    },
                    amounts: vec![0, 500],
                },
            ],
        }
    }

    #[test]
    fn write_log() {
        let entries = [
            Entry {
                date: "2024-01-05".into(),
                driver: "平野".into(),
                amount: "100".into(),
            },
            Entry {
                date: "whenever".into(),
                driver: "萩原".into(),
                amount: "300".into(),
            },
        ];
        let mut out = Vec::new();
        write_entries(&mut out, &entries).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "\
date,driver,amount,year-month
2024-01-05,平野,100,2024-01
whenever,萩原,300,
"
        );
    }

    #[test]
    fn write_empty_log() {
        let mut out = Vec::new();
        write_entries(&mut out, &[]).unwrap();
        assert_eq!(out, b"date,driver,amount,year-month\n");
    }

    #[test]
    fn write_pivot_csv() {
        let mut out = Vec::new();
        write_summary_csv(&mut out, &summary()).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "\
year-month,平野,萩原
2024-01,400,0
2024-02,0,500
"
        );
    }

    #[test]
    fn render_pivot() {
        let rendered = render_summary(&summary());
        let lines: Vec<&str> = rendered.lines().collect();
        assert!(lines.iter().any(|l| l.contains("平野") && l.contains("萩原")));
        assert!(lines
            .iter()
            .any(|l| l.contains("2024-01") && l.contains("400") && l.contains('0')));
        assert!(lines
            .iter()
            .any(|l| l.contains("2024-02") && l.contains("500")));
    }
}
