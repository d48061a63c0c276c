use crate::data::Entry;

/// Column names every entry log must carry, with the headers older logs used.
const REQUIRED_COLUMNS: [(&str, &str); 3] =
    [("date", "日付"), ("driver", "名前"), ("amount", "金額")];

/// Trait for doing something with an `Entry` read from a CSV file. The in-memory
/// log just collects them; `MonthlyTotals` folds them into per-month sums.
pub(crate) trait EntrySink {
    fn push_entry(&mut self, entry: Entry);
}

impl EntrySink for Vec<Entry> {
    fn push_entry(&mut self, entry: Entry) {
        self.push(entry)
    }
}

/// What `read_entries` found in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Layout {
    /// No header row at all.
    Empty,
    /// Header row present but without these required columns; nothing was read.
    MissingColumns(Vec<&'static str>),
    Entries(usize),
}

/// CSV importer for `Entry`s. Only I/O failures are errors; a malformed header is
/// reported through `Layout`. Rows are never validated or dropped: fields are
/// taken as text (invalid UTF-8 replaced), a short row gets empty fields, and when
/// a column appears twice the first one wins.
///
/// Any `year-month` column is ignored here (it's re-derived on every save), which
/// also means it is never type-inferred from its contents.
pub(crate) fn read_entries<R: std::io::Read, S: EntrySink>(
    reader: R,
    sink: &mut S,
) -> Result<Layout, anyhow::Error> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let headers: Vec<String> = rdr
        .byte_headers()?
        .iter()
        .map(|h| String::from_utf8_lossy(h).into_owned())
        .collect();
    if headers.iter().all(String::is_empty) {
        return Ok(Layout::Empty);
    }
    let mut columns = [0; 3];
    let mut missing = Vec::new();
    for (slot, (name, legacy)) in columns.iter_mut().zip(REQUIRED_COLUMNS) {
        match headers.iter().position(|h| h == name || h == legacy) {
            Some(index) => *slot = index,
            None => missing.push(name),
        }
    }
    if !missing.is_empty() {
        return Ok(Layout::MissingColumns(missing));
    }
    let [date, driver, amount] = columns;

    let mut read = 0;
    for result in rdr.byte_records() {
        let record = result?;
        let field = |index: usize| {
            record
                .get(index)
                .map(|f| String::from_utf8_lossy(f).into_owned())
                .unwrap_or_default()
        };
        sink.push_entry(Entry {
            date: field(date),
            driver: field(driver),
            amount: field(amount),
        });
        read += 1;
    }
    Ok(Layout::Entries(read))
}
