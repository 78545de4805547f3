use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

use crate::error::SinkError;
use crate::rules::{FIELD_COUNT, Field};

/// One row of the output table: a string per field, empty when absent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    values: [String; FIELD_COUNT],
}

impl EntityRecord {
    pub fn new(values: [String; FIELD_COUNT]) -> Self {
        Self { values }
    }

    pub fn get(&self, field: Field) -> &str {
        &self.values[field.index()]
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.values[field.index()] = value.into();
    }

    /// Values in column order
    pub fn values(&self) -> &[String; FIELD_COUNT] {
        &self.values
    }
}

/// A cell as handed to the sink: either a single string or a list that the
/// sink explodes into one row per element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Scalar(String),
    List(Vec<String>),
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Scalar(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(values: Vec<String>) -> Self {
        FieldValue::List(values)
    }
}

/// A record that may still hold list-valued cells
pub type Row = [FieldValue; FIELD_COUNT];

impl From<EntityRecord> for Row {
    fn from(record: EntityRecord) -> Self {
        record.values.map(FieldValue::Scalar)
    }
}

/// Append-only table of everything extracted during a run.
///
/// Records stay in memory until [`ResultTable::flatten_and_write`]; a crash
/// before that loses them.
#[derive(Debug, Default)]
pub struct ResultTable {
    rows: Vec<Row>,
}

impl ResultTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: EntityRecord) {
        self.rows.push(record.into());
    }

    /// Appends a row whose cells may be lists
    pub fn push_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    pub fn extend(&mut self, records: impl IntoIterator<Item = EntityRecord>) {
        self.rows.extend(records.into_iter().map(Into::into));
    }

    /// Number of rows before flattening
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Expands list-valued cells into one record per element, duplicating the
    /// other cells. Several list cells in one row produce their cartesian
    /// product, leftmost column varying slowest. An empty list yields a single
    /// empty cell.
    pub fn flatten(&self) -> Vec<EntityRecord> {
        self.rows.iter().flat_map(explode).collect()
    }

    /// Flattens the table and writes it as CSV to `path`
    pub fn flatten_and_write(&self, path: impl AsRef<Path>) -> Result<usize, SinkError> {
        let path = path.as_ref();
        let records = self.flatten();
        let file = std::fs::File::create(path).map_err(|source| SinkError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        write_records(&records, file, path)?;
        ::log::info!("Data saved to {} ({} rows)", path.display(), records.len());
        Ok(records.len())
    }
}

/// Writes a header row of the fixed field names and then one row per record.
/// `path` is only used to label errors.
pub fn write_records<W: Write>(
    records: &[EntityRecord],
    writer: W,
    path: &Path,
) -> Result<(), SinkError> {
    let csv_error = |source| SinkError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut csv_writer = csv::WriterBuilder::new().from_writer(writer);
    csv_writer
        .write_record(Field::ALL.iter().map(|f| f.header()))
        .map_err(csv_error)?;
    for record in records {
        csv_writer.write_record(record.values()).map_err(csv_error)?;
    }
    csv_writer.flush().map_err(|source| SinkError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn explode(row: &Row) -> Vec<EntityRecord> {
    let choices: Vec<Vec<&str>> = row
        .iter()
        .map(|cell| match cell {
            FieldValue::Scalar(value) => vec![value.as_str()],
            FieldValue::List(items) if items.is_empty() => vec![""],
            FieldValue::List(items) => items.iter().map(String::as_str).collect(),
        })
        .collect();

    let total: usize = choices.iter().map(Vec::len).product();
    (0..total)
        .map(|n| {
            // Mixed-radix decode of n, last column varying fastest
            let mut picks = [0usize; FIELD_COUNT];
            let mut rest = n;
            for col in (0..FIELD_COUNT).rev() {
                let len = choices[col].len();
                picks[col] = rest % len;
                rest /= len;
            }
            EntityRecord::new(std::array::from_fn(|col| {
                choices[col][picks[col]].to_string()
            }))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, image: &str) -> EntityRecord {
        let mut record = EntityRecord::default();
        record.set(Field::Name, name);
        record.set(Field::Images, image);
        record
    }

    fn scalar(value: &str) -> FieldValue {
        FieldValue::Scalar(value.to_string())
    }

    fn list(values: &[&str]) -> FieldValue {
        FieldValue::List(values.iter().map(|v| v.to_string()).collect())
    }

    #[test]
    fn test_scalar_rows_pass_through() {
        let mut table = ResultTable::new();
        table.push(record("Jane", "/j.png"));
        table.push(record("Ali", ""));
        assert_eq!(table.flatten(), vec![record("Jane", "/j.png"), record("Ali", "")]);
    }

    #[test]
    fn test_list_cell_explodes_into_rows() {
        let mut table = ResultTable::new();
        table.push_row([
            scalar("Jane"),
            list(&["555-0100", "jane@example.org"]),
            scalar("Lawyer"),
            scalar(""),
            scalar("PTI"),
            scalar("/j.png"),
        ]);
        let rows = table.flatten();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get(Field::ContactInformation), "555-0100");
        assert_eq!(rows[1].get(Field::ContactInformation), "jane@example.org");
        for row in &rows {
            assert_eq!(row.get(Field::Name), "Jane");
            assert_eq!(row.get(Field::Occupation), "Lawyer");
            assert_eq!(row.get(Field::Images), "/j.png");
        }
    }

    #[test]
    fn test_two_list_cells_produce_cartesian_product() {
        let mut table = ResultTable::new();
        table.push_row([
            list(&["A", "B"]),
            scalar(""),
            scalar(""),
            scalar(""),
            scalar(""),
            list(&["1", "2"]),
        ]);
        let pairs: Vec<(String, String)> = table
            .flatten()
            .iter()
            .map(|r| (r.get(Field::Name).to_string(), r.get(Field::Images).to_string()))
            .collect();
        let expected = [("A", "1"), ("A", "2"), ("B", "1"), ("B", "2")]
            .map(|(a, b)| (a.to_string(), b.to_string()));
        assert_eq!(pairs, expected.to_vec());
    }

    #[test]
    fn test_empty_list_keeps_row_with_empty_cell() {
        let mut table = ResultTable::new();
        table.push_row([
            scalar("Jane"),
            list(&[]),
            scalar(""),
            scalar(""),
            scalar(""),
            scalar(""),
        ]);
        let rows = table.flatten();
        assert_eq!(rows, vec![record("Jane", "")]);
    }

    #[test]
    fn test_csv_round_trip_preserves_empty_strings() {
        let records = vec![
            record("Jane, Q.", "/j.png"),
            record("", ""),
            record("Ali \"The\" Khan", ""),
        ];
        let mut buffer = Vec::new();
        write_records(&records, &mut buffer, Path::new("memory")).unwrap();

        let mut reader = csv::Reader::from_reader(buffer.as_slice());
        let headers: Vec<String> = reader.headers().unwrap().iter().map(str::to_string).collect();
        let expected: Vec<String> = Field::ALL.iter().map(|f| f.header().to_string()).collect();
        assert_eq!(headers, expected);

        let rows: Vec<Vec<String>> = reader
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect();
        assert_eq!(rows.len(), records.len());
        for (row, record) in rows.iter().zip(&records) {
            assert_eq!(row.as_slice(), record.values().as_slice());
        }
    }

    #[test]
    fn test_empty_table_writes_headers_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let written = ResultTable::new().flatten_and_write(&path).unwrap();
        assert_eq!(written, 0);

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents,
            "Name,Contact Information,Occupation,Family Details,Political Party Affiliation,Images\n"
        );
    }

    #[test]
    fn test_unwritable_destination_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");
        let err = ResultTable::new().flatten_and_write(&path).unwrap_err();
        assert!(matches!(err, SinkError::Io { .. }));
    }
}
