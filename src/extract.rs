use crate::parsers::Document;
use crate::results::EntityRecord;
use crate::rules::{FIELD_COUNT, Field, RuleSet};

/// Raw values collected per field from one page, in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldValues {
    values: [Vec<String>; FIELD_COUNT],
}

impl FieldValues {
    /// Resolves every field against the rule set
    pub fn collect(doc: &Document, rules: &RuleSet) -> Self {
        Self {
            values: Field::ALL.map(|field| rules.resolve(field, doc)),
        }
    }

    pub fn get(&self, field: Field) -> &[String] {
        &self.values[field.index()]
    }

    /// Length of the longest field list
    pub fn max_len(&self) -> usize {
        self.values.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Zips the field lists into records by position.
    ///
    /// Best-effort alignment: value `i` of every field is assumed to describe
    /// the same entity, which only holds when the page lists entities in
    /// parallel across the matched regions. Shorter lists pad with empty
    /// strings; nothing is reordered or dropped.
    pub fn into_records(self) -> Vec<EntityRecord> {
        let rows = self.max_len();
        (0..rows)
            .map(|i| {
                EntityRecord::new(std::array::from_fn(|col| {
                    self.values[col].get(i).cloned().unwrap_or_default()
                }))
            })
            .collect()
    }
}

/// Extracts the entity records on one page
pub fn extract(doc: &Document, rules: &RuleSet) -> Vec<EntityRecord> {
    let records = FieldValues::collect(doc, rules).into_records();
    for record in &records {
        ::log::debug!("Extracted entity data: {:?}", record.values());
    }
    records
}
