use std::collections::HashMap;

/// StatInfo is a snapshot of one table's statistics: block count, record
/// count and the number of distinct values per field. Plans copy the
/// snapshot at construction, so later changes to the table never shift the
/// costs of an already built plan tree.
#[derive(Debug, Clone, Default)]
pub struct StatInfo {
    pub num_blocks: i32,
    pub num_records: i32,
    distinct: HashMap<String, i32>,
}

impl StatInfo {
    pub fn new(num_blocks: i32, num_records: i32, distinct: HashMap<String, i32>) -> Self {
        Self {
            num_blocks,
            num_records,
            distinct,
        }
    }

    /// Distinct values of a field, as counted when the snapshot was taken.
    /// Falls back to the classic "a third of the records" guess for fields
    /// the snapshot has no count for.
    pub fn distinct_values(&self, field_name: &str) -> i32 {
        self.distinct
            .get(field_name)
            .copied()
            .unwrap_or(1 + self.num_records / 3)
    }
}
