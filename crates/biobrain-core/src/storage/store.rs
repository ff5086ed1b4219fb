use super::error::StoreResult;
use super::library::{sort_records, ListOrder};
use crate::models::{Paper, PaperRecord, RecordId};

/// Append-only persistence of papers.
///
/// Backends only ever add rows; there is no update or delete path.
pub trait PaperStore {
    /// Short backend name for diagnostics.
    fn backend(&self) -> &'static str;

    /// Creates the table or worksheet when absent. Safe to call on every
    /// start; never touches existing rows.
    fn ensure_initialized(&self) -> StoreResult<()>;

    /// Appends exactly one row, stamping `date_added` with the current time
    /// when the paper has none.
    fn append(&self, paper: &Paper) -> StoreResult<RecordId>;

    /// Every record, in insertion order.
    fn read_all(&self) -> StoreResult<Vec<PaperRecord>>;

    fn list_all(&self, order: ListOrder) -> StoreResult<Vec<PaperRecord>> {
        let mut records = self.read_all()?;
        sort_records(&mut records, order);
        Ok(records)
    }
}
