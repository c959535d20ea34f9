pub mod bank;
pub mod cell;
pub mod record;
pub mod result;
pub mod stats;
pub mod table;

pub use bank::{BankEntry, ColumnEntry, RegistryFile, SheetEntry};
pub use cell::Cell;
pub use record::{
    CanonicalField, InternalRecord, LedgerRow, StatementRecord, LEDGER_RENAMES,
    PASS_THROUGH_COLUMNS,
};
pub use result::{
    FinalStatus, MatchRecord, OutputValue, ReconOutcome, ReconReport, Status, StatusBundle,
    OUTPUT_COLUMNS, PROJECTED_ATTRIBUTES,
};
pub use stats::{BankStats, RunStats, SkipReason, SkippedBank};
pub use table::{Table, Workbook};
