pub mod aggregator;
pub mod compositor;
pub mod matcher;
pub mod normalizer;
pub mod recon;
pub mod registry;

pub use aggregator::aggregate_ledger;
pub use compositor::compose;
pub use matcher::{compute_statuses, BankMatcher, BankOutcome};
pub use normalizer::Normalizer;
pub use recon::ReconService;
pub use registry::{BankRegistry, ColumnMapping};
