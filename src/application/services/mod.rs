pub mod registry;
pub mod scan_cycle;
pub mod scanner;

pub use registry::{Registry, RegistryError};
pub use scan_cycle::ScanReport;
pub use scanner::{ScanError, ScanSettings, Scanner, TickOutcome};
