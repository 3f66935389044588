//! Registration workflow for the Pixel Plus community site.
//!
//! Framework-independent: the models, draft validation, the store seam, the
//! submitter, the roster and CSV export. The Dioxus crates wrap these in signals.

pub mod draft;
pub mod error;
pub mod export;
pub mod models;
pub mod roster;
pub mod store;
pub mod submit;

mod memory;
pub use memory::{MemoryStore, EMAIL_UNIQUE_CONSTRAINT};

pub use draft::{Draft, Field};
pub use error::{ExportError, LoadError, StoreError, SubmitError, ValidationError};
pub use export::{export_csv, CsvExport};
pub use models::{NewRegistration, Registration, TechLevel, YearOfStudy};
pub use roster::{filter_records, LoadKind, Roster, RosterStats, RosterViewer};
pub use store::{RegistrationStore, StoreEvent, Subscription};
pub use submit::Submitter;
