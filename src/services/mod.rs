//! Business logic for the waybill workflow, separated from the HTTP layer.

pub mod documents;
pub mod pickups;
pub mod quotes;
pub mod waybills;

pub use documents::{DocumentGenerator, FileDocumentGenerator};
pub use pickups::PickupService;
pub use quotes::QuoteService;
pub use waybills::WaybillService;
