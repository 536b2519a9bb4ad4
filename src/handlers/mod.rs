//! HTTP handlers. Thin layer: extract, authenticate, delegate to services.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::DbPool;
use crate::drafts::DraftStore;
use crate::events::EventSender;
use crate::services::{FileDocumentGenerator, PickupService, QuoteService, WaybillService};

pub mod pickups;
pub mod waybills;

/// Container for all application services, shared via [`crate::AppState`].
#[derive(Clone)]
pub struct AppServices {
    pub waybills: WaybillService,
    pub quotes: QuoteService,
    pub pickups: PickupService,
}

impl AppServices {
    pub fn new(
        db: Arc<DbPool>,
        config: &AppConfig,
        drafts: Arc<DraftStore>,
        event_sender: Arc<EventSender>,
    ) -> Self {
        let documents = Arc::new(FileDocumentGenerator::new(config.document_dir.clone()));
        Self {
            waybills: WaybillService::new(
                db.clone(),
                drafts.clone(),
                documents,
                event_sender.clone(),
            ),
            quotes: QuoteService::new(db.clone(), drafts, config.fulfillment_partner.clone()),
            pickups: PickupService::new(db, event_sender),
        }
    }
}
