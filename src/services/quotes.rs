use std::sync::Arc;

use sea_orm::{EntityTrait, ModelTrait};
use serde::Serialize;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::Identity;
use crate::config::FulfillmentPartnerConfig;
use crate::db::DbPool;
use crate::drafts::{DraftStore, ServiceLine, WaybillDraft};
use crate::entities::{company, quote, quote_item, user};
use crate::errors::ServiceError;
use crate::services::waybills::{grouped_active_services, GroupedServices};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ConvertOutcome {
    pub draft: WaybillDraft,
    /// True when an in-progress draft was already staged; conversion never
    /// discards edits made after a preview.
    pub resumed: bool,
    /// Active catalog for the follow-up edit form.
    pub services: GroupedServices,
}

/// Seeds waybill drafts from existing quotes.
#[derive(Clone)]
pub struct QuoteService {
    db: Arc<DbPool>,
    drafts: Arc<DraftStore>,
    fulfillment_partner: FulfillmentPartnerConfig,
}

impl QuoteService {
    pub fn new(
        db: Arc<DbPool>,
        drafts: Arc<DraftStore>,
        fulfillment_partner: FulfillmentPartnerConfig,
    ) -> Self {
        Self {
            db,
            drafts,
            fulfillment_partner,
        }
    }

    /// Build a waybill draft pre-filled from a quote: shipper from the
    /// quote's company, consignee fixed to the fulfillment partner's dock,
    /// service lines from quote items with a positive piece count.
    ///
    /// The draft is returned for editing, not staged; staging happens at
    /// preview. If the requester already has a staged draft it is returned
    /// untouched instead.
    #[instrument(skip(self, identity))]
    pub async fn convert(
        &self,
        identity: &Identity,
        quote_id: Uuid,
    ) -> Result<ConvertOutcome, ServiceError> {
        identity.forbid_shipping_clerks()?;

        if let Some(existing) = self.drafts.get(identity.user_id()) {
            return Ok(ConvertOutcome {
                draft: existing,
                resumed: true,
                services: grouped_active_services(&self.db).await?,
            });
        }

        let converted = quote::Entity::find_by_id(quote_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Quote {} not found", quote_id)))?;

        let company = identity
            .membership(converted.company_id)
            .ok_or_else(|| ServiceError::Forbidden("not a member of this company".into()))?;

        let items = converted
            .find_related(quote_item::Entity)
            .all(&*self.db)
            .await?;

        let draft = seed_draft(
            &identity.user,
            company,
            &converted,
            &items,
            &self.fulfillment_partner,
        );

        info!(%quote_id, company_id = %company.id, "seeded waybill draft from quote");

        Ok(ConvertOutcome {
            draft,
            resumed: false,
            services: grouped_active_services(&self.db).await?,
        })
    }
}

fn seed_draft(
    user: &user::Model,
    company: &company::Model,
    quote: &quote::Model,
    items: &[quote_item::Model],
    partner: &FulfillmentPartnerConfig,
) -> WaybillDraft {
    let mut draft = WaybillDraft::new(company.id);

    draft.shipper_company = Some(company.name.clone());
    draft.shipper_contact = Some(user.name.clone());
    draft.shipper_address_line_1 = company.address_line_1.clone();
    draft.shipper_address_line_2 = company.address_line_2.clone();
    draft.shipper_address_line_3 = company.address_line_3.clone();
    draft.shipper_phone = user.phone.clone().or_else(|| company.phone.clone());

    draft.consignee_company = Some(partner.company.clone());
    draft.consignee_contact = Some(partner.contact.clone());
    draft.consignee_address_line_1 = Some(partner.address_line_1.clone());
    draft.consignee_address_line_2 = partner.address_line_2.clone();
    draft.consignee_address_line_3 = Some(partner.address_line_3.clone());
    draft.consignee_phone = Some(partner.phone.clone());

    draft.quote_number = Some(quote.id);
    draft.quote_id = Some(quote.id);
    draft.job_reference_number = quote.job_reference_number.clone();
    draft.notes = quote.notes.clone();

    // quoted-but-unshipped lines stay off the waybill
    for item in items.iter().filter(|i| i.piece_count > 0) {
        draft.pending_services.insert(
            item.service_id,
            ServiceLine {
                pieces: item.piece_count,
                pounds: item.pounds,
            },
        );
    }

    draft
}
