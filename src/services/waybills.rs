use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, SqlErr, TransactionError, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::auth::Identity;
use crate::db::DbPool;
use crate::drafts::{DraftStore, ServiceLine, WaybillDraft};
use crate::entities::{company, quote, service, waybill, waybill_service};
use crate::errors::{FieldErrors, ServiceError};
use crate::events::{Event, EventSender};
use crate::services::documents::{ArtifactRef, DocumentGenerator, DocumentLine, WaybillDocument};

/// Commit retries on waybill-number collision before giving up.
const MAX_COMMIT_ATTEMPTS: u32 = 3;

/// Listings without an archive year cover this many trailing days.
const DEFAULT_LISTING_WINDOW_DAYS: i64 = 120;

/// One submitted service line. Repeated entries are reconciled into the
/// draft's pending-service map.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ServiceLineInput {
    pub service_id: Uuid,
    #[validate(range(min = 0))]
    pub pieces: i32,
    /// Absent or empty weight normalizes to zero.
    pub pounds: Option<Decimal>,
}

/// Submitted waybill form, shared by the create and convert paths.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct WaybillForm {
    pub company_id: Uuid,
    pub shipper_company: Option<String>,
    pub shipper_contact: Option<String>,
    pub shipper_address_line_1: Option<String>,
    pub shipper_address_line_2: Option<String>,
    pub shipper_address_line_3: Option<String>,
    pub shipper_phone: Option<String>,
    pub consignee_company: Option<String>,
    pub consignee_contact: Option<String>,
    pub consignee_address_line_1: Option<String>,
    pub consignee_address_line_2: Option<String>,
    pub consignee_address_line_3: Option<String>,
    pub consignee_phone: Option<String>,
    pub ship_date: Option<NaiveDate>,
    pub quote_number: Option<Uuid>,
    /// Carried along when the form came from a quote conversion.
    pub quote_id: Option<Uuid>,
    pub job_reference_number: Option<String>,
    pub notes: Option<String>,
    #[validate]
    #[serde(default)]
    pub services: Vec<ServiceLineInput>,
}

/// Normalize submitted service lines into the draft's pending-service map.
///
/// One entry per distinct service id; a duplicated id keeps the last
/// occurrence. Missing weight becomes zero. Pure transformation.
pub fn reconcile_service_lines(lines: &[ServiceLineInput]) -> BTreeMap<Uuid, ServiceLine> {
    let mut reconciled = BTreeMap::new();
    for line in lines {
        reconciled.insert(
            line.service_id,
            ServiceLine {
                pieces: line.pieces,
                pounds: line.pounds.unwrap_or(Decimal::ZERO),
            },
        );
    }
    reconciled
}

/// Active catalog services grouped the way the creation form renders them.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GroupedServices {
    pub canadian: Vec<service::Model>,
    pub international: Vec<service::Model>,
    pub fulfillment: Vec<service::Model>,
}

pub async fn grouped_active_services(db: &DbPool) -> Result<GroupedServices, ServiceError> {
    let all = service::Entity::find()
        .filter(service::Column::Active.eq(true))
        .order_by_asc(service::Column::Name)
        .all(db)
        .await?;

    let mut grouped = GroupedServices {
        canadian: Vec::new(),
        international: Vec::new(),
        fulfillment: Vec::new(),
    };
    for svc in all {
        match svc.service_type {
            service::ServiceType::Canadian => grouped.canadian.push(svc),
            service::ServiceType::International => grouped.international.push(svc),
            service::ServiceType::Fulfillment => grouped.fulfillment.push(svc),
        }
    }
    Ok(grouped)
}

/// Seed data for the creation form.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FormContext {
    pub company: company::Model,
    pub draft: Option<WaybillDraft>,
    pub services: GroupedServices,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PreviewOutcome {
    pub draft: WaybillDraft,
    pub preview: ArtifactRef,
    /// Drives the customs notice on the preview screen.
    pub international_service_exists: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CommitOutcome {
    pub waybill_id: Uuid,
    pub waybill_number: i64,
    /// Absent when document generation failed; the waybill itself is
    /// committed and the render retried out-of-band.
    pub document_path: Option<String>,
}

/// Page envelope for the waybill listing.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WaybillListing {
    pub items: Vec<waybill::Model>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    /// True when an exact-number search matched nothing in scope.
    pub search_miss: bool,
}

/// A committed waybill with its pivot data inlined.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WaybillWithServices {
    #[serde(flatten)]
    pub waybill: waybill::Model,
    pub services: Vec<WaybillLine>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WaybillLine {
    pub service_id: Uuid,
    pub service_name: String,
    pub service_type: Option<service::ServiceType>,
    pub pieces: i32,
    pub pounds: Decimal,
}

/// Service for the waybill draft/preview/commit workflow.
#[derive(Clone)]
pub struct WaybillService {
    db: Arc<DbPool>,
    drafts: Arc<DraftStore>,
    documents: Arc<dyn DocumentGenerator>,
    event_sender: Arc<EventSender>,
}

impl WaybillService {
    pub fn new(
        db: Arc<DbPool>,
        drafts: Arc<DraftStore>,
        documents: Arc<dyn DocumentGenerator>,
        event_sender: Arc<EventSender>,
    ) -> Self {
        Self {
            db,
            drafts,
            documents,
            event_sender,
        }
    }

    /// Seed data for the creation form. Clears any staged draft unless the
    /// caller is returning from the preview step (`resume`), so an old,
    /// unrelated draft never resurfaces on a fresh form.
    #[instrument(skip(self, identity))]
    pub async fn form_context(
        &self,
        identity: &Identity,
        client_id: Option<Uuid>,
        resume: bool,
    ) -> Result<FormContext, ServiceError> {
        identity.forbid_shipping_clerks()?;

        if !resume {
            self.drafts.clear(identity.user_id());
        }
        let draft = self.drafts.get(identity.user_id());

        let company = if let Some(client_id) = client_id {
            identity
                .membership(client_id)
                .ok_or_else(|| ServiceError::Forbidden("not a member of this company".into()))?
        } else if let Some(draft) = &draft {
            identity
                .membership(draft.company_id)
                .ok_or_else(|| ServiceError::Forbidden("not a member of this company".into()))?
        } else {
            identity
                .primary_company()
                .ok_or_else(|| ServiceError::Forbidden("no company membership".into()))?
        };

        Ok(FormContext {
            company: company.clone(),
            draft,
            services: grouped_active_services(&self.db).await?,
        })
    }

    /// Validate the submitted form, rebuild and stage the draft, and render
    /// a preview artifact. Persists nothing; running it twice with the same
    /// input stages the same draft.
    #[instrument(skip(self, identity, form))]
    pub async fn preview(
        &self,
        identity: &Identity,
        form: WaybillForm,
    ) -> Result<PreviewOutcome, ServiceError> {
        identity.forbid_shipping_clerks()?;

        let mut fields = FieldErrors::new();
        if let Err(errors) = form.validate() {
            fields.extend_from(&errors);
        }
        for (idx, line) in form.services.iter().enumerate() {
            if line.pounds.is_some_and(|p| p < Decimal::ZERO) {
                fields.add(format!("services[{}].pounds", idx), "must not be negative");
            }
        }
        fields.into_result()?;

        if !identity.is_member(form.company_id) {
            return Err(ServiceError::Forbidden(
                "not a member of this company".into(),
            ));
        }

        let draft = draft_from_form(&form);
        let line_ids: Vec<Uuid> = draft.pending_services.keys().copied().collect();

        let international_service_exists = if line_ids.is_empty() {
            false
        } else {
            service::Entity::find()
                .filter(service::Column::ServiceType.eq(service::ServiceType::International))
                .filter(service::Column::Id.is_in(line_ids))
                .count(&*self.db)
                .await?
                > 0
        };

        let lines = resolve_document_lines(&self.db, &draft.pending_services).await?;
        let preview = self
            .documents
            .generate_preview(&WaybillDocument::from_draft(&draft, lines))
            .await?;

        self.drafts.put(identity.user_id(), draft.clone());

        Ok(PreviewOutcome {
            draft,
            preview,
            international_service_exists,
        })
    }

    /// Turn the staged draft into permanent records.
    ///
    /// Rows are written in one transaction; the waybill number is read and
    /// assigned inside it and the unique index backstops concurrent commits,
    /// which retry on collision. Document generation and notification run
    /// after the transaction and can never unwind a committed waybill.
    #[instrument(skip(self, identity))]
    pub async fn commit(
        &self,
        identity: &Identity,
        notify_discrepancies: Option<bool>,
    ) -> Result<CommitOutcome, ServiceError> {
        identity.forbid_shipping_clerks()?;

        let mut draft = self.drafts.get(identity.user_id()).ok_or_else(|| {
            ServiceError::Conflict("no staged waybill draft; preview it first".into())
        })?;
        draft.notify_discrepancies = notify_discrepancies;

        let company = identity
            .membership(draft.company_id)
            .ok_or_else(|| ServiceError::Forbidden("not a member of this company".into()))?
            .clone();

        // detach pending services before persisting the scalar row
        let pending_services = std::mem::take(&mut draft.pending_services);

        let committed = self
            .commit_with_retry(
                draft.clone(),
                pending_services.clone(),
                identity.user_id(),
                company.sales_rep_id,
                None,
            )
            .await?;

        // The rows are in; the draft must not outlive them, or a failure
        // below would let a retried request commit a duplicate.
        self.drafts.clear(identity.user_id());

        info!(
            waybill_id = %committed.id,
            waybill_number = committed.waybill_number,
            "waybill committed"
        );

        // Anything past this point is best-effort: the waybill is committed
        // and failures are retried out-of-band rather than surfaced.
        let document_path = match self
            .render_committed_document(&draft, &pending_services, &committed)
            .await
        {
            Ok(artifact) => Some(artifact.path),
            Err(err) => {
                error!(waybill_id = %committed.id, "document generation failed: {}", err);
                let _ = self
                    .event_sender
                    .send(Event::DocumentGenerationFailed {
                        waybill_id: committed.id,
                        reason: err.to_string(),
                        occurred_at: Utc::now(),
                    })
                    .await;
                None
            }
        };

        let payload = serde_json::json!({
            "waybill_id": committed.id.to_string(),
            "waybill_number": committed.waybill_number,
            "company_id": company.id.to_string(),
            "user_id": identity.user_id().to_string(),
            "document_path": document_path,
        });
        let _ = crate::events::outbox::enqueue(
            &*self.db,
            "waybill",
            Some(committed.id),
            "waybill.committed",
            &payload,
        )
        .await;
        let _ = self
            .event_sender
            .send(Event::WaybillCommitted {
                waybill_id: committed.id,
                waybill_number: committed.waybill_number,
                company_id: company.id,
                user_id: identity.user_id(),
                document_path: document_path.clone(),
            })
            .await;

        Ok(CommitOutcome {
            waybill_id: committed.id,
            waybill_number: committed.waybill_number,
            document_path,
        })
    }

    /// Insert with bounded retry: a unique violation on the number column
    /// means another commit won that number, so the next attempt re-reads.
    /// A number hint pins the first attempt instead of the in-transaction
    /// read; retries always read fresh.
    async fn commit_with_retry(
        &self,
        draft: WaybillDraft,
        pending_services: BTreeMap<Uuid, ServiceLine>,
        user_id: Uuid,
        sales_rep_id: Option<Uuid>,
        number_hint: Option<i64>,
    ) -> Result<waybill::Model, ServiceError> {
        let mut assigned = number_hint;
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self
                .try_commit(
                    draft.clone(),
                    pending_services.clone(),
                    user_id,
                    sales_rep_id,
                    assigned,
                )
                .await
            {
                Ok(model) => return Ok(model),
                Err(err) if is_number_collision(&err) && attempt < MAX_COMMIT_ATTEMPTS => {
                    warn!(attempt, "waybill number collision; retrying commit");
                    assigned = None;
                }
                Err(err) if is_number_collision(&err) => {
                    return Err(ServiceError::Conflict(
                        "could not assign a waybill number; try again".into(),
                    ));
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Render the final document for a freshly committed waybill. Callers
    /// treat any failure here as degraded output, never as a commit failure.
    async fn render_committed_document(
        &self,
        draft: &WaybillDraft,
        pending_services: &BTreeMap<Uuid, ServiceLine>,
        committed: &waybill::Model,
    ) -> Result<ArtifactRef, ServiceError> {
        let lines = resolve_document_lines(&self.db, pending_services).await?;
        let mut document = WaybillDocument::from_draft(draft, lines);
        document.waybill_number = Some(committed.waybill_number);
        self.documents.generate_final(&document).await
    }

    async fn try_commit(
        &self,
        draft: WaybillDraft,
        pending_services: BTreeMap<Uuid, ServiceLine>,
        user_id: Uuid,
        sales_rep_id: Option<Uuid>,
        assigned_number: Option<i64>,
    ) -> Result<waybill::Model, ServiceError> {
        let db = self.db.clone();
        db.transaction::<_, waybill::Model, ServiceError>(move |txn| {
            Box::pin(async move {
                let waybill_number = match assigned_number {
                    Some(number) => number,
                    None => next_waybill_number(txn).await?,
                };

                let committed = waybill::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    waybill_number: Set(waybill_number),
                    user_id: Set(user_id),
                    company_id: Set(draft.company_id),
                    sales_rep_id: Set(sales_rep_id),
                    shipper_company: Set(draft.shipper_company),
                    shipper_contact: Set(draft.shipper_contact),
                    shipper_address_line_1: Set(draft.shipper_address_line_1),
                    shipper_address_line_2: Set(draft.shipper_address_line_2),
                    shipper_address_line_3: Set(draft.shipper_address_line_3),
                    shipper_phone: Set(draft.shipper_phone),
                    consignee_company: Set(draft.consignee_company),
                    consignee_contact: Set(draft.consignee_contact),
                    consignee_address_line_1: Set(draft.consignee_address_line_1),
                    consignee_address_line_2: Set(draft.consignee_address_line_2),
                    consignee_address_line_3: Set(draft.consignee_address_line_3),
                    consignee_phone: Set(draft.consignee_phone),
                    ship_date: Set(draft.ship_date),
                    quote_number: Set(draft.quote_number),
                    job_reference_number: Set(draft.job_reference_number),
                    notes: Set(draft.notes),
                    notify_discrepancies: Set(draft.notify_discrepancies),
                    created_at: Set(Utc::now()),
                }
                .insert(txn)
                .await?;

                // converted quotes record the waybill they became
                if let Some(quote_id) = draft.quote_id {
                    let converted = quote::Entity::find_by_id(quote_id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!("Quote {} not found", quote_id))
                        })?;
                    let mut active: quote::ActiveModel = converted.into();
                    active.waybill_id = Set(Some(committed.id));
                    active.update(txn).await?;
                }

                for (service_id, line) in &pending_services {
                    let catalog = service::Entity::find_by_id(*service_id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!("Service {} not found", service_id))
                        })?;
                    waybill_service::ActiveModel {
                        waybill_id: Set(committed.id),
                        service_id: Set(catalog.id),
                        pieces: Set(line.pieces),
                        pounds: Set(line.pounds),
                    }
                    .insert(txn)
                    .await?;
                }

                Ok(committed)
            })
        })
        .await
        .map_err(|e| match e {
            TransactionError::Connection(db_err) => ServiceError::DatabaseError(db_err),
            TransactionError::Transaction(service_err) => service_err,
        })
    }

    /// Fetch a committed waybill with its service lines inlined.
    #[instrument(skip(self, identity))]
    pub async fn get_waybill(
        &self,
        identity: &Identity,
        id: Uuid,
    ) -> Result<WaybillWithServices, ServiceError> {
        identity.forbid_shipping_clerks()?;

        let found = waybill::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Waybill {} not found", id)))?;

        if !identity.can_view_company(found.company_id) {
            return Err(ServiceError::Forbidden(
                "waybill belongs to another company".into(),
            ));
        }

        let services = waybill_service::Entity::find()
            .filter(waybill_service::Column::WaybillId.eq(id))
            .find_also_related(service::Entity)
            .all(&*self.db)
            .await?
            .into_iter()
            .map(|(pivot, catalog)| WaybillLine {
                service_id: pivot.service_id,
                service_name: catalog
                    .as_ref()
                    .map(|s| s.name.clone())
                    .unwrap_or_else(|| pivot.service_id.to_string()),
                service_type: catalog.map(|s| s.service_type),
                pieces: pivot.pieces,
                pounds: pivot.pounds,
            })
            .collect();

        Ok(WaybillWithServices {
            waybill: found,
            services,
        })
    }

    /// Paginated listing scoped to the companies the requester can see,
    /// newest first. Without an archive year it covers the trailing recent
    /// window; an exact-number search covers everything and flags a miss.
    #[instrument(skip(self, identity))]
    pub async fn list_waybills(
        &self,
        identity: &Identity,
        page: u64,
        limit: u64,
        waybill_number: Option<i64>,
        year: Option<i32>,
        month: Option<u32>,
    ) -> Result<WaybillListing, ServiceError> {
        identity.forbid_shipping_clerks()?;

        let mut query = waybill::Entity::find()
            .filter(waybill::Column::CompanyId.is_in(identity.viewable_company_ids()));

        if let Some(number) = waybill_number {
            query = query.filter(waybill::Column::WaybillNumber.eq(number));
        } else {
            let (since, until) = listing_window(year, month)?;
            query = query.filter(waybill::Column::CreatedAt.gte(since));
            if let Some(until) = until {
                query = query.filter(waybill::Column::CreatedAt.lt(until));
            }
        }

        let paginator = query
            .order_by_desc(waybill::Column::CreatedAt)
            .paginate(&*self.db, limit);

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok(WaybillListing {
            search_miss: waybill_number.is_some() && total == 0,
            items,
            total,
            page,
            limit,
        })
    }

    /// Regenerate the document for a committed waybill.
    #[instrument(skip(self, identity))]
    pub async fn document(
        &self,
        identity: &Identity,
        id: Uuid,
    ) -> Result<ArtifactRef, ServiceError> {
        let with_services = self.get_waybill(identity, id).await?;
        let waybill = &with_services.waybill;

        let document = WaybillDocument {
            waybill_number: Some(waybill.waybill_number),
            shipper_company: waybill.shipper_company.clone(),
            shipper_contact: waybill.shipper_contact.clone(),
            shipper_address: [
                &waybill.shipper_address_line_1,
                &waybill.shipper_address_line_2,
                &waybill.shipper_address_line_3,
            ]
            .into_iter()
            .filter_map(|l| l.clone())
            .collect(),
            shipper_phone: waybill.shipper_phone.clone(),
            consignee_company: waybill.consignee_company.clone(),
            consignee_contact: waybill.consignee_contact.clone(),
            consignee_address: [
                &waybill.consignee_address_line_1,
                &waybill.consignee_address_line_2,
                &waybill.consignee_address_line_3,
            ]
            .into_iter()
            .filter_map(|l| l.clone())
            .collect(),
            consignee_phone: waybill.consignee_phone.clone(),
            ship_date: waybill.ship_date,
            job_reference_number: waybill.job_reference_number.clone(),
            notes: waybill.notes.clone(),
            lines: with_services
                .services
                .iter()
                .map(|line| DocumentLine {
                    service_name: line.service_name.clone(),
                    pieces: line.pieces,
                    pounds: line.pounds,
                })
                .collect(),
        };

        self.documents.generate_final(&document).await
    }
}

/// Assign the next number: current max plus one, read inside the caller's
/// transaction. The unique index turns a concurrent double-read into an
/// insert conflict the commit loop retries.
async fn next_waybill_number(txn: &DatabaseTransaction) -> Result<i64, ServiceError> {
    let current_max = waybill::Entity::find()
        .order_by_desc(waybill::Column::WaybillNumber)
        .one(txn)
        .await?
        .map(|w| w.waybill_number)
        .unwrap_or(0);
    Ok(current_max + 1)
}

/// Bounds for the listing: a requested archive year (optionally narrowed to
/// one month), or the rolling recent window when neither is given.
fn listing_window(
    year: Option<i32>,
    month: Option<u32>,
) -> Result<(DateTime<Utc>, Option<DateTime<Utc>>), ServiceError> {
    let Some(year) = year else {
        if month.is_some() {
            return Err(ServiceError::field_error("month", "requires a year"));
        }
        return Ok((
            Utc::now() - Duration::days(DEFAULT_LISTING_WINDOW_DAYS),
            None,
        ));
    };

    let (since, until) = match month {
        None => (start_of_month(year, 1)?, start_of_month(year + 1, 1)?),
        Some(12) => (start_of_month(year, 12)?, start_of_month(year + 1, 1)?),
        Some(month) => (start_of_month(year, month)?, start_of_month(year, month + 1)?),
    };
    Ok((since, Some(until)))
}

fn start_of_month(year: i32, month: u32) -> Result<DateTime<Utc>, ServiceError> {
    Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| ServiceError::field_error("month", "invalid month"))
}

fn is_number_collision(err: &ServiceError) -> bool {
    match err {
        ServiceError::DatabaseError(db_err) => {
            matches!(db_err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
        }
        _ => false,
    }
}

fn draft_from_form(form: &WaybillForm) -> WaybillDraft {
    WaybillDraft {
        company_id: form.company_id,
        shipper_company: form.shipper_company.clone(),
        shipper_contact: form.shipper_contact.clone(),
        shipper_address_line_1: form.shipper_address_line_1.clone(),
        shipper_address_line_2: form.shipper_address_line_2.clone(),
        shipper_address_line_3: form.shipper_address_line_3.clone(),
        shipper_phone: form.shipper_phone.clone(),
        consignee_company: form.consignee_company.clone(),
        consignee_contact: form.consignee_contact.clone(),
        consignee_address_line_1: form.consignee_address_line_1.clone(),
        consignee_address_line_2: form.consignee_address_line_2.clone(),
        consignee_address_line_3: form.consignee_address_line_3.clone(),
        consignee_phone: form.consignee_phone.clone(),
        ship_date: form.ship_date,
        quote_number: form.quote_number,
        quote_id: form.quote_id,
        job_reference_number: form.job_reference_number.clone(),
        notes: form.notes.clone(),
        notify_discrepancies: None,
        pending_services: reconcile_service_lines(&form.services),
    }
}

async fn resolve_document_lines(
    db: &DbPool,
    pending: &BTreeMap<Uuid, ServiceLine>,
) -> Result<Vec<DocumentLine>, ServiceError> {
    if pending.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<Uuid> = pending.keys().copied().collect();
    let catalog: BTreeMap<Uuid, String> = service::Entity::find()
        .filter(service::Column::Id.is_in(ids))
        .all(db)
        .await?
        .into_iter()
        .map(|s| (s.id, s.name))
        .collect();

    Ok(pending
        .iter()
        .map(|(service_id, line)| DocumentLine {
            service_name: catalog
                .get(service_id)
                .cloned()
                .unwrap_or_else(|| service_id.to_string()),
            pieces: line.pieces,
            pounds: line.pounds,
        })
        .collect())
}
