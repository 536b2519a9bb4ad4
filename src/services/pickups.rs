use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionError,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::auth::Identity;
use crate::db::DbPool;
use crate::entities::{pickup_request, skid, waybill};
use crate::errors::{FieldErrors, ServiceError};
use crate::events::{Event, EventSender};

/// Pickup forms carry up to five skid groups.
pub const MAX_SKID_GROUPS: usize = 5;

/// One skid group from the pickup form. A group is either untouched or must
/// be filled in completely; a partial group is a validation error.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct SkidGroupInput {
    pub length: Option<Decimal>,
    pub width: Option<Decimal>,
    pub height: Option<Decimal>,
    pub weight: Option<Decimal>,
}

impl SkidGroupInput {
    fn is_empty(&self) -> bool {
        self.length.is_none()
            && self.width.is_none()
            && self.height.is_none()
            && self.weight.is_none()
    }
}

/// Submitted pickup request. The waybill is referenced by its human-facing
/// number, not its id, matching what appears on the printed manifest.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct PickupRequestInput {
    pub waybill_number: Option<i64>,
    pub pickup_contact: Option<String>,
    pub pickup_phone: Option<String>,
    #[validate(email)]
    pub pickup_email: Option<String>,
    pub pickup_date: Option<NaiveDate>,
    pub pickup_company: Option<String>,
    pub pickup_address_line_1: Option<String>,
    pub pickup_address_line_2: Option<String>,
    pub pickup_address_line_3: Option<String>,
    pub pickup_ready_time: Option<String>,
    pub pickup_close_time: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub skids: Vec<SkidGroupInput>,
}

#[derive(Debug, Clone, PartialEq)]
struct CompleteSkid {
    slot: i16,
    length: Decimal,
    width: Decimal,
    height: Decimal,
    weight: Decimal,
}

#[derive(Debug, Clone)]
struct ValidatedPickup {
    waybill_number: i64,
    pickup_contact: String,
    pickup_phone: String,
    pickup_email: String,
    pickup_date: NaiveDate,
    pickup_company: String,
    pickup_address_line_1: String,
    pickup_address_line_2: Option<String>,
    pickup_address_line_3: String,
    pickup_ready_time: String,
    pickup_close_time: String,
    notes: Option<String>,
    skids: Vec<CompleteSkid>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PickupOutcome {
    pub pickup_request: pickup_request::Model,
    pub skids: Vec<skid::Model>,
}

/// Service for scheduling pickups against committed waybills.
#[derive(Clone)]
pub struct PickupService {
    db: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl PickupService {
    pub fn new(db: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Validate and persist a pickup request with its skids.
    ///
    /// The waybill number must resolve to a waybill belonging to one of the
    /// requester's companies; anything else reads as an invalid number, never
    /// as a probe result.
    #[instrument(skip(self, identity, input))]
    pub async fn submit(
        &self,
        identity: &Identity,
        input: PickupRequestInput,
    ) -> Result<PickupOutcome, ServiceError> {
        identity.forbid_shipping_clerks()?;

        let validated = validate_input(&input)?;

        let target = waybill::Entity::find()
            .filter(waybill::Column::WaybillNumber.eq(validated.waybill_number))
            .filter(waybill::Column::CompanyId.is_in(identity.company_ids()))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::field_error("waybill_number", "Invalid waybill number"))?;

        let db = self.db.clone();
        let skid_count = validated.skids.len();
        let (saved, saved_skids) = db
            .transaction::<_, (pickup_request::Model, Vec<skid::Model>), ServiceError>(
                move |txn| {
                    Box::pin(async move {
                        let saved = pickup_request::ActiveModel {
                            id: Set(Uuid::new_v4()),
                            waybill_id: Set(target.id),
                            pickup_contact: Set(validated.pickup_contact),
                            pickup_phone: Set(validated.pickup_phone),
                            pickup_email: Set(validated.pickup_email),
                            pickup_date: Set(validated.pickup_date),
                            pickup_company: Set(validated.pickup_company),
                            pickup_address_line_1: Set(validated.pickup_address_line_1),
                            pickup_address_line_2: Set(validated.pickup_address_line_2),
                            pickup_address_line_3: Set(validated.pickup_address_line_3),
                            pickup_ready_time: Set(validated.pickup_ready_time),
                            pickup_close_time: Set(validated.pickup_close_time),
                            notes: Set(validated.notes),
                            created_at: Set(Utc::now()),
                        }
                        .insert(txn)
                        .await?;

                        let mut saved_skids = Vec::with_capacity(validated.skids.len());
                        for group in &validated.skids {
                            let row = skid::ActiveModel {
                                id: Set(Uuid::new_v4()),
                                pickup_request_id: Set(saved.id),
                                skid_number: Set(group.slot),
                                length: Set(group.length),
                                width: Set(group.width),
                                height: Set(group.height),
                                weight: Set(group.weight),
                            }
                            .insert(txn)
                            .await?;
                            saved_skids.push(row);
                        }

                        Ok((saved, saved_skids))
                    })
                },
            )
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => ServiceError::DatabaseError(db_err),
                TransactionError::Transaction(service_err) => service_err,
            })?;

        info!(
            pickup_request_id = %saved.id,
            waybill_id = %saved.waybill_id,
            skid_count,
            "pickup request recorded"
        );

        let payload = serde_json::json!({
            "pickup_request_id": saved.id.to_string(),
            "waybill_id": saved.waybill_id.to_string(),
            "skid_count": skid_count,
        });
        let _ = crate::events::outbox::enqueue(
            &*self.db,
            "pickup_request",
            Some(saved.id),
            "pickup.requested",
            &payload,
        )
        .await;
        let _ = self
            .event_sender
            .send(Event::PickupRequested {
                pickup_request_id: saved.id,
                waybill_id: saved.waybill_id,
                skid_count,
            })
            .await;

        Ok(PickupOutcome {
            pickup_request: saved,
            skids: saved_skids,
        })
    }
}

fn required_text(fields: &mut FieldErrors, name: &str, value: &Option<String>) -> String {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => {
            fields.add(name, "required");
            String::new()
        }
    }
}

fn optional_text(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn validate_input(input: &PickupRequestInput) -> Result<ValidatedPickup, ServiceError> {
    let mut fields = FieldErrors::new();
    if let Err(errors) = input.validate() {
        fields.extend_from(&errors);
    }

    let waybill_number = match input.waybill_number {
        Some(n) => n,
        None => {
            fields.add("waybill_number", "required");
            0
        }
    };
    let pickup_date = match input.pickup_date {
        Some(d) => d,
        None => {
            fields.add("pickup_date", "required");
            NaiveDate::default()
        }
    };

    let pickup_contact = required_text(&mut fields, "pickup_contact", &input.pickup_contact);
    let pickup_phone = required_text(&mut fields, "pickup_phone", &input.pickup_phone);
    let pickup_email = required_text(&mut fields, "pickup_email", &input.pickup_email);
    let pickup_company = required_text(&mut fields, "pickup_company", &input.pickup_company);
    let pickup_address_line_1 = required_text(
        &mut fields,
        "pickup_address_line_1",
        &input.pickup_address_line_1,
    );
    let pickup_address_line_3 = required_text(
        &mut fields,
        "pickup_address_line_3",
        &input.pickup_address_line_3,
    );
    let pickup_ready_time = required_text(&mut fields, "pickup_ready_time", &input.pickup_ready_time);
    let pickup_close_time = required_text(&mut fields, "pickup_close_time", &input.pickup_close_time);

    if input.skids.len() > MAX_SKID_GROUPS {
        fields.add("skids", "at most 5 skid groups");
    }

    let skids = validate_skid_groups(&input.skids, &mut fields);

    fields.into_result()?;

    Ok(ValidatedPickup {
        waybill_number,
        pickup_contact,
        pickup_phone,
        pickup_email,
        pickup_date,
        pickup_company,
        pickup_address_line_1,
        pickup_address_line_2: optional_text(&input.pickup_address_line_2),
        pickup_address_line_3,
        pickup_ready_time,
        pickup_close_time,
        notes: optional_text(&input.notes),
        skids,
    })
}

/// All-or-none per group: an untouched group is skipped, a complete group is
/// kept, and a partial group produces one error per missing dimension, keyed
/// by its 1-based slot.
fn validate_skid_groups(groups: &[SkidGroupInput], fields: &mut FieldErrors) -> Vec<CompleteSkid> {
    let mut complete = Vec::new();

    for (idx, group) in groups.iter().enumerate().take(MAX_SKID_GROUPS) {
        let slot = (idx + 1) as i16;
        if group.is_empty() {
            continue;
        }

        match (group.length, group.width, group.height, group.weight) {
            (Some(length), Some(width), Some(height), Some(weight)) => {
                let mut valid = true;
                for (name, value) in [
                    ("length", length),
                    ("width", width),
                    ("height", height),
                    ("weight", weight),
                ] {
                    if value <= Decimal::ZERO {
                        fields.add(format!("skid_{}_{}", name, slot), "must be positive");
                        valid = false;
                    }
                }
                if valid {
                    complete.push(CompleteSkid {
                        slot,
                        length,
                        width,
                        height,
                        weight,
                    });
                }
            }
            _ => {
                for (name, present) in [
                    ("length", group.length.is_some()),
                    ("width", group.width.is_some()),
                    ("height", group.height.is_some()),
                    ("weight", group.weight.is_some()),
                ] {
                    if !present {
                        fields.add(
                            format!("skid_{}_{}", name, slot),
                            "required with the other skid dimensions",
                        );
                    }
                }
            }
        }
    }

    complete
}
