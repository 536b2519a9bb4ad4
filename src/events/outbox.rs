use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, QueryResult, Statement};
use serde_json::Value;
use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

const MAX_ATTEMPTS: i32 = 8;
const BASE_BACKOFF_SECS: i64 = 2;

/// Enqueue a notification event into the outbox table, inside the same
/// transaction as the business write. The worker delivers it later; failed
/// deliveries retry with backoff instead of failing the request.
pub async fn enqueue(
    db: &impl ConnectionTrait,
    aggregate_type: &str,
    aggregate_id: Option<Uuid>,
    event_type: &str,
    payload: &Value,
) -> Result<(), ServiceError> {
    if db.get_database_backend() != DbBackend::Postgres {
        debug!(
            aggregate_type,
            event_type, "outbox enqueue skipped for non-Postgres backend"
        );
        return Ok(());
    }

    let id = Uuid::new_v4();
    let sql = r#"INSERT INTO outbox_events
        (id, aggregate_type, aggregate_id, event_type, payload, status, attempts, available_at, created_at)
        VALUES ($1, $2, $3, $4, $5::jsonb, 'pending', 0, NOW(), NOW())"#;
    let stmt = Statement::from_sql_and_values(
        DbBackend::Postgres,
        sql,
        vec![
            id.into(),
            aggregate_type.into(),
            sea_orm::Value::Uuid(aggregate_id.map(Box::new)),
            event_type.into(),
            payload.clone().into(),
        ],
    );
    db.execute(stmt).await.map_err(ServiceError::db_error)?;
    info!(%id, event_type, aggregate_type, "enqueued outbox event");
    Ok(())
}

/// Background worker to poll and dispatch outbox events via the in-process
/// EventSender.
pub async fn start_worker(db: Arc<DatabaseConnection>, sender: EventSender) {
    if db.get_database_backend() != DbBackend::Postgres {
        info!(
            "Outbox worker disabled for {:?} backend; relying on direct event emission",
            db.get_database_backend()
        );
        return;
    }

    tokio::spawn(async move {
        loop {
            if let Err(e) = drain_once(&db, &sender, 50).await {
                error!("outbox worker error: {}", e);
            }
            sleep(Duration::from_millis(500)).await;
        }
    });
}

async fn drain_once(
    db: &DatabaseConnection,
    sender: &EventSender,
    batch_size: i64,
) -> Result<(), ServiceError> {
    // Claim a batch; SKIP LOCKED keeps concurrent workers from double-sending
    let sql_claim = r#"
        WITH cte AS (
            SELECT id FROM outbox_events
            WHERE status = 'pending' AND available_at <= NOW()
            ORDER BY created_at ASC
            FOR UPDATE SKIP LOCKED
            LIMIT $1
        )
        UPDATE outbox_events o
        SET status = 'processing', updated_at = NOW(), attempts = o.attempts + 1
        FROM cte
        WHERE o.id = cte.id
        RETURNING o.id, o.event_type, o.payload, o.attempts
    "#;
    let stmt =
        Statement::from_sql_and_values(DbBackend::Postgres, sql_claim, vec![batch_size.into()]);
    let rows: Vec<QueryResult> = db.query_all(stmt).await.map_err(ServiceError::db_error)?;

    for row in rows {
        let id: Uuid = row.try_get("", "id").unwrap_or_default();
        let event_type: String = row.try_get("", "event_type").unwrap_or_default();
        let payload: Value = row.try_get("", "payload").unwrap_or(Value::Null);
        let attempts: i32 = row.try_get("", "attempts").unwrap_or(1);

        let Some(event) = map_to_event(&event_type, &payload) else {
            warn!(%id, event_type, "unknown outbox event type; marking failed");
            mark_failed(db, id, "unknown event type").await;
            continue;
        };

        if sender.send(event).await.is_ok() {
            let sql_update = r#"UPDATE outbox_events SET status = 'delivered', updated_at = NOW() WHERE id = $1"#;
            let stmt_upd =
                Statement::from_sql_and_values(DbBackend::Postgres, sql_update, vec![id.into()]);
            if let Err(e) = db.execute(stmt_upd).await {
                warn!("failed updating outbox {}: {}", id, e);
            }
        } else if attempts < MAX_ATTEMPTS {
            let backoff = BASE_BACKOFF_SECS.saturating_pow(attempts as u32);
            let sql_retry = r#"UPDATE outbox_events SET status = 'pending', available_at = NOW() + make_interval(secs := $2::int), updated_at = NOW() WHERE id = $1"#;
            let stmt_retry = Statement::from_sql_and_values(
                DbBackend::Postgres,
                sql_retry,
                vec![id.into(), backoff.into()],
            );
            if let Err(e) = db.execute(stmt_retry).await {
                warn!("failed scheduling retry for outbox {}: {}", id, e);
            }
        } else {
            mark_failed(db, id, "max attempts exceeded").await;
        }
    }
    Ok(())
}

async fn mark_failed(db: &DatabaseConnection, id: Uuid, _reason: &str) {
    let sql_fail =
        r#"UPDATE outbox_events SET status = 'failed', updated_at = NOW() WHERE id = $1"#;
    let stmt_fail = Statement::from_sql_and_values(DbBackend::Postgres, sql_fail, vec![id.into()]);
    if let Err(e) = db.execute(stmt_fail).await {
        warn!("failed marking outbox {} failed: {}", id, e);
    }
}

fn map_to_event(event_type: &str, payload: &Value) -> Option<Event> {
    let uuid_field = |name: &str| -> Option<Uuid> {
        payload
            .get(name)
            .and_then(|v| v.as_str())
            .and_then(|s| Uuid::parse_str(s).ok())
    };

    match event_type {
        "waybill.committed" => Some(Event::WaybillCommitted {
            waybill_id: uuid_field("waybill_id")?,
            waybill_number: payload.get("waybill_number").and_then(|v| v.as_i64())?,
            company_id: uuid_field("company_id")?,
            user_id: uuid_field("user_id")?,
            document_path: payload
                .get("document_path")
                .and_then(|v| v.as_str())
                .map(str::to_string),
        }),
        "pickup.requested" => Some(Event::PickupRequested {
            pickup_request_id: uuid_field("pickup_request_id")?,
            waybill_id: uuid_field("waybill_id")?,
            skid_count: payload
                .get("skid_count")
                .and_then(|v| v.as_u64())
                .unwrap_or(0) as usize,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn maps_waybill_committed_payload() {
        let waybill_id = Uuid::new_v4();
        let payload = json!({
            "waybill_id": waybill_id.to_string(),
            "waybill_number": 1043,
            "company_id": Uuid::new_v4().to_string(),
            "user_id": Uuid::new_v4().to_string(),
            "document_path": "waybill-1043.pdf",
        });

        match map_to_event("waybill.committed", &payload) {
            Some(Event::WaybillCommitted {
                waybill_id: id,
                waybill_number,
                document_path,
                ..
            }) => {
                assert_eq!(id, waybill_id);
                assert_eq!(waybill_number, 1043);
                assert_eq!(document_path.as_deref(), Some("waybill-1043.pdf"));
            }
            other => panic!("unexpected mapping: {:?}", other),
        }
    }

    #[test]
    fn unknown_event_type_is_rejected() {
        assert!(map_to_event("waybill.unknown", &json!({})).is_none());
    }
}
