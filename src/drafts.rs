use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use dashmap::DashMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// One service line on an in-progress waybill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ServiceLine {
    pub pieces: i32,
    pub pounds: Decimal,
}

/// An unpersisted waybill staged for review before commit.
///
/// `pending_services` exists only on the draft; commit detaches it into
/// pivot rows and the draft itself is discarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct WaybillDraft {
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
    /// Human-facing back-reference shown on the manifest.
    pub quote_number: Option<Uuid>,
    /// Set only by quote conversion; drives the waybill_id back-fill at commit.
    pub quote_id: Option<Uuid>,
    pub job_reference_number: Option<String>,
    pub notes: Option<String>,
    pub notify_discrepancies: Option<bool>,
    pub pending_services: BTreeMap<Uuid, ServiceLine>,
}

impl WaybillDraft {
    pub fn new(company_id: Uuid) -> Self {
        Self {
            company_id,
            shipper_company: None,
            shipper_contact: None,
            shipper_address_line_1: None,
            shipper_address_line_2: None,
            shipper_address_line_3: None,
            shipper_phone: None,
            consignee_company: None,
            consignee_contact: None,
            consignee_address_line_1: None,
            consignee_address_line_2: None,
            consignee_address_line_3: None,
            consignee_phone: None,
            ship_date: None,
            quote_number: None,
            quote_id: None,
            job_reference_number: None,
            notes: None,
            notify_discrepancies: None,
            pending_services: BTreeMap::new(),
        }
    }
}

struct StagedEntry {
    draft: WaybillDraft,
    expires_at: Instant,
}

/// Keyed store of pending drafts, one slot per session key.
///
/// Replaces ambient web-session state with an explicit mapping: `put`
/// overwrites, `get` refreshes the deadline, `clear` is called exactly once
/// after a successful commit. Concurrent tabs under one key share the slot;
/// last write wins.
pub struct DraftStore {
    slots: DashMap<Uuid, StagedEntry>,
    ttl: Duration,
}

impl DraftStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            slots: DashMap::new(),
            ttl,
        }
    }

    /// Stage a draft, replacing any previous one under this key.
    pub fn put(&self, key: Uuid, draft: WaybillDraft) {
        self.slots.insert(
            key,
            StagedEntry {
                draft,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    /// Fetch the staged draft, if any. Absence means "start fresh", never an
    /// error. Reading extends the deadline, mirroring session keep-alive.
    pub fn get(&self, key: Uuid) -> Option<WaybillDraft> {
        let now = Instant::now();
        let expired = {
            match self.slots.get_mut(&key) {
                Some(mut entry) => {
                    if entry.expires_at > now {
                        entry.expires_at = now + self.ttl;
                        return Some(entry.draft.clone());
                    }
                    true
                }
                None => false,
            }
        };
        if expired {
            self.slots.remove(&key);
        }
        None
    }

    /// Drop the staged draft so a stale one can never be resubmitted.
    pub fn clear(&self, key: Uuid) {
        self.slots.remove(&key);
    }

    /// Remove expired slots. Called periodically from a background task.
    pub fn sweep_expired(&self) {
        let now = Instant::now();
        let before = self.slots.len();
        self.slots.retain(|_, entry| entry.expires_at > now);
        let removed = before.saturating_sub(self.slots.len());
        if removed > 0 {
            debug!(removed, "swept expired waybill drafts");
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn draft_with_note(note: &str) -> WaybillDraft {
        let mut draft = WaybillDraft::new(Uuid::new_v4());
        draft.notes = Some(note.to_string());
        draft
    }

    #[test]
    fn put_overwrites_existing_slot() {
        let store = DraftStore::new(Duration::from_secs(60));
        let key = Uuid::new_v4();

        store.put(key, draft_with_note("first"));
        store.put(key, draft_with_note("second"));

        let staged = store.get(key).expect("draft staged");
        assert_eq!(staged.notes.as_deref(), Some("second"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn absent_slot_reads_as_none() {
        let store = DraftStore::new(Duration::from_secs(60));
        assert!(store.get(Uuid::new_v4()).is_none());
    }

    #[test]
    fn clear_removes_the_slot() {
        let store = DraftStore::new(Duration::from_secs(60));
        let key = Uuid::new_v4();
        store.put(key, draft_with_note("pending"));
        store.clear(key);
        assert!(store.get(key).is_none());
    }

    #[test]
    fn expired_entries_are_not_returned() {
        let store = DraftStore::new(Duration::from_millis(0));
        let key = Uuid::new_v4();
        store.put(key, draft_with_note("stale"));
        std::thread::sleep(Duration::from_millis(5));
        assert!(store.get(key).is_none());
    }

    #[test]
    fn sweep_reclaims_expired_slots() {
        let store = DraftStore::new(Duration::from_millis(0));
        store.put(Uuid::new_v4(), draft_with_note("a"));
        store.put(Uuid::new_v4(), draft_with_note("b"));
        std::thread::sleep(Duration::from_millis(5));
        store.sweep_expired();
        assert!(store.is_empty());
    }

    #[test]
    fn keys_are_isolated() {
        let store = DraftStore::new(Duration::from_secs(60));
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let mut draft = WaybillDraft::new(Uuid::new_v4());
        draft
            .pending_services
            .insert(Uuid::new_v4(), ServiceLine { pieces: 3, pounds: dec!(50) });
        store.put(a, draft);

        assert!(store.get(b).is_none());
        assert!(store.get(a).is_some());
    }
}
