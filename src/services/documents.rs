use std::path::PathBuf;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use crate::drafts::WaybillDraft;
use crate::errors::ServiceError;

/// One resolved service line on a rendered manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentLine {
    pub service_name: String,
    pub pieces: i32,
    pub pounds: Decimal,
}

/// Everything the generator needs to render a manifest, for both the
/// low-fidelity preview and the final committed document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaybillDocument {
    /// Absent for previews; assigned numbers only exist after commit.
    pub waybill_number: Option<i64>,
    pub shipper_company: Option<String>,
    pub shipper_contact: Option<String>,
    pub shipper_address: Vec<String>,
    pub shipper_phone: Option<String>,
    pub consignee_company: Option<String>,
    pub consignee_contact: Option<String>,
    pub consignee_address: Vec<String>,
    pub consignee_phone: Option<String>,
    pub ship_date: Option<NaiveDate>,
    pub job_reference_number: Option<String>,
    pub notes: Option<String>,
    pub lines: Vec<DocumentLine>,
}

impl WaybillDocument {
    /// Assemble a preview document from a staged draft. Line names are
    /// resolved by the caller, which has database access.
    pub fn from_draft(draft: &WaybillDraft, lines: Vec<DocumentLine>) -> Self {
        Self {
            waybill_number: None,
            shipper_company: draft.shipper_company.clone(),
            shipper_contact: draft.shipper_contact.clone(),
            shipper_address: address_block(&[
                &draft.shipper_address_line_1,
                &draft.shipper_address_line_2,
                &draft.shipper_address_line_3,
            ]),
            shipper_phone: draft.shipper_phone.clone(),
            consignee_company: draft.consignee_company.clone(),
            consignee_contact: draft.consignee_contact.clone(),
            consignee_address: address_block(&[
                &draft.consignee_address_line_1,
                &draft.consignee_address_line_2,
                &draft.consignee_address_line_3,
            ]),
            consignee_phone: draft.consignee_phone.clone(),
            ship_date: draft.ship_date,
            job_reference_number: draft.job_reference_number.clone(),
            notes: draft.notes.clone(),
            lines,
        }
    }
}

fn address_block(lines: &[&Option<String>]) -> Vec<String> {
    lines.iter().filter_map(|l| (*l).clone()).collect()
}

fn push_party(
    out: &mut String,
    company: &Option<String>,
    contact: &Option<String>,
    address: &[String],
    phone: &Option<String>,
) {
    if let Some(company) = company {
        out.push_str(&format!("  {}\n", company));
    }
    if let Some(contact) = contact {
        out.push_str(&format!("  Attn: {}\n", contact));
    }
    for line in address {
        out.push_str(&format!("  {}\n", line));
    }
    if let Some(phone) = phone {
        out.push_str(&format!("  Phone: {}\n", phone));
    }
}

/// Reference to a generated artifact, relative to the document root.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ArtifactRef {
    pub path: String,
}

/// Renders waybill manifests. The artifact format belongs to the
/// implementation; callers only pass references around.
#[async_trait]
pub trait DocumentGenerator: Send + Sync {
    /// Low-fidelity render for the preview step.
    async fn generate_preview(&self, doc: &WaybillDocument) -> Result<ArtifactRef, ServiceError>;

    /// Final artifact for a committed waybill.
    async fn generate_final(&self, doc: &WaybillDocument) -> Result<ArtifactRef, ServiceError>;
}

/// Filesystem-backed generator writing plain-text manifests under the
/// configured document directory.
pub struct FileDocumentGenerator {
    root: PathBuf,
}

impl FileDocumentGenerator {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn render(doc: &WaybillDocument) -> String {
        let mut out = String::new();
        match doc.waybill_number {
            Some(number) => out.push_str(&format!("WAYBILL #{}\n", number)),
            None => out.push_str("WAYBILL PREVIEW (not yet committed)\n"),
        }
        if let Some(date) = doc.ship_date {
            out.push_str(&format!("Ship date: {}\n", date));
        }
        if let Some(job) = &doc.job_reference_number {
            out.push_str(&format!("Job reference: {}\n", job));
        }

        out.push_str("\nSHIPPER\n");
        push_party(
            &mut out,
            &doc.shipper_company,
            &doc.shipper_contact,
            &doc.shipper_address,
            &doc.shipper_phone,
        );
        out.push_str("\nCONSIGNEE\n");
        push_party(
            &mut out,
            &doc.consignee_company,
            &doc.consignee_contact,
            &doc.consignee_address,
            &doc.consignee_phone,
        );

        out.push_str("\nSERVICES\n");
        for line in &doc.lines {
            out.push_str(&format!(
                "  {}  pieces={}  pounds={}\n",
                line.service_name, line.pieces, line.pounds
            ));
        }
        if let Some(notes) = &doc.notes {
            out.push_str(&format!("\nNotes: {}\n", notes));
        }
        out
    }

    async fn write(&self, relative: &str, contents: &str) -> Result<ArtifactRef, ServiceError> {
        let full = self.root.join(relative);
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                ServiceError::ExternalServiceError(format!("document dir unavailable: {}", e))
            })?;
        }
        tokio::fs::write(&full, contents).await.map_err(|e| {
            ServiceError::ExternalServiceError(format!("document write failed: {}", e))
        })?;
        Ok(ArtifactRef {
            path: relative.to_string(),
        })
    }
}

#[async_trait]
impl DocumentGenerator for FileDocumentGenerator {
    #[instrument(skip(self, doc))]
    async fn generate_preview(&self, doc: &WaybillDocument) -> Result<ArtifactRef, ServiceError> {
        let relative = format!("previews/waybill-preview-{}.txt", Uuid::new_v4());
        self.write(&relative, &Self::render(doc)).await
    }

    #[instrument(skip(self, doc))]
    async fn generate_final(&self, doc: &WaybillDocument) -> Result<ArtifactRef, ServiceError> {
        let number = doc.waybill_number.ok_or_else(|| {
            ServiceError::InternalError("final document requires a waybill number".to_string())
        })?;
        let relative = format!("waybill-{}.txt", number);
        self.write(&relative, &Self::render(doc)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_doc(number: Option<i64>) -> WaybillDocument {
        WaybillDocument {
            waybill_number: number,
            shipper_company: Some("Acme Freight".into()),
            shipper_contact: Some("Dana".into()),
            shipper_address: vec!["1 Dock Rd".into(), "Milwaukee, WI".into()],
            shipper_phone: Some("555-0100".into()),
            consignee_company: Some("360 Distribution".into()),
            consignee_contact: Some("Jamie Czajka".into()),
            consignee_address: vec!["6201 Ace Industrial Drive".into(), "Cudahy, WI 53110".into()],
            consignee_phone: Some("866-360-7582".into()),
            ship_date: None,
            job_reference_number: Some("JOB-88".into()),
            notes: None,
            lines: vec![DocumentLine {
                service_name: "Canadian Ground".into(),
                pieces: 3,
                pounds: dec!(50),
            }],
        }
    }

    #[test]
    fn preview_render_is_marked_uncommitted() {
        let rendered = FileDocumentGenerator::render(&sample_doc(None));
        assert!(rendered.starts_with("WAYBILL PREVIEW"));
        assert!(rendered.contains("Canadian Ground"));
    }

    #[test]
    fn final_render_carries_the_number() {
        let rendered = FileDocumentGenerator::render(&sample_doc(Some(1043)));
        assert!(rendered.starts_with("WAYBILL #1043"));
    }

    #[tokio::test]
    async fn final_generation_requires_a_number() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let generator = FileDocumentGenerator::new(tmp.path());
        let err = generator.generate_final(&sample_doc(None)).await;
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn artifacts_land_under_the_root() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let generator = FileDocumentGenerator::new(tmp.path());
        let artifact = generator
            .generate_final(&sample_doc(Some(7)))
            .await
            .expect("artifact");
        assert_eq!(artifact.path, "waybill-7.txt");
        assert!(tmp.path().join("waybill-7.txt").exists());
    }
}
