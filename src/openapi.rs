use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::drafts::{ServiceLine, WaybillDraft};
use crate::entities::{company, pickup_request, quote, service, skid, waybill};
use crate::errors::ErrorResponse;
use crate::handlers;
use crate::services::documents::ArtifactRef;
use crate::services::pickups::{PickupOutcome, PickupRequestInput, SkidGroupInput};
use crate::services::quotes::ConvertOutcome;
use crate::services::waybills::{
    CommitOutcome, FormContext, GroupedServices, PreviewOutcome, ServiceLineInput, WaybillForm,
    WaybillLine, WaybillListing, WaybillWithServices,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::waybills::list_waybills,
        handlers::waybills::new_waybill,
        handlers::waybills::preview_waybill,
        handlers::waybills::commit_waybill,
        handlers::waybills::discard_draft,
        handlers::waybills::convert_quote,
        handlers::waybills::get_waybill,
        handlers::waybills::get_waybill_document,
        handlers::pickups::create_pickup_request,
    ),
    components(schemas(
        waybill::Model,
        service::Model,
        service::ServiceType,
        company::Model,
        quote::Model,
        pickup_request::Model,
        skid::Model,
        WaybillDraft,
        ServiceLine,
        WaybillForm,
        ServiceLineInput,
        FormContext,
        GroupedServices,
        PreviewOutcome,
        CommitOutcome,
        ConvertOutcome,
        WaybillWithServices,
        WaybillLine,
        WaybillListing,
        ArtifactRef,
        PickupRequestInput,
        SkidGroupInput,
        PickupOutcome,
        handlers::waybills::CommitRequest,
        ErrorResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "waybills", description = "Waybill drafting, preview, commit, and documents"),
        (name = "pickups", description = "Pickup scheduling against committed waybills"),
    ),
    info(
        title = "FreightBill API",
        description = "Freight logistics backend: waybills, quote conversion, and pickups",
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
