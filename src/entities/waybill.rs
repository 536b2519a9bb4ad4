use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A committed shipment manifest. `waybill_number` is the human-facing
/// sequential identifier assigned exactly once at commit; the UUID primary
/// key is internal.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, utoipa::ToSchema)]
#[schema(as = Waybill)]
#[sea_orm(table_name = "waybills")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub waybill_number: i64,
    pub user_id: Uuid,
    pub company_id: Uuid,
    pub sales_rep_id: Option<Uuid>,
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
    pub ship_date: Option<Date>,
    pub quote_number: Option<Uuid>,
    pub job_reference_number: Option<String>,
    pub notes: Option<String>,
    pub notify_discrepancies: Option<bool>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::company::Entity",
        from = "Column::CompanyId",
        to = "super::company::Column::Id"
    )]
    Company,
    #[sea_orm(has_many = "super::waybill_service::Entity")]
    WaybillServices,
    #[sea_orm(has_many = "super::pickup_request::Entity")]
    PickupRequests,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::company::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Company.def()
    }
}

impl Related<super::waybill_service::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WaybillServices.def()
    }
}

impl Related<super::pickup_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PickupRequests.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
