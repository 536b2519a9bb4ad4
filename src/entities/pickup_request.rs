use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, utoipa::ToSchema)]
#[schema(as = PickupRequest)]
#[sea_orm(table_name = "pickup_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub waybill_id: Uuid,
    pub pickup_contact: String,
    pub pickup_phone: String,
    pub pickup_email: String,
    pub pickup_date: Date,
    pub pickup_company: String,
    pub pickup_address_line_1: String,
    pub pickup_address_line_2: Option<String>,
    pub pickup_address_line_3: String,
    pub pickup_ready_time: String,
    pub pickup_close_time: String,
    pub notes: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::waybill::Entity",
        from = "Column::WaybillId",
        to = "super::waybill::Column::Id"
    )]
    Waybill,
    #[sea_orm(has_many = "super::skid::Entity")]
    Skids,
}

impl Related<super::waybill::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Waybill.def()
    }
}

impl Related<super::skid::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Skids.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
