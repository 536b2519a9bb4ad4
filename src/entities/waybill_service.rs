use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Pivot row linking a waybill to one of its services, carrying the
/// per-line piece count and weight.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "waybill_services")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub waybill_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub service_id: Uuid,
    pub pieces: i32,
    pub pounds: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::waybill::Entity",
        from = "Column::WaybillId",
        to = "super::waybill::Column::Id"
    )]
    Waybill,
    #[sea_orm(
        belongs_to = "super::service::Entity",
        from = "Column::ServiceId",
        to = "super::service::Column::Id"
    )]
    Service,
}

impl Related<super::waybill::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Waybill.def()
    }
}

impl Related<super::service::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Service.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
