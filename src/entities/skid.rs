use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A pallet attached to a pickup request. `skid_number` is the 1-5 slot
/// index from the submitted form.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, utoipa::ToSchema)]
#[schema(as = Skid)]
#[sea_orm(table_name = "skids")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub pickup_request_id: Uuid,
    pub skid_number: i16,
    pub length: Decimal,
    pub width: Decimal,
    pub height: Decimal,
    pub weight: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::pickup_request::Entity",
        from = "Column::PickupRequestId",
        to = "super::pickup_request::Column::Id"
    )]
    PickupRequest,
}

impl Related<super::pickup_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PickupRequest.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
