use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, utoipa::ToSchema)]
#[schema(as = Company)]
#[sea_orm(table_name = "companies")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub address_line_1: Option<String>,
    pub address_line_2: Option<String>,
    pub address_line_3: Option<String>,
    pub phone: Option<String>,
    /// The user's default shipping company when no explicit client is chosen.
    pub is_primary: bool,
    pub sales_rep_id: Option<Uuid>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::company_user::Entity")]
    CompanyUsers,
    #[sea_orm(has_many = "super::waybill::Entity")]
    Waybills,
    #[sea_orm(has_many = "super::quote::Entity")]
    Quotes,
}

impl Related<super::company_user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CompanyUsers.def()
    }
}

impl Related<super::waybill::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Waybills.def()
    }
}

impl Related<super::quote::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Quotes.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        super::company_user::Relation::User.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::company_user::Relation::Company.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
