use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub phone: Option<String>,
    pub user_type: UserType,
    pub created_at: DateTimeUtc,
}

/// Account role. Shipping clerks are locked out of the waybill workflows;
/// sales reps see their represented accounts in addition to their own
/// memberships.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    #[sea_orm(string_value = "user")]
    User,
    #[sea_orm(string_value = "sales_rep")]
    SalesRep,
    #[sea_orm(string_value = "shipping_clerk")]
    ShippingClerk,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::company_user::Entity")]
    CompanyUsers,
    #[sea_orm(has_many = "super::waybill::Entity")]
    Waybills,
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

impl Related<super::company::Entity> for Entity {
    fn to() -> RelationDef {
        super::company_user::Relation::Company.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::company_user::Relation::User.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
