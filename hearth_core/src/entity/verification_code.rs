use crate::ids::VerificationCodeId;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

// Not tied to a user row: codes are issued before registration.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "verification_code")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: VerificationCodeId,
    pub phone: String,
    pub code: String,
    #[sea_orm(column_name = "type")]
    pub kind: String,
    pub expires_at: DateTimeUtc,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
