use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;

/// A user's bookmark of a timeline event, character, or year.
///
/// At most one row may exist per `(user_id, kind, item_id)` triple; the
/// migration adds a unique index as the final arbiter of insert races.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "favorite")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub kind: String,
    pub item_id: String,
    pub created_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::chronicle_user::Entity",
        from = "Column::UserId",
        to = "super::chronicle_user::Column::Id"
    )]
    ChronicleUser,
}

impl Related<super::chronicle_user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ChronicleUser.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
