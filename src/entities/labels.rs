use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "labels")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub name: String,

    /// Cleared when the creating user is deleted.
    pub created_by: Option<i32>,

    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::ticket_labels::Entity")]
    TicketLabels,
}

impl Related<super::ticket_labels::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TicketLabels.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
