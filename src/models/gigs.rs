use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::users::UserSummary;

/// Gig status stored as a lowercase string in the database.
///
/// The only transition is `open -> assigned`; nothing ever leaves `assigned`.
/// Serialized lowercase so API payloads and query params use the same
/// strings the database stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum GigStatus {
    #[sea_orm(string_value = "open")]
    Open,
    #[sea_orm(string_value = "assigned")]
    Assigned,
}

/// SeaORM entity for the `gigs` table.
///
/// Invariant: `assignee_id` is non-null iff `status` is `assigned`, and it
/// always matches the bidder of the single hired bid on this gig.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "gigs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(column_type = "Double")]
    pub budget: f64,
    pub status: GigStatus,
    pub owner_id: Uuid,
    pub assignee_id: Option<Uuid>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::bids::Entity")]
    Bids,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::OwnerId",
        to = "super::users::Column::Id"
    )]
    Owner,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::AssigneeId",
        to = "super::users::Column::Id"
    )]
    Assignee,
}

impl Related<super::bids::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bids.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs ──

#[derive(Debug, Clone, Deserialize)]
pub struct CreateGig {
    pub title: String,
    pub description: String,
    pub budget: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateGig {
    pub title: Option<String>,
    pub description: Option<String>,
    pub budget: Option<f64>,
}

/// Query params for `GET /api/gigs`.
#[derive(Debug, Clone, Deserialize)]
pub struct GigListQuery {
    /// Case-insensitive substring match on the title.
    pub search: Option<String>,
    pub status: Option<GigStatus>,
}

/// A gig snapshot embedded in bid responses.
#[derive(Debug, Clone, Serialize)]
pub struct GigSummary {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub budget: f64,
    pub status: GigStatus,
}

impl From<Model> for GigSummary {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            description: m.description,
            budget: m.budget,
            status: m.status,
        }
    }
}

/// A gig joined with owner/assignee display fields for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct GigResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub budget: f64,
    pub status: GigStatus,
    pub owner: Option<UserSummary>,
    pub assignee: Option<UserSummary>,
    pub created_at: DateTimeUtc,
}

impl GigResponse {
    pub fn from_parts(
        gig: Model,
        owner: Option<super::users::Model>,
        assignee: Option<super::users::Model>,
    ) -> Self {
        Self {
            id: gig.id,
            title: gig.title,
            description: gig.description,
            budget: gig.budget,
            status: gig.status,
            owner: owner.map(UserSummary::from),
            assignee: assignee.map(UserSummary::from),
            created_at: gig.created_at,
        }
    }
}
