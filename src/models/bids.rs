use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::gigs::GigSummary;
use crate::models::users::UserSummary;

/// Bid status stored as a lowercase string in the database.
///
/// `pending` moves to `hired` or `rejected` during a hire; both are terminal.
/// Serialized lowercase so API payloads use the same strings the database
/// stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum BidStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "hired")]
    Hired,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

/// SeaORM entity for the `bids` table.
///
/// A unique index on (gig_id, bidder_id) allows at most one bid per bidder
/// per gig.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bids")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub gig_id: Uuid,
    pub bidder_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub message: String,
    #[sea_orm(column_type = "Double")]
    pub price: f64,
    pub status: BidStatus,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::gigs::Entity",
        from = "Column::GigId",
        to = "super::gigs::Column::Id"
    )]
    Gig,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::BidderId",
        to = "super::users::Column::Id"
    )]
    Bidder,
}

impl Related<super::gigs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Gig.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bidder.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs ──

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBid {
    pub message: String,
    pub price: f64,
}

/// A bid joined with bidder display fields and a gig snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct BidResponse {
    pub id: Uuid,
    pub gig_id: Uuid,
    pub message: String,
    pub price: f64,
    pub status: BidStatus,
    pub bidder: Option<UserSummary>,
    pub gig: Option<GigSummary>,
    pub created_at: DateTimeUtc,
}

impl BidResponse {
    pub fn from_parts(
        bid: Model,
        bidder: Option<super::users::Model>,
        gig: Option<super::gigs::Model>,
    ) -> Self {
        Self {
            id: bid.id,
            gig_id: bid.gig_id,
            message: bid.message,
            price: bid.price,
            status: bid.status,
            bidder: bidder.map(UserSummary::from),
            gig: gig.map(GigSummary::from),
            created_at: bid.created_at,
        }
    }
}
