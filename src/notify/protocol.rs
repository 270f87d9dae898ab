use serde::Serialize;
use uuid::Uuid;

/// One-shot events the server pushes to a connected client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// The client's bid was selected by the gig owner.
    Hired {
        message: String,
        gig_id: Uuid,
        gig_title: String,
        bid_id: Uuid,
    },
}
