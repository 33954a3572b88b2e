//! Email subscriber model

use super::ids::{PublicationId, SubscriberId};
use serde::{Deserialize, Serialize};

/// A verified subscriber to a publication's release announcements
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscriber {
    /// Subscriber identifier
    pub id: SubscriberId,

    /// Publication subscribed to
    pub publication_id: PublicationId,

    /// Delivery address
    pub email: String,
}
