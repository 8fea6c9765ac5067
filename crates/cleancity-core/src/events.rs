use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An event that can travel over an [`EventBus`](crate::bus::EventBus).
///
/// Subscribers register against a `Kind`; every event reports its kind so
/// the bus can route it to the matching subscriber list.
pub trait BusEvent: Send + Sync + 'static {
    type Kind: Copy + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static;

    fn kind(&self) -> Self::Kind;
}

// =============================================================================
// Report events
// =============================================================================

/// Tag of a [`DomainEvent`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "report:commented")]
    ReportCommented,
    #[serde(rename = "report:status_changed")]
    ReportStatusChanged,
    #[serde(rename = "report:assigned")]
    ReportAssigned,
    #[serde(rename = "report:resolved")]
    ReportResolved,
    #[serde(rename = "user:mentioned")]
    UserMentioned,
}

impl EventType {
    pub const ALL: [EventType; 5] = [
        EventType::ReportCommented,
        EventType::ReportStatusChanged,
        EventType::ReportAssigned,
        EventType::ReportResolved,
        EventType::UserMentioned,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::ReportCommented => "report:commented",
            EventType::ReportStatusChanged => "report:status_changed",
            EventType::ReportAssigned => "report:assigned",
            EventType::ReportResolved => "report:resolved",
            EventType::UserMentioned => "user:mentioned",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        EventType::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Something that happened to a report, published after the backend write
/// succeeded.
///
/// Events are transient: built at the call site, handed to the bus, and
/// dropped once every subscriber has seen them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    /// Someone commented on a report.
    Commented {
        report_id: Uuid,
        report_title: String,
        /// Username of the report owner, who receives the notification.
        owner_username: String,
        commenter_name: String,
        comment: String,
    },

    /// An administrator moved a report to a new status.
    StatusChanged {
        report_id: Uuid,
        report_title: String,
        owner_username: String,
        old_status: String,
        new_status: String,
    },

    /// A report was assigned to a field worker.
    Assigned {
        report_id: Uuid,
        report_title: String,
        worker_username: String,
        assigned_by: String,
    },

    /// A report was marked resolved.
    Resolved {
        report_id: Uuid,
        report_title: String,
        owner_username: String,
        resolved_by: String,
        #[serde(default)]
        resolution_note: Option<String>,
    },

    /// A user was @-mentioned in a comment.
    Mentioned {
        report_id: Uuid,
        report_title: String,
        mentioned_username: String,
        mentioned_by: String,
        comment: String,
    },
}

impl DomainEvent {
    pub fn event_type(&self) -> EventType {
        match self {
            DomainEvent::Commented { .. } => EventType::ReportCommented,
            DomainEvent::StatusChanged { .. } => EventType::ReportStatusChanged,
            DomainEvent::Assigned { .. } => EventType::ReportAssigned,
            DomainEvent::Resolved { .. } => EventType::ReportResolved,
            DomainEvent::Mentioned { .. } => EventType::UserMentioned,
        }
    }

    pub fn report_id(&self) -> Uuid {
        match self {
            DomainEvent::Commented { report_id, .. }
            | DomainEvent::StatusChanged { report_id, .. }
            | DomainEvent::Assigned { report_id, .. }
            | DomainEvent::Resolved { report_id, .. }
            | DomainEvent::Mentioned { report_id, .. } => *report_id,
        }
    }

    /// Username of the person this event should be pushed to.
    pub fn recipient(&self) -> &str {
        match self {
            DomainEvent::Commented { owner_username, .. }
            | DomainEvent::StatusChanged { owner_username, .. }
            | DomainEvent::Resolved { owner_username, .. } => owner_username,
            DomainEvent::Assigned {
                worker_username, ..
            } => worker_username,
            DomainEvent::Mentioned {
                mentioned_username,
                ..
            } => mentioned_username,
        }
    }
}

impl BusEvent for DomainEvent {
    type Kind = EventType;

    fn kind(&self) -> EventType {
        self.event_type()
    }
}

// =============================================================================
// Community feed events
// =============================================================================

/// Tag of a [`PostEvent`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PostEventType {
    #[serde(rename = "post:created")]
    Created,
    #[serde(rename = "post:commented")]
    Commented,
    #[serde(rename = "post:rated")]
    Rated,
    #[serde(rename = "post:deleted")]
    Deleted,
}

impl PostEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostEventType::Created => "post:created",
            PostEventType::Commented => "post:commented",
            PostEventType::Rated => "post:rated",
            PostEventType::Deleted => "post:deleted",
        }
    }
}

impl fmt::Display for PostEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Community feed activity, used to refresh independently mounted views.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PostEvent {
    Created { post_id: Uuid, author_id: Uuid },
    Commented { post_id: Uuid, comment_id: Uuid },
    Rated { post_id: Uuid, rating: u8 },
    Deleted { post_id: Uuid },
}

impl BusEvent for PostEvent {
    type Kind = PostEventType;

    fn kind(&self) -> PostEventType {
        match self {
            PostEvent::Created { .. } => PostEventType::Created,
            PostEvent::Commented { .. } => PostEventType::Commented,
            PostEvent::Rated { .. } => PostEventType::Rated,
            PostEvent::Deleted { .. } => PostEventType::Deleted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commented() -> DomainEvent {
        DomainEvent::Commented {
            report_id: Uuid::new_v4(),
            report_title: "Broken streetlight".into(),
            owner_username: "maria".into(),
            commenter_name: "João".into(),
            comment: "Still broken tonight".into(),
        }
    }

    #[test]
    fn test_event_type_tags() {
        assert_eq!(EventType::ReportCommented.as_str(), "report:commented");
        assert_eq!(
            EventType::ReportStatusChanged.to_string(),
            "report:status_changed"
        );
        assert_eq!(EventType::UserMentioned.as_str(), "user:mentioned");
    }

    #[test]
    fn test_event_type_parse() {
        for t in EventType::ALL {
            assert_eq!(EventType::parse(t.as_str()), Some(t));
        }
        assert_eq!(EventType::parse("report:deleted"), None);
    }

    #[test]
    fn test_domain_event_kind_matches_variant() {
        assert_eq!(commented().kind(), EventType::ReportCommented);

        let assigned = DomainEvent::Assigned {
            report_id: Uuid::new_v4(),
            report_title: "Overflowing bin".into(),
            worker_username: "crew-7".into(),
            assigned_by: "admin".into(),
        };
        assert_eq!(assigned.event_type(), EventType::ReportAssigned);
        assert_eq!(assigned.recipient(), "crew-7");
    }

    #[test]
    fn test_recipient_is_owner_for_comments() {
        assert_eq!(commented().recipient(), "maria");
    }

    #[test]
    fn test_event_serialization_uses_tag() {
        let json = serde_json::to_string(&commented()).unwrap();
        assert!(json.contains("\"type\":\"commented\""));
        let back: DomainEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back.event_type(), EventType::ReportCommented);
    }

    #[test]
    fn test_event_type_serializes_as_wire_tag() {
        let json = serde_json::to_string(&EventType::ReportResolved).unwrap();
        assert_eq!(json, "\"report:resolved\"");
    }

    #[test]
    fn test_post_event_kind() {
        let event = PostEvent::Rated {
            post_id: Uuid::new_v4(),
            rating: 5,
        };
        assert_eq!(event.kind(), PostEventType::Rated);
        assert_eq!(event.kind().to_string(), "post:rated");
    }
}
