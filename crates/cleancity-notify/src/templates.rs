//! Typed message factories, one per report event.
//!
//! Factories only fill in fixed templates from structured fields. The
//! recipient's topic comes from [`crate::topic::user_topic`] and the click
//! target always points at the report page.

use cleancity_core::events::DomainEvent;
use cleancity_core::types::truncate_with_ellipsis;
use uuid::Uuid;

use crate::payload::{NtfyAction, NtfyMessage, Priority};
use crate::topic::{user_topic, DEFAULT_TOPIC_PREFIX};

/// Longest comment excerpt quoted in a push, before the ellipsis.
pub const COMMENT_PREVIEW_CHARS: usize = 50;

/// Deployment-specific values every template needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TemplateContext {
    pub topic_prefix: String,
    pub app_url: String,
}

impl TemplateContext {
    pub fn new(topic_prefix: impl Into<String>, app_url: impl Into<String>) -> Self {
        Self {
            topic_prefix: topic_prefix.into(),
            app_url: app_url.into(),
        }
    }

    pub fn topic_for(&self, username: &str) -> String {
        user_topic(&self.topic_prefix, username)
    }

    /// `{app_url}/reports/{id}`, tolerating a trailing slash on the base.
    pub fn report_url(&self, report_id: Uuid) -> String {
        format!("{}/reports/{}", self.app_url.trim_end_matches('/'), report_id)
    }
}

impl Default for TemplateContext {
    fn default() -> Self {
        Self::new(DEFAULT_TOPIC_PREFIX, "http://localhost:5173")
    }
}

pub struct CommentAdded<'a> {
    pub owner_username: &'a str,
    pub report_id: Uuid,
    pub report_title: &'a str,
    pub commenter_name: &'a str,
    pub comment: &'a str,
}

pub struct StatusChanged<'a> {
    pub owner_username: &'a str,
    pub report_id: Uuid,
    pub report_title: &'a str,
    pub old_status: &'a str,
    pub new_status: &'a str,
}

pub struct ReportAssigned<'a> {
    pub worker_username: &'a str,
    pub report_id: Uuid,
    pub report_title: &'a str,
    pub assigned_by: &'a str,
}

pub struct ReportResolved<'a> {
    pub owner_username: &'a str,
    pub report_id: Uuid,
    pub report_title: &'a str,
    pub resolved_by: &'a str,
    pub resolution_note: Option<&'a str>,
}

pub struct UserMentioned<'a> {
    pub mentioned_username: &'a str,
    pub report_id: Uuid,
    pub report_title: &'a str,
    pub mentioned_by: &'a str,
    pub comment: &'a str,
}

fn report_message(
    ctx: &TemplateContext,
    username: &str,
    report_id: Uuid,
    title: &str,
    body: String,
) -> NtfyMessage {
    let url = ctx.report_url(report_id);
    NtfyMessage::new(ctx.topic_for(username), body)
        .title(title)
        .click(url.clone())
        .action(NtfyAction::view("Open report", url))
}

pub fn comment_added(params: &CommentAdded<'_>, ctx: &TemplateContext) -> NtfyMessage {
    let preview = truncate_with_ellipsis(params.comment, COMMENT_PREVIEW_CHARS);
    report_message(
        ctx,
        params.owner_username,
        params.report_id,
        "New comment on your report",
        format!(
            "{} commented on \"{}\": {}",
            params.commenter_name, params.report_title, preview
        ),
    )
    .priority(Priority::DEFAULT)
    .tags(["speech_balloon"])
}

pub fn status_changed(params: &StatusChanged<'_>, ctx: &TemplateContext) -> NtfyMessage {
    report_message(
        ctx,
        params.owner_username,
        params.report_id,
        "Report status updated",
        format!(
            "\"{}\" changed from {} to {}",
            params.report_title, params.old_status, params.new_status
        ),
    )
    .priority(Priority::DEFAULT)
    .tags(["arrows_counterclockwise"])
}

pub fn report_assigned(params: &ReportAssigned<'_>, ctx: &TemplateContext) -> NtfyMessage {
    report_message(
        ctx,
        params.worker_username,
        params.report_id,
        "New report assigned to you",
        format!(
            "{} assigned you \"{}\"",
            params.assigned_by, params.report_title
        ),
    )
    .priority(Priority::HIGH)
    .tags(["construction_worker"])
}

pub fn report_resolved(params: &ReportResolved<'_>, ctx: &TemplateContext) -> NtfyMessage {
    let mut body = format!(
        "\"{}\" was resolved by {}",
        params.report_title, params.resolved_by
    );
    if let Some(note) = params.resolution_note.map(str::trim).filter(|n| !n.is_empty()) {
        body.push_str(&format!("\nNote: {}", note));
    }
    report_message(
        ctx,
        params.owner_username,
        params.report_id,
        "Your report was resolved",
        body,
    )
    .priority(Priority::HIGH)
    .tags(["white_check_mark", "tada"])
}

pub fn user_mentioned(params: &UserMentioned<'_>, ctx: &TemplateContext) -> NtfyMessage {
    let preview = truncate_with_ellipsis(params.comment, COMMENT_PREVIEW_CHARS);
    report_message(
        ctx,
        params.mentioned_username,
        params.report_id,
        "You were mentioned",
        format!(
            "{} mentioned you on \"{}\": {}",
            params.mentioned_by, params.report_title, preview
        ),
    )
    .priority(Priority::HIGH)
    .tags(["loudspeaker"])
}

/// Build the push for a bus event.
pub fn for_event(event: &DomainEvent, ctx: &TemplateContext) -> NtfyMessage {
    match event {
        DomainEvent::Commented {
            report_id,
            report_title,
            owner_username,
            commenter_name,
            comment,
        } => comment_added(
            &CommentAdded {
                owner_username,
                report_id: *report_id,
                report_title,
                commenter_name,
                comment,
            },
            ctx,
        ),
        DomainEvent::StatusChanged {
            report_id,
            report_title,
            owner_username,
            old_status,
            new_status,
        } => status_changed(
            &StatusChanged {
                owner_username,
                report_id: *report_id,
                report_title,
                old_status,
                new_status,
            },
            ctx,
        ),
        DomainEvent::Assigned {
            report_id,
            report_title,
            worker_username,
            assigned_by,
        } => report_assigned(
            &ReportAssigned {
                worker_username,
                report_id: *report_id,
                report_title,
                assigned_by,
            },
            ctx,
        ),
        DomainEvent::Resolved {
            report_id,
            report_title,
            owner_username,
            resolved_by,
            resolution_note,
        } => report_resolved(
            &ReportResolved {
                owner_username,
                report_id: *report_id,
                report_title,
                resolved_by,
                resolution_note: resolution_note.as_deref(),
            },
            ctx,
        ),
        DomainEvent::Mentioned {
            report_id,
            report_title,
            mentioned_username,
            mentioned_by,
            comment,
        } => user_mentioned(
            &UserMentioned {
                mentioned_username,
                report_id: *report_id,
                report_title,
                mentioned_by,
                comment,
            },
            ctx,
        ),
    }
}
