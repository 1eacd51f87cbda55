//! Inbound webhook payloads and dispatch
//!
//! A webhook names a post by identifier, embeds a snapshot of it, or both.
//! The event type decides between the delete branch and the upsert branch.

use serde::Deserialize;
use std::fmt;

use crate::content::Post;
use crate::error::MirrorError;
use crate::mirror::{Mirror, MirrorProfile, SyncAction, SyncOutcome};

/// Change notification event, parsed case-insensitively
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEvent {
    Create,
    Update,
    Delete,
    /// No event type was sent
    Unspecified,
    /// An event type outside the known vocabulary
    Unrecognized(String),
}

impl WebhookEvent {
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return WebhookEvent::Unspecified;
        };
        match raw.to_ascii_lowercase().as_str() {
            "create" | "new" => WebhookEvent::Create,
            "update" | "edit" => WebhookEvent::Update,
            "delete" => WebhookEvent::Delete,
            _ => WebhookEvent::Unrecognized(raw.to_string()),
        }
    }

    pub fn is_delete(&self) -> bool {
        matches!(self, WebhookEvent::Delete)
    }
}

impl fmt::Display for WebhookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebhookEvent::Create => write!(f, "create"),
            WebhookEvent::Update => write!(f, "update"),
            WebhookEvent::Delete => write!(f, "delete"),
            WebhookEvent::Unspecified => write!(f, "unspecified"),
            WebhookEvent::Unrecognized(raw) => write!(f, "unrecognized ({})", raw),
        }
    }
}

/// One side of a change: the published and draft values
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContentVersion {
    pub id: Option<String>,
    pub publish_value: Option<Post>,
    pub draft_value: Option<Post>,
}

impl ContentVersion {
    fn value(&self) -> Option<&Post> {
        self.publish_value.as_ref().or(self.draft_value.as_ref())
    }
}

/// Before/after snapshots of a change
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContentsChange {
    pub old: Option<ContentVersion>,
    pub new: Option<ContentVersion>,
}

/// Webhook request body
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WebhookPayload {
    pub id: Option<String>,
    #[serde(rename = "contentId")]
    pub content_id: Option<String>,
    pub event: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub blog: Option<Post>,
    pub contents: Option<ContentsChange>,
}

impl WebhookPayload {
    /// Payload carrying only an identifier and an event type
    pub fn for_id(id: impl Into<String>, event: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            event: Some(event.into()),
            ..Default::default()
        }
    }

    /// Content identifier: `id`, then `contentId`, then the query parameter
    pub fn identifier(&self, query_id: Option<&str>) -> Option<String> {
        [self.id.as_deref(), self.content_id.as_deref(), query_id]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|s| !s.is_empty())
            .map(str::to_string)
    }

    pub fn event(&self) -> WebhookEvent {
        WebhookEvent::parse(self.event.as_deref().or(self.kind.as_deref()))
    }

    fn versions(&self, newest_first: bool) -> Vec<&ContentVersion> {
        let Some(contents) = &self.contents else {
            return Vec::new();
        };
        let (first, second) = if newest_first {
            (&contents.new, &contents.old)
        } else {
            (&contents.old, &contents.new)
        };
        [first, second].into_iter().flatten().collect()
    }

    /// Embedded record to write: `blog`, then the post-change snapshot
    pub fn upsert_snapshot(&self) -> Option<&Post> {
        self.blog.as_ref().or_else(|| {
            self.versions(true)
                .into_iter()
                .find_map(ContentVersion::value)
        })
    }

    /// Embedded record of a deleted post: `blog`, then the pre-change snapshot
    pub fn delete_snapshot(&self) -> Option<&Post> {
        self.blog.as_ref().or_else(|| {
            self.versions(false)
                .into_iter()
                .find_map(ContentVersion::value)
        })
    }

    pub fn has_record(&self) -> bool {
        self.upsert_snapshot().is_some()
    }
}

/// Run one webhook invocation for a profile
pub async fn dispatch(
    mirror: &Mirror,
    profile: &MirrorProfile,
    payload: &WebhookPayload,
    query_id: Option<&str>,
) -> Result<SyncOutcome, MirrorError> {
    let id = payload.identifier(query_id);
    if id.is_none() && !payload.has_record() {
        return Err(MirrorError::BadRequest("Missing id or blog".to_string()));
    }

    let event = payload.event();
    tracing::debug!("{} webhook: event={} id={:?}", profile.kind, event, id);

    let outcome = match event {
        WebhookEvent::Delete if profile.handles_delete => {
            delete(mirror, profile, payload, id.as_deref()).await?
        }
        WebhookEvent::Delete => {
            let snapshot = with_id(payload.delete_snapshot(), id.as_deref());
            let file = crate::content::file_name(
                snapshot.as_ref(),
                id.as_deref().unwrap_or_default(),
                profile.slug_style,
            );
            tracing::info!("{} ignores delete events, keeping {}", profile.kind, file);
            SyncOutcome::new(SyncAction::Skipped, file)
        }
        other => {
            if let WebhookEvent::Unrecognized(raw) = &other {
                tracing::warn!(
                    "Unrecognized event type '{}', treating it as create/update",
                    raw
                );
            }
            upsert(mirror, profile, payload, id.as_deref()).await?
        }
    };

    mirror.after_change(profile, &outcome).await;
    Ok(outcome)
}

async fn upsert(
    mirror: &Mirror,
    profile: &MirrorProfile,
    payload: &WebhookPayload,
    id: Option<&str>,
) -> Result<SyncOutcome, MirrorError> {
    let post = match (with_id(payload.upsert_snapshot(), id), id) {
        (Some(post), _) => post,
        (None, Some(id)) => mirror.cms.get(id).await?,
        (None, None) => return Err(MirrorError::BadRequest("Missing id or blog".to_string())),
    };
    mirror.upsert(profile, &post).await
}

async fn delete(
    mirror: &Mirror,
    profile: &MirrorProfile,
    payload: &WebhookPayload,
    id: Option<&str>,
) -> Result<SyncOutcome, MirrorError> {
    // The live record is usually gone after a delete, so the payload's
    // snapshot is preferred over a fetch.
    let snapshot = match with_id(payload.delete_snapshot(), id) {
        Some(post) => Some(post),
        None => match id {
            Some(id) => mirror.lookup(id).await,
            None => None,
        },
    };

    let id = id
        .map(str::to_string)
        .or_else(|| snapshot.as_ref().map(|p| p.id.clone()))
        .unwrap_or_default();
    mirror.delete(profile, &id, snapshot.as_ref()).await
}

/// Clone a snapshot, filling in the webhook identifier when it has none
fn with_id(snapshot: Option<&Post>, id: Option<&str>) -> Option<Post> {
    let mut post = snapshot?.clone();
    if post.id.is_empty() {
        if let Some(id) = id {
            post.id = id.to_string();
        }
    }
    Some(post)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> WebhookPayload {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_event_vocabulary() {
        assert_eq!(WebhookEvent::parse(Some("delete")), WebhookEvent::Delete);
        assert_eq!(WebhookEvent::parse(Some(" DELETE ")), WebhookEvent::Delete);
        assert_eq!(WebhookEvent::parse(Some("new")), WebhookEvent::Create);
        assert_eq!(WebhookEvent::parse(Some("Create")), WebhookEvent::Create);
        assert_eq!(WebhookEvent::parse(Some("edit")), WebhookEvent::Update);
        assert_eq!(WebhookEvent::parse(Some("update")), WebhookEvent::Update);
        assert_eq!(WebhookEvent::parse(None), WebhookEvent::Unspecified);
        assert_eq!(WebhookEvent::parse(Some("  ")), WebhookEvent::Unspecified);
        assert_eq!(
            WebhookEvent::parse(Some("Archive")),
            WebhookEvent::Unrecognized("Archive".to_string())
        );
        assert!(!WebhookEvent::parse(Some("deleted")).is_delete());
    }

    #[test]
    fn test_event_prefers_event_over_type() {
        let payload = parse(r#"{"id": "a", "event": "update", "type": "delete"}"#);
        assert_eq!(payload.event(), WebhookEvent::Update);

        let payload = parse(r#"{"id": "a", "type": "delete"}"#);
        assert_eq!(payload.event(), WebhookEvent::Delete);
    }

    #[test]
    fn test_identifier_aliases() {
        let payload = parse(r#"{"contentId": "c1"}"#);
        assert_eq!(payload.identifier(Some("q1")).as_deref(), Some("c1"));

        let payload = parse(r#"{"id": "", "contentId": "c1"}"#);
        assert_eq!(payload.identifier(None).as_deref(), Some("c1"));

        let payload = parse(r#"{}"#);
        assert_eq!(payload.identifier(Some("q1")).as_deref(), Some("q1"));
        assert_eq!(payload.identifier(None), None);
    }

    #[test]
    fn test_snapshot_selection() {
        let payload = parse(
            r#"{
                "id": "abc",
                "type": "edit",
                "contents": {
                    "old": {"id": "abc", "publishValue": {"title": "Old title"}},
                    "new": {"id": "abc", "publishValue": null, "draftValue": {"title": "New draft"}}
                }
            }"#,
        );
        assert_eq!(
            payload.upsert_snapshot().and_then(|p| p.title.as_deref()),
            Some("New draft")
        );
        assert_eq!(
            payload.delete_snapshot().and_then(|p| p.title.as_deref()),
            Some("Old title")
        );
    }

    #[test]
    fn test_blog_field_wins() {
        let payload = parse(
            r#"{
                "blog": {"id": "b", "title": "Embedded"},
                "contents": {"new": {"publishValue": {"title": "Snapshot"}}}
            }"#,
        );
        assert_eq!(
            payload.upsert_snapshot().and_then(|p| p.title.as_deref()),
            Some("Embedded")
        );
        assert!(payload.has_record());
    }

    #[test]
    fn test_delete_without_old_falls_back_to_new() {
        let payload = parse(
            r#"{"id": "abc", "type": "delete", "contents": {"old": null, "new": {"publishValue": {"title": "T"}}}}"#,
        );
        assert_eq!(
            payload.delete_snapshot().and_then(|p| p.title.as_deref()),
            Some("T")
        );
    }

    #[test]
    fn test_with_id_fills_missing_identifier() {
        let post = Post {
            title: Some("t".to_string()),
            ..Default::default()
        };
        assert_eq!(with_id(Some(&post), Some("abc")).unwrap().id, "abc");

        let post = Post::new("own", "t");
        assert_eq!(with_id(Some(&post), Some("abc")).unwrap().id, "own");
        assert!(with_id(None, Some("abc")).is_none());
    }
}
