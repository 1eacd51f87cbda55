//! Mirror one post on demand

use anyhow::Result;

use crate::mirror::{ProfileKind, SyncOutcome};
use crate::webhook::WebhookPayload;
use crate::BlogMirror;

/// Run the upsert path for `id`, exactly as an `update` webhook would
pub async fn run(app: &BlogMirror, kind: ProfileKind, id: &str) -> Result<SyncOutcome> {
    let payload = WebhookPayload::for_id(id, "update");
    let outcome = app.handle(kind, &payload, None).await?;
    Ok(outcome)
}
