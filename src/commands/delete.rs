//! Remove one post's mirrored artifact on demand

use anyhow::{bail, Result};

use crate::mirror::{ProfileKind, SyncOutcome};
use crate::webhook::WebhookPayload;
use crate::BlogMirror;

/// Run the delete path for `id`, exactly as a `delete` webhook would
pub async fn run(app: &BlogMirror, kind: ProfileKind, id: &str) -> Result<SyncOutcome> {
    if !app.profile(kind).handles_delete {
        bail!("the {} profile does not delete mirrored files", kind);
    }
    let payload = WebhookPayload::for_id(id, "delete");
    let outcome = app.handle(kind, &payload, None).await?;
    Ok(outcome)
}
