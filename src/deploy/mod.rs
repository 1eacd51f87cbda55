//! Deploy hook trigger

/// Fire-and-forget redeploy notification
#[derive(Debug, Clone)]
pub struct DeployHook {
    http: reqwest::Client,
    url: Option<String>,
}

impl DeployHook {
    pub fn new(http: reqwest::Client, url: Option<String>) -> Self {
        let url = url.filter(|u| !u.trim().is_empty());
        Self { http, url }
    }

    /// POST to the hook. Returns whether the hook accepted the request;
    /// failures are logged and never propagated.
    pub async fn trigger(&self) -> bool {
        let Some(url) = &self.url else {
            return false;
        };

        match self.http.post(url).send().await {
            Ok(resp) if resp.status().is_success() => {
                tracing::info!("Triggered redeploy via deploy hook");
                true
            }
            Ok(resp) => {
                tracing::warn!("Deploy hook returned {}", resp.status());
                false
            }
            Err(e) => {
                tracing::warn!("Failed to trigger redeploy: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_is_noop() {
        let hook = DeployHook::new(reqwest::Client::new(), None);
        assert!(hook.url.is_none());
        assert!(!hook.trigger().await);

        let blank = DeployHook::new(reqwest::Client::new(), Some("  ".to_string()));
        assert!(blank.url.is_none());
        assert!(!blank.trigger().await);
    }

    #[tokio::test]
    async fn test_unreachable_hook_is_swallowed() {
        let hook = DeployHook::new(
            reqwest::Client::new(),
            Some("http://127.0.0.1:9/hook".to_string()),
        );
        assert!(!hook.trigger().await);
    }
}
