//! Shallow repository retrieval via libgit2

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use git2::{FetchOptions, RemoteCallbacks, build::RepoBuilder, opts};
use tracing::{debug, info};

use crate::config::GitConfig;
use crate::domain::{FetchError, RepositoryFetcher};

/// Clones repositories at depth 1 into a caller-provided destination.
#[derive(Debug, Clone)]
pub struct GitFetcher {
    fetch_timeout: Duration,
}

impl GitFetcher {
    /// Create a fetcher with the configured network timeout.
    pub fn new(config: &GitConfig) -> Self {
        Self {
            fetch_timeout: config.fetch_timeout(),
        }
    }

    fn perform_clone(destination: &Path, repository_url: &str) -> Result<(), FetchError> {
        let callbacks = RemoteCallbacks::new();

        let mut fetch_options = FetchOptions::new();
        fetch_options.remote_callbacks(callbacks);
        fetch_options.download_tags(git2::AutotagOption::None);
        fetch_options.update_fetchhead(true);
        fetch_options.proxy_options(git2::ProxyOptions::new());
        fetch_options.depth(1);

        let mut builder = RepoBuilder::new();
        builder.fetch_options(fetch_options);
        builder
            .clone(repository_url, destination)
            .map_err(|e| FetchError::Clone(e.to_string()))?;

        Ok(())
    }

    fn configure_git_timeouts(fetch_timeout: Duration) -> Result<(), FetchError> {
        let timeout_ms = fetch_timeout.as_millis().clamp(1, i32::MAX as u128) as i32;
        unsafe {
            opts::set_server_connect_timeout_in_milliseconds(timeout_ms)
                .map_err(|e| FetchError::Clone(e.to_string()))?;
            opts::set_server_timeout_in_milliseconds(timeout_ms)
                .map_err(|e| FetchError::Clone(e.to_string()))?;
        }
        Ok(())
    }
}

#[async_trait]
impl RepositoryFetcher for GitFetcher {
    async fn fetch(&self, repository_url: &str, destination: &Path) -> Result<(), FetchError> {
        if !repository_url.starts_with("https://") && !repository_url.starts_with("http://") {
            return Err(FetchError::UnsupportedScheme(repository_url.to_string()));
        }

        let repo_url = repository_url.to_string();
        let dest = destination.to_path_buf();

        info!(repository = %repo_url, "Starting shallow clone");

        Self::configure_git_timeouts(self.fetch_timeout)?;

        tokio::task::spawn_blocking(move || Self::perform_clone(dest.as_path(), &repo_url))
            .await
            .map_err(|e| FetchError::Clone(format!("Clone task failed: {e}")))??;

        debug!(repository = %repository_url, path = %destination.display(), "Shallow clone completed");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetcher() -> GitFetcher {
        GitFetcher::new(&GitConfig::default())
    }

    #[tokio::test]
    async fn test_rejects_non_http_schemes() {
        let dest = tempfile::tempdir().expect("dest dir");

        for url in [
            "git@github.com:acme/widget.git",
            "ssh://git@github.com/acme/widget.git",
            "file:///srv/repos/widget.git",
        ] {
            let err = fetcher()
                .fetch(url, dest.path())
                .await
                .expect_err("non-http scheme should be rejected");
            assert!(
                matches!(err, FetchError::UnsupportedScheme(_)),
                "unexpected error for {url}: {err}"
            );
        }
    }

    #[tokio::test]
    async fn test_unreachable_remote_surfaces_clone_error() {
        // Loopback port 1 refuses connections immediately; no network needed.
        let dest = tempfile::tempdir().expect("dest dir");

        let err = fetcher()
            .fetch("http://127.0.0.1:1/missing.git", dest.path())
            .await
            .expect_err("clone should fail");
        assert!(matches!(err, FetchError::Clone(_)), "unexpected error: {err}");
    }
}
