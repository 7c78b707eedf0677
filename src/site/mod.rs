//! Lifecycle of a site resource.
//!
//! A site is a bucket kept in sync with the contents of an archive. The
//! operations here line up with what a declarative provisioning tool asks of
//! a resource: diff, create, read, update, delete and import. The previous
//! state is always handed in by the caller and the new state handed back.

use crate::archive::{extract_archive, Extraction, ExtractionError};
use crate::config::SyncConfig;
use crate::reconciliation::{
    build_reconciliation_plan, delete_all_objects, execute_reconciliation, ExecuteError,
    ReconciliationPlan, ReconciliationResult,
};
use crate::state::{encode_key, filter_state, SiteState, StateMap};
use crate::store::{RemoteStore, StoreError};
use crate::utils::{clean_etag, compute_file_fingerprint, now_iso, HashError};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("Extraction error: {0}")]
    ExtractionError(#[from] ExtractionError),

    #[error("Hash error: {0}")]
    HashError(#[from] HashError),

    #[error("Store error: {0}")]
    StoreError(#[from] StoreError),

    #[error("Apply error: {0}")]
    ExecuteError(#[from] ExecuteError),
}

/// User-facing attributes of a site resource
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SiteConfig {
    pub bucket: String,
    /// Location of the archive to deploy
    pub path: PathBuf,
    /// Substring of keys to leave out; empty keeps everything
    pub exclude: String,
}

impl SiteConfig {
    pub fn new(bucket: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            bucket: bucket.into(),
            path: path.into(),
            exclude: String::new(),
        }
    }

    pub fn with_exclude(mut self, exclude: impl Into<String>) -> Self {
        self.exclude = exclude.into();
        self
    }

    fn new_state(&self) -> SiteState {
        SiteState::new(
            self.bucket.clone(),
            self.path.to_string_lossy(),
            self.exclude.clone(),
        )
    }
}

/// Extracted archive plus the state map computed from it
#[derive(Debug)]
pub struct DesiredSite {
    pub extraction: Extraction,
    pub files: StateMap,
}

/// Outcome of create or update
#[derive(Debug, Clone)]
pub struct SiteApply {
    pub state: SiteState,
    pub result: ReconciliationResult,
}

/// Reconciles sites against a [`RemoteStore`]
pub struct Site {
    store: Arc<dyn RemoteStore>,
    config: SyncConfig,
}

impl Site {
    pub fn new(store: Arc<dyn RemoteStore>, config: SyncConfig) -> Self {
        Self { store, config }
    }

    /// Extract and fingerprint the archive, leaving out excluded keys
    pub async fn desired_state(&self, site: &SiteConfig) -> Result<DesiredSite, SiteError> {
        let extraction = extract_archive(&site.path, &self.config.staging_root).await?;

        let mut files = StateMap::new();
        for entry in &extraction.entries {
            let fingerprint = compute_file_fingerprint(&entry.full_path).await?;
            files.insert(encode_key(&entry.relative_path), fingerprint);
        }

        let files = filter_state(files, &site.exclude);
        Ok(DesiredSite { extraction, files })
    }

    /// The `files` attribute the site should end up with
    pub async fn diff(&self, site: &SiteConfig) -> Result<StateMap, SiteError> {
        Ok(self.desired_state(site).await?.files)
    }

    /// What an apply would do, without touching the store
    pub async fn plan(
        &self,
        site: &SiteConfig,
        previous: &StateMap,
    ) -> Result<ReconciliationPlan, SiteError> {
        let desired = self.diff(site).await?;
        Ok(build_reconciliation_plan(previous, &desired))
    }

    /// Upload the whole archive into a bucket with no recorded state
    pub async fn create(&self, site: &SiteConfig) -> Result<SiteApply, SiteError> {
        info!(bucket = %site.bucket, path = %site.path.display(), "Creating site");
        let mut state = site.new_state();
        let result = self.apply(site, &StateMap::new(), &mut state).await?;
        Ok(SiteApply { state, result })
    }

    /// Refresh the recorded state from the bucket listing.
    ///
    /// A bucket that no longer exists yields an empty state with no id.
    pub async fn read(&self, mut state: SiteState) -> Result<SiteState, SiteError> {
        info!(bucket = %state.bucket, "Reading bucket");

        match self.store.list(&state.bucket).await {
            Ok(objects) => {
                state.id = Some(state.bucket.clone());
                state.files = objects
                    .into_iter()
                    .map(|object| (encode_key(&object.key), clean_etag(&object.etag)))
                    .collect();
            }
            Err(StoreError::NotFound(bucket)) => {
                warn!(bucket = %bucket, "Bucket no longer exists, clearing site");
                state.id = None;
                state.files.clear();
            }
            Err(e) => return Err(e.into()),
        }

        state.updated_at = now_iso();
        Ok(state)
    }

    /// Converge the bucket from `previous` to the archive in `site`
    pub async fn update(
        &self,
        site: &SiteConfig,
        previous: &SiteState,
    ) -> Result<SiteApply, SiteError> {
        info!(bucket = %site.bucket, path = %site.path.display(), "Updating site");
        let mut state = site.new_state();
        let result = self.apply(site, &previous.files, &mut state).await?;
        Ok(SiteApply { state, result })
    }

    /// Remove every object from the site's bucket
    pub async fn delete(&self, state: &SiteState) -> Result<Vec<String>, SiteError> {
        info!(bucket = %state.bucket, "Deleting site");
        Ok(delete_all_objects(self.store.as_ref(), &state.bucket, self.config.workers()).await?)
    }

    /// Adopt an existing bucket as a site
    pub async fn import(&self, bucket: &str) -> Result<SiteState, SiteError> {
        let mut state = SiteState::new(bucket, "", "");
        state.id = Some(bucket.to_string());
        self.read(state).await
    }

    async fn apply(
        &self,
        site: &SiteConfig,
        previous: &StateMap,
        state: &mut SiteState,
    ) -> Result<ReconciliationResult, SiteError> {
        let desired = self.desired_state(site).await?;
        let plan = build_reconciliation_plan(previous, &desired.files);

        let result = execute_reconciliation(
            self.store.as_ref(),
            &site.bucket,
            &plan,
            &desired.extraction,
            self.config.workers(),
        )
        .await?;

        state.id = Some(site.bucket.clone());
        state.files = desired.files;
        state.updated_at = now_iso();
        Ok(result)
    }
}
