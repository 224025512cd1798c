//! The post aggregate manager.
//!
//! `PostManager` holds no locks and no per-aggregate state. Every invariant
//! that depends on a precondition (double likes, duplicate comment ids, set
//! membership on users) is enforced by a conditional store primitive, so the
//! manager can be shared freely across tasks.
//!
//! Operations are grouped by concern:
//!
//! - [`lifecycle`]: create, read, list, update and delete posts
//! - [`engagement`]: likes and comments
//! - [`search`]: the two-stage author/post pattern query
//! - [`favourites`]: users, favourites and authored post lists

mod engagement;
mod favourites;
mod lifecycle;
mod search;

use std::{future::Future, time::Duration};

use log::warn;

use crate::{
    config::ManagerSettings,
    errors::{PostError, StoreError},
    store::{IdentityStore, PostStore},
};

/// Orchestrates an identity store and a post store.
pub struct PostManager<I, P> {
    identity: I,
    posts: P,
    timeout: Option<Duration>,
}

impl<I, P> PostManager<I, P>
where
    I: IdentityStore,
    P: PostStore,
{
    /// Creates a manager with the default operation deadline.
    pub fn new(identity: I, posts: P) -> Self {
        Self::from_settings(identity, posts, &ManagerSettings::default())
    }

    pub fn from_settings(identity: I, posts: P, settings: &ManagerSettings) -> Self {
        Self {
            identity,
            posts,
            timeout: settings.operation_timeout(),
        }
    }

    /// Overrides the per-operation deadline; `None` waits indefinitely.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn identity(&self) -> &I {
        &self.identity
    }

    pub fn posts(&self) -> &P {
        &self.posts
    }

    /// Runs `operation` under the configured deadline.
    async fn within<T, F>(&self, operation: F) -> Result<T, PostError>
    where
        F: Future<Output = Result<T, PostError>>,
    {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, operation)
                .await
                .map_err(|_| PostError::Timeout)?,
            None => operation.await,
        }
    }

    /// Runs one cleanup step under its own deadline, logging instead of failing.
    async fn best_effort<T, F>(&self, step: &str, post_id: &str, operation: F) -> Option<T>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        let outcome = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, operation).await {
                Ok(result) => result,
                Err(_) => {
                    warn!("cleanup step {step} for post {post_id} timed out after {limit:?}");
                    return None;
                }
            },
            None => operation.await,
        };
        match outcome {
            Ok(value) => Some(value),
            Err(err) => {
                warn!("cleanup step {step} for post {post_id} failed: {err}");
                None
            }
        }
    }
}
