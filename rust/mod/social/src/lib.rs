//! Social module — users, the follow graph, image posts, and likes.
//!
//! # Resources
//!
//! - **User** — identity with username/password login
//! - **Profile** — per-user follow edge-set (user-follows-user)
//! - **Post** — one image with a caption, addressed by reference token,
//!   carrying a liked-by edge-set (user-likes-post)
//! - **Session** — JWT issuance record
//!
//! Both edge-sets share one integrity rule, enforced before any edge is
//! committed: a user can neither follow themselves nor like their own
//! post.
//!
//! # Usage
//!
//! ```ignore
//! use social::{SocialModule, service::SocialConfig};
//!
//! let module = SocialModule::new(sql, blob, SocialConfig::default())?;
//! let router = module.routes();
//! ```

pub mod api;
pub mod model;
pub mod service;

use std::sync::Arc;

use axum::Router;

use picstream_core::Module;

use crate::service::{SocialConfig, SocialService};

/// Social module implementing the Module trait.
///
/// Holds the SocialService and provides HTTP routes for all endpoints.
pub struct SocialModule {
    service: Arc<SocialService>,
}

impl SocialModule {
    /// Create a new SocialModule.
    pub fn new(
        sql: Arc<dyn picstream_sql::SQLStore>,
        blob: Arc<dyn picstream_blob::BlobStore>,
        config: SocialConfig,
    ) -> Result<Self, picstream_core::ServiceError> {
        let service = SocialService::new(sql, blob, config)
            .map_err(picstream_core::ServiceError::from)?;
        Ok(Self { service })
    }

    /// Get a reference to the underlying SocialService.
    pub fn service(&self) -> &Arc<SocialService> {
        &self.service
    }
}

impl Module for SocialModule {
    fn name(&self) -> &str {
        "social"
    }

    fn routes(&self) -> Router {
        api::build_router(self.service.clone())
    }
}
