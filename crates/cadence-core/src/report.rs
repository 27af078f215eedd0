//! Report collaborator seam — shared between the scheduler and whatever
//! actually produces and delivers report content.
//!
//! The scheduler only decides *when* to fire and records each attempt; the
//! generation and delivery of content lives behind these traits.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

/// A generated report, ready for delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Owner the report was generated for.
    pub owner_id: Uuid,
    /// Short subject line (e.g. "Weekly finance digest").
    pub subject: String,
    /// Rendered report body.
    pub body: String,
    pub generated_at: DateTime<Utc>,
}

/// Delivery options derived from a schedule's contact fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DispatchOptions {
    pub send_email: bool,
    pub email_address: Option<String>,
    pub send_whatsapp: bool,
    pub phone_number: Option<String>,
    /// Which agent persona the report is delivered as.
    pub agent_alias: String,
}

/// Produces report content for an owner.
///
/// Implementations must be `Send + Sync` so the scheduler can hold them
/// behind an `Arc` and call them from the poll loop.
#[async_trait]
pub trait ReportGenerator: Send + Sync {
    async fn generate(&self, owner_id: Uuid) -> Result<ReportSummary, CoreError>;
}

/// Delivers a generated report over the channels named in `opts`.
#[async_trait]
pub trait ReportDispatcher: Send + Sync {
    async fn dispatch(&self, summary: &ReportSummary, opts: &DispatchOptions)
        -> Result<(), CoreError>;
}

/// The report pipeline as an injected capability.
///
/// `Absent` makes the "no dispatcher configured" fast-fail path a normal
/// match arm instead of an optional-collaborator nil check.
#[derive(Clone)]
pub enum Reporting {
    Configured {
        generator: Arc<dyn ReportGenerator>,
        dispatcher: Arc<dyn ReportDispatcher>,
    },
    Absent,
}

impl Reporting {
    pub fn configured(
        generator: Arc<dyn ReportGenerator>,
        dispatcher: Arc<dyn ReportDispatcher>,
    ) -> Self {
        Self::Configured {
            generator,
            dispatcher,
        }
    }
}
