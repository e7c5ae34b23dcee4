//! Video lifecycle events.

use pulse_bus::DomainEvent;
use serde::{Deserialize, Serialize};

/// A video became available on the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoAdded {
    pub video_id: String,
    pub title: String,
}

impl DomainEvent for VideoAdded {
    const EVENT_TYPE: &'static str = "video-added";
}

/// A video's analysis should be attempted again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryVideoAnalysisRequested {
    pub video_id: String,
    pub video_url: String,
    /// BCP 47 language tag of the spoken language, when known.
    pub language: Option<String>,
}

impl DomainEvent for RetryVideoAnalysisRequested {
    const EVENT_TYPE: &'static str = "retry-video-analysis-requested";
}

/// A download bundle was requested for a set of videos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideosInclusionInDownloadRequested {
    pub video_ids: Vec<String>,
}

impl DomainEvent for VideosInclusionInDownloadRequested {
    const EVENT_TYPE: &'static str = "videos-inclusion-in-download-requested";
}
