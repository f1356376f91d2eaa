//! Export pipeline
//!
//! Locates the rendered code block in a document, rasterizes it, encodes the
//! bitmap as a PNG data URI and drives a one-shot download. Failures are
//! reported through the `log` facade and never propagate to the caller of
//! [`ExportPipeline::export`]: at worst nothing is downloaded.
//!
//! Only one export runs at a time. While one is pending, further exports
//! return [`ExportOutcome::Busy`] without doing any work.

pub mod data_uri;
pub mod download;

pub use data_uri::DataUri;
pub use download::{DirectorySink, DocumentBody, DownloadSink, DownloadTrigger, MemorySink};

use crate::rendering::{RasterOptions, Rasterizer};
use crate::{Error, Result};
use log::{debug, error, info};
use scraper::{Html, Selector};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// What a single export invocation ended with
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// The image was handed to the download sink under this name
    Downloaded { filename: String },
    /// No element matched the target selector
    NoTarget,
    /// Rasterization, encoding or delivery failed; see the log
    Failed,
    /// Another export was still pending
    Busy,
}

pub struct ExportPipeline {
    selector: String,
    options: RasterOptions,
    rasterizer: Box<dyn Rasterizer>,
    sink: Arc<dyn DownloadSink>,
    body: DocumentBody,
    pending: Arc<AtomicBool>,
}

// Clears the pending flag when the export that set it finishes
struct PendingGuard(Arc<AtomicBool>);

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ExportPipeline {
    /// Build a pipeline targeting the first element matching `selector`.
    pub fn new(
        selector: &str,
        options: RasterOptions,
        rasterizer: Box<dyn Rasterizer>,
        sink: Arc<dyn DownloadSink>,
    ) -> Result<Self> {
        parse_selector(selector)?;
        Ok(ExportPipeline {
            selector: selector.to_string(),
            options,
            rasterizer,
            sink,
            body: DocumentBody::new(),
            pending: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn options(&self) -> &RasterOptions {
        &self.options
    }

    pub fn body(&self) -> &DocumentBody {
        &self.body
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Rasterize the target element of `doc` into a PNG data URI.
    ///
    /// Returns `Ok(None)` when the document has no such element.
    pub fn capture(&self, doc: &Html) -> Result<Option<DataUri>> {
        let sel = parse_selector(&self.selector)?;
        let node = match doc.select(&sel).next() {
            Some(node) => node,
            None => return Ok(None),
        };
        let shot = self.rasterizer.rasterize(node, &self.options)?;
        debug!("Captured {} as {}x{}", self.selector, shot.width, shot.height);
        DataUri::from_screenshot(&shot).map(Some)
    }

    /// Click a timestamp-named trigger for `uri`; returns the suggested name.
    pub fn download(&self, uri: &DataUri) -> Result<String> {
        let trigger = DownloadTrigger::timestamped(uri.clone());
        self.body.click(&trigger, self.sink.as_ref())?;
        Ok(trigger.download)
    }

    /// Capture then download, logging any failure.
    pub fn export(&self, doc: &Html) -> ExportOutcome {
        match self.begin() {
            Some(_guard) => self.run(doc),
            None => ExportOutcome::Busy,
        }
    }

    /// Parse a full HTML document and export it.
    pub fn export_html(&self, html: &str) -> ExportOutcome {
        match self.begin() {
            Some(_guard) => self.run(&Html::parse_document(html)),
            None => ExportOutcome::Busy,
        }
    }

    /// Export on tokio's blocking pool. The pipeline counts as pending from
    /// this call until the blocking task finishes.
    pub async fn export_async(self: Arc<Self>, html: String) -> ExportOutcome {
        let guard = match self.begin() {
            Some(guard) => guard,
            None => return ExportOutcome::Busy,
        };
        let task = tokio::task::spawn_blocking(move || {
            let _guard = guard;
            self.run(&Html::parse_document(&html))
        });
        match task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Export task failed: {}", e);
                ExportOutcome::Failed
            }
        }
    }

    fn begin(&self) -> Option<PendingGuard> {
        self.pending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| PendingGuard(Arc::clone(&self.pending)))
    }

    fn run(&self, doc: &Html) -> ExportOutcome {
        let uri = match self.capture(doc) {
            Ok(Some(uri)) => uri,
            Ok(None) => {
                debug!("Nothing matches {}, skipping export", self.selector);
                return ExportOutcome::NoTarget;
            }
            Err(e) => {
                error!("Snapshot failed: {}", e);
                return ExportOutcome::Failed;
            }
        };
        match self.download(&uri) {
            Ok(filename) => {
                info!("Exported snapshot {}", filename);
                ExportOutcome::Downloaded { filename }
            }
            Err(e) => {
                error!("Download failed: {}", e);
                ExportOutcome::Failed
            }
        }
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|e| Error::ConfigError(format!("invalid selector {:?}: {:?}", selector, e)))
}
