//! Client-side download triggers and the sinks that receive them

use super::data_uri::DataUri;
use crate::{Error, Result};
use log::debug;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

/// A one-shot, invisible anchor pointing at exported data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTrigger {
    pub href: DataUri,
    /// Suggested file name, without extension
    pub download: String,
}

impl DownloadTrigger {
    /// A trigger whose suggested name is the current time in milliseconds since the epoch.
    pub fn timestamped(href: DataUri) -> Self {
        let download = chrono::Utc::now().timestamp_millis().to_string();
        DownloadTrigger { href, download }
    }
}

/// Receives the payload of a clicked trigger
pub trait DownloadSink: Send + Sync {
    fn deliver(&self, trigger: &DownloadTrigger) -> Result<()>;
}

/// Writes downloads into a directory as `<name>.<ext>`
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        DirectorySink { dir: dir.into() }
    }

    pub fn path_for(&self, trigger: &DownloadTrigger) -> Result<PathBuf> {
        let ext = match trigger.href.mime()? {
            "image/png" => "png",
            "image/jpeg" => "jpg",
            _ => "bin",
        };
        Ok(self.dir.join(format!("{}.{}", trigger.download, ext)))
    }
}

impl DownloadSink for DirectorySink {
    fn deliver(&self, trigger: &DownloadTrigger) -> Result<()> {
        let bytes = trigger.href.decode()?;
        let path = self.path_for(trigger)?;
        fs::create_dir_all(&self.dir)?;
        // Written beside the target and renamed, so a failed write never leaves a partial image
        let tmp = path.with_extension(format!(
            "{}.tmp",
            path.extension().and_then(|e| e.to_str()).unwrap_or_default()
        ));
        if let Err(e) = fs::write(&tmp, &bytes).and_then(|_| fs::rename(&tmp, &path)) {
            let _ = fs::remove_file(&tmp);
            return Err(Error::ExportError(format!("cannot write {}: {}", path.display(), e)));
        }
        debug!("Saved {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Records deliveries in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    deliveries: Mutex<Vec<Delivery>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.lock().unwrap().clone()
    }
}

impl DownloadSink for MemorySink {
    fn deliver(&self, trigger: &DownloadTrigger) -> Result<()> {
        let bytes = trigger.href.decode()?;
        self.deliveries.lock().unwrap().push(Delivery { filename: trigger.download.clone(), bytes });
        Ok(())
    }
}

/// Where triggers live while they are being clicked
#[derive(Debug, Default)]
pub struct DocumentBody {
    attached: Mutex<Vec<String>>,
}

impl DocumentBody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of the triggers currently attached.
    pub fn attached(&self) -> Vec<String> {
        self.attached.lock().unwrap().clone()
    }

    /// Attach `trigger`, click it into `sink`, and detach it again whatever
    /// the sink returned.
    pub fn click(&self, trigger: &DownloadTrigger, sink: &dyn DownloadSink) -> Result<()> {
        self.attached.lock().unwrap().push(trigger.download.clone());
        let res = sink.deliver(trigger);
        let mut attached = self.attached.lock().unwrap();
        if let Some(pos) = attached.iter().position(|n| *n == trigger.download) {
            attached.remove(pos);
        }
        res
    }
}
