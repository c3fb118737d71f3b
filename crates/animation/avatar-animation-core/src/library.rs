//! Asynchronous clip loading with per-name deduplication.
//!
//! Loads run off the frame path: [`ClipLibrary::request`] hands back a shared
//! future, and concurrent requests for the same name get clones of the same
//! one. Nothing touches engine state until [`ClipLibrary::install_completed`]
//! runs on the update path and moves finished clips into the cache.
//!
//! The library never polls a load itself. Whoever requested it drives the
//! future on their executor; a load whose every handle was dropped before it
//! finished is forgotten, and the next request for that name starts over.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::{self, BoxFuture, FutureExt, Shared};
use hashbrown::HashMap;
use log::{debug, warn};

use crate::clip::AnimationClip;
use crate::error::{ClipError, LoadError};
use crate::retarget::{retarget_clip, RetargetMap};
use crate::skeleton::NodeNameTable;

/// Where clip documents come from (disk, network, an asset bundle...).
#[async_trait]
pub trait ClipSource: Send + Sync {
    /// Fetch and parse the clip at `path`.
    async fn load_clip(&self, path: &str) -> Result<AnimationClip, LoadError>;
}

/// Reads clip JSON from a directory. Loads must be driven inside a Tokio
/// runtime.
#[derive(Clone, Debug)]
pub struct FsClipSource {
    root: PathBuf,
}

impl FsClipSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ClipSource for FsClipSource {
    async fn load_clip(&self, path: &str) -> Result<AnimationClip, LoadError> {
        let full = self.root.join(path);
        let text = tokio::fs::read_to_string(&full).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => LoadError::NotFound(path.to_string()),
            _ => LoadError::Io {
                path: path.to_string(),
                message: e.to_string(),
            },
        })?;
        AnimationClip::from_json(&text).map_err(|source| LoadError::Malformed {
            path: path.to_string(),
            source,
        })
    }
}

pub type ClipResult = Result<Arc<AnimationClip>, LoadError>;
pub type ClipFuture = Shared<BoxFuture<'static, ClipResult>>;

pub struct ClipLibrary {
    source: Option<Arc<dyn ClipSource>>,
    map: &'static RetargetMap,
    root: String,
    extension: String,
    clips: HashMap<String, Arc<AnimationClip>>,
    in_flight: HashMap<String, ClipFuture>,
}

impl ClipLibrary {
    pub fn new(root: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            source: None,
            map: RetargetMap::mixamo(),
            root: root.into(),
            extension: extension.into(),
            clips: HashMap::new(),
            in_flight: HashMap::new(),
        }
    }

    pub fn set_source(&mut self, source: Arc<dyn ClipSource>) {
        self.source = Some(source);
    }

    /// Source-rig naming used when retargeting; Mixamo by default.
    pub fn set_retarget_map(&mut self, map: &'static RetargetMap) {
        self.map = map;
    }

    /// Path of a named clip relative to the source root.
    pub fn path_for(&self, name: &str) -> String {
        let file = if self.extension.is_empty() {
            name.to_string()
        } else {
            format!("{name}.{}", self.extension)
        };
        if self.root.is_empty() {
            file
        } else {
            format!("{}/{file}", self.root.trim_end_matches('/'))
        }
    }

    /// Future resolving to the clip `name`, retargeted through `nodes`.
    ///
    /// Installed clips resolve immediately; a load already in flight is
    /// shared instead of started again. Failures are not retried: the next
    /// request after a failed load has been collected starts a fresh one.
    pub fn request(&mut self, name: &str, nodes: NodeNameTable) -> ClipFuture {
        if let Some(clip) = self.clips.get(name) {
            return future::ready(Ok(Arc::clone(clip))).boxed().shared();
        }
        if let Some(pending) = self.in_flight.get(name) {
            debug!("clips: '{name}' already loading; sharing request");
            return pending.clone();
        }
        let Some(source) = self.source.clone() else {
            return future::ready(Err(LoadError::NoSource)).boxed().shared();
        };

        let path = self.path_for(name);
        let map = self.map;
        let fut = async move {
            let clip = source.load_clip(&path).await?;
            if clip.tracks.is_empty() {
                return Err(LoadError::Empty(path));
            }
            if let Err(err) = clip.validate() {
                return Err(LoadError::Malformed { path, source: err });
            }
            Ok(Arc::new(retarget_clip(&clip, map, &nodes)))
        }
        .boxed()
        .shared();

        self.in_flight.insert(name.to_string(), fut.clone());
        fut
    }

    /// Move finished loads into the cache and forget abandoned ones. Returns
    /// the names installed.
    pub fn install_completed(&mut self) -> Vec<String> {
        self.in_flight.retain(|name, f| {
            // Only our own handle is left: nobody will ever poll this load.
            let abandoned = f.peek().is_none() && f.strong_count() == Some(1);
            if abandoned {
                debug!("clips: '{name}' dropped by every requester; forgetting it");
            }
            !abandoned
        });

        let done: Vec<String> = self
            .in_flight
            .iter()
            .filter(|(_, f)| f.peek().is_some())
            .map(|(k, _)| k.clone())
            .collect();

        let mut installed = Vec::new();
        for name in done {
            let Some(fut) = self.in_flight.remove(&name) else {
                continue;
            };
            match fut.peek() {
                Some(Ok(clip)) => {
                    debug!("clips: installed '{name}' ({} tracks)", clip.tracks.len());
                    self.clips.insert(name.clone(), Arc::clone(clip));
                    installed.push(name);
                }
                Some(Err(e)) => warn!("clips: loading '{name}' failed: {e}"),
                None => {}
            }
        }
        installed
    }

    /// Install an already-loaded clip under `name`, bypassing the source.
    /// Clips with malformed tracks are refused.
    pub fn install(&mut self, name: impl Into<String>, clip: AnimationClip) -> Result<(), ClipError> {
        clip.validate()?;
        self.clips.insert(name.into(), Arc::new(clip));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<AnimationClip>> {
        self.clips.get(name).cloned()
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.clips.contains_key(name)
    }

    pub fn is_loading(&self, name: &str) -> bool {
        self.in_flight.contains_key(name)
    }

    /// Installed clip names, sorted.
    pub fn loaded_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.clips.keys().cloned().collect();
        names.sort();
        names
    }

    /// Drop every cached clip and abandon pending loads.
    pub fn clear(&mut self) {
        self.clips.clear();
        self.in_flight.clear();
    }
}
