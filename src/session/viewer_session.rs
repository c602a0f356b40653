use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::{
    assets::prepare::{RenderReadyView, build_thread_pool, prepare_view_cancellable},
    container::decode::Container,
    foundation::core::{Position3D, Size},
    foundation::error::{LdiError, LdiResult},
    scene::document::LdiDocument,
    scene::resolve::resolve_scene,
    synthesis::config::{SmoothingConfig, SynthesisConfig},
    synthesis::params::{SynthesisParams, compute_params},
    synthesis::smoother::ViewpointSmoother,
};

/// Options controlling a [`ViewerSession`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SessionOpts {
    /// Viewpoint low-pass coefficients.
    pub smoothing: SmoothingConfig,
    /// Device constants for the parameter computer.
    pub synthesis: SynthesisConfig,
    /// Which view of a loaded document to prepare and synthesize from.
    pub view_index: usize,
    /// Override the number of rayon decode threads. `None` uses rayon defaults.
    pub decode_threads: Option<usize>,
    /// Use the closer mobile rest distance.
    pub is_mobile: bool,
}

impl Default for SessionOpts {
    fn default() -> Self {
        Self {
            smoothing: SmoothingConfig::default(),
            synthesis: SynthesisConfig::default(),
            view_index: 0,
            decode_threads: None,
            is_mobile: false,
        }
    }
}

impl SessionOpts {
    pub fn validate(&self) -> LdiResult<()> {
        self.smoothing.validate()?;
        self.synthesis.validate()?;
        if let Some(n) = self.decode_threads
            && n == 0
        {
            return Err(LdiError::validation("decode_threads must be >= 1 when set"));
        }
        Ok(())
    }

    /// Viewer position the smoother reports before tracking starts.
    pub fn rest_position(&self) -> Position3D {
        Position3D::new(0.0, 0.0, self.synthesis.rest_distance(self.is_mobile))
    }
}

/// Everything kept for one loaded asset. Immutable once installed.
#[derive(Debug)]
pub struct LoadedAsset {
    generation: u64,
    container: Container,
    document: LdiDocument,
    view: RenderReadyView,
}

impl LoadedAsset {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn document(&self) -> &LdiDocument {
        &self.document
    }

    pub fn view(&self) -> &RenderReadyView {
        &self.view
    }
}

/// Result of [`ViewerSession::load`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The asset is now current.
    Installed {
        /// Load ticket of the installed asset.
        generation: u64,
    },
    /// A newer load started before this one finished; its result was dropped.
    Superseded {
        /// Load ticket of the dropped asset.
        generation: u64,
    },
}

/// Owns the current asset and the viewpoint filter for one viewing session.
///
/// Loads and viewpoint samples may arrive from different threads than the per-frame
/// [`frame_params`](Self::frame_params) caller. The asset is swapped as a whole behind an
/// `Arc`, so readers see either the old or the new asset, never a mix. Every load takes a
/// ticket; only the holder of the newest ticket may install its result.
pub struct ViewerSession {
    opts: SessionOpts,
    pool: rayon::ThreadPool,
    generation: AtomicU64,
    current: RwLock<Option<Arc<LoadedAsset>>>,
    viewpoint: Mutex<ViewpointSmoother>,
}

impl ViewerSession {
    pub fn new(opts: SessionOpts) -> LdiResult<Self> {
        opts.validate()?;
        let pool = build_thread_pool(opts.decode_threads)?;
        let smoother = ViewpointSmoother::new(opts.smoothing, opts.rest_position());
        Ok(Self {
            opts,
            pool,
            generation: AtomicU64::new(0),
            current: RwLock::new(None),
            viewpoint: Mutex::new(smoother),
        })
    }

    pub fn opts(&self) -> &SessionOpts {
        &self.opts
    }

    /// Decode, resolve and prepare `bytes`, then make it the current asset.
    ///
    /// Any failure leaves the previously current asset in place.
    pub fn load(&self, bytes: impl Into<Arc<[u8]>>) -> LdiResult<LoadOutcome> {
        let generation = self.next_ticket();
        self.load_with_ticket(generation, bytes.into())
    }

    fn next_ticket(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_stale(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) != generation
    }

    #[tracing::instrument(skip(self, bytes))]
    fn load_with_ticket(&self, generation: u64, bytes: Arc<[u8]>) -> LdiResult<LoadOutcome> {
        let container = Container::decode(bytes)?;
        let document = resolve_scene(&container)?;
        let view = match prepare_view_cancellable(
            &container,
            &document,
            self.opts.view_index,
            &self.pool,
            &|| self.is_stale(generation),
        ) {
            Ok(view) => view,
            Err(LdiError::Superseded) => {
                tracing::debug!(generation, "load cancelled during decode");
                return Ok(LoadOutcome::Superseded { generation });
            }
            Err(e) => return Err(e),
        };
        Ok(self.install(LoadedAsset {
            generation,
            container,
            document,
            view,
        }))
    }

    /// Make `asset` current unless a newer ticket was issued while it was being prepared.
    fn install(&self, asset: LoadedAsset) -> LoadOutcome {
        let generation = asset.generation;
        let mut slot = self.current.write().unwrap_or_else(PoisonError::into_inner);
        if self.is_stale(generation) {
            tracing::debug!(generation, "dropping superseded load");
            return LoadOutcome::Superseded { generation };
        }
        *slot = Some(Arc::new(asset));
        tracing::debug!(generation, "installed asset");
        LoadOutcome::Installed { generation }
    }

    /// The current asset, if any.
    pub fn current(&self) -> Option<Arc<LoadedAsset>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drop the current asset and invalidate loads still in flight.
    pub fn clear(&self) {
        self.next_ticket();
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Feed one raw viewpoint sample; returns the new smoothed position.
    pub fn push_viewpoint(&self, raw: Position3D) -> Position3D {
        self.viewpoint
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .observe(raw)
    }

    /// Latest smoothed viewpoint, or the rest position before tracking starts.
    pub fn viewpoint(&self) -> Position3D {
        self.viewpoint
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .current()
    }

    /// Forget the filter state, e.g. when the tracker reacquires a face.
    pub fn restart_tracking(&self) {
        self.viewpoint
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .reset();
    }

    /// Synthesis parameters for the current asset and viewpoint; `None` when nothing is loaded.
    pub fn frame_params(&self, output: Size) -> Option<SynthesisParams> {
        let asset = self.current()?;
        Some(compute_params(
            &asset.view.geometry,
            self.viewpoint(),
            output,
            self.opts.is_mobile,
            &self.opts.synthesis,
        ))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/viewer_session.rs"]
mod tests;
