//! ldiview loads layered depth images and drives head-tracked parallax viewing.
//!
//! A layered depth image (LDI) ships as a single file: an ordinary JPEG followed by a
//! trailing field directory. The directory carries a JSON scene description plus the
//! blobs it references (per-layer albedo, disparity, and occupancy mask images).
//!
//! # Pipeline overview
//!
//! 1. **Decode**: `bytes -> Container` (field directory located from the file trailer)
//! 2. **Resolve**: `Container -> LdiDocument` (scene JSON validated, blob ids bound to fields)
//! 3. **Prepare**: `LdiDocument -> RenderReadyView` (every blob decoded in parallel, masks
//!    packed into albedo alpha)
//! 4. **Synthesize**: `ViewGeometry + viewer position -> SynthesisParams`, once per frame,
//!    with the viewer position low-pass filtered by [`ViewpointSmoother`]
//!
//! [`ViewerSession`] ties the stages together for an interactive viewer: loads may race,
//! the newest one wins, and a failed load never disturbs the asset already on screen.
//!
//! Rendering itself is out of scope; [`SynthesisParams`] and the prepared pixel buffers are
//! what a compositor consumes.
#![forbid(unsafe_code)]

mod assets;
mod container;
mod foundation;
mod scene;
mod session;
mod synthesis;

pub use assets::decode::{
    PreparedGray, PreparedImage, decode_luma, decode_rgba, pack_albedo_mask,
};
pub use assets::prepare::{
    PreparedLayer, RenderReadyView, build_thread_pool, prepare_view, prepare_view_cancellable,
};
pub use container::decode::{
    Container, END_MARKER, Field, SCENE_FIELD_CURRENT, SCENE_FIELD_LEGACY, decode_container,
};
pub use foundation::core::{ImageDims, Position3D, Size, Vec2};
pub use foundation::error::{FormatError, LdiError, LdiResult};
pub use scene::document::{
    BlobRef, CameraData, DisparityRef, ImageSource, Layer, LdiDocument, View,
};
pub use scene::resolve::resolve_scene;
pub use scene::schema::SOURCE_IMAGE_BLOB_ID;
pub use session::viewer_session::{LoadOutcome, LoadedAsset, SessionOpts, ViewerSession};
pub use synthesis::config::{
    DEFAULT_EYE_SEPARATION_MM, DEFAULT_REST_DISTANCE_MM, MOBILE_REST_DISTANCE_FACTOR,
    SmoothingConfig, SynthesisConfig,
};
pub use synthesis::params::{
    DEFAULT_FOCAL_RATIO_TO_WIDTH, LayerParams, LayerVec, SynthesisParams, ViewGeometry,
    compute_params,
};
pub use synthesis::smoother::ViewpointSmoother;

#[cfg(test)]
#[path = "../tests/support/fixture.rs"]
mod test_fixture;
