use smallvec::SmallVec;

use crate::{
    foundation::core::{ImageDims, Position3D, Size, Vec2},
    foundation::error::{LdiError, LdiResult},
    scene::document::View,
    synthesis::config::SynthesisConfig,
};

/// Focal ratio assumed for views whose scene description carries no camera data.
pub const DEFAULT_FOCAL_RATIO_TO_WIDTH: f64 = 1.0;

// Keeps the parallax denominator finite when the viewer sits on the display plane.
const MIN_PLANE_DEPTH_MM: f64 = 1e-3;

/// Inline capacity for per-layer data; typical assets carry two to four layers.
pub type LayerVec<T> = SmallVec<[T; 4]>;

#[derive(Clone, Copy, Debug, PartialEq)]
struct LayerGeometry {
    min_disparity: f64,
    max_disparity: f64,
    focal_ratio: f64,
}

/// Static geometry of one view, computed once per loaded asset.
///
/// Every layer uses the view's focal ratio scaled by the *main* image width. The scene format
/// currently carries a single focal ratio per view; a per-layer ratio, when present, replaces it
/// for that layer only.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewGeometry {
    main: ImageDims,
    layers: LayerVec<LayerGeometry>,
    outpaint_ratio: f64,
}

impl ViewGeometry {
    /// `layer_widths` are the decoded albedo widths, in layer order.
    pub fn new(view: &View, main: ImageDims, layer_widths: &[u32]) -> LdiResult<Self> {
        if main.is_empty() {
            return Err(LdiError::validation(format!(
                "main image has empty dimensions {}x{}",
                main.width, main.height
            )));
        }
        if view.layers.is_empty() {
            return Err(LdiError::validation("view has no layers"));
        }
        if layer_widths.len() != view.layers.len() {
            return Err(LdiError::validation(format!(
                "{} layer widths for {} layers",
                layer_widths.len(),
                view.layers.len()
            )));
        }

        let reference = layer_widths[0];
        if layer_widths.iter().any(|&w| w != reference) {
            tracing::warn!(
                ?layer_widths,
                reference,
                "layer widths diverge; using the first layer for the outpaint ratio"
            );
        }
        let expected = view.expected_layer_width(main.width);
        if (f64::from(reference) - expected).abs() >= 1.0 {
            tracing::debug!(
                reference,
                expected,
                "layer width differs from main width plus outpainting"
            );
        }

        let layers = view
            .layers
            .iter()
            .map(|layer| LayerGeometry {
                min_disparity: layer.min_disparity,
                max_disparity: layer.max_disparity,
                focal_ratio: view
                    .focal_ratio_for(layer)
                    .unwrap_or(DEFAULT_FOCAL_RATIO_TO_WIDTH),
            })
            .collect();

        Ok(Self {
            main,
            layers,
            outpaint_ratio: f64::from(reference) / f64::from(main.width),
        })
    }

    pub fn main_dims(&self) -> ImageDims {
        self.main
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn outpaint_ratio(&self) -> f64 {
        self.outpaint_ratio
    }
}

/// Per-layer camera parameters for the compositor.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct LayerParams {
    pub focal_px: f64,
    pub inv_depth_min: f64,
    pub inv_depth_max: f64,
}

/// Everything the renderer needs for one frame besides the pixel data.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct SynthesisParams {
    pub layers: LayerVec<LayerParams>,
    pub layer_count: usize,
    pub outpaint_ratio: f64,
    pub viewport_scale: f64,
    /// Reference plane distance for this device class.
    pub rest_distance: f64,
    /// Virtual camera offset from the rest position (z positive toward the scene).
    pub camera_offset: Position3D,
    pub parallax_shift: Vec2,
    pub synthetic_focal_px: f64,
    pub output: Size,
    pub eye_separation_mm: f64,
}

/// Derive the frame's synthesis parameters.
///
/// `viewer` is the smoothed viewer position in the display frame, z being the distance to the
/// display. It is turned into a camera offset `c = (x, y, plane - z)` relative to the rest
/// position on the reference plane, then
///
/// ```text
/// focal_px[i]        = focal_ratio * main.width
/// inv_depth_min[i]   = -min_disparity[i] / focal_px[i]
/// inv_depth_max[i]   = -max_disparity[i] / focal_px[i]
/// viewport_scale     = min(out.w, out.h) / min(main.w, main.h)
/// parallax_shift     = -c.xy / |plane - c.z|
/// synthetic_focal_px = focal_px[0] * viewport_scale * |1 - c.z / plane|
/// ```
///
/// Pure and O(layers); never fails for a geometry built by [`ViewGeometry::new`] and a
/// validated [`SynthesisConfig`].
pub fn compute_params(
    geometry: &ViewGeometry,
    viewer: Position3D,
    output: Size,
    is_mobile: bool,
    config: &SynthesisConfig,
) -> SynthesisParams {
    let main_width = f64::from(geometry.main.width);
    let layers: LayerVec<LayerParams> = geometry
        .layers
        .iter()
        .map(|l| {
            let focal_px = l.focal_ratio * main_width;
            LayerParams {
                focal_px,
                inv_depth_min: -l.min_disparity / focal_px,
                inv_depth_max: -l.max_disparity / focal_px,
            }
        })
        .collect();

    let viewport_scale = output.width.min(output.height) / f64::from(geometry.main.min_side());

    let plane = config.rest_distance(is_mobile);
    let camera_offset = Position3D::new(viewer.x, viewer.y, plane - viewer.z);
    let depth = (plane - camera_offset.z).abs().max(MIN_PLANE_DEPTH_MM);
    let parallax_shift = -camera_offset.xy() / depth;

    let base_focal = layers.first().map_or(0.0, |l| l.focal_px);
    let synthetic_focal_px = base_focal * viewport_scale * (1.0 - camera_offset.z / plane).abs();

    SynthesisParams {
        layer_count: layers.len(),
        layers,
        outpaint_ratio: geometry.outpaint_ratio,
        viewport_scale,
        rest_distance: plane,
        camera_offset,
        parallax_shift,
        synthetic_focal_px,
        output,
        eye_separation_mm: config.eye_separation_mm,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/synthesis/params.rs"]
mod tests;
