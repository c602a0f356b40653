use crate::foundation::error::{LdiError, LdiResult};

/// A blob reference resolved against the container's field directory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct BlobRef {
    /// Field type named by the scene description.
    pub blob_id: u32,
    /// Directory index of the first field with that type.
    pub field_index: usize,
}

/// Where a view's main image comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImageSource {
    /// The container buffer itself, read as a single JPEG (the bytes in front of the directory).
    SourceImage,
    /// A directory field.
    Field(BlobRef),
}

/// Disparity map reference plus its encoded value range.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct DisparityRef {
    pub blob: BlobRef,
    pub min_disparity: f64,
    pub max_disparity: f64,
}

/// Intrinsics shared by all layers of a view.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct CameraData {
    /// Focal length divided by image width.
    pub focal_ratio_to_width: f64,
}

/// One image layer: color, disparity and occupancy mask.
///
/// Disparity is stored as the negated inverse depth scaled by the focal ratio, so
/// `inverse_depth = -disparity / focal_px`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct Layer {
    pub albedo: BlobRef,
    pub disparity: BlobRef,
    pub mask: BlobRef,
    pub min_disparity: f64,
    pub max_disparity: f64,
    /// Declared size, when the scene description carries it.
    pub width_px: Option<u32>,
    pub height_px: Option<u32>,
    /// Per-layer focal ratio; when absent the view's [`CameraData`] applies.
    pub focal_ratio_to_width: Option<f64>,
}

/// One viewpoint of the scene with its layer stack (top to bottom).
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct View {
    pub main_image: ImageSource,
    pub disparity: Option<DisparityRef>,
    pub camera_data: Option<CameraData>,
    pub layers: Vec<Layer>,
    /// Pixels added to the layer width by outpainting.
    pub outpaint_width_px: f64,
    pub width_px: Option<u32>,
    pub height_px: Option<u32>,
}

impl View {
    /// Layer width implied by the outpainting amount for a main image `main_width` wide.
    pub fn expected_layer_width(&self, main_width: u32) -> f64 {
        f64::from(main_width) + self.outpaint_width_px
    }

    /// Focal ratio for `layer`: its own override, else the view's camera data.
    pub fn focal_ratio_for(&self, layer: &Layer) -> Option<f64> {
        layer
            .focal_ratio_to_width
            .or(self.camera_data.map(|c| c.focal_ratio_to_width))
    }
}

/// Resolved scene: immutable once built, discarded together with its container.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct LdiDocument {
    pub(crate) views: Vec<View>,
    pub(crate) scene_field_type: u32,
}

impl LdiDocument {
    pub fn views(&self) -> &[View] {
        &self.views
    }

    pub fn view(&self, index: usize) -> LdiResult<&View> {
        self.views.get(index).ok_or_else(|| {
            LdiError::validation(format!(
                "view index {index} out of range ({} views)",
                self.views.len()
            ))
        })
    }

    /// Field type the scene description was read from.
    pub fn scene_field_type(&self) -> u32 {
        self.scene_field_type
    }

    /// Total layer count over all views.
    pub fn layer_count(&self) -> usize {
        self.views.iter().map(|v| v.layers.len()).sum()
    }
}
