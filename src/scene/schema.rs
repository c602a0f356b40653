use std::fmt;

/// `albedo.blob_id` value that selects the container's leading image instead of a field.
pub const SOURCE_IMAGE_BLOB_ID: i64 = -1;

#[derive(Clone, Debug, Default, serde::Deserialize)]
pub(crate) struct SceneDef {
    #[serde(default)]
    pub(crate) views: Option<Vec<ViewDef>>,
}

#[derive(Clone, Debug, Default, serde::Deserialize)]
pub(crate) struct ViewDef {
    #[serde(default)]
    pub(crate) width_px: Option<u32>,
    #[serde(default)]
    pub(crate) height_px: Option<u32>,
    #[serde(default)]
    pub(crate) albedo: Option<BlobDef>,
    #[serde(default)]
    pub(crate) disparity: Option<DisparityDef>,
    #[serde(default)]
    pub(crate) camera_data: Option<CameraDataDef>,
    #[serde(default)]
    pub(crate) layers_top_to_bottom: Option<Vec<LayerDef>>,
    #[serde(default)]
    pub(crate) layered_depth_image_data: Option<LdiDataDef>,
}

#[derive(Clone, Debug, Default, serde::Deserialize)]
pub(crate) struct LdiDataDef {
    #[serde(default)]
    pub(crate) layers_top_to_bottom: Option<Vec<LayerDef>>,
    #[serde(default)]
    pub(crate) outpainting_added_width_px: Option<f64>,
}

#[derive(Clone, Debug, Default, serde::Deserialize)]
pub(crate) struct LayerDef {
    #[serde(default)]
    pub(crate) width_px: Option<u32>,
    #[serde(default)]
    pub(crate) height_px: Option<u32>,
    #[serde(default)]
    pub(crate) albedo: Option<BlobDef>,
    #[serde(default)]
    pub(crate) disparity: Option<DisparityDef>,
    #[serde(default)]
    pub(crate) mask: Option<BlobDef>,
    #[serde(default)]
    pub(crate) camera_data: Option<CameraDataDef>,
}

#[derive(Clone, Copy, Debug, Default, serde::Deserialize)]
pub(crate) struct BlobDef {
    #[serde(default)]
    pub(crate) blob_id: Option<i64>,
}

#[derive(Clone, Copy, Debug, Default, serde::Deserialize)]
pub(crate) struct DisparityDef {
    #[serde(default)]
    pub(crate) blob_id: Option<i64>,
    #[serde(default)]
    pub(crate) min_disparity: Option<f64>,
    #[serde(default)]
    pub(crate) max_disparity: Option<f64>,
}

#[derive(Clone, Copy, Debug, Default, serde::Deserialize)]
pub(crate) struct CameraDataDef {
    #[serde(default)]
    pub(crate) focal_ratio_to_width: Option<f64>,
}

/// Where a view's layer list was found.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum LayerListSource {
    Flat,
    Legacy,
}

impl ViewDef {
    /// Layer list, preferring the flat key over the legacy nested one.
    pub(crate) fn layers(&self) -> Option<(&[LayerDef], LayerListSource)> {
        if let Some(layers) = &self.layers_top_to_bottom {
            return Some((layers, LayerListSource::Flat));
        }
        self.layered_depth_image_data
            .as_ref()
            .and_then(|d| d.layers_top_to_bottom.as_deref())
            .map(|layers| (layers, LayerListSource::Legacy))
    }

    pub(crate) fn outpaint_width_px(&self) -> f64 {
        self.layered_depth_image_data
            .as_ref()
            .and_then(|d| d.outpainting_added_width_px)
            .unwrap_or(0.0)
    }
}

impl LayerListSource {
    pub(crate) fn path(self) -> &'static [SchemaPathElem] {
        match self {
            Self::Flat => &[SchemaPathElem::Field("layers_top_to_bottom")],
            Self::Legacy => &[
                SchemaPathElem::Field("layered_depth_image_data"),
                SchemaPathElem::Field("layers_top_to_bottom"),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SchemaPathElem {
    Field(&'static str),
    Index(usize),
}

#[derive(Debug, Clone)]
pub(crate) struct SchemaError {
    pub(crate) path: Vec<SchemaPathElem>,
    pub(crate) message: String,
}

impl SchemaError {
    fn at(path: &[SchemaPathElem], message: impl Into<String>) -> Self {
        Self {
            path: path.to_vec(),
            message: message.into(),
        }
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", format_path(&self.path), self.message)
    }
}

pub(crate) fn format_path(path: &[SchemaPathElem]) -> String {
    let mut s = String::from("$");
    for p in path {
        match *p {
            SchemaPathElem::Field(name) => {
                s.push('.');
                s.push_str(name);
            }
            SchemaPathElem::Index(i) => {
                s.push('[');
                s.push_str(&i.to_string());
                s.push(']');
            }
        }
    }
    s
}

#[derive(Debug, Clone)]
pub(crate) struct SchemaErrors {
    pub(crate) errors: Vec<SchemaError>,
}

impl fmt::Display for SchemaErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{e}")?;
        }
        Ok(())
    }
}

impl std::error::Error for SchemaErrors {}

/// Check shape and value constraints. Blob existence is checked later, against the container.
pub(crate) fn validate_scene(def: &SceneDef) -> Result<(), SchemaErrors> {
    let mut errors = Vec::new();
    let root = [SchemaPathElem::Field("views")];

    match &def.views {
        None => errors.push(SchemaError::at(&root, "missing")),
        Some(views) if views.is_empty() => {
            errors.push(SchemaError::at(&root, "must contain at least one view"))
        }
        Some(views) => {
            for (i, view) in views.iter().enumerate() {
                let mut path = root.to_vec();
                path.push(SchemaPathElem::Index(i));
                validate_view(view, &mut path, &mut errors);
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(SchemaErrors { errors })
    }
}

fn validate_view(view: &ViewDef, path: &mut Vec<SchemaPathElem>, errors: &mut Vec<SchemaError>) {
    match view.albedo.and_then(|a| a.blob_id) {
        None => errors.push(at_field(path, "albedo", "blob_id is required")),
        Some(SOURCE_IMAGE_BLOB_ID) => {}
        Some(id) => check_blob_id(id, path, "albedo", errors),
    }

    if let Some(d) = &view.disparity {
        check_disparity(d, path, "disparity", errors);
    }

    if let Some(ratio) = view.camera_data.and_then(|c| c.focal_ratio_to_width) {
        check_focal_ratio(ratio, path, errors);
    }

    let outpaint = view.outpaint_width_px();
    if !outpaint.is_finite() || outpaint < 0.0 {
        path.push(SchemaPathElem::Field("layered_depth_image_data"));
        errors.push(at_field(
            path,
            "outpainting_added_width_px",
            "must be a finite value >= 0",
        ));
        path.pop();
    }

    let Some((layers, source)) = view.layers() else {
        errors.push(SchemaError::at(
            path,
            "layers_top_to_bottom is missing (checked view and layered_depth_image_data)",
        ));
        return;
    };
    let depth = path.len();
    path.extend_from_slice(source.path());
    if layers.is_empty() {
        errors.push(SchemaError::at(path, "must contain at least one layer"));
    }
    for (j, layer) in layers.iter().enumerate() {
        path.push(SchemaPathElem::Index(j));
        validate_layer(layer, path, errors);
        path.pop();
    }
    path.truncate(depth);
}

fn validate_layer(layer: &LayerDef, path: &mut Vec<SchemaPathElem>, errors: &mut Vec<SchemaError>) {
    for (key, blob) in [("albedo", layer.albedo), ("mask", layer.mask)] {
        match blob.and_then(|b| b.blob_id) {
            None => errors.push(at_field(path, key, "blob_id is required")),
            Some(id) => check_blob_id(id, path, key, errors),
        }
    }

    match &layer.disparity {
        None => errors.push(at_field(path, "disparity", "is required")),
        Some(d) => check_disparity(d, path, "disparity", errors),
    }

    if let Some(ratio) = layer.camera_data.and_then(|c| c.focal_ratio_to_width) {
        check_focal_ratio(ratio, path, errors);
    }
}

fn check_disparity(
    d: &DisparityDef,
    path: &mut Vec<SchemaPathElem>,
    key: &'static str,
    errors: &mut Vec<SchemaError>,
) {
    match d.blob_id {
        None => errors.push(at_field(path, key, "blob_id is required")),
        Some(id) => check_blob_id(id, path, key, errors),
    }
    path.push(SchemaPathElem::Field(key));
    for (name, v) in [
        ("min_disparity", d.min_disparity),
        ("max_disparity", d.max_disparity),
    ] {
        match v {
            None => errors.push(at_field(path, name, "is required")),
            Some(v) if !v.is_finite() => errors.push(at_field(path, name, "must be finite")),
            Some(_) => {}
        }
    }
    path.pop();
}

fn check_blob_id(
    id: i64,
    path: &mut Vec<SchemaPathElem>,
    key: &'static str,
    errors: &mut Vec<SchemaError>,
) {
    if u32::try_from(id).is_err() {
        path.push(SchemaPathElem::Field(key));
        errors.push(at_field(
            path,
            "blob_id",
            format!("{id} is not a valid field type"),
        ));
        path.pop();
    }
}

fn check_focal_ratio(ratio: f64, path: &mut Vec<SchemaPathElem>, errors: &mut Vec<SchemaError>) {
    if !ratio.is_finite() || ratio <= 0.0 {
        path.push(SchemaPathElem::Field("camera_data"));
        errors.push(at_field(path, "focal_ratio_to_width", "must be finite and > 0"));
        path.pop();
    }
}

fn at_field(path: &[SchemaPathElem], key: &'static str, message: impl Into<String>) -> SchemaError {
    let mut p = path.to_vec();
    p.push(SchemaPathElem::Field(key));
    SchemaError::at(&p, message)
}

#[cfg(test)]
#[path = "../../tests/unit/scene/schema.rs"]
mod tests;
