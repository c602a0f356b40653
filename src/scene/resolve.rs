use crate::{
    container::decode::{Container, SCENE_FIELD_CURRENT, SCENE_FIELD_LEGACY},
    foundation::error::{LdiError, LdiResult},
    scene::document::{BlobRef, CameraData, DisparityRef, ImageSource, Layer, LdiDocument, View},
    scene::schema::{
        self, LayerDef, SOURCE_IMAGE_BLOB_ID, SceneDef, SchemaPathElem, ViewDef, format_path,
    },
};

/// Build the [`LdiDocument`] described by `container`'s scene-description field.
///
/// The current field type is preferred over the legacy one. Parsing and schema checks run
/// first; every blob reference is then resolved against the directory, and the first
/// unresolved one aborts the whole document.
#[tracing::instrument(skip(container), fields(fields = container.len()))]
pub fn resolve_scene(container: &Container) -> LdiResult<LdiDocument> {
    let field = container
        .field_by_type(SCENE_FIELD_CURRENT)
        .or_else(|| container.field_by_type(SCENE_FIELD_LEGACY))
        .ok_or(LdiError::MissingSceneDescription)?;

    let text = std::str::from_utf8(field.data)
        .map_err(|e| LdiError::invalid_scene(format!("not UTF-8: {e}")))?;
    // Writers sometimes NUL-terminate the payload.
    let text = text.trim_end_matches('\0');

    let def: SceneDef = serde_json::from_str(text)
        .map_err(|e| LdiError::invalid_scene(format!("malformed JSON: {e}")))?;
    schema::validate_scene(&def).map_err(|e| LdiError::invalid_scene(e.to_string()))?;

    let views = def
        .views
        .as_deref()
        .unwrap_or_default()
        .iter()
        .enumerate()
        .map(|(i, v)| resolve_view(container, i, v))
        .collect::<LdiResult<Vec<_>>>()?;

    let doc = LdiDocument {
        views,
        scene_field_type: field.field_type,
    };
    tracing::debug!(
        views = doc.views.len(),
        layers = doc.layer_count(),
        scene_field_type = field.field_type,
        "resolved scene description"
    );
    Ok(doc)
}

fn resolve_view(container: &Container, index: usize, def: &ViewDef) -> LdiResult<View> {
    let mut path = vec![SchemaPathElem::Field("views"), SchemaPathElem::Index(index)];

    let main_image = match def.albedo.and_then(|a| a.blob_id) {
        Some(SOURCE_IMAGE_BLOB_ID) => ImageSource::SourceImage,
        id => ImageSource::Field(resolve_blob(container, &mut path, "albedo", id)?),
    };

    let disparity = match &def.disparity {
        Some(d) => Some(DisparityRef {
            blob: resolve_blob(container, &mut path, "disparity", d.blob_id)?,
            min_disparity: d.min_disparity.unwrap_or_default(),
            max_disparity: d.max_disparity.unwrap_or_default(),
        }),
        None => None,
    };

    let camera_data = def
        .camera_data
        .and_then(|c| c.focal_ratio_to_width)
        .map(|focal_ratio_to_width| CameraData {
            focal_ratio_to_width,
        });

    let (layer_defs, source) = def
        .layers()
        .ok_or_else(|| LdiError::invalid_scene(format!("{}: no layers", format_path(&path))))?;
    path.extend_from_slice(source.path());
    let mut layers = Vec::with_capacity(layer_defs.len());
    for (j, layer) in layer_defs.iter().enumerate() {
        path.push(SchemaPathElem::Index(j));
        layers.push(resolve_layer(container, &mut path, layer)?);
        path.pop();
    }

    if camera_data.is_none() {
        tracing::warn!(view = index, "view has no camera_data.focal_ratio_to_width");
    }

    Ok(View {
        main_image,
        disparity,
        camera_data,
        layers,
        outpaint_width_px: def.outpaint_width_px(),
        width_px: def.width_px,
        height_px: def.height_px,
    })
}

fn resolve_layer(
    container: &Container,
    path: &mut Vec<SchemaPathElem>,
    def: &LayerDef,
) -> LdiResult<Layer> {
    let disparity = def.disparity.unwrap_or_default();
    Ok(Layer {
        albedo: resolve_blob(container, path, "albedo", def.albedo.and_then(|b| b.blob_id))?,
        disparity: resolve_blob(container, path, "disparity", disparity.blob_id)?,
        mask: resolve_blob(container, path, "mask", def.mask.and_then(|b| b.blob_id))?,
        min_disparity: disparity.min_disparity.unwrap_or_default(),
        max_disparity: disparity.max_disparity.unwrap_or_default(),
        width_px: def.width_px,
        height_px: def.height_px,
        focal_ratio_to_width: def.camera_data.and_then(|c| c.focal_ratio_to_width),
    })
}

fn resolve_blob(
    container: &Container,
    path: &mut Vec<SchemaPathElem>,
    key: &'static str,
    blob_id: Option<i64>,
) -> LdiResult<BlobRef> {
    path.push(SchemaPathElem::Field(key));
    let resolved = blob_id
        .and_then(|id| u32::try_from(id).ok())
        .and_then(|ty| container.field_by_type(ty))
        .map(|f| BlobRef {
            blob_id: f.field_type,
            field_index: f.index,
        })
        .ok_or_else(|| LdiError::UnresolvedBlobReference {
            path: format_path(path),
            blob_id: blob_id.unwrap_or(SOURCE_IMAGE_BLOB_ID),
        });
    path.pop();
    resolved
}

#[cfg(test)]
#[path = "../../tests/unit/scene/resolve.rs"]
mod tests;
