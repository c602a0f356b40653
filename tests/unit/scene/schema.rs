use super::*;

fn parse(v: serde_json::Value) -> SceneDef {
    serde_json::from_value(v).unwrap()
}

fn messages(v: serde_json::Value) -> Vec<String> {
    validate_scene(&parse(v))
        .unwrap_err()
        .errors
        .iter()
        .map(ToString::to_string)
        .collect()
}

fn layer() -> serde_json::Value {
    serde_json::json!({
        "albedo": { "blob_id": 1 },
        "disparity": { "blob_id": 2, "min_disparity": -0.1, "max_disparity": -0.02 },
        "mask": { "blob_id": 3 }
    })
}

#[test]
fn minimal_scene_validates() {
    let def = parse(serde_json::json!({
        "views": [{ "albedo": { "blob_id": -1 }, "layers_top_to_bottom": [layer()] }]
    }));
    validate_scene(&def).unwrap();
}

#[test]
fn flat_layer_list_wins_over_legacy() {
    let def = parse(serde_json::json!({
        "views": [{
            "albedo": { "blob_id": -1 },
            "layers_top_to_bottom": [layer()],
            "layered_depth_image_data": { "layers_top_to_bottom": [layer(), layer()] }
        }]
    }));
    let views = def.views.as_ref().unwrap();
    let (layers, source) = views[0].layers().unwrap();
    assert_eq!(layers.len(), 1);
    assert_eq!(source, LayerListSource::Flat);
}

#[test]
fn legacy_layer_list_is_used_when_flat_is_absent() {
    let def = parse(serde_json::json!({
        "views": [{
            "albedo": { "blob_id": -1 },
            "layered_depth_image_data": {
                "layers_top_to_bottom": [layer(), layer()],
                "outpainting_added_width_px": 120
            }
        }]
    }));
    validate_scene(&def).unwrap();
    let view = &def.views.as_ref().unwrap()[0];
    let (layers, source) = view.layers().unwrap();
    assert_eq!(layers.len(), 2);
    assert_eq!(source, LayerListSource::Legacy);
    assert_eq!(view.outpaint_width_px(), 120.0);
}

#[test]
fn view_without_any_layer_list_is_rejected() {
    let msgs = messages(serde_json::json!({ "views": [{ "albedo": { "blob_id": 4 } }] }));
    assert_eq!(msgs.len(), 1);
    assert!(msgs[0].starts_with("$.views[0]: layers_top_to_bottom is missing"));
}

#[test]
fn missing_or_empty_views_are_rejected() {
    assert_eq!(messages(serde_json::json!({})), vec!["$.views: missing"]);
    assert_eq!(
        messages(serde_json::json!({ "views": [] })),
        vec!["$.views: must contain at least one view"]
    );
}

#[test]
fn errors_carry_json_paths() {
    let msgs = messages(serde_json::json!({
        "views": [{
            "albedo": { "blob_id": -7 },
            "camera_data": { "focal_ratio_to_width": 0.0 },
            "layered_depth_image_data": {
                "layers_top_to_bottom": [{
                    "albedo": { "blob_id": 1 },
                    "disparity": { "blob_id": 2, "min_disparity": -0.1 }
                }]
            }
        }]
    }));
    assert!(msgs.contains(&"$.views[0].albedo.blob_id: -7 is not a valid field type".to_string()));
    assert!(msgs.contains(
        &"$.views[0].camera_data.focal_ratio_to_width: must be finite and > 0".to_string()
    ));
    assert!(msgs.contains(
        &"$.views[0].layered_depth_image_data.layers_top_to_bottom[0].mask: blob_id is required"
            .to_string()
    ));
    assert!(msgs.contains(
        &"$.views[0].layered_depth_image_data.layers_top_to_bottom[0].disparity.max_disparity: is required"
            .to_string()
    ));
}

#[test]
fn empty_layer_list_and_negative_outpaint_are_rejected() {
    let msgs = messages(serde_json::json!({
        "views": [{
            "albedo": { "blob_id": -1 },
            "layers_top_to_bottom": [],
            "layered_depth_image_data": { "outpainting_added_width_px": -3 }
        }]
    }));
    assert!(msgs.contains(&"$.views[0].layers_top_to_bottom: must contain at least one layer".to_string()));
    assert!(msgs.contains(
        &"$.views[0].layered_depth_image_data.outpainting_added_width_px: must be a finite value >= 0"
            .to_string()
    ));
}

#[test]
fn unknown_keys_are_ignored() {
    let def = parse(serde_json::json!({
        "encoder": "test",
        "views": [{ "albedo": { "blob_id": -1, "format": "jpeg" }, "layers_top_to_bottom": [layer()], "extra": 1 }]
    }));
    validate_scene(&def).unwrap();
}
