use rayon::prelude::*;

use crate::{
    assets::decode::{PreparedGray, PreparedImage, decode_luma, decode_rgba, pack_albedo_mask},
    container::decode::Container,
    foundation::error::{LdiError, LdiResult},
    scene::document::{BlobRef, ImageSource, LdiDocument, View},
    synthesis::params::ViewGeometry,
};

/// Pixel data of one layer in renderer layout.
#[derive(Clone, Debug)]
pub struct PreparedLayer {
    /// Albedo with the occupancy mask in the alpha channel.
    pub rgba: PreparedImage,
    pub disparity: PreparedGray,
}

/// A view whose every referenced blob has been decoded.
#[derive(Clone, Debug)]
pub struct RenderReadyView {
    pub view_index: usize,
    pub main: PreparedImage,
    pub main_disparity: Option<PreparedGray>,
    /// Top to bottom, as in the scene description.
    pub layers: Vec<PreparedLayer>,
    pub geometry: ViewGeometry,
}

#[derive(Clone, Copy, Debug)]
enum Job {
    Main,
    MainDisparity,
    LayerAlbedo(usize),
    LayerDisparity(usize),
    LayerMask(usize),
}

enum Decoded {
    Rgba(PreparedImage),
    Gray(PreparedGray),
}

/// Decode the main image and every layer blob of view `view_index`.
///
/// One task per blob runs on `pool`; the call returns only after all of them finished, and
/// fails as a whole if any one did.
pub fn prepare_view(
    container: &Container,
    document: &LdiDocument,
    view_index: usize,
    pool: &rayon::ThreadPool,
) -> LdiResult<RenderReadyView> {
    prepare_view_cancellable(container, document, view_index, pool, &|| false)
}

/// [`prepare_view`] that gives up with [`LdiError::Superseded`] once `cancelled` returns true.
///
/// The flag is polled before each blob is decoded; blobs already in flight run to completion.
#[tracing::instrument(skip(container, document, pool, cancelled))]
pub fn prepare_view_cancellable(
    container: &Container,
    document: &LdiDocument,
    view_index: usize,
    pool: &rayon::ThreadPool,
    cancelled: &(dyn Fn() -> bool + Sync),
) -> LdiResult<RenderReadyView> {
    let view = document.view(view_index)?;

    let mut jobs = vec![Job::Main];
    if view.disparity.is_some() {
        jobs.push(Job::MainDisparity);
    }
    for i in 0..view.layers.len() {
        jobs.extend([Job::LayerAlbedo(i), Job::LayerDisparity(i), Job::LayerMask(i)]);
    }

    let decoded = pool.install(|| {
        jobs.par_iter()
            .map(|&job| {
                if cancelled() {
                    return Err(LdiError::Superseded);
                }
                run_job(container, view, job)
            })
            .collect::<LdiResult<Vec<_>>>()
    })?;

    let mut main = None;
    let mut main_disparity = None;
    let mut albedo = vec![None; view.layers.len()];
    let mut disparity = vec![None; view.layers.len()];
    let mut mask = vec![None; view.layers.len()];
    for (job, out) in jobs.into_iter().zip(decoded) {
        match (job, out) {
            (Job::Main, Decoded::Rgba(img)) => main = Some(img),
            (Job::MainDisparity, Decoded::Gray(img)) => main_disparity = Some(img),
            (Job::LayerAlbedo(i), Decoded::Rgba(img)) => albedo[i] = Some(img),
            (Job::LayerDisparity(i), Decoded::Gray(img)) => disparity[i] = Some(img),
            (Job::LayerMask(i), Decoded::Gray(img)) => mask[i] = Some(img),
            (job, _) => {
                return Err(LdiError::image_decode(format!(
                    "unexpected pixel layout for {job:?}"
                )));
            }
        }
    }

    let main = main.ok_or_else(|| LdiError::image_decode("main image was not decoded"))?;
    let layers = albedo
        .into_iter()
        .zip(disparity)
        .zip(mask)
        .enumerate()
        .map(|(i, ((a, d), m))| match (a, d, m) {
            (Some(a), Some(d), Some(m)) => Ok(PreparedLayer {
                rgba: pack_albedo_mask(&a, &m)
                    .map_err(|e| label(&format!("layer {i}"), e))?,
                disparity: d,
            }),
            _ => Err(LdiError::image_decode(format!(
                "layer {i} is missing decoded pixels"
            ))),
        })
        .collect::<LdiResult<Vec<_>>>()?;

    let layer_widths: Vec<u32> = layers.iter().map(|l| l.rgba.width).collect();
    let geometry = ViewGeometry::new(view, main.dims(), &layer_widths)?;

    tracing::debug!(
        view_index,
        main_width = main.width,
        main_height = main.height,
        layers = layers.len(),
        outpaint_ratio = geometry.outpaint_ratio(),
        "view is render-ready"
    );

    Ok(RenderReadyView {
        view_index,
        main,
        main_disparity,
        layers,
        geometry,
    })
}

fn run_job(container: &Container, view: &View, job: Job) -> LdiResult<Decoded> {
    match job {
        Job::Main => match view.main_image {
            // The whole file is a JPEG followed by the directory; the decoder stops at EOI.
            ImageSource::SourceImage => {
                decode_rgba(container.source_bytes(), Some(image::ImageFormat::Jpeg))
                    .map(Decoded::Rgba)
                    .map_err(|e| label("main image (source)", e))
            }
            ImageSource::Field(blob) => decode_rgba(blob_bytes(container, blob)?, None)
                .map(Decoded::Rgba)
                .map_err(|e| label("main image", e)),
        },
        Job::MainDisparity => {
            let blob = view
                .disparity
                .map(|d| d.blob)
                .ok_or_else(|| LdiError::image_decode("view has no disparity map"))?;
            decode_luma(blob_bytes(container, blob)?)
                .map(Decoded::Gray)
                .map_err(|e| label("main disparity", e))
        }
        Job::LayerAlbedo(i) => decode_rgba(blob_bytes(container, view.layers[i].albedo)?, None)
            .map(Decoded::Rgba)
            .map_err(|e| label(&format!("layer {i} albedo"), e)),
        Job::LayerDisparity(i) => decode_luma(blob_bytes(container, view.layers[i].disparity)?)
            .map(Decoded::Gray)
            .map_err(|e| label(&format!("layer {i} disparity"), e)),
        Job::LayerMask(i) => decode_luma(blob_bytes(container, view.layers[i].mask)?)
            .map(Decoded::Gray)
            .map_err(|e| label(&format!("layer {i} mask"), e)),
    }
}

fn label(what: &str, e: LdiError) -> LdiError {
    match e {
        LdiError::ImageDecode(msg) => LdiError::image_decode(format!("{what}: {msg}")),
        other => other,
    }
}

fn blob_bytes(container: &Container, blob: BlobRef) -> LdiResult<&[u8]> {
    container
        .field(blob.field_index)
        .map(|f| f.data)
        .ok_or_else(|| LdiError::UnresolvedBlobReference {
            path: format!("field #{}", blob.field_index),
            blob_id: i64::from(blob.blob_id),
        })
}

/// Thread pool for pixel decoding; `None` uses rayon's default size.
pub fn build_thread_pool(threads: Option<usize>) -> LdiResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(LdiError::validation(
            "decode 'threads' must be >= 1 when set",
        ));
    }
    let mut builder = rayon::ThreadPoolBuilder::new().thread_name(|i| format!("ldi-decode-{i}"));
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| LdiError::validation(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/prepare.rs"]
mod tests;
