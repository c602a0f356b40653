//! Walk a viewer across the display and print the parallax shift per frame.
//!
//! Usage: `cargo run --example synthesize_params [path/to/file.ldi]`. Without a path a small
//! two-layer container is built in memory.

use std::io::Cursor;

use ldiview::{Position3D, SessionOpts, Size, ViewerSession};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let bytes = match std::env::args_os().nth(1) {
        Some(path) => std::fs::read(&path)?,
        None => synthetic_container()?,
    };

    let session = ViewerSession::new(SessionOpts::default())?;
    session.load(bytes)?;

    let output = Size::new(1280.0, 720.0);
    for step in 0..=20 {
        let x = -100.0 + 10.0 * f64::from(step);
        let smoothed = session.push_viewpoint(Position3D::new(x, 0.0, 600.0));
        let Some(p) = session.frame_params(output) else {
            anyhow::bail!("asset vanished mid-run");
        };
        println!(
            "raw x {x:>7.1}  smoothed x {:>7.2}  shift ({:+.5}, {:+.5})  focal {:.1}",
            smoothed.x, p.parallax_shift.x, p.parallax_shift.y, p.synthetic_focal_px
        );
    }
    Ok(())
}

fn synthetic_container() -> anyhow::Result<Vec<u8>> {
    let png = |img: image::DynamicImage| -> anyhow::Result<Vec<u8>> {
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;
        Ok(buf)
    };
    let rgb = |w, h| png(image::DynamicImage::new_rgb8(w, h));
    let gray = |w, h| png(image::DynamicImage::new_luma8(w, h));

    let scene = serde_json::json!({
        "views": [{
            "albedo": { "blob_id": 1 },
            "camera_data": { "focal_ratio_to_width": 0.8 },
            "layers_top_to_bottom": [
                {
                    "albedo": { "blob_id": 10 },
                    "disparity": { "blob_id": 11, "min_disparity": -0.10, "max_disparity": -0.02 },
                    "mask": { "blob_id": 12 }
                },
                {
                    "albedo": { "blob_id": 20 },
                    "disparity": { "blob_id": 21, "min_disparity": -0.05, "max_disparity": -0.01 },
                    "mask": { "blob_id": 22 }
                }
            ],
            "layered_depth_image_data": { "outpainting_added_width_px": 32 }
        }]
    });

    let fields: Vec<(u32, Vec<u8>)> = vec![
        (1, rgb(160, 90)?),
        (10, rgb(192, 90)?),
        (11, gray(192, 90)?),
        (12, gray(192, 90)?),
        (20, rgb(192, 90)?),
        (21, gray(192, 90)?),
        (22, gray(192, 90)?),
        (8, serde_json::to_vec(&scene)?),
    ];

    let mut dir = Vec::new();
    dir.extend_from_slice(&u32::try_from(fields.len())?.to_be_bytes());
    for (ty, data) in &fields {
        dir.extend_from_slice(&ty.to_be_bytes());
        dir.extend_from_slice(&u32::try_from(data.len())?.to_be_bytes());
        dir.extend_from_slice(data);
    }
    let region_offset = u32::try_from(dir.len() + 6)?;
    dir.extend_from_slice(&region_offset.to_be_bytes());
    dir.extend_from_slice(&ldiview::END_MARKER.to_be_bytes());
    Ok(dir)
}
