use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use frame_convert::{
    CameraImageView, FrameDispatcher, OwnedImage, OwnedPlane, PixelFormat, Size, ViewConfig,
};

/// Build a synthetic NV12 frame: a horizontal luma ramp with neutral chroma.
fn nv12_frame(size: Size, timestamp: Duration, released: &Arc<AtomicU64>) -> OwnedImage {
    let w = size.width as usize;
    let h = size.height as usize;
    let luma: Vec<u8> = (0..h)
        .flat_map(|_| (0..w).map(move |x| (x * 255 / w.max(1)) as u8))
        .collect();
    let chroma = vec![128u8; w.div_ceil(2) * 2 * h.div_ceil(2)];

    let mut image = OwnedImage::new(PixelFormat::Nv12, size, timestamp);
    image
        .push_plane(OwnedPlane::new(luma, w))
        .expect("luma plane");
    image
        .push_plane(OwnedPlane::new(chroma, w.div_ceil(2) * 2))
        .expect("chroma plane");

    let released = Arc::clone(released);
    image.on_release(move || {
        released.fetch_add(1, Ordering::Relaxed);
    })
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let mut source = FrameDispatcher::new();
    let view = Arc::new(Mutex::new(CameraImageView::new(ViewConfig::default())));
    CameraImageView::enable(&view, &mut source).expect("failed to subscribe");

    let released = Arc::new(AtomicU64::new(0));
    let sizes = [Size::new(8, 4), Size::new(8, 4), Size::new(16, 8), Size::new(6, 3)];

    for (n, size) in sizes.into_iter().enumerate() {
        let timestamp = Duration::from_millis(33 * n as u64);
        source.publish(nv12_frame(size, timestamp, &released));

        let mut view = view.lock().expect("view lock poisoned");
        println!("{}", view.info_label());
        if let Some(texture) = view.texture() {
            let first_row: Vec<u8> = texture
                .data()
                .chunks_exact(4)
                .take(texture.size().width as usize)
                .map(|px| px[0])
                .collect();
            println!(
                "\ttransform: {}\n\tfirst row (red): {:?}",
                view.transform_label(),
                first_row
            );
        }
        view.cycle_transform();
    }

    view.lock()
        .expect("view lock poisoned")
        .disable(&mut source)
        .expect("failed to unsubscribe");

    println!(
        "\nDone. Converted {} frames, released {} images.",
        view.lock().expect("view lock poisoned").frames_converted(),
        released.load(Ordering::Relaxed)
    );
}
