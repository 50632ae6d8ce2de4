use std::error::Error;
use std::io::Cursor;
use std::sync::Arc;

use biomatch::{
    enroll_and_store, EngineConfig, ImageKind, MatchEngine, MatchQuery, Matcher, RecordStore,
    ResultCache,
};
use serde_json::json;

fn png_bytes(shade: impl Fn(u32, u32) -> u8) -> Vec<u8> {
    let img = image::GrayImage::from_fn(64, 64, |x, y| image::Luma([shade(x, y)]));
    let mut cursor = Cursor::new(Vec::new());
    image::DynamicImage::ImageLuma8(img)
        .write_to(&mut cursor, image::ImageFormat::Png)
        .expect("png encode");
    cursor.into_inner()
}

fn main() -> Result<(), Box<dyn Error>> {
    let store = Arc::new(RecordStore::in_memory());
    let cache = Arc::new(ResultCache::in_memory());
    let engine = MatchEngine::new(store.clone(), EngineConfig::default())?.with_cache(cache);

    let face = png_bytes(|x, _| (x * 4) as u8);
    let record = enroll_and_store(
        &store,
        json!({"first_name": "Ada", "last_name": "Lovelace"}),
        Some(&face),
        None,
    )?;
    println!(
        "enrolled {} (face bucket {:?})",
        record.id, record.face_bucket
    );

    let outcome = engine.search(&MatchQuery::new(face, ImageKind::Face))?;
    println!(
        "identical capture: matched={} distance={:?}",
        outcome.matched, outcome.distance
    );

    let stranger = png_bytes(|_, y| (y * 4) as u8);
    let outcome = engine.search(&MatchQuery::new(stranger, ImageKind::Face))?;
    println!(
        "different capture: matched={} distance={:?}",
        outcome.matched, outcome.distance
    );

    Ok(())
}
