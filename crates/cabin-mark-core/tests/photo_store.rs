mod common;

use cabin_mark_core::models::now_iso8601;
use cabin_mark_core::PhotoRecord;
use tempfile::TempDir;

use common::{gradient_png, open_store, solid_jpeg};

fn legacy_record(id: &str, door: &str, full_image: Vec<u8>) -> PhotoRecord {
    PhotoRecord {
        id: id.to_string(),
        door_id: door.to_string(),
        aircraft_type: "A320".to_string(),
        full_image,
        thumbnail: None,
        timestamp: now_iso8601(),
    }
}

#[tokio::test]
async fn projections_cover_every_record_with_a_thumbnail() {
    let tmp = TempDir::new().unwrap();
    let store = open_store(tmp.path());

    for (i, door) in ["l1", "r1", "l2"].iter().enumerate() {
        store.capture(door, "A320", solid_jpeg(640, 480, [i as u8 * 60, 20, 20])).await.unwrap();
    }
    store.put(legacy_record("p-legacy-1", "r2", gradient_png(900, 300))).await.unwrap();
    store.put(legacy_record("p-legacy-2", "fap", solid_jpeg(300, 900, [0, 0, 255]))).await.unwrap();

    let projections = store.load_all_projections().await;
    assert_eq!(projections.len(), 5);
    for p in &projections {
        assert!(!p.thumbnail.is_empty(), "{} has no thumbnail", p.id);
        let thumb = image::load_from_memory(&p.thumbnail).unwrap();
        assert!(thumb.width().max(thumb.height()) <= 250);
    }
}

#[tokio::test]
async fn put_then_get_full_is_byte_identical() {
    let tmp = TempDir::new().unwrap();
    let store = open_store(tmp.path());

    let full = gradient_png(320, 200);
    let record = PhotoRecord::new("l1", "A320", full.clone()).with_thumbnail(vec![9, 8, 7, 6]);
    store.put(record.clone()).await.unwrap();

    let loaded = store.get_full(&record.id).await.expect("record exists");
    assert_eq!(loaded.full_image, full);
    assert_eq!(loaded.thumbnail, Some(vec![9, 8, 7, 6]));
    assert_eq!(loaded, record);
}

#[tokio::test]
async fn put_overwrites_existing_id() {
    let tmp = TempDir::new().unwrap();
    let store = open_store(tmp.path());

    let mut record = PhotoRecord::new("l1", "A320", vec![1]).with_thumbnail(vec![1]);
    store.put(record.clone()).await.unwrap();
    record.door_id = "r1".to_string();
    record.full_image = vec![2, 2];
    record.thumbnail = None;
    store.put(record.clone()).await.unwrap();

    assert_eq!(store.get_full(&record.id).await.unwrap(), record);
    assert_eq!(store.count_by_scope().await.get("A320"), Some(&1));
}

#[tokio::test]
async fn backfill_is_persisted_once_and_survives_reopen() {
    let tmp = TempDir::new().unwrap();

    let first_thumbnail = {
        let store = open_store(tmp.path());
        store.put(legacy_record("p-old", "l1", solid_jpeg(1000, 500, [200, 10, 10]))).await.unwrap();

        let first = store.load_all_projections().await;
        let second = store.load_all_projections().await;
        assert_eq!(first[0].thumbnail, second[0].thumbnail);
        assert_eq!(store.backfill_write_count(), 1);

        let thumb = image::load_from_memory(&first[0].thumbnail).unwrap();
        assert_eq!((thumb.width(), thumb.height()), (250, 125));

        store.close();
        first[0].thumbnail.clone()
    };

    let store = open_store(tmp.path());
    let again = store.load_all_projections().await;
    assert_eq!(again[0].thumbnail, first_thumbnail);
    assert_eq!(store.backfill_write_count(), 0);
    assert_eq!(store.get_full("p-old").await.unwrap().thumbnail, Some(first_thumbnail));
}

#[tokio::test]
async fn delete_many_removes_every_id() {
    let tmp = TempDir::new().unwrap();
    let store = open_store(tmp.path());

    let a = store.capture("l1", "A320", solid_jpeg(64, 64, [1, 2, 3])).await.unwrap();
    let b = store.capture("r1", "A320", solid_jpeg(64, 64, [4, 5, 6])).await.unwrap();
    let c = store.capture("l2", "A320", solid_jpeg(64, 64, [7, 8, 9])).await.unwrap();

    store.delete_many(&[a.id.clone(), b.id.clone()]).await.unwrap();

    assert!(store.get_full(&a.id).await.is_none());
    assert!(store.get_full(&b.id).await.is_none());
    let remaining: Vec<_> = store.load_all_projections().await.into_iter().map(|p| p.id).collect();
    assert_eq!(remaining, vec![c.id]);

    // unknown ids are not an error
    store.delete_many(&["nope".to_string()]).await.unwrap();
}

#[tokio::test]
async fn headers_skip_unknown_ids_and_keep_request_order() {
    let tmp = TempDir::new().unwrap();
    let store = open_store(tmp.path());

    let a = store.capture("l1", "A320", solid_jpeg(8, 8, [0, 0, 0])).await.unwrap();
    let b = store.capture("r1", "A320", solid_jpeg(8, 8, [0, 0, 0])).await.unwrap();

    let headers = store
        .load_headers(&[b.id.clone(), "ghost".to_string(), a.id.clone()])
        .await
        .unwrap();
    let ids: Vec<_> = headers.iter().map(|h| h.id.clone()).collect();
    assert_eq!(ids, vec![b.id, a.id]);
}

#[tokio::test]
async fn concurrent_captures_on_different_ids() {
    let tmp = TempDir::new().unwrap();
    let store = open_store(tmp.path());

    let mut handles = Vec::new();
    for i in 0..8u8 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store.capture("l1", "A321", solid_jpeg(120, 90, [i * 20, 0, 0])).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(store.load_projections_for_scope("A321").await.len(), 8);
}
