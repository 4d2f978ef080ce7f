//! Pipeline runs with fake tools and a fake cutlist server.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{recording, touch, FakeCutlists, TestHarness, GOOD_CUTLIST, MALFORMED_CUTLIST};
use gool::catalog;
use gool::pipeline;
use gool_common::{ItemResult, Stage, VideoStatus};
use tokio::sync::Notify;

fn well_and_malformed() -> Arc<FakeCutlists> {
    Arc::new(FakeCutlists::offering(&[
        ("broken", 9.0, MALFORMED_CUTLIST),
        ("good", 1.0, GOOD_CUTLIST),
    ]))
}

#[tokio::test]
async fn test_raw_video_is_decoded_and_cut() {
    let harness = TestHarness::new(well_and_malformed());
    let ctx = harness.context();
    let key = recording("Film");
    let encoded = ctx.dirs.root.join(format!("{key}.avi.otrkey"));
    touch(&encoded);

    let mut catalog = catalog::build(&ctx.dirs, &[], true).unwrap().catalog;
    pipeline::process(ctx.clone(), &mut catalog).await;

    let item = catalog.get(&key).unwrap();
    assert_eq!(item.status, VideoStatus::Cut);
    assert_eq!(item.result, ItemResult::Ok);
    assert_eq!(item.path, ctx.dirs.cut_output(&key));
    assert_eq!(item.cut_spec.as_ref().unwrap().source_id, "good");

    assert_eq!(harness.runner.calls("otrdecoder"), 1);
    assert_eq!(harness.runner.calls("mkvmerge"), 1);
    let cut_args = &harness.runner.args("mkvmerge")[0];
    assert!(cut_args.contains(&"parts:00:00:30.500000-00:20:30.500000".to_string()));

    // Superseded inputs are gone
    assert!(!encoded.exists());
    assert!(!ctx.dirs.decoded.join(format!("{key}.avi")).exists());
    assert!(ctx.dirs.cut_output(&key).exists());

    assert_eq!(harness.progress.value(&key, Stage::Decode), Some(100));
    assert_eq!(harness.progress.value(&key, Stage::Acquire), Some(100));
    assert_eq!(harness.progress.value(&key, Stage::Apply), Some(100));
}

#[tokio::test]
async fn test_cut_videos_are_not_processed() {
    let cutlists = well_and_malformed();
    let harness = TestHarness::new(cutlists.clone());
    let ctx = harness.context();
    let key = recording("Done");
    touch(&ctx.dirs.cut.join(format!("{key}.cut.mkv")));

    let mut catalog = catalog::build(&ctx.dirs, &[], true).unwrap().catalog;
    pipeline::process(ctx, &mut catalog).await;

    let item = catalog.get(&key).unwrap();
    assert_eq!(item.status, VideoStatus::Cut);
    assert_eq!(item.result, ItemResult::None);
    assert_eq!(harness.runner.total_calls(), 0);
    assert_eq!(cutlists.header_requests(), 0);
}

#[tokio::test]
async fn test_decoded_video_skips_decoder() {
    let harness = TestHarness::new(well_and_malformed());
    let ctx = harness.context();
    let key = recording("Decoded");
    touch(&ctx.dirs.decoded.join(format!("{key}.avi")));

    let mut catalog = catalog::build(&ctx.dirs, &[], true).unwrap().catalog;
    pipeline::process(ctx, &mut catalog).await;

    assert_eq!(catalog.get(&key).unwrap().status, VideoStatus::Cut);
    assert_eq!(harness.runner.calls("otrdecoder"), 0);
    assert_eq!(harness.runner.calls("mkvmerge"), 1);
}

#[tokio::test]
async fn test_cut_waits_for_cutlist() {
    let gate = Arc::new(Notify::new());
    let cutlists = Arc::new(
        FakeCutlists::offering(&[("good", 1.0, GOOD_CUTLIST)]).held_by(gate.clone()),
    );
    let harness = TestHarness::new(cutlists);
    let ctx = harness.context();
    let key = recording("Held");
    touch(&ctx.dirs.encoded.join(format!("{key}.avi.otrkey")));

    let mut catalog = catalog::build(&ctx.dirs, &[], true).unwrap().catalog;
    let run = tokio::spawn({
        let ctx = ctx.clone();
        async move {
            pipeline::process(ctx, &mut catalog).await;
            catalog
        }
    });

    // Decoding finishes while the cutlist is still outstanding
    for _ in 0..50 {
        if harness.runner.calls("otrdecoder") == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(harness.runner.calls("otrdecoder"), 1);
    assert_eq!(harness.runner.calls("mkvmerge"), 0);
    assert!(!run.is_finished());

    gate.notify_one();
    let catalog = run.await.unwrap();

    assert_eq!(harness.runner.calls("mkvmerge"), 1);
    assert_eq!(catalog.get(&key).unwrap().result, ItemResult::Ok);
}

#[tokio::test]
async fn test_cut_waits_for_decoder() {
    let harness = TestHarness::new(well_and_malformed());
    let gate = Arc::new(Notify::new());
    harness.runner.hold("otrdecoder", gate.clone());
    let ctx = harness.context();
    let key = recording("SlowDecode");
    touch(&ctx.dirs.encoded.join(format!("{key}.avi.otrkey")));

    let mut catalog = catalog::build(&ctx.dirs, &[], true).unwrap().catalog;
    let run = tokio::spawn({
        let ctx = ctx.clone();
        async move {
            pipeline::process(ctx, &mut catalog).await;
            catalog
        }
    });

    // The cutlist arrives while the decoder is still running
    for _ in 0..50 {
        if harness.progress.value(&key, Stage::Acquire) == Some(100) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(harness.progress.value(&key, Stage::Acquire), Some(100));
    assert_eq!(harness.runner.calls("otrdecoder"), 1);
    assert_eq!(harness.runner.calls("mkvmerge"), 0);
    assert!(!run.is_finished());

    gate.notify_one();
    let catalog = run.await.unwrap();

    assert_eq!(harness.runner.calls("mkvmerge"), 1);
    let item = catalog.get(&key).unwrap();
    assert_eq!(item.status, VideoStatus::Cut);
    assert_eq!(item.result, ItemResult::Ok);
}

#[tokio::test]
async fn test_decode_failure_skips_cut_and_writes_diagnostics() {
    let harness = TestHarness::new(well_and_malformed());
    harness.runner.fail("otrdecoder", "Fehler: falsches Passwort\n");
    let ctx = harness.context();
    let key = recording("Broken");
    let encoded = ctx.dirs.encoded.join(format!("{key}.avi.otrkey"));
    touch(&encoded);

    let mut catalog = catalog::build(&ctx.dirs, &[], true).unwrap().catalog;
    pipeline::process(ctx.clone(), &mut catalog).await;

    let item = catalog.get(&key).unwrap();
    assert_eq!(item.status, VideoStatus::Raw);
    assert!(item.result.is_error());
    assert!(encoded.exists());
    assert_eq!(harness.runner.calls("mkvmerge"), 0);

    let diagnostics = ctx.dirs.error_file(&key, Stage::Decode).unwrap();
    assert_eq!(
        std::fs::read_to_string(diagnostics).unwrap(),
        "Fehler: falsches Passwort\n"
    );
}

#[tokio::test]
async fn test_missing_cutlist_keeps_decoded_video() {
    let harness = TestHarness::new(Arc::new(FakeCutlists::default()));
    let ctx = harness.context();
    let key = recording("NoList");
    touch(&ctx.dirs.encoded.join(format!("{key}.avi.otrkey")));

    let mut catalog = catalog::build(&ctx.dirs, &[], true).unwrap().catalog;
    pipeline::process(ctx.clone(), &mut catalog).await;

    let item = catalog.get(&key).unwrap();
    assert_eq!(item.status, VideoStatus::Decoded);
    assert_eq!(item.path, ctx.dirs.decoded.join(format!("{key}.avi")));
    assert!(item.result.is_error());
    assert!(item.cut_spec.is_none());
    assert_eq!(harness.runner.calls("mkvmerge"), 0);
}

#[tokio::test]
async fn test_cut_failure_keeps_decoded_video() {
    let harness = TestHarness::new(well_and_malformed());
    harness.runner.fail("mkvmerge", "Error: invalid split\n");
    let ctx = harness.context();
    let key = recording("BadCut");
    let decoded = ctx.dirs.root.join(format!("{key}.avi"));
    touch(&decoded);

    let mut catalog = catalog::build(&ctx.dirs, &[], true).unwrap().catalog;
    pipeline::process(ctx.clone(), &mut catalog).await;

    let item = catalog.get(&key).unwrap();
    assert_eq!(item.status, VideoStatus::Decoded);
    assert_eq!(item.path, ctx.dirs.decoded.join(format!("{key}.avi")));
    match &item.result {
        ItemResult::Error(reason) => assert!(reason.contains("mkvmerge")),
        other => panic!("unexpected result {other:?}"),
    }
    assert!(ctx.dirs.error_file(&key, Stage::Apply).unwrap().exists());
}

#[tokio::test]
async fn test_many_videos_with_bounded_parallelism() {
    let mut harness = TestHarness::new(well_and_malformed());
    harness.config.max_parallel = 2;
    let ctx = harness.context();
    let keys: Vec<String> = (0..6).map(|i| recording(&format!("Serie{i}"))).collect();
    for key in &keys {
        touch(&ctx.dirs.encoded.join(format!("{key}.avi.otrkey")));
    }

    let mut catalog = catalog::build(&ctx.dirs, &[], true).unwrap().catalog;
    pipeline::process(ctx, &mut catalog).await;

    for key in &keys {
        let item = catalog.get(key).unwrap();
        assert_eq!(item.status, VideoStatus::Cut, "{key}");
        assert_eq!(item.result, ItemResult::Ok, "{key}");
    }
    assert_eq!(harness.runner.calls("otrdecoder"), 6);
    assert_eq!(harness.runner.calls("mkvmerge"), 6);
}
