//! Concurrency properties of the presentation gate: single-flight under
//! racing callers, and no release leak under any acquire/drop interleaving.

use std::sync::Arc;
use std::time::Duration;

use interlude_core::{
    AdEngine, AdPlacement, AdPresenter, EngineConfig, PresentationGate, ShowError, ShowOutcome,
};
use proptest::prelude::*;

const AD_BODY: &str = r#"{
    "ad": {
        "ad_id": "ad-1",
        "title": "Test ad",
        "video_url": "https://cdn.example.com/ad.mp4",
        "target_url": "https://example.com",
        "category_id": "SPORT"
    },
    "mode": "RANDOM",
    "app_id": "demo_app",
    "requested_categories": ["SPORT"]
}"#;

/// Presenter that holds the gate open for a while so racing callers observe
/// a busy gate, and records how many handoffs it received.
struct SlowPresenter {
    shown: std::sync::atomic::AtomicU32,
    hold: Duration,
}

impl AdPresenter for SlowPresenter {
    fn present(&self, _placement: AdPlacement) -> Result<(), ShowError> {
        self.shown
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        std::thread::sleep(self.hold);
        Ok(())
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_attempts_admit_exactly_one() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/v1/serve")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(AD_BODY)
        .create_async()
        .await;

    let presenter = Arc::new(SlowPresenter {
        shown: std::sync::atomic::AtomicU32::new(0),
        hold: Duration::from_millis(400),
    });
    let engine = Arc::new(
        AdEngine::new(
            EngineConfig {
                base_url: server.url(),
                app_id: "demo_app".into(),
            },
            presenter.clone(),
        )
        .unwrap(),
    );
    engine.start();

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let engine = engine.clone();
        tasks.push(tokio::spawn(
            async move { engine.request_and_show().await },
        ));
    }

    let mut shown = 0;
    let mut skipped = 0;
    for task in tasks {
        match task.await.unwrap() {
            ShowOutcome::Shown => shown += 1,
            ShowOutcome::Skipped => skipped += 1,
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
    assert_eq!(shown, 1, "exactly one caller may pass the gate");
    assert_eq!(skipped, 7);
    assert_eq!(presenter.shown.load(std::sync::atomic::Ordering::SeqCst), 1);

    // No leak: once the winner finished, the gate admits a new attempt.
    assert_eq!(engine.request_and_show().await, ShowOutcome::Shown);
}

#[tokio::test]
async fn gate_is_free_after_every_outcome() {
    struct FailingPresenter;
    impl AdPresenter for FailingPresenter {
        fn present(&self, _placement: AdPlacement) -> Result<(), ShowError> {
            Err(ShowError::Presentation("surface unavailable".into()))
        }
    }

    let mut server = mockito::Server::new_async().await;
    let engine = AdEngine::new(
        EngineConfig {
            base_url: server.url(),
            app_id: "demo_app".into(),
        },
        Arc::new(FailingPresenter),
    )
    .unwrap();
    engine.start();

    // Fetch error (nothing mocked yet).
    let first = server
        .mock("GET", "/v1/serve")
        .match_query(mockito::Matcher::Any)
        .with_status(500)
        .create_async()
        .await;
    assert_eq!(engine.request_and_show().await, ShowOutcome::Failed);
    first.remove_async().await;

    // No fill.
    let no_fill = server
        .mock("GET", "/v1/serve")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"ad": null}"#)
        .create_async()
        .await;
    assert_eq!(engine.request_and_show().await, ShowOutcome::NoFill);
    no_fill.remove_async().await;

    // Presentation error.
    server
        .mock("GET", "/v1/serve")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(AD_BODY)
        .create_async()
        .await;
    assert_eq!(engine.request_and_show().await, ShowOutcome::Failed);

    // After all of the above, another attempt still reaches the backend:
    // the gate was released on every path.
    assert_eq!(engine.request_and_show().await, ShowOutcome::Failed);
}

proptest! {
    /// For any interleaving of acquire attempts and releases, the flag
    /// mirrors whether a permit is outstanding, and dropping all permits
    /// always frees the gate.
    #[test]
    fn gate_never_leaks(ops in proptest::collection::vec(any::<bool>(), 1..64)) {
        let gate = PresentationGate::new();
        let mut permits = Vec::new();

        for acquire in ops {
            if acquire {
                if let Some(permit) = gate.try_acquire() {
                    permits.push(permit);
                }
                // A second acquire while held must have lost.
                prop_assert!(permits.len() <= 1);
            } else {
                permits.pop();
            }
            prop_assert_eq!(gate.is_held(), !permits.is_empty());
        }

        permits.clear();
        prop_assert!(!gate.is_held());
    }
}
