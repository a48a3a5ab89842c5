//! end-to-end pipeline tests: raw broker payloads through the decoder into
//! the state store, plus a stress test for snapshot consistency under
//! concurrent ingest.

use std::collections::BTreeMap;

use hydro_hub::broker;
use hydro_hub::domain::{PumpCommand, SensorReading};
use hydro_hub::state::StateStore;
use tokio::sync::mpsc;

fn store(retention: usize) -> (StateStore, mpsc::Receiver<PumpCommand>) {
    let (tx, rx) = mpsc::channel(8);
    (StateStore::new("hydro_001", retention, tx), rx)
}

#[tokio::test]
async fn frames_flow_from_payload_to_snapshot_and_history() {
    let (store, _rx) = store(16);

    broker::ingest_frame(
        &store,
        br#"{"temperature": 24.0, "humidity": 60.0, "ph": 6.5, "turbidity": 1.2}"#,
    )
    .await;
    broker::ingest_frame(&store, b"garbled \xff frame").await;
    broker::ingest_frame(
        &store,
        br#"{"temperature": 33.0, "humidity": 58.0, "ph": 8.2, "turbidity": 1.0}"#,
    )
    .await;

    let snapshot = store.snapshot().await;
    assert_eq!(snapshot.sensors["temperature"], 33.0);
    assert_eq!(
        snapshot.system_status.warnings,
        vec!["High temperature detected", "pH level out of range"]
    );

    // the bad frame left no history entry
    let history = store.history().await;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].sensors["temperature"], 24.0);
    assert_eq!(history[1].sensors["temperature"], 33.0);
    assert!(history[0].timestamp <= history[1].timestamp);
}

#[tokio::test]
async fn pump_round_trip_through_the_command_channel() {
    let (store, mut rx) = store(16);

    store.apply_command(PumpCommand { status: true }).await;
    let cmd = rx.recv().await.unwrap();
    assert_eq!(cmd.payload(), "pump_on");

    store.apply_command(PumpCommand { status: false }).await;
    assert_eq!(rx.recv().await.unwrap().payload(), "pump_off");
}

/// warnings in a snapshot must always describe the sensors in that same
/// snapshot, even while readings are applied concurrently. each writer frame
/// is internally consistent (temperature and ph both in range, or both out),
/// so any torn read shows up as a mismatched warning set.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn snapshots_are_never_torn_under_concurrent_ingest() {
    let (store, _rx) = store(64);

    fn frame(out_of_range: bool) -> SensorReading {
        let (temp, ph) = if out_of_range { (35.0, 9.0) } else { (22.0, 6.5) };
        let mut channels = BTreeMap::new();
        channels.insert("temperature".to_string(), temp);
        channels.insert("ph".to_string(), ph);
        SensorReading(channels)
    }

    let writer = {
        let store = store.clone();
        tokio::spawn(async move {
            for i in 0..2000u32 {
                store.apply_reading(frame(i % 2 == 0)).await;
            }
        })
    };

    let readers: Vec<_> = (0..3)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move {
                for _ in 0..2000u32 {
                    let snapshot = store.snapshot().await;
                    let expected = if snapshot.sensors["temperature"] > 30.0 {
                        vec![
                            "High temperature detected".to_string(),
                            "pH level out of range".to_string(),
                        ]
                    } else {
                        Vec::new()
                    };
                    assert_eq!(
                        snapshot.system_status.warnings, expected,
                        "warnings do not match the sensors in the same snapshot"
                    );
                }
            })
        })
        .collect();

    writer.await.unwrap();
    for reader in readers {
        reader.await.unwrap();
    }
}

#[tokio::test]
async fn retention_holds_under_burst_ingest() {
    let (store, _rx) = store(10);
    for i in 0..50 {
        let payload = format!(r#"{{"temperature": {}.0}}"#, i);
        broker::ingest_frame(&store, payload.as_bytes()).await;
    }

    let history = store.history().await;
    assert_eq!(history.len(), 10);
    assert_eq!(history[0].sensors["temperature"], 40.0);
    assert_eq!(history[9].sensors["temperature"], 49.0);
}
