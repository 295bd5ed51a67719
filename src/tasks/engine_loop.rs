//! Engine loop background task

use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info};

use crate::{
    channel::{engine_channel, EngineHandle, Envelope},
    state::{EngineDeps, TimerEngine},
};

/// Load the engine from the store and run it on its own task
pub async fn spawn_engine(deps: EngineDeps) -> (EngineHandle, JoinHandle<()>) {
    let (handle, links, inbox) = engine_channel();
    let engine = TimerEngine::load(deps, links).await;
    let task = tokio::spawn(engine_loop_task(engine, inbox));
    (handle, task)
}

/// Handle messages and ticks one at a time until every handle is dropped
pub async fn engine_loop_task(
    mut engine: TimerEngine,
    mut inbox: mpsc::UnboundedReceiver<Envelope>,
) {
    info!("Starting engine loop, timer is {}", engine.phase());

    while let Some(envelope) = inbox.recv().await {
        match envelope {
            Envelope::Message { message, reply } => {
                debug!("Handling {}", message.action());
                let response = engine.handle(message).await;
                if let Some(reply) = reply {
                    if reply.send(response).is_err() {
                        debug!("Requester went away before the reply");
                    }
                }
            }
            Envelope::Tick { generation } => engine.on_tick(generation),
        }
    }

    engine.shutdown();
    info!("Engine loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{sync::Arc, time::Duration};

    use crate::{
        badge::MemoryBadgeSink,
        channel::{Message, Reply},
        clock::SystemClock,
        state::TimerPhase,
        storage::{MemoryStore, Persistence},
    };

    async fn spawn_test_engine(tick: Duration) -> (EngineHandle, JoinHandle<()>, MemoryBadgeSink) {
        let (persistence, _) = Persistence::spawn(Arc::new(MemoryStore::new()));
        let badge = MemoryBadgeSink::new();
        let deps = EngineDeps {
            persistence,
            badge: Arc::new(badge.clone()),
            clock: Arc::new(SystemClock),
            tick_period: tick,
        };
        let (handle, task) = spawn_engine(deps).await;
        (handle, task, badge)
    }

    #[tokio::test]
    async fn request_response_round_trip() {
        let (handle, _task, _badge) = spawn_test_engine(Duration::from_secs(1)).await;

        let reply = handle
            .request(Message::StartTimer { target_minutes: Some(41.0) })
            .await
            .unwrap();
        match reply {
            Reply::Record(record) => {
                assert_eq!(record.phase(), TimerPhase::Running);
                assert_eq!(record.target_minutes.minutes(), 41.0);
            }
            other => panic!("unexpected {:?}", other),
        }

        let status = handle.status().await;
        assert!(status.is_running);
        assert!(status.elapsed < 1_000, "elapsed {}ms right after start", status.elapsed);
    }

    #[tokio::test]
    async fn fire_and_forget_is_applied_in_order() {
        let (handle, _task, badge) = spawn_test_engine(Duration::from_secs(1)).await;

        handle.send(Message::StartTimer { target_minutes: None }).unwrap();
        handle.send(Message::ResetTimer { target_minutes: Some(45.0) }).unwrap();

        let status = handle.status().await;
        assert!(!status.is_running);
        assert_eq!(status.target_minutes, 45.0);
        assert_eq!(badge.last_text().as_deref(), Some(""));
    }

    #[tokio::test]
    async fn ticks_repaint_while_running_only() {
        let (handle, _task, badge) = spawn_test_engine(Duration::from_millis(20)).await;

        handle.request(Message::StartTimer { target_minutes: None }).await.unwrap();
        let after_start = badge.text_paint_count();
        tokio::time::sleep(Duration::from_millis(150)).await;
        let while_running = badge.text_paint_count();
        assert!(while_running >= after_start + 2);

        handle.request(Message::PauseTimer).await.unwrap();
        let after_pause = badge.text_paint_count();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(badge.text_paint_count(), after_pause);
    }

    #[tokio::test]
    async fn repeated_starts_do_not_stack_ticks() {
        let (handle, _task, badge) = spawn_test_engine(Duration::from_millis(50)).await;

        for _ in 0..5 {
            handle.request(Message::StartTimer { target_minutes: None }).await.unwrap();
        }
        let after_starts = badge.text_paint_count();
        tokio::time::sleep(Duration::from_millis(230)).await;

        // One ticker at 50ms gives about four ticks; five stacked would give twenty
        let ticks = badge.text_paint_count() - after_starts;
        assert!(ticks <= 6, "{} ticks in 230ms", ticks);
    }

    #[tokio::test]
    async fn loop_ends_when_handles_are_dropped() {
        let (handle, task, _badge) = spawn_test_engine(Duration::from_millis(10)).await;
        handle.request(Message::StartTimer { target_minutes: None }).await.unwrap();

        drop(handle);
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("engine loop should stop")
            .unwrap();
    }
}
