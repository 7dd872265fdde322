use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use taskline::{Event, EventKind, Monitor, Scheduler, SchedulerConfig, TaskState};

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<(EventKind, Option<String>)>>,
}

impl Recorder {
    fn wait_for(&self, kind: EventKind, count: usize) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if self.events.lock().iter().filter(|(k, _)| *k == kind).count() >= count {
                return true;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        false
    }
}

#[async_trait]
impl Monitor for Recorder {
    async fn on_event(&self, event: &Event) {
        self.events
            .lock()
            .push((event.kind, event.queue.as_deref().map(str::to_string)));
    }

    fn name(&self) -> &'static str {
        "recorder"
    }
}

#[test]
fn monitors_see_queue_and_task_lifecycle() -> anyhow::Result<()> {
    let recorder = Arc::new(Recorder::default());
    let scheduler = Scheduler::builder(SchedulerConfig::default())
        .with_monitors(vec![recorder.clone() as Arc<dyn Monitor>])
        .build()?;

    let q = scheduler.new_queue("observed");
    let ok = q.submit_async(|| {})?;
    let bad = q.submit_async(|| panic!("observed failure"))?;
    assert_eq!(ok.wait(), TaskState::Completed);
    assert!(bad.wait().has_run());

    assert!(recorder.wait_for(EventKind::TaskCompleted, 1));
    assert!(recorder.wait_for(EventKind::TaskFailed, 1));
    assert!(recorder.wait_for(EventKind::QueueCreated, 3));

    let events = recorder.events.lock();
    let created: Vec<_> = events
        .iter()
        .filter(|(k, _)| *k == EventKind::QueueCreated)
        .filter_map(|(_, q)| q.clone())
        .collect();
    assert_eq!(created, vec!["main", "background", "observed"]);
    Ok(())
}

#[test]
fn scheduler_on_external_runtime() -> anyhow::Result<()> {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()?;
    let recorder = Arc::new(Recorder::default());
    let scheduler = Scheduler::builder(SchedulerConfig::default())
        .with_runtime(rt.handle().clone())
        .with_monitors(vec![recorder.clone() as Arc<dyn Monitor>])
        .build()?;

    let h = scheduler
        .background_queue()
        .submit_after(|| {}, Duration::from_millis(20))?;
    assert_eq!(h.wait(), TaskState::Completed);
    assert!(recorder.wait_for(EventKind::TaskCompleted, 1));

    drop(scheduler);
    drop(rt);
    Ok(())
}
