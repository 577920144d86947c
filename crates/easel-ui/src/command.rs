//! Deferred mutations drained by the render thread.

use std::panic::{self, AssertUnwindSafe};

use crossbeam::queue::SegQueue;
use easel_core::profiling::profile_function;

use crate::error::{UiError, UiResult};
use crate::scene::CanvasScene;

/// A unit of deferred work against one canvas scene.
pub type Command = Box<dyn FnOnce(&mut CanvasScene) -> UiResult<()> + Send>;

/// Multi-producer FIFO of [`Command`]s with a single consumer.
#[derive(Default)]
pub struct CommandQueue {
    queue: SegQueue<Command>,
}

/// Outcome of one drain.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DrainReport {
    /// Commands taken off the queue, faulted ones included.
    pub processed: usize,
    pub faults: Vec<UiError>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<F>(&self, command: F)
    where
        F: FnOnce(&mut CanvasScene) -> UiResult<()> + Send + 'static,
    {
        self.queue.push(Box::new(command));
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Run every queued command against `scene`, in FIFO order.
    ///
    /// Only the commands present when the drain starts are run; anything a
    /// command queues waits for the next drain. A command that fails or
    /// panics is logged and skipped.
    pub fn drain(&self, scene: &mut CanvasScene) -> DrainReport {
        profile_function!();

        let mut report = DrainReport::default();
        let pending = self.queue.len();

        for _ in 0..pending {
            let Some(command) = self.queue.pop() else {
                break;
            };
            report.processed += 1;

            let fault = match panic::catch_unwind(AssertUnwindSafe(|| command(scene))) {
                Ok(Ok(())) => continue,
                Ok(Err(err)) => err.to_string(),
                Err(payload) => panic_message(payload.as_ref()),
            };

            tracing::error!(
                canvas_id = %scene.canvas_id(),
                error = %fault,
                "Queued command failed"
            );
            report.faults.push(UiError::CommandFault(fault));
        }

        report
    }
}

impl std::fmt::Debug for CommandQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandQueue")
            .field("len", &self.queue.len())
            .finish()
    }
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties;
    use crate::state::CanvasSettings;
    use crate::widget::WidgetRegistry;

    fn scene() -> CanvasScene {
        CanvasScene::new(CanvasSettings::new("c1"), WidgetRegistry::new())
    }

    #[test]
    fn test_fifo_order() {
        let queue = CommandQueue::new();
        let mut scene = scene();
        for title in ["a", "b", "c"] {
            queue.push(move |scene: &mut CanvasScene| {
                let title = format!("{}{}", scene.settings().title, title);
                scene.settings_mut().title = title;
                Ok(())
            });
        }
        scene.settings_mut().title.clear();

        let report = queue.drain(&mut scene);
        assert_eq!(report.processed, 3);
        assert!(report.faults.is_empty());
        assert_eq!(scene.settings().title, "abc");
        assert!(queue.is_empty());
    }

    #[test]
    fn test_faults_do_not_stop_drain() {
        let queue = CommandQueue::new();
        let mut scene = scene();

        queue.push(|_: &mut CanvasScene| Err(UiError::WidgetNotFound("ghost".into())));
        queue.push(|_: &mut CanvasScene| panic!("boom"));
        queue.push(|scene: &mut CanvasScene| {
            scene
                .apply_properties(&properties! { "title" => "after" })
                .map(|_| ())
        });

        let report = queue.drain(&mut scene);
        assert_eq!(report.processed, 3);
        assert_eq!(report.faults.len(), 2);
        assert!(matches!(&report.faults[1], UiError::CommandFault(msg) if msg == "boom"));
        assert_eq!(scene.settings().title, "after");
    }

    #[test]
    fn test_commands_queued_during_drain_wait() {
        let queue = std::sync::Arc::new(CommandQueue::new());
        let mut scene = scene();

        let inner = queue.clone();
        queue.push(move |_: &mut CanvasScene| {
            inner.push(|_: &mut CanvasScene| Ok(()));
            Ok(())
        });

        assert_eq!(queue.drain(&mut scene).processed, 1);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.drain(&mut scene).processed, 1);
    }
}
