//! Change notifications for widgets and canvases.
//!
//! Components that care about state changes (data binding, inspectors, the
//! tool layer) either connect a listener or subscribe to a channel. The core
//! emits and never depends on who is listening.
//!
//! Listeners run synchronously on the emitting thread, which may be a render
//! thread holding its canvas's scene lock: a listener must not call back into
//! that canvas. Use `Canvas::queue_command` or a subscription channel instead.

use std::sync::Arc;

use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::RwLock;

use crate::value::Properties;

#[derive(Debug, Clone, PartialEq)]
pub enum UiSignal {
    /// The factory produced a widget.
    WidgetCreated {
        widget_id: String,
        widget_type: String,
    },
    /// Properties were merged into a widget.
    WidgetUpdated {
        widget_id: String,
        /// Only the keys that were written.
        changed: Properties,
    },
    /// A widget left its canvas.
    WidgetDeleted {
        canvas_id: String,
        widget_id: String,
    },
    CanvasCreated {
        canvas_id: String,
    },
    CanvasUpdated {
        canvas_id: String,
    },
    CanvasRemoved {
        canvas_id: String,
    },
}

impl UiSignal {
    pub fn is_widget_signal(&self) -> bool {
        matches!(
            self,
            UiSignal::WidgetCreated { .. }
                | UiSignal::WidgetUpdated { .. }
                | UiSignal::WidgetDeleted { .. }
        )
    }

    /// The widget id the signal refers to, if any.
    pub fn widget_id(&self) -> Option<&str> {
        match self {
            UiSignal::WidgetCreated { widget_id, .. }
            | UiSignal::WidgetUpdated { widget_id, .. }
            | UiSignal::WidgetDeleted { widget_id, .. } => Some(widget_id),
            _ => None,
        }
    }
}

/// Identifies a connected listener for [`SignalBus::disconnect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Arc<dyn Fn(&UiSignal) + Send + Sync>;

#[derive(Default)]
struct BusInner {
    listeners: Vec<(ListenerId, Listener)>,
    subscribers: Vec<Sender<UiSignal>>,
    next_id: u64,
}

/// Cloneable handle to a shared signal dispatcher.
#[derive(Clone, Default)]
pub struct SignalBus {
    inner: Arc<RwLock<BusInner>>,
}

impl SignalBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call `listener` for every signal emitted from now on.
    pub fn connect(&self, listener: impl Fn(&UiSignal) + Send + Sync + 'static) -> ListenerId {
        let mut inner = self.inner.write();
        let id = ListenerId(inner.next_id);
        inner.next_id += 1;
        inner.listeners.push((id, Arc::new(listener)));
        id
    }

    /// Returns whether the listener was connected.
    pub fn disconnect(&self, id: ListenerId) -> bool {
        let mut inner = self.inner.write();
        let before = inner.listeners.len();
        inner.listeners.retain(|(listener_id, _)| *listener_id != id);
        inner.listeners.len() != before
    }

    /// Receive every signal emitted from now on through a channel.
    ///
    /// Dropping the receiver unsubscribes on the next emit.
    pub fn subscribe(&self) -> Receiver<UiSignal> {
        let (tx, rx) = channel::unbounded();
        self.inner.write().subscribers.push(tx);
        rx
    }

    pub fn listener_count(&self) -> usize {
        let inner = self.inner.read();
        inner.listeners.len() + inner.subscribers.len()
    }

    pub fn emit(&self, signal: UiSignal) {
        // Snapshot under the read lock so listeners may connect or emit.
        let (listeners, subscribers) = {
            let inner = self.inner.read();
            if inner.listeners.is_empty() && inner.subscribers.is_empty() {
                return;
            }
            let listeners: Vec<Listener> =
                inner.listeners.iter().map(|(_, l)| l.clone()).collect();
            (listeners, inner.subscribers.clone())
        };

        tracing::trace!(?signal, "Emitting signal");

        for listener in &listeners {
            listener(&signal);
        }

        let dropped: Vec<&Sender<UiSignal>> = subscribers
            .iter()
            .filter(|subscriber| subscriber.send(signal.clone()).is_err())
            .collect();
        if !dropped.is_empty() {
            tracing::trace!(count = dropped.len(), "Pruning dropped subscribers");
            self.inner
                .write()
                .subscribers
                .retain(|subscriber| !dropped.iter().any(|d| d.same_channel(subscriber)));
        }
    }
}

impl std::fmt::Debug for SignalBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalBus")
            .field("listeners", &self.listener_count())
            .finish()
    }
}
