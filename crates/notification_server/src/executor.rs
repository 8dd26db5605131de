use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::{
    CloseReason, DisplayedEntry, Generation, Notification, NotificationId, Registry, Signal, SignalQueue, SurfaceError,
    DEFAULT_ACTION,
};

/// Where a notification sits in the on-screen stack.
///
/// Slots of closed notifications stay empty until everything above them is gone, so displayed
/// notifications never move.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StackPosition {
    /// Slot in the stack, 0 being the bottom.
    pub index: usize,
    /// Distance from the bottom of the stack, not counting spacing between slots.
    pub offset: i32,
}

/// Capability contract of the presentation surface.
///
/// Only ever called from the executor. User interaction is reported back by submitting
/// [`Task::ActionInvoked`] through a [`TaskSender`], never by calling into the executor directly.
pub trait Surface {
    type Handle;

    /// Build and show the visual representation of a notification. Must either fully succeed or
    /// leave nothing behind.
    fn create(&mut self, notification: &Arc<Notification>, position: StackPosition) -> Result<Self::Handle, SurfaceError>;
    fn update_content(&mut self, handle: &mut Self::Handle, notification: &Arc<Notification>);
    fn destroy(&mut self, handle: Self::Handle);
    /// Space the notification occupies along the stacking axis.
    fn extent(&self, handle: &Self::Handle) -> i32;

    /// Bring the application that sent the notification to the foreground.
    fn open_app(&mut self, _notification: &Notification) {}
}

#[derive(Debug)]
pub enum Task {
    ShowOrReplace(Arc<Notification>),
    Remove { id: NotificationId, reason: CloseReason },
    PopTop { reason: CloseReason, invoke_default: bool },
    ActionInvoked { id: NotificationId, action_key: String },
    /// Fired by the expiration scheduler. Only removes the entry if it still shows `generation`.
    Expire { id: NotificationId, generation: Generation },
    Shutdown,
}

pub type TaskReceiver = UnboundedReceiver<Task>;

/// Cloneable handle for submitting tasks to the executor from any thread.
#[derive(Debug, Clone)]
pub struct TaskSender(UnboundedSender<Task>);

pub fn task_channel() -> (TaskSender, TaskReceiver) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (TaskSender(sender), receiver)
}

impl TaskSender {
    pub fn submit(&self, task: Task) {
        if let Err(e) = self.0.send(task) {
            log::warn!("Executor is not running, dropping {:?}", e.0);
        }
    }

    /// Report that the user clicked an action of a displayed notification.
    pub fn action_invoked(&self, id: NotificationId, action_key: impl Into<String>) {
        self.submit(Task::ActionInvoked { id, action_key: action_key.into() })
    }
}

/// The single-threaded owner of the registry and the presentation surface.
///
/// Tasks are applied strictly one after another, in the order they were submitted.
pub struct Executor<S: Surface> {
    surface: S,
    registry: Registry<S::Handle>,
    signals: SignalQueue,
    outbox: Vec<Signal>,
}

impl<S: Surface> Executor<S> {
    pub fn new(surface: S, signals: SignalQueue) -> Self {
        Executor { surface, registry: Registry::new(), signals, outbox: Vec::new() }
    }

    pub fn registry(&self) -> &Registry<S::Handle> {
        &self.registry
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Process tasks until [`Task::Shutdown`] arrives or every sender is gone.
    /// Tasks still queued at that point are abandoned.
    pub async fn run(mut self, mut tasks: TaskReceiver) {
        while let Some(task) = tasks.recv().await {
            if let Task::Shutdown = task {
                log::info!("Executor shutting down");
                break;
            }
            self.process(task).await;
        }
    }

    /// Apply one task and hand the signals it produced to the signal queue.
    pub async fn process(&mut self, task: Task) {
        self.apply(task);
        for signal in std::mem::take(&mut self.outbox) {
            self.signals.push(signal).await;
        }
    }

    fn apply(&mut self, task: Task) {
        log::debug!("Executing {:?}", task);
        match task {
            Task::ShowOrReplace(notification) => self.show_or_replace(notification),
            Task::Remove { id, reason } => self.remove(id, reason),
            Task::PopTop { reason, invoke_default } => self.pop_top(reason, invoke_default),
            Task::ActionInvoked { id, action_key } => self.action_invoked(id, action_key),
            Task::Expire { id, generation } => {
                let displayed = self.registry.get(id).map(|entry| entry.notification.generation);
                match displayed {
                    Some(current) if current == generation => self.remove(id, CloseReason::Expired),
                    Some(_) => log::debug!("Expiration of notification {} is stale, it was replaced", id),
                    None => log::debug!("Expiration of notification {} is stale, it was already closed", id),
                }
            }
            Task::Shutdown => {}
        }
    }

    fn show_or_replace(&mut self, notification: Arc<Notification>) {
        if let Some(entry) = self.registry.get_mut(notification.id) {
            self.surface.update_content(&mut entry.handle, &notification);
            entry.notification = notification;
            return;
        }

        let position = match self.registry.top() {
            Some(top) => StackPosition {
                index: top.position.index + 1,
                offset: top.position.offset + self.surface.extent(&top.handle),
            },
            None => StackPosition::default(),
        };
        match self.surface.create(&notification, position) {
            Ok(handle) => {
                if let Err(entry) = self.registry.push(DisplayedEntry { notification, handle, position }) {
                    self.surface.destroy(entry.handle);
                }
            }
            Err(e) => log::error!("Error building notification {}: {}", notification.id, e),
        }
    }

    fn remove(&mut self, id: NotificationId, reason: CloseReason) {
        if let Some(entry) = self.registry.remove(id) {
            self.surface.destroy(entry.handle);
            self.outbox.push(Signal::NotificationClosed { id, reason });
        }
    }

    fn pop_top(&mut self, reason: CloseReason, invoke_default: bool) {
        let Some(entry) = self.registry.pop() else {
            return;
        };
        let id = entry.notification.id;
        if invoke_default {
            self.surface.open_app(&entry.notification);
            self.outbox.push(Signal::ActionInvoked { id, action_key: DEFAULT_ACTION.to_string() });
        }
        self.surface.destroy(entry.handle);
        self.outbox.push(Signal::NotificationClosed { id, reason });
    }

    fn action_invoked(&mut self, id: NotificationId, action_key: String) {
        let Some(entry) = self.registry.remove(id) else {
            log::debug!("Action {:?} invoked on notification {} which is no longer displayed", action_key, id);
            return;
        };
        self.surface.destroy(entry.handle);
        let is_default = action_key == DEFAULT_ACTION;
        self.outbox.push(Signal::ActionInvoked { id, action_key });
        if is_default {
            self.outbox.push(Signal::NotificationClosed { id, reason: CloseReason::Dismissed });
        }
    }
}

#[cfg(test)]
pub(crate) mod test_surface {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum SurfaceEvent {
        Created { id: NotificationId, position: StackPosition },
        Updated { id: NotificationId, summary: String },
        Destroyed(NotificationId),
        OpenedApp(NotificationId),
    }

    /// Records every call made by the executor. Notifications whose summary is `"fail"` can't be created.
    #[derive(Debug, Clone, Default)]
    pub struct RecordingSurface {
        pub events: Arc<Mutex<Vec<SurfaceEvent>>>,
    }

    impl RecordingSurface {
        pub fn take_events(&self) -> Vec<SurfaceEvent> {
            std::mem::take(&mut *self.events.lock().unwrap())
        }
    }

    impl Surface for RecordingSurface {
        type Handle = NotificationId;

        fn create(&mut self, notification: &Arc<Notification>, position: StackPosition) -> Result<NotificationId, SurfaceError> {
            if notification.summary == "fail" {
                return Err(SurfaceError::Create { id: notification.id, message: "refusing to build".to_string() });
            }
            self.events.lock().unwrap().push(SurfaceEvent::Created { id: notification.id, position });
            Ok(notification.id)
        }

        fn update_content(&mut self, handle: &mut NotificationId, notification: &Arc<Notification>) {
            self.events.lock().unwrap().push(SurfaceEvent::Updated { id: *handle, summary: notification.summary.clone() });
        }

        fn destroy(&mut self, handle: NotificationId) {
            self.events.lock().unwrap().push(SurfaceEvent::Destroyed(handle));
        }

        fn extent(&self, _handle: &NotificationId) -> i32 {
            50
        }

        fn open_app(&mut self, notification: &Notification) {
            self.events.lock().unwrap().push(SurfaceEvent::OpenedApp(notification.id));
        }
    }
}
