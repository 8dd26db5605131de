use std::time::Duration;

use tokio::runtime::Handle;

use crate::{Notification, Task, TaskSender};

/// Starts one delayed [`Task::Expire`] per notification with a positive timeout.
///
/// Timers are never cancelled. A timer that outlives its notification (closed, or replaced by a newer
/// one with the same id) is detected by the executor through the generation it carries, and does nothing.
#[derive(Debug, Clone)]
pub struct ExpirationScheduler {
    tasks: TaskSender,
    runtime: Handle,
}

impl ExpirationScheduler {
    pub fn new(tasks: TaskSender, runtime: Handle) -> Self {
        ExpirationScheduler { tasks, runtime }
    }

    /// Returns whether a timer was started.
    pub fn schedule(&self, notification: &Notification) -> bool {
        let Ok(timeout) = u64::try_from(notification.expire_timeout) else {
            return false;
        };
        if timeout == 0 {
            return false;
        }

        let id = notification.id;
        let generation = notification.generation;
        let tasks = self.tasks.clone();
        self.runtime.spawn(async move {
            tokio::time::sleep(Duration::from_millis(timeout)).await;
            log::debug!("Notification {} timed out after {}ms", id, timeout);
            tasks.submit(Task::Expire { id, generation });
        });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task_channel;
    use std::collections::HashMap;

    fn notification(expire_timeout: i32) -> Notification {
        Notification {
            id: 3,
            generation: 9,
            app_name: String::new(),
            replaces_id: 0,
            app_icon: String::new(),
            summary: String::new(),
            body: String::new(),
            actions: Vec::new(),
            hints: HashMap::new(),
            expire_timeout,
            created_at: chrono::Local::now(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_after_timeout() {
        let (tasks, mut receiver) = task_channel();
        let scheduler = ExpirationScheduler::new(tasks, Handle::current());
        assert!(scheduler.schedule(&notification(100)));

        tokio::time::sleep(Duration::from_millis(99)).await;
        assert!(receiver.try_recv().is_err());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert!(matches!(receiver.try_recv(), Ok(Task::Expire { id: 3, generation: 9 })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_and_negative_never_expire() {
        let (tasks, mut receiver) = task_channel();
        let scheduler = ExpirationScheduler::new(tasks, Handle::current());
        assert!(!scheduler.schedule(&notification(0)));
        assert!(!scheduler.schedule(&notification(-1)));

        tokio::time::sleep(Duration::from_secs(3600)).await;
        assert!(receiver.try_recv().is_err());
    }
}
