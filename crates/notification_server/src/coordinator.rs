use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering},
        Arc,
    },
};

use zbus::zvariant::OwnedValue;

use crate::*;

/// Arguments of a `Notify` call, exactly as the transport decoded them.
#[derive(Debug, Clone, Default)]
pub struct NotifyRequest {
    pub app_name: String,
    pub replaces_id: NotificationId,
    pub app_icon: String,
    pub summary: String,
    pub body: String,
    pub actions: Vec<Action>,
    pub hints: HashMap<String, OwnedValue>,
    pub expire_timeout: i32,
}

/// Entry point for requests from any number of concurrent callers.
///
/// Owns the id counter and the mute flag. Everything that touches displayed notifications is handed to
/// the executor as a [`Task`]; no method here waits for the executor.
/// One instance lives for the whole process.
#[derive(Debug)]
pub struct Coordinator {
    info: ServerInfo,
    default_timeout: i32,
    counter: AtomicU32,
    generation: AtomicU64,
    muted: AtomicBool,
    tasks: TaskSender,
    expiration: ExpirationScheduler,
}

impl Coordinator {
    pub fn new(info: ServerInfo, default_timeout: i32, tasks: TaskSender, expiration: ExpirationScheduler) -> Self {
        Coordinator {
            info,
            default_timeout,
            counter: AtomicU32::new(0),
            generation: AtomicU64::new(0),
            muted: AtomicBool::new(false),
            tasks,
            expiration,
        }
    }

    pub fn server_information(&self) -> &ServerInfo {
        log::info!("Received: GetServerInformation");
        &self.info
    }

    pub fn capabilities(&self) -> Vec<String> {
        log::info!("Received: GetCapabilities");
        CAPABILITIES.iter().map(|c| c.to_string()).collect()
    }

    pub fn notify(&self, request: NotifyRequest) -> NotificationId {
        log::info!(
            "Received: Notify({}, {}, {}, {}, {}, {:?}, {})",
            request.app_name,
            request.replaces_id,
            request.app_icon,
            request.summary,
            request.body,
            request.actions,
            request.expire_timeout
        );

        let id = self.notification_id(request.replaces_id);
        let expire_timeout = self.notification_timeout(request.expire_timeout);

        if self.is_muted() {
            log::debug!("Muted, not showing notification {}", id);
            return id;
        }

        let notification = Arc::new(Notification {
            id,
            generation: self.generation.fetch_add(1, Ordering::Relaxed) + 1,
            app_name: request.app_name,
            replaces_id: request.replaces_id,
            app_icon: request.app_icon,
            summary: request.summary,
            body: request.body,
            actions: request.actions,
            hints: request.hints,
            expire_timeout,
            created_at: chrono::Local::now(),
        });

        self.tasks.submit(Task::ShowOrReplace(notification.clone()));
        self.expiration.schedule(&notification);

        id
    }

    pub fn close_notification(&self, id: NotificationId) {
        log::info!("Received: CloseNotification({})", id);
        self.tasks.submit(Task::Remove { id, reason: CloseReason::Closed });
    }

    pub fn close_last_notification(&self) {
        log::info!("Received: CloseLastNotification");
        self.tasks.submit(Task::PopTop { reason: CloseReason::Dismissed, invoke_default: false });
    }

    pub fn open_last_notification(&self) {
        log::info!("Received: OpenLastNotification");
        self.tasks.submit(Task::PopTop { reason: CloseReason::Dismissed, invoke_default: true });
    }

    /// Flip the mute flag, returning whether notifications are now muted.
    pub fn toggle_mute(&self) -> bool {
        let muted = !self.muted.fetch_xor(true, Ordering::SeqCst);
        log::info!("Received: ToggleMute. Is muted? {}", muted);
        muted
    }

    pub fn is_muted(&self) -> bool {
        self.muted.load(Ordering::SeqCst)
    }

    /// Stop the executor. Tasks submitted afterwards are dropped.
    pub fn shutdown(&self) {
        log::info!("Received: Kill");
        self.tasks.submit(Task::Shutdown);
    }

    fn notification_id(&self, replaces_id: NotificationId) -> NotificationId {
        if replaces_id > 0 {
            replaces_id
        } else {
            self.counter.fetch_add(1, Ordering::SeqCst) + 1
        }
    }

    fn notification_timeout(&self, requested: i32) -> i32 {
        if requested < 0 {
            self.default_timeout
        } else {
            requested
        }
    }
}
