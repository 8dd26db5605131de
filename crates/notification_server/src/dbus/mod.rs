//! # DBus binding of the coordinator
//!
//! Exposes the [`Coordinator`] as [`org.freedesktop.Notifications`], plus the non-standard
//! `CloseLastNotification`, `OpenLastNotification`, `ToggleMute` and `Kill` methods, and emits the
//! `NotificationClosed` and `ActionInvoked` signals on behalf of the signal emitter.
//!
//! [`org.freedesktop.Notifications`]: https://specifications.freedesktop.org/notification-spec/latest/

use std::{collections::HashMap, sync::Arc};

use zbus::{dbus_interface, zvariant::OwnedValue, SignalContext};

use crate::*;

pub mod names {
    pub const NOTIFICATIONS_BUS: &str = "org.freedesktop.Notifications";
    pub const NOTIFICATIONS_OBJECT: &str = "/org/freedesktop/Notifications";
}

/// The object served at [`names::NOTIFICATIONS_OBJECT`]. Every method forwards to the coordinator
/// and none of them fail.
#[derive(Debug)]
pub struct NotificationsInterface {
    coordinator: Arc<Coordinator>,
}

#[dbus_interface(name = "org.freedesktop.Notifications")]
impl NotificationsInterface {
    /// GetServerInformation method
    #[dbus_interface(out_args("name", "vendor", "version", "spec_version"))]
    fn get_server_information(&self) -> (String, String, String, String) {
        let info = self.coordinator.server_information();
        (info.name.clone(), info.vendor.clone(), info.version.clone(), info.spec_version.clone())
    }

    /// GetCapabilities method
    fn get_capabilities(&self) -> Vec<String> {
        self.coordinator.capabilities()
    }

    /// Notify method
    #[allow(clippy::too_many_arguments)]
    fn notify(
        &self,
        app_name: String,
        replaces_id: u32,
        app_icon: String,
        summary: String,
        body: String,
        actions: Vec<String>,
        hints: HashMap<String, OwnedValue>,
        expire_timeout: i32,
    ) -> u32 {
        self.coordinator.notify(NotifyRequest {
            app_name,
            replaces_id,
            app_icon,
            summary,
            body,
            actions: Action::from_flat(&actions),
            hints,
            expire_timeout,
        })
    }

    /// CloseNotification method
    fn close_notification(&self, id: u32) {
        self.coordinator.close_notification(id)
    }

    /// CloseLastNotification method
    fn close_last_notification(&self) {
        self.coordinator.close_last_notification()
    }

    /// OpenLastNotification method
    fn open_last_notification(&self) {
        self.coordinator.open_last_notification()
    }

    /// ToggleMute method
    fn toggle_mute(&self) {
        self.coordinator.toggle_mute();
    }

    /// Kill method
    fn kill(&self) {
        self.coordinator.shutdown()
    }

    /// NotificationClosed signal
    #[dbus_interface(signal)]
    async fn notification_closed(ctxt: &SignalContext<'_>, id: u32, reason: u32) -> zbus::Result<()>;

    /// ActionInvoked signal
    #[dbus_interface(signal)]
    async fn action_invoked(ctxt: &SignalContext<'_>, id: u32, action_key: &str) -> zbus::Result<()>;
}

impl NotificationsInterface {
    pub fn new(coordinator: Arc<Coordinator>) -> Self {
        NotificationsInterface { coordinator }
    }

    /// Serve the interface on `con` and claim the well-known notifications bus name.
    ///
    /// Fails if another notification server already owns the name.
    pub async fn attach_to(self, con: &zbus::Connection) -> Result<()> {
        if !con.object_server().at(names::NOTIFICATIONS_OBJECT, self).await? {
            return Err(Error::DbusError(zbus::Error::Failure(format!(
                "Object already exists at {} on this connection",
                names::NOTIFICATIONS_OBJECT
            ))));
        }

        let flags = [zbus::fdo::RequestNameFlags::DoNotQueue];
        match con.request_name_with_flags(names::NOTIFICATIONS_BUS, flags.into_iter().collect()).await {
            Ok(zbus::fdo::RequestNameReply::PrimaryOwner) | Ok(zbus::fdo::RequestNameReply::AlreadyOwner) => {
                log::info!("Acquired {} on the session bus", names::NOTIFICATIONS_BUS);
                Ok(())
            }
            Ok(_) | Err(zbus::Error::NameTaken) => Err(Error::NameTaken(names::NOTIFICATIONS_BUS.to_string())),
            Err(e) => Err(e.into()),
        }
    }
}

/// Emits the interface's signals on a connection.
pub struct DbusSignalSink {
    ctxt: SignalContext<'static>,
}

impl DbusSignalSink {
    pub fn new(con: &zbus::Connection) -> Result<Self> {
        Ok(DbusSignalSink { ctxt: SignalContext::new(con, names::NOTIFICATIONS_OBJECT)?.into_owned() })
    }
}

#[async_trait::async_trait]
impl SignalSink for DbusSignalSink {
    async fn notification_closed(&self, id: NotificationId, reason: CloseReason) -> zbus::Result<()> {
        NotificationsInterface::notification_closed(&self.ctxt, id, reason.code()).await
    }

    async fn action_invoked(&self, id: NotificationId, action_key: &str) -> zbus::Result<()> {
        NotificationsInterface::action_invoked(&self.ctxt, id, action_key).await
    }
}
