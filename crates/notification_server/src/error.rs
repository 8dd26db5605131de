use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Dbus connection error")]
    DbusError(#[from] zbus::Error),
    #[error("Dbus request failed")]
    FdoError(#[from] zbus::fdo::Error),
    #[error("Bus name {0} is already owned by another notification server")]
    NameTaken(String),
}

/// A presentation surface failed to build the visual representation of one notification.
#[derive(Error, Debug)]
pub enum SurfaceError {
    #[error("no display available")]
    NoDisplay,
    #[error("no monitor to place notification {0} on")]
    NoMonitor(u32),
    #[error("failed to create popup for notification {id}: {message}")]
    Create { id: u32, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
