use std::path::PathBuf;

use gtk::{gdk_pixbuf, glib, prelude::*};
use notification_server::{ImageData, Notification};

/// Where the icon of a notification comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconSource {
    File(PathBuf),
    Themed(String),
    Data(ImageData),
    None,
}

impl IconSource {
    pub fn for_notification(notification: &Notification) -> IconSource {
        let icon = notification.app_icon.as_str();
        if let Some(path) = icon.strip_prefix("file://") {
            IconSource::File(PathBuf::from(path))
        } else if icon.starts_with('/') {
            IconSource::File(PathBuf::from(icon))
        } else if !icon.is_empty() {
            IconSource::Themed(icon.to_string())
        } else if let Some(data) = notification.image_data() {
            IconSource::Data(data)
        } else {
            IconSource::None
        }
    }
}

/// Load the icon of a notification, scaled to `size`x`size`.
pub fn load_icon(notification: &Notification, size: i32) -> Option<gdk_pixbuf::Pixbuf> {
    let result = match IconSource::for_notification(notification) {
        IconSource::File(path) => gdk_pixbuf::Pixbuf::from_file_at_scale(&path, size, size, true).map(Some),
        IconSource::Themed(name) => match gtk::IconTheme::default() {
            Some(theme) => theme.load_icon(&name, size, gtk::IconLookupFlags::FORCE_SIZE),
            None => Ok(None),
        },
        IconSource::Data(data) => Ok(pixbuf_from_image_data(data, size)),
        IconSource::None => Ok(None),
    };
    match result {
        Ok(pixbuf) => pixbuf,
        Err(e) => {
            log::warn!("Failed to load icon {:?} of notification {}: {}", notification.app_icon, notification.id, e);
            None
        }
    }
}

/// Whether `data` holds enough bytes for the dimensions it claims. gdk-pixbuf aborts on short buffers.
fn is_well_formed(data: &ImageData) -> bool {
    if data.width <= 0 || data.height <= 0 || data.rowstride <= 0 || data.bits_per_sample != 8 {
        return false;
    }
    if data.channels != if data.has_alpha { 4 } else { 3 } {
        return false;
    }
    let (width, height, rowstride) = (data.width as usize, data.height as usize, data.rowstride as usize);
    let Some(last_row) = width.checked_mul(data.channels as usize) else {
        return false;
    };
    let required = rowstride.checked_mul(height - 1).and_then(|rows| rows.checked_add(last_row));
    rowstride >= last_row && required.is_some_and(|required| data.data.len() >= required)
}

fn pixbuf_from_image_data(data: ImageData, size: i32) -> Option<gdk_pixbuf::Pixbuf> {
    if !is_well_formed(&data) {
        log::warn!("Ignoring malformed image data ({}x{}, {} bytes)", data.width, data.height, data.data.len());
        return None;
    }
    let pixbuf = gdk_pixbuf::Pixbuf::from_bytes(
        &glib::Bytes::from_owned(data.data),
        gdk_pixbuf::Colorspace::Rgb,
        data.has_alpha,
        data.bits_per_sample,
        data.width,
        data.height,
        data.rowstride,
    );
    pixbuf.scale_simple(size, size, gdk_pixbuf::InterpType::Bilinear)
}
