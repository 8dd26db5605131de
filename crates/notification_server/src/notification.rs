use std::collections::HashMap;

use zbus::zvariant::{OwnedValue, Value};

pub type NotificationId = u32;

/// Token that distinguishes two notifications carrying the same id, e.g. before and after a replace.
pub type Generation = u64;

/// Action key that is invoked when the notification itself (rather than one of its buttons) is activated.
pub const DEFAULT_ACTION: &str = "default";

/// Reason a notification was closed, as reported by the `NotificationClosed` signal.
///
/// The numeric values are part of the wire protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum CloseReason {
    Expired = 1,
    Dismissed = 2,
    Closed = 3,
}

impl CloseReason {
    pub fn code(self) -> u32 {
        self as u32
    }
}

impl std::fmt::Display for CloseReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CloseReason::Expired => write!(f, "expired"),
            CloseReason::Dismissed => write!(f, "dismissed"),
            CloseReason::Closed => write!(f, "closed"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    Low,
    Normal,
    Critical,
}

impl Urgency {
    pub fn css_class(self) -> &'static str {
        match self {
            Urgency::Low => "low",
            Urgency::Normal => "normal",
            Urgency::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub key: String,
    pub label: String,
}

impl Action {
    /// Pair up the flat `[key, label, key, label, ...]` list that callers send.
    /// A trailing key without a label is ignored.
    pub fn from_flat(actions: &[String]) -> Vec<Action> {
        actions.chunks_exact(2).map(|pair| Action { key: pair[0].clone(), label: pair[1].clone() }).collect()
    }
}

/// Raw image passed in the `image-data` hint, with the layout of a `GdkPixbuf`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub width: i32,
    pub height: i32,
    pub rowstride: i32,
    pub has_alpha: bool,
    pub bits_per_sample: i32,
    pub channels: i32,
    pub data: Vec<u8>,
}

impl ImageData {
    fn from_value(value: &Value<'_>) -> Option<ImageData> {
        let structure = match value {
            Value::Structure(structure) => structure,
            Value::Value(inner) => return ImageData::from_value(inner),
            _ => return None,
        };
        match structure.fields() {
            [Value::I32(width), Value::I32(height), Value::I32(rowstride), Value::Bool(has_alpha), Value::I32(bits_per_sample), Value::I32(channels), Value::Array(data)] => {
                Some(ImageData {
                    width: *width,
                    height: *height,
                    rowstride: *rowstride,
                    has_alpha: *has_alpha,
                    bits_per_sample: *bits_per_sample,
                    channels: *channels,
                    data: Vec::<u8>::try_from(data.clone()).ok()?,
                })
            }
            _ => None,
        }
    }
}

/// One request to display a message. Never mutated after construction; replacing a notification
/// produces a new value with the same `id` and a fresh `generation`.
#[derive(Debug, Clone)]
pub struct Notification {
    pub id: NotificationId,
    pub generation: Generation,
    pub app_name: String,
    pub replaces_id: NotificationId,
    pub app_icon: String,
    pub summary: String,
    pub body: String,
    pub actions: Vec<Action>,
    pub hints: HashMap<String, OwnedValue>,
    /// Resolved expiration in milliseconds. 0 never expires.
    pub expire_timeout: i32,
    pub created_at: chrono::DateTime<chrono::Local>,
}

impl Notification {
    pub fn image_data(&self) -> Option<ImageData> {
        ["image-data", "image_data", "icon_data"]
            .iter()
            .filter_map(|key| self.hints.get(*key))
            .find_map(|value| ImageData::from_value(value))
    }

    pub fn urgency(&self) -> Urgency {
        match self.hints.get("urgency").map(|value| &**value) {
            Some(Value::U8(0)) => Urgency::Low,
            Some(Value::U8(2)) => Urgency::Critical,
            _ => Urgency::Normal,
        }
    }

    pub fn has_action(&self, key: &str) -> bool {
        self.actions.iter().any(|action| action.key == key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInfo {
    pub name: String,
    pub vendor: String,
    pub version: String,
    pub spec_version: String,
}

impl Default for ServerInfo {
    fn default() -> Self {
        ServerInfo {
            name: "notifyme".to_string(),
            vendor: "notifyme".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            spec_version: "1.2".to_string(),
        }
    }
}

/// Optional features advertised through `GetCapabilities`.
/// Only list what the presentation surface actually implements.
pub const CAPABILITIES: &[&str] = &["body", "actions", "body-hyperlinks", "body-markup"];

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use zbus::zvariant::{Array, StructureBuilder};

    fn notification_with_hints(hints: HashMap<String, OwnedValue>) -> Notification {
        Notification {
            id: 1,
            generation: 1,
            app_name: "test".to_string(),
            replaces_id: 0,
            app_icon: String::new(),
            summary: "summary".to_string(),
            body: String::new(),
            actions: Vec::new(),
            hints,
            expire_timeout: 0,
            created_at: chrono::Local::now(),
        }
    }

    #[test]
    fn test_close_reason_codes() {
        assert_eq!(CloseReason::Expired.code(), 1);
        assert_eq!(CloseReason::Dismissed.code(), 2);
        assert_eq!(CloseReason::Closed.code(), 3);
    }

    #[test]
    fn test_actions_from_flat_list() {
        let flat = ["default", "Open", "reply", "Reply", "dangling"].map(String::from);
        assert_eq!(
            Action::from_flat(&flat),
            vec![
                Action { key: "default".to_string(), label: "Open".to_string() },
                Action { key: "reply".to_string(), label: "Reply".to_string() },
            ]
        );
    }

    #[test]
    fn test_urgency_hint() {
        let mut hints = HashMap::new();
        assert_eq!(notification_with_hints(hints.clone()).urgency(), Urgency::Normal);
        hints.insert("urgency".to_string(), OwnedValue::from(Value::U8(2)));
        assert_eq!(notification_with_hints(hints).urgency(), Urgency::Critical);
    }

    #[test]
    fn test_image_data_hint() {
        let pixels: Vec<u8> = vec![255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255];
        let structure = StructureBuilder::new()
            .add_field(2i32)
            .add_field(2i32)
            .add_field(6i32)
            .add_field(false)
            .add_field(8i32)
            .add_field(3i32)
            .append_field(Value::Array(Array::from(pixels.clone())))
            .build();
        let mut hints = HashMap::new();
        hints.insert("image-data".to_string(), OwnedValue::from(Value::Structure(structure)));

        let image = notification_with_hints(hints).image_data().unwrap();
        assert_eq!(image.width, 2);
        assert_eq!(image.rowstride, 6);
        assert!(!image.has_alpha);
        assert_eq!(image.data, pixels);
    }

    #[test]
    fn test_missing_image_data() {
        assert_eq!(notification_with_hints(HashMap::new()).image_data(), None);
    }
}
