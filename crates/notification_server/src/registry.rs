use std::sync::Arc;

use indexmap::IndexMap;

use crate::{Notification, NotificationId, StackPosition};

/// A notification that is currently on screen, together with the surface handle showing it.
#[derive(Debug)]
pub struct DisplayedEntry<H> {
    pub notification: Arc<Notification>,
    pub handle: H,
    /// Where the surface placed it when it was created. Replacing the content keeps it.
    pub position: StackPosition,
}

/// Stack of displayed notifications, oldest first and most recently shown last.
///
/// Owned by the [`Executor`](crate::Executor); nothing else reads or writes it.
/// Every id appears at most once, and removing an entry keeps the order of the others.
#[derive(Debug)]
pub struct Registry<H> {
    entries: IndexMap<NotificationId, DisplayedEntry<H>>,
}

impl<H> Default for Registry<H> {
    fn default() -> Self {
        Registry { entries: IndexMap::new() }
    }
}

impl<H> Registry<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: NotificationId) -> Option<&DisplayedEntry<H>> {
        self.entries.get(&id)
    }

    pub fn get_mut(&mut self, id: NotificationId) -> Option<&mut DisplayedEntry<H>> {
        self.entries.get_mut(&id)
    }

    /// Put a new entry on top of the stack.
    ///
    /// If an entry with that id already exists it is handed back untouched and nothing is inserted.
    pub fn push(&mut self, entry: DisplayedEntry<H>) -> Result<(), DisplayedEntry<H>> {
        let id = entry.notification.id;
        if self.entries.contains_key(&id) {
            return Err(entry);
        }
        self.entries.insert(id, entry);
        Ok(())
    }

    pub fn remove(&mut self, id: NotificationId) -> Option<DisplayedEntry<H>> {
        self.entries.shift_remove(&id)
    }

    /// The most recently shown entry.
    pub fn top(&self) -> Option<&DisplayedEntry<H>> {
        self.entries.last().map(|(_, entry)| entry)
    }

    pub fn pop(&mut self) -> Option<DisplayedEntry<H>> {
        self.entries.pop().map(|(_, entry)| entry)
    }

    /// Ids in stacking order, bottom first.
    pub fn ids(&self) -> Vec<NotificationId> {
        self.entries.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn entry(id: NotificationId) -> DisplayedEntry<()> {
        DisplayedEntry {
            notification: Arc::new(Notification {
                id,
                generation: id as u64,
                app_name: String::new(),
                replaces_id: 0,
                app_icon: String::new(),
                summary: format!("notification {}", id),
                body: String::new(),
                actions: Vec::new(),
                hints: HashMap::new(),
                expire_timeout: 0,
                created_at: chrono::Local::now(),
            }),
            handle: (),
            position: StackPosition { index: id as usize, offset: 0 },
        }
    }

    #[test]
    fn test_push_and_pop_are_lifo() {
        let mut registry = Registry::new();
        for id in [1, 2, 3] {
            registry.push(entry(id)).unwrap();
        }
        assert_eq!(registry.top().map(|e| e.notification.id), Some(3));
        assert_eq!(registry.pop().map(|e| e.notification.id), Some(3));
        assert_eq!(registry.ids(), vec![1, 2]);
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut registry = Registry::new();
        for id in [1, 2, 3, 4] {
            registry.push(entry(id)).unwrap();
        }
        assert!(registry.remove(2).is_some());
        assert!(registry.remove(2).is_none());
        assert_eq!(registry.ids(), vec![1, 3, 4]);
        assert_eq!(registry.top().map(|e| e.position.index), Some(4));
        assert!(registry.get(2).is_none());
    }

    #[test]
    fn test_duplicate_push_is_rejected() {
        let mut registry = Registry::new();
        registry.push(entry(7)).unwrap();
        assert!(registry.push(entry(7)).is_err());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_pop_empty() {
        let mut registry: Registry<()> = Registry::new();
        assert!(registry.pop().is_none());
        assert!(registry.top().is_none());
        assert!(registry.is_empty());
    }
}
