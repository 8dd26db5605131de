use std::{cell::Cell, rc::Rc, sync::Arc};

use gtk::{gdk, glib, pango, prelude::*};
use notification_server::{
    CloseReason, Notification, NotificationId, StackPosition, Surface, SurfaceError, Task, TaskSender, DEFAULT_ACTION,
};

use crate::{config::PopupConfig, icon};

/// One notification on screen.
pub struct Popup {
    id: NotificationId,
    window: gtk::Window,
    icon: gtk::Image,
    summary: gtk::Label,
    body: gtk::Label,
    actions: gtk::Box,
    /// Whether clicking the popup invokes the default action or just dismisses it.
    has_default_action: Rc<Cell<bool>>,
}

/// gtk implementation of the presentation surface: one undecorated popup window per notification,
/// stacked upwards from the bottom right corner of the primary monitor.
pub struct PopupSurface {
    config: PopupConfig,
    open_command: Vec<String>,
    tasks: TaskSender,
}

impl PopupSurface {
    pub fn new(config: PopupConfig, open_command: Vec<String>, tasks: TaskSender) -> Self {
        PopupSurface { config, open_command, tasks }
    }

    fn fill_actions(&self, popup: &Popup, notification: &Notification) {
        for child in popup.actions.children() {
            popup.actions.remove(&child);
        }
        for action in notification.actions.iter().filter(|action| action.key != DEFAULT_ACTION) {
            let button = gtk::Button::with_label(&action.label);
            let tasks = self.tasks.clone();
            let (id, key) = (popup.id, action.key.clone());
            button.connect_clicked(move |_| tasks.action_invoked(id, key.clone()));
            popup.actions.add(&button);
            button.show();
        }
        popup.actions.set_visible(!popup.actions.children().is_empty());
        popup.has_default_action.set(notification.has_action(DEFAULT_ACTION));
    }

    fn fill_content(&self, popup: &Popup, notification: &Notification) {
        match icon::load_icon(notification, self.config.icon_size) {
            Some(pixbuf) => {
                popup.icon.set_from_pixbuf(Some(&pixbuf));
                popup.icon.show();
            }
            None => popup.icon.hide(),
        }
        popup.summary.set_label(&notification.summary);
        popup.body.set_label(&notification.body);
        popup.body.set_visible(!notification.body.is_empty());

        let style = popup.window.style_context();
        for urgency in ["low", "normal", "critical"] {
            style.remove_class(urgency);
        }
        style.add_class(notification.urgency().css_class());

        self.fill_actions(popup, notification);
    }
}

fn primary_workarea(id: NotificationId) -> Result<gdk::Rectangle, SurfaceError> {
    let display = gdk::Display::default().ok_or(SurfaceError::NoDisplay)?;
    let monitor = display.primary_monitor().or_else(|| display.monitor(0)).ok_or(SurfaceError::NoMonitor(id))?;
    Ok(monitor.workarea())
}

fn text_label(class: &str, max_width_chars: i32) -> gtk::Label {
    let label = gtk::Label::new(None);
    label.set_use_markup(true);
    label.set_line_wrap(false);
    label.set_halign(gtk::Align::Start);
    label.set_xalign(0.0);
    label.set_max_width_chars(max_width_chars);
    label.set_ellipsize(pango::EllipsizeMode::End);
    label.style_context().add_class(class);
    label
}

fn styled_box(orientation: gtk::Orientation, class: &str) -> gtk::Box {
    let container = gtk::Box::new(orientation, 0);
    container.style_context().add_class(class);
    container
}

impl Surface for PopupSurface {
    type Handle = Popup;

    fn create(&mut self, notification: &Arc<Notification>, position: StackPosition) -> Result<Popup, SurfaceError> {
        let workarea = primary_workarea(notification.id)?;

        let window = gtk::Window::new(gtk::WindowType::Popup);
        window.set_widget_name("notifyme");
        window.set_skip_taskbar_hint(true);
        window.set_decorated(false);
        window.set_type_hint(gdk::WindowTypeHint::Notification);
        window.set_gravity(gdk::Gravity::SouthEast);
        window.set_can_focus(false);
        window.set_accept_focus(false);
        window.set_keep_above(true);
        window.set_default_size(self.config.width, -1);
        window.style_context().add_class("notifyme");

        let main = styled_box(gtk::Orientation::Vertical, "main");
        let clickable = gtk::EventBox::new();
        let content = styled_box(gtk::Orientation::Horizontal, "content");
        let message = styled_box(gtk::Orientation::Vertical, "message");
        let icon = gtk::Image::new();
        let summary = text_label("summary", self.config.max_width_chars);
        let body = text_label("body", self.config.max_width_chars);
        let actions = styled_box(gtk::Orientation::Horizontal, "actions");
        actions.set_halign(gtk::Align::End);
        actions.set_valign(gtk::Align::End);

        message.add(&summary);
        message.add(&body);
        content.add(&icon);
        content.add(&message);
        clickable.add(&content);
        main.add(&clickable);
        main.add(&actions);
        window.add(&main);

        let popup = Popup {
            id: notification.id,
            window,
            icon,
            summary,
            body,
            actions,
            has_default_action: Rc::new(Cell::new(false)),
        };

        {
            let tasks = self.tasks.clone();
            let id = popup.id;
            let has_default_action = popup.has_default_action.clone();
            clickable.connect_button_release_event(move |_, _| {
                if has_default_action.get() {
                    tasks.action_invoked(id, DEFAULT_ACTION);
                } else {
                    tasks.submit(Task::Remove { id, reason: CloseReason::Dismissed });
                }
                glib::Propagation::Stop
            });
        }

        let (offset_x, offset_y) = (self.config.offset_x, self.config.offset_y);
        let below = position.offset + self.config.spacing * position.index as i32;
        popup.window.connect_size_allocate(move |window, allocation| {
            let x = workarea.x() + workarea.width() - allocation.width() - offset_x;
            let y = workarea.y() + workarea.height() - below - allocation.height() - offset_y;
            window.move_(x, y);
        });

        popup.window.show_all();
        self.fill_content(&popup, notification);
        popup.window.present();
        Ok(popup)
    }

    fn update_content(&mut self, popup: &mut Popup, notification: &Arc<Notification>) {
        self.fill_content(popup, notification);
    }

    fn destroy(&mut self, popup: Popup) {
        popup.window.close();
    }

    fn extent(&self, popup: &Popup) -> i32 {
        popup.window.allocated_height()
    }

    fn open_app(&mut self, notification: &Notification) {
        let Some((program, args)) = self.open_command.split_first() else {
            return;
        };
        let result = std::process::Command::new(program)
            .args(args)
            .arg(&notification.app_name)
            .stdin(std::process::Stdio::null())
            .spawn();
        match result {
            Ok(mut child) => {
                std::thread::spawn(move || child.wait());
            }
            Err(e) => log::warn!("Failed to run {:?} to open {}: {}", self.open_command, notification.app_name, e),
        }
    }
}
