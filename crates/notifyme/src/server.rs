use crate::{
    application_lifecycle,
    config::{Config, NotifymePaths},
    popup::PopupSurface,
};
use anyhow::{Context, Result};
use gtk::{gdk, glib, prelude::*};
use notification_server::{
    dbus::{DbusSignalSink, NotificationsInterface},
    Coordinator, ExpirationScheduler, Executor, ServerInfo, SignalQueue, SignalReceiver, Task, TaskSender,
};
use std::{os::unix::io::AsRawFd, path::Path, sync::Arc};

pub fn initialize_server(paths: NotifymePaths, config: Config, should_daemonize: bool) -> Result<ForkResult> {
    if should_daemonize {
        paths.ensure_log_dir()?;
        let fork_result = do_detach(paths.get_log_file())?;

        if fork_result == ForkResult::Parent {
            return Ok(ForkResult::Parent);
        }
    }

    log::info!("Initializing notifyme daemon ({})", paths);

    simple_signal::set_handler(&[simple_signal::Signal::Int, simple_signal::Signal::Term], move |_| {
        log::info!("Shutting down notifyme daemon...");
        if let Err(e) = application_lifecycle::send_exit() {
            log::error!("Failed to send application shutdown event to workers: {:?}", e);
            std::process::exit(1);
        }
    });

    gtk::init()?;
    load_css(&paths.get_css_file());

    let (tasks, task_recv) = notification_server::task_channel();
    let (signal_queue, signal_recv) = SignalQueue::new(config.signal_queue);
    let surface = PopupSurface::new(config.popup.clone(), config.open_command.clone(), tasks.clone());
    let executor = Executor::new(surface, signal_queue);

    let (startup_send, startup_recv) = std::sync::mpsc::channel();
    init_async_part(tasks, signal_recv, config.default_timeout_ms, startup_send);
    startup_recv
        .recv()
        .context("DBus thread exited during startup")?
        .context("Failed to start the notification service")?;

    // The executor lives on the gtk main thread; it is the only place popups are touched.
    glib::MainContext::default().spawn_local(async move {
        executor.run(task_recv).await;
        gtk::main_quit();
    });

    gtk::main();
    log::info!("main application thread finished");
    if !application_lifecycle::is_exiting() {
        application_lifecycle::send_exit()?;
    }

    Ok(ForkResult::Child)
}

/// Run the DBus service, the signal emitter and the shutdown forwarding on a separate tokio runtime.
/// `startup` receives the outcome of claiming the bus name.
fn init_async_part(
    tasks: TaskSender,
    signal_recv: SignalReceiver,
    default_timeout: i32,
    startup: std::sync::mpsc::Sender<Result<()>>,
) {
    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .thread_name("notifyme-dbus")
            .enable_all()
            .build()
            .expect("Failed to initialize tokio runtime");
        rt.block_on(async {
            let expiration = ExpirationScheduler::new(tasks.clone(), tokio::runtime::Handle::current());
            let coordinator = Arc::new(Coordinator::new(ServerInfo::default(), default_timeout, tasks.clone(), expiration));

            let (con, sink) = match connect(coordinator).await {
                Ok(connected) => {
                    let _ = startup.send(Ok(()));
                    connected
                }
                Err(e) => {
                    let _ = startup.send(Err(e));
                    return;
                }
            };

            let forward_exit_to_executor = tokio::spawn(async move {
                // Wait for application exit event
                let _ = application_lifecycle::recv_exit().await;
                log::debug!("Forward task received exit event");
                tasks.submit(Task::Shutdown);
            });

            application_lifecycle::until_exit(notification_server::run_emitter(sink, signal_recv)).await;
            let _ = forward_exit_to_executor.await;
            drop(con);
        })
    });
}

async fn connect(coordinator: Arc<Coordinator>) -> Result<(zbus::Connection, DbusSignalSink)> {
    let con = zbus::Connection::session().await.context("Failed to connect to the session bus")?;
    NotificationsInterface::new(coordinator).attach_to(&con).await?;
    let sink = DbusSignalSink::new(&con)?;
    Ok((con, sink))
}

fn load_css(path: &Path) {
    if !path.exists() {
        log::debug!("Could not find css file: {}", path.display());
        return;
    }
    let provider = gtk::CssProvider::new();
    if let Err(e) = provider.load_from_path(&path.to_string_lossy()) {
        log::error!("Unable to load css file {}: {}", path.display(), e);
        return;
    }
    match gdk::Screen::default() {
        Some(screen) => {
            gtk::StyleContext::add_provider_for_screen(&screen, &provider, gtk::STYLE_PROVIDER_PRIORITY_USER);
            log::info!("Loaded css from file {}", path.display());
        }
        None => log::warn!("Unable to get screen, not loading {}", path.display()),
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ForkResult {
    Parent,
    Child,
}

/// detach the process from the terminal, also redirecting stdout and stderr to the log file
fn do_detach(log_file_path: impl AsRef<Path>) -> Result<ForkResult> {
    // detach from terminal
    match unsafe { nix::unistd::fork()? } {
        nix::unistd::ForkResult::Child => {
            nix::unistd::setsid()?;
            match unsafe { nix::unistd::fork()? } {
                nix::unistd::ForkResult::Parent { .. } => std::process::exit(0),
                nix::unistd::ForkResult::Child => {}
            }
        }
        nix::unistd::ForkResult::Parent { .. } => {
            return Ok(ForkResult::Parent);
        }
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file_path)
        .with_context(|| format!("Error opening log file ({}) for writing", log_file_path.as_ref().display()))?;
    let fd = file.as_raw_fd();

    if nix::unistd::isatty(1)? {
        nix::unistd::dup2(fd, std::io::stdout().as_raw_fd())?;
    }
    if nix::unistd::isatty(2)? {
        nix::unistd::dup2(fd, std::io::stderr().as_raw_fd())?;
    }

    Ok(ForkResult::Child)
}
