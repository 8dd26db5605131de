extern crate gtk;

use anyhow::{Context, Result};
use config::{Config, NotifymePaths};

use crate::server::ForkResult;

mod application_lifecycle;
mod client;
mod config;
mod icon;
mod opts;
mod popup;
mod server;

fn main() {
    let opts: opts::Opt = opts::Opt::from_env();

    let log_level_filter = if opts.log_debug { log::LevelFilter::Debug } else { log::LevelFilter::Info };
    if std::env::var("RUST_LOG").is_ok() {
        pretty_env_logger::init_timed();
    } else {
        pretty_env_logger::formatted_timed_builder()
            .filter(Some("notifyme"), log_level_filter)
            .filter(Some("notification_server"), log_level_filter)
            .init();
    }

    if let Err(err) = run(opts) {
        log::error!("{:?}", err);
        std::process::exit(1);
    }
}

fn run(opts: opts::Opt) -> Result<()> {
    match opts.action {
        opts::Action::Daemon { no_daemonize } => {
            let paths = opts
                .config_path
                .map(NotifymePaths::from_config_dir)
                .unwrap_or_else(NotifymePaths::default)
                .context("Failed to initialize notifyme paths")?;
            let config = Config::read_from_file(paths.get_config_file())
                .with_context(|| format!("Failed to read {}", paths.get_config_file().display()))?;

            let fork_result = server::initialize_server(paths.clone(), config, !no_daemonize)?;
            if fork_result == ForkResult::Parent {
                println!("Started notifyme daemon, logging to {}", paths.get_log_file().display());
            }
        }
        action => client::handle_client_action(action)?,
    }
    Ok(())
}
