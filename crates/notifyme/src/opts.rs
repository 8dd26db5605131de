use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

/// Struct that gets generated from `RawOpt`.
#[derive(Debug, PartialEq)]
pub struct Opt {
    pub log_debug: bool,
    pub config_path: Option<std::path::PathBuf>,
    pub action: Action,
}

#[derive(Parser, Debug, PartialEq)]
#[command(version, about)]
pub(super) struct RawOpt {
    /// Write out debug logs.
    #[arg(long = "debug", global = true)]
    log_debug: bool,

    /// Override the path to the configuration directory (the directory that contains notifyme.toml and notifyme.css)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    action: Option<Action>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Action {
    /// Start the notification daemon.
    #[command(name = "daemon", alias = "d")]
    Daemon {
        /// Stay in the foreground instead of forking into the background.
        #[arg(long)]
        no_daemonize: bool,
    },

    /// Kill the running daemon.
    #[command(name = "kill", alias = "k")]
    Kill,

    /// Close the notification with the given id.
    #[command(name = "close", alias = "c")]
    Close { id: u32 },

    /// Dismiss the most recent notification.
    #[command(name = "close-last")]
    CloseLast,

    /// Invoke the default action of the most recent notification and dismiss it.
    #[command(name = "open-last")]
    OpenLast,

    /// Stop or resume showing new notifications.
    #[command(name = "toggle-mute")]
    ToggleMute,

    /// Print the server information and capabilities of the running notification server.
    #[command(name = "info")]
    Info,

    /// Send a notification and print its id.
    #[command(name = "send")]
    Send {
        summary: String,

        #[arg(default_value = "")]
        body: String,

        #[arg(short, long, default_value = "notifyme")]
        app_name: String,

        /// Icon name or file:// uri
        #[arg(short, long, default_value = "")]
        icon: String,

        /// Id of a notification to replace
        #[arg(short, long, default_value_t = 0)]
        replaces: u32,

        /// Expiration in milliseconds. -1 uses the server default, 0 never expires.
        #[arg(short, long, default_value_t = -1, allow_negative_numbers = true)]
        timeout: i32,

        /// Action in the form `key:label`. May be given multiple times.
        #[arg(short = 'A', long = "action", value_parser = parse_action)]
        actions: Vec<(String, String)>,
    },
}

impl Opt {
    pub fn from_env() -> Self {
        let raw: RawOpt = RawOpt::parse();
        raw.into()
    }
}

impl From<RawOpt> for Opt {
    fn from(other: RawOpt) -> Self {
        let RawOpt { action, log_debug, config } = other;
        Opt { action: action.unwrap_or(Action::Daemon { no_daemonize: false }), log_debug, config_path: config }
    }
}

fn parse_action(s: &str) -> Result<(String, String)> {
    let (key, label) =
        s.split_once(':').with_context(|| format!("actions must be in the shape `key:label`, but got: {}", s))?;
    Ok((key.to_owned(), label.to_owned()))
}
