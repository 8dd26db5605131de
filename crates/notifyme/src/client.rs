use std::collections::HashMap;

use anyhow::{Context, Result};
use notification_server::proxy::NotificationsProxy;
use zbus::zvariant::Value;

use crate::opts::Action;

/// Forward a client action to the running notification server over the session bus.
pub fn handle_client_action(action: Action) -> Result<()> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .thread_name("notifyme-client")
        .enable_all()
        .build()
        .context("Failed to initialize tokio runtime")?;
    rt.block_on(do_server_call(action))
}

async fn do_server_call(action: Action) -> Result<()> {
    let con = zbus::Connection::session().await.context("Failed to connect to the session bus")?;
    let proxy = NotificationsProxy::new(&con).await?;
    log::debug!("Forwarding {:?} to the notification server", action);

    match action {
        Action::Daemon { .. } => unreachable!("the daemon is not started through the client"),
        Action::Kill => proxy.kill().await.context("Failed to kill the notification server")?,
        Action::Close { id } => proxy.close_notification(id).await?,
        Action::CloseLast => proxy.close_last_notification().await?,
        Action::OpenLast => proxy.open_last_notification().await?,
        Action::ToggleMute => proxy.toggle_mute().await?,
        Action::Info => {
            let (name, vendor, version, spec_version) = proxy.get_server_information().await?;
            let capabilities = proxy.get_capabilities().await?;
            println!("name: {}\nvendor: {}\nversion: {}\nspec version: {}", name, vendor, version, spec_version);
            println!("capabilities: {}", capabilities.join(", "));
        }
        Action::Send { summary, body, app_name, icon, replaces, timeout, actions } => {
            let actions = flatten_actions(&actions);
            let id = proxy
                .notify(&app_name, replaces, &icon, &summary, &body, &actions, HashMap::<&str, &Value<'_>>::new(), timeout)
                .await
                .context("Failed to send notification")?;
            println!("{}", id);
        }
    }
    Ok(())
}

/// Actions go over the wire as alternating keys and labels.
fn flatten_actions(actions: &[(String, String)]) -> Vec<&str> {
    actions.iter().flat_map(|(key, label)| [key.as_str(), label.as_str()]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_flatten_actions() {
        let actions = vec![("default".to_string(), "Open".to_string()), ("reply".to_string(), "Reply".to_string())];
        assert_eq!(flatten_actions(&actions), vec!["default", "Open", "reply", "Reply"]);
        assert!(flatten_actions(&[]).is_empty());
    }
}
