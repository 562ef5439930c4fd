//! Desktop notifications over the freedesktop notification service.

use std::collections::HashMap;
use zbus::blocking::Connection;
use zbus::zvariant::Value;

use super::CapabilityError;
use crate::common::constants::APP_NAME;

/// Whether the desktop accepts notifications from us.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}

/// Sends user-visible notifications.
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    /// Ask whether notifications can be shown.
    fn request_permission(&self) -> Permission;

    fn notify(&self, title: &str, body: &str) -> Result<(), CapabilityError>;
}

#[zbus::proxy(
    interface = "org.freedesktop.Notifications",
    default_service = "org.freedesktop.Notifications",
    default_path = "/org/freedesktop/Notifications"
)]
trait Notifications {
    #[allow(clippy::too_many_arguments)]
    fn notify(
        &self,
        app_name: &str,
        replaces_id: u32,
        app_icon: &str,
        summary: &str,
        body: &str,
        actions: &[&str],
        hints: HashMap<&str, &Value<'_>>,
        expire_timeout: i32,
    ) -> zbus::Result<u32>;

    fn get_capabilities(&self) -> zbus::Result<Vec<String>>;
}

/// Critical urgency keeps the notification on screen until acknowledged.
const URGENCY_CRITICAL: u8 = 2;

/// Notifier backed by `org.freedesktop.Notifications` on the session bus.
pub struct DesktopNotifier {
    connection: Option<Connection>,
}

impl DesktopNotifier {
    /// Connect to the session bus; a missing bus leaves the notifier inert.
    pub fn connect() -> Self {
        let connection = match Connection::session() {
            Ok(connection) => Some(connection),
            Err(e) => {
                log_debug!("Session bus unavailable, notifications disabled: {e}");
                None
            }
        };
        Self { connection }
    }

    fn proxy(&self) -> Result<NotificationsProxyBlocking<'_>, CapabilityError> {
        let connection = self
            .connection
            .as_ref()
            .ok_or_else(|| CapabilityError::Unsupported("no session bus".to_string()))?;
        NotificationsProxyBlocking::new(connection)
            .map_err(|e| CapabilityError::Unsupported(format!("notification service: {e}")))
    }
}

impl Notifier for DesktopNotifier {
    fn request_permission(&self) -> Permission {
        match self.proxy().and_then(|proxy| {
            proxy
                .get_capabilities()
                .map_err(|e| CapabilityError::Unsupported(e.to_string()))
        }) {
            Ok(_) => Permission::Granted,
            Err(_) => Permission::Denied,
        }
    }

    fn notify(&self, title: &str, body: &str) -> Result<(), CapabilityError> {
        let proxy = self.proxy()?;
        let urgency = Value::from(URGENCY_CRITICAL);
        let mut hints = HashMap::new();
        hints.insert("urgency", &urgency);

        proxy
            .notify(APP_NAME, 0, "alarm-symbolic", title, body, &[], hints, 0)
            .map(|_| ())
            .map_err(|e| CapabilityError::Unsupported(format!("notification failed: {e}")))
    }
}
