use crate::error::AppError;
use crate::model::Alert;

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "linux")]
pub use linux::LinuxNotifier;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub use windows::WindowsNotifier;

const DISABLE_ENV_VAR: &str = "DAYPLAN_DISABLE_NOTIFICATIONS";

/// Platform notification surface.
pub trait Notifier {
    fn notify(&self, alert: &Alert) -> Result<(), AppError>;

    /// `false` when alerts would be dropped, e.g. no platform support.
    fn is_available(&self) -> bool {
        true
    }
}

pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _alert: &Alert) -> Result<(), AppError> {
        Ok(())
    }

    fn is_available(&self) -> bool {
        false
    }
}

pub fn notifier_from_env() -> Box<dyn Notifier> {
    if std::env::var(DISABLE_ENV_VAR).is_ok() {
        return Box::new(NoopNotifier);
    }

    match platform_notifier() {
        Ok(notifier) => notifier,
        Err(err) => {
            tracing::debug!(error = %err, "platform notifications unavailable");
            Box::new(NoopNotifier)
        }
    }
}

/// Fires every alert at the platform surface and the in-app sink.
///
/// Platform failures are logged and dropped; nothing is retried.
pub fn dispatch(alerts: &[Alert], notifier: &dyn Notifier, in_app: &mut dyn FnMut(&Alert)) {
    for alert in alerts {
        tracing::info!(title = %alert.title, body = %alert.body, "alert");
        if let Err(err) = notifier.notify(alert) {
            tracing::warn!(title = %alert.title, error = %err, "platform notification failed");
        }
        in_app(alert);
    }
}

#[cfg(target_os = "linux")]
pub fn platform_notifier() -> Result<Box<dyn Notifier>, AppError> {
    Ok(Box::new(LinuxNotifier))
}

#[cfg(windows)]
pub fn platform_notifier() -> Result<Box<dyn Notifier>, AppError> {
    Ok(Box::new(WindowsNotifier))
}

#[cfg(not(any(target_os = "linux", windows)))]
pub fn platform_notifier() -> Result<Box<dyn Notifier>, AppError> {
    Err(AppError::invalid_data(
        "notifications are not supported on this platform",
    ))
}
