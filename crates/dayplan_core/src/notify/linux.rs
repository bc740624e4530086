use crate::error::AppError;
use crate::model::Alert;
use crate::notify::Notifier;
use notify_rust::{Notification, Timeout};

pub struct LinuxNotifier;

impl Notifier for LinuxNotifier {
    fn notify(&self, alert: &Alert) -> Result<(), AppError> {
        let mut notification = Notification::new();
        notification
            .appname("dayplan")
            .summary(&alert.title)
            .body(&alert.body)
            .timeout(Timeout::Milliseconds(8_000));

        notification
            .show()
            .map_err(|err| AppError::io(err.to_string()))?;
        Ok(())
    }
}
