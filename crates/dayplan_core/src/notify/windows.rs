use crate::error::AppError;
use crate::model::Alert;
use crate::notify::Notifier;
use tauri_winrt_notification::Toast;

pub struct WindowsNotifier;

impl Notifier for WindowsNotifier {
    fn notify(&self, alert: &Alert) -> Result<(), AppError> {
        let mut toast = Toast::new(Toast::POWERSHELL_APP_ID)
            .title(&alert.title)
            .text1(&alert.body);

        if let Some(task_id) = alert.task_id.as_deref() {
            toast = toast.text2(task_id);
        }

        toast.show().map_err(|err| AppError::io(err.to_string()))?;
        Ok(())
    }
}
