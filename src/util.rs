use crate::{
    CamResult,
    cam::ThetaCam,
    notify::{CapturingStatus, Notification},
    transport::CommandTransport,
};
use std::future::Future;

/// This trait provides convenience functions for the `ThetaCam` struct.
pub trait CamUtil {
    /// Convenience method for taking a picture with the camera's current options.
    ///
    /// * `on_status` - Optional closure which is called when the capturing status changes.
    ///   (Rust complains if you just provide `None` as the parameter value, so provide `None::<fn(_)>` as a value)
    ///
    /// Returns the URL of the picture, `None` if the camera reported none.
    fn take_picture_and_get(
        &self,
        on_status: Option<impl FnMut(CapturingStatus) + Send>,
    ) -> impl Future<Output = CamResult<Option<String>>> + Send;
}

impl<T: CommandTransport> CamUtil for ThetaCam<T> {
    async fn take_picture_and_get(
        &self,
        mut on_status: Option<impl FnMut(CapturingStatus) + Send>,
    ) -> CamResult<Option<String>> {
        let capture = self.photo_capture_builder().build().await?;

        let outcome = capture
            .take_picture()
            .run_with(|notification| {
                if let (Notification::CapturingStatus(status), Some(on_status)) =
                    (notification, on_status.as_mut())
                {
                    on_status(status);
                }
            })
            .await?;

        Ok(outcome
            .output()
            .and_then(|output| output.file_url())
            .map(str::to_owned))
    }
}
