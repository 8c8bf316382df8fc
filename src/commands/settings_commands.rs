use super::response::{ActionResponse, ErrorPayload};
use crate::settings::{DisplayMode, DisplaySettings};

pub fn display_mode(settings: &DisplaySettings) -> ActionResponse<DisplayMode> {
    ActionResponse::ok(settings.mode())
}

pub async fn toggle_display_mode(settings: &mut DisplaySettings) -> ActionResponse<DisplayMode> {
    match settings.toggle().await {
        Ok(mode) => ActionResponse::ok(mode),
        Err(e) => ActionResponse::failed(ErrorPayload::from(&e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::MemorySettingsStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn toggle_returns_new_mode() {
        let mut settings = DisplaySettings::load(Arc::new(MemorySettingsStore::default())).await;
        assert_eq!(display_mode(&settings).to_json()["data"], "light");

        let json = toggle_display_mode(&mut settings).await.to_json();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"], "dark");
    }
}
