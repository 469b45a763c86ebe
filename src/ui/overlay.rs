// src/ui/overlay.rs
//! The viewer's only UI: a diagnostic panel after a failed load and a
//! progress line while the model is still loading.

use imgui::{Condition, WindowFlags};

use crate::controller::ViewportController;
use crate::error::Diagnostic;
use crate::loader::LoadProgress;

const MARGIN: f32 = 16.0;
const PANEL_MAX_WIDTH: f32 = 520.0;

/// What the overlay shows this frame, captured from the controller so the
/// imgui callback doesn't need to borrow it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlayState {
    pub diagnostic: Option<Diagnostic>,
    pub loading: Option<LoadProgress>,
}

impl OverlayState {
    pub fn capture(controller: &ViewportController) -> Self {
        Self {
            diagnostic: controller.diagnostic().cloned(),
            loading: controller.load_progress(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostic.is_none() && self.loading.is_none()
    }
}

/// Text of the progress line; the percentage is left out while the total
/// size is unknown
pub fn loading_label(progress: &LoadProgress) -> String {
    match progress.percent() {
        Some(percent) => format!("Loading model... {percent}%"),
        None => "Loading model...".to_string(),
    }
}

/// Draws the overlay for `state`
pub fn draw_overlay(ui: &imgui::Ui, state: &OverlayState) {
    let [display_width, display_height] = ui.io().display_size;
    if display_width <= 0.0 || display_height <= 0.0 {
        return;
    }

    if let Some(diagnostic) = &state.diagnostic {
        let width = (display_width - 2.0 * MARGIN).clamp(0.0, PANEL_MAX_WIDTH);
        ui.window(diagnostic.title())
            .position(
                [display_width * 0.5, display_height * 0.5],
                Condition::Always,
            )
            .position_pivot([0.5, 0.5])
            .size([width, 0.0], Condition::Always)
            .flags(WindowFlags::NO_MOVE | WindowFlags::NO_RESIZE | WindowFlags::NO_COLLAPSE)
            .build(|| {
                ui.text_wrapped(diagnostic.body());
            });
    }

    if let Some(progress) = &state.loading {
        ui.window("##loading")
            .position([MARGIN, display_height - MARGIN], Condition::Always)
            .position_pivot([0.0, 1.0])
            .flags(
                WindowFlags::NO_DECORATION
                    | WindowFlags::NO_MOVE
                    | WindowFlags::NO_INPUTS
                    | WindowFlags::ALWAYS_AUTO_RESIZE
                    | WindowFlags::NO_SAVED_SETTINGS,
            )
            .bg_alpha(0.4)
            .build(|| {
                ui.text(loading_label(progress));
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewerConfig;
    use crate::loader::tests::MemoryFetcher;
    use crate::viewport::Viewport;
    use std::sync::Arc;

    #[test]
    fn test_loading_label() {
        let halfway = LoadProgress {
            loaded: 50,
            total: Some(200),
        };
        assert_eq!(loading_label(&halfway), "Loading model... 25%");

        let unknown = LoadProgress {
            loaded: 50,
            total: None,
        };
        assert_eq!(loading_label(&unknown), "Loading model...");

        // The built-in imgui font only covers ASCII
        assert!(loading_label(&halfway).is_ascii());
        assert!(loading_label(&unknown).is_ascii());
    }

    #[test]
    fn test_capture_idle_controller_is_empty() {
        let controller =
            ViewportController::initialize(Viewport::new(800, 600), ViewerConfig::default());
        assert!(OverlayState::capture(&controller).is_empty());
    }

    #[test]
    fn test_capture_shows_diagnostic_after_failure() {
        let mut config = ViewerConfig::default();
        config.asset.base = "http://jersey.test".to_string();
        let mut controller = ViewportController::initialize(Viewport::new(800, 600), config)
            .with_fetcher(Arc::new(MemoryFetcher::default()));

        controller.request_model("missing.glb").unwrap();
        controller.wait_for_model();

        let state = OverlayState::capture(&controller);
        assert!(state.loading.is_none());
        let diagnostic = state.diagnostic.unwrap();
        assert!(!diagnostic.is_setup_required());
        assert!(diagnostic.body().contains("not found"));
    }
}
