use log::info;

use super::{ SceneKind, Switch };

const HELP_TEXT: &str = "\
Pick a scene to open it. Every scene has a Menu button that brings you back here; \
the last opened scene stays alive and can be resumed.

2D scene: sprite blitting and primitive shapes in pixel coordinates.
3D scene: a coloured cube seen through an orbiting perspective camera.";

/// Start screen. Owns no GPU resources.
#[derive(Debug, Default)]
pub struct Menu {
    show_help: bool,
}

impl Menu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        info!("menu active");
    }

    /// `retained` is the scene that can be resumed, if any.
    pub fn update(&mut self, ctx: &egui::Context, retained: Option<SceneKind>) -> Option<Switch> {
        let mut switch = None;

        egui::Window::new("Menu")
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .resizable(false)
            .collapsible(false)
            .show(ctx, |ui| {
                if let Some(kind) = retained {
                    if ui.button(format!("Resume {}", kind.title())).clicked() {
                        switch = Some(Switch::Resume);
                    }
                    ui.separator();
                }
                for kind in SceneKind::ALL {
                    if ui.button(kind.title()).clicked() {
                        switch = Some(Switch::Enter(kind));
                    }
                }
                ui.separator();
                ui.toggle_value(&mut self.show_help, "Help");
                if ui.button("Exit").clicked() {
                    switch = Some(Switch::Exit);
                }
            });

        if self.show_help {
            egui::Window::new("Help")
                .open(&mut self.show_help)
                .default_width(320.0)
                .show(ctx, |ui| {
                    ui.label(HELP_TEXT);
                });
        }

        switch
    }
}
