use log::{ error, info, warn };

use crate::engine::error::Result;
use crate::engine::resources::{ Frame, SharedResources };

use super::{ Menu, Scene, SceneKind, Switch };

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveContext {
    Menu,
    Scene(SceneKind),
}

/// Owns the menu and the most recent scene, and routes each frame to
/// whichever of them is active.
///
/// A scene stays alive after switching back to the menu so it can be
/// resumed; it is dropped only when another scene replaces it.
pub struct ContextHolder {
    menu: Menu,
    scene: Option<Scene>,
    on_scene: bool,
    needs_start: bool,
    exit_requested: bool,
}

impl Default for ContextHolder {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextHolder {
    pub fn new() -> Self {
        Self {
            menu: Menu::new(),
            scene: None,
            on_scene: false,
            needs_start: true,
            exit_requested: false,
        }
    }

    pub fn active(&self) -> ActiveContext {
        match (&self.scene, self.on_scene) {
            (Some(scene), true) => ActiveContext::Scene(scene.kind()),
            _ => ActiveContext::Menu,
        }
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    /// Runs one frame of the active context and applies the switch it asks for.
    pub fn loop_run(&mut self, ctx: &egui::Context, frame: &Frame, res: &SharedResources) -> Result<()> {
        let switch = match self.scene.as_mut().filter(|_| self.on_scene) {
            Some(scene) => {
                if self.needs_start {
                    self.needs_start = false;
                    scene.start();
                }
                scene.update(ctx, frame, res)?
            }
            None => {
                self.on_scene = false;
                if self.needs_start {
                    self.needs_start = false;
                    self.menu.start();
                }
                self.menu.update(ctx, self.scene.as_ref().map(Scene::kind))
            }
        };

        if let Some(switch) = switch {
            self.switch(switch, res);
        }
        Ok(())
    }

    /// Applies `switch`. The incoming context is started on its next frame.
    pub fn switch(&mut self, switch: Switch, res: &SharedResources) {
        match switch {
            Switch::Menu => {
                self.activate(false);
            }
            Switch::Enter(kind) => match Scene::create(kind, res) {
                Ok(scene) => {
                    info!("entering {}", kind.title());
                    self.scene = Some(scene);
                    self.activate(true);
                }
                Err(e) => {
                    error!("could not create {}: {}", kind.title(), e);
                }
            },
            Switch::Resume => {
                if self.scene.is_some() {
                    self.activate(true);
                } else {
                    warn!("nothing to resume");
                }
            }
            Switch::Exit => {
                info!("exit requested");
                self.exit_requested = true;
            }
        }
    }

    fn activate(&mut self, scene: bool) {
        self.on_scene = scene;
        self.needs_start = true;
    }
}
