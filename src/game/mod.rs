//! Demo contexts: the menu, the scenes, and the holder that switches between them.

pub mod holder;
pub mod menu;
pub mod scene_2d;
pub mod scene_3d;

pub use holder::{ ActiveContext, ContextHolder };
pub use menu::Menu;
pub use scene_2d::Scene2D;
pub use scene_3d::Scene3D;

use crate::engine::error::Result;
use crate::engine::resources::{ Frame, SharedResources };

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneKind {
    Scene2D,
    Scene3D,
}

impl SceneKind {
    pub const ALL: [SceneKind; 2] = [SceneKind::Scene2D, SceneKind::Scene3D];

    pub fn title(self) -> &'static str {
        match self {
            SceneKind::Scene2D => "2D scene",
            SceneKind::Scene3D => "3D scene",
        }
    }
}

/// Transition requested by the active context during its frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Switch {
    Menu,
    Enter(SceneKind),
    Resume,
    Exit,
}

pub enum Scene {
    Scene2D(Scene2D),
    Scene3D(Scene3D),
}

impl Scene {
    pub fn create(kind: SceneKind, res: &SharedResources) -> Result<Self> {
        Ok(match kind {
            SceneKind::Scene2D => Scene::Scene2D(Scene2D::new(res)?),
            SceneKind::Scene3D => Scene::Scene3D(Scene3D::new(res)?),
        })
    }

    pub fn kind(&self) -> SceneKind {
        match self {
            Scene::Scene2D(_) => SceneKind::Scene2D,
            Scene::Scene3D(_) => SceneKind::Scene3D,
        }
    }

    pub fn start(&mut self) {
        match self {
            Scene::Scene2D(scene) => scene.start(),
            Scene::Scene3D(scene) => scene.start(),
        }
    }

    pub fn update(&mut self, ctx: &egui::Context, frame: &Frame, res: &SharedResources) -> Result<Option<Switch>> {
        match self {
            Scene::Scene2D(scene) => scene.update(ctx, frame, res),
            Scene::Scene3D(scene) => scene.update(ctx, frame, res),
        }
    }
}
