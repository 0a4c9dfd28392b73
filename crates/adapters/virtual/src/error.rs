//! Errors raised by the virtual hub.

use sceneguard_domain::error::{NotFoundError, SceneGuardError};
use sceneguard_domain::id::{EntityRef, SceneId};

#[derive(Debug, thiserror::Error)]
pub enum VirtualError {
    #[error("unknown light {0}")]
    UnknownLight(EntityRef),
    #[error("unknown scene {0}")]
    UnknownScene(SceneId),
    #[error("light {0} is unavailable")]
    Unavailable(EntityRef),
}

impl From<VirtualError> for SceneGuardError {
    fn from(err: VirtualError) -> Self {
        match err {
            VirtualError::UnknownLight(id) => NotFoundError {
                entity: "Light",
                id: id.to_string(),
            }
            .into(),
            VirtualError::UnknownScene(id) => NotFoundError {
                entity: "Scene",
                id: id.to_string(),
            }
            .into(),
            VirtualError::Unavailable(_) => Self::Collaborator(Box::new(err)),
        }
    }
}
