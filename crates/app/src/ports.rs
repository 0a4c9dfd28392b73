//! Port definitions: traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod activation;
pub mod clock;
pub mod control;
pub mod hub;
pub mod inventory;
pub mod notifier;

pub use activation::NoticePublisher;
pub use clock::{Clock, SystemClock};
pub use control::{ValidatorControl, ValidatorStatus};
pub use hub::{ActionInvoker, StateReader};
pub use inventory::{EntityResolver, SceneInventory};
pub use notifier::{Notifier, Severity};
