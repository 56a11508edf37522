//! Model management: references, payload loading, the active model slot,
//! and swap orchestration.

mod loader;
mod reference;
mod slot;
mod swap;

pub use loader::{load_payload, LoadError, LoadedPayload, ModelLoader, PostcardModelLoader};
pub use reference::{ModelReference, ReferenceError, VersionSpec};
pub use slot::{ActiveModelSlot, LoadedModel};
pub use swap::{SwapError, SwapFailure, SwapOrchestrator, SwapOutcome, SwapState, SwapStatus};
