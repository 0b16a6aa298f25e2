// Application layer - Use case interactors

pub mod container;
pub mod cut_interactor;
pub mod persistence;
pub mod session_interactor;

// Re-export interactors
pub use container::{AppContainer, DefaultAppContainer};
pub use cut_interactor::{CutSettings, CuttingCoordinator};
pub use persistence::MarkerPersistence;
pub use session_interactor::{MarkerSession, SessionStats};
