pub mod error;
pub mod memory;
pub mod state;
mod traits;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use state::AppState;
pub use traits::{AppointmentStore, AvailabilityStore, DoctorStore, PatientStore};
