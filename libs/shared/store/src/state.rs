use std::sync::Arc;

use notification_cell::Notifier;
use shared_config::AppConfig;

use crate::memory::MemoryStore;
use crate::traits::{AppointmentStore, AvailabilityStore, DoctorStore, PatientStore};

/// Shared application state handed to every router. Services reach the
/// persistence collaborator through the trait handles only.
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub doctors: Arc<dyn DoctorStore>,
    pub patients: Arc<dyn PatientStore>,
    pub availability: Arc<dyn AvailabilityStore>,
    pub appointments: Arc<dyn AppointmentStore>,
    pub notifier: Notifier,
}

impl AppState {
    pub fn in_memory(config: AppConfig) -> Arc<Self> {
        let notifier = Notifier::new(&config);
        let store = Arc::new(MemoryStore::new());
        Arc::new(Self {
            config: Arc::new(config),
            doctors: store.clone(),
            patients: store.clone(),
            availability: store.clone(),
            appointments: store,
            notifier,
        })
    }
}
