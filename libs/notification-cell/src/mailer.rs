use reqwest::Client;
use serde_json::json;
use tracing::{debug, warn};

use shared_config::AppConfig;
use shared_models::schedule::{Appointment, Doctor, Patient};

/// Best-effort client for the mail gateway collaborator. Every send is
/// fire-and-forget: a gateway outage is logged and swallowed so it can never
/// block or roll back a booking.
#[derive(Clone)]
pub struct Notifier {
    client: Client,
    gateway_url: String,
    sender: String,
}

impl Notifier {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            gateway_url: config.mail_gateway_url.clone(),
            sender: config.mail_from.clone(),
        }
    }

    /// Dispatch a message to the gateway. Failures are logged, never returned.
    pub async fn notify(&self, recipients: &[String], subject: &str, body: &str) {
        let recipients: Vec<&String> =
            recipients.iter().filter(|email| !email.is_empty()).collect();

        if recipients.is_empty() {
            debug!("No recipients for notification '{}', skipping", subject);
            return;
        }

        if self.gateway_url.is_empty() {
            debug!("Mail gateway not configured, dropping notification '{}'", subject);
            return;
        }

        let payload = json!({
            "from": self.sender,
            "to": recipients,
            "subject": subject,
            "body": body,
        });

        match self.client.post(&self.gateway_url).json(&payload).send().await {
            Ok(response) if !response.status().is_success() => {
                warn!(
                    "Mail gateway rejected notification '{}' with status {}",
                    subject,
                    response.status()
                );
            }
            Ok(_) => debug!("Notification '{}' dispatched to {} recipient(s)", subject, recipients.len()),
            Err(e) => warn!("Failed to reach mail gateway for '{}': {}", subject, e),
        }
    }

    pub async fn booking_confirmed(
        &self,
        appointment: &Appointment,
        doctor: &Doctor,
        patient: &Patient,
    ) {
        let subject = "Appointment confirmation";
        let body = format!(
            "Appointment with Dr. {} on {} from {} to {} is confirmed for {}.",
            doctor.full_name,
            appointment.date(),
            appointment.start_time.format("%H:%M"),
            appointment.end_time.format("%H:%M"),
            patient.full_name,
        );
        self.notify(&[patient.email.clone(), doctor.email.clone()], subject, &body)
            .await;
    }

    pub async fn booking_cancelled(
        &self,
        appointment: &Appointment,
        doctor: &Doctor,
        patient: &Patient,
    ) {
        let subject = "Appointment cancelled";
        let body = format!(
            "The appointment with Dr. {} on {} at {} has been cancelled.",
            doctor.full_name,
            appointment.date(),
            appointment.start_time.format("%H:%M"),
        );
        self.notify(&[patient.email.clone(), doctor.email.clone()], subject, &body)
            .await;
    }
}
