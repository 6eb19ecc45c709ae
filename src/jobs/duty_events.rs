// ==================== DUTY EVENTS WORKER ====================
// Equivalente in-process dos triggers de documento: o serviço de duties
// publica Created/Deleted depois de cada escrita e este worker dispara os SMS.

use chrono::Utc;
use tokio::sync::mpsc;

use crate::{api::metrics, models::Duty, services::notification_service::Notifier};

#[derive(Debug, Clone)]
pub enum DutyEvent {
    Created(Duty),
    Deleted(Duty),
}

/// Handle used by the API to publish events
#[derive(Clone)]
pub struct DutyEvents {
    tx: mpsc::UnboundedSender<DutyEvent>,
}

impl DutyEvents {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<DutyEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn publish(&self, event: DutyEvent) {
        if self.tx.send(event).is_err() {
            log::error!("❌ Duty event worker is gone, notification dropped");
        }
    }
}

/// Inicia o worker de notificações em background
pub fn start_duty_event_worker(notifier: Notifier) -> DutyEvents {
    let (events, rx) = DutyEvents::channel();

    tokio::spawn(run_worker(rx, notifier));

    log::info!("✅ Duty event worker started");
    events
}

/// Processes events one at a time until every sender is dropped.
pub async fn run_worker(mut rx: mpsc::UnboundedReceiver<DutyEvent>, notifier: Notifier) {
    while let Some(event) = rx.recv().await {
        handle_event(&notifier, event).await;
    }
    log::info!("🛑 Duty event worker stopped");
}

async fn handle_event(notifier: &Notifier, event: DutyEvent) {
    let now = Utc::now();

    let (label, duty, result) = match &event {
        DutyEvent::Created(duty) => ("created", duty, notifier.duty_created(duty, now).await),
        DutyEvent::Deleted(duty) => ("deleted", duty, notifier.duty_deleted(duty, now).await),
    };

    match result {
        Ok(report) if report.skipped_past => {
            log::debug!("⏭️ Duty '{}' {}: in the past, skipped", duty.name, label);
        }
        Ok(report) => {
            log::info!(
                "📬 Duty '{}' {}: {} of {} assignees notified",
                duty.name,
                label,
                report.sent,
                duty.assigned.len()
            );
        }
        // Notifier already logged the failure; no retry
        Err(_) => metrics::increment_notification_errors(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::duty::sample_duty;
    use crate::services::notification_service::testing::*;
    use crate::utils::dates;
    use crate::models::User;
    use crate::services::notification_service::UserDirectory;
    use crate::utils::{AppError, AppResult};
    use async_trait::async_trait;
    use chrono::Duration;
    use std::sync::Arc;

    struct DownDirectory;

    #[async_trait]
    impl UserDirectory for DownDirectory {
        async fn find_user(&self, _netid: &str) -> AppResult<Option<User>> {
            Err(AppError::DatabaseError("server selection timeout".into()))
        }
    }

    #[tokio::test]
    async fn test_worker_dispatches_events_in_order() {
        let sender = Arc::new(RecordingSender::default());
        let directory = directory_of(vec![
            resident("jd123", "Jane Doe", "5551234567"),
            resident("ab456", "Alex Brown", "5559876543"),
        ]);
        let notifier = Notifier::new(Arc::new(directory), sender.clone(), dates::utc_offset());

        let mut duty = sample_duty();
        duty.date.time = crate::models::chrono_to_bson(Utc::now() + Duration::days(3));

        let (events, rx) = DutyEvents::channel();
        events.publish(DutyEvent::Created(duty.clone()));
        events.publish(DutyEvent::Deleted(duty));
        drop(events);

        run_worker(rx, notifier).await;

        let sent = sender.sent.lock().unwrap();
        assert_eq!(sent.len(), 4);
        assert!(sent[0].body.contains("you have been assigned to"));
        assert!(sent[3].body.contains("you have been unassigned from"));
    }

    #[tokio::test]
    async fn test_failed_dispatch_is_counted() {
        let sender = Arc::new(RecordingSender::default());
        let notifier = Notifier::new(Arc::new(DownDirectory), sender.clone(), dates::utc_offset());

        let mut duty = sample_duty();
        duty.date.time = crate::models::chrono_to_bson(Utc::now() + Duration::days(3));

        let before = metrics::snapshot().notification_errors_total;
        handle_event(&notifier, DutyEvent::Created(duty)).await;

        assert!(metrics::snapshot().notification_errors_total > before);
        assert!(sender.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_publish_after_worker_stopped_does_not_panic() {
        let (events, rx) = DutyEvents::channel();
        drop(rx);
        events.publish(DutyEvent::Deleted(sample_duty()));
    }
}
