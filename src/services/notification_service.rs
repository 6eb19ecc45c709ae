// ==================== DUTY NOTIFICATIONS ====================
// Envia SMS para cada residente quando uma duty é criada ou removida.
// Sem retry e sem idempotência: reprocessar um evento reenvia as mensagens.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use std::sync::Arc;

use crate::{
    api::metrics,
    database::MongoDB,
    models::{Duty, User},
    services::user_service,
    twilio::{MessageSender, OutboundMessage},
    utils::{dates, phone, AppError, AppResult},
};

/// Lookup de usuários usado pelo dispatch (MongoDB em produção)
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_user(&self, netid: &str) -> AppResult<Option<User>>;
}

#[async_trait]
impl UserDirectory for MongoDB {
    async fn find_user(&self, netid: &str) -> AppResult<Option<User>> {
        user_service::get_user(self, netid).await
    }
}

pub fn assigned_message(
    recipient: &User,
    duty: &Duty,
    co_assignees: &[&User],
    offset: FixedOffset,
) -> String {
    let mut msg = format!(
        "Hi {}, you have been assigned to \"{}\" on {}",
        recipient.first_name(),
        duty.name,
        dates::format_long(&duty.time(), offset)
    );

    for other in co_assignees {
        msg.push('\n');
        msg.push_str(&other.name);
    }

    msg
}

pub fn unassigned_message(recipient: &User, duty: &Duty, offset: FixedOffset) -> String {
    format!(
        "Hi {}, you have been unassigned from \"{}\" on {}",
        recipient.first_name(),
        duty.name,
        dates::format_long(&duty.time(), offset)
    )
}

#[derive(Debug, Default, PartialEq)]
pub struct DispatchReport {
    pub sent: usize,
    /// Duty date already passed; nothing sent
    pub skipped_past: bool,
    /// netid whose record was missing; dispatch stopped there
    pub stopped_at: Option<String>,
}

#[derive(Clone)]
pub struct Notifier {
    directory: Arc<dyn UserDirectory>,
    sender: Arc<dyn MessageSender>,
    offset: FixedOffset,
}

impl Notifier {
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        sender: Arc<dyn MessageSender>,
        offset: FixedOffset,
    ) -> Self {
        Self {
            directory,
            sender,
            offset,
        }
    }

    /// Notifies every assignee of a new duty, listing the co-assignees.
    pub async fn duty_created(&self, duty: &Duty, now: DateTime<Utc>) -> AppResult<DispatchReport> {
        if duty.is_past(now) {
            log::debug!("⏭️ Duty '{}' is in the past, not notifying", duty.name);
            return Ok(DispatchReport {
                skipped_past: true,
                ..Default::default()
            });
        }

        let result = self.notify_created(duty).await;
        if let Err(e) = &result {
            log::error!("❌ Error notifying users on duty creation: {}", e);
        }
        result
    }

    async fn notify_created(&self, duty: &Duty) -> AppResult<DispatchReport> {
        let lookups = duty
            .assigned
            .iter()
            .map(|netid| self.directory.find_user(netid));
        let users = futures::future::try_join_all(lookups).await?;

        let mut report = DispatchReport::default();

        for (netid, user) in duty.assigned.iter().zip(users.iter()) {
            let Some(user) = user else {
                log::warn!("⚠️ User '{}' not found, stopping notifications for '{}'", netid, duty.name);
                report.stopped_at = Some(netid.clone());
                return Ok(report);
            };

            let co_assignees: Vec<&User> = users
                .iter()
                .flatten()
                .filter(|u| u.netid != user.netid)
                .collect();

            let body = assigned_message(user, duty, &co_assignees, self.offset);
            self.deliver(user, body).await?;
            report.sent += 1;
        }

        Ok(report)
    }

    /// Notifies every assignee that a duty was removed.
    pub async fn duty_deleted(&self, duty: &Duty, now: DateTime<Utc>) -> AppResult<DispatchReport> {
        if duty.is_past(now) {
            log::debug!("⏭️ Deleted duty '{}' is in the past, not notifying", duty.name);
            return Ok(DispatchReport {
                skipped_past: true,
                ..Default::default()
            });
        }

        let result = self.notify_deleted(duty).await;
        if let Err(e) = &result {
            log::error!("❌ Error notifying users on duty deletion: {}", e);
        }
        result
    }

    async fn notify_deleted(&self, duty: &Duty) -> AppResult<DispatchReport> {
        let mut report = DispatchReport::default();

        for netid in &duty.assigned {
            let Some(user) = self.directory.find_user(netid).await? else {
                log::warn!("⚠️ User '{}' not found, stopping notifications for '{}'", netid, duty.name);
                report.stopped_at = Some(netid.clone());
                return Ok(report);
            };

            let body = unassigned_message(&user, duty, self.offset);
            self.deliver(&user, body).await?;
            report.sent += 1;
        }

        Ok(report)
    }

    async fn deliver(&self, user: &User, body: String) -> AppResult<()> {
        let message = OutboundMessage {
            to: phone::to_e164(&user.phone),
            body,
        };

        log::debug!("📤 {}", message.body);

        match self.sender.send(&message).await {
            Ok(sent) => {
                metrics::increment_sms_sent();
                log::info!(
                    "📨 SMS to {} {} ({})",
                    user.netid,
                    sent.status.as_deref().unwrap_or("queued"),
                    sent.sid
                );
                Ok(())
            }
            Err(e) => {
                metrics::increment_sms_failed();
                Err(AppError::MessagingError(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::twilio::{SentMessage, TwilioError};
    use std::collections::HashMap;
    use std::sync::Mutex;

    pub struct FakeDirectory(pub HashMap<String, User>);

    #[async_trait]
    impl UserDirectory for FakeDirectory {
        async fn find_user(&self, netid: &str) -> AppResult<Option<User>> {
            Ok(self.0.get(netid).cloned())
        }
    }

    /// Records messages; fails for numbers listed in `fail_for`
    #[derive(Default)]
    pub struct RecordingSender {
        pub sent: Mutex<Vec<OutboundMessage>>,
        pub fail_for: Vec<String>,
    }

    #[async_trait]
    impl MessageSender for RecordingSender {
        async fn send(&self, message: &OutboundMessage) -> Result<SentMessage, TwilioError> {
            if self.fail_for.contains(&message.to) {
                return Err(TwilioError {
                    message: "Invalid 'To' number".into(),
                    code: Some(21211),
                    status: Some(400),
                });
            }
            self.sent.lock().unwrap().push(message.clone());
            Ok(SentMessage {
                sid: "SM-test".into(),
                status: Some("queued".into()),
            })
        }
    }

    pub fn resident(netid: &str, name: &str, phone: &str) -> User {
        User {
            netid: netid.into(),
            name: name.into(),
            phone: phone.into(),
            is_admin: false,
            assigns: vec![],
        }
    }

    pub fn directory_of(users: Vec<User>) -> FakeDirectory {
        FakeDirectory(users.into_iter().map(|u| (u.netid.clone(), u)).collect())
    }
}
