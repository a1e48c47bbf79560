// src/things/service.rs
// The update flow: validate, persist, re-read, notify

use std::sync::Arc;
use tracing::{info, warn};

use super::store::ThingRepository;
use super::types::{Thing, ThingPatch, ThingSnapshot};
use crate::error::{FieldErrors, RepoError};
use crate::notify::{AdoptionNotifier, NotificationDecision};
use crate::users::{User, UserRepository};

pub const MAX_ADOPTED_NAME_CHARS: usize = 64;

#[derive(Debug, Clone)]
pub struct UpdateOutcome {
    pub thing: Thing,
    /// Which confirmation the update called for, whether or not it went out.
    pub notification: NotificationDecision,
    /// True only when a confirmation email was handed to the mailer.
    pub delivered: bool,
}

pub struct ThingService {
    things: Arc<dyn ThingRepository>,
    users: Arc<dyn UserRepository>,
    notifier: Arc<AdoptionNotifier>,
}

impl ThingService {
    pub fn new(
        things: Arc<dyn ThingRepository>,
        users: Arc<dyn UserRepository>,
        notifier: Arc<AdoptionNotifier>,
    ) -> Self {
        Self { things, users, notifier }
    }

    /// Apply `patch` to drain `id`.
    ///
    /// A rejected patch or save leaves the drain untouched and sends nothing.
    /// Notification runs only after the save succeeded, and its failures are
    /// logged rather than returned.
    pub async fn update(&self, id: i64, patch: &ThingPatch) -> Result<UpdateOutcome, RepoError> {
        let current = self.things.get(id).await?;
        self.validate(patch).await?;

        let before = current.snapshot();
        let mut next = current;
        next.apply(patch);
        self.things.save(&next).await?;

        let thing = self.things.get(id).await?;
        info!(thing_id = id, user_id = ?thing.user_id, "Drain updated");

        let (notification, delivered) = match self.plan_notification(&before, &thing).await {
            Ok(None) => (NotificationDecision::None, false),
            Ok(Some((decision, owner))) => match self.notifier.send(decision, &thing, &owner).await {
                Ok(()) => (decision, decision != NotificationDecision::None),
                Err(e) => {
                    warn!(thing_id = id, ?decision, "Adoption notification failed: {}", e);
                    (decision, false)
                }
            },
            Err(e) => {
                warn!(thing_id = id, "Could not prepare adoption notification: {}", e);
                (NotificationDecision::None, false)
            }
        };

        Ok(UpdateOutcome { thing, notification, delivered })
    }

    async fn validate(&self, patch: &ThingPatch) -> Result<(), RepoError> {
        let mut errors = FieldErrors::new();

        if let Some(Some(name)) = &patch.adopted_name {
            if name.trim().chars().count() > MAX_ADOPTED_NAME_CHARS {
                errors.add(
                    "adopted_name",
                    format!("is too long (maximum is {MAX_ADOPTED_NAME_CHARS} characters)"),
                );
            }
        }

        if let Some(Some(user_id)) = patch.user_id {
            match self.users.get(user_id).await {
                Ok(_) => {}
                Err(RepoError::NotFound { .. }) => errors.add("user_id", "does not exist"),
                Err(e) => return Err(e),
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(RepoError::Validation(errors))
        }
    }

    /// The new owner and the notification they are due, if the owner changed.
    async fn plan_notification(
        &self,
        before: &ThingSnapshot,
        thing: &Thing,
    ) -> Result<Option<(NotificationDecision, User)>, RepoError> {
        let Some(owner_id) = thing.user_id else {
            return Ok(None);
        };
        if before.user_id == Some(owner_id) {
            return Ok(None);
        }

        let owner = self.users.get(owner_id).await?;
        let other_owned = (self.things.count_owned_by(owner_id).await? - 1).max(0);
        let decision = NotificationDecision::decide(before, &thing.snapshot(), &owner, other_owned);
        Ok(Some((decision, owner)))
    }
}
