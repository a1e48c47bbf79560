// src/notify/adoption.rs
// Decides which confirmation email, if any, follows an update and sends it

use std::sync::Arc;
use tracing::{info, warn};

use super::mailer::{MailError, MailMessage, MailTemplate, Mailer};
use crate::geocoding::Geocoder;
use crate::things::{Thing, ThingSnapshot};
use crate::users::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationDecision {
    None,
    FirstAdoption,
    RepeatAdoption,
}

impl NotificationDecision {
    /// Pick the notification for `user` given the owner before and after the update.
    ///
    /// `other_owned` counts the user's drains excluding the one being updated.
    pub fn decide(before: &ThingSnapshot, after: &ThingSnapshot, user: &User, other_owned: i64) -> Self {
        let adopted_now = after.user_id == Some(user.id);
        let owned_before = before.user_id == Some(user.id);

        match (adopted_now, owned_before) {
            (true, false) if other_owned <= 0 => NotificationDecision::FirstAdoption,
            (true, false) => NotificationDecision::RepeatAdoption,
            _ => NotificationDecision::None,
        }
    }

    pub fn template(&self) -> Option<MailTemplate> {
        match self {
            NotificationDecision::None => None,
            NotificationDecision::FirstAdoption => Some(MailTemplate::FirstAdoptionConfirmation),
            NotificationDecision::RepeatAdoption => Some(MailTemplate::SecondAdoptionConfirmation),
        }
    }
}

pub fn subject_for(template: MailTemplate, user_name: &str) -> String {
    match template {
        MailTemplate::FirstAdoptionConfirmation => format!("Thanks for adopting a drain, {user_name}!"),
        MailTemplate::SecondAdoptionConfirmation => format!("Thanks for adopting another drain, {user_name}!"),
    }
}

pub struct AdoptionNotifier {
    mailer: Arc<dyn Mailer>,
    geocoder: Arc<dyn Geocoder>,
    from: String,
}

impl AdoptionNotifier {
    pub fn new(mailer: Arc<dyn Mailer>, geocoder: Arc<dyn Geocoder>, from: impl Into<String>) -> Self {
        Self {
            mailer,
            geocoder,
            from: from.into(),
        }
    }

    /// Send at most one confirmation for this update. Returns what was decided.
    pub async fn after_update(
        &self,
        before: &ThingSnapshot,
        thing: &Thing,
        user: &User,
        other_owned: i64,
    ) -> Result<NotificationDecision, MailError> {
        let decision = NotificationDecision::decide(before, &thing.snapshot(), user, other_owned);
        self.send(decision, thing, user).await?;
        Ok(decision)
    }

    /// Deliver the email for an already-made decision. `None` sends nothing.
    pub async fn send(&self, decision: NotificationDecision, thing: &Thing, user: &User) -> Result<(), MailError> {
        let Some(template) = decision.template() else {
            return Ok(());
        };

        let message = MailMessage {
            to: vec![user.email.clone()],
            from: self.from.clone(),
            subject: subject_for(template, &user.name),
            body: self.render_body(template, thing, user).await,
            template,
        };
        self.mailer.deliver(message).await?;

        info!(thing_id = thing.id, user_id = user.id, template = %template, "Adoption confirmation sent");
        Ok(())
    }

    async fn render_body(&self, template: MailTemplate, thing: &Thing, user: &User) -> String {
        let place = match self.geocoder.reverse_geocode(thing.coordinate()).await {
            Ok(location) => location.formatted_address,
            Err(e) => {
                warn!(thing_id = thing.id, "Reverse geocoding failed, using coordinates: {}", e);
                thing.coordinate().to_string()
            }
        };

        let opening = match template {
            MailTemplate::FirstAdoptionConfirmation => "Thank you for adopting your first drain",
            MailTemplate::SecondAdoptionConfirmation => "Thank you for adopting another drain",
        };

        format!(
            "Hi {},\n\n{}, \"{}\", near {}.\n\n\
             Please keep it clear of leaves, trash and snow so rain can flow freely.\n",
            user.name,
            opening,
            thing.display_name(),
            place
        )
    }
}
