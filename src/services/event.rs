//! Event service implementation

use chrono::{DateTime, Utc};
use tracing::info;

use crate::database::DatabaseService;
use crate::models::*;
use crate::utils::errors::{ChurchAdminError, Result};
use crate::utils::helpers::normalize_optional;
use crate::utils::logging::log_admin_action;

#[derive(Clone)]
pub struct EventService {
    db: DatabaseService,
}

impl EventService {
    pub fn new(db: DatabaseService) -> Self {
        Self { db }
    }

    pub async fn create(&self, request: CreateEventRequest, actor_id: i64) -> Result<Event> {
        let title = request.title.trim().to_string();
        if title.is_empty() {
            return Err(ChurchAdminError::validation("title is required"));
        }

        let event = self
            .db
            .events
            .create(CreateEventRequest {
                title,
                description: normalize_optional(request.description),
                time: normalize_optional(request.time),
                location: normalize_optional(request.location),
                attendees: dedup(request.attendees),
                date: request.date,
            })
            .await?;

        info!(event_id = event.id, date = %event.date, user_id = actor_id, "Event created");
        Ok(event)
    }

    /// Events ascending by date; with `upcoming_only`, only those at or after `now`
    pub async fn list(&self, upcoming_only: bool, now: DateTime<Utc>) -> Result<Vec<Event>> {
        self.db.events.list(upcoming_only.then_some(now)).await
    }

    pub async fn update(&self, id: i64, request: UpdateEventRequest, actor_id: i64) -> Result<Event> {
        let mut request = request;
        if let Some(title) = request.title.take() {
            let title = title.trim().to_string();
            if title.is_empty() {
                return Err(ChurchAdminError::validation("title cannot be empty"));
            }
            request.title = Some(title);
        }
        request.attendees = request.attendees.map(dedup);

        let event = self
            .db
            .events
            .update(id, request)
            .await?
            .ok_or_else(|| ChurchAdminError::not_found("Event", id))?;

        info!(event_id = event.id, user_id = actor_id, "Event updated");
        Ok(event)
    }

    pub async fn delete(&self, id: i64, actor_id: i64) -> Result<()> {
        if !self.db.events.delete(id).await? {
            return Err(ChurchAdminError::not_found("Event", id));
        }
        log_admin_action(actor_id, "delete_event", Some(&id.to_string()), None);
        Ok(())
    }
}

/// Keep the first occurrence of each attendee id
fn dedup(ids: Vec<i64>) -> Vec<i64> {
    let mut seen = std::collections::HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}
