//! Event repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::database::store::EventStore;
use crate::models::event::{CreateEventRequest, Event, UpdateEventRequest};
use crate::utils::errors::Result;

const EVENT_COLUMNS: &str = "id, title, description, event_date, event_time, location, attendee_ids, created_at, updated_at";

#[derive(FromRow)]
struct EventRow {
    id: i64,
    title: String,
    description: Option<String>,
    event_date: DateTime<Utc>,
    event_time: Option<String>,
    location: Option<String>,
    attendee_ids: Vec<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Event {
            id: row.id,
            title: row.title,
            description: row.description,
            date: row.event_date,
            time: row.event_time,
            location: row.location,
            attendees: row.attendee_ids,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Clone)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventStore for EventRepository {
    /// Create a new event
    async fn create(&self, request: CreateEventRequest) -> Result<Event> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            r#"
            INSERT INTO events (title, description, event_date, event_time, location, attendee_ids, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(request.title)
        .bind(request.description)
        .bind(request.date)
        .bind(request.time)
        .bind(request.location)
        .bind(request.attendees)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    /// Find event by ID
    async fn find_by_id(&self, id: i64) -> Result<Option<Event>> {
        let row = sqlx::query_as::<_, EventRow>(&format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Event::from))
    }

    async fn list(&self, since: Option<DateTime<Utc>>) -> Result<Vec<Event>> {
        let rows = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE ($1::TIMESTAMPTZ IS NULL OR event_date >= $1) ORDER BY event_date ASC, id ASC"
        ))
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Event::from).collect())
    }

    /// Update event
    async fn update(&self, id: i64, request: UpdateEventRequest) -> Result<Option<Event>> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            r#"
            UPDATE events
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                event_date = COALESCE($4, event_date),
                event_time = COALESCE($5, event_time),
                location = COALESCE($6, location),
                attendee_ids = COALESCE($7, attendee_ids),
                updated_at = $8
            WHERE id = $1
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(request.title)
        .bind(request.description)
        .bind(request.date)
        .bind(request.time)
        .bind(request.location)
        .bind(request.attendees)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Event::from))
    }

    /// Delete event
    async fn delete(&self, id: i64) -> Result<bool> {
        let deleted = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }
}
