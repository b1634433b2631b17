//! Initial database migration.
//!
//! Creates the enums, users, events, participants and attachments tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(ENUMS_SQL).await?;
        db.execute_unprepared(USERS_SQL).await?;
        db.execute_unprepared(EVENTS_SQL).await?;
        db.execute_unprepared(EVENT_PARTICIPANTS_SQL).await?;
        db.execute_unprepared(EVENT_ATTACHMENTS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

const ENUMS_SQL: &str = r"
CREATE TYPE event_status AS ENUM ('ACTIVE', 'INACTIVE');
CREATE TYPE event_type AS ENUM ('SCHEDULED', 'LIVE', 'COMPLETED');
CREATE TYPE participant_type AS ENUM ('HOST', 'PARTICIPANT');
CREATE TYPE attachment_type AS ENUM ('BANNER', 'EVENT_IMAGE');
";

const USERS_SQL: &str = r"
CREATE TABLE users (
    id SERIAL PRIMARY KEY,
    username VARCHAR(150) NOT NULL UNIQUE,
    email VARCHAR(254) NOT NULL DEFAULT '',
    first_name VARCHAR(150) NOT NULL DEFAULT '',
    last_name VARCHAR(150) NOT NULL DEFAULT '',
    password_hash VARCHAR(255) NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    date_joined TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const EVENTS_SQL: &str = r"
CREATE TABLE events (
    id UUID PRIMARY KEY,
    title VARCHAR(255) NOT NULL,
    description TEXT,
    status event_status NOT NULL DEFAULT 'ACTIVE',
    activate_date TIMESTAMPTZ,
    deactivate_date TIMESTAMPTZ,
    type event_type NOT NULL DEFAULT 'SCHEDULED',
    scheduled_date TIMESTAMPTZ,
    active BOOLEAN NOT NULL DEFAULT TRUE,
    stream_session_id VARCHAR(100),
    created TIMESTAMPTZ NOT NULL DEFAULT now(),
    modified TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_events_title_not_blank CHECK (length(trim(title)) > 0)
);

CREATE INDEX idx_events_created ON events(created);
";

const EVENT_PARTICIPANTS_SQL: &str = r"
-- (event_id, user_id) is intentionally not unique
CREATE TABLE event_participants (
    id UUID PRIMARY KEY,
    event_id UUID NOT NULL REFERENCES events(id) ON DELETE CASCADE,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    active BOOLEAN NOT NULL DEFAULT TRUE,
    type participant_type NOT NULL DEFAULT 'PARTICIPANT',
    created TIMESTAMPTZ NOT NULL DEFAULT now(),
    modified TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_event_participants_event_user ON event_participants(event_id, user_id);
CREATE INDEX idx_event_participants_user ON event_participants(user_id);
";

const EVENT_ATTACHMENTS_SQL: &str = r"
CREATE TABLE event_attachments (
    id UUID PRIMARY KEY,
    event_id UUID NOT NULL REFERENCES events(id) ON DELETE CASCADE,
    attachment_cloud_id VARCHAR(100),
    attachment_name VARCHAR(100),
    type attachment_type NOT NULL DEFAULT 'EVENT_IMAGE',
    active BOOLEAN NOT NULL DEFAULT TRUE,
    created TIMESTAMPTZ NOT NULL DEFAULT now(),
    modified TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_event_attachments_event ON event_attachments(event_id);

-- At most one banner per event
CREATE UNIQUE INDEX unique_event_banner ON event_attachments(event_id) WHERE type = 'BANNER';
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS event_attachments CASCADE;
DROP TABLE IF EXISTS event_participants CASCADE;
DROP TABLE IF EXISTS events CASCADE;
DROP TABLE IF EXISTS users CASCADE;

DROP TYPE IF EXISTS attachment_type CASCADE;
DROP TYPE IF EXISTS participant_type CASCADE;
DROP TYPE IF EXISTS event_type CASCADE;
DROP TYPE IF EXISTS event_status CASCADE;
";
