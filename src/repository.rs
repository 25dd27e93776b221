use crate::models::{
    AdminDashboardStats, CreateEventRequest, CreateSponsorRequest, Donation,
    DonationWebhookPayload, Donor, Event, Signup, Sponsor, UpdateEventRequest,
    UpdateSponsorRequest, User,
};
use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Repository Trait
///
/// Defines the abstract contract for all persistence operations. This is the core
/// of the Repository Abstraction pattern, allowing the handlers to interact with
/// the data layer without knowing the specific implementation (Postgres, Mock, etc.).
///
/// **Send + Sync + async_trait** are required to make the trait object (`Arc<dyn Repository>`)
/// safely shareable and usable across Axum's asynchronous task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Donors ---
    // Public wall listing. Must enforce is_public=true and order by total descending.
    async fn get_public_donors(&self) -> Vec<Donor>;
    // Admin/board access: retrieves all donors including anonymous ones.
    async fn get_all_donors(&self) -> Vec<Donor>;
    // Webhook flow: upserts the donor by email, appends a donation row and
    // bumps the cumulative total in a single statement.
    async fn record_donation(&self, payload: DonationWebhookPayload) -> Option<Donation>;

    // --- Sponsors ---
    // Public wall listing. Must enforce is_active=true and order by total descending.
    async fn get_active_sponsors(&self) -> Vec<Sponsor>;
    async fn get_all_sponsors(&self) -> Vec<Sponsor>;
    async fn create_sponsor(&self, req: CreateSponsorRequest) -> Sponsor;
    // Partial update via COALESCE; returns None when the sponsor does not exist.
    async fn update_sponsor(&self, id: Uuid, req: UpdateSponsorRequest) -> Option<Sponsor>;
    async fn delete_sponsor(&self, id: Uuid) -> bool;
    // Record-keeping flow: adds a payment to the cumulative sponsorship total.
    async fn record_sponsorship(&self, id: Uuid, amount: Decimal) -> Option<Sponsor>;

    // --- Events ---
    // Public listing: published events only.
    async fn get_published_events(&self) -> Vec<Event>;
    // Published events that have not started yet, soonest first.
    async fn get_upcoming_events(&self) -> Vec<Event>;
    // Admin access: any event regardless of publication status.
    async fn get_event(&self, id: Uuid) -> Option<Event>;
    // Public detail view: only if published.
    async fn get_published_event(&self, id: Uuid) -> Option<Event>;
    async fn create_event(&self, req: CreateEventRequest) -> Event;
    async fn update_event(&self, id: Uuid, req: UpdateEventRequest) -> Option<Event>;
    async fn delete_event(&self, id: Uuid) -> bool;
    // Admin action: publishes or retracts an event.
    async fn set_event_published(&self, id: Uuid, is_published: bool) -> Option<Event>;

    // --- Volunteer Signups ---
    // Idempotent operation: returns true if a row was inserted, false otherwise (conflict).
    async fn signup_for_event(&self, signup: Signup) -> bool;
    async fn withdraw_signup(&self, signup: Signup) -> bool;
    async fn get_my_signups(&self, user_id: Uuid) -> Vec<Event>;
    async fn get_event_volunteers(&self, event_id: Uuid) -> Vec<User>;
    async fn count_signups(&self, event_id: Uuid) -> i64;

    // --- User/Auth ---
    async fn get_user(&self, id: Uuid) -> Option<User>;
    async fn create_user(&self, user: User) -> User;

    // --- Dashboards ---
    async fn get_admin_stats(&self) -> AdminDashboardStats;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer access across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by the PostgreSQL database.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    // --- DONORS ---

    /// get_public_donors
    ///
    /// **Security**: Strictly enforces `WHERE is_public = true` so anonymous donors
    /// never leak onto the wall. Ordered by cumulative total so the wall renders
    /// highest tiers first.
    async fn get_public_donors(&self) -> Vec<Donor> {
        sqlx::query_as::<_, Donor>(
            r#"
            SELECT id, name, email, total_donated, is_public, created_at, updated_at
            FROM donors
            WHERE is_public = true
            ORDER BY total_donated DESC, name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("get_public_donors error: {:?}", e);
            vec![]
        })
    }

    /// get_all_donors
    ///
    /// Administrative/board function to retrieve all donor records.
    /// **Note**: Does *not* include the `WHERE is_public = true` restriction.
    async fn get_all_donors(&self) -> Vec<Donor> {
        sqlx::query_as::<_, Donor>(
            r#"
            SELECT id, name, email, total_donated, is_public, created_at, updated_at
            FROM donors
            ORDER BY total_donated DESC, name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("get_all_donors error: {:?}", e);
            vec![]
        })
    }

    /// record_donation
    ///
    /// Uses a CTE (Common Table Expression) to upsert the donor and append the
    /// donation row in one atomic statement. The donor's cumulative total is bumped
    /// by the donation amount on conflict; a brand-new donor starts at the amount.
    async fn record_donation(&self, payload: DonationWebhookPayload) -> Option<Donation> {
        sqlx::query_as::<_, Donation>(
            r#"
            WITH donor AS (
                INSERT INTO donors (id, name, email, total_donated, is_public, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, NOW(), NOW())
                ON CONFLICT (email) DO UPDATE
                    SET total_donated = donors.total_donated + EXCLUDED.total_donated,
                        name = EXCLUDED.name,
                        updated_at = NOW()
                RETURNING id
            )
            INSERT INTO donations (id, donor_id, amount, received_at)
            SELECT $6, donor.id, $4, NOW() FROM donor
            RETURNING id, donor_id, amount, received_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(payload.donor_name)
        .bind(payload.donor_email)
        .bind(payload.amount)
        .bind(!payload.anonymous)
        .bind(Uuid::new_v4())
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("record_donation error: {:?}", e);
            None
        })
    }

    // --- SPONSORS ---

    /// get_active_sponsors
    ///
    /// **Security**: Enforces `WHERE is_active = true` for the public wall.
    async fn get_active_sponsors(&self) -> Vec<Sponsor> {
        sqlx::query_as::<_, Sponsor>(
            r#"
            SELECT id, organization, website, total_sponsored, is_active, created_at, updated_at
            FROM sponsors
            WHERE is_active = true
            ORDER BY total_sponsored DESC, organization ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("get_active_sponsors error: {:?}", e);
            vec![]
        })
    }

    /// get_all_sponsors
    ///
    /// Board/admin listing including retired sponsors.
    async fn get_all_sponsors(&self) -> Vec<Sponsor> {
        sqlx::query_as::<_, Sponsor>(
            r#"
            SELECT id, organization, website, total_sponsored, is_active, created_at, updated_at
            FROM sponsors
            ORDER BY total_sponsored DESC, organization ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("get_all_sponsors error: {:?}", e);
            vec![]
        })
    }

    /// create_sponsor
    ///
    /// Inserts a new sponsor with a zero running total. Sponsors start active.
    async fn create_sponsor(&self, req: CreateSponsorRequest) -> Sponsor {
        sqlx::query_as::<_, Sponsor>(
            r#"
            INSERT INTO sponsors (id, organization, website, total_sponsored, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, 0, true, NOW(), NOW())
            RETURNING id, organization, website, total_sponsored, is_active, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(req.organization)
        .bind(req.website)
        .fetch_one(&self.pool)
        .await
        .expect("Failed to insert sponsor")
    }

    /// update_sponsor
    ///
    /// Uses the PostgreSQL `COALESCE` function to efficiently handle `Option<T>` fields,
    /// only updating a column if the corresponding field in `req` is `Some`.
    async fn update_sponsor(&self, id: Uuid, req: UpdateSponsorRequest) -> Option<Sponsor> {
        sqlx::query_as::<_, Sponsor>(
            r#"
            UPDATE sponsors
            SET organization = COALESCE($2, organization),
                website = COALESCE($3, website),
                is_active = COALESCE($4, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, organization, website, total_sponsored, is_active, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(req.organization)
        .bind(req.website)
        .bind(req.is_active)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("update_sponsor error: {:?}", e);
            None
        })
    }

    /// delete_sponsor
    async fn delete_sponsor(&self, id: Uuid) -> bool {
        match sqlx::query("DELETE FROM sponsors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
        {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("delete_sponsor error: {:?}", e);
                false
            }
        }
    }

    /// record_sponsorship
    ///
    /// Adds a payment amount to the sponsor's cumulative total. The tier shown on
    /// the wall follows automatically from the classifier reading the new total.
    async fn record_sponsorship(&self, id: Uuid, amount: Decimal) -> Option<Sponsor> {
        sqlx::query_as::<_, Sponsor>(
            r#"
            UPDATE sponsors
            SET total_sponsored = total_sponsored + $2,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, organization, website, total_sponsored, is_active, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(amount)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("record_sponsorship error: {:?}", e);
            None
        })
    }

    // --- EVENTS ---

    /// get_published_events
    ///
    /// **Security**: Enforces `WHERE is_published = true` for anonymous listings.
    async fn get_published_events(&self) -> Vec<Event> {
        sqlx::query_as::<_, Event>(
            r#"
            SELECT id, title, description, location, starts_at, capacity, is_published, created_at, updated_at
            FROM events
            WHERE is_published = true
            ORDER BY starts_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("get_published_events error: {:?}", e);
            vec![]
        })
    }

    /// get_upcoming_events
    ///
    /// Published events that have not started yet, soonest first. Feeds the
    /// volunteer dashboard and the board's upcoming-event count.
    async fn get_upcoming_events(&self) -> Vec<Event> {
        sqlx::query_as::<_, Event>(
            r#"
            SELECT id, title, description, location, starts_at, capacity, is_published, created_at, updated_at
            FROM events
            WHERE is_published = true AND starts_at > NOW()
            ORDER BY starts_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("get_upcoming_events error: {:?}", e);
            vec![]
        })
    }

    /// get_event
    ///
    /// Simple retrieval of any event by ID (no publication check). Primarily for
    /// administrative use when visibility has already been determined by the caller.
    async fn get_event(&self, id: Uuid) -> Option<Event> {
        sqlx::query_as::<_, Event>(
            r#"
            SELECT id, title, description, location, starts_at, capacity, is_published, created_at, updated_at
            FROM events
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("get_event error: {:?}", e);
            None
        })
    }

    /// get_published_event
    ///
    /// Retrieves an event *only* if it is published. Used by the public detail
    /// handler and the signup flow.
    async fn get_published_event(&self, id: Uuid) -> Option<Event> {
        sqlx::query_as::<_, Event>(
            r#"
            SELECT id, title, description, location, starts_at, capacity, is_published, created_at, updated_at
            FROM events
            WHERE id = $1 AND is_published = true
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("get_published_event error: {:?}", e);
            None
        })
    }

    /// create_event
    ///
    /// Inserts a new event. All new events are set to `is_published = false` by default,
    /// requiring an explicit publish action before volunteers can see them.
    async fn create_event(&self, req: CreateEventRequest) -> Event {
        sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (id, title, description, location, starts_at, capacity, is_published, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, false, NOW(), NOW())
            RETURNING id, title, description, location, starts_at, capacity, is_published, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(req.title)
        .bind(req.description)
        .bind(req.location)
        .bind(req.starts_at)
        .bind(req.capacity)
        .fetch_one(&self.pool)
        .await
        .expect("Failed to insert event")
    }

    /// update_event
    ///
    /// COALESCE-based partial update, mirroring the sponsor update.
    async fn update_event(&self, id: Uuid, req: UpdateEventRequest) -> Option<Event> {
        sqlx::query_as::<_, Event>(
            r#"
            UPDATE events
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                location = COALESCE($4, location),
                starts_at = COALESCE($5, starts_at),
                capacity = COALESCE($6, capacity),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, description, location, starts_at, capacity, is_published, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(req.title)
        .bind(req.description)
        .bind(req.location)
        .bind(req.starts_at)
        .bind(req.capacity)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("update_event error: {:?}", e);
            None
        })
    }

    /// delete_event
    ///
    /// Signup rows go with it via the ON DELETE CASCADE on event_signups.
    async fn delete_event(&self, id: Uuid) -> bool {
        match sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
        {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("delete_event error: {:?}", e);
                false
            }
        }
    }

    /// set_event_published
    ///
    /// Updates the `is_published` flag. Used by the admin publish handler.
    async fn set_event_published(&self, id: Uuid, is_published: bool) -> Option<Event> {
        sqlx::query_as::<_, Event>(
            r#"
            UPDATE events
            SET is_published = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, description, location, starts_at, capacity, is_published, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(is_published)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("set_event_published error: {:?}", e);
            None
        })
    }

    // --- VOLUNTEER SIGNUPS ---

    /// signup_for_event
    ///
    /// Inserts a volunteer signup. Uses `ON CONFLICT DO NOTHING` to ensure **idempotency**.
    /// The function returns true only if a new row was inserted (`rows_affected > 0`).
    async fn signup_for_event(&self, signup: Signup) -> bool {
        let result =
            sqlx::query("INSERT INTO event_signups (event_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING")
                .bind(signup.event_id)
                .bind(signup.user_id)
                .execute(&self.pool)
                .await;
        match result {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                // A true conflict (double signup) does not error, only database errors are caught here.
                tracing::error!("signup_for_event error: {:?}", e);
                false
            }
        }
    }

    /// withdraw_signup
    ///
    /// Deletes the signup row only if it belongs to the given user.
    async fn withdraw_signup(&self, signup: Signup) -> bool {
        match sqlx::query("DELETE FROM event_signups WHERE event_id = $1 AND user_id = $2")
            .bind(signup.event_id)
            .bind(signup.user_id)
            .execute(&self.pool)
            .await
        {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("withdraw_signup error: {:?}", e);
                false
            }
        }
    }

    /// get_my_signups
    ///
    /// Retrieves all events the user has signed up for, soonest first.
    async fn get_my_signups(&self, user_id: Uuid) -> Vec<Event> {
        sqlx::query_as::<_, Event>(
            r#"
            SELECT e.id, e.title, e.description, e.location, e.starts_at, e.capacity, e.is_published, e.created_at, e.updated_at
            FROM events e
            JOIN event_signups s ON e.id = s.event_id
            WHERE s.user_id = $1
            ORDER BY e.starts_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("get_my_signups error: {:?}", e);
            vec![]
        })
    }

    /// get_event_volunteers
    ///
    /// Roster for an event: all signed-up profiles, used by the admin roster view.
    async fn get_event_volunteers(&self, event_id: Uuid) -> Vec<User> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT p.id, p.email, p.role
            FROM profiles p
            JOIN event_signups s ON p.id = s.user_id
            WHERE s.event_id = $1
            ORDER BY p.email ASC
            "#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("get_event_volunteers error: {:?}", e);
            vec![]
        })
    }

    /// count_signups
    ///
    /// Number of volunteers currently signed up, checked against capacity
    /// before accepting a new signup.
    async fn count_signups(&self, event_id: Uuid) -> i64 {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM event_signups WHERE event_id = $1")
            .bind(event_id)
            .fetch_one(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("count_signups error: {:?}", e);
                0
            })
    }

    // --- USERS ---

    /// get_user
    ///
    /// Retrieves user profile data (ID, email, role) needed for authentication and authorization.
    async fn get_user(&self, id: Uuid) -> Option<User> {
        sqlx::query_as::<_, User>("SELECT id, email, role FROM profiles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or(None)
    }

    /// create_user
    ///
    /// Creates the mirroring profile record in `public.profiles` after external auth success.
    async fn create_user(&self, user: User) -> User {
        sqlx::query_as::<_, User>(
            "INSERT INTO profiles (id, email, role) VALUES ($1, $2, $3) RETURNING id, email, role",
        )
        .bind(user.id)
        .bind(user.email)
        .bind(user.role)
        .fetch_one(&self.pool)
        .await
        .expect("Failed to create user")
    }

    // --- DASHBOARDS ---

    /// get_admin_stats
    ///
    /// Compiles all necessary counters for the administrative dashboard in a single call.
    async fn get_admin_stats(&self) -> AdminDashboardStats {
        let total_donors = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM donors")
            .fetch_one(&self.pool)
            .await
            .unwrap_or(0);
        let total_sponsors = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM sponsors")
            .fetch_one(&self.pool)
            .await
            .unwrap_or(0);
        let total_events = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM events")
            .fetch_one(&self.pool)
            .await
            .unwrap_or(0);
        let total_signups = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM event_signups")
            .fetch_one(&self.pool)
            .await
            .unwrap_or(0);
        let total_raised =
            sqlx::query_scalar::<_, Decimal>("SELECT COALESCE(SUM(amount), 0) FROM donations")
                .fetch_one(&self.pool)
                .await
                .unwrap_or_else(|e| {
                    tracing::error!("get_admin_stats total_raised error: {:?}", e);
                    Decimal::ZERO
                });
        AdminDashboardStats {
            total_donors,
            total_sponsors,
            total_events,
            total_signups,
            total_raised,
        }
    }
}
