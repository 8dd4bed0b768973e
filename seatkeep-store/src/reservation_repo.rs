use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;
use seatkeep_core::{
    ConflictScope, Reservation, ReservationStatus, Seat, SeatRepository, Store, StoreError, StoreTx,
    TimeWindow, User, UserRepository,
};

/// Postgres-backed store. Row locks (`FOR UPDATE`) taken inside a
/// transaction serialize writers on the same seat, user or reservation,
/// across every process sharing the database.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal structs for type-safe querying
#[derive(sqlx::FromRow)]
struct SeatRow {
    id: Uuid,
    number: String,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    name: String,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct ReservationRow {
    id: Uuid,
    user_id: Uuid,
    seat_id: Uuid,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    checked_in: bool,
    created_at: DateTime<Utc>,
}

impl From<SeatRow> for Seat {
    fn from(row: SeatRow) -> Self {
        Seat { id: row.id, number: row.number }
    }
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User { id: row.id, email: row.email, name: row.name, created_at: row.created_at }
    }
}

impl From<ReservationRow> for Reservation {
    fn from(row: ReservationRow) -> Self {
        Reservation {
            id: row.id,
            user_id: row.user_id,
            seat_id: row.seat_id,
            window: TimeWindow::new(row.start_time, row.end_time),
            status: if row.checked_in {
                ReservationStatus::Confirmed
            } else {
                ReservationStatus::Unconfirmed
            },
            created_at: row.created_at,
        }
    }
}

const RESERVATION_COLUMNS: &str =
    "id, user_id, seat_id, start_time, end_time, checked_in, created_at";

fn store_error(e: sqlx::Error) -> StoreError {
    match e.as_database_error() {
        Some(db) if db.is_unique_violation() => StoreError::Duplicate(db.message().to_string()),
        _ => StoreError::Unavailable(e.to_string()),
    }
}

#[async_trait]
impl Store for PgStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>, StoreError> {
        let tx = self.pool.begin().await.map_err(store_error)?;
        Ok(Box::new(PgTx { tx }))
    }
}

/// Rolled back by sqlx when dropped uncommitted.
struct PgTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTx for PgTx {
    async fn find_seat_by_number(&mut self, number: &str) -> Result<Option<Seat>, StoreError> {
        let row = sqlx::query_as::<_, SeatRow>(
            "SELECT id, number FROM seats WHERE number = $1 FOR UPDATE",
        )
        .bind(number)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(store_error)?;

        Ok(row.map(Seat::from))
    }

    async fn find_user(&mut self, id: Uuid) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, name, created_at FROM users WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(store_error)?;

        Ok(row.map(User::from))
    }

    async fn find_reservation(&mut self, id: Uuid) -> Result<Option<Reservation>, StoreError> {
        let sql = format!("SELECT {} FROM reservations WHERE id = $1 FOR UPDATE", RESERVATION_COLUMNS);
        let row = sqlx::query_as::<_, ReservationRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(store_error)?;

        Ok(row.map(Reservation::from))
    }

    async fn reservations_overlapping(
        &mut self,
        scope: ConflictScope,
        window: &TimeWindow,
    ) -> Result<Vec<Reservation>, StoreError> {
        let (column, key) = match scope {
            ConflictScope::Seat(id) => ("seat_id", id),
            ConflictScope::User(id) => ("user_id", id),
        };
        let sql = format!(
            "SELECT {} FROM reservations WHERE {} = $1 AND start_time < $3 AND $2 < end_time",
            RESERVATION_COLUMNS, column
        );
        let rows = sqlx::query_as::<_, ReservationRow>(&sql)
            .bind(key)
            .bind(window.start)
            .bind(window.end)
            .fetch_all(&mut *self.tx)
            .await
            .map_err(store_error)?;

        Ok(rows.into_iter().map(Reservation::from).collect())
    }

    async fn insert_reservation(&mut self, reservation: &Reservation) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO reservations (id, user_id, seat_id, start_time, end_time, checked_in, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(reservation.id)
        .bind(reservation.user_id)
        .bind(reservation.seat_id)
        .bind(reservation.window.start)
        .bind(reservation.window.end)
        .bind(reservation.is_confirmed())
        .bind(reservation.created_at)
        .execute(&mut *self.tx)
        .await
        .map_err(store_error)?;

        Ok(())
    }

    async fn mark_confirmed(&mut self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE reservations SET checked_in = TRUE WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await
            .map_err(store_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_reservation(&mut self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM reservations WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await
            .map_err(store_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn expired_unconfirmed(
        &mut self,
        cutoff: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Reservation>, StoreError> {
        let sql = format!(
            "SELECT {} FROM reservations WHERE checked_in = FALSE AND start_time < $1 ORDER BY start_time, id LIMIT $2",
            RESERVATION_COLUMNS
        );
        let rows = sqlx::query_as::<_, ReservationRow>(&sql)
            .bind(cutoff)
            .bind(limit as i64)
            .fetch_all(&mut *self.tx)
            .await
            .map_err(store_error)?;

        Ok(rows.into_iter().map(Reservation::from).collect())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await.map_err(store_error)
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn upsert_user(&self, email: &str, name: &str) -> Result<User, StoreError> {
        // The update always fires so RETURNING also yields an existing row
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, email, name, created_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (email) DO UPDATE
                SET name = CASE WHEN EXCLUDED.name = '' THEN users.name ELSE EXCLUDED.name END
            RETURNING id, email, name, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(row.into())
    }
}

#[async_trait]
impl SeatRepository for PgStore {
    async fn add_seat(&self, number: &str) -> Result<Seat, StoreError> {
        let row = sqlx::query_as::<_, SeatRow>(
            "INSERT INTO seats (id, number) VALUES ($1, $2) RETURNING id, number",
        )
        .bind(Uuid::new_v4())
        .bind(number)
        .fetch_one(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(row.into())
    }

    async fn list_seats(&self) -> Result<Vec<Seat>, StoreError> {
        let rows = sqlx::query_as::<_, SeatRow>("SELECT id, number FROM seats ORDER BY number")
            .fetch_all(&self.pool)
            .await
            .map_err(store_error)?;

        Ok(rows.into_iter().map(Seat::from).collect())
    }

    async fn available_seats(&self, window: &TimeWindow) -> Result<Vec<Seat>, StoreError> {
        let rows = sqlx::query_as::<_, SeatRow>(
            r#"
            SELECT s.id, s.number
            FROM seats s
            WHERE NOT EXISTS (
                SELECT 1 FROM reservations r
                WHERE r.seat_id = s.id
                  AND r.start_time < $2
                  AND $1 < r.end_time
            )
            ORDER BY s.number
            "#,
        )
        .bind(window.start)
        .bind(window.end)
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(rows.into_iter().map(Seat::from).collect())
    }
}
