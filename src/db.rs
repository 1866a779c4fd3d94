use std::{fs, path::PathBuf};

use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::info;

use crate::{
    error::AppError,
    models::{
        Booking, NewBooking, NewUser, Ticket, User, BOOKING_VEHICLE_TYPE, TICKET_AMOUNT,
        TICKET_STATUS_PAID,
    },
};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT,
        mobile TEXT,
        gender TEXT,
        aadhaar TEXT,
        license TEXT,
        location TEXT
    );

    CREATE TABLE IF NOT EXISTS tickets (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER,
        amount INTEGER,
        payment_mode TEXT,
        status TEXT
    );

    CREATE TABLE IF NOT EXISTS bookings (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER,
        vehicle_type TEXT,
        vehicle_name TEXT,
        duration TEXT,
        cost INTEGER,
        payment_mode TEXT
    );
";

/// Handle to the booking database file. Every call opens its own connection
/// and runs a single autocommitted statement.
#[derive(Clone, Debug)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn connect(&self) -> Result<Connection, AppError> {
        if let Some(dir) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        Ok(Connection::open(&self.path)?)
    }

    /// Runs `op` on the blocking pool so file I/O never stalls a runtime
    /// worker.
    pub async fn call<T, F>(&self, op: F) -> Result<T, AppError>
    where
        F: FnOnce(&Database) -> Result<T, AppError> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.clone();
        tokio::task::spawn_blocking(move || op(&db)).await?
    }

    pub fn init(&self) -> Result<(), AppError> {
        self.connect()?.execute_batch(SCHEMA)?;
        info!(path = %self.path.display(), "Database ready");
        Ok(())
    }

    pub fn insert_user(&self, user: &NewUser) -> Result<i64, AppError> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO users (name, mobile, gender, aadhaar, license, location) VALUES (?, ?, ?, ?, ?, ?)",
            params![
                user.name,
                user.mobile,
                user.gender,
                user.aadhaar,
                user.license,
                user.location
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn insert_ticket(&self, user_id: i64, payment_mode: &str) -> Result<i64, AppError> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO tickets (user_id, amount, payment_mode, status) VALUES (?, ?, ?, ?)",
            params![user_id, TICKET_AMOUNT, payment_mode, TICKET_STATUS_PAID],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn insert_booking(&self, booking: &NewBooking) -> Result<i64, AppError> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO bookings (user_id, vehicle_type, vehicle_name, duration, cost, payment_mode) VALUES (?, ?, ?, ?, ?, ?)",
            params![
                booking.user_id,
                BOOKING_VEHICLE_TYPE,
                booking.vehicle_name,
                booking.duration,
                booking.cost,
                booking.payment_mode
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn find_user(&self, id: i64) -> Result<Option<User>, AppError> {
        let user = self
            .connect()?
            .query_row(
                "SELECT id, name, mobile, gender, aadhaar, license, location FROM users WHERE id = ?",
                [id],
                |row| {
                    Ok(User {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        mobile: row.get(2)?,
                        gender: row.get(3)?,
                        aadhaar: row.get(4)?,
                        license: row.get(5)?,
                        location: row.get(6)?,
                    })
                },
            )
            .optional()?;
        Ok(user)
    }

    pub fn tickets_for_user(&self, user_id: i64) -> Result<Vec<Ticket>, AppError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, amount, payment_mode, status FROM tickets WHERE user_id = ? ORDER BY id",
        )?;
        let tickets = stmt
            .query_map([user_id], ticket_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tickets)
    }

    pub fn bookings_for_user(&self, user_id: i64) -> Result<Vec<Booking>, AppError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, vehicle_type, vehicle_name, duration, cost, payment_mode FROM bookings WHERE user_id = ? ORDER BY id",
        )?;
        let bookings = stmt
            .query_map([user_id], booking_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(bookings)
    }
}

fn ticket_from_row(row: &Row<'_>) -> rusqlite::Result<Ticket> {
    Ok(Ticket {
        id: row.get(0)?,
        user_id: row.get(1)?,
        amount: row.get(2)?,
        payment_mode: row.get(3)?,
        status: row.get(4)?,
    })
}

fn booking_from_row(row: &Row<'_>) -> rusqlite::Result<Booking> {
    Ok(Booking {
        id: row.get(0)?,
        user_id: row.get(1)?,
        vehicle_type: row.get(2)?,
        vehicle_name: row.get(3)?,
        duration: row.get(4)?,
        cost: row.get(5)?,
        payment_mode: row.get(6)?,
    })
}
