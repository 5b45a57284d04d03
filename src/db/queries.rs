use chrono::NaiveDateTime;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};

use crate::models::{
    Booking, BookingStatus, CommentView, Item, NewBooking, NewComment, NewItem, NewUser, User,
};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

fn format_ts(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

fn parse_ts(idx: usize, raw: &str) -> rusqlite::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

// ── Users ──

pub fn insert_user(conn: &Connection, user: &NewUser) -> anyhow::Result<User> {
    conn.execute(
        "INSERT INTO users (name, email) VALUES (?1, ?2)",
        params![user.name, user.email],
    )?;
    Ok(User {
        id: conn.last_insert_rowid(),
        name: user.name.clone(),
        email: user.email.clone(),
    })
}

pub fn get_user(conn: &Connection, id: i64) -> anyhow::Result<Option<User>> {
    let user = conn
        .query_row(
            "SELECT id, name, email FROM users WHERE id = ?1",
            params![id],
            parse_user_row,
        )
        .optional()?;
    Ok(user)
}

pub fn find_user_by_email(conn: &Connection, email: &str) -> anyhow::Result<Option<User>> {
    let user = conn
        .query_row(
            "SELECT id, name, email FROM users WHERE email = ?1",
            params![email],
            parse_user_row,
        )
        .optional()?;
    Ok(user)
}

pub fn list_users(conn: &Connection) -> anyhow::Result<Vec<User>> {
    let mut stmt = conn.prepare("SELECT id, name, email FROM users ORDER BY id ASC")?;
    let rows = stmt.query_map([], parse_user_row)?;

    let mut users = vec![];
    for row in rows {
        users.push(row?);
    }
    Ok(users)
}

pub fn update_user(conn: &Connection, user: &User) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE users SET name = ?1, email = ?2 WHERE id = ?3",
        params![user.name, user.email, user.id],
    )?;
    Ok(count > 0)
}

pub fn delete_user(conn: &Connection, id: i64) -> anyhow::Result<bool> {
    let count = conn.execute("DELETE FROM users WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

fn parse_user_row(row: &rusqlite::Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
    })
}

// ── Items ──

pub fn insert_item(conn: &Connection, item: &NewItem) -> anyhow::Result<Item> {
    conn.execute(
        "INSERT INTO items (owner_id, name, description, available) VALUES (?1, ?2, ?3, ?4)",
        params![item.owner_id, item.name, item.description, item.available],
    )?;
    Ok(Item {
        id: conn.last_insert_rowid(),
        owner_id: item.owner_id,
        name: item.name.clone(),
        description: item.description.clone(),
        available: item.available,
    })
}

pub fn get_item(conn: &Connection, id: i64) -> anyhow::Result<Option<Item>> {
    let item = conn
        .query_row(
            "SELECT id, owner_id, name, description, available FROM items WHERE id = ?1",
            params![id],
            parse_item_row,
        )
        .optional()?;
    Ok(item)
}

pub fn get_items_by_owner(conn: &Connection, owner_id: i64) -> anyhow::Result<Vec<Item>> {
    let mut stmt = conn.prepare(
        "SELECT id, owner_id, name, description, available FROM items WHERE owner_id = ?1 ORDER BY id ASC",
    )?;
    let rows = stmt.query_map(params![owner_id], parse_item_row)?;

    let mut items = vec![];
    for row in rows {
        items.push(row?);
    }
    Ok(items)
}

pub fn search_items(conn: &Connection, text: &str) -> anyhow::Result<Vec<Item>> {
    let pattern = format!("%{}%", text.to_lowercase());
    let mut stmt = conn.prepare(
        "SELECT id, owner_id, name, description, available FROM items
         WHERE available = 1 AND (lower(name) LIKE ?1 OR lower(COALESCE(description, '')) LIKE ?1)
         ORDER BY id ASC",
    )?;
    let rows = stmt.query_map(params![pattern], parse_item_row)?;

    let mut items = vec![];
    for row in rows {
        items.push(row?);
    }
    Ok(items)
}

pub fn update_item(conn: &Connection, item: &Item) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE items SET name = ?1, description = ?2, available = ?3 WHERE id = ?4",
        params![item.name, item.description, item.available, item.id],
    )?;
    Ok(count > 0)
}

pub fn delete_item(conn: &Connection, id: i64) -> anyhow::Result<bool> {
    let count = conn.execute("DELETE FROM items WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

fn parse_item_row(row: &rusqlite::Row) -> rusqlite::Result<Item> {
    Ok(Item {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        available: row.get(4)?,
    })
}

// ── Bookings ──

const BOOKING_COLUMNS: &str = "b.id, b.start_at, b.end_at, b.item_id, b.booker_id, b.status";

pub fn insert_booking(conn: &Connection, booking: &NewBooking) -> anyhow::Result<Booking> {
    conn.execute(
        "INSERT INTO bookings (item_id, booker_id, start_at, end_at, status)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            booking.item_id,
            booking.booker_id,
            format_ts(&booking.start),
            format_ts(&booking.end),
            booking.status.as_str(),
        ],
    )?;
    Ok(Booking {
        id: conn.last_insert_rowid(),
        start: booking.start,
        end: booking.end,
        item_id: booking.item_id,
        booker_id: booking.booker_id,
        status: booking.status,
    })
}

pub fn get_booking_by_id(conn: &Connection, id: i64) -> anyhow::Result<Option<Booking>> {
    let booking = conn
        .query_row(
            &format!("SELECT {BOOKING_COLUMNS} FROM bookings b WHERE b.id = ?1"),
            params![id],
            parse_booking_row,
        )
        .optional()?;
    Ok(booking)
}

/// Moves a booking out of WAITING in one statement. Returns false when the
/// booking is missing or was already decided.
pub fn update_status_if_waiting(
    conn: &Connection,
    id: i64,
    status: BookingStatus,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE bookings SET status = ?1 WHERE id = ?2 AND status = ?3",
        params![status.as_str(), id, BookingStatus::Waiting.as_str()],
    )?;
    Ok(count > 0)
}

pub fn get_bookings_by_booker(conn: &Connection, booker_id: i64) -> anyhow::Result<Vec<Booking>> {
    collect_bookings(
        conn,
        &format!("SELECT {BOOKING_COLUMNS} FROM bookings b WHERE b.booker_id = ?1"),
        booker_id,
    )
}

pub fn get_bookings_by_owner(conn: &Connection, owner_id: i64) -> anyhow::Result<Vec<Booking>> {
    collect_bookings(
        conn,
        &format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings b
             JOIN items i ON i.id = b.item_id
             WHERE i.owner_id = ?1"
        ),
        owner_id,
    )
}

pub fn get_bookings_by_item(conn: &Connection, item_id: i64) -> anyhow::Result<Vec<Booking>> {
    collect_bookings(
        conn,
        &format!("SELECT {BOOKING_COLUMNS} FROM bookings b WHERE b.item_id = ?1"),
        item_id,
    )
}

fn collect_bookings(conn: &Connection, sql: &str, key: i64) -> anyhow::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params![key], parse_booking_row)?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row?);
    }
    Ok(bookings)
}

fn parse_booking_row(row: &rusqlite::Row) -> rusqlite::Result<Booking> {
    let start_str: String = row.get(1)?;
    let end_str: String = row.get(2)?;
    let status_str: String = row.get(5)?;

    let status = BookingStatus::parse(&status_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            5,
            Type::Text,
            format!("unknown booking status: {status_str}").into(),
        )
    })?;

    Ok(Booking {
        id: row.get(0)?,
        start: parse_ts(1, &start_str)?,
        end: parse_ts(2, &end_str)?,
        item_id: row.get(3)?,
        booker_id: row.get(4)?,
        status,
    })
}

// ── Comments ──

pub fn insert_comment(conn: &Connection, comment: &NewComment) -> anyhow::Result<i64> {
    conn.execute(
        "INSERT INTO comments (item_id, author_id, text, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![
            comment.item_id,
            comment.author_id,
            comment.text,
            format_ts(&comment.created),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_comments_for_item(conn: &Connection, item_id: i64) -> anyhow::Result<Vec<CommentView>> {
    let mut stmt = conn.prepare(
        "SELECT c.id, c.text, u.name, c.created_at FROM comments c
         JOIN users u ON u.id = c.author_id
         WHERE c.item_id = ?1 ORDER BY c.id ASC",
    )?;
    let rows = stmt.query_map(params![item_id], |row| {
        let created_str: String = row.get(3)?;
        Ok(CommentView {
            id: row.get(0)?,
            text: row.get(1)?,
            author_name: row.get(2)?,
            created: parse_ts(3, &created_str)?,
        })
    })?;

    let mut comments = vec![];
    for row in rows {
        comments.push(row?);
    }
    Ok(comments)
}
