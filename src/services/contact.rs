use crate::models::{ContactMessage, NewContact};
use crate::services::{ServiceError, ServiceResult};
use crate::Database;

pub fn submit_contact(db: &Database, input: &NewContact) -> ServiceResult<ContactMessage> {
    for (field, value) in [
        ("name", &input.name),
        ("email", &input.email),
        ("phone", &input.phone),
        ("message", &input.message),
    ] {
        if value.trim().is_empty() {
            return Err(ServiceError::Validation(format!("{} cannot be empty", field)));
        }
    }

    let conn = db.get()?;
    conn.execute(
        "INSERT INTO contacts (name, email, phone, message) VALUES (?, ?, ?, ?)",
        (&input.name, &input.email, &input.phone, &input.message),
    )?;

    let id = conn.last_insert_rowid();
    let contact = conn.query_row(
        "SELECT id, name, email, phone, message, created_at FROM contacts WHERE id = ?",
        [id],
        |row| {
            Ok(ContactMessage {
                id: row.get(0)?,
                name: row.get(1)?,
                email: row.get(2)?,
                phone: row.get(3)?,
                message: row.get(4)?,
                created_at: row.get(5)?,
            })
        },
    )?;
    Ok(contact)
}
