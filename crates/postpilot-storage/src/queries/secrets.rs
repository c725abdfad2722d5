// SPDX-FileCopyrightText: 2026 Postpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Secret record CRUD operations.

use std::str::FromStr;

use postpilot_core::{PostpilotError, SecretRecord, SecretSlot, UserId};
use rusqlite::params;
use rusqlite::types::Type;

use crate::database::{map_tr_err, Database};

const UPSERT_SQL: &str = "INSERT INTO credential_secrets (user_id, slot, ciphertext, iv, updated_at)
     VALUES (?1, ?2, ?3, ?4, ?5)
     ON CONFLICT (user_id, slot) DO UPDATE SET
         ciphertext = excluded.ciphertext,
         iv = excluded.iv,
         updated_at = excluded.updated_at";

fn row_to_record(row: &rusqlite::Row<'_>) -> Result<SecretRecord, rusqlite::Error> {
    let slot: String = row.get(1)?;
    let slot = SecretSlot::from_str(&slot)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e)))?;
    Ok(SecretRecord {
        user_id: UserId(row.get(0)?),
        slot,
        ciphertext: row.get(2)?,
        iv: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

/// Insert or overwrite every record in a single transaction.
pub async fn upsert_secrets(db: &Database, records: &[SecretRecord]) -> Result<(), PostpilotError> {
    let records = records.to_vec();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare_cached(UPSERT_SQL)?;
                for record in &records {
                    stmt.execute(params![
                        record.user_id.as_str(),
                        record.slot.to_string(),
                        record.ciphertext,
                        record.iv,
                        record.updated_at,
                    ])?;
                }
            }
            tx.commit()
        })
        .await
        .map_err(map_tr_err)
}

/// Get one slot of one user.
pub async fn get_secret(
    db: &Database,
    user_id: &UserId,
    slot: SecretSlot,
) -> Result<Option<SecretRecord>, PostpilotError> {
    let user_id = user_id.as_str().to_string();
    let slot = slot.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<SecretRecord>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT user_id, slot, ciphertext, iv, updated_at
                 FROM credential_secrets WHERE user_id = ?1 AND slot = ?2",
            )?;
            match stmt.query_row(params![user_id, slot], row_to_record) {
                Ok(record) => Ok(Some(record)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// List every record owned by a user, ordered by slot.
pub async fn list_secrets(db: &Database, user_id: &UserId) -> Result<Vec<SecretRecord>, PostpilotError> {
    let user_id = user_id.as_str().to_string();
    db.connection()
        .call(move |conn| -> Result<Vec<SecretRecord>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT user_id, slot, ciphertext, iv, updated_at
                 FROM credential_secrets WHERE user_id = ?1 ORDER BY slot",
            )?;
            let rows = stmt.query_map(params![user_id], row_to_record)?;
            let mut records = Vec::new();
            for row in rows {
                records.push(row?);
            }
            Ok(records)
        })
        .await
        .map_err(map_tr_err)
}

/// Delete every record owned by a user. Returns the number of rows removed.
pub async fn delete_user_secrets(db: &Database, user_id: &UserId) -> Result<usize, PostpilotError> {
    let user_id = user_id.as_str().to_string();
    db.connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            conn.execute(
                "DELETE FROM credential_secrets WHERE user_id = ?1",
                params![user_id],
            )
        })
        .await
        .map_err(map_tr_err)
}
