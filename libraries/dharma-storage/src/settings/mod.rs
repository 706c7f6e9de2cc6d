//! Application settings (single row, id = 1)

use crate::error::Result;
use dharma_core::types::{Settings, UpdateSettings};
use sqlx::{FromRow, SqlitePool};

#[derive(Debug, FromRow)]
struct SettingsRow {
    app_name: String,
    primary_color: String,
    secondary_color: String,
}

/// Get settings, falling back to defaults when never written
pub async fn get(pool: &SqlitePool) -> Result<Settings> {
    let row = sqlx::query_as::<_, SettingsRow>(
        "SELECT app_name, primary_color, secondary_color FROM settings WHERE id = 1",
    )
    .fetch_optional(pool)
    .await?;

    Ok(row
        .map(|r| Settings {
            app_name: r.app_name,
            primary_color: r.primary_color,
            secondary_color: r.secondary_color,
        })
        .unwrap_or_default())
}

/// Partially update settings and return the stored result
pub async fn update(pool: &SqlitePool, update: UpdateSettings) -> Result<Settings> {
    let mut settings = get(pool).await?;
    settings.apply(update);

    sqlx::query(
        "INSERT INTO settings (id, app_name, primary_color, secondary_color)
         VALUES (1, ?, ?, ?)
         ON CONFLICT(id) DO UPDATE SET
            app_name = excluded.app_name,
            primary_color = excluded.primary_color,
            secondary_color = excluded.secondary_color",
    )
    .bind(&settings.app_name)
    .bind(&settings.primary_color)
    .bind(&settings.secondary_color)
    .execute(pool)
    .await?;

    Ok(settings)
}
