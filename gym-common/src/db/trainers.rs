//! Trainer queries

use crate::models::Trainer;
use crate::Result;
use sqlx::sqlite::SqliteExecutor;
use sqlx::Row;

pub async fn insert_trainer<'e, E: SqliteExecutor<'e>>(executor: E, trainer: &Trainer) -> Result<()> {
    sqlx::query("INSERT INTO trainers (trainer_id, name, specialization) VALUES (?, ?, ?)")
        .bind(trainer.trainer_id)
        .bind(&trainer.name)
        .bind(&trainer.specialization)
        .execute(executor)
        .await?;

    Ok(())
}

pub async fn list_trainers<'e, E: SqliteExecutor<'e>>(executor: E) -> Result<Vec<Trainer>> {
    let rows = sqlx::query("SELECT trainer_id, name, specialization FROM trainers ORDER BY trainer_id")
        .fetch_all(executor)
        .await?;

    rows.iter()
        .map(|row| {
            Ok(Trainer {
                trainer_id: row.try_get("trainer_id")?,
                name: row.try_get("name")?,
                specialization: row
                    .try_get::<Option<String>, _>("specialization")?
                    .unwrap_or_default(),
            })
        })
        .collect()
}
