use sqlx::SqliteConnection;

use crate::db_types::{NewShowing, Showing};

pub async fn insert_showing(showing: NewShowing, conn: &mut SqliteConnection) -> Result<Showing, sqlx::Error> {
    let showing = sqlx::query_as(
        r#"
            INSERT INTO showings (movie_name, hall_name, start_time, capacity)
            VALUES ($1, $2, $3, $4)
            RETURNING *;
        "#,
    )
    .bind(showing.movie_name)
    .bind(showing.hall_name)
    .bind(showing.start_time)
    .bind(showing.capacity)
    .fetch_one(conn)
    .await?;
    Ok(showing)
}

pub async fn fetch_showing(showing_id: i64, conn: &mut SqliteConnection) -> Result<Option<Showing>, sqlx::Error> {
    let showing =
        sqlx::query_as("SELECT * FROM showings WHERE id = $1").bind(showing_id).fetch_optional(conn).await?;
    Ok(showing)
}
