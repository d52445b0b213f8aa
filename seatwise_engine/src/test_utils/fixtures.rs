use chrono::{Duration, Utc};

use crate::{
    db_types::{Account, Money, NewAccount, NewSeat, NewShowing, Seat, SeatClass, Showing},
    traits::{AccountManagement, ShowCatalog},
};

pub const SEAT_PRICE: i64 = 75_000;

pub async fn seed_account<B: AccountManagement>(db: &B, username: &str) -> Account {
    let account = NewAccount::new(username, format!("{username}@example.com"));
    db.insert_account(account).await.expect("Error creating test account")
}

/// Creates a showing with a single row of `seats` regular seats named `A1`, `A2`, ...
pub async fn seed_showing<B: ShowCatalog>(db: &B, seats: usize) -> (Showing, Vec<Seat>) {
    let showing = NewShowing {
        movie_name: "The Long Intermission".to_string(),
        hall_name: "Hall 3".to_string(),
        start_time: Utc::now() + Duration::days(1),
        capacity: seats as i64,
    };
    let layout = (1..=seats)
        .map(|i| NewSeat::new(format!("A{i}"), SeatClass::Regular, Money::from(SEAT_PRICE)))
        .collect::<Vec<_>>();
    db.insert_showing(showing, layout).await.expect("Error creating test showing")
}
