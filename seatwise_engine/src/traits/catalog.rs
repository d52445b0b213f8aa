use crate::{
    db_types::{NewSeat, NewShowing, Seat, Showing},
    traits::StorageError,
};

/// Read access to the show catalog, plus the hook used to materialise a showing's seat layout.
#[allow(async_fn_in_trait)]
pub trait ShowCatalog: Clone {
    async fn fetch_showing(&self, showing_id: i64) -> Result<Option<Showing>, StorageError>;

    /// Stores the showing and creates one `AVAILABLE` seat per entry in `seats`, in a single transaction.
    async fn insert_showing(&self, showing: NewShowing, seats: Vec<NewSeat>)
        -> Result<(Showing, Vec<Seat>), StorageError>;
}
