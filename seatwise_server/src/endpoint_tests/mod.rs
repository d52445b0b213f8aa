mod bookings;
mod helpers;
mod payments;
