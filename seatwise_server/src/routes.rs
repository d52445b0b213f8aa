//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Every database and gateway call is therefore awaited, never
//! blocked on.
//!
//! Every `/api` handler identifies the caller with the [`CallerName`] extractor and resolves it to an account with
//! [`resolve_caller`], which also turns blacklisted accounts away.
use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use log::*;
use seatwise_engine::{
    helpers::CardHashRequest,
    traits::{GatewayClient, SeatwiseBackend},
    BookingApi,
    PaymentApi,
};
use serde_json::json;

use crate::{
    config::ServerOptions,
    data_objects::{BookingStatusUpdate, JsonResponse, NewBookingRequest, NewPaymentRequest},
    errors::ServerError,
    helpers::{get_remote_ip, resolve_caller, CallerName},
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Bookings  ----------------------------------------------------
route!(create_booking => Post "/bookings" impl SeatwiseBackend);
/// Route handler for booking seats
///
/// The body names the showing and the seats to hold: `{"showing_id": 1, "seat_ids": [4, 5]}`. On success the seats
/// are held for the caller and a `PENDING` booking is returned. A seat that is already taken gives a 409, and a sold
/// out showing gives a 423.
pub async fn create_booking<B: SeatwiseBackend>(
    caller: CallerName,
    body: web::Json<NewBookingRequest>,
    api: web::Data<BookingApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let account = resolve_caller(&caller, api.db()).await?;
    let request = body.into_inner();
    debug!("💻️ POST booking for {} on showing {}: {:?}", account.username, request.showing_id, request.seat_ids);
    let booking = api.create_booking(account.id, request.showing_id, &request.seat_ids).await?;
    Ok(HttpResponse::Ok().json(booking))
}

route!(my_bookings => Get "/bookings" impl SeatwiseBackend);
pub async fn my_bookings<B: SeatwiseBackend>(
    caller: CallerName,
    api: web::Data<BookingApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let account = resolve_caller(&caller, api.db()).await?;
    debug!("💻️ GET bookings for {}", account.username);
    let bookings = api.list_bookings(account.id).await?;
    Ok(HttpResponse::Ok().json(bookings))
}

route!(booking_by_id => Get "/bookings/{id}" impl SeatwiseBackend);
pub async fn booking_by_id<B: SeatwiseBackend>(
    caller: CallerName,
    path: web::Path<i64>,
    api: web::Data<BookingApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let account = resolve_caller(&caller, api.db()).await?;
    let booking_id = path.into_inner();
    debug!("💻️ GET booking {booking_id} for {}", account.username);
    let detail = api.get_booking(account.id, booking_id).await?;
    Ok(HttpResponse::Ok().json(detail))
}

route!(cancel_booking => Delete "/bookings/{id}" impl SeatwiseBackend);
pub async fn cancel_booking<B: SeatwiseBackend>(
    caller: CallerName,
    path: web::Path<i64>,
    api: web::Data<BookingApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let account = resolve_caller(&caller, api.db()).await?;
    let booking_id = path.into_inner();
    debug!("💻️ DELETE booking {booking_id} for {}", account.username);
    api.cancel_booking(account.id, booking_id).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::success(format!("Booking {booking_id} has been canceled"))))
}

route!(update_booking_status => Put "/bookings/{id}/status" impl SeatwiseBackend);
/// Route handler for moving a booking to a new status
///
/// Setting `PENDING` re-opens the booking. The booking is replaced by a fresh one with a new id, which is the booking
/// returned in the response. `CANCELED` cancels it. `BOOKED` is refused with a 400, since only a payment confirms a
/// booking.
pub async fn update_booking_status<B: SeatwiseBackend>(
    caller: CallerName,
    path: web::Path<i64>,
    body: web::Json<BookingStatusUpdate>,
    api: web::Data<BookingApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let account = resolve_caller(&caller, api.db()).await?;
    let booking_id = path.into_inner();
    let status = body.into_inner().status;
    info!("💻️ PUT booking {booking_id} status to {status} for {}", account.username);
    let booking = api.request_booking_status(account.id, booking_id, status).await?;
    Ok(HttpResponse::Ok().json(booking))
}

route!(seat_map => Get "/showings/{id}/seats" impl SeatwiseBackend);
pub async fn seat_map<B: SeatwiseBackend>(
    path: web::Path<i64>,
    api: web::Data<BookingApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let showing_id = path.into_inner();
    trace!("💻️ GET seat map for showing {showing_id}");
    let seats = api.seat_map(showing_id).await?;
    Ok(HttpResponse::Ok().json(seats))
}

//----------------------------------------------   Payments  ----------------------------------------------------
route!(create_payment => Post "/payments" impl SeatwiseBackend, GatewayClient);
/// Route handler for paying for a booking
///
/// Registers a payment for a `PENDING` booking with the gateway and returns the payment together with the URL where
/// the customer completes it. If the gateway could not be reached, the payment is canceled and the URL is `none`.
pub async fn create_payment<B: SeatwiseBackend, G: GatewayClient>(
    req: HttpRequest,
    caller: CallerName,
    body: web::Json<NewPaymentRequest>,
    options: web::Data<ServerOptions>,
    api: web::Data<PaymentApi<B, G>>,
) -> Result<HttpResponse, ServerError> {
    let account = resolve_caller(&caller, api.db()).await?;
    let request = body.into_inner();
    let client_ip = get_remote_ip(&req, options.use_x_forwarded_for, options.use_forwarded)
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    debug!("💻️ POST payment for booking {} by {} from {client_ip}", request.booking_id, account.username);
    let created = api.create_payment(account.id, request.booking_id, &request.method, &client_ip).await?;
    Ok(HttpResponse::Ok().json(created))
}

route!(my_payments => Get "/payments" impl SeatwiseBackend, GatewayClient);
pub async fn my_payments<B: SeatwiseBackend, G: GatewayClient>(
    caller: CallerName,
    api: web::Data<PaymentApi<B, G>>,
) -> Result<HttpResponse, ServerError> {
    let account = resolve_caller(&caller, api.db()).await?;
    debug!("💻️ GET payments for {}", account.username);
    let payments = api.list_payments(account.id).await?;
    Ok(HttpResponse::Ok().json(payments))
}

route!(payment_by_id => Get "/payments/{id}" impl SeatwiseBackend, GatewayClient);
pub async fn payment_by_id<B: SeatwiseBackend, G: GatewayClient>(
    caller: CallerName,
    path: web::Path<i64>,
    api: web::Data<PaymentApi<B, G>>,
) -> Result<HttpResponse, ServerError> {
    let account = resolve_caller(&caller, api.db()).await?;
    let payment_id = path.into_inner();
    debug!("💻️ GET payment {payment_id} for {}", account.username);
    let payment = api.get_payment(account.id, payment_id).await?;
    Ok(HttpResponse::Ok().json(payment))
}

route!(verify_payment => Post "/payments/{id}/verify" impl SeatwiseBackend, GatewayClient);
/// Route handler for checking a payment with the gateway
///
/// The response is a status report, e.g. `{"status": "PAID", "message": "..."}`. A paid payment confirms the booking.
pub async fn verify_payment<B: SeatwiseBackend, G: GatewayClient>(
    caller: CallerName,
    path: web::Path<i64>,
    api: web::Data<PaymentApi<B, G>>,
) -> Result<HttpResponse, ServerError> {
    let account = resolve_caller(&caller, api.db()).await?;
    let payment_id = path.into_inner();
    debug!("💻️ POST verify payment {payment_id} for {}", account.username);
    let report = api.verify_payment(account.id, payment_id).await?;
    Ok(HttpResponse::Ok().json(report))
}

route!(payment_hash => Post "/payments/hash" impl SeatwiseBackend, GatewayClient);
pub async fn payment_hash<B: SeatwiseBackend, G: GatewayClient>(
    caller: CallerName,
    body: web::Json<CardHashRequest>,
    api: web::Data<PaymentApi<B, G>>,
) -> Result<HttpResponse, ServerError> {
    let account = resolve_caller(&caller, api.db()).await?;
    let request = body.into_inner();
    trace!("💻️ POST card hash for booking {} by {}", request.booking_id, account.username);
    let hash = api.card_hash(&request)?;
    Ok(HttpResponse::Ok().json(json!({ "hash": hash })))
}
