use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::*;
use seatwise_engine::{
    queues::{work_queue, MailMessage, QueueProducer, SpamSignal},
    AbuseThrottle,
    BookingApi,
    ExpiryReconciler,
    NotificationRelay,
    PaymentApi,
    SqliteDatabase,
};

use crate::{
    config::{ServerConfig, ServerOptions},
    errors::ServerError,
    expiry_worker::start_expiry_worker,
    integrations::{HttpGatewayClient, MailBackend},
    mail_worker::start_mail_worker,
    routes::{
        health,
        BookingByIdRoute,
        CancelBookingRoute,
        CreateBookingRoute,
        CreatePaymentRoute,
        MyBookingsRoute,
        MyPaymentsRoute,
        PaymentByIdRoute,
        PaymentHashRoute,
        SeatMapRoute,
        UpdateBookingStatusRoute,
        VerifyPaymentRoute,
    },
    throttle_worker::start_throttle_worker,
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, config.max_connections)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.run_migrations().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let gateway = HttpGatewayClient::new(config.gateway.clone())
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let transport = MailBackend::from_config(&config.mail).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let (spam_producer, spam_consumer) = work_queue::<SpamSignal>();
    let (mail_producer, mail_consumer) = work_queue::<MailMessage>();

    let hold_timeout = i64::try_from(config.hold_timeout.as_secs()).unwrap_or(i64::MAX);
    let reconciler =
        ExpiryReconciler::new(db.clone(), gateway.clone(), mail_producer.clone(), spam_producer.clone())
            .with_hold_timeout(hold_timeout);
    let _expiry = start_expiry_worker(reconciler, config.sweep_interval);
    let throttle = AbuseThrottle::new(db.clone(), spam_consumer).with_threshold(config.spam_threshold);
    let _throttle = start_throttle_worker(throttle, config.throttle_interval);
    let relay = NotificationRelay::new(transport, mail_consumer);
    let _mail = start_mail_worker(relay, config.mail_interval);

    debug!("🚀️ Background workers started");
    let srv = create_server_instance(config, db, gateway, spam_producer, mail_producer)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    gateway: HttpGatewayClient,
    spam: QueueProducer<SpamSignal>,
    mail: QueueProducer<MailMessage>,
) -> Result<Server, ServerError> {
    let options = ServerOptions::from_config(&config);
    let hash_key = config.payment_hash_key.clone();
    let srv = HttpServer::new(move || {
        let booking_api = BookingApi::new(db.clone(), spam.clone());
        let payment_api = PaymentApi::new(db.clone(), gateway.clone(), mail.clone(), hash_key.clone());
        let api_scope = web::scope("/api")
            .service(CreateBookingRoute::<SqliteDatabase>::new())
            .service(MyBookingsRoute::<SqliteDatabase>::new())
            .service(BookingByIdRoute::<SqliteDatabase>::new())
            .service(CancelBookingRoute::<SqliteDatabase>::new())
            .service(UpdateBookingStatusRoute::<SqliteDatabase>::new())
            .service(SeatMapRoute::<SqliteDatabase>::new())
            .service(PaymentHashRoute::<SqliteDatabase, HttpGatewayClient>::new())
            .service(CreatePaymentRoute::<SqliteDatabase, HttpGatewayClient>::new())
            .service(MyPaymentsRoute::<SqliteDatabase, HttpGatewayClient>::new())
            .service(PaymentByIdRoute::<SqliteDatabase, HttpGatewayClient>::new())
            .service(VerifyPaymentRoute::<SqliteDatabase, HttpGatewayClient>::new());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("sw::access_log"))
            .app_data(web::Data::new(booking_api))
            .app_data(web::Data::new(payment_api))
            .app_data(web::Data::new(options.clone()))
            .service(health)
            .service(api_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
