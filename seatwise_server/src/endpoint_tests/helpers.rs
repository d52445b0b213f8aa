use actix_web::{http::StatusCode, test, test::TestRequest, web, web::ServiceConfig, App};
use log::debug;
use seatwise_engine::{
    db_types::{Account, AccountStatus, Seat, Showing},
    queues::{work_queue, MailMessage, QueueConsumer, QueueProducer, SpamSignal},
    test_utils::{
        fixtures::{seed_account, seed_showing},
        gateway::ScriptedGateway,
        prepare_env::fresh_database,
    },
    traits::AccountManagement,
    BookingApi,
    PaymentApi,
    SqliteDatabase,
};
use sw_common::Secret;

use crate::{
    config::{ServerOptions, DEFAULT_USERNAME_HEADER},
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
};

pub const HASH_KEY: &str = "endpoint-test-key";

/// A fresh database with two customers and a showing, plus the queues and gateway the handlers talk to.
pub struct TestContext {
    pub db: SqliteDatabase,
    pub gateway: ScriptedGateway,
    pub alice: Account,
    pub bob: Account,
    pub showing: Showing,
    pub seats: Vec<Seat>,
    spam: QueueProducer<SpamSignal>,
    mail: QueueProducer<MailMessage>,
    pub spam_queue: QueueConsumer<SpamSignal>,
    pub mail_queue: QueueConsumer<MailMessage>,
}

impl TestContext {
    pub async fn new(seat_count: usize) -> Self {
        let _ = env_logger::try_init();
        let db = fresh_database().await;
        let alice = seed_account(&db, "alice").await;
        let bob = seed_account(&db, "bob").await;
        let (showing, seats) = seed_showing(&db, seat_count).await;
        let (spam, spam_queue) = work_queue();
        let (mail, mail_queue) = work_queue();
        Self { db, gateway: ScriptedGateway::new(), alice, bob, showing, seats, spam, mail, spam_queue, mail_queue }
    }

    pub async fn blacklist(&self, account: &Account) {
        self.db.set_account_status(account.id, AccountStatus::Blacklisted).await.expect("Error blacklisting account");
    }

    /// Sends the request through a freshly built app and returns the status and body.
    pub async fn send(&self, req: TestRequest) -> (StatusCode, String) {
        let booking_api = BookingApi::new(self.db.clone(), self.spam.clone());
        let hash_key = Secret::new(HASH_KEY.to_string());
        let payment_api = PaymentApi::new(self.db.clone(), self.gateway.clone(), self.mail.clone(), hash_key);
        let app = App::new()
            .app_data(web::Data::new(booking_api))
            .app_data(web::Data::new(payment_api))
            .app_data(web::Data::new(ServerOptions::default()))
            .service(health)
            .service(web::scope("/api").configure(configure));
        let service = test::init_service(app).await;
        debug!("Making request");
        let res = test::call_service(&service, req.to_request()).await;
        let status = res.status();
        let body = test::read_body(res).await;
        (status, String::from_utf8_lossy(&body).into_owned())
    }

    pub async fn get(&self, user: &str, path: &str) -> (StatusCode, String) {
        self.send(as_user(TestRequest::get().uri(path), user)).await
    }

    pub async fn post(&self, user: &str, path: &str, body: serde_json::Value) -> (StatusCode, String) {
        self.send(as_user(TestRequest::post().uri(path).set_json(body), user)).await
    }

    pub fn seat_id(&self, index: usize) -> i64 {
        self.seats[index].id
    }
}

pub fn as_user(req: TestRequest, user: &str) -> TestRequest {
    if user.is_empty() {
        req
    } else {
        req.insert_header((DEFAULT_USERNAME_HEADER, user))
    }
}

pub fn json(body: &str) -> serde_json::Value {
    serde_json::from_str(body).expect("Response was not JSON")
}

fn configure(cfg: &mut ServiceConfig) {
    cfg.service(CreateBookingRoute::<SqliteDatabase>::new())
        .service(MyBookingsRoute::<SqliteDatabase>::new())
        .service(BookingByIdRoute::<SqliteDatabase>::new())
        .service(CancelBookingRoute::<SqliteDatabase>::new())
        .service(UpdateBookingStatusRoute::<SqliteDatabase>::new())
        .service(SeatMapRoute::<SqliteDatabase>::new())
        .service(PaymentHashRoute::<SqliteDatabase, ScriptedGateway>::new())
        .service(CreatePaymentRoute::<SqliteDatabase, ScriptedGateway>::new())
        .service(MyPaymentsRoute::<SqliteDatabase, ScriptedGateway>::new())
        .service(PaymentByIdRoute::<SqliteDatabase, ScriptedGateway>::new())
        .service(VerifyPaymentRoute::<SqliteDatabase, ScriptedGateway>::new());
}
