use actix_web::http::StatusCode;
use seatwise_engine::{
    helpers::{card_hash, CardHashRequest},
    queues::RECEIPT_SUBJECT,
    traits::GatewayOutcome,
};
use serde_json::json;

use super::helpers::{json, TestContext, HASH_KEY};

async fn booked(ctx: &TestContext, user: &str, seats: &[i64]) -> i64 {
    let body = json!({ "showing_id": ctx.showing.id, "seat_ids": seats });
    let (status, body) = ctx.post(user, "/api/bookings", body).await;
    assert_eq!(status, StatusCode::OK);
    json(&body)["id"].as_i64().unwrap()
}

async fn paid_for(ctx: &TestContext, user: &str, booking_id: i64) -> i64 {
    let (status, body) = ctx.post(user, "/api/payments", json!({ "booking_id": booking_id })).await;
    assert_eq!(status, StatusCode::OK);
    json(&body)["payment"]["id"].as_i64().unwrap()
}

#[actix_web::test]
async fn create_payment_returns_the_gateway_url() {
    let ctx = TestContext::new(2).await;
    let booking_id = booked(&ctx, "alice", &[ctx.seat_id(0), ctx.seat_id(1)]).await;
    let body = json!({ "booking_id": booking_id, "method": "wallet" });
    let (status, body) = ctx.post("alice", "/api/payments", body).await;
    assert_eq!(status, StatusCode::OK);
    let created = json(&body);
    let payment_id = created["payment"]["id"].as_i64().unwrap();
    assert_eq!(created["payment"]["status"], "PENDING");
    assert_eq!(created["payment"]["method"], "wallet");
    assert_eq!(created["payment_url"], format!("https://pay.example.com/wallet/{payment_id}"));

    // A second payment for the same booking is refused
    let (status, _) = ctx.post("alice", "/api/payments", json!({ "booking_id": booking_id })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = ctx.get("alice", "/api/payments").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body).as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn payments_for_other_bookings_are_refused() {
    let ctx = TestContext::new(2).await;
    let booking_id = booked(&ctx, "alice", &[ctx.seat_id(0)]).await;
    let (status, _) = ctx.post("bob", "/api/payments", json!({ "booking_id": booking_id })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let payment_id = paid_for(&ctx, "alice", booking_id).await;
    let (status, _) = ctx.get("bob", &format!("/api/payments/{payment_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = ctx.post("bob", &format!("/api/payments/{payment_id}/verify"), json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, body) = ctx.get("alice", &format!("/api/payments/{payment_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["booking_id"], booking_id);
}

#[actix_web::test]
async fn gateway_outage_cancels_the_payment() {
    let ctx = TestContext::new(1).await;
    ctx.gateway.refuse_payments();
    let booking_id = booked(&ctx, "alice", &[ctx.seat_id(0)]).await;
    let (status, body) = ctx.post("alice", "/api/payments", json!({ "booking_id": booking_id })).await;
    assert_eq!(status, StatusCode::OK);
    let created = json(&body);
    assert_eq!(created["payment_url"], "none");
    assert_eq!(created["payment"]["status"], "CANCELED");
}

#[actix_web::test]
async fn verify_paid_payment_confirms_the_booking() {
    let mut ctx = TestContext::new(2).await;
    let booking_id = booked(&ctx, "alice", &[ctx.seat_id(0)]).await;
    let payment_id = paid_for(&ctx, "alice", booking_id).await;

    let path = format!("/api/payments/{payment_id}/verify");
    let (status, body) = ctx.post("alice", &path, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["status"], "PENDING");

    ctx.gateway.set_outcome(payment_id, GatewayOutcome::Paid);
    let (status, body) = ctx.post("alice", &path, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["status"], "PAID");
    let (_, body) = ctx.get("alice", &format!("/api/bookings/{booking_id}")).await;
    assert_eq!(json(&body)["booking"]["status"], "BOOKED");

    let mail = ctx.mail_queue.drain();
    assert_eq!(mail.len(), 1);
    assert_eq!(mail[0].to, "alice@example.com");
    assert_eq!(mail[0].subject, RECEIPT_SUBJECT);

    // Settled payments are not checked again
    let (status, body) = ctx.post("alice", &path, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["message"], "This ticket has already been paid or canceled.");
    assert_eq!(ctx.gateway.verify_calls(), 2);
}

#[actix_web::test]
async fn gateway_errors_are_bad_gateway() {
    let ctx = TestContext::new(1).await;
    let booking_id = booked(&ctx, "alice", &[ctx.seat_id(0)]).await;
    let payment_id = paid_for(&ctx, "alice", booking_id).await;
    ctx.gateway.set_default_outcome(None);
    let (status, body) = ctx.post("alice", &format!("/api/payments/{payment_id}/verify"), json!({})).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(json(&body)["error"].is_string());
}

#[actix_web::test]
async fn card_hash_uses_the_server_key() {
    let ctx = TestContext::new(1).await;
    let request = CardHashRequest {
        booking_id: 4,
        card_id: "4111111111111111".into(),
        card_name: "JANE DOE".into(),
        cvc: "123".into(),
    };
    let (status, body) = ctx.post("alice", "/api/payments/hash", serde_json::to_value(&request).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    let expected = card_hash(HASH_KEY, &request).unwrap();
    assert_eq!(json(&body)["hash"], expected);
    assert_eq!(expected.len(), 64);
}
