use actix_web::{http::StatusCode, test::TestRequest};
use serde_json::json;

use super::helpers::{as_user, json, TestContext};

#[actix_web::test]
async fn health_check() {
    let ctx = TestContext::new(1).await;
    let (status, body) = ctx.send(TestRequest::get().uri("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "👍️\n");
}

#[actix_web::test]
async fn requests_without_a_caller_are_refused() {
    let ctx = TestContext::new(2).await;
    let (status, body) = ctx.get("", "/api/bookings").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(json(&body)["error"].as_str().unwrap().contains("sw_username"));

    let (status, body) = ctx.get("mallory", "/api/bookings").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(json(&body)["error"].as_str().unwrap().contains("Unknown user mallory"));
}

#[actix_web::test]
async fn blacklisted_accounts_are_refused() {
    let ctx = TestContext::new(2).await;
    ctx.blacklist(&ctx.alice).await;
    let body = json!({ "showing_id": ctx.showing.id, "seat_ids": [ctx.seat_id(0)] });
    let (status, body) = ctx.post("alice", "/api/bookings", body).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(json(&body)["error"].as_str().unwrap().contains("Your account has been blocked"));
    // Nothing was held on the account's behalf
    let (_, seats) = ctx.get("bob", &format!("/api/showings/{}/seats", ctx.showing.id)).await;
    assert!(json(&seats).as_array().unwrap().iter().all(|s| s["status"] == "AVAILABLE"));
}

#[actix_web::test]
async fn book_seats_then_conflict() {
    let ctx = TestContext::new(3).await;
    let body = json!({ "showing_id": ctx.showing.id, "seat_ids": [ctx.seat_id(0), ctx.seat_id(1)] });
    let (status, body) = ctx.post("alice", "/api/bookings", body).await;
    assert_eq!(status, StatusCode::OK);
    let booking = json(&body);
    assert_eq!(booking["status"], "PENDING");
    assert_eq!(booking["account_id"], ctx.alice.id);
    assert_eq!(booking["seat_ids"], json!([ctx.seat_id(0), ctx.seat_id(1)]));

    let body = json!({ "showing_id": ctx.showing.id, "seat_ids": [ctx.seat_id(2), ctx.seat_id(1)] });
    let (status, body) = ctx.post("bob", "/api/bookings", body).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json(&body)["error"], format!("Seat ID {} is reserved", ctx.seat_id(1)));

    // Bob's partial hold on the third seat was handed back
    let (status, seats) = ctx.get("bob", &format!("/api/showings/{}/seats", ctx.showing.id)).await;
    assert_eq!(status, StatusCode::OK);
    let statuses = json(&seats).as_array().unwrap().iter().map(|s| s["status"].clone()).collect::<Vec<_>>();
    assert_eq!(statuses, vec![json!("BOOKED"), json!("BOOKED"), json!("AVAILABLE")]);
}

#[actix_web::test]
async fn full_showing_is_locked() {
    let ctx = TestContext::new(1).await;
    let body = json!({ "showing_id": ctx.showing.id, "seat_ids": [ctx.seat_id(0)] });
    let (status, _) = ctx.post("alice", "/api/bookings", body.clone()).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = ctx.post("bob", "/api/bookings", body).await;
    assert_eq!(status, StatusCode::LOCKED);
    assert_eq!(json(&body)["error"], "Sorry, seats of this show are full. Please choose another show");
}

#[actix_web::test]
async fn bad_booking_requests() {
    let ctx = TestContext::new(2).await;
    let body = json!({ "showing_id": ctx.showing.id, "seat_ids": [] });
    let (status, _) = ctx.post("alice", "/api/bookings", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let body = json!({ "showing_id": 9999, "seat_ids": [ctx.seat_id(0)] });
    let (status, _) = ctx.post("alice", "/api/bookings", body).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx.get("alice", "/api/showings/9999/seats").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = ctx.get("alice", "/api/bookings/9999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn bookings_are_private() {
    let ctx = TestContext::new(2).await;
    let body = json!({ "showing_id": ctx.showing.id, "seat_ids": [ctx.seat_id(0)] });
    let (_, body) = ctx.post("alice", "/api/bookings", body).await;
    let id = json(&body)["id"].as_i64().unwrap();

    let (status, body) = ctx.get("alice", &format!("/api/bookings/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    let detail = json(&body);
    assert_eq!(detail["booking"]["id"], id);
    assert_eq!(detail["movie_name"], "The Long Intermission");
    assert_eq!(detail["hall_name"], "Hall 3");

    let (status, _) = ctx.get("bob", &format!("/api/bookings/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, body) = ctx.get("bob", "/api/bookings").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body), json!([]));
    let (_, body) = ctx.get("alice", "/api/bookings").await;
    assert_eq!(json(&body).as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn cancel_and_reopen() {
    let ctx = TestContext::new(2).await;
    let body = json!({ "showing_id": ctx.showing.id, "seat_ids": [ctx.seat_id(0)] });
    let (_, body) = ctx.post("alice", "/api/bookings", body).await;
    let id = json(&body)["id"].as_i64().unwrap();

    let (status, _) = ctx.send(as_user(TestRequest::delete().uri(&format!("/api/bookings/{id}")), "bob")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, body) = ctx.send(as_user(TestRequest::delete().uri(&format!("/api/bookings/{id}")), "alice")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["success"], true);
    let (_, body) = ctx.get("alice", &format!("/api/bookings/{id}")).await;
    assert_eq!(json(&body)["booking"]["status"], "CANCELED");

    // Canceling twice is refused
    let (status, _) = ctx.send(as_user(TestRequest::delete().uri(&format!("/api/bookings/{id}")), "alice")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let req = TestRequest::put().uri(&format!("/api/bookings/{id}/status")).set_json(json!({ "status": "PENDING" }));
    let (status, body) = ctx.send(as_user(req, "alice")).await;
    assert_eq!(status, StatusCode::OK);
    let reopened = json(&body);
    assert_ne!(reopened["id"], id);
    assert_eq!(reopened["status"], "PENDING");
    assert_eq!(reopened["seat_ids"], json!([ctx.seat_id(0)]));
}

#[actix_web::test]
async fn unknown_status_is_rejected() {
    let ctx = TestContext::new(1).await;
    let body = json!({ "showing_id": ctx.showing.id, "seat_ids": [ctx.seat_id(0)] });
    let (_, body) = ctx.post("alice", "/api/bookings", body).await;
    let id = json(&body)["id"].as_i64().unwrap();
    let req = TestRequest::put().uri(&format!("/api/bookings/{id}/status")).set_json(json!({ "status": "EXPIRED" }));
    let (status, _) = ctx.send(as_user(req, "alice")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn customers_cannot_confirm_without_paying() {
    let ctx = TestContext::new(1).await;
    let body = json!({ "showing_id": ctx.showing.id, "seat_ids": [ctx.seat_id(0)] });
    let (_, body) = ctx.post("alice", "/api/bookings", body).await;
    let id = json(&body)["id"].as_i64().unwrap();
    let req = TestRequest::put().uri(&format!("/api/bookings/{id}/status")).set_json(json!({ "status": "BOOKED" }));
    let (status, body) = ctx.send(as_user(req, "alice")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("paying"), "unexpected body: {body}");
    let (_, body) = ctx.get("alice", &format!("/api/bookings/{id}")).await;
    assert_eq!(json(&body)["booking"]["status"], "PENDING");
    let (_, body) = ctx.get("alice", "/api/payments").await;
    assert!(json(&body).as_array().unwrap().is_empty());
}
