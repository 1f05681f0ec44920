// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end integration tests for the complete herald pipeline.
//!
//! Each test creates an isolated TestHarness with temp SQLite and a mock
//! vendor, serves the gateway router on an ephemeral port, and drives it
//! over HTTP. Tests are independent and order-insensitive.

use std::time::Duration;

use herald_gateway::{router, AuthConfig, GatewayState, HealthState};
use herald_test_utils::{TestHarness, VendorOutcome};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

/// Serve the gateway router for `harness` on an ephemeral port.
async fn spawn_gateway(
    harness: &TestHarness,
    bearer_token: Option<&str>,
) -> (String, CancellationToken) {
    let state = GatewayState {
        db: harness.db.clone(),
        assist: None,
        auth: AuthConfig {
            bearer_token: bearer_token.map(str::to_string),
        },
        health: HealthState {
            start_time: std::time::Instant::now(),
            prometheus_render: None,
        },
    };
    let app = router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown.cancelled_owned())
            .await
            .unwrap();
    });

    (format!("http://{addr}"), cancel)
}

async fn create_customer(client: &reqwest::Client, base: &str, body: Value) -> Value {
    let resp = client
        .post(format!("{base}/v1/customers"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    resp.json().await.unwrap()
}

/// Poll the campaign endpoint until the run reaches a terminal state.
async fn poll_until_terminal(client: &reqwest::Client, base: &str, campaign_id: i64) -> Value {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let campaign: Value = client
            .get(format!("{base}/v1/campaigns/{campaign_id}"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        if campaign["status"] == "completed" || campaign["status"] == "failed" {
            return campaign;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "campaign never reached a terminal state"
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

// ---- Test 1: Full campaign pipeline over HTTP ----

#[tokio::test]
async fn test_campaign_pipeline_delivers_to_the_matching_audience() {
    let harness = TestHarness::builder().build().await.unwrap();
    let (base, cancel) = spawn_gateway(&harness, None).await;
    let client = reqwest::Client::new();

    // Ingest three customers; two will match the segment.
    for (name, email, spent) in [
        ("Rahul Sharma", "rahul@example.com", 15000.0),
        ("Priya Patel", "priya@example.com", 22000.0),
        ("Ritu Sharma", "ritu@example.com", 800.0),
    ] {
        create_customer(
            &client,
            &base,
            json!({"name": name, "email": email, "total_spent": spent, "visit_count": 3}),
        )
        .await;
    }

    let resp = client
        .post(format!("{base}/v1/segments"))
        .json(&json!({
            "name": "High spenders",
            "rules": {
                "conditions": [
                    {"field": "totalSpent", "operator": ">", "value": "10000"}
                ],
                "operator": "AND"
            }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let segment: Value = resp.json().await.unwrap();
    assert_eq!(segment["audience_size"], 2);

    // Creation responds immediately with a draft; delivery is queued.
    let resp = client
        .post(format!("{base}/v1/campaigns"))
        .json(&json!({
            "name": "Diwali sale",
            "segment_id": segment["id"],
            "message": "Hi {name}, 20% off this week!"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let campaign: Value = resp.json().await.unwrap();
    assert_eq!(campaign["status"], "draft");
    let campaign_id = campaign["id"].as_i64().unwrap();

    // A delivery worker picks the queued run up and finalizes the campaign.
    let worker_cancel = CancellationToken::new();
    let worker = harness.start_worker(worker_cancel.clone());

    let finalized = poll_until_terminal(&client, &base, campaign_id).await;
    assert_eq!(finalized["status"], "completed");
    assert_eq!(finalized["audience_size"], 2);
    assert_eq!(finalized["delivered_count"], 2);
    assert_eq!(finalized["failed_count"], 0);
    assert_eq!(finalized["success_rate"], 100.0);

    // Receipts finalize the per-recipient ledger after the run.
    assert_eq!(harness.apply_pending_receipts().await.unwrap(), 2);
    let logs: Value = client
        .get(format!("{base}/v1/campaigns/{campaign_id}/logs"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let logs = logs.as_array().unwrap();
    assert_eq!(logs.len(), 2);
    for log in logs {
        assert_eq!(log["status"], "sent");
        assert!(log["vendor_id"].is_string());
    }

    // Placeholders were rendered per recipient.
    let messages: Vec<&str> = logs.iter().map(|l| l["message"].as_str().unwrap()).collect();
    assert!(messages.contains(&"Hi Rahul Sharma, 20% off this week!"));
    assert!(messages.contains(&"Hi Priya Patel, 20% off this week!"));

    // The dashboard sees the finalized run.
    let stats: Value = client
        .get(format!("{base}/v1/dashboard/stats"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stats["total_customers"], 3);
    assert_eq!(stats["active_campaigns"], 0);
    assert_eq!(stats["avg_delivery_rate"], 100.0);

    worker_cancel.cancel();
    worker.await.unwrap();
    cancel.cancel();
    harness.db.close().await.unwrap();
}

// ---- Test 2: Order ingestion drives the rule aggregates ----

#[tokio::test]
async fn test_order_ingestion_updates_rule_aggregates() {
    let harness = TestHarness::builder().build().await.unwrap();
    let (base, cancel) = spawn_gateway(&harness, None).await;
    let client = reqwest::Client::new();

    let customer = create_customer(
        &client,
        &base,
        json!({"name": "Amit Kumar", "email": "amit@example.com"}),
    )
    .await;
    let customer_id = customer["id"].as_i64().unwrap();
    assert_eq!(customer["total_spent"], 0.0);

    for amount in [4200.0, 1800.0] {
        let resp = client
            .post(format!("{base}/v1/orders"))
            .json(&json!({"customer_id": customer_id, "amount": amount}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 201);
    }

    let refreshed: Value = client
        .get(format!("{base}/v1/customers/{customer_id}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(refreshed["total_spent"], 6000.0);
    assert_eq!(refreshed["visit_count"], 2);
    assert!(refreshed["last_purchase_date"].is_string());

    // An order for a missing customer is rejected, aggregates untouched.
    let resp = client
        .post(format!("{base}/v1/orders"))
        .json(&json!({"customer_id": 9999, "amount": 100.0}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    // Preview sees the fresh aggregates without persisting a segment.
    let preview: Value = client
        .post(format!("{base}/v1/segments/preview"))
        .json(&json!({
            "rules": {
                "conditions": [
                    {"field": "totalSpent", "operator": ">=", "value": "6000"}
                ],
                "operator": "AND"
            }
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(preview["audience_size"], 1);
    assert_eq!(preview["percentage"], 100.0);

    let segments: Value = client
        .get(format!("{base}/v1/segments"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(segments.as_array().unwrap().is_empty());

    cancel.cancel();
    harness.db.close().await.unwrap();
}

// ---- Test 3: Scripted failures land in the campaign counters ----

#[tokio::test]
async fn test_partial_failure_is_reflected_in_counters_and_logs() {
    let harness = TestHarness::builder()
        .with_script(vec![
            VendorOutcome::Sent,
            VendorOutcome::Failed("Email bounced".to_string()),
        ])
        .build()
        .await
        .unwrap();
    let (base, cancel) = spawn_gateway(&harness, None).await;
    let client = reqwest::Client::new();

    for (name, email) in [
        ("Kavita Joshi", "kavita@example.com"),
        ("Deepak Agarwal", "deepak@example.com"),
    ] {
        create_customer(&client, &base, json!({"name": name, "email": email})).await;
    }

    let resp = client
        .post(format!("{base}/v1/segments"))
        .json(&json!({"name": "Everyone", "rules": {"conditions": [], "operator": "AND"}}))
        .send()
        .await
        .unwrap();
    let segment: Value = resp.json().await.unwrap();

    let resp = client
        .post(format!("{base}/v1/campaigns"))
        .json(&json!({
            "name": "Weekend push",
            "segment_id": segment["id"],
            "message": "Hi {name}!"
        }))
        .send()
        .await
        .unwrap();
    let campaign: Value = resp.json().await.unwrap();
    let campaign_id = campaign["id"].as_i64().unwrap();

    let worker_cancel = CancellationToken::new();
    let worker = harness.start_worker(worker_cancel.clone());

    let finalized = poll_until_terminal(&client, &base, campaign_id).await;
    assert_eq!(finalized["delivered_count"], 1);
    assert_eq!(finalized["failed_count"], 1);
    assert_eq!(finalized["success_rate"], 50.0);

    harness.apply_pending_receipts().await.unwrap();
    let logs: Value = client
        .get(format!("{base}/v1/campaigns/{campaign_id}/logs"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let statuses: Vec<&str> = logs
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["status"].as_str().unwrap())
        .collect();
    assert!(statuses.contains(&"sent"));
    assert!(statuses.contains(&"failed"));

    worker_cancel.cancel();
    worker.await.unwrap();
    cancel.cancel();
    harness.db.close().await.unwrap();
}

// ---- Test 4: Bearer auth on the user-facing routes ----

#[tokio::test]
async fn test_bearer_auth_guards_the_user_facing_routes() {
    let harness = TestHarness::builder().build().await.unwrap();
    let (base, cancel) = spawn_gateway(&harness, Some("test-token")).await;
    let client = reqwest::Client::new();

    // No token and a wrong token are rejected.
    let resp = client
        .get(format!("{base}/v1/customers"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    let resp = client
        .get(format!("{base}/v1/customers"))
        .bearer_auth("wrong")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    // The configured token passes.
    let resp = client
        .get(format!("{base}/v1/customers"))
        .bearer_auth("test-token")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // Machine ingestion stays public.
    create_customer(
        &client,
        &base,
        json!({"name": "Vikram Singh", "email": "vikram@example.com"}),
    )
    .await;

    cancel.cancel();
    harness.db.close().await.unwrap();
}

// ---- Test 5: Delivery receipt endpoint ----

#[tokio::test]
async fn test_delivery_receipt_endpoint_finalizes_a_log() {
    let harness = TestHarness::builder().build().await.unwrap();
    let (base, cancel) = spawn_gateway(&harness, None).await;
    let client = reqwest::Client::new();

    create_customer(
        &client,
        &base,
        json!({"name": "Anita Gupta", "email": "anita@example.com"}),
    )
    .await;
    let resp = client
        .post(format!("{base}/v1/segments"))
        .json(&json!({"name": "Everyone", "rules": {"conditions": [], "operator": "AND"}}))
        .send()
        .await
        .unwrap();
    let segment: Value = resp.json().await.unwrap();
    let resp = client
        .post(format!("{base}/v1/campaigns"))
        .json(&json!({
            "name": "Receipt test",
            "segment_id": segment["id"],
            "message": "Hi {name}!"
        }))
        .send()
        .await
        .unwrap();
    let campaign: Value = resp.json().await.unwrap();
    let campaign_id = campaign["id"].as_i64().unwrap();

    // Run the queued campaign directly; the buffered receipts are never
    // applied, so the log stays pending for the HTTP receipt below.
    harness.run_campaign(campaign_id).await.unwrap();

    let logs: Value = client
        .get(format!("{base}/v1/campaigns/{campaign_id}/logs"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let log_id = logs[0]["id"].as_i64().unwrap();
    assert_eq!(logs[0]["status"], "pending");

    // A status outside SENT/FAILED is rejected.
    let resp = client
        .post(format!("{base}/v1/delivery-receipt"))
        .json(&json!({"log_id": log_id, "vendor_id": "vendor_99", "status": "QUEUED"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // An unknown log id is a 404.
    let resp = client
        .post(format!("{base}/v1/delivery-receipt"))
        .json(&json!({"log_id": 9999, "vendor_id": "vendor_99", "status": "SENT"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    // A valid receipt finalizes the log.
    let resp = client
        .post(format!("{base}/v1/delivery-receipt"))
        .json(&json!({
            "log_id": log_id,
            "vendor_id": "vendor_99",
            "status": "FAILED",
            "failure_reason": "Email bounced"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let logs: Value = client
        .get(format!("{base}/v1/campaigns/{campaign_id}/logs"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(logs[0]["status"], "failed");
    assert_eq!(logs[0]["failure_reason"], "Email bounced");
    assert_eq!(logs[0]["vendor_id"], "vendor_99");

    cancel.cancel();
    harness.db.close().await.unwrap();
}

// ---- Test 6: Health and metrics endpoints ----

#[tokio::test]
async fn test_health_reports_ok_and_metrics_404_without_exporter() {
    let harness = TestHarness::builder().build().await.unwrap();
    let (base, cancel) = spawn_gateway(&harness, Some("test-token")).await;
    let client = reqwest::Client::new();

    // Health needs no credentials even when a token is configured.
    let resp = client.get(format!("{base}/health")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let health: Value = resp.json().await.unwrap();
    assert_eq!(health["status"], "ok");
    assert!(health["version"].is_string());
    assert!(health["uptime_secs"].is_u64());

    // No Prometheus recorder installed in tests.
    let resp = client.get(format!("{base}/metrics")).send().await.unwrap();
    assert_eq!(resp.status(), 404);

    cancel.cancel();
    harness.db.close().await.unwrap();
}

// ---- Test 7: Validation errors surface as structured 4xx bodies ----

#[tokio::test]
async fn test_validation_errors_return_structured_bodies() {
    let harness = TestHarness::builder().build().await.unwrap();
    let (base, cancel) = spawn_gateway(&harness, None).await;
    let client = reqwest::Client::new();

    // Blank customer name.
    let resp = client
        .post(format!("{base}/v1/customers"))
        .json(&json!({"name": "  ", "email": "blank@example.com"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].is_string());

    // Campaign against a segment that does not exist.
    let resp = client
        .post(format!("{base}/v1/campaigns"))
        .json(&json!({"name": "Orphan", "segment_id": 9999, "message": "Hi {name}!"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("segment"));

    cancel.cancel();
    harness.db.close().await.unwrap();
}

// ---- Test 8: Independent test isolation ----

#[tokio::test]
async fn test_harness_isolation() {
    // Two harnesses should be completely independent.
    let h1 = TestHarness::builder().build().await.unwrap();
    let h2 = TestHarness::builder().build().await.unwrap();
    let (base1, cancel1) = spawn_gateway(&h1, None).await;
    let (base2, cancel2) = spawn_gateway(&h2, None).await;
    let client = reqwest::Client::new();

    create_customer(
        &client,
        &base1,
        json!({"name": "Raj Mehta", "email": "raj@example.com"}),
    )
    .await;

    let c1: Value = client
        .get(format!("{base1}/v1/customers"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let c2: Value = client
        .get(format!("{base2}/v1/customers"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(c1.as_array().unwrap().len(), 1);
    assert!(c2.as_array().unwrap().is_empty());

    cancel1.cancel();
    cancel2.cancel();
    h1.db.close().await.unwrap();
    h2.db.close().await.unwrap();
}
