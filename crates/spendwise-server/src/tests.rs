//! Server API tests

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use spendwise_core::advisor::{LIFESTYLE_ADVICE_FALLBACK, SPENDING_ADVICE_FALLBACK};
use spendwise_core::{AIClient, DebtTier, MockBackend, NewEmi, NewFixedExpense, NewSavingsGoal};
use std::time::Duration;
use tower::ServiceExt;

fn household() -> FinancialSnapshot {
    let mut snapshot = FinancialSnapshot::with_income(75000.0).unwrap();
    snapshot
        .add_fixed_expense(NewFixedExpense {
            name: "Rent".into(),
            amount: 30000.0,
        })
        .unwrap();
    snapshot
        .add_savings_goal(NewSavingsGoal {
            name: "Emergency fund".into(),
            amount: 10000.0,
            is_percentage: None,
        })
        .unwrap();
    snapshot
        .add_emi(NewEmi {
            loan_type: "Car Loan".into(),
            principal: 500000.0,
            interest_rate: 9.5,
            tenure: 36,
            monthly_installment: 15000.0,
            start_date: chrono::NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            end_date: chrono::NaiveDate::from_ymd_opt(2099, 12, 5).unwrap(),
        })
        .unwrap();
    snapshot
}

fn mock_advisor(mock: MockBackend) -> Advisor {
    let config = AdvisorConfig::embedded()
        .unwrap()
        .with_timeout(Duration::from_millis(200));
    Advisor::new(AIClient::Mock(mock), config)
}

fn setup_test_app() -> Router {
    create_router(FinancialSnapshot::new(), None, ServerConfig::default())
}

fn setup_app_with_advisor(snapshot: FinancialSnapshot, mock: MockBackend) -> Router {
    create_router(snapshot, Some(mock_advisor(mock)), ServerConfig::default())
}

async fn get_body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body();
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn send_json(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// ========== Health ==========

#[tokio::test]
async fn test_health_without_ai() {
    let app = setup_test_app();

    let response = app.oneshot(get("/api/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["ai"]["configured"], false);
    assert!(json["ai"].get("backend").is_none());
}

#[tokio::test]
async fn test_health_with_mock_ai() {
    let app = setup_app_with_advisor(FinancialSnapshot::new(), MockBackend::new());

    let json = get_body_json(app.oneshot(get("/api/health")).await.unwrap()).await;
    assert_eq!(json["ai"]["configured"], true);
    assert_eq!(json["ai"]["healthy"], true);
    assert_eq!(json["ai"]["backend"]["backend"], "mock");
}

#[tokio::test]
async fn test_security_headers() {
    let app = setup_test_app();

    let response = app.oneshot(get("/api/health")).await.unwrap();
    let headers = response.headers();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert!(headers.contains_key("content-security-policy"));
}

// ========== Snapshot ==========

#[tokio::test]
async fn test_set_income_and_add_records() {
    let app = setup_test_app();

    let response = app
        .clone()
        .oneshot(send_json(
            "PUT",
            "/api/snapshot/income",
            serde_json::json!({ "monthlyIncome": 50000 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(get_body_json(response).await["monthlyIncome"], 50000.0);

    let response = app
        .clone()
        .oneshot(send_json(
            "POST",
            "/api/expenses",
            serde_json::json!({
                "description": "Supermarket",
                "amount": 4200,
                "category": "Groceries",
                "date": "2024-03-02"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let expense = get_body_json(response).await;
    assert!(expense["id"].is_string());
    assert_eq!(expense["category"], "Groceries");

    let snapshot = get_body_json(app.oneshot(get("/api/snapshot")).await.unwrap()).await;
    assert_eq!(snapshot["generalExpenses"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_negative_income_rejected() {
    let app = setup_test_app();

    let response = app
        .oneshot(send_json(
            "PUT",
            "/api/snapshot/income",
            serde_json::json!({ "monthlyIncome": -1 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = get_body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("monthly income"));
}

#[tokio::test]
async fn test_unknown_category_rejected() {
    let app = setup_test_app();

    let response = app
        .oneshot(send_json(
            "POST",
            "/api/expenses",
            serde_json::json!({
                "description": "Gadget",
                "amount": 100,
                "category": "Gadgets",
                "date": "2024-03-02"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_remove_record() {
    let snapshot = household();
    let id = snapshot.fixed_expenses[0].id;
    let app = create_router(snapshot, None, ServerConfig::default());

    let delete = |id: String| {
        Request::builder()
            .method("DELETE")
            .uri(format!("/api/fixed-expenses/{}", id))
            .body(Body::empty())
            .unwrap()
    };

    let response = app.clone().oneshot(delete(id.to_string())).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(get_body_json(response).await["success"], true);

    // Already gone
    let response = app.clone().oneshot(delete(id.to_string())).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.oneshot(delete("not-a-uuid".into())).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_dashboard_figures() {
    let app = create_router(household(), None, ServerConfig::default());

    let response = app.oneshot(get("/api/dashboard")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["spendingPower"], 20000.0);
    assert_eq!(json["debtTier"], "healthy");
    assert_eq!(json["minimumSalary"], 45000.0);
    assert_eq!(json["upcomingEmis"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_dashboard_without_income_has_no_ratio() {
    let mut snapshot = household();
    snapshot.set_monthly_income(0.0).unwrap();
    let app = create_router(snapshot, None, ServerConfig::default());

    let json = get_body_json(app.oneshot(get("/api/dashboard")).await.unwrap()).await;
    assert!(json["incomeToDebtRatio"].is_null());
    assert_eq!(json["spendingPower"], -55000.0);
}

#[tokio::test]
async fn test_breakdown_empty() {
    let app = setup_test_app();

    let json = get_body_json(app.oneshot(get("/api/expenses/breakdown")).await.unwrap()).await;
    assert_eq!(json, serde_json::json!([]));
}

// ========== Calculators ==========

#[tokio::test]
async fn test_calculate_spending_power() {
    let app = setup_test_app();

    let response = app
        .oneshot(send_json(
            "POST",
            "/api/calculate/spending-power",
            serde_json::json!({
                "monthlyIncome": 10000,
                "fixedExpenses": 8000,
                "savingsGoal": 3000,
                "emis": 1500
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(get_body_json(response).await["spendingPower"], -2500.0);
}

#[tokio::test]
async fn test_calculate_analysis() {
    let app = setup_test_app();

    let response = app
        .oneshot(send_json(
            "POST",
            "/api/calculate/analysis",
            serde_json::json!({ "monthlyIncome": 60000, "totalEmis": 20000 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["incomeToDebtRatio"], 0.33);
    assert_eq!(json["debtTier"], "healthy");
    assert_eq!(json["minimumSalary"], 60000.0);
}

#[tokio::test]
async fn test_calculate_analysis_tier_follows_rounded_ratio() {
    let app = setup_test_app();

    let response = app
        .oneshot(send_json(
            "POST",
            "/api/calculate/analysis",
            serde_json::json!({ "monthlyIncome": 100000, "totalEmis": 36400 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["incomeToDebtRatio"], 0.36);
    assert_eq!(json["debtTier"], "healthy");
    assert_eq!(json["message"], DebtTier::Healthy.message());
}

#[tokio::test]
async fn test_calculate_analysis_zero_income() {
    let app = setup_test_app();

    let response = app
        .oneshot(send_json(
            "POST",
            "/api/calculate/analysis",
            serde_json::json!({ "monthlyIncome": 0, "totalEmis": 5000 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = setup_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/calculate/analysis")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ========== Advice ==========

#[tokio::test]
async fn test_spending_advice_generated_and_stored() {
    let app = setup_app_with_advisor(household(), MockBackend::new());

    let response = app
        .clone()
        .oneshot(send_json(
            "POST",
            "/api/advice/spending",
            serde_json::json!({ "spendingData": "Lots of takeaway food" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["status"], "generated");
    assert!(json["advice"]
        .as_str()
        .unwrap()
        .contains("Lots of takeaway food"));

    let stored = get_body_json(app.oneshot(get("/api/advice/spending")).await.unwrap()).await;
    assert_eq!(stored["inFlight"], false);
    assert_eq!(stored["current"]["advice"], json["advice"]);
}

#[tokio::test]
async fn test_spending_advice_without_backend_falls_back() {
    let app = create_router(household(), None, ServerConfig::default());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/advice/spending")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["status"], "fallback");
    assert_eq!(json["advice"], SPENDING_ADVICE_FALLBACK);
}

#[tokio::test]
async fn test_spending_advice_rejects_mistyped_body() {
    let app = setup_app_with_advisor(household(), MockBackend::new());

    let response = app
        .oneshot(send_json(
            "POST",
            "/api/advice/spending",
            serde_json::json!({ "income": "lots", "emiPayments": 999 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_spending_advice_rejects_negative_override() {
    let app = setup_app_with_advisor(household(), MockBackend::new());

    let response = app
        .oneshot(send_json(
            "POST",
            "/api/advice/spending",
            serde_json::json!({ "income": -5 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_lifestyle_guide_from_snapshot() {
    let app = setup_app_with_advisor(household(), MockBackend::new());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/advice/lifestyle")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["status"], "generated");
    assert!(json["lifestyleAdvice"].as_str().unwrap().contains("20000"));
    assert!(json["overLeveragingTips"].is_string());
}

#[tokio::test]
async fn test_lifestyle_guide_needs_income() {
    // EMIs on record but no income
    let mut snapshot = household();
    snapshot.set_monthly_income(0.0).unwrap();
    let app = setup_app_with_advisor(snapshot, MockBackend::new());

    let response = app
        .oneshot(send_json("POST", "/api/advice/lifestyle", serde_json::json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_lifestyle_guide_backend_down_falls_back() {
    let app = setup_app_with_advisor(household(), MockBackend::unhealthy());

    let response = app
        .oneshot(send_json(
            "POST",
            "/api/advice/lifestyle",
            serde_json::json!({
                "spendingPower": 1000,
                "totalMonthlyExpenses": 40000,
                "incomeToDebtRatio": 0.45
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["status"], "fallback");
    assert_eq!(json["lifestyleAdvice"], LIFESTYLE_ADVICE_FALLBACK);
}

#[tokio::test]
async fn test_second_request_while_in_flight_conflicts() {
    let app = setup_app_with_advisor(
        household(),
        MockBackend::new().with_delay(Duration::from_millis(100)),
    );

    let first = tokio::spawn(
        app.clone()
            .oneshot(send_json("POST", "/api/advice/spending", serde_json::json!({}))),
    );
    tokio::time::sleep(Duration::from_millis(20)).await;

    let response = app.clone().oneshot(get("/api/advice/spending")).await.unwrap();
    let in_flight = get_body_json(response).await;
    assert_eq!(in_flight["inFlight"], true);

    let second = app
        .clone()
        .oneshot(send_json("POST", "/api/advice/spending", serde_json::json!({})))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);

    let first = first.await.unwrap().unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let stored = get_body_json(app.oneshot(get("/api/advice/spending")).await.unwrap()).await;
    assert_eq!(stored["inFlight"], false);
    assert_eq!(stored["current"]["status"], "generated");
}
