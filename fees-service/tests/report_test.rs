mod common;

use chrono::Datelike;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use serial_test::serial;
use uuid::Uuid;

fn dec(v: &Value) -> Decimal {
    match v {
        Value::String(s) => s.parse().expect("decimal string"),
        Value::Number(n) => n.to_string().parse().expect("decimal number"),
        other => panic!("expected decimal, got {:?}", other),
    }
}

/// Seed a student with a one-time structure and optionally pay toward it.
/// Returns (student_id, structure_id).
async fn seed_student_with_fee(
    app: &common::TestApp,
    base_amount: &str,
    paid: Option<(&str, chrono::NaiveDate)>,
) -> (Uuid, Uuid) {
    let class_id = common::create_class(&app.pool).await;
    let year_id = common::ensure_current_academic_year(&app.pool).await;
    let student_id = common::create_student(&app.pool, class_id).await;
    let structure_id = common::create_fee_structure(
        &app.pool,
        year_id,
        Some(class_id),
        "tuition",
        base_amount.parse().unwrap(),
        "one_time",
    )
    .await;

    if let Some((paid_amount, payment_date)) = paid {
        let response = app
            .post_json(
                "/fees/payments",
                "ACCOUNTANT",
                &json!({
                    "studentId": student_id,
                    "feeStructureId": structure_id,
                    "amount": base_amount,
                    "paidAmount": paid_amount,
                    "paymentMode": "CASH",
                    "forMonth": common::unique_for_month(),
                    "paymentDate": payment_date,
                }),
            )
            .await;
        assert_eq!(response.status(), 201);
    }

    (student_id, structure_id)
}

#[tokio::test]
#[serial]
async fn unpaid_student_appears_in_defaulters() {
    let Some(app) = common::spawn_app().await else {
        return;
    };

    let (student_id, _) = seed_student_with_fee(&app, "1000", None).await;

    let response = app
        .get(&format!("/fees/status/{}", student_id), "ADMIN")
        .await;
    let status: Value = response.json().await.unwrap();
    let expected_balance = dec(&status["summary"]["totalBalance"]);
    assert!(expected_balance >= Decimal::from(1000));

    let response = app.get("/fees/reports?type=defaulters", "ADMIN").await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    let entry = body
        .as_array()
        .unwrap()
        .iter()
        .find(|d| d["studentId"] == json!(student_id))
        .expect("unpaid student missing from defaulters");
    assert_eq!(dec(&entry["balanceDue"]), expected_balance);
}

#[tokio::test]
#[serial]
async fn a_paisa_short_is_still_a_defaulter() {
    let Some(app) = common::spawn_app().await else {
        return;
    };

    let date = common::unique_payment_date();
    let (student_id, _) = seed_student_with_fee(&app, "1000", Some(("999.99", date))).await;

    let response = app
        .get(&format!("/fees/status/{}", student_id), "ADMIN")
        .await;
    let status: Value = response.json().await.unwrap();
    let expected_balance = dec(&status["summary"]["totalBalance"]);
    assert!(expected_balance >= "0.01".parse().unwrap());

    let response = app.get("/fees/reports?type=defaulters", "ADMIN").await;
    let body: Value = response.json().await.unwrap();
    let entry = body
        .as_array()
        .unwrap()
        .iter()
        .find(|d| d["studentId"] == json!(student_id))
        .expect("underpaid student missing from defaulters");
    assert_eq!(dec(&entry["balanceDue"]), expected_balance);
}

#[tokio::test]
#[serial]
async fn settled_student_is_not_a_defaulter() {
    let Some(app) = common::spawn_app().await else {
        return;
    };

    let (student_id, _) = seed_student_with_fee(&app, "1000", None).await;

    // Settle every outstanding structure, including any year-wide ones.
    let response = app
        .get(&format!("/fees/status/{}", student_id), "ACCOUNTANT")
        .await;
    let status: Value = response.json().await.unwrap();
    for entry in status["feeStatus"].as_array().unwrap() {
        let balance = dec(&entry["balance"]);
        if balance <= Decimal::ZERO {
            continue;
        }
        let response = app
            .post_json(
                "/fees/payments",
                "ACCOUNTANT",
                &json!({
                    "studentId": student_id,
                    "feeStructureId": entry["structureId"],
                    "amount": balance.to_string(),
                    "paidAmount": balance.to_string(),
                    "paymentMode": "CASH",
                    "forMonth": common::unique_for_month(),
                }),
            )
            .await;
        assert_eq!(response.status(), 201);
    }

    let response = app.get("/fees/reports?type=defaulters", "ADMIN").await;
    let body: Value = response.json().await.unwrap();
    assert!(body
        .as_array()
        .unwrap()
        .iter()
        .all(|d| d["studentId"] != json!(student_id)));
}

#[tokio::test]
#[serial]
async fn collection_summary_counts_completed_payments_in_range() {
    let Some(app) = common::spawn_app().await else {
        return;
    };

    let date = common::unique_payment_date();
    seed_student_with_fee(&app, "1000", Some(("1000", date))).await;

    let response = app
        .get(
            &format!(
                "/fees/reports?type=collection-summary&fromDate={}&toDate={}",
                date, date
            ),
            "ADMIN",
        )
        .await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(dec(&body["totalPaid"]), Decimal::from(1000));
    assert_eq!(body["transactionCount"], 1);
    let by_type = body["byFeeType"].as_array().unwrap();
    assert_eq!(by_type.len(), 1);
    assert_eq!(by_type[0]["feeType"], "TUITION");
    assert_eq!(dec(&by_type[0]["totalPaid"]), Decimal::from(1000));
}

#[tokio::test]
#[serial]
async fn pending_payments_are_excluded_from_collection_summary() {
    let Some(app) = common::spawn_app().await else {
        return;
    };

    let date = common::unique_payment_date();
    seed_student_with_fee(&app, "1000", Some(("400", date))).await;

    let response = app
        .get(
            &format!(
                "/fees/reports?type=collection-summary&fromDate={}&toDate={}",
                date, date
            ),
            "ADMIN",
        )
        .await;
    let body: Value = response.json().await.unwrap();
    assert_eq!(dec(&body["totalPaid"]), Decimal::ZERO);
    assert_eq!(body["transactionCount"], 0);
}

#[tokio::test]
#[serial]
async fn payment_mode_breakdown_reports_the_mode_used() {
    let Some(app) = common::spawn_app().await else {
        return;
    };

    let date = common::unique_payment_date();
    seed_student_with_fee(&app, "750", Some(("750", date))).await;

    let response = app
        .get(
            &format!(
                "/fees/reports?type=payment-mode&fromDate={}&toDate={}",
                date, date
            ),
            "ADMIN",
        )
        .await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    let modes = body.as_array().unwrap();
    assert_eq!(modes.len(), 1);
    assert_eq!(modes[0]["paymentMode"], "CASH");
    assert_eq!(dec(&modes[0]["totalPaid"]), Decimal::from(750));
}

#[tokio::test]
#[serial]
async fn monthly_collection_buckets_by_payment_month() {
    let Some(app) = common::spawn_app().await else {
        return;
    };

    let date = common::unique_payment_date();
    seed_student_with_fee(&app, "1200", Some(("1200", date))).await;

    let response = app
        .get(
            &format!(
                "/fees/reports?type=monthly-collection&fromDate={}-01-01",
                date.year()
            ),
            "ADMIN",
        )
        .await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["year"], date.year());
    let months = body["months"].as_array().unwrap();
    assert_eq!(months.len(), 12);
    let bucket = &months[date.month() as usize - 1];
    assert_eq!(bucket["month"], date.month());
    assert_eq!(dec(&bucket["totalPaid"]), Decimal::from(1200));
    assert_eq!(bucket["transactionCount"], 1);
}

#[tokio::test]
#[serial]
async fn class_wise_breakdown_reports_per_class_totals() {
    let Some(app) = common::spawn_app().await else {
        return;
    };

    let date = common::unique_payment_date();
    let (student_id, _) = seed_student_with_fee(&app, "500", Some(("500", date))).await;

    let (class_id,): (Uuid,) =
        sqlx::query_as("SELECT class_id FROM students WHERE student_id = $1")
            .bind(student_id)
            .fetch_one(&app.pool)
            .await
            .unwrap();

    let response = app
        .get(
            &format!(
                "/fees/reports?type=class-wise&fromDate={}&toDate={}",
                date, date
            ),
            "ADMIN",
        )
        .await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    let classes = body.as_array().unwrap();
    assert_eq!(classes.len(), 1);
    assert_eq!(classes[0]["classId"], json!(class_id));
    assert_eq!(dec(&classes[0]["totalPaid"]), Decimal::from(500));
}

#[tokio::test]
#[serial]
async fn unknown_report_type_is_a_400() {
    let Some(app) = common::spawn_app().await else {
        return;
    };

    let response = app.get("/fees/reports?type=everything", "ADMIN").await;
    assert_eq!(response.status(), 400);
}
