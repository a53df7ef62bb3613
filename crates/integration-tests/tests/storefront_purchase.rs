//! Integration tests for the purchase flow.
//!
//! The fake backend records every order it receives, so these tests can
//! assert exactly when (and how often) the storefront places one.

use online_dealership_integration_tests::{
    FakeDealer, FakeDealerConfig, TestContext, address_form, camry, civic, location_of,
};
use reqwest::{StatusCode, header};

/// Start a storefront and select the Civic ($20,000) for purchase.
async fn with_civic_selected() -> (FakeDealer, TestContext) {
    let dealer = FakeDealer::start(FakeDealerConfig::with_vehicles([civic(), camry()])).await;
    let ctx = TestContext::start(&dealer).await;
    ctx.post_redirect("/vehicles/VIN1/purchase", &[], "/purchase")
        .await;
    (dealer, ctx)
}

async fn make_ready(ctx: &TestContext) {
    ctx.post_redirect("/purchase/payment", &[], "/purchase")
        .await;
    ctx.post_redirect("/purchase/address", &address_form(), "/purchase")
        .await;
}

// =============================================================================
// Purchase Page
// =============================================================================

#[tokio::test]
async fn test_purchase_without_selection() {
    let dealer = FakeDealer::start(FakeDealerConfig::with_vehicles([civic()])).await;
    let ctx = TestContext::start(&dealer).await;

    let page = ctx.get_text("/purchase").await;
    assert!(page.contains("No vehicle selected"));
}

#[tokio::test]
async fn test_purchase_page_shows_vehicle_and_records_value() {
    let (dealer, ctx) = with_civic_selected().await;

    let response = ctx.get("/purchase").await;
    assert_eq!(response.status(), StatusCode::OK);

    let value_cookie = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("vehicle-value="))
        .expect("vehicle-value cookie set")
        .to_string();
    assert!(value_cookie.contains("Max-Age=864000"));

    let page = response.text().await.unwrap();
    assert!(page.contains("2019 Honda Civic"));
    assert!(page.contains("Used"));
    assert!(page.contains("VIN1"));
    assert!(page.contains("Silver"));
    assert!(page.contains("Sedan"));
    assert!(page.contains("111 Summit St."));
    assert!(page.contains("Kent, Ohio 44240"));
    assert!(page.contains("https://img.example.com/VIN1.jpg"));
    assert!(page.contains("Vehicle Price: $20,000"));
    assert!(page.contains("Trade-In Discount: $0"));
    assert!(page.contains(r#"<span class="current-price">$20,000</span>"#));
    assert!(page.contains("Connect Virtual Payment Method"));
    assert!(page.contains("Order Now"));
    assert!(!page.contains("role=\"dialog\""));

    assert!(dealer.orders().is_empty());
}

#[tokio::test]
async fn test_current_price_subtracts_trade_in() {
    let (_dealer, ctx) = with_civic_selected().await;

    ctx.post_redirect(
        "/trade-in",
        &[("value", "5000"), ("return_to", "/purchase")],
        "/purchase",
    )
    .await;

    let page = ctx.get_text("/purchase").await;
    assert!(page.contains("Trade-In Discount: $5,000"));
    assert!(page.contains(r#"<span class="current-price">$15,000</span>"#));
}

#[tokio::test]
async fn test_current_price_is_not_clamped() {
    let (_dealer, ctx) = with_civic_selected().await;

    ctx.post_redirect("/trade-in", &[("value", "20500")], "/purchase")
        .await;

    let page = ctx.get_text("/purchase").await;
    assert!(page.contains(r#"<span class="current-price">-$500</span>"#));
}

#[tokio::test]
async fn test_negative_trade_in_is_rejected() {
    let (_dealer, ctx) = with_civic_selected().await;

    let response = ctx.post_form("/trade-in", &[("value", "-10")]).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let page = ctx.get_text("/purchase").await;
    assert!(page.contains("Trade-In Discount: $0"));
}

#[tokio::test]
async fn test_purchase_page_unavailable_when_backend_fails() {
    let config = FakeDealerConfig::with_vehicles([civic()]).broken("VIN1");
    let dealer = FakeDealer::start(config).await;
    let ctx = TestContext::start(&dealer).await;
    ctx.post_redirect("/vehicles/VIN1/purchase", &[], "/purchase")
        .await;

    let page = ctx.get_text("/purchase").await;
    assert!(page.contains("This vehicle is unavailable right now."));
}

// =============================================================================
// Readiness Modal
// =============================================================================

#[tokio::test]
async fn test_review_with_nothing_done_lists_both_errors() {
    let (_dealer, ctx) = with_civic_selected().await;

    let page = ctx.get_text("/purchase?review=1").await;
    assert!(page.contains("Add Payment Method"));
    assert!(page.contains("Submit The Order Form"));
    assert!(!page.contains("Ready to Order?"));
    assert!(!page.contains("Confirm Purchase"));
}

#[tokio::test]
async fn test_review_with_payment_only_asks_for_form() {
    let (_dealer, ctx) = with_civic_selected().await;
    ctx.post_redirect("/purchase/payment", &[], "/purchase")
        .await;

    let page = ctx.get_text("/purchase?review=1").await;
    assert!(page.contains("Virtual Payment Connected"));
    assert!(page.contains("Submit The Order Form"));
    assert!(!page.contains("Add Payment Method"));
    assert!(!page.contains("Ready to Order?"));
}

#[tokio::test]
async fn test_review_with_form_only_asks_for_payment() {
    let (_dealer, ctx) = with_civic_selected().await;
    ctx.post_redirect("/purchase/address", &address_form(), "/purchase")
        .await;

    let page = ctx.get_text("/purchase?review=1").await;
    assert!(page.contains("Add Payment Method"));
    assert!(!page.contains("Submit The Order Form"));
    assert!(!page.contains("Ready to Order?"));
}

#[tokio::test]
async fn test_review_when_ready_opens_confirmation() {
    let (_dealer, ctx) = with_civic_selected().await;
    ctx.post_redirect("/trade-in", &[("value", "5000")], "/purchase")
        .await;
    make_ready(&ctx).await;

    let page = ctx.get_text("/purchase?review=1").await;
    assert!(page.contains("Ready to Order?"));
    assert!(page.contains("You Will Owe: $15,000"));
    assert!(page.contains("Next Day Shipping"));
    assert!(page.contains("Confirm Purchase"));
    assert!(!page.contains("Add Payment Method"));
    assert!(!page.contains("Submit The Order Form"));
}

// =============================================================================
// Address Form
// =============================================================================

#[tokio::test]
async fn test_address_submit_makes_no_backend_call() {
    let (dealer, ctx) = with_civic_selected().await;
    let before = dealer.request_count();

    ctx.post_redirect("/purchase/address", &address_form(), "/purchase")
        .await;

    assert_eq!(dealer.request_count(), before);
    assert!(dealer.orders().is_empty());

    let page = ctx.get_text("/purchase").await;
    assert!(page.contains("Form has been submitted with Input: 111 Summit St Kent OH 44240"));
    assert!(page.contains(r#"value="Summit St""#));
}

#[tokio::test]
async fn test_incomplete_address_is_rejected() {
    let (dealer, ctx) = with_civic_selected().await;

    let mut form = address_form();
    form.retain(|(name, _)| *name != "zip");
    let response = ctx.post_form("/purchase/address", &form).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let page = response.text().await.unwrap();
    assert!(page.contains("Zip code is required"));
    assert!(page.contains(r#"value="Kent""#));
    assert!(!page.contains("Form has been submitted"));

    let page = ctx.get_text("/purchase?review=1").await;
    assert!(page.contains("Submit The Order Form"));
    assert!(dealer.orders().is_empty());
}

#[tokio::test]
async fn test_oversized_address_is_rejected_and_not_stored() {
    let (dealer, ctx) = with_civic_selected().await;

    let long = "x".repeat(5000);
    let form: Vec<(&str, &str)> = address_form()
        .into_iter()
        .map(|(name, value)| {
            if name == "street_name" {
                (name, long.as_str())
            } else {
                (name, value)
            }
        })
        .collect();
    let response = ctx.post_form("/purchase/address", &form).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let largest_cookie = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.len())
        .max()
        .unwrap_or_default();
    assert!(largest_cookie < 4096, "cookie of {largest_cookie} bytes");

    let page = response.text().await.unwrap();
    assert!(page.contains("Street name must be at most 100 characters"));
    assert!(!page.contains(&long));

    let page = ctx.get_text("/purchase?review=1").await;
    assert!(page.contains("Submit The Order Form"));
    assert!(dealer.orders().is_empty());
}

#[tokio::test]
async fn test_rejected_address_stays_unprocessable_when_vehicle_unavailable() {
    let config = FakeDealerConfig::with_vehicles([civic()]).broken("VIN1");
    let dealer = FakeDealer::start(config).await;
    let ctx = TestContext::start(&dealer).await;
    ctx.post_redirect("/vehicles/VIN1/purchase", &[], "/purchase")
        .await;

    let mut form = address_form();
    form.retain(|(name, _)| *name != "zip");
    let response = ctx.post_form("/purchase/address", &form).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let page = response.text().await.unwrap();
    assert!(page.contains("This vehicle is unavailable right now."));
}

// =============================================================================
// Order Submission
// =============================================================================

#[tokio::test]
async fn test_page_loads_never_place_orders() {
    let (dealer, ctx) = with_civic_selected().await;
    make_ready(&ctx).await;

    for _ in 0..3 {
        ctx.get_text("/purchase").await;
        ctx.get_text("/purchase?review=1").await;
    }

    assert!(dealer.orders().is_empty());
}

#[tokio::test]
async fn test_confirm_before_ready_redirects_to_review() {
    let (dealer, ctx) = with_civic_selected().await;

    ctx.post_redirect("/purchase/confirm", &[], "/purchase?review=1")
        .await;

    assert!(dealer.orders().is_empty());
}

#[tokio::test]
async fn test_confirm_places_exactly_one_order() {
    let (dealer, ctx) = with_civic_selected().await;
    make_ready(&ctx).await;

    let response = ctx.post_form("/purchase/confirm", &[]).await;
    assert_eq!(response.status(), StatusCode::OK);
    let page = response.text().await.unwrap();
    assert!(page.contains("Purchase Complete"));
    assert!(page.contains("Order Total: $20,000"));

    let response = ctx.post_form("/purchase/confirm", &[]).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("Purchase Complete"));

    let orders = dealer.orders();
    assert_eq!(orders.len(), 1);
    let order = &orders[0];
    assert_eq!(order["vin"], "VIN1");
    assert_eq!(order["customer_id"], 1);
    assert_eq!(order["street_name"], "Summit St");
    assert_eq!(order["street_number"], "111");
    assert_eq!(order["apartment_number"], "");
    assert_eq!(order["city"], "Kent");
    assert_eq!(order["state"], "OH");
    assert_eq!(order["zip"], "44240");
}

#[tokio::test]
async fn test_failed_order_can_be_retried() {
    let (dealer, ctx) = with_civic_selected().await;
    make_ready(&ctx).await;
    dealer.set_orders_fail(true);

    let response = ctx.post_form("/purchase/confirm", &[]).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let page = response.text().await.unwrap();
    assert!(page.contains("Your order could not be placed"));
    assert!(!page.contains("Purchase Complete"));
    assert!(dealer.orders().is_empty());

    dealer.set_orders_fail(false);
    let response = ctx.post_form("/purchase/confirm", &[]).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("Purchase Complete"));
    assert_eq!(dealer.orders().len(), 1);
}

#[tokio::test]
async fn test_selecting_another_vehicle_starts_a_new_draft() {
    let (_dealer, ctx) = with_civic_selected().await;
    make_ready(&ctx).await;

    let response = ctx.post_form("/vehicles/VIN2/purchase", &[]).await;
    assert_eq!(location_of(&response), "/purchase");

    let page = ctx.get_text("/purchase?review=1").await;
    assert!(page.contains("2018 Toyota Camry"));
    assert!(page.contains("Add Payment Method"));
    assert!(page.contains("Submit The Order Form"));
}
