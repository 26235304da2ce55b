//! Cart behavior through the storefront's forms.

use emporium_integration_tests::{SHOPPER_EMAIL, TestApp, location};

fn line_count(page: &str) -> usize {
    page.matches(r#"aria-label="Quantity""#).count()
}

// =============================================================================
// Guest Cart
// =============================================================================

#[tokio::test]
async fn test_adding_same_product_twice_keeps_one_line() {
    let app = TestApp::spawn().await;

    let response = app.add_to_cart("p1", 1).await;
    assert_eq!(response.status(), 303);
    assert_eq!(location(&response), "/cart");
    app.add_to_cart("p1", 2).await;

    let page = app.page("/cart").await;
    assert_eq!(line_count(&page), 1);
    assert!(page.contains(r#"name="quantity" value="3""#));
    assert!(page.contains("$120.00"));
}

#[tokio::test]
async fn test_decrement_stops_at_one() {
    let app = TestApp::spawn().await;
    app.add_to_cart("p1", 2).await;

    app.post_form("/cart/decrement", &[("product_id", "p1")]).await;
    assert_eq!(app.page("/cart/count").await.trim(), r#"<span class="badge" id="cart-count">1</span>"#);

    let response = app
        .post_form("/cart/decrement", &[("product_id", "p1")])
        .await;
    assert_eq!(response.status(), 303);

    let page = app.page("/cart").await;
    assert!(page.contains("Quantity cannot go below 1"));
    assert!(page.contains(r#"name="quantity" value="1""#));
}

#[tokio::test]
async fn test_bad_quantity_fields_become_toasts() {
    let app = TestApp::spawn().await;

    let response = app
        .post_form("/cart/add", &[("product_id", "p1"), ("quantity", "-1")])
        .await;
    assert_eq!(response.status(), 303);
    assert_eq!(location(&response), "/cart");
    let page = app.page("/cart").await;
    assert!(page.contains("Quantity must be at least 1"));
    assert_eq!(line_count(&page), 0);

    app.add_to_cart("p1", 2).await;
    let response = app
        .post_form("/cart/update", &[("product_id", "p1"), ("quantity", "")])
        .await;
    assert_eq!(response.status(), 303);
    assert_eq!(location(&response), "/cart");

    let page = app.page("/cart").await;
    assert!(page.contains("Quantity must be at least 1"));
    assert!(page.contains(r#"name="quantity" value="2""#));
}

#[tokio::test]
async fn test_cannot_exceed_stock() {
    let app = TestApp::spawn().await;
    app.add_to_cart("p2", 2).await;

    app.post_form("/cart/increment", &[("product_id", "p2")]).await;

    let page = app.page("/cart").await;
    assert!(page.contains("Only 2 in stock"));
    assert!(page.contains(r#"name="quantity" value="2""#));
}

#[tokio::test]
async fn test_sold_out_product_is_refused() {
    let app = TestApp::spawn().await;

    app.add_to_cart("p3", 1).await;

    let page = app.page("/cart").await;
    assert!(page.contains("Only 0 in stock"));
    assert_eq!(line_count(&page), 0);
}

#[tokio::test]
async fn test_remove_and_clear() {
    let app = TestApp::spawn().await;
    app.add_to_cart("p1", 1).await;
    app.add_to_cart("p2", 1).await;

    app.post_form("/cart/remove", &[("product_id", "p1")]).await;
    let page = app.page("/cart").await;
    assert_eq!(line_count(&page), 1);
    assert!(page.contains("Oak Desk"));

    app.post_form("/cart/clear", &[]).await;
    let page = app.page("/cart").await;
    assert!(page.contains("Your cart is empty"));
}

#[tokio::test]
async fn test_return_to_must_be_local() {
    let app = TestApp::spawn().await;

    let response = app
        .post_form(
            "/cart/add",
            &[("product_id", "p1"), ("return_to", "https://evil.test/")],
        )
        .await;
    assert_eq!(location(&response), "/cart");

    let response = app
        .post_form(
            "/cart/add",
            &[("product_id", "p1"), ("return_to", "/products/p1")],
        )
        .await;
    assert_eq!(location(&response), "/products/p1");
}

// =============================================================================
// Signed-in Cart
// =============================================================================

#[tokio::test]
async fn test_signed_in_changes_reach_the_backend() {
    let app = TestApp::spawn().await;
    app.login(SHOPPER_EMAIL).await;

    app.add_to_cart("p1", 1).await;
    app.post_form("/cart/increment", &[("product_id", "p1")]).await;
    app.add_to_cart("p2", 1).await;
    assert_eq!(
        app.backend.cart_of(SHOPPER_EMAIL),
        vec![("p1".to_string(), 2), ("p2".to_string(), 1)]
    );

    app.post_form("/cart/update", &[("product_id", "p1"), ("quantity", "4")])
        .await;
    app.post_form("/cart/remove", &[("product_id", "p2")]).await;
    assert_eq!(
        app.backend.cart_of(SHOPPER_EMAIL),
        vec![("p1".to_string(), 4)]
    );
}

#[tokio::test]
async fn test_failed_backend_write_rolls_back() {
    let app = TestApp::spawn().await;
    app.login(SHOPPER_EMAIL).await;
    app.add_to_cart("p1", 1).await;

    app.backend
        .fail_next_write(axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    let response = app
        .post_form("/cart/increment", &[("product_id", "p1")])
        .await;
    assert_eq!(response.status(), 303);

    assert_eq!(
        app.page("/cart/count").await.trim(),
        r#"<span class="badge" id="cart-count">1</span>"#
    );
    let page = app.page("/cart").await;
    assert!(page.contains("The store is having trouble right now"));
    assert!(page.contains(r#"name="quantity" value="1""#));
    assert_eq!(app.backend.cart_of(SHOPPER_EMAIL), vec![("p1".to_string(), 1)]);
}
