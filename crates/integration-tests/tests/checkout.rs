//! Checkout and order history.

use emporium_integration_tests::{SHOPPER_EMAIL, TestApp, location};

const ADDRESS: [(&str, &str); 5] = [
    ("full_name", "Sam Shopper"),
    ("street", "1 Market Street"),
    ("city", "Alexandria"),
    ("phone", "+20 100 555 0101"),
    ("payment_method", "cash_on_delivery"),
];

#[tokio::test]
async fn test_checkout_requires_sign_in() {
    let app = TestApp::spawn().await;
    app.add_to_cart("p1", 1).await;

    let response = app.get("/checkout").await;
    assert_eq!(location(&response), "/auth/login?next=%2Fcheckout");
}

#[tokio::test]
async fn test_empty_cart_goes_back_to_cart() {
    let app = TestApp::spawn().await;
    app.login(SHOPPER_EMAIL).await;

    let response = app.get("/checkout").await;
    assert_eq!(location(&response), "/cart");
}

#[tokio::test]
async fn test_place_order_clears_cart() {
    let app = TestApp::spawn().await;
    app.login(SHOPPER_EMAIL).await;
    app.add_to_cart("p1", 2).await;

    let form = app.page("/checkout").await;
    assert!(form.contains(r#"value="Sam""#));
    assert!(form.contains("Cash on delivery"));

    let response = app.post_form("/checkout", &ADDRESS).await;
    let orders = app.backend.orders_of(SHOPPER_EMAIL);
    assert_eq!(orders.len(), 1);
    let order_id = orders.first().expect("order placed").id.to_string();
    assert_eq!(location(&response), format!("/account/orders/{order_id}"));

    assert!(app.backend.cart_of(SHOPPER_EMAIL).is_empty());
    assert_eq!(
        app.page("/cart/count").await.trim(),
        r#"<span class="badge" id="cart-count">0</span>"#
    );

    let page = app.page(&format!("/account/orders/{order_id}")).await;
    assert!(page.contains("Your order has been placed"));
    assert!(page.contains("Brass Lamp"));
    assert!(page.contains("$85.00"));
    assert!(page.contains("Sam Shopper, 1 Market Street, Alexandria"));
}

#[tokio::test]
async fn test_invalid_address_is_refused() {
    let app = TestApp::spawn().await;
    app.login(SHOPPER_EMAIL).await;
    app.add_to_cart("p1", 1).await;

    let response = app
        .post_form(
            "/checkout",
            &[
                ("full_name", "Sam Shopper"),
                ("street", "1 Market Street"),
                ("city", "Alexandria"),
                ("phone", "123"),
                ("payment_method", "card"),
            ],
        )
        .await;
    assert_eq!(location(&response), "/checkout");
    assert!(app.backend.orders_of(SHOPPER_EMAIL).is_empty());
    assert!(app.page("/checkout").await.contains("at least 7 digits"));
}
