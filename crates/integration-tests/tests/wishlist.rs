//! Wishlist behavior: sign-in gate, toggling, moving to the cart.

use emporium_integration_tests::{SHOPPER_EMAIL, TestApp, location};

#[tokio::test]
async fn test_guest_toggle_redirects_to_sign_in() {
    let app = TestApp::spawn().await;

    let response = app
        .post_form("/wishlist/toggle", &[("product_id", "p1")])
        .await;
    assert_eq!(response.status(), 303);
    assert_eq!(location(&response), "/auth/login");

    let response = app.get("/wishlist").await;
    assert_eq!(location(&response), "/auth/login?next=%2Fwishlist");
}

#[tokio::test]
async fn test_toggle_twice_leaves_no_entry() {
    let app = TestApp::spawn().await;
    app.login(SHOPPER_EMAIL).await;

    app.post_form("/wishlist/toggle", &[("product_id", "p1")])
        .await;
    assert_eq!(app.backend.wishlist_of(SHOPPER_EMAIL), vec!["p1".to_string()]);

    let page = app.page("/wishlist").await;
    assert!(page.contains("Saved to your wishlist"));
    assert!(page.contains("Brass Lamp"));

    app.post_form("/wishlist/toggle", &[("product_id", "p1")])
        .await;
    assert!(app.backend.wishlist_of(SHOPPER_EMAIL).is_empty());
    assert!(app.page("/wishlist").await.contains("Nothing saved yet"));
}

#[tokio::test]
async fn test_move_to_cart() {
    let app = TestApp::spawn().await;
    app.login(SHOPPER_EMAIL).await;
    app.post_form("/wishlist/toggle", &[("product_id", "p2")])
        .await;

    let response = app
        .post_form("/wishlist/move-to-cart", &[("product_id", "p2")])
        .await;
    assert_eq!(location(&response), "/wishlist");

    assert!(app.backend.wishlist_of(SHOPPER_EMAIL).is_empty());
    assert_eq!(app.backend.cart_of(SHOPPER_EMAIL), vec![("p2".to_string(), 1)]);
}

#[tokio::test]
async fn test_failed_toggle_keeps_previous_state() {
    let app = TestApp::spawn().await;
    app.login(SHOPPER_EMAIL).await;

    app.backend
        .fail_next_write(axum::http::StatusCode::SERVICE_UNAVAILABLE);
    app.post_form("/wishlist/toggle", &[("product_id", "p1")])
        .await;

    let listing = app.page("/products").await;
    assert!(listing.contains("The store is having trouble right now"));
    assert!(!listing.contains("&#9829; Saved"));
    assert!(app.backend.wishlist_of(SHOPPER_EMAIL).is_empty());
}
