//! Catalog administration gate and forms.

use emporium_integration_tests::{ADMIN_EMAIL, SHOPPER_EMAIL, TestApp, location};

#[tokio::test]
async fn test_shopper_is_forbidden() {
    let app = TestApp::spawn().await;
    app.login(SHOPPER_EMAIL).await;

    let response = app.get("/admin/products").await;
    assert_eq!(response.status(), 403);

    let response = app
        .post_form("/admin/products/p1/delete", &[])
        .await;
    assert_eq!(response.status(), 403);
    assert!(app.backend.product_titles().contains(&"Brass Lamp".to_string()));
}

#[tokio::test]
async fn test_guest_is_sent_to_sign_in() {
    let app = TestApp::spawn().await;

    let response = app.get("/admin/products").await;
    assert_eq!(location(&response), "/auth/login?next=%2Fadmin%2Fproducts");
}

#[tokio::test]
async fn test_admin_creates_product() {
    let app = TestApp::spawn().await;
    app.login(ADMIN_EMAIL).await;

    let page = app.page("/admin/products").await;
    assert!(page.contains("Brass Lamp"));

    let response = app
        .post_form(
            "/admin/products",
            &[
                ("title", "Walnut Shelf"),
                ("price", "89.5"),
                ("stock", "7"),
                ("category_id", "c2"),
                ("images", "https://img.emporium.test/shelf.jpg"),
            ],
        )
        .await;
    assert_eq!(location(&response), "/admin/products");
    assert!(app.backend.product_titles().contains(&"Walnut Shelf".to_string()));
    assert!(app.page("/admin/products").await.contains("Created Walnut Shelf"));
}

#[tokio::test]
async fn test_invalid_product_form_renders_again() {
    let app = TestApp::spawn().await;
    app.login(ADMIN_EMAIL).await;

    let response = app
        .post_form(
            "/admin/products",
            &[("title", "Cheap Shelf"), ("price", "10"), ("sale_price", "12")],
        )
        .await;
    assert_eq!(response.status(), 422);
    let body = response.text().await.expect("body");
    assert!(body.contains("must be below the regular price"));
    assert!(body.contains(r#"value="Cheap Shelf""#));
}

#[tokio::test]
async fn test_admin_manages_categories() {
    let app = TestApp::spawn().await;
    app.login(ADMIN_EMAIL).await;

    // Warm the category cache so the create has to invalidate it
    assert!(app.page("/categories").await.contains("Lamps"));

    let response = app
        .post_form("/admin/categories", &[("name", "Rugs")])
        .await;
    assert_eq!(location(&response), "/admin/categories");
    assert!(app.page("/categories").await.contains("Rugs"));

    let response = app.post_form("/admin/categories", &[("name", " ")]).await;
    assert_eq!(response.status(), 422);
}
