//! In-memory commerce backend speaking the storefront's REST contract.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    routing::{get, patch, post},
};
use chrono::Utc;
use emporium_core::{
    CartLine, Category, CategoryId, CategoryInput, CategoryRef, CheckoutRequest, Order, OrderId,
    OrderItem, OrderStatus, Product, ProductId, ProductInput, ProductPage, Review, ReviewId,
    ReviewInput, Role, UserId, WishlistItem,
};
use emporium_storefront::backend::wire::{
    AccountUser, AddCartItemRequest, AddWishlistItemRequest, AuthResponse, CartSnapshot,
    SetQuantityRequest, WishlistSnapshot,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};

/// Seeded shopper account.
pub const SHOPPER_EMAIL: &str = "shopper@emporium.test";
/// Seeded admin account.
pub const ADMIN_EMAIL: &str = "admin@emporium.test";
/// Password of both seeded accounts.
pub const PASSWORD: &str = "correct horse battery";

type Failure = (StatusCode, Json<Value>);
type Reply<T> = Result<Json<T>, Failure>;

fn failure(status: StatusCode, message: &str) -> Failure {
    (status, Json(json!({ "message": message })))
}

struct Account {
    id: UserId,
    user_name: String,
    email: String,
    password: String,
    role: Role,
}

#[derive(Default)]
struct MockState {
    products: Vec<Product>,
    categories: Vec<Category>,
    accounts: Vec<Account>,
    tokens: HashMap<String, UserId>,
    carts: HashMap<UserId, Vec<(ProductId, u32)>>,
    wishlists: HashMap<UserId, Vec<ProductId>>,
    orders: HashMap<UserId, Vec<Order>>,
    reviews: Vec<Review>,
    fail_writes: Option<StatusCode>,
    /// Cart reads to let through, then the status the next one fails with.
    fail_cart_read: Option<(usize, StatusCode)>,
    next_id: u32,
}

impl MockState {
    fn seeded() -> Self {
        let lamps = CategoryRef {
            id: CategoryId::new("c1"),
            name: "Lamps".to_string(),
        };
        let desks = CategoryRef {
            id: CategoryId::new("c2"),
            name: "Desks".to_string(),
        };
        let product = |id: &str, title: &str, cents: i64, stock: u32, category: &CategoryRef| {
            Product {
                id: ProductId::new(id),
                title: title.to_string(),
                description: format!("{title} from the mock catalog"),
                price: Decimal::new(cents, 2),
                sale_price: None,
                discount_percentage: None,
                stock,
                rating: 4.0,
                category: Some(category.clone()),
                images: vec![format!("https://img.emporium.test/{id}.jpg")],
            }
        };

        let mut desk = product("p2", "Oak Desk", 25000, 2, &desks);
        desk.sale_price = Some(Decimal::new(19900, 2));
        desk.rating = 4.8;

        Self {
            products: vec![
                product("p1", "Brass Lamp", 4000, 5, &lamps),
                desk,
                product("p3", "Paper Lantern", 1250, 0, &lamps),
            ],
            categories: [lamps, desks]
                .into_iter()
                .map(|c| Category {
                    id: c.id,
                    name: c.name,
                    description: None,
                    image: None,
                })
                .collect(),
            accounts: vec![
                Account {
                    id: UserId::new("u1"),
                    user_name: "Sam".to_string(),
                    email: SHOPPER_EMAIL.to_string(),
                    password: PASSWORD.to_string(),
                    role: Role::Customer,
                },
                Account {
                    id: UserId::new("u2"),
                    user_name: "Ada".to_string(),
                    email: ADMIN_EMAIL.to_string(),
                    password: PASSWORD.to_string(),
                    role: Role::Admin,
                },
            ],
            next_id: 100,
            ..Self::default()
        }
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}{}", self.next_id)
    }

    fn product(&self, id: &ProductId) -> Result<&Product, Failure> {
        self.products
            .iter()
            .find(|p| &p.id == id)
            .ok_or_else(|| failure(StatusCode::NOT_FOUND, "Product not found"))
    }

    fn account(&self, id: &UserId) -> Option<&Account> {
        self.accounts.iter().find(|a| &a.id == id)
    }

    fn caller(&self, headers: &HeaderMap) -> Result<UserId, Failure> {
        headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .and_then(|token| self.tokens.get(token))
            .cloned()
            .ok_or_else(|| failure(StatusCode::UNAUTHORIZED, "Invalid or expired token"))
    }

    fn admin(&self, headers: &HeaderMap) -> Result<UserId, Failure> {
        let id = self.caller(headers)?;
        match self.account(&id) {
            Some(account) if account.role == Role::Admin => Ok(id),
            _ => Err(failure(StatusCode::FORBIDDEN, "Admins only")),
        }
    }

    fn take_failure(&mut self) -> Result<(), Failure> {
        match self.fail_writes.take() {
            Some(status) => Err(failure(status, "Backend is having a bad day")),
            None => Ok(()),
        }
    }

    fn take_cart_read_failure(&mut self) -> Result<(), Failure> {
        match self.fail_cart_read.take() {
            Some((0, status)) => Err(failure(status, "Cart service unavailable")),
            Some((skip, status)) => {
                self.fail_cart_read = Some((skip - 1, status));
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn issue(&mut self, user: &UserId) -> AuthResponse {
        let token = self.next_id("token-");
        self.tokens.insert(token.clone(), user.clone());
        let account = self.account(user);
        AuthResponse {
            token,
            user: AccountUser {
                id: user.clone(),
                user_name: account.map(|a| a.user_name.clone()).unwrap_or_default(),
                email: account.map(|a| a.email.clone()).unwrap_or_default(),
                role: account.map(|a| a.role).unwrap_or_default(),
            },
        }
    }

    fn cart_snapshot(&self, user: &UserId) -> CartSnapshot {
        CartSnapshot {
            items: self
                .carts
                .get(user)
                .into_iter()
                .flatten()
                .filter_map(|(id, quantity)| {
                    self.product(id).ok().map(|product| CartLine {
                        product: product.clone(),
                        quantity: *quantity,
                    })
                })
                .collect(),
        }
    }

    fn wishlist_snapshot(&self, user: &UserId) -> WishlistSnapshot {
        WishlistSnapshot {
            items: self
                .wishlists
                .get(user)
                .into_iter()
                .flatten()
                .filter_map(|id| {
                    self.product(id).ok().map(|product| WishlistItem {
                        product: product.clone(),
                    })
                })
                .collect(),
        }
    }

    fn apply_product(&mut self, id: ProductId, input: ProductInput) -> Product {
        let category = input.category.and_then(|cid| {
            self.categories
                .iter()
                .find(|c| c.id == cid)
                .map(|c| CategoryRef {
                    id: c.id.clone(),
                    name: c.name.clone(),
                })
        });
        let product = Product {
            id,
            title: input.title,
            description: input.description,
            price: input.price,
            sale_price: input.sale_price,
            discount_percentage: input.discount_percentage,
            stock: input.stock,
            rating: 0.0,
            category,
            images: input.images,
        };
        match self.products.iter_mut().find(|p| p.id == product.id) {
            Some(existing) => {
                let rating = existing.rating;
                *existing = Product {
                    rating,
                    ..product.clone()
                };
            }
            None => self.products.push(product.clone()),
        }
        product
    }
}

/// Handle on a running mock backend.
#[derive(Clone)]
pub struct MockBackend {
    addr: SocketAddr,
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    /// Serve a freshly seeded backend on an ephemeral port.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn spawn() -> Self {
        let state = Arc::new(Mutex::new(MockState::seeded()));
        let app = router(Arc::clone(&state));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock backend");
        let addr = listener.local_addr().expect("mock backend address");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Self { addr, state }
    }

    /// Base URL the storefront should be pointed at.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}/api/", self.addr)
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().expect("mock state poisoned")
    }

    /// Make the next cart, wishlist or order write fail with `status`.
    pub fn fail_next_write(&self, status: StatusCode) {
        self.lock().fail_writes = Some(status);
    }

    /// Let `skip` cart reads succeed, then fail the next one with `status`.
    pub fn fail_cart_read_after(&self, skip: usize, status: StatusCode) {
        self.lock().fail_cart_read = Some((skip, status));
    }

    /// Forget every issued token, as if they all expired.
    pub fn revoke_tokens(&self) {
        self.lock().tokens.clear();
    }

    /// Remote cart of an account as `(product_id, quantity)` pairs.
    #[must_use]
    pub fn cart_of(&self, email: &str) -> Vec<(String, u32)> {
        let state = self.lock();
        let Some(account) = state.accounts.iter().find(|a| a.email == email) else {
            return Vec::new();
        };
        state
            .carts
            .get(&account.id)
            .into_iter()
            .flatten()
            .map(|(id, qty)| (id.to_string(), *qty))
            .collect()
    }

    /// Remote wishlist of an account as product IDs.
    #[must_use]
    pub fn wishlist_of(&self, email: &str) -> Vec<String> {
        let state = self.lock();
        let Some(account) = state.accounts.iter().find(|a| a.email == email) else {
            return Vec::new();
        };
        state
            .wishlists
            .get(&account.id)
            .into_iter()
            .flatten()
            .map(ToString::to_string)
            .collect()
    }

    /// Orders placed by an account.
    #[must_use]
    pub fn orders_of(&self, email: &str) -> Vec<Order> {
        let state = self.lock();
        state
            .accounts
            .iter()
            .find(|a| a.email == email)
            .and_then(|a| state.orders.get(&a.id))
            .cloned()
            .unwrap_or_default()
    }

    /// Titles of every product in the catalog.
    #[must_use]
    pub fn product_titles(&self) -> Vec<String> {
        self.lock().products.iter().map(|p| p.title.clone()).collect()
    }
}

fn router(state: Arc<Mutex<MockState>>) -> Router {
    let api = Router::new()
        .route("/users/login", post(login))
        .route("/users/register", post(register))
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/{id}",
            get(get_product).patch(update_product).delete(delete_product),
        )
        .route("/category", get(list_categories).post(create_category))
        .route(
            "/category/{id}",
            get(get_category).patch(update_category).delete(delete_category),
        )
        .route("/cart", get(get_cart).post(add_cart_item).delete(clear_cart))
        .route("/cart/{id}", patch(set_cart_quantity).delete(remove_cart_item))
        .route("/wishlist", get(get_wishlist).post(add_wishlist_item))
        .route("/wishlist/{id}", axum::routing::delete(remove_wishlist_item))
        .route("/order", get(list_orders).post(place_order))
        .route("/order/{id}", get(get_order))
        .route("/reviews", get(list_reviews).post(create_review));

    Router::new().nest("/api", api).with_state(state)
}

type Shared = State<Arc<Mutex<MockState>>>;

fn lock(state: &Arc<Mutex<MockState>>) -> Result<MutexGuard<'_, MockState>, Failure> {
    state
        .lock()
        .map_err(|_| failure(StatusCode::INTERNAL_SERVER_ERROR, "mock state poisoned"))
}

// =============================================================================
// Accounts
// =============================================================================

#[derive(Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

async fn login(State(state): Shared, Json(body): Json<LoginBody>) -> Reply<AuthResponse> {
    let mut state = lock(&state)?;
    let id = state
        .accounts
        .iter()
        .find(|a| a.email == body.email && a.password == body.password)
        .map(|a| a.id.clone())
        .ok_or_else(|| failure(StatusCode::UNAUTHORIZED, "Invalid email or password"))?;
    Ok(Json(state.issue(&id)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterBody {
    user_name: String,
    email: String,
    password: String,
}

async fn register(State(state): Shared, Json(body): Json<RegisterBody>) -> Reply<AuthResponse> {
    let mut state = lock(&state)?;
    if state.accounts.iter().any(|a| a.email == body.email) {
        return Err(failure(StatusCode::CONFLICT, "Email already registered"));
    }
    let id = UserId::new(state.next_id("u"));
    state.accounts.push(Account {
        id: id.clone(),
        user_name: body.user_name,
        email: body.email,
        password: body.password,
        role: Role::Customer,
    });
    Ok(Json(state.issue(&id)))
}

// =============================================================================
// Catalog
// =============================================================================

#[derive(Deserialize)]
struct ListQuery {
    page: Option<u32>,
    limit: Option<u32>,
    sort: Option<String>,
    category: Option<String>,
    search: Option<String>,
}

async fn list_products(State(state): Shared, Query(query): Query<ListQuery>) -> Reply<ProductPage> {
    let state = lock(&state)?;
    let search = query.search.map(|s| s.to_lowercase());
    let mut items: Vec<Product> = state
        .products
        .iter()
        .filter(|p| {
            query
                .category
                .as_deref()
                .is_none_or(|c| p.category.as_ref().is_some_and(|r| r.id.as_str() == c))
        })
        .filter(|p| {
            search
                .as_deref()
                .is_none_or(|s| p.title.to_lowercase().contains(s))
        })
        .cloned()
        .collect();

    match query.sort.as_deref() {
        Some("price") => items.sort_by_key(Product::unit_price),
        Some("-price") => items.sort_by_key(|p| std::cmp::Reverse(p.unit_price())),
        Some("-rating") => items.sort_by(|a, b| b.rating.total_cmp(&a.rating)),
        _ => {}
    }

    let limit = query.limit.unwrap_or(12).max(1);
    let page = query.page.unwrap_or(1).max(1);
    let total = items.len() as u64;
    let pages = u32::try_from(items.len().div_ceil(limit as usize)).unwrap_or(1).max(1);
    let items = items
        .into_iter()
        .skip(((page - 1) * limit) as usize)
        .take(limit as usize)
        .collect();

    Ok(Json(ProductPage {
        items,
        page,
        pages,
        total,
    }))
}

async fn get_product(State(state): Shared, Path(id): Path<String>) -> Reply<Product> {
    let state = lock(&state)?;
    state.product(&ProductId::from(id)).cloned().map(Json)
}

async fn create_product(
    State(state): Shared,
    headers: HeaderMap,
    Json(input): Json<ProductInput>,
) -> Reply<Product> {
    let mut state = lock(&state)?;
    state.admin(&headers)?;
    let id = ProductId::new(state.next_id("p"));
    Ok(Json(state.apply_product(id, input)))
}

async fn update_product(
    State(state): Shared,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<ProductInput>,
) -> Reply<Product> {
    let mut state = lock(&state)?;
    state.admin(&headers)?;
    let id = ProductId::from(id);
    state.product(&id)?;
    Ok(Json(state.apply_product(id, input)))
}

async fn delete_product(
    State(state): Shared,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, Failure> {
    let mut state = lock(&state)?;
    state.admin(&headers)?;
    let id = ProductId::from(id);
    state.product(&id)?;
    state.products.retain(|p| p.id != id);
    Ok(StatusCode::NO_CONTENT)
}

async fn list_categories(State(state): Shared) -> Reply<Vec<Category>> {
    Ok(Json(lock(&state)?.categories.clone()))
}

async fn get_category(State(state): Shared, Path(id): Path<String>) -> Reply<Category> {
    lock(&state)?
        .categories
        .iter()
        .find(|c| c.id.as_str() == id)
        .cloned()
        .map(Json)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "Category not found"))
}

async fn create_category(
    State(state): Shared,
    headers: HeaderMap,
    Json(input): Json<CategoryInput>,
) -> Reply<Category> {
    let mut state = lock(&state)?;
    state.admin(&headers)?;
    let category = Category {
        id: CategoryId::new(state.next_id("c")),
        name: input.name,
        description: input.description,
        image: input.image,
    };
    state.categories.push(category.clone());
    Ok(Json(category))
}

async fn update_category(
    State(state): Shared,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<CategoryInput>,
) -> Reply<Category> {
    let mut state = lock(&state)?;
    state.admin(&headers)?;
    let category = state
        .categories
        .iter_mut()
        .find(|c| c.id.as_str() == id)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "Category not found"))?;
    category.name = input.name;
    category.description = input.description;
    category.image = input.image;
    Ok(Json(category.clone()))
}

async fn delete_category(
    State(state): Shared,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, Failure> {
    let mut state = lock(&state)?;
    state.admin(&headers)?;
    state.categories.retain(|c| c.id.as_str() != id);
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Cart
// =============================================================================

async fn get_cart(State(state): Shared, headers: HeaderMap) -> Reply<CartSnapshot> {
    let mut state = lock(&state)?;
    let user = state.caller(&headers)?;
    state.take_cart_read_failure()?;
    Ok(Json(state.cart_snapshot(&user)))
}

async fn add_cart_item(
    State(state): Shared,
    headers: HeaderMap,
    Json(body): Json<AddCartItemRequest>,
) -> Reply<CartSnapshot> {
    let mut state = lock(&state)?;
    let user = state.caller(&headers)?;
    state.take_failure()?;
    let stock = state.product(&body.product_id)?.stock;

    let lines = state.carts.entry(user.clone()).or_default();
    let current = lines
        .iter()
        .find(|(id, _)| id == &body.product_id)
        .map_or(0, |(_, q)| *q);
    let wanted = current + body.quantity;
    if body.quantity == 0 || wanted > stock {
        return Err(failure(StatusCode::BAD_REQUEST, "Not enough stock"));
    }
    match lines.iter_mut().find(|(id, _)| id == &body.product_id) {
        Some(line) => line.1 = wanted,
        None => lines.push((body.product_id, wanted)),
    }
    Ok(Json(state.cart_snapshot(&user)))
}

async fn set_cart_quantity(
    State(state): Shared,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<SetQuantityRequest>,
) -> Reply<CartSnapshot> {
    let mut state = lock(&state)?;
    let user = state.caller(&headers)?;
    state.take_failure()?;
    let id = ProductId::from(id);
    let stock = state.product(&id)?.stock;
    if body.quantity == 0 || body.quantity > stock {
        return Err(failure(StatusCode::BAD_REQUEST, "Invalid quantity"));
    }
    let line = state
        .carts
        .entry(user.clone())
        .or_default()
        .iter_mut()
        .find(|(pid, _)| pid == &id)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "Item not in cart"))?;
    line.1 = body.quantity;
    Ok(Json(state.cart_snapshot(&user)))
}

async fn remove_cart_item(
    State(state): Shared,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply<CartSnapshot> {
    let mut state = lock(&state)?;
    let user = state.caller(&headers)?;
    state.take_failure()?;
    state
        .carts
        .entry(user.clone())
        .or_default()
        .retain(|(pid, _)| pid.as_str() != id);
    Ok(Json(state.cart_snapshot(&user)))
}

async fn clear_cart(State(state): Shared, headers: HeaderMap) -> Reply<CartSnapshot> {
    let mut state = lock(&state)?;
    let user = state.caller(&headers)?;
    state.take_failure()?;
    state.carts.remove(&user);
    Ok(Json(state.cart_snapshot(&user)))
}

// =============================================================================
// Wishlist
// =============================================================================

async fn get_wishlist(State(state): Shared, headers: HeaderMap) -> Reply<WishlistSnapshot> {
    let state = lock(&state)?;
    let user = state.caller(&headers)?;
    Ok(Json(state.wishlist_snapshot(&user)))
}

async fn add_wishlist_item(
    State(state): Shared,
    headers: HeaderMap,
    Json(body): Json<AddWishlistItemRequest>,
) -> Reply<WishlistSnapshot> {
    let mut state = lock(&state)?;
    let user = state.caller(&headers)?;
    state.take_failure()?;
    state.product(&body.product_id)?;
    let items = state.wishlists.entry(user.clone()).or_default();
    if !items.contains(&body.product_id) {
        items.push(body.product_id);
    }
    Ok(Json(state.wishlist_snapshot(&user)))
}

async fn remove_wishlist_item(
    State(state): Shared,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply<WishlistSnapshot> {
    let mut state = lock(&state)?;
    let user = state.caller(&headers)?;
    state.take_failure()?;
    state
        .wishlists
        .entry(user.clone())
        .or_default()
        .retain(|pid| pid.as_str() != id);
    Ok(Json(state.wishlist_snapshot(&user)))
}

// =============================================================================
// Orders and reviews
// =============================================================================

async fn place_order(
    State(state): Shared,
    headers: HeaderMap,
    Json(request): Json<CheckoutRequest>,
) -> Reply<Order> {
    let mut state = lock(&state)?;
    let user = state.caller(&headers)?;
    state.take_failure()?;

    let lines = state.cart_snapshot(&user).items;
    if lines.is_empty() {
        return Err(failure(StatusCode::BAD_REQUEST, "Cart is empty"));
    }
    let items: Vec<OrderItem> = lines
        .iter()
        .map(|line| OrderItem {
            product_id: line.product.id.clone(),
            title: line.product.title.clone(),
            unit_price: line.unit_price(),
            quantity: line.quantity,
        })
        .collect();
    let subtotal: Decimal = items.iter().map(OrderItem::line_total).sum();
    let shipping = Decimal::new(500, 2);

    let order = Order {
        id: OrderId::new(state.next_id("o")),
        items,
        subtotal,
        shipping,
        total: subtotal + shipping,
        status: OrderStatus::default(),
        payment_method: request.payment_method,
        shipping_address: request.shipping_address,
        created_at: Utc::now(),
    };
    state.carts.remove(&user);
    state.orders.entry(user).or_default().insert(0, order.clone());
    Ok(Json(order))
}

async fn list_orders(State(state): Shared, headers: HeaderMap) -> Reply<Vec<Order>> {
    let state = lock(&state)?;
    let user = state.caller(&headers)?;
    Ok(Json(state.orders.get(&user).cloned().unwrap_or_default()))
}

async fn get_order(
    State(state): Shared,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply<Order> {
    let state = lock(&state)?;
    let user = state.caller(&headers)?;
    state
        .orders
        .get(&user)
        .into_iter()
        .flatten()
        .find(|o| o.id.as_str() == id)
        .cloned()
        .map(Json)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "Order not found"))
}

#[derive(Deserialize)]
struct ReviewQuery {
    product: String,
}

async fn list_reviews(State(state): Shared, Query(query): Query<ReviewQuery>) -> Reply<Vec<Review>> {
    let state = lock(&state)?;
    Ok(Json(
        state
            .reviews
            .iter()
            .filter(|r| r.product_id.as_str() == query.product)
            .cloned()
            .collect(),
    ))
}

async fn create_review(
    State(state): Shared,
    headers: HeaderMap,
    Json(input): Json<ReviewInput>,
) -> Reply<Review> {
    let mut state = lock(&state)?;
    let user = state.caller(&headers)?;
    state.product(&input.product_id)?;
    let review = Review {
        id: ReviewId::new(state.next_id("r")),
        product_id: input.product_id,
        user_name: state
            .account(&user)
            .map(|a| a.user_name.clone())
            .unwrap_or_default(),
        rating: input.rating,
        comment: input.comment,
        created_at: Utc::now(),
    };
    state.reviews.push(review.clone());
    Ok(Json(review))
}
