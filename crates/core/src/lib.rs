//! Emporium Core - Domain types for the Emporium storefront.
//!
//! This crate provides the types shared by the storefront server and its
//! integration tests:
//! - [`types`] - Newtype IDs, emails, prices, roles, statuses, locales
//! - [`catalog`] - Products, categories, reviews and admin drafts
//! - [`cart`] - Cart state with optimistic change tracking
//! - [`wishlist`] - Wishlist state with optimistic change tracking
//! - [`order`] - Orders and checkout input
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no HTTP
//! clients. Every mutation on [`Cart`] or [`Wishlist`] returns the change
//! that has to be sent to the remote backend, so callers can apply it
//! locally first and replace local state with the server snapshot once the
//! call returns.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod order;
pub mod types;
pub mod wishlist;

pub use cart::{Cart, CartChange, CartError, CartLine, CartTotals};
pub use catalog::{
    Category, CategoryDraft, CategoryInput, CategoryRef, DraftError, Product, ProductDraft,
    ProductInput, ProductPage, ProductQuery, Review, ReviewDraft, ReviewInput,
};
pub use order::{CheckoutDraft, CheckoutRequest, Order, OrderItem, ShippingAddress};
pub use types::*;
pub use wishlist::{Wishlist, WishlistChange, WishlistItem};
