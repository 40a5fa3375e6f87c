//! Restaurant catalog with persisted favourites.
//!
//! [`favourites::FavouritesStore`] owns the user's favourite set and writes it
//! to a [`storage::KeyValueStore`] on every change. [`view::CatalogView`]
//! follows the store and derives the "all" and "favourites only" lists from
//! the bundled [`catalog::Catalog`].

pub mod catalog;
pub mod config;
pub mod data;
pub mod favourites;
pub mod storage;
pub mod view;
