//! Projections of the catalog shown by the two restaurant tabs.

use std::sync::Arc;

use tokio::sync::watch;

use crate::catalog::Catalog;
use crate::data::{MenuSection, Restaurant, RestaurantId};
use crate::favourites::{FavouriteSet, FavouritesStore};

/// Restaurants to display, in catalog order.
///
/// With `favourites_only` unset this is the whole catalog. Otherwise only the
/// restaurants whose id is in `favourites`; ids that are not in the catalog
/// are ignored.
pub fn visible_list<'a>(
    catalog: &'a [Restaurant],
    favourites: &FavouriteSet,
    favourites_only: bool,
) -> Vec<&'a Restaurant> {
    visible_indices(catalog, favourites, favourites_only)
        .map(|i| &catalog[i])
        .collect()
}

fn visible_indices<'a>(
    catalog: &'a [Restaurant],
    favourites: &'a FavouriteSet,
    favourites_only: bool,
) -> impl Iterator<Item = usize> + 'a {
    catalog
        .iter()
        .enumerate()
        .filter(move |(_, restaurant)| {
            !favourites_only || favourites.contains(restaurant.id)
        })
        .map(|(i, _)| i)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    All,
    FavouritesOnly,
}

impl ViewMode {
    pub fn favourites_only(self) -> bool {
        matches!(self, Self::FavouritesOnly)
    }

    /// Tab label.
    pub fn title(self) -> &'static str {
        match self {
            Self::All => "Restaurants",
            Self::FavouritesOnly => "Favourites",
        }
    }
}

/// One line of the restaurant list, with the heart state to draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RestaurantRow<'a> {
    pub restaurant: &'a Restaurant,
    pub is_favourite: bool,
}

/// A restaurant list kept in sync with a [`FavouritesStore`].
pub struct CatalogView {
    catalog: Arc<Catalog>,
    mode: ViewMode,
    changes: watch::Receiver<FavouriteSet>,
    favourites: FavouriteSet,
    // positions in the catalog
    visible: Vec<usize>,
}

impl CatalogView {
    pub fn new(catalog: Arc<Catalog>, store: &FavouritesStore, mode: ViewMode) -> Self {
        let mut view = Self {
            catalog,
            mode,
            changes: store.subscribe(),
            favourites: FavouriteSet::new(),
            visible: Vec::new(),
        };
        view.refresh();
        view
    }

    /// Re-derive the list from the latest favourite set.
    pub fn refresh(&mut self) {
        self.favourites = self.changes.borrow_and_update().clone();
        self.visible = visible_indices(
            self.catalog.restaurants(),
            &self.favourites,
            self.mode.favourites_only(),
        )
        .collect();
    }

    /// Refresh only when the favourites changed since the last derivation.
    pub fn refresh_if_changed(&mut self) -> bool {
        match self.changes.has_changed() {
            Ok(true) => {
                self.refresh();
                true
            }
            _ => false,
        }
    }

    /// Wait for the next change to the favourites and re-derive.
    ///
    /// Returns `false` once the store is gone.
    pub async fn changed(&mut self) -> bool {
        if self.changes.changed().await.is_err() {
            return false;
        }
        self.refresh();
        true
    }

    pub fn restaurants(&self) -> Vec<&Restaurant> {
        let all = self.catalog.restaurants();
        self.visible.iter().map(|&i| &all[i]).collect()
    }

    pub fn rows(&self) -> Vec<RestaurantRow<'_>> {
        self.restaurants()
            .into_iter()
            .map(|restaurant| RestaurantRow {
                restaurant,
                is_favourite: self.favourites.contains(restaurant.id),
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    /// Menu sections for the detail view of `id`.
    pub fn menu(&self, id: RestaurantId) -> Option<&[MenuSection]> {
        self.catalog.menu(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::favourites::FAVOURITES_KEY;
    use crate::storage::MemoryStore;

    fn restaurant(id: RestaurantId, title: &str) -> Restaurant {
        Restaurant {
            id,
            title: title.to_string(),
            tagline: String::new(),
            eta: "10-20".to_string(),
            img_uri: format!("{id}.jpg"),
            height: None,
            items: Vec::new(),
        }
    }

    fn three() -> Vec<Restaurant> {
        vec![
            restaurant(1, "Joe's Gelato"),
            restaurant(2, "Martini House"),
            restaurant(3, "La Capannina"),
        ]
    }

    fn ids(list: &[&Restaurant]) -> Vec<RestaurantId> {
        list.iter().map(|r| r.id).collect()
    }

    #[test]
    fn all_view_is_the_catalog() {
        let catalog = three();
        let favourites: FavouriteSet = [2].into_iter().collect();
        let visible = visible_list(&catalog, &favourites, false);
        assert_eq!(ids(&visible), [1, 2, 3]);
    }

    #[test]
    fn favourites_view_keeps_catalog_order() {
        let catalog = three();
        let favourites: FavouriteSet = [3, 1].into_iter().collect();
        assert_eq!(ids(&visible_list(&catalog, &favourites, true)), [1, 3]);
    }

    #[test]
    fn no_favourites_shows_nothing() {
        let catalog = three();
        assert!(visible_list(&catalog, &FavouriteSet::new(), true).is_empty());
    }

    #[test]
    fn stale_ids_are_ignored() {
        let catalog = three();
        let favourites: FavouriteSet = [2, 42].into_iter().collect();
        assert_eq!(ids(&visible_list(&catalog, &favourites, true)), [2]);
    }

    #[tokio::test]
    async fn favourites_tab_follows_toggles() {
        let catalog = Arc::new(Catalog::new(three()).unwrap());
        let store = FavouritesStore::load(Arc::new(MemoryStore::new()), FAVOURITES_KEY).await;
        let mut all = CatalogView::new(Arc::clone(&catalog), &store, ViewMode::All);
        let mut favourites = CatalogView::new(catalog, &store, ViewMode::FavouritesOnly);
        assert!(favourites.is_empty());

        store.toggle(2);
        store.toggle(3);
        assert!(favourites.changed().await);
        assert_eq!(ids(&favourites.restaurants()), [2, 3]);

        assert!(all.refresh_if_changed());
        let hearts: Vec<_> = all.rows().iter().map(|row| row.is_favourite).collect();
        assert_eq!(hearts, [false, true, true]);
        assert!(!all.refresh_if_changed());

        store.toggle(2);
        assert!(favourites.changed().await);
        assert_eq!(ids(&favourites.restaurants()), [3]);
    }

    #[tokio::test]
    async fn menu_is_handed_over_unchanged() {
        let catalog = Arc::new(Catalog::bundled().unwrap());
        let store = FavouritesStore::load(Arc::new(MemoryStore::new()), FAVOURITES_KEY).await;
        let view = CatalogView::new(Arc::clone(&catalog), &store, ViewMode::All);

        assert_eq!(view.menu(2), Some(catalog.get(2).unwrap().items.as_slice()));
        assert_eq!(view.menu(99), None);
    }

    #[tokio::test]
    async fn closed_store_ends_subscription() {
        let catalog = Arc::new(Catalog::new(three()).unwrap());
        let store = FavouritesStore::load(Arc::new(MemoryStore::new()), FAVOURITES_KEY).await;
        let mut view = CatalogView::new(catalog, &store, ViewMode::FavouritesOnly);

        drop(store);
        assert!(!view.changed().await);
    }
}
