//! The static restaurant catalog shipped inside the binary.

use anyhow::Context;

use crate::data::{MenuSection, Restaurant, RestaurantId};

const BUNDLED_CATALOG: &str = include_str!("../assets/restaurants.json");

/// Read-only, ordered collection of restaurants. Never mutated after load.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    restaurants: Vec<Restaurant>,
}

impl Catalog {
    /// Parse the catalog embedded at build time.
    pub fn bundled() -> anyhow::Result<Self> {
        Self::from_json(BUNDLED_CATALOG).with_context(|| "fail to parse bundled catalog")
    }

    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        let restaurants: Vec<Restaurant> = serde_json::from_str(raw)?;
        Self::new(restaurants)
    }

    /// Build a catalog from records, rejecting duplicated identifiers.
    pub fn new(restaurants: Vec<Restaurant>) -> anyhow::Result<Self> {
        let mut seen = std::collections::HashSet::new();
        for restaurant in &restaurants {
            if !seen.insert(restaurant.id) {
                anyhow::bail!("duplicated restaurant id {} in catalog", restaurant.id);
            }
        }
        Ok(Self { restaurants })
    }

    pub fn restaurants(&self) -> &[Restaurant] {
        &self.restaurants
    }

    pub fn get(&self, id: RestaurantId) -> Option<&Restaurant> {
        self.restaurants.iter().find(|r| r.id == id)
    }

    /// Menu sections handed to the detail view, unchanged.
    pub fn menu(&self, id: RestaurantId) -> Option<&[MenuSection]> {
        self.get(id).map(|r| r.items.as_slice())
    }

    pub fn contains(&self, id: RestaurantId) -> bool {
        self.get(id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_catalog_parses() {
        let catalog = Catalog::bundled().unwrap();
        let titles: Vec<_> = catalog.restaurants().iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["Joe's Gelato", "Martini House", "La Capannina"]);
        assert!(catalog.restaurants().iter().all(|r| !r.items.is_empty()));
    }

    #[test]
    fn menu_returns_sections_in_order() {
        let catalog = Catalog::bundled().unwrap();
        let menu = catalog.menu(1).unwrap();
        let sections: Vec<_> = menu.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(sections, ["Gelato", "Coffee"]);
        assert_eq!(menu[1].contents[2].title, "Caffe Americano");
    }

    #[test]
    fn unknown_id_has_no_menu() {
        let catalog = Catalog::bundled().unwrap();
        assert!(catalog.menu(404).is_none());
        assert!(!catalog.contains(404));
    }

    #[test]
    fn duplicated_ids_are_rejected() {
        let raw = r#"[
            { "id": 1, "title": "A", "tagline": "", "eta": "5", "imgUri": "a.jpg" },
            { "id": 1, "title": "B", "tagline": "", "eta": "5", "imgUri": "b.jpg" }
        ]"#;
        let err = Catalog::from_json(raw).unwrap_err();
        assert!(err.to_string().contains("duplicated restaurant id 1"));
    }
}
