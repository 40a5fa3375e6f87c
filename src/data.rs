use serde::{Deserialize, Serialize};

/// Stable identifier of a restaurant in the bundled catalog.
pub type RestaurantId = u32;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: RestaurantId,
    pub title: String,
    pub tagline: String,
    /// delivery estimate in minutes, e.g. "10-30" or "50+"
    pub eta: String,
    /// path to image
    #[serde(rename = "imgUri")]
    pub img_uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default)]
    pub items: Vec<MenuSection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuSection {
    pub title: String,
    #[serde(default)]
    pub contents: Vec<MenuItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// path to image
    #[serde(default, rename = "imgUri", skip_serializing_if = "Option::is_none")]
    pub img_uri: Option<String>,
}
