//! Client-side listing filter.
//!
//! Case-insensitive substring matching over the last successful fetch. Filtering is
//! pure and never touches the network.

use crate::models::FoodListing;

/// Search and location terms. Blank terms match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingFilter {
    /// Matched against name and description
    pub search: String,
    /// Matched against pickup location
    pub location: String,
}

impl ListingFilter {
    pub fn new(search: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            location: location.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.search.trim().is_empty() && self.location.trim().is_empty()
    }

    pub fn matches(&self, listing: &FoodListing) -> bool {
        let search = self.search.trim().to_lowercase();
        let location = self.location.trim().to_lowercase();

        let search_ok = search.is_empty()
            || listing.display_name().to_lowercase().contains(&search)
            || listing.food_description.to_lowercase().contains(&search);

        let location_ok = location.is_empty()
            || listing
                .location
                .as_deref()
                .map(|l| l.to_lowercase().contains(&location))
                .unwrap_or(false);

        search_ok && location_ok
    }

    /// Items matching the filter, in their original order.
    pub fn apply<'a, T: AsRef<FoodListing>>(&self, items: &'a [T]) -> Vec<&'a T> {
        items.iter().filter(|i| self.matches(i.as_ref())).collect()
    }
}

impl AsRef<FoodListing> for FoodListing {
    fn as_ref(&self) -> &FoodListing {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(id: &str, name: &str, description: &str, location: Option<&str>) -> FoodListing {
        FoodListing {
            id: id.to_string(),
            food_name: name.to_string(),
            name: None,
            food_description: description.to_string(),
            expiry_date: None,
            expiry_time: None,
            location: location.map(str::to_string),
            image: None,
            image_url: None,
            created_at: None,
            donor: None,
            donated_by: None,
            donor_name: None,
        }
    }

    fn sample() -> Vec<FoodListing> {
        vec![
            listing("1", "Chicken Biryani", "Leftover from a wedding", Some("Dhanmondi")),
            listing("2", "Bread", "Whole wheat loaves", Some("Gulshan 2")),
            listing("3", "Fruit basket", "Apples and bananas", None),
        ]
    }

    fn ids(items: &[&FoodListing]) -> Vec<String> {
        items.iter().map(|l| l.id.clone()).collect()
    }

    #[test]
    fn test_search_matches_name_or_description_case_insensitively() {
        let items = sample();
        assert_eq!(ids(&ListingFilter::new("BIRYANI", "").apply(&items)), ["1"]);
        assert_eq!(ids(&ListingFilter::new("wheat", "").apply(&items)), ["2"]);
    }

    #[test]
    fn test_location_filter_skips_listings_without_location() {
        let items = sample();
        assert_eq!(ids(&ListingFilter::new("", "gulshan").apply(&items)), ["2"]);
        assert_eq!(ids(&ListingFilter::new("a", "dhan").apply(&items)), ["1"]);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let items = sample();
        let filter = ListingFilter::new("an", "");
        let once: Vec<FoodListing> = filter.apply(&items).into_iter().cloned().collect();
        let twice: Vec<FoodListing> = filter.apply(&once).into_iter().cloned().collect();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_clearing_terms_restores_full_set() {
        let items = sample();
        let mut filter = ListingFilter::new("bread", "gulshan");
        assert_eq!(filter.apply(&items).len(), 1);
        filter = ListingFilter::default();
        assert!(filter.is_empty());
        assert_eq!(filter.apply(&items).len(), items.len());
    }
}
