// src/db/models/catalog.rs
use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

const DAYS_PER_YEAR: f64 = 365.25;

/// A named inventory location such as the library or the kitchen.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, FromRow, ToSchema)]
pub struct Store {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub department: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, FromRow, ToSchema)]
pub struct Item {
    pub id: Uuid,
    pub name: String,
    pub unit: String,
    /// Current stock on hand.
    pub quantity: i32,
    pub minimum_stock: i32,
    pub store_id: Uuid,
    pub category: Option<String>,
    pub unit_price: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl Item {
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.minimum_stock
    }
}

#[derive(Debug, Serialize, Deserialize, Default, Clone, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct ItemFilter {
    pub store_id: Option<Uuid>,
    pub low_stock_only: Option<bool>,
    pub search: Option<String>,
}

impl ItemFilter {
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn matches(&self, item: &Item) -> bool {
        if self.store_id.is_some_and(|id| id != item.store_id) {
            return false;
        }
        if self.low_stock_only.unwrap_or(false) && !item.is_low_stock() {
            return false;
        }
        match self.search_term() {
            Some(term) => {
                let term = term.to_lowercase();
                item.name.to_lowercase().contains(&term)
                    || item
                        .category
                        .as_deref()
                        .is_some_and(|c| c.to_lowercase().contains(&term))
            }
            None => true,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, FromRow, ToSchema)]
pub struct InventorySummary {
    pub total_items: i64,
    pub total_quantity: i64,
    pub low_stock_count: i64,
    pub store_count: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, FromRow, ToSchema)]
pub struct Supplier {
    pub id: Uuid,
    pub name: String,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, FromRow, ToSchema)]
pub struct Asset {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub purchase_price: f64,
    pub purchase_date: NaiveDate,
    pub useful_life_years: i32,
    pub store_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Asset {
    /// Straight-line estimate of the asset's value on `as_of`.
    ///
    /// Assets with a non-positive useful life are carried at purchase price,
    /// and the value never drops below zero.
    pub fn current_value(&self, as_of: NaiveDate) -> f64 {
        if self.useful_life_years <= 0 {
            return round_cents(self.purchase_price);
        }
        let age_days = (as_of - self.purchase_date).num_days().max(0) as f64;
        let age_years = age_days / DAYS_PER_YEAR;
        let remaining = (1.0 - age_years / f64::from(self.useful_life_years)).max(0.0);
        round_cents(self.purchase_price * remaining)
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
pub struct AssetValuation {
    #[serde(flatten)]
    pub asset: Asset,
    pub current_value: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
pub struct CategoryValuation {
    pub category: String,
    pub asset_count: usize,
    pub purchase_value: f64,
    pub current_value: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
pub struct AssetValuationReport {
    pub as_of: NaiveDate,
    pub assets: Vec<AssetValuation>,
    pub categories: Vec<CategoryValuation>,
    pub total_purchase_value: f64,
    pub total_current_value: f64,
}

impl AssetValuationReport {
    pub fn build(assets: Vec<Asset>, as_of: NaiveDate) -> Self {
        let mut categories: BTreeMap<String, CategoryValuation> = BTreeMap::new();
        let mut valued = Vec::with_capacity(assets.len());

        for asset in assets {
            let current_value = asset.current_value(as_of);
            let entry = categories
                .entry(asset.category.clone())
                .or_insert_with(|| CategoryValuation {
                    category: asset.category.clone(),
                    asset_count: 0,
                    purchase_value: 0.0,
                    current_value: 0.0,
                });
            entry.asset_count += 1;
            entry.purchase_value += asset.purchase_price;
            entry.current_value += current_value;
            valued.push(AssetValuation { asset, current_value });
        }

        let categories: Vec<CategoryValuation> = categories
            .into_values()
            .map(|mut c| {
                c.purchase_value = round_cents(c.purchase_value);
                c.current_value = round_cents(c.current_value);
                c
            })
            .collect();

        Self {
            as_of,
            total_purchase_value: round_cents(categories.iter().map(|c| c.purchase_value).sum()),
            total_current_value: round_cents(categories.iter().map(|c| c.current_value).sum()),
            assets: valued,
            categories,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(category: &str, price: f64, purchased: NaiveDate, life: i32) -> Asset {
        Asset {
            id: Uuid::new_v4(),
            name: format!("{category} asset"),
            category: category.into(),
            purchase_price: price,
            purchase_date: purchased,
            useful_life_years: life,
            store_id: None,
            created_at: Utc::now(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn item(quantity: i32, minimum_stock: i32) -> Item {
        Item {
            id: Uuid::new_v4(),
            name: "Chalk".into(),
            unit: "box".into(),
            quantity,
            minimum_stock,
            store_id: Uuid::new_v4(),
            category: Some("Stationery".into()),
            unit_price: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn low_stock_includes_the_threshold() {
        assert!(item(10, 10).is_low_stock());
        assert!(item(0, 5).is_low_stock());
        assert!(!item(11, 10).is_low_stock());
    }

    #[test]
    fn item_filter_combines_store_low_stock_and_search() {
        let low = item(2, 5);
        let healthy = item(50, 5);

        let low_only = ItemFilter { low_stock_only: Some(true), ..Default::default() };
        assert!(low_only.matches(&low));
        assert!(!low_only.matches(&healthy));

        let other_store = ItemFilter { store_id: Some(Uuid::new_v4()), ..Default::default() };
        assert!(!other_store.matches(&low));

        let by_category = ItemFilter { search: Some("station".into()), ..Default::default() };
        assert!(by_category.matches(&healthy));
    }

    #[test]
    fn straight_line_depreciation() {
        let laptop = asset("ICT", 1000.0, date(2020, 1, 1), 4);
        assert_eq!(laptop.current_value(date(2020, 1, 1)), 1000.0);
        let half = laptop.current_value(date(2022, 1, 1));
        assert!((half - 500.0).abs() < 1.0, "got {half}");
        assert_eq!(laptop.current_value(date(2030, 1, 1)), 0.0);
        // purchase date in the future is treated as new
        assert_eq!(laptop.current_value(date(2019, 6, 1)), 1000.0);
    }

    #[test]
    fn zero_life_assets_do_not_depreciate() {
        let land = asset("Land", 25_000.0, date(2001, 1, 1), 0);
        assert_eq!(land.current_value(date(2025, 1, 1)), 25_000.0);
    }

    #[test]
    fn valuation_report_groups_by_category() {
        let as_of = date(2024, 1, 1);
        let report = AssetValuationReport::build(
            vec![
                asset("Furniture", 200.0, as_of, 10),
                asset("ICT", 800.0, as_of, 4),
                asset("Furniture", 300.0, as_of, 10),
            ],
            as_of,
        );

        assert_eq!(report.assets.len(), 3);
        assert_eq!(report.categories.len(), 2);
        assert_eq!(report.categories[0].category, "Furniture");
        assert_eq!(report.categories[0].asset_count, 2);
        assert_eq!(report.categories[0].purchase_value, 500.0);
        assert_eq!(report.total_purchase_value, 1300.0);
        assert_eq!(report.total_current_value, 1300.0);
    }
}
