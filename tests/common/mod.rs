#![allow(dead_code)]

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use school_store::db::models::catalog::{Asset, Item, Store};
use school_store::db::models::profile::{NewProfile, Profile, ProfileRole};
use school_store::db::store::{MemoryStore, ProfileStore, SharedStore};
use school_store::lifecycle::RequestLifecycle;
use uuid::Uuid;

pub const PASSWORD: &str = "correct horse battery staple";

pub struct Fixture {
    pub store: Arc<MemoryStore>,
    pub lifecycle: RequestLifecycle,
    pub lab: Store,
    pub slides: Item,
    pub teacher: Profile,
    pub storekeeper: Profile,
    pub admin: Profile,
}

impl Fixture {
    pub fn shared(&self) -> SharedStore {
        self.store.clone()
    }
}

pub async fn profile(store: &MemoryStore, name: &str, email: &str, role: ProfileRole) -> Profile {
    store
        .create_profile(NewProfile {
            full_name: name.to_string(),
            email: email.to_string(),
            role,
            department: Some("Science".to_string()),
            password_hash: bcrypt::hash(PASSWORD, 4).unwrap(),
        })
        .await
        .unwrap()
}

pub async fn fixture() -> Fixture {
    let store = Arc::new(MemoryStore::new());

    let lab = Store {
        id: Uuid::new_v4(),
        name: "Biology Lab".into(),
        description: Some("Prep room store".into()),
        department: Some("Science".into()),
        created_at: Utc::now(),
    };
    store.insert_store(lab.clone()).await;

    let slides = Item {
        id: Uuid::new_v4(),
        name: "Microscope Slides".into(),
        unit: "box".into(),
        quantity: 4,
        minimum_stock: 10,
        store_id: lab.id,
        category: Some("Lab Consumables".into()),
        unit_price: Some(350.0),
        created_at: Utc::now(),
    };
    store.insert_item(slides.clone()).await;

    store
        .insert_item(Item {
            id: Uuid::new_v4(),
            name: "Beakers 250ml".into(),
            unit: "piece".into(),
            quantity: 40,
            minimum_stock: 12,
            store_id: lab.id,
            category: Some("Glassware".into()),
            unit_price: Some(120.0),
            created_at: Utc::now(),
        })
        .await;

    store
        .insert_asset(Asset {
            id: Uuid::new_v4(),
            name: "Compound microscope".into(),
            category: "Lab Equipment".into(),
            purchase_price: 48_000.0,
            purchase_date: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
            useful_life_years: 8,
            store_id: Some(lab.id),
            created_at: Utc::now(),
        })
        .await;

    let teacher = profile(&store, "Mary Wanjiku", "mary@school.test", ProfileRole::Teacher).await;
    let storekeeper = profile(&store, "Peter Otieno", "peter@school.test", ProfileRole::Storekeeper).await;
    let admin = profile(&store, "Head Teacher", "head@school.test", ProfileRole::Admin).await;

    let shared: SharedStore = store.clone();
    Fixture {
        lifecycle: RequestLifecycle::new(shared),
        store,
        lab,
        slides,
        teacher,
        storekeeper,
        admin,
    }
}
