//! Integration tests for the catalog repository
//!
//! These tests require a PostgreSQL database and are ignored by default.
//! Run with: DATABASE_URL=postgres://... cargo test -- --ignored

use serena_core::traits::CatalogRepository;
use serena_db::repositories::PgCatalogRepository;
use sqlx::PgPool;

async fn test_pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = serena_db::create_pool(&url, Some(5))
        .await
        .expect("Failed to create pool");

    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

fn unique_tag() -> String {
    format!(
        "{}-{}",
        std::process::id(),
        chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
    )
}

async fn seed_variant(pool: &PgPool, tag: &str) -> i64 {
    let (service_id,): (i64,) =
        sqlx::query_as("INSERT INTO services (name) VALUES ($1) RETURNING service_id")
            .bind(format!("Facial {}", tag))
            .fetch_one(pool)
            .await
            .unwrap();

    let (variant_id,): (i64,) = sqlx::query_as(
        "INSERT INTO service_variants (service_id, name, duration_minutes, price) \
         VALUES ($1, '45 min', 45, 65.00) RETURNING variant_id",
    )
    .bind(service_id)
    .fetch_one(pool)
    .await
    .unwrap();

    variant_id
}

#[tokio::test]
#[ignore]
async fn packages_list_with_grouped_items() {
    let pool = test_pool().await;
    let tag = unique_tag();
    let variant_id = seed_variant(&pool, &tag).await;

    let (package_id,): (i64,) = sqlx::query_as(
        "INSERT INTO packages (name, price) VALUES ($1, 180.00) RETURNING package_id",
    )
    .bind(format!("Glow Bundle {}", tag))
    .fetch_one(&pool)
    .await
    .unwrap();

    sqlx::query(
        "INSERT INTO package_items (package_id, variant_id, quantity) VALUES ($1, $2, 3)",
    )
    .bind(package_id)
    .bind(variant_id)
    .execute(&pool)
    .await
    .unwrap();

    // An inactive package must not appear
    let (hidden_id,): (i64,) = sqlx::query_as(
        "INSERT INTO packages (name, is_active) VALUES ($1, FALSE) RETURNING package_id",
    )
    .bind(format!("Retired Bundle {}", tag))
    .fetch_one(&pool)
    .await
    .unwrap();

    let repo = PgCatalogRepository::new(pool.clone());
    let packages = repo.list_active_packages().await.unwrap();

    let bundle = packages
        .iter()
        .find(|p| p.package.package_id == package_id)
        .expect("seeded package missing from listing");
    assert_eq!(bundle.items.len(), 1);
    assert_eq!(bundle.items[0].variant_id, variant_id);
    assert_eq!(bundle.items[0].quantity, 3);

    assert!(packages.iter().all(|p| p.package.package_id != hidden_id));
}

#[tokio::test]
#[ignore]
async fn variant_resolution_carries_service_flag() {
    let pool = test_pool().await;
    let tag = unique_tag();
    let variant_id = seed_variant(&pool, &tag).await;

    let found = PgCatalogRepository::fetch_variant_with_service(&pool, variant_id)
        .await
        .unwrap()
        .expect("seeded variant missing");
    assert_eq!(found.duration_minutes, 45);
    assert!(found.is_bookable());

    sqlx::query("UPDATE services SET is_active = FALSE WHERE service_id = $1")
        .bind(found.service_id)
        .execute(&pool)
        .await
        .unwrap();

    let refetched = PgCatalogRepository::fetch_variant_with_service(&pool, variant_id)
        .await
        .unwrap()
        .unwrap();
    assert!(!refetched.service_is_active);
    assert!(!refetched.is_bookable());

    let absent = PgCatalogRepository::fetch_variant_with_service(&pool, -1)
        .await
        .unwrap();
    assert!(absent.is_none());
}
