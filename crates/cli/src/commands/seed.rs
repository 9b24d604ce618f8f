//! Seed the database with demo catalog data and test accounts.
//!
//! Intended for development and demo environments. The seeder is
//! idempotent in the blunt way: it refuses to run if any category already
//! exists, rather than merging.

use rust_decimal::Decimal;
use serde_json::json;
use thiserror::Error;
use tracing::info;

use luxjewels_core::{CategoryId, Email, EmailError, ProductStatus, UserRole};
use luxjewels_server::db::products::{NewProduct, NewProductImage, NewProductVariant};
use luxjewels_server::db::{self, CategoryRepository, ProductRepository, UserRepository};
use luxjewels_server::services::auth::{self, AuthError};

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Repository error: {0}")]
    Repository(#[from] db::RepositoryError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Invalid email: {0}")]
    Email(#[from] EmailError),

    #[error("Database already contains catalog data; refusing to seed")]
    AlreadySeeded,
}

struct SeedProduct {
    category: usize,
    name: &'static str,
    slug: &'static str,
    description: &'static str,
    sku: &'static str,
    price: &'static str,
    compare_price: Option<&'static str>,
    featured: bool,
    image: (&'static str, &'static str),
    variants: &'static [(&'static str, &'static str, &'static str, i32, &'static str, &'static str)],
}

const CATEGORIES: &[(&str, &str, &str)] = &[
    ("Rings", "rings", "Beautiful rings for every occasion"),
    ("Necklaces", "necklaces", "Elegant necklaces and pendants"),
    ("Earrings", "earrings", "Stunning earrings for all styles"),
    ("Bracelets", "bracelets", "Exquisite bracelets and bangles"),
];

// (variant name, sku, price, stock, attribute key, attribute value)
const PRODUCTS: &[SeedProduct] = &[
    SeedProduct {
        category: 0,
        name: "Diamond Solitaire Ring",
        slug: "diamond-solitaire-ring",
        description: "Classic 1-carat diamond solitaire ring in 18k white gold. A timeless symbol of elegance.",
        sku: "RING-001",
        price: "4999.99",
        compare_price: Some("5999.99"),
        featured: true,
        image: (
            "https://images.unsplash.com/photo-1605100804763-247f67b3557e?w=800&h=800&fit=crop",
            "Diamond Solitaire Ring",
        ),
        variants: &[
            ("Size 5", "RING-001-5", "4999.99", 3, "size", "5"),
            ("Size 6", "RING-001-6", "4999.99", 5, "size", "6"),
            ("Size 7", "RING-001-7", "4999.99", 4, "size", "7"),
            ("Size 8", "RING-001-8", "4999.99", 2, "size", "8"),
        ],
    },
    SeedProduct {
        category: 0,
        name: "Sapphire and Diamond Ring",
        slug: "sapphire-diamond-ring",
        description: "Stunning blue sapphire surrounded by diamonds in 14k yellow gold.",
        sku: "RING-002",
        price: "2999.99",
        compare_price: Some("3499.99"),
        featured: false,
        image: (
            "https://images.unsplash.com/photo-1603561591411-07134e71a2a9?w=800&h=800&fit=crop",
            "Sapphire and Diamond Ring",
        ),
        variants: &[
            ("Size 5", "RING-002-5", "2999.99", 2, "size", "5"),
            ("Size 6", "RING-002-6", "2999.99", 3, "size", "6"),
            ("Size 7", "RING-002-7", "2999.99", 4, "size", "7"),
        ],
    },
    SeedProduct {
        category: 0,
        name: "Rose Gold Band",
        slug: "rose-gold-band",
        description: "Simple and elegant rose gold wedding band, 4mm width.",
        sku: "RING-003",
        price: "799.99",
        compare_price: None,
        featured: false,
        image: (
            "https://images.unsplash.com/photo-1611591437281-460bfbe1220a?w=800&h=800&fit=crop",
            "Rose Gold Band",
        ),
        variants: &[
            ("Size 6", "RING-003-6", "799.99", 10, "size", "6"),
            ("Size 7", "RING-003-7", "799.99", 8, "size", "7"),
            ("Size 8", "RING-003-8", "799.99", 6, "size", "8"),
            ("Size 9", "RING-003-9", "799.99", 5, "size", "9"),
        ],
    },
    SeedProduct {
        category: 1,
        name: "Pearl Strand Necklace",
        slug: "pearl-strand-necklace",
        description: "Classic freshwater pearl necklace with 14k gold clasp. Length: 18 inches.",
        sku: "NECK-001",
        price: "1299.99",
        compare_price: Some("1599.99"),
        featured: true,
        image: (
            "https://images.unsplash.com/photo-1515562141207-7a88fb7ce338?w=800&h=800&fit=crop",
            "Pearl Strand Necklace",
        ),
        variants: &[
            ("16 inch", "NECK-001-16", "1199.99", 4, "length", "16\""),
            ("18 inch", "NECK-001-18", "1299.99", 6, "length", "18\""),
            ("20 inch", "NECK-001-20", "1399.99", 3, "length", "20\""),
        ],
    },
    SeedProduct {
        category: 1,
        name: "Diamond Tennis Necklace",
        slug: "diamond-tennis-necklace",
        description: "5 carat total weight diamond tennis necklace in 18k white gold.",
        sku: "NECK-002",
        price: "8999.99",
        compare_price: None,
        featured: true,
        image: (
            "https://images.unsplash.com/photo-1599643478518-a784e5dc4c8f?w=800&h=800&fit=crop",
            "Diamond Tennis Necklace",
        ),
        variants: &[("Standard", "NECK-002-STD", "8999.99", 2, "", "")],
    },
    SeedProduct {
        category: 2,
        name: "Diamond Stud Earrings",
        slug: "diamond-stud-earrings",
        description: "1 carat total weight diamond studs in 14k white gold.",
        sku: "EAR-001",
        price: "1999.99",
        compare_price: Some("2499.99"),
        featured: true,
        image: (
            "https://images.unsplash.com/photo-1535632066927-ab7c9ab60908?w=800&h=800&fit=crop",
            "Diamond Stud Earrings",
        ),
        variants: &[
            ("0.5 ct tw", "EAR-001-05", "999.99", 8, "carats", "0.5"),
            ("1.0 ct tw", "EAR-001-10", "1999.99", 5, "carats", "1.0"),
            ("2.0 ct tw", "EAR-001-20", "3999.99", 2, "carats", "2.0"),
        ],
    },
    SeedProduct {
        category: 2,
        name: "Gold Hoop Earrings",
        slug: "gold-hoop-earrings",
        description: "Classic gold hoop earrings in 14k yellow gold, 30mm diameter.",
        sku: "EAR-003",
        price: "599.99",
        compare_price: None,
        featured: false,
        image: (
            "https://images.unsplash.com/photo-1573408301185-9146fe634ad0?w=800&h=800&fit=crop",
            "Gold Hoop Earrings",
        ),
        variants: &[
            ("20mm", "EAR-003-20", "399.99", 10, "diameter", "20mm"),
            ("30mm", "EAR-003-30", "599.99", 8, "diameter", "30mm"),
            ("40mm", "EAR-003-40", "799.99", 6, "diameter", "40mm"),
        ],
    },
    SeedProduct {
        category: 3,
        name: "Silver Cuff Bracelet",
        slug: "silver-cuff-bracelet",
        description: "Modern sterling silver cuff bracelet with minimalist design.",
        sku: "BRAC-003",
        price: "349.99",
        compare_price: None,
        featured: false,
        image: (
            "https://images.unsplash.com/photo-1611085583191-a3b181a88401?w=800&h=800&fit=crop",
            "Silver Cuff Bracelet",
        ),
        variants: &[
            ("Small", "BRAC-003-S", "349.99", 6, "size", "Small"),
            ("Medium", "BRAC-003-M", "349.99", 8, "size", "Medium"),
            ("Large", "BRAC-003-L", "349.99", 4, "size", "Large"),
        ],
    },
];

const REVIEWS: &[(i32, &str, &str)] = &[
    (5, "Absolutely stunning!", "The quality exceeded my expectations. Beautiful piece!"),
    (5, "Perfect gift", "My wife loved it! Excellent craftsmanship."),
    (4, "Very nice", "Beautiful jewellery, though slightly smaller than expected."),
    (5, "Exceptional quality", "Worth every penny. The pictures don't do it justice!"),
];

fn parse_price(s: &str) -> Decimal {
    s.parse().unwrap_or_default()
}

fn attributes_json(key: &str, value: &str) -> serde_json::Value {
    if key.is_empty() {
        return json!({});
    }
    let mut map = serde_json::Map::new();
    map.insert(key.to_owned(), serde_json::Value::String(value.to_owned()));
    serde_json::Value::Object(map)
}

/// Seed the database.
///
/// # Errors
///
/// Returns `SeedError` if the database already contains data or any insert
/// fails.
pub async fn run() -> Result<(), SeedError> {
    let database_url = super::database_url().map_err(SeedError::MissingEnvVar)?;
    let pool = db::create_pool(&database_url).await?;

    let categories = CategoryRepository::new(&pool);
    if !categories.list().await?.is_empty() {
        return Err(SeedError::AlreadySeeded);
    }

    info!("Seeding users...");
    let users = UserRepository::new(&pool);

    let admin_email = Email::parse("admin@luxjewels.com")?;
    let admin = users
        .create_with_password(
            &admin_email,
            "Admin",
            "User",
            UserRole::Admin,
            &auth::hash_password("admin123")?,
        )
        .await?;
    users.mark_email_verified(admin.id).await?;

    let customer_email = Email::parse("customer@example.com")?;
    let customer = users
        .create_with_password(
            &customer_email,
            "John",
            "Doe",
            UserRole::Customer,
            &auth::hash_password("customer123")?,
        )
        .await?;
    users.mark_email_verified(customer.id).await?;

    info!("Seeding categories...");
    let mut category_ids: Vec<CategoryId> = Vec::with_capacity(CATEGORIES.len());
    for (name, slug, description) in CATEGORIES {
        let category = categories.create(name, slug, Some(description)).await?;
        category_ids.push(category.id);
    }

    info!("Seeding products...");
    let products = ProductRepository::new(&pool);
    let mut product_ids = Vec::with_capacity(PRODUCTS.len());
    for seed in PRODUCTS {
        let new = NewProduct {
            category_id: category_ids[seed.category],
            name: seed.name.to_owned(),
            slug: seed.slug.to_owned(),
            description: seed.description.to_owned(),
            sku: seed.sku.to_owned(),
            price: parse_price(seed.price),
            compare_price: seed.compare_price.map(parse_price),
            status: ProductStatus::Active,
            featured: seed.featured,
            images: vec![NewProductImage {
                url: seed.image.0.to_owned(),
                alt: Some(seed.image.1.to_owned()),
                position: 0,
            }],
            variants: seed
                .variants
                .iter()
                .map(|(name, sku, price, stock, attr_key, attr_value)| NewProductVariant {
                    sku: (*sku).to_owned(),
                    name: (*name).to_owned(),
                    price: parse_price(price),
                    stock: *stock,
                    attributes: attributes_json(attr_key, attr_value),
                })
                .collect(),
        };

        let id = products.create(&new).await?;
        product_ids.push(id);
        info!(product = seed.name, "Created product");
    }

    info!("Seeding reviews...");
    for (product_id, (rating, title, comment)) in product_ids.iter().zip(REVIEWS) {
        sqlx::query(
            r"
            INSERT INTO reviews (product_id, user_id, rating, title, comment)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(product_id)
        .bind(customer.id)
        .bind(rating)
        .bind(title)
        .bind(comment)
        .execute(&pool)
        .await?;
    }

    info!("Seed completed successfully!");
    info!("Admin login: admin@luxjewels.com / admin123");
    info!("Customer login: customer@example.com / customer123");
    Ok(())
}
