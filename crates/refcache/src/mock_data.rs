use refcache_core::entities::{
    Article, Classification, Color, Company, Customer, Depstore, Division, User,
};
use refcache_core::storage::Result;

use crate::state::BaseRepositories;

/// Row counts written by [`seed_demo_data`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedCounts {
    pub companies: usize,
    pub divisions: usize,
    pub depstores: usize,
    pub classifications: usize,
    pub colors: usize,
    pub customers: usize,
    pub articles: usize,
    pub users: usize,
}

/// Fills the base repositories with a small apparel-retail catalog for
/// demonstration purposes.
pub async fn seed_demo_data(base: &BaseRepositories) -> Result<SeedCounts> {
    let acme = Company::new("ACME", "Acme Retail S.A.", "30-71234567-9")
        .with_address("Av. Corrientes 1234, Buenos Aires");
    let norte = Company::new("NORTE", "Distribuidora Norte SRL", "30-70987654-1");

    let divisions = vec![
        Division::new("MEN", "Menswear", &acme.id),
        Division::new("WOM", "Womenswear", &acme.id),
        Division::new("KID", "Kids", &acme.id),
        Division::new("WHS", "Wholesale", &norte.id),
    ];

    let depstores = vec![
        Depstore::new("DEP-01", "Central warehouse", &acme.id).with_address("Ruta 8 km 52"),
        Depstore::new("SHP-01", "Downtown shop", &acme.id).with_address("Florida 560"),
        Depstore::new("DEP-02", "North warehouse", &norte.id),
    ];

    let apparel = Classification::new("APP", "Apparel");
    let tops = Classification::new("TOP", "Tops").with_parent(&apparel.id);
    let bottoms = Classification::new("BOT", "Bottoms").with_parent(&apparel.id);
    let accessories = Classification::new("ACC", "Accessories");

    let red = Color::new("RED", "Red").with_hex("#FF0000");
    let navy = Color::new("NAVY", "Navy blue").with_hex("#000080");
    let black = Color::new("BLK", "Black").with_hex("#000000");
    let white = Color::new("WHT", "White").with_hex("#FFFFFF");

    let menswear = &divisions[0];
    let womenswear = &divisions[1];
    let articles = vec![
        Article::new("TS-001", "Basic T-Shirt")
            .with_description("100% cotton crew neck")
            .with_classification(&tops.id)
            .with_color(&white.id)
            .with_division(&menswear.id)
            .with_unit_price_cents(1_299),
        Article::new("TS-002", "Polo Shirt")
            .with_classification(&tops.id)
            .with_color(&navy.id)
            .with_division(&menswear.id)
            .with_unit_price_cents(2_499),
        Article::new("JN-001", "Slim Jeans")
            .with_description("Stretch denim")
            .with_classification(&bottoms.id)
            .with_color(&navy.id)
            .with_division(&womenswear.id)
            .with_unit_price_cents(4_999),
        Article::new("SK-001", "Pleated Skirt")
            .with_classification(&bottoms.id)
            .with_color(&black.id)
            .with_division(&womenswear.id)
            .with_unit_price_cents(3_599),
        Article::new("SC-001", "Wool Scarf")
            .with_classification(&accessories.id)
            .with_color(&red.id)
            .with_unit_price_cents(1_899),
    ];

    let customers = vec![
        Customer::new("C-0001", "Tienda Sur", "30-76543210-4")
            .with_email("compras@tiendasur.example")
            .with_company(&acme.id),
        Customer::new("C-0002", "Moda Express", "30-71112223-5")
            .with_phone("+54 11 4000-1234")
            .with_company(&acme.id),
        Customer::new("C-0003", "Boutique Lola", "27-28765432-1"),
    ];

    let users = vec![
        User::new("admin", "admin@acme.example", "Administrator")
            .with_password_hash("$argon2id$v=19$m=19456,t=2,p=1$demo$admin"),
        User::new("jperez", "jperez@acme.example", "Juan Pérez")
            .with_password_hash("$argon2id$v=19$m=19456,t=2,p=1$demo$jperez"),
    ];

    let classifications = vec![apparel, tops, bottoms, accessories];
    let colors = vec![red, navy, black, white];
    let companies = vec![acme, norte];

    let counts = SeedCounts {
        companies: companies.len(),
        divisions: divisions.len(),
        depstores: depstores.len(),
        classifications: classifications.len(),
        colors: colors.len(),
        customers: customers.len(),
        articles: articles.len(),
        users: users.len(),
    };

    base.companies.seed(companies).await?;
    base.divisions.seed(divisions).await?;
    base.depstores.seed(depstores).await?;
    base.classifications.seed(classifications).await?;
    base.colors.seed(colors).await?;
    base.customers.seed(customers).await?;
    base.articles.seed(articles).await?;
    base.users.seed(users).await?;

    tracing::debug!(?counts, "Seeded demo data");
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use refcache_core::storage::{Repository, RepositoryError};

    #[tokio::test]
    async fn test_seed_demo_data() {
        let base = BaseRepositories::default();
        let counts = seed_demo_data(&base).await.unwrap();

        assert_eq!(counts.colors, base.colors.len().await);
        assert_eq!(counts.articles, base.articles.len().await);

        let articles = base.articles.get_all().await.unwrap();
        let colors = base.colors.get_all().await.unwrap();
        for article in &articles {
            if let Some(color_id) = &article.color_id {
                assert!(colors.iter().any(|c| &c.id == color_id));
            }
        }
    }

    #[tokio::test]
    async fn test_seeding_twice_conflicts() {
        let base = BaseRepositories::default();
        seed_demo_data(&base).await.unwrap();

        let result = seed_demo_data(&base).await;
        assert!(matches!(result, Err(RepositoryError::AlreadyExists { .. })));
    }
}
