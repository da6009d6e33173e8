use crate::model::Product;

/// Whether `term` is a case-insensitive substring of the product's name, sku
/// or description. Absent fields never match.
pub fn matches(product: &Product, term: &str) -> bool {
    matches_lowercase(product, &term.to_lowercase())
}

/// Narrows `products` to those matching `term`, keeping their order.
pub fn filter_products(products: &[Product], term: &str) -> Vec<Product> {
    let term = term.to_lowercase();
    products
        .iter()
        .filter(|p| matches_lowercase(p, &term))
        .cloned()
        .collect()
}

fn matches_lowercase(product: &Product, term: &str) -> bool {
    let contains = |field: &str| field.to_lowercase().contains(term);

    contains(&product.name)
        || product.sku.as_deref().map_or(false, contains)
        || product.description.as_deref().map_or(false, contains)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::{CompanyId, ProductId};
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn product(name: &str, sku: Option<&str>, description: Option<&str>) -> Product {
        let now = Utc::now();
        Product {
            id: ProductId::new(),
            company_id: CompanyId::new("C1"),
            name: name.to_owned(),
            description: description.map(str::to_owned),
            price: Decimal::new(15000, 2),
            sku: sku.map(str::to_owned),
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn matches_test() {
        let p = product("Consultoria", Some("CONS-MKT-001"), Some("Marketing plan"));

        assert!(matches(&p, ""));
        assert!(matches(&p, "consul"));
        assert!(matches(&p, "CONSULTORIA"));
        assert!(matches(&p, "mkt-001"));
        assert!(matches(&p, "PLAN"));
        assert!(!matches(&p, "auditoria"));
    }

    #[test]
    fn absent_fields_do_not_match_test() {
        let p = product("Consultoria", None, None);

        assert!(!matches(&p, "cons-mkt"));
        assert!(!matches(&p, "marketing"));
        assert!(matches(&p, "toria"));
    }

    #[test]
    fn filter_products_test() {
        let products = vec![
            product("Auditoria", Some("AUD-1"), None),
            product("Consultoria", None, Some("Auditoria prévia incluída")),
            product("Treinamento", Some("TRN-1"), Some("Workshop")),
        ];

        let names = |list: Vec<Product>| list.into_iter().map(|p| p.name).collect::<Vec<_>>();

        assert_eq!(
            names(filter_products(&products, "auditoria")),
            vec!["Auditoria", "Consultoria"]
        );
        assert_eq!(names(filter_products(&products, "trn")), vec!["Treinamento"]);
        assert_eq!(names(filter_products(&products, "")).len(), 3);
        assert!(filter_products(&products, "missing").is_empty());

        // The result is exactly the matching subset.
        for term in ["a", "1", "work", "PRÉVIA", "zz"] {
            let filtered = filter_products(&products, term);
            let expected = products
                .iter()
                .filter(|p| matches(p, term))
                .cloned()
                .collect::<Vec<_>>();
            assert_eq!(filtered, expected);
        }
    }
}
