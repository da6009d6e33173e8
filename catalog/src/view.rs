//! Text rendering of the products screen.

use crate::controller::FormMode;
use crate::model::{Product, ProductDraft};
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt;

pub fn render_header() -> String {
    Header.to_string()
}

pub fn render_filters(search_term: &str, show_inactive: bool) -> String {
    Filters {
        search_term,
        show_inactive,
    }
    .to_string()
}

pub fn render_list(products: &[Product]) -> String {
    ProductList(products).to_string()
}

pub fn render_form(draft: &ProductDraft, mode: FormMode) -> String {
    ProductForm { draft, mode }.to_string()
}

/// Formats a price in Brazilian reais, e.g. `R$ 1.234,56`.
pub fn format_price(price: Decimal) -> String {
    let rounded = price.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let plain = format!("{:.2}", rounded.abs());
    let (units, cents) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let mut grouped = String::with_capacity(units.len() + units.len() / 3);
    for (i, digit) in units.chars().enumerate() {
        if i > 0 && (units.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };

    format!("{}R$ {},{}", sign, grouped, cents)
}

pub struct Header;

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Products")?;
        writeln!(f, "Manage your catalog of products and services")?;
        writeln!(f, "[new] New product")
    }
}

pub struct Filters<'a> {
    pub search_term: &'a str,
    pub show_inactive: bool,
}

impl fmt::Display for Filters<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let check = if self.show_inactive { 'x' } else { ' ' };
        if self.search_term.is_empty() {
            write!(f, "Search: (by name, SKU or description)")?;
        } else {
            write!(f, "Search: {}", self.search_term)?;
        }
        writeln!(f, "    [{}] Show inactive", check)
    }
}

pub struct ProductList<'a>(pub &'a [Product]);

impl fmt::Display for ProductList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No products found.");
        }

        for (n, product) in self.0.iter().enumerate() {
            write!(f, "{:>3}. {}", n + 1, product.name)?;
            if !product.active {
                write!(f, " (Inactive)")?;
            }
            writeln!(f, "  {}", format_price(product.price))?;

            if let Some(sku) = &product.sku {
                writeln!(f, "     SKU: {}", sku)?;
            }
            if let Some(description) = &product.description {
                writeln!(f, "     {}", description)?;
            }
        }

        Ok(())
    }
}

pub struct ProductForm<'a> {
    pub draft: &'a ProductDraft,
    pub mode: FormMode,
}

impl fmt::Display for ProductForm<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (title, action) = match self.mode {
            FormMode::Create => ("New product", "Create product"),
            FormMode::Edit => ("Edit product", "Update product"),
        };
        let draft = self.draft;

        writeln!(f, "{}", title)?;
        writeln!(f, "  name:        {}", draft.name)?;
        writeln!(f, "  description: {}", draft.description)?;
        writeln!(f, "  price:       {}", format_price(draft.price))?;
        writeln!(f, "  sku:         {}", draft.sku)?;
        writeln!(f, "  active:      {}", if draft.active { "yes" } else { "no" })?;
        writeln!(f, "[save] {}  [cancel] Cancel", action)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::{CompanyId, ProductId};
    use chrono::Utc;

    fn price(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn product(name: &str, active: bool) -> Product {
        let now = Utc::now();
        Product {
            id: ProductId::new(),
            company_id: CompanyId::new("C1"),
            name: name.to_owned(),
            description: None,
            price: price("150.00"),
            sku: None,
            active,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn format_price_test() {
        assert_eq!(format_price(price("0")), "R$ 0,00");
        assert_eq!(format_price(price("150")), "R$ 150,00");
        assert_eq!(format_price(price("199.9")), "R$ 199,90");
        assert_eq!(format_price(price("1234.56")), "R$ 1.234,56");
        assert_eq!(format_price(price("1234567.005")), "R$ 1.234.567,01");
        assert_eq!(format_price(price("-12.5")), "-R$ 12,50");
    }

    #[test]
    fn render_list_test() {
        assert_eq!(render_list(&[]), "No products found.\n");

        let mut consulting = product("Consultoria", true);
        consulting.sku = Some("CONS-001".to_owned());
        consulting.description = Some("Marketing plan".to_owned());
        let training = product("Treinamento", false);

        let out = render_list(&[consulting, training]);
        let lines = out.lines().collect::<Vec<_>>();

        assert_eq!(
            lines,
            vec![
                "  1. Consultoria  R$ 150,00",
                "     SKU: CONS-001",
                "     Marketing plan",
                "  2. Treinamento (Inactive)  R$ 150,00",
            ]
        );
    }

    #[test]
    fn render_filters_test() {
        assert_eq!(
            render_filters("", false),
            "Search: (by name, SKU or description)    [ ] Show inactive\n"
        );
        assert_eq!(render_filters("cons", true), "Search: cons    [x] Show inactive\n");
    }

    #[test]
    fn render_form_test() {
        let create = render_form(&ProductDraft::new(), FormMode::Create);
        assert!(create.starts_with("New product\n"));
        assert!(create.contains("price:       R$ 0,00"));
        assert!(create.contains("active:      yes"));
        assert!(create.ends_with("[save] Create product  [cancel] Cancel\n"));

        let draft = ProductDraft::from_product(&product("Consultoria", false));
        let edit = render_form(&draft, FormMode::Edit);
        assert!(edit.starts_with("Edit product\n"));
        assert!(edit.contains("name:        Consultoria"));
        assert!(edit.contains("active:      no"));
        assert!(edit.contains("Update product"));
    }

    #[test]
    fn render_header_test() {
        assert!(render_header().starts_with("Products\n"));
    }
}
