//! The storefront product catalog.
//!
//! The shop sells a fixed set of monitoring kits and services, so the
//! catalog is compiled in rather than fetched.

use std::sync::LazyLock;

use serde::Serialize;

use crate::types::{Money, ProductId};

/// A product offered in the shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Money,
    pub image: String,
    pub specifications: String,
}

impl Product {
    /// Zero-priced products are services quoted on request: they are not
    /// added to the cart, the customer is sent to the contact form instead.
    #[must_use]
    pub fn is_contact_only(&self) -> bool {
        self.price.is_zero()
    }
}

fn product(id: &str, name: &str, description: &str, centavos: i64, image: &str, specs: &str) -> Product {
    Product {
        id: ProductId::from(id),
        name: name.to_owned(),
        description: description.to_owned(),
        price: Money::from_centavos(centavos),
        image: image.to_owned(),
        specifications: specs.to_owned(),
    }
}

static CATALOG: LazyLock<Vec<Product>> = LazyLock::new(|| {
    vec![
        product(
            "kit1",
            "Agrotrack Kit",
            "Kit básico de monitoreo para tu ganado.",
            199_999,
            "/static/img/kit.svg",
            "Incluye sensores básicos, monitoreo en tiempo real y soporte técnico estándar.",
        ),
        product(
            "service1",
            "Servicio de Consultoría",
            "Contáctanos para servicios personalizados.",
            0,
            "/static/img/service.svg",
            "Consultoría personalizada para optimizar tus operaciones ganaderas.",
        ),
        product(
            "kit2",
            "Agrotrack Avanzado",
            "Kit avanzado con funcionalidades adicionales.",
            299_999,
            "/static/img/kit-advanced.svg",
            "Sensores avanzados, integración con software de análisis y soporte premium.",
        ),
        product(
            "service2",
            "Soporte Técnico Premium",
            "Soporte técnico prioritario 24/7.",
            499_999,
            "/static/img/support.svg",
            "Soporte técnico prioritario, actualizaciones regulares y consultoría continua.",
        ),
        product(
            "kit3",
            "Agrotrack Profesional",
            "Kit profesional para grandes operaciones ganaderas.",
            499_999,
            "/static/img/kit-professional.svg",
            "Sensores de alta precisión, múltiples integraciones y soporte dedicado.",
        ),
        product(
            "service3",
            "Mantenimiento Regular",
            "Servicio de mantenimiento mensual.",
            149_999,
            "/static/img/maintenance.svg",
            "Mantenimiento preventivo, revisión de sensores y optimización del sistema.",
        ),
    ]
});

/// All products in display order.
#[must_use]
pub fn all() -> &'static [Product] {
    &CATALOG
}

/// Look up a product by its slug.
#[must_use]
pub fn find(id: &str) -> Option<&'static Product> {
    CATALOG.iter().find(|p| p.id.as_str() == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let mut ids: Vec<&str> = all().iter().map(|p| p.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), all().len());
    }

    #[test]
    fn test_find() {
        assert_eq!(find("kit1").map(|p| p.price.display()), Some("$1,999.99".to_string()));
        assert!(find("tractor").is_none());
    }

    #[test]
    fn test_contact_only_services() {
        assert!(find("service1").is_some_and(Product::is_contact_only));
        assert!(!find("service3").is_some_and(Product::is_contact_only));
    }
}
