//! Landing, dashboard and FAQ pages.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;
use tracing::instrument;

use crate::filters;
use crate::middleware::{Browsing, OptionalRancher, RequireRancher};
use crate::routes::Nav;

/// One tab of the landing page.
pub struct WelcomeTab {
    pub title: &'static str,
    pub content: &'static str,
}

const WELCOME_TABS: [WelcomeTab; 3] = [
    WelcomeTab {
        title: "¿Qué es Agrotrack?",
        content: "Agrotrack es una aplicación diseñada para gestionar y monitorear tu ganado de manera eficiente y sencilla.",
    },
    WelcomeTab {
        title: "Funciones Principales",
        content: "Registra tus vacas, monitorea su ubicación en tiempo real y consulta reportes para optimizar el manejo de tu ganado.",
    },
    WelcomeTab {
        title: "Cómo Empezar",
        content: "Regístrate o inicia sesión para comenzar a gestionar tu grupo de vacas y aprovechar todas las funcionalidades que Agrotrack ofrece.",
    },
];

/// A dashboard shortcut.
pub struct HomeCard {
    pub title: &'static str,
    pub description: &'static str,
    pub href: &'static str,
}

const HOME_CARDS: [HomeCard; 7] = [
    HomeCard {
        title: "Registro de Ganado",
        description: "Registra nuevos animales y consulta tu inventario.",
        href: "/registrodevacas",
    },
    HomeCard {
        title: "Ubicación de Ganado",
        description: "Consulta en el mapa dónde se encuentra cada animal.",
        href: "/mapa",
    },
    HomeCard {
        title: "Monitoreo de Ganado",
        description: "Revisa tu hato y el árbol genealógico de cada animal.",
        href: "/monitoreo",
    },
    HomeCard {
        title: "Enfermedades de Ganado",
        description: "Registra signos vitales y detecta animales enfermos.",
        href: "/enfermedades",
    },
    HomeCard {
        title: "Reportes",
        description: "Productividad, seguridad, finanzas y recursos.",
        href: "/reportes",
    },
    HomeCard {
        title: "Tienda",
        description: "Kits de monitoreo y servicios para tu rancho.",
        href: "/shop",
    },
    HomeCard {
        title: "Carrito",
        description: "Revisa los productos que has seleccionado.",
        href: "/cart",
    },
];

/// A question and its answer.
pub struct FaqEntry {
    pub question: &'static str,
    pub answer: &'static str,
}

const FAQ: [FaqEntry; 5] = [
    FaqEntry {
        question: "¿Cómo puedo agregar un producto al carrito?",
        answer: "En la página de la tienda, haz clic en el botón 'Agregar al Carrito' debajo del producto que deseas comprar.",
    },
    FaqEntry {
        question: "¿Cuáles son las opciones de pago disponibles?",
        answer: "Aceptamos tarjetas de crédito, débito y transferencias bancarias. También puedes contactar con nosotros para opciones de pago personalizadas.",
    },
    FaqEntry {
        question: "¿Cuál es el tiempo de envío estimado?",
        answer: "El tiempo de envío varía según tu ubicación. Generalmente, los pedidos se entregan entre 3 y 7 días hábiles.",
    },
    FaqEntry {
        question: "¿Puedo cancelar mi pedido después de haberlo realizado?",
        answer: "Sí, puedes cancelar tu pedido dentro de las primeras 24 horas después de realizarlo contactándonos directamente.",
    },
    FaqEntry {
        question: "¿Ofrecen garantía en sus productos?",
        answer: "Todos nuestros productos cuentan con una garantía de 1 año contra defectos de fabricación.",
    },
];

/// Landing page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/welcome.html")]
pub struct WelcomeTemplate {
    pub nav: Nav,
    pub tabs: &'static [WelcomeTab],
}

/// Dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/home.html")]
pub struct HomeTemplate {
    pub nav: Nav,
    pub cards: &'static [HomeCard],
}

/// FAQ template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/faq.html")]
pub struct FaqTemplate {
    pub nav: Nav,
    pub entries: &'static [FaqEntry],
}

/// Display the landing page.
#[instrument(skip_all)]
pub async fn welcome(
    OptionalRancher(rancher): OptionalRancher,
    Browsing(browsing): Browsing,
) -> impl IntoResponse {
    WelcomeTemplate {
        nav: Nav::new(rancher.as_ref(), &browsing.cart),
        tabs: &WELCOME_TABS,
    }
}

/// Display the dashboard.
#[instrument(skip_all)]
pub async fn home(
    RequireRancher(rancher): RequireRancher,
    Browsing(browsing): Browsing,
) -> impl IntoResponse {
    HomeTemplate {
        nav: Nav::new(Some(&rancher), &browsing.cart),
        cards: &HOME_CARDS,
    }
}

/// Display the FAQ.
#[instrument(skip_all)]
pub async fn faq(
    OptionalRancher(rancher): OptionalRancher,
    Browsing(browsing): Browsing,
) -> impl IntoResponse {
    FaqTemplate {
        nav: Nav::new(rancher.as_ref(), &browsing.cart),
        entries: &FAQ,
    }
}
