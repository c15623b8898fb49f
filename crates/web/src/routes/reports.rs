//! Analytics reports page (`/reportes`).
//!
//! Charts are plain SVG computed here, so the page needs no client-side
//! charting library.

use agrotrack_core::report::{Datum, Report, ReportView};
use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::filters;
use crate::middleware::{Browsing, RequireRancher};
use crate::routes::{Nav, Notice};
use crate::state::AppState;

/// Number of `chart-color-N` classes in the stylesheet.
const PALETTE_SIZE: usize = 6;

/// One bar of a bar chart, in a 100x100 viewBox.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// One slice of a donut chart drawn with `stroke-dasharray` on a circle of
/// circumference 100.
#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    pub label: String,
    pub value: String,
    pub share: String,
    pub dash: f64,
    pub gap: f64,
    pub offset: f64,
    pub color: usize,
}

/// What a report card shows.
#[derive(Debug, Clone)]
pub enum ReportBody {
    Bars(Vec<Bar>),
    Donut(Vec<Slice>),
    Financial {
        total_costs: String,
        total_income: String,
        net_profit: String,
        profitable: bool,
    },
    Resources {
        water: Vec<Slice>,
        feed: Vec<Slice>,
    },
    Predictive {
        health: String,
        productivity: String,
    },
    Raw(String),
}

/// A report ready for display.
#[derive(Debug, Clone)]
pub struct ReportCard {
    pub title: String,
    pub description: String,
    pub body: ReportBody,
}

impl From<&Report> for ReportCard {
    fn from(report: &Report) -> Self {
        let body = match report.interpret() {
            ReportView::Productivity(points) => ReportBody::Bars(bars(&points)),
            ReportView::Safety(points) => ReportBody::Donut(slices(&points)),
            ReportView::Financial {
                total_costs,
                total_income,
                net_profit,
            } => ReportBody::Financial {
                total_costs: amount(total_costs),
                total_income: amount(total_income),
                net_profit: amount(net_profit),
                profitable: net_profit >= 0.0,
            },
            ReportView::Resources { water, feed } => ReportBody::Resources {
                water: slices(&water),
                feed: slices(&feed),
            },
            ReportView::Predictive {
                health,
                productivity,
            } => ReportBody::Predictive {
                health,
                productivity,
            },
            ReportView::Raw(json) => ReportBody::Raw(json),
        };

        Self {
            title: report.title.clone(),
            description: report.description.clone(),
            body,
        }
    }
}

/// Format a plain number with thousands separators and up to two decimals.
fn number(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, decimals) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let decimals = decimals.trim_end_matches('0');
    let sign = if value < 0.0 { "-" } else { "" };
    if decimals.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{decimals}")
    }
}

fn amount(value: f64) -> String {
    if value < 0.0 {
        format!("-${}", number(-value))
    } else {
        format!("${}", number(value))
    }
}

fn bars(points: &[Datum]) -> Vec<Bar> {
    let max = points.iter().map(|d| d.value).fold(0.0_f64, f64::max);
    #[allow(clippy::cast_precision_loss)]
    let slot = 100.0 / points.len().max(1) as f64;

    points
        .iter()
        .enumerate()
        .map(|(i, d)| {
            let height = if max > 0.0 {
                (d.value.max(0.0) / max) * 90.0
            } else {
                0.0
            };
            #[allow(clippy::cast_precision_loss)]
            let x = slot * i as f64 + slot * 0.15;
            Bar {
                label: d.label.clone(),
                value: number(d.value),
                x,
                y: 100.0 - height,
                width: slot * 0.7,
                height,
            }
        })
        .collect()
}

fn slices(points: &[Datum]) -> Vec<Slice> {
    let mut start = 0.0;
    points
        .iter()
        .enumerate()
        .map(|(i, d)| {
            let dash = d.share.max(0.0);
            let slice = Slice {
                label: d.label.clone(),
                value: number(d.value),
                share: format!("{:.0}%", d.share),
                dash,
                gap: 100.0 - dash,
                // Start at 12 o'clock and go clockwise.
                offset: 25.0 - start,
                color: i % PALETTE_SIZE,
            };
            start += dash;
            slice
        })
        .collect()
}

/// Reports page template.
#[derive(Template, WebTemplate)]
#[template(path = "reports/index.html")]
pub struct ReportsTemplate {
    pub nav: Nav,
    pub reports: Vec<ReportCard>,
    pub notice: Option<Notice>,
}

/// Display the reports.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    RequireRancher(rancher): RequireRancher,
    Browsing(browsing): Browsing,
) -> impl IntoResponse {
    let (reports, notice) = match state.reports().fetch().await {
        Ok(reports) => (reports.iter().map(ReportCard::from).collect(), None),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch reports");
            (
                Vec::new(),
                Some(Notice::error("Error al cargar los reportes.")),
            )
        }
    };

    ReportsTemplate {
        nav: Nav::new(Some(&rancher), &browsing.cart),
        reports,
        notice,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use agrotrack_core::report::{FINANCIAL, PRODUCTIVITY, SAFETY};
    use serde_json::json;

    use super::*;

    fn report(title: &str, data: serde_json::Value) -> Report {
        Report {
            title: title.to_string(),
            description: String::new(),
            data,
        }
    }

    #[test]
    fn test_number_formatting() {
        assert_eq!(number(1_234_567.0), "1,234,567");
        assert_eq!(number(12.5), "12.5");
        assert_eq!(amount(-200.0), "-$200");
    }

    #[test]
    fn test_tallest_bar_fills_chart() {
        let card = ReportCard::from(&report(PRODUCTIVITY, json!({ "Enero": 50, "Febrero": 100 })));
        let ReportBody::Bars(bars) = card.body else {
            panic!("expected bars");
        };
        let tallest = bars.iter().find(|b| b.label == "Febrero").unwrap();
        assert!((tallest.height - 90.0).abs() < 1e-9);
        assert!((tallest.y - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_slices_cover_circle() {
        let card = ReportCard::from(&report(SAFETY, json!({ "Cercas": 1, "Vigilancia": 3 })));
        let ReportBody::Donut(slices) = card.body else {
            panic!("expected donut");
        };
        let total: f64 = slices.iter().map(|s| s.dash).sum();
        assert!((total - 100.0).abs() < 1e-9);
        assert!((slices[0].offset - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_loss_is_not_profitable() {
        let card = ReportCard::from(&report(
            FINANCIAL,
            json!({ "Total Costos": 1000, "Total Ingresos": 800, "Beneficio Neto": -200 }),
        ));
        let ReportBody::Financial {
            profitable,
            net_profit,
            ..
        } = card.body
        else {
            panic!("expected financial");
        };
        assert!(!profitable);
        assert_eq!(net_profit, "-$200");
    }

    #[test]
    fn test_unknown_title_is_raw() {
        let card = ReportCard::from(&report("Otro", json!({ "a": 1 })));
        assert!(matches!(card.body, ReportBody::Raw(_)));
    }
}
