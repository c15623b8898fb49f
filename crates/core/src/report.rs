//! Analytics reports and their interpretation by title.
//!
//! The reports endpoint returns `{ "reports": [{ title, description, data }] }`
//! where the shape of `data` depends on `title`. Known titles are decoded
//! into typed views; any other title, or a known title whose payload does not
//! have the expected shape, is shown as pretty-printed JSON.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const PRODUCTIVITY: &str = "Reporte de Productividad";
pub const SAFETY: &str = "Reporte de Seguridad";
pub const FINANCIAL: &str = "Reporte Financiero";
pub const RESOURCES: &str = "Reporte de Recursos";
pub const PREDICTIVE: &str = "Reporte Predictivo";

/// Response body of the reports endpoint.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReportsEnvelope {
    #[serde(default)]
    pub reports: Vec<Report>,
}

/// One report as delivered by the reports endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub data: Value,
}

/// A labeled value with its share of the series total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Datum {
    pub label: String,
    pub value: f64,
    /// Percentage of the series total, 0 when the total is 0.
    pub share: f64,
}

/// Typed rendering of a report payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ReportView {
    /// Bar chart of production per key.
    Productivity(Vec<Datum>),
    /// Pie chart of incidents per key.
    Safety(Vec<Datum>),
    Financial {
        total_costs: f64,
        total_income: f64,
        net_profit: f64,
    },
    Resources {
        water: Vec<Datum>,
        feed: Vec<Datum>,
    },
    Predictive {
        health: String,
        productivity: String,
    },
    /// Unrecognized title or payload shape.
    Raw(String),
}

impl ReportView {
    /// Template discriminator.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Productivity(_) => "productivity",
            Self::Safety(_) => "safety",
            Self::Financial { .. } => "financial",
            Self::Resources { .. } => "resources",
            Self::Predictive { .. } => "predictive",
            Self::Raw(_) => "raw",
        }
    }
}

impl Report {
    /// Decode `data` according to `title`.
    #[must_use]
    pub fn interpret(&self) -> ReportView {
        let decoded = match self.title.as_str() {
            PRODUCTIVITY => series(&self.data).map(ReportView::Productivity),
            SAFETY => series(&self.data).map(ReportView::Safety),
            FINANCIAL => self.financial(),
            RESOURCES => self.resources(),
            PREDICTIVE => self.predictive(),
            _ => None,
        };
        decoded.unwrap_or_else(|| ReportView::Raw(pretty(&self.data)))
    }

    fn financial(&self) -> Option<ReportView> {
        let data = self.data.as_object()?;
        Some(ReportView::Financial {
            total_costs: data.get("Total Costos")?.as_f64()?,
            total_income: data.get("Total Ingresos")?.as_f64()?,
            net_profit: data.get("Beneficio Neto")?.as_f64()?,
        })
    }

    fn resources(&self) -> Option<ReportView> {
        let data = self.data.as_object()?;
        Some(ReportView::Resources {
            water: series(data.get("Consumo de Agua")?)?,
            feed: series(data.get("Consumo de Alimentos")?)?,
        })
    }

    fn predictive(&self) -> Option<ReportView> {
        let data = self.data.as_object()?;
        Some(ReportView::Predictive {
            health: text(data.get("Salud")?),
            productivity: text(data.get("Productividad")?),
        })
    }
}

/// Turn a `{ label: number }` object into data points, in payload order.
fn series(value: &Value) -> Option<Vec<Datum>> {
    let object: &Map<String, Value> = value.as_object()?;
    let points: Vec<(String, f64)> = object
        .iter()
        .map(|(label, v)| v.as_f64().map(|n| (label.clone(), n)))
        .collect::<Option<_>>()?;

    let total: f64 = points.iter().map(|(_, v)| v).sum();
    Some(
        points
            .into_iter()
            .map(|(label, value)| Datum {
                share: if total == 0.0 { 0.0 } else { value / total * 100.0 },
                label,
                value,
            })
            .collect(),
    )
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn report(title: &str, data: Value) -> Report {
        Report {
            title: title.to_owned(),
            description: String::new(),
            data,
        }
    }

    #[test]
    fn test_envelope_parses() {
        let body = json!({
            "reports": [
                { "title": PRODUCTIVITY, "description": "Litros por mes", "data": { "Enero": 120 } }
            ]
        });
        let envelope: ReportsEnvelope = serde_json::from_value(body).unwrap();
        assert_eq!(envelope.reports.len(), 1);
        assert_eq!(envelope.reports[0].description, "Litros por mes");
    }

    #[test]
    fn test_productivity_series_with_shares() {
        let view = report(PRODUCTIVITY, json!({ "Enero": 30, "Febrero": 10 })).interpret();
        let ReportView::Productivity(points) = view else {
            panic!("expected productivity view");
        };
        let enero = points.iter().find(|d| d.label == "Enero").unwrap();
        assert!((enero.share - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_series_keeps_payload_order() {
        let body = r#"{
            "reports": [{
                "title": "Reporte de Productividad",
                "data": { "Enero": 1, "Febrero": 2, "Marzo": 3, "Abril": 4 }
            }]
        }"#;
        let envelope: ReportsEnvelope = serde_json::from_str(body).unwrap();
        let ReportView::Productivity(points) = envelope.reports[0].interpret() else {
            panic!("expected productivity view");
        };
        let labels: Vec<&str> = points.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, ["Enero", "Febrero", "Marzo", "Abril"]);
    }

    #[test]
    fn test_financial() {
        let view = report(
            FINANCIAL,
            json!({ "Total Costos": 1000.0, "Total Ingresos": 800.0, "Beneficio Neto": -200.0 }),
        )
        .interpret();
        assert_eq!(
            view,
            ReportView::Financial {
                total_costs: 1000.0,
                total_income: 800.0,
                net_profit: -200.0
            }
        );
    }

    #[test]
    fn test_resources_two_pies() {
        let view = report(
            RESOURCES,
            json!({
                "Consumo de Agua": { "Potrero A": 10, "Potrero B": 30 },
                "Consumo de Alimentos": { "Heno": 5 }
            }),
        )
        .interpret();
        let ReportView::Resources { water, feed } = view else {
            panic!("expected resources view");
        };
        assert_eq!(water.len(), 2);
        assert!((feed[0].share - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_predictive_stringifies_non_text() {
        let view = report(PREDICTIVE, json!({ "Salud": "Riesgo bajo", "Productividad": 0.93 })).interpret();
        assert_eq!(
            view,
            ReportView::Predictive {
                health: "Riesgo bajo".to_owned(),
                productivity: "0.93".to_owned()
            }
        );
    }

    #[test]
    fn test_unknown_title_falls_back_to_raw() {
        let view = report("Reporte Climático", json!({ "lluvia": 3 })).interpret();
        assert_eq!(view.kind(), "raw");
        let ReportView::Raw(text) = view else {
            unreachable!()
        };
        assert!(text.contains("\"lluvia\": 3"));
    }

    #[test]
    fn test_known_title_with_bad_shape_falls_back_to_raw() {
        let view = report(FINANCIAL, json!({ "Total Costos": "mucho" })).interpret();
        assert_eq!(view.kind(), "raw");
        let view = report(SAFETY, json!([1, 2, 3])).interpret();
        assert_eq!(view.kind(), "raw");
    }

    #[test]
    fn test_zero_total_series() {
        let view = report(SAFETY, json!({ "Robos": 0, "Fugas": 0 })).interpret();
        let ReportView::Safety(points) = view else {
            panic!("expected safety view");
        };
        assert!(points.iter().all(|d| d.share == 0.0));
    }
}
