//! Assembles the per-upload dashboard: titled sections of renderable views.
//!
//! Everything here is computed from the records of one upload and owned by
//! the returned `Dashboard`; nothing carries over between uploads.

use crate::config::DashboardConfig;
use crate::error::Result;
use crate::loader::{load_upload, preview, LoadReport};
use crate::reports;
use crate::types::{
    CampaignRow, ChannelRow, Insight, KpiSummary, Record, ShareSlice, TimeSeriesRow,
};
use crate::util::{format_currency, format_int, format_ratio};
use serde::Serialize;
use std::borrow::Cow;
use tabled::Tabled;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Vertical,
    Horizontal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub values: Vec<f64>,
}

/// One payload for the rendering host, tagged by the kind of widget it feeds.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum View {
    MetricCard {
        label: String,
        value: f64,
        display: String,
    },
    LineChart {
        title: String,
        x_axis: String,
        x_values: Vec<String>,
        series: Vec<Series>,
    },
    BarChart {
        title: String,
        category_axis: String,
        value_axis: String,
        orientation: Orientation,
        points: Vec<Point>,
    },
    PieChart {
        title: String,
        slices: Vec<ShareSlice>,
    },
    Table {
        title: String,
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
    },
}

impl View {
    pub fn kind(&self) -> &'static str {
        match self {
            View::MetricCard { .. } => "metric-card",
            View::LineChart { .. } => "line-chart",
            View::BarChart { .. } => "bar-chart",
            View::PieChart { .. } => "pie-chart",
            View::Table { .. } => "table",
        }
    }

    /// A raw table built from any `Tabled` row type, using its display
    /// headers and cell formatting.
    pub fn table<T: Tabled>(title: &str, rows: &[T]) -> Self {
        View::Table {
            title: title.to_string(),
            columns: T::headers().into_iter().map(Cow::into_owned).collect(),
            rows: rows
                .iter()
                .map(|r| r.fields().into_iter().map(Cow::into_owned).collect())
                .collect(),
        }
    }

    fn card(label: &str, value: f64, display: String) -> Self {
        View::MetricCard {
            label: label.to_string(),
            value,
            display,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub title: String,
    pub views: Vec<View>,
}

impl Section {
    fn new(title: &str, views: Vec<View>) -> Self {
        Self {
            title: title.to_string(),
            views,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub file_name: String,
    pub rows: usize,
    /// Load warnings such as missing columns. Through `process_upload` a
    /// missing column also fails the load, and the error names every absent
    /// column; this list matters when building from a `LoadReport` directly.
    pub warnings: Vec<String>,
    pub kpis: KpiSummary,
    pub insight: Option<Insight>,
    pub sections: Vec<Section>,
}

/// Run one complete pass over an uploaded file. Any failure aborts the
/// pass; there is no partial dashboard.
pub fn process_upload(
    file_name: &str,
    bytes: &[u8],
    config: &DashboardConfig,
) -> Result<Dashboard> {
    let (records, report) = load_upload(file_name, bytes)?;
    let mut dashboard = build_dashboard(&records, &report, config);
    dashboard.file_name = file_name.to_string();
    info!(
        file = file_name,
        rows = dashboard.rows,
        sections = dashboard.sections.len(),
        "dashboard built"
    );
    Ok(dashboard)
}

pub fn build_dashboard(
    records: &[Record],
    report: &LoadReport,
    config: &DashboardConfig,
) -> Dashboard {
    let mut warnings = Vec::new();
    if !report.missing_columns.is_empty() {
        warnings.push(format!(
            "Columns missing in the uploaded file: {:?}",
            report.missing_columns
        ));
    }

    let kpis = reports::kpi_summary(records);
    let days = reports::time_series(records);
    let channels = reports::channel_performance(records);
    let campaigns = reports::campaign_performance(records);
    let ranking = reports::campaign_ranking(&campaigns, config.top_n);
    let creatives = reports::creative_performance(records, config.good_roas_threshold);
    let dist = reports::distribution(&channels);
    let insight = reports::top_channel_insight(&channels);

    let sections = vec![
        Section::new(
            "Uploaded Data",
            vec![View::table("Preview", &preview(records, config.preview_rows))],
        ),
        Section::new("Key Metrics", kpi_cards(&kpis)),
        Section::new("Revenue & Spend Over Time", vec![time_chart(&days)]),
        Section::new(
            "Channel Performance",
            vec![
                View::table("Channel Performance", &channels),
                channel_chart(&channels),
            ],
        ),
        Section::new(
            "Campaign Performance",
            vec![
                campaign_chart(
                    &format!("Top {} Campaigns by Revenue", config.top_n),
                    "Revenue",
                    &ranking.top_by_revenue,
                    |c| c.revenue,
                ),
                campaign_chart(
                    &format!("Bottom {} Campaigns by ROAS", config.top_n),
                    "ROAS",
                    &ranking.bottom_by_roas,
                    |c| c.roas,
                ),
            ],
        ),
        Section::new(
            "Creative Performance",
            vec![View::table("Creative Performance", &creatives)],
        ),
        Section::new(
            "Spend & Revenue Distribution",
            vec![
                View::PieChart {
                    title: "Spend Distribution".to_string(),
                    slices: dist.spend,
                },
                View::PieChart {
                    title: "Revenue Distribution".to_string(),
                    slices: dist.revenue,
                },
            ],
        ),
    ];

    Dashboard {
        file_name: String::new(),
        rows: records.len(),
        warnings,
        kpis,
        insight,
        sections,
    }
}

fn kpi_cards(kpis: &KpiSummary) -> Vec<View> {
    vec![
        View::card(
            "Total Revenue",
            kpis.total_revenue,
            format_currency(kpis.total_revenue, 0),
        ),
        View::card(
            "Total Ad Spend",
            kpis.total_spend,
            format_currency(kpis.total_spend, 0),
        ),
        View::card("ROAS", kpis.roas, format_ratio(kpis.roas)),
        View::card("CAC", kpis.avg_cac, format_currency(kpis.avg_cac, 2)),
        View::card(
            "Orders / Leads",
            kpis.total_orders as f64,
            format_int(kpis.total_orders),
        ),
        View::card(
            "Net Profit",
            kpis.net_profit,
            format_currency(kpis.net_profit, 0),
        ),
    ]
}

fn time_chart(days: &[TimeSeriesRow]) -> View {
    View::LineChart {
        title: "Revenue vs Spend Over Time".to_string(),
        x_axis: "Date".to_string(),
        x_values: days
            .iter()
            .map(|d| d.date.format("%Y-%m-%d").to_string())
            .collect(),
        series: vec![
            Series {
                name: "Revenue".to_string(),
                values: days.iter().map(|d| d.revenue).collect(),
            },
            Series {
                name: "Spend".to_string(),
                values: days.iter().map(|d| d.spend).collect(),
            },
        ],
    }
}

fn channel_chart(channels: &[ChannelRow]) -> View {
    View::BarChart {
        title: "Revenue by Channel".to_string(),
        category_axis: "Channel".to_string(),
        value_axis: "Revenue".to_string(),
        orientation: Orientation::Vertical,
        points: channels
            .iter()
            .map(|c| Point {
                label: c.channel.clone(),
                value: c.revenue,
            })
            .collect(),
    }
}

fn campaign_chart<F>(title: &str, value_axis: &str, rows: &[CampaignRow], value: F) -> View
where
    F: Fn(&CampaignRow) -> f64,
{
    View::BarChart {
        title: title.to_string(),
        category_axis: "Campaign".to_string(),
        value_axis: value_axis.to_string(),
        orientation: Orientation::Horizontal,
        points: rows
            .iter()
            .map(|c| Point {
                label: c.campaign.clone(),
                value: value(c),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReportError;

    const TWO_ROWS: &str = "Date,Channel,Campaign,Creative,Spend,Revenue,Orders\n\
        2024-01-01,Facebook,A,C1,100,300,10\n\
        2024-01-01,Google,B,C2,50,50,5\n";

    fn build(csv: &str) -> Dashboard {
        process_upload("upload.csv", csv.as_bytes(), &DashboardConfig::default()).unwrap()
    }

    fn section<'a>(d: &'a Dashboard, title: &str) -> &'a Section {
        d.sections
            .iter()
            .find(|s| s.title == title)
            .unwrap_or_else(|| panic!("no section {title}"))
    }

    #[test]
    fn sections_follow_page_order() {
        let d = build(TWO_ROWS);
        let titles: Vec<&str> = d.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Uploaded Data",
                "Key Metrics",
                "Revenue & Spend Over Time",
                "Channel Performance",
                "Campaign Performance",
                "Creative Performance",
                "Spend & Revenue Distribution",
            ]
        );
        assert_eq!(d.file_name, "upload.csv");
        assert_eq!(d.rows, 2);
        assert!(d.warnings.is_empty());
    }

    #[test]
    fn kpi_cards_carry_display_text() {
        let d = build(TWO_ROWS);
        let displays: Vec<(String, String)> = section(&d, "Key Metrics")
            .views
            .iter()
            .map(|v| match v {
                View::MetricCard { label, display, .. } => (label.clone(), display.clone()),
                other => panic!("unexpected view {}", other.kind()),
            })
            .collect();
        assert_eq!(
            displays,
            vec![
                ("Total Revenue".to_string(), "$350".to_string()),
                ("Total Ad Spend".to_string(), "$150".to_string()),
                ("ROAS".to_string(), "2.33x".to_string()),
                ("CAC".to_string(), "$10.00".to_string()),
                ("Orders / Leads".to_string(), "15".to_string()),
                ("Net Profit".to_string(), "$200".to_string()),
            ]
        );
        assert_eq!(
            d.insight.as_ref().map(Insight::message).as_deref(),
            Some("Top performing channel: Facebook with ROAS 3.00x")
        );
    }

    #[test]
    fn creative_table_has_status_column() {
        let d = build(TWO_ROWS);
        match &section(&d, "Creative Performance").views[0] {
            View::Table { columns, rows, .. } => {
                assert_eq!(columns, &["Creative", "Revenue", "Spend", "ROAS", "Status"]);
                assert_eq!(rows[0], vec!["C1", "300.00", "100.00", "3.00x", "Good"]);
                assert_eq!(rows[1][4], "Needs Review");
            }
            other => panic!("unexpected view {}", other.kind()),
        }
    }

    #[test]
    fn campaign_charts_are_horizontal_bars() {
        let d = build(TWO_ROWS);
        let views = &section(&d, "Campaign Performance").views;
        assert_eq!(views.len(), 2);
        match &views[0] {
            View::BarChart {
                title,
                orientation,
                points,
                ..
            } => {
                assert_eq!(title, "Top 5 Campaigns by Revenue");
                assert_eq!(*orientation, Orientation::Horizontal);
                assert_eq!(points[0].label, "A");
                assert_eq!(points[0].value, 300.0);
            }
            other => panic!("unexpected view {}", other.kind()),
        }
    }

    #[test]
    fn view_tags_serialize_kebab_case() {
        let d = build(TWO_ROWS);
        let json = serde_json::to_value(&d).unwrap();
        let kinds: Vec<&str> = json["sections"]
            .as_array()
            .unwrap()
            .iter()
            .flat_map(|s| s["views"].as_array().unwrap())
            .map(|v| v["type"].as_str().unwrap())
            .collect();
        assert!(kinds.contains(&"metric-card"));
        assert!(kinds.contains(&"line-chart"));
        assert!(kinds.contains(&"bar-chart"));
        assert!(kinds.contains(&"pie-chart"));
        assert!(kinds.contains(&"table"));
        assert_eq!(json["sections"][1]["views"][0]["label"], "Total Revenue");
    }

    #[test]
    fn zero_spend_row_does_not_abort() {
        let d = build(
            "Date,Channel,Campaign,Creative,Spend,Revenue,Orders\n\
             2024-01-01,Email,N,C1,0,50,2\n",
        );
        assert!(d.kpis.roas.is_infinite());
        assert_eq!(d.insight.unwrap().top_channel, "Email");
        // non-finite numbers have no JSON form and become null
        let json = serde_json::to_value(&d.kpis).unwrap();
        assert!(json["roas"].is_null());
    }

    #[test]
    fn missing_columns_surface_as_warning_before_failing() {
        let report = LoadReport {
            total_rows: 0,
            missing_columns: vec!["Creative".to_string()],
            ..LoadReport::default()
        };
        let d = build_dashboard(&[], &report, &DashboardConfig::default());
        assert_eq!(
            d.warnings,
            vec!["Columns missing in the uploaded file: [\"Creative\"]"]
        );

        let err = process_upload(
            "upload.csv",
            b"Date,Channel,Campaign,Spend,Revenue,Orders\n2024-01-01,F,A,1,1,1\n",
            &DashboardConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ReportError::MissingColumn { .. }));
    }
}
