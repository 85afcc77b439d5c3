use crate::dashboard::{Dashboard, View};
use crate::error::Result;
use crate::util::format_number;
use tabled::{builder::Builder, settings::Style};

/// Text rendering of a dashboard: one markdown table per view.
pub fn render_console(dashboard: &Dashboard) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "File uploaded successfully: {} ({} rows)\n\n",
        dashboard.file_name, dashboard.rows
    ));
    for w in &dashboard.warnings {
        out.push_str(&format!("Warning: {}\n\n", w));
    }

    for section in &dashboard.sections {
        out.push_str(&format!("## {}\n\n", section.title));

        let cards: Vec<(&str, &str)> = section
            .views
            .iter()
            .filter_map(|v| match v {
                View::MetricCard { label, display, .. } => {
                    Some((label.as_str(), display.as_str()))
                }
                _ => None,
            })
            .collect();
        if !cards.is_empty() {
            out.push_str(&markdown(
                cards.iter().map(|(label, _)| label.to_string()).collect(),
                vec![cards.iter().map(|(_, display)| display.to_string()).collect()],
            ));
            out.push_str("\n\n");
        }

        for view in &section.views {
            if let Some(text) = render_view(view) {
                out.push_str(&text);
                out.push_str("\n\n");
            }
        }
    }

    if let Some(insight) = &dashboard.insight {
        out.push_str("## Key Insights\n\n");
        out.push_str(&insight.message());
        out.push('\n');
    }
    out
}

/// The view payloads as the JSON document a charting front end consumes.
pub fn render_json(dashboard: &Dashboard) -> Result<String> {
    Ok(serde_json::to_string_pretty(dashboard)?)
}

fn render_view(view: &View) -> Option<String> {
    let text = match view {
        // Cards are laid out side by side by the caller.
        View::MetricCard { .. } => return None,
        View::LineChart {
            title,
            x_axis,
            x_values,
            series,
        } => {
            let mut columns = vec![x_axis.clone()];
            columns.extend(series.iter().map(|s| s.name.clone()));
            let rows = x_values
                .iter()
                .enumerate()
                .map(|(i, x)| {
                    let mut row = vec![x.clone()];
                    row.extend(series.iter().map(|s| {
                        s.values
                            .get(i)
                            .map_or(String::new(), |v| format_number(*v, 2))
                    }));
                    row
                })
                .collect();
            titled(title, markdown(columns, rows))
        }
        View::BarChart {
            title,
            category_axis,
            value_axis,
            points,
            ..
        } => {
            let rows = points
                .iter()
                .map(|p| vec![p.label.clone(), format_number(p.value, 2)])
                .collect();
            titled(
                title,
                markdown(vec![category_axis.clone(), value_axis.clone()], rows),
            )
        }
        View::PieChart { title, slices } => {
            let rows = slices
                .iter()
                .map(|s| {
                    vec![
                        s.label.clone(),
                        format_number(s.value, 2),
                        format!("{}%", format_number(s.share * 100.0, 1)),
                    ]
                })
                .collect();
            titled(
                title,
                markdown(
                    vec!["Label".to_string(), "Value".to_string(), "Share".to_string()],
                    rows,
                ),
            )
        }
        View::Table {
            title,
            columns,
            rows,
        } => {
            if rows.is_empty() {
                titled(title, "(no rows)".to_string())
            } else {
                titled(title, markdown(columns.clone(), rows.clone()))
            }
        }
    };
    Some(text)
}

fn titled(title: &str, body: String) -> String {
    format!("{}\n\n{}", title, body)
}

fn markdown(columns: Vec<String>, rows: Vec<Vec<String>>) -> String {
    let mut builder = Builder::default();
    builder.push_record(columns);
    for row in rows {
        builder.push_record(row);
    }
    builder.build().with(Style::markdown()).to_string()
}
