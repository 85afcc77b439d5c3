//! End-to-end runs of `process_upload` over CSV uploads.

use marketing_report::reports;
use marketing_report::types::CreativeStatus;
use marketing_report::{load_upload, process_upload, DashboardConfig, ReportError, View};

const HEADER: &str = "Date,Channel,Campaign,Creative,Spend,Revenue,Orders\n";

fn upload(body: &str) -> Vec<u8> {
    format!("{HEADER}{body}").into_bytes()
}

fn quarter() -> Vec<u8> {
    upload(
        "2024-01-01,Facebook,Launch,Carousel,100,450,12\n\
         2024-01-01,Google,Brand,Search1,80,400,20\n\
         2024-01-02,Facebook,Retarget,Carousel,60,90,3\n\
         2024-01-02,Email,Newsletter,Plain,0,75,4\n\
         2024-01-03,Google,Generic,Search2,120,130,6\n\
         2024-01-03,TikTok,Spring,Video1,40,20,0\n\
         2024-01-04,TikTok,Summer,Video2,25,100,2\n\
         2024-01-04,Facebook,Launch,Story,30,20,1\n\
         2024-01-05,Google,Brand,Search1,70,210,9\n\
         2024-01-05,Bing,Always On,Text1,15,45,1\n",
    )
}

#[test]
fn two_row_upload() {
    let bytes = upload(
        "2024-01-01,Facebook,A,C1,100,300,10\n\
         2024-01-01,Google,B,C2,50,50,5\n",
    );
    let d = process_upload("report.csv", &bytes, &DashboardConfig::default()).unwrap();

    assert_eq!(d.kpis.total_revenue, 350.0);
    assert_eq!(d.kpis.total_spend, 150.0);
    assert_eq!(d.kpis.roas, 2.33);
    assert_eq!(d.kpis.total_orders, 15);
    assert_eq!(d.kpis.net_profit, 200.0);

    let insight = d.insight.as_ref().unwrap();
    assert_eq!(insight.top_channel, "Facebook");
    assert_eq!(
        insight.message(),
        "Top performing channel: Facebook with ROAS 3.00x"
    );

    let channel_table = d
        .sections
        .iter()
        .find(|s| s.title == "Channel Performance")
        .and_then(|s| s.views.first())
        .unwrap();
    match channel_table {
        View::Table { rows, .. } => {
            assert_eq!(rows.len(), 2);
            assert_eq!(rows[0][0], "Facebook");
            assert_eq!(rows[0][4], "3.00x");
            assert_eq!(rows[1][0], "Google");
            assert_eq!(rows[1][4], "1.00x");
        }
        other => panic!("unexpected view {}", other.kind()),
    }
}

#[test]
fn group_totals_match_kpis() {
    let (records, _) = load_upload("q1.csv", &quarter()).unwrap();
    let kpi = reports::kpi_summary(&records);
    assert_eq!(kpi.net_profit, kpi.total_revenue - kpi.total_spend);

    let channels = reports::channel_performance(&records);
    assert_eq!(channels.iter().map(|c| c.spend).sum::<f64>(), kpi.total_spend);
    assert_eq!(channels.iter().map(|c| c.revenue).sum::<f64>(), kpi.total_revenue);
    assert_eq!(channels.iter().map(|c| c.orders).sum::<u64>(), kpi.total_orders);

    let creatives = reports::creative_performance(&records, 2.0);
    assert_eq!(creatives.iter().map(|c| c.spend).sum::<f64>(), kpi.total_spend);
    for c in &creatives {
        assert_eq!(c.status == CreativeStatus::Good, c.roas > 2.0);
    }
}

#[test]
fn campaign_rankings_are_capped_and_ordered() {
    let (records, _) = load_upload("q1.csv", &quarter()).unwrap();
    let campaigns = reports::campaign_performance(&records);
    assert_eq!(campaigns.len(), 8);

    let ranking = reports::campaign_ranking(&campaigns, 5);
    assert_eq!(ranking.top_by_revenue.len(), 5);
    assert_eq!(ranking.bottom_by_roas.len(), 5);
    assert!(ranking
        .top_by_revenue
        .windows(2)
        .all(|w| w[0].revenue >= w[1].revenue));
    assert!(ranking
        .bottom_by_roas
        .windows(2)
        .all(|w| w[0].roas <= w[1].roas));
    assert_eq!(ranking.top_by_revenue[0].campaign, "Brand");
    assert_eq!(ranking.bottom_by_roas[0].campaign, "Spring");
}

#[test]
fn zero_spend_and_zero_orders_pass_through() {
    let bytes = upload(
        "2024-01-01,Email,N,C1,0,50,3\n\
         2024-01-01,Search,S,C2,20,0,0\n",
    );
    let (records, report) = load_upload("edge.csv", &bytes).unwrap();
    assert!(records[0].roas.is_infinite());
    assert_eq!(records[1].cac, 20.0);
    assert_eq!(report.zero_spend_rows, 1);
    assert_eq!(report.zero_order_rows, 1);

    let d = process_upload("edge.csv", &bytes, &DashboardConfig::default()).unwrap();
    assert_eq!(d.rows, 2);
}

#[test]
fn fatal_errors_produce_no_dashboard() {
    let config = DashboardConfig::default();

    let bad_date = upload("not-a-date,Email,N,C1,10,50,3\n");
    assert!(matches!(
        process_upload("bad.csv", &bad_date, &config),
        Err(ReportError::InvalidDate { row: 2, .. })
    ));

    let missing = b"Date,Channel,Campaign,Creative,Spend,Revenue\n2024-01-01,Email,N,C1,10,50\n";
    assert!(matches!(
        process_upload("missing.csv", missing, &config),
        Err(ReportError::MissingColumn { ref column, .. }) if column == "Orders"
    ));

    assert!(matches!(
        process_upload("book.xlsx", b"garbage", &config),
        Err(ReportError::Spreadsheet(_))
    ));
}

#[test]
fn smaller_ranking_size_from_config() {
    let config = DashboardConfig {
        top_n: 3,
        ..DashboardConfig::default()
    };
    let d = process_upload("q1.csv", &quarter(), &config).unwrap();
    let campaign = d
        .sections
        .iter()
        .find(|s| s.title == "Campaign Performance")
        .unwrap();
    for view in &campaign.views {
        match view {
            View::BarChart { title, points, .. } => {
                assert!(title.contains("3 Campaigns"));
                assert_eq!(points.len(), 3);
            }
            other => panic!("unexpected view {}", other.kind()),
        }
    }
}
