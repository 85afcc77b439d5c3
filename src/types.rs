use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::util::{format_currency, format_number, format_ratio};

pub const COL_DATE: &str = "Date";
pub const COL_CHANNEL: &str = "Channel";
pub const COL_CAMPAIGN: &str = "Campaign";
pub const COL_CREATIVE: &str = "Creative";
pub const COL_SPEND: &str = "Spend";
pub const COL_REVENUE: &str = "Revenue";
pub const COL_ORDERS: &str = "Orders";

pub const EXPECTED_COLUMNS: [&str; 7] = [
    COL_DATE,
    COL_CHANNEL,
    COL_CAMPAIGN,
    COL_CREATIVE,
    COL_SPEND,
    COL_REVENUE,
    COL_ORDERS,
];

/// One uploaded row addressed by header name. Every field is optional so a
/// file with missing columns still deserializes; decoding decides what is fatal.
#[derive(Debug, Default, Deserialize)]
pub struct RawRow {
    #[serde(rename = "Date")]
    pub date: Option<String>,
    #[serde(rename = "Channel")]
    pub channel: Option<String>,
    #[serde(rename = "Campaign")]
    pub campaign: Option<String>,
    #[serde(rename = "Creative")]
    pub creative: Option<String>,
    #[serde(rename = "Spend")]
    pub spend: Option<String>,
    #[serde(rename = "Revenue")]
    pub revenue: Option<String>,
    #[serde(rename = "Orders")]
    pub orders: Option<String>,
}

/// A normalized performance row with its derived ratios.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub date: NaiveDate,
    pub channel: String,
    pub campaign: String,
    pub creative: String,
    pub spend: f64,
    pub revenue: f64,
    pub orders: u64,
    /// `revenue / spend`, unguarded: zero spend yields `inf` or `NaN`.
    pub roas: f64,
    /// `spend / max(orders, 1)`.
    pub cac: f64,
}

impl Record {
    pub fn new(
        date: NaiveDate,
        channel: String,
        campaign: String,
        creative: String,
        spend: f64,
        revenue: f64,
        orders: u64,
    ) -> Self {
        Self {
            date,
            channel,
            campaign,
            creative,
            spend,
            revenue,
            orders,
            roas: roas(revenue, spend),
            cac: cac(spend, orders),
        }
    }
}

pub fn roas(revenue: f64, spend: f64) -> f64 {
    revenue / spend
}

/// Zero orders are counted as one, which understates CAC for those rows.
pub fn cac(spend: f64, orders: u64) -> f64 {
    spend / orders.max(1) as f64
}

#[derive(Debug, Clone, Serialize, Tabled)]
pub struct PreviewRow {
    #[serde(rename = "Date")]
    #[tabled(rename = "Date")]
    pub date: String,
    #[serde(rename = "Channel")]
    #[tabled(rename = "Channel")]
    pub channel: String,
    #[serde(rename = "Campaign")]
    #[tabled(rename = "Campaign")]
    pub campaign: String,
    #[serde(rename = "Creative")]
    #[tabled(rename = "Creative")]
    pub creative: String,
    #[serde(rename = "Spend")]
    #[tabled(rename = "Spend")]
    pub spend: String,
    #[serde(rename = "Revenue")]
    #[tabled(rename = "Revenue")]
    pub revenue: String,
    #[serde(rename = "Orders")]
    #[tabled(rename = "Orders")]
    pub orders: u64,
}

impl From<&Record> for PreviewRow {
    fn from(r: &Record) -> Self {
        Self {
            date: r.date.format("%Y-%m-%d").to_string(),
            channel: r.channel.clone(),
            campaign: r.campaign.clone(),
            creative: r.creative.clone(),
            spend: format_number(r.spend, 2),
            revenue: format_number(r.revenue, 2),
            orders: r.orders,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesRow {
    pub date: NaiveDate,
    pub revenue: f64,
    pub spend: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct ChannelRow {
    #[serde(rename = "Channel")]
    #[tabled(rename = "Channel")]
    pub channel: String,
    #[serde(rename = "Revenue")]
    #[tabled(rename = "Revenue", display_with = "cell_amount")]
    pub revenue: f64,
    #[serde(rename = "Spend")]
    #[tabled(rename = "Spend", display_with = "cell_amount")]
    pub spend: f64,
    #[serde(rename = "Orders")]
    #[tabled(rename = "Orders")]
    pub orders: u64,
    #[serde(rename = "ROAS")]
    #[tabled(rename = "ROAS", display_with = "cell_ratio")]
    pub roas: f64,
    #[serde(rename = "CAC")]
    #[tabled(rename = "CAC", display_with = "cell_currency")]
    pub cac: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct CampaignRow {
    #[serde(rename = "Campaign")]
    #[tabled(rename = "Campaign")]
    pub campaign: String,
    #[serde(rename = "Revenue")]
    #[tabled(rename = "Revenue", display_with = "cell_amount")]
    pub revenue: f64,
    #[serde(rename = "Spend")]
    #[tabled(rename = "Spend", display_with = "cell_amount")]
    pub spend: f64,
    #[serde(rename = "ROAS")]
    #[tabled(rename = "ROAS", display_with = "cell_ratio")]
    pub roas: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CreativeStatus {
    Good,
    #[serde(rename = "Needs Review")]
    NeedsReview,
}

impl CreativeStatus {
    /// `Good` only when ROAS is strictly above the threshold; NaN never is.
    pub fn classify(roas: f64, threshold: f64) -> Self {
        if roas > threshold {
            CreativeStatus::Good
        } else {
            CreativeStatus::NeedsReview
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CreativeStatus::Good => "Good",
            CreativeStatus::NeedsReview => "Needs Review",
        }
    }
}

impl std::fmt::Display for CreativeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct CreativeRow {
    #[serde(rename = "Creative")]
    #[tabled(rename = "Creative")]
    pub creative: String,
    #[serde(rename = "Revenue")]
    #[tabled(rename = "Revenue", display_with = "cell_amount")]
    pub revenue: f64,
    #[serde(rename = "Spend")]
    #[tabled(rename = "Spend", display_with = "cell_amount")]
    pub spend: f64,
    #[serde(rename = "ROAS")]
    #[tabled(rename = "ROAS", display_with = "cell_ratio")]
    pub roas: f64,
    #[serde(rename = "Status")]
    #[tabled(rename = "Status")]
    pub status: CreativeStatus,
}

/// Top and bottom campaign rankings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampaignRanking {
    pub top_by_revenue: Vec<CampaignRow>,
    pub bottom_by_roas: Vec<CampaignRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareSlice {
    pub label: String,
    pub value: f64,
    pub share: f64,
}

/// Spend and revenue split across channels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Distribution {
    pub spend: Vec<ShareSlice>,
    pub revenue: Vec<ShareSlice>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiSummary {
    pub total_revenue: f64,
    pub total_spend: f64,
    /// Total revenue over total spend, rounded to 2 decimals.
    pub roas: f64,
    /// Mean of per-row CAC, rounded to 2 decimals. This is a mean of ratios
    /// and differs from the sum-based CAC of the channel view.
    pub avg_cac: f64,
    pub total_orders: u64,
    pub net_profit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insight {
    pub top_channel: String,
    pub roas: f64,
}

impl Insight {
    pub fn message(&self) -> String {
        format!(
            "Top performing channel: {} with ROAS {:.2}x",
            self.top_channel, self.roas
        )
    }
}

fn cell_amount(v: &f64) -> String {
    format_number(*v, 2)
}

fn cell_ratio(v: &f64) -> String {
    format_ratio(*v)
}

fn cell_currency(v: &f64) -> String {
    format_currency(*v, 2)
}
