use crate::types::{
    cac, roas, CampaignRanking, CampaignRow, ChannelRow, CreativeRow, CreativeStatus,
    Distribution, Insight, KpiSummary, Record, ShareSlice, TimeSeriesRow,
};
use crate::util::{average, round2};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::debug;

/// Summed fields of one group. Ratios are always derived from these sums,
/// never averaged from per-row ratios.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct Totals {
    revenue: f64,
    spend: f64,
    orders: u64,
}

impl Totals {
    fn add(&mut self, r: &Record) {
        self.revenue += r.revenue;
        self.spend += r.spend;
        // Loaded records never overflow here: the loader rejects files whose
        // order total does not fit.
        self.orders = self.orders.saturating_add(r.orders);
    }

    fn roas(&self) -> f64 {
        roas(self.revenue, self.spend)
    }
}

/// Group rows by `key`. The ordered map keeps every view in ascending key
/// order, which also fixes tie order for the rankings.
fn group_by<K, F>(data: &[Record], key: F) -> BTreeMap<K, Totals>
where
    K: Ord,
    F: Fn(&Record) -> K,
{
    let mut map: BTreeMap<K, Totals> = BTreeMap::new();
    for r in data {
        map.entry(key(r)).or_default().add(r);
    }
    map
}

/// Order two metric values, NaN last in either direction.
fn cmp_metric(a: f64, b: f64, descending: bool) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        _ if descending => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
        _ => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

pub fn time_series(data: &[Record]) -> Vec<TimeSeriesRow> {
    group_by(data, |r| r.date)
        .into_iter()
        .map(|(date, t)| TimeSeriesRow {
            date,
            revenue: t.revenue,
            spend: t.spend,
        })
        .collect()
}

pub fn channel_performance(data: &[Record]) -> Vec<ChannelRow> {
    let rows: Vec<ChannelRow> = group_by(data, |r| r.channel.clone())
        .into_iter()
        .map(|(channel, t)| ChannelRow {
            channel,
            revenue: t.revenue,
            spend: t.spend,
            orders: t.orders,
            roas: t.roas(),
            cac: cac(t.spend, t.orders),
        })
        .collect();
    debug!(channels = rows.len(), "channel view");
    rows
}

pub fn campaign_performance(data: &[Record]) -> Vec<CampaignRow> {
    group_by(data, |r| r.campaign.clone())
        .into_iter()
        .map(|(campaign, t)| CampaignRow {
            campaign,
            revenue: t.revenue,
            spend: t.spend,
            roas: t.roas(),
        })
        .collect()
}

/// Top `n` campaigns by revenue (descending) and bottom `n` by ROAS
/// (ascending). Stable sorts over key order, so ties keep key order.
pub fn campaign_ranking(campaigns: &[CampaignRow], n: usize) -> CampaignRanking {
    let mut top = campaigns.to_vec();
    top.sort_by(|a, b| cmp_metric(a.revenue, b.revenue, true));
    top.truncate(n);

    let mut bottom = campaigns.to_vec();
    bottom.sort_by(|a, b| cmp_metric(a.roas, b.roas, false));
    bottom.truncate(n);

    CampaignRanking {
        top_by_revenue: top,
        bottom_by_roas: bottom,
    }
}

pub fn creative_performance(data: &[Record], good_roas_threshold: f64) -> Vec<CreativeRow> {
    group_by(data, |r| r.creative.clone())
        .into_iter()
        .map(|(creative, t)| {
            let roas = t.roas();
            CreativeRow {
                creative,
                revenue: t.revenue,
                spend: t.spend,
                roas,
                status: CreativeStatus::classify(roas, good_roas_threshold),
            }
        })
        .collect()
}

/// Spend and revenue shares per channel, reusing the channel view.
pub fn distribution(channels: &[ChannelRow]) -> Distribution {
    Distribution {
        spend: shares(channels, |c| c.spend),
        revenue: shares(channels, |c| c.revenue),
    }
}

fn shares<F>(channels: &[ChannelRow], value: F) -> Vec<ShareSlice>
where
    F: Fn(&ChannelRow) -> f64,
{
    let total: f64 = channels.iter().map(&value).sum();
    channels
        .iter()
        .map(|c| {
            let v = value(c);
            ShareSlice {
                label: c.channel.clone(),
                value: v,
                share: if total == 0.0 { 0.0 } else { v / total },
            }
        })
        .collect()
}

pub fn kpi_summary(data: &[Record]) -> KpiSummary {
    let mut totals = Totals::default();
    for r in data {
        totals.add(r);
    }
    let cacs: Vec<f64> = data.iter().map(|r| r.cac).collect();
    KpiSummary {
        total_revenue: totals.revenue,
        total_spend: totals.spend,
        roas: round2(totals.roas()),
        avg_cac: round2(average(&cacs)),
        total_orders: totals.orders,
        net_profit: totals.revenue - totals.spend,
    }
}

/// The channel with the highest revenue and that channel's own ROAS (not
/// the highest ROAS across channels). The first channel in key order wins
/// a tie.
pub fn top_channel_insight(channels: &[ChannelRow]) -> Option<Insight> {
    let mut best: Option<&ChannelRow> = None;
    for c in channels {
        match best {
            Some(b) if c.revenue <= b.revenue => {}
            _ => best = Some(c),
        }
    }
    best.map(|c| Insight {
        top_channel: c.channel.clone(),
        roas: c.roas,
    })
}
