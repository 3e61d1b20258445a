//! Dashboard module
//!
//! Provides the summary figures shown on the dashboard: revenue, expense and
//! profit totals, a monthly breakdown and the partners with the largest totals.

mod aggregation;
mod handlers;

pub use aggregation::{
    DashboardSummary, MonthlySummary, PartnerTotal, aggregate, monthly_breakdown, net_profit,
    profit_margin, top_partners, total_expense, total_revenue,
};
pub use handlers::get_dashboard_endpoint;
