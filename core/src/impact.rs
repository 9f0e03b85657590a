use serde::{Deserialize, Serialize};

/// Revenue projection from retaining a share of High Risk customers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactEstimate {
    pub high_risk_count:       usize,
    pub retention_improvement: f64,
    pub saved_customers:       usize,
    pub avg_monthly_revenue:   f64,
    pub monthly_revenue_saved: f64,
    pub annual_revenue_saved:  f64,
}

/// saved = floor(high_risk_count × retention_improvement);
/// monthly = saved × avg_monthly_revenue; annual = monthly × 12.
pub fn estimate_impact(
    high_risk_count: usize,
    avg_monthly_revenue: f64,
    retention_improvement: f64,
) -> ImpactEstimate {
    let saved_customers = (high_risk_count as f64 * retention_improvement).floor() as usize;
    let monthly_revenue_saved = saved_customers as f64 * avg_monthly_revenue;
    ImpactEstimate {
        high_risk_count,
        retention_improvement,
        saved_customers,
        avg_monthly_revenue,
        monthly_revenue_saved,
        annual_revenue_saved: monthly_revenue_saved * 12.0,
    }
}
