//! Synthetic customer population.
//!
//! Columns are drawn one at a time, in CSV order, from the generator
//! stage's RNG stream. The churn label is then a Bernoulli trial on a
//! clipped linear propensity score. Identical seed + size therefore
//! reproduce an identical table.

use crate::{
    config::{GeneratorConfig, PropensityWeights},
    customer::{Contract, CustomerRecord, InternetService, PaymentMethod},
    error::{PipelineError, PipelineResult},
    rng::StageRng,
    types::round2,
};

pub struct CustomerGenerator<'a> {
    config: &'a GeneratorConfig,
}

impl<'a> CustomerGenerator<'a> {
    pub fn new(config: &'a GeneratorConfig) -> Self {
        Self { config }
    }

    /// Generate `n` customers. Rows are indexed `CUST-00000` upward.
    pub fn generate(&self, n: usize, rng: &mut StageRng) -> PipelineResult<Vec<CustomerRecord>> {
        if n == 0 {
            return Err(PipelineError::EmptyInput {
                what: "customer count".into(),
            });
        }
        let cfg = self.config;

        let tenure: Vec<u32> = (0..n)
            .map(|_| rng.int_inclusive(cfg.tenure_min, cfg.tenure_max))
            .collect();
        let monthly: Vec<f64> = (0..n)
            .map(|_| round2(rng.uniform(cfg.charge_min, cfg.charge_max)))
            .collect();
        let total: Vec<f64> = monthly
            .iter()
            .zip(&tenure)
            .map(|(m, t)| {
                let noise = rng.uniform(1.0 - cfg.total_charge_noise, 1.0 + cfg.total_charge_noise);
                round2(m * f64::from(*t) * noise)
            })
            .collect();
        let products: Vec<u32> = (0..n)
            .map(|_| rng.int_inclusive(cfg.products_min, cfg.products_max))
            .collect();
        let support: Vec<u32> = (0..n).map(|_| rng.poisson(cfg.support_calls_mean)).collect();
        let contract: Vec<Contract> = (0..n)
            .map(|_| Contract::ALL[rng.weighted_index(&cfg.contract_weights)])
            .collect();
        let payment: Vec<PaymentMethod> = (0..n)
            .map(|_| {
                PaymentMethod::ALL[rng.next_u64_below(PaymentMethod::ALL.len() as u64) as usize]
            })
            .collect();
        let internet: Vec<InternetService> = (0..n)
            .map(|_| InternetService::ALL[rng.weighted_index(&cfg.internet_weights)])
            .collect();
        let senior: Vec<u8> = (0..n)
            .map(|_| u8::from(rng.chance(cfg.senior_probability)))
            .collect();
        let partner: Vec<u8> = (0..n)
            .map(|_| u8::from(rng.chance(cfg.partner_probability)))
            .collect();

        let mut customers = Vec::with_capacity(n);
        for i in 0..n {
            let mut record = CustomerRecord {
                customer_id:      format!("CUST-{i:05}"),
                tenure:           tenure[i],
                monthly_charges:  monthly[i],
                total_charges:    total[i],
                num_products:     products[i],
                support_calls:    support[i],
                contract:         contract[i],
                payment_method:   payment[i],
                internet_service: internet[i],
                senior_citizen:   senior[i],
                partner:          partner[i],
                churn:            0,
            };
            let noise = rng.gaussian(0.0, cfg.propensity.noise_std);
            let p = churn_propensity(&cfg.propensity, &record, noise);
            record.churn = u8::from(rng.chance(p));
            customers.push(record);
        }

        log::debug!(
            "{}: generated {n} customers ({} churned)",
            rng.name,
            customers.iter().filter(|c| c.churned()).count()
        );
        Ok(customers)
    }
}

/// Clipped linear churn propensity for one record.
/// `noise` is the record's Gaussian perturbation.
pub fn churn_propensity(w: &PropensityWeights, c: &CustomerRecord, noise: f64) -> f64 {
    let indicator = |b: bool| if b { 1.0 } else { 0.0 };
    let raw = w.intercept
        + w.tenure * f64::from(c.tenure)
        + w.monthly_charges * c.monthly_charges
        + w.num_products * f64::from(c.num_products)
        + w.support_calls * f64::from(c.support_calls)
        + w.month_to_month * indicator(c.contract == Contract::MonthToMonth)
        + w.two_year * indicator(c.contract == Contract::TwoYear)
        + w.fiber_optic * indicator(c.internet_service == InternetService::FiberOptic)
        + w.senior_citizen * f64::from(c.senior_citizen)
        + noise;
    raw.clamp(w.floor, w.ceiling)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(contract: Contract, tenure: u32) -> CustomerRecord {
        CustomerRecord {
            customer_id:      "CUST-00000".into(),
            tenure,
            monthly_charges:  70.0,
            total_charges:    70.0 * f64::from(tenure),
            num_products:     1,
            support_calls:    2,
            contract,
            payment_method:   PaymentMethod::CreditCard,
            internet_service: InternetService::Dsl,
            senior_citizen:   0,
            partner:          0,
            churn:            0,
        }
    }

    #[test]
    fn propensity_matches_hand_computation() {
        let w = PropensityWeights::default();
        // 0.30 - 0.004*10 + 0.002*70 - 0.03*1 + 0.04*2 + 0.15 = 0.60
        let p = churn_propensity(&w, &record(Contract::MonthToMonth, 10), 0.0);
        assert!((p - 0.60).abs() < 1e-12, "p={p}");
    }

    #[test]
    fn propensity_is_clipped() {
        let w = PropensityWeights::default();
        let high = churn_propensity(&w, &record(Contract::MonthToMonth, 1), 5.0);
        let low = churn_propensity(&w, &record(Contract::TwoYear, 72), -5.0);
        assert_eq!(high, 0.95);
        assert_eq!(low, 0.02);
    }
}
