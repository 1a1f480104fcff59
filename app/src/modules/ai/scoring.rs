//! Heuristics behind the AI dashboards.

use super::dto::DemandAnalysis;
use chrono::{DateTime, FixedOffset, Utc};
use entity::{
    ai_prediction::{Defect, DefectType, DefectSeverity},
    sea_orm_active_enums::{CarCondition, CarStatus},
};
use std::collections::HashMap;

/// the fields of a car the demand analysis needs
pub struct CarDemandRow {
    pub brand: String,
    pub model: String,
    pub status: CarStatus,
    pub created_at: DateTime<FixedOffset>,
}

#[derive(Default)]
struct DemandCounter {
    model: String,
    total: u32,
    sold: u32,
    available: u32,
    days_on_market: i64,
}

impl DemandCounter {
    fn score(&self) -> f64 {
        let mut score = f64::from(self.sold) / f64::from(self.total) * 100.0;

        if self.available > 0 {
            score -= self.days_on_market as f64 / (f64::from(self.available) * 30.0) * 20.0;
        }

        score
    }
}

/// computes the demand of each `<brand> <model>`, in order of first appearance
///
/// the score is the percentage of sold cars, penalized by the average amount of days
/// the available cars have been on the market
pub fn demand_analysis(cars: &[CarDemandRow], now: DateTime<Utc>) -> Vec<DemandAnalysis> {
    let mut counters: Vec<DemandCounter> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for car in cars {
        let key = format!("{} {}", car.brand, car.model);

        let i = *index.entry(key.clone()).or_insert_with(|| {
            counters.push(DemandCounter {
                model: key,
                ..Default::default()
            });
            counters.len() - 1
        });

        let counter = &mut counters[i];
        counter.total += 1;

        match car.status {
            CarStatus::Sold => counter.sold += 1,
            CarStatus::Available => {
                counter.available += 1;
                counter.days_on_market += (now - car.created_at.with_timezone(&Utc)).num_days();
            }
            _ => {}
        }
    }

    counters
        .into_iter()
        .map(|c| {
            let score = c.score();

            DemandAnalysis {
                value: score,
                confidence: score,
                sales: c.sold,
                available: c.available,
                days_on_market: c.days_on_market,
                model: c.model,
            }
        })
        .collect()
}

pub fn condition_multiplier(condition: CarCondition) -> f64 {
    match condition {
        CarCondition::New => 1.0,
        CarCondition::Used => 0.8,
    }
}

/// sum of the severity factor of each defect weighted by its confidence
pub fn damage_score(defects: &[Defect]) -> f64 {
    defects
        .iter()
        .map(|d| d.severity.factor() * f64::from(d.confidence) / 100.0)
        .sum()
}

/// defects reported for every analyzed image until a real vision model is wired in
pub fn placeholder_defects() -> Vec<Defect> {
    vec![
        Defect {
            defect_type: DefectType::Paint,
            severity: DefectSeverity::Minor,
            description: String::from("Small scratch on rear bumper"),
            confidence: 85,
        },
        Defect {
            defect_type: DefectType::Tire,
            severity: DefectSeverity::None,
            description: String::from("Good condition"),
            confidence: 92,
        },
        Defect {
            defect_type: DefectType::Interior,
            severity: DefectSeverity::Minor,
            description: String::from("Slight wear on driver seat"),
            confidence: 88,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn row(brand: &str, model: &str, status: CarStatus, days_ago: i64) -> CarDemandRow {
        CarDemandRow {
            brand: String::from(brand),
            model: String::from(model),
            status,
            created_at: (Utc::now() - Duration::days(days_ago)).into(),
        }
    }

    #[test]
    fn fully_sold_model_has_max_demand() {
        let cars = vec![
            row("Toyota", "Corolla", CarStatus::Sold, 10),
            row("Toyota", "Corolla", CarStatus::Sold, 20),
        ];

        let analysis = demand_analysis(&cars, Utc::now());

        assert_eq!(analysis.len(), 1);
        assert_eq!(analysis[0].model, "Toyota Corolla");
        assert_eq!(analysis[0].value, 100.0);
        assert_eq!(analysis[0].sales, 2);
        assert_eq!(analysis[0].available, 0);
    }

    #[test]
    fn time_on_market_lowers_demand() {
        let cars = vec![
            row("Ford", "Focus", CarStatus::Sold, 0),
            row("Ford", "Focus", CarStatus::Available, 30),
            row("Ford", "Focus", CarStatus::Reserved, 5),
            row("Tesla", "Model 3", CarStatus::Available, 0),
        ];

        let analysis = demand_analysis(&cars, Utc::now());

        assert_eq!(analysis.len(), 2);

        // 1/3 sold, one available car for 30 days: 33.33 - (30 / 30) * 20
        let focus = &analysis[0];
        assert_eq!(focus.days_on_market, 30);
        assert!((focus.value - (100.0 / 3.0 - 20.0)).abs() < 1e-9);
        assert_eq!(focus.confidence, focus.value);

        let model_3 = &analysis[1];
        assert_eq!(model_3.model, "Tesla Model 3");
        assert_eq!(model_3.value, 0.0);
    }

    #[test]
    fn damage_score_weights_severity_by_confidence() {
        // 0.1 * 0.85 + 0 * 0.92 + 0.1 * 0.88
        let score = damage_score(&placeholder_defects());
        assert!((score - 0.173).abs() < 1e-9);

        assert_eq!(damage_score(&[]), 0.0);
    }

    #[test]
    fn used_cars_are_worth_less() {
        assert_eq!(condition_multiplier(CarCondition::New), 1.0);
        assert_eq!(condition_multiplier(CarCondition::Used), 0.8);
    }
}
