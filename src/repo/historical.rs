//! Read-side query over the loaded plant history.

use crate::domain::{HistoricalPoint, Observation, PowerType};

/// Selector value meaning every inverter
pub const ALL_INVERTERS: &str = "all";

pub const DEFAULT_LIMIT: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoricalQuery {
    pub power_type: PowerType,
    /// `None` or `"all"` selects every inverter
    pub inverter: Option<String>,
    pub limit: usize,
}

impl Default for HistoricalQuery {
    fn default() -> Self {
        Self {
            power_type: PowerType::default(),
            inverter: None,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl HistoricalQuery {
    fn selects(&self, obs: &Observation) -> bool {
        match self.inverter.as_deref() {
            None | Some(ALL_INVERTERS) => true,
            Some(id) => obs.belongs_to(id),
        }
    }

    /// Most recent `limit` matching rows, oldest first
    pub fn run(&self, observations: &[Observation]) -> Vec<HistoricalPoint> {
        let matching: Vec<&Observation> = observations.iter().filter(|o| self.selects(o)).collect();
        let skip = matching.len().saturating_sub(self.limit);

        matching[skip..]
            .iter()
            .map(|o| HistoricalPoint {
                date_time: o.timestamp,
                actual: o.power(self.power_type),
                plant_id: o.plant_id.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::constant_history;
    use rstest::rstest;

    fn mixed_history() -> Vec<Observation> {
        constant_history(10, 100.0)
            .into_iter()
            .enumerate()
            .map(|(i, mut o)| {
                o.source_key = if i % 2 == 0 { "inv-even" } else { "inv-odd" }.to_string();
                o.ac_power = i as f64;
                o.dc_power = 10.0 * i as f64;
                o
            })
            .collect()
    }

    #[rstest]
    #[case(None, 10)]
    #[case(Some("all"), 10)]
    #[case(Some("4135001"), 10)]
    #[case(Some("inv-odd"), 5)]
    #[case(Some("4136001"), 0)]
    fn test_inverter_filter(#[case] inverter: Option<&str>, #[case] expected: usize) {
        let query = HistoricalQuery {
            inverter: inverter.map(str::to_string),
            ..HistoricalQuery::default()
        };
        assert_eq!(query.run(&mixed_history()).len(), expected);
    }

    #[test]
    fn test_limit_keeps_tail() {
        let query = HistoricalQuery {
            power_type: PowerType::AcPower,
            limit: 3,
            ..HistoricalQuery::default()
        };
        let points = query.run(&mixed_history());
        assert_eq!(
            points.iter().map(|p| p.actual).collect::<Vec<_>>(),
            vec![7.0, 8.0, 9.0]
        );
        assert!(points.windows(2).all(|w| w[0].date_time < w[1].date_time));
    }

    #[test]
    fn test_power_type_selects_column() {
        let query = HistoricalQuery {
            inverter: Some("inv-odd".to_string()),
            limit: 1,
            ..HistoricalQuery::default()
        };
        let points = query.run(&mixed_history());
        assert_eq!(points[0].actual, 90.0);
        assert_eq!(points[0].plant_id, "4135001");
    }
}
