//! Diagnostic scenario listing

use crate::model::ScenarioModel;
use rsm_strategy::ScenarioStrategy;
use std::fmt;

impl ScenarioModel {
    /// Human-readable dump of the scenario table
    ///
    /// One line per scenario: number, CT phase, shift x/y/z, absolute and
    /// relative range error, probability. Does not touch model state.
    #[must_use]
    pub fn list_scenarios(&self) -> String {
        self.to_string()
    }

    /// Emit the listing as `debug` events, one per scenario
    pub fn log_scenarios(&self) {
        for (i, e) in self.table().iter().enumerate() {
            let [x, y, z] = e.iso_shift;
            tracing::debug!(
                scenario = i + 1,
                ct_phase = e.ct_phase,
                x,
                y,
                z,
                abs_range = e.abs_range_shift,
                rel_range = e.rel_range_shift,
                probability = e.probability,
                "scenario"
            );
        }
    }
}

impl fmt::Display for ScenarioModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} scenario model: {} scenarios on {} of {} CT phases",
            self.policy().name(),
            self.total_scenarios(),
            self.num_ct_scenarios(),
            self.num_available_ct_scenarios()
        )?;
        write!(f, "{}", self.table())
    }
}

#[cfg(test)]
mod tests {
    use crate::ScenarioModel;
    use rsm_strategy::{NominalScenario, WorstCaseScenarios};

    #[test]
    fn listing_has_header_and_one_line_per_scenario() {
        let model = ScenarioModel::new(WorstCaseScenarios::new(), 2).unwrap();
        let listing = model.list_scenarios();
        let lines: Vec<&str> = listing.lines().collect();

        assert!(lines[0].starts_with("worst_case scenario model: 18 scenarios"));
        assert!(lines[1].contains("range rel"));
        assert_eq!(lines.len(), 3 + 18);
    }

    #[test]
    fn listing_rows() {
        let model = ScenarioModel::new(NominalScenario::new(), 2).unwrap();
        let listing = model.list_scenarios();
        let rows: Vec<Vec<&str>> = listing
            .lines()
            .skip(3)
            .map(|l| l.split_whitespace().collect())
            .collect();

        assert_eq!(rows[0], ["1", "1", "0.000", "0.000", "0.000", "0.000", "0.000", "0.500000"]);
        assert_eq!(rows[1][1], "2");
    }

    #[test]
    fn listing_does_not_mutate() {
        let model = ScenarioModel::new(WorstCaseScenarios::new(), 1).unwrap();
        let before = model.table().clone();
        let _ = model.list_scenarios();
        model.log_scenarios();
        assert_eq!(model.table(), &before);
    }
}
