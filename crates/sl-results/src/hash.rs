//! Content-based hashing for run IDs.

use sha2::{Digest, Sha256};
use sl_project::schema::Scenario;

/// Hex SHA-256 of the scenario as JSON followed by the engine version.
///
/// The scenario name is part of the hash, so renaming a scenario starts a
/// fresh cache entry.
pub fn compute_run_id(scenario: &Scenario, engine_version: &str) -> String {
    let mut hasher = Sha256::new();

    let scenario_json = serde_json::to_string(scenario).unwrap_or_default();
    hasher.update(scenario_json.as_bytes());
    hasher.update(engine_version.as_bytes());

    let result = hasher.finalize();
    format!("{:x}", result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sl_project::schema::ControllerDef;

    #[test]
    fn hash_stability() {
        let scenario = Scenario::reference("Test");
        let hash1 = compute_run_id(&scenario, "v1");
        let hash2 = compute_run_id(&scenario, "v1");
        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
        assert!(hash1.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn hash_differs_for_different_inputs() {
        let base = Scenario::reference("Test");

        let mut coasting = base.clone();
        coasting.controller = ControllerDef::Constant {
            throttle: 0.0,
            brake: 0.0,
        };

        let mut finer = base.clone();
        finer.run.dt_s = 0.001;

        let reference = compute_run_id(&base, "v1");
        assert_ne!(reference, compute_run_id(&coasting, "v1"));
        assert_ne!(reference, compute_run_id(&finer, "v1"));
        assert_ne!(reference, compute_run_id(&base, "v2"));
    }
}
