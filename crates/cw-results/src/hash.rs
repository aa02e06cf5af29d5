//! Content-based hashing for run IDs.

use sha2::{Digest, Sha256};
use cw_project::PlantConfig;

/// Run id derived from the plant configuration, the raw input payloads and the engine version.
pub fn compute_run_id(config: &PlantConfig, inputs: &[&[u8]], engine_version: &str) -> String {
    let mut hasher = Sha256::new();

    let config_json = serde_json::to_string(config).unwrap_or_default();
    hasher.update(config_json.as_bytes());

    for input in inputs {
        hasher.update((input.len() as u64).to_le_bytes());
        hasher.update(input);
    }

    hasher.update(engine_version.as_bytes());

    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cw_project::schema::{AnalysisParams, PlantConfig, TrainingParams};

    fn config(name: &str) -> PlantConfig {
        PlantConfig {
            version: 1,
            name: name.to_string(),
            blower_tag: None,
            units: vec![],
            analysis: AnalysisParams::default(),
            training: TrainingParams::default(),
        }
    }

    #[test]
    fn hash_stability() {
        let cfg = config("Plant");
        let a = compute_run_id(&cfg, &[b"data"], "v1");
        let b = compute_run_id(&cfg, &[b"data"], "v1");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn hash_differs_for_different_inputs() {
        let cfg = config("Plant");
        assert_ne!(
            compute_run_id(&cfg, &[b"data"], "v1"),
            compute_run_id(&cfg, &[b"other"], "v1")
        );
        assert_ne!(
            compute_run_id(&cfg, &[b"data"], "v1"),
            compute_run_id(&config("Other"), &[b"data"], "v1")
        );
        // Payload boundaries matter.
        assert_ne!(
            compute_run_id(&cfg, &[b"ab", b"c"], "v1"),
            compute_run_id(&cfg, &[b"a", b"bc"], "v1")
        );
    }
}
