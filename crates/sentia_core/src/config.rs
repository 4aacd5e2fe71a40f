use crate::affect::{AffectState, Chemical, EmotionSignal, SignalMap};
use crate::error::EngineError;
use crate::tables::{EmotionTable, SalienceTable};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

// ============================================================================
// Top-level config
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SentiaConfig {
    pub session: SessionConfig,
    pub llm: LlmConfig,
}

impl SentiaConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    /// After loading, env var overrides are applied.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let mut config: SentiaConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML config")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise start from defaults.
    /// Env overrides apply either way. A file that exists but does not
    /// parse is an error.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Self::load(path);
        }
        tracing::info!("Config file {} not found, using defaults", path.display());
        let mut cfg = Self::default();
        cfg.apply_env_overrides();
        Ok(cfg)
    }

    /// Apply environment variable overrides on top of file-based config.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides looked up by `SENTIA_*` key. Unparseable numbers are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("SENTIA_PROVIDER") {
            self.llm.provider = v;
        }
        if let Some(v) = lookup("SENTIA_MODEL") {
            self.llm.model = v;
        }
        if let Some(v) = lookup("SENTIA_BASE_URL") {
            self.llm.base_url = v;
        }
        if let Some(n) = lookup("SENTIA_MAX_DEPTH").and_then(|v| v.parse().ok()) {
            self.session.max_recursion_depth = n;
        }
        if let Some(n) = lookup("SENTIA_ATTENTION_CAPACITY").and_then(|v| v.parse().ok()) {
            self.session.attention_capacity = n;
        }
        if let Some(n) = lookup("SENTIA_CONFIDENCE_THRESHOLD").and_then(|v| v.parse().ok()) {
            self.session.confidence_threshold = n;
        }
    }
}

// ============================================================================
// Session parameters
// ============================================================================

/// Everything that shapes one conversation's state evolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Maximum reflection chain length (level 0 included).
    pub max_recursion_depth: usize,
    /// Maximum working-set size.
    pub attention_capacity: usize,
    /// Reflection stops once a level is at least this confident.
    pub confidence_threshold: f32,
    /// Homeostatic set point; also the initial affect state.
    pub baseline: AffectState,
    /// Fraction of the distance to baseline recovered per turn.
    /// Chemicals missing from the map do not decay.
    pub decay_rates: SignalMap,
    pub metric_weights: MetricWeights,
    pub emotion_table: EmotionTable,
    pub salience_table: SalienceTable,
    /// Delta applied per unit of confidence shortfall below the threshold.
    pub uncertainty_response: SignalMap,
    /// Per-turn loss of raw salience for carried concepts.
    pub attention_decay: f32,
    /// Carried concepts below this raw salience fade out.
    pub attention_floor: f32,
    /// Samples considered by windowed metrics.
    pub metrics_window: usize,
    pub generation_timeout_secs: u64,
    /// Used when the classifier is unavailable.
    pub neutral_signal: EmotionSignal,
    pub reply_max_tokens: u32,
    pub reflection_max_tokens: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_recursion_depth: 3,
            attention_capacity: 3,
            confidence_threshold: 0.7,
            baseline: AffectState::default(),
            decay_rates: Chemical::ALL.into_iter().map(|c| (c, 0.05)).collect(),
            metric_weights: MetricWeights::default(),
            emotion_table: EmotionTable::default(),
            salience_table: SalienceTable::default(),
            uncertainty_response: SignalMap::new()
                .with(Chemical::Cortisol, 0.3)
                .with(Chemical::Norepinephrine, 0.2)
                .with(Chemical::Serotonin, -0.1),
            attention_decay: 0.15,
            attention_floor: 0.05,
            metrics_window: 5,
            generation_timeout_secs: 30,
            neutral_signal: EmotionSignal::default(),
            reply_max_tokens: 256,
            reflection_max_tokens: 60,
        }
    }
}

impl SessionConfig {
    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs)
    }

    pub fn decay_rate(&self, chemical: Chemical) -> f32 {
        self.decay_rates.get(chemical)
    }

    /// Reject parameter sets the engine cannot run with.
    pub fn validate(&self) -> std::result::Result<(), EngineError> {
        let invalid = |msg: String| Err(EngineError::ConfigurationInvalid(msg));

        if self.max_recursion_depth == 0 {
            return invalid("max_recursion_depth must be at least 1".into());
        }
        if self.attention_capacity == 0 {
            return invalid("attention_capacity must be at least 1".into());
        }
        if !is_unit(self.confidence_threshold) {
            return invalid(format!(
                "confidence_threshold must be within [0, 1], got {}",
                self.confidence_threshold
            ));
        }
        for (chemical, rate) in self.decay_rates.iter() {
            if !is_unit(rate) {
                return invalid(format!(
                    "decay rate for {} must be within [0, 1], got {}",
                    chemical, rate
                ));
            }
        }
        if !is_unit(self.attention_decay) {
            return invalid(format!(
                "attention_decay must be within [0, 1], got {}",
                self.attention_decay
            ));
        }
        if !is_unit(self.attention_floor) {
            return invalid(format!(
                "attention_floor must be within [0, 1], got {}",
                self.attention_floor
            ));
        }
        self.metric_weights.validate()?;
        if self.metrics_window == 0 {
            return invalid("metrics_window must be at least 1".into());
        }
        if self.generation_timeout_secs == 0 {
            return invalid("generation_timeout_secs must be at least 1".into());
        }
        if !is_unit(self.neutral_signal.confidence) {
            return invalid(format!(
                "neutral_signal.confidence must be within [0, 1], got {}",
                self.neutral_signal.confidence
            ));
        }
        if !self.baseline.is_within_bounds() {
            return invalid("baseline levels must be within [0, 1]".into());
        }
        if !self.uncertainty_response.is_finite() || !self.salience_table.is_finite() {
            return invalid("lookup tables must contain finite values".into());
        }
        if self.emotion_table.iter().any(|(_, delta)| !delta.is_finite()) {
            return invalid("emotion_table must contain finite values".into());
        }
        Ok(())
    }
}

fn is_unit(v: f32) -> bool {
    v.is_finite() && (0.0..=1.0).contains(&v)
}

/// Weights of the individual metrics in the `overall` score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricWeights {
    pub global_availability: f32,
    pub meta_depth: f32,
    pub temporal_binding: f32,
    pub reportability: f32,
    pub phi: f32,
}

impl Default for MetricWeights {
    fn default() -> Self {
        Self {
            global_availability: 0.25,
            meta_depth: 0.2,
            temporal_binding: 0.2,
            reportability: 0.2,
            phi: 0.15,
        }
    }
}

impl MetricWeights {
    fn as_array(&self) -> [f32; 5] {
        [
            self.global_availability,
            self.meta_depth,
            self.temporal_binding,
            self.reportability,
            self.phi,
        ]
    }

    fn validate(&self) -> std::result::Result<(), EngineError> {
        let weights = self.as_array();
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(EngineError::ConfigurationInvalid(
                "metric weights must be finite and non-negative".into(),
            ));
        }
        if weights.iter().sum::<f32>() <= 0.0 {
            return Err(EngineError::ConfigurationInvalid(
                "at least one metric weight must be positive".into(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// LLM provider
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// "openrouter" or "heuristic"
    pub provider: String,
    pub model: String,
    pub base_url: String,
    /// Name of the env var holding the API key.
    pub api_key_env: String,
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openrouter".to_string(),
            model: "anthropic/claude-3.5-sonnet".to_string(),
            base_url: "https://openrouter.ai/api/v1".to_string(),
            api_key_env: "OPENROUTER_API_KEY".to_string(),
            max_retries: 2,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::affect::EmotionLabel;

    #[test]
    fn test_default_config() {
        let cfg = SentiaConfig::default();
        assert_eq!(cfg.llm.provider, "openrouter");
        assert_eq!(cfg.session.max_recursion_depth, 3);
        assert_eq!(cfg.session.attention_capacity, 3);
        assert!((cfg.session.decay_rate(Chemical::Oxytocin) - 0.05).abs() < 1e-6);
        assert!(cfg.session.validate().is_ok());
    }

    #[test]
    fn test_parse_minimal_toml() {
        let toml_str = r#"
[llm]
provider = "heuristic"

[session]
max_recursion_depth = 5
"#;
        let cfg: SentiaConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.llm.provider, "heuristic");
        assert_eq!(cfg.session.max_recursion_depth, 5);
        // Defaults for unspecified fields
        assert_eq!(cfg.session.attention_capacity, 3);
        assert_eq!(cfg.llm.api_key_env, "OPENROUTER_API_KEY");
    }

    #[test]
    fn test_parse_tables_toml() {
        let toml_str = r#"
[session]
confidence_threshold = 0.9
neutral_signal = { label = "neutral", confidence = 0.4 }

[session.baseline]
dopamine = 0.6
serotonin = 0.6
norepinephrine = 0.4
oxytocin = 0.5
cortisol = 0.2

[session.decay_rates]
cortisol = 0.2

[session.metric_weights]
phi = 0.0

[session.emotion_table.joy]
dopamine = 0.5

[session.salience_table]
pivot = 0.4
"#;
        let cfg: SentiaConfig = toml::from_str(toml_str).unwrap();
        let s = &cfg.session;
        assert!((s.baseline.get(Chemical::Dopamine) - 0.6).abs() < 1e-6);
        assert!((s.decay_rate(Chemical::Cortisol) - 0.2).abs() < 1e-6);
        assert_eq!(s.decay_rate(Chemical::Dopamine), 0.0);
        assert_eq!(s.metric_weights.phi, 0.0);
        assert!((s.metric_weights.reportability - 0.2).abs() < 1e-6);
        let joy = s.emotion_table.delta_for(EmotionLabel::Joy).unwrap();
        assert!((joy.get(Chemical::Dopamine) - 0.5).abs() < 1e-6);
        assert!(s.emotion_table.delta_for(EmotionLabel::Fear).is_none());
        assert!((s.salience_table.pivot - 0.4).abs() < 1e-6);
        assert!(!s.salience_table.gains.is_empty());
        assert!((s.neutral_signal.confidence - 0.4).abs() < 1e-6);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_parameters() {
        let cases: Vec<(&str, Box<dyn Fn(&mut SessionConfig)>)> = vec![
            ("depth", Box::new(|c| c.max_recursion_depth = 0)),
            ("capacity", Box::new(|c| c.attention_capacity = 0)),
            ("threshold", Box::new(|c| c.confidence_threshold = 1.5)),
            ("nan threshold", Box::new(|c| c.confidence_threshold = f32::NAN)),
            (
                "decay",
                Box::new(|c| c.decay_rates = SignalMap::new().with(Chemical::Dopamine, -0.1)),
            ),
            ("attention decay", Box::new(|c| c.attention_decay = 2.0)),
            ("negative weight", Box::new(|c| c.metric_weights.phi = -1.0)),
            (
                "zero weights",
                Box::new(|c| {
                    c.metric_weights = MetricWeights {
                        global_availability: 0.0,
                        meta_depth: 0.0,
                        temporal_binding: 0.0,
                        reportability: 0.0,
                        phi: 0.0,
                    }
                }),
            ),
            ("window", Box::new(|c| c.metrics_window = 0)),
            ("timeout", Box::new(|c| c.generation_timeout_secs = 0)),
            (
                "neutral confidence",
                Box::new(|c| c.neutral_signal.confidence = 1.5),
            ),
        ];
        for (name, mutate) in cases {
            let mut cfg = SessionConfig::default();
            mutate(&mut cfg);
            let err = cfg.validate().unwrap_err();
            assert!(
                matches!(err, EngineError::ConfigurationInvalid(_)),
                "case {} gave {:?}",
                name,
                err
            );
        }
    }

    #[test]
    fn test_overrides_and_defaults() {
        let vars: std::collections::HashMap<&str, &str> = [
            ("SENTIA_MODEL", "openai/gpt-4o"),
            ("SENTIA_MAX_DEPTH", "6"),
            ("SENTIA_ATTENTION_CAPACITY", "not a number"),
        ]
        .into_iter()
        .collect();

        let mut cfg = SentiaConfig::default();
        cfg.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(cfg.llm.model, "openai/gpt-4o");
        assert_eq!(cfg.session.max_recursion_depth, 6);
        assert_eq!(cfg.session.attention_capacity, 3);
        assert_eq!(cfg.llm.provider, "openrouter");
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = SentiaConfig::load_or_default(dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.session.attention_capacity, 3);
        assert!(cfg.session.validate().is_ok());
    }

    #[test]
    fn test_malformed_file_is_an_error_not_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sentia.toml");
        std::fs::write(&path, "[session]\nmax_recursion_depth = -1\n").unwrap();
        let err = SentiaConfig::load_or_default(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("parse"), "{:#}", err);

        std::fs::write(&path, "[session\n").unwrap();
        assert!(SentiaConfig::load_or_default(&path).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sentia.toml");
        std::fs::write(&path, "[session]\nattention_capacity = 7\n").unwrap();
        let cfg = SentiaConfig::load(&path).unwrap();
        assert_eq!(cfg.session.attention_capacity, 7);

        std::fs::write(&path, "[session\n").unwrap();
        assert!(SentiaConfig::load(&path).is_err());
    }
}
