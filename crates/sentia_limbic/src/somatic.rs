//! Somatic markers: how the affect levels bias expression.
//!
//! Reasoning never reads raw chemical levels directly. It reads the blended
//! behavioural dimensions below, plus a mood phrase, and the reply generator
//! gets a temperature derived from creativity.

use sentia_core::{AffectState, Chemical};
use serde::{Deserialize, Serialize};

/// Behavioural dimensions, each a fixed linear blend of chemical levels.
/// All values are in [0, 1] because the weights of every blend sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BehaviorModulation {
    pub creativity: f32,
    pub positivity: f32,
    pub empathy: f32,
    pub urgency: f32,
    pub caution: f32,
    pub sociability: f32,
}

impl BehaviorModulation {
    pub fn from_affect(affect: &AffectState) -> Self {
        let da = affect.get(Chemical::Dopamine);
        let se = affect.get(Chemical::Serotonin);
        let ne = affect.get(Chemical::Norepinephrine);
        let ox = affect.get(Chemical::Oxytocin);
        let co = affect.get(Chemical::Cortisol);

        Self {
            creativity: da * 0.7 + (1.0 - co) * 0.3,
            positivity: se * 0.6 + da * 0.4,
            empathy: ox * 0.7 + se * 0.3,
            urgency: ne * 0.6 + co * 0.4,
            caution: co * 0.7 + (1.0 - da) * 0.3,
            sociability: ox * 0.5 + se * 0.3 + da * 0.2,
        }
    }

    /// Generation temperature for the reply: creative states sample hotter.
    /// Range: 0.3 to 1.2, 0.7 at creativity 0.5.
    pub fn reply_temperature(&self) -> f32 {
        (0.7 + (self.creativity - 0.5) * 0.4).clamp(0.3, 1.2)
    }

    /// Register the reply should be written in.
    pub fn tone(&self) -> &'static str {
        if self.empathy > 0.7 {
            "empathetic and understanding"
        } else if self.urgency > 0.7 {
            "direct and focused"
        } else if self.creativity > 0.7 {
            "creative and expressive"
        } else {
            "balanced and thoughtful"
        }
    }

    /// Compact form for prompt injection.
    pub fn format_for_prompt(&self) -> String {
        format!(
            "creativity={:.2} positivity={:.2} empathy={:.2} urgency={:.2} caution={:.2} sociability={:.2}",
            self.creativity, self.positivity, self.empathy, self.urgency, self.caution, self.sociability,
        )
    }
}

/// Short mood phrase for the current balance. First matching rule wins.
pub fn describe_mood(affect: &AffectState) -> &'static str {
    let da = affect.get(Chemical::Dopamine);
    let se = affect.get(Chemical::Serotonin);
    let ne = affect.get(Chemical::Norepinephrine);
    let ox = affect.get(Chemical::Oxytocin);
    let co = affect.get(Chemical::Cortisol);

    if da > 0.6 && se > 0.6 {
        "content and motivated"
    } else if ox > 0.6 {
        "warm and connected"
    } else if co > 0.6 && ne > 0.6 {
        "stressed and alert"
    } else if se < 0.3 {
        "subdued and reflective"
    } else if ne > 0.6 {
        "alert and focused"
    } else {
        "balanced and neutral"
    }
}

/// Multi-line status view with one bar per chemical.
pub fn status_report(affect: &AffectState) -> String {
    let mut report = String::new();
    for (chemical, level) in affect.iter() {
        let filled = (level * 10.0).floor() as usize;
        report.push_str(&format!(
            "  {:<15} {}{} {:.2} ({})\n",
            chemical.name(),
            "█".repeat(filled),
            "░".repeat(10 - filled.min(10)),
            level,
            chemical.role(),
        ));
    }
    report.push_str(&format!("  mood: {}\n", describe_mood(affect)));
    report
}
