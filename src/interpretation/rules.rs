//! Curve-specific petrophysical heuristics
//!
//! An ordered table of `(mnemonic predicate, mean predicate, message)`.
//! Every row is checked in sequence and every match contributes, so a
//! mnemonic such as `RTDT` collects both resistivity and sonic notes.

/// One heuristic row.
pub struct DomainRule {
    /// Tested against the upper-cased mnemonic
    pub applies_to: fn(&str) -> bool,
    /// Tested against the window mean
    pub triggers: fn(f64) -> bool,
    pub message: &'static str,
}

fn gamma_ray(mnemonic: &str) -> bool {
    mnemonic.contains("GR")
}

fn resistivity(mnemonic: &str) -> bool {
    mnemonic.contains("RT") || mnemonic.contains("RES")
}

fn bulk_density(mnemonic: &str) -> bool {
    mnemonic.contains("RHOB")
}

fn sonic(mnemonic: &str) -> bool {
    mnemonic.contains("DT")
}

pub const DOMAIN_RULES: &[DomainRule] = &[
    DomainRule {
        applies_to: gamma_ray,
        triggers: |mean| mean > 75.0,
        message: "Gamma ray levels suggest shale-rich lithology.",
    },
    DomainRule {
        applies_to: gamma_ray,
        triggers: |mean| mean < 50.0,
        message: "Lower gamma ray values may indicate cleaner sand intervals.",
    },
    DomainRule {
        applies_to: resistivity,
        triggers: |mean| mean > 20.0,
        message: "Elevated resistivity may indicate hydrocarbon potential.",
    },
    DomainRule {
        applies_to: resistivity,
        triggers: |mean| mean < 5.0,
        message: "Low resistivity suggests water-bearing or conductive formation.",
    },
    DomainRule {
        applies_to: bulk_density,
        triggers: |mean| mean < 2.3,
        message: "Lower density may indicate porous formation.",
    },
    DomainRule {
        applies_to: bulk_density,
        triggers: |mean| mean > 2.65,
        message: "Higher density suggests tighter rock matrix.",
    },
    DomainRule {
        applies_to: sonic,
        triggers: |mean| mean > 100.0,
        message: "High sonic travel time may indicate softer or more porous intervals.",
    },
];

/// Messages of every matching rule, in table order.
///
/// `mnemonic` must already be upper-cased.
pub fn domain_observations(mnemonic: &str, mean: f64) -> Vec<&'static str> {
    DOMAIN_RULES
        .iter()
        .filter(|rule| (rule.applies_to)(mnemonic) && (rule.triggers)(mean))
        .map(|rule| rule.message)
        .collect()
}
