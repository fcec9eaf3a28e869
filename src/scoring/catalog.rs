// src/scoring/catalog.rs — Indicator descriptors for the four pillars
//
// Series codes are World Bank WDI / WGI identifiers. Event-count keywords are
// GDELT boolean expressions scoped to a country name by the resolver.

use std::collections::HashSet;

use super::{IndicatorDescriptor, IndicatorSource, Pillar};
use crate::infra::errors::ResilienceError;

/// Series used for per-capita rescaling of event counts.
pub const POPULATION_CODE: &str = "SP.POP.TOTL";

/// WGI estimates are reported on an approximately standard-normal scale.
const WGI_MIN: f64 = -2.5;
const WGI_MAX: f64 = 2.5;

const fn series(
    id: &'static str,
    label: &'static str,
    code: &'static str,
    min: f64,
    max: f64,
    weight: f64,
    invert: bool,
) -> IndicatorDescriptor {
    IndicatorDescriptor {
        id,
        label,
        source: IndicatorSource::StatisticalSeries { code },
        min,
        max,
        weight,
        invert,
        per_capita: false,
    }
}

const fn governance(
    id: &'static str,
    label: &'static str,
    code: &'static str,
    weight: f64,
) -> IndicatorDescriptor {
    IndicatorDescriptor {
        id,
        label,
        source: IndicatorSource::GovernanceIndex { code },
        min: WGI_MIN,
        max: WGI_MAX,
        weight,
        invert: false,
        per_capita: false,
    }
}

const fn events_per_million(
    id: &'static str,
    label: &'static str,
    keywords: &'static str,
    max: f64,
    weight: f64,
) -> IndicatorDescriptor {
    IndicatorDescriptor {
        id,
        label,
        source: IndicatorSource::EventCount { keywords },
        min: 0.0,
        max,
        weight,
        invert: true,
        per_capita: true,
    }
}

#[rustfmt::skip]
pub const SOCIAL: &[IndicatorDescriptor] = &[
    series("life_expectancy", "Life expectancy at birth (years)", "SP.DYN.LE00.IN", 40.0, 85.0, 0.25, false),
    series("under5_mortality", "Under-5 mortality (per 1,000 live births)", "SH.DYN.MORT", 0.0, 150.0, 0.2, true),
    series("secondary_enrollment", "Secondary school enrollment (% gross)", "SE.SEC.ENRR", 20.0, 110.0, 0.2, false),
    series("poverty_headcount", "Poverty headcount at $2.15/day (% of population)", "SI.POV.DDAY", 0.0, 80.0, 0.15, true),
    series("gini", "Gini index", "SI.POV.GINI", 20.0, 65.0, 0.1, true),
    events_per_million("civil_unrest", "Protest and riot coverage (per million)", "protest OR riot OR demonstration", 50.0, 0.1),
];

#[rustfmt::skip]
pub const ECONOMIC: &[IndicatorDescriptor] = &[
    series("gdp_per_capita", "GDP per capita, PPP (current international $)", "NY.GDP.PCAP.PP.CD", 500.0, 80_000.0, 0.3, false),
    series("gdp_growth", "GDP growth (annual %)", "NY.GDP.MKTP.KD.ZG", -10.0, 10.0, 0.2, false),
    series("inflation", "Inflation, consumer prices (annual %)", "FP.CPI.TOTL.ZG", 0.0, 30.0, 0.15, true),
    series("unemployment", "Unemployment (% of labor force)", "SL.UEM.TOTL.ZS", 0.0, 30.0, 0.15, true),
    series("government_debt", "Central government debt (% of GDP)", "GC.DOD.TOTL.GD.ZS", 0.0, 150.0, 0.1, true),
    series("reserves_months", "Total reserves in months of imports", "FI.RES.TOTL.MO", 0.0, 12.0, 0.1, false),
];

#[rustfmt::skip]
pub const INSTITUTIONAL: &[IndicatorDescriptor] = &[
    governance("government_effectiveness", "Government effectiveness", "GE.EST", 0.2),
    governance("rule_of_law", "Rule of law", "RL.EST", 0.2),
    governance("control_of_corruption", "Control of corruption", "CC.EST", 0.2),
    governance("voice_accountability", "Voice and accountability", "VA.EST", 0.15),
    governance("political_stability", "Political stability and absence of violence", "PV.EST", 0.15),
    governance("regulatory_quality", "Regulatory quality", "RQ.EST", 0.1),
];

#[rustfmt::skip]
pub const INFRASTRUCTURE: &[IndicatorDescriptor] = &[
    series("electricity_access", "Access to electricity (% of population)", "EG.ELC.ACCS.ZS", 0.0, 100.0, 0.25, false),
    series("internet_users", "Internet users (% of population)", "IT.NET.USER.ZS", 0.0, 100.0, 0.2, false),
    series("basic_water", "Basic drinking water services (% of population)", "SH.H2O.BASW.ZS", 0.0, 100.0, 0.2, false),
    series("basic_sanitation", "Basic sanitation services (% of population)", "SH.STA.BASS.ZS", 0.0, 100.0, 0.15, false),
    series("mobile_subscriptions", "Mobile subscriptions (per 100 people)", "IT.CEL.SETS.P2", 0.0, 150.0, 0.1, false),
    events_per_million("disaster_events", "Natural disaster coverage (per million)", "flood OR earthquake OR cyclone OR drought", 30.0, 0.1),
];

/// Descriptor lists for all four pillars.
#[derive(Debug, Clone, Copy)]
pub struct Catalog {
    pub social: &'static [IndicatorDescriptor],
    pub economic: &'static [IndicatorDescriptor],
    pub institutional: &'static [IndicatorDescriptor],
    pub infrastructure: &'static [IndicatorDescriptor],
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl Catalog {
    pub const fn standard() -> Self {
        Self {
            social: SOCIAL,
            economic: ECONOMIC,
            institutional: INSTITUTIONAL,
            infrastructure: INFRASTRUCTURE,
        }
    }

    pub fn descriptors(&self, pillar: Pillar) -> &'static [IndicatorDescriptor] {
        match pillar {
            Pillar::Social => self.social,
            Pillar::Economic => self.economic,
            Pillar::Institutional => self.institutional,
            Pillar::Infrastructure => self.infrastructure,
        }
    }

    /// Whether any indicator is an event count, i.e. depends on the
    /// country name for its search phrase.
    pub fn has_event_indicators(&self) -> bool {
        Pillar::ALL.into_iter().any(|pillar| {
            self.descriptors(pillar)
                .iter()
                .any(|d| matches!(d.source, IndicatorSource::EventCount { .. }))
        })
    }

    pub fn validate(&self) -> Result<(), ResilienceError> {
        for pillar in Pillar::ALL {
            validate_descriptors(self.descriptors(pillar))?;
        }
        Ok(())
    }
}

/// Check a pillar's descriptors: non-empty unique ids, `max > min`, positive
/// finite weight, and a non-empty source code or keyword expression.
pub fn validate_descriptors(descriptors: &[IndicatorDescriptor]) -> Result<(), ResilienceError> {
    let mut seen = HashSet::new();
    for d in descriptors {
        let invalid = |reason: &str| ResilienceError::InvalidDescriptor {
            id: d.id.to_string(),
            reason: reason.to_string(),
        };

        if d.id.is_empty() {
            return Err(invalid("empty id"));
        }
        if !seen.insert(d.id) {
            return Err(invalid("duplicate id within pillar"));
        }
        if !(d.max > d.min) {
            return Err(invalid("domain max must exceed min"));
        }
        if !(d.weight.is_finite() && d.weight > 0.0) {
            return Err(invalid("weight must be positive"));
        }
        let reference = match d.source {
            IndicatorSource::StatisticalSeries { code } => code,
            IndicatorSource::GovernanceIndex { code } => code,
            IndicatorSource::EventCount { keywords } => keywords,
        };
        if reference.trim().is_empty() {
            return Err(invalid("missing source code"));
        }
        if d.per_capita && !matches!(d.source, IndicatorSource::EventCount { .. }) {
            return Err(invalid("per-capita rescaling applies to event counts only"));
        }
    }
    Ok(())
}
