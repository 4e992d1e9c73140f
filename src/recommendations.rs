//! Prototype-assurance guidance tables
//!
//! Recommendation text is keyed by discretized assurance level 1-5 and a
//! fixed set of category names. The tables are an explicit configuration
//! value handed to the report generator, never process-wide state, so a
//! caller can substitute its own guidance wholesale. [`GuidanceTables::default`]
//! carries the built-in texts.

use crate::assurance::AssuranceLevel;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed guidance categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GuidanceCategory {
    /// "Testing Requirements"
    Testing,
    /// "IFTD Responsibilities"
    Iftd,
    /// "Preventive Maintenance Actions"
    Maintenance,
    /// "Relevant AVSC Guidelines"
    Avsc,
    /// "Extra Recommendations" - keyword-matched per node description
    Extra,
}

impl GuidanceCategory {
    /// The four scalar categories, in report order
    pub const SCALAR: [GuidanceCategory; 4] = [
        GuidanceCategory::Testing,
        GuidanceCategory::Iftd,
        GuidanceCategory::Maintenance,
        GuidanceCategory::Avsc,
    ];

    /// Canonical category name as it appears in reports and saved data
    pub fn label(&self) -> &'static str {
        match self {
            GuidanceCategory::Testing => "Testing Requirements",
            GuidanceCategory::Iftd => "IFTD Responsibilities",
            GuidanceCategory::Maintenance => "Preventive Maintenance Actions",
            GuidanceCategory::Avsc => "Relevant AVSC Guidelines",
            GuidanceCategory::Extra => "Extra Recommendations",
        }
    }
}

impl fmt::Display for GuidanceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Guidance texts for one assurance level
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LevelGuidance {
    /// Testing scope appropriate at this level
    pub testing_requirements: String,
    /// In-vehicle fallback test driver duties
    pub iftd_responsibilities: String,
    /// Inspection and upkeep actions
    pub preventive_maintenance: String,
    /// Applicable AVSC/SAE guidance
    pub avsc_guidelines: String,
    /// Keyword -> guidance, matched case-insensitively against node
    /// descriptions
    pub extra: IndexMap<String, String>,
}

impl LevelGuidance {
    /// Text for one of the scalar categories
    pub fn category_text(&self, category: GuidanceCategory) -> Option<&str> {
        let text = match category {
            GuidanceCategory::Testing => &self.testing_requirements,
            GuidanceCategory::Iftd => &self.iftd_responsibilities,
            GuidanceCategory::Maintenance => &self.preventive_maintenance,
            GuidanceCategory::Avsc => &self.avsc_guidelines,
            GuidanceCategory::Extra => return None,
        };
        (!text.is_empty()).then_some(text.as_str())
    }
}

/// Guidance tables keyed by assurance level 1-5
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuidanceTables {
    levels: IndexMap<u8, LevelGuidance>,
}

impl GuidanceTables {
    /// Empty tables; every lookup misses
    pub fn empty() -> Self {
        Self {
            levels: IndexMap::new(),
        }
    }

    /// Replace the guidance for one level
    pub fn set_level(&mut self, level: AssuranceLevel, guidance: LevelGuidance) {
        self.levels.insert(level.as_number(), guidance);
    }

    /// Guidance for one level
    pub fn level(&self, level: AssuranceLevel) -> Option<&LevelGuidance> {
        self.levels.get(&level.as_number())
    }

    /// Recommendation text for a category at a level
    pub fn recommendation(
        &self,
        category: GuidanceCategory,
        level: AssuranceLevel,
    ) -> Option<&str> {
        self.level(level).and_then(|g| g.category_text(category))
    }

    /// Extra recommendations whose keyword occurs in `description`
    /// (case-insensitive containment), in table order.
    pub fn extra_for_description(
        &self,
        description: &str,
        level: AssuranceLevel,
    ) -> Vec<(&str, &str)> {
        let haystack = description.to_lowercase();
        let Some(guidance) = self.level(level) else {
            return Vec::new();
        };
        guidance
            .extra
            .iter()
            .filter(|(keyword, _)| haystack.contains(&keyword.to_lowercase()))
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }
}

fn extra(entries: &[(&str, &str)]) -> IndexMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

impl Default for GuidanceTables {
    fn default() -> Self {
        let mut levels = IndexMap::new();

        levels.insert(1, LevelGuidance {
            testing_requirements:
                "Perform extensive scenario-based simulations covering normal driving, sensor \
                 failures, emergency braking and boundary conditions, plus rigorous lab tests and \
                 closed-course trials. No public road tests until every core function is validated \
                 in a controlled prototype environment."
                    .into(),
            iftd_responsibilities:
                "A dedicated safety driver is in the vehicle at all times along with an engineer \
                 and must be able to take immediate manual control when abnormal conditions are \
                 detected. Training focuses on short reaction times through frequent emergency \
                 takeover drills."
                    .into(),
            preventive_maintenance:
                "Conduct pre-trip and post-trip inspections on every run. Regularly calibrate, \
                 clean and realign all sensors, keep a detailed log and perform daily component \
                 checks."
                    .into(),
            avsc_guidelines:
                "Adhere to AVSC Best Practice for In-Vehicle Fallback Test Driver Selection, \
                 Training and Oversight (AVSC00001-2019) and SAE J3018, with emphasis on safe \
                 intervention in a prototype environment."
                    .into(),
            extra: extra(&[
                ("steering", "Simulate sudden, unintended steering inputs and verify that dynamic steering limiters are active and promptly overridable."),
                ("braking", "Simulate unintended or excessive braking on a closed course and verify that controlled braking and vehicle stability can be restored quickly."),
                ("takeover", "Simulate unexpected disengagements and validate that the takeover mechanism allows manual control to be assumed quickly and safely."),
                ("notification", "Verify that alerts respond accurately to simulated sensor or system errors, are displayed via visual and auditory cues and are logged."),
                ("rollaway", "Verify detection of a potential rollaway condition and activation of emergency brakes on a slight incline in a laboratory environment."),
                ("control", "Assess the basic manual override capability under simulated conditions before any on-road exposure."),
            ]),
        });

        levels.insert(2, LevelGuidance {
            testing_requirements:
                "Initiate limited public-road tests under tightly controlled conditions \
                 (low speed, daylight, good weather) within a constrained ODD, alongside advanced \
                 simulations with fault injection and closed-course validations."
                    .into(),
            iftd_responsibilities:
                "The safety driver, with a co-driver if necessary, continuously monitors the \
                 system and is ready to intervene immediately; drills focus on rapid manual \
                 intervention under varying test conditions."
                    .into(),
            preventive_maintenance:
                "Implement both time-based and event-triggered inspections. Verify sensor \
                 calibration and system integrity before each test and address anomalies \
                 immediately."
                    .into(),
            avsc_guidelines:
                "Follow AVSC Best Practice for Data Collection for ADS-DVs (AVSC00004-2020), \
                 comply with SAE J3018 and local regulatory standards."
                    .into(),
            extra: extra(&[
                ("steering", "Simulate unexpected steering deviations and verify they can be safely overridden, including in silent-mode testing."),
                ("braking", "Simulate unintended braking events and verify controlled braking is quickly re-established."),
                ("takeover", "Simulate unexpected disengagements to ensure manual control can be assumed quickly."),
                ("notification", "Verify prompt and clear notification of sensor or system errors under controlled conditions."),
                ("rollaway", "Run closed-course rollaway tests on a mild slope, validating emergency braking, neutral shift and prompt driver alerts."),
                ("control", "Verify control can be taken during simple low-speed scenarios with a clear manual override interface."),
            ]),
        });

        levels.insert(3, LevelGuidance {
            testing_requirements:
                "Expand testing into a broader ODD using high-fidelity simulations and extended \
                 on-road trials, including higher speeds, nighttime driving and light rain, with \
                 targeted fault-injection tests."
                    .into(),
            iftd_responsibilities:
                "The safety driver remains onboard as a continuous fallback while the system \
                 handles most of the route; training emphasizes rapid takeover and precise \
                 interpretation of system signals."
                    .into(),
            preventive_maintenance:
                "Establish a formal maintenance schedule combining regular and event-based \
                 inspections, supported by on-board diagnostics and predictive analytics."
                    .into(),
            avsc_guidelines:
                "Utilize AVSC Best Practice for Metrics and Methods for Assessing Safety \
                 Performance, ensure periodic driver re-training and adhere to ISO 26262/21448."
                    .into(),
            extra: extra(&[
                ("steering", "Simulate abnormal steering responses and verify safe override, including simulations, closed-course and silent-mode testing."),
                ("braking", "Test inconsistent braking responses and evaluate how quickly controlled braking is re-established within safe limits."),
                ("takeover", "Develop complex takeover scenarios during fault conditions; monitor response time and post-event analyses."),
                ("notification", "Verify during on-road trials that live alerts are clear across visual and auditory channels, and measure perception and reaction times."),
                ("rollaway", "Simulate a rollaway on a declining grade and verify emergency braking, transmission neutralization and stability controls engage promptly."),
                ("control", "Confirm the driver consistently assumes control during operational tests via an intuitive override interface."),
            ]),
        });

        levels.insert(4, LevelGuidance {
            testing_requirements:
                "Conduct pilot tests in a quasi-commercial setting on intended routes, covering \
                 the full ODD including boundary scenarios, with advanced simulations and on-road \
                 trials that safely challenge system limits."
                    .into(),
            iftd_responsibilities:
                "A fallback driver is onboard at all times as the ultimate safety net; although \
                 interventions become rare, vigilance is maintained through regular drills and \
                 attention tests."
                    .into(),
            preventive_maintenance:
                "Integrate comprehensive preventive maintenance into the test cycle: pre-run \
                 system checks, HD map verification, sensor cleaning and redundant system tests."
                    .into(),
            avsc_guidelines:
                "Implement AVSC Best Practice for First Responder Interactions, adopt a \
                 standardized safety inspection framework and ensure regulatory compliance."
                    .into(),
            extra: extra(&[
                ("steering", "Verify unexpected steering deviations are safely managed with control limits enforced."),
                ("braking", "Verify rapid re-establishment of controlled braking with predictable deceleration under fault conditions."),
                ("takeover", "Run controlled takeover scenarios measuring takeover speed and transition stability; feed results back into training."),
                ("notification", "Validate real-time alerts against actual sensor malfunctions across multiple modalities, and measure driver reaction."),
                ("rollaway", "Simulate a rollaway on a steeper decline verifying enhanced locking mechanisms and redundant braking work in tandem."),
                ("control", "Ensure reliable assumption of control in complex scenarios with clear override signals."),
            ]),
        });

        levels.insert(5, LevelGuidance {
            testing_requirements:
                "Subject the system to rigorous edge-case validations and continuous simulation \
                 exercises across its entire ODD, deliberately triggering abnormal conditions so \
                 control limits are enforced."
                    .into(),
            iftd_responsibilities:
                "A fallback driver remains onboard as a failsafe in a primarily supervisory role, \
                 with continuous intensive training and periodic attention-enhancing drills."
                    .into(),
            preventive_maintenance:
                "Maintain standard commercial fleet protocols with automated self-checks, \
                 condition-based preventive measures and frequent system health verification."
                    .into(),
            avsc_guidelines:
                "Implement all applicable AVSC best practices including continuous monitoring and \
                 first-responder protocols; adhere to ANSI/UL 4600 and ISO 26262/21448."
                    .into(),
            extra: extra(&[
                ("steering", "Verify dynamic steering limiters stay active and intervention is possible when inputs exceed defined control limits."),
                ("braking", "Confirm immediate assumption of control restores safe braking within defined limits."),
                ("takeover", "Periodically simulate takeover events even in near-commercial conditions, measuring speed, accuracy and smoothness."),
                ("notification", "Monitor the alert system over extended periods for consistent real-time delivery and quantified driver reaction."),
                ("rollaway", "Run exhaustive worst-case rollaway tests on extended steep grades with sensor faults, validating all redundant systems."),
                ("control", "Validate seamless full takeover under worst-case conditions with redundant manual control mechanisms."),
            ]),
        });

        Self { levels }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tables_cover_all_levels() {
        let tables = GuidanceTables::default();
        for level in 1..=5 {
            let level = AssuranceLevel::from_number(level).unwrap();
            for category in GuidanceCategory::SCALAR {
                assert!(
                    tables.recommendation(category, level).is_some(),
                    "missing {category} at {level}"
                );
            }
        }
    }

    #[test]
    fn test_category_labels() {
        assert_eq!(GuidanceCategory::Testing.label(), "Testing Requirements");
        assert_eq!(GuidanceCategory::Iftd.label(), "IFTD Responsibilities");
        assert_eq!(
            GuidanceCategory::Maintenance.label(),
            "Preventive Maintenance Actions"
        );
        assert_eq!(GuidanceCategory::Avsc.label(), "Relevant AVSC Guidelines");
        assert_eq!(GuidanceCategory::Extra.label(), "Extra Recommendations");
    }

    #[test]
    fn test_extra_keyword_matching_is_case_insensitive() {
        let tables = GuidanceTables::default();
        let hits = tables.extra_for_description(
            "Unintended Braking during lane change",
            AssuranceLevel::Level3,
        );
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0, "braking");

        let none = tables.extra_for_description("doors fail to open", AssuranceLevel::Level3);
        assert!(none.is_empty());
    }

    #[test]
    fn test_empty_tables_miss_every_lookup() {
        let tables = GuidanceTables::empty();
        assert!(tables
            .recommendation(GuidanceCategory::Testing, AssuranceLevel::Level1)
            .is_none());
        assert!(tables
            .extra_for_description("braking", AssuranceLevel::Level1)
            .is_empty());
    }

    #[test]
    fn test_set_level_overrides_builtin() {
        let mut tables = GuidanceTables::default();
        tables.set_level(
            AssuranceLevel::Level2,
            LevelGuidance {
                testing_requirements: "Site-specific test plan.".into(),
                ..Default::default()
            },
        );
        assert_eq!(
            tables.recommendation(GuidanceCategory::Testing, AssuranceLevel::Level2),
            Some("Site-specific test plan.")
        );
        // categories left empty no longer resolve
        assert!(tables
            .recommendation(GuidanceCategory::Avsc, AssuranceLevel::Level2)
            .is_none());
    }
}
