//! Risk-graph and cybersecurity assurance tables
//!
//! ASIL determination follows the ISO 26262 risk graph over severity,
//! controllability and exposure. Cybersecurity risk and CAL determination
//! follow the ISO 21434 style feasibility/impact and attack-vector/impact
//! tables. Combinations the CAL table does not define are reported as
//! [`AnalysisError::UnsupportedRisk`]; callers must not guess a level.

use crate::{AnalysisError, AnalysisResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// ASIL levels according to ISO 26262
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AsilLevel {
    /// Quality Management - no safety requirements
    QM,
    /// ASIL A - lowest safety integrity level
    A,
    /// ASIL B
    B,
    /// ASIL C
    C,
    /// ASIL D - highest safety integrity level
    D,
}

impl fmt::Display for AsilLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AsilLevel::QM => write!(f, "QM"),
            AsilLevel::A => write!(f, "ASIL A"),
            AsilLevel::B => write!(f, "ASIL B"),
            AsilLevel::C => write!(f, "ASIL C"),
            AsilLevel::D => write!(f, "ASIL D"),
        }
    }
}

/// ASIL from the risk graph: severity and controllability on a 1-3 scale,
/// exposure on a 1-4 scale. Combinations outside the graph (including
/// out-of-range inputs) carry no safety requirement and resolve to QM.
pub fn calc_asil(severity: u8, controllability: u8, exposure: u8) -> AsilLevel {
    match (severity, controllability, exposure) {
        (1, 2, 4) => AsilLevel::A,
        (1, 3, 4) => AsilLevel::B,
        (2, 1, 4) => AsilLevel::A,
        (2, 2, 3) => AsilLevel::A,
        (2, 2, 4) => AsilLevel::B,
        (2, 3, 2) => AsilLevel::A,
        (2, 3, 3) => AsilLevel::B,
        (2, 3, 4) => AsilLevel::C,
        (3, 1, 3) => AsilLevel::A,
        (3, 1, 4) => AsilLevel::B,
        (3, 2, 2) => AsilLevel::A,
        (3, 2, 3) => AsilLevel::B,
        (3, 2, 4) => AsilLevel::C,
        (3, 3, 1) => AsilLevel::A,
        (3, 3, 2) => AsilLevel::B,
        (3, 3, 3) => AsilLevel::C,
        (3, 3, 4) => AsilLevel::D,
        _ => AsilLevel::QM,
    }
}

/// Attack feasibility rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Feasibility {
    /// Low attack feasibility
    Low,
    /// Medium attack feasibility
    Medium,
    /// High attack feasibility
    High,
}

impl FromStr for Feasibility {
    type Err = AnalysisError;

    fn from_str(s: &str) -> AnalysisResult<Self> {
        match s {
            "Low" => Ok(Feasibility::Low),
            "Medium" => Ok(Feasibility::Medium),
            "High" => Ok(Feasibility::High),
            other => Err(AnalysisError::UnsupportedRisk(format!(
                "unknown feasibility '{}'",
                other
            ))),
        }
    }
}

/// Impact severity levels, lowest to highest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ImpactLevel {
    /// Negligible impact
    Negligible,
    /// Moderate impact
    Moderate,
    /// Major impact
    Major,
    /// Severe impact
    Severe,
}

impl FromStr for ImpactLevel {
    type Err = AnalysisError;

    fn from_str(s: &str) -> AnalysisResult<Self> {
        match s {
            "Negligible" => Ok(ImpactLevel::Negligible),
            "Moderate" => Ok(ImpactLevel::Moderate),
            "Major" => Ok(ImpactLevel::Major),
            "Severe" => Ok(ImpactLevel::Severe),
            other => Err(AnalysisError::UnsupportedRisk(format!(
                "unknown impact '{}'",
                other
            ))),
        }
    }
}

/// Overall risk level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    /// Low risk
    Low,
    /// Medium risk
    Medium,
    /// High risk
    High,
}

/// Attack vector of a threat scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackVector {
    /// Physical access required
    Physical,
    /// Local access required
    Local,
    /// Adjacent network access
    Adjacent,
    /// Remote network access
    Network,
}

/// Cybersecurity Assurance Levels defined in ISO 21434
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CalLevel {
    /// CAL1
    Cal1,
    /// CAL2
    Cal2,
    /// CAL3
    Cal3,
    /// CAL4
    Cal4,
}

impl fmt::Display for CalLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalLevel::Cal1 => write!(f, "CAL1"),
            CalLevel::Cal2 => write!(f, "CAL2"),
            CalLevel::Cal3 => write!(f, "CAL3"),
            CalLevel::Cal4 => write!(f, "CAL4"),
        }
    }
}

/// Overall risk level from feasibility and impact severity
pub fn risk_level(feasibility: Feasibility, impact: ImpactLevel) -> RiskLevel {
    use Feasibility::*;
    use ImpactLevel::*;
    match (feasibility, impact) {
        (High, Severe) | (High, Major) | (Medium, Severe) => RiskLevel::High,
        (High, Moderate) | (Medium, Major) | (Low, Severe) => RiskLevel::Medium,
        _ => RiskLevel::Low,
    }
}

/// CAL from attack vector and overall impact.
///
/// The table defines no level for negligible impact; such lookups are an
/// error rather than a guessed fallback.
pub fn cal_level(vector: AttackVector, impact: ImpactLevel) -> AnalysisResult<CalLevel> {
    use AttackVector::*;
    use ImpactLevel::*;
    let level = match (vector, impact) {
        (Physical | Local, Severe) => CalLevel::Cal2,
        (Physical | Local, Major) => CalLevel::Cal1,
        (Physical | Local, Moderate) => CalLevel::Cal1,
        (Adjacent, Severe) => CalLevel::Cal3,
        (Adjacent, Major) => CalLevel::Cal2,
        (Adjacent, Moderate) => CalLevel::Cal1,
        (Network, Severe) => CalLevel::Cal4,
        (Network, Major) => CalLevel::Cal3,
        (Network, Moderate) => CalLevel::Cal2,
        (_, Negligible) => {
            return Err(AnalysisError::UnsupportedRisk(format!(
                "no CAL defined for attack vector {:?} with {:?} impact",
                vector, impact
            )))
        }
    };
    Ok(level)
}

/// Cybersecurity risk assessment entry for one threat scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CyberRiskEntry {
    /// Damage scenario description
    pub damage_scenario: String,
    /// Threat scenario description
    pub threat_scenario: String,
    /// Attack vector
    pub attack_vector: AttackVector,
    /// Attack feasibility
    pub feasibility: Feasibility,
    /// Financial impact
    pub financial_impact: ImpactLevel,
    /// Safety impact
    pub safety_impact: ImpactLevel,
    /// Operational impact
    pub operational_impact: ImpactLevel,
    /// Privacy impact
    pub privacy_impact: ImpactLevel,
}

impl CyberRiskEntry {
    /// Highest impact among all impact categories
    pub fn overall_impact(&self) -> ImpactLevel {
        [
            self.financial_impact,
            self.safety_impact,
            self.operational_impact,
            self.privacy_impact,
        ]
        .into_iter()
        .max()
        .expect("non-empty impact list")
    }

    /// Overall risk level from feasibility and impact severity
    pub fn risk_level(&self) -> RiskLevel {
        risk_level(self.feasibility, self.overall_impact())
    }

    /// CAL from overall impact and attack vector
    pub fn cal(&self) -> AnalysisResult<CalLevel> {
        cal_level(self.attack_vector, self.overall_impact())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asil_ordering() {
        assert!(AsilLevel::D > AsilLevel::C);
        assert!(AsilLevel::C > AsilLevel::B);
        assert!(AsilLevel::B > AsilLevel::A);
        assert!(AsilLevel::A > AsilLevel::QM);
    }

    #[test]
    fn test_risk_graph_extremes() {
        assert_eq!(calc_asil(3, 3, 4), AsilLevel::D);
        assert_eq!(calc_asil(1, 1, 1), AsilLevel::QM);
        assert_eq!(calc_asil(3, 3, 3), AsilLevel::C);
        assert_eq!(calc_asil(2, 3, 4), AsilLevel::C);
        assert_eq!(calc_asil(1, 3, 4), AsilLevel::B);
        assert_eq!(calc_asil(3, 1, 3), AsilLevel::A);
    }

    #[test]
    fn test_risk_graph_out_of_range_is_qm() {
        assert_eq!(calc_asil(0, 1, 1), AsilLevel::QM);
        assert_eq!(calc_asil(4, 3, 4), AsilLevel::QM);
        assert_eq!(calc_asil(3, 3, 5), AsilLevel::QM);
    }

    #[test]
    fn test_risk_level_table() {
        assert_eq!(
            risk_level(Feasibility::High, ImpactLevel::Severe),
            RiskLevel::High
        );
        assert_eq!(
            risk_level(Feasibility::Medium, ImpactLevel::Major),
            RiskLevel::Medium
        );
        assert_eq!(
            risk_level(Feasibility::Low, ImpactLevel::Negligible),
            RiskLevel::Low
        );
        assert_eq!(
            risk_level(Feasibility::Low, ImpactLevel::Severe),
            RiskLevel::Medium
        );
    }

    #[test]
    fn test_cal_table() {
        assert_eq!(
            cal_level(AttackVector::Network, ImpactLevel::Severe).unwrap(),
            CalLevel::Cal4
        );
        assert_eq!(
            cal_level(AttackVector::Physical, ImpactLevel::Major).unwrap(),
            CalLevel::Cal1
        );
        assert_eq!(
            cal_level(AttackVector::Adjacent, ImpactLevel::Moderate).unwrap(),
            CalLevel::Cal1
        );
    }

    #[test]
    fn test_cal_negligible_impact_is_unsupported() {
        let err = cal_level(AttackVector::Network, ImpactLevel::Negligible).unwrap_err();
        match err {
            AnalysisError::UnsupportedRisk(msg) => {
                assert!(msg.contains("Negligible"));
                assert!(msg.contains("Network"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_errors_identify_key() {
        let err = "Impossible".parse::<Feasibility>().unwrap_err();
        assert!(matches!(err, AnalysisError::UnsupportedRisk(msg) if msg.contains("Impossible")));
        assert!("Catastrophic".parse::<ImpactLevel>().is_err());
        assert_eq!("Medium".parse::<Feasibility>().unwrap(), Feasibility::Medium);
    }

    #[test]
    fn test_cyber_entry_overall_impact_and_cal() {
        let entry = CyberRiskEntry {
            damage_scenario: "Loss of braking assist".into(),
            threat_scenario: "Spoofed wheel speed messages".into(),
            attack_vector: AttackVector::Adjacent,
            feasibility: Feasibility::Medium,
            financial_impact: ImpactLevel::Moderate,
            safety_impact: ImpactLevel::Severe,
            operational_impact: ImpactLevel::Major,
            privacy_impact: ImpactLevel::Negligible,
        };
        assert_eq!(entry.overall_impact(), ImpactLevel::Severe);
        assert_eq!(entry.risk_level(), RiskLevel::High);
        assert_eq!(entry.cal().unwrap(), CalLevel::Cal3);
    }

    #[test]
    fn test_asil_display() {
        assert_eq!(AsilLevel::D.to_string(), "ASIL D");
        assert_eq!(AsilLevel::QM.to_string(), "QM");
    }
}
