use serde::{Deserialize, Serialize};

/// Breadth of a report. Templates declare one; users request one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReportScope {
    /// One report per entity.
    #[serde(alias = "entity")]
    Individual,
    /// One report for the whole campaign.
    Consolidated,
    /// One report for a single vulnerability scan.
    ScanIndividual,
    /// One report for the scanner-wide ecosystem.
    ScanEcosystem,
    /// Audit template usable for entity and consolidated reports.
    Both,
    /// Scanner template usable for scan and ecosystem reports.
    ScanBoth,
}

/// Audit and scanner scopes never mix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeFamily {
    Audit,
    Scanner,
}

impl ReportScope {
    pub const ALL: [ReportScope; 6] = [
        ReportScope::Individual,
        ReportScope::Consolidated,
        ReportScope::ScanIndividual,
        ReportScope::ScanEcosystem,
        ReportScope::Both,
        ReportScope::ScanBoth,
    ];

    pub fn family(&self) -> ScopeFamily {
        match self {
            Self::Individual | Self::Consolidated | Self::Both => ScopeFamily::Audit,
            Self::ScanIndividual | Self::ScanEcosystem | Self::ScanBoth => ScopeFamily::Scanner,
        }
    }

    /// True for the `both` / `scanBoth` scopes that cover a whole family.
    pub fn is_combined(&self) -> bool {
        matches!(self, Self::Both | Self::ScanBoth)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Individual => "individual",
            Self::Consolidated => "consolidated",
            Self::ScanIndividual => "scanIndividual",
            Self::ScanEcosystem => "scanEcosystem",
            Self::Both => "both",
            Self::ScanBoth => "scanBoth",
        }
    }

    /// Title prefix for generated reports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Individual => "Entity report",
            Self::Consolidated => "Consolidated report",
            Self::ScanIndividual => "Scan report",
            Self::ScanEcosystem => "Ecosystem scan report",
            Self::Both => "Audit report",
            Self::ScanBoth => "Scanner report",
        }
    }

    /// How a template declaring this scope is described in denial reasons.
    pub fn template_description(&self) -> &'static str {
        match self {
            Self::Individual => "per-entity",
            Self::Consolidated => "consolidated",
            Self::ScanIndividual => "single-scan",
            Self::ScanEcosystem => "ecosystem scan",
            Self::Both => "entity and consolidated",
            Self::ScanBoth => "scan and ecosystem",
        }
    }
}

impl std::fmt::Display for ReportScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReportScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "individual" | "entity" => Ok(Self::Individual),
            "consolidated" | "campaign" => Ok(Self::Consolidated),
            "scanindividual" | "scan" => Ok(Self::ScanIndividual),
            "scanecosystem" | "ecosystem" => Ok(Self::ScanEcosystem),
            "both" => Ok(Self::Both),
            "scanboth" => Ok(Self::ScanBoth),
            other => Err(format!("Unknown report scope: {}", other)),
        }
    }
}

impl std::fmt::Display for ScopeFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Audit => write!(f, "audit"),
            Self::Scanner => write!(f, "scanner"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names() {
        assert_eq!(serde_json::to_string(&ReportScope::ScanIndividual).unwrap(), "\"scanIndividual\"");
        assert_eq!(serde_json::to_string(&ReportScope::ScanBoth).unwrap(), "\"scanBoth\"");
        let parsed: ReportScope = serde_json::from_str("\"consolidated\"").unwrap();
        assert_eq!(parsed, ReportScope::Consolidated);
    }

    #[test]
    fn test_entity_alias() {
        let parsed: ReportScope = serde_json::from_str("\"entity\"").unwrap();
        assert_eq!(parsed, ReportScope::Individual);
        assert_eq!("entity".parse::<ReportScope>().unwrap(), ReportScope::Individual);
    }

    #[test]
    fn test_families_partition_scopes() {
        let audit = ReportScope::ALL.iter().filter(|s| s.family() == ScopeFamily::Audit).count();
        let scanner = ReportScope::ALL.iter().filter(|s| s.family() == ScopeFamily::Scanner).count();
        assert_eq!(audit, 3);
        assert_eq!(scanner, 3);
    }

    #[test]
    fn test_from_str_accepts_wire_and_kebab() {
        assert_eq!("scanEcosystem".parse::<ReportScope>().unwrap(), ReportScope::ScanEcosystem);
        assert_eq!("scan-both".parse::<ReportScope>().unwrap(), ReportScope::ScanBoth);
        assert!("quarterly".parse::<ReportScope>().is_err());
    }

    #[test]
    fn test_display_matches_wire() {
        for scope in ReportScope::ALL {
            let json = serde_json::to_string(&scope).unwrap();
            assert_eq!(json, format!("\"{}\"", scope));
        }
    }
}
