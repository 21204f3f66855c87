//! Registry of the document kinds the portal can draft

use serde::{Deserialize, Serialize};

use crate::types::{BodyLabel, PartyRole};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentKind {
    BailApplication,
    AnticipatoryBail,
    BailCancellation,
    TemporaryInjunction,
    PermanentInjunction,
    MaintenancePetition,
    DivorcePetition,
    RestitutionOfConjugalRights,
    DomesticViolence,
    ChequeBounce,
    MoneyRecovery,
    EvictionSuit,
    ConsumerComplaint,
    ChildCustody,
    CaveatPetition,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 15] = [
        DocumentKind::BailApplication,
        DocumentKind::AnticipatoryBail,
        DocumentKind::BailCancellation,
        DocumentKind::TemporaryInjunction,
        DocumentKind::PermanentInjunction,
        DocumentKind::MaintenancePetition,
        DocumentKind::DivorcePetition,
        DocumentKind::RestitutionOfConjugalRights,
        DocumentKind::DomesticViolence,
        DocumentKind::ChequeBounce,
        DocumentKind::MoneyRecovery,
        DocumentKind::EvictionSuit,
        DocumentKind::ConsumerComplaint,
        DocumentKind::ChildCustody,
        DocumentKind::CaveatPetition,
    ];

    /// URL-safe identifier, also the config key for the kind's endpoint
    pub fn slug(&self) -> &'static str {
        match self {
            DocumentKind::BailApplication => "bail-application",
            DocumentKind::AnticipatoryBail => "anticipatory-bail",
            DocumentKind::BailCancellation => "bail-cancellation",
            DocumentKind::TemporaryInjunction => "temporary-injunction",
            DocumentKind::PermanentInjunction => "permanent-injunction",
            DocumentKind::MaintenancePetition => "maintenance-petition",
            DocumentKind::DivorcePetition => "divorce-petition",
            DocumentKind::RestitutionOfConjugalRights => "restitution-of-conjugal-rights",
            DocumentKind::DomesticViolence => "domestic-violence",
            DocumentKind::ChequeBounce => "cheque-bounce",
            DocumentKind::MoneyRecovery => "money-recovery",
            DocumentKind::EvictionSuit => "eviction-suit",
            DocumentKind::ConsumerComplaint => "consumer-complaint",
            DocumentKind::ChildCustody => "child-custody",
            DocumentKind::CaveatPetition => "caveat-petition",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            DocumentKind::BailApplication => "Bail Application",
            DocumentKind::AnticipatoryBail => "Anticipatory Bail Application",
            DocumentKind::BailCancellation => "Bail Cancellation Application",
            DocumentKind::TemporaryInjunction => "Temporary Injunction Application",
            DocumentKind::PermanentInjunction => "Suit for Permanent Injunction",
            DocumentKind::MaintenancePetition => "Maintenance Petition",
            DocumentKind::DivorcePetition => "Divorce Petition",
            DocumentKind::RestitutionOfConjugalRights => "Restitution of Conjugal Rights",
            DocumentKind::DomesticViolence => "Domestic Violence Complaint",
            DocumentKind::ChequeBounce => "Cheque Bounce Complaint",
            DocumentKind::MoneyRecovery => "Suit for Recovery of Money",
            DocumentKind::EvictionSuit => "Eviction Suit",
            DocumentKind::ConsumerComplaint => "Consumer Complaint",
            DocumentKind::ChildCustody => "Child Custody Petition",
            DocumentKind::CaveatPetition => "Caveat Petition",
        }
    }

    pub fn route_path(&self) -> String {
        format!("/documents/{}", self.slug())
    }

    /// Key under `[endpoints.documents]` in the portal config
    pub fn endpoint_key(&self) -> &'static str {
        self.slug()
    }

    /// (moving role, responding role) as printed in the cause title
    pub fn parties(&self) -> (PartyRole, PartyRole) {
        use PartyRole::*;
        match self {
            DocumentKind::BailApplication | DocumentKind::AnticipatoryBail => {
                (Applicant, State)
            }
            DocumentKind::BailCancellation => (Applicant, Accused),
            DocumentKind::TemporaryInjunction => (Applicant, OppositeParty),
            DocumentKind::PermanentInjunction
            | DocumentKind::MoneyRecovery
            | DocumentKind::EvictionSuit => (Plaintiff, Defendant),
            DocumentKind::MaintenancePetition
            | DocumentKind::DivorcePetition
            | DocumentKind::RestitutionOfConjugalRights
            | DocumentKind::ChildCustody => (Petitioner, Respondent),
            DocumentKind::DomesticViolence => (Aggrieved, Respondent),
            DocumentKind::ChequeBounce => (Complainant, Accused),
            DocumentKind::ConsumerComplaint => (Complainant, OppositeParty),
            DocumentKind::CaveatPetition => (Caveator, Respondent),
        }
    }

    /// Criminal applications argue grounds; suits and petitions plead facts
    pub fn body_label(&self) -> BodyLabel {
        match self {
            DocumentKind::BailApplication
            | DocumentKind::AnticipatoryBail
            | DocumentKind::BailCancellation
            | DocumentKind::TemporaryInjunction
            | DocumentKind::CaveatPetition => BodyLabel::Grounds,
            _ => BodyLabel::Facts,
        }
    }

    /// Label used in the case line ("Bail Application No. 12 of 2024")
    pub fn case_label(&self) -> &'static str {
        match self {
            DocumentKind::BailApplication
            | DocumentKind::AnticipatoryBail
            | DocumentKind::BailCancellation => "Bail Application",
            DocumentKind::TemporaryInjunction => "Interlocutory Application",
            DocumentKind::PermanentInjunction
            | DocumentKind::MoneyRecovery
            | DocumentKind::EvictionSuit => "Civil Suit",
            DocumentKind::MaintenancePetition
            | DocumentKind::DivorcePetition
            | DocumentKind::RestitutionOfConjugalRights
            | DocumentKind::ChildCustody => "Petition",
            DocumentKind::DomesticViolence | DocumentKind::ChequeBounce => "Criminal Complaint",
            DocumentKind::ConsumerComplaint => "Consumer Complaint",
            DocumentKind::CaveatPetition => "Caveat",
        }
    }

    /// Suffix appended to the first party's name in download filenames
    pub fn file_stem(&self) -> &'static str {
        match self {
            DocumentKind::BailApplication => "Bail_Application",
            DocumentKind::AnticipatoryBail => "Anticipatory_Bail",
            DocumentKind::BailCancellation => "Bail_Cancellation",
            DocumentKind::TemporaryInjunction => "Temporary_Injunction",
            DocumentKind::PermanentInjunction => "Permanent_Injunction",
            DocumentKind::MaintenancePetition => "Maintenance_Petition",
            DocumentKind::DivorcePetition => "Divorce_Petition",
            DocumentKind::RestitutionOfConjugalRights => "Restitution_Petition",
            DocumentKind::DomesticViolence => "DV_Complaint",
            DocumentKind::ChequeBounce => "Cheque_Bounce_Complaint",
            DocumentKind::MoneyRecovery => "Recovery_Suit",
            DocumentKind::EvictionSuit => "Eviction_Suit",
            DocumentKind::ConsumerComplaint => "Consumer_Complaint",
            DocumentKind::ChildCustody => "Custody_Petition",
            DocumentKind::CaveatPetition => "Caveat_Petition",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.slug() == slug)
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_slugs_are_unique_and_resolve() {
        let slugs: HashSet<_> = DocumentKind::ALL.iter().map(|k| k.slug()).collect();
        assert_eq!(slugs.len(), DocumentKind::ALL.len());

        for kind in DocumentKind::ALL {
            assert_eq!(DocumentKind::from_slug(kind.slug()), Some(kind));
        }
        assert_eq!(DocumentKind::from_slug("will-probate"), None);
    }

    #[test]
    fn test_serde_name_matches_slug() {
        for kind in DocumentKind::ALL {
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, serde_json::Value::String(kind.slug().to_string()));
        }
    }

    #[test]
    fn test_parties_are_on_opposite_sides() {
        for kind in DocumentKind::ALL {
            let (moving, responding) = kind.parties();
            assert_ne!(moving.side(), responding.side(), "{}", kind);
        }
    }

    #[test]
    fn test_route_path() {
        assert_eq!(
            DocumentKind::ChequeBounce.route_path(),
            "/documents/cheque-bounce"
        );
    }
}
