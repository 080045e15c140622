use serde::Serialize;
use suvidha_types::Action;

/// A named automation rule shown to operators.
///
/// Descriptive only: nothing in the ledger evaluates or enforces these.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomationRule {
    pub id: &'static str,
    pub name: &'static str,
    /// Human-readable trigger condition.
    pub condition: &'static str,
    /// Ledger action the rule would record when it fires.
    pub outcome: Action,
    pub enabled: bool,
}

const RULES: [AutomationRule; 5] = [
    AutomationRule {
        id: "escalate-stale-pending",
        name: "Escalate stale complaints",
        condition: "complaint pending for 7 days without assignment",
        outcome: Action::Escalated,
        enabled: true,
    },
    AutomationRule {
        id: "escalate-safety-hazard",
        name: "Fast-track safety hazards",
        condition: "category is a public safety hazard and unresolved after 24 hours",
        outcome: Action::Escalated,
        enabled: true,
    },
    AutomationRule {
        id: "assign-by-ward",
        name: "Route to ward department",
        condition: "new complaint carries a ward and category",
        outcome: Action::Assigned,
        enabled: true,
    },
    AutomationRule {
        id: "close-after-verification",
        name: "Close verified resolutions",
        condition: "resolution verified by the citizen 48 hours ago",
        outcome: Action::Closed,
        enabled: true,
    },
    AutomationRule {
        id: "reopen-on-low-rating",
        name: "Reopen poorly rated resolutions",
        condition: "citizen rates the resolution 2 or lower",
        outcome: Action::Reopened,
        enabled: false,
    },
];

/// The static automation rule list.
pub fn fixed_rule_set() -> &'static [AutomationRule] {
    &RULES
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn rule_ids_are_unique() {
        let ids: HashSet<&str> = fixed_rule_set().iter().map(|r| r.id).collect();
        assert_eq!(ids.len(), fixed_rule_set().len());
    }

    #[test]
    fn includes_seven_day_escalation() {
        let rule = fixed_rule_set()
            .iter()
            .find(|r| r.id == "escalate-stale-pending")
            .unwrap();
        assert_eq!(rule.outcome, Action::Escalated);
        assert!(rule.condition.contains("7 days"));
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(fixed_rule_set()[0]).unwrap();
        assert_eq!(json["outcome"], "ESCALATED");
        assert_eq!(json["enabled"], true);
    }
}
