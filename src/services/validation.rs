//! Validation of the builder fields.
//!
//! One set of rule definitions backs both the blur-time single-field check
//! and the exhaustive check run on submit. Every problem is collected; the
//! check never stops at the first one.

use crate::models::gift::{MESSAGE_MAX, NAME_MAX};
use crate::models::tile::{DESCRIPTION_MAX, TITLE_MAX};
use crate::models::TilePart;
use crate::services::field_registry::{FieldId, FieldRegistry};
use serde::Deserialize;

/// Which fields are required and which are conditional
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct RuleSet {
    pub tile_count: usize,
    pub require_names: bool,
    pub require_sender_email: bool,
    /// Enables the "send direct" toggle and the recipient email rules
    pub delivery_option: bool,
    pub enforce_lengths: bool,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            tile_count: 8,
            require_names: true,
            require_sender_email: true,
            delivery_option: true,
            enforce_lengths: true,
        }
    }
}

impl RuleSet {
    /// Every field checked on submit, in display order
    pub fn fields(&self, registry: &FieldRegistry) -> Vec<FieldId> {
        let mut fields: Vec<FieldId> = registry.tiles().iter().map(|t| FieldId::Tile(t.slot)).collect();
        fields.extend([
            FieldId::FromName,
            FieldId::ToName,
            FieldId::FromEmail,
            FieldId::ToEmail,
            FieldId::CustomMessage,
        ]);
        fields
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProblemKind {
    TileIncomplete(Vec<TilePart>),
    Required,
    TooLong { max: usize },
    EmailsMustDiffer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    pub field: FieldId,
    pub kind: ProblemKind,
}

impl Problem {
    pub fn new(field: FieldId, kind: ProblemKind) -> Self {
        Self { field, kind }
    }

    pub fn message(&self) -> String {
        match (&self.kind, self.field) {
            (ProblemKind::TileIncomplete(missing), FieldId::Tile(slot)) => {
                let parts: Vec<&str> = missing.iter().map(|p| p.label()).collect();
                format!("Memory {} still needs: {}.", slot, parts.join(", "))
            }
            (ProblemKind::Required, FieldId::FromName) => {
                "Please enter who the game is from.".to_string()
            }
            (ProblemKind::Required, FieldId::ToName) => {
                "Please enter who the game is for.".to_string()
            }
            (ProblemKind::Required, FieldId::FromEmail) => "Please enter your email.".to_string(),
            (ProblemKind::Required, FieldId::ToEmail) => {
                "Please enter the recipient's email to send the game directly.".to_string()
            }
            (ProblemKind::Required, field) => format!("{} is required.", field.label()),
            (ProblemKind::TooLong { max }, field) => {
                format!("{} must be at most {} characters.", field.label(), max)
            }
            (ProblemKind::EmailsMustDiffer, _) => {
                "The recipient's email must be different from your email.".to_string()
            }
            (ProblemKind::TileIncomplete(_), field) => format!("{} is incomplete.", field.label()),
        }
    }
}

/// Outcome of the exhaustive check
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Verdict {
    pub problems: Vec<Problem>,
}

impl Verdict {
    pub fn is_ok(&self) -> bool {
        self.problems.is_empty()
    }

    /// Scroll target after a failed submit
    pub fn first_invalid(&self) -> Option<FieldId> {
        self.problems.first().map(|p| p.field)
    }
}

/// Checks every field
pub fn validate(registry: &FieldRegistry, rules: &RuleSet) -> Verdict {
    let problems = rules
        .fields(registry)
        .into_iter()
        .flat_map(|field| validate_field(registry, rules, field))
        .collect();
    Verdict { problems }
}

/// Checks a single field; returns problems attached to that field only
pub fn validate_field(registry: &FieldRegistry, rules: &RuleSet, field: FieldId) -> Vec<Problem> {
    let mut problems = Vec::new();
    let mut push = |kind| problems.push(Problem::new(field, kind));

    match field {
        FieldId::Tile(slot) => {
            let Some(tile) = registry.tile(slot) else {
                return problems;
            };
            let missing = tile.missing_parts();
            if !missing.is_empty() {
                push(ProblemKind::TileIncomplete(missing));
            }
            if rules.enforce_lengths {
                if too_long(&tile.title, TITLE_MAX) {
                    push(ProblemKind::TooLong { max: TITLE_MAX });
                }
                if too_long(&tile.description, DESCRIPTION_MAX) {
                    push(ProblemKind::TooLong {
                        max: DESCRIPTION_MAX,
                    });
                }
            }
        }
        FieldId::FromName | FieldId::ToName => {
            let value = registry.text(field);
            if rules.require_names && value.is_empty() {
                push(ProblemKind::Required);
            }
            if rules.enforce_lengths && too_long(&value, NAME_MAX) {
                push(ProblemKind::TooLong { max: NAME_MAX });
            }
        }
        FieldId::FromEmail => {
            if rules.require_sender_email && registry.text(field).is_empty() {
                push(ProblemKind::Required);
            }
            if delivery_on(registry, rules) && registry.gift().emails_match() {
                push(ProblemKind::EmailsMustDiffer);
            }
        }
        FieldId::ToEmail => {
            // Recipient rules only exist while the delivery toggle is on
            if delivery_on(registry, rules) {
                if registry.text(field).is_empty() {
                    push(ProblemKind::Required);
                } else if registry.gift().emails_match() {
                    push(ProblemKind::EmailsMustDiffer);
                }
            }
        }
        FieldId::CustomMessage => {
            if rules.enforce_lengths && too_long(&registry.gift().custom_message, MESSAGE_MAX) {
                push(ProblemKind::TooLong { max: MESSAGE_MAX });
            }
        }
    }

    problems
}

fn delivery_on(registry: &FieldRegistry, rules: &RuleSet) -> bool {
    rules.delivery_option && registry.gift().send_direct
}

fn too_long(value: &str, max: usize) -> bool {
    value.trim().chars().count() > max
}

#[cfg(test)]
mod tests {
    use super::*;
    use memory_media::MediaFile;

    fn complete_registry() -> FieldRegistry {
        let mut registry = FieldRegistry::new(8);
        for slot in 1..=8u8 {
            registry.edit_tile(slot, |t| {
                t.image = Some(MediaFile::new("a.jpg", "image/jpeg", vec![1]));
                t.title = format!("Title {}", slot);
                t.period = "2021-06".to_string();
                t.description = "Something we did".to_string();
            });
        }
        registry.edit_gift(|g| {
            g.from_name = "Sam".to_string();
            g.to_name = "Alex".to_string();
            g.from_email = "sam@example.com".to_string();
        });
        registry
    }

    fn kinds_for(verdict: &Verdict, field: FieldId) -> Vec<ProblemKind> {
        verdict
            .problems
            .iter()
            .filter(|p| p.field == field)
            .map(|p| p.kind.clone())
            .collect()
    }

    #[test]
    fn test_complete_form_passes() {
        let verdict = validate(&complete_registry(), &RuleSet::default());
        assert!(verdict.is_ok(), "{:?}", verdict);
    }

    #[test]
    fn test_tile_problem_iff_a_part_is_empty() {
        let rules = RuleSet::default();
        let parts: [fn(&mut crate::models::MemoryTile); 4] = [
            |t| t.image = None,
            |t| t.title = " ".to_string(),
            |t| t.period = String::new(),
            |t| t.description = String::new(),
        ];

        for (i, clear) in parts.iter().enumerate() {
            let slot = (i + 1) as u8;
            let mut registry = complete_registry();
            registry.edit_tile(slot, |t| clear(t));

            let verdict = validate(&registry, &rules);
            assert_eq!(verdict.problems.len(), 1);
            assert_eq!(verdict.problems[0].field, FieldId::Tile(slot));
            assert!(verdict.problems[0].message().starts_with(&format!("Memory {}", slot)));
        }
    }

    #[test]
    fn test_all_problems_collected() {
        let registry = FieldRegistry::new(8);
        let verdict = validate(&registry, &RuleSet::default());

        // 8 tiles + from name + to name + sender email
        assert_eq!(verdict.problems.len(), 11);
        assert_eq!(verdict.first_invalid(), Some(FieldId::Tile(1)));
    }

    #[test]
    fn test_recipient_required_when_sending_direct() {
        let mut registry = complete_registry();
        registry.set_send_direct(true);

        let verdict = validate(&registry, &RuleSet::default());
        assert_eq!(verdict.problems.len(), 1);
        assert_eq!(kinds_for(&verdict, FieldId::ToEmail), vec![ProblemKind::Required]);
    }

    #[test]
    fn test_delivery_off_ignores_recipient() {
        let mut registry = complete_registry();
        registry.edit_gift(|g| g.to_email = "SAM@example.com".to_string());

        assert!(validate(&registry, &RuleSet::default()).is_ok());
        assert!(validate_field(&registry, &RuleSet::default(), FieldId::ToEmail).is_empty());
    }

    #[test]
    fn test_same_emails_flag_both_fields() {
        let mut registry = complete_registry();
        registry.set_send_direct(true);
        registry.edit_gift(|g| g.to_email = "  SAM@Example.com ".to_string());

        let verdict = validate(&registry, &RuleSet::default());
        assert_eq!(
            kinds_for(&verdict, FieldId::FromEmail),
            vec![ProblemKind::EmailsMustDiffer]
        );
        assert_eq!(
            kinds_for(&verdict, FieldId::ToEmail),
            vec![ProblemKind::EmailsMustDiffer]
        );

        registry.edit_gift(|g| g.to_email = "alex@example.com".to_string());
        assert!(validate(&registry, &RuleSet::default()).is_ok());
    }

    #[test]
    fn test_revalidate_clears_related_field() {
        let rules = RuleSet::default();
        let mut registry = complete_registry();
        registry.set_send_direct(true);
        registry.edit_gift(|g| g.to_email = "sam@example.com".to_string());

        registry.revalidate(FieldId::ToEmail, &rules);
        assert!(registry.error(FieldId::ToEmail).is_some());
        assert!(registry.error(FieldId::FromEmail).is_some());

        registry.edit_gift(|g| g.from_email = "other@example.com".to_string());
        registry.revalidate(FieldId::FromEmail, &rules);
        assert!(registry.error(FieldId::ToEmail).is_none());
        assert!(registry.error(FieldId::FromEmail).is_none());
    }

    #[test]
    fn test_toggle_off_then_on_revalidates_fresh() {
        let rules = RuleSet::default();
        let mut registry = complete_registry();
        registry.set_send_direct(true);
        registry.revalidate(FieldId::ToEmail, &rules);
        assert!(registry.error(FieldId::ToEmail).is_some());

        registry.set_send_direct(false);
        assert!(registry.error(FieldId::ToEmail).is_none());
        registry.revalidate(FieldId::ToEmail, &rules);
        assert!(registry.error(FieldId::ToEmail).is_none());
    }

    #[test]
    fn test_rule_set_without_delivery_option() {
        let rules = RuleSet {
            delivery_option: false,
            ..RuleSet::default()
        };
        let mut registry = complete_registry();
        registry.set_send_direct(true);
        assert!(validate(&registry, &rules).is_ok());
    }

    #[test]
    fn test_rule_set_without_sender_email() {
        let rules = RuleSet {
            require_sender_email: false,
            ..RuleSet::default()
        };
        let mut registry = complete_registry();
        registry.edit_gift(|g| g.from_email.clear());
        assert!(validate(&registry, &rules).is_ok());
    }

    #[test]
    fn test_length_limits() {
        let mut registry = complete_registry();
        registry.edit_gift(|g| g.custom_message = "x".repeat(301));
        registry.edit_tile(2, |t| t.title = "t".repeat(31));

        let verdict = validate(&registry, &RuleSet::default());
        assert_eq!(
            kinds_for(&verdict, FieldId::CustomMessage),
            vec![ProblemKind::TooLong { max: 300 }]
        );
        assert_eq!(
            kinds_for(&verdict, FieldId::Tile(2)),
            vec![ProblemKind::TooLong { max: 30 }]
        );
    }
}
