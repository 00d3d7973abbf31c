use crate::models::{GiftDetails, HandOffFields, MemoryTile, SessionIdentity};
use crate::services::validation::{self, Problem, ProblemKind, RuleSet};
use std::collections::BTreeMap;

/// Every field the builder can validate or annotate
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldId {
    /// A whole memory tile, 1-based slot
    Tile(u8),
    FromName,
    ToName,
    FromEmail,
    ToEmail,
    CustomMessage,
}

impl FieldId {
    /// DOM id, also used as the scroll target
    pub fn dom_id(&self) -> String {
        match self {
            FieldId::Tile(slot) => format!("memory-{}", slot),
            FieldId::FromName => "from-name".to_string(),
            FieldId::ToName => "to-name".to_string(),
            FieldId::FromEmail => "player-email".to_string(),
            FieldId::ToEmail => "to-email".to_string(),
            FieldId::CustomMessage => "custom-message".to_string(),
        }
    }

    pub fn label(&self) -> String {
        match self {
            FieldId::Tile(slot) => format!("Memory {}", slot),
            FieldId::FromName => "From".to_string(),
            FieldId::ToName => "To".to_string(),
            FieldId::FromEmail => "Your email".to_string(),
            FieldId::ToEmail => "Recipient email".to_string(),
            FieldId::CustomMessage => "Custom message".to_string(),
        }
    }

    /// Fields whose verdict depends on this one
    pub fn related(&self) -> Option<FieldId> {
        match self {
            FieldId::FromEmail => Some(FieldId::ToEmail),
            FieldId::ToEmail => Some(FieldId::FromEmail),
            _ => None,
        }
    }
}

/// Current state of all builder fields: tiles, gift details, per-field
/// errors, the disabled flag and the hidden hand-off values.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRegistry {
    tiles: Vec<MemoryTile>,
    gift: GiftDetails,
    errors: BTreeMap<FieldId, Problem>,
    disabled: bool,
    hand_off: HandOffFields,
}

impl FieldRegistry {
    /// All tiles are created up front, empty
    pub fn new(tile_count: usize) -> Self {
        let tiles = (1..=tile_count.min(u8::MAX as usize))
            .map(|slot| MemoryTile::new(slot as u8))
            .collect();
        Self {
            tiles,
            gift: GiftDetails::default(),
            errors: BTreeMap::new(),
            disabled: false,
            hand_off: HandOffFields::default(),
        }
    }

    pub fn with_session(mut self, session: &SessionIdentity) -> Self {
        self.hand_off.session_id = session.as_str().to_string();
        self
    }

    // --- reads ---

    pub fn tiles(&self) -> &[MemoryTile] {
        &self.tiles
    }

    pub fn tile(&self, slot: u8) -> Option<&MemoryTile> {
        self.tiles.iter().find(|t| t.slot == slot)
    }

    pub fn gift(&self) -> &GiftDetails {
        &self.gift
    }

    /// Trimmed text value of a field; tiles have no single text value
    pub fn text(&self, field: FieldId) -> String {
        let raw = match field {
            FieldId::Tile(_) => "",
            FieldId::FromName => self.gift.from_name.as_str(),
            FieldId::ToName => self.gift.to_name.as_str(),
            FieldId::FromEmail => self.gift.from_email.as_str(),
            FieldId::ToEmail => self.gift.to_email.as_str(),
            FieldId::CustomMessage => self.gift.custom_message.as_str(),
        };
        raw.trim().to_string()
    }

    pub fn complete_count(&self) -> usize {
        self.tiles.iter().filter(|t| t.is_complete()).count()
    }

    pub fn is_required(&self, field: FieldId, rules: &RuleSet) -> bool {
        match field {
            FieldId::Tile(_) => true,
            FieldId::FromName | FieldId::ToName => rules.require_names,
            FieldId::FromEmail => rules.require_sender_email,
            FieldId::ToEmail => rules.delivery_option && self.gift.send_direct,
            FieldId::CustomMessage => false,
        }
    }

    /// All tiles complete and required gift fields filled
    pub fn ready_to_submit(&self, rules: &RuleSet) -> bool {
        self.complete_count() == self.tiles.len()
            && [FieldId::FromName, FieldId::ToName, FieldId::FromEmail, FieldId::ToEmail]
                .into_iter()
                .filter(|f| self.is_required(*f, rules))
                .all(|f| !self.text(f).is_empty())
    }

    pub fn error(&self, field: FieldId) -> Option<&Problem> {
        self.errors.get(&field)
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn hand_off(&self) -> &HandOffFields {
        &self.hand_off
    }

    // --- writes ---

    /// Applies `edit` to a tile. Ignored while a submission is running.
    pub fn edit_tile<F>(&mut self, slot: u8, edit: F) -> bool
    where
        F: FnOnce(&mut MemoryTile),
    {
        if self.disabled {
            log::debug!("Tile {} edit ignored while submitting", slot);
            return false;
        }
        match self.tiles.iter_mut().find(|t| t.slot == slot) {
            Some(tile) => {
                edit(tile);
                true
            }
            None => false,
        }
    }

    /// Applies `edit` to the gift details. Ignored while a submission is running.
    pub fn edit_gift<F>(&mut self, edit: F) -> bool
    where
        F: FnOnce(&mut GiftDetails),
    {
        if self.disabled {
            return false;
        }
        edit(&mut self.gift);
        true
    }

    /// Switching delivery off makes the recipient rules irrelevant, so
    /// their errors go away with it.
    pub fn set_send_direct(&mut self, on: bool) -> bool {
        if !self.edit_gift(|g| g.send_direct = on) {
            return false;
        }
        if !on {
            self.clear_error(FieldId::ToEmail);
            if matches!(
                self.error(FieldId::FromEmail).map(|p| &p.kind),
                Some(ProblemKind::EmailsMustDiffer)
            ) {
                self.clear_error(FieldId::FromEmail);
            }
        }
        true
    }

    pub fn set_error(&mut self, problem: Problem) {
        self.errors.insert(problem.field, problem);
    }

    pub fn clear_error(&mut self, field: FieldId) {
        self.errors.remove(&field);
    }

    pub fn clear_errors(&mut self) {
        self.errors.clear();
    }

    /// Replaces the error state of `field` with the first of `problems`
    pub fn apply_field_problems(&mut self, field: FieldId, problems: Vec<Problem>) {
        self.clear_error(field);
        if let Some(problem) = problems.into_iter().find(|p| p.field == field) {
            self.set_error(problem);
        }
    }

    /// Replaces every error with the exhaustive result
    pub fn apply_problems(&mut self, problems: &[Problem]) {
        self.errors.clear();
        for problem in problems {
            self.errors.entry(problem.field).or_insert_with(|| problem.clone());
        }
    }

    /// Blur-time validation of one field and the fields depending on it
    pub fn revalidate(&mut self, field: FieldId, rules: &RuleSet) {
        let mut fields = vec![field];
        fields.extend(field.related());
        for f in fields {
            let problems = validation::validate_field(self, rules, f);
            self.apply_field_problems(f, problems);
        }
    }

    /// Re-checks a field only while it (or its related field) is marked
    /// invalid, so the mark goes away as soon as the input is fixed
    pub fn refresh(&mut self, field: FieldId, rules: &RuleSet) {
        let marked = self.error(field).is_some()
            || field.related().is_some_and(|r| self.error(r).is_some());
        if marked {
            self.revalidate(field, rules);
        }
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    pub fn set_hand_off(&mut self, fields: HandOffFields) {
        self.hand_off = fields;
    }
}
