pub const NAME_MAX: usize = 20;
pub const MESSAGE_MAX: usize = 300;

/// Sender/recipient metadata for the gift
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GiftDetails {
    pub from_name: String,
    pub to_name: String,
    pub from_email: String,
    /// Deliver straight to the recipient instead of the sender
    pub send_direct: bool,
    pub to_email: String,
    pub custom_message: String,
}

impl GiftDetails {
    /// Case-insensitive comparison after trimming; two blanks never match
    pub fn emails_match(&self) -> bool {
        let from = self.from_email.trim();
        let to = self.to_email.trim();
        !from.is_empty() && !to.is_empty() && from.eq_ignore_ascii_case(to)
    }

    /// Copy with every text value trimmed, as written into the summary
    pub fn trimmed(&self) -> Self {
        Self {
            from_name: self.from_name.trim().to_string(),
            to_name: self.to_name.trim().to_string(),
            from_email: self.from_email.trim().to_string(),
            send_direct: self.send_direct,
            to_email: self.to_email.trim().to_string(),
            custom_message: self.custom_message.trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emails_match_ignores_case_and_whitespace() {
        let gift = GiftDetails {
            from_email: " Anna@Example.com".to_string(),
            to_email: "anna@example.COM  ".to_string(),
            ..Default::default()
        };
        assert!(gift.emails_match());
    }

    #[test]
    fn test_blank_emails_never_match() {
        assert!(!GiftDetails::default().emails_match());
    }

    #[test]
    fn test_trimmed() {
        let gift = GiftDetails {
            from_name: "  Sam ".to_string(),
            custom_message: "\nHappy birthday!\n".to_string(),
            ..Default::default()
        };
        let trimmed = gift.trimmed();
        assert_eq!(trimmed.from_name, "Sam");
        assert_eq!(trimmed.custom_message, "Happy birthday!");
    }
}
