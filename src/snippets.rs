//! Merge-tag snippets that can be spliced into a template body.

/// A named piece of text offered by the snippet picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snippet {
    pub label: &'static str,
    pub body: &'static str,
}

pub const SNIPPETS: &[Snippet] = &[
    Snippet {
        label: "Name",
        body: "{{Name}}",
    },
    Snippet {
        label: "First Name",
        body: "{{FirstName}}",
    },
    Snippet {
        label: "Last Name",
        body: "{{LastName}}",
    },
    Snippet {
        label: "Email",
        body: "{{Email}}",
    },
    Snippet {
        label: "Unsubscribe Link",
        body: "<a href=\"{{UnsubscribeURL}}\">Unsubscribe</a>",
    },
    Snippet {
        label: "View in Browser",
        body: "<a href=\"{{WebViewURL}}\">View in browser</a>",
    },
];

/// Look up a snippet by its 1-based picker number.
pub fn by_number(number: u8) -> Option<&'static Snippet> {
    let idx = usize::from(number).checked_sub(1)?;
    SNIPPETS.get(idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_number_is_one_based() {
        assert_eq!(by_number(1).map(|s| s.body), Some("{{Name}}"));
        assert!(by_number(0).is_none());
        assert!(by_number(u8::try_from(SNIPPETS.len() + 1).unwrap()).is_none());
    }

    #[test]
    fn test_picker_fits_single_digit_keys() {
        assert!(SNIPPETS.len() <= 9);
    }
}
