use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::inventory::{search, SearchOutcome};
use crate::models::{ActionType, Equipment};

/// Longest quantity the form accepts, so the text always parses as `i64`.
const MAX_QUANTITY_DIGITS: usize = 9;

/// Fields of the take/return form, in tab order. Location is read-only and
/// never takes focus.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) enum FormField {
    #[default]
    Name,
    Item,
    Quantity,
}

/// Guided take/return form. The selection can only be set from search
/// results; typing in the item field drops it again.
#[derive(Default, Clone)]
pub(crate) struct ActionForm {
    pub(crate) user_name: String,
    pub(crate) search: String,
    pub(crate) quantity: String,
    pub(crate) active: FormField,
    pub(crate) selected: Option<Equipment>,
    pub(crate) results: Option<SearchOutcome>,
    pub(crate) highlighted: usize,
}

impl ActionForm {
    pub(crate) fn next_field(&mut self) {
        self.active = match self.active {
            FormField::Name => FormField::Item,
            FormField::Item => FormField::Quantity,
            FormField::Quantity => FormField::Name,
        };
    }

    pub(crate) fn previous_field(&mut self) {
        self.active = match self.active {
            FormField::Name => FormField::Quantity,
            FormField::Item => FormField::Name,
            FormField::Quantity => FormField::Item,
        };
    }

    /// Append a character to the active field. Returns whether the search
    /// text changed and the results need recomputing.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        match self.active {
            FormField::Name => {
                if !ch.is_control() {
                    self.user_name.push(ch);
                }
                false
            }
            FormField::Item => {
                if ch.is_control() {
                    return false;
                }
                self.search.push(ch);
                self.selected = None;
                true
            }
            FormField::Quantity => {
                if ch.is_ascii_digit() && self.quantity.len() < MAX_QUANTITY_DIGITS {
                    self.quantity.push(ch);
                }
                false
            }
        }
    }

    /// Remove the last character from the active field. Same return contract
    /// as [`ActionForm::push_char`].
    pub(crate) fn backspace(&mut self) -> bool {
        match self.active {
            FormField::Name => {
                self.user_name.pop();
                false
            }
            FormField::Item => {
                if self.search.pop().is_some() {
                    self.selected = None;
                    true
                } else {
                    false
                }
            }
            FormField::Quantity => {
                self.quantity.pop();
                false
            }
        }
    }

    /// Re-run the search over the directory for the current query.
    pub(crate) fn refresh_results(&mut self, items: &[Equipment], action: ActionType) {
        let outcome = search(items, &self.search, action);
        self.results = outcome.is_visible().then_some(outcome);
        self.highlighted = 0;
    }

    pub(crate) fn matches(&self) -> &[Equipment] {
        match &self.results {
            Some(outcome) => outcome.matches(),
            None => &[],
        }
    }

    pub(crate) fn results_visible(&self) -> bool {
        self.results.is_some()
    }

    pub(crate) fn hide_results(&mut self) {
        self.results = None;
        self.highlighted = 0;
    }

    pub(crate) fn move_highlight(&mut self, offset: isize) {
        let len = self.matches().len();
        if len == 0 {
            return;
        }
        let next = (self.highlighted as isize + offset).clamp(0, len as isize - 1);
        self.highlighted = next as usize;
    }

    /// Take the highlighted result as the selected item. Fills the search text
    /// with the primary name and hides the results box.
    pub(crate) fn select_highlighted(&mut self) -> bool {
        let Some(item) = self.matches().get(self.highlighted).cloned() else {
            return false;
        };
        self.search = item.name_en.clone();
        self.selected = Some(item);
        self.hide_results();
        true
    }

    /// Parsed quantity; anything unparsable becomes zero and fails validation.
    pub(crate) fn quantity_value(&self) -> i64 {
        self.quantity.trim().parse().unwrap_or(0)
    }

    pub(crate) fn location_display(&self) -> Option<&str> {
        self.selected.as_ref().map(Equipment::location_label)
    }

    /// Render one labelled input line.
    pub(crate) fn build_line(&self, field_name: &str, field: FormField) -> Line<'static> {
        let (value, placeholder) = match field {
            FormField::Name => (&self.user_name, "<full name>"),
            FormField::Item => (&self.search, "<type to search>"),
            FormField::Quantity => (&self.quantity, "<how many?>"),
        };
        let is_active = self.active == field;

        let display = if value.is_empty() {
            placeholder.to_string()
        } else {
            value.clone()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{field_name}: ")),
            Span::styled(display, style),
        ])
    }

    /// Character length of the requested field, for cursor placement.
    pub(crate) fn value_len(&self, field: FormField) -> usize {
        match field {
            FormField::Name => self.user_name.chars().count(),
            FormField::Item => self.search.chars().count(),
            FormField::Quantity => self.quantity.chars().count(),
        }
    }
}

/// Passphrase prompt shown before the admin tab opens.
#[derive(Default, Clone)]
pub(crate) struct PassphraseForm {
    pub(crate) input: String,
}

impl PassphraseForm {
    pub(crate) fn push_char(&mut self, ch: char) {
        if !ch.is_control() {
            self.input.push(ch);
        }
    }

    pub(crate) fn backspace(&mut self) {
        self.input.pop();
    }

    pub(crate) fn clear(&mut self) {
        self.input.clear();
    }

    /// Input rendered as bullets.
    pub(crate) fn masked(&self) -> String {
        "•".repeat(self.input.chars().count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items() -> Vec<Equipment> {
        vec![
            Equipment {
                id: "t1".into(),
                name_en: "Tent".into(),
                name_ar: None,
                location: Some("Shed".into()),
                total_quantity: 10,
                available_quantity: 10,
            },
            Equipment {
                id: "t2".into(),
                name_en: "Tent pegs".into(),
                name_ar: None,
                location: None,
                total_quantity: 50,
                available_quantity: 20,
            },
        ]
    }

    fn type_search(form: &mut ActionForm, text: &str, action: ActionType) {
        form.active = FormField::Item;
        for ch in text.chars() {
            form.push_char(ch);
        }
        form.refresh_results(&items(), action);
    }

    #[test]
    fn selecting_a_result_fills_search_and_location() {
        let mut form = ActionForm::default();
        type_search(&mut form, "tent", ActionType::Take);
        assert_eq!(form.matches().len(), 2);

        form.move_highlight(1);
        assert!(form.select_highlighted());
        assert_eq!(form.search, "Tent pegs");
        assert_eq!(form.location_display(), Some("Unknown"));
        assert!(!form.results_visible());
    }

    #[test]
    fn typing_after_selection_drops_it() {
        let mut form = ActionForm::default();
        type_search(&mut form, "tent", ActionType::Take);
        form.select_highlighted();
        assert!(form.selected.is_some());

        assert!(form.push_char('s'));
        assert!(form.selected.is_none());
    }

    #[test]
    fn empty_query_hides_results() {
        let mut form = ActionForm::default();
        type_search(&mut form, "t", ActionType::Take);
        assert!(form.results_visible());

        form.backspace();
        form.refresh_results(&items(), ActionType::Take);
        assert!(!form.results_visible());
    }

    #[test]
    fn quantity_accepts_digits_only() {
        let mut form = ActionForm {
            active: FormField::Quantity,
            ..ActionForm::default()
        };
        for ch in "1a2".chars() {
            form.push_char(ch);
        }
        assert_eq!(form.quantity, "12");
        assert_eq!(form.quantity_value(), 12);

        form.quantity.clear();
        assert_eq!(form.quantity_value(), 0);
    }

    #[test]
    fn quantity_input_is_capped() {
        let mut form = ActionForm {
            active: FormField::Quantity,
            ..ActionForm::default()
        };
        for ch in "99999999999999999999".chars() {
            form.push_char(ch);
        }
        assert_eq!(form.quantity, "999999999");
        assert_eq!(form.quantity_value(), 999_999_999);
    }

    #[test]
    fn highlight_stays_in_bounds() {
        let mut form = ActionForm::default();
        type_search(&mut form, "tent", ActionType::Take);
        form.move_highlight(5);
        assert_eq!(form.highlighted, 1);
        form.move_highlight(-9);
        assert_eq!(form.highlighted, 0);
    }
}
