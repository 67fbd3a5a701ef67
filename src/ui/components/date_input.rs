use chrono::{Days, NaiveDate};
use crossterm::event::KeyCode;

/// Inline date editor for wizard fields. While editing, typed digits fill a
/// YYYYMMDD buffer that commits once complete; Up/Down step the date by one
/// day.
pub struct DateInputState {
    pub date: NaiveDate,
    pub editing: bool,
    buffer: String,
}

impl DateInputState {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            editing: false,
            buffer: String::new(),
        }
    }

    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;
        self.buffer.clear();
    }

    pub fn handle_input(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }
        match key {
            KeyCode::Char(c) if c.is_ascii_digit() && self.buffer.len() < 8 => {
                self.buffer.push(c);
                self.try_commit();
            }
            KeyCode::Backspace => {
                self.buffer.pop();
            }
            KeyCode::Up => {
                if let Some(next) = self.date.checked_add_days(Days::new(1)) {
                    self.date = next;
                }
            }
            KeyCode::Down => {
                if let Some(prev) = self.date.checked_sub_days(Days::new(1)) {
                    self.date = prev;
                }
            }
            _ => {}
        }
    }

    // Invalid dates (e.g. 20240231) leave the previous value in place.
    fn try_commit(&mut self) {
        if self.buffer.len() == 8 {
            if let Ok(parsed) = NaiveDate::parse_from_str(&self.buffer, "%Y%m%d") {
                self.date = parsed;
            }
            self.buffer.clear();
        }
    }

    pub fn get_display_string(&self) -> String {
        if self.editing && !self.buffer.is_empty() {
            let mut padded = format!("{:_<8}", self.buffer);
            padded.insert(6, '-');
            padded.insert(4, '-');
            padded
        } else {
            self.date.format("%Y-%m-%d").to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> DateInputState {
        let mut s = DateInputState::new(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        s.toggle_editing();
        s
    }

    #[test]
    fn typing_a_full_date_commits_it() {
        let mut s = state();
        for c in "20240620".chars() {
            s.handle_input(KeyCode::Char(c));
        }
        assert_eq!(s.get_display_string(), "2024-06-20");
    }

    #[test]
    fn invalid_date_keeps_the_previous_value() {
        let mut s = state();
        for c in "20240231".chars() {
            s.handle_input(KeyCode::Char(c));
        }
        assert_eq!(s.date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    }

    #[test]
    fn arrows_step_by_one_day() {
        let mut s = state();
        s.handle_input(KeyCode::Up);
        assert_eq!(s.date, NaiveDate::from_ymd_opt(2024, 1, 16).unwrap());
        s.handle_input(KeyCode::Down);
        s.handle_input(KeyCode::Down);
        assert_eq!(s.date, NaiveDate::from_ymd_opt(2024, 1, 14).unwrap());
    }
}
