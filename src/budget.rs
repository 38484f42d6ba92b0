/// Counts search iterations per frame so callers can spread path requests over several frames.
/// The counter is advisory, nothing in the search aborts because of it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchBudget {
    this_frame: u32,
    last_frame: u32,
}

impl SearchBudget {
    pub fn new() -> SearchBudget {
        SearchBudget::default()
    }
    /// Starts a new frame, remembering what the previous one spent.
    pub fn roll(&mut self) {
        self.last_frame = self.this_frame;
        self.this_frame = 0;
    }
    pub fn charge(&mut self, iterations: u32) {
        self.this_frame = self.this_frame.saturating_add(iterations);
    }
    pub fn this_frame(&self) -> u32 {
        self.this_frame
    }
    pub fn last_frame(&self) -> u32 {
        self.last_frame
    }
    /// False once this frame has spent more than `cap`.
    pub fn is_ok(&self, cap: u32) -> bool {
        self.this_frame <= cap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charges_accumulate_until_rolled() {
        let mut budget = SearchBudget::new();
        budget.charge(7);
        budget.charge(5);
        assert_eq!(budget.this_frame(), 12);
        assert_eq!(budget.last_frame(), 0);
        budget.roll();
        assert_eq!(budget.this_frame(), 0);
        assert_eq!(budget.last_frame(), 12);
        budget.roll();
        assert_eq!(budget.last_frame(), 0);
    }

    #[test]
    fn ok_until_cap_is_exceeded() {
        let mut budget = SearchBudget::new();
        assert!(budget.is_ok(10));
        budget.charge(10);
        assert!(budget.is_ok(10));
        budget.charge(1);
        assert!(!budget.is_ok(10));
    }
}
