/// Presentation states of a single XAB trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrialState {
    /// Reference stimulus shown alone.
    #[default]
    ShowX,
    /// Empty screen between X and the choices.
    Blank,
    /// Target and foil on screen, listener armed.
    Choices,
    /// Choices hidden after `ab_duration`; the listener is still armed.
    ChoicesHidden,
    /// Result emitted. Terminal.
    Complete,
}

impl TrialState {
    pub fn allows_input(&self) -> bool {
        matches!(self, Self::Choices | Self::ChoicesHidden)
    }

    /// Next state on the timed path. Responses and timeouts jump straight to
    /// `Complete` and do not go through here.
    pub fn next(&self) -> Option<Self> {
        use TrialState::*;
        Some(match self {
            ShowX => Blank,
            Blank => Choices,
            Choices => ChoicesHidden,
            ChoicesHidden => return None,
            Complete => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timed_path_ends_at_hidden_choices() {
        let mut state = TrialState::default();
        let mut seen = vec![state];
        while let Some(next) = state.next() {
            state = next;
            seen.push(state);
        }
        assert_eq!(
            seen,
            vec![
                TrialState::ShowX,
                TrialState::Blank,
                TrialState::Choices,
                TrialState::ChoicesHidden
            ]
        );
    }

    #[test]
    fn input_only_while_choices_are_up() {
        assert!(!TrialState::ShowX.allows_input());
        assert!(!TrialState::Blank.allows_input());
        assert!(TrialState::Choices.allows_input());
        assert!(TrialState::ChoicesHidden.allows_input());
        assert!(!TrialState::Complete.allows_input());
    }
}
