use sitetrack_core::step::{StepDescriptor, StepKind};

/// Where a tapped phase card leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Straight into the step's task list.
    TaskList,
    /// Building → level → unit disambiguation first.
    DrillDown,
}

/// Conditional-navigation rule for phase cards: multi-steps need a
/// location before any task query makes sense, everything else (plain
/// steps and unknown kinds) drills straight through.
pub fn next_screen_for_step(step: &StepDescriptor) -> Screen {
    match step.kind {
        StepKind::MultiStep => Screen::DrillDown,
        StepKind::Step | StepKind::Other(_) => Screen::TaskList,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_of(kind: StepKind) -> StepDescriptor {
        StepDescriptor {
            step_type: "finish".into(),
            step_id: "s1".into(),
            record_id: "a".into(),
            name: "Finishes".into(),
            kind,
            order: 0,
            completed_count: 0,
            last_week_count: 0,
        }
    }

    #[test]
    fn plain_step_goes_to_task_list() {
        assert_eq!(next_screen_for_step(&step_of(StepKind::Step)), Screen::TaskList);
    }

    #[test]
    fn multi_step_goes_to_drill_down() {
        assert_eq!(
            next_screen_for_step(&step_of(StepKind::MultiStep)),
            Screen::DrillDown
        );
    }

    #[test]
    fn unknown_kind_falls_back_to_task_list() {
        assert_eq!(
            next_screen_for_step(&step_of(StepKind::Other("inspection".into()))),
            Screen::TaskList
        );
    }
}
