#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Action {
    Help,
    Show,
    Options,
    Picker,
    Add,
    Set,
    Clear,
    Reset,
    Apply,
    Candidates,
    Job,
    Edit,
    Quit,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct CommandSpec {
    pub command: &'static str,
    pub action: Action,
    pub usage: &'static str,
}

pub(crate) const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        command: "help",
        action: Action::Help,
        usage: "/help",
    },
    CommandSpec {
        command: "show",
        action: Action::Show,
        usage: "/show",
    },
    CommandSpec {
        command: "options",
        action: Action::Options,
        usage: "/options",
    },
    CommandSpec {
        command: "picker",
        action: Action::Picker,
        usage: "/picker",
    },
    CommandSpec {
        command: "add",
        action: Action::Add,
        usage: "/add <category>",
    },
    CommandSpec {
        command: "set",
        action: Action::Set,
        usage: "/set <category> <value>[, !<excluded value>...]",
    },
    CommandSpec {
        command: "clear",
        action: Action::Clear,
        usage: "/clear <category>",
    },
    CommandSpec {
        command: "reset",
        action: Action::Reset,
        usage: "/reset",
    },
    CommandSpec {
        command: "apply",
        action: Action::Apply,
        usage: "/apply",
    },
    CommandSpec {
        command: "candidates",
        action: Action::Candidates,
        usage: "/candidates",
    },
    CommandSpec {
        command: "job",
        action: Action::Job,
        usage: "/job",
    },
    CommandSpec {
        command: "edit",
        action: Action::Edit,
        usage: "/edit <instruction>",
    },
    CommandSpec {
        command: "quit",
        action: Action::Quit,
        usage: "/quit",
    },
    CommandSpec {
        command: "exit",
        action: Action::Quit,
        usage: "/exit",
    },
];

pub(crate) fn find_action(command: &str) -> Option<Action> {
    COMMANDS
        .iter()
        .find(|spec| spec.command == command)
        .map(|spec| spec.action)
}

/// One usage line per command, in registry order.
pub fn help_lines() -> Vec<&'static str> {
    COMMANDS.iter().map(|spec| spec.usage).collect()
}
