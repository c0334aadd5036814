use crate::filters::{Category, FilterValue};

use super::registry::{find_action, Action};

/// Longest category name, in words ("Seniority Level", "years of experience").
const MAX_CATEGORY_WORDS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Noop,
    Help,
    Show,
    Options,
    Picker,
    Add { category: String },
    Set { category: String, values: Vec<FilterValue> },
    Clear { category: String },
    Reset,
    Apply,
    Candidates,
    Job,
    Edit { instruction: String },
    Quit,
    Unknown { command: String, arg: String },
}

fn split_words(arg: &str) -> Vec<String> {
    if arg.trim().is_empty() {
        return Vec::new();
    }
    match shell_words::split(arg) {
        Ok(parts) => parts
            .into_iter()
            .filter(|value| !value.is_empty())
            .collect(),
        Err(_) => arg.split_whitespace().map(str::to_string).collect(),
    }
}

/// Takes as many leading words as form a known category (up to three);
/// falls back to the first word so the caller can report it as unknown.
fn split_category(words: &[String]) -> (String, &[String]) {
    let longest = words.len().min(MAX_CATEGORY_WORDS);
    for count in (1..=longest).rev() {
        let candidate = words[..count].join(" ");
        if Category::parse(&candidate).is_some() {
            return (candidate, &words[count..]);
        }
    }
    match words.split_first() {
        Some((head, rest)) => (head.clone(), rest),
        None => (String::new(), words),
    }
}

/// Parses the value part of `/set`. Comma-separated when a comma is present,
/// otherwise one value per (shell-quoted) word. A leading `!` excludes.
pub fn parse_values(words: &[String]) -> Vec<FilterValue> {
    let joined = words.join(" ");
    let raw: Vec<String> = if joined.contains(',') {
        joined.split(',').map(str::to_string).collect()
    } else {
        words.to_vec()
    };
    raw.iter()
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .filter_map(|item| match item.strip_prefix('!') {
            Some(rest) if !rest.trim().is_empty() => Some(FilterValue::excluded(rest.trim())),
            Some(_) => None,
            None => Some(FilterValue::included(item)),
        })
        .collect()
}

pub fn parse_command(text: &str) -> Command {
    let raw_trimmed = text.trim();
    if raw_trimmed.is_empty() {
        return Command::Noop;
    }

    let Some(slash_tail) = raw_trimmed.strip_prefix('/') else {
        return Command::Edit {
            instruction: raw_trimmed.to_string(),
        };
    };
    let command_len = slash_tail
        .chars()
        .take_while(|ch| ch.is_ascii_alphanumeric() || *ch == '_')
        .count();
    let command = slash_tail[..command_len].to_ascii_lowercase();
    let arg = slash_tail[command_len..].trim();

    let Some(action) = find_action(&command) else {
        return Command::Unknown {
            command,
            arg: arg.to_string(),
        };
    };

    match action {
        Action::Help => Command::Help,
        Action::Show => Command::Show,
        Action::Options => Command::Options,
        Action::Picker => Command::Picker,
        Action::Reset => Command::Reset,
        Action::Apply => Command::Apply,
        Action::Candidates => Command::Candidates,
        Action::Job => Command::Job,
        Action::Quit => Command::Quit,
        Action::Edit => Command::Edit {
            instruction: arg.to_string(),
        },
        Action::Add | Action::Clear => {
            let words = split_words(arg);
            let category = if words.is_empty() {
                String::new()
            } else {
                words.join(" ")
            };
            if action == Action::Add {
                Command::Add { category }
            } else {
                Command::Clear { category }
            }
        }
        Action::Set => {
            let words = split_words(arg);
            let (category, rest) = split_category(&words);
            Command::Set {
                category,
                values: parse_values(rest),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_command, Command};
    use crate::commands::help_lines;
    use crate::filters::FilterValue;

    #[test]
    fn blank_line_is_noop() {
        assert_eq!(parse_command("   \n"), Command::Noop);
    }

    #[test]
    fn bare_text_is_an_edit_instruction() {
        assert_eq!(
            parse_command("  make it fully remote "),
            Command::Edit {
                instruction: "make it fully remote".to_string()
            }
        );
        assert_eq!(
            parse_command("/edit add Kubernetes"),
            Command::Edit {
                instruction: "add Kubernetes".to_string()
            }
        );
    }

    #[test]
    fn no_arg_commands() {
        assert_eq!(parse_command("/help"), Command::Help);
        assert_eq!(parse_command("/RESET"), Command::Reset);
        assert_eq!(parse_command("/apply"), Command::Apply);
        assert_eq!(parse_command("/picker"), Command::Picker);
        assert_eq!(parse_command("/exit"), Command::Quit);
    }

    #[test]
    fn add_keeps_multi_word_category() {
        assert_eq!(
            parse_command("/add Seniority Level"),
            Command::Add {
                category: "Seniority Level".to_string()
            }
        );
        assert_eq!(
            parse_command("/clear \"Postal Code\""),
            Command::Clear {
                category: "Postal Code".to_string()
            }
        );
    }

    #[test]
    fn set_splits_category_and_comma_values() {
        assert_eq!(
            parse_command("/set Job Titles Staff Engineer, !Intern, SRE"),
            Command::Set {
                category: "Job Titles".to_string(),
                values: vec![
                    FilterValue::included("Staff Engineer"),
                    FilterValue::excluded("Intern"),
                    FilterValue::included("SRE"),
                ],
            }
        );
    }

    #[test]
    fn set_uses_shell_words_without_commas() {
        assert_eq!(
            parse_command("/set locations Berlin \"New York\" !Paris"),
            Command::Set {
                category: "locations".to_string(),
                values: vec![
                    FilterValue::included("Berlin"),
                    FilterValue::included("New York"),
                    FilterValue::excluded("Paris"),
                ],
            }
        );
    }

    #[test]
    fn set_without_values_is_an_empty_replacement() {
        assert_eq!(
            parse_command("/set Companies"),
            Command::Set {
                category: "Companies".to_string(),
                values: Vec::new(),
            }
        );
    }

    #[test]
    fn set_with_unknown_category_keeps_first_word() {
        assert_eq!(
            parse_command("/set Skills rust, go"),
            Command::Set {
                category: "Skills".to_string(),
                values: vec![FilterValue::included("rust"), FilterValue::included("go")],
            }
        );
    }

    #[test]
    fn unknown_command() {
        assert_eq!(
            parse_command("/magic foo bar"),
            Command::Unknown {
                command: "magic".to_string(),
                arg: "foo bar".to_string(),
            }
        );
    }

    #[test]
    fn help_lists_every_command() {
        let lines = help_lines();
        assert!(lines.contains(&"/add <category>"));
        assert!(lines.contains(&"/apply"));
        assert!(lines.iter().all(|line| line.starts_with('/')));
    }
}
