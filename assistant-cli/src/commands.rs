//! Parsing of assistant prompt lines and `field=value` assignments.

use shared::{Error, InputField, Result};

/// One line typed at the assistant prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    ToggleOverride,
    Set(InputField, String),
    Staged,
    Report,
    Save,
    Help,
    Quit,
    /// Anything that is not a slash command
    Ask(String),
}

pub const HELP: &str = "\
Commands:
  /override              toggle override mode
  /set <field> <value>   stage an override (blank value un-stages it)
  /staged                show staged overrides
  /report                show the report
  /save                  persist the report's current input
  /quit                  leave
Anything else is sent to the assistant.";

pub fn parse_command(line: &str) -> Result<Command> {
    let line = line.trim();
    let Some(rest) = line.strip_prefix('/') else {
        return Ok(Command::Ask(line.to_string()));
    };

    let (name, args) = match rest.split_once(char::is_whitespace) {
        Some((name, args)) => (name, args.trim()),
        None => (rest, ""),
    };

    match name {
        "override" => Ok(Command::ToggleOverride),
        "set" => {
            let (field, value) = match args.split_once(char::is_whitespace) {
                Some((field, value)) => (field, value.trim()),
                None => (args, ""),
            };
            if field.is_empty() {
                return Err(Error::Validation("Usage: /set <field> <value>".to_string()));
            }
            Ok(Command::Set(field.parse()?, value.to_string()))
        }
        "staged" => Ok(Command::Staged),
        "report" => Ok(Command::Report),
        "save" => Ok(Command::Save),
        "help" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(Error::Validation(format!(
            "Unknown command '/{}'. Type /help for the list.",
            other
        ))),
    }
}

/// Parse `field=value`, as given to `reports update --set`.
pub fn parse_assignment(raw: &str) -> Result<(InputField, String)> {
    let (field, value) = raw
        .split_once('=')
        .ok_or_else(|| Error::Validation(format!("Expected field=value, got '{}'", raw)))?;
    Ok((field.parse()?, value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command(" /override ").unwrap(), Command::ToggleOverride);
        assert_eq!(
            parse_command("/set unit_price 5000").unwrap(),
            Command::Set(InputField::UnitPrice, "5000".to_string())
        );
        assert_eq!(
            parse_command("/set state Tamil Nadu").unwrap(),
            Command::Set(InputField::Region, "Tamil Nadu".to_string())
        );
        assert_eq!(
            parse_command("/set model_type").unwrap(),
            Command::Set(InputField::ModelType, String::new())
        );
        assert_eq!(parse_command("/quit").unwrap(), Command::Quit);
        assert_eq!(
            parse_command("Why is waste high?").unwrap(),
            Command::Ask("Why is waste high?".to_string())
        );
        assert_eq!(parse_command("").unwrap(), Command::Ask(String::new()));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse_command("/set"), Err(Error::Validation(_))));
        assert!(matches!(parse_command("/set colour red"), Err(Error::Validation(_))));
        assert!(matches!(parse_command("/frobnicate"), Err(Error::Validation(_))));
    }

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("current_inventory=80").unwrap(),
            (InputField::CurrentInventory, "80".to_string())
        );
        assert_eq!(
            parse_assignment("product_name=Silk = Saree").unwrap(),
            (InputField::ProductName, "Silk = Saree".to_string())
        );
        assert!(parse_assignment("unit_price").is_err());
    }
}
